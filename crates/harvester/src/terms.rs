//! Search terms fed to each museum

use artstuff_common::config::HarvestConfig;
use artstuff_common::Museum;
use std::time::Duration;

/// Artists first, then broad themes
pub const HARVEST_TERMS: &[&str] = &[
    // Major artists
    "Rembrandt", "Vermeer", "Van Gogh", "Monet", "Renoir",
    "Cézanne", "Degas", "Manet", "Matisse", "Picasso",
    "Klimt", "Kandinsky", "Mondrian", "Hopper", "Cassatt",
    "Gauguin", "Seurat", "Toulouse-Lautrec",
    // Dutch Golden Age
    "Frans Hals", "Jan Steen", "Ruisdael", "Avercamp",
    "Pieter de Hooch", "Gerard ter Borch",
    // Italian
    "Leonardo da Vinci", "Michelangelo", "Raphael", "Caravaggio",
    "Titian", "Botticelli", "Tintoretto", "Veronese",
    // Northern Renaissance
    "Van Eyck", "Dürer", "Holbein", "Bruegel", "Bosch",
    // Baroque
    "Rubens", "Velázquez", "El Greco", "Goya",
    // British
    "Turner", "Constable", "Gainsborough",
    // French
    "Poussin", "Watteau", "Fragonard", "David", "Ingres",
    "Delacroix", "Courbet", "Millet", "Corot",
    // American
    "Whistler", "Sargent", "Homer",
    // Skagen and Danish Golden Age
    "Krøyer", "Anna Ancher", "Michael Ancher",
    "Hammershøi", "Eckersberg", "Købke",
    // Themes
    "landscape", "portrait", "still life", "seascape",
    "flowers", "winter", "sunset", "garden",
];

/// Extra terms for the National Gallery of Denmark
const SMK_EXTRA_TERMS: &[&str] = &["Skagen", "Danish", "Copenhagen", "Nordic"];

/// Terms used by `--artists`
const ARTIST_TERM_COUNT: usize = 30;

/// The Met answers one object per request, so it gets fewer terms and smaller pages
const MET_TERM_COUNT: usize = 20;
const MET_ARTIST_TERM_COUNT: usize = 15;
const MET_MAX_PAGES: u32 = 2;
const MET_MAX_PAGE_SIZE: u64 = 10;

const EUROPEANA_TERM_COUNT: usize = 15;

/// How one museum is harvested
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestPlan {
    pub terms: Vec<&'static str>,
    pub pages: u32,
    pub page_size: u64,
    /// Pause after each result page
    pub page_pause: Duration,
    /// Pause after each term, on top of the page pauses
    pub term_pause: Duration,
}

impl HarvestPlan {
    fn with_terms(terms: &[&'static str], config: &HarvestConfig) -> Self {
        Self {
            terms: terms.to_vec(),
            pages: config.pages_per_term,
            page_size: config.page_size,
            page_pause: Duration::from_millis(config.pause_ms),
            term_pause: Duration::ZERO,
        }
    }

    fn met(terms: &[&'static str], config: &HarvestConfig) -> Self {
        Self {
            pages: config.pages_per_term.min(MET_MAX_PAGES),
            page_size: config.page_size.min(MET_MAX_PAGE_SIZE),
            term_pause: Duration::from_millis(config.pause_ms * 2),
            ..Self::with_terms(terms, config)
        }
    }
}

/// Full harvest plan for one museum
///
/// The Rijksmuseum plan has no terms; its whole catalogue is loaded instead.
pub fn plan_for(museum: Museum, config: &HarvestConfig) -> HarvestPlan {
    match museum {
        Museum::Rijks => HarvestPlan::with_terms(&[], config),
        Museum::Met => HarvestPlan::met(&HARVEST_TERMS[..MET_TERM_COUNT], config),
        Museum::Europeana => HarvestPlan::with_terms(&HARVEST_TERMS[..EUROPEANA_TERM_COUNT], config),
        Museum::Smk => {
            let mut plan = HarvestPlan::with_terms(HARVEST_TERMS, config);
            plan.terms.extend_from_slice(SMK_EXTRA_TERMS);
            plan
        }
        Museum::Aic | Museum::Cleveland | Museum::Harvard | Museum::Smithsonian => {
            HarvestPlan::with_terms(HARVEST_TERMS, config)
        }
    }
}

/// Popular artists only, from the museums that index artists best
pub fn artist_plans(config: &HarvestConfig) -> Vec<(Museum, HarvestPlan)> {
    let artists = &HARVEST_TERMS[..ARTIST_TERM_COUNT];
    vec![
        (Museum::Aic, HarvestPlan::with_terms(artists, config)),
        (Museum::Cleveland, HarvestPlan::with_terms(artists, config)),
        (Museum::Met, HarvestPlan::met(&artists[..MET_ARTIST_TERM_COUNT], config)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_plan() {
        let plan = plan_for(Museum::Aic, &HarvestConfig::default());
        assert_eq!(plan.terms.len(), HARVEST_TERMS.len());
        assert_eq!(plan.pages, 3);
        assert_eq!(plan.page_size, 20);
        assert_eq!(plan.page_pause, Duration::from_millis(500));
        assert_eq!(plan.term_pause, Duration::ZERO);
    }

    #[test]
    fn test_met_is_throttled() {
        let plan = plan_for(Museum::Met, &HarvestConfig::default());
        assert_eq!(plan.terms.len(), 20);
        assert_eq!(plan.pages, 2);
        assert_eq!(plan.page_size, 10);
        assert_eq!(plan.term_pause, Duration::from_secs(1));
    }

    #[test]
    fn test_museum_specific_terms() {
        let config = HarvestConfig::default();

        assert_eq!(plan_for(Museum::Europeana, &config).terms.len(), 15);
        assert!(plan_for(Museum::Rijks, &config).terms.is_empty());

        let smk = plan_for(Museum::Smk, &config);
        assert_eq!(smk.terms.len(), HARVEST_TERMS.len() + 4);
        assert_eq!(smk.terms.last(), Some(&"Nordic"));
        assert!(smk.terms.contains(&"Hammershøi"));
    }

    #[test]
    fn test_artist_plans() {
        let plans = artist_plans(&HarvestConfig::default());
        let museums: Vec<Museum> = plans.iter().map(|(m, _)| *m).collect();
        assert_eq!(museums, vec![Museum::Aic, Museum::Cleveland, Museum::Met]);
        assert_eq!(plans[0].1.terms.len(), 30);
        assert_eq!(plans[0].1.terms[0], "Rembrandt");
        assert_eq!(plans[2].1.terms.len(), 15);
        assert!(!plans[0].1.terms.contains(&"landscape"));
    }
}
