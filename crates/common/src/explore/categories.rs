//! Curated eras, themes and moods for the explore page

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::errors::AppError;

/// Which table a category key belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    Era,
    Theme,
    Mood,
}

impl CategoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryType::Era => "era",
            CategoryType::Theme => "theme",
            CategoryType::Mood => "mood",
        }
    }

    pub fn categories(&self) -> &'static [Category] {
        match self {
            CategoryType::Era => ERAS,
            CategoryType::Theme => THEMES,
            CategoryType::Mood => MOODS,
        }
    }

    pub fn find(&self, key: &str) -> Option<&'static Category> {
        self.categories().iter().find(|c| c.key == key)
    }
}

impl fmt::Display for CategoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "era" => Ok(CategoryType::Era),
            "theme" => Ok(CategoryType::Theme),
            "mood" => Ok(CategoryType::Mood),
            other => Err(AppError::validation(
                "category_type",
                format!("Unknown category type '{}', expected era, theme or mood", other),
            )),
        }
    }
}

/// An era, theme or mood
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Inclusive year range, eras only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years: Option<(i32, i32)>,
    pub artists: &'static [&'static str],
    pub search_terms: &'static [&'static str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wall_color: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<&'static str>,
}

impl Category {
    /// Artists first, then the generic terms
    pub fn queries(&self) -> impl Iterator<Item = &'static str> {
        self.artists.iter().chain(self.search_terms.iter()).copied()
    }
}

pub const ERAS: &[Category] = &[
    Category {
        key: "renaissance",
        name: "Renaissance",
        description: "Rebirth of classical ideals. Perspective, humanism, and mastery of form.",
        years: Some((1400, 1600)),
        artists: &["Leonardo da Vinci", "Michelangelo", "Raphael", "Botticelli", "Titian", "Jan van Eyck", "Dürer"],
        search_terms: &["renaissance", "Leonardo", "Michelangelo", "Raphael", "Botticelli"],
        wall_color: Some("#4A3728"),
        icon: None,
    },
    Category {
        key: "baroque",
        name: "Baroque",
        description: "Drama, grandeur, and emotional intensity. Rich colors and bold contrasts.",
        years: Some((1600, 1750)),
        artists: &["Caravaggio", "Rembrandt", "Vermeer", "Rubens", "Velázquez"],
        search_terms: &["baroque", "Rembrandt", "Vermeer", "Caravaggio", "Rubens"],
        wall_color: Some("#8B2332"),
        icon: None,
    },
    Category {
        key: "rococo",
        name: "Rococo",
        description: "Elegance, lightness, and playful themes. Soft colors and ornate detail.",
        years: Some((1720, 1780)),
        artists: &["Watteau", "Fragonard", "Boucher", "Tiepolo"],
        search_terms: &["rococo", "Watteau", "Fragonard", "Boucher"],
        wall_color: Some("#D4C5B9"),
        icon: None,
    },
    Category {
        key: "romanticism",
        name: "Romanticism",
        description: "Emotion, nature, and the sublime. Dramatic landscapes and heroic subjects.",
        years: Some((1780, 1850)),
        artists: &["Turner", "Delacroix", "Goya", "Constable", "Friedrich"],
        search_terms: &["romantic", "Turner", "Delacroix", "Goya", "Constable"],
        wall_color: Some("#2D4739"),
        icon: None,
    },
    Category {
        key: "impressionism",
        name: "Impressionism",
        description: "Light, color, and the fleeting moment. Visible brushstrokes and everyday scenes.",
        years: Some((1860, 1890)),
        artists: &["Monet", "Renoir", "Degas", "Pissarro", "Morisot", "Cassatt", "Sisley"],
        search_terms: &["impressionist", "Monet", "Renoir", "Degas", "Pissarro"],
        wall_color: Some("#E8E4DF"),
        icon: None,
    },
    Category {
        key: "post-impressionism",
        name: "Post-Impressionism",
        description: "Beyond Impressionism. Bold colors, symbolic content, and emotional expression.",
        years: Some((1886, 1910)),
        artists: &["Van Gogh", "Gauguin", "Seurat", "Toulouse-Lautrec", "Edvard Munch"],
        search_terms: &["Van Gogh", "Gauguin", "Seurat", "post-impressionist"],
        wall_color: Some("#F5E6D3"),
        icon: None,
    },
    Category {
        key: "modern",
        name: "Modern",
        description: "Breaking traditions. Abstraction, expression, and new ways of seeing.",
        years: Some((1900, 1970)),
        artists: &["Matisse", "Kandinsky", "Mondrian", "Klimt", "Edvard Munch"],
        search_terms: &["modern art", "Matisse", "Kandinsky", "Klimt", "abstract"],
        wall_color: Some("#FFFFFF"),
        icon: None,
    },
    Category {
        key: "dutch-golden-age",
        name: "Dutch Golden Age",
        description: "Mastery of light and domestic scenes. Portraits, still lifes, and landscapes.",
        years: Some((1600, 1700)),
        artists: &["Rembrandt", "Vermeer", "Hals", "Steen", "Ruisdael", "de Hooch"],
        search_terms: &["dutch golden age", "Vermeer", "Rembrandt", "Hals"],
        wall_color: Some("#3D3D3D"),
        icon: None,
    },
];

const fn theme(
    key: &'static str,
    name: &'static str,
    description: &'static str,
    search_terms: &'static [&'static str],
    icon: &'static str,
) -> Category {
    Category {
        key,
        name,
        description,
        years: None,
        artists: &[],
        search_terms,
        wall_color: None,
        icon: Some(icon),
    }
}

pub const THEMES: &[Category] = &[
    theme(
        "landscapes",
        "Landscapes",
        "Mountains, seas, fields, and skies. Nature in all its forms.",
        &["landscape", "seascape", "countryside", "mountains"],
        "🏔️",
    ),
    theme(
        "portraits",
        "Portraits",
        "The human face and figure. Identity, status, and inner life.",
        &["portrait", "self-portrait", "figure"],
        "👤",
    ),
    theme(
        "still-life",
        "Still Life",
        "Objects arranged with care. Flowers, fruit, and everyday things.",
        &["still life", "flowers", "fruit", "vanitas"],
        "🍎",
    ),
    theme(
        "religious",
        "Religious",
        "Sacred stories and divine figures. Faith made visible.",
        &["madonna", "crucifixion", "saints", "biblical"],
        "✝️",
    ),
    theme(
        "mythology",
        "Mythology",
        "Gods, heroes, and ancient tales. Classical stories reimagined.",
        &["mythology", "Venus", "Apollo", "Greek", "Roman myth"],
        "🏛️",
    ),
    theme(
        "daily-life",
        "Daily Life",
        "Ordinary moments. People at work, at play, at home.",
        &["genre scene", "domestic", "peasant", "interior"],
        "🏠",
    ),
    theme(
        "historical",
        "Historical",
        "Great events and turning points. History on canvas.",
        &["battle", "historical", "coronation", "revolution"],
        "⚔️",
    ),
    theme(
        "marine",
        "Marine & Ships",
        "The sea, ships, and maritime life.",
        &["marine", "ship", "sea", "naval", "harbor"],
        "⛵",
    ),
];

const fn mood(
    key: &'static str,
    name: &'static str,
    description: &'static str,
    search_terms: &'static [&'static str],
    artists: &'static [&'static str],
) -> Category {
    Category {
        key,
        name,
        description,
        years: None,
        artists,
        search_terms,
        wall_color: None,
        icon: None,
    }
}

pub const MOODS: &[Category] = &[
    mood(
        "peaceful",
        "Peaceful",
        "Calm, serene, and contemplative.",
        &["pastoral", "garden", "quiet", "serene"],
        &["Monet", "Vermeer", "Corot", "Constable"],
    ),
    mood(
        "dramatic",
        "Dramatic",
        "Intense, powerful, and emotionally charged.",
        &["storm", "dramatic", "battle"],
        &["Caravaggio", "Delacroix", "Turner", "Goya"],
    ),
    mood(
        "joyful",
        "Joyful",
        "Happy, celebratory, and full of life.",
        &["dance", "celebration", "festival", "party"],
        &["Renoir", "Fragonard", "Watteau"],
    ),
    mood(
        "melancholic",
        "Melancholic",
        "Thoughtful, sad, or wistful.",
        &["solitude", "winter", "twilight"],
        &["Hopper", "Friedrich", "Munch"],
    ),
    mood(
        "mysterious",
        "Mysterious",
        "Enigmatic, dreamlike, and intriguing.",
        &["night", "dream", "mystery", "symbolic"],
        &["Bosch", "Redon", "de Chirico", "Magritte"],
    ),
];

/// Artist highlighted on the explore page
#[derive(Debug, Clone, Serialize)]
pub struct FeaturedArtist {
    pub name: &'static str,
    pub full_name: &'static str,
    pub era: &'static str,
    pub bio: &'static str,
}

pub const FEATURED_ARTISTS: &[FeaturedArtist] = &[
    FeaturedArtist {
        name: "Vermeer",
        full_name: "Johannes Vermeer",
        era: "dutch-golden-age",
        bio: "Master of light and domestic scenes. Only ~35 paintings survive.",
    },
    FeaturedArtist {
        name: "Monet",
        full_name: "Claude Monet",
        era: "impressionism",
        bio: "Father of Impressionism. Obsessed with capturing light and atmosphere.",
    },
    FeaturedArtist {
        name: "Rembrandt",
        full_name: "Rembrandt van Rijn",
        era: "baroque",
        bio: "Master of shadow and human emotion. Greatest portrait painter of his age.",
    },
    FeaturedArtist {
        name: "Van Gogh",
        full_name: "Vincent van Gogh",
        era: "post-impressionism",
        bio: "Bold colors, emotional intensity. Sold one painting in his lifetime.",
    },
    FeaturedArtist {
        name: "Caravaggio",
        full_name: "Michelangelo Merisi da Caravaggio",
        era: "baroque",
        bio: "Revolutionary use of light and shadow. Violent life, profound art.",
    },
];

/// Day number with 0001-01-01 as day 1
fn ordinal(date: NaiveDate) -> usize {
    date.num_days_from_ce().max(0) as usize
}

/// Changes every day
pub fn featured_artist(date: NaiveDate) -> &'static FeaturedArtist {
    &FEATURED_ARTISTS[ordinal(date) % FEATURED_ARTISTS.len()]
}

/// Changes every seven days
pub fn weekly_spotlight(date: NaiveDate) -> &'static Category {
    &ERAS[(ordinal(date) / 7) % ERAS.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_keys_unique_per_type() {
        for kind in [CategoryType::Era, CategoryType::Theme, CategoryType::Mood] {
            let keys: HashSet<_> = kind.categories().iter().map(|c| c.key).collect();
            assert_eq!(keys.len(), kind.categories().len(), "{}", kind);
        }
    }

    #[test]
    fn test_eras_have_ranges_and_featured_eras_exist() {
        assert!(ERAS.iter().all(|e| matches!(e.years, Some((start, end)) if start < end)));
        for artist in FEATURED_ARTISTS {
            assert!(CategoryType::Era.find(artist.era).is_some(), "{}", artist.era);
        }
    }

    #[test]
    fn test_rotation() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let next = day.succ_opt().unwrap();
        assert_ne!(featured_artist(day).name, featured_artist(next).name);

        let week_start = NaiveDate::from_num_days_from_ce_opt(7 * 105_000).unwrap();
        for offset in 0..7 {
            let date = week_start + chrono::Days::new(offset);
            assert_eq!(weekly_spotlight(date).key, weekly_spotlight(week_start).key);
        }
        let following = week_start + chrono::Days::new(7);
        assert_ne!(weekly_spotlight(following).key, weekly_spotlight(week_start).key);
    }

    #[test]
    fn test_parse_type() {
        assert_eq!("mood".parse::<CategoryType>().unwrap(), CategoryType::Mood);
        assert!("genre".parse::<CategoryType>().is_err());
        assert_eq!(CategoryType::Theme.find("marine").unwrap().name, "Marine & Ships");
        assert!(CategoryType::Theme.find("baroque").is_none());
    }
}
