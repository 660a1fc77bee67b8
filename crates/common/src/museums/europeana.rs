//! Europeana (requires an API key)
//!
//! Europeana aggregates many providers; most fields arrive either as a
//! string, a list of strings or a language map, so they are read loosely.

use super::{clean_description, Museum, MuseumClient, MuseumSource, PaintingRecord, SourcePage};
use crate::config::MuseumsConfig;
use crate::errors::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

pub struct EuropeanaSource {
    client: MuseumClient,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    items: Vec<Value>,
    #[serde(default)]
    total_results: u64,
}

#[derive(Debug, Deserialize)]
struct RecordResponse {
    object: Option<Value>,
}

/// First text value of a string, list or language map
fn first_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Array(items) => items.iter().find_map(|v| first_text(Some(v))),
        Value::Object(map) => map
            .get("en")
            .and_then(|v| first_text(Some(v)))
            .or_else(|| map.values().find_map(|v| first_text(Some(v)))),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn to_record(item: &Value) -> Option<PaintingRecord> {
    let id = first_text(item.get("id")).or_else(|| first_text(item.get("about")))?;

    let artist = first_text(item.get("dcCreator")).or_else(|| first_text(item.get("dcCreatorLangAware")));
    let image_url = first_text(item.get("edmIsShownBy")).or_else(|| first_text(item.get("edmPreview")));
    let provider = first_text(item.get("dataProvider")).unwrap_or_else(|| "Europeana".to_string());

    let mut record = PaintingRecord::new(Museum::Europeana, id.clone())
        .title(first_text(item.get("title")))
        .artist(artist);
    record.museum_name = format!("Europeana ({})", provider);
    record.date_display = first_text(item.get("year"));
    record.description = clean_description(first_text(item.get("dcDescription")).as_deref());
    record.thumbnail_url = first_text(item.get("edmPreview"));
    record.image_url = image_url;
    record.museum_url =
        first_text(item.get("guid")).or_else(|| Some(format!("https://www.europeana.eu/item{}", id)));
    record.metadata = json!({
        "provider": provider,
        "country": first_text(item.get("country")).unwrap_or_default(),
    });
    Some(record)
}

/// Record ids look like `/2048128/618580`
fn valid_record_id(id: &str) -> bool {
    !id.is_empty()
        && !id.contains("..")
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '_' | '-' | '.'))
}

impl EuropeanaSource {
    pub fn new(client: MuseumClient, config: &MuseumsConfig) -> Self {
        Self {
            client,
            base_url: config.europeana_base_url.trim_end_matches('/').to_string(),
            api_key: config.europeana_api_key.clone().filter(|k| !k.is_empty()),
        }
    }
}

#[async_trait]
impl MuseumSource for EuropeanaSource {
    fn museum(&self) -> Museum {
        Museum::Europeana
    }

    fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    async fn search(&self, query: &str, page: u64, limit: u64) -> Result<SourcePage> {
        let Some(api_key) = &self.api_key else {
            return Ok(SourcePage::empty());
        };

        // Europeana's `start` is 1-based
        let start = page.saturating_sub(1) * limit + 1;
        let url = format!("{}/search.json", self.base_url);
        let params = [
            ("wskey", api_key.clone()),
            ("query", query.to_string()),
            ("qf", "TYPE:IMAGE".to_string()),
            ("rows", limit.to_string()),
            ("start", start.to_string()),
        ];

        let response: SearchResponse = self.client.get_json(Museum::Europeana, &url, &params).await?;

        let paintings = response
            .items
            .iter()
            .filter_map(to_record)
            .filter(|p| p.image_url.is_some())
            .collect();

        Ok(SourcePage {
            paintings,
            total: response.total_results,
        })
    }

    async fn get(&self, external_id: &str) -> Result<Option<PaintingRecord>> {
        let Some(api_key) = &self.api_key else {
            return Ok(None);
        };
        if !valid_record_id(external_id) {
            return Ok(None);
        }

        let url = format!("{}/{}.json", self.base_url, external_id.trim_start_matches('/'));
        let response: Option<RecordResponse> = self
            .client
            .get_json_optional(Museum::Europeana, &url, &[("wskey", api_key.clone())])
            .await?;

        Ok(response.and_then(|r| r.object).and_then(|o| to_record(&o)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::time::Duration;

    #[test]
    fn test_first_text_shapes() {
        assert_eq!(first_text(Some(&json!("a"))).as_deref(), Some("a"));
        assert_eq!(first_text(Some(&json!(["", "b"]))).as_deref(), Some("b"));
        assert_eq!(
            first_text(Some(&json!({"def": ["x"], "en": ["English"]}))).as_deref(),
            Some("English")
        );
        assert_eq!(first_text(Some(&json!({"def": ["x"]}))).as_deref(), Some("x"));
        assert!(first_text(Some(&json!([]))).is_none());
        assert!(first_text(None).is_none());
    }

    #[test]
    fn test_record_id_validation() {
        assert!(valid_record_id("/2048128/618580"));
        assert!(!valid_record_id("/../admin"));
        assert!(!valid_record_id("a?b"));
    }

    #[tokio::test]
    async fn test_search_maps_provider_and_start() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search.json")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("start".into(), "11".into()),
                Matcher::UrlEncoded("qf".into(), "TYPE:IMAGE".into()),
            ]))
            .with_status(200)
            .with_body(
                json!({
                    "totalResults": 3,
                    "items": [{
                        "id": "/90402/SK_A_2344",
                        "title": ["The Milkmaid"],
                        "dcCreator": ["Johannes Vermeer"],
                        "edmPreview": ["https://api.example/thumb.jpg"],
                        "dataProvider": ["Rijksmuseum"],
                        "year": ["1660"],
                        "guid": "https://www.europeana.eu/item/90402/SK_A_2344"
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let mut config = MuseumsConfig::default();
        config.europeana_base_url = server.url();
        config.europeana_api_key = Some("key".into());
        let europeana =
            EuropeanaSource::new(MuseumClient::uncached(Duration::from_secs(5)).unwrap(), &config);

        let page = europeana.search("vermeer", 2, 10).await.unwrap();
        assert_eq!(page.total, 3);
        let p = &page.paintings[0];
        assert_eq!(p.museum_name, "Europeana (Rijksmuseum)");
        assert_eq!(p.artist, "Johannes Vermeer");
        assert_eq!(p.date_display.as_deref(), Some("1660"));
        // No edmIsShownBy: the preview doubles as the image
        assert_eq!(p.image_url.as_deref(), Some("https://api.example/thumb.jpg"));
    }
}
