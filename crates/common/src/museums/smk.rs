//! SMK, the National Gallery of Denmark

use super::{clean_description, non_empty, Museum, MuseumClient, MuseumSource, PaintingRecord, SourcePage};
use crate::config::MuseumsConfig;
use crate::db::page_offset;
use crate::errors::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

pub struct SmkSource {
    client: MuseumClient,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<Value>,
    #[serde(default)]
    found: u64,
}

/// English title when present, otherwise the first one
fn title(item: &Value) -> Option<String> {
    match item.get("titles")? {
        Value::String(s) => Some(s.clone()),
        Value::Array(titles) => {
            let text = |t: &Value| match t {
                Value::String(s) => Some(s.clone()),
                Value::Object(_) => t.get("title").and_then(Value::as_str).map(str::to_string),
                _ => None,
            };
            titles
                .iter()
                .find(|t| t.get("language").and_then(Value::as_str) == Some("en"))
                .and_then(text)
                .or_else(|| titles.iter().find_map(text))
        }
        _ => None,
    }
}

/// `start-end` when the production range spans years
fn date_display(production: Option<&Value>) -> Option<String> {
    let production = production?;
    let as_text = |v: Option<&Value>| match v {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    let start = as_text(production.get("date_start"));
    let end = as_text(production.get("date_end"));
    match (start, end) {
        (Some(start), Some(end)) if start != end => Some(format!("{}-{}", start, end)),
        (Some(start), _) => Some(start),
        _ => None,
    }
}

fn notes(item: &Value) -> Option<String> {
    match item.get("notes")? {
        Value::String(s) => Some(s.clone()),
        Value::Array(notes) => notes.iter().find_map(|n| match n {
            Value::String(s) => Some(s.clone()),
            Value::Object(_) => n.get("note").and_then(Value::as_str).map(str::to_string),
            _ => None,
        }),
        _ => None,
    }
}

fn str_field(item: &Value, key: &str) -> Option<String> {
    non_empty(item.get(key).and_then(Value::as_str).map(str::to_string))
}

fn to_record(item: &Value) -> Option<PaintingRecord> {
    let object_number = str_field(item, "object_number")?;
    let production = item
        .get("production")
        .and_then(Value::as_array)
        .and_then(|p| p.first());

    let artist = production.and_then(|p| str_field(p, "creator"));
    let thumbnail_url = str_field(item, "image_thumbnail");
    let image_url = str_field(item, "image_native")
        .or_else(|| thumbnail_url.as_ref().map(|t| t.replace("/thumb/", "/native/")));
    let medium = item
        .get("techniques")
        .and_then(Value::as_array)
        .map(|t| t.iter().filter_map(Value::as_str).collect::<Vec<_>>().join(", "))
        .filter(|m| !m.is_empty());

    let mut record = PaintingRecord::new(Museum::Smk, object_number.clone())
        .title(title(item))
        .artist(artist);
    record.date_display = date_display(production);
    record.medium = medium;
    record.dimensions = str_field(item, "dimensions_note");
    record.description = clean_description(notes(item).as_deref());
    record.image_url = image_url;
    record.thumbnail_url = thumbnail_url;
    record.museum_url = Some(format!("https://open.smk.dk/artwork/image/{}", object_number));
    record.metadata = json!({
        "acquisition": item.get("acquisition").cloned().unwrap_or(Value::Null),
        "collection": item.get("collection").cloned().unwrap_or(Value::Null),
        "rights": item.get("rights").cloned().unwrap_or(Value::Null),
    });
    Some(record)
}

impl SmkSource {
    pub fn new(client: MuseumClient, config: &MuseumsConfig) -> Self {
        Self {
            client,
            base_url: config.smk_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl MuseumSource for SmkSource {
    fn museum(&self) -> Museum {
        Museum::Smk
    }

    async fn search(&self, query: &str, page: u64, limit: u64) -> Result<SourcePage> {
        let url = format!("{}/art/search/", self.base_url);
        let params = [
            ("keys", query.to_string()),
            ("offset", page_offset(page, limit).to_string()),
            ("rows", limit.to_string()),
            ("filters", "[has_image:true]".to_string()),
        ];

        let response: SearchResponse = self.client.get_json(Museum::Smk, &url, &params).await?;

        let paintings = response
            .items
            .iter()
            .filter_map(to_record)
            .filter(|p| p.image_url.is_some())
            .collect();

        Ok(SourcePage {
            paintings,
            total: response.found,
        })
    }

    async fn get(&self, external_id: &str) -> Result<Option<PaintingRecord>> {
        // Object numbers end up inside a filter expression
        if external_id.is_empty() || external_id.contains([']', '[', ',']) {
            return Ok(None);
        }

        let url = format!("{}/art/search/", self.base_url);
        let params = [
            ("keys", "*".to_string()),
            ("filters", format!("[object_number:{}]", external_id)),
            ("rows", "1".to_string()),
        ];

        let response: SearchResponse = self.client.get_json(Museum::Smk, &url, &params).await?;
        Ok(response.items.first().and_then(to_record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::time::Duration;

    fn source(server: &mockito::ServerGuard) -> SmkSource {
        let mut config = MuseumsConfig::default();
        config.smk_base_url = server.url();
        SmkSource::new(MuseumClient::uncached(Duration::from_secs(5)).unwrap(), &config)
    }

    fn item() -> Value {
        json!({
            "object_number": "KMS1986",
            "titles": [
                {"title": "Sommeraften ved Skagen", "language": "da"},
                {"title": "Summer Evening at Skagen", "language": "en"}
            ],
            "production": [{"creator": "P.S. Krøyer", "date_start": "1892", "date_end": "1893"}],
            "techniques": ["Oil on canvas"],
            "notes": [{"note": "<p>Marie Krøyer on the beach.</p>"}],
            "image_thumbnail": "https://iip.smk.dk/thumb/KMS1986.jpg"
        })
    }

    #[test]
    fn test_record_mapping() {
        let p = to_record(&item()).unwrap();
        assert_eq!(p.title, "Summer Evening at Skagen");
        assert_eq!(p.artist, "P.S. Krøyer");
        assert_eq!(p.date_display.as_deref(), Some("1892-1893"));
        assert_eq!(p.medium.as_deref(), Some("Oil on canvas"));
        assert_eq!(p.description.as_deref(), Some("Marie Krøyer on the beach."));
        assert_eq!(p.image_url.as_deref(), Some("https://iip.smk.dk/native/KMS1986.jpg"));
        assert_eq!(p.museum_url.as_deref(), Some("https://open.smk.dk/artwork/image/KMS1986"));

        let same_year = json!({"date_start": "1900", "date_end": "1900"});
        assert_eq!(date_display(Some(&same_year)).as_deref(), Some("1900"));
        assert!(to_record(&json!({"titles": []})).is_none());
    }

    #[tokio::test]
    async fn test_search_and_get() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/art/search/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("keys".into(), "skagen".into()),
                Matcher::UrlEncoded("filters".into(), "[has_image:true]".into()),
                Matcher::UrlEncoded("offset".into(), "0".into()),
            ]))
            .with_status(200)
            .with_body(json!({"found": 9, "items": [item()]}).to_string())
            .create_async()
            .await;
        server
            .mock("GET", "/art/search/")
            .match_query(Matcher::UrlEncoded("filters".into(), "[object_number:KMS1986]".into()))
            .with_status(200)
            .with_body(json!({"found": 1, "items": [item()]}).to_string())
            .create_async()
            .await;

        let smk = source(&server);
        let page = smk.search("skagen", 1, 10).await.unwrap();
        assert_eq!(page.total, 9);
        assert_eq!(page.paintings.len(), 1);

        let p = smk.get("KMS1986").await.unwrap().unwrap();
        assert_eq!(p.external_id, "KMS1986");
        assert!(smk.get("x]").await.unwrap().is_none());
    }
}
