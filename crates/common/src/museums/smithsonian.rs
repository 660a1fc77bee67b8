//! Smithsonian Open Access (requires an API key)
//!
//! Searches the `art_design` category; the owning unit code is mapped to a
//! museum name.

use super::{clean_description, non_empty, Museum, MuseumClient, MuseumSource, PaintingRecord, SourcePage};
use crate::config::MuseumsConfig;
use crate::db::page_offset;
use crate::errors::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

pub struct SmithsonianSource {
    client: MuseumClient,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    response: Option<SearchBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchBody {
    #[serde(default)]
    rows: Vec<Value>,
    #[serde(default)]
    row_count: u64,
}

#[derive(Debug, Deserialize)]
struct ContentEnvelope {
    response: Option<Value>,
}

/// Museum name for a Smithsonian unit code
pub fn unit_name(code: &str) -> String {
    match code {
        "SAAM" => "Smithsonian American Art Museum".to_string(),
        "NPG" => "National Portrait Gallery".to_string(),
        "HMSG" => "Hirshhorn Museum".to_string(),
        "FSG" => "Freer Gallery of Art".to_string(),
        "ACM" => "Anacostia Community Museum".to_string(),
        other => format!("Smithsonian ({})", other),
    }
}

fn text_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value.pointer(pointer).and_then(Value::as_str)
}

fn to_record(row: &Value) -> Option<PaintingRecord> {
    let id = non_empty(text_at(row, "/id").map(str::to_string))?;
    let content = row.get("content").cloned().unwrap_or(Value::Null);

    let title = text_at(&content, "/descriptiveNonRepeating/title/content").map(str::to_string);
    let image_url = text_at(&content, "/descriptiveNonRepeating/online_media/media/0/content").map(str::to_string);
    let artist = text_at(&content, "/indexedStructured/name/0").map(str::to_string);
    let date_display = text_at(&content, "/indexedStructured/date/0").map(str::to_string);
    let description = content
        .pointer("/freetext/notes")
        .and_then(Value::as_array)
        .and_then(|notes| notes.iter().find_map(|n| n.get("content").and_then(Value::as_str)));
    let unit = text_at(&content, "/descriptiveNonRepeating/unit_code").unwrap_or("Smithsonian");

    let mut record = PaintingRecord::new(Museum::Smithsonian, id)
        .title(title)
        .artist(artist);
    record.museum_name = unit_name(unit);
    record.date_display = non_empty(date_display);
    record.description = clean_description(description);
    record.image_url = non_empty(image_url);
    record.thumbnail_url = record.image_url.clone();
    record.museum_url = non_empty(text_at(&content, "/descriptiveNonRepeating/record_link").map(str::to_string));
    record.metadata = json!({
        "unit": unit,
        "data_source": text_at(&content, "/descriptiveNonRepeating/data_source").unwrap_or_default(),
    });
    Some(record)
}

impl SmithsonianSource {
    pub fn new(client: MuseumClient, config: &MuseumsConfig) -> Self {
        Self {
            client,
            base_url: config.smithsonian_base_url.trim_end_matches('/').to_string(),
            api_key: config.smithsonian_api_key.clone().filter(|k| !k.is_empty()),
        }
    }
}

#[async_trait]
impl MuseumSource for SmithsonianSource {
    fn museum(&self) -> Museum {
        Museum::Smithsonian
    }

    fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    async fn search(&self, query: &str, page: u64, limit: u64) -> Result<SourcePage> {
        let Some(api_key) = &self.api_key else {
            return Ok(SourcePage::empty());
        };

        let url = format!("{}/category/art_design/search", self.base_url);
        let params = [
            ("api_key", api_key.clone()),
            ("q", query.to_string()),
            ("rows", limit.to_string()),
            ("start", page_offset(page, limit).to_string()),
        ];

        let envelope: SearchEnvelope = self.client.get_json(Museum::Smithsonian, &url, &params).await?;
        let Some(body) = envelope.response else {
            return Ok(SourcePage::empty());
        };

        let paintings = body
            .rows
            .iter()
            .filter_map(to_record)
            .filter(|p| p.image_url.is_some())
            .collect();

        Ok(SourcePage {
            paintings,
            total: body.row_count,
        })
    }

    async fn get(&self, external_id: &str) -> Result<Option<PaintingRecord>> {
        let Some(api_key) = &self.api_key else {
            return Ok(None);
        };
        if external_id.is_empty()
            || !external_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
        {
            return Ok(None);
        }

        let url = format!("{}/content/{}", self.base_url, external_id);
        let envelope: Option<ContentEnvelope> = self
            .client
            .get_json_optional(Museum::Smithsonian, &url, &[("api_key", api_key.clone())])
            .await?;

        Ok(envelope.and_then(|e| e.response).and_then(|r| to_record(&r)))
    }
}
