//! Cleveland Museum of Art open access API

use super::{clean_description, non_empty, Museum, MuseumClient, MuseumSource, PaintingRecord, SourcePage};
use crate::config::MuseumsConfig;
use crate::db::page_offset;
use crate::errors::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

pub struct ClevelandSource {
    client: MuseumClient,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Artwork>,
    #[serde(default)]
    info: Info,
}

#[derive(Debug, Default, Deserialize)]
struct Info {
    #[serde(default)]
    total: u64,
}

#[derive(Debug, Deserialize)]
struct DetailResponse {
    data: Artwork,
}

#[derive(Debug, Deserialize)]
struct Artwork {
    id: u64,
    title: Option<String>,
    creation_date: Option<String>,
    technique: Option<String>,
    measurements: Option<String>,
    description: Option<String>,
    fun_fact: Option<String>,
    url: Option<String>,
    department: Option<String>,
    creditline: Option<String>,
    accession_number: Option<String>,
    #[serde(default)]
    culture: Value,
    #[serde(default)]
    creators: Vec<Creator>,
    #[serde(default)]
    images: Option<Images>,
}

#[derive(Debug, Deserialize)]
struct Creator {
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Images {
    web: Option<WebImage>,
}

#[derive(Debug, Deserialize)]
struct WebImage {
    url: Option<String>,
}

fn to_record(artwork: Artwork) -> PaintingRecord {
    let artist = artwork.creators.into_iter().next().and_then(|c| c.description);
    let image_url = artwork
        .images
        .and_then(|i| i.web)
        .and_then(|w| non_empty(w.url));

    let description: Vec<String> = [
        clean_description(artwork.description.as_deref()),
        non_empty(artwork.fun_fact),
    ]
    .into_iter()
    .flatten()
    .collect();

    let mut record = PaintingRecord::new(Museum::Cleveland, artwork.id.to_string())
        .title(artwork.title)
        .artist(artist);
    record.date_display = non_empty(artwork.creation_date);
    record.medium = non_empty(artwork.technique);
    record.dimensions = non_empty(artwork.measurements);
    record.description = (!description.is_empty()).then(|| description.join(" "));
    record.thumbnail_url = image_url.clone();
    record.image_url = image_url;
    record.museum_url = non_empty(artwork.url)
        .or_else(|| Some(format!("https://www.clevelandart.org/art/{}", artwork.id)));
    record.metadata = json!({
        "department": artwork.department.unwrap_or_default(),
        "culture": artwork.culture,
        "creditLine": artwork.creditline.unwrap_or_default(),
        "accession_number": artwork.accession_number.unwrap_or_default(),
    });
    record
}

impl ClevelandSource {
    pub fn new(client: MuseumClient, config: &MuseumsConfig) -> Self {
        Self {
            client,
            base_url: config.cleveland_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl MuseumSource for ClevelandSource {
    fn museum(&self) -> Museum {
        Museum::Cleveland
    }

    async fn search(&self, query: &str, page: u64, limit: u64) -> Result<SourcePage> {
        let url = format!("{}/artworks/", self.base_url);
        let params = [
            ("q", query.to_string()),
            ("has_image", "1".to_string()),
            ("limit", limit.to_string()),
            ("skip", page_offset(page, limit).to_string()),
        ];

        let response: SearchResponse = self.client.get_json(Museum::Cleveland, &url, &params).await?;

        let paintings = response
            .data
            .into_iter()
            .map(to_record)
            .filter(|p| p.image_url.is_some())
            .collect();

        Ok(SourcePage {
            paintings,
            total: response.info.total,
        })
    }

    async fn get(&self, external_id: &str) -> Result<Option<PaintingRecord>> {
        if external_id.is_empty() || !external_id.chars().all(|c| c.is_ascii_digit()) {
            return Ok(None);
        }

        let url = format!("{}/artworks/{}", self.base_url, external_id);
        let response: Option<DetailResponse> = self
            .client
            .get_json_optional(Museum::Cleveland, &url, &[])
            .await?;

        Ok(response.map(|r| to_record(r.data)))
    }
}
