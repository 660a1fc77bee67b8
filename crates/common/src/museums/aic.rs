//! Art Institute of Chicago
//!
//! Public-domain artworks from `/artworks/search`; images come from the IIIF
//! server named in each response's `config` block.

use super::{clean_description, non_empty, strip_html, Museum, MuseumClient, MuseumSource, PaintingRecord, SourcePage};
use crate::config::MuseumsConfig;
use crate::errors::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

const FIELDS: &str = "id,title,artist_title,date_display,medium_display,dimensions,thumbnail,image_id,artwork_type_title,style_title,description";
const DETAIL_FIELDS: &str = "id,title,artist_title,date_display,medium_display,dimensions,thumbnail,image_id,artwork_type_title,style_title,description,provenance_text,publication_history,exhibition_history";

pub struct AicSource {
    client: MuseumClient,
    base_url: String,
    iiif_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Artwork>,
    #[serde(default)]
    pagination: Pagination,
    #[serde(default)]
    config: IiifConfig,
}

#[derive(Debug, Deserialize)]
struct DetailResponse {
    data: Artwork,
    #[serde(default)]
    config: IiifConfig,
}

#[derive(Debug, Default, Deserialize)]
struct Pagination {
    #[serde(default)]
    total: u64,
}

#[derive(Debug, Default, Deserialize)]
struct IiifConfig {
    iiif_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Artwork {
    id: u64,
    title: Option<String>,
    artist_title: Option<String>,
    date_display: Option<String>,
    medium_display: Option<String>,
    dimensions: Option<String>,
    image_id: Option<String>,
    artwork_type_title: Option<String>,
    style_title: Option<String>,
    description: Option<String>,
    #[serde(default)]
    provenance_text: Option<String>,
    #[serde(default)]
    publication_history: Option<String>,
    #[serde(default)]
    exhibition_history: Option<String>,
}

impl AicSource {
    pub fn new(client: MuseumClient, config: &MuseumsConfig) -> Self {
        Self {
            client,
            base_url: config.aic_base_url.trim_end_matches('/').to_string(),
            iiif_url: config.aic_iiif_url.trim_end_matches('/').to_string(),
        }
    }

    fn to_record(&self, artwork: Artwork, iiif_url: Option<&str>) -> PaintingRecord {
        let iiif = iiif_url.unwrap_or(&self.iiif_url).trim_end_matches('/');
        let image_id = non_empty(artwork.image_id);

        let description = clean_description(artwork.description.as_deref()).or_else(|| {
            let mut parts = Vec::new();
            if let Some(style) = artwork.style_title.as_deref().filter(|s| !s.is_empty()) {
                parts.push(format!("Style: {}.", style));
            }
            if let Some(kind) = artwork.artwork_type_title.as_deref().filter(|s| !s.is_empty()) {
                parts.push(format!("Type: {}.", kind));
            }
            (!parts.is_empty()).then(|| parts.join(" "))
        });

        let mut record = PaintingRecord::new(Museum::Aic, artwork.id.to_string())
            .title(artwork.title)
            .artist(artwork.artist_title);
        record.date_display = non_empty(artwork.date_display);
        record.medium = non_empty(artwork.medium_display);
        record.dimensions = non_empty(artwork.dimensions);
        record.description = description;
        record.image_url = image_id
            .as_ref()
            .map(|id| format!("{}/{}/full/1686,/0/default.jpg", iiif, id));
        record.thumbnail_url = image_id
            .as_ref()
            .map(|id| format!("{}/{}/full/400,/0/default.jpg", iiif, id));
        record.museum_url = Some(format!("https://www.artic.edu/artworks/{}", artwork.id));
        record.metadata = json!({
            "style": artwork.style_title.unwrap_or_default(),
            "artwork_type": artwork.artwork_type_title.unwrap_or_default(),
            "provenance": artwork.provenance_text.as_deref().map(strip_html).unwrap_or_default(),
            "publications": artwork.publication_history.as_deref().map(strip_html).unwrap_or_default(),
            "exhibitions": artwork.exhibition_history.as_deref().map(strip_html).unwrap_or_default(),
        });
        record
    }
}

#[async_trait]
impl MuseumSource for AicSource {
    fn museum(&self) -> Museum {
        Museum::Aic
    }

    async fn search(&self, query: &str, page: u64, limit: u64) -> Result<SourcePage> {
        let url = format!("{}/artworks/search", self.base_url);
        let params = [
            ("q", query.to_string()),
            ("query[term][is_public_domain]", "true".to_string()),
            ("fields", FIELDS.to_string()),
            ("page", page.to_string()),
            ("limit", limit.to_string()),
        ];

        let response: SearchResponse = self.client.get_json(Museum::Aic, &url, &params).await?;
        let iiif = response.config.iiif_url;

        let paintings = response
            .data
            .into_iter()
            .filter(|a| a.image_id.as_deref().is_some_and(|id| !id.is_empty()))
            .map(|a| self.to_record(a, iiif.as_deref()))
            .collect();

        Ok(SourcePage {
            paintings,
            total: response.pagination.total,
        })
    }

    async fn get(&self, external_id: &str) -> Result<Option<PaintingRecord>> {
        if external_id.is_empty() || !external_id.chars().all(|c| c.is_ascii_digit()) {
            return Ok(None);
        }

        let url = format!("{}/artworks/{}", self.base_url, external_id);
        let params = [("fields", DETAIL_FIELDS.to_string())];

        let response: Option<DetailResponse> = self
            .client
            .get_json_optional(Museum::Aic, &url, &params)
            .await?;

        Ok(response.map(|r| self.to_record(r.data, r.config.iiif_url.as_deref())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::time::Duration;

    fn source(server: &mockito::ServerGuard) -> AicSource {
        let mut config = MuseumsConfig::default();
        config.aic_base_url = server.url();
        AicSource::new(MuseumClient::uncached(Duration::from_secs(5)).unwrap(), &config)
    }

    #[tokio::test]
    async fn test_search_maps_and_drops_imageless() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/artworks/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "seurat".into()),
                Matcher::UrlEncoded("query[term][is_public_domain]".into(), "true".into()),
                Matcher::UrlEncoded("page".into(), "1".into()),
            ]))
            .with_status(200)
            .with_body(
                json!({
                    "pagination": {"total": 42},
                    "config": {"iiif_url": "https://iiif.example/iiif/2"},
                    "data": [
                        {
                            "id": 27992,
                            "title": "A Sunday on La Grande Jatte",
                            "artist_title": "Georges Seurat",
                            "date_display": "1884-86",
                            "image_id": "abc",
                            "style_title": "Pointillism",
                            "artwork_type_title": "Painting",
                            "description": null
                        },
                        {"id": 1, "title": "No image", "image_id": null}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let page = source(&server).search("seurat", 1, 20).await.unwrap();
        assert_eq!(page.total, 42);
        assert_eq!(page.paintings.len(), 1);

        let p = &page.paintings[0];
        assert_eq!(p.external_id, "27992");
        assert_eq!(p.artist, "Georges Seurat");
        assert_eq!(p.description.as_deref(), Some("Style: Pointillism. Type: Painting."));
        assert_eq!(
            p.image_url.as_deref(),
            Some("https://iiif.example/iiif/2/abc/full/1686,/0/default.jpg")
        );
        assert_eq!(
            p.thumbnail_url.as_deref(),
            Some("https://iiif.example/iiif/2/abc/full/400,/0/default.jpg")
        );
        assert_eq!(p.museum_url.as_deref(), Some("https://www.artic.edu/artworks/27992"));
    }

    #[tokio::test]
    async fn test_get_strips_html_and_handles_missing() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/artworks/111628")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                json!({
                    "data": {
                        "id": 111628,
                        "title": "Nighthawks",
                        "artist_title": "Edward Hopper",
                        "image_id": "831a05de",
                        "description": "<p>A diner <em>at night</em>.</p>",
                        "provenance_text": "<b>Purchased</b> 1942"
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;
        server
            .mock("GET", "/artworks/5")
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let aic = source(&server);
        let p = aic.get("111628").await.unwrap().unwrap();
        assert_eq!(p.description.as_deref(), Some("A diner at night."));
        assert_eq!(p.metadata["provenance"], "Purchased 1942");
        // No config block: falls back to the configured IIIF server
        assert!(p.image_url.unwrap().starts_with("https://www.artic.edu/iiif/2/831a05de/"));

        assert!(aic.get("5").await.unwrap().is_none());
        assert!(aic.get("../etc").await.unwrap().is_none());
    }
}
