//! Metropolitan Museum of Art
//!
//! Search returns bare object ids; each page of ids is resolved through
//! `/objects/{id}`. Detail lookups also read the curatorial text from the
//! object's web page, which the API does not carry.

use super::{non_empty, strip_html, Museum, MuseumClient, MuseumSource, PaintingRecord, SourcePage};
use crate::config::MuseumsConfig;
use crate::db::page_offset;
use crate::errors::Result;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use regex_lite::Regex;
use serde::Deserialize;
use serde_json::json;
use std::sync::OnceLock;
use tracing::debug;

/// Concurrent object lookups per search page
const OBJECT_FETCH_CONCURRENCY: usize = 4;

/// Shorter page blocks are labels and captions, not descriptions
const MIN_PAGE_DESCRIPTION_CHARS: usize = 100;

pub struct MetSource {
    client: MuseumClient,
    base_url: String,
    department_id: u32,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default, rename = "objectIDs")]
    object_ids: Option<Vec<u64>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct MetObject {
    #[serde(rename = "objectID")]
    object_id: u64,
    title: String,
    artist_display_name: String,
    artist_display_bio: String,
    artist_nationality: String,
    artist_begin_date: String,
    artist_end_date: String,
    object_date: String,
    medium: String,
    dimensions: String,
    primary_image: String,
    primary_image_small: String,
    #[serde(rename = "objectURL")]
    object_url: String,
    department: String,
    culture: String,
    period: String,
    classification: String,
    credit_line: String,
    country: String,
}

impl MetSource {
    pub fn new(client: MuseumClient, config: &MuseumsConfig) -> Self {
        Self {
            client,
            base_url: config.met_base_url.trim_end_matches('/').to_string(),
            department_id: config.met_department_id,
        }
    }

    async fn fetch_object(&self, object_id: &str) -> Result<Option<MetObject>> {
        let url = format!("{}/objects/{}", self.base_url, object_id);
        self.client.get_json_optional(Museum::Met, &url, &[]).await
    }

    /// Curatorial text from the object page, `None` on any failure
    async fn page_description(&self, object_url: &str) -> Option<String> {
        match self.client.get_text(Museum::Met, object_url, &[]).await {
            Ok(html) => longest_safe_html_block(&html),
            Err(e) => {
                debug!(url = %object_url, error = %e, "Met object page unavailable");
                None
            }
        }
    }
}

/// Longest `SafeHtml` block on an object page, stripped of markup
fn longest_safe_html_block(html: &str) -> Option<String> {
    static SAFE_HTML: OnceLock<Option<Regex>> = OnceLock::new();
    let pattern = SAFE_HTML
        .get_or_init(|| Regex::new(r#"(?s)data-sentry-element="SafeHtml"[^>]*>(.*?)</div>"#).ok())
        .as_ref()?;

    pattern
        .captures_iter(html)
        .filter_map(|c| c.get(1))
        .map(|m| strip_html(m.as_str()))
        .filter(|text| text.chars().count() > MIN_PAGE_DESCRIPTION_CHARS)
        .max_by_key(|text| text.chars().count())
}

/// Artist bio, culture/period, unusual classification and credit line
fn describe(object: &MetObject) -> Option<String> {
    let mut parts = Vec::new();

    if !object.artist_display_bio.is_empty() {
        parts.push(object.artist_display_bio.clone());
    }

    match (object.culture.is_empty(), object.period.is_empty()) {
        (false, false) => parts.push(format!("{}, {}.", object.culture, object.period)),
        (false, true) => parts.push(format!("{}.", object.culture)),
        (true, false) => parts.push(format!("{}.", object.period)),
        (true, true) => {}
    }

    let classification = object.classification.to_lowercase();
    if !classification.is_empty() && classification != "paintings" && classification != "painting" {
        parts.push(format!("Classification: {}.", object.classification));
    }

    if !object.credit_line.is_empty() {
        parts.push(object.credit_line.clone());
    }

    (!parts.is_empty()).then(|| parts.join(" "))
}

fn to_record(object: MetObject) -> PaintingRecord {
    let description = describe(&object);

    let mut record = PaintingRecord::new(Museum::Met, object.object_id.to_string())
        .title(Some(object.title))
        .artist(Some(object.artist_display_name));
    record.date_display = non_empty(Some(object.object_date));
    record.medium = non_empty(Some(object.medium));
    record.dimensions = non_empty(Some(object.dimensions));
    record.description = description;
    record.image_url = non_empty(Some(object.primary_image));
    record.thumbnail_url = non_empty(Some(object.primary_image_small)).or_else(|| record.image_url.clone());
    record.museum_url = non_empty(Some(object.object_url));
    record.metadata = json!({
        "department": object.department,
        "culture": object.culture,
        "period": object.period,
        "creditLine": object.credit_line,
        "country": object.country,
        "artistNationality": object.artist_nationality,
        "artistBeginDate": object.artist_begin_date,
        "artistEndDate": object.artist_end_date,
    });
    record
}

#[async_trait]
impl MuseumSource for MetSource {
    fn museum(&self) -> Museum {
        Museum::Met
    }

    async fn search(&self, query: &str, page: u64, limit: u64) -> Result<SourcePage> {
        let url = format!("{}/search", self.base_url);
        let params = [
            ("q", query.to_string()),
            ("hasImages", "true".to_string()),
            ("departmentId", self.department_id.to_string()),
        ];

        let response: SearchResponse = self.client.get_json(Museum::Met, &url, &params).await?;
        let ids = response.object_ids.unwrap_or_default();
        let total = ids.len() as u64;

        let start = usize::try_from(page_offset(page, limit)).unwrap_or(usize::MAX);
        let page_ids: Vec<String> = ids
            .into_iter()
            .skip(start)
            .take(limit as usize)
            .map(|id| id.to_string())
            .collect();

        let paintings = stream::iter(page_ids)
            .map(|id| async move {
                match self.fetch_object(&id).await {
                    Ok(object) => object,
                    Err(e) => {
                        debug!(object_id = %id, error = %e, "Skipping Met object");
                        None
                    }
                }
            })
            .buffered(OBJECT_FETCH_CONCURRENCY)
            .filter_map(|object| std::future::ready(object.map(to_record)))
            .filter(|record| std::future::ready(record.image_url.is_some()))
            .collect()
            .await;

        Ok(SourcePage { paintings, total })
    }

    async fn get(&self, external_id: &str) -> Result<Option<PaintingRecord>> {
        if external_id.is_empty() || !external_id.chars().all(|c| c.is_ascii_digit()) {
            return Ok(None);
        }

        let Some(mut record) = self.fetch_object(external_id).await?.map(to_record) else {
            return Ok(None);
        };

        if let Some(url) = record.museum_url.clone() {
            if let Some(description) = self.page_description(&url).await {
                record.description = Some(description);
            }
        }

        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::time::Duration;

    fn source(server: &mockito::ServerGuard) -> MetSource {
        let mut config = MuseumsConfig::default();
        config.met_base_url = server.url();
        MetSource::new(MuseumClient::uncached(Duration::from_secs(5)).unwrap(), &config)
    }

    fn object(id: u64, image: &str) -> String {
        object_at(id, image, &format!("https://www.metmuseum.org/art/collection/search/{}", id))
    }

    fn object_at(id: u64, image: &str, object_url: &str) -> String {
        json!({
            "objectID": id,
            "title": format!("Object {}", id),
            "artistDisplayName": "Claude Monet",
            "artistDisplayBio": "French, Paris 1840-1926 Giverny",
            "culture": "",
            "period": "",
            "classification": "Paintings",
            "creditLine": "Bequest of H. O. Havemeyer, 1929",
            "primaryImage": image,
            "primaryImageSmall": "",
            "objectURL": object_url
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_search_pages_ids_and_resolves_objects() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "monet".into()),
                Matcher::UrlEncoded("departmentId".into(), "11".into()),
            ]))
            .with_status(200)
            .with_body(json!({"total": 4, "objectIDs": [1, 2, 3, 4]}).to_string())
            .create_async()
            .await;
        server
            .mock("GET", "/objects/3")
            .with_status(200)
            .with_body(object(3, "https://images.example/3.jpg"))
            .create_async()
            .await;
        server
            .mock("GET", "/objects/4")
            .with_status(200)
            .with_body(object(4, ""))
            .create_async()
            .await;

        let page = source(&server).search("monet", 2, 2).await.unwrap();
        assert_eq!(page.total, 4);
        // Object 4 has no image and is dropped
        assert_eq!(page.paintings.len(), 1);

        let p = &page.paintings[0];
        assert_eq!(p.external_id, "3");
        assert_eq!(p.thumbnail_url, p.image_url);
        assert_eq!(
            p.description.as_deref(),
            Some("French, Paris 1840-1926 Giverny Bequest of H. O. Havemeyer, 1929")
        );
    }

    #[tokio::test]
    async fn test_search_without_hits() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({"total": 0, "objectIDs": null}).to_string())
            .create_async()
            .await;

        let page = source(&server).search("zzz", 1, 20).await.unwrap();
        assert_eq!(page.total, 0);
        assert!(page.paintings.is_empty());
    }

    const CURATORIAL: &str = "Monet painted the water lily pond at Giverny again and again in his final decades, \
        dissolving the surface into reflections of sky and willow.";

    #[tokio::test]
    async fn test_get_prefers_object_page_description() {
        let mut server = mockito::Server::new_async().await;
        let page_url = format!("{}/art/collection/search/437127", server.url());
        server
            .mock("GET", "/objects/437127")
            .with_status(200)
            .with_body(object_at(437127, "https://images.example/437127.jpg", &page_url))
            .create_async()
            .await;
        server
            .mock("GET", "/art/collection/search/437127")
            .with_status(200)
            .with_body(format!(
                r#"<html><div data-sentry-element="SafeHtml" class="label">Oil on canvas</div>
                <div data-sentry-element="SafeHtml" data-x="1"><p>{}</p></div></html>"#,
                CURATORIAL
            ))
            .create_async()
            .await;

        let painting = source(&server).get("437127").await.unwrap().unwrap();
        assert_eq!(painting.description.as_deref(), Some(CURATORIAL));
    }

    #[tokio::test]
    async fn test_get_keeps_api_description_when_page_fails() {
        let mut server = mockito::Server::new_async().await;
        let page_url = format!("{}/art/collection/search/12", server.url());
        server
            .mock("GET", "/objects/12")
            .with_status(200)
            .with_body(object_at(12, "https://images.example/12.jpg", &page_url))
            .create_async()
            .await;
        server
            .mock("GET", "/art/collection/search/12")
            .with_status(500)
            .create_async()
            .await;

        let painting = source(&server).get("12").await.unwrap().unwrap();
        assert_eq!(
            painting.description.as_deref(),
            Some("French, Paris 1840-1926 Giverny Bequest of H. O. Havemeyer, 1929")
        );
        assert!(source(&server).get("abc").await.unwrap().is_none());
    }

    #[test]
    fn test_short_page_blocks_are_ignored() {
        let html = r#"<div data-sentry-element="SafeHtml">Short label</div>"#;
        assert!(longest_safe_html_block(html).is_none());
        assert!(longest_safe_html_block("").is_none());
    }

    #[test]
    fn test_describe_culture_and_classification() {
        let object = MetObject {
            culture: "Dutch".into(),
            period: "Golden Age".into(),
            classification: "Drawings".into(),
            ..Default::default()
        };
        assert_eq!(
            describe(&object).as_deref(),
            Some("Dutch, Golden Age. Classification: Drawings.")
        );
        assert!(describe(&MetObject::default()).is_none());
    }
}
