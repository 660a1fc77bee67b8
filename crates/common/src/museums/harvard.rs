//! Harvard Art Museums (requires an API key)

use super::{clean_description, non_empty, Museum, MuseumClient, MuseumSource, PaintingRecord, SourcePage};
use crate::config::MuseumsConfig;
use crate::errors::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

pub struct HarvardSource {
    client: MuseumClient,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    records: Vec<HarvardObject>,
    #[serde(default)]
    info: Info,
}

#[derive(Debug, Default, Deserialize)]
struct Info {
    #[serde(default)]
    totalrecords: u64,
}

#[derive(Debug, Deserialize)]
struct HarvardObject {
    id: u64,
    title: Option<String>,
    dated: Option<String>,
    medium: Option<String>,
    dimensions: Option<String>,
    description: Option<String>,
    commentary: Option<String>,
    primaryimageurl: Option<String>,
    url: Option<String>,
    department: Option<String>,
    culture: Option<String>,
    creditline: Option<String>,
    accessionumber: Option<String>,
    #[serde(default)]
    people: Option<Vec<Person>>,
}

#[derive(Debug, Deserialize)]
struct Person {
    name: Option<String>,
}

fn to_record(object: HarvardObject) -> PaintingRecord {
    let artist = object
        .people
        .and_then(|people| people.into_iter().next())
        .and_then(|p| p.name);
    let description = clean_description(object.description.as_deref())
        .or_else(|| clean_description(object.commentary.as_deref()));
    let image_url = non_empty(object.primaryimageurl);

    let mut record = PaintingRecord::new(Museum::Harvard, object.id.to_string())
        .title(object.title)
        .artist(artist);
    record.date_display = non_empty(object.dated);
    record.medium = non_empty(object.medium);
    record.dimensions = non_empty(object.dimensions);
    record.description = description;
    record.thumbnail_url = image_url.clone();
    record.image_url = image_url;
    record.museum_url = non_empty(object.url)
        .or_else(|| Some(format!("https://harvardartmuseums.org/collections/object/{}", object.id)));
    record.metadata = json!({
        "department": object.department.unwrap_or_default(),
        "culture": object.culture.unwrap_or_default(),
        "creditLine": object.creditline.unwrap_or_default(),
        "accession_number": object.accessionumber.unwrap_or_default(),
    });
    record
}

impl HarvardSource {
    pub fn new(client: MuseumClient, config: &MuseumsConfig) -> Self {
        Self {
            client,
            base_url: config.harvard_base_url.trim_end_matches('/').to_string(),
            api_key: config.harvard_api_key.clone().filter(|k| !k.is_empty()),
        }
    }
}

#[async_trait]
impl MuseumSource for HarvardSource {
    fn museum(&self) -> Museum {
        Museum::Harvard
    }

    fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    async fn search(&self, query: &str, page: u64, limit: u64) -> Result<SourcePage> {
        let Some(api_key) = &self.api_key else {
            return Ok(SourcePage::empty());
        };

        let url = format!("{}/object", self.base_url);
        let params = [
            ("apikey", api_key.clone()),
            ("q", query.to_string()),
            ("classification", "Paintings".to_string()),
            ("hasimage", "1".to_string()),
            ("size", limit.to_string()),
            ("page", page.to_string()),
        ];

        let response: SearchResponse = self.client.get_json(Museum::Harvard, &url, &params).await?;

        let paintings = response
            .records
            .into_iter()
            .map(to_record)
            .filter(|p| p.image_url.is_some())
            .collect();

        Ok(SourcePage {
            paintings,
            total: response.info.totalrecords,
        })
    }

    async fn get(&self, external_id: &str) -> Result<Option<PaintingRecord>> {
        let Some(api_key) = &self.api_key else {
            return Ok(None);
        };
        if external_id.is_empty() || !external_id.chars().all(|c| c.is_ascii_digit()) {
            return Ok(None);
        }

        let url = format!("{}/object/{}", self.base_url, external_id);
        let object: Option<HarvardObject> = self
            .client
            .get_json_optional(Museum::Harvard, &url, &[("apikey", api_key.clone())])
            .await?;

        Ok(object.map(to_record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::time::Duration;

    fn source(server: &mockito::ServerGuard, key: Option<&str>) -> HarvardSource {
        let mut config = MuseumsConfig::default();
        config.harvard_base_url = server.url();
        config.harvard_api_key = key.map(str::to_string);
        HarvardSource::new(MuseumClient::uncached(Duration::from_secs(5)).unwrap(), &config)
    }

    #[tokio::test]
    async fn test_without_key_is_disabled_and_silent() {
        let server = mockito::Server::new_async().await;
        let harvard = source(&server, None);

        assert!(!harvard.is_enabled());
        let page = harvard.search("monet", 1, 10).await.unwrap();
        assert_eq!(page.total, 0);
        assert!(harvard.get("299843").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_with_key() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/object")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("apikey".into(), "secret".into()),
                Matcher::UrlEncoded("classification".into(), "Paintings".into()),
            ]))
            .with_status(200)
            .with_body(
                json!({
                    "info": {"totalrecords": 12},
                    "records": [{
                        "id": 299843,
                        "title": "Self-Portrait Dedicated to Paul Gauguin",
                        "people": [{"name": "Vincent van Gogh"}],
                        "description": null,
                        "commentary": "<p>Painted in Arles.</p>",
                        "primaryimageurl": "https://nrs.example/urn-3:HUAM:1"
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let page = source(&server, Some("secret")).search("gogh", 1, 10).await.unwrap();
        assert_eq!(page.total, 12);
        let p = &page.paintings[0];
        assert_eq!(p.artist, "Vincent van Gogh");
        assert_eq!(p.description.as_deref(), Some("Painted in Arles."));
        assert_eq!(
            p.museum_url.as_deref(),
            Some("https://harvardartmuseums.org/collections/object/299843")
        );
    }
}
