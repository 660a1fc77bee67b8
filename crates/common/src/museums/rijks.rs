//! Rijksmuseum
//!
//! The Rijksmuseum has no keyless search API, so the paintings set is pulled
//! once over OAI-PMH (EDM records, paged by resumption token) and searched in
//! memory.

use super::{clean_description, Museum, MuseumClient, MuseumSource, PaintingRecord, SourcePage, UNKNOWN_ARTIST};
use crate::config::MuseumsConfig;
use crate::db::page_offset;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use tokio::sync::OnceCell;
use tracing::{info, warn};

pub struct RijksSource {
    client: MuseumClient,
    oai_url: String,
    set: String,
    max_pages: u32,
    catalogue: OnceCell<Vec<PaintingRecord>>,
}

impl RijksSource {
    pub fn new(client: MuseumClient, config: &MuseumsConfig) -> Self {
        Self {
            client,
            oai_url: config.rijks_oai_url.clone(),
            set: config.rijks_set.clone(),
            max_pages: config.rijks_max_pages,
            catalogue: OnceCell::new(),
        }
    }

    /// The in-memory catalogue, loaded on first use
    async fn catalogue(&self) -> Result<&[PaintingRecord]> {
        self.catalogue
            .get_or_try_init(|| self.load_catalogue())
            .await
            .map(Vec::as_slice)
    }

    async fn load_catalogue(&self) -> Result<Vec<PaintingRecord>> {
        info!(set = %self.set, max_pages = self.max_pages, "Loading Rijksmuseum catalogue over OAI-PMH");

        let mut paintings = Vec::new();
        let mut token: Option<String> = None;

        for page in 0..self.max_pages {
            let params = match token.take() {
                Some(token) => vec![
                    ("verb", "ListRecords".to_string()),
                    ("resumptionToken", token),
                ],
                None => vec![
                    ("verb", "ListRecords".to_string()),
                    ("metadataPrefix", "edm".to_string()),
                    ("set", self.set.clone()),
                ],
            };

            let parsed = match self
                .client
                .get_text(Museum::Rijks, &self.oai_url, &params)
                .await
                .and_then(|body| parse_list_records(&body))
            {
                Ok(parsed) => parsed,
                // Keep what was loaded so far
                Err(e) if page > 0 => {
                    warn!(page, error = %e, "Stopping Rijksmuseum catalogue load early");
                    break;
                }
                Err(e) => return Err(e),
            };

            paintings.extend(parsed.records.into_iter().filter(|r| r.image_url.is_some()));

            match parsed.resumption_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        info!(count = paintings.len(), "Rijksmuseum catalogue loaded");
        Ok(paintings)
    }
}

#[async_trait]
impl MuseumSource for RijksSource {
    fn museum(&self) -> Museum {
        Museum::Rijks
    }

    async fn search(&self, query: &str, page: u64, limit: u64) -> Result<SourcePage> {
        let needle = query.trim().to_lowercase();
        let catalogue = self.catalogue().await?;

        let matches: Vec<&PaintingRecord> = catalogue
            .iter()
            .filter(|p| {
                p.title.to_lowercase().contains(&needle)
                    || p.artist.to_lowercase().contains(&needle)
                    || p.description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            })
            .collect();

        let start = usize::try_from(page_offset(page, limit)).unwrap_or(usize::MAX);
        let paintings = matches
            .iter()
            .skip(start)
            .take(limit as usize)
            .map(|p| (*p).clone())
            .collect();

        Ok(SourcePage {
            paintings,
            total: matches.len() as u64,
        })
    }

    async fn get(&self, external_id: &str) -> Result<Option<PaintingRecord>> {
        let catalogue = self.catalogue().await?;
        Ok(catalogue.iter().find(|p| p.external_id == external_id).cloned())
    }

    async fn full_catalogue(&self) -> Result<Option<Vec<PaintingRecord>>> {
        Ok(Some(self.catalogue().await?.to_vec()))
    }
}

/// One `ListRecords` response
#[derive(Debug, Default)]
pub(crate) struct OaiPage {
    pub records: Vec<PaintingRecord>,
    pub resumption_token: Option<String>,
}

/// Text slots collected while walking a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    HeaderId,
    Title,
    Description,
    Created,
    ObjectNumber,
    Extent,
    CreatorName,
    AgentLabel,
    DescriptionLabel,
    ResumptionToken,
}

/// Language-tagged values gathered from one EDM record
#[derive(Debug, Default)]
struct RawRecord {
    header_id: String,
    titles: Vec<(String, String)>,
    descriptions: Vec<(String, String)>,
    created: Vec<(String, String)>,
    extents: Vec<(String, String)>,
    object_number: Option<String>,
    creator_ref: Option<String>,
    creator_name: Option<String>,
    object_image: Option<String>,
    shown_by_image: Option<String>,
    agent_labels: HashMap<String, Vec<(String, String)>>,
    description_labels: HashMap<String, String>,
}

/// English value if there is one, otherwise the first non-empty value
fn prefer_english(values: &[(String, String)]) -> Option<String> {
    values
        .iter()
        .find(|(lang, text)| lang == "en" && !text.is_empty())
        .or_else(|| values.iter().find(|(_, text)| !text.is_empty()))
        .map(|(_, text)| text.clone())
}

impl RawRecord {
    fn into_painting(self) -> Option<PaintingRecord> {
        let title = prefer_english(&self.titles)?;

        let external_id = self
            .object_number
            .clone()
            .filter(|n| !n.is_empty())
            .or_else(|| self.header_id.rsplit('/').next().map(str::to_string))
            .filter(|id| !id.is_empty())?;

        let artist = self
            .creator_ref
            .as_ref()
            .and_then(|r| {
                self.agent_labels
                    .get(r)
                    .and_then(|labels| prefer_english(labels))
                    .or_else(|| self.description_labels.get(r).cloned())
            })
            .or(self.creator_name.clone())
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());

        let dimensions: Vec<&str> = self
            .extents
            .iter()
            .filter(|(lang, text)| lang == "en" && !text.is_empty())
            .map(|(_, text)| text.as_str())
            .take(2)
            .collect();

        let image_url = self
            .object_image
            .clone()
            .or(self.shown_by_image.clone())
            .filter(|u| !u.is_empty());

        let mut record = PaintingRecord::new(Museum::Rijks, external_id).title(Some(title)).artist(Some(artist));
        record.date_display = prefer_english(&self.created);
        record.dimensions = (!dimensions.is_empty()).then(|| dimensions.join("; "));
        record.description = clean_description(prefer_english(&self.descriptions).as_deref());
        record.thumbnail_url = image_url.as_ref().map(|u| u.replace("/full/max/", "/full/400,/"));
        record.image_url = image_url;
        record.museum_url = self
            .object_number
            .as_ref()
            .filter(|n| !n.is_empty())
            .map(|n| format!("https://www.rijksmuseum.nl/en/collection/{}", n));
        Some(record)
    }
}

/// Attribute values by local name (`lang`, `resource`, `about`)
fn attribute(e: &BytesStart<'_>, local: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == local)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn parse_error(e: impl std::fmt::Display) -> AppError {
    AppError::Upstream {
        museum: Museum::Rijks.to_string(),
        message: format!("OAI-PMH parse error: {}", e),
    }
}

/// Streaming state while walking a `ListRecords` document
#[derive(Default)]
struct OaiParser {
    page: OaiPage,
    current: Option<RawRecord>,
    in_header: bool,
    in_cho: bool,
    in_aggregation: bool,
    in_shown_by: bool,
    agent: Option<String>,
    description: Option<String>,
    slot: Option<(Slot, String)>,
    text: String,
}

impl OaiParser {
    fn open(&mut self, e: &BytesStart<'_>, is_empty: bool) {
        let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
        let lang = attribute(e, b"lang").unwrap_or_default();

        if name == "resumptionToken" && !is_empty {
            self.capture(Slot::ResumptionToken, lang);
            return;
        }

        let Some(record) = self.current.as_mut() else {
            if name == "record" && !is_empty {
                self.current = Some(RawRecord::default());
            }
            return;
        };

        let target = match name.as_str() {
            "header" => {
                self.in_header = !is_empty;
                None
            }
            "identifier" if self.in_header => Some(Slot::HeaderId),
            "ProvidedCHO" => {
                self.in_cho = !is_empty;
                None
            }
            "Aggregation" => {
                self.in_aggregation = !is_empty;
                None
            }
            "isShownBy" if self.in_aggregation => {
                self.in_shown_by = !is_empty;
                if let Some(url) = attribute(e, b"resource") {
                    record.shown_by_image.get_or_insert(url);
                }
                None
            }
            "WebResource" if self.in_shown_by => {
                if let Some(url) = attribute(e, b"about") {
                    record.shown_by_image.get_or_insert(url);
                }
                None
            }
            "object" if self.in_aggregation => {
                if let Some(url) = attribute(e, b"resource") {
                    record.object_image.get_or_insert(url);
                }
                None
            }
            "creator" if self.in_cho => match attribute(e, b"resource") {
                Some(reference) => {
                    record.creator_ref.get_or_insert(reference);
                    None
                }
                None => Some(Slot::CreatorName),
            },
            "title" if self.in_cho => Some(Slot::Title),
            "description" if self.in_cho => Some(Slot::Description),
            "created" if self.in_cho => Some(Slot::Created),
            "identifier" if self.in_cho => Some(Slot::ObjectNumber),
            "extent" if self.in_cho => Some(Slot::Extent),
            "Agent" if !is_empty => {
                self.agent = attribute(e, b"about");
                None
            }
            "Description" if !is_empty => {
                self.description = attribute(e, b"about");
                None
            }
            "prefLabel" if self.agent.is_some() => Some(Slot::AgentLabel),
            "prefLabel" if self.description.is_some() => Some(Slot::DescriptionLabel),
            _ => None,
        };

        if let (Some(target), false) = (target, is_empty) {
            self.capture(target, lang);
        }
    }

    fn capture(&mut self, slot: Slot, lang: String) {
        self.slot = Some((slot, lang));
        self.text.clear();
    }

    fn capturing(&self) -> bool {
        self.slot.is_some()
    }

    fn close(&mut self, name: &[u8]) {
        if let Some((target, lang)) = self.slot.take() {
            let value = self.text.trim().to_string();
            self.text.clear();
            self.store(target, lang, value);
        }

        match name {
            b"record" => {
                if let Some(painting) = self.current.take().and_then(RawRecord::into_painting) {
                    self.page.records.push(painting);
                }
                self.in_header = false;
                self.in_cho = false;
                self.in_aggregation = false;
                self.in_shown_by = false;
                self.agent = None;
                self.description = None;
            }
            b"header" => self.in_header = false,
            b"ProvidedCHO" => self.in_cho = false,
            b"Aggregation" => self.in_aggregation = false,
            b"isShownBy" => self.in_shown_by = false,
            b"Agent" => self.agent = None,
            b"Description" => self.description = None,
            _ => {}
        }
    }

    fn store(&mut self, target: Slot, lang: String, value: String) {
        if target == Slot::ResumptionToken {
            self.page.resumption_token = Some(value).filter(|t| !t.is_empty());
            return;
        }

        let Some(record) = self.current.as_mut() else {
            return;
        };

        match target {
            Slot::HeaderId => record.header_id = value,
            Slot::Title => record.titles.push((lang, value)),
            Slot::Description => record.descriptions.push((lang, value)),
            Slot::Created => record.created.push((lang, value)),
            Slot::Extent => record.extents.push((lang, value)),
            Slot::ObjectNumber => {
                record.object_number.get_or_insert(value);
            }
            Slot::CreatorName => {
                record.creator_name.get_or_insert(value);
            }
            Slot::AgentLabel => {
                if let Some(about) = self.agent.clone() {
                    record.agent_labels.entry(about).or_default().push((lang, value));
                }
            }
            Slot::DescriptionLabel => {
                if let Some(about) = self.description.clone() {
                    record.description_labels.entry(about).or_insert(value);
                }
            }
            Slot::ResumptionToken => {}
        }
    }
}

/// Parse an OAI-PMH `ListRecords` document in the EDM metadata format
pub(crate) fn parse_list_records(xml: &str) -> Result<OaiPage> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut parser = OaiParser::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf).map_err(parse_error)? {
            Event::Start(e) => parser.open(&e, false),
            Event::Empty(e) => parser.open(&e, true),
            Event::Text(e) => {
                if parser.capturing() {
                    let text = e.unescape().map_err(parse_error)?;
                    parser.text.push_str(&text);
                }
            }
            Event::CData(e) => {
                if parser.capturing() {
                    parser.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(e) => parser.close(e.local_name().as_ref()),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(parser.page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::time::Duration;

    fn record_xml(object_number: &str, title_en: &str, image: &str) -> String {
        format!(
            r#"<record>
  <header><identifier>https://id.rijksmuseum.nl/200{n}</identifier></header>
  <metadata>
    <rdf:RDF>
      <edm:ProvidedCHO rdf:about="https://id.rijksmuseum.nl/200{n}">
        <dc:title xml:lang="nl">Nederlandse titel</dc:title>
        <dc:title xml:lang="en">{title}</dc:title>
        <dc:description xml:lang="en">A &lt;b&gt;famous&lt;/b&gt; militia piece</dc:description>
        <dcterms:created xml:lang="en">1642</dcterms:created>
        <dc:identifier>{n}</dc:identifier>
        <dcterms:extent xml:lang="en">height 379.5 cm</dcterms:extent>
        <dcterms:extent xml:lang="en">width 453.5 cm</dcterms:extent>
        <dcterms:extent xml:lang="en">depth 1 cm</dcterms:extent>
        <dc:creator rdf:resource="https://id.rijksmuseum.nl/agent/1"/>
      </edm:ProvidedCHO>
      <edm:Agent rdf:about="https://id.rijksmuseum.nl/agent/1">
        <skos:prefLabel xml:lang="nl">Rembrandt van Rijn (NL)</skos:prefLabel>
        <skos:prefLabel xml:lang="en">Rembrandt van Rijn</skos:prefLabel>
      </edm:Agent>
      <ore:Aggregation rdf:about="agg">
        <edm:object rdf:resource="{image}"/>
      </ore:Aggregation>
    </rdf:RDF>
  </metadata>
</record>"#,
            n = object_number,
            title = title_en,
            image = image
        )
    }

    fn document(records: &[String], token: Option<&str>) -> String {
        let token = token
            .map(|t| format!("<resumptionToken>{}</resumptionToken>", t))
            .unwrap_or_else(|| "<resumptionToken/>".to_string());
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/"
  xmlns:dc="http://purl.org/dc/elements/1.1/"
  xmlns:dcterms="http://purl.org/dc/terms/"
  xmlns:edm="http://www.europeana.eu/schemas/edm/"
  xmlns:ore="http://www.openarchives.org/ore/terms/"
  xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
  xmlns:skos="http://www.w3.org/2004/02/skos/core#">
<ListRecords>{}{}</ListRecords>
</OAI-PMH>"#,
            records.join("\n"),
            token
        )
    }

    #[test]
    fn test_parse_record_prefers_english_and_resolves_agent() {
        let xml = document(
            &[record_xml(
                "SK-C-5",
                "The Night Watch",
                "https://iiif.micr.io/abc/full/max/0/default.jpg",
            )],
            Some("next-page"),
        );

        let page = parse_list_records(&xml).unwrap();
        assert_eq!(page.resumption_token.as_deref(), Some("next-page"));
        assert_eq!(page.records.len(), 1);

        let p = &page.records[0];
        assert_eq!(p.external_id, "SK-C-5");
        assert_eq!(p.title, "The Night Watch");
        assert_eq!(p.artist, "Rembrandt van Rijn");
        assert_eq!(p.date_display.as_deref(), Some("1642"));
        assert_eq!(p.dimensions.as_deref(), Some("height 379.5 cm; width 453.5 cm"));
        assert_eq!(p.description.as_deref(), Some("A famous militia piece"));
        assert_eq!(
            p.thumbnail_url.as_deref(),
            Some("https://iiif.micr.io/abc/full/400,/0/default.jpg")
        );
        assert_eq!(
            p.museum_url.as_deref(),
            Some("https://www.rijksmuseum.nl/en/collection/SK-C-5")
        );
    }

    #[test]
    fn test_parse_skips_untitled_and_reads_empty_token() {
        let untitled = r#"<record><header><identifier>x/1</identifier></header>
            <metadata><edm:ProvidedCHO><dc:identifier>SK-A-1</dc:identifier></edm:ProvidedCHO></metadata></record>"#;
        let page = parse_list_records(&document(&[untitled.to_string()], None)).unwrap();
        assert!(page.records.is_empty());
        assert!(page.resumption_token.is_none());

        assert!(parse_list_records("<a><b></a>").is_err());
    }

    #[tokio::test]
    async fn test_catalogue_follows_resumption_tokens_once() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("GET", "/oai")
            .match_query(Matcher::UrlEncoded("set".into(), "261208".into()))
            .with_status(200)
            .with_body(document(
                &[record_xml("SK-C-5", "The Night Watch", "https://img.example/1/full/max/0.jpg")],
                Some("t1"),
            ))
            .expect(1)
            .create_async()
            .await;
        let second = server
            .mock("GET", "/oai")
            .match_query(Matcher::UrlEncoded("resumptionToken".into(), "t1".into()))
            .with_status(200)
            .with_body(document(
                &[
                    record_xml("SK-A-2344", "The Milkmaid", "https://img.example/2/full/max/0.jpg"),
                    record_xml("SK-A-0", "No image", ""),
                ],
                None,
            ))
            .expect(1)
            .create_async()
            .await;

        let mut config = MuseumsConfig::default();
        config.rijks_oai_url = format!("{}/oai", server.url());
        let rijks = RijksSource::new(MuseumClient::uncached(Duration::from_secs(5)).unwrap(), &config);

        let hits = rijks.search("milkmaid", 1, 20).await.unwrap();
        assert_eq!(hits.total, 1);
        assert_eq!(hits.paintings[0].external_id, "SK-A-2344");

        let by_artist = rijks.search("REMBRANDT", 1, 1).await.unwrap();
        assert_eq!(by_artist.total, 2);
        assert_eq!(by_artist.paintings.len(), 1);

        assert!(rijks.get("SK-C-5").await.unwrap().is_some());
        assert!(rijks.get("SK-A-0").await.unwrap().is_none());
        assert_eq!(rijks.full_catalogue().await.unwrap().map(|c| c.len()), Some(2));

        first.assert_async().await;
        second.assert_async().await;
    }
}
