//! SourceForge provider: per-project RSS file feed

use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use regex::{Captures, Regex};
use reqwest::Client;
use tracing::debug;

use crate::release::error::FetchError;
use crate::release::http;
use crate::release::provider::Provider;
use crate::release::status::Lookup;
use crate::release::types::{Release, ReleaseSet};

pub(crate) const DEFAULT_BASE_URL: &str = "https://sourceforge.net";

/// Versioned tarball under a project's files
///
/// Groups: 1 project, 2 sub-path (optional, ends with `/`), 3 artifact name, 4 version
static TARBALL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"https?://.*sourceforge.net/projects?/(.+)/files/(.+/)?(.+?)-([\d]+(?:.\d+)*\w*?)\.(?:zip|tar\..+z.*)(?:/download)?$",
    )
    .expect("valid SourceForge tarball regex")
});

/// Anything versioned under a project, with optional extra path segments
///
/// Groups: 1 project path (greedy up to the last `/`), 2 sub-path (optional),
/// 3 artifact name, 4 version
static PROJECT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"https?://.*sourceforge.net/projects?/(.+)/(?:files/)?(.+?/)?(.+?)-([\d]+(?:.\d+)*\w*?).+$",
    )
    .expect("valid SourceForge project regex")
});

/// Feed coordinates derived from a matched name
#[derive(Debug, Clone, PartialEq, Eq)]
struct FeedTarget {
    project: String,
    path: String,
    artifact: String,
}

impl FeedTarget {
    fn parse(name: &str) -> Option<Self> {
        if let Some(caps) = TARBALL_REGEX.captures(name) {
            return Some(Self {
                project: caps[1].to_string(),
                path: group(&caps, 2),
                artifact: caps[3].to_string(),
            });
        }
        // The loose grammar yields project and artifact in swapped positions
        let caps = PROJECT_REGEX.captures(name)?;
        Some(Self {
            project: caps[3].to_string(),
            path: group(&caps, 2),
            artifact: caps[1].to_string(),
        })
    }
}

fn group(caps: &Captures<'_>, index: usize) -> String {
    caps.get(index)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// SourceForge provider
pub struct SourceForgeProvider {
    client: Client,
    base_url: String,
}

impl Default for SourceForgeProvider {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL.to_string())
    }
}

impl SourceForgeProvider {
    pub fn new(base_url: String) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    fn feed_url(&self, target: &FeedTarget) -> String {
        format!(
            "{}/projects/{}/rss?path=/{}",
            self.base_url, target.project, target.path
        )
    }

    async fn fetch(&self, name: &str) -> Result<ReleaseSet, FetchError> {
        let target =
            FeedTarget::parse(name).ok_or_else(|| FetchError::InvalidName(name.to_string()))?;

        let url = self.feed_url(&target);
        let response = http::get(&self.client, &url, name).await?;
        let body = response.bytes().await?;

        let items = parse_feed(&body)?;
        let releases = convert(&items, &target.artifact);
        debug!(
            "Kept {} of {} feed items for {}",
            releases.len(),
            items.len(),
            target.project
        );

        if releases.is_empty() {
            return Err(FetchError::NoReleases(name.to_string()));
        }
        Ok(releases)
    }
}

/// One `channel > item` entry of the feed
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct FeedItem {
    link: String,
    pub_date: String,
}

impl FeedItem {
    /// Appends character data to the field named by `element`
    fn append(&mut self, element: &str, text: &str) {
        match element {
            "link" => self.link.push_str(text),
            "pubDate" => self.pub_date.push_str(text),
            _ => {}
        }
    }
}

/// Parses an RSS document into its items; the root element must be `rss`
fn parse_feed(xml: &[u8]) -> Result<Vec<FeedItem>, FetchError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut buf = Vec::new();
    let mut saw_root = false;
    let mut current_item: Option<FeedItem> = None;
    let mut current_element = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                match name.as_str() {
                    "rss" => saw_root = true,
                    "item" => current_item = Some(FeedItem::default()),
                    _ => {}
                }
                current_element = name;
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"item" {
                    if let Some(item) = current_item.take() {
                        items.push(item);
                    }
                }
                current_element.clear();
            }
            Ok(Event::Text(e)) => {
                if let Some(ref mut item) = current_item {
                    let text = e
                        .unescape()
                        .map_err(|e| FetchError::InvalidResponse(format!("XML text error: {}", e)))?;
                    item.append(&current_element, &text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(ref mut item) = current_item {
                    let raw = e.into_inner();
                    item.append(&current_element, &String::from_utf8_lossy(&raw));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(FetchError::InvalidResponse(format!(
                    "XML parse error: {}",
                    e
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    if !saw_root {
        return Err(FetchError::InvalidResponse(
            "feed has no <rss> root".to_string(),
        ));
    }
    Ok(items)
}

/// Keeps items whose link is a versioned tarball; everything else is skipped
fn convert(items: &[FeedItem], name: &str) -> ReleaseSet {
    let mut set = ReleaseSet::new(name);
    for item in items {
        let Some(caps) = TARBALL_REGEX.captures(&item.link) else {
            continue;
        };
        set.add(Release::new(
            name,
            &caps[4],
            item.link.as_str(),
            parse_pub_date(&item.pub_date),
        ));
    }
    set
}

/// Parses `pubDate` as RFC 2822, `None` when unparseable
///
/// SourceForge stamps feeds with the obsolete `UT` zone, which RFC 2822 parsing accepts as-is.
fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw.trim())
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

#[async_trait]
impl Provider for SourceForgeProvider {
    fn name(&self) -> &'static str {
        "SourceForge"
    }

    fn matches(&self, query: &str) -> Option<String> {
        TARBALL_REGEX
            .captures(query)
            .or_else(|| PROJECT_REGEX.captures(query))
            .map(|caps| caps[0].to_string())
    }

    async fn releases(&self, name: &str) -> Lookup {
        self.fetch(name).await.map_err(|e| e.fold(self.name()))
    }
}
