//! Media catalog provider.
//!
//! The slot filler only needs two operations: items for a category and a
//! best-effort file-path lookup. `Catalog` is the seam; the production
//! implementation talks to a Jellyfin-style media server over HTTP and the
//! tests use stubs.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::RefCell;
use std::time::Duration;

/// Runtime assumed when the catalog reports none (minutes).
pub const DEFAULT_RUN_MINUTES: u32 = 30;

/// One playable item as seen by the schedule compiler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub duration_minutes: u32,
    pub file_path: Option<String>,
}

impl CatalogItem {
    /// Nominal runtime in minutes, never zero.
    pub fn run_minutes(&self) -> u32 {
        if self.duration_minutes == 0 {
            DEFAULT_RUN_MINUTES
        } else {
            self.duration_minutes
        }
    }
}

/// Convert media-server runtime ticks (10,000 ticks = 1 ms) to whole
/// minutes, falling back to the default for zero/unknown runtimes.
pub fn minutes_from_ticks(ticks: u64) -> u32 {
    let minutes = (ticks / (10_000 * 1_000 * 60)) as u32;
    if minutes == 0 {
        DEFAULT_RUN_MINUTES
    } else {
        minutes
    }
}

/// Drop repeated item ids, keeping first occurrence order.
pub fn dedup_by_id(items: Vec<CatalogItem>) -> Vec<CatalogItem> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.id.clone()))
        .collect()
}

/// Read-only view of the media library.
pub trait Catalog {
    /// All playable items for a category (genre or tag). An empty result
    /// is a normal, non-exceptional state — the caller skips the slot.
    fn items_by_category(&self, category: &str) -> Result<Vec<CatalogItem>>;

    /// Resolve the media file path for a single item, if the server
    /// knows one.
    fn file_path(&self, item_id: &str) -> Result<Option<String>>;
}

/// HTTP client for a Jellyfin-style media server.
pub struct MediaServerCatalog {
    url: String,
    client: reqwest::blocking::Client,
    // Resolved once per catalog instance.
    user_id: RefCell<Option<String>>,
}

impl MediaServerCatalog {
    pub fn new(url: &str, api_key: &str) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "X-Emby-Token",
            api_key
                .parse()
                .map_err(|_| Error::Config(format!("invalid api key '{api_key}'")))?,
        );
        headers.insert(
            "Accept",
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        let client = reqwest::blocking::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(MediaServerCatalog {
            url: url.trim_end_matches('/').to_string(),
            client,
            user_id: RefCell::new(None),
        })
    }

    fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Value> {
        let value = self
            .client
            .get(format!("{}{}", self.url, path))
            .query(params)
            .send()?
            .error_for_status()?
            .json()?;
        Ok(value)
    }

    fn user_id(&self) -> Result<String> {
        if let Some(id) = self.user_id.borrow().as_ref() {
            return Ok(id.clone());
        }
        let users = self.get("/Users", &[])?;
        let id = users
            .as_array()
            .and_then(|u| u.first())
            .and_then(|u| u["Id"].as_str())
            .ok_or_else(|| Error::MediaServer("no users found".to_string()))?
            .to_string();
        *self.user_id.borrow_mut() = Some(id.clone());
        Ok(id)
    }

    /// Query /Items filtered by one key ("Genres" or "Tags").
    fn items_where(&self, key: &str, value: &str) -> Result<Vec<CatalogItem>> {
        let user_id = self.user_id()?;
        let data = self.get(
            "/Items",
            &[
                ("UserId", user_id.as_str()),
                ("Recursive", "true"),
                ("IncludeItemTypes", "Movie,Episode"),
                (key, value),
                (
                    "Fields",
                    "Path,MediaSources,RunTimeTicks,CumulativeRunTimeTicks",
                ),
            ],
        )?;
        let items = data["Items"]
            .as_array()
            .map(|arr| arr.iter().map(parse_item).collect())
            .unwrap_or_default();
        Ok(dedup_by_id(items))
    }
}

/// Map one raw /Items entry to a `CatalogItem`.
fn parse_item(raw: &Value) -> CatalogItem {
    let ticks = raw["RunTimeTicks"]
        .as_u64()
        .or_else(|| raw["CumulativeRunTimeTicks"].as_u64())
        .unwrap_or(0);
    let file_path = raw["Path"]
        .as_str()
        .or_else(|| raw["MediaSources"][0]["Path"].as_str())
        .map(|s| s.to_string());
    CatalogItem {
        id: raw["Id"].as_str().unwrap_or_default().to_string(),
        name: raw["Name"].as_str().unwrap_or("Unknown").to_string(),
        duration_minutes: minutes_from_ticks(ticks),
        file_path,
    }
}

impl Catalog for MediaServerCatalog {
    /// A category can be a genre or a tag; genre is tried first.
    fn items_by_category(&self, category: &str) -> Result<Vec<CatalogItem>> {
        let by_genre = self.items_where("Genres", category)?;
        if !by_genre.is_empty() {
            return Ok(by_genre);
        }
        self.items_where("Tags", category)
    }

    fn file_path(&self, item_id: &str) -> Result<Option<String>> {
        let user_id = self.user_id()?;
        let item = self.get(&format!("/Users/{user_id}/Items/{item_id}"), &[])?;
        let path = item["Path"]
            .as_str()
            .or_else(|| item["MediaSources"][0]["Path"].as_str())
            .map(|s| s.to_string());
        Ok(path)
    }
}
