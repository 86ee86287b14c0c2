use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Kind of catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Movie => write!(f, "movie"),
            MediaKind::Tv => write!(f, "tv"),
        }
    }
}

/// Free-text associative fields, matched by substring only
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Associations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cast: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crew: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub companies: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub networks: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
}

/// A movie or TV show from the external catalog
///
/// Accepts the catalog's field names for both kinds: `title` or `name`,
/// `release_date` or `first_air_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaKind>,
    #[serde(alias = "name", default)]
    pub title: String,
    #[serde(alias = "first_air_date", default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u32,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_language: Option<String>,
    #[serde(default)]
    pub adult: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub show_type: Option<String>,
    #[serde(flatten)]
    pub associations: Associations,
}

impl ContentItem {
    /// Creates an item with the required catalog fields and nothing else
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            media_type: None,
            title: title.into(),
            release_date: None,
            genre_ids: Vec::new(),
            vote_average: 0.0,
            vote_count: 0,
            popularity: 0.0,
            original_language: None,
            adult: false,
            status: None,
            show_type: None,
            associations: Associations::default(),
        }
    }

    /// Parsed release (or first-air) date
    ///
    /// Accepts a bare `YYYY-MM-DD` or a longer ISO timestamp. Empty or
    /// malformed values yield `None`.
    pub fn date(&self) -> Option<NaiveDate> {
        let raw = self.release_date.as_deref()?.trim();
        let day = raw.get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }
}

/// One page of catalog results as the catalog API returns it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogPage {
    pub page: u32,
    #[serde(default)]
    pub results: Vec<ContentItem>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub total_results: Option<u64>,
}
