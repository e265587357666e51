//! Data types for the cinema catalog
//!
//! This module contains all the core data structures used throughout the library.
//! All types implement Serialize and Deserialize for JSON compatibility with Tauri.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Kind of catalog a loader works on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    /// Feature films
    #[serde(rename = "movie")]
    Movie,
    /// TV series
    #[serde(rename = "tvshow")]
    TvShow,
}

impl MediaType {
    /// Path segment used by the backend for this catalog
    pub fn as_path(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::TvShow => "tvshow",
        }
    }
}

/// Field the listing is ordered by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Release date
    #[default]
    Time,
    /// Rating score
    Score,
}

impl SortBy {
    /// Query parameter value understood by the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Time => "time",
            SortBy::Score => "score",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending
    Asc,
    /// Descending
    #[default]
    Desc,
}

impl SortOrder {
    /// Query parameter value understood by the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Sort settings of the listing (newest first by default)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    /// Field to sort by
    pub sort_by: SortBy,
    /// Sort direction
    pub sort_order: SortOrder,
}

/// Partial update of [`SortConfig`]; `None` keeps the current value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortUpdate {
    /// New sort field, `None` keeps the current one
    #[serde(default)]
    pub sort_by: Option<SortBy>,
    /// New sort direction, `None` keeps the current one
    #[serde(default)]
    pub sort_order: Option<SortOrder>,
}

impl SortConfig {
    /// Apply a partial update and return the merged config
    pub fn merged(self, update: SortUpdate) -> Self {
        Self {
            sort_by: update.sort_by.unwrap_or(self.sort_by),
            sort_order: update.sort_order.unwrap_or(self.sort_order),
        }
    }
}

/// Area facet filter; empty means "all areas"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaConfig {
    /// Area filter value, empty for all areas
    pub area: String,
}

/// Partial update of [`AreaConfig`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaUpdate {
    /// New area, `None` keeps the current one
    #[serde(default)]
    pub area: Option<String>,
}

impl AreaConfig {
    /// Apply a partial update and return the merged config
    pub fn merged(&self, update: AreaUpdate) -> Self {
        Self {
            area: update.area.unwrap_or_else(|| self.area.clone()),
        }
    }
}

/// Category facet filter; empty means "all categories"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Category filter value, empty for all categories
    pub category: String,
}

/// Partial update of [`CategoryConfig`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryUpdate {
    /// New category, `None` keeps the current one
    #[serde(default)]
    pub category: Option<String>,
}

impl CategoryConfig {
    /// Apply a partial update and return the merged config
    pub fn merged(&self, update: CategoryUpdate) -> Self {
        Self {
            category: update.category.unwrap_or_else(|| self.category.clone()),
        }
    }
}

/// Loader mode, derived from the search query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadMode {
    /// Paged listing honoring sort and facet filters
    Browsing,
    /// One-shot, unpaginated search by name
    Searching,
}

/// Everything the user can change about what is listed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryState {
    /// Trimmed free-text query; empty while browsing
    pub search_query: String,
    pub sort: SortConfig,
    pub area: AreaConfig,
    pub category: CategoryConfig,
}

impl QueryState {
    /// Current mode
    pub fn mode(&self) -> LoadMode {
        if self.search_query.is_empty() {
            LoadMode::Browsing
        } else {
            LoadMode::Searching
        }
    }
}

/// Parameters of one listing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Page number (0-based)
    pub page: u32,
    /// Requested page size
    pub count: u32,
    pub sort: SortConfig,
    pub area: String,
    pub category: String,
}

/// One episode of a TV show download source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    /// Episode label as published by the source
    pub name: String,
    /// Download link
    pub link: String,
}

/// Download links of a title, keyed by source name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "sources", rename_all = "snake_case")]
pub enum DownloadLinks {
    /// One link per source
    Movie(BTreeMap<String, String>),
    /// Ordered episode list per source
    TvShow(BTreeMap<String, Vec<Episode>>),
}

impl DownloadLinks {
    /// Empty link map for the given media type
    pub fn empty(media_type: MediaType) -> Self {
        match media_type {
            MediaType::Movie => DownloadLinks::Movie(BTreeMap::new()),
            MediaType::TvShow => DownloadLinks::TvShow(BTreeMap::new()),
        }
    }

    /// Source names in display order
    pub fn sources(&self) -> Vec<&str> {
        match self {
            DownloadLinks::Movie(map) => map.keys().map(String::as_str).collect(),
            DownloadLinks::TvShow(map) => map.keys().map(String::as_str).collect(),
        }
    }

    /// Whether no source is available
    pub fn is_empty(&self) -> bool {
        match self {
            DownloadLinks::Movie(map) => map.is_empty(),
            DownloadLinks::TvShow(map) => map.is_empty(),
        }
    }
}

/// A catalog entry as shown in the list and detail views
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRecord {
    /// Backend identifier
    pub id: i64,
    /// Display name, unique within a page
    pub name: String,
    /// Cover URL, already routed through the image proxy (empty if unknown)
    pub cover: String,
    /// Rating score on a 0-10 scale
    pub score: f64,
    /// Comma-joined category tags
    pub category: String,
    pub release_date: String,
    pub area: String,
    pub language: String,
    pub duration: String,
    pub director: Option<String>,
    pub actors: String,
    pub summary: String,
    /// Site the record was scraped from
    pub source: String,
    pub download_links: DownloadLinks,
}

impl MediaRecord {
    /// Category tags split out of the comma-joined category string
    pub fn categories(&self) -> Vec<&str> {
        self.category
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .collect()
    }
}

/// Accumulated pages of the current listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageState {
    /// Items of all loaded pages, in page order
    pub items: Vec<MediaRecord>,
    /// Last page that loaded successfully (0-based)
    pub page: u32,
    /// Whether another page may exist
    pub has_more: bool,
    /// Pages reflected in `items`
    pub loaded_pages: BTreeSet<u32>,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            page: 0,
            has_more: true,
            loaded_pages: BTreeSet::new(),
        }
    }
}

impl PageState {
    /// Drop everything and start over from page 0
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Facet values offered by the filter controls
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetState {
    pub areas: Vec<String>,
    pub categories: Vec<String>,
    pub loading: bool,
}

/// Everything a view layer needs to render the list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderSnapshot {
    pub media_type: MediaType,
    pub mode: LoadMode,
    pub items: Vec<MediaRecord>,
    pub page: u32,
    pub has_more: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub query: QueryState,
    pub facets: FacetState,
}
