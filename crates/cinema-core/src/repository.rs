//! Catalog repository
//!
//! [`MediaRepository`] is the interface the loader fetches through. The HTTP
//! implementation on [`CinemaClient`] is the only place that knows the
//! backend's wire format; records leave it fully typed with proxied covers.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::client::{proxied_cover_url, CinemaClient};
use crate::error::Result;
use crate::types::{DownloadLinks, ListQuery, MediaRecord, MediaType};

/// Source of catalog records
///
/// Implementations perform network calls and may fail; the loader turns
/// failures into user-visible messages.
#[async_trait]
pub trait MediaRepository: Send + Sync {
    /// Fetch one page of the listing. Fewer than `query.count` items means
    /// the end of the data was reached.
    async fn list_media(&self, media_type: MediaType, query: &ListQuery) -> Result<Vec<MediaRecord>>;

    /// Fetch every record whose name matches `name`, unpaginated
    async fn search_media(&self, media_type: MediaType, name: &str) -> Result<Vec<MediaRecord>>;

    /// Distinct area facet values
    async fn list_areas(&self, media_type: MediaType) -> Result<Vec<String>>;

    /// Distinct category facet values
    async fn list_categories(&self, media_type: MediaType) -> Result<Vec<String>>;
}

/// Record as served by the backend. Columns are nullable in the catalog
/// database, so every field is optional here.
#[derive(Debug, Default, Deserialize)]
struct RawMediaRecord {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    cover: Option<String>,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    area: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    duration: Option<String>,
    #[serde(default)]
    director: Option<String>,
    #[serde(default)]
    actors: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    download_link: Value,
}

impl RawMediaRecord {
    fn into_record(self, media_type: MediaType, base_url: &str) -> MediaRecord {
        let name = self.name.unwrap_or_default();
        let download_links = decode_download_links(media_type, self.download_link)
            .unwrap_or_else(|e| {
                tracing::warn!(name = %name, error = %e, "Discarding malformed download links");
                DownloadLinks::empty(media_type)
            });

        MediaRecord {
            id: self.id.unwrap_or_default(),
            cover: proxied_cover_url(base_url, self.cover.as_deref().unwrap_or_default()),
            name,
            score: self.score.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            release_date: self.release_date.unwrap_or_default(),
            area: self.area.unwrap_or_default(),
            language: self.language.unwrap_or_default(),
            duration: self.duration.unwrap_or_default(),
            director: self.director.filter(|d| !d.trim().is_empty()),
            actors: self.actors.unwrap_or_default(),
            summary: self.summary.unwrap_or_default(),
            source: self.source.unwrap_or_default(),
            download_links,
        }
    }
}

/// Facet values wrapped in the backend's `{"data": [...]}` envelope
#[derive(Debug, Default, Deserialize)]
struct FacetList {
    #[serde(default)]
    data: Option<Vec<String>>,
}

impl FacetList {
    fn into_values(self) -> Vec<String> {
        self.data.unwrap_or_default()
    }
}

/// Decode the `download_link` column into the variant dictated by `media_type`.
///
/// The movie endpoint serves the link map as a JSON-encoded string while the
/// show endpoint serves the decoded object; both are accepted. Null or blank
/// values yield an empty map.
pub fn decode_download_links(media_type: MediaType, value: Value) -> Result<DownloadLinks> {
    let value = match value {
        Value::Null => return Ok(DownloadLinks::empty(media_type)),
        Value::String(encoded) if encoded.trim().is_empty() => {
            return Ok(DownloadLinks::empty(media_type));
        }
        Value::String(encoded) => serde_json::from_str(&encoded)?,
        other => other,
    };

    Ok(match media_type {
        MediaType::Movie => DownloadLinks::Movie(serde_json::from_value(value)?),
        MediaType::TvShow => DownloadLinks::TvShow(serde_json::from_value(value)?),
    })
}

impl CinemaClient {
    async fn fetch_records(
        &self,
        media_type: MediaType,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<MediaRecord>> {
        let raw: Vec<RawMediaRecord> = self.get_json(path, query).await?;
        Ok(raw
            .into_iter()
            .map(|record| record.into_record(media_type, self.base_url()))
            .collect())
    }
}

#[async_trait]
impl MediaRepository for CinemaClient {
    async fn list_media(&self, media_type: MediaType, query: &ListQuery) -> Result<Vec<MediaRecord>> {
        let path = format!("/{}/list", media_type.as_path());
        // The backend numbers pages from 1
        let params = [
            ("page", (query.page + 1).to_string()),
            ("count", query.count.to_string()),
            ("sort_by", query.sort.sort_by.as_str().to_string()),
            ("sort_order", query.sort.sort_order.as_str().to_string()),
            ("area", query.area.clone()),
            ("category", query.category.clone()),
        ];
        self.fetch_records(media_type, &path, &params).await
    }

    async fn search_media(&self, media_type: MediaType, name: &str) -> Result<Vec<MediaRecord>> {
        let path = format!("/{}/search", media_type.as_path());
        self.fetch_records(media_type, &path, &[("name", name.to_string())])
            .await
    }

    async fn list_areas(&self, media_type: MediaType) -> Result<Vec<String>> {
        let path = format!("/{}/areas", media_type.as_path());
        let facets: FacetList = self.get_json(&path, &[]).await?;
        Ok(facets.into_values())
    }

    async fn list_categories(&self, media_type: MediaType) -> Result<Vec<String>> {
        let path = format!("/{}/categories", media_type.as_path());
        let facets: FacetList = self.get_json(&path, &[]).await?;
        Ok(facets.into_values())
    }
}
