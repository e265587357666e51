//! Home Cinema Tauri Integration
//!
//! This crate provides Tauri commands that drive the catalog loaders from a
//! Tauri 2.0 frontend. One loader is kept per media type, so the movie and
//! TV show lists page independently.
//!
//! # Usage
//!
//! ```rust,ignore
//! use cinema_tauri::CinemaState;
//! use tauri::Manager;
//!
//! fn main() {
//!     tauri::Builder::default()
//!         .setup(|app| {
//!             app.manage(CinemaState::from_env()?);
//!             Ok(())
//!         })
//!         .invoke_handler(tauri::generate_handler![
//!             cinema_tauri::commands::open_media_type,
//!             cinema_tauri::commands::load_more,
//!             cinema_tauri::commands::search_media,
//!             cinema_tauri::commands::set_sort,
//!             cinema_tauri::commands::set_area,
//!             cinema_tauri::commands::set_category,
//!             cinema_tauri::commands::load_facets,
//!             cinema_tauri::commands::media_snapshot,
//!         ])
//!         .run(tauri::generate_context!())
//!         .expect("error while running tauri application");
//! }
//! ```
//!
//! # Commands
//! - `open_media_type` - Reset a list and load its first page
//! - `load_more` - Append the next page (infinite scroll)
//! - `search_media` - Search by name, or return to browsing with a blank query
//! - `set_sort` / `set_area` / `set_category` - Change the listing filters
//! - `load_facets` - Load the area and category filter values
//! - `media_snapshot` - Current list state without fetching

pub mod commands;

use std::sync::Arc;

use cinema_core::{ClientConfig, CinemaClient, LoaderConfig, MediaListLoader, MediaType};

/// Environment variable overriding the backend base URL
pub const API_URL_ENV: &str = "CINEMA_API_URL";

/// Loaders for both catalogs, sharing one HTTP client.
///
/// This state is managed by Tauri. Each loader synchronizes itself, so
/// commands for the same list never run two fetches at once.
pub struct CinemaState {
    movies: MediaListLoader<CinemaClient>,
    shows: MediaListLoader<CinemaClient>,
}

impl CinemaState {
    /// Create a CinemaState with default configuration.
    ///
    /// # Errors
    /// Returns an error string if the HTTP client cannot be created.
    pub fn new() -> Result<Self, String> {
        Self::with_config(ClientConfig::default(), LoaderConfig::default())
    }

    /// Create a CinemaState, taking the backend URL from `CINEMA_API_URL`
    /// when it is set.
    ///
    /// # Errors
    /// Returns an error string if the URL is invalid.
    pub fn from_env() -> Result<Self, String> {
        let config = client_config_from(std::env::var(API_URL_ENV).ok());
        Self::with_config(config, LoaderConfig::default())
    }

    /// Create a CinemaState with custom configuration.
    ///
    /// # Errors
    /// Returns an error string if the HTTP client cannot be created.
    pub fn with_config(client: ClientConfig, loader: LoaderConfig) -> Result<Self, String> {
        let client = Arc::new(CinemaClient::with_config(client).map_err(|e| e.to_string())?);
        tracing::info!(base_url = client.base_url(), "Catalog client ready");
        Ok(Self {
            movies: MediaListLoader::new(client.clone(), MediaType::Movie, loader.clone()),
            shows: MediaListLoader::new(client, MediaType::TvShow, loader),
        })
    }

    /// Loader responsible for `media_type`.
    pub fn loader(&self, media_type: MediaType) -> &MediaListLoader<CinemaClient> {
        match media_type {
            MediaType::Movie => &self.movies,
            MediaType::TvShow => &self.shows,
        }
    }
}

fn client_config_from(base_url: Option<String>) -> ClientConfig {
    match base_url.filter(|url| !url.trim().is_empty()) {
        Some(base_url) => ClientConfig {
            base_url: base_url.trim().to_string(),
            ..ClientConfig::default()
        },
        None => ClientConfig::default(),
    }
}
