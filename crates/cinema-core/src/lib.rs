//! Home Cinema Catalog Core Library
//!
//! This crate provides the client side of the home cinema catalog: a typed
//! HTTP client for the catalog backend and the loader that pages, searches
//! and filters movie and TV show lists for a view layer.
//!
//! # Features
//! - Paged browsing with sort, area and category filters
//! - One-shot search by name
//! - Infinite scrolling with single-flight fetches and stale-response discard
//! - Rate-limited HTTP client with retry on transient errors

pub mod client;
pub mod error;
pub mod loader;
pub mod repository;
pub mod types;
pub mod viewport;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types for convenience
pub use client::{proxied_cover_url, ClientConfig, CinemaClient, RateLimiter};
pub use error::{CinemaError, Result};
pub use loader::{LoadOutcome, LoaderConfig, MediaListLoader, SkipReason};
pub use repository::MediaRepository;
pub use types::{
    AreaUpdate, CategoryUpdate, DownloadLinks, Episode, LoadMode, LoaderSnapshot, MediaRecord,
    MediaType, QueryState, SortBy, SortConfig, SortOrder, SortUpdate,
};
pub use viewport::{Intersection, ViewportTrigger};
