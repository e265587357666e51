//! Paginated media-list loader
//!
//! [`MediaListLoader`] owns the paging, search, sort and facet state of one
//! catalog (movies or TV shows) and exposes it to a view layer through
//! [`MediaListLoader::snapshot`].
//!
//! At most one list/search fetch is outstanding per loader. Every reset bumps
//! a generation counter; a response issued under an older generation is
//! discarded, and the task that owned it immediately reloads for the current
//! query instead.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::Result;
use crate::repository::MediaRepository;
use crate::types::{
    AreaUpdate, CategoryUpdate, FacetState, ListQuery, LoadMode, LoaderSnapshot, MediaRecord,
    MediaType, PageState, QueryState, SortUpdate,
};

/// Message shown when a page fails to load
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load media, please try again later";

/// Message shown when a search fails
pub const SEARCH_FAILED_MESSAGE: &str = "Search failed, please try again later";

/// Loader tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Items requested per page (default: 36)
    pub page_size: u32,
    /// How long `load_more` stays closed after a page settles (default: 200)
    pub preload_cooldown_ms: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            page_size: 36,
            preload_cooldown_ms: 200,
        }
    }
}

/// Why an operation did not fetch anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Another fetch is outstanding
    InFlight,
    /// The page is already part of the list
    AlreadyLoaded,
    /// The last page has been reached (or loading stopped after a failure)
    NoMore,
    /// Search results are not paginated
    Searching,
    /// `load_more` is cooling down after the previous page
    Cooldown,
    /// The query did not change
    Unchanged,
}

/// Result of a loader operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A fetch completed and its records were applied
    Loaded {
        /// Number of records returned
        count: usize,
    },
    /// Nothing was fetched
    Skipped(SkipReason),
    /// The state was reset while another fetch was outstanding; that fetch's
    /// owner reloads once it settles
    Deferred,
    /// The fetch failed; the message is now the loader's error
    Failed(String),
}

/// Gate that keeps one scroll gesture from triggering two `load_more` calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PreloadGate {
    Open,
    Held,
    CoolingUntil(Instant),
}

impl PreloadGate {
    fn is_closed(&self, now: Instant) -> bool {
        match self {
            PreloadGate::Open => false,
            PreloadGate::Held => true,
            PreloadGate::CoolingUntil(until) => now < *until,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum FetchKind {
    Page { query: ListQuery, append: bool },
    Search { query: String },
}

/// A fetch about to be issued, tagged with the generation it belongs to
#[derive(Debug, Clone)]
struct Fetch {
    media_type: MediaType,
    generation: u64,
    kind: FetchKind,
}

#[derive(Debug)]
struct LoaderState {
    media_type: MediaType,
    query: QueryState,
    pages: PageState,
    facets: FacetState,
    loading: bool,
    error: Option<String>,
    generation: u64,
    reload_requested: bool,
    preload: PreloadGate,
}

impl LoaderState {
    fn new(media_type: MediaType) -> Self {
        Self {
            media_type,
            query: QueryState::default(),
            pages: PageState::default(),
            facets: FacetState::default(),
            loading: false,
            error: None,
            generation: 0,
            reload_requested: false,
            preload: PreloadGate::Open,
        }
    }

    /// Invalidate the accumulated pages; responses already in flight become stale.
    fn invalidate(&mut self) {
        self.pages.reset();
        self.generation += 1;
    }

    fn list_query(&self, page: u32, count: u32) -> ListQuery {
        ListQuery {
            page,
            count,
            sort: self.query.sort,
            area: self.query.area.area.clone(),
            category: self.query.category.category.clone(),
        }
    }

    fn begin(&mut self, kind: FetchKind) -> Fetch {
        self.loading = true;
        self.error = None;
        Fetch {
            media_type: self.media_type,
            generation: self.generation,
            kind,
        }
    }

    /// The fetch that repopulates the list for the current query
    fn begin_reload(&mut self, page_size: u32) -> Fetch {
        let kind = match self.query.mode() {
            LoadMode::Browsing => FetchKind::Page {
                query: self.list_query(0, page_size),
                append: false,
            },
            LoadMode::Searching => FetchKind::Search {
                query: self.query.search_query.clone(),
            },
        };
        self.begin(kind)
    }

    /// Start the reload after a reset, or hand it to the outstanding fetch.
    fn reload_after_reset(&mut self, page_size: u32) -> Option<Fetch> {
        if self.loading {
            self.reload_requested = true;
            None
        } else {
            Some(self.begin_reload(page_size))
        }
    }

    fn settle(&mut self, fetch: &Fetch, result: Result<Vec<MediaRecord>>) -> Option<LoadOutcome> {
        if fetch.generation != self.generation || fetch.media_type != self.media_type {
            tracing::debug!(
                media_type = fetch.media_type.as_path(),
                generation = fetch.generation,
                current = self.generation,
                "Discarding stale response"
            );
            return None;
        }

        let outcome = match (&fetch.kind, result) {
            (FetchKind::Page { query, append }, Ok(records)) => {
                let count = records.len();
                if *append {
                    self.pages.items.extend(records);
                } else {
                    self.pages.items = records;
                    self.pages.loaded_pages.clear();
                }
                self.pages.page = query.page;
                self.pages.loaded_pages.insert(query.page);
                self.pages.has_more = count >= query.count as usize;
                tracing::debug!(
                    media_type = fetch.media_type.as_path(),
                    page = query.page,
                    count,
                    has_more = self.pages.has_more,
                    "Page loaded"
                );
                LoadOutcome::Loaded { count }
            }
            (FetchKind::Search { query }, Ok(records)) => {
                let count = records.len();
                self.pages.items = records;
                self.pages.page = 0;
                self.pages.loaded_pages.clear();
                self.pages.has_more = false;
                tracing::debug!(
                    media_type = fetch.media_type.as_path(),
                    query = %query,
                    count,
                    "Search finished"
                );
                LoadOutcome::Loaded { count }
            }
            (kind, Err(e)) => {
                let message = match kind {
                    FetchKind::Page { .. } => LOAD_FAILED_MESSAGE,
                    FetchKind::Search { .. } => SEARCH_FAILED_MESSAGE,
                };
                tracing::warn!(
                    media_type = fetch.media_type.as_path(),
                    error = %e,
                    "{}",
                    message
                );
                self.error = Some(message.to_string());
                self.pages.has_more = false;
                LoadOutcome::Failed(message.to_string())
            }
        };
        Some(outcome)
    }
}

/// Loading controller for one media list
///
/// All operations are async and return once the fetch they started has
/// settled, or immediately when they were skipped.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use cinema_core::{CinemaClient, LoaderConfig, MediaListLoader, MediaType};
///
/// # async fn example() -> Result<(), cinema_core::CinemaError> {
/// let client = Arc::new(CinemaClient::new()?);
/// let loader = MediaListLoader::new(client, MediaType::Movie, LoaderConfig::default());
///
/// loader.set_type(MediaType::Movie).await;
/// loader.load_more().await;
/// println!("{} movies", loader.snapshot().await.items.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MediaListLoader<R> {
    repository: Arc<R>,
    config: LoaderConfig,
    state: Mutex<LoaderState>,
}

impl<R: MediaRepository> MediaListLoader<R> {
    /// Create an idle loader. Nothing is fetched until an operation runs.
    pub fn new(repository: Arc<R>, media_type: MediaType, config: LoaderConfig) -> Self {
        Self {
            repository,
            config,
            state: Mutex::new(LoaderState::new(media_type)),
        }
    }

    /// Media type currently listed
    pub async fn media_type(&self) -> MediaType {
        self.state.lock().await.media_type
    }

    /// Copy of everything the view renders
    pub async fn snapshot(&self) -> LoaderSnapshot {
        let state = self.state.lock().await;
        LoaderSnapshot {
            media_type: state.media_type,
            mode: state.query.mode(),
            items: state.pages.items.clone(),
            page: state.pages.page,
            has_more: state.pages.has_more,
            loading: state.loading,
            error: state.error.clone(),
            query: state.query.clone(),
            facets: state.facets.clone(),
        }
    }

    /// Switch to `media_type`, reset every piece of state to its default and
    /// load the first page.
    pub async fn set_type(&self, media_type: MediaType) -> LoadOutcome {
        let fetch = {
            let mut state = self.state.lock().await;
            state.media_type = media_type;
            state.query = QueryState::default();
            state.facets = FacetState::default();
            state.error = None;
            state.preload = PreloadGate::Open;
            state.invalidate();
            state.reload_after_reset(self.config.page_size)
        };
        tracing::info!(media_type = media_type.as_path(), "Media type selected");

        match fetch {
            Some(fetch) => self.run(fetch).await,
            None => LoadOutcome::Deferred,
        }
    }

    /// Fetch one page of the listing, appending it to or replacing the
    /// current items.
    pub async fn load(&self, page: u32, append: bool) -> LoadOutcome {
        let fetch = {
            let mut state = self.state.lock().await;
            if let Err(reason) = Self::check_page_load(&state, page, append) {
                tracing::debug!(page, append, ?reason, "Skipping page load");
                return LoadOutcome::Skipped(reason);
            }
            let query = state.list_query(page, self.config.page_size);
            state.begin(FetchKind::Page { query, append })
        };
        self.run(fetch).await
    }

    fn check_page_load(
        state: &LoaderState,
        page: u32,
        append: bool,
    ) -> std::result::Result<(), SkipReason> {
        if state.loading {
            return Err(SkipReason::InFlight);
        }
        if state.query.mode() == LoadMode::Searching {
            return Err(SkipReason::Searching);
        }
        if append && state.pages.loaded_pages.contains(&page) && !state.reload_requested {
            return Err(SkipReason::AlreadyLoaded);
        }
        Ok(())
    }

    /// Search by name. A blank query returns to browsing from page 0 with
    /// the current sort and facet filters.
    pub async fn search(&self, query: &str) -> LoadOutcome {
        let query = query.trim().to_string();
        let fetch = {
            let mut state = self.state.lock().await;
            state.query.search_query = query;
            state.invalidate();
            state.reload_after_reset(self.config.page_size)
        };

        match fetch {
            Some(fetch) => self.run(fetch).await,
            None => LoadOutcome::Deferred,
        }
    }

    /// Append the next page. Meant to be called from a viewport trigger;
    /// repeated calls while a page is loading or cooling down are ignored.
    pub async fn load_more(&self) -> LoadOutcome {
        let fetch = {
            let mut state = self.state.lock().await;
            let skip = if state.loading {
                Some(SkipReason::InFlight)
            } else if !state.pages.has_more {
                Some(SkipReason::NoMore)
            } else if state.query.mode() == LoadMode::Searching {
                Some(SkipReason::Searching)
            } else if state.preload.is_closed(Instant::now()) {
                Some(SkipReason::Cooldown)
            } else {
                None
            };
            if let Some(reason) = skip {
                return LoadOutcome::Skipped(reason);
            }

            let next = if state.pages.loaded_pages.is_empty() {
                0
            } else {
                state.pages.page + 1
            };
            if let Err(reason) = Self::check_page_load(&state, next, true) {
                return LoadOutcome::Skipped(reason);
            }
            state.preload = PreloadGate::Held;
            let query = state.list_query(next, self.config.page_size);
            state.begin(FetchKind::Page {
                query,
                append: true,
            })
        };

        let outcome = self.run(fetch).await;

        let mut state = self.state.lock().await;
        if state.preload == PreloadGate::Held {
            let cooldown = Duration::from_millis(self.config.preload_cooldown_ms);
            state.preload = PreloadGate::CoolingUntil(Instant::now() + cooldown);
        }
        outcome
    }

    /// Merge a sort change; reloads from page 0 if the sort actually changed.
    pub async fn set_sort(&self, update: SortUpdate) -> LoadOutcome {
        self.change_query(|query| {
            let merged = query.sort.merged(update);
            let changed = merged != query.sort;
            query.sort = merged;
            changed
        })
        .await
    }

    /// Merge an area filter change; reloads from page 0 if it changed.
    pub async fn set_area(&self, update: AreaUpdate) -> LoadOutcome {
        self.change_query(|query| {
            let merged = query.area.merged(update);
            let changed = merged != query.area;
            query.area = merged;
            changed
        })
        .await
    }

    /// Merge a category filter change; reloads from page 0 if it changed.
    pub async fn set_category(&self, update: CategoryUpdate) -> LoadOutcome {
        self.change_query(|query| {
            let merged = query.category.merged(update);
            let changed = merged != query.category;
            query.category = merged;
            changed
        })
        .await
    }

    async fn change_query<F>(&self, apply: F) -> LoadOutcome
    where
        F: FnOnce(&mut QueryState) -> bool,
    {
        let fetch = {
            let mut state = self.state.lock().await;
            if !apply(&mut state.query) {
                return LoadOutcome::Skipped(SkipReason::Unchanged);
            }
            tracing::debug!(query = ?state.query, "Query changed, reloading");
            state.invalidate();
            state.reload_after_reset(self.config.page_size)
        };

        match fetch {
            Some(fetch) => self.run(fetch).await,
            None => LoadOutcome::Deferred,
        }
    }

    /// Fetch the area and category values for the current media type.
    ///
    /// Failures are logged and leave the corresponding list empty; they do
    /// not touch the list error.
    pub async fn load_facets(&self) {
        let media_type = {
            let mut state = self.state.lock().await;
            state.facets.loading = true;
            state.media_type
        };

        let (areas, categories) = tokio::join!(
            self.repository.list_areas(media_type),
            self.repository.list_categories(media_type)
        );

        let mut state = self.state.lock().await;
        if state.media_type != media_type {
            tracing::debug!(
                media_type = media_type.as_path(),
                "Discarding facets of a previous media type"
            );
            return;
        }
        state.facets.areas = areas.unwrap_or_else(|e| {
            tracing::warn!(media_type = media_type.as_path(), error = %e, "Failed to load areas");
            Vec::new()
        });
        state.facets.categories = categories.unwrap_or_else(|e| {
            tracing::warn!(media_type = media_type.as_path(), error = %e, "Failed to load categories");
            Vec::new()
        });
        state.facets.loading = false;
    }

    /// Execute `fetch`, then keep reloading for as long as resets arrived
    /// while a fetch was outstanding. Clears the in-flight flag on exit.
    async fn run(&self, mut fetch: Fetch) -> LoadOutcome {
        loop {
            tracing::debug!(
                media_type = fetch.media_type.as_path(),
                generation = fetch.generation,
                kind = ?fetch.kind,
                "Fetching"
            );
            let result = match &fetch.kind {
                FetchKind::Page { query, .. } => {
                    self.repository.list_media(fetch.media_type, query).await
                }
                FetchKind::Search { query } => {
                    self.repository.search_media(fetch.media_type, query).await
                }
            };

            let mut state = self.state.lock().await;
            let outcome = state.settle(&fetch, result);
            if state.reload_requested {
                state.reload_requested = false;
                fetch = state.begin_reload(self.config.page_size);
                continue;
            }
            state.loading = false;
            // Stale and nothing left to reload: none of our records were applied
            return outcome.unwrap_or(LoadOutcome::Deferred);
        }
    }
}
