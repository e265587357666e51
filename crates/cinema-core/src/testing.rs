//! In-memory repository for loader and viewport tests

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::error::{CinemaError, Result};
use crate::repository::MediaRepository;
use crate::types::{DownloadLinks, ListQuery, MediaRecord, MediaType};

/// A request the repository received
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    List(MediaType, ListQuery),
    Search(MediaType, String),
}

/// Serves pages out of a fixed dataset; searches return `search_results`.
#[derive(Default)]
pub(crate) struct ScriptedRepository {
    dataset: Vec<MediaRecord>,
    search_results: Vec<MediaRecord>,
    failing_pages: Mutex<HashSet<u32>>,
    fail_search: bool,
    fail_facets: bool,
    gate: Option<Arc<Semaphore>>,
    calls: Mutex<Vec<Call>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

pub(crate) fn record(name: &str) -> MediaRecord {
    MediaRecord {
        id: 0,
        name: name.to_string(),
        cover: String::new(),
        score: 0.0,
        category: String::new(),
        release_date: String::new(),
        area: String::new(),
        language: String::new(),
        duration: String::new(),
        director: None,
        actors: String::new(),
        summary: String::new(),
        source: String::new(),
        download_links: DownloadLinks::empty(MediaType::Movie),
    }
}

pub(crate) fn records(prefix: &str, n: usize) -> Vec<MediaRecord> {
    (0..n).map(|i| record(&format!("{}-{}", prefix, i))).collect()
}

pub(crate) fn names(items: &[MediaRecord]) -> Vec<&str> {
    items.iter().map(|r| r.name.as_str()).collect()
}

impl ScriptedRepository {
    pub(crate) fn with_dataset(dataset: Vec<MediaRecord>) -> Self {
        Self {
            dataset,
            ..Self::default()
        }
    }

    pub(crate) fn search_results(mut self, results: Vec<MediaRecord>) -> Self {
        self.search_results = results;
        self
    }

    pub(crate) fn failing_page(self, page: u32) -> Self {
        self.failing_pages.lock().unwrap().insert(page);
        self
    }

    pub(crate) fn failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    pub(crate) fn failing_facets(mut self) -> Self {
        self.fail_facets = true;
        self
    }

    /// Hold every list/search call until a permit is added to `gate`
    pub(crate) fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub(crate) fn heal_page(&self, page: u32) {
        self.failing_pages.lock().unwrap().remove(&page);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn list_pages(&self) -> Vec<u32> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::List(_, query) => Some(query.page),
                Call::Search(..) => None,
            })
            .collect()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Yield until `n` calls have been received
    pub(crate) async fn wait_for_calls(&self, n: usize) {
        while self.call_count() < n {
            tokio::task::yield_now().await;
        }
    }

    async fn enter(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

fn backend_failure() -> CinemaError {
    CinemaError::Api {
        status: 500,
        message: "internal error".to_string(),
    }
}

#[async_trait]
impl MediaRepository for ScriptedRepository {
    async fn list_media(&self, media_type: MediaType, query: &ListQuery) -> Result<Vec<MediaRecord>> {
        self.enter(Call::List(media_type, query.clone())).await;
        self.leave();

        if self.failing_pages.lock().unwrap().contains(&query.page) {
            return Err(backend_failure());
        }
        let start = (query.page as usize * query.count as usize).min(self.dataset.len());
        let end = (start + query.count as usize).min(self.dataset.len());
        Ok(self.dataset[start..end].to_vec())
    }

    async fn search_media(&self, media_type: MediaType, name: &str) -> Result<Vec<MediaRecord>> {
        self.enter(Call::Search(media_type, name.to_string())).await;
        self.leave();

        if self.fail_search {
            return Err(backend_failure());
        }
        Ok(self.search_results.clone())
    }

    async fn list_areas(&self, media_type: MediaType) -> Result<Vec<String>> {
        if self.fail_facets {
            return Err(backend_failure());
        }
        Ok(vec![format!("{}-area", media_type.as_path()), "US".to_string()])
    }

    async fn list_categories(&self, _media_type: MediaType) -> Result<Vec<String>> {
        if self.fail_facets {
            return Err(backend_failure());
        }
        Ok(vec!["Drama".to_string(), "Sci-Fi".to_string()])
    }
}
