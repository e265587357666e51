//! Infinite-scroll trigger
//!
//! The view reports when the sentinel element at the end of the list enters
//! or leaves the viewport. [`ViewportTrigger`] turns that stream into
//! `load_more` calls, firing once per entry and staying quiet for a short
//! window while the sentinel remains visible. Pagination correctness is the
//! loader's business; this layer only thins out redundant triggers.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::loader::{LoadOutcome, MediaListLoader};
use crate::repository::MediaRepository;

/// Quiet window after a trigger while the sentinel stays visible
pub const DEFAULT_TRIGGER_COOLDOWN: Duration = Duration::from_millis(100);

/// Visibility change of the sentinel element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intersection {
    /// The sentinel is (still) inside the viewport
    Entered,
    /// The sentinel left the viewport
    Left,
}

/// Debounce state for viewport intersection events
#[derive(Debug, Clone)]
pub struct ViewportTrigger {
    cooldown: Duration,
    enabled: bool,
    suppressed_until: Option<Instant>,
}

impl Default for ViewportTrigger {
    fn default() -> Self {
        Self::new(DEFAULT_TRIGGER_COOLDOWN)
    }
}

impl ViewportTrigger {
    /// Create an enabled trigger with the given quiet window
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            enabled: true,
            suppressed_until: None,
        }
    }

    /// Enable or disable triggering; disabling forgets any pending quiet window.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.suppressed_until = None;
        }
    }

    /// Whether intersections currently fire
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Feed one event; returns whether `load_more` should be called.
    pub fn observe(&mut self, event: Intersection, now: Instant) -> bool {
        if !self.enabled {
            return false;
        }
        match event {
            Intersection::Left => {
                self.suppressed_until = None;
                false
            }
            Intersection::Entered => {
                if matches!(self.suppressed_until, Some(until) if now < until) {
                    return false;
                }
                self.suppressed_until = Some(now + self.cooldown);
                true
            }
        }
    }

    /// Forward debounced events to `loader` until the sender side is dropped.
    ///
    /// Returns the number of `load_more` calls that fetched a page.
    pub async fn drive<R: MediaRepository>(
        &mut self,
        mut events: mpsc::Receiver<Intersection>,
        loader: &MediaListLoader<R>,
    ) -> usize {
        let mut loaded = 0;
        while let Some(event) = events.recv().await {
            if !self.observe(event, Instant::now()) {
                continue;
            }
            let outcome = loader.load_more().await;
            tracing::debug!(?outcome, "Viewport triggered load_more");
            if matches!(outcome, LoadOutcome::Loaded { .. }) {
                loaded += 1;
            }
        }
        loaded
    }
}
