//! Tauri commands for the catalog loaders
//!
//! Every command addresses the loader of one media type and returns the
//! loader's snapshot after the operation settled. Fetch failures are part of
//! the snapshot (`error`), so commands themselves never fail.

use tauri::State;

use crate::CinemaState;
use cinema_core::{AreaUpdate, CategoryUpdate, LoaderSnapshot, MediaType, SortUpdate};

/// Reset the list of `media_type` and load its first page.
#[tauri::command]
pub async fn open_media_type(
    state: State<'_, CinemaState>,
    media_type: MediaType,
) -> Result<LoaderSnapshot, String> {
    let loader = state.loader(media_type);
    loader.set_type(media_type).await;
    Ok(loader.snapshot().await)
}

/// Append the next page; called when the list's end scrolls into view.
#[tauri::command]
pub async fn load_more(
    state: State<'_, CinemaState>,
    media_type: MediaType,
) -> Result<LoaderSnapshot, String> {
    let loader = state.loader(media_type);
    let outcome = loader.load_more().await;
    tracing::debug!(media_type = media_type.as_path(), ?outcome, "load_more command");
    Ok(loader.snapshot().await)
}

/// Search by name; a blank query returns to browsing.
#[tauri::command]
pub async fn search_media(
    state: State<'_, CinemaState>,
    media_type: MediaType,
    query: String,
) -> Result<LoaderSnapshot, String> {
    let loader = state.loader(media_type);
    loader.search(&query).await;
    Ok(loader.snapshot().await)
}

/// Change the sort field and/or direction.
#[tauri::command]
pub async fn set_sort(
    state: State<'_, CinemaState>,
    media_type: MediaType,
    update: SortUpdate,
) -> Result<LoaderSnapshot, String> {
    let loader = state.loader(media_type);
    loader.set_sort(update).await;
    Ok(loader.snapshot().await)
}

/// Change the area filter.
#[tauri::command]
pub async fn set_area(
    state: State<'_, CinemaState>,
    media_type: MediaType,
    update: AreaUpdate,
) -> Result<LoaderSnapshot, String> {
    let loader = state.loader(media_type);
    loader.set_area(update).await;
    Ok(loader.snapshot().await)
}

/// Change the category filter.
#[tauri::command]
pub async fn set_category(
    state: State<'_, CinemaState>,
    media_type: MediaType,
    update: CategoryUpdate,
) -> Result<LoaderSnapshot, String> {
    let loader = state.loader(media_type);
    loader.set_category(update).await;
    Ok(loader.snapshot().await)
}

/// Load the area and category values offered by the filter controls.
#[tauri::command]
pub async fn load_facets(
    state: State<'_, CinemaState>,
    media_type: MediaType,
) -> Result<LoaderSnapshot, String> {
    let loader = state.loader(media_type);
    loader.load_facets().await;
    Ok(loader.snapshot().await)
}

/// Current state of the list without fetching anything.
#[tauri::command]
pub async fn media_snapshot(
    state: State<'_, CinemaState>,
    media_type: MediaType,
) -> Result<LoaderSnapshot, String> {
    Ok(state.loader(media_type).snapshot().await)
}
