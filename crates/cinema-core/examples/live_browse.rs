use std::sync::Arc;

use cinema_core::{
    CinemaClient, ClientConfig, LoadOutcome, LoaderConfig, MediaListLoader, MediaType, SortBy,
    SortUpdate,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let base_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| ClientConfig::default().base_url);
    let client = Arc::new(CinemaClient::with_config(ClientConfig {
        base_url: base_url.clone(),
        ..ClientConfig::default()
    })?);

    let loader = MediaListLoader::new(
        client,
        MediaType::Movie,
        LoaderConfig {
            page_size: 12,
            preload_cooldown_ms: 0,
        },
    );

    println!("Loading the best rated movies from {}...\n", base_url);
    loader.load_facets().await;
    loader
        .set_sort(SortUpdate {
            sort_by: Some(SortBy::Score),
            sort_order: None,
        })
        .await;

    // Scroll three pages deep
    for _ in 0..2 {
        if !matches!(loader.load_more().await, LoadOutcome::Loaded { .. }) {
            break;
        }
    }

    let snapshot = loader.snapshot().await;
    if let Some(error) = &snapshot.error {
        println!("Error: {}", error);
    }
    for (i, movie) in snapshot.items.iter().enumerate() {
        println!(
            "{:3}. {} [{:.1}] {} | sources: {}",
            i + 1,
            movie.name,
            movie.score,
            movie.categories().join("/"),
            movie.download_links.sources().join(", ")
        );
    }
    println!(
        "\n{} movies, more available: {}",
        snapshot.items.len(),
        snapshot.has_more
    );
    println!("Areas: {}", snapshot.facets.areas.join(", "));

    Ok(())
}
