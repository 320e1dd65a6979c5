use crate::services::metadata_provider::into_provider_error;
use async_trait::async_trait;
use catalog_providers::{SearchResults, SpotifyClient};
use download_pipeline::{EntityKind, ProviderError, SelectableEntity};
use std::sync::Arc;
use tracing::debug;

const TRACK_SLOTS: usize = 10;
const ALBUM_SLOTS: usize = 5;
const ARTIST_SLOTS: usize = 3;
const SEARCH_LIMIT: u32 = (TRACK_SLOTS + ALBUM_SLOTS + ARTIST_SLOTS) as u32;

#[async_trait]
pub(crate) trait CatalogSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SelectableEntity>, ProviderError>;
}

pub(crate) struct SpotifyCatalogSearch(pub(crate) Arc<SpotifyClient>);

#[async_trait]
impl CatalogSearch for SpotifyCatalogSearch {
    async fn search(&self, query: &str) -> Result<Vec<SelectableEntity>, ProviderError> {
        let results = self
            .0
            .search(query, SEARCH_LIMIT)
            .await
            .map_err(into_provider_error)?;

        debug!(
            query,
            tracks = results.tracks().len(),
            albums = results.albums().len(),
            artists = results.artists().len(),
            "Catalog search completed"
        );

        Ok(collect_entities(&results))
    }
}

pub(crate) fn split_queries(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|query| !query.is_empty())
        .collect()
}

// Up to 10 tracks, 5 albums and 3 artists; unused album and artist slots go to tracks.
pub(crate) fn collect_entities(results: &SearchResults) -> Vec<SelectableEntity> {
    let albums = results.albums();
    let artists = results.artists();

    let album_slots = ALBUM_SLOTS.min(albums.len());
    let artist_slots = ARTIST_SLOTS.min(artists.len());
    let track_slots = TRACK_SLOTS + (ALBUM_SLOTS - album_slots) + (ARTIST_SLOTS - artist_slots);

    let tracks = results
        .tracks()
        .iter()
        .filter_map(|track| {
            let id = track.id.as_ref()?;
            let artist = track
                .artists
                .first()
                .map(|artist| artist.name.as_str())
                .unwrap_or_default();
            let label = format!("Track: {} - {} [{}]", track.name, artist, track.album.name);

            Some(SelectableEntity::new(EntityKind::Track, id, label))
        })
        .take(track_slots);

    let albums = albums
        .iter()
        .filter_map(|album| {
            let id = album.id.as_ref()?;
            let artist = album
                .artists
                .first()
                .map(|artist| artist.name.as_str())
                .unwrap_or_default();
            let label = format!("Album: {} - {}", album.name, artist);

            Some(SelectableEntity::new(EntityKind::Album, id, label))
        })
        .take(album_slots);

    let artists = artists
        .iter()
        .map(|artist| {
            let label = format!("Artist: {}", artist.name);
            SelectableEntity::new(EntityKind::Artist, &artist.id, label)
        })
        .take(artist_slots);

    tracks.chain(albums).chain(artists).collect()
}
