use crate::{AlbumRef, DownloadJob, SourceRef, TrackMetadata, TrackRef};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Entity not found")]
    NotFound,
    #[error("Upstream provider failed: {0}")]
    Unexpected(#[from] BoxError),
}

#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn fetch_track(&self, track_id: &str) -> Result<TrackMetadata, ProviderError>;
    async fn fetch_album_tracks(&self, album_id: &str) -> Result<Vec<TrackRef>, ProviderError>;
    async fn fetch_artist_albums(&self, artist_id: &str) -> Result<Vec<AlbumRef>, ProviderError>;
}

#[async_trait]
pub trait SourceResolver: Send + Sync {
    async fn resolve(
        &self,
        title: &str,
        album: &str,
        artist: &str,
    ) -> Result<SourceRef, ProviderError>;
}

#[derive(Debug, thiserror::Error)]
#[error("Unable to fetch audio: {0}")]
pub struct FetchError(#[from] pub BoxError);

#[async_trait]
pub trait AudioFetcher: Send + Sync {
    async fn fetch(&self, source: &SourceRef, destination: &Path) -> Result<(), FetchError>;
}

#[derive(Debug, thiserror::Error)]
#[error("Unable to tag audio file: {0}")]
pub struct TagError(#[from] pub BoxError);

#[async_trait]
pub trait Tagger: Send + Sync {
    async fn tag(&self, path: &Path, job: &DownloadJob) -> Result<(), TagError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("Enqueue was cancelled by the caller")]
    Cancelled,
    #[error("Download queue is closed")]
    Closed,
}

#[async_trait]
pub trait DownloadQueue: Send + Sync {
    // Waits for free capacity unless `cancellation` fires first.
    async fn enqueue(
        &self,
        job: DownloadJob,
        cancellation: &CancellationToken,
    ) -> Result<(), QueueError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Unable to resolve audio source: {0}")]
    Resolve(#[source] ProviderError),
    #[error("Unable to prepare destination {path}: {source}")]
    Placement {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Tag(#[from] TagError),
}

#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn handle(&self, job: &DownloadJob) -> Result<(), PipelineError>;
}
