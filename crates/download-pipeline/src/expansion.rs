use crate::{
    DownloadJob, DownloadQueue, EntityKind, MetadataProvider, RequestId, SelectableEntity,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionSummary {
    pub enqueued: usize,
    // Abandoned branches plus jobs the queue refused.
    pub failed: usize,
}

// A failing branch (one album of an artist, one track of an album) is logged
// and skipped; its siblings are still expanded.
pub struct Expander {
    metadata_provider: Arc<dyn MetadataProvider>,
    queue: Arc<dyn DownloadQueue>,
}

impl Expander {
    pub fn new(metadata_provider: Arc<dyn MetadataProvider>, queue: Arc<dyn DownloadQueue>) -> Self {
        Self {
            metadata_provider,
            queue,
        }
    }

    pub async fn expand(
        &self,
        request_id: &RequestId,
        entity: &SelectableEntity,
        cancellation: &CancellationToken,
    ) -> ExpansionSummary {
        info!(%request_id, kind = %entity.kind, id = %entity.id, "Expanding selection");

        let mut summary = ExpansionSummary::default();

        match entity.kind {
            EntityKind::Track => {
                self.expand_track(request_id, &entity.id, cancellation, &mut summary)
                    .await
            }
            EntityKind::Album => {
                self.expand_album(request_id, &entity.id, cancellation, &mut summary)
                    .await
            }
            EntityKind::Artist => {
                self.expand_artist(request_id, &entity.id, cancellation, &mut summary)
                    .await
            }
        }

        info!(
            %request_id,
            kind = %entity.kind,
            id = %entity.id,
            enqueued = summary.enqueued,
            failed = summary.failed,
            "Selection expanded"
        );

        summary
    }

    async fn expand_artist(
        &self,
        request_id: &RequestId,
        artist_id: &str,
        cancellation: &CancellationToken,
        summary: &mut ExpansionSummary,
    ) {
        if cancellation.is_cancelled() {
            debug!(%request_id, artist_id, "Expansion cancelled");
            return;
        }

        let albums = match self.metadata_provider.fetch_artist_albums(artist_id).await {
            Ok(albums) => albums,
            Err(error) => {
                error!(%request_id, artist_id, %error, "Unable to fetch artist albums");
                summary.failed += 1;
                return;
            }
        };

        debug!(%request_id, artist_id, albums = albums.len(), "Fetched artist albums");

        for album in albums {
            self.expand_album(request_id, &album.id, cancellation, summary)
                .await;
        }
    }

    async fn expand_album(
        &self,
        request_id: &RequestId,
        album_id: &str,
        cancellation: &CancellationToken,
        summary: &mut ExpansionSummary,
    ) {
        if cancellation.is_cancelled() {
            debug!(%request_id, album_id, "Expansion cancelled");
            return;
        }

        let tracks = match self.metadata_provider.fetch_album_tracks(album_id).await {
            Ok(tracks) => tracks,
            Err(error) => {
                error!(%request_id, album_id, %error, "Unable to fetch album tracks");
                summary.failed += 1;
                return;
            }
        };

        debug!(%request_id, album_id, tracks = tracks.len(), "Fetched album tracks");

        for track in tracks {
            self.expand_track(request_id, &track.id, cancellation, summary)
                .await;
        }
    }

    async fn expand_track(
        &self,
        request_id: &RequestId,
        track_id: &str,
        cancellation: &CancellationToken,
        summary: &mut ExpansionSummary,
    ) {
        if cancellation.is_cancelled() {
            debug!(%request_id, track_id, "Expansion cancelled");
            return;
        }

        let track = match self.metadata_provider.fetch_track(track_id).await {
            Ok(track) => track,
            Err(error) => {
                error!(%request_id, track_id, %error, "Unable to fetch track details");
                summary.failed += 1;
                return;
            }
        };

        let job = DownloadJob::from_track(request_id, track);

        match self.queue.enqueue(job, cancellation).await {
            Ok(()) => {
                debug!(%request_id, track_id, "Track added to download queue");
                summary.enqueued += 1;
            }
            Err(error) => {
                error!(%request_id, track_id, %error, "Unable to add track to download queue");
                summary.failed += 1;
            }
        }
    }
}
