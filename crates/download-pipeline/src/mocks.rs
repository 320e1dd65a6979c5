use crate::{
    AlbumRef, AudioFetcher, DownloadJob, DownloadQueue, FetchError, JobHandler, MetadataProvider,
    PipelineError, ProviderError, QueueError, SourceRef, SourceResolver, TagError, Tagger,
    TrackMetadata, TrackRef,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::io::{Error, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;

pub(crate) fn upstream_error(message: &str) -> ProviderError {
    ProviderError::Unexpected(Box::new(Error::new(ErrorKind::Other, message.to_string())))
}

#[derive(Default)]
pub(crate) struct MetadataProviderMock {
    artists: HashMap<String, Vec<AlbumRef>>,
    albums: HashMap<String, Vec<TrackRef>>,
    tracks: HashMap<String, TrackMetadata>,
    failing: HashSet<String>,
}

impl MetadataProviderMock {
    pub(crate) fn with_artist(mut self, artist_id: &str, album_ids: &[&str]) -> Self {
        let albums = album_ids
            .iter()
            .map(|id| AlbumRef {
                id: id.to_string(),
                name: format!("Album {}", id),
            })
            .collect();
        self.artists.insert(artist_id.into(), albums);
        self
    }

    pub(crate) fn with_album(mut self, album_id: &str, track_ids: &[&str]) -> Self {
        let tracks = track_ids
            .iter()
            .map(|id| TrackRef {
                id: id.to_string(),
                title: format!("Track {}", id),
            })
            .collect();
        self.albums.insert(album_id.into(), tracks);

        for track_id in track_ids {
            self.tracks.insert(
                track_id.to_string(),
                TrackMetadata {
                    id: track_id.to_string(),
                    title: format!("Track {}", track_id),
                    album: format!("Album {}", album_id),
                    artists: vec!["Robert Miles".into()],
                    release_date: "1996-02-01".into(),
                    track_number: 1,
                    cover_url: None,
                },
            );
        }
        self
    }

    // Any fetch for this id fails with an upstream error.
    pub(crate) fn failing(mut self, id: &str) -> Self {
        self.failing.insert(id.into());
        self
    }

    fn check(&self, id: &str) -> Result<(), ProviderError> {
        if self.failing.contains(id) {
            Err(upstream_error("provider unavailable"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MetadataProvider for MetadataProviderMock {
    async fn fetch_track(&self, track_id: &str) -> Result<TrackMetadata, ProviderError> {
        self.check(track_id)?;
        self.tracks
            .get(track_id)
            .cloned()
            .ok_or(ProviderError::NotFound)
    }

    async fn fetch_album_tracks(&self, album_id: &str) -> Result<Vec<TrackRef>, ProviderError> {
        self.check(album_id)?;
        self.albums
            .get(album_id)
            .cloned()
            .ok_or(ProviderError::NotFound)
    }

    async fn fetch_artist_albums(&self, artist_id: &str) -> Result<Vec<AlbumRef>, ProviderError> {
        self.check(artist_id)?;
        self.artists
            .get(artist_id)
            .cloned()
            .ok_or(ProviderError::NotFound)
    }
}

#[derive(Default)]
pub(crate) struct CollectingQueue {
    pub(crate) jobs: Mutex<Vec<DownloadJob>>,
    refused: HashSet<String>,
}

impl CollectingQueue {
    pub(crate) fn refusing(track_id: &str) -> Self {
        Self {
            jobs: Mutex::new(vec![]),
            refused: HashSet::from([track_id.to_string()]),
        }
    }

    pub(crate) fn track_ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self
            .jobs
            .lock()
            .unwrap()
            .iter()
            .map(|job| job.track_id.clone())
            .collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl DownloadQueue for CollectingQueue {
    async fn enqueue(
        &self,
        job: DownloadJob,
        cancellation: &CancellationToken,
    ) -> Result<(), QueueError> {
        if cancellation.is_cancelled() {
            return Err(QueueError::Cancelled);
        }
        if self.refused.contains(&job.track_id) {
            return Err(QueueError::Closed);
        }
        self.jobs.lock().unwrap().push(job);
        Ok(())
    }
}

// Handler that reports each started job and then waits for a gate permit.
pub(crate) struct GatedHandler {
    started: mpsc::UnboundedSender<String>,
    gate: Arc<Semaphore>,
    pub(crate) completed: Mutex<Vec<String>>,
}

impl GatedHandler {
    pub(crate) fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<String>, Arc<Semaphore>) {
        let (started, started_rx) = mpsc::unbounded_channel();
        let gate = Arc::new(Semaphore::new(0));
        let handler = Arc::new(Self {
            started,
            gate: Arc::clone(&gate),
            completed: Mutex::new(vec![]),
        });
        (handler, started_rx, gate)
    }

    pub(crate) fn completed(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobHandler for GatedHandler {
    async fn handle(&self, job: &DownloadJob) -> Result<(), PipelineError> {
        let _ = self.started.send(job.track_id.clone());
        self.gate.acquire().await.unwrap().forget();
        self.completed.lock().unwrap().push(job.track_id.clone());

        match job.track_id.as_str() {
            "panic" => panic!("handler blew up"),
            "fail" => Err(PipelineError::Fetch(FetchError(Box::new(Error::new(
                ErrorKind::Other,
                "fetch failed",
            ))))),
            _ => Ok(()),
        }
    }
}

pub(crate) struct SourceResolverMock;

#[async_trait]
impl SourceResolver for SourceResolverMock {
    async fn resolve(
        &self,
        title: &str,
        _album: &str,
        artist: &str,
    ) -> Result<SourceRef, ProviderError> {
        match title {
            "Missing" => Err(ProviderError::NotFound),
            _ => Ok(SourceRef::new(format!("https://example.com/{} - {}", artist, title))),
        }
    }
}

pub(crate) struct AudioFetcherMock {
    pub(crate) fetched: Mutex<Vec<PathBuf>>,
}

impl AudioFetcherMock {
    pub(crate) fn new() -> Self {
        Self {
            fetched: Mutex::new(vec![]),
        }
    }
}

#[async_trait]
impl AudioFetcher for AudioFetcherMock {
    async fn fetch(&self, source: &SourceRef, destination: &Path) -> Result<(), FetchError> {
        assert!(
            !destination.exists(),
            "destination must be cleared before fetching"
        );
        tokio::fs::write(destination, source.url())
            .await
            .map_err(|error| FetchError(Box::new(error)))?;
        self.fetched.lock().unwrap().push(destination.to_path_buf());
        Ok(())
    }
}

pub(crate) struct TaggerMock {
    fail: bool,
    pub(crate) tagged: Mutex<Vec<(PathBuf, String)>>,
}

impl TaggerMock {
    pub(crate) fn new() -> Self {
        Self {
            fail: false,
            tagged: Mutex::new(vec![]),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            tagged: Mutex::new(vec![]),
        }
    }
}

#[async_trait]
impl Tagger for TaggerMock {
    async fn tag(&self, path: &Path, job: &DownloadJob) -> Result<(), TagError> {
        if self.fail {
            return Err(TagError(Box::new(Error::new(
                ErrorKind::Other,
                "thumbnail fetch failed",
            ))));
        }
        self.tagged
            .lock()
            .unwrap()
            .push((path.to_path_buf(), job.title.clone()));
        Ok(())
    }
}
