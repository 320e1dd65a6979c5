use crate::{AudioFetcher, DownloadJob, JobHandler, PipelineError, SourceResolver, Tagger};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info};

const AUDIO_FILE_EXTENSION: &str = "mp3";

pub struct DownloadPipeline {
    source_resolver: Arc<dyn SourceResolver>,
    audio_fetcher: Arc<dyn AudioFetcher>,
    tagger: Arc<dyn Tagger>,
    music_home: PathBuf,
}

impl DownloadPipeline {
    pub fn new(
        source_resolver: Arc<dyn SourceResolver>,
        audio_fetcher: Arc<dyn AudioFetcher>,
        tagger: Arc<dyn Tagger>,
        music_home: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source_resolver,
            audio_fetcher,
            tagger,
            music_home: music_home.into(),
        }
    }

    // `<music_home>/<artist>/<album>/<sha256(title)>.mp3`
    pub fn destination_path(&self, job: &DownloadJob) -> PathBuf {
        self.music_home
            .join(sanitize_path_component(&job.artist))
            .join(sanitize_path_component(&job.album))
            .join(format!("{}.{}", title_hash(&job.title), AUDIO_FILE_EXTENSION))
    }

    pub async fn run(&self, job: &DownloadJob) -> Result<PathBuf, PipelineError> {
        let source = self
            .source_resolver
            .resolve(&job.title, &job.album, &job.artist)
            .await
            .map_err(|error| {
                error!(
                    request_id = %job.request_id,
                    track_id = %job.track_id,
                    %error,
                    "Unable to resolve audio source"
                );
                PipelineError::Resolve(error)
            })?;

        debug!(request_id = %job.request_id, track_id = %job.track_id, %source, "Resolved audio source");

        let path = self.prepare_destination(job).await?;

        self.audio_fetcher
            .fetch(&source, &path)
            .await
            .map_err(|error| {
                error!(
                    request_id = %job.request_id,
                    track_id = %job.track_id,
                    %error,
                    "Unable to fetch audio"
                );
                error
            })?;

        self.tagger.tag(&path, job).await.map_err(|error| {
            error!(
                request_id = %job.request_id,
                track_id = %job.track_id,
                %error,
                "Unable to tag audio file"
            );
            error
        })?;

        info!(
            request_id = %job.request_id,
            track_id = %job.track_id,
            path = %path.display(),
            "Audio track saved"
        );

        Ok(path)
    }

    async fn prepare_destination(&self, job: &DownloadJob) -> Result<PathBuf, PipelineError> {
        let path = self.destination_path(job);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| placement_error(job, parent, source))?;
        }

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(
                    request_id = %job.request_id,
                    track_id = %job.track_id,
                    path = %path.display(),
                    "Removed existing file"
                );
            }
            Err(error) if error.kind() == ErrorKind::NotFound => (),
            Err(source) => return Err(placement_error(job, &path, source)),
        }

        Ok(path)
    }
}

#[async_trait]
impl JobHandler for DownloadPipeline {
    async fn handle(&self, job: &DownloadJob) -> Result<(), PipelineError> {
        self.run(job).await.map(|_| ())
    }
}

fn placement_error(job: &DownloadJob, path: &Path, source: std::io::Error) -> PipelineError {
    error!(
        request_id = %job.request_id,
        track_id = %job.track_id,
        path = %path.display(),
        error = %source,
        "Unable to prepare destination"
    );

    PipelineError::Placement {
        path: path.to_path_buf(),
        source,
    }
}

pub fn title_hash(title: &str) -> String {
    format!("{:x}", Sha256::digest(title.as_bytes()))
}

// Keeps catalog names from escaping their directory.
pub fn sanitize_path_component(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() || name == "." || name == ".." {
        return "_".to_string();
    }

    name.chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect()
}
