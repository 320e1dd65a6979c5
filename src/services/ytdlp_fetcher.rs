use async_trait::async_trait;
use download_pipeline::{AudioFetcher, FetchError, SourceRef};
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub(crate) enum YtDlpError {
    #[error("Unable to start yt-dlp: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("yt-dlp exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },
    #[error("yt-dlp produced no file at {0}")]
    MissingOutput(PathBuf),
}

pub(crate) struct YtDlpFetcher {
    program: String,
}

impl YtDlpFetcher {
    pub(crate) fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }

    async fn download(&self, source: &SourceRef, destination: &Path) -> Result<(), YtDlpError> {
        // yt-dlp picks the extension itself; after extraction it is the destination's.
        let output_template = destination.with_extension("%(ext)s");

        debug!(url = %source, output = %output_template.display(), "Running yt-dlp");

        let output = Command::new(&self.program)
            .arg("--no-playlist")
            .arg("--quiet")
            .arg("-x")
            .args(["--audio-format", "mp3"])
            .arg("-o")
            .arg(&output_template)
            .arg(source.url())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            return Err(YtDlpError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        if !tokio::fs::try_exists(destination).await.unwrap_or(false) {
            return Err(YtDlpError::MissingOutput(destination.to_path_buf()));
        }

        Ok(())
    }
}

#[async_trait]
impl AudioFetcher for YtDlpFetcher {
    async fn fetch(&self, source: &SourceRef, destination: &Path) -> Result<(), FetchError> {
        self.download(source, destination)
            .await
            .map_err(|error| FetchError(Box::new(error)))
    }
}
