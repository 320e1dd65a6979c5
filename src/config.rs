use catalog_providers::{DEFAULT_SPOTIFY_API_ENDPOINT, DEFAULT_YOUTUBE_API_ENDPOINT};
use download_pipeline::{
    DEFAULT_QUEUE_CAPACITY, DEFAULT_SELECTION_TTL, DEFAULT_SWEEP_INTERVAL,
    DEFAULT_WORKER_POOL_SIZE,
};
use serde::Deserialize;
use std::time::Duration;

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_shutdown_timeout() -> u64 {
    30u64
}

fn default_worker_size() -> i64 {
    DEFAULT_WORKER_POOL_SIZE as i64
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_selection_ttl() -> u64 {
    DEFAULT_SELECTION_TTL.as_secs()
}

fn default_selection_sweep_interval() -> u64 {
    DEFAULT_SWEEP_INTERVAL.as_secs()
}

fn default_spotify_api_endpoint() -> String {
    DEFAULT_SPOTIFY_API_ENDPOINT.to_string()
}

fn default_youtube_api_endpoint() -> String {
    DEFAULT_YOUTUBE_API_ENDPOINT.to_string()
}

fn default_ytdlp_path() -> String {
    "yt-dlp".to_string()
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct SpotifyConfig {
    #[serde(rename = "spotify_access_token")]
    pub(crate) access_token: String,
    #[serde(
        rename = "spotify_api_endpoint",
        default = "default_spotify_api_endpoint"
    )]
    pub(crate) endpoint: String,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct YouTubeConfig {
    #[serde(rename = "google_api_key")]
    pub(crate) api_key: String,
    #[serde(
        rename = "youtube_api_endpoint",
        default = "default_youtube_api_endpoint"
    )]
    pub(crate) endpoint: String,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct Config {
    #[serde(default = "default_bind_address")]
    pub(crate) bind_address: String,
    #[serde(default = "default_shutdown_timeout")]
    pub(crate) shutdown_timeout: u64,
    pub(crate) music_home: String,
    #[serde(default = "default_worker_size")]
    pub(crate) worker_size: i64,
    #[serde(default = "default_queue_capacity")]
    pub(crate) queue_capacity: usize,
    #[serde(default = "default_selection_ttl")]
    pub(crate) selection_ttl: u64,
    #[serde(default = "default_selection_sweep_interval")]
    pub(crate) selection_sweep_interval: u64,
    #[serde(default = "default_ytdlp_path")]
    pub(crate) ytdlp_path: String,
    #[serde(default)]
    pub(crate) cover_art_required: bool,
    #[serde(flatten)]
    pub(crate) spotify: SpotifyConfig,
    #[serde(flatten)]
    pub(crate) youtube: YouTubeConfig,
}

impl Config {
    pub(crate) fn from_env() -> Result<Self, envy::Error> {
        envy::from_env::<Self>()
    }

    // Non-positive sizes fall back to the default pool size.
    pub(crate) fn worker_pool_size(&self) -> usize {
        if self.worker_size < 1 {
            DEFAULT_WORKER_POOL_SIZE
        } else {
            self.worker_size as usize
        }
    }

    pub(crate) fn selection_ttl(&self) -> Duration {
        Duration::from_secs(self.selection_ttl)
    }

    pub(crate) fn selection_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.selection_sweep_interval)
    }
}
