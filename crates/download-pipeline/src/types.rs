use crate::RequestId;
use serde::{Deserialize, Serialize};

const UNKNOWN_ARTIST: &str = "Unknown Artist";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Track,
    Album,
    Artist,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Track => write!(f, "track"),
            EntityKind::Album => write!(f, "album"),
            EntityKind::Artist => write!(f, "artist"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectableEntity {
    pub kind: EntityKind,
    pub id: String,
    pub label: String,
}

impl SelectableEntity {
    pub fn new(kind: EntityKind, id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackMetadata {
    pub id: String,
    pub title: String,
    pub album: String,
    pub artists: Vec<String>,
    pub release_date: String,
    pub track_number: u32,
    pub cover_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRef {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef(String);

impl SourceRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn url(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadJob {
    pub request_id: RequestId,
    pub track_id: String,
    pub title: String,
    pub album: String,
    pub artist: String,
    pub release_date: String,
    // Zero when the catalog does not know the position.
    pub track_number: u32,
    pub thumbnail_url: Option<String>,
}

impl DownloadJob {
    pub fn from_track(request_id: &RequestId, track: TrackMetadata) -> Self {
        let artist = track
            .artists
            .into_iter()
            .next()
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());

        Self {
            request_id: *request_id,
            track_id: track.id,
            title: track.title,
            album: track.album,
            artist,
            release_date: track.release_date,
            track_number: track.track_number,
            thumbnail_url: track.cover_url,
        }
    }

    // Leading component of the release date (`1996-05-01`, `1996-05` and `1996` all give 1996).
    pub fn release_year(&self) -> Option<i32> {
        self.release_date
            .split('-')
            .next()
            .map(str::trim)
            .filter(|year| !year.is_empty())
            .and_then(|year| year.parse().ok())
    }
}
