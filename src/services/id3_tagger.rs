use async_trait::async_trait;
use download_pipeline::{DownloadJob, TagError, Tagger};
use id3::frame::{Picture, PictureType};
use id3::{Tag, TagLike, Version};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_COVER_MIME_TYPE: &str = "image/jpeg";
const COVER_DESCRIPTION: &str = "Cover";
const COVER_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CoverArtPolicy {
    // A failed cover download is logged and the file is tagged without it.
    BestEffort,
    // A failed cover download fails the whole tagging step.
    Required,
}

impl CoverArtPolicy {
    pub(crate) fn from_required_flag(required: bool) -> Self {
        if required {
            CoverArtPolicy::Required
        } else {
            CoverArtPolicy::BestEffort
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum Id3TaggerError {
    #[error("Unable to fetch cover art: {0}")]
    Cover(#[from] reqwest::Error),
    #[error(transparent)]
    Id3(#[from] id3::Error),
    #[error("Tag writer task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub(crate) struct Id3Tagger {
    client: Client,
    cover_art_policy: CoverArtPolicy,
}

impl Id3Tagger {
    pub(crate) fn create(cover_art_policy: CoverArtPolicy) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(COVER_REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            cover_art_policy,
        })
    }

    async fn fetch_cover(&self, url: &str) -> Result<Picture, reqwest::Error> {
        let response = self.client.get(url).send().await?.error_for_status()?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);
        let data = response.bytes().await?;

        Ok(Picture {
            mime_type: cover_mime_type(content_type.as_deref(), url),
            picture_type: PictureType::CoverFront,
            description: COVER_DESCRIPTION.to_string(),
            data: data.to_vec(),
        })
    }

    async fn tag_file(&self, path: &Path, job: &DownloadJob) -> Result<(), Id3TaggerError> {
        let cover = match &job.thumbnail_url {
            Some(url) => match self.fetch_cover(url).await {
                Ok(cover) => Some(cover),
                Err(error) if self.cover_art_policy == CoverArtPolicy::BestEffort => {
                    warn!(
                        request_id = %job.request_id,
                        track_id = %job.track_id,
                        %error,
                        "Unable to fetch cover art, tagging without it"
                    );
                    None
                }
                Err(error) => return Err(error.into()),
            },
            None => None,
        };

        let tag = build_tag(job, cover);

        write_tag(path.to_path_buf(), tag).await?;

        debug!(
            request_id = %job.request_id,
            track_id = %job.track_id,
            path = %path.display(),
            "Tags written"
        );

        Ok(())
    }
}

#[async_trait]
impl Tagger for Id3Tagger {
    async fn tag(&self, path: &Path, job: &DownloadJob) -> Result<(), TagError> {
        self.tag_file(path, job)
            .await
            .map_err(|error| TagError(Box::new(error)))
    }
}

pub(crate) fn build_tag(job: &DownloadJob, cover: Option<Picture>) -> Tag {
    let mut tag = Tag::new();

    tag.set_title(job.title.as_str());
    tag.set_artist(job.artist.as_str());
    tag.set_album(job.album.as_str());

    if let Some(year) = job.release_year() {
        tag.set_year(year);
    }

    if job.track_number > 0 {
        tag.set_track(job.track_number);
    }

    if let Some(cover) = cover {
        tag.add_frame(cover);
    }

    tag
}

async fn write_tag(path: PathBuf, tag: Tag) -> Result<(), Id3TaggerError> {
    tokio::task::spawn_blocking(move || {
        Tag::remove_from_path(&path)?;
        tag.write_to_path(&path, Version::Id3v24)
    })
    .await??;

    Ok(())
}

// `image/*` content type of the response, else a guess from the url path, else JPEG.
pub(crate) fn cover_mime_type(content_type: Option<&str>, url: &str) -> String {
    let from_header = content_type
        .and_then(|value| value.split(';').next())
        .map(|essence| essence.trim().to_ascii_lowercase())
        .filter(|essence| essence.starts_with("image/"));

    if let Some(mime_type) = from_header {
        return mime_type;
    }

    let path = Url::parse(url)
        .map(|url| url.path().to_string())
        .unwrap_or_else(|_| url.to_string());

    mime_guess::from_path(path)
        .first()
        .filter(|mime| mime.type_() == mime_guess::mime::IMAGE)
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| DEFAULT_COVER_MIME_TYPE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use download_pipeline::RequestId;

    fn job() -> DownloadJob {
        DownloadJob {
            request_id: RequestId::new(),
            track_id: "1PVqIH7Ib9hVtx1Tdf4w2p".into(),
            title: "Children".into(),
            album: "Dreamland".into(),
            artist: "Robert Miles".into(),
            release_date: "1996-05-01".into(),
            track_number: 3,
            thumbnail_url: None,
        }
    }

    fn audio_file(dir: &Path) -> PathBuf {
        let path = dir.join("children.mp3");
        std::fs::write(&path, b"not really audio").unwrap();
        path
    }

    #[test]
    fn should_prefer_image_content_type() {
        assert_eq!(
            cover_mime_type(Some("image/png; charset=binary"), "https://i.scdn.co/image/x.jpg"),
            "image/png"
        );
    }

    #[test]
    fn should_guess_mime_type_from_url_path() {
        assert_eq!(
            cover_mime_type(Some("application/octet-stream"), "https://example.com/cover.png?size=640"),
            "image/png"
        );
        assert_eq!(cover_mime_type(None, "https://example.com/cover.webp"), "image/webp");
    }

    #[test]
    fn should_default_to_jpeg() {
        assert_eq!(
            cover_mime_type(None, "https://i.scdn.co/image/ab67616d0000b273"),
            "image/jpeg"
        );
        assert_eq!(cover_mime_type(Some("text/html"), "not a url"), "image/jpeg");
    }

    #[test]
    fn should_build_tag_from_job() {
        let cover = Picture {
            mime_type: "image/jpeg".into(),
            picture_type: PictureType::CoverFront,
            description: COVER_DESCRIPTION.into(),
            data: vec![0xff, 0xd8, 0xff],
        };

        let tag = build_tag(&job(), Some(cover));

        assert_eq!(tag.title(), Some("Children"));
        assert_eq!(tag.artist(), Some("Robert Miles"));
        assert_eq!(tag.album(), Some("Dreamland"));
        assert_eq!(tag.year(), Some(1996));
        assert_eq!(tag.track(), Some(3));
        assert_eq!(tag.pictures().count(), 1);
    }

    #[test]
    fn should_skip_unknown_track_number_and_year() {
        let job = DownloadJob {
            track_number: 0,
            release_date: String::new(),
            ..job()
        };

        let tag = build_tag(&job, None);

        assert_eq!(tag.track(), None);
        assert_eq!(tag.year(), None);
        assert_eq!(tag.pictures().count(), 0);
    }

    #[actix_rt::test]
    async fn test_tags_are_written_and_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = audio_file(dir.path());

        let mut stale = Tag::new();
        stale.set_title("Stale");
        stale.set_genre("Dream House");
        stale.write_to_path(&path, Version::Id3v24).unwrap();

        let tagger = Id3Tagger::create(CoverArtPolicy::BestEffort).unwrap();
        tagger.tag(&path, &job()).await.unwrap();

        let tag = Tag::read_from_path(&path).unwrap();
        assert_eq!(tag.title(), Some("Children"));
        assert_eq!(tag.track(), Some(3));
        assert_eq!(tag.genre(), None);
    }

    #[actix_rt::test]
    async fn test_unreachable_cover_is_skipped_when_best_effort() {
        let dir = tempfile::tempdir().unwrap();
        let path = audio_file(dir.path());
        let job = DownloadJob {
            thumbnail_url: Some("http://127.0.0.1:9/cover.jpg".into()),
            ..job()
        };

        let tagger = Id3Tagger::create(CoverArtPolicy::BestEffort).unwrap();
        tagger.tag(&path, &job).await.unwrap();

        let tag = Tag::read_from_path(&path).unwrap();
        assert_eq!(tag.title(), Some("Children"));
        assert_eq!(tag.pictures().count(), 0);
    }

    #[actix_rt::test]
    async fn test_unreachable_cover_fails_when_required() {
        let dir = tempfile::tempdir().unwrap();
        let path = audio_file(dir.path());
        let job = DownloadJob {
            thumbnail_url: Some("http://127.0.0.1:9/cover.jpg".into()),
            ..job()
        };

        let tagger = Id3Tagger::create(CoverArtPolicy::Required).unwrap();
        let result = tagger.tag_file(&path, &job).await;

        assert!(matches!(result, Err(Id3TaggerError::Cover(_))));
        assert!(Tag::read_from_path(&path).is_err());
    }

    #[test]
    fn should_map_required_flag_to_policy() {
        assert_eq!(CoverArtPolicy::from_required_flag(true), CoverArtPolicy::Required);
        assert_eq!(CoverArtPolicy::from_required_flag(false), CoverArtPolicy::BestEffort);
    }
}
