use async_trait::async_trait;
use catalog_providers::YouTubeClient;
use download_pipeline::{ProviderError, SourceRef, SourceResolver};
use std::sync::Arc;
use tracing::debug;

const MAX_SEARCH_RESULTS: u32 = 5;

pub(crate) struct YouTubeSourceResolver(pub(crate) Arc<YouTubeClient>);

pub(crate) fn search_query(title: &str, album: &str, artist: &str) -> String {
    if album.trim().is_empty() {
        format!("{} - {}", artist, title)
    } else {
        format!("{} - {} ({})", artist, title, album)
    }
}

#[async_trait]
impl SourceResolver for YouTubeSourceResolver {
    async fn resolve(
        &self,
        title: &str,
        album: &str,
        artist: &str,
    ) -> Result<SourceRef, ProviderError> {
        let query = search_query(title, album, artist);

        let videos = self
            .0
            .search_videos(&query, MAX_SEARCH_RESULTS)
            .await
            .map_err(|error| ProviderError::Unexpected(Box::new(error)))?;

        let video = videos.into_iter().next().ok_or(ProviderError::NotFound)?;

        debug!(%query, video_id = %video.video_id, video_title = %video.title, "Picked video");

        Ok(SourceRef::new(video.watch_url()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_query_with_album() {
        assert_eq!(
            search_query("Children", "Dreamland", "Robert Miles"),
            "Robert Miles - Children (Dreamland)"
        );
    }

    #[test]
    fn should_omit_empty_album_from_query() {
        assert_eq!(
            search_query("Children", " ", "Robert Miles"),
            "Robert Miles - Children"
        );
    }
}
