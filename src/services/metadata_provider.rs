use async_trait::async_trait;
use catalog_providers::{FullTrack, SpotifyClient, SpotifyClientError};
use download_pipeline::{AlbumRef, MetadataProvider, ProviderError, TrackMetadata, TrackRef};
use std::sync::Arc;
use tracing::debug;

pub(crate) struct SpotifyMetadataProvider(pub(crate) Arc<SpotifyClient>);

pub(crate) fn into_provider_error(error: SpotifyClientError) -> ProviderError {
    match error {
        SpotifyClientError::NotFound => ProviderError::NotFound,
        error => ProviderError::Unexpected(Box::new(error)),
    }
}

fn into_track_metadata(requested_id: &str, track: FullTrack) -> TrackMetadata {
    let cover_url = track.album.cover_url().map(ToString::to_string);

    TrackMetadata {
        id: track.id.unwrap_or_else(|| requested_id.to_string()),
        title: track.name,
        album: track.album.name,
        artists: track.artists.into_iter().map(|artist| artist.name).collect(),
        release_date: track.album.release_date,
        track_number: track.track_number,
        cover_url,
    }
}

#[async_trait]
impl MetadataProvider for SpotifyMetadataProvider {
    async fn fetch_track(&self, track_id: &str) -> Result<TrackMetadata, ProviderError> {
        let track = self
            .0
            .get_track(track_id)
            .await
            .map_err(into_provider_error)?;

        Ok(into_track_metadata(track_id, track))
    }

    async fn fetch_album_tracks(&self, album_id: &str) -> Result<Vec<TrackRef>, ProviderError> {
        let tracks = self
            .0
            .get_album_tracks(album_id)
            .await
            .map_err(into_provider_error)?;

        Ok(tracks
            .into_iter()
            .filter_map(|track| match track.id {
                Some(id) => Some(TrackRef {
                    id,
                    title: track.name,
                }),
                None => {
                    debug!(album_id, title = %track.name, "Skipping local track without id");
                    None
                }
            })
            .collect())
    }

    async fn fetch_artist_albums(&self, artist_id: &str) -> Result<Vec<AlbumRef>, ProviderError> {
        let albums = self
            .0
            .get_artist_albums(artist_id)
            .await
            .map_err(into_provider_error)?;

        Ok(albums
            .into_iter()
            .filter_map(|album| {
                Some(AlbumRef {
                    id: album.id?,
                    name: album.name,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_providers::{Image, SimpleAlbum, SimpleArtist};

    fn children() -> FullTrack {
        FullTrack {
            id: Some("1PVqIH7Ib9hVtx1Tdf4w2p".into()),
            name: "Children".into(),
            album: SimpleAlbum {
                id: Some("5Ld7mSGcy1lX3G1PPwpHDq".into()),
                name: "Dreamland".into(),
                artists: vec![],
                release_date: "1996-05-01".into(),
                images: vec![Image {
                    url: "https://i.scdn.co/image/dreamland".into(),
                    width: Some(640),
                    height: Some(640),
                }],
            },
            artists: vec![
                SimpleArtist {
                    id: Some("3jNkaOXasoc7RsxdchvEVq".into()),
                    name: "Robert Miles".into(),
                },
                SimpleArtist {
                    id: None,
                    name: "Maria Nayler".into(),
                },
            ],
            track_number: 3,
        }
    }

    #[test]
    fn should_map_full_track_into_metadata() {
        let metadata = into_track_metadata("requested", children());

        assert_eq!(
            metadata,
            TrackMetadata {
                id: "1PVqIH7Ib9hVtx1Tdf4w2p".into(),
                title: "Children".into(),
                album: "Dreamland".into(),
                artists: vec!["Robert Miles".into(), "Maria Nayler".into()],
                release_date: "1996-05-01".into(),
                track_number: 3,
                cover_url: Some("https://i.scdn.co/image/dreamland".into()),
            }
        );
    }

    #[test]
    fn should_keep_requested_id_when_track_has_none() {
        let track = FullTrack {
            id: None,
            ..children()
        };

        assert_eq!(into_track_metadata("requested", track).id, "requested");
    }

    #[test]
    fn should_map_not_found_to_provider_not_found() {
        assert!(matches!(
            into_provider_error(SpotifyClientError::NotFound),
            ProviderError::NotFound
        ));
    }
}
