use crate::spotify::types::{FullTrack, Paging, SearchResults, SimpleAlbum, SimpleTrack};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_SPOTIFY_API_ENDPOINT: &str = "https://api.spotify.com/v1";

const SEARCH_TYPES: &str = "track,album,artist";
const ARTIST_ALBUM_GROUPS: &str = "album,single,appears_on,compilation";
const PAGE_SIZE: u32 = 50;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum SpotifyClientError {
    #[error("Spotify entity not found")]
    NotFound,
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),
    #[error(transparent)]
    ParseError(#[from] serde_json::Error),
}

pub struct SpotifyClient {
    client: Client,
    endpoint: String,
    access_token: String,
}

impl SpotifyClient {
    pub fn create(endpoint: &str, access_token: &str) -> Result<Self, SpotifyClientError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        })
    }

    pub async fn search(
        &self,
        query_str: &str,
        limit: u32,
    ) -> Result<SearchResults, SpotifyClientError> {
        #[derive(Serialize)]
        struct Query<'a> {
            q: &'a str,
            #[serde(rename = "type")]
            search_type: &'a str,
            limit: u32,
        }

        let query = Query {
            q: query_str,
            search_type: SEARCH_TYPES,
            limit,
        };

        let raw_json = self
            .get_raw(&format!("{}/search", self.endpoint), &query)
            .await?;

        Ok(parse_search_results(&raw_json)?)
    }

    pub async fn get_track(&self, track_id: &str) -> Result<FullTrack, SpotifyClientError> {
        let raw_json = self
            .get_raw(&format!("{}/tracks/{}", self.endpoint, track_id), &())
            .await?;

        Ok(serde_json::from_str(&raw_json)?)
    }

    pub async fn get_album_tracks(
        &self,
        album_id: &str,
    ) -> Result<Vec<SimpleTrack>, SpotifyClientError> {
        #[derive(Serialize)]
        struct Query {
            limit: u32,
        }

        let first_page = format!("{}/albums/{}/tracks", self.endpoint, album_id);

        self.get_all_pages(&first_page, &Query { limit: PAGE_SIZE })
            .await
    }

    pub async fn get_artist_albums(
        &self,
        artist_id: &str,
    ) -> Result<Vec<SimpleAlbum>, SpotifyClientError> {
        #[derive(Serialize)]
        struct Query<'a> {
            include_groups: &'a str,
            limit: u32,
        }

        let first_page = format!("{}/artists/{}/albums", self.endpoint, artist_id);
        let query = Query {
            include_groups: ARTIST_ALBUM_GROUPS,
            limit: PAGE_SIZE,
        };

        self.get_all_pages(&first_page, &query).await
    }

    // Follows `next` links; they already carry the query of the first request.
    async fn get_all_pages<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        first_page: &str,
        query: &Q,
    ) -> Result<Vec<T>, SpotifyClientError> {
        let raw_json = self.get_raw(first_page, query).await?;
        let mut page: Paging<T> = serde_json::from_str(&raw_json)?;
        let mut items = std::mem::take(&mut page.items);

        while let Some(next) = page.next.take() {
            debug!(url = %next, fetched = items.len(), total = page.total, "Fetching next page");

            let raw_json = self.get_raw(&next, &()).await?;
            page = serde_json::from_str(&raw_json)?;
            items.append(&mut page.items);
        }

        Ok(items)
    }

    async fn get_raw<Q: Serialize + ?Sized>(
        &self,
        url: &str,
        query: &Q,
    ) -> Result<String, SpotifyClientError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SpotifyClientError::NotFound);
        }

        Ok(response.error_for_status()?.text().await?)
    }
}

pub(crate) fn parse_search_results(raw_json: &str) -> Result<SearchResults, serde_json::Error> {
    serde_json::from_str(raw_json)
}
