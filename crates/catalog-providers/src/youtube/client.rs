use crate::youtube::types::{SearchListResponse, VideoResult};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_YOUTUBE_API_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3";

const DEFAULT_MAX_RESULTS: u32 = 5;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum YouTubeClientError {
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),
    #[error(transparent)]
    ParseError(#[from] serde_json::Error),
}

pub struct YouTubeClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl YouTubeClient {
    pub fn create(endpoint: &str, api_key: &str) -> Result<Self, YouTubeClientError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    // Videos matching the query, most relevant first. Zero `max_results` means the API default.
    pub async fn search_videos(
        &self,
        query_str: &str,
        max_results: u32,
    ) -> Result<Vec<VideoResult>, YouTubeClientError> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Query<'a> {
            part: &'a str,
            #[serde(rename = "type")]
            resource_type: &'a str,
            q: &'a str,
            max_results: u32,
            key: &'a str,
        }

        let query = Query {
            part: "snippet",
            resource_type: "video",
            q: query_str,
            max_results: if max_results == 0 {
                DEFAULT_MAX_RESULTS
            } else {
                max_results
            },
            key: &self.api_key,
        };

        let raw_json = self
            .client
            .get(format!("{}/search", self.endpoint))
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let results = parse_video_results(&raw_json)?;

        debug!(query = query_str, results = results.len(), "YouTube search completed");

        Ok(results)
    }
}

pub(crate) fn parse_video_results(raw_json: &str) -> Result<Vec<VideoResult>, serde_json::Error> {
    let response: SearchListResponse = serde_json::from_str(raw_json)?;

    let results = response
        .items
        .into_iter()
        .filter_map(|item| {
            let video_id = item.id.video_id?;
            let (title, thumbnail_url) = match item.snippet {
                Some(snippet) => (
                    snippet.title,
                    snippet
                        .thumbnails
                        .and_then(|thumbnails| thumbnails.default)
                        .map(|thumbnail| thumbnail.url),
                ),
                None => (String::new(), None),
            };

            Some(VideoResult {
                video_id,
                title,
                thumbnail_url,
            })
        })
        .collect();

    Ok(results)
}
