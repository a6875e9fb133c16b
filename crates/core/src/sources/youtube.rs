use crate::traits::{VideoCatalog, VideoSearch};
use crate::{
    AnalysisError, ApiError, ChannelStat, DurationBucket, SearchHit, Thumbnails, ValidationError,
    VideoDetail,
};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Upper bound on `maxResults` for search pages and on ids per
/// `videos`/`channels` request.
pub const MAX_PAGE_SIZE: usize = 50;

const API_KEY_HEADER: &str = "X-Goog-Api-Key";

/// Characters of a non-JSON error body kept in a rejection message.
const ERROR_BODY_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone)]
pub struct YouTubeConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl YouTubeConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// YouTube Data API v3 client backing both collaborator traits.
#[derive(Clone)]
pub struct YouTubeClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl YouTubeClient {
    pub fn new(config: YouTubeConfig) -> Result<Self, AnalysisError> {
        let api_key = config.api_key.trim().to_string();
        if api_key.is_empty() {
            return Err(ValidationError::MissingApiKey.into());
        }

        let endpoint = config.base_url.trim_end_matches('/').to_string();
        if Url::parse(&endpoint).map_or(true, |url| url.cannot_be_a_base()) {
            return Err(ValidationError::InvalidBaseUrl(config.base_url).into());
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::from)?;

        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    fn url_for(&self, resource: &str) -> Result<Url, ApiError> {
        Ok(Url::parse(&format!("{}/{}", self.endpoint, resource))?)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let response = self
            .client
            .get(self.url_for(resource)?)
            .header(API_KEY_HEADER, &self.api_key)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(resource, status = status.as_u16(), bytes = body.len(), "youtube response");

        if !status.is_success() {
            return Err(rejection(status.as_u16(), &body));
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl VideoSearch for YouTubeClient {
    async fn search(
        &self,
        keyword: &str,
        published_after: DateTime<Utc>,
        duration: DurationBucket,
        limit: u32,
    ) -> Result<Vec<SearchHit>, ApiError> {
        let limit = limit as usize;
        let published_after = published_after.to_rfc3339_opts(SecondsFormat::Secs, true);
        let mut hits = Vec::with_capacity(limit);
        let mut pager = SearchPager::new(limit);

        while let Some((page_size, page_token)) = pager.next_page() {
            let mut query = vec![
                ("part", "snippet".to_string()),
                ("type", "video".to_string()),
                ("q", keyword.to_string()),
                ("publishedAfter", published_after.clone()),
                ("videoDuration", duration.as_str().to_string()),
                ("maxResults", page_size.to_string()),
            ];
            if let Some(token) = page_token {
                query.push(("pageToken", token));
            }

            let page: SearchListResponse = self.get_json("search", &query).await?;
            let (page_hits, next) = page.into_hits();
            debug!(page_hits = page_hits.len(), has_next = next.is_some(), "search page");

            pager.record(page_hits.len(), next);
            hits.extend(page_hits);
        }

        hits.truncate(limit);
        Ok(hits)
    }
}

#[async_trait]
impl VideoCatalog for YouTubeClient {
    async fn fetch_video_details(
        &self,
        video_ids: &[String],
    ) -> Result<Vec<VideoDetail>, ApiError> {
        let mut details = Vec::with_capacity(video_ids.len());
        for ids in id_batches(video_ids) {
            let query = [("part", "snippet,statistics".to_string()), ("id", ids)];
            let page: VideoListResponse = self.get_json("videos", &query).await?;
            details.extend(page.into_details());
        }
        Ok(details)
    }

    async fn fetch_channel_stats(
        &self,
        channel_ids: &[String],
    ) -> Result<Vec<ChannelStat>, ApiError> {
        let mut stats = Vec::with_capacity(channel_ids.len());
        for ids in id_batches(channel_ids) {
            let query = [("part", "statistics".to_string()), ("id", ids)];
            let page: ChannelListResponse = self.get_json("channels", &query).await?;
            stats.extend(page.into_stats());
        }
        Ok(stats)
    }
}

/// Walks `nextPageToken` until `limit` hits are collected, a page comes back
/// empty, or the API stops handing out tokens.
#[derive(Debug)]
struct SearchPager {
    remaining: usize,
    token: Option<String>,
    exhausted: bool,
}

impl SearchPager {
    fn new(limit: usize) -> Self {
        Self {
            remaining: limit,
            token: None,
            exhausted: false,
        }
    }

    /// `maxResults` and `pageToken` for the next request.
    fn next_page(&mut self) -> Option<(usize, Option<String>)> {
        if self.exhausted || self.remaining == 0 {
            return None;
        }
        Some((self.remaining.min(MAX_PAGE_SIZE), self.token.take()))
    }

    fn record(&mut self, received: usize, next_token: Option<String>) {
        self.remaining = self.remaining.saturating_sub(received);
        match next_token {
            Some(token) if received > 0 => self.token = Some(token),
            _ => self.exhausted = true,
        }
    }
}

/// Comma-joined `id` values, at most [`MAX_PAGE_SIZE`] per request. The id
/// filter does not accept `maxResults`, so the batch size is the only bound.
fn id_batches(ids: &[String]) -> impl Iterator<Item = String> + '_ {
    ids.chunks(MAX_PAGE_SIZE).map(|batch| batch.join(","))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchListResponse {
    #[serde(default)]
    next_page_token: Option<String>,
    #[serde(default)]
    items: Vec<SearchItem>,
}

impl SearchListResponse {
    fn into_hits(self) -> (Vec<SearchHit>, Option<String>) {
        let hits = self
            .items
            .into_iter()
            .filter_map(|item| {
                let video_id = item.id.video_id?;
                Some(SearchHit {
                    video_id,
                    channel_id: item.snippet.channel_id,
                    title: item.snippet.title,
                    channel_name: item.snippet.channel_title,
                    published_at: item.snippet.published_at,
                    thumbnails: item.snippet.thumbnails,
                })
            })
            .collect();
        (hits, self.next_page_token)
    }
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    #[serde(default)]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    published_at: DateTime<Utc>,
    #[serde(default)]
    channel_id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    channel_title: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

impl VideoListResponse {
    fn into_details(self) -> Vec<VideoDetail> {
        self.items
            .into_iter()
            .map(|item| VideoDetail {
                video_id: item.id,
                title: item.snippet.title,
                channel_id: item.snippet.channel_id,
                channel_name: item.snippet.channel_title,
                published_at: item.snippet.published_at,
                view_count: item
                    .statistics
                    .and_then(|stats| stats.view_count)
                    .unwrap_or(0),
                tags: item.snippet.tags,
                thumbnails: item.snippet.thumbnails,
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: String,
    snippet: Snippet,
    #[serde(default)]
    statistics: Option<VideoStatistics>,
}

#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatistics {
    // counts arrive as decimal strings
    #[serde_as(as = "Option<DisplayFromStr>")]
    view_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelItem>,
}

impl ChannelListResponse {
    fn into_stats(self) -> Vec<ChannelStat> {
        self.items
            .into_iter()
            .map(|item| {
                let subscriber_count = item
                    .statistics
                    .filter(|stats| !stats.hidden_subscriber_count)
                    .and_then(|stats| stats.subscriber_count)
                    .unwrap_or(0);
                ChannelStat {
                    channel_id: item.id,
                    subscriber_count,
                }
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct ChannelItem {
    id: String,
    #[serde(default)]
    statistics: Option<ChannelStatistics>,
}

#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelStatistics {
    #[serde_as(as = "Option<DisplayFromStr>")]
    subscriber_count: Option<u64>,
    #[serde(default)]
    hidden_subscriber_count: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    reason: String,
}

/// Turns a non-2xx response into [`ApiError::Rejected`], pulling the reason
/// (`quotaExceeded`, `keyInvalid`, ...) out of the Google error envelope when
/// the body has one.
fn rejection(status: u16, body: &str) -> ApiError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => ApiError::Rejected {
            status,
            reason: envelope
                .error
                .errors
                .into_iter()
                .map(|detail| detail.reason)
                .find(|reason| !reason.is_empty())
                .unwrap_or_else(|| "unknown".to_string()),
            message: envelope.error.message,
        },
        Err(_) => ApiError::Rejected {
            status,
            reason: "unknown".to_string(),
            message: body.chars().take(ERROR_BODY_PREVIEW_CHARS).collect(),
        },
    }
}
