use crate::{ApiError, ChannelStat, DurationBucket, SearchHit, VideoDetail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait VideoSearch {
    /// Returns at most `limit` candidates published after `published_after`.
    async fn search(
        &self,
        keyword: &str,
        published_after: DateTime<Utc>,
        duration: DurationBucket,
        limit: u32,
    ) -> Result<Vec<SearchHit>, ApiError>;
}

#[async_trait]
pub trait VideoCatalog {
    async fn fetch_video_details(
        &self,
        video_ids: &[String],
    ) -> Result<Vec<VideoDetail>, ApiError>;

    async fn fetch_channel_stats(
        &self,
        channel_ids: &[String],
    ) -> Result<Vec<ChannelStat>, ApiError>;
}
