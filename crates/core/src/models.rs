use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Duration filter understood by the search endpoint. The wire values must
/// match the `videoDuration` vocabulary exactly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum DurationBucket {
    #[default]
    Any,
    /// Under 4 minutes.
    Short,
    /// Between 4 and 20 minutes.
    Medium,
    /// Over 20 minutes.
    Long,
}

impl DurationBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            DurationBucket::Any => "any",
            DurationBucket::Short => "short",
            DurationBucket::Medium => "medium",
            DurationBucket::Long => "long",
        }
    }
}

impl fmt::Display for DurationBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DurationBucket {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "any" => Ok(DurationBucket::Any),
            "short" => Ok(DurationBucket::Short),
            "medium" => Ok(DurationBucket::Medium),
            "long" => Ok(DurationBucket::Long),
            _ => Err(ValidationError::UnknownVariant {
                kind: "duration bucket",
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Views,
    Virality,
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Views => f.write_str("views"),
            SortKey::Virality => f.write_str("virality"),
        }
    }
}

impl FromStr for SortKey {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "views" => Ok(SortKey::Views),
            "virality" => Ok(SortKey::Virality),
            _ => Err(ValidationError::UnknownVariant {
                kind: "sort key",
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailQuality {
    Default,
    Medium,
    #[default]
    High,
    Maxres,
}

impl fmt::Display for ThumbnailQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ThumbnailQuality::Default => "default",
            ThumbnailQuality::Medium => "medium",
            ThumbnailQuality::High => "high",
            ThumbnailQuality::Maxres => "maxres",
        };
        f.write_str(label)
    }
}

impl FromStr for ThumbnailQuality {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(ThumbnailQuality::Default),
            "medium" => Ok(ThumbnailQuality::Medium),
            "high" => Ok(ThumbnailQuality::High),
            "maxres" => Ok(ThumbnailQuality::Maxres),
            _ => Err(ValidationError::UnknownVariant {
                kind: "thumbnail quality",
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Thumbnail {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Thumbnails {
    #[serde(default)]
    pub default: Option<Thumbnail>,
    #[serde(default)]
    pub medium: Option<Thumbnail>,
    #[serde(default)]
    pub high: Option<Thumbnail>,
    #[serde(default)]
    pub standard: Option<Thumbnail>,
    #[serde(default)]
    pub maxres: Option<Thumbnail>,
}

impl Thumbnails {
    /// Returns the requested variant, falling back to lower resolutions first
    /// and then to higher ones.
    pub fn pick(&self, quality: ThumbnailQuality) -> Option<&str> {
        let ladder = [
            &self.default,
            &self.medium,
            &self.high,
            &self.standard,
            &self.maxres,
        ];
        let start = match quality {
            ThumbnailQuality::Default => 0,
            ThumbnailQuality::Medium => 1,
            ThumbnailQuality::High => 2,
            ThumbnailQuality::Maxres => 4,
        };

        ladder[..=start]
            .iter()
            .rev()
            .chain(ladder[start + 1..].iter())
            .copied()
            .find_map(|variant| variant.as_ref().map(|thumb| thumb.url.as_str()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub video_id: String,
    pub channel_id: String,
    pub title: String,
    pub channel_name: String,
    pub published_at: DateTime<Utc>,
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoDetail {
    pub video_id: String,
    pub title: String,
    pub channel_id: String,
    pub channel_name: String,
    pub published_at: DateTime<Utc>,
    pub view_count: u64,
    pub tags: Vec<String>,
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelStat {
    pub channel_id: String,
    pub subscriber_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoRecord {
    pub id: String,
    pub title: String,
    pub channel_id: String,
    pub channel_name: String,
    pub view_count: u64,
    pub published_at: DateTime<Utc>,
    pub thumbnail_url: String,
    pub tags: Vec<String>,
}

impl VideoRecord {
    pub fn from_detail(detail: VideoDetail, quality: ThumbnailQuality) -> Self {
        let thumbnail_url = detail
            .thumbnails
            .pick(quality)
            .unwrap_or_default()
            .to_string();

        Self {
            id: detail.video_id,
            title: detail.title,
            channel_id: detail.channel_id,
            channel_name: detail.channel_name,
            view_count: detail.view_count,
            published_at: detail.published_at,
            thumbnail_url,
            tags: detail.tags,
        }
    }

    pub fn watch_url(&self) -> String {
        format!("https://youtu.be/{}", self.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedResult {
    #[serde(flatten)]
    pub video: VideoRecord,
    pub subscriber_count: Option<u64>,
    pub virality_score: Option<f64>,
    pub is_viral: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeywordCount {
    pub word: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub criteria: crate::SearchCriteria,
    pub published_after: DateTime<Utc>,
    pub candidate_count: usize,
    pub results: Vec<RankedResult>,
    pub keywords: Option<Vec<KeywordCount>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    /// The search returned no candidates at all.
    NoCandidates,
    /// Candidates were found but none reached the minimum view count.
    NoneAboveThreshold { candidate_count: usize },
    Ranked(AnalysisReport),
}

impl AnalysisOutcome {
    pub fn report(&self) -> Option<&AnalysisReport> {
        match self {
            AnalysisOutcome::Ranked(report) => Some(report),
            _ => None,
        }
    }
}
