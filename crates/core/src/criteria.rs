use crate::error::ValidationError;
use crate::models::{DurationBucket, SortKey, ThumbnailQuality};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

pub const MAX_RESULTS_LIMIT: u32 = 100;
pub const DEFAULT_VIRAL_THRESHOLD: f64 = 5.0;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, Default)]
#[serde(into = "u32")]
pub enum RecencyWindow {
    #[default]
    Days10,
    Days20,
    Days30,
}

impl RecencyWindow {
    pub fn days(&self) -> u32 {
        match self {
            RecencyWindow::Days10 => 10,
            RecencyWindow::Days20 => 20,
            RecencyWindow::Days30 => 30,
        }
    }

    /// Earliest publish time still inside the window.
    pub fn earliest_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(i64::from(self.days()))
    }
}

impl TryFrom<u32> for RecencyWindow {
    type Error = ValidationError;

    fn try_from(days: u32) -> Result<Self, Self::Error> {
        match days {
            10 => Ok(RecencyWindow::Days10),
            20 => Ok(RecencyWindow::Days20),
            30 => Ok(RecencyWindow::Days30),
            other => Err(ValidationError::UnsupportedRecency(other)),
        }
    }
}

impl From<RecencyWindow> for u32 {
    fn from(window: RecencyWindow) -> Self {
        window.days()
    }
}

/// Filter criteria for one analysis run. Only constructible through
/// [`SearchCriteria::new`], so every instance has already been validated.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SearchCriteria {
    keyword: String,
    recency: RecencyWindow,
    min_views: u64,
    max_results: u32,
    duration: DurationBucket,
}

impl SearchCriteria {
    pub fn new(
        keyword: impl AsRef<str>,
        recency_days: u32,
        min_views: u64,
        max_results: u32,
        duration: DurationBucket,
    ) -> Result<Self, ValidationError> {
        let keyword = keyword.as_ref().trim();
        if keyword.is_empty() {
            return Err(ValidationError::EmptyKeyword);
        }

        let recency = RecencyWindow::try_from(recency_days)?;

        if !(1..=MAX_RESULTS_LIMIT).contains(&max_results) {
            return Err(ValidationError::MaxResultsOutOfRange(max_results));
        }

        Ok(Self {
            keyword: keyword.to_string(),
            recency,
            min_views,
            max_results,
            duration,
        })
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn recency(&self) -> RecencyWindow {
        self.recency
    }

    pub fn min_views(&self) -> u64 {
        self.min_views
    }

    pub fn max_results(&self) -> u32 {
        self.max_results
    }

    pub fn duration(&self) -> DurationBucket {
        self.duration
    }
}

/// Feature switches that reproduce every dashboard variant with one pipeline.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct AnalysisOptions {
    pub include_virality_score: bool,
    pub include_keyword_summary: bool,
    pub sort_key: SortKey,
    /// A result is flagged viral when its score is strictly above this.
    pub viral_threshold: f64,
    pub thumbnail_quality: ThumbnailQuality,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            include_virality_score: true,
            include_keyword_summary: true,
            sort_key: SortKey::Views,
            viral_threshold: DEFAULT_VIRAL_THRESHOLD,
            thumbnail_quality: ThumbnailQuality::High,
        }
    }
}

impl AnalysisOptions {
    /// The earliest dashboard: a plain views table.
    pub fn views_only() -> Self {
        Self {
            include_virality_score: false,
            include_keyword_summary: false,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sort_key == SortKey::Virality && !self.include_virality_score {
            return Err(ValidationError::ViralitySortDisabled);
        }
        if !self.viral_threshold.is_finite() || self.viral_threshold < 0.0 {
            return Err(ValidationError::InvalidViralThreshold(self.viral_threshold));
        }
        Ok(())
    }
}
