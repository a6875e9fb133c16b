pub mod criteria;
pub mod error;
pub mod keywords;
pub mod models;
pub mod pipeline;
pub mod sources;
pub mod traits;

pub use criteria::{AnalysisOptions, RecencyWindow, SearchCriteria, DEFAULT_VIRAL_THRESHOLD};
pub use error::{AnalysisError, ApiError, ValidationError};
pub use keywords::{summarize, summarize_top, tokenize, TOP_KEYWORDS};
pub use models::{
    AnalysisOutcome, AnalysisReport, ChannelStat, DurationBucket, KeywordCount, RankedResult,
    SearchHit, SortKey, Thumbnail, ThumbnailQuality, Thumbnails, VideoDetail, VideoRecord,
};
pub use pipeline::{sort_results, virality_score, TrendAnalyzer};
pub use sources::{YouTubeClient, YouTubeConfig};
pub use traits::{VideoCatalog, VideoSearch};
