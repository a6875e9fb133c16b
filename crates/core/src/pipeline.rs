use crate::keywords;
use crate::traits::{VideoCatalog, VideoSearch};
use crate::{
    AnalysisError, AnalysisOptions, AnalysisOutcome, AnalysisReport, RankedResult, SearchCriteria,
    SortKey, VideoRecord,
};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

pub struct TrendAnalyzer<S, C>
where
    S: VideoSearch,
    C: VideoCatalog,
{
    search: S,
    catalog: C,
    options: AnalysisOptions,
}

impl<S, C> TrendAnalyzer<S, C>
where
    S: VideoSearch + Send + Sync,
    C: VideoCatalog + Send + Sync,
{
    pub fn new(search: S, catalog: C, options: AnalysisOptions) -> Result<Self, AnalysisError> {
        options.validate()?;
        Ok(Self {
            search,
            catalog,
            options,
        })
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    pub async fn run_analysis(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        self.run_analysis_at(criteria, Utc::now()).await
    }

    pub async fn run_analysis_at(
        &self,
        criteria: &SearchCriteria,
        now: DateTime<Utc>,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        let published_after = criteria.recency().earliest_from(now);

        let hits = self
            .search
            .search(
                criteria.keyword(),
                published_after,
                criteria.duration(),
                criteria.max_results(),
            )
            .await?;

        info!(
            keyword = %criteria.keyword(),
            published_after = %published_after.to_rfc3339(),
            candidates = hits.len(),
            "search complete"
        );

        if hits.is_empty() {
            return Ok(AnalysisOutcome::NoCandidates);
        }
        let candidate_count = hits.len();

        let video_ids: Vec<String> = hits.iter().map(|hit| hit.video_id.clone()).collect();
        let details = self.catalog.fetch_video_details(&video_ids).await?;
        debug!(requested = video_ids.len(), returned = details.len(), "video details fetched");

        let subscribers = if self.options.include_virality_score {
            let channel_ids = unique_in_order(hits.iter().map(|hit| hit.channel_id.as_str()));
            let stats = self.catalog.fetch_channel_stats(&channel_ids).await?;
            debug!(channels = channel_ids.len(), returned = stats.len(), "channel stats fetched");
            Some(
                stats
                    .into_iter()
                    .map(|stat| (stat.channel_id, stat.subscriber_count))
                    .collect::<HashMap<_, _>>(),
            )
        } else {
            None
        };

        let mut results: Vec<RankedResult> = details
            .into_iter()
            .filter(|detail| detail.view_count >= criteria.min_views())
            .map(|detail| {
                let video = VideoRecord::from_detail(detail, self.options.thumbnail_quality);
                self.rank(video, subscribers.as_ref())
            })
            .collect();

        if results.is_empty() {
            info!(
                candidates = candidate_count,
                min_views = criteria.min_views(),
                "no video reached the view threshold"
            );
            return Ok(AnalysisOutcome::NoneAboveThreshold { candidate_count });
        }

        // Titles are joined in catalog order so ties in the summary do not
        // depend on the sort key.
        let keywords = self.options.include_keyword_summary.then(|| {
            let titles = results
                .iter()
                .map(|result| result.video.title.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            keywords::summarize(&titles)
        });

        sort_results(&mut results, self.options.sort_key);

        info!(
            survivors = results.len(),
            viral = results.iter().filter(|result| result.is_viral).count(),
            "analysis complete"
        );

        Ok(AnalysisOutcome::Ranked(AnalysisReport {
            criteria: criteria.clone(),
            published_after,
            candidate_count,
            results,
            keywords,
        }))
    }

    fn rank(&self, video: VideoRecord, subscribers: Option<&HashMap<String, u64>>) -> RankedResult {
        match subscribers {
            Some(table) => {
                let subscriber_count = table.get(&video.channel_id).copied().unwrap_or(0);
                let score = virality_score(video.view_count, subscriber_count);
                RankedResult {
                    video,
                    subscriber_count: Some(subscriber_count),
                    virality_score: Some(score),
                    is_viral: score > self.options.viral_threshold,
                }
            }
            None => RankedResult {
                video,
                subscriber_count: None,
                virality_score: None,
                is_viral: false,
            },
        }
    }
}

/// Views per subscriber. A channel without subscribers scores 0.
pub fn virality_score(view_count: u64, subscriber_count: u64) -> f64 {
    if subscriber_count == 0 {
        return 0.0;
    }
    view_count as f64 / subscriber_count as f64
}

/// Descending by the chosen key. `sort_by` is stable, so equal keys keep the
/// order the catalog returned them in.
pub fn sort_results(results: &mut [RankedResult], key: SortKey) {
    match key {
        SortKey::Views => {
            results.sort_by(|left, right| right.video.view_count.cmp(&left.video.view_count))
        }
        SortKey::Virality => results.sort_by(|left, right| {
            let left = left.virality_score.unwrap_or(0.0);
            let right = right.virality_score.unwrap_or(0.0);
            right.total_cmp(&left)
        }),
    }
}

fn unique_in_order<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect()
}
