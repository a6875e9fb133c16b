use serde::Serialize;
use std::io::{self, Write};
use trend_scout_core::{AnalysisOutcome, AnalysisReport, KeywordCount, RankedResult};

const TITLE_WIDTH: usize = 48;

const CSV_HEADERS: [&str; 9] = [
    "title",
    "channel",
    "views",
    "subscribers",
    "virality",
    "viral",
    "published",
    "link",
    "thumbnail",
];

pub fn format_number(num: u64) -> String {
    let digits = num.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

fn truncate_title(title: &str) -> String {
    if title.chars().count() <= TITLE_WIDTH {
        return title.to_string();
    }
    let mut short: String = title.chars().take(TITLE_WIDTH - 1).collect();
    short.push('…');
    short
}

pub fn empty_outcome_message(outcome: &AnalysisOutcome) -> Option<String> {
    match outcome {
        AnalysisOutcome::NoCandidates => Some("No videos matched the search.".to_string()),
        AnalysisOutcome::NoneAboveThreshold { candidate_count } => Some(format!(
            "{candidate_count} videos found, but none reached the minimum view count."
        )),
        AnalysisOutcome::Ranked(_) => None,
    }
}

pub fn write_table<W: Write>(out: &mut W, outcome: &AnalysisOutcome) -> io::Result<()> {
    let report = match outcome {
        AnalysisOutcome::Ranked(report) => report,
        other => {
            if let Some(message) = empty_outcome_message(other) {
                writeln!(out, "{message}")?;
            }
            return Ok(());
        }
    };

    writeln!(
        out,
        "--- \"{}\" since {} ---",
        report.criteria.keyword(),
        report.published_after.format("%Y-%m-%d")
    )?;

    for (rank, result) in report.results.iter().enumerate() {
        write_row(out, rank + 1, result)?;
    }

    if let Some(keywords) = &report.keywords {
        writeln!(out)?;
        writeln!(out, "Trending words: {}", format_keywords(keywords))?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "Found {} of {} videos with at least {} views.",
        report.results.len(),
        report.candidate_count,
        format_number(report.criteria.min_views())
    )
}

fn write_row<W: Write>(out: &mut W, rank: usize, result: &RankedResult) -> io::Result<()> {
    let video = &result.video;
    let marker = if result.is_viral { "*" } else { " " };
    write!(
        out,
        "{rank:>3}.{marker} {:<width$}  {:>13} views",
        truncate_title(&video.title),
        format_number(video.view_count),
        width = TITLE_WIDTH
    )?;
    if let (Some(subscribers), Some(score)) = (result.subscriber_count, result.virality_score) {
        write!(out, "  {:>11} subs  x{score:.2}", format_number(subscribers))?;
    }
    writeln!(
        out,
        "  {}  {}  {}",
        video.published_at.format("%Y-%m-%d"),
        video.channel_name,
        video.watch_url()
    )
}

fn format_keywords(keywords: &[KeywordCount]) -> String {
    if keywords.is_empty() {
        return "-".to_string();
    }
    keywords
        .iter()
        .map(|entry| format!("{} ({})", entry.word, entry.count))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn write_json<W: Write>(out: &mut W, outcome: &AnalysisOutcome) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, outcome)?;
    writeln!(out)?;
    Ok(())
}

#[derive(Serialize)]
struct CsvRow<'a> {
    title: &'a str,
    channel: &'a str,
    views: u64,
    subscribers: Option<u64>,
    virality: Option<String>,
    viral: bool,
    published: String,
    link: String,
    thumbnail: &'a str,
}

impl<'a> From<&'a RankedResult> for CsvRow<'a> {
    fn from(result: &'a RankedResult) -> Self {
        Self {
            title: &result.video.title,
            channel: &result.video.channel_name,
            views: result.video.view_count,
            subscribers: result.subscriber_count,
            virality: result.virality_score.map(|score| format!("{score:.2}")),
            viral: result.is_viral,
            published: result.video.published_at.format("%Y-%m-%d").to_string(),
            link: result.video.watch_url(),
            thumbnail: &result.video.thumbnail_url,
        }
    }
}

/// Writes the header even for empty outcomes so downstream tools always see
/// the same columns.
pub fn write_csv<W: Write>(out: &mut W, outcome: &AnalysisOutcome) -> anyhow::Result<()> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    writer.write_record(CSV_HEADERS)?;
    if let Some(report) = outcome.report() {
        for result in &report.results {
            writer.serialize(CsvRow::from(result))?;
        }
    }
    writer.flush()?;
    Ok(())
}

pub fn write_keywords<W: Write>(out: &mut W, keywords: &[KeywordCount]) -> io::Result<()> {
    if keywords.is_empty() {
        return writeln!(out, "No words longer than one character.");
    }
    for (rank, entry) in keywords.iter().enumerate() {
        writeln!(out, "{:>2}. {} ({})", rank + 1, entry.word, entry.count)?;
    }
    Ok(())
}

pub fn summary_line(report: &AnalysisReport) -> String {
    format!(
        "{} of {} candidates kept",
        report.results.len(),
        report.candidate_count
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use trend_scout_core::{DurationBucket, SearchCriteria, VideoRecord};

    fn result(id: &str, title: &str, views: u64, subscribers: Option<u64>) -> RankedResult {
        let score = subscribers.map(|subs| trend_scout_core::virality_score(views, subs));
        RankedResult {
            video: VideoRecord {
                id: id.to_string(),
                title: title.to_string(),
                channel_id: "UC1".to_string(),
                channel_name: "Wanderer".to_string(),
                view_count: views,
                published_at: Utc.with_ymd_and_hms(2024, 6, 20, 8, 0, 0).unwrap(),
                thumbnail_url: format!("https://i.ytimg.com/vi/{id}/hqdefault.jpg"),
                tags: Vec::new(),
            },
            subscriber_count: subscribers,
            virality_score: score,
            is_viral: score.is_some_and(|score| score > 5.0),
        }
    }

    fn outcome() -> AnalysisOutcome {
        AnalysisOutcome::Ranked(AnalysisReport {
            criteria: SearchCriteria::new("travel", 10, 10_000, 5, DurationBucket::Any).unwrap(),
            published_after: Utc.with_ymd_and_hms(2024, 6, 20, 0, 0, 0).unwrap(),
            candidate_count: 5,
            results: vec![
                result("abc", "Seoul, Busan and Jeju", 1_234_567, Some(100_000)),
                result("def", "Quiet morning", 12_000, Some(0)),
            ],
            keywords: Some(vec![KeywordCount {
                word: "Seoul".to_string(),
                count: 1,
            }]),
        })
    }

    #[test]
    fn numbers_are_grouped_by_thousands() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_000), "1,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn long_titles_are_truncated_on_char_boundaries() {
        let title = "여행".repeat(40);
        let short = truncate_title(&title);
        assert_eq!(short.chars().count(), TITLE_WIDTH);
        assert!(short.ends_with('…'));
    }

    #[test]
    fn table_lists_results_and_keywords() {
        let mut out = Vec::new();
        write_table(&mut out, &outcome()).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("1,234,567 views"));
        assert!(text.contains("x12.35"));
        assert!(text.contains("https://youtu.be/abc"));
        assert!(text.contains("Trending words: Seoul (1)"));
        assert!(text.contains("Found 2 of 5 videos with at least 10,000 views."));
    }

    #[test]
    fn empty_outcomes_print_a_message() {
        let mut out = Vec::new();
        write_table(&mut out, &AnalysisOutcome::NoCandidates).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No videos matched the search.\n");

        let mut out = Vec::new();
        write_table(
            &mut out,
            &AnalysisOutcome::NoneAboveThreshold { candidate_count: 3 },
        )
        .unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("3 videos found"));
    }

    #[test]
    fn csv_has_header_and_quotes_commas() {
        let mut out = Vec::new();
        write_csv(&mut out, &outcome()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "title,channel,views,subscribers,virality,viral,published,link,thumbnail"
        );
        assert!(lines[1].starts_with("\"Seoul, Busan and Jeju\",Wanderer,1234567,100000,12.35,true,2024-06-20,"));
        assert!(lines[2].starts_with("Quiet morning,Wanderer,12000,0,0.00,false,"));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn csv_for_empty_outcome_is_header_only() {
        let mut out = Vec::new();
        write_csv(&mut out, &AnalysisOutcome::NoCandidates).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }

    #[test]
    fn json_tags_the_outcome() {
        let mut out = Vec::new();
        write_json(&mut out, &outcome()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["outcome"], "ranked");
        assert_eq!(value["results"][0]["id"], "abc");
        assert_eq!(value["results"][1]["virality_score"], 0.0);
        assert_eq!(value["criteria"]["recency"], 10);

        let mut out = Vec::new();
        write_json(&mut out, &AnalysisOutcome::NoCandidates).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["outcome"], "no_candidates");
    }
}
