mod render;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use trend_scout_core::sources::youtube::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use trend_scout_core::{
    summarize_top, AnalysisOptions, AnalysisOutcome, DurationBucket, SearchCriteria, SortKey,
    ThumbnailQuality, TrendAnalyzer, YouTubeClient, YouTubeConfig, TOP_KEYWORDS,
};

#[derive(Parser)]
#[command(name = "trend-scout", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// YouTube Data API key
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// YouTube Data API base URL
    #[arg(long, env = "YOUTUBE_API_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    api_base_url: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs(), global = true)]
    timeout_secs: u64,

    /// Log at debug level regardless of RUST_LOG
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Search recent uploads and rank them by views or virality.
    Analyze {
        /// Search keyword
        #[arg(short, long)]
        keyword: String,
        /// Only videos published in the last 10, 20 or 30 days.
        #[arg(long, default_value = "10")]
        days: u32,
        /// Drop videos with fewer views than this.
        #[arg(long, default_value = "10000")]
        min_views: u64,
        /// Number of search candidates to fetch (1-100).
        #[arg(long, default_value = "20")]
        max_results: u32,
        /// Video length: any, short (<4 min), medium (4-20 min), long (>20 min).
        #[arg(long, default_value = "any")]
        duration: DurationBucket,
        /// Sort by views or virality.
        #[arg(long, default_value = "views")]
        sort: SortKey,
        /// Skip the subscriber lookup and virality score.
        #[arg(long, default_value_t = false)]
        no_virality: bool,
        /// Skip the trending-words summary.
        #[arg(long, default_value_t = false)]
        no_keywords: bool,
        /// Views-per-subscriber ratio above which a video is flagged viral.
        #[arg(long, default_value_t = trend_scout_core::DEFAULT_VIRAL_THRESHOLD)]
        viral_threshold: f64,
        /// Thumbnail resolution: default, medium, high or maxres.
        #[arg(long, default_value = "high")]
        thumbnail: ThumbnailQuality,
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        /// Write output to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the most frequent words of a text without calling the API.
    Keywords {
        /// Text to summarize. Reads stdin when omitted.
        #[arg(long)]
        text: Option<String>,
        /// Number of words to print.
        #[arg(long, default_value_t = TOP_KEYWORDS)]
        top: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

fn open_output(path: Option<&PathBuf>) -> anyhow::Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("unable to create {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        started_at = %Utc::now().to_rfc3339(),
        "trend-scout boot"
    );

    match cli.command {
        Command::Analyze {
            keyword,
            days,
            min_views,
            max_results,
            duration,
            sort,
            no_virality,
            no_keywords,
            viral_threshold,
            thumbnail,
            format,
            output,
        } => {
            let criteria = SearchCriteria::new(&keyword, days, min_views, max_results, duration)?;
            let options = AnalysisOptions {
                include_virality_score: !no_virality,
                include_keyword_summary: !no_keywords,
                sort_key: sort,
                viral_threshold,
                thumbnail_quality: thumbnail,
            };

            let client = YouTubeClient::new(YouTubeConfig {
                api_key: cli.api_key.unwrap_or_default(),
                base_url: cli.api_base_url,
                timeout: Duration::from_secs(cli.timeout_secs),
            })?;
            let analyzer = TrendAnalyzer::new(client.clone(), client, options)?;

            let outcome = analyzer.run_analysis(&criteria).await?;
            match &outcome {
                AnalysisOutcome::Ranked(report) => {
                    info!(summary = %render::summary_line(report), "rendering results")
                }
                other => warn!(
                    outcome = %render::empty_outcome_message(other).unwrap_or_default(),
                    "nothing to rank"
                ),
            }

            let mut out = open_output(output.as_ref())?;
            match format {
                OutputFormat::Table => render::write_table(&mut out, &outcome)?,
                OutputFormat::Json => render::write_json(&mut out, &outcome)?,
                OutputFormat::Csv => render::write_csv(&mut out, &outcome)?,
            }
            out.flush()?;

            if let Some(path) = output {
                println!("wrote {format:?} output to {}", path.display());
            }
        }
        Command::Keywords { text, top } => {
            let text = match text {
                Some(text) => text,
                None => {
                    let mut buffer = String::new();
                    io::stdin()
                        .read_to_string(&mut buffer)
                        .context("unable to read stdin")?;
                    buffer
                }
            };

            let keywords = summarize_top(&text, top);
            let mut out = io::stdout().lock();
            render::write_keywords(&mut out, &keywords)?;
        }
    }

    Ok(())
}
