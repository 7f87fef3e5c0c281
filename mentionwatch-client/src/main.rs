//! `mentionwatch` command-line entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::builder::RangedU64ValueParser;
use clap::{Args, Parser, Subcommand};

use mentionwatch_client::config::MentionWatchConfig;
use mentionwatch_client::error::{ClientError, ClientResult};
use mentionwatch_client::{present, telemetry, App};
use mentionwatch_core::mention::SentimentParseError;
use mentionwatch_core::{KeywordIngestRequest, Query, Sentiment, SourceIngestRequest};

#[derive(Parser)]
#[command(name = "mentionwatch")]
#[command(about = "Monitor, filter and act on classified news mentions")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file (falls back to MENTIONWATCH_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show one page of the mention feed
    Mentions(FeedArgs),

    /// Same as `mentions`, bypassing any cached result
    Refresh(FeedArgs),

    /// Flag an article for editorial review
    Flag {
        article_id: String,
        /// Why the article needs attention
        #[arg(long, default_value = "")]
        reason: String,
    },

    /// Suggest journalists for a piece of text
    Match {
        text: String,
        #[arg(long, default_value_t = 5)]
        top_k: u32,
    },

    /// Ingest articles for one or more keywords
    Ingest {
        /// Keyword to ingest (repeatable)
        #[arg(long = "keyword", required = true)]
        keywords: Vec<String>,
        #[arg(long, default_value_t = 5)]
        per_keyword_limit: u32,
        /// Overall cap (defaults to keywords x per-keyword limit)
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Ingest articles from a configured source
    IngestSource {
        #[arg(long, default_value = "demo")]
        source: String,
        #[arg(long, default_value_t = 10)]
        limit: u32,
        #[arg(long, default_value_t = 2)]
        backfill_days: u32,
        #[arg(long)]
        dry_run: bool,
    },

    /// Check backend health
    Health,

    /// Show backend-wide counters
    Stats,
}

#[derive(Args)]
struct FeedArgs {
    /// Number of mentions requested from the backend
    #[arg(long)]
    limit: Option<u32>,
    /// Exact source name (repeatable)
    #[arg(long = "source")]
    sources: Vec<String>,
    /// positive, negative, neutral or all
    #[arg(long, default_value = "all", value_parser = parse_sentiment_filter)]
    sentiment: SentimentFilter,
    /// Only flagged mentions
    #[arg(long)]
    flagged: bool,
    /// Case-insensitive match against title and summary
    #[arg(long)]
    search: Option<String>,
    /// Case-insensitive match against the source name
    #[arg(long)]
    source_contains: Option<String>,
    #[arg(long, default_value_t = 1)]
    page: usize,
    /// Mentions per page, e.g. 5, 10 or 20 (defaults to the configured page_size)
    #[arg(long, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    page_size: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
struct SentimentFilter(Option<Sentiment>);

fn parse_sentiment_filter(s: &str) -> Result<SentimentFilter, SentimentParseError> {
    Sentiment::parse_filter(s).map(SentimentFilter)
}

impl FeedArgs {
    fn query(&self, default_limit: u32) -> Query {
        let mut query = Query::new(self.limit.unwrap_or(default_limit))
            .with_sources(self.sources.iter().cloned())
            .with_sentiment(self.sentiment.0)
            .flagged_only(self.flagged);
        if let Some(text) = &self.search {
            query = query.with_free_text(text);
        }
        if let Some(fragment) = &self.source_contains {
            query = query.with_source_contains(fragment);
        }
        query
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config = MentionWatchConfig::load(cli.config.as_deref())?;
    telemetry::init_logging(&config.logging)?;
    let app = App::new(config)?;

    match cli.command {
        Command::Mentions(args) => show_feed(&app, &args, false).await,
        Command::Refresh(args) => show_feed(&app, &args, true).await,
        Command::Flag { article_id, reason } => {
            let result = app.actions.flag(&article_id, &reason).await?;
            println!("flagged article {}: {}", result.article_id, result.reason);
            Ok(())
        }
        Command::Match { text, top_k } => {
            let matches = app.actions.suggest_journalists(&text, top_k).await?;
            println!("{}", present::render_matches(&matches));
            Ok(())
        }
        Command::Ingest {
            keywords,
            per_keyword_limit,
            limit,
        } => {
            let mut request = KeywordIngestRequest::new(keywords, per_keyword_limit);
            if let Some(limit) = limit {
                request = request.with_limit(limit);
            }
            let result = app.actions.ingest_by_keywords(&request).await?;
            println!("{}", present::render_ingest(&result));
            Ok(())
        }
        Command::IngestSource {
            source,
            limit,
            backfill_days,
            dry_run,
        } => {
            let request = SourceIngestRequest {
                source,
                limit,
                backfill_days,
                dry_run,
            };
            let result = app.actions.ingest_by_source_config(&request).await?;
            println!("{}", present::render_ingest(&result));
            Ok(())
        }
        Command::Health => {
            let status = app.actions.health().await?;
            println!("{}", present::render_health(&status));
            Ok(())
        }
        Command::Stats => {
            let stats = app.actions.backend_stats().await?;
            println!("{}", present::render_backend_stats(&stats));
            Ok(())
        }
    }
}

async fn show_feed(app: &App, args: &FeedArgs, fresh: bool) -> ClientResult<()> {
    let query = args.query(app.config.default_limit);
    let page = app.page_request_sized(args.page, args.page_size);
    let view = if fresh {
        app.feed.refresh(&query, page).await
    } else {
        app.feed.view(&query, page).await
    };
    println!("{}", present::render_view(&view));

    // Stale data was still shown; only a fetch with nothing to fall back on fails.
    match view.error {
        Some(err) if !view.stale => Err(ClientError::Fetch(err)),
        _ => Ok(()),
    }
}
