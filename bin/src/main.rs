//! CLI for the fd-sentiment ticker sentiment pipeline.
//!
//! This binary runs scoring batches over a directory of scraped comments,
//! inspects the stored snapshot history, and exposes the matcher and cleaner
//! for ad-hoc checks.

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use fd_sentiment::{
    ExclusionSet, HistoryPoint, JsonDirectorySource, MemorySink, PipelineConfig, ScoredSnapshot,
    SentimentContext, SqliteSnapshotStore, TickerMatcher, Vocabulary, clean_text,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG_FILE: &str = "sentiment.toml";

#[derive(Parser)]
#[command(name = "fd-sentiment")]
#[command(about = "Ticker mention extraction and sentiment scoring", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score every ticker mentioned in the configured subreddits
    Run {
        /// Print the snapshots without writing them to the store
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the snapshots of the most recent run
    Latest {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show the score history of one ticker
    History {
        /// Ticker symbol, any case
        ticker: String,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print the cleaned form of a comment
    Clean {
        /// Comment text
        text: String,
    },
    /// Print the tickers found in a comment
    Extract {
        /// Comment text
        text: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Clean { text } => {
            println!("{}", clean_text(&text));
            Ok(())
        }
        Commands::Extract { text } => {
            let config = load_config(cli.config.as_deref())?;
            let hits = build_matcher(&config).extract(&text).join(" ");
            println!("{}", hits);
            Ok(())
        }
        Commands::Run { dry_run } => {
            let config = load_config(cli.config.as_deref())?;
            run(&config, dry_run)
        }
        Commands::Latest { json } => {
            let config = load_config(cli.config.as_deref())?;
            let store = open_store(&config)?;
            let snapshots = store.latest()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshots)?);
            } else {
                print!("{}", render_snapshots(&snapshots));
            }
            Ok(())
        }
        Commands::History { ticker, json } => {
            let config = load_config(cli.config.as_deref())?;
            let store = open_store(&config)?;
            let history = store.history(&ticker)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&history)?);
            } else {
                print!("{}", render_history(&ticker.to_uppercase(), &history));
            }
            Ok(())
        }
    }
}

/// Install the fmt subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load `path`, or `sentiment.toml` if present, or the defaults.
fn load_config(path: Option<&Path>) -> anyhow::Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display())),
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            PipelineConfig::from_file(DEFAULT_CONFIG_FILE)
                .with_context(|| format!("loading {}", DEFAULT_CONFIG_FILE))
        }
        None => Ok(PipelineConfig::default()),
    }
}

fn build_matcher(config: &PipelineConfig) -> TickerMatcher {
    let vocabulary = Vocabulary::load(&config.vocabulary);
    let exclusions = ExclusionSet::new(config.vocabulary.exclusions.iter().cloned());
    TickerMatcher::new(vocabulary, exclusions)
        .with_max_comment_chars(config.matcher.max_comment_chars)
}

fn open_store(config: &PipelineConfig) -> anyhow::Result<SqliteSnapshotStore> {
    let path = &config.store.database_path;
    SqliteSnapshotStore::open(path, config.scoring.policy)
        .with_context(|| format!("opening {}", path.display()))
}

fn run(config: &PipelineConfig, dry_run: bool) -> anyhow::Result<()> {
    tracing::info!(
        subreddits = config.source.subreddits.len(),
        root = %config.source.root.display(),
        dry_run,
        "starting sentiment run"
    );
    let context = SentimentContext::initialize(config)?;
    let mut source = JsonDirectorySource::new(&config.source.root);

    let summary = if dry_run {
        let mut sink = MemorySink::new();
        context.run(&mut source, &config.source, &mut sink)?
    } else {
        let mut store = open_store(config)?;
        context.run(&mut source, &config.source, &mut store)?
    };

    if summary.fetch_failures > 0 {
        tracing::warn!(failures = summary.fetch_failures, "some posts could not be fetched");
    }
    print!("{}", render_snapshots(&summary.snapshots));
    println!(
        "\n{} tickers from {} comments in {} posts ({} fetch failures)",
        summary.snapshots.len(),
        summary.comments_seen,
        summary.posts_read,
        summary.fetch_failures
    );
    Ok(())
}

/// Snapshots as an aligned table, busiest tickers first.
fn render_snapshots(snapshots: &[ScoredSnapshot]) -> String {
    if snapshots.is_empty() {
        return "No snapshots\n".to_string();
    }

    let mut rows: Vec<&ScoredSnapshot> = snapshots.iter().collect();
    rows.sort_by(|a, b| {
        b.mention_count
            .cmp(&a.mention_count)
            .then_with(|| a.ticker.cmp(&b.ticker))
    });

    let mut out = format!("{:<8} {:>8} {:>6}  {}\n", "TICKER", "MENTIONS", "SCORE", "LABEL");
    for s in rows {
        out.push_str(&format!(
            "{:<8} {:>8} {:>6.2}  {}\n",
            s.ticker, s.mention_count, s.sentiment_score, s.sentiment_label
        ));
    }
    out
}

/// History as one line per run, timestamps in local time.
fn render_history(ticker: &str, history: &[HistoryPoint]) -> String {
    if history.is_empty() {
        return format!("No history for {}\n", ticker);
    }

    let mut out = format!("{}\n", ticker);
    for point in history {
        out.push_str(&format!(
            "  {}  {:.2}\n",
            point.timestamp.with_timezone(&Local).format("%b %d, %H:%M"),
            point.sentiment_score
        ));
    }
    out
}
