mod analyze;
mod display;
mod fetch;
mod telemetry;

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use gdmonitor_store::SqliteStore;
use gdmonitor_sync::GazetteClient;

const DEFAULT_FEED_URL: &str = "https://magyarkozlony.hu/feed";

#[derive(Parser)]
#[command(
    name = "gdmonitor",
    version,
    about = "Watches the Hungarian official gazette for resolutions on municipal finance"
)]
struct Cli {
    /// SQLite database of downloaded gazettes.
    #[arg(long, env = "DB_FILE", default_value = "gazettes.db", global = true)]
    db_file: PathBuf,

    /// Directory the gazette PDFs are downloaded to.
    #[arg(long, env = "DOWNLOAD_PATH", default_value = "downloads", global = true)]
    download_path: PathBuf,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, env = "GDMONITOR_LOG", default_value = "info", global = true)]
    log_level: String,

    /// Print batch reports as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(flatten)]
    feed: FeedArgs,

    #[command(flatten)]
    model: ModelArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Args, Clone)]
struct FeedArgs {
    /// RSS feed of the gazette office.
    #[arg(long, env = "FEED_URL", default_value = DEFAULT_FEED_URL, global = true)]
    feed_url: String,

    /// Extra trusted root certificate (PEM) for the gazette site.
    #[arg(long, env = "CERTIFICATE_PATH", global = true)]
    certificate: Option<PathBuf>,

    /// Only fetch issues published after this day (YYYY-MM-DD).
    #[arg(long, env = "SINCE_DATE", value_parser = parse_date, global = true)]
    since: Option<NaiveDate>,
}

#[derive(Args, Clone)]
struct ModelArgs {
    /// Extra abbreviations for the sentence segmenter, one per line.
    #[arg(long, env = "SEGMENTER_MODEL", global = true)]
    segmenter_model: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Download gazette issues that are new in the feed.
    Fetch,
    /// Analyze every downloaded gazette that has not been analyzed yet.
    Analyze,
    /// Fetch, then analyze (the default).
    Run,
    /// Show stored summaries of relevant resolutions.
    Summaries {
        /// Only this gazette.
        #[arg(long)]
        gazette: Option<i64>,
    },
    /// Show gazette and summary counts.
    Status,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD, got {s:?}: {e}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    telemetry::init(&cli.log_level)?;
    tracing::debug!("gdmonitor v{}", env!("CARGO_PKG_VERSION"));

    match cli.command.unwrap_or(Command::Run) {
        Command::Fetch => {
            let store = open_store(&cli.db_file)?;
            let client = gazette_client(&cli.feed)?;
            let stats = fetch::fetch_new(&client, &store, &cli.download_path, cli.feed.since).await?;
            display::print_fetch_stats(&stats);
        }
        Command::Analyze => {
            let scorer = analyze::load_scorer(cli.model.segmenter_model.as_deref())?;
            let mut store = open_store(&cli.db_file)?;
            let report = analyze::analyze_pending(&mut store, &cli.download_path, &scorer)?;
            print_report(&report, cli.json)?;
        }
        Command::Run => {
            // Load the model first so a broken model fails before any download.
            let scorer = analyze::load_scorer(cli.model.segmenter_model.as_deref())?;
            let mut store = open_store(&cli.db_file)?;
            let client = gazette_client(&cli.feed)?;
            match fetch::fetch_new(&client, &store, &cli.download_path, cli.feed.since).await {
                Ok(stats) => display::print_fetch_stats(&stats),
                Err(e) => {
                    let error = format!("{e:#}");
                    tracing::warn!(%error, "fetch failed, analyzing what is on disk");
                }
            }
            let report = analyze::analyze_pending(&mut store, &cli.download_path, &scorer)?;
            print_report(&report, cli.json)?;
        }
        Command::Summaries { gazette } => {
            let store = open_store(&cli.db_file)?;
            match gazette {
                Some(id) => {
                    let g = store
                        .get_gazette(id)
                        .with_context(|| format!("looking up gazette {id}"))?;
                    let entries = store.summaries_for(id)?;
                    display::print_gazette_summaries(&g, &entries);
                }
                None => {
                    let entries = store.relevant_summaries()?;
                    if entries.is_empty() {
                        println!("No relevant resolutions stored.");
                    }
                    for (gazette_id, group) in display::group_by_gazette(&entries) {
                        let g = store.get_gazette(gazette_id)?;
                        display::print_gazette_summaries(&g, group);
                    }
                }
            }
        }
        Command::Status => {
            let store = open_store(&cli.db_file)?;
            display::print_status(&cli.db_file, &store.counts()?);
        }
    }

    Ok(())
}

fn open_store(path: &Path) -> anyhow::Result<SqliteStore> {
    SqliteStore::open(path).with_context(|| format!("opening gazette database {}", path.display()))
}

fn gazette_client(feed: &FeedArgs) -> anyhow::Result<GazetteClient> {
    GazetteClient::new(feed.feed_url.as_str(), feed.certificate.as_deref())
        .context("building HTTP client")
}

fn print_report(report: &gdmonitor_pipeline::BatchReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        display::print_batch_report(report);
    }
    Ok(())
}
