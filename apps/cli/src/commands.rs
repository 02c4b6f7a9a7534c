//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use guidebook_core::batch::run_batch;
use guidebook_core::combine::{combine, write_combined, write_report};
use guidebook_core::events::{BatchEvent, EventSink, TracingSink};
use guidebook_core::page::{convert_page, save_markdown};
use guidebook_fetcher::Fetcher;
use guidebook_shared::{AppConfig, FetchConfig, LessonRange, init_config, load_config};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

/// Page converted when `guidebook page` gets no URL.
const DEFAULT_PAGE_URL: &str = "https://duome.eu/guidebook/en/de/14";

/// Width of the banner rules in console summaries.
const RULE_WIDTH: usize = 60;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// guidebook — turn duome.eu guidebook pages into Markdown.
#[derive(Parser)]
#[command(
    name = "guidebook",
    version,
    about = "Convert duome.eu guidebook lessons into Markdown documents.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Convert one guidebook page.
    Page {
        /// Guidebook page URL.
        #[arg(default_value = DEFAULT_PAGE_URL)]
        url: String,

        /// Lesson number for the title (defaults to the URL's trailing number).
        #[arg(short, long)]
        lesson: Option<u32>,

        /// Output file (defaults to duolingo_guidebook.md).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Do not print the generated Markdown.
        #[arg(long)]
        no_preview: bool,
    },

    /// Convert a range of lessons into one combined file.
    Batch {
        /// First lesson number (defaults to 1).
        #[arg(long)]
        start: Option<u32>,

        /// Last lesson number, inclusive (defaults to 156).
        #[arg(long)]
        end: Option<u32>,

        /// Output file (defaults to all_duolingo_guidebooks.md).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Also write a JSON report of succeeded and failed lessons.
        #[arg(long)]
        report: Option<PathBuf>,

        /// Maximum requests in flight (overrides config).
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "guidebook=info",
        1 => "guidebook=debug",
        _ => "guidebook=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let json_logs = matches!(cli.log_format, LogFormat::Json);

    match cli.command {
        Command::Page {
            url,
            lesson,
            out,
            no_preview,
        } => cmd_page(&url, lesson, out, no_preview).await,
        Command::Batch {
            start,
            end,
            out,
            report,
            concurrency,
        } => cmd_batch(start, end, out, report, concurrency, json_logs).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_page(
    url: &str,
    lesson: Option<u32>,
    out: Option<PathBuf>,
    no_preview: bool,
) -> Result<()> {
    let config = load_config()?;
    let out = out.unwrap_or_else(|| PathBuf::from(&config.page.output));
    let fetcher = Fetcher::new(FetchConfig::from(&config))?;

    info!(url, "converting guidebook page");

    let markdown = convert_page(&fetcher, url, lesson).await?;
    save_markdown(&out, &markdown)?;

    println!("Content saved to {}", out.display());

    if !no_preview {
        let rule = "=".repeat(RULE_WIDTH);
        println!();
        println!("{rule}");
        println!("PREVIEW OF MARKDOWN OUTPUT:");
        println!("{rule}");
        println!();
        println!("{markdown}");
    }

    Ok(())
}

async fn cmd_batch(
    start: Option<u32>,
    end: Option<u32>,
    out: Option<PathBuf>,
    report: Option<PathBuf>,
    concurrency: Option<usize>,
    json_logs: bool,
) -> Result<()> {
    let config = load_config()?;

    let range = LessonRange::new(
        start.unwrap_or(config.batch.start),
        end.unwrap_or(config.batch.end),
    )?;
    let out = out.unwrap_or_else(|| PathBuf::from(&config.batch.output));

    let mut fetch_config = FetchConfig::from(&config);
    if let Some(n) = concurrency {
        fetch_config.concurrency = n;
    }
    let fetcher = Fetcher::new(fetch_config)?;

    info!(%range, out = %out.display(), "starting batch conversion");

    // Structured logs replace the progress bar when output is machine-read.
    let results = if json_logs {
        run_batch(&fetcher, range, Arc::new(TracingSink)).await
    } else {
        let progress = Arc::new(CliProgress::new(range.len()));
        let results = run_batch(&fetcher, range, progress.clone()).await;
        progress.finish();
        results
    };

    let combined = combine(&results);
    write_combined(&out, &combined)?;

    if let Some(path) = report {
        write_report(&path, &combined.report())?;
        info!(path = %path.display(), "report written");
    }

    let rule = "=".repeat(RULE_WIDTH);
    println!();
    println!("{rule}");
    println!(
        "Successfully fetched {} out of {} lessons",
        combined.succeeded(),
        combined.total
    );
    println!("{rule}");
    println!();
    println!("  Saved to:      {}", out.display());
    println!("  Total lessons: {}", combined.succeeded());
    println!("  File size:     {} characters", combined.characters());

    if !combined.failed.is_empty() {
        println!();
        println!("  Failed lessons: {:?}", combined.failed);
    }

    println!();
    println!("{rule}");
    println!("BATCH CONVERSION COMPLETE!");
    println!("{rule}");

    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Batch progress bar driven by [`BatchEvent`]s.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        bar.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { bar }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl EventSink for CliProgress {
    fn emit(&self, event: &BatchEvent) {
        match event {
            BatchEvent::Started { range } => {
                self.bar.set_message(format!("lessons {range}"));
            }
            BatchEvent::LessonStarted { id } => {
                self.bar.set_message(format!("fetching lesson {id}"));
            }
            BatchEvent::LessonCompleted { id, .. } => {
                self.bar.inc(1);
                self.bar.set_message(format!("lesson {id} completed"));
            }
            BatchEvent::LessonFailed { id, reason } => {
                self.bar.inc(1);
                self.bar.println(format!("✗ Lesson {id} failed: {reason}"));
            }
            BatchEvent::Finished { .. } => {}
        }
    }
}
