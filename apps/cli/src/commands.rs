//! CLI definition, tracing setup, and command dispatch.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use askglean_client::GleanClient;
use askglean_core::pipeline::{self, ProgressReporter, RunSummary};
use askglean_shared::{AppConfig, CliOverrides, RunConfig, init_config, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// askglean — answer a CSV of questions with a Glean instance.
#[derive(Parser)]
#[command(
    name = "askglean",
    version,
    about = "Submit a CSV of questions to a Glean instance and record the answers.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Debug mode: log the requests that would be sent without calling the API.
    #[arg(short, long, value_name = "BOOL")]
    pub debug: Option<bool>,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Questions CSV path (falls back to QUESTIONS_CSV, then the config file).
    #[arg(short, long)]
    pub questions_csv: Option<PathBuf>,

    /// Email address to act as on API calls.
    #[arg(short, long)]
    pub user: Option<String>,

    /// Application id to attach to chat requests.
    #[arg(short, long)]
    pub app_id: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands. Without one, the question batch runs.
#[derive(Subcommand)]
pub(crate) enum Command {
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
        0 => "askglean=info",
        1 => "askglean=debug",
        _ => "askglean=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Command::Config { action }) => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
        None => cmd_run(cli).await,
    }
}

/// Resolve config, build the client, and drive the batch once.
async fn cmd_run(cli: Cli) -> Result<()> {
    let app_config = load_config()?;
    let overrides = CliOverrides {
        debug: cli.debug,
        questions_csv: cli.questions_csv,
        user: cli.user,
        app_id: cli.app_id,
    };
    let config = RunConfig::resolve(&app_config, &overrides)?;

    let client = GleanClient::new(&config)?;

    info!(
        instance = %config.instance,
        input = %config.questions_csv.display(),
        debug = config.debug,
        "starting batch run"
    );

    let reporter = CliProgress::new();
    let summary = pipeline::run(&config, &client, &reporter).await?;

    println!();
    println!("  Run complete!");
    println!("  Output:           {}", summary.output_path.display());
    println!("  Rows:             {}", summary.total_rows);
    println!("  Answered:         {}", summary.answered);
    println!("  Failed:           {}", summary.failed);
    println!("  Skipped (empty):  {}", summary.skipped_empty);
    println!("  Skipped (done):   {}", summary.skipped_answered);
    println!("  Time:             {:.1}s", summary.elapsed.as_secs_f64());
    println!();

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

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn question_started(&self, qid: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Asking [{current}/{total}] qid={qid}"));
    }

    fn done(&self, _summary: &RunSummary) {
        self.spinner.finish_and_clear();
    }
}
