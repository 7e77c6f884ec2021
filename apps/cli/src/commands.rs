//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use gatewayreport_core::pipeline::{
    ProgressReporter, RunOutcome, SilentProgress, preview_report, run_scheduled,
};
use gatewayreport_core::schedule::run_every;
use gatewayreport_mailer::SmtpMailer;
use gatewayreport_shared::{
    AppConfig, GatewayReportError, ReportConfig, RunId, SmtpSettings, init_config, load_config,
    load_config_from,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};

/// Longest accepted daemon interval (366 days).
const MAX_INTERVAL_HOURS: u64 = 24 * 366;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Gateway Report: daily DNS gateway activity digest.
#[derive(Parser)]
#[command(
    name = "gatewayreport",
    version,
    about = "Email a daily summary of blocked and allowed DNS gateway activity.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file (defaults to ~/.gatewayreport/gatewayreport.toml).
    #[arg(long, global = true, env = "GATEWAY_REPORT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
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
    /// Build and send the report once. Intended for cron or a systemd timer.
    Run,

    /// Build the report and write the HTML instead of sending it.
    Preview {
        /// Output file (defaults to stdout).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Send the report on a fixed interval until interrupted.
    Daemon {
        /// Hours between runs (1 to 8784).
        #[arg(
            long,
            default_value_t = 24,
            value_parser = clap::value_parser!(u64).range(1..=MAX_INTERVAL_HOURS),
        )]
        interval_hours: u64,
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
    /// Show the loaded configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so `preview`
/// output on stdout stays clean.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "gatewayreport=info",
        1 => "gatewayreport=debug",
        _ => "gatewayreport=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
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
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Run => cmd_run(config_path).await,
        Command::Preview { out } => cmd_preview(config_path, out.as_deref()).await,
        Command::Daemon { interval_hours } => cmd_daemon(config_path, interval_hours).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(config_path).await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

/// A failed run is logged and reported, but still exits 0 so the external
/// scheduler keeps its normal cadence.
async fn cmd_run(config_path: Option<&Path>) -> Result<()> {
    let reporter = CliProgress::new();
    let outcome = invoke(config_path, &reporter).await;

    println!();
    match &outcome {
        RunOutcome::Delivered(delivery) => {
            println!("  Report delivered!");
            println!("  Run:     {}", delivery.run_id);
            println!(
                "  Message: {}",
                delivery.message_id.as_deref().unwrap_or("-")
            );
            println!("  Rows:    {}", delivery.rows);
            println!("  Time:    {:.1}s", delivery.elapsed.as_secs_f64());
        }
        RunOutcome::Aborted { run_id, error } => {
            println!("  Report aborted, no email sent.");
            println!("  Run:     {run_id}");
            println!("  Error:   {error}");
        }
    }
    println!();

    Ok(())
}

async fn cmd_preview(config_path: Option<&Path>, out: Option<&Path>) -> Result<()> {
    let app = load_app_config(config_path)?;
    let config = ReportConfig::resolve(&app)?;

    let reporter = CliProgress::new();
    let result = preview_report(&config, Utc::now(), &reporter).await;
    reporter.finish();
    let html = result?;

    match out {
        Some(path) => {
            std::fs::write(path, &html).map_err(|e| GatewayReportError::io(path, e))?;
            info!(path = %path.display(), bytes = html.len(), "preview written");
            println!("Preview written to: {}", path.display());
        }
        None => println!("{html}"),
    }

    Ok(())
}

async fn cmd_daemon(config_path: Option<&Path>, interval_hours: u64) -> Result<()> {
    let period = Duration::from_secs(interval_hours * 3600);
    info!(interval_hours, "starting report daemon");

    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("interrupt received, stopping after the current run"),
            Err(e) => error!(error = %e, "failed to listen for interrupt, stopping"),
        }
    };

    let summary = run_every(period, shutdown, || invoke(config_path, &SilentProgress)).await;

    println!(
        "Daemon stopped after {} run(s): {} delivered, {} aborted.",
        summary.runs, summary.delivered, summary.aborted
    );
    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = load_app_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Invocation
// ---------------------------------------------------------------------------

fn load_app_config(path: Option<&Path>) -> gatewayreport_shared::Result<AppConfig> {
    match path {
        Some(path) => load_config_from(path),
        None => load_config(),
    }
}

/// One full invocation. Config is re-read each time so a long-running
/// daemon picks up edits and rotated secrets.
async fn invoke(config_path: Option<&Path>, progress: &dyn ProgressReporter) -> RunOutcome {
    let resolved = load_app_config(config_path).and_then(|app| {
        let config = ReportConfig::resolve(&app)?;
        let mailer = SmtpMailer::new(&SmtpSettings::resolve(&app.smtp)?)?;
        Ok((config, mailer))
    });

    match resolved {
        Ok((config, mailer)) => run_scheduled(&config, &mailer, progress).await,
        Err(error) => {
            let outcome = RunOutcome::settle(RunId::new(), Err(error));
            progress.done(&outcome);
            outcome
        }
    }
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
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _outcome: &RunOutcome) {
        self.finish();
    }
}
