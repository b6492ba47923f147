use std::path::PathBuf;
use std::process::ExitCode;
use anyhow::Context;
use clap::Parser;
use config::ConfigError;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use hubfetch::config::{LoggingConfig, Settings};
use hubfetch::fetch::{display, Fetcher};
use hubfetch::hub::HubClient;

/// Download model artifacts (encoder, decoder, tokenizer) from a model hub
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Directory holding default.toml / local.toml
    #[arg(long, value_name = "DIR", default_value = "config")]
    config_dir: PathBuf,

    /// Hub repository id, e.g. UsefulSensors/moonshine
    #[arg(long)]
    repo: Option<String>,

    /// Branch, tag or commit to fetch
    #[arg(long)]
    revision: Option<String>,

    /// Destination directory for the model files
    #[arg(long, value_name = "DIR")]
    dest: Option<PathBuf>,

    /// Hub access token (falls back to HF_TOKEN)
    #[arg(long, env = "HF_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

impl Cli {
    /// Applies command line overrides on top of the loaded settings.
    fn apply(self, mut settings: Settings) -> Result<Settings, ConfigError> {
        if let Some(repo) = self.repo {
            settings.hub.repo_id = repo;
        }
        if let Some(revision) = self.revision {
            settings.hub.revision = revision;
        }
        if let Some(dest) = self.dest {
            settings.models.directory = dest;
        }
        if self.token.is_some() {
            settings.hub.token = self.token;
        }
        settings.validate()?;
        Ok(settings)
    }
}

/// Sets up the rolling log file; the guard must live until exit.
fn init_logging(logging: &LoggingConfig) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(&logging.directory)
        .with_context(|| format!("create log directory {}", logging.directory.display()))?;

    let file_appender = tracing_appender::rolling::RollingFileAppender::new(
        tracing_appender::rolling::Rotation::DAILY,
        &logging.directory,
        "hubfetch",
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_new(logging.level.to_lowercase())
        .context("parse logging level")?;

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        // Disable ANSI colors for cleaner log files
        .with_ansi(false)
        .with_line_number(true)
        .with_file(true)
        .with_target(false)
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install tracing subscriber: {}", e))?;

    Ok(guard)
}

/// Entry point: exit code 0 once encoder and decoder are in place, 1 otherwise.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match Settings::new(&cli.config_dir).and_then(|s| cli.apply(s)) {
        Ok(settings) => settings,
        Err(e) => {
            println!("❌ Invalid configuration: {}", e);
            return ExitCode::from(1);
        }
    };

    let _guard = match init_logging(&settings.logging) {
        Ok(guard) => guard,
        Err(e) => {
            println!("❌ Could not initialize logging: {:#}", e);
            return ExitCode::from(1);
        }
    };
    info!("hubfetch {} starting", env!("CARGO_PKG_VERSION"));
    info!("Settings loaded: repo={} dest={}", settings.hub.repo_id, settings.models.directory.display());

    let hub = match HubClient::new(&settings.hub).context("create hub client") {
        Ok(hub) => hub,
        Err(e) => {
            error!("{:#}", e);
            println!("❌ {:#}", e);
            return ExitCode::from(1);
        }
    };

    let fetcher = Fetcher::new(hub, settings);
    match fetcher.run().await {
        Ok(summary) => {
            display::print_summary(&summary, fetcher.settings());
            info!("Done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Fetch failed: {}", e);
            display::print_failure(&e, fetcher.settings());
            ExitCode::from(1)
        }
    }
}
