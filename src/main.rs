use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{ArgGroup, Parser};

use efo_core::config::Config;
use efo_explorer::headless::{self, OutputFormat, Request};
use efo_ols::OlsClient;

#[derive(Parser)]
#[command(
    name = "efo-explorer",
    version,
    about = "Resolve disease names to EFO terms and their ancestor chains"
)]
#[command(group(ArgGroup::new("mode").args(["query", "resolve"])))]
struct Cli {
    /// Write debug logs to a file in the temp dir (tail -f to inspect).
    #[arg(long)]
    debug: bool,

    /// Run one lookup, print the result and exit instead of starting the TUI.
    #[arg(long, requires = "mode")]
    headless: bool,

    /// Search for candidates matching this text.
    #[arg(long, requires = "headless")]
    query: Option<String>,

    /// Resolve the canonical term and ancestors for this exact label.
    #[arg(long, requires = "headless")]
    resolve: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Override `[ols] base_url` from the config file.
    #[arg(long)]
    base_url: Option<String>,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    init_logging(&cli)?;

    let mut config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "config unreadable, using defaults");
        Config::defaults()
    });
    if let Some(url) = cli.base_url {
        config.ols.base_url = url;
    }
    config.validate()?;

    let client = Arc::new(OlsClient::new(&config.ols)?);
    tracing::info!(base_url = %client.base_url(), "ols client ready");

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    if cli.headless {
        let request = match (cli.query, cli.resolve) {
            (Some(q), _) => Request::Search(q),
            (None, Some(label)) => Request::Resolve(label),
            (None, None) => anyhow::bail!("--headless needs --query or --resolve"),
        };
        let mut stdout = std::io::stdout().lock();
        let report = rt.block_on(headless::run(client, &request, cli.format, &mut stdout))?;
        stdout.flush()?;
        return Ok(if report.is_error() { ExitCode::FAILURE } else { ExitCode::SUCCESS });
    }

    let _guard = rt.enter();
    efo_tui::run(config, client)?;
    Ok(ExitCode::SUCCESS)
}

/// The TUI owns the terminal, so its logs go to a file and only with
/// `--debug`. Headless mode logs warnings (or everything, with `--debug`) to
/// stderr.
fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let default_level = if cli.debug { "debug" } else { "warn" };
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level))
    };

    if cli.headless {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter())
            .init();
    } else if cli.debug {
        let path = debug_log_path();
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(filter())
            .init();
        tracing::info!("efo-explorer debug log started — tail -f {}", path.display());
    }
    Ok(())
}

fn debug_log_path() -> PathBuf {
    std::env::temp_dir().join("efo-explorer-debug.log")
}
