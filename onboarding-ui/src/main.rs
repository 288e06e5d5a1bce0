use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use onboarding_core::OnboardingFlow;
use onboarding_ui::input::{HELP, split_script};
use onboarding_ui::logging::{init_logging, log_session_error};
use onboarding_ui::{AppConfig, run_session};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Terminal walkthrough of the djay onboarding flow.
///
/// Renders each screen as text and reads one command per line from stdin,
/// or from `--script` when given.
#[derive(Debug, Parser)]
#[command(name = "djay-onboarding")]
#[command(version, about, long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log filter directive (e.g. `debug`, `onboarding_core=trace`).
    /// Overrides `[logging] level`; `RUST_LOG` still wins.
    #[arg(long)]
    log_level: Option<String>,

    /// Append log records to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Comma-separated commands to run instead of reading stdin
    /// (e.g. `c,c,2,c`).
    #[arg(short, long)]
    script: Option<String>,
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => AppConfig::default(),
    };
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(file) = &cli.log_file {
        config.logging.file = Some(file.clone());
    }
    Ok(config)
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(&config.logging)?;

    let flow_config = config
        .flow_config()
        .context("Failed to build the paywall catalog")?;
    debug!(steps = ?flow_config.steps, on_finish = ?flow_config.on_finish, "flow configured");
    let mut flow = OnboardingFlow::new(flow_config).context("Invalid flow configuration")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let result = match &cli.script {
        Some(script) => {
            let lines = split_script(script).into_iter().map(Ok);
            run_session(&mut flow, lines, &mut out)
        }
        None => {
            if io::stdin().is_terminal() {
                writeln!(out, "{HELP}\n").context("Failed to write help")?;
            }
            let lines = io::stdin().lock().lines();
            run_session(&mut flow, lines, &mut out)
        }
    }
    .map(|outcome| info!(?outcome, "onboarding session ended"));

    log_session_error(&result);
    result
}
