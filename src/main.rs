use std::io::{self, IsTerminal};
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use assistant_provider::CancelSignal;
use clap::{Parser, Subcommand};
use config_store::{ConfigStore, SecretaryConfig};
use jira_api::{parse_iso_date, JiraConfig};
use secretary::config::EnvConfig;
use secretary::console::{Console, TerminalConsole};
use secretary::display::{self, Palette};
use secretary::platform::install_interrupt_handler;
use secretary::runner::{resolve_period, Runner};
use secretary::setup::run_setup;
use secretary::tracker::JiraTracker;
use secretary::{logging, providers, AppError};
use time::{Date, OffsetDateTime};

const TRACKER_TIMEOUT: Duration = Duration::from_secs(30);

/// Log your working time by talking about it.
#[derive(Debug, Parser)]
#[command(name = "sj", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Log today's work (the default).
    Today,
    /// Log work for every unfilled weekday in a date range.
    Period {
        /// First day, YYYY-MM-DD. Prompted when missing.
        #[arg(long, value_parser = parse_date_arg)]
        from: Option<Date>,
        /// Last day, YYYY-MM-DD. Prompted when missing.
        #[arg(long, value_parser = parse_date_arg)]
        to: Option<Date>,
    },
    /// Create or update the credentials file.
    Config,
    /// Print the version.
    Version,
}

fn parse_date_arg(value: &str) -> Result<Date, String> {
    parse_iso_date(value.trim()).ok_or_else(|| format!("expected YYYY-MM-DD, got '{value}'"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    // The local offset can only be read while the process is single-threaded.
    let today = OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date();

    let env = EnvConfig::from_env();
    logging::init(env.log_filter.as_deref());
    let palette = Palette::new(env.color() && io::stdout().is_terminal());
    let mut console = TerminalConsole::new();

    match run(cli.command.unwrap_or(Command::Today), &env, today, &mut console, palette) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) if error.is_interruption() => {
            console.print(&display::cancelled(&palette));
            console.print(&display::farewell(&palette, 0));
            ExitCode::SUCCESS
        }
        Err(error) => {
            tracing::debug!(?error, "run failed");
            eprintln!("{}", display::error_line(&palette, &error.to_string()));
            ExitCode::from(error.exit_code() as u8)
        }
    }
}

fn run(
    command: Command,
    env: &EnvConfig,
    today: Date,
    console: &mut TerminalConsole,
    palette: Palette,
) -> Result<(), AppError> {
    if matches!(command, Command::Version) {
        console.print(&format!("sj version {}", env!("CARGO_PKG_VERSION")));
        return Ok(());
    }

    let cancel: CancelSignal = Arc::new(AtomicBool::new(false));
    let _interrupts = install_interrupt_handler(cancel.clone()).map_err(AppError::Signal)?;

    let store = match &env.config_path {
        Some(path) => ConfigStore::at(path),
        None => ConfigStore::locate()?,
    };

    if matches!(command, Command::Config) {
        let current = if store.exists() {
            store.load().unwrap_or_else(|error| {
                tracing::warn!(%error, "existing config unreadable, starting from scratch");
                SecretaryConfig::default()
            })
        } else {
            SecretaryConfig::default()
        };
        run_setup(console, &store, current, &palette, &cancel)?;
        return Ok(());
    }

    let config = if store.exists() {
        store.load()?
    } else {
        console.print(&palette.yellow(&format!(
            "No config found at {}. Let's set it up.",
            store.path().display()
        )));
        run_setup(console, &store, SecretaryConfig::default(), &palette, &cancel)?
    };
    config.validate()?;

    let backend = providers::provider_from_settings(env.provider.as_deref(), &config)
        .map_err(AppError::Provider)?;
    let tracker = JiraTracker::new(
        JiraConfig::new(config.jira_url.clone(), config.jira_api_token.clone())
            .with_timeout(TRACKER_TIMEOUT),
    )?;

    let summary = match command {
        Command::Period { from, to } => {
            let (start, end) = resolve_period(console, from, to, &cancel)?;
            Runner::new(&tracker, backend.as_ref(), console, cancel.clone())
                .with_palette(palette)
                .run_period(start, end)?
        }
        _ => Runner::new(&tracker, backend.as_ref(), console, cancel.clone())
            .with_palette(palette)
            .run_today(today)?,
    };
    tracing::info!(
        committed_seconds = summary.committed_seconds,
        days = summary.days_submitted,
        stopped_early = summary.stopped_early,
        "run finished"
    );
    Ok(())
}
