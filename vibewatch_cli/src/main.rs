mod cli;
mod console;
mod error_fmt;
mod watch;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;
use eyre::WrapErr;
use vibewatch_config::Config;
use vibewatch_core::MonitorError;

use crate::cli::{Cli, Commands, FILE_GUARD, INTERRUPTED, JSON_MODE};
use crate::error_fmt::{EXIT_INTERRUPTED, exit_code_for_error, format_error_json, humanize};
use crate::watch::RunOptions;

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    if let Err(e) = color_eyre::install() {
        eprintln!("failed to install error hooks: {e}");
    }

    let code = match real_main(cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "vibewatch failed");
            if JSON_MODE.get().copied().unwrap_or(false) {
                eprintln!("{}", format_error_json(&e));
            } else {
                eprintln!("{}", humanize(&e));
            }
            exit_code_for_error(&e)
        }
    };
    std::process::exit(code);
}

fn real_main(cli: Cli) -> eyre::Result<i32> {
    let (cfg, from_file) = load_config(&cli.config)?;
    init_tracing(cli.json, cli.log_level.as_deref(), &cfg.logging);
    if from_file {
        tracing::debug!(path = %cli.config.display(), "config loaded");
    } else {
        tracing::info!(path = %cli.config.display(), "config file not found; using defaults");
    }
    cfg.validate()
        .map_err(|e| MonitorError::Config(e.to_string()))?;

    match cli.cmd {
        Commands::Run {
            duration_ms,
            trace,
            log_path,
            sim,
        } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            {
                let flag = shutdown.clone();
                ctrlc::set_handler(move || {
                    INTERRUPTED.store(true, Ordering::Relaxed);
                    flag.store(true, Ordering::Relaxed);
                })
                .wrap_err("install Ctrl-C handler")?;
            }
            let opts = RunOptions {
                duration: duration_ms.map(Duration::from_millis),
                trace,
                log_path,
                simulate: sim,
            };
            let summary = watch::run_monitor(&cfg, &opts, shutdown)?;
            watch::print_summary(&summary, cli.json);
            if INTERRUPTED.load(Ordering::Relaxed) {
                Ok(EXIT_INTERRUPTED)
            } else {
                Ok(0)
            }
        }
        Commands::SelfCheck => {
            watch::self_check(&cfg, cli.json)?;
            Ok(0)
        }
    }
}

/// Read and parse the config; a missing file yields the defaults.
fn load_config(path: &Path) -> eyre::Result<(Config, bool)> {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            let cfg = toml::from_str::<Config>(&text)
                .map_err(|e| MonitorError::Config(format!("{}: {e}", path.display())))?;
            Ok((cfg, true))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok((Config::default(), false)),
        Err(e) => Err(e).wrap_err_with(|| format!("read config {}", path.display())),
    }
}

/// Console logs go to stderr (stdout carries the display and the summary).
/// `[logging] file` adds a JSON-lines sink through `tracing-appender`.
fn init_tracing(json: bool, level: Option<&str>, logging: &vibewatch_config::Logging) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let level = level
        .or(logging.level.as_deref())
        .unwrap_or("info");
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let console = if json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    let file = logging.file.as_deref().map(|file| {
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let name = path
            .file_name()
            .map_or_else(|| "vibewatch.log".into(), |n| n.to_os_string());
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        fmt::layer().json().with_ansi(false).with_writer(writer)
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init();
}
