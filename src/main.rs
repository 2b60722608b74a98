mod calendar;
mod cli;
mod commands;
mod config;
mod editor;
mod keys;
mod model;
mod navigator;
mod storage;
mod ui;

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use std::fs;
use std::io::stdout;
use storage::JsonStore;
use tracing_subscriber::EnvFilter;

fn init_file_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let logs_dir = config::logs_dir().ok()?;
    if let Err(e) = fs::create_dir_all(&logs_dir) {
        eprintln!("Warning: Could not create logs directory: {}", e);
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(&logs_dir, "dayboard.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    Some(guard)
}

fn init_stderr_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let command = args.command.unwrap_or(cli::Command::Tui);

    let _log_guard = match command {
        cli::Command::Tui => init_file_logging(),
        _ => {
            init_stderr_logging();
            None
        }
    };

    let config = config::Config::load(args.config.as_deref())?;
    let data_dir = match args.data_dir {
        Some(dir) => dir,
        None => config.resolve_data_dir()?,
    };
    let store = JsonStore::new(data_dir);
    tracing::debug!(data_dir = %store.dir().display(), "using data directory");
    let options = config.navigator_options();
    let today = Local::now().date_naive();
    let mut out = stdout().lock();

    match command {
        cli::Command::List { bucket, upcoming } => {
            commands::list(&store, &mut out, today, bucket, upcoming, options)
        }
        cli::Command::Add {
            title,
            description,
            bucket,
        } => commands::add(&store, &mut out, today, title, description, bucket),
        cli::Command::Done { id, bucket } => commands::done(&store, &mut out, today, id, bucket),
        cli::Command::Remove { id, bucket } => {
            commands::remove(&store, &mut out, today, id, bucket)
        }
        cli::Command::Tui => {
            drop(out);
            commands::tui(&store, today, options)
        }
    }
}
