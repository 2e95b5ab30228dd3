use std::{path::PathBuf, process::ExitCode, str::FromStr};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;

use cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match setup_logging(&cli.log_level, &cli.log_file).await {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Failed to set up logging: {:#}", err);
            return ExitCode::FAILURE;
        }
    };

    cli.start().await
}

async fn setup_logging(
    log_level: &str,
    log_file: &str,
) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    // Set up log file
    let log_file_path = if log_file != "auto" {
        let path = PathBuf::from(log_file);
        if path.exists() {
            bail!("Log file already exists: {}", path.display());
        }
        path
    } else {
        let time = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
        let filename = format!("drs-{time}.log");
        dirs::data_local_dir()
            .map(|p| p.join("drs").join(&filename))
            .unwrap_or_else(|| PathBuf::from(&filename))
    };
    let dir = match log_file_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    tokio::fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
    let file_name = log_file_path
        .file_name()
        .context("Log file path has no file name")?;

    // Create log file appender
    let appender = tracing_appender::rolling::never(&dir, file_name);
    let (non_blocking_appender, guard) = tracing_appender::non_blocking(appender);

    // Set up tracing
    let log_level = tracing::Level::from_str(log_level)
        .map_err(|_| anyhow::anyhow!("Invalid log level: {}", log_level))?;
    let stdout_layer = fmt::Subscriber::builder()
        .with_max_level(log_level)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    let logfile_layer = fmt::Layer::default()
        .json()
        .with_ansi(false)
        .with_writer(non_blocking_appender);
    stdout_layer
        .with(logfile_layer)
        .try_init()
        .context("Unable to set global tracing subscriber")?;

    tracing::info!("Saving logs to {}", log_file_path.display());
    Ok(guard)
}
