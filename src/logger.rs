//! Logging setup: console plus an optional append-only log file

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, fmt::time::ChronoLocal, prelude::*, EnvFilter};

/// Controls what gets logged to stderr
const CONSOLE_ENV_VAR: &str = "RUST_LOG";
const FILE_DIRECTIVE: &str = "transmitter=debug";
const FILE_TIME_FORMAT: &str = "%m-%d %H:%M:%S";

#[derive(Clone, Debug, Default)]
pub struct LogOptions {
    pub file: Option<PathBuf>,
    pub verbose: bool,
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}

fn console_filter(verbose: bool) -> Result<EnvFilter> {
    match EnvFilter::try_from_env(CONSOLE_ENV_VAR) {
        Ok(filter) => Ok(filter),
        Err(_) => {
            let level = if verbose { "debug" } else { "info" };
            EnvFilter::try_new(format!("transmitter={}", level))
                .context("building console log filter")
        }
    }
}

/// Install the global subscriber. Call once, from the binary.
pub fn init(opts: &LogOptions) -> Result<()> {
    let console = fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(console_filter(opts.verbose)?);

    let mut file_error = None;
    let file_layer = match opts.file.as_deref() {
        Some(path) => match open_log_file(path) {
            Ok(file) => Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_timer(ChronoLocal::new(FILE_TIME_FORMAT.to_string()))
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(Mutex::new(file))
                    .with_filter(EnvFilter::try_new(FILE_DIRECTIVE)?),
            ),
            Err(e) => {
                file_error = Some((path.to_path_buf(), e));
                None
            }
        },
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .try_init()
        .context("installing log subscriber")?;

    if let Some((path, e)) = file_error {
        tracing::warn!(
            "Cannot open log file {}: {}; logging to console only",
            path.display(),
            e
        );
    }
    Ok(())
}
