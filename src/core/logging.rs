//! Logging and terminal setup.
//!
//! Provides:
//! - A `tracing` subscriber with a human-readable stderr layer
//! - Optional JSON file logging with daily rotation (tracing-appender)
//! - Gzip compression of rotated logs (flate2)
//! - miette report styling for the stderr terminal
//!
//! Stdout is reserved for search results, so nothing here writes to it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use console::Term;
use flate2::write::GzEncoder;
use flate2::Compression;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;

/// Base name of the rolling log file.
pub const LOG_FILE_PREFIX: &str = "roster-lookup.log";

static REPORT_STYLE: OnceLock<ReportStyle> = OnceLock::new();

/// How diagnostics on stderr should be rendered.
pub fn report_style() -> &'static ReportStyle {
    REPORT_STYLE.get_or_init(ReportStyle::from_env)
}

// ============================================================================
// Report style
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportStyle {
    pub color: bool,
    pub unicode: bool,
}

impl ReportStyle {
    /// Color only when stderr is a terminal that accepts it. Unicode unless the
    /// terminal is dumb or the locale is explicitly not UTF-8.
    pub fn from_env() -> Self {
        let stderr = Term::stderr();
        let term_ok = std::env::var("TERM").map_or(true, |term| term != "dumb");
        let utf8_locale = std::env::var("LANG").map_or(true, |lang| {
            let lang = lang.to_ascii_lowercase();
            lang.contains("utf-8") || lang.contains("utf8")
        });

        Self {
            color: stderr.is_term() && console::colors_enabled_stderr(),
            unicode: term_ok && utf8_locale,
        }
    }
}

// ============================================================================
// Logging Initialization
// ============================================================================

/// Initialize logging.
///
/// `RUST_LOG` overrides `config.level`. When file logging is enabled the
/// returned guard must be kept alive so buffered lines are flushed on exit.
pub fn init(config: &LoggingConfig, log_dir: &Path) -> Option<WorkerGuard> {
    let env_filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .with_filter(env_filter());

    let (file_layer, guard) = if config.file_logging {
        if let Err(e) = fs::create_dir_all(log_dir) {
            eprintln!("Failed to create logs directory {}: {}", log_dir.display(), e);
        }
        let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        // One JSON object per line.
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .json()
            .with_file(true)
            .with_line_number(true)
            .with_thread_ids(true)
            .with_target(true)
            .with_filter(env_filter());
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    // try_init also bridges `log` records into tracing.
    if let Err(e) = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
    {
        eprintln!("Logging already initialized: {}", e);
        return guard;
    }

    install_report_hook();

    if config.file_logging {
        let dir = log_dir.to_path_buf();
        std::thread::spawn(move || compress_old_logs(dir));
        log::debug!("File logging to {:?} (daily rolling)", log_dir.join(LOG_FILE_PREFIX));
    }

    guard
}

/// Compress rotated log files in `log_dir`. The daily roller dates files in
/// UTC, so the active file is the one carrying today's UTC date.
pub fn compress_old_logs(log_dir: PathBuf) {
    let today_suffix = chrono::Utc::now().format("%Y-%m-%d").to_string();

    let Ok(entries) = fs::read_dir(&log_dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if should_compress(name, &today_suffix) {
            match compress_file(&path) {
                Ok(()) => tracing::debug!(path = %path.display(), "Compressed old log"),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to compress old log"),
            }
        }
    }
}

fn should_compress(file_name: &str, today_suffix: &str) -> bool {
    file_name
        .strip_prefix(LOG_FILE_PREFIX)
        .and_then(|rest| rest.strip_prefix('.'))
        .map(|date| date != today_suffix && !date.ends_with(".gz"))
        .unwrap_or(false)
}

fn compress_file(path: &Path) -> io::Result<()> {
    let mut gz_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "No filename"))?
        .to_os_string();
    gz_name.push(".gz");
    let gz_path = path.with_file_name(gz_name);

    if gz_path.exists() {
        return Ok(());
    }

    let mut reader = io::BufReader::new(fs::File::open(path)?);
    let mut encoder = GzEncoder::new(fs::File::create(&gz_path)?, Compression::default());
    io::copy(&mut reader, &mut encoder)?;
    encoder.finish()?;

    fs::remove_file(path)
}

fn install_report_hook() {
    let style = *report_style();
    let installed = miette::set_hook(Box::new(move |_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .unicode(style.unicode)
                .color(style.color)
                .context_lines(2)
                .build(),
        )
    }));
    if installed.is_err() {
        tracing::trace!("miette hook already installed");
    }
}
