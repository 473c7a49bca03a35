//! Log setup: console output plus a daily rolling file per command

use std::path::{Path, PathBuf};
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "house_price=info";
/// Rotated files kept per prefix
pub const MAX_LOG_FILES: usize = 7;

/// `LOG_DIR`, or `logs` when unset
pub fn log_dir_from_env() -> PathBuf {
    std::env::var("LOG_DIR")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Daily `<prefix>.<date>.log` files under `dir`
pub fn file_appender(dir: &Path, prefix: &str) -> anyhow::Result<RollingFileAppender> {
    Ok(RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(dir)?)
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Console and file layers; records reach the file until the guard drops
pub fn subscriber(
    dir: &Path,
    prefix: &str,
) -> anyhow::Result<(impl Subscriber + Send + Sync + 'static, WorkerGuard)> {
    let (writer, guard) = tracing_appender::non_blocking(file_appender(dir, prefix)?);
    let subscriber = tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(writer));
    Ok((subscriber, guard))
}

/// Install the global subscriber; keep the guard alive for the process lifetime
pub fn init(dir: &Path, prefix: &str) -> anyhow::Result<WorkerGuard> {
    let (subscriber, guard) = subscriber(dir, prefix)?;
    subscriber.try_init()?;
    Ok(guard)
}
