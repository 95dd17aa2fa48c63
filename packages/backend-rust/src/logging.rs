use std::io;
use std::path::Path;

use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::Config;

const LOG_FILE_PREFIX: &str = "personalizer";

pub struct FileLogGuard {
    _guard: WorkerGuard,
}

/// Daily-rotated `personalizer.<date>.log` files under `dir`, creating it if needed
pub fn open_file_appender(dir: &Path) -> io::Result<RollingFileAppender> {
    std::fs::create_dir_all(dir)?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .build(dir)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
}

/// Non-blocking plain-text layer writing into `dir`. Keep the guard alive or
/// buffered lines are lost.
pub fn file_layer<S>(dir: &Path) -> io::Result<(impl Layer<S>, WorkerGuard)>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let (writer, guard) = tracing_appender::non_blocking(open_file_appender(dir)?);
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);
    Ok((layer, guard))
}

/// Console logs go to stderr; stdout carries the host protocol.
pub fn init_tracing(config: &Config) -> Option<FileLogGuard> {
    let env_filter =
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = fmt::layer().with_writer(io::stderr).with_target(true);

    let file = config
        .file_log_dir
        .as_deref()
        .and_then(|dir| match file_layer(dir) {
            Ok(file) => Some(file),
            Err(err) => {
                eprintln!("failed to open log directory {}: {err}", dir.display());
                None
            }
        });

    match file {
        Some((file_layer, guard)) => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(stderr_layer)
                .with(file_layer)
                .init();
            Some(FileLogGuard { _guard: guard })
        }
        None => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(stderr_layer)
                .init();
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn log_files(dir: &Path) -> Vec<std::path::PathBuf> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect()
    }

    #[test]
    fn appender_creates_nested_directory() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("a").join("logs");

        let mut appender = open_file_appender(&dir).unwrap();
        appender.write_all(b"hello\n").unwrap();
        appender.flush().unwrap();

        let files = log_files(&dir);
        assert_eq!(files.len(), 1);
        let name = files[0].file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("personalizer."));
        assert!(name.ends_with(".log"));
    }

    #[test]
    fn file_layer_records_events() {
        let dir = tempfile::tempdir().unwrap();
        let (layer, guard) = file_layer(dir.path()).unwrap();
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(session_id = "s1", "pending experience stored");
        });
        drop(guard);

        let contents = std::fs::read_to_string(&log_files(dir.path())[0]).unwrap();
        assert!(contents.contains("pending experience stored"));
        assert!(contents.contains("session_id=\"s1\""));
        assert!(!contents.contains('\u{1b}'));
    }
}
