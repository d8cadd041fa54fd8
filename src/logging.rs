//! Tracing subscriber setup.
//!
//! Logs go to the file named by `MENTION_TUI_LOG` when set (a terminal UI
//! owns stdout), otherwise to stderr. `RUST_LOG` overrides the level chosen
//! from `MENTION_TUI_DEBUG`.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::EnvConfig;
use crate::error::LoggingError;

const COMPONENT: &str = "mention_tui";

pub fn default_level(config: &EnvConfig) -> Level {
    if config.debug {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

/// Installs the global subscriber described by `config`.
pub fn init_logging(config: &EnvConfig) -> Result<(), LoggingError> {
    let level = default_level(config);
    match config.log_file.as_deref() {
        Some(path) => init_to_file(level, Path::new(path)),
        None => init_with_writer(level, std::io::stderr),
    }
}

pub fn init_to_file(level: Level, path: &Path) -> Result<(), LoggingError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| LoggingError::io(parent, source))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggingError::io(path, source))?;
    init_with_writer(level, Mutex::new(file))
}

pub fn init_with_writer<W>(level: Level, writer: W) -> Result<(), LoggingError>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,{COMPONENT}={level}")));
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);
    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_flag_selects_level() {
        let mut config = EnvConfig::default();
        assert_eq!(default_level(&config), Level::INFO);
        config.debug = true;
        assert_eq!(default_level(&config), Level::DEBUG);
    }

    #[test]
    fn second_installation_is_rejected() {
        let _ = init_with_writer(Level::INFO, std::io::sink);
        let second = init_with_writer(Level::INFO, std::io::sink);
        assert!(matches!(second, Err(LoggingError::AlreadyInstalled(_))));
    }

    #[test]
    fn unopenable_log_file_reports_path() {
        let dir = std::env::temp_dir().join(format!("mention_tui_log_{}", std::process::id()));
        fs::create_dir_all(&dir).expect("temp dir");
        // A directory cannot be opened for appending.
        let result = init_to_file(Level::INFO, &dir);
        match result {
            Err(LoggingError::Io { path, .. }) => assert_eq!(path, dir),
            other => panic!("expected I/O error, got {other:?}"),
        }
        let _ = fs::remove_dir_all(&dir);
    }
}
