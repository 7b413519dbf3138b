// Copyright (c) 2026 rezky_nightky

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};

pub const FILTER_ENV: &str = "GLYPHFALL_LOG";

fn build_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Installs the global subscriber. Without a log file nothing is installed:
/// the terminal belongs to the animation.
pub fn init(log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::Logging(format!("{}: {}", path.display(), e)))?;

    let directives = std::env::var(FILTER_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(directives.as_deref()))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::filter::LevelFilter;

    use super::*;

    #[test]
    fn filter_defaults_to_info() {
        assert_eq!(build_filter(None).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(
            build_filter(Some("trace")).max_level_hint(),
            Some(LevelFilter::TRACE)
        );
    }

    #[test]
    fn no_log_file_installs_nothing() {
        assert!(init(None).is_ok());
    }

    #[test]
    fn unwritable_log_path_is_reported() {
        let dir = std::env::temp_dir().join("glyphfall-missing-dir-for-log-test");
        let _ = std::fs::remove_dir_all(&dir);
        let err = init(Some(dir.join("out.log").as_path())).unwrap_err();
        assert!(matches!(err, Error::Logging(_)));
    }
}
