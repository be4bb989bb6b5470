use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Overrides the database location.
pub(crate) const DB_ENV: &str = "FINTRACK_DB";
/// Log filter directives, e.g. `debug` or `fintrack=trace`.
pub(crate) const LOG_ENV: &str = "FINTRACK_LOG";

const DEFAULT_LOG: &str = "warn";

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Config {
    pub db_path: PathBuf,
    pub log_filter: String,
}

impl Config {
    pub(crate) fn from_env() -> Result<Self> {
        Self::resolve(
            std::env::var(DB_ENV).ok(),
            std::env::var(LOG_ENV).ok(),
            std::env::var("RUST_LOG").ok(),
        )
    }

    /// Precedence: explicit values first, then the platform data directory
    /// and the default filter.
    fn resolve(
        db_override: Option<String>,
        log: Option<String>,
        rust_log: Option<String>,
    ) -> Result<Self> {
        let db_path = match db_override.filter(|s| !s.trim().is_empty()) {
            Some(p) => PathBuf::from(crate::run::shellexpand(p.trim())),
            None => default_db_path()?,
        };
        let log_filter = log
            .or(rust_log)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG.to_string());
        Ok(Self {
            db_path,
            log_filter,
        })
    }

    /// Ensure the database's parent directory exists.
    pub(crate) fn prepare_data_dir(&self) -> Result<()> {
        if let Some(dir) = self.db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;
        }
        Ok(())
    }
}

fn default_db_path() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "fintrack", "Fintrack")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(proj_dirs.data_dir().join("fintrack.db"))
}

/// Install the global subscriber. Logs go to stderr so reports on stdout stay clean.
pub(crate) fn init_logging(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_db_override_wins() {
        let config = Config::resolve(Some("/tmp/ledger.db".into()), None, None).unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/ledger.db"));
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn test_blank_override_falls_back() {
        let config = Config::resolve(Some("  ".into()), None, None);
        // The platform directory may be unavailable in a sandbox
        if let Ok(config) = config {
            assert!(config.db_path.ends_with("fintrack.db"));
        }
    }

    #[test]
    fn test_log_precedence() {
        let db = Some("x.db".to_string());
        let both = Config::resolve(db.clone(), Some("debug".into()), Some("trace".into())).unwrap();
        assert_eq!(both.log_filter, "debug");
        let rust_log = Config::resolve(db.clone(), None, Some("trace".into())).unwrap();
        assert_eq!(rust_log.log_filter, "trace");
        let empty = Config::resolve(db, Some(String::new()), None).unwrap();
        assert_eq!(empty.log_filter, "warn");
    }

    #[test]
    fn test_prepare_data_dir_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("deeper").join("fintrack.db");
        let config = Config {
            db_path: db_path.clone(),
            log_filter: DEFAULT_LOG.into(),
        };
        config.prepare_data_dir().unwrap();
        assert!(db_path.parent().unwrap().is_dir());
    }

    #[test]
    fn test_relative_path_without_parent() {
        let config = Config {
            db_path: PathBuf::from("fintrack.db"),
            log_filter: DEFAULT_LOG.into(),
        };
        assert!(config.prepare_data_dir().is_ok());
    }
}
