//! Runtime configuration: where the database lives and where logs go.
//!
//! Defaults to `~/.marching-band/band.sqlite`, with logs and CSV exports
//! written next to the database. The database and log locations can be
//! overridden through the environment.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories::BaseDirs;

const DATA_DIR_NAME: &str = ".marching-band";
const DB_FILE_NAME: &str = "band.sqlite";
const EXPORT_DIR_NAME: &str = "exports";
pub const LOG_FILE_NAME: &str = "marching-band.log";

/// Overrides the database file location.
pub const DB_PATH_ENV: &str = "MARCHING_BAND_DB";
/// Overrides the directory receiving the log file.
pub const LOG_DIR_ENV: &str = "MARCHING_BAND_LOG_DIR";
/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    /// Where CSV reports land, beside the database file.
    pub export_dir: PathBuf,
}

impl Config {
    /// Read the environment overrides, falling back to the home directory.
    pub fn load() -> Result<Self> {
        let db_path = env::var_os(DB_PATH_ENV).map(PathBuf::from);
        let log_dir = env::var_os(LOG_DIR_ENV).map(PathBuf::from);
        match db_path {
            Some(db_path) => Ok(Self::from_parts(db_path, log_dir)),
            None => Ok(Self::from_parts(default_db_path()?, log_dir)),
        }
    }

    fn from_parts(db_path: PathBuf, log_dir: Option<PathBuf>) -> Self {
        let data_dir = parent_or_current(&db_path);
        Self {
            log_dir: log_dir.unwrap_or_else(|| data_dir.clone()),
            export_dir: data_dir.join(EXPORT_DIR_NAME),
            db_path,
        }
    }
}

fn default_db_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}

fn parent_or_current(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logs_default_to_the_database_directory() {
        let config = Config::from_parts(PathBuf::from("/srv/band/band.sqlite"), None);
        assert_eq!(config.log_dir, PathBuf::from("/srv/band"));
        assert_eq!(config.export_dir, PathBuf::from("/srv/band/exports"));
    }

    #[test]
    fn explicit_log_dir_wins() {
        let config = Config::from_parts(
            PathBuf::from("band.sqlite"),
            Some(PathBuf::from("/var/log/band")),
        );
        assert_eq!(config.db_path, PathBuf::from("band.sqlite"));
        assert_eq!(config.log_dir, PathBuf::from("/var/log/band"));
        assert_eq!(config.export_dir, PathBuf::from("./exports"));
    }

    #[test]
    fn bare_file_name_logs_to_current_directory() {
        let config = Config::from_parts(PathBuf::from("band.sqlite"), None);
        assert_eq!(config.log_dir, PathBuf::from("."));
    }
}
