//! Where `suggestor` keeps its settings file and logs.
//!
//! The root is `<OS config dir>/.suggestor` unless `SUGGESTOR_CONFIG_HOME`
//! names another base directory. Callers resolve it once and pass the path
//! down, so nothing below `main` reads the environment.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use thiserror::Error;

pub const APP_DIR_NAME: &str = ".suggestor";

/// Replaces the OS config directory as the base of the app root.
pub const CONFIG_HOME_ENV: &str = "SUGGESTOR_CONFIG_HOME";

const LOGS_DIR_NAME: &str = "logs";

#[derive(Debug, Error)]
pub enum AppDirError {
    #[error("no config directory found; set SUGGESTOR_CONFIG_HOME to choose one")]
    NoConfigDir,
    #[error("failed to create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Resolve the app root from the environment and create it.
pub fn app_root_dir() -> Result<PathBuf, AppDirError> {
    let base = base_dir(std::env::var_os(CONFIG_HOME_ENV)).ok_or(AppDirError::NoConfigDir)?;
    let root = base.join(APP_DIR_NAME);
    std::fs::create_dir_all(&root).map_err(|source| AppDirError::CreateDir {
        path: root.clone(),
        source,
    })?;
    Ok(root)
}

/// Log directory under `root`; created by the logger, not here.
pub fn logs_dir(root: &Path) -> PathBuf {
    root.join(LOGS_DIR_NAME)
}

/// A non-empty override wins over the platform config directory.
fn base_dir(override_base: Option<OsString>) -> Option<PathBuf> {
    match override_base {
        Some(base) if !base.is_empty() => Some(PathBuf::from(base)),
        _ => BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_base_is_used_verbatim() {
        let base = base_dir(Some(OsString::from("/tmp/portable"))).unwrap();
        assert_eq!(base, PathBuf::from("/tmp/portable"));
    }

    #[test]
    fn empty_override_falls_back_to_platform_dir() {
        let fallback = base_dir(Some(OsString::new()));
        assert_eq!(fallback, base_dir(None));
    }

    #[test]
    fn logs_live_under_root() {
        let root = Path::new("/data/.suggestor");
        assert_eq!(logs_dir(root), PathBuf::from("/data/.suggestor/logs"));
    }
}
