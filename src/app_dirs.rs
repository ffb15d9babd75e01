//! Location of the `.nakchal` application directory.
//!
//! Only paths are computed here. Nothing is created until a caller actually
//! writes a file, so a missing or read-only config root never blocks a run.

use std::ffi::OsString;
use std::path::PathBuf;

use directories::BaseDirs;
use thiserror::Error;

/// Name of the application directory that lives under the config root.
pub const APP_DIR_NAME: &str = ".nakchal";

/// Environment variable that replaces the OS config root.
pub const CONFIG_HOME_ENV: &str = "NAKCHAL_CONFIG_HOME";

const LOGS_DIR_NAME: &str = "logs";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AppDirError {
    #[error("No config root available (set NAKCHAL_CONFIG_HOME to choose one)")]
    NoBaseDir,
}

/// `<config root>/.nakchal`, where the root is `NAKCHAL_CONFIG_HOME` or the OS config dir.
pub fn app_root_dir() -> Result<PathBuf, AppDirError> {
    resolve_root(
        std::env::var_os(CONFIG_HOME_ENV),
        BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf()),
    )
}

/// `<app root>/logs`. Not created.
pub fn logs_dir() -> Result<PathBuf, AppDirError> {
    Ok(app_root_dir()?.join(LOGS_DIR_NAME))
}

fn resolve_root(
    env_base: Option<OsString>,
    os_base: Option<PathBuf>,
) -> Result<PathBuf, AppDirError> {
    env_base
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or(os_base)
        .map(|base| base.join(APP_DIR_NAME))
        .ok_or(AppDirError::NoBaseDir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_base_wins_over_os_config_dir() {
        let root = resolve_root(Some("/tmp/home".into()), Some(PathBuf::from("/etc/xdg"))).unwrap();
        assert_eq!(root, PathBuf::from("/tmp/home").join(APP_DIR_NAME));
    }

    #[test]
    fn empty_env_value_is_ignored() {
        let root = resolve_root(Some(OsString::new()), Some(PathBuf::from("/etc/xdg"))).unwrap();
        assert_eq!(root, PathBuf::from("/etc/xdg/.nakchal"));
        assert_eq!(resolve_root(Some(OsString::new()), None), Err(AppDirError::NoBaseDir));
    }

    #[test]
    fn resolving_does_not_touch_the_filesystem() {
        let base = tempfile::tempdir().unwrap();
        let root = resolve_root(Some(base.path().into()), None).unwrap();
        assert!(!root.exists());
    }
}
