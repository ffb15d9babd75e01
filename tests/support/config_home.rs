use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use nakchal::app_dirs::{APP_DIR_NAME, CONFIG_HOME_ENV};
use nakchal::config::CONFIG_FILE_NAME;
use tempfile::TempDir;

static CONFIG_HOME_LOCK: Mutex<()> = Mutex::new(());

/// Points `NAKCHAL_CONFIG_HOME` at a scratch root for the lifetime of the value.
///
/// Holds a process-wide lock so tests that read the variable never overlap.
pub struct ConfigHome {
    root: PathBuf,
    previous: Option<OsString>,
    _scratch: TempDir,
    _lock: MutexGuard<'static, ()>,
}

impl ConfigHome {
    /// An empty directory as the config root.
    pub fn empty() -> Self {
        Self::install(|scratch| scratch.to_path_buf())
    }

    /// A regular file as the config root, so nothing can be created beneath it.
    pub fn unusable() -> Self {
        Self::install(|scratch| {
            let path = scratch.join("not_a_dir");
            std::fs::write(&path, "").expect("write blocker file");
            path
        })
    }

    fn install(make_root: impl FnOnce(&Path) -> PathBuf) -> Self {
        let lock = CONFIG_HOME_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let scratch = tempfile::tempdir().expect("tempdir");
        let root = make_root(scratch.path());
        let previous = std::env::var_os(CONFIG_HOME_ENV);
        // SAFETY: every writer of this variable holds CONFIG_HOME_LOCK.
        unsafe { std::env::set_var(CONFIG_HOME_ENV, &root) };
        Self {
            root,
            previous,
            _scratch: scratch,
            _lock: lock,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `<root>/.nakchal/config.toml`.
    pub fn write_config(&self, toml: &str) -> PathBuf {
        let dir = self.root.join(APP_DIR_NAME);
        std::fs::create_dir_all(&dir).expect("create app dir");
        let path = dir.join(CONFIG_FILE_NAME);
        std::fs::write(&path, toml).expect("write config");
        path
    }
}

impl Drop for ConfigHome {
    fn drop(&mut self) {
        // SAFETY: the lock is still held until this value is fully dropped.
        unsafe {
            match self.previous.take() {
                Some(value) => std::env::set_var(CONFIG_HOME_ENV, value),
                None => std::env::remove_var(CONFIG_HOME_ENV),
            }
        }
    }
}
