//! Throwaway Chrome profile directories.
//!
//! Every launched browser gets its own UUID-named profile so concurrent
//! batches never contend on Chrome's `SingletonLock`.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Directory name prefix for profiles created by this crate
pub const PROFILE_PREFIX: &str = "pricescrape_chrome";

/// Profile directory removed on drop unless released with [`into_path`](Self::into_path)
#[derive(Debug)]
pub struct BrowserProfile {
    path: PathBuf,
    cleanup_on_drop: bool,
}

impl BrowserProfile {
    /// Create a fresh profile under the system temp directory
    pub fn create() -> Result<Self> {
        Self::create_in(&std::env::temp_dir())
    }

    /// Create a fresh profile under `base`
    pub fn create_in(base: &Path) -> Result<Self> {
        let path = base.join(format!("{PROFILE_PREFIX}_{}", Uuid::new_v4()));
        // create_dir, not create_dir_all: an existing directory is an error
        std::fs::create_dir(&path)
            .with_context(|| format!("Failed to create profile directory: {}", path.display()))?;
        debug!("Created Chrome profile {}", path.display());
        Ok(Self {
            path,
            cleanup_on_drop: true,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hand the directory to another owner; it will no longer be removed on drop
    pub fn into_path(mut self) -> PathBuf {
        self.cleanup_on_drop = false;
        std::mem::take(&mut self.path)
    }
}

impl Drop for BrowserProfile {
    fn drop(&mut self) {
        if self.cleanup_on_drop {
            remove_profile_dir(&self.path);
        }
    }
}

/// Best-effort removal of a profile directory
pub fn remove_profile_dir(path: &Path) {
    if !path.exists() {
        return;
    }
    debug!("Removing Chrome profile {}", path.display());
    if let Err(e) = std::fs::remove_dir_all(path) {
        warn!("Failed to remove profile directory {}: {e}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_is_removed_on_drop() {
        let base = tempfile::tempdir().unwrap();
        let profile = BrowserProfile::create_in(base.path()).unwrap();
        let path = profile.path().to_path_buf();
        assert!(path.exists());
        assert!(path.file_name().unwrap().to_string_lossy().starts_with(PROFILE_PREFIX));
        drop(profile);
        assert!(!path.exists());
    }

    #[test]
    fn into_path_keeps_directory() {
        let base = tempfile::tempdir().unwrap();
        let path = BrowserProfile::create_in(base.path()).unwrap().into_path();
        assert!(path.exists());
        remove_profile_dir(&path);
        assert!(!path.exists());
    }
}
