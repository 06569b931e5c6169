use std::fs::{File, OpenOptions};
use std::path::Path;

use fs2::FileExt;
use tracing::warn;

use crate::error::ArchiveError;

/// Whether OS-level advisory locking actually works on the archive root.
///
/// On filesystems without lock support the archive still behaves safely for
/// readers (atomic rename), but concurrent appends can lose entries; callers
/// that need the full guarantee should refuse to run in `FallbackOnly` mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockCapability {
    OsAdvisory,
    FallbackOnly,
}

impl LockCapability {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OsAdvisory => "os_advisory",
            Self::FallbackOnly => "fallback_only",
        }
    }
}

/// Exclusive advisory lock on a date's sibling lock file.
///
/// Blocks until acquired. The lock file itself is left in place; only the
/// lock is released on drop.
pub struct DayLock {
    file: File,
}

impl DayLock {
    pub fn acquire(lock_path: &Path) -> Result<Self, ArchiveError> {
        if let Some(parent) = lock_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ArchiveError::io(&e))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(lock_path)
            .map_err(|e| ArchiveError::io(&e))?;
        if let Err(e) = file.lock_exclusive() {
            // Advisory lock unsupported here: fall through unlocked, the
            // atomic-rename write is still the correctness backstop.
            warn!(path = %lock_path.display(), error = %e, "advisory lock unavailable");
        }
        Ok(Self { file })
    }
}

impl Drop for DayLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
    }
}

/// Probes the archive root for working advisory locks.
pub fn probe_lock_capability(root: &Path) -> Result<LockCapability, ArchiveError> {
    std::fs::create_dir_all(root).map_err(|e| ArchiveError::io(&e))?;
    let probe = root.join(".lock-probe");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&probe)
        .map_err(|e| ArchiveError::io(&e))?;
    let capability = match file.try_lock_exclusive() {
        Ok(()) => {
            let _ = fs2::FileExt::unlock(&file);
            LockCapability::OsAdvisory
        }
        Err(_) => LockCapability::FallbackOnly,
    };
    drop(file);
    let _ = std::fs::remove_file(&probe);
    Ok(capability)
}
