//! Protection of a file while it is being uploaded.
//!
//! Upload mechanics may move or delete the file they send. `SourceFileGuard`
//! keeps a copy next to the source and puts it back once the request is over,
//! whether it succeeded, failed, or the test panicked.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{Result, TesterError};

/// Scoped copy of a source file, restored on `restore` or on drop.
#[derive(Debug)]
pub struct SourceFileGuard {
    original: PathBuf,
    // `None` once restored.
    backup: Option<NamedTempFile>,
}

impl SourceFileGuard {
    /// Copy `path` to a temporary file in the same directory.
    pub fn protect(path: &Path) -> Result<Self> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let backup = tempfile::Builder::new()
            .prefix(".upload-")
            .tempfile_in(dir)
            .map_err(|e| TesterError::io(dir, e))?;
        fs::copy(path, backup.path()).map_err(|e| TesterError::io(path, e))?;
        tracing::debug!(source = %path.display(), backup = %backup.path().display(), "protected upload source");
        Ok(Self {
            original: path.to_path_buf(),
            backup: Some(backup),
        })
    }

    /// Move the copy back over the original path.
    pub fn restore(mut self) -> Result<()> {
        self.restore_in_place()
    }

    fn restore_in_place(&mut self) -> Result<()> {
        let Some(backup) = self.backup.take() else {
            return Ok(());
        };
        backup
            .persist(&self.original)
            .map_err(|e| TesterError::io(&self.original, e.error))?;
        Ok(())
    }
}

impl Drop for SourceFileGuard {
    fn drop(&mut self) {
        if let Err(err) = self.restore_in_place() {
            tracing::error!(error = %err, "failed to restore upload source");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restores_deleted_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        fs::write(&path, "original").unwrap();

        let guard = SourceFileGuard::protect(&path).unwrap();
        fs::remove_file(&path).unwrap();
        guard.restore().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "original");
    }

    #[test]
    fn restores_overwritten_source_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        fs::write(&path, "original").unwrap();

        {
            let _guard = SourceFileGuard::protect(&path).unwrap();
            fs::write(&path, "clobbered").unwrap();
        }

        assert_eq!(fs::read_to_string(&path).unwrap(), "original");
    }

    #[test]
    fn leaves_no_backup_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        fs::write(&path, "original").unwrap();

        SourceFileGuard::protect(&path).unwrap().restore().unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn missing_source_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SourceFileGuard::protect(&dir.path().join("absent.txt")).unwrap_err();
        assert!(matches!(err, TesterError::Io { .. }));
    }
}
