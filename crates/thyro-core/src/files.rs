//! Filesystem housekeeping for image folders.
//!
//! Per-file failures are logged and counted; only a missing or unwritable
//! directory stops an operation.

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::Path;

use crate::error::{PipelineError, PipelineResult};

/// Counts from a housekeeping run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileOpSummary {
    /// Files moved or removed
    pub processed: usize,
    /// Files that matched but could not be handled
    pub failed: usize,
}

fn require_dir(dir: &Path) -> PipelineResult<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(PipelineError::DirectoryNotFound(dir.to_path_buf()))
    }
}

/// Move every file in `source` whose name starts with one of `prefixes`
/// (case-insensitive) into `target`.
pub fn move_by_prefix(
    source: &Path,
    target: &Path,
    prefixes: &[char],
) -> PipelineResult<FileOpSummary> {
    require_dir(source)?;
    if !target.exists() {
        std::fs::create_dir_all(target).map_err(|e| PipelineError::Output {
            path: target.to_path_buf(),
            message: e.to_string(),
        })?;
        tracing::info!("Created target directory {:?}", target);
    }

    let prefixes: Vec<char> = prefixes.iter().flat_map(|c| c.to_lowercase()).collect();
    let entries = std::fs::read_dir(source)
        .map_err(|_| PipelineError::DirectoryNotFound(source.to_path_buf()))?;

    let mut summary = FileOpSummary::default();
    for entry in entries.filter_map(|e| e.ok()) {
        let name = entry.file_name();
        let matches = name
            .to_string_lossy()
            .chars()
            .next()
            .and_then(|c| c.to_lowercase().next())
            .is_some_and(|c| prefixes.contains(&c));
        if !matches || !entry.path().is_file() {
            continue;
        }

        let dest = target.join(&name);
        match move_file(&entry.path(), &dest) {
            Ok(()) => {
                tracing::debug!("Moved {:?}", name);
                summary.processed += 1;
            }
            Err(e) => {
                tracing::error!("Failed to move {:?}: {e}", name);
                summary.failed += 1;
            }
        }
    }

    tracing::info!("Moved {} files ({} failed)", summary.processed, summary.failed);
    Ok(summary)
}

// Rename first; fall back to copy + delete across filesystems.
fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    std::fs::copy(from, to)?;
    std::fs::remove_file(from)
}

/// Delete every file in `target` whose file name also exists in `reference`.
pub fn remove_duplicates(reference: &Path, target: &Path) -> PipelineResult<FileOpSummary> {
    require_dir(reference)?;
    require_dir(target)?;

    let known: HashSet<OsString> = std::fs::read_dir(reference)
        .map_err(|_| PipelineError::DirectoryNotFound(reference.to_path_buf()))?
        .filter_map(|e| e.ok())
        .map(|e| e.file_name())
        .collect();

    let entries = std::fs::read_dir(target)
        .map_err(|_| PipelineError::DirectoryNotFound(target.to_path_buf()))?;

    let mut summary = FileOpSummary::default();
    for entry in entries.filter_map(|e| e.ok()) {
        let name = entry.file_name();
        if !known.contains(&name) || !entry.path().is_file() {
            continue;
        }
        match std::fs::remove_file(entry.path()) {
            Ok(()) => {
                tracing::debug!("Removed {:?}", name);
                summary.processed += 1;
            }
            Err(e) => {
                tracing::error!("Failed to remove {:?}: {e}", name);
                summary.failed += 1;
            }
        }
    }

    tracing::info!("Removed {} duplicates ({} failed)", summary.processed, summary.failed);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"x").unwrap();
    }

    #[test]
    fn test_move_by_prefix() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let target = dst.path().join("few_shot");
        for name in ["B1.png", "c2.png", "D3.png", "A4.png", "e5.png"] {
            touch(src.path(), name);
        }

        let summary = move_by_prefix(src.path(), &target, &['B', 'C', 'D']).unwrap();
        assert_eq!(summary, FileOpSummary { processed: 3, failed: 0 });
        assert!(target.join("c2.png").exists());
        assert!(!src.path().join("B1.png").exists());
        assert!(src.path().join("A4.png").exists());
    }

    #[test]
    fn test_move_missing_source() {
        let dst = tempfile::tempdir().unwrap();
        let err = move_by_prefix(Path::new("/nonexistent/src"), dst.path(), &['B']).unwrap_err();
        assert!(matches!(err, PipelineError::DirectoryNotFound(_)));
    }

    #[test]
    fn test_move_uncreatable_target_keeps_cause() {
        let src = tempfile::tempdir().unwrap();
        touch(src.path(), "B1.png");
        let blocker = src.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();

        let err = move_by_prefix(src.path(), &blocker.join("few_shot"), &['B']).unwrap_err();
        match err {
            PipelineError::Output { path, message } => {
                assert_eq!(path, blocker.join("few_shot"));
                assert!(!message.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(src.path().join("B1.png").exists());
    }

    #[test]
    fn test_remove_duplicates() {
        let reference = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        touch(reference.path(), "a.png");
        touch(reference.path(), "b.png");
        touch(target.path(), "b.png");
        touch(target.path(), "c.png");

        let summary = remove_duplicates(reference.path(), target.path()).unwrap();
        assert_eq!(summary.processed, 1);
        assert!(!target.path().join("b.png").exists());
        assert!(target.path().join("c.png").exists());
        assert!(reference.path().join("b.png").exists());
    }

    #[test]
    fn test_remove_duplicates_missing_dir() {
        let target = tempfile::tempdir().unwrap();
        assert!(remove_duplicates(Path::new("/nonexistent/ref"), target.path()).is_err());
    }
}
