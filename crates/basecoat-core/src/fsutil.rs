//! Filesystem helpers used by the build pipeline and the installer
//!
//! Every helper reports failures as [`Error::Io`] carrying the offending path.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use walkdir::WalkDir;

/// Create `path` and any missing parents. Existing directories are left alone.
pub async fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .await
        .map_err(|e| Error::io("create directory", path, e))
}

/// Remove every child of `dir` while keeping `dir` itself.
///
/// Returns `false` when the directory does not exist yet, which is the normal
/// state before a first build.
pub async fn clean_dir(dir: &Path) -> Result<bool> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(dir = %dir.display(), "directory not found, nothing to clean");
            return Ok(false);
        }
        Err(e) => return Err(Error::io("read directory", dir, e)),
    };

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| Error::io("read directory", dir, e))?
    {
        let path = entry.path();
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| Error::io("inspect", &path, e))?;

        if file_type.is_dir() {
            fs::remove_dir_all(&path)
                .await
                .map_err(|e| Error::io("remove directory", &path, e))?;
        } else {
            fs::remove_file(&path)
                .await
                .map_err(|e| Error::io("remove file", &path, e))?;
        }
    }

    debug!(dir = %dir.display(), "cleaned directory");
    Ok(true)
}

/// Copy a single file, creating nothing. The parent of `dest` must exist.
pub async fn copy_file(src: &Path, dest: &Path) -> Result<()> {
    debug!(src = %src.display(), dest = %dest.display(), "copy file");
    fs::copy(src, dest)
        .await
        .map(|_| ())
        .map_err(|e| Error::io("copy", src, e))
}

/// Mirror every file under `src` into `dest`, keeping relative paths.
///
/// Files already in `dest` without a counterpart in `src` are kept; callers
/// wanting an exact mirror run [`clean_dir`] first. Returns the copied paths
/// relative to `dest`.
pub async fn copy_dir_recursive(src: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    ensure_dir(dest).await?;

    let mut copied = Vec::new();
    for entry in WalkDir::new(src).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            Error::io("walk", path, e.into())
        })?;

        // Entries always live under src
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            ensure_dir(&target).await?;
        } else {
            if let Some(parent) = target.parent() {
                ensure_dir(parent).await?;
            }
            copy_file(entry.path(), &target).await?;
            copied.push(relative.to_path_buf());
        }
    }

    debug!(
        src = %src.display(),
        dest = %dest.display(),
        files = copied.len(),
        "copied directory"
    );
    Ok(copied)
}
