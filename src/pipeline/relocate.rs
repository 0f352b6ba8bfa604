//! Relocation: rename a source file to its content-addressed destination.
//!
//! Files are never copied. Moving across filesystems fails with `EXDEV` and
//! surfaces as [`PapesError::Move`].
//!
//! Under [`CollisionPolicy::Fail`] and [`CollisionPolicy::Skip`] the move
//! must not replace anything, so it is done as `hard_link` + `remove_file`:
//! the link fails with `AlreadyExists` if any entry (file, directory,
//! dangling symlink) appeared at the destination after the up-front check.
//! [`CollisionPolicy::Overwrite`] uses a plain `rename`.
//!
//! Every attempted move is reported through
//! [`ConversionProgressCallback::on_file_moved`] before its outcome is
//! known to the caller, so a "moved" line is printed even when the rename
//! fails and the error then aborts the run.

use crate::config::CollisionPolicy;
use crate::error::PapesError;
use crate::output::FileStatus;
use crate::progress::ConversionProgressCallback;
use std::io::{self, ErrorKind};
use std::path::Path;
use tracing::{debug, info, warn};

/// Move `source` to `destination` under `policy`.
///
/// Returns the resulting status, or the error that should abort the run.
pub async fn relocate(
    source: &Path,
    destination: &Path,
    policy: CollisionPolicy,
    progress: &dyn ConversionProgressCallback,
) -> Result<FileStatus, PapesError> {
    if same_file(source, destination).await {
        debug!("{} is already in place", source.display());
        progress.on_file_moved(source, destination);
        return Ok(FileStatus::AlreadyInPlace);
    }

    let move_err = |e: io::Error| PapesError::Move {
        from: source.to_path_buf(),
        to: destination.to_path_buf(),
        source: e,
    };

    if entry_exists(destination).await.map_err(move_err)? {
        match policy {
            CollisionPolicy::Fail => {
                progress.on_file_moved(source, destination);
                return Err(PapesError::DestinationExists {
                    path: destination.to_path_buf(),
                });
            }
            CollisionPolicy::Skip => return Ok(skip(source, destination, progress)),
            CollisionPolicy::Overwrite => {
                warn!("Overwriting {}", destination.display());
            }
        }
    }

    let result = match policy {
        CollisionPolicy::Overwrite => tokio::fs::rename(source, destination).await,
        CollisionPolicy::Fail | CollisionPolicy::Skip => move_no_replace(source, destination).await,
    };

    // Lost a race against something that created the destination.
    if let Err(ref e) = result {
        if e.kind() == ErrorKind::AlreadyExists && policy == CollisionPolicy::Skip {
            return Ok(skip(source, destination, progress));
        }
    }

    progress.on_file_moved(source, destination);
    match result {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            return Err(PapesError::DestinationExists {
                path: destination.to_path_buf(),
            });
        }
        Err(e) => return Err(move_err(e)),
    }

    info!("Moved {} → {}", source.display(), destination.display());
    Ok(FileStatus::Moved)
}

fn skip(source: &Path, destination: &Path, progress: &dyn ConversionProgressCallback) -> FileStatus {
    info!(
        "Skipping {}: {} already exists",
        source.display(),
        destination.display()
    );
    progress.on_file_skipped(source, destination);
    FileStatus::SkippedExisting
}

/// True when *any* directory entry sits at `path`, symlinks included
/// (dangling or not).
async fn entry_exists(path: &Path) -> io::Result<bool> {
    match tokio::fs::symlink_metadata(path).await {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Move without ever replacing an existing entry at `destination`.
///
/// Filesystems without hard links (FAT, some network mounts) fall back to
/// `rename` after the caller's existence check.
async fn move_no_replace(source: &Path, destination: &Path) -> io::Result<()> {
    match tokio::fs::hard_link(source, destination).await {
        Ok(()) => {}
        Err(e) if matches!(e.kind(), ErrorKind::Unsupported | ErrorKind::PermissionDenied) => {
            debug!("hard_link unavailable ({}), using rename", e);
            return tokio::fs::rename(source, destination).await;
        }
        Err(e) => return Err(e),
    }

    if let Err(e) = tokio::fs::remove_file(source).await {
        // Undo the link so the file is not left in two places.
        if let Err(undo) = tokio::fs::remove_file(destination).await {
            warn!("Failed to remove {}: {}", destination.display(), undo);
        }
        return Err(e);
    }
    Ok(())
}

/// True when both paths resolve to the same existing file.
async fn same_file(a: &Path, b: &Path) -> bool {
    match (
        tokio::fs::canonicalize(a).await,
        tokio::fs::canonicalize(b).await,
    ) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
