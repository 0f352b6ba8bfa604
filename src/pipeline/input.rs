//! Input validation: make sure a source path names a readable file.
//!
//! Checking up front turns "the file was already moved by a previous run"
//! into a clear [`PapesError::FileNotFound`] instead of a decoder I/O error.

use crate::error::PapesError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate that `path` exists, is a regular file and can be opened.
pub async fn resolve_local(path: &Path) -> Result<PathBuf, PapesError> {
    let meta = match tokio::fs::metadata(path).await {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            return Err(PapesError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(PapesError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    };

    if !meta.is_file() {
        return Err(PapesError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    // Check read permission by attempting to open
    match tokio::fs::File::open(path).await {
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            return Err(PapesError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(PapesError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    }

    debug!("Resolved source: {}", path.display());
    Ok(path.to_path_buf())
}
