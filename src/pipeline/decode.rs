//! Image decoding: file on disk → `DynamicImage`.
//!
//! The decoder is picked from the file's content first and its extension
//! second, so formats without magic bytes (TGA) still decode. Whether the
//! type is *known* is a separate question answered by [`super::sniff`].
//!
//! Decoding is CPU-bound, so it runs under `spawn_blocking`. The caller
//! awaits it before touching the next file; nothing overlaps.

use crate::error::PapesError;
use image::{DynamicImage, ImageReader};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Decode the image at `path` on the blocking pool.
pub async fn decode_image(path: &Path) -> Result<DynamicImage, PapesError> {
    let owned = path.to_path_buf();
    tokio::task::spawn_blocking(move || decode_image_blocking(&owned))
        .await
        .map_err(|e| PapesError::Internal(format!("Decode task panicked: {}", e)))?
}

/// Blocking implementation of [`decode_image`].
pub fn decode_image_blocking(path: &Path) -> Result<DynamicImage, PapesError> {
    let decode_err = |source: image::ImageError| PapesError::Decode {
        path: PathBuf::from(path),
        source,
    };

    let img = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| decode_err(image::ImageError::IoError(e)))?
        .decode()
        .map_err(decode_err)?;

    debug!(
        "Decoded {} → {}x{} {:?}",
        path.display(),
        img.width(),
        img.height(),
        img.color()
    );
    Ok(img)
}
