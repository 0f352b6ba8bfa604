//! Progress-callback trait for per-file pipeline events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as each file goes through the pipeline. The library itself never
//! prints; the CLI turns these events into the "Moved ..." lines and a
//! progress bar.
//!
//! # Example
//!
//! ```rust
//! use papes::{ConversionConfig, ConversionProgressCallback};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! struct MoveLogger;
//!
//! impl ConversionProgressCallback for MoveLogger {
//!     fn on_file_moved(&self, source: &Path, destination: &Path) {
//!         println!("Moved {}\n to: {}", source.display(), destination.display());
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(MoveLogger))
//!     .build()
//!     .unwrap();
//! ```

use crate::output::FileResult;
use std::path::Path;
use std::sync::Arc;

/// Called by the pipeline as it processes each file.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Indices are 1-based.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before the first file.
    fn on_conversion_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called before a file is decoded.
    fn on_file_start(&self, index: usize, total_files: usize, source: &Path) {
        let _ = (index, total_files, source);
    }

    /// Called once a rename has been attempted, whether or not it succeeded.
    ///
    /// When the rename fails this fires *before* the error is returned, so a
    /// "moved" line is always emitted for an attempted move.
    fn on_file_moved(&self, source: &Path, destination: &Path) {
        let _ = (source, destination);
    }

    /// Called when the destination existed and the file was left in place.
    fn on_file_skipped(&self, source: &Path, destination: &Path) {
        let _ = (source, destination);
    }

    /// Called when a file has gone through every stage.
    fn on_file_complete(&self, index: usize, total_files: usize, result: &FileResult) {
        let _ = (index, total_files, result);
    }

    /// Called when a file fails. The run aborts right after.
    ///
    /// `error` is owned so implementations can move it into spawned tasks.
    fn on_file_error(&self, index: usize, total_files: usize, error: String) {
        let _ = (index, total_files, error);
    }

    /// Called once after the last file, only when every file succeeded.
    fn on_conversion_complete(&self, total_files: usize, success_count: usize) {
        let _ = (total_files, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
