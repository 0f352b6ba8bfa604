//! Error types for the papes library.
//!
//! A single fatal error type, [`PapesError`], covers every stage of the
//! pipeline. There is no per-file "soft" error: the first failure aborts the
//! run, files processed before it stay where they were moved, and files after
//! it are never touched.
//!
//! Wrapped I/O and decoder errors are kept as `#[source]` so callers (and the
//! CLI's `anyhow` report) can print the full cause chain.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the papes library.
#[derive(Debug, Error)]
pub enum PapesError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Source file was not found at the given path.
    ///
    /// Also what a second run over an already-moved file produces.
    #[error("Image not found: '{path}'\nCheck the path exists (it may already have been moved).")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the source file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    // ── Identification errors ─────────────────────────────────────────────
    /// The file could not be decoded as an image.
    #[error("Failed to decode '{path}' as an image: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Content sniffing could not determine the file type, so there is no
    /// extension to build a destination name from.
    #[error("Cannot determine the file type of '{path}' from its contents")]
    UnknownType { path: PathBuf },

    // ── Relocation errors ─────────────────────────────────────────────────
    /// The destination already exists and the collision policy is `Fail`.
    #[error("Destination '{path}' already exists\nUse --on-collision overwrite or skip.")]
    DestinationExists { path: PathBuf },

    /// `rename` failed: cross-device move, permissions, or a missing
    /// destination directory.
    #[error("Failed to move '{from}' to '{to}': {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── External tool errors ──────────────────────────────────────────────
    /// The external tool could not be started (usually: not on `PATH`).
    #[error("Could not run '{program}': {source}\nIs it installed and on your PATH?")]
    MissingExecutable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The external tool ran but exited unsuccessfully (strict mode only).
    #[error("'{program} -a {path}' exited with {}", fmt_code(.code))]
    ToolFailed {
        program: String,
        path: PathBuf,
        code: Option<i32>,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn fmt_code(code: &Option<i32>) -> String {
    match *code {
        Some(c) => format!("status {c}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

impl PapesError {
    /// The source or destination path this error is about, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            PapesError::FileNotFound { path }
            | PapesError::PermissionDenied { path }
            | PapesError::Decode { path, .. }
            | PapesError::UnknownType { path }
            | PapesError::DestinationExists { path }
            | PapesError::ToolFailed { path, .. } => Some(path),
            PapesError::Move { from, .. } => Some(from),
            PapesError::MissingExecutable { .. }
            | PapesError::InvalidConfig(_)
            | PapesError::Internal(_) => None,
        }
    }
}
