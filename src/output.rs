//! Result types returned by a papes run.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What happened to a single source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// Renamed into the output directory.
    Moved,
    /// The source already was its own destination; nothing to rename.
    AlreadyInPlace,
    /// The destination existed and the collision policy is `Skip`.
    SkippedExisting,
    /// Dry run: destination computed, nothing touched.
    Planned,
}

impl FileStatus {
    /// Whether the file now lives at its destination.
    pub fn is_in_place(self) -> bool {
        matches!(self, FileStatus::Moved | FileStatus::AlreadyInPlace)
    }
}

/// Content identity of an image: what [`crate::inspect`] returns and what the
/// pipeline computes before relocating a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileIdentity {
    pub path: PathBuf,
    /// MD5 of the decoded pixel buffer, 32 lowercase hex chars.
    pub digest: String,
    /// Extension detected from the file's leading bytes (`png`, `jpg`, ...).
    pub extension: String,
    pub width: u32,
    pub height: u32,
}

/// Outcome of one file that made it through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileResult {
    pub source: PathBuf,
    pub digest: String,
    pub extension: String,
    pub destination: PathBuf,
    pub status: FileStatus,
    /// Exit code of the external tool, when it ran and exited normally.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_exit_code: Option<i32>,
    /// Whether the external tool was run for this file.
    pub tool_invoked: bool,
}

/// Aggregate counters for a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    pub total_files: usize,
    pub moved: usize,
    pub already_in_place: usize,
    pub skipped: usize,
    pub planned: usize,
    pub tool_invocations: usize,
    pub total_duration_ms: u64,
}

impl ConversionStats {
    /// Tally per-status counters from a list of results.
    pub fn from_results(files: &[FileResult], total_duration_ms: u64) -> Self {
        let mut stats = ConversionStats {
            total_files: files.len(),
            total_duration_ms,
            ..Default::default()
        };
        for f in files {
            match f.status {
                FileStatus::Moved => stats.moved += 1,
                FileStatus::AlreadyInPlace => stats.already_in_place += 1,
                FileStatus::SkippedExisting => stats.skipped += 1,
                FileStatus::Planned => stats.planned += 1,
            }
            if f.tool_invoked {
                stats.tool_invocations += 1;
            }
        }
        stats
    }
}

/// Everything a successful run produced, files in input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    pub files: Vec<FileResult>,
    pub stats: ConversionStats,
}
