//! Eager (whole-batch) entry points.
//!
//! [`convert`] walks the sources in order and returns only after the last
//! one, or at the first error. Use [`crate::stream::convert_stream`] to get
//! each [`FileResult`] as soon as its file is done.

use crate::config::ConversionConfig;
use crate::error::PapesError;
use crate::output::{ConversionOutput, ConversionStats, FileIdentity, FileResult, FileStatus};
use crate::pipeline::{decode, hash, input, relocate, sniff, tool};
use crate::progress::{ConversionProgressCallback, NoopProgressCallback};
use std::io::ErrorKind;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Hash, rename and move every source into `config.out_dir`.
///
/// Files are processed strictly one after another, in the order given.
///
/// # Errors
/// The first failing file aborts the run and its error is returned. Files
/// before it have already been moved; files after it are not attempted.
pub async fn convert<P: AsRef<Path>>(
    sources: &[P],
    config: &ConversionConfig,
) -> Result<ConversionOutput, PapesError> {
    let total_start = Instant::now();
    let total = sources.len();
    let progress = progress_of(config);
    info!(
        "Starting run: {} file(s) → {}",
        total,
        config.out_dir.display()
    );

    progress.on_conversion_start(total);

    let mut files = Vec::with_capacity(total);
    for (i, source) in sources.iter().enumerate() {
        let result = process_file(i + 1, total, source.as_ref(), config).await?;
        files.push(result);
    }

    let stats = ConversionStats::from_results(&files, total_start.elapsed().as_millis() as u64);
    info!(
        "Run complete: {} moved, {} in place, {} skipped, {} planned, {}ms",
        stats.moved, stats.already_in_place, stats.skipped, stats.planned, stats.total_duration_ms
    );

    progress.on_conversion_complete(total, files.len());

    Ok(ConversionOutput { files, stats })
}

/// Run the pipeline for a single file.
pub async fn convert_file(
    source: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<FileResult, PapesError> {
    process_file(1, 1, source.as_ref(), config).await
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync<P: AsRef<Path>>(
    sources: &[P],
    config: &ConversionConfig,
) -> Result<ConversionOutput, PapesError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| PapesError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(sources, config))
}

/// Decode, hash and sniff a file without moving it.
pub async fn inspect(source: impl AsRef<Path>) -> Result<FileIdentity, PapesError> {
    identify(source.as_ref()).await
}

// ── Internal helpers ─────────────────────────────────────────────────────

pub(crate) fn progress_of(config: &ConversionConfig) -> &dyn ConversionProgressCallback {
    match config.progress_callback {
        Some(ref cb) => cb.as_ref(),
        None => &NoopProgressCallback,
    }
}

/// Pipeline for one file, with progress events. `index` is 1-based.
pub(crate) async fn process_file(
    index: usize,
    total: usize,
    source: &Path,
    config: &ConversionConfig,
) -> Result<FileResult, PapesError> {
    let progress = progress_of(config);
    progress.on_file_start(index, total, source);

    match run_stages(source, config, progress).await {
        Ok(result) => {
            progress.on_file_complete(index, total, &result);
            Ok(result)
        }
        Err(e) => {
            progress.on_file_error(index, total, e.to_string());
            Err(e)
        }
    }
}

/// Input → decode → hash → sniff. Shared by [`inspect`] and the pipeline.
async fn identify(source: &Path) -> Result<FileIdentity, PapesError> {
    let path = input::resolve_local(source).await?;

    let img = decode::decode_image(&path).await?;
    let digest = hash::pixel_digest(&img);
    debug!("{} pixels md5 {}", path.display(), digest);

    let extension = sniff::sniff_extension(&path)
        .await
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => PapesError::FileNotFound { path: path.clone() },
            ErrorKind::PermissionDenied => PapesError::PermissionDenied { path: path.clone() },
            _ => PapesError::Internal(format!("Failed to read header of {}: {}", path.display(), e)),
        })?
        .ok_or_else(|| PapesError::UnknownType { path: path.clone() })?;

    Ok(FileIdentity {
        width: img.width(),
        height: img.height(),
        path,
        digest,
        extension: extension.to_string(),
    })
}

async fn run_stages(
    source: &Path,
    config: &ConversionConfig,
    progress: &dyn ConversionProgressCallback,
) -> Result<FileResult, PapesError> {
    let identity = identify(source).await?;
    let destination = config.destination_for(&identity.digest, &identity.extension);

    let status = if config.dry_run {
        info!(
            "[dry run] {} → {}",
            identity.path.display(),
            destination.display()
        );
        FileStatus::Planned
    } else {
        relocate::relocate(&identity.path, &destination, config.on_collision, progress).await?
    };

    let mut tool_exit_code = None;
    let mut tool_invoked = false;
    if config.invoke_tool && status.is_in_place() {
        tool_exit_code = tool::run_tool(&config.tool, &destination, config.strict_tool).await?;
        tool_invoked = true;
    }

    Ok(FileResult {
        source: identity.path,
        digest: identity.digest,
        extension: identity.extension,
        destination,
        status,
        tool_exit_code,
        tool_invoked,
    })
}
