//! Configuration types for a papes run.
//!
//! All behaviour is controlled through [`ConversionConfig`], built via its
//! [`ConversionConfigBuilder`]. The list of source files is *not* part of the
//! config; it is passed to [`crate::convert()`] alongside it so the same config
//! can be reused for many batches.

use crate::error::PapesError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Name of the external wallpaper generator looked up on `PATH`.
pub const DEFAULT_TOOL: &str = "wpg";

/// Directory under `$HOME` used when no output directory is given.
pub const DEFAULT_OUT_DIR_NAME: &str = ".papes";

/// Configuration for a papes run.
///
/// # Example
/// ```rust
/// use papes::{CollisionPolicy, ConversionConfig};
///
/// let config = ConversionConfig::builder()
///     .out_dir("/tmp/papes/")
///     .invoke_tool(true)
///     .on_collision(CollisionPolicy::Skip)
///     .build()
///     .unwrap();
/// assert_eq!(config.out_dir, std::path::PathBuf::from("/tmp/papes"));
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Destination directory. Normalised on build: trailing and repeated
    /// separators are dropped so that exactly one separator joins it to the
    /// generated file name. Default: `$HOME/.papes`.
    pub out_dir: PathBuf,

    /// Run the external tool on every moved file. Default: false.
    pub invoke_tool: bool,

    /// External executable, resolved through `PATH` by the OS unless it
    /// contains a separator. Invoked as `<tool> -a <destination>`.
    /// Default: `wpg`.
    pub tool: String,

    /// Treat a non-zero tool exit as a fatal error. Default: false, a
    /// non-zero exit is only logged.
    pub strict_tool: bool,

    /// What to do when the destination file already exists. Default: `Fail`.
    pub on_collision: CollisionPolicy,

    /// Hash and plan only; never rename and never run the tool. Default: false.
    pub dry_run: bool,

    /// Optional progress callback for per-file events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
            invoke_tool: false,
            tool: DEFAULT_TOOL.to_string(),
            strict_tool: false,
            on_collision: CollisionPolicy::default(),
            dry_run: false,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("out_dir", &self.out_dir)
            .field("invoke_tool", &self.invoke_tool)
            .field("tool", &self.tool)
            .field("strict_tool", &self.strict_tool)
            .field("on_collision", &self.on_collision)
            .field("dry_run", &self.dry_run)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Destination for a file with the given digest and extension.
    pub fn destination_for(&self, hex_digest: &str, extension: &str) -> PathBuf {
        destination_path(&self.out_dir, hex_digest, extension)
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn out_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.out_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn invoke_tool(mut self, v: bool) -> Self {
        self.config.invoke_tool = v;
        self
    }

    pub fn tool(mut self, program: impl Into<String>) -> Self {
        self.config.tool = program.into();
        self
    }

    pub fn strict_tool(mut self, v: bool) -> Self {
        self.config.strict_tool = v;
        self
    }

    pub fn on_collision(mut self, policy: CollisionPolicy) -> Self {
        self.config.on_collision = policy;
        self
    }

    pub fn dry_run(mut self, v: bool) -> Self {
        self.config.dry_run = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(mut self) -> Result<ConversionConfig, PapesError> {
        if self.config.out_dir.as_os_str().is_empty() {
            return Err(PapesError::InvalidConfig(
                "output directory must not be empty".into(),
            ));
        }
        if self.config.invoke_tool && self.config.tool.trim().is_empty() {
            return Err(PapesError::InvalidConfig(
                "tool invocation requested but no tool program set".into(),
            ));
        }
        self.config.out_dir = normalize_out_dir(&self.config.out_dir);
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// What to do when two sources map to the same destination, i.e. they share
/// decoded pixels and sniffed type, or the destination already holds a file
/// from an earlier run.
///
/// A source that already *is* its destination is never a collision; it is
/// reported as [`crate::FileStatus::AlreadyInPlace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Abort the run with [`PapesError::DestinationExists`]. (default)
    #[default]
    Fail,
    /// Replace the existing destination (plain `rename` semantics).
    Overwrite,
    /// Leave the source where it is and carry on with the next file.
    Skip,
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CollisionPolicy::Fail => "fail",
            CollisionPolicy::Overwrite => "overwrite",
            CollisionPolicy::Skip => "skip",
        };
        f.write_str(s)
    }
}

// ── Path helpers ─────────────────────────────────────────────────────────

/// `$HOME/.papes`, or `./.papes` when no home directory can be determined.
pub fn default_out_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_OUT_DIR_NAME)
}

/// Drop trailing and repeated separators (and `.` components) so that
/// joining a file name adds exactly one separator.
///
/// `"/out"`, `"/out/"` and `"/out//"` all normalise to `"/out"`; the root
/// stays `"/"`.
pub fn normalize_out_dir(dir: &Path) -> PathBuf {
    let normalized: PathBuf = dir.components().collect();
    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}

/// `out_dir/{hex_digest}.{extension}` with `out_dir` normalised first.
pub fn destination_path(out_dir: &Path, hex_digest: &str, extension: &str) -> PathBuf {
    normalize_out_dir(out_dir).join(format!("{hex_digest}.{extension}"))
}
