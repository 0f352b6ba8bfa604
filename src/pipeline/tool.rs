//! External tool: run `<tool> -a <destination>` on a moved file.
//!
//! The program is resolved through `PATH` by the OS. stdio is inherited so
//! the tool's own output reaches the terminal. There is no timeout; the run
//! waits for the tool to exit before touching the next file.

use crate::error::PapesError;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, warn};

/// Flag passed before the image path.
pub const TOOL_FLAG: &str = "-a";

/// Run the tool on `image` and return its exit code (`None` if killed by a
/// signal).
///
/// A spawn failure is [`PapesError::MissingExecutable`] with the OS error as
/// its source. A non-zero exit is only logged unless `strict` is set, in
/// which case it becomes [`PapesError::ToolFailed`].
pub async fn run_tool(program: &str, image: &Path, strict: bool) -> Result<Option<i32>, PapesError> {
    debug!("Running: {} {} {}", program, TOOL_FLAG, image.display());

    let status = Command::new(program)
        .arg(TOOL_FLAG)
        .arg(image)
        .status()
        .await
        .map_err(|e| PapesError::MissingExecutable {
            program: program.to_string(),
            source: e,
        })?;

    if !status.success() {
        if strict {
            return Err(PapesError::ToolFailed {
                program: program.to_string(),
                path: image.to_path_buf(),
                code: status.code(),
            });
        }
        warn!(
            "{} {} {} exited with {}",
            program,
            TOOL_FLAG,
            image.display(),
            status
        );
    }

    Ok(status.code())
}
