//! # papes
//!
//! Rename images to the MD5 of their decoded pixels, move them into a
//! wallpaper directory, and optionally hand each one to an external
//! generator (`wpg -a <file>`).
//!
//! ## Pipeline Overview
//!
//! ```text
//! image file
//!  │
//!  ├─ 1. Input     the path must exist and be readable
//!  ├─ 2. Decode    `image` crate, content-sniffed format (spawn_blocking)
//!  ├─ 3. Hash      MD5 over the pixel buffer, not the file bytes
//!  ├─ 4. Sniff     extension from magic bytes, never the old file name
//!  ├─ 5. Relocate  atomic rename to <out_dir>/<md5>.<ext>
//!  └─ 6. Tool      optional `<tool> -a <destination>`
//! ```
//!
//! Files go through the pipeline one at a time, in input order. The first
//! error aborts the run: earlier files stay moved, later ones are untouched.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use papes::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .out_dir("/home/me/.papes")
//!         .invoke_tool(true)
//!         .build()?;
//!     let output = convert(&["cat.png", "dog.jpg"], &config).await?;
//!     for f in &output.files {
//!         println!("{} → {}", f.source.display(), f.destination.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `papes` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{CollisionPolicy, ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_file, convert_sync, inspect};
pub use error::PapesError;
pub use output::{ConversionOutput, ConversionStats, FileIdentity, FileResult, FileStatus};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::{convert_stream, FileStream};
