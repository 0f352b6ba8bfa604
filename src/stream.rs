//! Streaming API: yield each file's result as soon as it is done.
//!
//! The stream is lazy. Nothing is decoded or moved until it is polled, and
//! each poll drives exactly one file through the pipeline. After the first
//! `Err` the stream ends, matching the abort-on-first-failure policy of
//! [`crate::convert::convert`]. Dropping the stream stops the run between
//! files.

use crate::config::ConversionConfig;
use crate::convert::{process_file, progress_of};
use crate::error::PapesError;
use crate::output::FileResult;
use futures::stream::{self, Stream};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tracing::info;

/// A boxed stream of per-file results.
pub type FileStream = Pin<Box<dyn Stream<Item = Result<FileResult, PapesError>> + Send>>;

struct State {
    sources: std::vec::IntoIter<PathBuf>,
    index: usize,
    total: usize,
    succeeded: usize,
    config: ConversionConfig,
    done: bool,
}

/// Process `sources` in order, yielding one item per file.
///
/// # Example
/// ```rust,no_run
/// use futures::StreamExt;
/// use papes::{convert_stream, ConversionConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ConversionConfig::builder().out_dir("/tmp/papes").build()?;
/// let mut files = convert_stream(&["cat.png", "dog.jpg"], &config);
/// while let Some(item) = files.next().await {
///     let file = item?;
///     println!("{} → {}", file.source.display(), file.destination.display());
/// }
/// # Ok(())
/// # }
/// ```
pub fn convert_stream<P: AsRef<Path>>(sources: &[P], config: &ConversionConfig) -> FileStream {
    let sources: Vec<PathBuf> = sources.iter().map(|p| p.as_ref().to_path_buf()).collect();
    let total = sources.len();
    info!("Starting streaming run: {} file(s)", total);
    progress_of(config).on_conversion_start(total);

    let state = State {
        sources: sources.into_iter(),
        index: 0,
        total,
        succeeded: 0,
        config: config.clone(),
        done: false,
    };

    let s = stream::unfold(state, |mut st| async move {
        if st.done {
            return None;
        }
        let Some(source) = st.sources.next() else {
            progress_of(&st.config).on_conversion_complete(st.total, st.succeeded);
            return None;
        };
        st.index += 1;

        let item = process_file(st.index, st.total, &source, &st.config).await;
        match item {
            Ok(_) => st.succeeded += 1,
            Err(_) => st.done = true,
        }
        Some((item, st))
    });

    Box::pin(s)
}
