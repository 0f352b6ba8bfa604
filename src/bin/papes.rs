//! CLI binary for papes.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use papes::{
    convert, inspect, CollisionPolicy, ConversionConfig, ConversionProgressCallback, FileResult,
    FileStatus, ProgressCallback,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: prints the "Moved" line for every attempted
/// move on stdout and keeps a progress bar on stderr.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Print the "Moved" lines. Off for `--json` so stdout stays parseable.
    print_moves: bool,
}

impl CliProgressCallback {
    fn new(show_bar: bool, print_moves: bool) -> Arc<Self> {
        let bar = if show_bar {
            let bar = ProgressBar::new(0);
            let style = ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  \
                 [{bar:42.green/238}] {pos:>3}/{len} files  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
            bar.set_style(style);
            bar.set_prefix("Hashing");
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        } else {
            ProgressBar::hidden()
        };

        Arc::new(Self {
            bar,
            print_moves,
        })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_files: usize) {
        self.bar.set_length(total_files as u64);
        self.bar.reset_eta();
    }

    fn on_file_start(&self, _index: usize, _total: usize, source: &Path) {
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.display().to_string());
        self.bar.set_message(name);
    }

    fn on_file_moved(&self, source: &Path, destination: &Path) {
        if self.print_moves {
            self.bar.suspend(|| {
                println!("Moved {}\n to: {}", source.display(), destination.display());
            });
        }
    }

    fn on_file_skipped(&self, source: &Path, destination: &Path) {
        if self.print_moves {
            self.bar.suspend(|| println!("{}", skip_notice(source, destination)));
        }
    }

    fn on_file_complete(&self, _index: usize, _total: usize, _result: &FileResult) {
        self.bar.inc(1);
    }

    fn on_file_error(&self, index: usize, total: usize, error: String) {
        // Only the first line; anyhow prints the full chain on exit.
        let first = error.lines().next().unwrap_or_default();
        self.bar.println(format!(
            "  {} File {:>3}/{:<3}  {}",
            red("✗"),
            index,
            total,
            red(first),
        ));
        self.bar.abandon();
    }

    fn on_conversion_complete(&self, _total_files: usize, _success_count: usize) {
        self.bar.finish_and_clear();
    }
}

/// Stdout line for a file left alone because its destination exists.
fn skip_notice(source: &Path, destination: &Path) -> String {
    format!("Skipped {}\n exists: {}", source.display(), destination.display())
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Move two images into ~/.papes as <md5>.<ext>
  papes cat.png dog.jpg

  # Custom output directory, then run `wpg -a` on each moved file
  papes -o ~/Pictures/walls -w in/*

  # See where files would go without touching anything
  papes --dry-run in/*

  # Print digest, detected type and size only
  papes --inspect-only cat.png

  # Keep going quietly when a file with the same pixels is already there
  papes --on-collision skip in/*

NAMING:
  The name is the MD5 of the decoded pixel buffer, not of the file bytes,
  and the extension comes from the file's magic bytes, not its old name.
  A PNG re-saved with different compression keeps the same name.

ENVIRONMENT VARIABLES:
  PAPES_OUT           Output directory (default: $HOME/.papes)
  PAPES_WPG           Run the external tool (same as -w)
  PAPES_WPG_BIN       External tool program (default: wpg)
  PAPES_ON_COLLISION  fail | overwrite | skip
  RUST_LOG            Log filter, overrides -v / -q
"#;

/// Rename images to the MD5 of their pixels and move them into a wallpaper directory.
#[derive(Parser, Debug)]
#[command(
    name = "papes",
    version,
    about = "Generate MD5 hashes from images, rename them, move them, and optionally run wpg on them",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Image files to convert.
    #[arg(value_name = "FILES", required = true, num_args = 1..)]
    files: Vec<PathBuf>,

    /// Directory where converted images are written.
    #[arg(short, long, env = "PAPES_OUT", default_value_os_t = papes::config::default_out_dir())]
    out: PathBuf,

    /// Run wpg on the converted images.
    #[arg(short, long, env = "PAPES_WPG")]
    wpg: bool,

    /// External tool invoked as `<WPG_BIN> -a <file>`.
    #[arg(long, env = "PAPES_WPG_BIN", default_value = papes::config::DEFAULT_TOOL)]
    wpg_bin: String,

    /// What to do when the destination file already exists.
    #[arg(long, env = "PAPES_ON_COLLISION", value_enum, default_value = "fail")]
    on_collision: CollisionArg,

    /// Fail when the external tool exits with a non-zero status.
    #[arg(long)]
    strict_tool: bool,

    /// Compute destinations without moving files or running the tool.
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Print digest, detected type and dimensions only.
    #[arg(long)]
    inspect_only: bool,

    /// Output structured JSON instead of "Moved" lines.
    #[arg(long)]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PAPES_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum CollisionArg {
    Fail,
    Overwrite,
    Skip,
}

impl From<CollisionArg> for CollisionPolicy {
    fn from(v: CollisionArg) -> Self {
        match v {
            CollisionArg::Fail => CollisionPolicy::Fail,
            CollisionArg::Overwrite => CollisionPolicy::Overwrite,
            CollisionArg::Skip => CollisionPolicy::Skip,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar and the "Moved" lines carry the normal feedback, so
    // library INFO logs only show up with -v.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let mut identities = Vec::with_capacity(cli.files.len());
        for file in &cli.files {
            let id = inspect(file)
                .await
                .with_context(|| format!("Failed to inspect {}", file.display()))?;
            if !cli.json {
                println!(
                    "{}  {:<4}  {:>5}x{:<5}  {}",
                    id.digest,
                    id.extension,
                    id.width,
                    id.height,
                    id.path.display()
                );
            }
            identities.push(id);
        }
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&identities)
                    .context("Failed to serialise identities")?
            );
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress: ProgressCallback = CliProgressCallback::new(show_progress, !cli.json && !cli.quiet);
    let config = build_config(&cli, progress)?;

    // ── Run ──────────────────────────────────────────────────────────────
    let output = convert(&cli.files, &config)
        .await
        .context("Conversion failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if !cli.quiet {
        let s = &output.stats;
        let verb = if config.dry_run { "planned" } else { "moved" };
        let count = if config.dry_run { s.planned } else { s.moved };
        let mut summary = format!(
            "{} {} {verb}",
            if s.skipped == 0 { green("✔") } else { cyan("⚠") },
            bold(&count.to_string()),
        );
        if s.already_in_place > 0 {
            summary.push_str(&format!(", {} already in place", s.already_in_place));
        }
        if s.skipped > 0 {
            summary.push_str(&format!(", {} skipped", s.skipped));
        }
        if s.tool_invocations > 0 {
            summary.push_str(&format!(", {} × {}", s.tool_invocations, config.tool));
        }
        eprintln!(
            "{summary}  {}",
            dim(&format!("{}ms → {}", s.total_duration_ms, config.out_dir.display()))
        );

        for f in output.files.iter().filter(|f| f.status == FileStatus::Planned) {
            println!("{} → {}", f.source.display(), f.destination.display());
        }
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: ProgressCallback) -> Result<ConversionConfig> {
    ConversionConfig::builder()
        .out_dir(&cli.out)
        .invoke_tool(cli.wpg)
        .tool(cli.wpg_bin.clone())
        .strict_tool(cli.strict_tool)
        .on_collision(cli.on_collision.into())
        .dry_run(cli.dry_run)
        .progress_callback(progress)
        .build()
        .context("Invalid configuration")
}
