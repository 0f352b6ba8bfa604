//! End-to-end tests for papes.
//!
//! Every test builds its own images with the `image` crate inside a
//! `TempDir`, runs the public API and checks the filesystem afterwards.
//! Tests that need an external tool write a small `/bin/sh` script and are
//! Unix-only.
//!
//! Run with:
//!   RUST_LOG=papes=debug cargo test --test e2e -- --nocapture

use futures::StreamExt;
use image::{ImageFormat, Rgb, RgbImage};
use papes::{
    convert, convert_file, convert_stream, convert_sync, inspect, CollisionPolicy,
    ConversionConfig, ConversionProgressCallback, FileStatus, PapesError,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Tests that spawn processes hold this so a freshly written tool script is
/// never exec'd while another test's fork still has it open for writing.
#[cfg(unix)]
static SPAWN_LOCK: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

/// Route library `tracing` output to the test harness. Safe to call from
/// every test; only the first call installs the subscriber.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

struct Fixture {
    _tmp: TempDir,
    src: PathBuf,
    out: PathBuf,
}

fn fixture() -> Fixture {
    init_tracing();
    let tmp = tempfile::tempdir().expect("tempdir");
    let src = tmp.path().join("in");
    let out = tmp.path().join("out");
    std::fs::create_dir_all(&src).unwrap();
    std::fs::create_dir_all(&out).unwrap();
    Fixture { _tmp: tmp, src, out }
}

fn pattern(seed: u8) -> RgbImage {
    RgbImage::from_fn(8, 6, |x, y| {
        Rgb([seed.wrapping_add(x as u8 * 16), y as u8 * 32, seed ^ 0x5a])
    })
}

fn write_image(dir: &Path, name: &str, img: &RgbImage, format: ImageFormat) -> PathBuf {
    let p = dir.join(name);
    img.save_with_format(&p, format).expect("write test image");
    p
}

/// MD5 of whatever the `image` crate decodes from `path`.
fn decoded_md5(path: &Path) -> String {
    let img = image::open(path).expect("decode test image");
    format!("{:x}", md5::compute(img.as_bytes()))
}

fn config(out: &Path) -> ConversionConfig {
    ConversionConfig::builder()
        .out_dir(out)
        .build()
        .expect("valid config")
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[derive(Default)]
struct Recorder {
    moved: Mutex<Vec<(PathBuf, PathBuf)>>,
    errors: Mutex<Vec<(usize, String)>>,
    completed: Mutex<Option<(usize, usize)>>,
}

impl ConversionProgressCallback for Recorder {
    fn on_file_moved(&self, source: &Path, destination: &Path) {
        self.moved
            .lock()
            .unwrap()
            .push((source.to_path_buf(), destination.to_path_buf()));
    }

    fn on_file_error(&self, index: usize, _total: usize, error: String) {
        self.errors.lock().unwrap().push((index, error));
    }

    fn on_conversion_complete(&self, total_files: usize, success_count: usize) {
        *self.completed.lock().unwrap() = Some((total_files, success_count));
    }
}

// ── Core pipeline ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_single_png_moved_to_pixel_digest() {
    let fx = fixture();
    let cat = write_image(&fx.src, "cat.png", &pattern(1), ImageFormat::Png);
    let expected_digest = decoded_md5(&cat);

    let output = convert(&[&cat], &config(&fx.out)).await.expect("run");

    let expected = fx.out.join(format!("{expected_digest}.png"));
    assert_eq!(output.files.len(), 1);
    let f = &output.files[0];
    assert_eq!(f.source, cat);
    assert_eq!(f.digest, expected_digest);
    assert_eq!(f.extension, "png");
    assert_eq!(f.destination, expected);
    assert_eq!(f.status, FileStatus::Moved);
    assert!(!f.tool_invoked);

    assert!(!cat.exists(), "source must be moved, not copied");
    assert!(expected.exists());
    assert_eq!(output.stats.moved, 1);
}

#[tokio::test]
async fn test_digest_is_over_pixels_not_bytes() {
    let fx = fixture();
    let img = pattern(7);
    let png = write_image(&fx.src, "a.png", &img, ImageFormat::Png);
    let bmp = write_image(&fx.src, "a.bmp", &img, ImageFormat::Bmp);
    assert_ne!(std::fs::read(&png).unwrap(), std::fs::read(&bmp).unwrap());

    let output = convert(&[&png, &bmp], &config(&fx.out)).await.unwrap();

    let pixel_md5 = format!("{:x}", md5::compute(img.as_raw()));
    assert_eq!(output.files[0].digest, pixel_md5);
    assert_eq!(output.files[1].digest, pixel_md5);
    assert_eq!(
        files_in(&fx.out),
        vec![format!("{pixel_md5}.bmp"), format!("{pixel_md5}.png")]
    );
}

#[tokio::test]
async fn test_extension_comes_from_content() {
    let fx = fixture();
    let liar = write_image(&fx.src, "photo.jpg", &pattern(3), ImageFormat::Png);

    let f = convert_file(&liar, &config(&fx.out)).await.unwrap();
    assert_eq!(f.extension, "png");
    assert!(f.destination.to_string_lossy().ends_with(".png"));
}

#[tokio::test]
async fn test_jpeg_gets_jpg_extension() {
    let fx = fixture();
    let dog = write_image(&fx.src, "dog.jpeg", &pattern(9), ImageFormat::Jpeg);
    let expected = decoded_md5(&dog);

    let f = convert_file(&dog, &config(&fx.out)).await.unwrap();
    assert_eq!(f.extension, "jpg");
    assert_eq!(f.destination, fx.out.join(format!("{expected}.jpg")));
}

#[tokio::test]
async fn test_out_dir_separator_normalised() {
    let fx = fixture();
    let a = write_image(&fx.src, "a.png", &pattern(1), ImageFormat::Png);
    let digest = decoded_md5(&a);

    let with_slashes = format!("{}//", fx.out.display());
    let cfg = ConversionConfig::builder()
        .out_dir(&with_slashes)
        .build()
        .unwrap();
    let f = convert_file(&a, &cfg).await.unwrap();

    assert_eq!(
        f.destination.to_string_lossy(),
        format!("{}/{}.png", fx.out.display(), digest)
    );
    assert!(f.destination.exists());
}

// ── Failure policy ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_not_an_image_is_decode_error() {
    let fx = fixture();
    let bad = fx.src.join("bad.txt");
    std::fs::write(&bad, "hello, I am text").unwrap();

    let err = convert(&[&bad], &config(&fx.out)).await.unwrap_err();
    assert!(matches!(err, PapesError::Decode { .. }), "got {err:?}");
    assert!(bad.exists(), "no move must be attempted");
    assert!(files_in(&fx.out).is_empty());
}

#[tokio::test]
async fn test_first_failure_aborts_run() {
    let fx = fixture();
    let good = write_image(&fx.src, "good.png", &pattern(1), ImageFormat::Png);
    let bad = fx.src.join("bad.txt");
    std::fs::write(&bad, "nope").unwrap();
    let later = write_image(&fx.src, "later.png", &pattern(2), ImageFormat::Png);

    let rec = Arc::new(Recorder::default());
    let cfg = ConversionConfig::builder()
        .out_dir(&fx.out)
        .progress_callback(rec.clone())
        .build()
        .unwrap();

    let err = convert(&[&good, &bad, &later], &cfg).await.unwrap_err();
    assert!(matches!(err, PapesError::Decode { .. }), "got {err:?}");

    assert!(!good.exists(), "files before the failure stay moved");
    assert!(later.exists(), "files after the failure are not attempted");
    assert_eq!(files_in(&fx.out).len(), 1);

    let errors = rec.errors.lock().unwrap().clone();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, 2);
    assert!(rec.completed.lock().unwrap().is_none());
}

#[tokio::test]
async fn test_rerun_on_moved_source_is_not_found() {
    let fx = fixture();
    let cat = write_image(&fx.src, "cat.png", &pattern(1), ImageFormat::Png);
    let cfg = config(&fx.out);

    convert(&[&cat], &cfg).await.expect("first run");
    let err = convert(&[&cat], &cfg).await.unwrap_err();
    assert!(matches!(err, PapesError::FileNotFound { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_failed_move_still_notified() {
    let fx = fixture();
    let cat = write_image(&fx.src, "cat.png", &pattern(1), ImageFormat::Png);
    let missing_out = fx.out.join("does/not/exist");

    let rec = Arc::new(Recorder::default());
    let cfg = ConversionConfig::builder()
        .out_dir(&missing_out)
        .progress_callback(rec.clone())
        .build()
        .unwrap();

    let err = convert(&[&cat], &cfg).await.unwrap_err();
    assert!(matches!(err, PapesError::Move { .. }), "got {err:?}");

    let moved = rec.moved.lock().unwrap().clone();
    assert_eq!(moved.len(), 1, "the move line is emitted regardless of outcome");
    assert_eq!(moved[0].0, cat);
    assert!(moved[0].1.starts_with(&missing_out));
    assert!(cat.exists());
}

// ── Collisions ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_identical_pixels_collide_and_fail_by_default() {
    let fx = fixture();
    let img = pattern(5);
    let first = write_image(&fx.src, "first.png", &img, ImageFormat::Png);
    let second = write_image(&fx.src, "second.png", &img, ImageFormat::Png);

    let err = convert(&[&first, &second], &config(&fx.out))
        .await
        .unwrap_err();
    assert!(
        matches!(err, PapesError::DestinationExists { .. }),
        "got {err:?}"
    );
    assert!(!first.exists());
    assert!(second.exists(), "the colliding file is left alone");
}

#[tokio::test]
async fn test_identical_pixels_skip_policy() {
    let fx = fixture();
    let img = pattern(5);
    let first = write_image(&fx.src, "first.png", &img, ImageFormat::Png);
    let second = write_image(&fx.src, "second.png", &img, ImageFormat::Png);

    let cfg = ConversionConfig::builder()
        .out_dir(&fx.out)
        .on_collision(CollisionPolicy::Skip)
        .build()
        .unwrap();
    let output = convert(&[&first, &second], &cfg).await.unwrap();

    assert_eq!(output.files[0].status, FileStatus::Moved);
    assert_eq!(output.files[1].status, FileStatus::SkippedExisting);
    assert_eq!(output.files[0].destination, output.files[1].destination);
    assert!(second.exists());
    assert_eq!(output.stats.skipped, 1);
}

#[cfg(unix)]
#[tokio::test]
async fn test_dangling_symlink_at_destination_is_never_replaced() {
    let fx = fixture();
    let cat = write_image(&fx.src, "cat.png", &pattern(1), ImageFormat::Png);
    let taken = fx.out.join(format!("{}.png", decoded_md5(&cat)));
    std::os::unix::fs::symlink(fx.src.join("gone.png"), &taken).unwrap();

    let err = convert(&[&cat], &config(&fx.out)).await.unwrap_err();
    assert!(
        matches!(err, PapesError::DestinationExists { .. }),
        "got {err:?}"
    );
    assert!(cat.exists());
    assert!(std::fs::symlink_metadata(&taken)
        .unwrap()
        .file_type()
        .is_symlink());
}

#[tokio::test]
async fn test_already_in_place_is_not_a_collision() {
    let fx = fixture();
    let cat = write_image(&fx.src, "cat.png", &pattern(1), ImageFormat::Png);
    let cfg = config(&fx.out);

    let moved = convert_file(&cat, &cfg).await.unwrap();
    let again = convert_file(&moved.destination, &cfg).await.unwrap();
    assert_eq!(again.status, FileStatus::AlreadyInPlace);
    assert_eq!(again.destination, moved.destination);
    assert!(moved.destination.exists());
}

// ── Dry run / inspect ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_dry_run_touches_nothing() {
    let fx = fixture();
    let cat = write_image(&fx.src, "cat.png", &pattern(1), ImageFormat::Png);

    let cfg = ConversionConfig::builder()
        .out_dir(&fx.out)
        .dry_run(true)
        .invoke_tool(true)
        .tool("papes-test-no-such-tool-3f9a")
        .build()
        .unwrap();
    let output = convert(&[&cat], &cfg).await.unwrap();

    assert_eq!(output.files[0].status, FileStatus::Planned);
    assert!(!output.files[0].tool_invoked);
    assert!(cat.exists());
    assert!(files_in(&fx.out).is_empty());
}

#[tokio::test]
async fn test_inspect_reports_identity() {
    let fx = fixture();
    let cat = write_image(&fx.src, "cat.png", &pattern(1), ImageFormat::Png);

    let id = inspect(&cat).await.unwrap();
    assert_eq!(id.digest, decoded_md5(&cat));
    assert_eq!(id.extension, "png");
    assert_eq!((id.width, id.height), (8, 6));
    assert!(cat.exists());
}

#[test]
fn test_convert_sync() {
    let fx = fixture();
    let cat = write_image(&fx.src, "cat.png", &pattern(1), ImageFormat::Png);

    let output = convert_sync(&[&cat], &config(&fx.out)).unwrap();
    assert_eq!(output.files[0].status, FileStatus::Moved);
}

// ── Streaming ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_stream_stops_after_first_error() {
    let fx = fixture();
    let a = write_image(&fx.src, "a.png", &pattern(1), ImageFormat::Png);
    let bad = fx.src.join("bad.txt");
    std::fs::write(&bad, "nope").unwrap();
    let c = write_image(&fx.src, "c.png", &pattern(2), ImageFormat::Png);

    let cfg = config(&fx.out);
    let mut s = convert_stream(&[&a, &bad, &c], &cfg);

    let first = s.next().await.expect("first item").expect("a converts");
    assert_eq!(first.source, a);
    let second = s.next().await.expect("second item");
    assert!(matches!(second, Err(PapesError::Decode { .. })));
    assert!(s.next().await.is_none(), "stream ends after the error");
    assert!(c.exists());
}

#[tokio::test]
async fn test_stream_completes_in_order() {
    let fx = fixture();
    let a = write_image(&fx.src, "a.png", &pattern(1), ImageFormat::Png);
    let b = write_image(&fx.src, "b.png", &pattern(2), ImageFormat::Png);

    let rec = Arc::new(Recorder::default());
    let cfg = ConversionConfig::builder()
        .out_dir(&fx.out)
        .progress_callback(rec.clone())
        .build()
        .unwrap();

    let results: Vec<_> = convert_stream(&[&a, &b], &cfg).collect().await;
    let sources: Vec<PathBuf> = results
        .into_iter()
        .map(|r| r.expect("ok").source)
        .collect();
    assert_eq!(sources, vec![a, b]);
    assert_eq!(*rec.completed.lock().unwrap(), Some((2, 2)));
}

// ── External tool ────────────────────────────────────────────────────────────

/// Write a fake tool that appends its arguments to `log`, one call per line.
#[cfg(unix)]
fn fake_tool(dir: &Path, log: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("fake-wpg");
    std::fs::write(
        &script,
        format!("#!/bin/sh\necho \"$@\" >> '{}'\n", log.display()),
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script
}

#[cfg(unix)]
#[tokio::test]
async fn test_tool_invoked_once_per_file_in_order() {
    let _guard = SPAWN_LOCK.lock().await;
    let fx = fixture();
    let cat = write_image(&fx.src, "cat.png", &pattern(1), ImageFormat::Png);
    let dog = write_image(&fx.src, "dog.jpg", &pattern(2), ImageFormat::Jpeg);
    let log = fx.src.join("calls.log");
    let tool = fake_tool(&fx.src, &log);

    let cfg = ConversionConfig::builder()
        .out_dir(&fx.out)
        .invoke_tool(true)
        .tool(tool.to_string_lossy())
        .build()
        .unwrap();
    let output = convert(&[&cat, &dog], &cfg).await.unwrap();

    let calls = std::fs::read_to_string(&log).unwrap();
    let expected = format!(
        "-a {}\n-a {}\n",
        output.files[0].destination.display(),
        output.files[1].destination.display()
    );
    assert_eq!(calls, expected);
    assert_eq!(output.stats.tool_invocations, 2);
    assert!(output.files.iter().all(|f| f.tool_exit_code == Some(0)));
}

#[cfg(unix)]
#[tokio::test]
async fn test_missing_tool_aborts_after_first_move() {
    let _guard = SPAWN_LOCK.lock().await;
    let fx = fixture();
    let cat = write_image(&fx.src, "cat.png", &pattern(1), ImageFormat::Png);
    let dog = write_image(&fx.src, "dog.png", &pattern(2), ImageFormat::Png);

    let cfg = ConversionConfig::builder()
        .out_dir(&fx.out)
        .invoke_tool(true)
        .tool("papes-test-no-such-tool-3f9a")
        .build()
        .unwrap();
    let err = convert(&[&cat, &dog], &cfg).await.unwrap_err();

    match err {
        PapesError::MissingExecutable { program, source } => {
            assert_eq!(program, "papes-test-no-such-tool-3f9a");
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!cat.exists(), "the move happens before the tool runs");
    assert!(dog.exists(), "second file never processed");
}

#[cfg(unix)]
#[tokio::test]
async fn test_skipped_file_does_not_run_tool() {
    let _guard = SPAWN_LOCK.lock().await;
    let fx = fixture();
    let img = pattern(4);
    let first = write_image(&fx.src, "first.png", &img, ImageFormat::Png);
    let second = write_image(&fx.src, "second.png", &img, ImageFormat::Png);
    let log = fx.src.join("calls.log");
    let tool = fake_tool(&fx.src, &log);

    let cfg = ConversionConfig::builder()
        .out_dir(&fx.out)
        .invoke_tool(true)
        .tool(tool.to_string_lossy())
        .on_collision(CollisionPolicy::Skip)
        .build()
        .unwrap();
    let output = convert(&[&first, &second], &cfg).await.unwrap();

    assert!(output.files[0].tool_invoked);
    assert!(!output.files[1].tool_invoked);
    assert_eq!(std::fs::read_to_string(&log).unwrap().lines().count(), 1);
}
