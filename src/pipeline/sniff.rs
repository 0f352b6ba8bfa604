//! Content sniffing: pick the destination extension from magic bytes.
//!
//! The existing file name is never trusted. A `cat.jpg` that is really a
//! PNG ends up as `<digest>.png`. Formats the `image` crate cannot recognise
//! from their header (TGA has no magic number) yield `None`, which the
//! pipeline turns into [`crate::PapesError::UnknownType`].

use image::ImageFormat;
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Number of leading bytes inspected. Every signature `image` knows fits.
pub const SNIFF_LEN: u64 = 64;

/// Read the header of `path` and return its extension, if recognised.
pub async fn sniff_extension(path: &Path) -> std::io::Result<Option<&'static str>> {
    let file = tokio::fs::File::open(path).await?;
    let mut header = Vec::with_capacity(SNIFF_LEN as usize);
    file.take(SNIFF_LEN).read_to_end(&mut header).await?;
    Ok(extension_from_header(&header))
}

/// Extension for a file starting with `header`, if its format is recognised.
pub fn extension_from_header(header: &[u8]) -> Option<&'static str> {
    image::guess_format(header).ok().and_then(extension_for)
}

/// Canonical extension for a sniffed format.
///
/// Short forms (`jpg`, `tif`) are used where a format has several.
pub fn extension_for(format: ImageFormat) -> Option<&'static str> {
    let ext = match format {
        ImageFormat::Png => "png",
        ImageFormat::Jpeg => "jpg",
        ImageFormat::Gif => "gif",
        ImageFormat::WebP => "webp",
        ImageFormat::Bmp => "bmp",
        ImageFormat::Tiff => "tif",
        ImageFormat::Ico => "ico",
        ImageFormat::Avif => "avif",
        ImageFormat::Pnm => "pnm",
        ImageFormat::Hdr => "hdr",
        ImageFormat::OpenExr => "exr",
        ImageFormat::Qoi => "qoi",
        ImageFormat::Dds => "dds",
        ImageFormat::Farbfeld => "ff",
        other => return other.extensions_str().first().copied(),
    };
    Some(ext)
}
