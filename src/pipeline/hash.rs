//! Content hash: MD5 over the decoded pixel buffer.
//!
//! The digest covers pixels in the image's native layout, not the file
//! bytes. Re-encoding a picture losslessly into another container keeps its
//! name; touching a single pixel changes it.

use image::DynamicImage;

/// 128-bit digest of the decoded pixels as 32 lowercase hex chars.
pub fn pixel_digest(img: &DynamicImage) -> String {
    hex_md5(img.as_bytes())
}

/// MD5 of `bytes` as lowercase hex.
pub fn hex_md5(bytes: &[u8]) -> String {
    format!("{:x}", md5::compute(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn known_vector() {
        assert_eq!(hex_md5(b""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(hex_md5(b"abc"), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn digest_is_over_pixels() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 1, Rgb([10, 20, 30])));
        assert_eq!(pixel_digest(&img), hex_md5(&[10, 20, 30, 10, 20, 30]));
        assert_eq!(pixel_digest(&img).len(), 32);
    }

    #[test]
    fn one_pixel_changes_the_digest() {
        let a = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255])));
        let mut b = a.to_rgba8();
        b.put_pixel(3, 3, Rgba([0, 0, 1, 255]));
        assert_ne!(pixel_digest(&a), pixel_digest(&DynamicImage::ImageRgba8(b)));
    }
}
