//! Decode and encode boundary.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Sniff format | `image::guess_format` (magic bytes, not file extension) |
//! | Decode (PNG, JPEG, WebP, TIFF, GIF, BMP) | `image::load_from_memory_with_format` |
//! | Encode | `image::codecs::png::PngEncoder`, lossless RGBA8 |
//!
//! Export is PNG only: it is lossless and keeps the alpha channel the
//! threshold mask produces, so an encoded result decodes back to exactly the
//! rendered bytes.

use super::raster::{OutputRaster, SourceRaster};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageError, ImageFormat};
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("corrupt image data: {0}")]
    CorruptData(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("PNG encode failed: {0}")]
    Image(#[from] ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Extensions mapped to the decoders this build is meant to support.
const INPUT_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("png", ImageFormat::Png),
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("webp", ImageFormat::WebP),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("gif", ImageFormat::Gif),
    ("bmp", ImageFormat::Bmp),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    INPUT_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Lowercase file extensions that [`decode`] can handle in this build.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// True when `path` has a decodable extension (case-insensitive).
pub fn is_supported_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SUPPORTED_EXTENSIONS.iter().any(|ext| ext.eq_ignore_ascii_case(e)))
}

/// Decode image bytes into a [`SourceRaster`].
///
/// The format is sniffed from the content. Bytes that match no known
/// signature, or a format whose decoder isn't compiled in, are
/// `UnsupportedFormat`; a recognised format that fails to decode is
/// `CorruptData`.
pub fn decode(bytes: &[u8]) -> Result<SourceRaster, DecodeError> {
    let format = image::guess_format(bytes)
        .map_err(|_| DecodeError::UnsupportedFormat("unrecognised signature".into()))?;
    if !format.reading_enabled() {
        return Err(DecodeError::UnsupportedFormat(format!("{format:?}")));
    }
    let image = image::load_from_memory_with_format(bytes, format).map_err(|e| match e {
        ImageError::Unsupported(u) => DecodeError::UnsupportedFormat(u.to_string()),
        other => DecodeError::CorruptData(other.to_string()),
    })?;
    Ok(SourceRaster::from_dynamic(image))
}

/// Read and decode a file.
pub fn decode_file(path: &Path) -> Result<SourceRaster, DecodeError> {
    let bytes = std::fs::read(path)?;
    decode(&bytes)
}

/// Encode a rendered raster as PNG bytes.
pub fn encode(raster: &OutputRaster) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf).write_image(
        raster.as_bytes(),
        raster.width(),
        raster.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(buf)
}

/// Encode and write to `path`.
pub fn write_png(raster: &OutputRaster, path: &Path) -> Result<(), EncodeError> {
    let bytes = encode(raster)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{gradient_output, png_bytes};
    use image::RgbImage;

    #[test]
    fn supported_extensions_cover_common_formats() {
        let exts = supported_input_extensions();
        for expected in ["png", "jpg", "jpeg", "webp", "gif", "bmp", "tif"] {
            assert!(exts.contains(&expected), "expected {expected} in supported extensions");
        }
    }

    #[test]
    fn supported_path_is_case_insensitive() {
        assert!(is_supported_path(Path::new("a/ICON.PNG")));
        assert!(is_supported_path(Path::new("photo.Jpeg")));
        assert!(!is_supported_path(Path::new("notes.txt")));
        assert!(!is_supported_path(Path::new("no_extension")));
    }

    #[test]
    fn encode_then_decode_preserves_pixels() {
        let raster = gradient_output(13, 7);
        let bytes = encode(&raster).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.as_bytes(), raster.as_bytes());
    }

    #[test]
    fn decode_converts_rgb_to_opaque_rgba() {
        let rgb = RgbImage::from_pixel(3, 2, image::Rgb([10, 20, 30]));
        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes)
            .write_image(rgb.as_raw(), 3, 2, ExtendedColorType::Rgb8)
            .unwrap();
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.as_image().get_pixel(2, 1).0, [10, 20, 30, 255]);
    }

    #[test]
    fn unknown_bytes_are_unsupported() {
        let result = decode(b"definitely not an image");
        assert!(matches!(result, Err(DecodeError::UnsupportedFormat(_))));
    }

    #[test]
    fn truncated_png_is_corrupt() {
        let bytes = png_bytes(&gradient_output(32, 32));
        let result = decode(&bytes[..bytes.len() / 2]);
        assert!(matches!(result, Err(DecodeError::CorruptData(_))));
    }

    #[test]
    fn decode_file_missing_is_io_error() {
        let result = decode_file(Path::new("/nonexistent/source.png"));
        assert!(matches!(result, Err(DecodeError::Io(_))));
    }

    #[test]
    fn write_png_creates_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("out.png");
        write_png(&gradient_output(4, 4), &path).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
