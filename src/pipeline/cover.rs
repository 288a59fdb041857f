//! Cover generation: first PDF page → JPEG thumbnail, or a user image.
//!
//! ## Why render the first page?
//!
//! PDFs rarely ship a separate cover asset, but the first page almost always
//! *is* the cover (title page, report front matter). Rasterising it gives
//! every converted book a recognisable thumbnail in e-reader libraries.
//!
//! ## Why is cover failure non-fatal?
//!
//! A book without a cover is still a book. Rendering can fail on damaged
//! page objects even when the text layer is intact, so the caller logs a
//! warning and packages the EPUB without a cover instead of aborting.

use crate::config::ConversionConfig;
use crate::error::Pdf2EpubError;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::debug;

/// A cover image ready to be embedded into the EPUB container.
#[derive(Debug, Clone)]
pub struct CoverImage {
    /// Encoded image bytes (JPEG or PNG).
    pub data: Vec<u8>,
    /// MIME type for the OPF manifest.
    pub media_type: &'static str,
    /// Path of the image inside `OEBPS/`.
    pub file_name: &'static str,
}

/// Rasterise the first page of the document into a JPEG cover.
pub fn generate_cover(
    document: &PdfDocument<'_>,
    config: &ConversionConfig,
) -> Result<CoverImage, Pdf2EpubError> {
    let pages = document.pages();
    let page = pages.first().map_err(|e| {
        Pdf2EpubError::Internal(format!("Cannot load first page for cover: {:?}", e))
    })?;

    // Width in pixels at the requested DPI, capped by max_cover_pixels.
    // The height cap keeps extreme aspect ratios (banners, scrolls) bounded.
    let width_pts = page.width().value;
    let target_width = ((width_pts / 72.0) * config.cover_dpi as f32)
        .round()
        .min(config.max_cover_pixels as f32)
        .max(1.0) as i32;

    let render_config = PdfRenderConfig::new()
        .set_target_width(target_width)
        .set_maximum_height(config.max_cover_pixels as i32);

    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|e| Pdf2EpubError::Internal(format!("Cover render failed: {:?}", e)))?;

    let image = bitmap.as_image();
    debug!(
        "Rendered cover page → {}x{} px",
        image.width(),
        image.height()
    );

    let data = encode_jpeg(&image, config.cover_quality)
        .map_err(|e| Pdf2EpubError::Internal(format!("Cover JPEG encoding failed: {}", e)))?;

    Ok(CoverImage {
        data,
        media_type: "image/jpeg",
        file_name: "images/cover.jpg",
    })
}

/// Load a user-supplied cover image, verifying it is a decodable JPEG or PNG.
///
/// The format is sniffed from the file content, not the extension, so a PNG
/// renamed to `.jpg` is still embedded with the correct media type.
pub fn load_custom_cover(path: &Path) -> Result<CoverImage, Pdf2EpubError> {
    let data = std::fs::read(path).map_err(|e| Pdf2EpubError::CoverImageUnreadable {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let format =
        image::guess_format(&data).map_err(|e| Pdf2EpubError::CoverImageUnreadable {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;

    let (media_type, file_name) = match format {
        ImageFormat::Jpeg => ("image/jpeg", "images/cover.jpg"),
        ImageFormat::Png => ("image/png", "images/cover.png"),
        other => {
            return Err(Pdf2EpubError::UnsupportedCoverFormat {
                path: path.to_path_buf(),
                format: format!("{:?}", other),
            });
        }
    };

    // Decode fully so a truncated file fails here, not inside a reader app.
    image::load_from_memory_with_format(&data, format).map_err(|e| {
        Pdf2EpubError::CoverImageUnreadable {
            path: path.to_path_buf(),
            detail: e.to_string(),
        }
    })?;

    debug!(
        "Custom cover accepted: {} ({} bytes, {})",
        path.display(),
        data.len(),
        media_type
    );

    Ok(CoverImage {
        data,
        media_type,
        file_name,
    })
}

/// JPEG-encode a rendered page.
///
/// pdfium produces RGBA bitmaps; JPEG has no alpha channel, so the image is
/// flattened to RGB first.
fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, image::ImageError> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buf = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::io::Write;

    #[test]
    fn encode_jpeg_flattens_alpha() {
        let img =
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(16, 16, Rgba([255, 0, 0, 128])));
        let data = encode_jpeg(&img, 85).expect("encode should succeed");
        // JPEG SOI marker
        assert_eq!(&data[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn custom_cover_png_is_sniffed_from_content() {
        // Write a real PNG, but name it .jpg — content wins.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cover.jpg");
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([0, 0, 255, 255])));
        img.save_with_format(&path, ImageFormat::Png).unwrap();

        let cover = load_custom_cover(&path).unwrap();
        assert_eq!(cover.media_type, "image/png");
        assert_eq!(cover.file_name, "images/cover.png");
    }

    #[test]
    fn custom_cover_unsupported_format_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cover.bmp");
        // Minimal BMP magic; enough for format sniffing.
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"BM\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00")
            .unwrap();

        assert!(matches!(
            load_custom_cover(&path),
            Err(Pdf2EpubError::UnsupportedCoverFormat { .. })
        ));
    }

    #[test]
    fn custom_cover_truncated_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cover.png");
        // PNG magic followed by nothing decodable.
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A])
            .unwrap();

        assert!(matches!(
            load_custom_cover(&path),
            Err(Pdf2EpubError::CoverImageUnreadable { .. })
        ));
    }

    #[test]
    fn custom_cover_missing_file_is_unreadable() {
        assert!(matches!(
            load_custom_cover(Path::new("/no/such/cover.png")),
            Err(Pdf2EpubError::CoverImageUnreadable { .. })
        ));
    }
}
