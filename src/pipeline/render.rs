//! Page rasterisation: one page of one document to a bounded `DynamicImage`.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async
//! contexts. `tokio::task::spawn_blocking` moves the work onto the blocking
//! pool; the orchestrator awaits the result before touching the next page,
//! so sequencing is unaffected.
//!
//! ## Why scale to the longest dimension?
//!
//! Page sizes vary wildly, and vision models have an image-size sweet spot
//! around 1,024–2,048 px. Scaling so that max(width, height) equals the
//! configured target bounds both model cost and host memory for any page
//! geometry, portrait or landscape.

use crate::error::{ExtractError, PageError};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::debug;

/// Rasterise the 1-indexed `page_number` of a PDF so the longer raster
/// dimension equals `target_longest_dim`.
pub async fn render_pdf_page(
    pdf_path: &Path,
    page_number: usize,
    target_longest_dim: u32,
) -> Result<DynamicImage, PageError> {
    let path = pdf_path.to_path_buf();

    tokio::task::spawn_blocking(move || {
        render_pdf_page_blocking(&path, page_number, target_longest_dim)
    })
    .await
    .map_err(|e| PageError::Render {
        page: page_number,
        detail: format!("render task panicked: {e}"),
    })?
}

fn render_pdf_page_blocking(
    pdf_path: &Path,
    page_number: usize,
    target_longest_dim: u32,
) -> Result<DynamicImage, PageError> {
    let render_err = |detail: String| PageError::Render {
        page: page_number,
        detail,
    };

    let pdfium = Pdfium::default();
    let document = pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| render_err(format!("{e:?}")))?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    if page_number == 0 || page_number > total_pages {
        return Err(render_err(format!(
            "page {page_number} is out of range (document has {total_pages} pages)"
        )));
    }

    let page = pages
        .get((page_number - 1) as u16)
        .map_err(|e| render_err(format!("{e:?}")))?;

    let (width, height) = scaled_dimensions(
        page.width().value,
        page.height().value,
        target_longest_dim,
    );
    let render_config = PdfRenderConfig::new()
        .set_target_width(width)
        .set_target_height(height);

    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|e| render_err(format!("{e:?}")))?;

    let image = bitmap.as_image();
    debug!(
        "rendered page {} of {} → {}x{} px",
        page_number,
        pdf_path.display(),
        image.width(),
        image.height()
    );

    Ok(image)
}

/// Pixel dimensions such that the longer side equals `target` and the
/// aspect ratio is preserved.
fn scaled_dimensions(width_pts: f32, height_pts: f32, target: u32) -> (i32, i32) {
    let longest = width_pts.max(height_pts);
    if longest <= 0.0 {
        return (target as i32, target as i32);
    }
    let scale = target as f32 / longest;
    (
        ((width_pts * scale).round() as i32).max(1),
        ((height_pts * scale).round() as i32).max(1),
    )
}

/// Load a standalone image input as page 1 of its document.
///
/// Converted to a 3-channel colour model if it is not already; no dimension
/// constraint is applied — the file is transported as-is.
pub async fn load_image(image_path: &Path) -> Result<DynamicImage, PageError> {
    let path = image_path.to_path_buf();

    tokio::task::spawn_blocking(move || {
        let img = image::open(&path).map_err(|e| PageError::Render {
            page: 1,
            detail: format!("cannot decode image '{}': {e}", path.display()),
        })?;
        Ok(match img {
            DynamicImage::ImageRgb8(_) => img,
            other => DynamicImage::ImageRgb8(other.to_rgb8()),
        })
    })
    .await
    .map_err(|e| PageError::Render {
        page: 1,
        detail: format!("image task panicked: {e}"),
    })?
}

/// Number of pages in a PDF, for enumeration before processing.
pub(crate) fn pdf_page_count(pdf_path: &Path) -> Result<usize, ExtractError> {
    let pdfium = Pdfium::default();
    let document =
        pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| ExtractError::DocumentOpen {
                path: pdf_path.to_path_buf(),
                detail: format!("{e:?}"),
            })?;
    Ok(document.pages().len() as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn landscape_page_scales_to_target_width() {
        let (w, h) = scaled_dimensions(842.0, 595.0, 1024);
        assert_eq!(w, 1024);
        assert!(h < 1024);
        // Aspect ratio preserved within a pixel of rounding.
        let expected_h = (595.0 * 1024.0 / 842.0_f32).round() as i32;
        assert_eq!(h, expected_h);
    }

    #[test]
    fn portrait_page_scales_to_target_height() {
        let (w, h) = scaled_dimensions(595.0, 842.0, 1024);
        assert_eq!(h, 1024);
        assert!(w < 1024);
    }

    #[test]
    fn square_page_hits_target_on_both_sides() {
        assert_eq!(scaled_dimensions(500.0, 500.0, 768), (768, 768));
    }

    #[test]
    fn longest_side_always_equals_target() {
        for (w, h) in [(100.0, 900.0), (2000.0, 30.0), (612.0, 792.0)] {
            let (sw, sh) = scaled_dimensions(w, h, 1024);
            assert_eq!(sw.max(sh), 1024, "for page {w}x{h}");
        }
    }

    #[test]
    fn degenerate_geometry_falls_back_to_square() {
        assert_eq!(scaled_dimensions(0.0, 0.0, 512), (512, 512));
    }

    #[tokio::test]
    async fn load_image_converts_to_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.png");
        let rgba = RgbaImage::from_pixel(20, 10, Rgba([10, 20, 30, 255]));
        rgba.save(&path).unwrap();

        let img = load_image(&path).await.unwrap();
        assert!(matches!(img, DynamicImage::ImageRgb8(_)));
        // Dimensions are untouched: no scaling for standalone images.
        assert_eq!((img.width(), img.height()), (20, 10));
    }

    #[tokio::test]
    async fn load_image_reports_undecodable_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"\x89PNG\r\n\x1a\nnot really a png").unwrap();

        let err = load_image(&path).await.unwrap_err();
        assert!(matches!(err, PageError::Render { page: 1, .. }));
    }
}
