//! Image encoding: `DynamicImage` → base64 PNG wrapped in `ImageData`.
//!
//! VLM APIs accept images as base64 data embedded in the request body. PNG
//! is chosen over JPEG because it is lossless — text crispness matters far
//! more than payload size for transcription accuracy. `detail: "high"`
//! instructs tiling-based vision models to use their full image-token
//! budget; without it fine print and small tables are lost.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode a rasterised page as a base64 PNG ready for the backend call.
pub fn encode_raster(img: &DynamicImage) -> Result<ImageData, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    let b64 = STANDARD.encode(&buf);
    debug!("encoded raster → {} bytes base64", b64.len());

    Ok(ImageData::new(b64, "image/png").with_detail("high"))
}
