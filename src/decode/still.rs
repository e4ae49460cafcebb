use crate::foundation::core::FrameRgba;
use crate::foundation::error::{GlyphcastError, GlyphcastResult};

/// Decode a still raster image (any format the `image` crate recognizes)
/// into a straight-alpha RGBA frame.
pub fn decode_still(bytes: &[u8]) -> GlyphcastResult<FrameRgba> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| GlyphcastError::decode(format!("still image: {e}")))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(GlyphcastError::decode("still image has zero area"));
    }
    Ok(FrameRgba {
        width,
        height,
        data: rgba.into_raw(),
    })
}
