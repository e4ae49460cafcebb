use crate::foundation::core::FrameRgba;
use crate::foundation::error::{GlyphcastError, GlyphcastResult};
use image::ImageEncoder;

/// Encode one RGBA frame as PNG bytes (the still-image output path).
pub fn encode_png(frame: &FrameRgba) -> GlyphcastResult<Vec<u8>> {
    if frame.width == 0 || frame.height == 0 {
        return Err(GlyphcastError::encode("cannot encode a zero-size PNG"));
    }
    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(&mut out)
        .write_image(
            &frame.data,
            frame.width,
            frame.height,
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| GlyphcastError::encode(format!("png: {e}")))?;
    Ok(out)
}
