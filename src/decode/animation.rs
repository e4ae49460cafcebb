//! Boundary with the upstream GIF parser.
//!
//! The parser itself is the `gif` crate; this module only adapts its output
//! (logical screen descriptor plus raw per-frame patches) into the core data
//! model. Nothing here composites, quantizes, or re-encodes.

use crate::foundation::core::{DisposalMethod, Frame, LogicalScreen, PatchRect};
use crate::foundation::error::{GlyphcastError, GlyphcastResult};

/// Parse raw animated-GIF bytes into the logical screen and the ordered raw
/// frame list.
///
/// Frames come back as straight-alpha RGBA patches positioned by their image
/// descriptor; transparent source pixels have alpha 0.
pub fn decode_animation(bytes: &[u8]) -> GlyphcastResult<(LogicalScreen, Vec<Frame>)> {
    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::RGBA);
    let mut decoder = options
        .read_info(std::io::Cursor::new(bytes))
        .map_err(|e| GlyphcastError::decode(format!("gif header: {e}")))?;

    let screen = LogicalScreen::new(u32::from(decoder.width()), u32::from(decoder.height()))?;

    let mut frames = Vec::new();
    loop {
        let frame = decoder
            .read_next_frame()
            .map_err(|e| GlyphcastError::decode(format!("gif frame {}: {e}", frames.len())))?;
        let Some(frame) = frame else { break };

        frames.push(Frame {
            patch: frame.buffer.to_vec(),
            rect: PatchRect {
                left: u32::from(frame.left),
                top: u32::from(frame.top),
                width: u32::from(frame.width),
                height: u32::from(frame.height),
            },
            delay_cs: frame.delay,
            disposal: map_disposal(frame.dispose),
        });
    }

    if frames.is_empty() {
        return Err(GlyphcastError::decode("animation contains no frames"));
    }
    Ok((screen, frames))
}

fn map_disposal(d: gif::DisposalMethod) -> DisposalMethod {
    match d {
        gif::DisposalMethod::Any => DisposalMethod::None,
        gif::DisposalMethod::Keep => DisposalMethod::DoNotDispose,
        gif::DisposalMethod::Background => DisposalMethod::RestoreBackground,
        gif::DisposalMethod::Previous => DisposalMethod::RestorePrevious,
    }
}
