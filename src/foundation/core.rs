use crate::foundation::error::{GlyphcastError, GlyphcastResult};

/// The fixed-size canvas every frame of one animation is composited against.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize,
)]
pub struct LogicalScreen {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
}

impl LogicalScreen {
    /// Create a validated logical screen with non-zero area.
    pub fn new(width: u32, height: u32) -> GlyphcastResult<Self> {
        if width == 0 || height == 0 {
            return Err(GlyphcastError::decode(format!(
                "logical screen must have non-zero area, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Total pixel count.
    pub fn area(self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Placement of one frame's rectangular patch within the logical screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PatchRect {
    /// Horizontal offset of the patch's left edge.
    pub left: u32,
    /// Vertical offset of the patch's top edge.
    pub top: u32,
    /// Patch width in pixels.
    pub width: u32,
    /// Patch height in pixels.
    pub height: u32,
}

impl PatchRect {
    /// Return `true` when the rect lies fully inside `screen`.
    pub fn fits(self, screen: LogicalScreen) -> bool {
        u64::from(self.left) + u64::from(self.width) <= u64::from(screen.width)
            && u64::from(self.top) + u64::from(self.height) <= u64::from(screen.height)
    }
}

/// How a frame's drawn area is treated before the next frame is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DisposalMethod {
    /// Unspecified; treated like [`DisposalMethod::DoNotDispose`].
    None,
    /// Leave the drawn area in place; the next frame accumulates on top.
    DoNotDispose,
    /// Clear exactly the drawn patch rectangle back to transparent.
    RestoreBackground,
    /// Restore the pixels from before this frame was drawn.
    ///
    /// Not implemented: the compositor warns and degrades to
    /// [`DisposalMethod::DoNotDispose`] rather than mis-rendering silently.
    RestorePrevious,
}

/// One raw frame as produced by the upstream GIF parser: an RGBA patch,
/// its placement, timing, and disposal rule.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Straight-alpha RGBA bytes, `rect.width * rect.height * 4` long.
    pub patch: Vec<u8>,
    /// Placement of the patch within the logical screen.
    pub rect: PatchRect,
    /// Frame delay in centiseconds.
    pub delay_cs: u16,
    /// Disposal rule applied after this frame is shown.
    pub disposal: DisposalMethod,
}

/// A full-size RGBA bitmap: a composited frame, a decoded still, or a
/// painted glyph frame. Straight (non-premultiplied) alpha.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRgba {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
}

impl FrameRgba {
    /// Allocate a fully transparent frame.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Drop the alpha channel, yielding a tightly packed RGB buffer.
    pub fn to_rgb(&self) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.data.len() / 4 * 3);
        for px in self.data.chunks_exact(4) {
            rgb.extend_from_slice(&px[..3]);
        }
        rgb
    }
}

/// An opaque 8-bit RGB color, used for glyph foreground/background styling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Construct from channel values.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#rrggbb` or `rrggbb` hex string.
    pub fn from_hex(s: &str) -> GlyphcastResult<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(GlyphcastError::validation(format!(
                "expected 6-digit hex color, got '{s}'"
            )));
        }
        let chan = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0);
        Ok(Self::new(chan(0), chan(2), chan(4)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
