//! GIF89a byte-stream assembly.
//!
//! One encoder instance produces one animation: signature and logical
//! screen up front (with the global color table trained on the first
//! frame), an optional Netscape loop extension before the first frame's
//! data, then per frame a graphic control extension, image descriptor, and
//! LZW-compressed indexed data. Frames after the first reuse the global
//! table; no local color tables are written. `finish` appends the single
//! trailer byte.

use crate::encode::lzw::LzwCompressor;
use crate::foundation::core::{FrameRgba, Rgb};
use crate::foundation::error::{GlyphcastError, GlyphcastResult};
use crate::quant::NeuQuant;
use tracing::debug;

/// Palette size is fixed at 256 entries, so indexed data always uses the
/// full 8-bit code size.
const COLOR_DEPTH: u8 = 8;

/// Disposal written into each graphic control extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameDisposal {
    /// Leave the frame in place.
    Keep,
    /// Clear to background before the next frame (the default).
    RestoreBackground,
}

impl FrameDisposal {
    fn bits(self) -> u8 {
        match self {
            FrameDisposal::Keep => 1,
            FrameDisposal::RestoreBackground => 2,
        }
    }
}

/// Encoder options fixed for the whole animation.
#[derive(Clone, Copy, Debug)]
pub struct GifOptions {
    /// `Some(0)` loops forever; `Some(n)` loops n times; `None` plays once
    /// (no Netscape extension).
    pub repeat: Option<u16>,
    /// Quantizer sampling factor, 1 (best) ..= 30 (fastest).
    pub quality: u32,
    /// Source color to key out as the GIF's transparent index.
    pub transparent: Option<Rgb>,
    /// Per-frame disposal method.
    pub disposal: FrameDisposal,
}

impl Default for GifOptions {
    fn default() -> Self {
        Self {
            repeat: Some(0),
            quality: 10,
            transparent: None,
            disposal: FrameDisposal::RestoreBackground,
        }
    }
}

/// Streaming GIF89a encoder over an in-memory byte buffer.
pub struct Gif89aEncoder {
    width: u16,
    height: u16,
    opts: GifOptions,
    out: Vec<u8>,
    palette: Option<GlobalPalette>,
    finished: bool,
}

/// The trained global palette retained for every frame's index lookups.
/// The training arenas live inside [`NeuQuant`] and belong to this encode
/// alone.
#[derive(Clone)]
pub struct GlobalPalette {
    quant: NeuQuant,
    flat: Vec<u8>,
    transparent_index: Option<u8>,
}

impl GlobalPalette {
    /// Train a palette on one RGB buffer.
    pub fn train(rgb: &[u8], quality: u32, transparent: Option<Rgb>) -> Self {
        let mut rgb = std::borrow::Cow::Borrowed(rgb);
        if let Some(px) = degenerate_fixup(&rgb) {
            // NeuQuant's sampler can fail to converge when nearly every
            // sample is identical; nudging a single channel by one step is
            // visually negligible and unblocks it.
            debug!("degenerate color population; perturbing one pixel before quantization");
            let owned = rgb.to_mut();
            owned[px] = owned[px].wrapping_add(1);
        }

        let quant = NeuQuant::train(&rgb, quality);
        let flat = quant.palette();
        let transparent_index = transparent.map(|c| quant.index_of(c.r, c.g, c.b));
        Self {
            quant,
            flat,
            transparent_index,
        }
    }

    /// Map one frame's RGB buffer to palette indices.
    pub fn index_frame(&self, rgb: &[u8]) -> Vec<u8> {
        rgb.chunks_exact(3)
            .map(|px| self.quant.index_of(px[0], px[1], px[2]))
            .collect()
    }
}

/// Detect a color population too flat for the quantizer: at most two
/// distinct colors. Returns the byte offset of the pixel to nudge.
fn degenerate_fixup(rgb: &[u8]) -> Option<usize> {
    let mut distinct: Vec<[u8; 3]> = Vec::new();
    for px in rgb.chunks_exact(3) {
        let c = [px[0], px[1], px[2]];
        if !distinct.contains(&c) {
            distinct.push(c);
            if distinct.len() > 2 {
                return None;
            }
        }
    }
    if rgb.len() >= 3 { Some(2) } else { None }
}

impl Gif89aEncoder {
    /// Create an encoder for `width x height` frames.
    pub fn new(width: u32, height: u32, opts: GifOptions) -> GlyphcastResult<Self> {
        if width == 0 || height == 0 || width > u32::from(u16::MAX) || height > u32::from(u16::MAX)
        {
            return Err(GlyphcastError::encode(format!(
                "gif dimensions out of range: {width}x{height}"
            )));
        }
        let mut out = Vec::new();
        out.extend_from_slice(b"GIF89a");
        Ok(Self {
            width: width as u16,
            height: height as u16,
            opts,
            out,
            palette: None,
            finished: false,
        })
    }

    /// The global palette, once the first frame has been added.
    pub fn palette(&self) -> Option<&GlobalPalette> {
        self.palette.as_ref()
    }

    /// Quantize, index, compress, and emit one frame; everything completes
    /// before this returns. `delay_cs` is the frame delay in centiseconds.
    pub fn add_frame(&mut self, frame: &FrameRgba, delay_cs: u16) -> GlyphcastResult<()> {
        let rgb = self.check_frame(frame)?;

        if self.palette.is_none() {
            let palette =
                GlobalPalette::train(&rgb, self.opts.quality, self.opts.transparent);
            self.write_screen(&palette);
            self.palette = Some(palette);
        }
        let palette = self.palette.as_ref().expect("palette written with frame 0");
        let indexed = palette.index_frame(&rgb);
        let section = encode_frame_section(
            palette,
            &indexed,
            self.width,
            self.height,
            delay_cs,
            self.opts.disposal,
        );
        self.out.extend_from_slice(&section);
        Ok(())
    }

    /// Validate dimensions and strip alpha.
    fn check_frame(&self, frame: &FrameRgba) -> GlyphcastResult<Vec<u8>> {
        if frame.width != u32::from(self.width) || frame.height != u32::from(self.height) {
            return Err(GlyphcastError::encode(format!(
                "frame is {}x{}, encoder expects {}x{}",
                frame.width, frame.height, self.width, self.height
            )));
        }
        Ok(frame.to_rgb())
    }

    /// Logical screen descriptor, global color table, loop extension.
    fn write_screen(&mut self, palette: &GlobalPalette) {
        self.out.extend_from_slice(&self.width.to_le_bytes());
        self.out.extend_from_slice(&self.height.to_le_bytes());
        // Global table present, 8 bits of color resolution, 256 entries.
        self.out.push(0x80 | 0x70 | 0x07);
        self.out.push(0); // background color index
        self.out.push(0); // square pixels

        self.out.extend_from_slice(&palette.flat);
        debug_assert_eq!(palette.flat.len(), 768);

        if let Some(repeat) = self.opts.repeat {
            self.out.extend_from_slice(&[0x21, 0xFF, 0x0B]);
            self.out.extend_from_slice(b"NETSCAPE2.0");
            self.out.extend_from_slice(&[3, 1]);
            self.out.extend_from_slice(&repeat.to_le_bytes());
            self.out.push(0);
        }
    }

    /// Append the trailer and hand back the finished byte stream.
    pub fn finish(mut self) -> GlyphcastResult<Vec<u8>> {
        if self.palette.is_none() {
            return Err(GlyphcastError::encode("no frames were added"));
        }
        if !self.finished {
            self.out.push(0x3B);
            self.finished = true;
        }
        Ok(self.out)
    }

    /// Append an already-encoded frame section (parallel encode path).
    pub fn push_section(&mut self, section: &[u8]) {
        self.out.extend_from_slice(section);
    }
}

/// Encode one frame's GCE + image descriptor + LZW data as a standalone
/// byte section. Pure function of its inputs so parallel workers can each
/// run it against their own palette clone.
pub fn encode_frame_section(
    palette: &GlobalPalette,
    indexed: &[u8],
    width: u16,
    height: u16,
    delay_cs: u16,
    disposal: FrameDisposal,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(indexed.len() / 4 + 32);

    // Graphic control extension.
    out.extend_from_slice(&[0x21, 0xF9, 0x04]);
    let (transp_flag, transp_index) = match palette.transparent_index {
        Some(i) => (1, i),
        None => (0, 0),
    };
    out.push(disposal.bits() << 2 | transp_flag);
    out.extend_from_slice(&delay_cs.to_le_bytes());
    out.push(transp_index);
    out.push(0);

    // Image descriptor: full-screen frame, no local color table.
    out.push(0x2C);
    out.extend_from_slice(&[0, 0, 0, 0]);
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
    out.push(0);

    out.push(COLOR_DEPTH);
    LzwCompressor::new(COLOR_DEPTH).compress(indexed, &mut out);
    out
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif89a.rs"]
mod tests;
