use crate::foundation::core::{DisposalMethod, Frame, FrameRgba, LogicalScreen};
use crate::foundation::error::{GlyphcastError, GlyphcastResult};
use tracing::warn;

/// Applies per-frame patches and disposal rules onto one persistent
/// logical-screen buffer.
///
/// [`Compositor::push`] paints frame *i*'s patch, snapshots the accumulated
/// screen as the composited frame, then applies frame *i*'s disposal so the
/// buffer is ready for frame *i+1*.
pub struct Compositor {
    screen: LogicalScreen,
    buffer: FrameRgba,
}

impl Compositor {
    /// Create a compositor over a validated logical screen.
    pub fn new(screen: LogicalScreen) -> GlyphcastResult<Self> {
        // LogicalScreen::new already rejects zero area, but callers can
        // construct the struct literally; re-check at the pipeline entry.
        let screen = LogicalScreen::new(screen.width, screen.height)?;
        Ok(Self {
            screen,
            buffer: FrameRgba::transparent(screen.width, screen.height),
        })
    }

    /// The logical screen all composited frames share.
    pub fn screen(&self) -> LogicalScreen {
        self.screen
    }

    /// Composite one raw frame, returning the full-screen snapshot for it.
    pub fn push(&mut self, frame: &Frame) -> GlyphcastResult<FrameRgba> {
        if !frame.rect.fits(self.screen) {
            return Err(GlyphcastError::decode(format!(
                "frame patch {}x{}+{}+{} exceeds logical screen {}x{}",
                frame.rect.width,
                frame.rect.height,
                frame.rect.left,
                frame.rect.top,
                self.screen.width,
                self.screen.height
            )));
        }
        let expected = frame.rect.width as usize * frame.rect.height as usize * 4;
        if frame.patch.len() != expected {
            return Err(GlyphcastError::decode(format!(
                "frame patch has {} bytes, rect needs {expected}",
                frame.patch.len()
            )));
        }

        self.paint_patch(frame);
        let snapshot = self.buffer.clone();

        match frame.disposal {
            DisposalMethod::None | DisposalMethod::DoNotDispose => {}
            DisposalMethod::RestoreBackground => self.clear_rect(frame),
            DisposalMethod::RestorePrevious => {
                warn!("'restore previous' disposal is unsupported; keeping drawn area");
            }
        }

        Ok(snapshot)
    }

    /// Source-over the patch onto the screen buffer (straight alpha).
    fn paint_patch(&mut self, frame: &Frame) {
        let stride = self.screen.width as usize * 4;
        for row in 0..frame.rect.height as usize {
            let src_off = row * frame.rect.width as usize * 4;
            let dst_off =
                (frame.rect.top as usize + row) * stride + frame.rect.left as usize * 4;
            for col in 0..frame.rect.width as usize {
                let src = &frame.patch[src_off + col * 4..src_off + col * 4 + 4];
                let dst = &mut self.buffer.data[dst_off + col * 4..dst_off + col * 4 + 4];
                blend_over(src, dst);
            }
        }
    }

    /// Fill exactly the just-drawn rect with transparent black.
    fn clear_rect(&mut self, frame: &Frame) {
        let stride = self.screen.width as usize * 4;
        for row in 0..frame.rect.height as usize {
            let dst_off =
                (frame.rect.top as usize + row) * stride + frame.rect.left as usize * 4;
            let width = frame.rect.width as usize * 4;
            self.buffer.data[dst_off..dst_off + width].fill(0);
        }
    }
}

/// Straight-alpha source-over with round-to-nearest integer math.
fn blend_over(src: &[u8], dst: &mut [u8]) {
    let sa = u32::from(src[3]);
    if sa == 255 {
        dst.copy_from_slice(src);
        return;
    }
    if sa == 0 {
        return;
    }
    let da = u32::from(dst[3]);
    let inv = 255 - sa;
    // out_a in [0, 255]; channels weighted by their own alpha.
    let out_a = sa + (da * inv + 127) / 255;
    if out_a == 0 {
        dst.fill(0);
        return;
    }
    for c in 0..3 {
        let sc = u32::from(src[c]);
        let dc = u32::from(dst[c]);
        let num = sc * sa * 255 + dc * da * inv;
        dst[c] = ((num + (out_a * 255) / 2) / (out_a * 255)) as u8;
    }
    dst[3] = out_a as u8;
}

#[cfg(test)]
#[path = "../../tests/unit/compose/compositor.rs"]
mod tests;
