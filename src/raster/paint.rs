use crate::foundation::core::{FrameRgba, Rgb};
use crate::raster::font::{self, CELL};
use crate::raster::grid::AsciiGrid;

/// Colors and scale used to turn an [`AsciiGrid`] back into a bitmap frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GlyphStyle {
    /// Ink color glyphs are drawn with.
    pub foreground: Rgb,
    /// Fill behind the glyphs; `None` leaves absent cells transparent.
    pub background: Option<Rgb>,
    /// Output cell edge in pixels; glyph bitmaps scale up by nearest
    /// neighbour from their native 8x8 cell.
    pub cell_px: u32,
}

impl Default for GlyphStyle {
    fn default() -> Self {
        Self {
            foreground: Rgb::new(0xEE, 0xEE, 0xEE),
            background: Some(Rgb::new(0x11, 0x11, 0x11)),
            cell_px: CELL,
        }
    }
}

/// Render a glyph grid into an RGBA bitmap of `cols * cell_px` by
/// `rows * cell_px` pixels. Absent cells show pure background.
pub fn paint(grid: &AsciiGrid, style: &GlyphStyle) -> FrameRgba {
    let cell = style.cell_px.max(1);
    let width = grid.cols * cell;
    let height = grid.rows * cell;
    let mut out = FrameRgba::transparent(width, height);

    if let Some(bg) = style.background {
        for px in out.data.chunks_exact_mut(4) {
            px.copy_from_slice(&[bg.r, bg.g, bg.b, 255]);
        }
    }

    let fg = [
        style.foreground.r,
        style.foreground.g,
        style.foreground.b,
        255,
    ];
    for c in &grid.cells {
        let bitmap = font::glyph_cell(c.glyph);
        let origin_x = c.col * cell;
        let origin_y = c.row * cell;
        for y in 0..cell {
            let row_bits = bitmap[(y * CELL / cell) as usize];
            for x in 0..cell {
                if row_bits >> (x * CELL / cell) & 1 == 0 {
                    continue;
                }
                let off = ((origin_y + y) * width + origin_x + x) as usize * 4;
                out.data[off..off + 4].copy_from_slice(&fg);
            }
        }
    }

    out
}
