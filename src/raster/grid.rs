use crate::foundation::core::FrameRgba;
use crate::raster::density::DensityPalette;
use image::imageops::FilterType;

/// Monospace glyph cells are taller than wide; this factor compensates so a
/// grid of cells keeps the source's apparent aspect ratio.
pub const CELL_ASPECT: f32 = 0.55;

/// Alpha at or below this threshold leaves the cell absent (background
/// shows through).
pub const ALPHA_THRESHOLD: u8 = 25;

/// One occupied cell of an [`AsciiGrid`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AsciiCell {
    /// Glyph chosen for this cell.
    pub glyph: char,
    /// Zero-based column.
    pub col: u32,
    /// Zero-based row.
    pub row: u32,
}

/// Sparse brightness-to-glyph grid derived from one bitmap.
///
/// Cells whose sampled alpha fell at or below [`ALPHA_THRESHOLD`] are simply
/// absent.
#[derive(Clone, Debug, PartialEq)]
pub struct AsciiGrid {
    /// Grid width in cells.
    pub cols: u32,
    /// Grid height in cells.
    pub rows: u32,
    /// Source aspect ratio (width / height) the row count was derived from.
    pub aspect_ratio: f32,
    /// Occupied cells in row-major order.
    pub cells: Vec<AsciiCell>,
}

/// Downsample `source` to `cols` columns and map per-cell brightness onto
/// the density palette.
///
/// Returns `None` when the palette is empty; a zero-size source yields an
/// empty grid. The mapping is fully deterministic: identical inputs produce
/// byte-identical grids.
pub fn rasterize(
    source: &FrameRgba,
    cols: u32,
    palette: &DensityPalette,
) -> Option<AsciiGrid> {
    if palette.is_empty() {
        return None;
    }
    if source.width == 0 || source.height == 0 || cols == 0 {
        return Some(AsciiGrid {
            cols,
            rows: 0,
            aspect_ratio: 0.0,
            cells: Vec::new(),
        });
    }

    let aspect_ratio = source.width as f32 / source.height as f32;
    let rows = ((cols as f32 / aspect_ratio * CELL_ASPECT).round() as u32).max(1);

    // Area resampling (draw-and-read): one triangle-filtered resize down to
    // cell resolution, then read each cell back as a single pixel. Point
    // sampling would alias on fine patterns.
    let img = image::RgbaImage::from_raw(source.width, source.height, source.data.clone())
        .expect("FrameRgba data length matches dimensions");
    let small = image::imageops::resize(&img, cols, rows, FilterType::Triangle);

    let n = palette.len() as f32;
    let mut cells = Vec::new();
    for row in 0..rows {
        for col in 0..cols {
            let [r, g, b, a] = small.get_pixel(col, row).0;
            if a <= ALPHA_THRESHOLD {
                continue;
            }
            let luma = (0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b))
                / 255.0;
            if luma.is_nan() {
                continue;
            }
            let index = ((luma * n).floor() as usize).min(palette.len() - 1);
            cells.push(AsciiCell {
                glyph: palette.glyph(index),
                col,
                row,
            });
        }
    }

    Some(AsciiGrid {
        cols,
        rows,
        aspect_ratio,
        cells,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/raster/grid.rs"]
mod tests;
