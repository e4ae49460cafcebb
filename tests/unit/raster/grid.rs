use super::*;

fn solid(width: u32, height: u32, rgba: [u8; 4]) -> FrameRgba {
    FrameRgba {
        width,
        height,
        data: rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect(),
    }
}

#[test]
fn empty_palette_yields_none() {
    let frame = solid(4, 4, [255, 255, 255, 255]);
    let palette = DensityPalette::measure("");
    assert!(rasterize(&frame, 4, &palette).is_none());
}

#[test]
fn row_count_follows_aspect_compensation() {
    // 100x50 source, 20 cols: rows = round(20 / 2.0 * 0.55) = 6.
    let frame = solid(100, 50, [128, 128, 128, 255]);
    let palette = DensityPalette::measure(".:#");
    let grid = rasterize(&frame, 20, &palette).unwrap();
    assert_eq!(grid.cols, 20);
    assert_eq!(grid.rows, 6);
    assert!((grid.aspect_ratio - 2.0).abs() < f32::EPSILON);
}

#[test]
fn uniform_opaque_source_fills_every_cell_with_one_glyph() {
    let frame = solid(10, 10, [0, 0, 0, 255]);
    let palette = DensityPalette::measure(".,#");
    let grid = rasterize(&frame, 10, &palette).unwrap();
    assert_eq!(grid.cells.len(), (grid.cols * grid.rows) as usize);
    let first = grid.cells[0].glyph;
    assert!(grid.cells.iter().all(|c| c.glyph == first));
    // Black maps to the sparsest glyph.
    assert_eq!(first, palette.glyph(0));
}

#[test]
fn transparent_cells_are_absent() {
    let frame = solid(8, 8, [255, 255, 255, 0]);
    let palette = DensityPalette::measure(".:#");
    let grid = rasterize(&frame, 4, &palette).unwrap();
    assert!(grid.cells.is_empty());
}

#[test]
fn luma_index_stays_in_bounds_for_all_brightness() {
    let palette = DensityPalette::measure(".:=#@");
    for level in [0u8, 1, 63, 127, 128, 200, 254, 255] {
        let frame = solid(4, 4, [level, level, level, 255]);
        let grid = rasterize(&frame, 2, &palette).unwrap();
        for cell in &grid.cells {
            assert!(palette.glyphs().contains(&cell.glyph));
        }
    }
    // Peak white hits the densest glyph, not an out-of-range index.
    let white = solid(4, 4, [255, 255, 255, 255]);
    let grid = rasterize(&white, 2, &palette).unwrap();
    assert!(grid.cells.iter().all(|c| c.glyph == palette.glyph(4)));
}

#[test]
fn rasterize_is_deterministic() {
    let mut data = Vec::new();
    for i in 0..(16 * 16) {
        data.extend_from_slice(&[(i * 7 % 256) as u8, (i * 13 % 256) as u8, i as u8, 255]);
    }
    let frame = FrameRgba {
        width: 16,
        height: 16,
        data,
    };
    let palette = DensityPalette::measure(" .:-=+*#%@");
    let a = rasterize(&frame, 12, &palette).unwrap();
    let b = rasterize(&frame, 12, &palette).unwrap();
    assert_eq!(a, b);
}

#[test]
fn zero_size_source_yields_empty_grid_without_panic() {
    let frame = FrameRgba {
        width: 0,
        height: 0,
        data: Vec::new(),
    };
    let palette = DensityPalette::measure(".:#");
    let grid = rasterize(&frame, 10, &palette).unwrap();
    assert!(grid.cells.is_empty());
}
