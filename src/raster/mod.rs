pub mod density;
pub mod font;
pub mod grid;
pub mod paint;

pub use density::DensityPalette;
pub use grid::{AsciiCell, AsciiGrid, rasterize};
pub use paint::{GlyphStyle, paint};
