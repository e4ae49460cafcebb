#![forbid(unsafe_code)]

//! glyphcast turns images and animated GIFs into ASCII art, rendered back
//! out as PNG stills or fully self-assembled GIF89a animations.
//!
//! The pipeline runs in fixed stages: decode ([`decode`]), per-frame
//! compositing with GIF disposal semantics ([`compose`]), glyph
//! rasterization against a density-ordered palette ([`raster`]), neural
//! color quantization ([`quant`]), and GIF89a/LZW byte-stream assembly
//! ([`encode`]). [`session::Pipeline`] ties the stages together behind a
//! validated, cancellable API.

pub mod compose;
pub mod decode;
pub mod encode;
pub mod foundation;
pub mod quant;
pub mod raster;
pub mod session;

pub use compose::Compositor;
pub use decode::{decode_animation, decode_still};
pub use encode::{FrameDisposal, Gif89aEncoder, GifOptions, encode_png};
pub use foundation::core::{
    DisposalMethod, Frame, FrameRgba, LogicalScreen, PatchRect, Rgb,
};
pub use foundation::error::{GlyphcastError, GlyphcastResult};
pub use quant::NeuQuant;
pub use raster::{AsciiGrid, DensityPalette, GlyphStyle, paint, rasterize};
pub use session::{
    AsciiParams, CancelToken, ColumnLimits, Pipeline, PipelineOpts, Progress,
};
