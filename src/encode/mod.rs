pub mod gif89a;
pub mod lzw;
pub mod png;

pub use gif89a::{FrameDisposal, Gif89aEncoder, GifOptions, GlobalPalette, encode_frame_section};
pub use lzw::LzwCompressor;
pub use png::encode_png;
