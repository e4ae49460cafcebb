pub mod animation;
pub mod still;

pub use animation::decode_animation;
pub use still::decode_still;
