pub mod neuquant;

pub use neuquant::NeuQuant;
