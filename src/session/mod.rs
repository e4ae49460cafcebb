pub mod pipeline;

pub use pipeline::{
    ANIM_FILENAME, AsciiParams, CancelToken, ColumnLimits, MIN_DISTINCT_GLYPHS, Pipeline,
    PipelineOpts, Progress, STILL_FILENAME, delay_cs_from_ms,
};
