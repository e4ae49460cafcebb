//! Conversion sessions: parameter validation up front, then a cancellable
//! frame loop driving compositor -> rasterizer -> painter -> encoder.
//!
//! The frame loop runs on one thread and yields briefly between frames;
//! those yield points are also the only cancellation checkpoints, so an
//! abort lands before the next frame starts, never mid-frame. Starting a
//! new run through the same session cancels the superseded run's token
//! first, which keeps at most one run writing output.

use crate::compose::Compositor;
use crate::encode::gif89a::{Gif89aEncoder, GifOptions, encode_frame_section};
use crate::encode::png::encode_png;
use crate::foundation::core::{Frame, FrameRgba, LogicalScreen, Rgb};
use crate::foundation::error::{GlyphcastError, GlyphcastResult};
use crate::raster::{DensityPalette, GlyphStyle, paint, rasterize};
use rayon::prelude::*;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

/// Fixed download name for the still-image output.
pub const STILL_FILENAME: &str = "ascii-art.png";
/// Fixed download name for the animated output.
pub const ANIM_FILENAME: &str = "ascii-art.gif";

/// Fewest distinct glyphs a user-supplied set may contain.
pub const MIN_DISTINCT_GLYPHS: usize = 3;

/// Inclusive bounds on the target column resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ColumnLimits {
    /// Smallest accepted column count.
    pub min: u32,
    /// Largest accepted column count.
    pub max: u32,
}

impl Default for ColumnLimits {
    fn default() -> Self {
        Self { min: 8, max: 400 }
    }
}

/// User-facing conversion parameters, validated before any pipeline work.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AsciiParams {
    /// Target column resolution.
    pub cols: u32,
    /// Editable glyph set; at least [`MIN_DISTINCT_GLYPHS`] distinct.
    pub glyphs: String,
    /// Reverse the density order (dark-on-light sources).
    pub invert: bool,
    /// Glyph ink color.
    pub foreground: Rgb,
    /// Canvas fill color.
    pub background: Rgb,
    /// Output pixels per glyph cell.
    pub cell_px: u32,
    /// Quantizer sampling factor, 1 (best) ..= 30 (fastest).
    pub quality: u32,
    /// GIF loop count; `Some(0)` loops forever.
    pub repeat: Option<u16>,
}

impl Default for AsciiParams {
    fn default() -> Self {
        Self {
            cols: 120,
            glyphs: " .:-=+*#%@".to_owned(),
            invert: false,
            foreground: Rgb::new(0xEE, 0xEE, 0xEE),
            background: Rgb::new(0x11, 0x11, 0x11),
            cell_px: 8,
            quality: 10,
            repeat: Some(0),
        }
    }
}

/// Execution options for a session.
#[derive(Clone, Copy, Debug, Default)]
pub struct PipelineOpts {
    /// Compress frame sections on a rayon pool after frame 0 fixes the
    /// global palette.
    pub parallel: bool,
    /// Worker thread override; `None` uses rayon defaults.
    pub threads: Option<usize>,
}

/// Progress report delivered once per finished frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    /// Frames fully processed so far.
    pub frames_done: usize,
    /// Total frames in this run.
    pub frames_total: usize,
}

/// Cooperative cancellation flag shared between a run and its owner.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; takes effect at the next between-frame check.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// A validated conversion session.
///
/// One session owns its measured [`DensityPalette`] and hands out one
/// [`CancelToken`] per run, cancelling the previous run's token when a new
/// run begins.
#[derive(Debug)]
pub struct Pipeline {
    params: AsciiParams,
    opts: PipelineOpts,
    palette: DensityPalette,
    active: Mutex<Option<CancelToken>>,
}

impl Pipeline {
    /// Validate parameters and measure the glyph palette.
    ///
    /// Out-of-range columns and too-small glyph sets are rejected here with
    /// user-visible messages; no pipeline run is attempted.
    pub fn new(
        params: AsciiParams,
        limits: ColumnLimits,
        opts: PipelineOpts,
    ) -> GlyphcastResult<Self> {
        if params.cols < limits.min || params.cols > limits.max {
            return Err(GlyphcastError::validation(format!(
                "column resolution {} is outside the allowed range {}..={}",
                params.cols, limits.min, limits.max
            )));
        }
        let mut palette = DensityPalette::measure(&params.glyphs);
        if palette.len() < MIN_DISTINCT_GLYPHS {
            return Err(GlyphcastError::validation(format!(
                "glyph set needs at least {MIN_DISTINCT_GLYPHS} distinct characters, got {}",
                palette.len()
            )));
        }
        if params.cell_px == 0 || params.cell_px > 64 {
            return Err(GlyphcastError::validation(
                "cell size must be between 1 and 64 pixels",
            ));
        }
        if let Some(n) = opts.threads
            && n == 0
        {
            return Err(GlyphcastError::validation(
                "'threads' must be >= 1 when set",
            ));
        }
        if params.invert {
            palette.invert();
        }
        Ok(Self {
            params,
            opts,
            palette,
            active: Mutex::new(None),
        })
    }

    /// The measured (and possibly inverted) density palette.
    pub fn palette(&self) -> &DensityPalette {
        &self.palette
    }

    /// Register a fresh run, cancelling whichever run was in flight.
    pub fn begin_run(&self) -> CancelToken {
        let token = CancelToken::new();
        let mut active = self.active.lock().expect("run registry poisoned");
        if let Some(old) = active.replace(token.clone()) {
            old.cancel();
        }
        token
    }

    fn style(&self) -> GlyphStyle {
        GlyphStyle {
            foreground: self.params.foreground,
            background: Some(self.params.background),
            cell_px: self.params.cell_px,
        }
    }

    /// Composite -> rasterize -> paint one source bitmap.
    fn ascii_frame(&self, source: &FrameRgba) -> GlyphcastResult<FrameRgba> {
        let grid = rasterize(source, self.params.cols, &self.palette)
            .ok_or_else(|| GlyphcastError::validation("glyph palette is empty"))?;
        Ok(paint(&grid, &self.style()))
    }

    /// Convert a still image into PNG bytes ([`STILL_FILENAME`]).
    #[tracing::instrument(skip(self, source))]
    pub fn convert_still(&self, source: &FrameRgba) -> GlyphcastResult<Vec<u8>> {
        let _token = self.begin_run();
        encode_png(&self.ascii_frame(source)?)
    }

    /// Convert a parsed animation into a complete GIF89a byte stream
    /// ([`ANIM_FILENAME`]), reporting progress once per frame.
    #[tracing::instrument(skip_all, fields(frames = frames.len()))]
    pub fn convert_animation(
        &self,
        screen: LogicalScreen,
        frames: &[Frame],
        progress: &mut dyn FnMut(Progress),
    ) -> GlyphcastResult<Vec<u8>> {
        let token = self.begin_run();
        if frames.is_empty() {
            return Err(GlyphcastError::decode("animation contains no frames"));
        }

        let mut compositor = Compositor::new(screen)?;
        let total = frames.len();

        // Stage 1: composite, rasterize, and paint every frame, yielding
        // between frames. Painted frames all share one size, fixed by the
        // grid geometry.
        let mut painted: Vec<(FrameRgba, u16)> = Vec::with_capacity(total);
        for frame in frames {
            self.checkpoint(&token)?;
            let composited = compositor.push(frame)?;
            painted.push((self.ascii_frame(&composited)?, frame.delay_cs));
            std::thread::yield_now();
        }

        // Stage 2: encode. Frame 0 trains the global palette; remaining
        // sections either stream serially (with checkpoints) or fan out to
        // a worker pool and come back in frame order.
        let opts = GifOptions {
            repeat: self.params.repeat,
            quality: self.params.quality,
            transparent: None,
            disposal: crate::encode::gif89a::FrameDisposal::RestoreBackground,
        };
        let (first, rest) = painted.split_first().expect("at least one frame");
        let mut encoder = Gif89aEncoder::new(first.0.width, first.0.height, opts)?;
        encoder.add_frame(&first.0, first.1)?;
        progress(Progress {
            frames_done: 1,
            frames_total: total,
        });

        if self.opts.parallel && !rest.is_empty() {
            let pool = build_thread_pool(self.opts.threads)?;
            self.checkpoint(&token)?;
            let palette = encoder
                .palette()
                .expect("palette trained with frame 0")
                .clone();
            let width = first.0.width as u16;
            let height = first.0.height as u16;
            let disposal = opts.disposal;

            let sections: Vec<(usize, Vec<u8>)> = pool.install(|| {
                rest.par_iter()
                    .enumerate()
                    .map_init(
                        // Each worker owns its own palette copy; frames go
                        // in, finished sections come out.
                        || palette.clone(),
                        |pal, (i, (frame, delay))| {
                            let indexed = pal.index_frame(&frame.to_rgb());
                            (i, encode_frame_section(pal, &indexed, width, height, *delay, disposal))
                        },
                    )
                    .collect()
            });

            self.checkpoint(&token)?;
            let mut ordered = sections;
            ordered.sort_by_key(|&(i, _)| i);
            for (done, (_, section)) in ordered.iter().enumerate() {
                encoder.push_section(section);
                progress(Progress {
                    frames_done: done + 2,
                    frames_total: total,
                });
            }
        } else {
            for (done, (frame, delay)) in rest.iter().enumerate() {
                self.checkpoint(&token)?;
                encoder.add_frame(frame, *delay)?;
                progress(Progress {
                    frames_done: done + 2,
                    frames_total: total,
                });
                std::thread::yield_now();
            }
        }

        encoder.finish()
    }

    /// Between-frame cancellation checkpoint.
    fn checkpoint(&self, token: &CancelToken) -> GlyphcastResult<()> {
        if token.is_cancelled() {
            return Err(GlyphcastError::Aborted);
        }
        Ok(())
    }
}

/// Round a millisecond delay to GIF centiseconds.
pub fn delay_cs_from_ms(ms: u32) -> u16 {
    ((ms + 5) / 10).min(u32::from(u16::MAX)) as u16
}

fn build_thread_pool(threads: Option<usize>) -> GlyphcastResult<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| GlyphcastError::encode(format!("failed to build worker pool: {e}")))
}
