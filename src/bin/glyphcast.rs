use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "glyphcast", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a still image to an ASCII-art PNG.
    Image(ConvertArgs),
    /// Convert an animated GIF to an ASCII-art GIF89a.
    Gif(ConvertArgs),
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Input file.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output path; defaults to `ascii-art.png` / `ascii-art.gif`.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Target column resolution.
    #[arg(long)]
    cols: Option<u32>,

    /// Glyph set, at least 3 distinct characters.
    #[arg(long)]
    glyphs: Option<String>,

    /// Reverse the density order (dark-on-light sources).
    #[arg(long)]
    invert: bool,

    /// Foreground color, `#rrggbb`.
    #[arg(long)]
    fg: Option<String>,

    /// Background color, `#rrggbb`.
    #[arg(long)]
    bg: Option<String>,

    /// Quantizer sampling factor, 1 (best) to 30 (fastest).
    #[arg(long)]
    quality: Option<u32>,

    /// Compress frame sections on a worker pool.
    #[arg(long)]
    parallel: bool,

    /// Worker thread count (implies --parallel).
    #[arg(long)]
    threads: Option<usize>,

    /// Full parameter set as JSON; individual flags override its fields.
    #[arg(long)]
    params: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Image(args) => cmd_image(args),
        Command::Gif(args) => cmd_gif(args),
    }
}

fn build_params(args: &ConvertArgs) -> anyhow::Result<glyphcast::AsciiParams> {
    let mut params = match &args.params {
        Some(path) => {
            let f = std::fs::File::open(path)
                .with_context(|| format!("open params '{}'", path.display()))?;
            serde_json::from_reader(std::io::BufReader::new(f))
                .with_context(|| "parse params JSON")?
        }
        None => glyphcast::AsciiParams::default(),
    };

    if let Some(cols) = args.cols {
        params.cols = cols;
    }
    if let Some(glyphs) = &args.glyphs {
        params.glyphs = glyphs.clone();
    }
    if args.invert {
        params.invert = true;
    }
    if let Some(fg) = &args.fg {
        params.foreground = glyphcast::Rgb::from_hex(fg)?;
    }
    if let Some(bg) = &args.bg {
        params.background = glyphcast::Rgb::from_hex(bg)?;
    }
    if let Some(quality) = args.quality {
        params.quality = quality;
    }
    Ok(params)
}

fn build_session(args: &ConvertArgs) -> anyhow::Result<glyphcast::Pipeline> {
    let params = build_params(args)?;
    let opts = glyphcast::PipelineOpts {
        parallel: args.parallel || args.threads.is_some(),
        threads: args.threads,
    };
    Ok(glyphcast::Pipeline::new(
        params,
        glyphcast::ColumnLimits::default(),
        opts,
    )?)
}

fn write_output(path: &std::path::Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn cmd_image(args: ConvertArgs) -> anyhow::Result<()> {
    let session = build_session(&args)?;
    let bytes = std::fs::read(&args.in_path)
        .with_context(|| format!("read '{}'", args.in_path.display()))?;
    let source = glyphcast::decode_still(&bytes)?;
    let png = session.convert_still(&source)?;

    let out = args
        .out
        .unwrap_or_else(|| PathBuf::from(glyphcast::session::STILL_FILENAME));
    write_output(&out, &png)
}

fn cmd_gif(args: ConvertArgs) -> anyhow::Result<()> {
    let session = build_session(&args)?;
    let bytes = std::fs::read(&args.in_path)
        .with_context(|| format!("read '{}'", args.in_path.display()))?;
    let (screen, frames) = glyphcast::decode_animation(&bytes)?;

    let total = frames.len();
    let gif = session.convert_animation(screen, &frames, &mut |p: glyphcast::Progress| {
        tracing::info!(frame = p.frames_done, total, "encoded frame");
    })?;

    let out = args
        .out
        .unwrap_or_else(|| PathBuf::from(glyphcast::session::ANIM_FILENAME));
    write_output(&out, &gif)
}
