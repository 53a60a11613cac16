use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "subraster", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the overlay regions for one timestamp as JSON.
    Partition(PartitionArgs),
    /// Render the overlay for one timestamp, one PNG per region.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct SampleArgs {
    /// Input glyph script JSON (timed fragment lists).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Display time in milliseconds.
    #[arg(long = "at-ms", default_value_t = 0)]
    at_ms: i64,

    /// Destination frame width.
    #[arg(long, default_value_t = 1920)]
    width: u32,

    /// Destination frame height.
    #[arg(long, default_value_t = 1080)]
    height: u32,

    /// Script storage width (defaults to the destination width).
    #[arg(long)]
    src_width: Option<u32>,

    /// Script storage height (defaults to the destination height).
    #[arg(long)]
    src_height: Option<u32>,

    /// Overlay configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PartitionArgs {
    #[command(flatten)]
    sample: SampleArgs,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    sample: SampleArgs,

    /// Directory receiving `region-<i>-<x>-<y>.png` files.
    #[arg(long)]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Partition(args) => cmd_partition(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<subraster::OverlayConfig> {
    let config = match path {
        Some(p) => subraster::OverlayConfig::from_path(p)?,
        None => subraster::OverlayConfig::default(),
    };
    subraster::logging::init_logging(&config.logging);
    Ok(config)
}

fn video_geometry(args: &SampleArgs) -> subraster::VideoGeometry {
    subraster::VideoGeometry {
        src: subraster::VideoFormat::full(
            args.src_width.unwrap_or(args.width),
            args.src_height.unwrap_or(args.height),
        ),
        dst: subraster::VideoFormat::full(args.width, args.height),
    }
}

fn cmd_partition(args: PartitionArgs) -> anyhow::Result<()> {
    let args = args.sample;
    let config = load_config(args.config.as_deref())?;
    let mut renderer = subraster::ScriptedRenderer::from_path(&args.in_path)?;
    let frame = subraster::GlyphRenderer::render_frame(
        &mut renderer,
        subraster::Tick::from_millis(args.at_ms),
    )?;

    let canvas = subraster::Canvas {
        width: args.width,
        height: args.height,
    };
    let regions = subraster::partition_with(&frame.fragments, canvas, &config.partition_opts())?;
    println!(
        "{}",
        serde_json::to_string_pretty(&regions).context("serialize regions")?
    );
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let sample = &args.sample;
    let config = load_config(sample.config.as_deref())?;
    let mut renderer = subraster::ScriptedRenderer::from_path(&sample.in_path)?;
    let mut updater = subraster::OverlayUpdater::new(config)?;

    let outcome = updater.update(
        &mut renderer,
        video_geometry(sample),
        subraster::Tick::from_millis(sample.at_ms),
    )?;
    tracing::info!(?outcome, "overlay rendered");

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    for (i, region) in updater.overlay().regions.iter().enumerate() {
        let path = args
            .out_dir
            .join(format!("region-{i}-{}-{}.png", region.x(), region.y()));
        let pixels = region.buffer.to_tight_rgba()?;
        image::save_buffer_with_format(
            &path,
            &pixels,
            region.buffer.width(),
            region.buffer.height(),
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        eprintln!("wrote {}", path.display());
    }

    eprintln!(
        "{} region(s) for {}x{} at {} ms",
        updater.overlay().regions.len(),
        sample.width,
        sample.height,
        sample.at_ms
    );
    Ok(())
}
