use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blit_engine::{available_devices, AcceleratorStatus, CodecVariant, DitherPolicy, ReducerKind};
use blitpix::models::{AppConfig, OutputFormat};
use blitpix::rendering::{encode_preview, load_png};
use blitpix::services::ConvertPipeline;

#[derive(Parser)]
#[command(name = "blitpix")]
#[command(about = "Convert images and videos into 16-color block-glyph art for text terminals")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one PNG image
    Convert {
        /// Input PNG file
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Output format (default: from the output extension, else table)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Drop indentation and newlines from table output
        #[arg(long)]
        compact: bool,

        /// Add the palette to table output
        #[arg(long)]
        embed_palette: bool,

        /// Write glyphs in table output as \ddd escapes
        #[arg(long, conflicts_with = "binary")]
        escape: bool,

        /// Write glyphs in table output as raw bytes
        #[arg(long)]
        binary: bool,

        /// Also write the rendered grid as an indexed PNG
        #[arg(long)]
        preview: Option<PathBuf>,

        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Encode PNG frames as a video with one shared palette
    Video {
        /// Input PNG frames, in playback order
        #[arg(required = true)]
        frames: Vec<PathBuf>,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Frame coding: raw, deflate or ans
        #[arg(long)]
        codec: Option<CodecVariant>,

        #[command(flatten)]
        engine: EngineArgs,
    },
    /// List execution backends
    Devices,
}

/// Options shared by every conversion; each one overrides the config file.
#[derive(Args)]
struct EngineArgs {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Palette size (1-256)
    #[arg(long)]
    colors: Option<usize>,

    /// Palette reducer: median_cut, kmeans or octree
    #[arg(long)]
    reducer: Option<ReducerKind>,

    /// Dither policy: threshold, ordered or floyd_steinberg
    #[arg(long)]
    dither: Option<DitherPolicy>,

    /// Reduce the palette in Lab space
    #[arg(long)]
    lab: bool,

    /// Execution backend: a device id, best_flops or best_memory
    #[arg(long)]
    device: Option<String>,
}

impl EngineArgs {
    /// Config file values with command-line overrides applied.
    fn resolve(&self) -> anyhow::Result<AppConfig> {
        let mut config = AppConfig::load_or_default(self.config.as_deref())?;
        if let Some(colors) = self.colors {
            config.palette_size = colors;
        }
        if let Some(reducer) = self.reducer {
            config.reducer = reducer;
        }
        if let Some(dither) = self.dither {
            config.dither = dither;
        }
        if self.lab {
            config.lab = true;
        }
        if let Some(device) = &self.device {
            config.device = Some(device.clone());
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Convert {
            input,
            output,
            format,
            compact,
            embed_palette,
            escape,
            binary,
            preview,
            engine,
        }) => {
            init_tracing();
            let mut config = engine.resolve()?;
            config.table.compact |= compact;
            config.table.embed_palette |= embed_palette;
            if escape {
                config.table.escape = true;
            }
            if binary {
                config.table.escape = false;
            }
            let format = format
                .or_else(|| {
                    output
                        .extension()
                        .and_then(|e| e.to_str())
                        .and_then(OutputFormat::from_extension)
                })
                .unwrap_or_default();
            run_convert_command(&input, &output, format, preview.as_deref(), config)
        }
        Some(Commands::Video {
            frames,
            output,
            codec,
            engine,
        }) => {
            init_tracing();
            let mut config = engine.resolve()?;
            if let Some(codec) = codec {
                config.codec = codec;
            }
            run_video_command(&frames, &output, config)
        }
        Some(Commands::Devices) => {
            run_devices_command();
            Ok(())
        }
        None => {
            run_status_command();
            Ok(())
        }
    }
}

/// Minimal logging for CLI
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blitpix=warn,blit_engine=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();
}

fn build_pipeline(config: AppConfig) -> anyhow::Result<ConvertPipeline> {
    let (pipeline, status) = ConvertPipeline::new(config)?;
    if let Some(AcceleratorStatus::Active(device)) = status {
        tracing::info!(device = %device.name, threads = device.threads, "Using accelerator");
    }
    Ok(pipeline)
}

/// Convert a single image and write it in the requested format
fn run_convert_command(
    input: &Path,
    output: &Path,
    format: OutputFormat,
    preview: Option<&Path>,
    config: AppConfig,
) -> anyhow::Result<()> {
    let pipeline = build_pipeline(config)?;
    let image = load_png(input)?;
    let grid = pipeline.image_to_grid(&image)?;
    let bytes = pipeline.export(&grid, format)?;

    std::fs::write(output, &bytes)?;
    println!(
        "Converted {} to {} ({}x{} cells, {} bytes)",
        input.display(),
        output.display(),
        grid.width(),
        grid.height(),
        bytes.len()
    );

    if let Some(path) = preview {
        let png = encode_preview(&grid)?;
        std::fs::write(path, &png)?;
        println!("Preview {} ({} bytes)", path.display(), png.len());
    }
    Ok(())
}

/// Encode every frame against one palette and write the container
fn run_video_command(frames: &[PathBuf], output: &Path, config: AppConfig) -> anyhow::Result<()> {
    let codec = config.codec;
    let pipeline = build_pipeline(config)?;
    let images = frames
        .iter()
        .map(|path| load_png(path))
        .collect::<Result<Vec<_>, _>>()?;
    let bytes = pipeline.video(&images)?;

    std::fs::write(output, &bytes)?;
    println!(
        "Encoded {} frames to {} ({codec}, {} bytes)",
        images.len(),
        output.display(),
        bytes.len()
    );
    Ok(())
}

fn run_devices_command() {
    println!("Execution backends:\n");
    println!("  sequential  calling thread (default)");
    for device in available_devices() {
        println!(
            "  {:<10}  {} ({} threads)",
            device.id, device.name, device.threads
        );
    }
    println!("\nSelect one with --device <id>, best_flops or best_memory.");
}

/// Display version and usage summary
fn run_status_command() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    println!("blitpix v{VERSION}");
    println!("Block-glyph art for 16-color text terminals\n");

    println!("Commands:");
    println!("  blitpix convert   Convert a PNG to table, paint, script, raw, json or video");
    println!("  blitpix video     Encode PNG frames as a video");
    println!("  blitpix devices   List execution backends");
    println!("\nRun 'blitpix --help' for more details.");
}
