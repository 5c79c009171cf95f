//! Slideforge CLI: crop, filter and generate slide illustrations.
//!
//! Settings come from SLIDEFORGE_* environment variables (a `.env` file is
//! honoured); see `slideforge_core::Config`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use slideforge_cli::{format_filter_list, init_tracing, step_output_for};
use slideforge_core::{Config, DetectionStrategy, FilterSpec, QualityPreset};
use slideforge_processing::pipeline::load_batch_file;
use slideforge_processing::{
    FilterRegistry, GenerateRequest, ImageCollection, ImageProcessor, ImageResize,
    ResizeDimensions, SmartCropEngine,
};

#[derive(Parser)]
#[command(name = "slideforge", about = "Smart cropping and filters for slide images")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crop an image around its subject to an exact size
    Crop {
        /// Source image
        input: PathBuf,
        /// Destination; the format follows the extension
        output: PathBuf,
        /// Target size: WxH, Wx or xH
        #[arg(long)]
        size: ResizeDimensions,
        /// Subject detection: haar-face or contour
        #[arg(long)]
        strategy: Option<DetectionStrategy>,
        /// Filter applied after cropping, e.g. "contrast(percent=130)"; repeatable
        #[arg(long = "filter")]
        filters: Vec<FilterSpec>,
        /// lightest, lighter, normal, better or best
        #[arg(long)]
        quality: Option<QualityPreset>,
        /// Also write one diagnostic image per crop stage beside the output
        #[arg(long)]
        steps: bool,
    },
    /// Apply filters to an image
    Filter {
        /// Source image
        input: PathBuf,
        /// Destination; the format follows the extension
        output: PathBuf,
        /// Filter spec; repeatable and applied in order
        #[arg(long = "filter", required = true)]
        filters: Vec<FilterSpec>,
        #[arg(long)]
        quality: Option<QualityPreset>,
    },
    /// Generate an image from the curated collection
    Generate {
        /// Destination file
        #[arg(long)]
        output: PathBuf,
        /// Target size: WxH, Wx or xH (native when omitted)
        #[arg(long)]
        size: Option<ResizeDimensions>,
        /// 1-based image id
        #[arg(long)]
        image_id: Option<usize>,
        /// Pick a random collection image
        #[arg(long)]
        random: bool,
        #[arg(long)]
        filter: Option<FilterSpec>,
        #[arg(long)]
        quality: Option<QualityPreset>,
    },
    /// Write (or reuse) the fallback image for a size and print its path
    Fallback {
        /// Size as WxH
        #[arg(long)]
        size: ResizeDimensions,
    },
    /// Run a JSON array of batch configs and print the outcomes
    Batch {
        /// Path to the configs file
        configs: PathBuf,
    },
    /// List available filters
    Filters,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

fn load_config() -> anyhow::Result<Config> {
    Config::from_env().context("Failed to load configuration")
}

fn open_processor(input: &Path, config: &Config) -> anyhow::Result<ImageProcessor> {
    let engine = SmartCropEngine::from_config(config).context("Failed to build crop engine")?;
    let processor = ImageProcessor::open(input)
        .with_context(|| format!("Failed to open {}", input.display()))?
        .with_engine(Arc::new(engine));
    Ok(processor)
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Crop {
            input,
            output,
            size,
            strategy,
            filters,
            quality,
            steps,
        } => {
            let config = load_config()?;
            let mut processor = open_processor(&input, &config)?;

            let (orig_width, orig_height) = processor.dimensions();
            let (width, height) =
                ImageResize::calculate_dimensions(orig_width, orig_height, size.width, size.height)?;
            let step_output = steps.then(|| step_output_for(&output));
            processor.smart_crop(
                width,
                Some(height),
                strategy.unwrap_or(config.default_strategy),
                step_output.as_ref(),
            )?;
            for spec in &filters {
                processor.apply_filter_spec(spec)?;
            }
            processor
                .save(&output, quality.unwrap_or(config.default_quality))
                .with_context(|| format!("Failed to save {}", output.display()))?;

            print_json(&serde_json::json!({
                "output": output,
                "width": width,
                "height": height,
                "window": processor.last_crop(),
            }))?;
        }
        Commands::Filter {
            input,
            output,
            filters,
            quality,
        } => {
            let config = load_config()?;
            let mut processor = open_processor(&input, &config)?;
            for spec in &filters {
                processor
                    .apply_filter_spec(spec)
                    .with_context(|| format!("Filter {} failed", spec))?;
            }
            processor.save(&output, quality.unwrap_or(config.default_quality))?;
            print_json(&serde_json::json!({ "output": output }))?;
        }
        Commands::Generate {
            output,
            size,
            image_id,
            random,
            filter,
            quality,
        } => {
            let config = load_config()?;
            let collection = ImageCollection::from_config(&config).with_context(|| {
                format!("Failed to load images from {}", config.images_folder.display())
            })?;
            let request = GenerateRequest {
                width: size.and_then(|s| s.width),
                height: size.and_then(|s| s.height),
                filter,
                image_id,
                random_selection: random,
            };
            let path = collection.generate_to_file(
                &request,
                &output,
                quality.unwrap_or(config.default_quality),
            )?;
            print_json(&serde_json::json!({ "output": path }))?;
        }
        Commands::Fallback { size } => {
            let (Some(width), Some(height)) = (size.width, size.height) else {
                bail!("Fallback images need both dimensions, e.g. --size 1920x1080");
            };
            let config = load_config()?;
            let collection = ImageCollection::from_config(&config)?;
            let path = collection.generate_fallback_image(width, height)?;
            print_json(&serde_json::json!({ "output": path }))?;
        }
        Commands::Batch { configs } => {
            let config = load_config()?;
            let collection = ImageCollection::from_config(&config)?;
            let batch = load_batch_file(&configs)
                .with_context(|| format!("Failed to read {}", configs.display()))?;
            let outcomes = collection.batch_process(&batch);
            print_json(&outcomes)?;
        }
        Commands::Filters => {
            let names = FilterRegistry::shared().list_filters();
            println!("Available filters:\n{}", format_filter_list(&names));
        }
    }

    Ok(())
}
