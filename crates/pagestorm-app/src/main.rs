// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pagestorm — deterministic synthetic PDF generator.
//
// Entry point. Parses flags into a generation config, initialises logging,
// and runs the generator against a PDF file or the recording writer.

use std::path::{Path, PathBuf};

use clap::Parser;
use pagestorm_core::error::Result;
use pagestorm_core::integrity::hash_file;
use pagestorm_core::{FontFamily, GenerationConfig};
use pagestorm_document::{GenerationReport, RecordingWriter, StressGenerator};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "pagestorm",
    about = "Generate huge, deterministic PDFs for stress-testing document renderers",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    /// Output PDF path
    output: PathBuf,

    /// Number of pages
    #[arg(long)]
    pages: Option<u32>,

    /// Standard font, by PostScript name (e.g. Helvetica, Times-Roman)
    #[arg(long)]
    font: Option<FontFamily>,

    /// Body font size in points
    #[arg(long)]
    font_size: Option<f32>,

    /// Draw outlined filler rectangles on every page
    #[arg(long)]
    with_rects: bool,

    /// Skip raster images entirely
    #[arg(long)]
    no_images: bool,

    /// Images drawn per page
    #[arg(long)]
    images_per_page: Option<u32>,

    /// Edge length of the generated textures, in pixels (minimum 64)
    #[arg(long)]
    image_px: Option<u32>,

    /// Number of distinct textures reused across the document
    #[arg(long)]
    image_variants: Option<u32>,

    /// Points per figure path; 0 disables figures
    #[arg(long)]
    figure_complexity: Option<u32>,

    /// Number of distinct figure variants
    #[arg(long)]
    figure_variants: Option<u32>,

    /// Reuse layouts across pages of the same size
    #[arg(long)]
    fast: bool,

    /// Cycle through A4/Letter in both orientations
    #[arg(long)]
    vary_sizes: bool,

    /// Random seed for reproducibility; negative values are allowed
    #[arg(long, allow_negative_numbers = true)]
    seed: Option<i64>,

    /// Write uncompressed page streams
    #[arg(long)]
    no_compression: bool,

    /// Read the body text from a file
    #[arg(long)]
    text_file: Option<PathBuf>,

    /// JSON configuration used as the base; flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a JSON run report to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Record the draw stream instead of writing a PDF
    #[arg(long)]
    dry_run: bool,

    /// Print the SHA-256 of the written file
    #[arg(long)]
    checksum: bool,

    /// Verbose output
    #[arg(short = 'v', long)]
    verbose: bool,
}

impl Cli {
    /// Base configuration with every given flag applied on top.
    fn to_config(&self) -> Result<GenerationConfig> {
        let mut config = match &self.config {
            Some(path) => GenerationConfig::from_json_file(path)?,
            None => GenerationConfig::default(),
        };

        if let Some(pages) = self.pages {
            config.pages = pages;
        }
        if let Some(font) = self.font {
            config.font = font;
        }
        if let Some(size) = self.font_size {
            config.font_size = size;
        }
        if let Some(path) = &self.text_file {
            config.body_text = std::fs::read_to_string(path)?;
        }
        if let Some(per_page) = self.images_per_page {
            config.images.per_page = per_page;
        }
        if let Some(px) = self.image_px {
            config.images.pixel_size = px;
        }
        if let Some(variants) = self.image_variants {
            config.images.variants = variants;
        }
        if let Some(complexity) = self.figure_complexity {
            config.figure_complexity = complexity;
        }
        if let Some(variants) = self.figure_variants {
            config.figure_variants = variants;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }

        config.with_rects |= self.with_rects;
        config.fast |= self.fast;
        config.vary_sizes |= self.vary_sizes;
        if self.no_images {
            config.images.enabled = false;
        }
        if self.no_compression {
            config.compress = Some(false);
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let generator = StressGenerator::new(cli.to_config()?)?;
    let config = generator.config();
    info!(
        pages = config.pages,
        fast = config.fast,
        images = config.draws_images(),
        seed = config.seed,
        "Pagestorm starting"
    );

    let report = if cli.dry_run {
        let mut writer = RecordingWriter::new(generator.initial_page_size());
        let report = generator.run(&mut writer)?;
        println!("Stream fingerprint: {}", writer.fingerprint()?);
        println!("Done: recorded {} pages ({} ops)", report.pages, writer.op_count());
        report
    } else {
        let report = generator.write_pdf(&cli.output)?;
        println!("Done: wrote {} pages to {}", report.pages, cli.output.display());
        if cli.checksum {
            println!("SHA-256: {}", hash_file(&cli.output)?);
        }
        report
    };

    if let Some(path) = &cli.report {
        write_report(&report, path)?;
        info!(path = %path.display(), "Report written");
    }
    Ok(())
}

fn write_report(report: &GenerationReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}
