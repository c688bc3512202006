// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Generation run — validates the configuration, then drives the page
// assembler over pages 1..=N inside one open/finalize bracket of a document
// writer.

use std::path::Path;
use std::time::{Duration, Instant};

use pagestorm_core::error::Result;
use pagestorm_core::geometry::size_for;
use pagestorm_core::{GenerationConfig, PageSize, PageSpec};
use serde::Serialize;
use tracing::{info, instrument};

use crate::assembler::PageAssembler;
use crate::canvas::DocumentWriter;
use crate::image::ensure_raster_support;
use crate::pdf::PdfWriter;

/// Pages between progress messages.
pub const PROGRESS_INTERVAL: u32 = 500;

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub pages: u32,
    pub figure_sets_generated: usize,
    pub textures_generated: usize,
    pub filler_layouts_cached: usize,
    pub placement_layouts_cached: usize,
    pub elapsed_ms: u64,
}

impl GenerationReport {
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }
}

/// Generates a full stress-test document.
pub struct StressGenerator {
    assembler: PageAssembler,
}

impl StressGenerator {
    /// Resolve `config` and check that this build can honour it. Nothing is
    /// written anywhere until a run starts.
    pub fn new(config: GenerationConfig) -> Result<Self> {
        let config = config.resolve()?;
        if config.draws_images() {
            ensure_raster_support()?;
        }
        Ok(Self {
            assembler: PageAssembler::new(config),
        })
    }

    pub fn config(&self) -> &GenerationConfig {
        self.assembler.config()
    }

    pub fn assembler(&self) -> &PageAssembler {
        &self.assembler
    }

    /// Size the output is opened with: the size of page 1.
    pub fn initial_page_size(&self) -> PageSize {
        size_for(1, self.config().vary_sizes)
    }

    /// Draw every page into `writer` in order, then finalize it.
    #[instrument(skip_all, fields(pages = self.config().pages, seed = self.config().seed))]
    pub fn run<W: DocumentWriter + ?Sized>(&self, writer: &mut W) -> Result<GenerationReport> {
        let started = Instant::now();
        let config = self.config();
        let total = config.pages;

        for index in 1..=total {
            let page = PageSpec {
                index,
                size: size_for(index, config.vary_sizes),
            };
            self.assembler.draw_page(writer, &page)?;

            if index % PROGRESS_INTERVAL == 0 {
                info!(generated = index, total, "Generated {}/{} pages...", index, total);
            }
        }

        writer.finalize()?;
        let report = self.report(started.elapsed());
        info!(
            pages = report.pages,
            textures = report.textures_generated,
            figure_sets = report.figure_sets_generated,
            elapsed_ms = report.elapsed_ms,
            "Generation complete"
        );
        Ok(report)
    }

    /// Generate straight into a PDF file at `path`. The document `/ID` is
    /// derived from the configuration, so a rerun reproduces the file.
    pub fn write_pdf(&self, path: impl AsRef<Path>) -> Result<GenerationReport> {
        let document_id = self.config().document_id()?;
        let mut writer = PdfWriter::create(
            path.as_ref(),
            self.initial_page_size(),
            self.config().compression(),
        )?
        .with_identifier(document_id);
        self.run(&mut writer)
    }

    fn report(&self, elapsed: Duration) -> GenerationReport {
        let assembler = &self.assembler;
        GenerationReport {
            pages: self.config().pages,
            figure_sets_generated: assembler.figures().generated(),
            textures_generated: assembler.textures().generated(),
            filler_layouts_cached: assembler.filler().cached_layouts(),
            placement_layouts_cached: assembler.placement().cached_layouts(),
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawOp, RecordingWriter};
    use pagestorm_core::StormError;

    fn record(config: GenerationConfig) -> (RecordingWriter, GenerationReport) {
        let generator = StressGenerator::new(config).expect("valid config");
        let mut writer = RecordingWriter::new(generator.initial_page_size());
        let report = generator.run(&mut writer).expect("run");
        (writer, report)
    }

    /// Small but complete configuration: every layer on, tiny textures.
    fn busy_config(fast: bool) -> GenerationConfig {
        let mut config = GenerationConfig {
            pages: 8,
            figure_complexity: 40,
            with_rects: true,
            vary_sizes: true,
            fast,
            seed: 3,
            ..GenerationConfig::default()
        };
        config.images.pixel_size = 64;
        config.images.per_page = 3;
        config.images.variants = 2;
        config
    }

    #[test]
    fn text_and_chart_only_scenario() {
        let mut config = GenerationConfig {
            pages: 1,
            figure_complexity: 0,
            with_rects: false,
            seed: 7,
            ..GenerationConfig::default()
        };
        config.images.enabled = false;

        let (writer, report) = record(config);
        assert!(writer.is_finalized());
        assert_eq!(writer.pages().len(), 1);

        let page = &writer.pages()[0];
        assert_eq!(page.rects(), 1, "only the chart box");
        assert_eq!(page.lines(), crate::assembler::CHART_STEPS);
        assert_eq!(page.circles(), 0);
        assert!(page.images().is_empty());
        assert!(page.texts().len() > 3);
        assert_eq!(report.textures_generated, 0);
        assert_eq!(report.figure_sets_generated, 0);
    }

    #[cfg(feature = "raster")]
    #[test]
    fn fast_mode_references_variant_by_page_index() {
        let mut config = GenerationConfig {
            pages: 3,
            fast: true,
            figure_complexity: 0,
            seed: 1,
            ..GenerationConfig::default()
        };
        config.images.variants = 2;
        config.images.per_page = 1;
        config.images.pixel_size = 64;

        let (writer, report) = record(config);
        assert_eq!(report.textures_generated, 2);

        let expected: Vec<String> = (0..2)
            .map(|variant| {
                crate::image::texture::generate_texture(64, variant, 1)
                    .expect("texture")
                    .fingerprint()
                    .to_owned()
            })
            .collect();

        for (offset, page) in writer.pages().iter().enumerate() {
            let index = offset + 1;
            let images = page.images();
            assert_eq!(images.len(), 1);
            match images[0] {
                DrawOp::Image { fingerprint, .. } => {
                    assert_eq!(fingerprint, &expected[index % 2], "page {index}");
                }
                other => panic!("unexpected op {other:?}"),
            }
        }
    }

    #[cfg(feature = "raster")]
    #[test]
    fn caches_bound_generation_work() {
        let (_, report) = record(busy_config(true));
        assert_eq!(report.pages, 8);
        assert_eq!(report.textures_generated, 2);
        // Eight pages visit all four sizes.
        assert_eq!(report.figure_sets_generated, 4);
        assert_eq!(report.filler_layouts_cached, 4);
        assert_eq!(report.placement_layouts_cached, 4);

        let (_, varied) = record(busy_config(false));
        assert!(varied.textures_generated <= 2);
        assert_eq!(varied.figure_sets_generated, 4);
        assert_eq!(varied.filler_layouts_cached, 0);
    }

    #[cfg(feature = "raster")]
    #[test]
    fn drawn_images_keep_intrinsic_aspect() {
        let (writer, _) = record(busy_config(false));
        for page in writer.pages() {
            for op in page.images() {
                if let DrawOp::Image {
                    pixel_width,
                    pixel_height,
                    rect,
                    ..
                } = op
                {
                    let intrinsic = *pixel_height as f32 / *pixel_width as f32;
                    assert!((rect.height / rect.width - intrinsic).abs() < 1e-4);
                }
            }
        }
    }

    #[cfg(feature = "raster")]
    #[test]
    fn identical_configurations_produce_identical_streams() {
        for fast in [true, false] {
            let (a, _) = record(busy_config(fast));
            let (b, _) = record(busy_config(fast));
            assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
        }
    }

    #[test]
    fn seed_changes_the_stream() {
        let config = |seed| {
            let mut config = GenerationConfig {
                pages: 2,
                figure_complexity: 16,
                seed,
                ..GenerationConfig::default()
            };
            config.images.enabled = false;
            config
        };
        let (a, _) = record(config(1));
        let (b, _) = record(config(2));
        assert_ne!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    }

    #[test]
    fn pages_follow_the_size_cycle() {
        let mut config = GenerationConfig {
            pages: 5,
            vary_sizes: true,
            figure_complexity: 0,
            ..GenerationConfig::default()
        };
        config.images.enabled = false;
        let (writer, _) = record(config);
        for (offset, page) in writer.pages().iter().enumerate() {
            assert_eq!(page.size, size_for(offset as u32 + 1, true));
        }
    }

    #[test]
    fn invalid_configuration_is_rejected_up_front() {
        let config = GenerationConfig {
            pages: 0,
            ..GenerationConfig::default()
        };
        assert!(matches!(
            StressGenerator::new(config),
            Err(StormError::InvalidConfiguration(_))
        ));
    }

    #[cfg(not(feature = "raster"))]
    #[test]
    fn images_without_codec_fail_before_output() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("never.pdf");
        let result = StressGenerator::new(GenerationConfig::default())
            .and_then(|generator| generator.write_pdf(&path));
        assert!(matches!(result, Err(StormError::MissingDependency(_))));
        assert!(!path.exists());
    }

    #[cfg(feature = "raster")]
    #[test]
    fn writes_a_complete_pdf_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("stress.pdf");
        let mut config = busy_config(true);
        config.pages = 4;
        let generator = StressGenerator::new(config).expect("valid config");
        let report = generator.write_pdf(&path).expect("write pdf");

        assert_eq!(report.pages, 4);
        let bytes = std::fs::read(&path).expect("read pdf");
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 1000);
    }

    #[test]
    fn rerunning_a_configuration_reproduces_the_pdf_bytes() {
        let config = |seed| {
            let mut config = GenerationConfig {
                pages: 2,
                figure_complexity: 20,
                seed,
                ..GenerationConfig::default()
            };
            config.images.enabled = false;
            config
        };
        let dir = tempfile::tempdir().expect("temp dir");
        let write = |name: &str, seed| {
            let path = dir.path().join(name);
            StressGenerator::new(config(seed))
                .expect("valid config")
                .write_pdf(&path)
                .expect("write pdf");
            std::fs::read(path).expect("read pdf")
        };

        let first = write("first.pdf", 7);
        let second = write("second.pdf", 7);
        assert_eq!(first, second);
        assert_ne!(first, write("other.pdf", 8));
    }
}
