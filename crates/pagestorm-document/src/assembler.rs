// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page assembler — composes one page from the text, chart, figure, filler,
// and image layers, in that order, and commits it to a document writer.

use std::f32::consts::TAU;

use pagestorm_core::error::Result;
use pagestorm_core::text::{max_chars_per_line, wrap};
use pagestorm_core::{GenerationConfig, KeyedCache, MM, PageSpec, Point, Rect, rng};
use rand::Rng;
use tracing::trace;

use crate::canvas::DocumentWriter;
use crate::figures::FigureCache;
use crate::image::{TextureCache, TextureKey};
use crate::layout::{FillerPlanner, LayoutMode, PAGE_MARGIN, PlacementPlanner};

/// Gap between the title baseline and the metadata line.
const METADATA_OFFSET: f32 = 18.0;
/// Gap between the title baseline and the first body line.
const BODY_OFFSET: f32 = 45.0;
/// Body text stops once the next baseline would fall below `margin + this`.
const BODY_BOTTOM_RESERVE: f32 = 60.0;
const LINE_SPACING: f32 = 1.25;

/// Sine samples along the chart, giving `CHART_STEPS + 1` points.
pub const CHART_STEPS: usize = 120;
/// Per-page phase shift of the chart curve.
const CHART_PHASE_PER_PAGE: f32 = 0.01;
const CHART_CAPTION: &str = "Vector polyline (varies slightly per page)";

/// Owns the per-run caches and layout strategies and draws pages from them.
///
/// Every cache lives here and is populated lazily; nothing is global. The
/// layout strategies are chosen once from the configuration.
pub struct PageAssembler {
    config: GenerationConfig,
    mode: LayoutMode,
    figures: FigureCache,
    textures: TextureCache,
    filler: FillerPlanner,
    placement: PlacementPlanner,
    /// Wrapped body text keyed by line budget.
    body: KeyedCache<usize, Vec<String>>,
}

impl PageAssembler {
    /// Build an assembler for an already resolved configuration.
    pub fn new(config: GenerationConfig) -> Self {
        let mode = LayoutMode::from_fast(config.fast);
        Self {
            config,
            mode,
            figures: FigureCache::new(),
            textures: TextureCache::new(),
            filler: FillerPlanner::new(mode),
            placement: PlacementPlanner::new(mode),
            body: KeyedCache::new(),
        }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn figures(&self) -> &FigureCache {
        &self.figures
    }

    pub fn textures(&self) -> &TextureCache {
        &self.textures
    }

    pub fn filler(&self) -> &FillerPlanner {
        &self.filler
    }

    pub fn placement(&self) -> &PlacementPlanner {
        &self.placement
    }

    /// Draw and commit `page`.
    pub fn draw_page<W: DocumentWriter + ?Sized>(&self, writer: &mut W, page: &PageSpec) -> Result<()> {
        trace!(page = page.index, "Assembling page");
        writer.set_page_size(page.size);

        self.draw_header(writer, page);
        self.draw_body(writer, page);
        draw_chart(writer, page, &self.config);

        if self.config.figure_complexity > 0 {
            let set = self.figures.figures(
                page.size,
                self.config.figure_complexity,
                self.config.figure_variants,
                self.config.stream_seed(),
            );
            set.draw(writer, page.index);
        }

        if self.config.with_rects {
            for rect in self.filler.plan(page, self.config.stream_seed()).iter() {
                writer.rect(*rect);
            }
        }

        if self.config.draws_images() {
            self.draw_images(writer, page)?;
        }

        writer.commit_page()
    }

    fn draw_header<W: DocumentWriter + ?Sized>(&self, writer: &mut W, page: &PageSpec) {
        let font = self.config.font;
        let size = self.config.font_size;
        let top = page.size.height - PAGE_MARGIN;

        writer.text(
            Point::new(PAGE_MARGIN, top),
            font,
            size + 4.0,
            &format!("Stress Test — Page {}", page.index),
        );
        writer.text(
            Point::new(PAGE_MARGIN, top - METADATA_OFFSET),
            font,
            size,
            &format!(
                "Page size: {:.1} x {:.1} pts    (font {} {}pt)",
                page.size.width, page.size.height, font, size
            ),
        );
    }

    /// Body lines top-down until the page runs out; the rest is dropped.
    fn draw_body<W: DocumentWriter + ?Sized>(&self, writer: &mut W, page: &PageSpec) {
        let size = self.config.font_size;
        let budget = max_chars_per_line(page.size.width, PAGE_MARGIN, size);
        let lines = self
            .body
            .get_or_insert_with(budget, || wrap(&self.config.body_text, budget));

        let floor = PAGE_MARGIN + BODY_BOTTOM_RESERVE;
        let mut y = page.size.height - PAGE_MARGIN - BODY_OFFSET;
        for line in lines.iter() {
            if y < floor {
                break;
            }
            writer.text(Point::new(PAGE_MARGIN, y), self.config.font, size, line);
            y -= size * LINE_SPACING;
        }
    }

    fn draw_images<W: DocumentWriter + ?Sized>(&self, writer: &mut W, page: &PageSpec) -> Result<()> {
        let images = &self.config.images;
        let seed = self.config.stream_seed();
        let mut selector = rng::page_images(seed, page.index);

        for slot in 0..images.per_page {
            let variant = match self.mode {
                LayoutMode::Cached => (page.index + slot) % images.variants,
                LayoutMode::PerPage => selector.gen_range(0..images.variants),
            };
            let texture = self.textures.texture(TextureKey {
                pixel_size: images.pixel_size,
                variant,
                seed,
            })?;
            let rect = self
                .placement
                .place(page, slot, images.per_page, seed, texture.aspect());
            writer.image(&texture, rect)?;
        }
        Ok(())
    }
}

/// Box the sine chart is drawn in.
pub fn chart_box(page: &PageSpec) -> Rect {
    Rect::new(
        PAGE_MARGIN,
        PAGE_MARGIN + 20.0,
        (140.0 * MM).min(page.size.width - 2.0 * PAGE_MARGIN),
        35.0 * MM,
    )
}

/// Sample `sin(t + index * 0.01) * 0.45 + 0.5` into `chart`. The phase term
/// makes every page's curve distinct even when all cached layers repeat.
pub fn chart_points(chart: Rect, page_index: u32) -> Vec<Point> {
    let phase = page_index as f32 * CHART_PHASE_PER_PAGE;
    (0..=CHART_STEPS)
        .map(|k| {
            let fraction = k as f32 / CHART_STEPS as f32;
            let value = (fraction * TAU + phase).sin() * 0.45 + 0.5;
            Point::new(
                chart.x + fraction * chart.width,
                chart.y + value * chart.height,
            )
        })
        .collect()
}

fn draw_chart<W: DocumentWriter + ?Sized>(writer: &mut W, page: &PageSpec, config: &GenerationConfig) {
    let chart = chart_box(page);
    writer.rect(chart);
    for pair in chart_points(chart, page.index).windows(2) {
        writer.line(pair[0], pair[1]);
    }
    writer.text(
        Point::new(chart.x, chart.y + chart.height + 6.0),
        config.font,
        (config.font_size - 2.0).max(6.0),
        CHART_CAPTION,
    );
}
