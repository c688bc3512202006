// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Decorative vector figures — dense looped parametric curves over a grid of
// small circles. Geometry depends only on page size, complexity, variant
// count and seed, so one set is generated per distinct key and reused by
// every page that shares it.

use std::f32::consts::TAU;
use std::sync::Arc;

use pagestorm_core::{Color, KeyedCache, PageSize, Point, SizeKey, rng};
use rand::Rng;
use tracing::{debug, instrument};

use crate::canvas::DocumentWriter;

/// Paths per figure variant.
const PATHS_PER_VARIANT: usize = 4;
const FIGURE_LINE_WIDTH: f32 = 0.4;
const GRID_COLOR: Color = Color::gray(0.2);

/// One colored open polyline.
#[derive(Debug, Clone, PartialEq)]
pub struct FigurePath {
    pub color: Color,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FigureVariant {
    pub paths: Vec<FigurePath>,
}

/// Every variant for one key plus the background grid they share.
#[derive(Debug, Clone, PartialEq)]
pub struct FigureSet {
    pub variants: Vec<FigureVariant>,
    pub grid: Vec<Point>,
    pub grid_radius: f32,
}

impl FigureSet {
    /// Build the set for `size`. Pure in its arguments.
    pub fn generate(size: PageSize, complexity: u32, variants: u32, seed: u64) -> Self {
        let (w, h) = (size.width, size.height);
        let short_side = w.min(h);
        let center = Point::new(w * 0.5, h * 0.55);
        let radius = short_side * 0.38;
        let step = (short_side / 80.0).max(6.0);

        let variants = (0..variants.max(1))
            .map(|variant| {
                let mut rng = rng::figure_variant(seed, variant);
                let colors: Vec<Color> = (0..PATHS_PER_VARIANT)
                    .map(|_| Color::rgb(rng.r#gen(), rng.r#gen(), rng.r#gen()))
                    .collect();
                let paths = colors
                    .into_iter()
                    .enumerate()
                    .map(|(k, color)| FigurePath {
                        color,
                        points: curve_points(center, radius, k, complexity),
                    })
                    .collect();
                FigureVariant { paths }
            })
            .collect();

        Self {
            variants,
            grid: grid_points(size, step),
            grid_radius: step * 0.35,
        }
    }

    pub fn variant(&self, index: u32) -> &FigureVariant {
        &self.variants[index as usize % self.variants.len()]
    }

    /// Stroke variant `index` (modulo the variant count) and the grid.
    pub fn draw<W: DocumentWriter + ?Sized>(&self, writer: &mut W, index: u32) {
        writer.save_state();
        writer.set_line_width(FIGURE_LINE_WIDTH);
        for path in &self.variant(index).paths {
            writer.set_stroke_color(path.color);
            for pair in path.points.windows(2) {
                writer.line(pair[0], pair[1]);
            }
        }

        writer.set_stroke_color(GRID_COLOR);
        for &point in &self.grid {
            writer.circle(point, self.grid_radius);
        }
        writer.restore_state();
    }
}

/// Path `k` of a variant: `complexity` samples of a looped rose-like curve.
fn curve_points(center: Point, radius: f32, k: usize, complexity: u32) -> Vec<Point> {
    let k = k as f32;
    (0..complexity)
        .map(|t| {
            let theta = TAU * t as f32 / complexity as f32;
            let r = radius * (0.35 + 0.65 * (theta * (k + 2.0)).sin());
            Point::new(
                center.x + r * (theta * (k + 1.0)).cos(),
                center.y + r * (theta * (k + 3.0)).sin(),
            )
        })
        .collect()
}

/// Grid over the upper-middle band: x in [0.1w, 0.9w), y in [0.15h, 0.45h).
fn grid_points(size: PageSize, step: f32) -> Vec<Point> {
    let mut grid = Vec::new();
    let mut y = size.height * 0.15;
    while y < size.height * 0.45 {
        let mut x = size.width * 0.1;
        while x < size.width * 0.9 {
            grid.push(Point::new(x, y));
            x += step;
        }
        y += step;
    }
    grid
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct FigureKey {
    size: SizeKey,
    complexity: u32,
    variants: u32,
    seed: u64,
}

/// Memoizes [`FigureSet::generate`] on its exact arguments.
#[derive(Default)]
pub struct FigureCache {
    entries: KeyedCache<FigureKey, FigureSet>,
}

impl FigureCache {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(skip(self))]
    pub fn figures(
        &self,
        size: PageSize,
        complexity: u32,
        variants: u32,
        seed: u64,
    ) -> Arc<FigureSet> {
        let key = FigureKey {
            size: size.key(),
            complexity,
            variants,
            seed,
        };
        self.entries.get_or_insert_with(key, || {
            let set = FigureSet::generate(size, complexity, variants, seed);
            debug!(
                variants = set.variants.len(),
                grid_points = set.grid.len(),
                "Figure set generated"
            );
            set
        })
    }

    /// Number of distinct figure sets generated so far.
    pub fn generated(&self) -> usize {
        self.entries.built()
    }
}
