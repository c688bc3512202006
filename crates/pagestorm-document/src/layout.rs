// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Filler shape and image placement planners.
//
// Both come in two strategies picked once per run: `Cached` computes one
// layout per page size and reuses it on every page of that size (fast mode),
// `PerPage` draws a fresh layout for each page (varied mode).

use std::sync::Arc;

use pagestorm_core::rng::{self, uniform};
use pagestorm_core::{KeyedCache, MM, PageSize, PageSpec, Rect, SizeKey};
use rand::Rng;

/// Margin kept clear around every page edge.
pub const PAGE_MARGIN: f32 = 15.0 * MM;

/// Filler rectangles per page.
pub const FILLER_COUNT: usize = 80;

/// Images never start lower than this above the bottom margin.
const IMAGE_BOTTOM_CLEARANCE: f32 = 20.0;

/// Fraction of the available height an image may occupy.
const IMAGE_MAX_HEIGHT_FRACTION: f32 = 0.8;

/// How layouts are produced across pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// One layout per distinct key, shared by all pages.
    Cached,
    /// A fresh layout for every page.
    PerPage,
}

impl LayoutMode {
    pub fn from_fast(fast: bool) -> Self {
        if fast { Self::Cached } else { Self::PerPage }
    }
}

// -- Filler shapes ------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FillerKey {
    size: SizeKey,
    seed: u64,
}

/// Plans the outlined filler rectangles of a page.
pub enum FillerPlanner {
    Cached(KeyedCache<FillerKey, Vec<Rect>>),
    PerPage,
}

impl FillerPlanner {
    pub fn new(mode: LayoutMode) -> Self {
        match mode {
            LayoutMode::Cached => Self::Cached(KeyedCache::new()),
            LayoutMode::PerPage => Self::PerPage,
        }
    }

    /// Rectangles for `page`, in drawing order.
    pub fn plan(&self, page: &PageSpec, seed: u64) -> Arc<Vec<Rect>> {
        match self {
            Self::Cached(cache) => {
                let key = FillerKey {
                    size: page.size.key(),
                    seed,
                };
                cache.get_or_insert_with(key, || {
                    filler_rects(page.size, &mut rng::cached_layout(seed))
                })
            }
            Self::PerPage => Arc::new(filler_rects(page.size, &mut rng::page_filler(page.index))),
        }
    }

    /// Layouts built and cached so far; always zero when planning per page.
    pub fn cached_layouts(&self) -> usize {
        match self {
            Self::Cached(cache) => cache.built(),
            Self::PerPage => 0,
        }
    }
}

fn filler_rects<R: Rng + ?Sized>(size: PageSize, rng: &mut R) -> Vec<Rect> {
    let m = PAGE_MARGIN;
    (0..FILLER_COUNT)
        .map(|_| {
            let width = rng.gen_range(5.0f32..40.0) * MM;
            let height = rng.gen_range(3.0f32..25.0) * MM;
            let x = uniform(rng, m, (size.width - m - width).max(m));
            let y = uniform(rng, m, (size.height - m - height).max(m));
            Rect::new(x, y, width, height)
        })
        .collect()
}

// -- Image placement ----------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlacementKey {
    size: SizeKey,
    count: u32,
    seed: u64,
}

/// Plans where each image slot of a page is drawn.
pub enum PlacementPlanner {
    Cached(KeyedCache<PlacementKey, Vec<Rect>>),
    PerPage,
}

impl PlacementPlanner {
    pub fn new(mode: LayoutMode) -> Self {
        match mode {
            LayoutMode::Cached => Self::Cached(KeyedCache::new()),
            LayoutMode::PerPage => Self::PerPage,
        }
    }

    /// Placement of image `slot` (of `count`) on `page` for an image whose
    /// height/width ratio is `aspect`. The returned rectangle always has that
    /// ratio.
    pub fn place(&self, page: &PageSpec, slot: u32, count: u32, seed: u64, aspect: f32) -> Rect {
        let cached = match self {
            Self::Cached(cache) => {
                let key = PlacementKey {
                    size: page.size.key(),
                    count,
                    seed,
                };
                let layout = cache.get_or_insert_with(key, || {
                    square_placements(page.size, count, &mut rng::cached_layout(seed))
                });
                layout.get(slot as usize).copied()
            }
            Self::PerPage => None,
        };

        match cached {
            // Keep the cached width, derive the height from the image.
            Some(base) => Rect::new(base.x, base.y, base.width, base.width * aspect),
            None => fitted_placement(
                page.size,
                aspect,
                &mut rng::image_slot(seed, page.index, slot),
            ),
        }
    }

    /// Layouts built and cached so far; always zero when planning per page.
    pub fn cached_layouts(&self) -> usize {
        match self {
            Self::Cached(cache) => cache.built(),
            Self::PerPage => 0,
        }
    }
}

fn available(size: PageSize) -> (f32, f32) {
    (size.width - 2.0 * PAGE_MARGIN, size.height - 2.0 * PAGE_MARGIN)
}

fn position<R: Rng + ?Sized>(size: PageSize, width: f32, height: f32, rng: &mut R) -> (f32, f32) {
    let m = PAGE_MARGIN;
    let bottom = m + IMAGE_BOTTOM_CLEARANCE;
    let x = uniform(rng, m, (size.width - m - width).max(m));
    let y = uniform(rng, bottom, (size.height - m - height).max(bottom));
    (x, y)
}

/// `count` square placements, reused for every page of `size`.
fn square_placements<R: Rng + ?Sized>(size: PageSize, count: u32, rng: &mut R) -> Vec<Rect> {
    let (max_w, max_h) = available(size);
    (0..count)
        .map(|_| {
            let scale: f32 = rng.gen_range(0.35..0.7);
            let mut side = max_w * scale;
            if side > max_h * IMAGE_MAX_HEIGHT_FRACTION {
                side = max_h * IMAGE_MAX_HEIGHT_FRACTION;
            }
            let (x, y) = position(size, side, side, rng);
            Rect::new(x, y, side, side)
        })
        .collect()
}

/// A single placement sized for `aspect`, clamped to the height limit.
fn fitted_placement<R: Rng + ?Sized>(size: PageSize, aspect: f32, rng: &mut R) -> Rect {
    let (max_w, max_h) = available(size);
    let scale: f32 = rng.gen_range(0.35..0.7);
    let mut width = max_w * scale;
    let mut height = width * aspect;
    let limit = max_h * IMAGE_MAX_HEIGHT_FRACTION;
    if height > limit {
        height = limit;
        width = height / aspect;
    }
    let (x, y) = position(size, width, height, rng);
    Rect::new(x, y, width, height)
}
