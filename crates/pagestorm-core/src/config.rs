// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Generation configuration, resolved once per run.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StormError};
use crate::integrity::{digest, hash_bytes};
use crate::text::default_body_text;
use crate::types::FontFamily;

/// Smallest texture edge length, in pixels.
pub const MIN_IMAGE_PIXELS: u32 = 64;

/// Raster image settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    /// Whether heavy raster images are drawn at all.
    pub enabled: bool,
    /// Images drawn per page.
    pub per_page: u32,
    /// Edge length of the square textures, in pixels.
    pub pixel_size: u32,
    /// Distinct textures generated and reused across the run.
    pub variants: u32,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            per_page: 2,
            pixel_size: 1600,
            variants: 3,
        }
    }
}

/// Everything that determines the generated document.
///
/// Every page is a pure function of this struct and its page index, so two
/// runs with equal configurations produce identical draw streams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Number of pages to emit.
    pub pages: u32,
    /// Font used for every text run.
    pub font: FontFamily,
    /// Body font size in points; the title uses `font_size + 4`.
    pub font_size: f32,
    /// Source text wrapped into the page body.
    pub body_text: String,
    /// Cycle through four page sizes/orientations.
    pub vary_sizes: bool,
    /// Sprinkle outlined filler rectangles on every page.
    pub with_rects: bool,
    /// Reuse cached layouts across pages of the same size.
    pub fast: bool,
    pub images: ImageSettings,
    /// Points per decorative figure path; 0 disables figures.
    pub figure_complexity: u32,
    /// Distinct figure variants cycled through by page index.
    pub figure_variants: u32,
    /// Compress page content streams. `None` means "compress unless fast".
    pub compress: Option<bool>,
    /// Run seed. Negative values are accepted and reinterpreted bitwise.
    pub seed: i64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            pages: 10_000,
            font: FontFamily::Helvetica,
            font_size: 11.0,
            body_text: default_body_text(),
            vary_sizes: false,
            with_rects: false,
            fast: false,
            images: ImageSettings::default(),
            figure_complexity: 1200,
            figure_variants: 4,
            compress: None,
            seed: 0,
        }
    }
}

impl GenerationConfig {
    /// Load a configuration from a JSON file. Missing fields take their
    /// default values.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Apply floors and reject configurations no run could honour.
    pub fn resolve(mut self) -> Result<Self> {
        self.images.pixel_size = self.images.pixel_size.max(MIN_IMAGE_PIXELS);
        self.images.variants = self.images.variants.max(1);
        self.figure_variants = self.figure_variants.max(1);

        if self.pages == 0 {
            return Err(StormError::InvalidConfiguration(
                "page count must be positive".into(),
            ));
        }
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(StormError::InvalidConfiguration(format!(
                "font size must be positive, got {}",
                self.font_size
            )));
        }
        if self.body_text.split_whitespace().next().is_none() {
            return Err(StormError::InvalidConfiguration(
                "body text must contain at least one word".into(),
            ));
        }
        Ok(self)
    }

    /// Whether any page will reference a raster texture.
    pub fn draws_images(&self) -> bool {
        self.images.enabled && self.images.per_page > 0
    }

    /// Effective page-stream compression.
    pub fn compression(&self) -> bool {
        self.compress.unwrap_or(!self.fast)
    }

    /// Base value every random stream of the run is derived from.
    pub fn stream_seed(&self) -> u64 {
        self.seed as u64
    }

    /// SHA-256 over the serialized configuration. Equal configurations give
    /// equal fingerprints.
    pub fn fingerprint(&self) -> Result<String> {
        Ok(hash_bytes(&serde_json::to_vec(self)?))
    }

    /// 16-byte document identifier derived from the configuration, stable
    /// across runs.
    pub fn document_id(&self) -> Result<[u8; 16]> {
        let full = digest(&serde_json::to_vec(self)?);
        let mut id = [0u8; 16];
        id.copy_from_slice(&full[..16]);
        Ok(id)
    }
}
