// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — encoded raster textures and the cache that generates each
// texture variant once per run.

#[cfg(feature = "raster")]
pub mod texture;

use std::sync::Arc;

use pagestorm_core::KeyedCache;
use pagestorm_core::error::{Result, StormError};
use pagestorm_core::integrity::hash_bytes;
use tracing::debug;

/// A losslessly encoded (PNG) texture ready for embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    bytes: Arc<[u8]>,
    width: u32,
    height: u32,
    fingerprint: String,
}

impl EncodedImage {
    /// Wrap encoded bytes together with their intrinsic pixel dimensions.
    pub fn new(bytes: Vec<u8>, width: u32, height: u32) -> Self {
        let fingerprint = hash_bytes(&bytes);
        Self {
            bytes: bytes.into(),
            width,
            height,
            fingerprint,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Intrinsic width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Intrinsic height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Height over width.
    pub fn aspect(&self) -> f32 {
        self.height as f32 / self.width.max(1) as f32
    }

    /// SHA-256 of the encoded bytes; equal content means equal fingerprint.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

/// Cache key: (edge length in pixels, variant index, seed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureKey {
    pub pixel_size: u32,
    pub variant: u32,
    pub seed: u64,
}

/// Memoizes texture generation, the most expensive step of a run.
///
/// Each key is generated at most once, so a run builds at most `variants`
/// textures however many pages and image slots reference them.
#[derive(Default)]
pub struct TextureCache {
    entries: KeyedCache<TextureKey, EncodedImage>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch (or generate) the texture for `key`.
    pub fn texture(&self, key: TextureKey) -> Result<Arc<EncodedImage>> {
        let texture = self.entries.get_or_try_insert_with(key, || generate(key))?;
        debug!(
            variant = key.variant,
            fingerprint = %texture.fingerprint(),
            "Texture resolved"
        );
        Ok(texture)
    }

    /// Number of textures generated so far.
    pub fn generated(&self) -> usize {
        self.entries.built()
    }
}

#[cfg(feature = "raster")]
fn generate(key: TextureKey) -> Result<EncodedImage> {
    texture::generate_texture(key.pixel_size, key.variant, key.seed)
}

#[cfg(not(feature = "raster"))]
fn generate(_key: TextureKey) -> Result<EncodedImage> {
    Err(StormError::MissingDependency(
        "raster images require the `raster` feature (image codec)".into(),
    ))
}

/// Fail fast when a run asks for raster images this build cannot produce.
pub fn ensure_raster_support() -> Result<()> {
    if cfg!(feature = "raster") {
        Ok(())
    } else {
        Err(StormError::MissingDependency(
            "raster images require the `raster` feature (image codec); \
             rebuild with it or disable images"
                .into(),
        ))
    }
}
