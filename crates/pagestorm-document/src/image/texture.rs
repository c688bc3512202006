// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Texture synthesis — a gaussian noise field covered in outlined rectangles
// and ellipses, softened with a light blur and encoded as PNG. The shapes keep
// the encoder from compressing the noise away. Uses the `image` and
// `imageproc` crates.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_ellipse_mut, draw_hollow_rect_mut};
use imageproc::filter::gaussian_blur_f32;
use imageproc::rect::Rect as PixelRect;
use pagestorm_core::error::{Result, StormError};
use pagestorm_core::rng;
use rand::Rng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use tracing::{debug, info, instrument};

use super::EncodedImage;

/// Outlined shapes drawn over the noise.
const SHAPE_COUNT: usize = 120;
/// Shortest shape extent, in pixels.
const MIN_SHAPE_EXTENT: u32 = 20;

/// Generate texture `variant` with `pixel_size` × `pixel_size` pixels.
///
/// Deterministic in `(pixel_size, variant, seed)`; callers should go through
/// [`super::TextureCache`] rather than paying for this more than once.
#[instrument(skip_all, fields(pixel_size = pixel_size, variant = variant))]
pub fn generate_texture(pixel_size: u32, variant: u32, seed: u64) -> Result<EncodedImage> {
    let pixel_size = pixel_size.max(1);
    let mut rng = rng::texture_variant(seed, variant);

    let intensity: f32 = rng.gen_range(30.0..90.0);
    let mut canvas = noise_field(pixel_size, intensity, &mut rng)?;
    draw_shapes(&mut canvas, &mut rng);

    let blur_sigma: f32 = rng.gen_range(0.5..1.5);
    let blurred = gaussian_blur_f32(&canvas, blur_sigma);
    debug!(intensity, blur_sigma, "Texture composed");

    let bytes = encode_png(blurred)?;
    info!(bytes = bytes.len(), "Texture encoded");
    Ok(EncodedImage::new(bytes, pixel_size, pixel_size))
}

/// Gray gaussian noise centred on mid-gray with standard deviation `intensity`.
fn noise_field(pixel_size: u32, intensity: f32, rng: &mut StdRng) -> Result<RgbImage> {
    let normal = Normal::new(128.0f32, intensity).map_err(|err| {
        StormError::ImageError(format!("invalid noise intensity {intensity}: {err}"))
    })?;
    Ok(RgbImage::from_fn(pixel_size, pixel_size, |_, _| {
        let level = normal.sample(&mut *rng).clamp(0.0, 255.0) as u8;
        Rgb([level, level, level])
    }))
}

fn draw_shapes(canvas: &mut RgbImage, rng: &mut StdRng) {
    let size = canvas.width();
    let max_reach = (size / 2).max(MIN_SHAPE_EXTENT);

    for _ in 0..SHAPE_COUNT {
        let x0 = rng.gen_range(0..size);
        let y0 = rng.gen_range(0..size);
        let reach_x = rng.gen_range(MIN_SHAPE_EXTENT..=max_reach);
        let x1 = rng.gen_range(x0..=size.min(x0 + reach_x));
        let reach_y = rng.gen_range(MIN_SHAPE_EXTENT..=max_reach);
        let y1 = rng.gen_range(y0..=size.min(y0 + reach_y));
        let color = Rgb([rng.r#gen::<u8>(), rng.r#gen::<u8>(), rng.r#gen::<u8>()]);

        if rng.gen_bool(0.5) {
            let rect = PixelRect::at(x0 as i32, y0 as i32).of_size(x1 - x0 + 1, y1 - y0 + 1);
            draw_hollow_rect_mut(canvas, rect, color);
        } else {
            let center = (((x0 + x1) / 2) as i32, ((y0 + y1) / 2) as i32);
            let radius_x = ((x1 - x0) / 2).max(1) as i32;
            let radius_y = ((y1 - y0) / 2).max(1) as i32;
            draw_hollow_ellipse_mut(canvas, center, radius_x, radius_y, color);
        }
    }
}

/// Lossless PNG encoding.
fn encode_png(image: RgbImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    DynamicImage::ImageRgb8(image)
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|err| StormError::ImageError(format!("PNG encoding failed: {}", err)))?;
    Ok(buffer)
}

// -- Tests --------------------------------------------------------------------
