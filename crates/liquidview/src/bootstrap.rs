//! Startup helpers: base media decoding and trail sizing.

use std::path::Path;

use anyhow::{Context, Result};
use renderer::BaseImage;

const FALLBACK_WIDTH: u32 = 1920;
const FALLBACK_HEIGHT: u32 = 1080;

/// Cap on the trail simulation's larger dimension. The distortion map is
/// sampled with linear filtering, so simulating at full window resolution
/// buys nothing visually while multiplying the per-frame CPU cost.
pub const TRAIL_MAX_DIMENSION: u32 = 512;

/// Decodes the base media frame, or synthesizes a gradient when no path was
/// given so the viewer always has something to distort.
pub fn load_base_image(path: Option<&Path>) -> Result<BaseImage> {
    match path {
        Some(path) => {
            let image = image::open(path)
                .with_context(|| format!("failed to open image at {}", path.display()))?
                .to_rgba8();
            let (width, height) = image.dimensions();
            tracing::info!(path = %path.display(), width, height, "loaded base image");
            Ok(BaseImage {
                width,
                height,
                pixels: image.into_raw(),
            })
        }
        None => {
            tracing::info!("no image supplied; using procedural gradient");
            Ok(fallback_gradient())
        }
    }
}

/// Diagonal teal-to-indigo gradient used when no media was supplied.
fn fallback_gradient() -> BaseImage {
    let width = FALLBACK_WIDTH;
    let height = FALLBACK_HEIGHT;
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        let v = y as f32 / (height - 1) as f32;
        for x in 0..width {
            let u = x as f32 / (width - 1) as f32;
            let t = (u + v) * 0.5;
            pixels.push((30.0 + 40.0 * (1.0 - t)) as u8);
            pixels.push((160.0 * (1.0 - t) + 40.0 * t) as u8);
            pixels.push((150.0 + 80.0 * t) as u8);
            pixels.push(255);
        }
    }
    BaseImage {
        width,
        height,
        pixels,
    }
}

/// Simulation size for a window of the given physical size: aspect-preserving
/// downscale so the larger dimension is at most [`TRAIL_MAX_DIMENSION`].
/// Never upscales and never returns a zero dimension.
pub fn trail_dimensions(width: u32, height: u32) -> (u32, u32) {
    let width = width.max(1);
    let height = height.max(1);
    let larger = width.max(height);
    if larger <= TRAIL_MAX_DIMENSION {
        return (width, height);
    }
    let scale = TRAIL_MAX_DIMENSION as f32 / larger as f32;
    (
        ((width as f32 * scale) as u32).max(1),
        ((height as f32 * scale) as u32).max(1),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_fills_the_fallback_dimensions() {
        let image = fallback_gradient();
        assert_eq!(image.width, FALLBACK_WIDTH);
        assert_eq!(image.height, FALLBACK_HEIGHT);
        assert_eq!(
            image.pixels.len(),
            (FALLBACK_WIDTH * FALLBACK_HEIGHT * 4) as usize
        );
        // Fully opaque.
        assert!(image.pixels.chunks_exact(4).all(|px| px[3] == 255));
    }

    #[test]
    fn trail_dimensions_cap_the_larger_axis() {
        let (w, h) = trail_dimensions(1920, 1080);
        assert_eq!(w, 512);
        assert_eq!(h, 288);
    }

    #[test]
    fn trail_dimensions_never_upscale_or_hit_zero() {
        assert_eq!(trail_dimensions(400, 300), (400, 300));
        assert_eq!(trail_dimensions(0, 0), (1, 1));
        let (w, h) = trail_dimensions(10_000, 1);
        assert_eq!(w, 512);
        assert_eq!(h, 1);
    }
}
