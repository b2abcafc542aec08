use std::path::Path;

use anyhow::Context;
use glam::Vec3;
use image::{ImageBuffer, Rgb, RgbImage};
use rand::Rng;

use crate::error::{Error, Result};
use crate::world::Heightmap;

pub const DEFAULT_UPSCALE: u32 = 4;

/// Exclusive upper bound of the per-pixel dither offset.
const DITHER_RANGE: u8 = 5;

/// Finite-difference stride; neighbours two cells away smooth out the shading.
const NORMAL_STRIDE: isize = 2;

fn sun_direction() -> Vec3 {
    Vec3::ONE.normalize()
}

/// Base-resolution shaded image, one pixel per heightmap cell.
pub fn shade_heightmap(heightmap: &Heightmap) -> RgbImage {
    let sun = sun_direction();

    ImageBuffer::from_fn(heightmap.width() as u32, heightmap.depth() as u32, |x, y| {
        let (x, y) = (x as isize, y as isize);
        let h = |dx: isize, dy: isize| heightmap.get_clamped(x + dx, y + dy) as f32;

        let normal = Vec3::new(
            h(-NORMAL_STRIDE, 0) - h(NORMAL_STRIDE, 0),
            2.0,
            h(0, -NORMAL_STRIDE) - h(0, NORMAL_STRIDE),
        )
        .normalize();
        let shade = normal.dot(sun);

        let k = 0.5 + h(0, 0) * 0.007;
        // `as u8` saturates at both ends and drops the fraction
        Rgb([
            ((96.0 + shade * 128.0) * k) as u8,
            ((32.0 + shade * 96.0) * k) as u8,
            ((shade * 96.0) * k) as u8,
        ])
    })
}

/// Replicates every pixel into an `upscale` x `upscale` block and adds
/// one dither value per output pixel to all three channels.
pub fn synthesize<R: Rng>(heightmap: &Heightmap, upscale: u32, rng: &mut R) -> Result<RgbImage> {
    if upscale == 0 {
        return Err(Error::InvalidArgument("texture upscale must be at least 1".into()));
    }

    let base = shade_heightmap(heightmap);
    let mut scaled = ImageBuffer::from_fn(base.width() * upscale, base.height() * upscale, |x, y| {
        *base.get_pixel(x / upscale, y / upscale)
    });

    for pixel in scaled.pixels_mut() {
        let v = rng.random_range(0..DITHER_RANGE);
        for channel in pixel.0.iter_mut() {
            *channel = channel.saturating_add(v);
        }
    }

    log::debug!(
        "Synthesized {}x{} terrain texture (upscale {upscale})",
        scaled.width(),
        scaled.height()
    );
    Ok(scaled)
}

pub fn synthesize_default(heightmap: &Heightmap) -> Result<RgbImage> {
    synthesize(heightmap, DEFAULT_UPSCALE, &mut rand::rng())
}

pub fn save_texture<P: AsRef<Path>>(image: &RgbImage, path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    image
        .save(path)
        .with_context(|| format!("failed to save terrain texture to {}", path.display()))?;
    log::info!("Wrote terrain texture to {}", path.display());
    Ok(())
}
