//! Dark-channel-prior dehazing primitives.

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::erode;

/// Per-pixel minimum over the three colour channels
pub fn min_channel(img: &RgbImage) -> GrayImage {
    let (width, height) = img.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        let Rgb([r, g, b]) = *img.get_pixel(x, y);
        Luma([r.min(g).min(b)])
    })
}

/// Minimum channel followed by a square minimum filter of the given radius
pub fn dark_channel(img: &RgbImage, patch_radius: u8) -> GrayImage {
    erode(&min_channel(img), Norm::LInf, patch_radius)
}

/// Estimate atmospheric light from the brightest 0.1% of the dark channel,
/// picking the most intense source pixel among them
pub fn atmospheric_light(img: &RgbImage, dark: &GrayImage) -> [f32; 3] {
    let mut candidates: Vec<(u8, u32, u32)> = dark
        .enumerate_pixels()
        .map(|(x, y, p)| (p[0], x, y))
        .collect();
    if candidates.is_empty() {
        return [255.0; 3];
    }

    let top = (candidates.len() / 1000).max(1);
    candidates.sort_unstable_by(|a, b| b.0.cmp(&a.0));

    let Rgb([r, g, b]) = candidates[..top]
        .iter()
        .map(|&(_, x, y)| *img.get_pixel(x, y))
        .max_by_key(|p| p[0] as u32 + p[1] as u32 + p[2] as u32)
        .unwrap_or(Rgb([255, 255, 255]));

    // A zero channel would blow up the normalisation below
    [r.max(1) as f32, g.max(1) as f32, b.max(1) as f32]
}

/// Transmission map scaled to 0..=255, smoothed to soften block artefacts
pub fn transmission(
    img: &RgbImage,
    light: [f32; 3],
    patch_radius: u8,
    omega: f32,
    refine_sigma: f32,
) -> GrayImage {
    let (width, height) = img.dimensions();
    let normalized = GrayImage::from_fn(width, height, |x, y| {
        let p = img.get_pixel(x, y);
        let min = (0..3)
            .map(|c| (p[c] as f32 / light[c]).min(1.0))
            .fold(1.0f32, f32::min);
        Luma([(min * 255.0).round() as u8])
    });
    let dark = erode(&normalized, Norm::LInf, patch_radius);

    let raw = GrayImage::from_fn(width, height, |x, y| {
        let t = 1.0 - omega * dark.get_pixel(x, y)[0] as f32 / 255.0;
        Luma([(t.clamp(0.0, 1.0) * 255.0).round() as u8])
    });

    if refine_sigma > 0.0 {
        gaussian_blur_f32(&raw, refine_sigma)
    } else {
        raw
    }
}

/// Invert the haze model `I = J·t + A·(1 − t)` for every pixel
pub fn recover(img: &RgbImage, light: [f32; 3], transmission: &GrayImage, min_transmission: f32) -> RgbImage {
    let (width, height) = img.dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        let p = img.get_pixel(x, y);
        let t = (transmission.get_pixel(x, y)[0] as f32 / 255.0).max(min_transmission);
        let mut out = [0u8; 3];
        for c in 0..3 {
            let value = (p[c] as f32 - light[c]) / t + light[c];
            out[c] = value.round().clamp(0.0, 255.0) as u8;
        }
        Rgb(out)
    })
}

/// Full dehaze: dark channel, atmospheric light, transmission, recovery
pub fn dehaze(img: &RgbImage, patch_radius: u8, omega: f32, min_transmission: f32, refine_sigma: f32) -> RgbImage {
    let dark = dark_channel(img, patch_radius);
    let light = atmospheric_light(img, &dark);
    let t = transmission(img, light, patch_radius, omega, refine_sigma);
    recover(img, light, &t, min_transmission)
}

/// Stretch each channel so the `clip` fraction of darkest and brightest
/// pixels saturate
pub fn contrast_stretch(img: &RgbImage, clip: f32) -> RgbImage {
    let total = (img.width() as u64 * img.height() as u64).max(1);
    let cut = (total as f64 * clip.clamp(0.0, 0.49) as f64) as u64;

    let mut bounds = [(0u8, 255u8); 3];
    for (c, bound) in bounds.iter_mut().enumerate() {
        let mut histogram = [0u64; 256];
        for p in img.pixels() {
            histogram[p[c] as usize] += 1;
        }
        *bound = (percentile(&histogram, cut), percentile_from_top(&histogram, cut));
    }

    let mut out = img.clone();
    for p in out.pixels_mut() {
        for c in 0..3 {
            let (lo, hi) = bounds[c];
            if hi <= lo {
                continue;
            }
            let scaled = (p[c].clamp(lo, hi) - lo) as f32 * 255.0 / (hi - lo) as f32;
            p[c] = scaled.round() as u8;
        }
    }
    out
}

fn percentile(histogram: &[u64; 256], cut: u64) -> u8 {
    let mut seen = 0u64;
    for (value, count) in histogram.iter().enumerate() {
        seen += count;
        if seen > cut {
            return value as u8;
        }
    }
    255
}

fn percentile_from_top(histogram: &[u64; 256], cut: u64) -> u8 {
    let mut seen = 0u64;
    for (value, count) in histogram.iter().enumerate().rev() {
        seen += count;
        if seen > cut {
            return value as u8;
        }
    }
    0
}
