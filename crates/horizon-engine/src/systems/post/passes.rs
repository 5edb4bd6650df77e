//! Per-pixel and separable passes over a [`Frame`].

use glam::{Vec2, Vec3};

use crate::api::config::{BloomConfig, LensConfig, MaskConfig};
use crate::core::easing::smoothstep;
use crate::core::rng::hash01;
use crate::renderer::frame::{luminance, Frame};

/// Soft-knee luminance extraction, separable Gaussian blur, additive
/// recombine. `bright` and `scratch` are reused between frames.
pub fn bloom(frame: &mut Frame, config: &BloomConfig, bright: &mut Vec<Vec3>, scratch: &mut Vec<Vec3>) {
    if config.intensity <= 0.0 {
        return;
    }
    let (w, h) = (frame.width(), frame.height());
    bright.clear();
    bright.extend(frame.pixels().iter().map(|&c| {
        let l = luminance(c);
        c * smoothstep(config.threshold, config.threshold + config.smoothing, l)
    }));

    let radius = config.radius as i64;
    if radius > 0 {
        let kernel = gaussian_kernel(config.radius);
        scratch.clear();
        scratch.resize(w * h, Vec3::ZERO);
        // Horizontal
        for y in 0..h {
            let row = y * w;
            for x in 0..w {
                let mut acc = Vec3::ZERO;
                for (k, weight) in kernel.iter().enumerate() {
                    let sx = (x as i64 + k as i64 - radius).clamp(0, w as i64 - 1) as usize;
                    acc += bright[row + sx] * *weight;
                }
                scratch[row + x] = acc;
            }
        }
        // Vertical
        for y in 0..h {
            for x in 0..w {
                let mut acc = Vec3::ZERO;
                for (k, weight) in kernel.iter().enumerate() {
                    let sy = (y as i64 + k as i64 - radius).clamp(0, h as i64 - 1) as usize;
                    acc += scratch[sy * w + x] * *weight;
                }
                bright[y * w + x] = acc;
            }
        }
    }

    for (c, b) in frame.pixels_mut().iter_mut().zip(bright.iter()) {
        *c += *b * config.intensity;
    }
}

/// Normalized Gaussian weights for `-radius..=radius`, sigma = radius / 2.
pub fn gaussian_kernel(radius: u32) -> Vec<f32> {
    let sigma = (radius as f32 * 0.5).max(0.5);
    let r = radius as i32;
    let weights: Vec<f32> = (-r..=r)
        .map(|i| (-(i * i) as f32 / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

/// Darkness factor of the shadow ellipse at `uv`: 0 inside, 1 outside.
#[inline]
pub fn mask_factor(uv: Vec2, config: &MaskConfig) -> f32 {
    let mut p = uv - Vec2::from(config.center);
    p.y /= config.ellipse_y.max(1e-4);
    let d = p.length();
    smoothstep(config.radius - config.feather, config.radius + config.feather * 0.5, d)
}

/// Force the event-horizon ellipse to black.
pub fn shadow_mask(frame: &mut Frame, config: &MaskConfig) {
    let w = frame.width();
    for y in 0..frame.height() {
        for x in 0..w {
            let (u, v) = frame.uv(x, y);
            let k = mask_factor(Vec2::new(u, v), config);
            if k < 1.0 {
                let c = frame.get(x, y);
                frame.set(x, y, c * k);
            }
        }
    }
}

/// UV displacement magnitude toward the lens center.
#[inline]
pub fn lens_displacement(d: f32, config: &LensConfig) -> f32 {
    let falloff = smoothstep(config.influence_radius, config.influence_radius * 0.3, d);
    config.mass / (d * d + 0.0005) * falloff
}

/// Radial lensing warp. Samples from `snapshot`, a copy of the unwarped
/// frame, so every pixel sees the same source.
pub fn lens(frame: &mut Frame, config: &LensConfig, snapshot: &mut Frame) {
    if !config.enabled || config.mass <= 0.0 {
        return;
    }
    snapshot.clone_from(frame);
    let center = Vec2::from(config.center);
    let w = frame.width();
    for y in 0..frame.height() {
        for x in 0..w {
            let (u, v) = frame.uv(x, y);
            let to_center = Vec2::new(u, v) - center;
            let d = to_center.length();
            if d <= 1e-6 || d >= config.influence_radius {
                continue;
            }
            let shift = lens_displacement(d, config).min(d);
            let src = Vec2::new(u, v) - to_center / d * shift;
            frame.set(x, y, snapshot.sample(src.x, src.y));
        }
    }
}

/// Additive film grain from a per-frame hash.
pub fn grain(frame: &mut Frame, opacity: f32, frame_index: u32) {
    if opacity <= 0.0 {
        return;
    }
    let salt = frame_index.wrapping_mul(0x85EB_CA6B);
    for (i, c) in frame.pixels_mut().iter_mut().enumerate() {
        let n = hash01((i as u32) ^ salt) - 0.5;
        *c = (*c + Vec3::splat(n * opacity)).max(Vec3::ZERO);
    }
}

/// Radial darkening toward the frame edges.
pub fn vignette(frame: &mut Frame, offset: f32, darkness: f32) {
    let w = frame.width();
    for y in 0..frame.height() {
        for x in 0..w {
            let (u, v) = frame.uv(x, y);
            let d = Vec2::new(u - 0.5, v - 0.5).length();
            let k = smoothstep(0.8, offset * 0.799, d * (darkness + offset));
            let c = frame.get(x, y);
            frame.set(x, y, c * k);
        }
    }
}

/// Narkowicz ACES filmic fit, output in [0, 1].
#[inline]
pub fn aces(x: f32) -> f32 {
    let x = x.max(0.0);
    ((x * (2.51 * x + 0.03)) / (x * (2.43 * x + 0.59) + 0.14)).clamp(0.0, 1.0)
}

pub fn tone_map(frame: &mut Frame, exposure: f32) {
    for c in frame.pixels_mut() {
        let e = *c * exposure;
        *c = Vec3::new(aces(e.x), aces(e.y), aces(e.z));
    }
}
