//! CPU additive splatting of stars, disk sprites and ring samples.
//!
//! Blending is additive, so draw order does not matter and no depth
//! buffer is needed.

use glam::Vec3;

use super::camera::SceneCamera;
use super::frame::Frame;
use super::instance::{DiskVertex, RingVertex, StarVertex};

/// Largest sprite radius in pixels; keeps a near particle from flooding the frame.
const MAX_SPLAT_RADIUS: f32 = 12.0;

/// Stars stay point-like at any distance.
const STAR_RADIUS: (f32, f32) = (1.0, 3.0);

#[derive(Debug, Default)]
pub struct SoftwareRasterizer {
    splats: u64,
}

impl SoftwareRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Splats drawn since creation.
    pub fn splats(&self) -> u64 {
        self.splats
    }

    /// Draw background stars as tiny points.
    pub fn draw_stars(&mut self, frame: &mut Frame, camera: &SceneCamera, vertices: &[StarVertex]) {
        for v in vertices {
            if v.alpha <= 0.0 {
                continue;
            }
            if let Some((px, w)) = camera.project(v.position()) {
                let radius = camera.pixel_scale(v.size, w).clamp(STAR_RADIUS.0, STAR_RADIUS.1);
                splat(frame, px.x, px.y, radius, v.color() * v.alpha);
                self.splats += 1;
            }
        }
    }

    /// Draw disk particles as soft round sprites.
    pub fn draw_disk(&mut self, frame: &mut Frame, camera: &SceneCamera, vertices: &[DiskVertex]) {
        for v in vertices {
            if v.alpha <= 0.0 {
                continue;
            }
            if let Some((px, w)) = camera.project(v.position()) {
                let radius = (camera.pixel_scale(v.size, w) * 0.5).clamp(0.5, MAX_SPLAT_RADIUS);
                splat(frame, px.x, px.y, radius, v.color() * v.alpha);
                self.splats += 1;
            }
        }
    }

    /// Draw ring samples as small sprites; ring light is pre-multiplied.
    pub fn draw_rings(&mut self, frame: &mut Frame, camera: &SceneCamera, vertices: &[RingVertex], half_width: f32) {
        for v in vertices {
            if v.alpha <= 0.0 {
                continue;
            }
            if let Some((px, w)) = camera.project(v.position()) {
                let radius = camera.pixel_scale(half_width, w).clamp(0.5, MAX_SPLAT_RADIUS);
                // Bands are densely sampled; each sample carries a small share.
                let weight = 0.05 * v.alpha;
                splat(frame, px.x, px.y, radius, v.color() * weight);
                self.splats += 1;
            }
        }
    }
}

/// Additive splat with a quadratic falloff, normalized to unit energy.
fn splat(frame: &mut Frame, cx: f32, cy: f32, radius: f32, color: Vec3) {
    let r2 = radius * radius;
    let x0 = (cx - radius).floor() as i64;
    let x1 = (cx + radius).ceil() as i64;
    let y0 = (cy - radius).floor() as i64;
    let y1 = (cy + radius).ceil() as i64;
    let norm = 1.0 / (r2 * 0.5 * std::f32::consts::PI).max(1.0);
    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            let d2 = dx * dx + dy * dy;
            if d2 < r2 {
                let k = 1.0 - d2 / r2;
                frame.add(x, y, color * (k * norm));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::CameraConfig;

    fn camera() -> SceneCamera {
        let config = CameraConfig { viewport: [128.0, 72.0], drift: [0.0, 0.0], roll: 0.0, ..CameraConfig::default() };
        SceneCamera::new(&config, 6.5)
    }

    #[test]
    fn disk_sprite_lands_at_projection() {
        let cam = camera();
        let mut frame = Frame::new(128, 72);
        let mut raster = SoftwareRasterizer::new();
        let v = DiskVertex { size: 1.0, r: 1.0, g: 1.0, b: 1.0, alpha: 1.0, ..DiskVertex::default() };
        raster.draw_disk(&mut frame, &cam, &[v]);
        assert_eq!(raster.splats(), 1);
        assert!(frame.get(64, 36).x > 0.0);
        assert_eq!(frame.get(0, 0), Vec3::ZERO);
    }

    #[test]
    fn star_far_down_the_view_axis_lands_at_center() {
        let cam = camera();
        let mut frame = Frame::new(128, 72);
        let mut raster = SoftwareRasterizer::new();
        // Camera sits at (0, 2, 12) looking at the origin.
        let ahead = StarVertex { x: 0.0, y: -6.0, z: -36.0, size: 0.2, r: 1.0, g: 1.0, b: 1.0, alpha: 1.0 };
        let behind = StarVertex { z: 60.0, ..ahead };
        raster.draw_stars(&mut frame, &cam, &[ahead, behind]);
        assert_eq!(raster.splats(), 1);
        assert!(frame.get(64, 36).x > 0.0);
        assert_eq!(frame.get(0, 0), Vec3::ZERO);
    }

    #[test]
    fn transparent_vertices_are_skipped() {
        let cam = camera();
        let mut frame = Frame::new(128, 72);
        let mut raster = SoftwareRasterizer::new();
        let v = RingVertex { r: 5.0, alpha: 0.0, ..RingVertex::default() };
        raster.draw_rings(&mut frame, &cam, &[v], 0.06);
        assert_eq!(raster.splats(), 0);
        assert_eq!(frame.total_luminance(), 0.0);
    }

    #[test]
    fn blending_is_order_independent() {
        let cam = camera();
        let a = DiskVertex { x: 0.5, size: 0.3, r: 1.0, alpha: 1.0, ..DiskVertex::default() };
        let b = DiskVertex { x: 0.6, size: 0.3, g: 1.0, alpha: 0.5, ..DiskVertex::default() };
        let mut f1 = Frame::new(128, 72);
        let mut f2 = Frame::new(128, 72);
        SoftwareRasterizer::new().draw_disk(&mut f1, &cam, &[a, b]);
        SoftwareRasterizer::new().draw_disk(&mut f2, &cam, &[b, a]);
        for (p, q) in f1.pixels().iter().zip(f2.pixels()) {
            assert!((*p - *q).length() < 1e-6);
        }
    }
}
