use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

use crate::api::config::CameraConfig;

const NEAR: f32 = 0.1;
const FAR: f32 = 100.0;

/// Perspective camera looking at the origin.
///
/// Its position is the configured base plus the clock's camera offset plus a
/// slow Lissajous drift, with a barely perceptible roll.
pub struct SceneCamera {
    base: Vec3,
    fov_y: f32,
    viewport: Vec2,
    drift: Vec2,
    roll_amplitude: f32,
    base_radius: f32,
    ring_scale: f32,
    position: Vec3,
    roll: f32,
    view_proj: Mat4,
}

/// GPU-side uniform data for the camera.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl SceneCamera {
    pub fn new(config: &CameraConfig, base_radius: f32) -> Self {
        let mut camera = Self {
            base: Vec3::from(config.position),
            fov_y: config.fov_deg.to_radians(),
            viewport: Vec2::from(config.viewport).max(Vec2::ONE),
            drift: Vec2::from(config.drift),
            roll_amplitude: config.roll,
            base_radius: base_radius.max(1e-4),
            ring_scale: 1.0,
            position: Vec3::from(config.position),
            roll: 0.0,
            view_proj: Mat4::IDENTITY,
        };
        camera.refit();
        camera.update(0.0, Vec2::ZERO);
        camera
    }

    pub fn aspect(&self) -> f32 {
        self.viewport.x / self.viewport.y
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Ring radius multiplier that keeps the ring inside the viewport.
    pub fn ring_scale(&self) -> f32 {
        self.ring_scale
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn roll(&self) -> f32 {
        self.roll
    }

    /// Update viewport size in pixels and refit the ring.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width, height).max(Vec2::ONE);
        self.refit();
        let view = self.view_matrix();
        self.view_proj = self.projection_matrix() * view;
    }

    fn refit(&mut self) {
        let half_h = (self.fov_y * 0.5).tan();
        let h_fov_half = (half_h * self.aspect()).atan();
        let max_half_width = self.base.z.abs() * h_fov_half.tan() * 0.88;
        self.ring_scale = (max_half_width / self.base_radius).min(1.0);
    }

    /// Reposition for simulated time `t` (seconds) plus the clock's offset.
    pub fn update(&mut self, t: f64, offset: Vec2) {
        let t = t as f32;
        let drift = Vec2::new(self.drift.x * (t * 0.1).sin(), self.drift.y * (t * 0.07).cos());
        let shift = offset + drift;
        self.position = self.base + Vec3::new(shift.x, shift.y, 0.0);
        self.roll = self.roll_amplitude * (t * 0.05).sin();
        self.view_proj = self.projection_matrix() * self.view_matrix();
    }

    pub fn view_matrix(&self) -> Mat4 {
        let forward = (Vec3::ZERO - self.position).normalize_or_zero();
        let up = Quat::from_axis_angle(forward, self.roll) * Vec3::Y;
        Mat4::look_at_rh(self.position, Vec3::ZERO, up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect(), NEAR, FAR)
    }

    pub fn uniform(&self) -> CameraUniform {
        CameraUniform { view_proj: self.view_proj.to_cols_array_2d() }
    }

    /// Project a world point to pixel coordinates (y down).
    /// Returns the pixel position and the clip-space depth `w`, or `None`
    /// for points behind the camera.
    pub fn project(&self, world: Vec3) -> Option<(Vec2, f32)> {
        let clip = self.view_proj * Vec4::new(world.x, world.y, world.z, 1.0);
        if clip.w <= NEAR {
            return None;
        }
        let ndc = Vec2::new(clip.x, clip.y) / clip.w;
        let px = Vec2::new((ndc.x * 0.5 + 0.5) * self.viewport.x, (0.5 - ndc.y * 0.5) * self.viewport.y);
        Some((px, clip.w))
    }

    /// Pixels covered by `world_size` units at clip depth `w`.
    pub fn pixel_scale(&self, world_size: f32, w: f32) -> f32 {
        world_size * self.viewport.y * 0.5 / ((self.fov_y * 0.5).tan() * w.max(NEAR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> SceneCamera {
        SceneCamera::new(&CameraConfig { drift: [0.0, 0.0], roll: 0.0, ..CameraConfig::default() }, 6.5)
    }

    #[test]
    fn origin_projects_to_viewport_center() {
        let cam = camera();
        let (px, w) = cam.project(Vec3::ZERO).unwrap();
        assert!((px - Vec2::new(640.0, 360.0)).length() < 1e-2);
        assert!(w > 0.0);
    }

    #[test]
    fn points_behind_camera_are_culled() {
        let cam = camera();
        assert!(cam.project(Vec3::new(0.0, 2.0, 20.0)).is_none());
    }

    #[test]
    fn wide_viewport_keeps_full_radius() {
        let cam = camera();
        assert_eq!(cam.ring_scale(), 1.0);
    }

    #[test]
    fn narrow_viewport_shrinks_ring() {
        let mut cam = camera();
        cam.resize(390.0, 844.0);
        let aspect = 390.0f32 / 844.0;
        let h_half = ((25.0f32).to_radians().tan() * aspect).atan();
        let expected = 12.0 * h_half.tan() * 0.88 / 6.5;
        assert!((cam.ring_scale() - expected).abs() < 1e-4);
        assert!(cam.ring_scale() < 1.0);
    }

    #[test]
    fn offset_moves_camera() {
        let mut cam = camera();
        cam.update(0.0, Vec2::new(0.1, -0.05));
        assert!((cam.position() - Vec3::new(0.1, 1.95, 12.0)).length() < 1e-5);
    }

    #[test]
    fn drift_stays_subliminal() {
        let mut cam = SceneCamera::new(&CameraConfig::default(), 6.5);
        for i in 0..500 {
            cam.update(i as f64 * 0.7, Vec2::ZERO);
            let d = cam.position() - Vec3::new(0.0, 2.0, 12.0);
            assert!(d.x.abs() <= 0.03 + 1e-5 && d.y.abs() <= 0.02 + 1e-5);
            assert!(cam.roll().abs() <= 0.002 + 1e-6);
        }
    }
}
