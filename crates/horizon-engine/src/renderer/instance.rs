use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Per-particle point sprite written for the host renderer.
/// 8 floats = 32 bytes stride; additive blending, order independent.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct DiskVertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// World-space sprite size.
    pub size: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub alpha: f32,
}

impl DiskVertex {
    pub const FLOATS: usize = 8;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    pub fn color(&self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }
}

/// Background star point. Same 32-byte stride as [`DiskVertex`]; `alpha`
/// carries the fade-in and twinkle.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct StarVertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub size: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub alpha: f32,
}

impl StarVertex {
    pub const FLOATS: usize = 8;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    pub fn color(&self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }
}

/// One shaded sample of a ring band. Colors are linear HDR and already
/// scaled by intensity; `alpha == 0` marks a discarded sample.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct RingVertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Scalar brightness before color multiplication.
    pub intensity: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub alpha: f32,
}

impl RingVertex {
    pub const FLOATS: usize = 8;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    pub fn color(&self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }
}
