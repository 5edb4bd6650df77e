//! Background starfield: a fixed, seeded pool on a spherical shell that
//! slowly turns with simulated time and twinkles.

use std::f32::consts::{PI, TAU};

use glam::{Mat3, Vec2, Vec3};

use crate::api::config::StarConfig;
use crate::core::metric::SimulationState;
use crate::core::rng::Rng;
use crate::renderer::instance::StarVertex;

/// Peak opacity of a fully revealed star.
const STAR_OPACITY: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    /// Position before the field's rotation is applied.
    pub position: Vec3,
    /// Base brightness in [0.5, 1).
    pub brightness: f32,
    pub size: f32,
    /// Per-star random in [0, 1) that offsets the twinkle frequencies.
    pub phase: f32,
}

impl Star {
    fn random(config: &StarConfig, rng: &mut Rng) -> Self {
        let theta = rng.range(0.0, TAU);
        let cos_phi = rng.range(-1.0, 1.0);
        let sin_phi = (1.0 - cos_phi * cos_phi).max(0.0).sqrt();
        let r = rng.range(config.min_distance, config.max_distance);
        Self {
            position: Vec3::new(r * sin_phi * theta.cos(), r * sin_phi * theta.sin(), r * cos_phi),
            brightness: 0.5 + 0.5 * rng.next_f32(),
            size: rng.range(config.min_size, config.max_size),
            phase: rng.next_f32(),
        }
    }

    /// Two-frequency flicker. Returns a factor in `[(1 - depth)(1 - 0.75 depth), 1]`.
    pub fn twinkle(&self, t: f32, depth: f32) -> f32 {
        let r = self.phase;
        let fast = 0.5 - 0.5 * (t * (1.2 + r * 2.5) + r * TAU).sin();
        let slow = 0.5 - 0.5 * (t * (0.4 + r * 0.8) + r * PI).sin();
        (1.0 - depth * fast) * (1.0 - depth * 0.75 * slow)
    }
}

/// The star pool and its reused vertex buffer.
pub struct StarField {
    config: StarConfig,
    stars: Vec<Star>,
    /// Yaw and pitch in radians, wrapped.
    rotation: Vec2,
    /// Simulated seconds, drives the twinkle.
    time: f64,
    vertices: Vec<StarVertex>,
}

impl StarField {
    pub fn new(config: StarConfig) -> Self {
        let mut rng = Rng::new(config.seed);
        let stars = (0..config.count).map(|_| Star::random(&config, &mut rng)).collect();
        Self {
            vertices: Vec::with_capacity(config.count),
            config,
            stars,
            rotation: Vec2::ZERO,
            time: 0.0,
        }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    pub fn rotation(&self) -> Vec2 {
        self.rotation
    }

    pub fn config(&self) -> &StarConfig {
        &self.config
    }

    /// Turn the shell by `dt` wall seconds scaled by the time scale, so a
    /// dilation slows the sky along with everything else.
    pub fn tick(&mut self, dt: f32, state: &SimulationState) {
        let dt = dt.max(0.0) * state.time_scale;
        if dt == 0.0 {
            return;
        }
        let [yaw, pitch] = self.config.drift;
        self.rotation = Vec2::new(
            (self.rotation.x + yaw * dt).rem_euclid(TAU),
            (self.rotation.y + pitch * dt).rem_euclid(TAU),
        );
        self.time += dt as f64;
    }

    /// Write one vertex per star. `visibility` fades the whole field.
    pub fn write_vertices(&mut self, visibility: f32) {
        self.vertices.clear();
        let visibility = visibility.clamp(0.0, 1.0);
        let basis = Mat3::from_rotation_y(self.rotation.x) * Mat3::from_rotation_x(self.rotation.y);
        let t = self.time as f32;
        for star in &self.stars {
            let p = basis * star.position;
            let b = star.brightness;
            self.vertices.push(StarVertex {
                x: p.x,
                y: p.y,
                z: p.z,
                size: star.size,
                r: b,
                g: b * 0.95,
                b: b * 0.9,
                alpha: visibility * STAR_OPACITY * star.twinkle(t, self.config.twinkle),
            });
        }
    }

    pub fn vertices(&self) -> &[StarVertex] {
        &self.vertices
    }
}
