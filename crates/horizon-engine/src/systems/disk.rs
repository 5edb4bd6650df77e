//! Accretion disk: a fixed pool of particles on simplified Keplerian orbits.
//!
//! Particles are never allocated or freed after startup. One that drifts
//! below the recycle radius gets a fresh radius and angle in place.

use std::f32::consts::TAU;

use glam::Vec3;

use crate::api::config::DiskConfig;
use crate::core::easing::smoothstep;
use crate::core::metric::SimulationState;
use crate::core::rng::Rng;
use crate::renderer::instance::DiskVertex;

/// Guard for radius divisions.
pub const RADIUS_EPSILON: f32 = 1e-4;

/// Keplerian angular rate: `base / sqrt(radius / inner)`.
#[inline]
pub fn keplerian_rate(base: f32, inner: f32, radius: f32) -> f32 {
    base / (radius.max(RADIUS_EPSILON) / inner.max(RADIUS_EPSILON)).sqrt()
}

/// Thin-disk temperature proxy `(inner / radius)^0.75`.
#[inline]
pub fn color_temperature(inner: f32, radius: f32) -> f32 {
    (inner / radius.max(RADIUS_EPSILON)).powf(0.75)
}

/// Log-biased radius sample: `inner * (outer / inner)^u`.
#[inline]
pub fn sample_radius(inner: f32, outer: f32, u: f32) -> f32 {
    inner * (outer / inner.max(RADIUS_EPSILON)).powf(u.clamp(0.0, 1.0))
}

/// Piecewise blackbody-ish gradient: blue-white when hottest, through
/// yellow-white and golden-orange, down to orange-red.
pub fn temperature_color(t: f32) -> Vec3 {
    if t > 0.8 {
        Vec3::new(0.8 + t * 0.2, 0.9 + t * 0.1, 1.0)
    } else if t > 0.5 {
        Vec3::new(1.0, 0.9 + t * 0.1, 0.6 + t * 0.4)
    } else if t > 0.3 {
        Vec3::new(1.0, 0.6 + t * 0.4, 0.2 + t * 0.4)
    } else {
        Vec3::new(1.0, 0.3 + t * 0.4, 0.1 + t * 0.2)
    }
}

/// A single disk particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskParticle {
    /// Orbital angle in [0, 2π).
    pub angle: f32,
    pub radius: f32,
    /// Radians per simulated second.
    pub angular_velocity: f32,
    pub color_temperature: f32,
    pub size: f32,
    /// Offset out of the disk plane.
    pub height: f32,
    /// Per-particle speed multiplier around 1.0.
    pub jitter: f32,
}

impl DiskParticle {
    /// Build a particle from explicit samples.
    ///
    /// `u`, `height_u` and `size_u` are in [0, 1); `jitter_u` in [0, 1) maps
    /// to a speed multiplier in `1 ± velocity_jitter`.
    pub fn spawn(config: &DiskConfig, u: f32, angle: f32, jitter_u: f32, height_u: f32, size_u: f32) -> Self {
        let radius = sample_radius(config.inner_radius, config.outer_radius, u);
        let jitter = 1.0 + config.velocity_jitter * (jitter_u * 2.0 - 1.0);
        let temperature = color_temperature(config.inner_radius, radius);
        Self {
            angle: angle.rem_euclid(TAU),
            radius,
            angular_velocity: keplerian_rate(config.base_speed, config.inner_radius, radius) * jitter,
            color_temperature: temperature,
            size: (0.08 + temperature * 0.12) * (1.0 + size_u * 0.3),
            height: (height_u - 0.5) * config.thickness * (radius / config.outer_radius),
            jitter,
        }
    }

    fn random(config: &DiskConfig, rng: &mut Rng) -> Self {
        let u = rng.next_f32();
        let angle = rng.range(0.0, TAU);
        let jitter_u = rng.next_f32();
        let height_u = rng.next_f32();
        let size_u = rng.next_f32();
        Self::spawn(config, u, angle, jitter_u, height_u, size_u)
    }

    /// Re-derive the radius-dependent fields after the radius moved.
    fn settle(&mut self, config: &DiskConfig) {
        self.angular_velocity = keplerian_rate(config.base_speed, config.inner_radius, self.radius) * self.jitter;
        self.color_temperature = color_temperature(config.inner_radius, self.radius);
    }
}

/// Fixed-size particle pool forming the rotating disk.
pub struct OrbitalParticleSystem {
    config: DiskConfig,
    particles: Vec<DiskParticle>,
    rng: Rng,
    vertices: Vec<DiskVertex>,
    recycled: u64,
}

impl OrbitalParticleSystem {
    pub fn new(config: DiskConfig) -> Self {
        let mut rng = Rng::new(config.seed.wrapping_add(7919));
        let particles = (0..config.particle_count)
            .map(|_| DiskParticle::random(&config, &mut rng))
            .collect();
        Self {
            vertices: Vec::with_capacity(config.particle_count),
            config,
            particles,
            rng,
            recycled: 0,
        }
    }

    pub fn particles(&self) -> &[DiskParticle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Total recycles since startup.
    pub fn recycled(&self) -> u64 {
        self.recycled
    }

    pub fn config(&self) -> &DiskConfig {
        &self.config
    }

    /// Integrate every particle by `dt` wall seconds, scaled by the state's
    /// time scale.
    pub fn tick(&mut self, dt: f32, state: &SimulationState) {
        let dt = dt.max(0.0) * state.time_scale;
        if dt == 0.0 {
            return;
        }
        let config = &self.config;
        let drift = config.infall_rate * dt;
        for p in &mut self.particles {
            p.angle = (p.angle + p.angular_velocity * dt).rem_euclid(TAU);
            if drift > 0.0 {
                p.radius -= drift;
                if p.radius >= config.recycle_radius {
                    p.settle(config);
                }
            }
            if p.radius < config.recycle_radius {
                *p = DiskParticle::random(config, &mut self.rng);
                self.recycled += 1;
            }
        }
    }

    /// Write one vertex per particle. `visibility` fades the whole disk.
    pub fn write_vertices(&mut self, state: &SimulationState, visibility: f32) {
        self.vertices.clear();
        let visibility = visibility.clamp(0.0, 1.0);
        let recycle = self.config.recycle_radius;
        for p in &self.particles {
            let (sin, cos) = p.angle.sin_cos();
            // Three-lobed warp out of the plane
            let warp = (p.angle * 3.0).sin() * self.config.warp * p.radius;
            let near_edge = smoothstep(recycle + 0.7, recycle + 0.1, p.radius);
            let color = temperature_color(p.color_temperature) * state.global_glow;
            self.vertices.push(DiskVertex {
                x: p.radius * cos,
                y: p.height + warp,
                z: p.radius * sin,
                size: p.size * (1.0 - near_edge * 0.7),
                r: color.x,
                g: color.y,
                b: color.z,
                alpha: visibility * (1.0 - near_edge * 0.5),
            });
        }
    }

    pub fn vertices(&self) -> &[DiskVertex] {
        &self.vertices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> DiskConfig {
        DiskConfig { particle_count: 2000, ..DiskConfig::default() }
    }

    #[test]
    fn spawn_at_inner_edge_orbits_at_base_speed() {
        let config = DiskConfig::default();
        let p = DiskParticle::spawn(&config, 0.0, 0.0, 0.5, 0.5, 0.0);
        assert!((p.radius - 1.8).abs() < 1e-6);
        assert!((p.angular_velocity - config.base_speed).abs() < 1e-6);
        assert!((p.color_temperature - 1.0).abs() < 1e-6);
    }

    #[test]
    fn radii_stay_within_bounds() {
        let system = OrbitalParticleSystem::new(small_config());
        assert_eq!(system.len(), 2000);
        for p in system.particles() {
            assert!(p.radius >= 1.8 - 1e-5 && p.radius <= 7.0 + 1e-4, "radius {}", p.radius);
        }
    }

    #[test]
    fn keplerian_rate_decreases_with_radius() {
        let mut last = f32::INFINITY;
        for i in 0..100 {
            let r = 1.8 + i as f32 * 0.05;
            let w = keplerian_rate(0.4, 1.8, r);
            assert!(w < last);
            last = w;
        }
    }

    #[test]
    fn unjittered_pool_keeps_keplerian_order_after_recycling() {
        let config = DiskConfig {
            particle_count: 500,
            velocity_jitter: 0.0,
            infall_rate: 0.8,
            ..DiskConfig::default()
        };
        let mut system = OrbitalParticleSystem::new(config);
        let state = SimulationState::default();
        for _ in 0..600 {
            system.tick(1.0 / 60.0, &state);
        }
        assert!(system.recycled() > 0);
        let mut sorted: Vec<_> = system.particles().to_vec();
        sorted.sort_by(|a, b| a.radius.total_cmp(&b.radius));
        for pair in sorted.windows(2) {
            if pair[0].radius < pair[1].radius {
                assert!(pair[0].angular_velocity > pair[1].angular_velocity);
            }
        }
    }

    #[test]
    fn temperature_non_increasing_in_radius() {
        let mut last = f32::INFINITY;
        for i in 0..200 {
            let t = color_temperature(1.8, 1.8 + i as f32 * 0.03);
            assert!(t <= last);
            last = t;
        }
    }

    #[test]
    fn gradient_runs_from_blue_white_to_red() {
        let hot = temperature_color(1.0);
        let cool = temperature_color(0.2);
        assert!(hot.z >= hot.x * 0.99);
        assert!(cool.x > cool.z);
        assert!(hot.z > cool.z);
    }

    #[test]
    fn particle_below_threshold_is_recycled_in_range() {
        let mut system = OrbitalParticleSystem::new(small_config());
        let state = SimulationState::default();
        let old_angle = system.particles[0].angle;
        system.particles[0].radius = 0.5;
        system.tick(1.0 / 60.0, &state);

        let p = system.particles()[0];
        assert_eq!(system.recycled(), 1);
        assert!(p.radius >= system.config().recycle_radius);
        assert!(p.radius >= 1.8 - 1e-5 && p.radius <= 7.0 + 1e-4);
        assert_ne!(p.angle, old_angle);
        assert!((p.color_temperature - color_temperature(1.8, p.radius)).abs() < 1e-6);
    }

    #[test]
    fn infall_never_leaves_particles_below_threshold() {
        let config = DiskConfig { particle_count: 300, infall_rate: 2.0, ..DiskConfig::default() };
        let mut system = OrbitalParticleSystem::new(config);
        let state = SimulationState::default();
        for _ in 0..240 {
            system.tick(0.05, &state);
            assert!(system.particles().iter().all(|p| p.radius >= 1.6));
        }
    }

    #[test]
    fn default_disk_falls_inward_and_recycles() {
        let mut system = OrbitalParticleSystem::new(small_config());
        let state = SimulationState::default();
        let start: Vec<f32> = system.particles().iter().map(|p| p.radius).collect();
        system.tick(0.1, &state);
        assert!(system.particles().iter().zip(&start).all(|(p, r)| p.radius < *r));
        for _ in 0..100 {
            system.tick(0.1, &state);
        }
        assert!(system.recycled() > 0);
        assert!(system.particles().iter().all(|p| p.radius >= system.config().recycle_radius));
    }

    #[test]
    fn zero_radius_does_not_blow_up() {
        assert!(keplerian_rate(0.4, 1.8, 0.0).is_finite());
        assert!(color_temperature(1.8, 0.0).is_finite());
    }

    #[test]
    fn angles_advance_and_stay_wrapped() {
        let mut system = OrbitalParticleSystem::new(small_config());
        let state = SimulationState::default();
        let before = system.particles()[3].angle;
        system.tick(0.1, &state);
        assert_ne!(system.particles()[3].angle, before);
        for _ in 0..1000 {
            system.tick(0.1, &state);
        }
        assert!(system.particles().iter().all(|p| (0.0..TAU).contains(&p.angle)));
    }

    #[test]
    fn time_scale_slows_rotation() {
        let config = small_config();
        let mut normal = OrbitalParticleSystem::new(config.clone());
        let mut slow = OrbitalParticleSystem::new(config);
        let mut state = SimulationState::default();
        normal.tick(0.01, &state);
        state.time_scale = 0.3;
        slow.tick(0.01, &state);
        let p0 = OrbitalParticleSystem::new(small_config()).particles()[0];
        let dn = (normal.particles()[0].angle - p0.angle).rem_euclid(TAU);
        let ds = (slow.particles()[0].angle - p0.angle).rem_euclid(TAU);
        assert!((ds - dn * 0.3).abs() < 1e-5);
    }

    #[test]
    fn vertices_follow_glow_and_visibility() {
        let mut system = OrbitalParticleSystem::new(small_config());
        let mut state = SimulationState::default();
        system.write_vertices(&state, 1.0);
        assert_eq!(system.vertices().len(), 2000);
        let base = system.vertices()[0];

        state.global_glow = 2.0;
        system.write_vertices(&state, 0.0);
        let bright = system.vertices()[0];
        assert!((bright.r - base.r * 2.0).abs() < 1e-5);
        assert_eq!(bright.alpha, 0.0);
    }
}
