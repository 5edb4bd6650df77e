//! Photon rings. Shading is a pure function of angle, cross-section offset,
//! the shared simulation state and the ring's static parameters.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::api::config::{RingConfig, RingSetConfig};
use crate::core::metric::SimulationState;
use crate::core::rng::hash01;
use crate::renderer::instance::RingVertex;

const EPSILON: f32 = 1e-4;

/// Angle of peak beaming before the orbital phase is added.
pub const APPROACH_ANGLE: f32 = 1.1;

/// Cells around the circumference for the value noise.
const NOISE_CELLS: u32 = 7;

/// Samples below this alpha are emitted fully transparent.
const ALPHA_CUTOFF: f32 = 0.01;

/// Upper bound of the bracket in [`turbulence`]: noise (< 1) times 0.5 plus
/// the hotspot weights (0.30 + 0.25 + 0.15).
const TURBULENCE_SPAN: f32 = 1.2;

/// Static parameters of one ring order.
#[derive(Debug, Clone, PartialEq)]
pub struct RingParams {
    pub order: u32,
    pub radius: f32,
    pub thickness: f32,
    pub base_intensity: f32,
    pub doppler_strength: f32,
    pub redshift_strength: f32,
    pub turbulence_amplitude: f32,
    pub base_color: Vec3,
    /// Approaching (hotter) side.
    pub blue_color: Vec3,
    /// Receding (cooler) side.
    pub red_color: Vec3,
}

impl RingParams {
    pub fn from_config(ring: &RingConfig, radius: f32) -> Self {
        Self {
            order: ring.order,
            radius,
            thickness: ring.thickness,
            base_intensity: ring.base_intensity,
            doppler_strength: ring.doppler_strength,
            redshift_strength: ring.redshift_strength,
            turbulence_amplitude: ring.turbulence_amplitude,
            base_color: Vec3::new(1.8, 1.4, 0.8),
            blue_color: Vec3::new(2.0, 1.8, 1.2),
            red_color: Vec3::new(1.4, 1.0, 0.6),
        }
    }
}

/// One shaded point of a ring band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingSample {
    /// Linear HDR color, already multiplied by `intensity`.
    pub rgb: Vec3,
    pub alpha: f32,
    pub intensity: f32,
}

impl RingSample {
    pub const TRANSPARENT: RingSample = RingSample { rgb: Vec3::ZERO, alpha: 0.0, intensity: 0.0 };
}

/// Shortest signed angular distance from `b` to `a`, in (-π, π].
#[inline]
fn angular_distance(a: f32, b: f32) -> f32 {
    let d = (a - b).rem_euclid(TAU);
    if d > PI { d - TAU } else { d }
}

/// Value noise over `cells` lattice points that wraps after `cells`.
fn periodic_noise(x: f32, cells: u32) -> f32 {
    let i = x.floor();
    let f = x - i;
    let cells = cells.max(1) as i64;
    let a = (i as i64).rem_euclid(cells) as u32;
    let b = (a + 1) % cells as u32;
    let t = f * f * (3.0 - 2.0 * f);
    let ha = hash01(a.wrapping_mul(0x9E37_79B9));
    let hb = hash01(b.wrapping_mul(0x9E37_79B9));
    ha + (hb - ha) * t
}

/// Hotspot and noise multiplier around 1.0.
fn turbulence(angle: f32, state: &SimulationState, amplitude: f32) -> f32 {
    if amplitude <= 0.0 {
        return 1.0;
    }
    let spots = [
        (0.30, 0.04, 0.4 + 0.2 * state.turbulence_seed1.sin()),
        (0.25, 0.06, 2.7 - 0.25 * state.turbulence_seed2.sin()),
        (0.15, 0.05, 4.6 + 0.3 * state.turbulence_seed3.sin()),
    ];
    let hot: f32 = spots
        .iter()
        .map(|&(weight, width, center)| {
            let d = angular_distance(angle, center);
            weight * (-d * d / width).exp()
        })
        .sum();
    let x = angle / TAU * NOISE_CELLS as f32 + state.turbulence_seed1 * 0.4;
    let noise = periodic_noise(x, NOISE_CELLS);
    1.0 + amplitude * (noise * 0.5 + hot)
}

/// Largest turbulence amplitude that keeps Doppler beaming the dominant
/// term: the brightest hotspot on the receding side stays below the ratio
/// between the approaching and receding beaming factors.
pub fn turbulence_ceiling(doppler_strength: f32) -> f32 {
    let s = doppler_strength.max(0.0);
    let ratio = ((1.0 + s) / (1.0 - s).max(0.1)).powf(2.5);
    ((ratio - 1.0) / TURBULENCE_SPAN * 0.95).max(0.0)
}

/// Shade one point. `radial_offset` runs from -1 (inner edge) to 1 (outer).
pub fn shade(angle: f32, radial_offset: f32, state: &SimulationState, params: &RingParams) -> RingSample {
    let d = radial_offset.abs();
    let core = (-d * d / (2.0 * 0.25 * 0.25)).exp();
    let halo = (-d * d / (2.0 * 0.6 * 0.6)).exp();
    let profile = core * 1.8 + halo * 0.5;

    let approach = (angle - (APPROACH_ANGLE + state.orbital_phase)).cos();
    let doppler = (1.0 + params.doppler_strength * approach).max(0.1).powf(2.5);

    let shifted = params.red_color.lerp(params.blue_color, 0.5 + 0.5 * approach);
    let redshift = (params.redshift_strength * (state.global_redshift - 0.9)).clamp(0.0, 1.0);
    let color = shifted.lerp(params.base_color * 0.6, redshift);

    let falloff = (-(params.order as f32) * 0.7).exp();
    let intensity = params.base_intensity
        * falloff
        * profile
        * doppler
        * turbulence(angle, state, params.turbulence_amplitude.min(turbulence_ceiling(params.doppler_strength)))
        * state.global_glow;

    let alpha = (profile * doppler).clamp(0.0, 1.0);
    if alpha < ALPHA_CUTOFF || !intensity.is_finite() {
        return RingSample::TRANSPARENT;
    }
    RingSample { rgb: color * intensity, alpha, intensity }
}

/// Kerr critical-curve perturbation of the ring radius.
#[inline]
pub fn kerr_factor(angle: f32, spin: f32, inclination: f32) -> f32 {
    1.0 + 0.08 * spin * inclination.sin() * angle.cos()
}

/// Tessellates and shades one ring order into a reused vertex buffer.
pub struct RingRenderer {
    params: RingParams,
    center_y: f32,
    segments: usize,
    radial_samples: usize,
    /// (angle, cos, sin) per segment.
    circle: Vec<(f32, f32, f32)>,
    vertices: Vec<RingVertex>,
}

impl RingRenderer {
    pub fn new(ring: &RingConfig, set: &RingSetConfig) -> Self {
        let segments = set.segments.max(8);
        let circle = (0..segments)
            .map(|i| {
                let angle = i as f32 / segments as f32 * TAU;
                let (sin, cos) = angle.sin_cos();
                (angle, cos, sin)
            })
            .collect();
        let radial_samples = set.radial_samples.max(1);
        Self {
            params: RingParams::from_config(ring, set.base_radius),
            center_y: set.center_y,
            segments,
            radial_samples,
            circle,
            vertices: Vec::with_capacity(segments * radial_samples),
        }
    }

    /// Build one renderer per configured order.
    pub fn from_set(set: &RingSetConfig) -> Vec<Self> {
        set.rings.iter().map(|ring| Self::new(ring, set)).collect()
    }

    pub fn params(&self) -> &RingParams {
        &self.params
    }

    pub fn vertex_count(&self) -> usize {
        self.segments * self.radial_samples
    }

    fn radial_offset(&self, j: usize) -> f32 {
        if self.radial_samples == 1 {
            0.0
        } else {
            -1.0 + 2.0 * j as f32 / (self.radial_samples - 1) as f32
        }
    }

    /// Shade every vertex. `radius_scale` comes from the camera's responsive
    /// fit; `visibility` fades the ring in.
    pub fn write_vertices(&mut self, state: &SimulationState, radius_scale: f32, visibility: f32) {
        self.vertices.clear();
        let visibility = visibility.clamp(0.0, 1.0);
        let radius = self.params.radius * radius_scale.max(EPSILON);
        let half_width = self.params.thickness * radius_scale.max(EPSILON);
        for &(angle, cos, sin) in &self.circle {
            let kerr = kerr_factor(angle, state.spin, state.inclination);
            for j in 0..self.radial_samples {
                let offset = self.radial_offset(j);
                let r = radius * kerr + offset * half_width;
                let sample = shade(angle, offset, state, &self.params);
                let alpha = sample.alpha * visibility;
                let (rgb, alpha) = if alpha < ALPHA_CUTOFF { (Vec3::ZERO, 0.0) } else { (sample.rgb, alpha) };
                self.vertices.push(RingVertex {
                    x: r * cos,
                    y: self.center_y,
                    z: r * sin,
                    intensity: if alpha > 0.0 { sample.intensity } else { 0.0 },
                    r: rgb.x,
                    g: rgb.y,
                    b: rgb.z,
                    alpha,
                });
            }
        }
    }

    pub fn vertices(&self) -> &[RingVertex] {
        &self.vertices
    }
}
