use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use crate::api::error::EngineError;

/// Complete engine configuration.
///
/// Every section has defaults tuned for the entrance sequence, so hosts only
/// send the fields they want to override:
///
/// ```json
/// { "disk": { "particle_count": 8000 }, "interaction": { "anchor": [0.5, 0.8] } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub frame: FrameConfig,
    pub clock: ClockConfig,
    pub stars: StarConfig,
    pub disk: DiskConfig,
    pub rings: RingSetConfig,
    pub camera: CameraConfig,
    pub pipeline: PipelineConfig,
    pub interaction: InteractionConfig,
    pub sequence: SequenceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Largest delta a single frame may advance, in seconds.
    pub max_frame_dt: f32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self { max_frame_dt: 0.1 }
    }
}

/// Periods and amplitudes for the metric state. Periods are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    pub metric_period: f32,
    pub orbital_period: f32,
    pub breathing_period: f32,
    pub breathing_amplitude: f32,
    pub redshift_period: f32,
    pub redshift_amplitude: f32,
    /// Large, medium and small-scale turbulence periods.
    pub turbulence_periods: [f32; 3],
    pub initial_spin: f32,
    pub initial_inclination: f32,
    /// Camera drift amplitude (x, y) driven by the metric phase.
    pub camera_drift: [f32; 2],
    /// Lower bound for dilated time scales.
    pub min_time_scale: f32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            metric_period: 180.0,
            orbital_period: 60.0,
            breathing_period: 45.0,
            breathing_amplitude: 0.08,
            redshift_period: 240.0,
            redshift_amplitude: 0.03,
            turbulence_periods: [20.0, 35.0, 60.0],
            initial_spin: 0.7,
            initial_inclination: PI * 0.42,
            camera_drift: [0.15, 0.08],
            min_time_scale: 0.05,
        }
    }
}

/// Background star pool: a spherical shell around the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarConfig {
    pub count: usize,
    /// Shell radii in world units; kept inside the camera's far plane.
    pub min_distance: f32,
    pub max_distance: f32,
    /// World-space sprite size range.
    pub min_size: f32,
    pub max_size: f32,
    /// Yaw and pitch drift in radians per simulated second.
    pub drift: [f32; 2],
    /// Depth of the brightness flicker, 0 = steady.
    pub twinkle: f32,
    pub seed: u64,
}

impl Default for StarConfig {
    fn default() -> Self {
        Self {
            count: 2000,
            min_distance: 40.0,
            max_distance: 80.0,
            min_size: 0.08,
            max_size: 0.24,
            drift: [0.0024, 0.0009],
            twinkle: 0.4,
            seed: 1337,
        }
    }
}

/// Accretion disk particle pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskConfig {
    pub particle_count: usize,
    pub inner_radius: f32,
    pub outer_radius: f32,
    /// Angular velocity at the inner edge, radians per second.
    pub base_speed: f32,
    /// Per-particle speed jitter as a fraction (0.1 = ±10%).
    pub velocity_jitter: f32,
    /// Inward drift in world units per simulated second. Zero keeps orbits
    /// circular.
    pub infall_rate: f32,
    /// Particles crossing below this radius are recycled.
    pub recycle_radius: f32,
    /// Vertical thickness at the outer edge.
    pub thickness: f32,
    /// Amplitude of the three-lobed disk warp.
    pub warp: f32,
    pub seed: u64,
}

impl Default for DiskConfig {
    fn default() -> Self {
        Self {
            particle_count: 12_000,
            inner_radius: 1.8,
            outer_radius: 7.0,
            base_speed: 0.4,
            velocity_jitter: 0.1,
            infall_rate: 0.05,
            recycle_radius: 1.6,
            thickness: 0.4,
            warp: 0.05,
            seed: 42,
        }
    }
}

/// One photon ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingConfig {
    pub order: u32,
    pub thickness: f32,
    pub base_intensity: f32,
    pub doppler_strength: f32,
    pub redshift_strength: f32,
    /// Amplitude of the hotspot/turbulence modulation. Zero disables it.
    pub turbulence_amplitude: f32,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            order: 0,
            thickness: 0.06,
            base_intensity: 5.5,
            doppler_strength: 0.6,
            redshift_strength: 0.6,
            turbulence_amplitude: 0.35,
        }
    }
}

/// The ring group and its tessellation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingSetConfig {
    /// Ring radius before responsive fitting.
    pub base_radius: f32,
    /// Vertical offset of the ring group.
    pub center_y: f32,
    /// Angular samples per ring.
    pub segments: usize,
    /// Samples across the band cross-section.
    pub radial_samples: usize,
    pub rings: Vec<RingConfig>,
}

impl Default for RingSetConfig {
    fn default() -> Self {
        Self {
            base_radius: 6.5,
            center_y: -1.2,
            segments: 512,
            radial_samples: 9,
            rings: vec![
                RingConfig::default(),
                RingConfig {
                    order: 1,
                    thickness: 0.04,
                    base_intensity: 7.0,
                    doppler_strength: 0.7,
                    redshift_strength: 0.7,
                    ..RingConfig::default()
                },
                RingConfig {
                    order: 2,
                    thickness: 0.025,
                    base_intensity: 3.0,
                    doppler_strength: 0.5,
                    redshift_strength: 0.5,
                    ..RingConfig::default()
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub fov_deg: f32,
    /// Initial viewport in pixels. Updated by resize events.
    pub viewport: [f32; 2],
    /// Lissajous drift amplitude (x, y) in world units.
    pub drift: [f32; 2],
    /// Roll amplitude in radians.
    pub roll: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 2.0, 12.0],
            fov_deg: 50.0,
            viewport: [1280.0, 720.0],
            drift: [0.03, 0.02],
            roll: 0.002,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BloomConfig {
    /// Luminance above which pixels spread.
    pub threshold: f32,
    /// Soft knee width below the threshold.
    pub smoothing: f32,
    pub intensity: f32,
    /// Blur radius in pixels.
    pub radius: u32,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self { threshold: 0.85, smoothing: 0.03, intensity: 1.1, radius: 6 }
    }
}

/// Elliptical void forced to black. Coordinates are in UV space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskConfig {
    pub center: [f32; 2],
    pub radius: f32,
    pub feather: f32,
    /// Vertical squash matching the ring tilt.
    pub ellipse_y: f32,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self { center: [0.5, 0.5], radius: 0.22, feather: 0.01, ellipse_y: 0.55 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LensConfig {
    pub enabled: bool,
    pub center: [f32; 2],
    pub mass: f32,
    /// Beyond this UV distance the displacement is zero.
    pub influence_radius: f32,
}

impl Default for LensConfig {
    fn default() -> Self {
        Self { enabled: true, center: [0.5, 0.5], mass: 0.002, influence_radius: 0.44 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub bloom: BloomConfig,
    pub mask: MaskConfig,
    pub lens: LensConfig,
    pub grain_opacity: f32,
    pub vignette_offset: f32,
    pub vignette_darkness: f32,
    pub exposure: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            bloom: BloomConfig::default(),
            mask: MaskConfig::default(),
            lens: LensConfig::default(),
            grain_opacity: 0.012,
            vignette_offset: 0.15,
            vignette_darkness: 1.2,
            exposure: 1.0,
        }
    }
}

/// A glow boost request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoostConfig {
    pub amount: f32,
    pub duration_ms: f64,
}

/// A time dilation request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DilateConfig {
    pub factor: f32,
    pub duration_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Call-to-action location in normalized screen coordinates (y down).
    pub anchor: [f32; 2],
    /// Normalized distance at which proximity reaches zero.
    pub influence_radius: f32,
    /// Fraction of pointer lag kept per 60 Hz frame. Higher is heavier.
    pub pointer_smoothing: f32,
    pub proximity_smoothing: f32,
    /// Maximum camera parallax in world units.
    pub parallax: [f32; 2],
    pub max_audio_gain: f32,
    /// Linear audio ramp speed, gain units per second.
    pub audio_ramp_per_sec: f32,
    /// Gain the drone settles at with no proximity, once started.
    pub idle_audio_gain: f32,
    pub max_overlay_opacity: f32,
    /// Smoothed proximity above which hovering counts.
    pub hover_threshold: f32,
    /// Smoothed proximity below which hover re-arms.
    pub hover_release: f32,
    pub hover_boost: BoostConfig,
    pub click_boost: BoostConfig,
    pub click_dilate: DilateConfig,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            anchor: [0.5, 0.78],
            influence_radius: 0.35,
            pointer_smoothing: 0.985,
            proximity_smoothing: 0.9,
            parallax: [0.15, 0.075],
            max_audio_gain: 0.07,
            audio_ramp_per_sec: 0.07 / 3.0,
            idle_audio_gain: 0.035,
            max_overlay_opacity: 0.35,
            hover_threshold: 0.6,
            hover_release: 0.3,
            hover_boost: BoostConfig { amount: 0.15, duration_ms: 800.0 },
            click_boost: BoostConfig { amount: 0.35, duration_ms: 1200.0 },
            click_dilate: DilateConfig { factor: 0.3, duration_ms: 2000.0 },
        }
    }
}

/// Staged reveal timings in milliseconds since start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    pub stars_ms: f64,
    pub ring_ms: f64,
    pub title_ms: f64,
    pub subtitle_ms: f64,
    pub enter_ms: f64,
    /// Ring and disk fade-in length after `ring_ms`.
    pub ring_fade_ms: f64,
    /// Starfield fade-in length after `stars_ms`.
    pub star_fade_ms: f64,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            stars_ms: 600.0,
            ring_ms: 1400.0,
            title_ms: 2800.0,
            subtitle_ms: 4200.0,
            enter_ms: 5500.0,
            ring_fade_ms: 1200.0,
            star_fade_ms: 800.0,
        }
    }
}

fn positive(v: f32, fallback: f32) -> f32 {
    if v.is_finite() && v > 0.0 { v } else { fallback }
}

fn unit(v: f32) -> f32 {
    if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 }
}

impl EngineConfig {
    /// Parse a (partial) configuration from JSON and sanitize it.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Clamp every numeric field into its valid range so the frame loop never
    /// sees a zero period, an inverted radius range or a negative gain.
    pub fn sanitized(mut self) -> Self {
        let d = ClockConfig::default();
        let c = &mut self.clock;
        c.metric_period = positive(c.metric_period, d.metric_period);
        c.orbital_period = positive(c.orbital_period, d.orbital_period);
        c.breathing_period = positive(c.breathing_period, d.breathing_period);
        c.redshift_period = positive(c.redshift_period, d.redshift_period);
        for (p, fallback) in c.turbulence_periods.iter_mut().zip(d.turbulence_periods) {
            *p = positive(*p, fallback);
        }
        c.breathing_amplitude = c.breathing_amplitude.clamp(0.0, 0.5);
        c.redshift_amplitude = c.redshift_amplitude.clamp(0.0, 0.5);
        c.initial_spin = c.initial_spin.clamp(0.0, 0.999);
        c.min_time_scale = positive(c.min_time_scale, d.min_time_scale);

        self.frame.max_frame_dt = positive(self.frame.max_frame_dt, 0.1);

        let stars = &mut self.stars;
        stars.min_distance = positive(stars.min_distance, 40.0);
        if !(stars.max_distance >= stars.min_distance) {
            stars.max_distance = stars.min_distance;
        }
        stars.min_size = positive(stars.min_size, 0.08);
        if !(stars.max_size >= stars.min_size) {
            stars.max_size = stars.min_size;
        }
        stars.twinkle = unit(stars.twinkle);

        let disk = &mut self.disk;
        disk.inner_radius = positive(disk.inner_radius, 1.8);
        if !(disk.outer_radius > disk.inner_radius) {
            disk.outer_radius = disk.inner_radius * 2.0;
        }
        disk.velocity_jitter = disk.velocity_jitter.clamp(0.0, 0.9);
        disk.infall_rate = disk.infall_rate.max(0.0);
        disk.recycle_radius = positive(disk.recycle_radius, disk.inner_radius).min(disk.inner_radius);
        disk.base_speed = positive(disk.base_speed, 0.4);

        let rings = &mut self.rings;
        rings.base_radius = positive(rings.base_radius, 6.5);
        rings.segments = rings.segments.max(8);
        rings.radial_samples = rings.radial_samples.max(1);
        for ring in &mut rings.rings {
            ring.thickness = positive(ring.thickness, 0.05);
            ring.base_intensity = ring.base_intensity.max(0.0);
            ring.doppler_strength = ring.doppler_strength.clamp(0.0, 0.99);
            ring.redshift_strength = unit(ring.redshift_strength);
            ring.turbulence_amplitude = ring.turbulence_amplitude.max(0.0);
        }

        self.camera.fov_deg = self.camera.fov_deg.clamp(10.0, 120.0);
        self.camera.viewport = [self.camera.viewport[0].max(1.0), self.camera.viewport[1].max(1.0)];

        let p = &mut self.pipeline;
        p.bloom.threshold = p.bloom.threshold.max(0.0);
        p.bloom.smoothing = p.bloom.smoothing.max(0.0);
        p.bloom.intensity = p.bloom.intensity.max(0.0);
        p.mask.radius = p.mask.radius.max(0.0);
        p.mask.feather = p.mask.feather.max(1e-4);
        p.mask.ellipse_y = positive(p.mask.ellipse_y, 1.0);
        p.lens.mass = p.lens.mass.max(0.0);
        p.lens.influence_radius = positive(p.lens.influence_radius, 0.44);
        p.grain_opacity = unit(p.grain_opacity);
        p.exposure = positive(p.exposure, 1.0);

        let i = &mut self.interaction;
        i.influence_radius = positive(i.influence_radius, 0.35);
        i.pointer_smoothing = i.pointer_smoothing.clamp(0.0, 0.999);
        i.proximity_smoothing = i.proximity_smoothing.clamp(0.0, 0.999);
        i.max_audio_gain = unit(i.max_audio_gain);
        i.idle_audio_gain = i.idle_audio_gain.clamp(0.0, i.max_audio_gain);
        i.audio_ramp_per_sec = positive(i.audio_ramp_per_sec, 0.02);
        i.max_overlay_opacity = unit(i.max_overlay_opacity);
        i.hover_threshold = unit(i.hover_threshold);
        i.hover_release = i.hover_release.clamp(0.0, i.hover_threshold);
        i.click_dilate.factor = i.click_dilate.factor.max(self.clock.min_time_scale);

        self
    }
}
