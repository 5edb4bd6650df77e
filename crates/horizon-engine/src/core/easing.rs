// core/easing.rs
//
// Pure easing and interpolation helpers shared by the clock, the disk,
// the rings and the post-processing stages. No engine state, just math.

use std::f32::consts::PI;

/// Easing curve applied to a normalized progress value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// Constant velocity.
    #[default]
    Linear,
    /// Slow start.
    CubicIn,
    /// Slow end.
    CubicOut,
    /// Slow start and end. Used for shape-parameter transitions and proximity.
    CubicInOut,
    /// Hermite smoothstep, the `3t² − 2t³` curve.
    Smooth,
    SineInOut,
}

impl Easing {
    /// Apply the easing function to `t`, clamped to [0, 1].
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::CubicIn => t * t * t,
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::Smooth => t * t * (3.0 - 2.0 * t),
            Easing::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
        }
    }
}

/// Linearly interpolate between two values.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Interpolate with easing.
#[inline]
pub fn ease(a: f32, b: f32, t: f32, easing: Easing) -> f32 {
    lerp(a, b, easing.apply(t))
}

/// GLSL-style smoothstep. Handles reversed edges (`edge0 > edge1`) the way
/// shader code relies on for inverted falloffs.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let span = edge1 - edge0;
    if span.abs() < f32::EPSILON {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    Easing::Smooth.apply((x - edge0) / span)
}

/// Frame-rate independent exponential approach factor.
/// `smoothing` is the fraction retained per 60 Hz frame (0 = snap).
#[inline]
pub fn approach_factor(smoothing: f32, dt: f32) -> f32 {
    let smoothing = smoothing.clamp(0.0, 0.999);
    if smoothing <= 0.0 {
        1.0
    } else {
        1.0 - smoothing.powf(dt * 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_endpoints() {
        assert_eq!(Easing::Linear.apply(0.0), 0.0);
        assert_eq!(Easing::Linear.apply(1.0), 1.0);
        assert_eq!(Easing::Linear.apply(0.5), 0.5);
    }

    #[test]
    fn cubic_in_out_is_symmetric() {
        let a = Easing::CubicInOut.apply(0.25);
        let b = Easing::CubicInOut.apply(0.75);
        assert!((a + b - 1.0).abs() < 1e-6);
        assert!((Easing::CubicInOut.apply(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn smoothstep_reversed_edges_inverts() {
        assert!((smoothstep(1.0, 0.0, 0.0) - 1.0).abs() < 1e-6);
        assert!(smoothstep(1.0, 0.0, 1.0).abs() < 1e-6);
    }

    #[test]
    fn smoothstep_degenerate_edges_step() {
        assert_eq!(smoothstep(0.5, 0.5, 0.4), 0.0);
        assert_eq!(smoothstep(0.5, 0.5, 0.6), 1.0);
    }

    #[test]
    fn approach_factor_bounds() {
        assert_eq!(approach_factor(0.0, 0.016), 1.0);
        let f = approach_factor(0.9, 1.0 / 60.0);
        assert!((f - 0.1).abs() < 1e-4, "got {}", f);
        assert_eq!(approach_factor(0.9, 0.0), 0.0);
    }

    #[test]
    fn ease_interpolates() {
        let result = ease(100.0, 200.0, 0.5, Easing::Linear);
        assert!((result - 150.0).abs() < 0.001);
    }
}
