//! Shared metric state and its single writer.
//!
//! [`SimulationClock`] owns the [`SimulationState`] every visual element
//! reads. Other components only ever receive `&SimulationState`, so within a
//! frame all readers observe the same post-advance values.

use std::f64::consts::TAU;

use glam::Vec2;
use log::{debug, warn};

use crate::api::config::ClockConfig;
use crate::core::easing::{ease, Easing};
use crate::core::schedule::{ScheduledTask, Scheduler, TaskToken};

/// Time-evolving scalars driving all animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationState {
    /// Ultra-slow precession phase, in [0, 2π).
    pub metric_phase: f32,
    /// Hotspot rotation phase, in [0, 2π).
    pub orbital_phase: f32,
    /// Brightness breathing, boosts included.
    pub global_glow: f32,
    /// Color temperature modulator around 1.0.
    pub global_redshift: f32,
    /// Large-scale turbulence phase. Unbounded, increasing.
    pub turbulence_seed1: f32,
    /// Medium-scale turbulence phase.
    pub turbulence_seed2: f32,
    /// Small-scale turbulence phase.
    pub turbulence_seed3: f32,
    /// Dimensionless spin in [0, 1).
    pub spin: f32,
    /// Viewing inclination in radians.
    pub inclination: f32,
    pub camera_offset: Vec2,
    /// Always strictly positive.
    pub time_scale: f32,
    /// Smoothed pointer proximity to the call-to-action, in [0, 1].
    pub user_proximity: f32,
}

impl SimulationState {
    pub fn new(spin: f32, inclination: f32) -> Self {
        Self {
            metric_phase: 0.0,
            orbital_phase: 0.0,
            global_glow: 1.0,
            global_redshift: 1.0,
            turbulence_seed1: 0.0,
            turbulence_seed2: 0.0,
            turbulence_seed3: 0.0,
            spin,
            inclination,
            camera_offset: Vec2::ZERO,
            time_scale: 1.0,
            user_proximity: 0.0,
        }
    }
}

impl Default for SimulationState {
    fn default() -> Self {
        let config = ClockConfig::default();
        Self::new(config.initial_spin, config.initial_inclination)
    }
}

/// Smoothed per-frame inputs from the interaction layer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InteractionSignals {
    /// Smoothed proximity in [0, 1].
    pub proximity: f32,
    /// Smoothed camera parallax in world units.
    pub parallax: Vec2,
}

/// Eased transition of a shape parameter.
#[derive(Debug, Clone, Copy)]
struct Transition {
    from: f32,
    to: f32,
    start_ms: f64,
    duration_ms: f64,
}

impl Transition {
    fn value_at(&self, now_ms: f64) -> f32 {
        let t = ((now_ms - self.start_ms) / self.duration_ms) as f32;
        ease(self.from, self.to, t, Easing::CubicInOut)
    }

    fn is_done(&self, now_ms: f64) -> bool {
        now_ms - self.start_ms >= self.duration_ms
    }
}

/// A pending revert plus the baseline it restores.
#[derive(Debug, Clone, Copy)]
struct Override {
    token: TaskToken,
    baseline: f32,
}

/// Wrap a phase into [0, 2π) and narrow it to `f32` without letting rounding
/// land exactly on 2π.
#[inline]
pub fn wrap_phase(phase: f64) -> f32 {
    let wrapped = phase.rem_euclid(TAU) as f32;
    if wrapped >= std::f32::consts::TAU {
        0.0
    } else {
        wrapped
    }
}

#[inline]
fn angular_rate(period: f32) -> f64 {
    TAU / period as f64
}

/// Advances the metric state from elapsed time. The only writer of
/// [`SimulationState`].
pub struct SimulationClock {
    config: ClockConfig,
    state: SimulationState,
    /// Simulated seconds: visible wall time integrated with the time scale.
    sim_time: f64,
    /// Wall-clock milliseconds of the current frame.
    now_ms: f64,
    /// Set by the first [`SimulationClock::run_due`]. Until then deadlines
    /// are relative to that first frame rather than to an absolute time.
    anchored: bool,
    /// Multiplier layered on top of the breathing glow.
    glow_boost: f32,
    scheduler: Scheduler,
    boost: Option<Override>,
    dilation: Option<Override>,
    spin_transition: Option<Transition>,
    inclination_transition: Option<Transition>,
}

impl SimulationClock {
    pub fn new(config: ClockConfig) -> Self {
        let state = SimulationState::new(config.initial_spin, config.initial_inclination);
        let mut clock = Self {
            config,
            state,
            sim_time: 0.0,
            now_ms: 0.0,
            anchored: false,
            glow_boost: 1.0,
            scheduler: Scheduler::new(),
            boost: None,
            dilation: None,
            spin_transition: None,
            inclination_transition: None,
        };
        clock.recompute(InteractionSignals::default());
        clock
    }

    /// Read-only view of the current state.
    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Simulated seconds elapsed.
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn is_alive(&self) -> bool {
        self.scheduler.is_alive()
    }

    /// Set the wall clock and fire every revert that has come due.
    /// Runs at the start of a frame, before [`SimulationClock::advance`].
    ///
    /// The first call anchors the clock: anything boosted, dilated or
    /// transitioned before it is shifted so its duration counts from this
    /// frame.
    pub fn run_due(&mut self, now_ms: f64) {
        if !self.is_alive() || !now_ms.is_finite() {
            return;
        }
        if !self.anchored {
            self.anchor(now_ms);
        }
        self.now_ms = self.now_ms.max(now_ms);
        for (token, task) in self.scheduler.drain_due(self.now_ms) {
            self.apply(token, task);
        }
        if let Some(tr) = self.spin_transition {
            self.state.spin = tr.value_at(self.now_ms);
            if tr.is_done(self.now_ms) {
                self.spin_transition = None;
            }
        }
        if let Some(tr) = self.inclination_transition {
            self.state.inclination = tr.value_at(self.now_ms);
            if tr.is_done(self.now_ms) {
                self.inclination_transition = None;
            }
        }
    }

    fn anchor(&mut self, now_ms: f64) {
        let offset = now_ms - self.now_ms;
        self.scheduler.shift(offset);
        for tr in [&mut self.spin_transition, &mut self.inclination_transition].into_iter().flatten() {
            tr.start_ms += offset;
        }
        self.now_ms = now_ms;
        self.anchored = true;
    }

    fn apply(&mut self, token: TaskToken, task: ScheduledTask) {
        match task {
            ScheduledTask::RestoreGlow { multiplier } => {
                if self.boost.map(|b| b.token) == Some(token) {
                    self.boost = None;
                }
                self.set_glow_boost(multiplier);
            }
            ScheduledTask::RestoreTimeScale { scale } => {
                if self.dilation.map(|d| d.token) == Some(token) {
                    self.dilation = None;
                }
                self.state.time_scale = scale;
            }
        }
    }

    fn set_glow_boost(&mut self, multiplier: f32) {
        let breathing = self.state.global_glow / self.glow_boost;
        self.glow_boost = multiplier;
        self.state.global_glow = breathing * multiplier;
    }

    /// Advance simulated time by `dt * time_scale` and recompute every field.
    pub fn advance(&mut self, dt: f32, signals: InteractionSignals) {
        if !self.is_alive() {
            return;
        }
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.sim_time += dt as f64 * self.state.time_scale as f64;
        self.recompute(signals);
    }

    fn recompute(&mut self, signals: InteractionSignals) {
        let t = self.sim_time;
        let c = &self.config;
        let s = &mut self.state;

        s.metric_phase = wrap_phase(t * angular_rate(c.metric_period));
        s.orbital_phase = wrap_phase(t * angular_rate(c.orbital_period));

        let breathing = 1.0 + c.breathing_amplitude as f64 * (t * angular_rate(c.breathing_period)).sin();
        s.global_glow = breathing as f32 * self.glow_boost;
        let redshift = 1.0 + c.redshift_amplitude as f64 * (t * angular_rate(c.redshift_period)).sin();
        s.global_redshift = redshift as f32;

        s.turbulence_seed1 = (t * angular_rate(c.turbulence_periods[0])) as f32;
        s.turbulence_seed2 = (t * angular_rate(c.turbulence_periods[1])) as f32;
        s.turbulence_seed3 = (t * angular_rate(c.turbulence_periods[2])) as f32;

        // Observer worldline drift
        let camera_phase = s.metric_phase * 0.3;
        let drift = Vec2::new(
            c.camera_drift[0] * camera_phase.sin(),
            c.camera_drift[1] * (camera_phase * 1.3).cos(),
        );
        s.camera_offset = drift + signals.parallax;
        s.user_proximity = signals.proximity.clamp(0.0, 1.0);
    }

    /// Multiply the glow by `1 + amount` now and restore it after
    /// `duration_ms`.
    ///
    /// A boost issued while another is pending cancels the pending revert and
    /// takes over its baseline, so the most recently scheduled revert wins and
    /// still lands on the original un-boosted glow. A non-positive duration
    /// reverts immediately and returns `None`.
    pub fn boost(&mut self, amount: f32, duration_ms: f64) -> Option<TaskToken> {
        if !self.is_alive() {
            warn!("boost ignored: clock torn down");
            return None;
        }
        if !(duration_ms > 0.0) || !amount.is_finite() {
            return None;
        }
        let baseline = match self.boost.take() {
            Some(prev) => {
                self.scheduler.cancel(prev.token);
                prev.baseline
            }
            None => self.glow_boost,
        };
        let boosted = (self.glow_boost * (1.0 + amount)).max(1e-3);
        self.set_glow_boost(boosted);
        let token = self
            .scheduler
            .schedule(self.now_ms + duration_ms, ScheduledTask::RestoreGlow { multiplier: baseline })?;
        self.boost = Some(Override { token, baseline });
        debug!("boost x{:.3} for {}ms", 1.0 + amount, duration_ms);
        Some(token)
    }

    /// Override the time scale with `factor` for `duration_ms`.
    /// Same stacking rule as [`SimulationClock::boost`].
    pub fn dilate(&mut self, factor: f32, duration_ms: f64) -> Option<TaskToken> {
        if !self.is_alive() {
            warn!("dilate ignored: clock torn down");
            return None;
        }
        if !(duration_ms > 0.0) {
            return None;
        }
        let factor = if factor.is_finite() {
            factor.max(self.config.min_time_scale)
        } else {
            return None;
        };
        let baseline = match self.dilation.take() {
            Some(prev) => {
                self.scheduler.cancel(prev.token);
                prev.baseline
            }
            None => self.state.time_scale,
        };
        self.state.time_scale = factor;
        let token = self
            .scheduler
            .schedule(self.now_ms + duration_ms, ScheduledTask::RestoreTimeScale { scale: baseline })?;
        self.dilation = Some(Override { token, baseline });
        debug!("dilate x{:.3} for {}ms", factor, duration_ms);
        Some(token)
    }

    /// Cancel a pending boost or dilation revert and restore its baseline now.
    pub fn cancel(&mut self, token: TaskToken) -> bool {
        match self.scheduler.cancel(token) {
            Some(task) => {
                self.apply(token, task);
                true
            }
            None => false,
        }
    }

    /// Ease spin toward `target` over `transition_ms`.
    pub fn update_spin(&mut self, target: f32, transition_ms: f64) {
        if !self.is_alive() {
            return;
        }
        let target = target.clamp(0.0, 0.999);
        if transition_ms > 0.0 {
            self.spin_transition = Some(Transition {
                from: self.state.spin,
                to: target,
                start_ms: self.now_ms,
                duration_ms: transition_ms,
            });
        } else {
            self.spin_transition = None;
            self.state.spin = target;
        }
    }

    /// Ease inclination toward `target` radians over `transition_ms`.
    pub fn update_inclination(&mut self, target: f32, transition_ms: f64) {
        if !self.is_alive() || !target.is_finite() {
            return;
        }
        if transition_ms > 0.0 {
            self.inclination_transition = Some(Transition {
                from: self.state.inclination,
                to: target,
                start_ms: self.now_ms,
                duration_ms: transition_ms,
            });
        } else {
            self.inclination_transition = None;
            self.state.inclination = target;
        }
    }

    /// Number of reverts still waiting.
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    /// Cancel every pending revert and transition, then refuse further
    /// mutation. Returns the number of cancelled reverts.
    pub fn teardown(&mut self) -> usize {
        self.boost = None;
        self.dilation = None;
        self.spin_transition = None;
        self.inclination_transition = None;
        self.scheduler.shutdown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    /// A clock whose wall time is anchored at 0 ms.
    fn clock() -> SimulationClock {
        let mut c = SimulationClock::new(ClockConfig::default());
        c.run_due(0.0);
        c
    }

    fn step(clock: &mut SimulationClock, seconds: f32) {
        clock.advance(seconds, InteractionSignals::default());
    }

    #[test]
    fn metric_phase_is_half_turn_at_half_period() {
        let mut c = clock();
        step(&mut c, 90.0);
        assert!((c.state().metric_phase - PI).abs() < 1e-5, "got {}", c.state().metric_phase);
    }

    #[test]
    fn phases_stay_wrapped_for_large_times() {
        let mut c = clock();
        for _ in 0..2000 {
            step(&mut c, 12_345.678);
            let s = c.state();
            assert!((0.0..std::f32::consts::TAU).contains(&s.metric_phase));
            assert!((0.0..std::f32::consts::TAU).contains(&s.orbital_phase));
        }
    }

    #[test]
    fn wrap_phase_never_returns_tau() {
        assert_eq!(wrap_phase(TAU), 0.0);
        assert!(wrap_phase(TAU - 1e-12) < std::f32::consts::TAU);
        assert!(wrap_phase(-0.5) > 0.0);
    }

    #[test]
    fn glow_stays_in_breathing_band() {
        let mut c = clock();
        for _ in 0..500 {
            step(&mut c, 0.37);
            let g = c.state().global_glow;
            assert!((0.92 - 1e-6..=1.08 + 1e-6).contains(&g), "glow {}", g);
        }
    }

    #[test]
    fn turbulence_seeds_increase() {
        let mut c = clock();
        step(&mut c, 1.0);
        let a = *c.state();
        step(&mut c, 1.0);
        let b = *c.state();
        assert!(b.turbulence_seed1 > a.turbulence_seed1);
        assert!(b.turbulence_seed2 > a.turbulence_seed2);
        assert!(b.turbulence_seed3 > a.turbulence_seed3);
        // Shorter period → faster phase.
        assert!(b.turbulence_seed1 > b.turbulence_seed2);
        assert!(b.turbulence_seed2 > b.turbulence_seed3);
    }

    #[test]
    fn boost_reverts_after_duration() {
        let mut c = clock();
        step(&mut c, 3.0);
        let before = c.state().global_glow;

        c.boost(0.15, 800.0).unwrap();
        assert!((c.state().global_glow - before * 1.15).abs() < 1e-5);

        c.run_due(799.0);
        assert!((c.state().global_glow - before * 1.15).abs() < 1e-5);
        c.run_due(801.0);
        assert!((c.state().global_glow - before).abs() < 1e-6);
        assert_eq!(c.pending_tasks(), 0);
    }

    #[test]
    fn boost_survives_frame_recompute() {
        let mut c = clock();
        c.boost(0.5, 1000.0);
        step(&mut c, 0.016);
        let unboosted = {
            let mut other = clock();
            step(&mut other, 0.016);
            other.state().global_glow
        };
        assert!((c.state().global_glow - unboosted * 1.5).abs() < 1e-5);
    }

    #[test]
    fn requests_before_first_frame_count_from_it() {
        let mut c = SimulationClock::new(ClockConfig::default());
        let before = c.state().global_glow;
        c.boost(0.5, 800.0).unwrap();
        c.dilate(0.3, 2000.0).unwrap();
        c.update_spin(0.9, 1000.0);

        // The host's first timestamp is far from zero.
        c.run_due(50_000.0);
        assert!((c.state().global_glow - before * 1.5).abs() < 1e-5);
        assert!((c.state().time_scale - 0.3).abs() < 1e-6);
        assert_eq!(c.pending_tasks(), 2);
        assert!((c.state().spin - 0.7).abs() < 1e-6);

        c.run_due(50_500.0);
        let mid = c.state().spin;
        assert!(mid > 0.7 && mid < 0.9, "mid spin {}", mid);
        assert!(c.state().global_glow > before * 1.4);

        c.run_due(50_801.0);
        assert!((c.state().global_glow - before).abs() < 1e-6);
        assert_eq!(c.pending_tasks(), 1);
        c.run_due(52_001.0);
        assert_eq!(c.state().time_scale, 1.0);
        assert!((c.state().spin - 0.9).abs() < 1e-6);
    }

    #[test]
    fn overlapping_boosts_restore_original_glow() {
        let mut c = clock();
        let before = c.state().global_glow;
        c.boost(0.15, 800.0);
        c.run_due(400.0);
        c.boost(0.15, 800.0);
        assert_eq!(c.pending_tasks(), 1);
        c.run_due(900.0);
        assert!(c.state().global_glow > before);
        c.run_due(1201.0);
        assert!((c.state().global_glow - before).abs() < 1e-6);
    }

    #[test]
    fn non_positive_duration_is_noop() {
        let mut c = clock();
        let before = *c.state();
        assert!(c.boost(0.3, 0.0).is_none());
        assert!(c.dilate(0.3, -5.0).is_none());
        assert_eq!(*c.state(), before);
        assert_eq!(c.pending_tasks(), 0);
    }

    #[test]
    fn dilate_overrides_then_restores_time_scale() {
        let mut c = clock();
        c.dilate(0.3, 2000.0).unwrap();
        assert!((c.state().time_scale - 0.3).abs() < 1e-6);
        step(&mut c, 1.0);
        assert!((c.sim_time() - 0.3).abs() < 1e-6);
        c.run_due(2000.0);
        assert_eq!(c.state().time_scale, 1.0);
    }

    #[test]
    fn dilate_clamps_to_positive_scale() {
        let mut c = clock();
        c.dilate(-4.0, 100.0);
        assert!(c.state().time_scale > 0.0);
        c.dilate(0.0, 100.0);
        assert!(c.state().time_scale > 0.0);
    }

    #[test]
    fn cancel_restores_immediately() {
        let mut c = clock();
        let before = c.state().global_glow;
        let token = c.boost(1.0, 10_000.0).unwrap();
        assert!(c.cancel(token));
        assert!((c.state().global_glow - before).abs() < 1e-6);
        assert!(!c.cancel(token));
    }

    #[test]
    fn teardown_cancels_and_freezes_state() {
        let mut c = clock();
        c.boost(0.2, 500.0);
        c.dilate(0.5, 500.0);
        assert_eq!(c.teardown(), 2);
        let frozen = *c.state();
        c.run_due(10_000.0);
        step(&mut c, 1.0);
        assert!(c.boost(0.2, 500.0).is_none());
        assert_eq!(*c.state(), frozen);
    }

    #[test]
    fn spin_transition_eases_to_target() {
        let mut c = clock();
        c.update_spin(0.9, 1000.0);
        c.run_due(500.0);
        let mid = c.state().spin;
        assert!(mid > 0.7 && mid < 0.9, "mid spin {}", mid);
        c.run_due(1000.0);
        assert!((c.state().spin - 0.9).abs() < 1e-6);
    }

    #[test]
    fn parallax_and_proximity_flow_into_state() {
        let mut c = clock();
        c.advance(0.0, InteractionSignals { proximity: 1.7, parallax: Vec2::new(0.1, 0.0) });
        assert_eq!(c.state().user_proximity, 1.0);
        assert!((c.state().camera_offset.x - 0.1).abs() < 1e-6);
    }
}
