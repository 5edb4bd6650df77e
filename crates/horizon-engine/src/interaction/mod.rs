//! Pointer-driven modulation: parallax, proximity, audio gain, overlay
//! darkening, plus boost and dilation requests for the clock.
//!
//! The controller never touches [`SimulationState`](crate::core::metric::SimulationState).
//! It hands smoothed signals and requests back to the orchestrator.

pub mod audio;

use glam::Vec2;
use log::debug;

use crate::api::config::InteractionConfig;
use crate::core::easing::{approach_factor, Easing};
use crate::core::metric::InteractionSignals;
use crate::input::queue::InputEvent;

pub use audio::AudioRamp;

/// A change the controller wants applied to the simulation clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClockRequest {
    Boost { amount: f32, duration_ms: f64 },
    Dilate { factor: f32, duration_ms: f64 },
}

pub struct InteractionController {
    config: InteractionConfig,
    /// Last raw pointer position; `None` while outside the surface.
    target: Option<Vec2>,
    pointer: Vec2,
    parallax: Vec2,
    proximity: f32,
    hover_armed: bool,
    audio: AudioRamp,
    overlay_opacity: f32,
    requests: Vec<ClockRequest>,
}

impl InteractionController {
    pub fn new(config: InteractionConfig) -> Self {
        let anchor = Vec2::from(config.anchor);
        Self {
            audio: AudioRamp::new(config.audio_ramp_per_sec),
            config,
            target: None,
            pointer: anchor,
            parallax: Vec2::ZERO,
            proximity: 0.0,
            hover_armed: true,
            overlay_opacity: 0.0,
            requests: Vec::new(),
        }
    }

    /// Cubic-eased closeness of a normalized point to the anchor, in [0, 1].
    pub fn proximity_at(&self, point: Vec2) -> f32 {
        let distance = point.distance(Vec2::from(self.config.anchor));
        let closeness = 1.0 - (distance / self.config.influence_radius).clamp(0.0, 1.0);
        Easing::CubicInOut.apply(closeness)
    }

    /// Parallax offset in world units for a pointer position.
    fn parallax_at(&self, point: Vec2) -> Vec2 {
        let centered = (point - Vec2::splat(0.5)) * 2.0;
        Vec2::new(centered.x * self.config.parallax[0], -centered.y * self.config.parallax[1])
    }

    /// Fold one pointer event. Visibility and resize belong to the engine.
    pub fn handle(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::PointerMove { x, y } => {
                self.target = Some(Vec2::new(x, y).clamp(Vec2::ZERO, Vec2::ONE));
            }
            InputEvent::PointerDown { x, y } => {
                let point = Vec2::new(x, y).clamp(Vec2::ZERO, Vec2::ONE);
                self.target = Some(point);
                self.audio.start();
                if point.distance(Vec2::from(self.config.anchor)) <= self.config.influence_radius {
                    let boost = self.config.click_boost;
                    let dilate = self.config.click_dilate;
                    debug!("click near anchor, boost {} dilate {}", boost.amount, dilate.factor);
                    self.requests.push(ClockRequest::Boost { amount: boost.amount, duration_ms: boost.duration_ms });
                    self.requests.push(ClockRequest::Dilate { factor: dilate.factor, duration_ms: dilate.duration_ms });
                }
            }
            InputEvent::PointerLeave => self.target = None,
            InputEvent::VisibilityChanged { .. } | InputEvent::Resize { .. } => {}
        }
    }

    /// Advance the smoothed signals by `dt` wall seconds and return the
    /// requests raised since the last update.
    pub fn update(&mut self, dt: f32) -> Vec<ClockRequest> {
        let (proximity_target, parallax_target) = match self.target {
            Some(point) => {
                let k = approach_factor(self.config.pointer_smoothing, dt);
                self.pointer = self.pointer.lerp(point, k);
                (self.proximity_at(point), self.parallax_at(self.pointer))
            }
            None => (0.0, Vec2::ZERO),
        };
        let k = approach_factor(self.config.pointer_smoothing, dt);
        self.parallax = self.parallax.lerp(parallax_target, k);
        let k = approach_factor(self.config.proximity_smoothing, dt);
        self.proximity += (proximity_target - self.proximity) * k;
        self.proximity = self.proximity.clamp(0.0, 1.0);

        if self.hover_armed && self.proximity >= self.config.hover_threshold {
            self.hover_armed = false;
            let boost = self.config.hover_boost;
            self.requests.push(ClockRequest::Boost { amount: boost.amount, duration_ms: boost.duration_ms });
        } else if !self.hover_armed && self.proximity <= self.config.hover_release {
            self.hover_armed = true;
        }

        let idle = self.config.idle_audio_gain;
        self.audio.set_target(idle + (self.config.max_audio_gain - idle) * self.proximity);
        self.audio.step(dt);
        self.overlay_opacity = self.config.max_overlay_opacity * self.proximity;

        std::mem::take(&mut self.requests)
    }

    pub fn signals(&self) -> InteractionSignals {
        InteractionSignals { proximity: self.proximity, parallax: self.parallax }
    }

    pub fn proximity(&self) -> f32 {
        self.proximity
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    pub fn audio_gain(&self) -> f32 {
        self.audio.gain()
    }

    pub fn audio(&self) -> &AudioRamp {
        &self.audio
    }

    pub fn overlay_opacity(&self) -> f32 {
        self.overlay_opacity
    }

    /// Silence audio and drop pending requests.
    pub fn teardown(&mut self) {
        self.audio.cancel();
        self.requests.clear();
        self.target = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn settle(ctrl: &mut InteractionController, frames: usize) -> Vec<ClockRequest> {
        let mut all = Vec::new();
        for _ in 0..frames {
            all.extend(ctrl.update(DT));
        }
        all
    }

    #[test]
    fn proximity_peaks_at_anchor() {
        let ctrl = InteractionController::new(InteractionConfig::default());
        assert_eq!(ctrl.proximity_at(Vec2::new(0.5, 0.78)), 1.0);
        assert_eq!(ctrl.proximity_at(Vec2::new(0.0, 0.0)), 0.0);
        let mid = ctrl.proximity_at(Vec2::new(0.5, 0.78 - 0.175));
        assert!((mid - 0.5).abs() < 1e-5);
    }

    #[test]
    fn smoothed_proximity_lags_then_converges() {
        let mut ctrl = InteractionController::new(InteractionConfig::default());
        ctrl.handle(&InputEvent::PointerMove { x: 0.5, y: 0.78 });
        ctrl.update(DT);
        assert!(ctrl.proximity() > 0.0 && ctrl.proximity() < 0.5);
        settle(&mut ctrl, 600);
        assert!(ctrl.proximity() > 0.99);
        assert!((ctrl.overlay_opacity() - 0.35 * ctrl.proximity()).abs() < 1e-6);
    }

    #[test]
    fn hover_boost_fires_once_until_rearmed() {
        let mut ctrl = InteractionController::new(InteractionConfig::default());
        ctrl.handle(&InputEvent::PointerMove { x: 0.5, y: 0.78 });
        let requests = settle(&mut ctrl, 600);
        assert_eq!(requests, vec![ClockRequest::Boost { amount: 0.15, duration_ms: 800.0 }]);

        ctrl.handle(&InputEvent::PointerLeave);
        assert!(settle(&mut ctrl, 600).is_empty());
        assert!(ctrl.proximity() < 0.3);

        ctrl.handle(&InputEvent::PointerMove { x: 0.5, y: 0.78 });
        assert_eq!(settle(&mut ctrl, 600).len(), 1);
    }

    #[test]
    fn click_near_anchor_requests_boost_and_dilation() {
        let mut ctrl = InteractionController::new(InteractionConfig::default());
        ctrl.handle(&InputEvent::PointerDown { x: 0.5, y: 0.75 });
        let requests = ctrl.update(0.0);
        assert!(requests.contains(&ClockRequest::Boost { amount: 0.35, duration_ms: 1200.0 }));
        assert!(requests.contains(&ClockRequest::Dilate { factor: 0.3, duration_ms: 2000.0 }));
    }

    #[test]
    fn far_click_only_starts_audio() {
        let mut ctrl = InteractionController::new(InteractionConfig::default());
        assert!(!ctrl.audio().is_started());
        ctrl.handle(&InputEvent::PointerDown { x: 0.05, y: 0.05 });
        assert!(ctrl.update(DT).is_empty());
        assert!(ctrl.audio().is_started());
        settle(&mut ctrl, 60);
        let gain = ctrl.audio_gain();
        assert!(gain > 0.0 && gain <= 0.035 + 1e-6);
    }

    #[test]
    fn audio_ramp_respects_rate() {
        let mut ctrl = InteractionController::new(InteractionConfig::default());
        ctrl.handle(&InputEvent::PointerDown { x: 0.5, y: 0.78 });
        settle(&mut ctrl, 30);
        assert!(ctrl.audio_gain() <= 0.5 * 0.07 / 3.0 + 1e-5);
    }

    #[test]
    fn parallax_follows_pointer_and_returns_on_leave() {
        let mut ctrl = InteractionController::new(InteractionConfig::default());
        ctrl.handle(&InputEvent::PointerMove { x: 1.0, y: 0.0 });
        settle(&mut ctrl, 2000);
        let p = ctrl.signals().parallax;
        assert!(p.x > 0.1 && p.y > 0.05);
        ctrl.handle(&InputEvent::PointerLeave);
        settle(&mut ctrl, 2000);
        assert!(ctrl.signals().parallax.length() < 1e-3);
    }

    #[test]
    fn teardown_silences_audio() {
        let mut ctrl = InteractionController::new(InteractionConfig::default());
        ctrl.handle(&InputEvent::PointerDown { x: 0.5, y: 0.78 });
        settle(&mut ctrl, 120);
        assert!(ctrl.audio_gain() > 0.0);
        ctrl.teardown();
        assert_eq!(ctrl.audio_gain(), 0.0);
        assert!(ctrl.audio().is_cancelled());
    }
}
