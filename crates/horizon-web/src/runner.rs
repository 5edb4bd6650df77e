use horizon_engine::bridge::protocol::HEADER_FLOATS;
use horizon_engine::{EngineConfig, EntranceEngine, InputEvent, SurfaceProbe, TaskToken};
use log::{info, warn};

/// Holds the engine between JS calls.
///
/// The `#[wasm_bindgen]` exports in `lib.rs` keep one runner in a
/// `thread_local!`, because wasm-bindgen cannot export the engine directly.
/// Every call made before `init` or after `teardown` is ignored.
#[derive(Default)]
pub struct EngineRunner {
    engine: Option<EntranceEngine>,
}

impl EngineRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the config and start the engine. Returns `false` when the config
    /// is malformed or the surface is unsupported; the host then shows its
    /// static fallback.
    pub fn init(&mut self, config_json: &str, probe: &impl SurfaceProbe) -> bool {
        if let Some(mut old) = self.engine.take() {
            old.teardown();
        }
        let json = if config_json.trim().is_empty() { "{}" } else { config_json };
        let config = match EngineConfig::from_json(json) {
            Ok(config) => config,
            Err(e) => {
                warn!("engine_init: {}", e);
                return false;
            }
        };
        match EntranceEngine::start(config, probe) {
            Ok(engine) => {
                self.engine = Some(engine);
                info!("horizon: initialized");
                true
            }
            Err(e) => {
                warn!("engine_init: {}", e);
                false
            }
        }
    }

    pub fn engine(&self) -> Option<&EntranceEngine> {
        self.engine.as_ref().filter(|e| e.is_alive())
    }

    fn engine_mut(&mut self) -> Option<&mut EntranceEngine> {
        self.engine.as_mut().filter(|e| e.is_alive())
    }

    pub fn tick(&mut self, now_ms: f64) {
        if let Some(engine) = self.engine_mut() {
            engine.tick(now_ms);
        }
    }

    pub fn push_input(&mut self, event: InputEvent) {
        if let Some(engine) = self.engine_mut() {
            engine.push_input(event);
        }
    }

    pub fn boost(&mut self, amount: f32, duration_ms: f64) -> Option<u32> {
        self.engine_mut()?.boost(amount, duration_ms).map(|t| t.0)
    }

    pub fn dilate(&mut self, factor: f32, duration_ms: f64) -> Option<u32> {
        self.engine_mut()?.dilate(factor, duration_ms).map(|t| t.0)
    }

    pub fn cancel(&mut self, token: u32) -> bool {
        self.engine_mut().map_or(false, |e| e.cancel(TaskToken(token)))
    }

    pub fn update_spin(&mut self, target: f32, transition_ms: f64) {
        if let Some(engine) = self.engine_mut() {
            engine.update_spin(target, transition_ms);
        }
    }

    pub fn update_inclination(&mut self, target: f32, transition_ms: f64) {
        if let Some(engine) = self.engine_mut() {
            engine.update_inclination(target, transition_ms);
        }
    }

    /// Tear the engine down and drop it. Returns the cancelled revert count.
    pub fn teardown(&mut self) -> u32 {
        match self.engine.take() {
            Some(mut engine) => engine.teardown() as u32,
            None => 0,
        }
    }

    // ---- Accessors for SharedArrayBuffer reads ----

    pub fn buffer_ptr(&self) -> *const f32 {
        self.engine().map_or(std::ptr::null(), |e| e.protocol().as_ptr())
    }

    /// Header floats, or an empty slice when not running.
    pub fn header(&self) -> &[f32] {
        self.engine().map(|e| &e.protocol().data()[..HEADER_FLOATS]).unwrap_or(&[])
    }

    pub fn buffer_total_floats(&self) -> u32 {
        self.engine().map_or(0, |e| e.protocol().layout().buffer_total_floats as u32)
    }

    pub fn star_vertex_count(&self) -> u32 {
        self.engine().map_or(0, |e| e.stars().vertices().len() as u32)
    }

    pub fn disk_vertex_count(&self) -> u32 {
        self.engine().map_or(0, |e| e.disk().vertices().len() as u32)
    }

    pub fn ring_vertex_count(&self) -> u32 {
        self.engine().map_or(0, |e| e.rings().iter().map(|r| r.vertices().len() as u32).sum())
    }

    pub fn phase(&self) -> u32 {
        self.engine().map_or(0, |e| e.phase().index())
    }

    pub fn star_visibility(&self) -> f32 {
        self.engine().map_or(0.0, |e| e.star_visibility())
    }

    pub fn ring_visibility(&self) -> f32 {
        self.engine().map_or(0.0, |e| e.ring_visibility())
    }

    pub fn overlay_opacity(&self) -> f32 {
        self.engine().map_or(0.0, |e| e.overlay_opacity())
    }

    pub fn audio_gain(&self) -> f32 {
        self.engine().map_or(0.0, |e| e.audio_gain())
    }

    pub fn proximity(&self) -> f32 {
        self.engine().map_or(0.0, |e| e.proximity())
    }

    pub fn is_running(&self) -> bool {
        self.engine().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_engine::{RenderTier, StaticProbe};

    const SMALL: &str = r#"{ "stars": { "count": 32 }, "disk": { "particle_count": 64 }, "rings": { "segments": 16, "radial_samples": 1 } }"#;

    #[test]
    fn init_reports_unsupported_surface() {
        let mut runner = EngineRunner::new();
        assert!(!runner.init(SMALL, &StaticProbe(RenderTier::Unsupported)));
        assert!(!runner.is_running());
        assert!(runner.buffer_ptr().is_null());
    }

    #[test]
    fn init_rejects_bad_json() {
        let mut runner = EngineRunner::new();
        assert!(!runner.init("{ not json", &StaticProbe(RenderTier::Hdr)));
    }

    #[test]
    fn calls_before_init_are_ignored() {
        let mut runner = EngineRunner::new();
        runner.tick(16.0);
        runner.push_input(InputEvent::PointerLeave);
        assert_eq!(runner.boost(0.2, 500.0), None);
        assert_eq!(runner.teardown(), 0);
    }

    #[test]
    fn lifecycle() {
        let mut runner = EngineRunner::new();
        assert!(runner.init(SMALL, &StaticProbe(RenderTier::Hdr)));
        runner.tick(0.0);
        runner.tick(16.0);
        assert_eq!(runner.star_vertex_count(), 32);
        assert_eq!(runner.disk_vertex_count(), 64);
        assert_eq!(runner.ring_vertex_count(), 3 * 16);
        assert!(!runner.buffer_ptr().is_null());
        assert_eq!(runner.header().len(), HEADER_FLOATS);
        assert!(runner.boost(0.2, 500.0).is_some());
        assert_eq!(runner.teardown(), 1);
        assert!(!runner.is_running());
        assert_eq!(runner.audio_gain(), 0.0);
    }
}
