pub mod api;
pub mod core;
pub mod systems;
pub mod renderer;
pub mod bridge;
pub mod input;
pub mod interaction;

// Re-export key types at crate root for convenience
pub use api::config::EngineConfig;
pub use api::engine::EntranceEngine;
pub use api::error::EngineError;
pub use core::easing::{ease, lerp, smoothstep, Easing};
pub use core::metric::{InteractionSignals, SimulationClock, SimulationState};
pub use core::schedule::{ScheduledTask, Scheduler, TaskToken};
pub use core::time::FrameClock;
pub use input::queue::{InputEvent, InputQueue};
pub use interaction::{AudioRamp, ClockRequest, InteractionController};
pub use renderer::camera::SceneCamera;
pub use renderer::frame::Frame;
pub use renderer::instance::{DiskVertex, RingVertex, StarVertex};
pub use renderer::raster::SoftwareRasterizer;
pub use renderer::traits::{RenderTier, StaticProbe, SurfaceProbe};
pub use bridge::protocol::{ProtocolBuffer, ProtocolLayout};
pub use systems::disk::{DiskParticle, OrbitalParticleSystem};
pub use systems::post::{EffectPipeline, EffectStage, StageUniform};
pub use systems::ring::{RingParams, RingRenderer, RingSample};
pub use systems::sequence::{EntrancePhase, EntranceSequence};
pub use systems::stars::{Star, StarField};
