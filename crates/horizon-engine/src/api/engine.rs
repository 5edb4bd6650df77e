use log::{debug, info, warn};

use crate::api::config::EngineConfig;
use crate::api::error::EngineError;
use crate::bridge::protocol::{FrameHeader, ProtocolBuffer, ProtocolLayout};
use crate::core::metric::{SimulationClock, SimulationState};
use crate::core::schedule::TaskToken;
use crate::core::time::FrameClock;
use crate::input::queue::{InputEvent, InputQueue};
use crate::interaction::{ClockRequest, InteractionController};
use crate::renderer::camera::SceneCamera;
use crate::renderer::frame::Frame;
use crate::renderer::raster::SoftwareRasterizer;
use crate::renderer::traits::{RenderTier, SurfaceProbe};
use crate::systems::disk::OrbitalParticleSystem;
use crate::systems::post::EffectPipeline;
use crate::systems::ring::RingRenderer;
use crate::systems::sequence::{EntrancePhase, EntranceSequence};
use crate::systems::stars::StarField;

/// Owns every component and runs them in a fixed order once per frame:
///
/// 1. host events (visibility, resize) and the frame clock
/// 2. pointer events into the interaction controller
/// 3. due reverts on the simulation clock
/// 4. boost and dilation requests from interaction
/// 5. simulation advance
/// 6. star, disk and ring vertex buffers, camera
/// 7. the shared protocol buffer
pub struct EntranceEngine {
    config: EngineConfig,
    tier: RenderTier,
    frame_clock: FrameClock,
    clock: SimulationClock,
    stars: StarField,
    disk: OrbitalParticleSystem,
    rings: Vec<RingRenderer>,
    camera: SceneCamera,
    interaction: InteractionController,
    pipeline: EffectPipeline,
    input: InputQueue,
    sequence: EntranceSequence,
    rasterizer: SoftwareRasterizer,
    protocol: ProtocolBuffer,
    phase: EntrancePhase,
    star_visibility: f32,
    ring_visibility: f32,
    frame_index: u32,
    alive: bool,
}

impl EntranceEngine {
    /// Build every component. Refuses to start without a rendering surface
    /// so the host can show its static fallback instead.
    pub fn start(config: EngineConfig, probe: &impl SurfaceProbe) -> Result<Self, EngineError> {
        let tier = probe.probe();
        if !tier.is_supported() {
            warn!("no rendering surface, engine not started");
            return Err(EngineError::SurfaceUnavailable);
        }
        let config = config.sanitized();
        let layout = ProtocolLayout::from_config(&config);
        info!(
            "entrance engine starting: tier {:?}, {} stars, {} particles, {} rings, {} buffer floats",
            tier,
            config.stars.count,
            config.disk.particle_count,
            config.rings.rings.len(),
            layout.buffer_total_floats,
        );

        let pipeline = EffectPipeline::from_config(&config.pipeline);
        let mut protocol = ProtocolBuffer::new(layout);
        protocol.write_stages(pipeline.uniforms());

        Ok(Self {
            tier,
            frame_clock: FrameClock::new(config.frame.max_frame_dt),
            clock: SimulationClock::new(config.clock.clone()),
            stars: StarField::new(config.stars.clone()),
            disk: OrbitalParticleSystem::new(config.disk.clone()),
            rings: RingRenderer::from_set(&config.rings),
            camera: SceneCamera::new(&config.camera, config.rings.base_radius),
            interaction: InteractionController::new(config.interaction.clone()),
            pipeline,
            input: InputQueue::new(),
            sequence: EntranceSequence::new(config.sequence.clone()),
            rasterizer: SoftwareRasterizer::new(),
            protocol,
            phase: EntrancePhase::Dark,
            star_visibility: 0.0,
            ring_visibility: 0.0,
            frame_index: 0,
            alive: true,
            config,
        })
    }

    /// Queue a host event for the next tick.
    pub fn push_input(&mut self, event: InputEvent) {
        if self.alive {
            self.input.push(event);
        }
    }

    /// Run one frame at wall time `now_ms`.
    pub fn tick(&mut self, now_ms: f64) {
        if !self.alive {
            return;
        }
        let events = self.input.drain();
        for event in &events {
            match *event {
                InputEvent::VisibilityChanged { visible } => {
                    debug!("visibility -> {}", visible);
                    self.frame_clock.set_visible(visible);
                }
                InputEvent::Resize { width, height } => self.camera.resize(width, height),
                _ => {}
            }
        }
        let dt = self.frame_clock.advance(now_ms);

        for event in &events {
            self.interaction.handle(event);
        }
        let requests = self.interaction.update(dt);

        self.clock.run_due(now_ms);
        for request in requests {
            match request {
                ClockRequest::Boost { amount, duration_ms } => {
                    self.clock.boost(amount, duration_ms);
                }
                ClockRequest::Dilate { factor, duration_ms } => {
                    self.clock.dilate(factor, duration_ms);
                }
            }
        }
        self.clock.advance(dt, self.interaction.signals());

        let elapsed_ms = self.frame_clock.elapsed() * 1000.0;
        self.phase = self.sequence.phase_at(elapsed_ms);
        self.star_visibility = self.sequence.star_visibility(elapsed_ms);
        self.ring_visibility = self.sequence.ring_visibility(elapsed_ms);

        let state = self.clock.state();
        self.stars.tick(dt, state);
        self.stars.write_vertices(self.star_visibility);
        self.disk.tick(dt, state);
        self.disk.write_vertices(state, self.ring_visibility);
        let ring_scale = self.camera.ring_scale();
        for ring in &mut self.rings {
            ring.write_vertices(state, ring_scale, self.ring_visibility);
        }
        self.camera.update(self.clock.sim_time(), state.camera_offset);

        self.write_protocol();
        self.frame_index = self.frame_index.wrapping_add(1);
    }

    fn write_protocol(&mut self) {
        let state = self.clock.state();
        let header = FrameHeader {
            phase: self.phase.index(),
            star_visibility: self.star_visibility,
            ring_visibility: self.ring_visibility,
            overlay_opacity: self.interaction.overlay_opacity(),
            audio_gain: self.interaction.audio_gain(),
            proximity: self.interaction.proximity(),
            global_glow: state.global_glow,
            time_scale: state.time_scale,
        };
        self.protocol.write_camera(&self.camera.uniform());
        self.protocol.write_stars(self.stars.vertices());
        self.protocol.write_disk(self.disk.vertices());
        self.protocol.write_rings(self.rings.iter().map(RingRenderer::vertices));
        self.protocol.finish_frame(&header);
    }

    /// Rasterize the current buffers on the CPU and run the post chain.
    /// The frame is resized to the camera viewport.
    pub fn render_software(&mut self, frame: &mut Frame) {
        let viewport = self.camera.viewport();
        frame.resize(viewport.x as usize, viewport.y as usize);
        if !self.alive {
            return;
        }
        self.rasterizer.draw_stars(frame, &self.camera, self.stars.vertices());
        self.rasterizer.draw_disk(frame, &self.camera, self.disk.vertices());
        let ring_scale = self.camera.ring_scale();
        for ring in &self.rings {
            let half_width = ring.params().thickness * ring_scale;
            self.rasterizer.draw_rings(frame, &self.camera, ring.vertices(), half_width);
        }
        self.pipeline.apply(frame, self.frame_index);
    }

    pub fn boost(&mut self, amount: f32, duration_ms: f64) -> Option<TaskToken> {
        self.clock.boost(amount, duration_ms)
    }

    pub fn dilate(&mut self, factor: f32, duration_ms: f64) -> Option<TaskToken> {
        self.clock.dilate(factor, duration_ms)
    }

    pub fn cancel(&mut self, token: TaskToken) -> bool {
        self.clock.cancel(token)
    }

    pub fn update_spin(&mut self, target: f32, transition_ms: f64) {
        self.clock.update_spin(target, transition_ms);
    }

    pub fn update_inclination(&mut self, target: f32, transition_ms: f64) {
        self.clock.update_inclination(target, transition_ms);
    }

    /// Cancel every pending revert and the audio ramp. Later ticks are no-ops.
    /// Returns the number of cancelled reverts.
    pub fn teardown(&mut self) -> usize {
        if !self.alive {
            return 0;
        }
        self.alive = false;
        let cancelled = self.clock.teardown();
        self.interaction.teardown();
        self.input.clear();
        info!("entrance engine torn down, {} pending reverts cancelled", cancelled);
        cancelled
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn state(&self) -> &SimulationState {
        self.clock.state()
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn tier(&self) -> RenderTier {
        self.tier
    }

    pub fn phase(&self) -> EntrancePhase {
        self.phase
    }

    pub fn star_visibility(&self) -> f32 {
        self.star_visibility
    }

    pub fn ring_visibility(&self) -> f32 {
        self.ring_visibility
    }

    pub fn overlay_opacity(&self) -> f32 {
        self.interaction.overlay_opacity()
    }

    pub fn audio_gain(&self) -> f32 {
        self.interaction.audio_gain()
    }

    pub fn proximity(&self) -> f32 {
        self.interaction.proximity()
    }

    pub fn stars(&self) -> &StarField {
        &self.stars
    }

    pub fn disk(&self) -> &OrbitalParticleSystem {
        &self.disk
    }

    pub fn rings(&self) -> &[RingRenderer] {
        &self.rings
    }

    pub fn camera(&self) -> &SceneCamera {
        &self.camera
    }

    pub fn pipeline(&self) -> &EffectPipeline {
        &self.pipeline
    }

    pub fn protocol(&self) -> &ProtocolBuffer {
        &self.protocol
    }

    pub fn frame_index(&self) -> u32 {
        self.frame_index
    }
}
