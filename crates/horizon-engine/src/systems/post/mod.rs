//! Post-render composition chain.
//!
//! Stages run in a fixed order: bloom, shadow mask, lens, grain, vignette,
//! tone map. The mask must follow bloom so no light bleeds into the event
//! horizon, and must precede tone mapping so the void stays pure black.
//! Pipelines built from an explicit stage list are validated against this
//! order; stages may be omitted but never reordered or repeated.

pub mod passes;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::api::config::{BloomConfig, LensConfig, MaskConfig, PipelineConfig};
use crate::api::error::EngineError;
use crate::renderer::frame::Frame;

#[derive(Debug, Clone, PartialEq)]
pub enum EffectStage {
    Bloom(BloomConfig),
    ShadowMask(MaskConfig),
    Lens(LensConfig),
    Grain { opacity: f32 },
    Vignette { offset: f32, darkness: f32 },
    ToneMap { exposure: f32 },
}

impl EffectStage {
    pub fn name(&self) -> &'static str {
        match self {
            EffectStage::Bloom(_) => "bloom",
            EffectStage::ShadowMask(_) => "shadow_mask",
            EffectStage::Lens(_) => "lens",
            EffectStage::Grain { .. } => "grain",
            EffectStage::Vignette { .. } => "vignette",
            EffectStage::ToneMap { .. } => "tone_map",
        }
    }

    /// Position in the fixed stage order.
    pub fn rank(&self) -> u32 {
        match self {
            EffectStage::Bloom(_) => 0,
            EffectStage::ShadowMask(_) => 1,
            EffectStage::Lens(_) => 2,
            EffectStage::Grain { .. } => 3,
            EffectStage::Vignette { .. } => 4,
            EffectStage::ToneMap { .. } => 5,
        }
    }

    /// Flat uniform record for a GPU host.
    pub fn uniforms(&self) -> StageUniform {
        let mut params = [0.0f32; 7];
        match self {
            EffectStage::Bloom(b) => {
                params[..4].copy_from_slice(&[b.threshold, b.smoothing, b.intensity, b.radius as f32]);
            }
            EffectStage::ShadowMask(m) => {
                params[..5].copy_from_slice(&[m.center[0], m.center[1], m.radius, m.feather, m.ellipse_y]);
            }
            EffectStage::Lens(l) => {
                let enabled = if l.enabled { 1.0 } else { 0.0 };
                params[..5].copy_from_slice(&[enabled, l.center[0], l.center[1], l.mass, l.influence_radius]);
            }
            EffectStage::Grain { opacity } => params[0] = *opacity,
            EffectStage::Vignette { offset, darkness } => {
                params[0] = *offset;
                params[1] = *darkness;
            }
            EffectStage::ToneMap { exposure } => params[0] = *exposure,
        }
        StageUniform { kind: self.rank() as f32, params }
    }
}

/// 8 floats per stage: kind (stage rank) then up to 7 parameters.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct StageUniform {
    pub kind: f32,
    pub params: [f32; 7],
}

impl StageUniform {
    pub const FLOATS: usize = 8;
}

/// Ordered post-processing chain with reusable scratch buffers.
pub struct EffectPipeline {
    stages: Vec<EffectStage>,
    uniforms: Vec<StageUniform>,
    bright: Vec<Vec3>,
    scratch: Vec<Vec3>,
    snapshot: Frame,
}

impl EffectPipeline {
    /// The full six-stage chain.
    pub fn from_config(config: &PipelineConfig) -> Self {
        let stages = vec![
            EffectStage::Bloom(config.bloom.clone()),
            EffectStage::ShadowMask(config.mask.clone()),
            EffectStage::Lens(config.lens.clone()),
            EffectStage::Grain { opacity: config.grain_opacity },
            EffectStage::Vignette { offset: config.vignette_offset, darkness: config.vignette_darkness },
            EffectStage::ToneMap { exposure: config.exposure },
        ];
        Self::assemble(stages)
    }

    /// Build from an explicit list, rejecting any list that breaks the
    /// fixed order.
    pub fn from_stages(stages: Vec<EffectStage>) -> Result<Self, EngineError> {
        for pair in stages.windows(2) {
            if pair[1].rank() <= pair[0].rank() {
                return Err(EngineError::StageOrder { stage: pair[0].name(), must_follow: pair[1].name() });
            }
        }
        Ok(Self::assemble(stages))
    }

    fn assemble(stages: Vec<EffectStage>) -> Self {
        let uniforms = stages.iter().map(EffectStage::uniforms).collect();
        Self { stages, uniforms, bright: Vec::new(), scratch: Vec::new(), snapshot: Frame::new(1, 1) }
    }

    pub fn stages(&self) -> &[EffectStage] {
        &self.stages
    }

    pub fn uniforms(&self) -> &[StageUniform] {
        &self.uniforms
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.stages.iter().position(|s| s.name() == name)
    }

    /// Run every stage over `frame` in order.
    pub fn apply(&mut self, frame: &mut Frame, frame_index: u32) {
        for stage in &self.stages {
            match stage {
                EffectStage::Bloom(config) => passes::bloom(frame, config, &mut self.bright, &mut self.scratch),
                EffectStage::ShadowMask(config) => passes::shadow_mask(frame, config),
                EffectStage::Lens(config) => passes::lens(frame, config, &mut self.snapshot),
                EffectStage::Grain { opacity } => passes::grain(frame, *opacity, frame_index),
                EffectStage::Vignette { offset, darkness } => passes::vignette(frame, *offset, *darkness),
                EffectStage::ToneMap { exposure } => passes::tone_map(frame, *exposure),
            }
        }
    }
}
