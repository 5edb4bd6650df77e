/// SharedArrayBuffer layout read by the host renderer.
///
/// Layout (all values in f32 / 4 bytes):
/// ```text
/// [Header: 20 floats]
/// [Camera: 16 floats, column-major view-projection]
/// [Stars: max_star_vertices × 8 floats]
/// [Disk: max_disk_vertices × 8 floats]
/// [Rings: max_ring_vertices × 8 floats]
/// [Stages: max_stages × 8 floats]
/// ```
///
/// Capacities are written once into the header at init.
/// The host reads them from the header to compute offsets dynamically.

use bytemuck::Pod;

use crate::api::config::EngineConfig;
use crate::renderer::camera::CameraUniform;
use crate::renderer::instance::{DiskVertex, RingVertex, StarVertex};
use crate::systems::post::StageUniform;

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 20;

/// Header field indices.
pub const HEADER_LOCK: usize = 0;
pub const HEADER_FRAME_COUNTER: usize = 1;
pub const HEADER_MAX_DISK_VERTICES: usize = 2;
pub const HEADER_DISK_VERTEX_COUNT: usize = 3;
pub const HEADER_MAX_RING_VERTICES: usize = 4;
pub const HEADER_RING_VERTEX_COUNT: usize = 5;
pub const HEADER_MAX_STAGES: usize = 6;
pub const HEADER_STAGE_COUNT: usize = 7;
pub const HEADER_PHASE: usize = 8;
pub const HEADER_RING_VISIBILITY: usize = 9;
pub const HEADER_OVERLAY_OPACITY: usize = 10;
pub const HEADER_AUDIO_GAIN: usize = 11;
pub const HEADER_PROXIMITY: usize = 12;
pub const HEADER_GLOBAL_GLOW: usize = 13;
pub const HEADER_TIME_SCALE: usize = 14;
pub const HEADER_PROTOCOL_VERSION: usize = 15;
pub const HEADER_MAX_STAR_VERTICES: usize = 16;
pub const HEADER_STAR_VERTEX_COUNT: usize = 17;
pub const HEADER_STAR_VISIBILITY: usize = 18;
// 19 reserved

/// Protocol version written into the header.
pub const PROTOCOL_VERSION: f32 = 1.0;

pub const CAMERA_FLOATS: usize = 16;
pub const STAR_VERTEX_FLOATS: usize = StarVertex::FLOATS;
pub const DISK_VERTEX_FLOATS: usize = DiskVertex::FLOATS;
pub const RING_VERTEX_FLOATS: usize = RingVertex::FLOATS;
pub const STAGE_FLOATS: usize = StageUniform::FLOATS;

/// Upper bound on post stages.
pub const MAX_STAGES: usize = 6;

/// Runtime-computed buffer layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolLayout {
    pub max_star_vertices: usize,
    pub max_disk_vertices: usize,
    pub max_ring_vertices: usize,
    pub max_stages: usize,

    pub star_data_floats: usize,
    pub disk_data_floats: usize,
    pub ring_data_floats: usize,
    pub stage_data_floats: usize,

    /// Offset (in floats) where the camera matrix begins.
    pub camera_offset: usize,
    pub star_data_offset: usize,
    pub disk_data_offset: usize,
    pub ring_data_offset: usize,
    pub stage_data_offset: usize,

    /// Total buffer size in floats.
    pub buffer_total_floats: usize,
    /// Total buffer size in bytes.
    pub buffer_total_bytes: usize,
}

impl ProtocolLayout {
    /// Compute layout from raw capacity values.
    pub fn new(max_star_vertices: usize, max_disk_vertices: usize, max_ring_vertices: usize, max_stages: usize) -> Self {
        let star_data_floats = max_star_vertices * STAR_VERTEX_FLOATS;
        let disk_data_floats = max_disk_vertices * DISK_VERTEX_FLOATS;
        let ring_data_floats = max_ring_vertices * RING_VERTEX_FLOATS;
        let stage_data_floats = max_stages * STAGE_FLOATS;

        let camera_offset = HEADER_FLOATS;
        let star_data_offset = camera_offset + CAMERA_FLOATS;
        let disk_data_offset = star_data_offset + star_data_floats;
        let ring_data_offset = disk_data_offset + disk_data_floats;
        let stage_data_offset = ring_data_offset + ring_data_floats;

        let buffer_total_floats = stage_data_offset + stage_data_floats;
        let buffer_total_bytes = buffer_total_floats * 4;

        Self {
            max_star_vertices,
            max_disk_vertices,
            max_ring_vertices,
            max_stages,
            star_data_floats,
            disk_data_floats,
            ring_data_floats,
            stage_data_floats,
            camera_offset,
            star_data_offset,
            disk_data_offset,
            ring_data_offset,
            stage_data_offset,
            buffer_total_floats,
            buffer_total_bytes,
        }
    }

    /// Capacities implied by an engine configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        let rings = &config.rings;
        let per_ring = rings.segments.max(8) * rings.radial_samples.max(1);
        Self::new(config.stars.count, config.disk.particle_count, per_ring * rings.rings.len(), MAX_STAGES)
    }
}

/// Scalars mirrored into the header each frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameHeader {
    pub phase: u32,
    pub star_visibility: f32,
    pub ring_visibility: f32,
    pub overlay_opacity: f32,
    pub audio_gain: f32,
    pub proximity: f32,
    pub global_glow: f32,
    pub time_scale: f32,
}

/// Flat f32 buffer the host maps as a typed array.
pub struct ProtocolBuffer {
    layout: ProtocolLayout,
    data: Vec<f32>,
    frame_counter: u32,
}

impl ProtocolBuffer {
    pub fn new(layout: ProtocolLayout) -> Self {
        let mut data = vec![0.0; layout.buffer_total_floats];
        data[HEADER_MAX_STAR_VERTICES] = layout.max_star_vertices as f32;
        data[HEADER_MAX_DISK_VERTICES] = layout.max_disk_vertices as f32;
        data[HEADER_MAX_RING_VERTICES] = layout.max_ring_vertices as f32;
        data[HEADER_MAX_STAGES] = layout.max_stages as f32;
        data[HEADER_PROTOCOL_VERSION] = PROTOCOL_VERSION;
        Self { layout, data, frame_counter: 0 }
    }

    pub fn layout(&self) -> &ProtocolLayout {
        &self.layout
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn as_ptr(&self) -> *const f32 {
        self.data.as_ptr()
    }

    pub fn frame_counter(&self) -> u32 {
        self.frame_counter
    }

    /// Copy as many records as fit into a section; returns the count written.
    fn write_section<T: Pod>(&mut self, offset: usize, capacity: usize, records: &[T], floats_per: usize) -> usize {
        let count = records.len().min(capacity);
        let floats: &[f32] = bytemuck::cast_slice(&records[..count]);
        self.data[offset..offset + count * floats_per].copy_from_slice(floats);
        count
    }

    pub fn write_stars(&mut self, vertices: &[StarVertex]) {
        let (offset, cap) = (self.layout.star_data_offset, self.layout.max_star_vertices);
        let n = self.write_section(offset, cap, vertices, STAR_VERTEX_FLOATS);
        self.data[HEADER_STAR_VERTEX_COUNT] = n as f32;
    }

    pub fn write_disk(&mut self, vertices: &[DiskVertex]) {
        let (offset, cap) = (self.layout.disk_data_offset, self.layout.max_disk_vertices);
        let n = self.write_section(offset, cap, vertices, DISK_VERTEX_FLOATS);
        self.data[HEADER_DISK_VERTEX_COUNT] = n as f32;
    }

    /// Rings are written back to back; call once per frame with all orders.
    pub fn write_rings<'a>(&mut self, rings: impl IntoIterator<Item = &'a [RingVertex]>) {
        let mut written = 0;
        for vertices in rings {
            let cap = self.layout.max_ring_vertices - written;
            let offset = self.layout.ring_data_offset + written * RING_VERTEX_FLOATS;
            written += self.write_section(offset, cap, vertices, RING_VERTEX_FLOATS);
        }
        self.data[HEADER_RING_VERTEX_COUNT] = written as f32;
    }

    pub fn write_stages(&mut self, stages: &[StageUniform]) {
        let (offset, cap) = (self.layout.stage_data_offset, self.layout.max_stages);
        let n = self.write_section(offset, cap, stages, STAGE_FLOATS);
        self.data[HEADER_STAGE_COUNT] = n as f32;
    }

    pub fn write_camera(&mut self, camera: &CameraUniform) {
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(camera));
        let offset = self.layout.camera_offset;
        self.data[offset..offset + CAMERA_FLOATS].copy_from_slice(floats);
    }

    /// Write the per-frame scalars and bump the frame counter.
    pub fn finish_frame(&mut self, header: &FrameHeader) {
        self.frame_counter = self.frame_counter.wrapping_add(1);
        self.data[HEADER_FRAME_COUNTER] = self.frame_counter as f32;
        self.data[HEADER_PHASE] = header.phase as f32;
        self.data[HEADER_STAR_VISIBILITY] = header.star_visibility;
        self.data[HEADER_RING_VISIBILITY] = header.ring_visibility;
        self.data[HEADER_OVERLAY_OPACITY] = header.overlay_opacity;
        self.data[HEADER_AUDIO_GAIN] = header.audio_gain;
        self.data[HEADER_PROXIMITY] = header.proximity;
        self.data[HEADER_GLOBAL_GLOW] = header.global_glow;
        self.data[HEADER_TIME_SCALE] = header.time_scale;
    }
}
