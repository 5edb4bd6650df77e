//! Rendering surface capability contract.
//!
//! The engine only computes vertex buffers and uniforms; drawing happens in
//! the host (WebGL2) or in the software rasterizer. A probe tells the engine
//! at startup whether a host surface exists at all.

/// Render tier indicating host capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTier {
    /// Floating-point render targets available (bloom in HDR).
    Hdr,
    /// 8-bit targets only.
    Sdr,
    /// CPU rasterization into a [`Frame`](super::frame::Frame).
    Software,
    /// No surface; the host shows its static fallback.
    Unsupported,
}

impl RenderTier {
    pub fn is_supported(self) -> bool {
        self != RenderTier::Unsupported
    }
}

/// Detects what the host can render with. Checked once at startup.
pub trait SurfaceProbe {
    fn probe(&self) -> RenderTier;
}

/// Fixed answer, for tests and headless hosts.
#[derive(Debug, Clone, Copy)]
pub struct StaticProbe(pub RenderTier);

impl SurfaceProbe for StaticProbe {
    fn probe(&self) -> RenderTier {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unsupported_refuses() {
        assert!(StaticProbe(RenderTier::Software).probe().is_supported());
        assert!(StaticProbe(RenderTier::Hdr).probe().is_supported());
        assert!(!StaticProbe(RenderTier::Unsupported).probe().is_supported());
    }
}
