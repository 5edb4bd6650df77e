//! Staged reveal timeline, derived purely from wall time since start.

use crate::api::config::SequenceConfig;
use crate::core::easing::{ease, Easing};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EntrancePhase {
    Dark,
    Stars,
    Ring,
    Title,
    Subtitle,
    Enter,
}

impl EntrancePhase {
    /// Numeric index exposed to the host (0 = dark .. 5 = enter).
    pub fn index(self) -> u32 {
        self as u32
    }
}

pub struct EntranceSequence {
    config: SequenceConfig,
}

impl EntranceSequence {
    pub fn new(config: SequenceConfig) -> Self {
        Self { config }
    }

    pub fn phase_at(&self, elapsed_ms: f64) -> EntrancePhase {
        let c = &self.config;
        if elapsed_ms >= c.enter_ms {
            EntrancePhase::Enter
        } else if elapsed_ms >= c.subtitle_ms {
            EntrancePhase::Subtitle
        } else if elapsed_ms >= c.title_ms {
            EntrancePhase::Title
        } else if elapsed_ms >= c.ring_ms {
            EntrancePhase::Ring
        } else if elapsed_ms >= c.stars_ms {
            EntrancePhase::Stars
        } else {
            EntrancePhase::Dark
        }
    }

    /// Ring and disk opacity: zero before the ring phase, then an eased
    /// fade-in over `ring_fade_ms`.
    pub fn ring_visibility(&self, elapsed_ms: f64) -> f32 {
        fade_in(elapsed_ms - self.config.ring_ms, self.config.ring_fade_ms)
    }

    /// Starfield opacity, fading in from the stars phase.
    pub fn star_visibility(&self, elapsed_ms: f64) -> f32 {
        fade_in(elapsed_ms - self.config.stars_ms, self.config.star_fade_ms)
    }
}

fn fade_in(since_ms: f64, fade_ms: f64) -> f32 {
    if since_ms <= 0.0 {
        return 0.0;
    }
    if fade_ms <= 0.0 {
        return 1.0;
    }
    ease(0.0, 1.0, (since_ms / fade_ms) as f32, Easing::CubicOut)
}
