/// Converts host frame timestamps into simulation deltas.
///
/// The host calls [`FrameClock::advance`] once per display refresh with its
/// monotonic timestamp in milliseconds. While the page is hidden the clock
/// holds still, and after it becomes visible again the first delta is zero
/// so the scene never jumps by the time spent in the background.
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Upper bound on a single frame delta in seconds.
    max_dt: f32,
    /// Timestamp of the previous visible frame.
    last_ms: Option<f64>,
    /// Accumulated visible time in seconds.
    elapsed: f64,
    /// Latest timestamp seen, hidden or not. Drives wall-clock timers.
    now_ms: f64,
    visible: bool,
}

impl FrameClock {
    pub fn new(max_dt: f32) -> Self {
        Self {
            max_dt: max_dt.max(1e-3),
            last_ms: None,
            elapsed: 0.0,
            now_ms: 0.0,
            visible: true,
        }
    }

    /// Record a frame at `now_ms`. Returns the clamped delta in seconds.
    pub fn advance(&mut self, now_ms: f64) -> f32 {
        if now_ms.is_finite() && now_ms > self.now_ms {
            self.now_ms = now_ms;
        }
        if !self.visible {
            return 0.0;
        }
        let dt = match self.last_ms {
            // Timestamps that run backwards count as a zero-length frame.
            Some(last) => ((self.now_ms - last) / 1000.0).max(0.0) as f32,
            None => 0.0,
        };
        self.last_ms = Some(self.now_ms);
        // Cap to prevent a huge step after a stall
        let dt = dt.min(self.max_dt);
        self.elapsed += dt as f64;
        dt
    }

    /// Pause or resume. Resuming discards the time spent hidden.
    pub fn set_visible(&mut self, visible: bool) {
        if visible && !self.visible {
            self.last_ms = None;
        }
        self.visible = visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Visible time accumulated so far, in seconds.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Latest host timestamp in milliseconds.
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }
}
