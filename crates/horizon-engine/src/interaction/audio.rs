/// Linear gain ramp for the ambient drone.
///
/// The host owns the actual audio node and copies `gain()` into it each
/// frame. The ramp stays silent until `start` (first user gesture) and is
/// permanently silenced by `cancel`.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioRamp {
    gain: f32,
    target: f32,
    rate_per_sec: f32,
    started: bool,
    cancelled: bool,
}

impl AudioRamp {
    pub fn new(rate_per_sec: f32) -> Self {
        Self { gain: 0.0, target: 0.0, rate_per_sec: rate_per_sec.max(0.0), started: false, cancelled: false }
    }

    pub fn start(&mut self) {
        if !self.cancelled {
            self.started = true;
        }
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn set_target(&mut self, target: f32) {
        self.target = target.max(0.0);
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Move toward the target by at most `rate * dt`.
    pub fn step(&mut self, dt: f32) {
        if !self.started || self.cancelled {
            return;
        }
        let max_step = self.rate_per_sec * dt.max(0.0);
        let delta = self.target - self.gain;
        self.gain += delta.clamp(-max_step, max_step);
    }

    /// Stop the ramp and drop to silence.
    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.started = false;
        self.gain = 0.0;
        self.target = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_until_started() {
        let mut ramp = AudioRamp::new(0.1);
        ramp.set_target(0.07);
        ramp.step(1.0);
        assert_eq!(ramp.gain(), 0.0);
        ramp.start();
        ramp.step(0.5);
        assert!((ramp.gain() - 0.05).abs() < 1e-6);
        ramp.step(1.0);
        assert!((ramp.gain() - 0.07).abs() < 1e-6);
    }

    #[test]
    fn ramps_down_linearly() {
        let mut ramp = AudioRamp::new(0.1);
        ramp.start();
        ramp.set_target(0.5);
        ramp.step(5.0);
        ramp.set_target(0.0);
        ramp.step(1.0);
        assert!((ramp.gain() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn cancel_is_final() {
        let mut ramp = AudioRamp::new(0.1);
        ramp.start();
        ramp.set_target(1.0);
        ramp.step(1.0);
        ramp.cancel();
        ramp.start();
        ramp.set_target(1.0);
        ramp.step(1.0);
        assert_eq!(ramp.gain(), 0.0);
        assert!(ramp.is_cancelled());
    }
}
