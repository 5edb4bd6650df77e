/// Host events the engine understands.
/// Pointer coordinates are normalized to [0, 1] with y down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMove { x: f32, y: f32 },
    /// A click or tap began.
    PointerDown { x: f32, y: f32 },
    /// The pointer left the surface.
    PointerLeave,
    /// Tab visibility changed; hidden tabs pause the frame clock.
    VisibilityChanged { visible: bool },
    /// Surface resized, in CSS pixels.
    Resize { width: f32, height: f32 },
}

/// A queue of input events.
/// JS writes events into the queue; Rust drains them at the start of a frame.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    /// Push a new input event (called from JS via wasm-bindgen).
    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Drop everything pending, e.g. on teardown.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_drain() {
        let mut q = InputQueue::new();
        q.push(InputEvent::PointerMove { x: 0.1, y: 0.2 });
        q.push(InputEvent::PointerDown { x: 0.5, y: 0.8 });
        assert_eq!(q.len(), 2);
        let events = q.drain();
        assert_eq!(events.len(), 2);
        assert!(q.is_empty());
    }

    #[test]
    fn drain_preserves_order() {
        let mut q = InputQueue::new();
        q.push(InputEvent::VisibilityChanged { visible: false });
        q.push(InputEvent::Resize { width: 800.0, height: 600.0 });
        q.push(InputEvent::PointerLeave);
        let events = q.drain();
        assert_eq!(events[0], InputEvent::VisibilityChanged { visible: false });
        assert_eq!(events[2], InputEvent::PointerLeave);
    }
}
