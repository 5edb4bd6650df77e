// core/schedule.rs
//
// Cancellable one-shot tasks keyed by wall-clock deadlines.
//
// Tasks are plain data, not closures: the owner drains the due ones at the
// start of a frame and applies them itself. That keeps every mutation of the
// simulation state inside its single writer and lets teardown cancel all
// pending work before the state goes away.

use std::collections::HashMap;

/// Handle returned when a task is scheduled. Pass it to
/// [`Scheduler::cancel`] to drop the task before it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskToken(pub u32);

/// Work to perform when a deadline passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScheduledTask {
    /// Restore the glow boost multiplier to `multiplier`.
    RestoreGlow { multiplier: f32 },
    /// Restore the time scale to `scale`.
    RestoreTimeScale { scale: f32 },
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    due_ms: f64,
    task: ScheduledTask,
}

/// One-shot task queue with a liveness flag.
#[derive(Debug)]
pub struct Scheduler {
    pending: HashMap<TaskToken, Pending>,
    next_id: u32,
    alive: bool,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            pending: HashMap::new(),
            next_id: 1,
            alive: true,
        }
    }

    /// Schedule `task` to fire once `now_ms >= due_ms`.
    /// Returns `None` once the scheduler has been shut down.
    pub fn schedule(&mut self, due_ms: f64, task: ScheduledTask) -> Option<TaskToken> {
        if !self.alive {
            return None;
        }
        let token = TaskToken(self.next_id);
        self.next_id = self.next_id.wrapping_add(1).max(1);
        self.pending.insert(token, Pending { due_ms, task });
        Some(token)
    }

    /// Cancel a pending task. Returns the task if it had not fired yet.
    pub fn cancel(&mut self, token: TaskToken) -> Option<ScheduledTask> {
        self.pending.remove(&token).map(|p| p.task)
    }

    /// Whether the task behind `token` is still waiting.
    pub fn is_pending(&self, token: TaskToken) -> bool {
        self.pending.contains_key(&token)
    }

    /// Remove and return every task due at `now_ms`, oldest deadline first.
    /// A dead scheduler never yields tasks.
    pub fn drain_due(&mut self, now_ms: f64) -> Vec<(TaskToken, ScheduledTask)> {
        if !self.alive {
            return Vec::new();
        }
        let mut due: Vec<(TaskToken, Pending)> = self
            .pending
            .iter()
            .filter(|(_, p)| p.due_ms <= now_ms)
            .map(|(&t, &p)| (t, p))
            .collect();
        due.sort_by(|a, b| a.1.due_ms.total_cmp(&b.1.due_ms).then(a.0 .0.cmp(&b.0 .0)));
        for (token, _) in &due {
            self.pending.remove(token);
        }
        due.into_iter().map(|(t, p)| (t, p.task)).collect()
    }

    /// Move every pending deadline by `offset_ms`.
    pub fn shift(&mut self, offset_ms: f64) {
        for p in self.pending.values_mut() {
            p.due_ms += offset_ms;
        }
    }

    /// Cancel everything and refuse further scheduling.
    /// Returns the number of tasks that were cancelled.
    pub fn shutdown(&mut self) -> usize {
        let cancelled = self.pending.len();
        self.pending.clear();
        self.alive = false;
        cancelled
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Number of pending tasks.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_only_when_due() {
        let mut s = Scheduler::new();
        let t = s
            .schedule(100.0, ScheduledTask::RestoreGlow { multiplier: 1.0 })
            .unwrap();
        assert!(s.drain_due(99.0).is_empty());
        assert!(s.is_pending(t));
        let fired = s.drain_due(100.0);
        assert_eq!(fired, vec![(t, ScheduledTask::RestoreGlow { multiplier: 1.0 })]);
        assert!(s.is_empty());
    }

    #[test]
    fn drains_in_deadline_order() {
        let mut s = Scheduler::new();
        s.schedule(300.0, ScheduledTask::RestoreTimeScale { scale: 3.0 });
        s.schedule(100.0, ScheduledTask::RestoreTimeScale { scale: 1.0 });
        s.schedule(200.0, ScheduledTask::RestoreTimeScale { scale: 2.0 });
        let fired: Vec<_> = s.drain_due(1000.0).into_iter().map(|(_, t)| t).collect();
        assert_eq!(
            fired,
            vec![
                ScheduledTask::RestoreTimeScale { scale: 1.0 },
                ScheduledTask::RestoreTimeScale { scale: 2.0 },
                ScheduledTask::RestoreTimeScale { scale: 3.0 },
            ]
        );
    }

    #[test]
    fn cancelled_task_never_fires() {
        let mut s = Scheduler::new();
        let t = s
            .schedule(50.0, ScheduledTask::RestoreGlow { multiplier: 1.0 })
            .unwrap();
        assert!(s.cancel(t).is_some());
        assert!(s.drain_due(1000.0).is_empty());
        assert!(s.cancel(t).is_none());
    }

    #[test]
    fn shift_moves_deadlines() {
        let mut s = Scheduler::new();
        s.schedule(100.0, ScheduledTask::RestoreGlow { multiplier: 1.0 });
        s.shift(1000.0);
        assert!(s.drain_due(1099.0).is_empty());
        assert_eq!(s.drain_due(1100.0).len(), 1);
    }

    #[test]
    fn shutdown_cancels_and_blocks() {
        let mut s = Scheduler::new();
        s.schedule(50.0, ScheduledTask::RestoreGlow { multiplier: 1.0 });
        s.schedule(60.0, ScheduledTask::RestoreTimeScale { scale: 1.0 });
        assert_eq!(s.shutdown(), 2);
        assert!(!s.is_alive());
        assert!(s
            .schedule(70.0, ScheduledTask::RestoreGlow { multiplier: 1.0 })
            .is_none());
        assert!(s.drain_due(f64::MAX).is_empty());
    }
}
