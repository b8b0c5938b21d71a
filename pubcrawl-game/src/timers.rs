//! Cancelable delayed tasks.
//!
//! The core never sleeps or spawns. It asks a [`Scheduler`] for a handle and
//! the host calls back into the session with that handle once the delay has
//! elapsed.
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Opaque identifier for a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskHandle(pub u64);

/// What a scheduled task does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerTask {
    /// Invalidate the undo slot.
    UndoExpiry,
    /// Show the one-shot share prompt.
    SharePrompt,
    /// Re-open the input guard.
    InputRelease,
}

pub trait Scheduler {
    /// Arrange for `task` to fire after `delay`.
    fn schedule(&mut self, task: TimerTask, delay: Duration) -> TaskHandle;

    /// Cancel a pending task. Unknown or already-fired handles are ignored.
    fn cancel(&mut self, handle: TaskHandle);
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingTask {
    handle: TaskHandle,
    task: TimerTask,
    due: Duration,
}

/// Virtual-time scheduler for deterministic tests and simulations.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_id: u64,
    pending: Vec<PendingTask>,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since construction.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_pending(&self, task: TimerTask) -> bool {
        self.pending.iter().any(|pending| pending.task == task)
    }

    /// Move the clock forward and return every handle that came due, earliest first.
    pub fn advance(&mut self, by: Duration) -> Vec<TaskHandle> {
        self.now += by;
        let now = self.now;
        let (mut due, rest): (Vec<PendingTask>, Vec<PendingTask>) =
            self.pending.drain(..).partition(|pending| pending.due <= now);
        self.pending = rest;
        due.sort_by_key(|pending| (pending.due, pending.handle));
        due.into_iter().map(|pending| pending.handle).collect()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, task: TimerTask, delay: Duration) -> TaskHandle {
        self.next_id += 1;
        let handle = TaskHandle(self.next_id);
        self.pending.push(PendingTask {
            handle,
            task,
            due: self.now + delay,
        });
        handle
    }

    fn cancel(&mut self, handle: TaskHandle) {
        self.pending.retain(|pending| pending.handle != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_returns_due_tasks_in_deadline_order() {
        let mut scheduler = ManualScheduler::new();
        let late = scheduler.schedule(TimerTask::UndoExpiry, Duration::from_millis(3_000));
        let early = scheduler.schedule(TimerTask::SharePrompt, Duration::from_millis(1_000));
        assert_eq!(scheduler.pending(), 2);

        assert!(scheduler.advance(Duration::from_millis(999)).is_empty());
        assert_eq!(scheduler.advance(Duration::from_millis(1)), vec![early]);
        assert_eq!(scheduler.advance(Duration::from_millis(5_000)), vec![late]);
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.now(), Duration::from_millis(6_000));
    }

    #[test]
    fn cancelled_tasks_never_fire() {
        let mut scheduler = ManualScheduler::new();
        let handle = scheduler.schedule(TimerTask::InputRelease, Duration::from_millis(500));
        assert!(scheduler.is_pending(TimerTask::InputRelease));
        scheduler.cancel(handle);
        scheduler.cancel(handle);
        assert!(!scheduler.is_pending(TimerTask::InputRelease));
        assert!(scheduler.advance(Duration::from_secs(10)).is_empty());
    }

    #[test]
    fn handles_are_unique() {
        let mut scheduler = ManualScheduler::new();
        let a = scheduler.schedule(TimerTask::UndoExpiry, Duration::ZERO);
        let b = scheduler.schedule(TimerTask::UndoExpiry, Duration::ZERO);
        assert_ne!(a, b);
        assert_eq!(scheduler.advance(Duration::ZERO), vec![a, b]);
    }
}
