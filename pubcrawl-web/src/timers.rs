//! `setTimeout`-backed scheduler.
use std::collections::HashMap;
use std::time::Duration;

use pubcrawl_game::{Scheduler, TaskHandle, TimerTask};
use yew::Callback;

use crate::dom;

/// Schedules session timers on the browser event loop.
///
/// Fired handles are delivered to `on_fire`; the owner passes them back into
/// the session's `fire`, which discards handles it no longer tracks.
pub struct BrowserScheduler {
    on_fire: Callback<TaskHandle>,
    next_id: u64,
    timeouts: HashMap<TaskHandle, i32>,
}

impl BrowserScheduler {
    #[must_use]
    pub fn new(on_fire: Callback<TaskHandle>) -> Self {
        Self {
            on_fire,
            next_id: 0,
            timeouts: HashMap::new(),
        }
    }

    /// Forget the browser id of a handle that has already fired.
    pub fn settle(&mut self, handle: TaskHandle) {
        self.timeouts.remove(&handle);
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.timeouts.len()
    }
}

/// Milliseconds for `setTimeout`, saturating at the browser's `i32` limit.
#[must_use]
pub fn delay_millis(delay: Duration) -> i32 {
    i32::try_from(delay.as_millis()).unwrap_or(i32::MAX)
}

impl Scheduler for BrowserScheduler {
    fn schedule(&mut self, task: TimerTask, delay: Duration) -> TaskHandle {
        self.next_id += 1;
        let handle = TaskHandle(self.next_id);
        let on_fire = self.on_fire.clone();
        match dom::set_timeout(delay_millis(delay), move || on_fire.emit(handle)) {
            Ok(id) => {
                self.timeouts.insert(handle, id);
            }
            Err(err) => dom::console_error(&format!("Failed to schedule {task:?}: {err}")),
        }
        handle
    }

    fn cancel(&mut self, handle: TaskHandle) {
        if let Some(id) = self.timeouts.remove(&handle) {
            dom::clear_timeout(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_convert_and_saturate() {
        assert_eq!(delay_millis(Duration::from_millis(500)), 500);
        assert_eq!(delay_millis(Duration::from_secs(3)), 3_000);
        assert_eq!(delay_millis(Duration::from_secs(u64::MAX)), i32::MAX);
    }

    #[test]
    fn settle_and_cancel_ignore_unknown_handles() {
        let mut scheduler = BrowserScheduler::new(Callback::noop());
        scheduler.settle(TaskHandle(9));
        scheduler.cancel(TaskHandle(9));
        assert_eq!(scheduler.pending(), 0);
    }
}
