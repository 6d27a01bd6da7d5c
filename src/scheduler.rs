//! Logical-time scheduler for the periodic monitors
//!
//! Time is a `Duration` since the scheduler's epoch, so callers decide what
//! "now" is: the async runtime feeds it from the tokio clock, tests feed it
//! directly.

use std::time::Duration;

/// Periodic jobs the workout engine runs besides frame processing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    /// 1 Hz per-exercise timer
    ExerciseTimer,
    RiskMonitor,
    Breathing,
}

/// Cancellation handle for one scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug, Clone)]
struct Slot {
    id: u64,
    task: Task,
    period: Duration,
    next_due: Duration,
}

/// Only live tasks hold a slot; cancelling removes it
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    slots: Vec<Slot>,
    next_id: u64,
}

const MIN_PERIOD: Duration = Duration::from_millis(1);

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// First run is one period after `now`
    pub fn schedule(&mut self, task: Task, period: Duration, now: Duration) -> TaskHandle {
        let period = period.max(MIN_PERIOD);
        let id = self.next_id;
        self.next_id += 1;
        self.slots.push(Slot {
            id,
            task,
            period,
            next_due: now + period,
        });
        TaskHandle(id)
    }

    /// Returns false if the handle was already cancelled
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        match self.slots.iter().position(|s| s.id == handle.0) {
            Some(i) => {
                self.slots.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        self.slots.clear();
    }

    pub fn is_active(&self, handle: TaskHandle) -> bool {
        self.slots.iter().any(|s| s.id == handle.0)
    }

    /// Number of live tasks
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.slots.iter().map(|s| s.next_due).min()
    }

    /// Every run whose deadline is at or before `now`, oldest deadline first.
    /// A task late by several periods runs once per missed period.
    pub fn due(&mut self, now: Duration) -> Vec<Task> {
        let mut runs: Vec<(Duration, usize, Task)> = Vec::new();
        for (i, slot) in self.slots.iter_mut().enumerate() {
            while slot.next_due <= now {
                runs.push((slot.next_due, i, slot.task));
                slot.next_due += slot.period;
            }
        }
        runs.sort_by_key(|(due, i, _)| (*due, *i));
        runs.into_iter().map(|(_, _, task)| task).collect()
    }
}
