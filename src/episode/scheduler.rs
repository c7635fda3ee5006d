//! Virtual-clock delayed-task queue.
//!
//! The episode loop's timing (step cadence, settle delay before an episode
//! reset) runs on this queue instead of wall-clock timers. Handles are
//! cancelable, so a `reset` invalidates pending transitions deterministically
//! rather than relying on flag checks inside stale callbacks.

use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashMap},
};

/// Handle to a scheduled task, usable to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

/// Delayed-task queue over a virtual millisecond clock.
///
/// Tasks fire in (due time, schedule order). The owner drains due tasks with
/// [`Scheduler::pop_due`], which advances the clock to each task's due time
/// so work executed in between can schedule follow-ups at consistent times.
#[derive(Debug)]
pub struct Scheduler<T> {
    now: u64,
    next_id: u64,
    queue: BinaryHeap<Reverse<(u64, u64)>>,
    tasks: HashMap<u64, T>,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: 0,
            next_id: 0,
            queue: BinaryHeap::new(),
            tasks: HashMap::new(),
        }
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Schedule a task `delay` milliseconds from now.
    pub fn schedule_in(&mut self, delay: u64, task: T) -> TaskHandle {
        let id = self.next_id;
        self.next_id += 1;
        let due = self.now.saturating_add(delay);
        self.queue.push(Reverse((due, id)));
        self.tasks.insert(id, task);
        TaskHandle(id)
    }

    /// Cancel a pending task. Returns whether it was still pending.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        self.tasks.remove(&handle.0).is_some()
    }

    /// Drop every pending task.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.tasks.clear();
    }

    /// Pop the earliest task due at or before `deadline`, advancing the
    /// clock to its due time. Canceled entries are skipped silently.
    pub fn pop_due(&mut self, deadline: u64) -> Option<(u64, T)> {
        loop {
            let (due, id) = match self.queue.peek() {
                Some(&Reverse((due, id))) => (due, id),
                None => return None,
            };
            if due > deadline {
                return None;
            }
            self.queue.pop();
            if let Some(task) = self.tasks.remove(&id) {
                self.now = self.now.max(due);
                return Some((due, task));
            }
        }
    }

    /// Move the clock forward to `time` (never backwards).
    pub fn advance_to(&mut self, time: u64) {
        if time > self.now {
            self.now = time;
        }
    }

    /// Number of pending (non-canceled) tasks.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
