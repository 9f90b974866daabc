// SPDX-License-Identifier: GPL-3.0-only

//! One-shot tasks posted to run on a later turn of the event loop.
//!
//! A zero delay still defers: the task only runs once the owner pumps the
//! queue, which happens after the work already queued on the loop.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Posted<T> {
    due: Instant,
    seq: u64,
    task: T,
}

/// Queue of delayed one-shot tasks.
#[derive(Debug, Clone)]
pub struct DeferredQueue<T> {
    tasks: Vec<Posted<T>>,
    next_seq: u64,
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<T> DeferredQueue<T> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Posts `task` to run `delay` after `now`.
    pub fn post(&mut self, now: Instant, delay: Duration, task: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.tasks.push(Posted {
            due: now + delay,
            seq,
            task,
        });
    }

    /// Removes and returns every task due at `now`, earliest first.
    ///
    /// Tasks due at the same instant come out in posting order.
    pub fn take_due(&mut self, now: Instant) -> Vec<T> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.tasks.drain(..).partition(|posted| posted.due <= now);
        self.tasks = pending;

        due.sort_by(|a, b| a.due.cmp(&b.due).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|posted| posted.task).collect()
    }

    /// Earliest due time, if any task is pending.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.tasks.iter().map(|posted| posted.due).min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_delay_is_due_immediately() {
        let now = Instant::now();
        let mut queue = DeferredQueue::new();
        queue.post(now, Duration::ZERO, "show");

        assert_eq!(queue.next_deadline(), Some(now));
        assert_eq!(queue.take_due(now), vec!["show"]);
        assert_eq!(queue.next_deadline(), None);
    }

    #[test]
    fn test_delayed_task_waits() {
        let now = Instant::now();
        let mut queue = DeferredQueue::new();
        queue.post(now, Duration::from_millis(100), 1);

        assert!(queue.take_due(now + Duration::from_millis(99)).is_empty());
        assert_eq!(queue.next_deadline(), Some(now + Duration::from_millis(100)));
        assert_eq!(queue.take_due(now + Duration::from_millis(100)), vec![1]);
    }

    /// Ordering is by due time first, then by posting order.
    #[test]
    fn test_due_order() {
        let now = Instant::now();
        let mut queue = DeferredQueue::new();
        queue.post(now, Duration::from_millis(50), "late");
        queue.post(now, Duration::ZERO, "first");
        queue.post(now, Duration::ZERO, "second");

        assert_eq!(queue.next_deadline(), Some(now));
        assert_eq!(
            queue.take_due(now + Duration::from_millis(60)),
            vec!["first", "second", "late"]
        );
    }
}
