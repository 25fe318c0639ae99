//! Deferred work on the single-threaded UI event loop
//!
//! The subsystem never blocks. Anything that happens "later" (settle delays,
//! highlight resets, notification lifetimes) is queued here and released by
//! the host's frame or timer callback through [`TimerQueue::drain_due`].

use crate::ui::popup::{NotificationId, PromptId};
use instant::Instant;
use std::time::Duration;

/// Work the subsystem schedules for later
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    /// Put the boundary outline and fill back to their resting style, unless
    /// a newer prompt took over the highlight
    ResetBoundaryHighlight(PromptId),
    /// Fade out and hide the boundary visual, if the prompt is still the one
    /// being dismissed
    HideBoundary(PromptId),
    /// Remove a prompt whose exit animation has finished
    RemovePrompt(PromptId),
    RemoveNotification(NotificationId),
}

#[derive(Debug)]
struct Timer {
    due: Instant,
    seq: u64,
    task: Deferred,
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    timers: Vec<Timer>,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_at(&mut self, due: Instant, task: Deferred) {
        self.next_seq += 1;
        self.timers.push(Timer {
            due,
            seq: self.next_seq,
            task,
        });
    }

    pub fn schedule_after(&mut self, now: Instant, delay: Duration, task: Deferred) {
        self.schedule_at(now + delay, task);
    }

    /// Removes and returns every task due at `now`, earliest first.
    /// Tasks due at the same instant keep their scheduling order.
    pub fn drain_due(&mut self, now: Instant) -> Vec<Deferred> {
        let (mut due, pending): (Vec<Timer>, Vec<Timer>) =
            std::mem::take(&mut self.timers)
                .into_iter()
                .partition(|timer| timer.due <= now);
        self.timers = pending;

        due.sort_by(|a, b| a.due.cmp(&b.due).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|timer| timer.task).collect()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.timers.iter().map(|timer| timer.due).min()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn releases_only_due_tasks_in_order() {
        let start = Instant::now();
        let mut queue = TimerQueue::new();
        let id = PromptId(1);
        queue.schedule_after(start, Duration::from_millis(600), Deferred::RemovePrompt(id));
        queue.schedule_after(start, Duration::from_millis(200), Deferred::HideBoundary(id));
        queue.schedule_after(
            start,
            Duration::from_millis(2000),
            Deferred::ResetBoundaryHighlight(id),
        );

        assert!(queue.drain_due(start + Duration::from_millis(100)).is_empty());
        assert_eq!(
            queue.drain_due(start + Duration::from_millis(700)),
            vec![Deferred::HideBoundary(id), Deferred::RemovePrompt(id)]
        );
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.next_due(), Some(start + Duration::from_millis(2000)));
    }

    #[test]
    fn same_instant_keeps_scheduling_order() {
        let start = Instant::now();
        let mut queue = TimerQueue::new();
        queue.schedule_at(start, Deferred::HideBoundary(PromptId(1)));
        queue.schedule_at(start, Deferred::ResetBoundaryHighlight(PromptId(1)));

        assert_eq!(
            queue.drain_due(start),
            vec![
                Deferred::HideBoundary(PromptId(1)),
                Deferred::ResetBoundaryHighlight(PromptId(1))
            ]
        );
        assert!(queue.is_empty());
    }
}
