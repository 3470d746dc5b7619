//! Deferred tasks and frame timing
//!
//! The engine is single-threaded and cooperative. Timers are modelled as a
//! virtual-time queue the host drives with [`DeferredQueue::pop_due`]; each
//! scheduled task hands back a [`DeferredHandle`] that can cancel it.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::Duration;

/// Handle to a scheduled deferred task
#[derive(Debug, Clone)]
pub struct DeferredHandle {
    id: u64,
    cancelled: Arc<AtomicBool>,
}

impl DeferredHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Cancel the task. Calling this more than once, or after the task fired, is a no-op.
    pub fn cancel(&self) {
        self.cancelled.store(true, AtomicOrdering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(AtomicOrdering::SeqCst)
    }
}

struct Scheduled<T> {
    deadline: Duration,
    id: u64,
    cancelled: Arc<AtomicBool>,
    task: T,
}

impl<T> PartialEq for Scheduled<T> {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.id == other.id
    }
}

impl<T> Eq for Scheduled<T> {}

impl<T> PartialOrd for Scheduled<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Scheduled<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Earliest deadline first, then earliest submission
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Queue of tasks that fire after a fixed delay
pub struct DeferredQueue<T> {
    now: Duration,
    next_id: u64,
    entries: BinaryHeap<Scheduled<T>>,
}

impl<T> DeferredQueue<T> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            entries: BinaryHeap::new(),
        }
    }

    /// Current queue time
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `task` to fire `delay` after the current queue time
    pub fn schedule(&mut self, delay: Duration, task: T) -> DeferredHandle {
        let id = self.next_id;
        self.next_id += 1;
        let cancelled = Arc::new(AtomicBool::new(false));
        self.entries.push(Scheduled {
            deadline: self.now + delay,
            id,
            cancelled: Arc::clone(&cancelled),
            task,
        });
        DeferredHandle { id, cancelled }
    }

    /// Pops the next task due at or before `now`
    ///
    /// The queue clock moves to `now` first, so a task re-armed from inside its
    /// own handler is scheduled from the time it actually ran. A host that polls
    /// late gets one firing per overdue task, not a burst of missed repeats.
    pub fn pop_due(&mut self, now: Duration) -> Option<T> {
        self.advance_to(now);
        while let Some(entry) = self.entries.peek() {
            if entry.cancelled.load(AtomicOrdering::SeqCst) {
                self.entries.pop();
                continue;
            }
            if entry.deadline > now {
                return None;
            }
            let entry = self.entries.pop()?;
            // A fired task can no longer be cancelled meaningfully
            entry.cancelled.store(true, AtomicOrdering::SeqCst);
            return Some(entry.task);
        }
        None
    }

    /// Moves the queue clock forward once all due tasks have been handled
    pub fn advance_to(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    /// Number of tasks that are still armed
    pub fn pending(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| !entry.cancelled.load(AtomicOrdering::SeqCst))
            .count()
    }

    /// Deadline of the earliest armed task, if any
    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries
            .iter()
            .filter(|entry| !entry.cancelled.load(AtomicOrdering::SeqCst))
            .map(|entry| entry.deadline)
            .min()
    }
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Monotonic clock for hosts driving the engine in real time
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    origin: instant::Instant,
}

impl FrameClock {
    pub fn start() -> Self {
        Self {
            origin: instant::Instant::now(),
        }
    }

    /// Time elapsed since the clock started
    pub fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_deadline_order() {
        let mut queue = DeferredQueue::new();
        queue.schedule(Duration::from_millis(30), "late");
        queue.schedule(Duration::from_millis(10), "early");
        queue.schedule(Duration::from_millis(10), "early-second");

        assert_eq!(queue.pop_due(Duration::from_millis(5)), None);
        assert_eq!(queue.pop_due(Duration::from_millis(50)), Some("early"));
        assert_eq!(queue.pop_due(Duration::from_millis(50)), Some("early-second"));
        assert_eq!(queue.pop_due(Duration::from_millis(50)), Some("late"));
        assert_eq!(queue.pop_due(Duration::from_millis(50)), None);
    }

    #[test]
    fn test_cancelled_tasks_never_fire() {
        let mut queue = DeferredQueue::new();
        let handle = queue.schedule(Duration::from_millis(10), 1);
        handle.cancel();
        handle.cancel();

        assert!(handle.is_cancelled());
        assert_eq!(queue.pending(), 0);
        assert_eq!(queue.pop_due(Duration::from_secs(1)), None);
    }

    #[test]
    fn test_rearm_schedules_from_poll_time() {
        let mut queue = DeferredQueue::new();
        queue.schedule(Duration::from_millis(40), ());

        let mut fired = 0;
        while queue.pop_due(Duration::from_millis(200)).is_some() {
            fired += 1;
            queue.schedule(Duration::from_millis(40), ());
        }

        assert_eq!(fired, 1);
        assert_eq!(queue.now(), Duration::from_millis(200));
        assert_eq!(queue.next_deadline(), Some(Duration::from_millis(240)));
    }

    #[test]
    fn test_clock_never_runs_backwards() {
        let mut queue: DeferredQueue<()> = DeferredQueue::new();
        queue.advance_to(Duration::from_millis(100));
        assert_eq!(queue.pop_due(Duration::from_millis(50)), None);
        assert_eq!(queue.now(), Duration::from_millis(100));
    }

    #[test]
    fn test_schedule_relative_to_advanced_clock() {
        let mut queue: DeferredQueue<()> = DeferredQueue::new();
        queue.advance_to(Duration::from_millis(100));
        queue.schedule(Duration::from_millis(50), ());
        assert_eq!(queue.next_deadline(), Some(Duration::from_millis(150)));
    }
}
