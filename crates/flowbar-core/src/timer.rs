//! Timer system for Flowbar.
//!
//! Provides one-shot timers driven cooperatively by the host event loop. The
//! host asks [`TimerManager::time_until_next`] how long it may sleep and calls
//! [`TimerManager::process_expired`] when it wakes up. Time is read through a
//! [`Clock`] so that tests can advance it explicitly.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

use crate::error::{Result, TimerError};

new_key_type! {
    /// A unique identifier for a timer.
    pub struct TimerId;
}

/// A source of monotonic time.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> Instant;
}

/// The wall clock, backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same underlying instant, so a test can keep one handle
/// and hand another to the component under test.
///
/// ```
/// use flowbar_core::{Clock, ManualClock};
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// let start = clock.now();
/// clock.advance(Duration::from_millis(20));
/// assert_eq!(clock.now() - start, Duration::from_millis(20));
/// ```
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    /// Create a clock frozen at the current instant.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Create a clock frozen at `instant`.
    pub fn starting_at(instant: Instant) -> Self {
        Self {
            now: Arc::new(Mutex::new(instant)),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ManualClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualClock").field("now", &*self.now.lock()).finish()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

/// An entry in the timer queue (min-heap by fire time).
#[derive(Debug, Clone, Copy)]
struct TimerQueueEntry {
    id: TimerId,
    fire_time: Instant,
}

impl PartialEq for TimerQueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_time == other.fire_time
    }
}

impl Eq for TimerQueueEntry {}

impl PartialOrd for TimerQueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerQueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default).
        other.fire_time.cmp(&self.fire_time)
    }
}

/// Manages the one-shot timers of a single owner.
///
/// Stopped timers are removed from the slot map right away; their heap
/// entries are discarded lazily when they reach the front of the queue.
pub struct TimerManager {
    /// Fire instants of live timers.
    timers: SlotMap<TimerId, Instant>,
    /// Priority queue of pending timer fires (min-heap by fire time).
    queue: BinaryHeap<TimerQueueEntry>,
    clock: Arc<dyn Clock>,
}

impl TimerManager {
    /// Create a timer manager reading the wall clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a timer manager reading the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            timers: SlotMap::with_key(),
            queue: BinaryHeap::new(),
            clock,
        }
    }

    /// Start a one-shot timer that fires after the specified duration.
    ///
    /// Returns the timer ID that can be used to cancel the timer.
    pub fn start_one_shot(&mut self, duration: Duration) -> TimerId {
        let fire_time = self.clock.now() + duration;
        let id = self.timers.insert(fire_time);
        self.queue.push(TimerQueueEntry { id, fire_time });
        tracing::trace!(target: "flowbar_core::timer", ?id, ?duration, "timer started");
        id
    }

    /// Stop and remove a timer.
    ///
    /// Returns `Ok(())` if the timer was live, or an error if it already
    /// fired or was never started here.
    pub fn stop(&mut self, id: TimerId) -> Result<()> {
        if self.timers.remove(id).is_some() {
            tracing::trace!(target: "flowbar_core::timer", ?id, "timer stopped");
            Ok(())
        } else {
            Err(TimerError::InvalidTimerId.into())
        }
    }

    /// Get the duration until the next timer fires, if any.
    ///
    /// Returns `None` if there are no active timers.
    pub fn time_until_next(&mut self) -> Option<Duration> {
        self.discard_stale();
        let now = self.clock.now();
        self.queue
            .peek()
            .map(|entry| entry.fire_time.saturating_duration_since(now))
    }

    /// Process all timers that should fire now.
    ///
    /// Returns the fired timer IDs in fire order. Fired timers are removed.
    #[tracing::instrument(skip(self), target = "flowbar_core::timer", level = "trace")]
    pub fn process_expired(&mut self) -> Vec<TimerId> {
        let now = self.clock.now();
        let mut fired = Vec::new();

        while let Some(entry) = self.queue.peek().copied() {
            if entry.fire_time > now {
                break;
            }
            self.queue.pop();

            // Skip entries whose timer was stopped (or restarted under a new id).
            if self.timers.remove(entry.id).is_none() {
                continue;
            }

            tracing::trace!(target: "flowbar_core::timer", id = ?entry.id, "timer fired");
            fired.push(entry.id);
        }

        fired
    }

    fn discard_stale(&mut self) {
        while let Some(entry) = self.queue.peek() {
            if self.timers.contains_key(entry.id) {
                break;
            }
            self.queue.pop();
        }
    }
}

impl Default for TimerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TimerManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerManager")
            .field("active", &self.timers.len())
            .field("queued", &self.queue.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manual() -> (ManualClock, TimerManager) {
        let clock = ManualClock::new();
        let timers = TimerManager::with_clock(Arc::new(clock.clone()));
        (clock, timers)
    }

    #[test]
    fn test_one_shot_fires_once() {
        let (clock, mut timers) = manual();
        let id = timers.start_one_shot(Duration::from_millis(10));

        assert!(timers.process_expired().is_empty());
        clock.advance(Duration::from_millis(10));
        assert_eq!(timers.process_expired(), vec![id]);
        assert!(timers.stop(id).is_err());

        clock.advance(Duration::from_millis(10));
        assert!(timers.process_expired().is_empty());
    }

    #[test]
    fn test_stop_prevents_fire() {
        let (clock, mut timers) = manual();
        let id = timers.start_one_shot(Duration::from_millis(5));
        timers.stop(id).unwrap();

        clock.advance(Duration::from_millis(50));
        assert!(timers.process_expired().is_empty());
        assert_eq!(timers.time_until_next(), None);
    }

    #[test]
    fn test_stop_unknown_timer() {
        let (_clock, mut timers) = manual();
        let id = timers.start_one_shot(Duration::ZERO);
        timers.stop(id).unwrap();
        assert!(timers.stop(id).is_err());
    }

    #[test]
    fn test_time_until_next() {
        let (clock, mut timers) = manual();
        assert_eq!(timers.time_until_next(), None);

        timers.start_one_shot(Duration::from_millis(30));
        timers.start_one_shot(Duration::from_millis(10));
        assert_eq!(timers.time_until_next(), Some(Duration::from_millis(10)));

        clock.advance(Duration::from_millis(25));
        assert_eq!(timers.time_until_next(), Some(Duration::ZERO));
    }

    #[test]
    fn test_fire_order() {
        let (clock, mut timers) = manual();
        let late = timers.start_one_shot(Duration::from_millis(20));
        let early = timers.start_one_shot(Duration::from_millis(5));

        clock.advance(Duration::from_millis(20));
        assert_eq!(timers.process_expired(), vec![early, late]);
        assert_eq!(timers.time_until_next(), None);
    }
}
