//! Debounced re-plan scheduling.
//!
//! Every dirty-making event calls [`DebounceScheduler::trigger`]. A trigger
//! cancels the pending one-shot timer and arms a new one, so a burst of
//! triggers closer together than the delay yields a single fire once the
//! burst has been quiet for the whole delay. A zero delay makes every trigger
//! fire synchronously.
//!
//! The scheduler never runs anything itself: the host loop asks
//! [`DebounceScheduler::time_until_due`] how long it may sleep and calls
//! [`DebounceScheduler::poll`] when it wakes.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use flowbar_core::{Clock, SystemClock, TimerId, TimerManager};

/// Why a re-plan was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerReason {
    /// The container was resized.
    Resize,
    /// An item was added, removed, moved or re-measured.
    Mutation,
    /// A configuration option was set.
    Config,
    /// An explicit flush was requested.
    Flush,
}

impl fmt::Display for TriggerReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Resize => "resize",
            Self::Mutation => "mutation",
            Self::Config => "config",
            Self::Flush => "flush",
        };
        f.write_str(name)
    }
}

/// A due re-plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fire {
    /// Generation of the last trigger folded into this fire.
    pub generation: u64,
    /// Distinct reasons coalesced into this fire, in first-seen order.
    pub reasons: Vec<TriggerReason>,
    /// How many triggers were coalesced.
    pub triggers: usize,
}

/// Outcome of [`DebounceScheduler::trigger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// The delay is zero; re-plan now.
    Immediate(Fire),
    /// A timer is armed.
    Scheduled {
        generation: u64,
        /// Generation of the pending request this one superseded, if any.
        replaced: Option<u64>,
        due_in: Duration,
    },
}

/// Cancel-and-restart debounce timer.
pub struct DebounceScheduler {
    timers: TimerManager,
    delay: Duration,
    pending: Option<TimerId>,
    generation: u64,
    reasons: Vec<TriggerReason>,
    triggers: usize,
}

impl DebounceScheduler {
    /// Create a scheduler reading the system clock.
    pub fn new(delay: Duration) -> Self {
        Self::with_clock(delay, Arc::new(SystemClock))
    }

    /// Create a scheduler reading `clock`.
    pub fn with_clock(delay: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            timers: TimerManager::with_clock(clock),
            delay,
            pending: None,
            generation: 0,
            reasons: Vec::new(),
            triggers: 0,
        }
    }

    /// The current quiet period.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Change the quiet period.
    ///
    /// A timer that is already armed keeps its deadline; the next trigger
    /// uses the new delay.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Generation of the most recent trigger.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a fire is waiting for its timer.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Request a re-plan.
    pub fn trigger(&mut self, reason: TriggerReason) -> Trigger {
        self.generation += 1;
        self.triggers += 1;
        if !self.reasons.contains(&reason) {
            self.reasons.push(reason);
        }

        let replaced = self.stop_pending().then(|| self.generation - 1);

        if self.delay.is_zero() {
            tracing::trace!(target: "flowbar::debounce", generation = self.generation, %reason, "immediate");
            return Trigger::Immediate(self.take_fire());
        }

        self.pending = Some(self.timers.start_one_shot(self.delay));
        tracing::trace!(
            target: "flowbar::debounce",
            generation = self.generation,
            %reason,
            delay_ms = self.delay.as_millis() as u64,
            "re-plan scheduled"
        );
        Trigger::Scheduled {
            generation: self.generation,
            replaced,
            due_in: self.delay,
        }
    }

    /// Fire now, dropping any pending timer.
    pub fn fire_now(&mut self, reason: TriggerReason) -> Fire {
        self.stop_pending();
        self.generation += 1;
        self.triggers += 1;
        if !self.reasons.contains(&reason) {
            self.reasons.push(reason);
        }
        self.take_fire()
    }

    /// Return the due fire, if the quiet period has elapsed.
    pub fn poll(&mut self) -> Option<Fire> {
        let pending = self.pending?;
        let fired = self.timers.process_expired();
        if !fired.contains(&pending) {
            return None;
        }
        self.pending = None;
        tracing::trace!(target: "flowbar::debounce", generation = self.generation, "timer fired");
        Some(self.take_fire())
    }

    /// Time left until [`poll`](Self::poll) returns a fire.
    pub fn time_until_due(&mut self) -> Option<Duration> {
        self.pending?;
        self.timers.time_until_next()
    }

    /// Drop the pending fire, if any. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        let cancelled = self.stop_pending();
        self.reasons.clear();
        self.triggers = 0;
        if cancelled {
            tracing::trace!(target: "flowbar::debounce", generation = self.generation, "pending re-plan cancelled");
        }
        cancelled
    }

    fn stop_pending(&mut self) -> bool {
        match self.pending.take() {
            Some(id) => self.timers.stop(id).is_ok(),
            None => false,
        }
    }

    fn take_fire(&mut self) -> Fire {
        Fire {
            generation: self.generation,
            reasons: std::mem::take(&mut self.reasons),
            triggers: std::mem::take(&mut self.triggers),
        }
    }
}

impl fmt::Debug for DebounceScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebounceScheduler")
            .field("delay", &self.delay)
            .field("pending", &self.pending.is_some())
            .field("generation", &self.generation)
            .field("reasons", &self.reasons)
            .finish()
    }
}
