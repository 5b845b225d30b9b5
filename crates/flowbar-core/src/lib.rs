//! Core systems for Flowbar.
//!
//! This crate provides the runtime primitives the toolbar engine is built on:
//!
//! - **Timers**: One-shot timers driven cooperatively by the host loop
//! - **Clocks**: Wall-clock and manually advanced time sources
//! - **Signal/Slot System**: Type-safe change notification
//! - **Logging**: Span names, performance spans and tree dumps
//!
//! # Timer Example
//!
//! ```
//! use flowbar_core::{ManualClock, TimerManager};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let mut timers = TimerManager::with_clock(Arc::new(clock.clone()));
//!
//! let id = timers.start_one_shot(Duration::from_millis(50));
//! assert_eq!(timers.time_until_next(), Some(Duration::from_millis(50)));
//!
//! clock.advance(Duration::from_millis(50));
//! assert_eq!(timers.process_expired(), vec![id]);
//! ```

mod error;
pub mod logging;
pub mod signal;
mod timer;

pub use error::{CoreError, Result, TimerError};
pub use logging::{DebugTree, PerfSpan, TreeFormatOptions, TreeFormatter, TreeStyle};
pub use signal::{ConnectionId, Signal};
pub use timer::{Clock, ManualClock, SystemClock, TimerId, TimerManager};

static_assertions::assert_impl_all!(Signal<u32>: Send, Sync);
static_assertions::assert_impl_all!(TimerManager: Send);
