//! Flowbar - a responsive toolbar layout engine.
//!
//! A toolbar is a horizontal row of items. When the container becomes too
//! narrow for all of them, the items that no longer fit move into an
//! overflow menu, keeping their order and their nested sub-menus. Flowbar
//! decides which items go where; drawing them is left to the host toolkit.
//!
//! The pieces:
//!
//! - [`ItemRegistry`] owns the items and their logical order.
//! - [`plan`] and [`CollapsePlanner`] compute a [`Partition`] from widths.
//! - [`DebounceScheduler`] coalesces bursts of resizes and mutations.
//! - [`OverflowMenuBuilder`] turns the overflowing items into an
//!   [`OverflowMenu`].
//! - [`ToolbarLayout`] ties them together and emits [`LayoutSnapshot`]s.
//!
//! # Example
//!
//! ```
//! use flowbar::{LayoutSnapshot, ToolbarItem, ToolbarLayout};
//!
//! let mut layout = ToolbarLayout::new(400.0);
//! layout.layout_changed.connect(|snapshot: &LayoutSnapshot| {
//!     println!("{} items overflow", snapshot.partition.overflow().len());
//! });
//!
//! layout.add_item(ToolbarItem::leaf("Open").with_width(80.0)).unwrap();
//! layout.add_item(ToolbarItem::leaf("Save").with_width(80.0)).unwrap();
//! layout
//!     .add_menu_root("Export", vec![ToolbarItem::leaf("PDF"), ToolbarItem::leaf("PNG")])
//!     .unwrap();
//!
//! layout.notify_container_resized(150.0).unwrap();
//! assert!(layout.is_overflow_button_visible());
//! ```

mod config;
mod debounce;
mod error;
mod item;
mod layout;
mod measure;
mod menu;
mod planner;
mod registry;

pub use config::{LayoutConfig, OverflowTheme, DEFAULT_OVERFLOW_BUTTON_WIDTH};
pub use debounce::{DebounceScheduler, Fire, Trigger, TriggerReason};
pub use error::{LayoutError, Result};
pub use item::{ItemId, ItemKind, ToolbarItem, SEPARATOR_WIDTH};
pub use layout::{LayoutSnapshot, ToolbarLayout};
pub use measure::{MeasurementAdapter, StaticMeasurement};
pub use menu::{trailing_separator, IconSlot, MenuEntry, OverflowMenu, OverflowMenuBuilder, OverflowMenuNode};
pub use planner::{plan, CollapsePlanner, Partition, PartitionDiff};
pub use registry::ItemRegistry;

pub use flowbar_core::{Clock, ConnectionId, ManualClock, Signal, SystemClock, TreeFormatOptions, TreeStyle};
