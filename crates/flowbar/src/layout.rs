//! Toolbar state controller.
//!
//! [`ToolbarLayout`] owns a toolbar's items, configuration and measurement
//! adapter. Every mutation marks the layout dirty and goes through the
//! debounce scheduler; when the scheduler fires, the layout re-plans the
//! partition, rebuilds the overflow menu and emits [`LayoutSnapshot`]s to the
//! presentation layer.
//!
//! # Driving the layout
//!
//! The layout never blocks or spawns. With a zero debounce delay (the
//! default) every mutation re-plans before returning. With a delay, the host
//! loop sleeps for [`ToolbarLayout::time_until_update`] and then calls
//! [`ToolbarLayout::poll`].
//!
//! ```
//! use flowbar::{ToolbarItem, ToolbarLayout};
//!
//! let mut layout = ToolbarLayout::new(140.0);
//! layout.set_overflow_button_width(20.0).unwrap();
//! for label in ["One", "Two", "Three", "Four"] {
//!     layout.add_item(ToolbarItem::leaf(label).with_width(50.0)).unwrap();
//! }
//!
//! assert_eq!(layout.partition().visible().len(), 2);
//! assert_eq!(layout.overflow_menu().entries().len(), 2);
//! ```

use std::sync::Arc;
use std::time::Duration;

use flowbar_core::logging::span_names;
use flowbar_core::{Clock, PerfSpan, Signal, SystemClock, TreeFormatOptions};

use crate::config::{check_delay, LayoutConfig, OverflowTheme};
use crate::debounce::{DebounceScheduler, Fire, Trigger, TriggerReason};
use crate::error::{check_width, LayoutError, Result};
use crate::item::{ItemId, ToolbarItem};
use crate::measure::{MeasurementAdapter, StaticMeasurement};
use crate::menu::{trailing_separator, OverflowMenu, OverflowMenuBuilder};
use crate::planner::{CollapsePlanner, Partition, PartitionDiff};
use crate::registry::ItemRegistry;

/// The result of one applied re-plan, as handed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSnapshot {
    /// Generation of the last request folded into this re-plan.
    pub generation: u64,
    pub partition: Partition,
    pub overflow: OverflowMenu,
    /// Whether the overflow button should be shown.
    pub overflow_button_visible: bool,
    /// A separator ending the visible row, which should not be drawn.
    pub hidden_separator: Option<ItemId>,
    /// The menu root whose sub-menu is open, wherever it currently lives.
    pub active_menu: Option<ItemId>,
    /// Items that changed side in this re-plan.
    pub diff: PartitionDiff,
    /// Whether every menu bar, visible or overflowed, opens its sub-menus on hover.
    pub open_on_hover: bool,
    /// Whether every menu root draws a dropdown indicator.
    pub dropdown_indicator_shown: bool,
}

/// A responsive toolbar.
pub struct ToolbarLayout<M: MeasurementAdapter = StaticMeasurement> {
    registry: ItemRegistry,
    config: LayoutConfig,
    measurement: M,
    scheduler: DebounceScheduler,

    partition: Partition,
    overflow: OverflowMenu,
    hidden_separator: Option<ItemId>,
    active_menu: Option<ItemId>,
    last_diff: PartitionDiff,
    generation: u64,

    // Signals
    /// Emitted once per applied re-plan.
    pub layout_changed: Signal<LayoutSnapshot>,
    /// Emitted when the overflow button appears (`true`) or disappears.
    pub overflow_visibility_changed: Signal<bool>,
}

impl ToolbarLayout<StaticMeasurement> {
    /// Create a toolbar whose container is `container_width` pixels wide.
    pub fn new(container_width: f32) -> Self {
        Self::from_parts(
            StaticMeasurement::new(container_width),
            LayoutConfig::default(),
            Arc::new(SystemClock),
        )
    }

    /// Create a toolbar with a validated configuration.
    pub fn with_config(container_width: f32, config: LayoutConfig) -> Result<Self> {
        Self::with_measurement(StaticMeasurement::new(container_width), config)
    }
}

impl<M: MeasurementAdapter> ToolbarLayout<M> {
    /// Create a toolbar measured by `measurement`.
    pub fn with_measurement(measurement: M, config: LayoutConfig) -> Result<Self> {
        Self::with_clock(measurement, config, Arc::new(SystemClock))
    }

    /// Create a toolbar whose debounce timer reads `clock`.
    pub fn with_clock(measurement: M, config: LayoutConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(measurement, config, clock))
    }

    fn from_parts(measurement: M, config: LayoutConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            registry: ItemRegistry::new(),
            scheduler: DebounceScheduler::with_clock(config.debounce_delay(), clock),
            config,
            measurement,
            partition: Partition::default(),
            overflow: OverflowMenu::default(),
            hidden_separator: None,
            active_menu: None,
            last_diff: PartitionDiff::default(),
            generation: 0,
            layout_changed: Signal::new(),
            overflow_visibility_changed: Signal::new(),
        }
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// Append an item to the row.
    pub fn add_item(&mut self, item: ToolbarItem) -> Result<ItemId> {
        self.insert_item(usize::MAX, item)
    }

    /// Insert an item at `position` in logical order (clamped to the end).
    pub fn insert_item(&mut self, position: usize, item: ToolbarItem) -> Result<ItemId> {
        let id = self
            .registry
            .register(item, position)
            .inspect_err(|err| rejected("insert_item", err))?;
        self.mutated();
        Ok(id)
    }

    /// Append a menu root owning `children`.
    pub fn add_menu_root(&mut self, label: impl Into<String>, children: Vec<ToolbarItem>) -> Result<ItemId> {
        self.add_item(ToolbarItem::menu_root(label, children))
    }

    /// Append a separator.
    pub fn add_separator(&mut self) -> Result<ItemId> {
        self.add_item(ToolbarItem::separator())
    }

    /// Append an entry to the sub-menu of `parent`.
    pub fn add_sub_item(&mut self, parent: ItemId, item: ToolbarItem) -> Result<ItemId> {
        let id = self
            .registry
            .attach_child(parent, item, usize::MAX)
            .inspect_err(|err| rejected("add_sub_item", err))?;
        self.mutated();
        Ok(id)
    }

    /// Remove an item and everything nested below it.
    ///
    /// Closes the active sub-menu if it belonged to the removed subtree.
    pub fn remove_item(&mut self, id: ItemId) -> Result<ToolbarItem> {
        let removed = self
            .registry
            .unregister(id)
            .inspect_err(|err| rejected("remove_item", err))?;
        if self.active_menu.is_some_and(|active| removed.find(active).is_some()) {
            tracing::debug!(target: "flowbar::layout", %id, "active menu removed, closing");
            self.active_menu = None;
        }
        self.mutated();
        Ok(removed)
    }

    /// Move an item to `position` among its siblings.
    pub fn move_item(&mut self, id: ItemId, position: usize) -> Result<()> {
        self.registry
            .reorder(id, position)
            .inspect_err(|err| rejected("move_item", err))?;
        self.mutated();
        Ok(())
    }

    /// Report a new natural width for an item.
    pub fn update_item_width(&mut self, id: ItemId, width: f32) -> Result<()> {
        self.registry
            .update_width(id, width)
            .inspect_err(|err| rejected("update_item_width", err))?;
        self.mutated();
        Ok(())
    }

    /// Change an item's tooltip without re-planning.
    pub fn set_item_tooltip(&mut self, id: ItemId, tooltip: Option<String>) -> Result<()> {
        self.registry
            .set_tooltip(id, tooltip)
            .inspect_err(|err| rejected("set_item_tooltip", err))?;
        self.mutated();
        Ok(())
    }

    /// Look up an item at any depth.
    pub fn item(&self, id: ItemId) -> Option<&ToolbarItem> {
        self.registry.get(id)
    }

    /// The item registry.
    pub fn registry(&self) -> &ItemRegistry {
        &self.registry
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// The current configuration.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Replace the whole configuration.
    pub fn set_config(&mut self, config: LayoutConfig) -> Result<()> {
        config.validate().inspect_err(|err| rejected("set_config", err))?;
        self.scheduler.set_delay(config.debounce_delay());
        self.config = config;
        self.request(TriggerReason::Config);
        Ok(())
    }

    /// Whether items collapse from the start of the row.
    pub fn is_reverse_collapse_order(&self) -> bool {
        self.config.reverse_collapse_order
    }

    /// Collapse items from the start of the row instead of the end.
    pub fn set_reverse_collapse_order(&mut self, reverse: bool) {
        self.config.reverse_collapse_order = reverse;
        self.request(TriggerReason::Config);
    }

    /// The debounce delay in milliseconds.
    pub fn update_debounce_delay(&self) -> u64 {
        self.config.debounce_delay_ms
    }

    /// Set the debounce delay in milliseconds. Zero re-plans synchronously.
    ///
    /// Negative values are rejected and the previous delay is kept.
    pub fn set_update_debounce_delay(&mut self, delay_ms: i64) -> Result<()> {
        let delay_ms = check_delay(delay_ms).inspect_err(|err| rejected("set_update_debounce_delay", err))?;
        self.config.debounce_delay_ms = delay_ms;
        self.scheduler.set_delay(Duration::from_millis(delay_ms));
        self.request(TriggerReason::Config);
        Ok(())
    }

    /// Whether sub-menus open on hover.
    pub fn is_open_on_hover(&self) -> bool {
        self.config.open_on_hover
    }

    /// Open sub-menus on hover and schedule a re-plan.
    pub fn set_open_on_hover(&mut self, open_on_hover: bool) {
        self.config.open_on_hover = open_on_hover;
        self.request(TriggerReason::Config);
    }

    /// Whether menu roots draw a dropdown indicator.
    pub fn is_dropdown_indicator_shown(&self) -> bool {
        self.config.dropdown_indicator_shown
    }

    /// Show or hide the dropdown indicator and schedule a re-plan.
    pub fn set_dropdown_indicator_shown(&mut self, shown: bool) {
        self.config.dropdown_indicator_shown = shown;
        self.request(TriggerReason::Config);
    }

    /// The overflow theme flags.
    pub fn theme(&self) -> OverflowTheme {
        self.config.theme
    }

    /// Replace the overflow theme and schedule a re-plan.
    pub fn set_theme(&mut self, theme: OverflowTheme) {
        self.config.theme = theme;
        self.request(TriggerReason::Config);
    }

    /// Toggle the reserved icon slot in the overflow menu.
    pub fn set_fixed_width_prefix(&mut self, enabled: bool) {
        self.config.theme.fixed_width_prefix = enabled;
        self.request(TriggerReason::Config);
    }

    /// Toggle icon suppression in the overflow menu.
    pub fn set_hide_icons(&mut self, hide: bool) {
        self.config.theme.hide_icons = hide;
        self.request(TriggerReason::Config);
    }

    /// The configured overflow button width.
    pub fn overflow_button_width(&self) -> f32 {
        self.config.overflow_button_width
    }

    /// Set the width reserved for the overflow button.
    ///
    /// Ignored while the measurement adapter reports a measured width.
    pub fn set_overflow_button_width(&mut self, width: f32) -> Result<()> {
        let candidate = self.config.clone().with_overflow_button_width(width);
        candidate
            .validate()
            .inspect_err(|err| rejected("set_overflow_button_width", err))?;
        self.config = candidate;
        self.request(TriggerReason::Config);
        Ok(())
    }

    /// The configured gap between items.
    pub fn item_gap(&self) -> f32 {
        self.config.item_gap
    }

    /// Set the gap between items and schedule a re-plan.
    pub fn set_item_gap(&mut self, gap: f32) -> Result<()> {
        let candidate = self.config.clone().with_item_gap(gap);
        candidate.validate().inspect_err(|err| rejected("set_item_gap", err))?;
        self.config = candidate;
        self.request(TriggerReason::Config);
        Ok(())
    }

    // =========================================================================
    // Measurement
    // =========================================================================

    /// The measurement adapter.
    pub fn measurement(&self) -> &M {
        &self.measurement
    }

    /// Report a new container width.
    pub fn notify_container_resized(&mut self, width: f32) -> Result<()> {
        let width = check_width(width).inspect_err(|err| rejected("notify_container_resized", err))?;
        self.measurement.container_resized(width);
        self.request(TriggerReason::Resize);
        Ok(())
    }

    // =========================================================================
    // Scheduling
    // =========================================================================

    /// Apply a due re-plan. Returns whether one was applied.
    pub fn poll(&mut self) -> bool {
        match self.scheduler.poll() {
            Some(fire) => {
                self.apply(fire);
                true
            }
            None => false,
        }
    }

    /// How long the host may sleep before calling [`poll`](Self::poll).
    pub fn time_until_update(&mut self) -> Option<Duration> {
        self.scheduler.time_until_due()
    }

    /// Re-plan now, dropping any pending debounce timer.
    pub fn flush(&mut self) {
        let fire = self.scheduler.fire_now(TriggerReason::Flush);
        self.apply(fire);
    }

    /// Whether a debounced re-plan is waiting.
    pub fn is_update_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// Generation of the last applied re-plan; zero before the first.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // =========================================================================
    // Results
    // =========================================================================

    /// The partition from the last applied re-plan.
    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// The overflow menu from the last applied re-plan.
    pub fn overflow_menu(&self) -> &OverflowMenu {
        &self.overflow
    }

    /// Whether any item is in the overflow menu.
    pub fn is_overflow_button_visible(&self) -> bool {
        self.partition.has_overflow()
    }

    /// A separator ending the visible row, if any.
    pub fn hidden_separator(&self) -> Option<ItemId> {
        self.hidden_separator
    }

    /// The current layout, as emitted through `layout_changed`.
    pub fn snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            generation: self.generation,
            partition: self.partition.clone(),
            overflow: self.overflow.clone(),
            overflow_button_visible: self.partition.has_overflow(),
            hidden_separator: self.hidden_separator,
            active_menu: self.active_menu,
            diff: self.last_diff.clone(),
            open_on_hover: self.config.open_on_hover,
            dropdown_indicator_shown: self.config.dropdown_indicator_shown,
        }
    }

    // =========================================================================
    // Active sub-menu
    // =========================================================================

    /// The menu root whose sub-menu is open.
    pub fn active_menu(&self) -> Option<ItemId> {
        self.active_menu
    }

    /// Record that the sub-menu of `id` is open.
    ///
    /// The record follows the item between the row and the overflow menu.
    pub fn open_menu(&mut self, id: ItemId) -> Result<()> {
        let item = self
            .registry
            .get(id)
            .ok_or(LayoutError::UnknownItem(id))
            .inspect_err(|err| rejected("open_menu", err))?;
        if !item.is_menu_root() {
            let err = LayoutError::NotAMenuRoot(id);
            rejected("open_menu", &err);
            return Err(err);
        }
        self.active_menu = Some(id);
        Ok(())
    }

    /// Forget the open sub-menu, returning it.
    pub fn close_menu(&mut self) -> Option<ItemId> {
        self.active_menu.take()
    }

    /// Tear the toolbar down: cancel any pending re-plan and disconnect all
    /// slots.
    pub fn destroy(self) {
        self.layout_changed.disconnect_all();
        self.overflow_visibility_changed.disconnect_all();
        tracing::debug!(target: "flowbar::layout", items = self.registry.len(), "toolbar destroyed");
        // Drop cancels the timer.
    }

    // =========================================================================
    // Internal
    // =========================================================================

    fn mutated(&mut self) {
        if self.registry.take_dirty() {
            self.request(TriggerReason::Mutation);
        }
    }

    fn request(&mut self, reason: TriggerReason) {
        if let Trigger::Immediate(fire) = self.scheduler.trigger(reason) {
            self.apply(fire);
        }
    }

    #[tracing::instrument(
        skip_all,
        target = "flowbar::layout",
        level = "trace",
        fields(generation = fire.generation, triggers = fire.triggers)
    )]
    fn apply(&mut self, fire: Fire) {
        let _perf = PerfSpan::new(span_names::REPLAN);

        self.refresh_measured_widths();
        let planner = CollapsePlanner {
            overflow_button_width: self.measured_button_width(),
            item_gap: self.config.item_gap,
            reverse_order: self.config.reverse_collapse_order,
        };
        // NaN and negative widths plan as an empty container.
        let available = self.measurement.available_width().max(0.0);
        let partition = planner.plan(&self.registry.widths(), available);

        if let Err(err) = partition.validate(&self.registry) {
            panic!("collapse plan is inconsistent with the registry: {err}");
        }

        let overflow = OverflowMenuBuilder::new(&self.config).build(&self.registry, partition.overflow());
        let visibility_changed = partition.has_overflow() != self.partition.has_overflow();

        self.hidden_separator = trailing_separator(&self.registry, partition.visible());
        self.last_diff = partition.diff(&self.partition);
        self.partition = partition;
        self.overflow = overflow;
        self.generation = fire.generation;

        tracing::debug!(
            target: "flowbar::layout",
            generation = self.generation,
            visible = self.partition.visible().len(),
            overflow = self.partition.overflow().len(),
            collapsed = self.last_diff.collapsed.len(),
            expanded = self.last_diff.expanded.len(),
            reasons = ?fire.reasons,
            "re-planned"
        );
        if tracing::enabled!(target: "flowbar::layout", tracing::Level::TRACE) {
            tracing::trace!(
                target: "flowbar::layout",
                menu = %self.overflow.dump_with(TreeFormatOptions::minimal()),
                "overflow menu"
            );
        }

        self.layout_changed.emit(self.snapshot());
        if visibility_changed {
            self.overflow_visibility_changed.emit(self.partition.has_overflow());
        }
    }

    fn refresh_measured_widths(&mut self) {
        for id in self.registry.ids() {
            let Some(width) = self.measurement.natural_width(id) else {
                continue;
            };
            match check_width(width) {
                Ok(width) => self.registry.refresh_width(id, width),
                Err(err) => {
                    tracing::warn!(target: "flowbar::layout", %id, %err, "ignoring measured width");
                }
            }
        }
    }

    fn measured_button_width(&self) -> f32 {
        self.measurement
            .overflow_button_width()
            .and_then(|width| check_width(width).ok())
            .unwrap_or(self.config.overflow_button_width)
    }
}

impl<M: MeasurementAdapter> Drop for ToolbarLayout<M> {
    fn drop(&mut self) {
        self.scheduler.cancel();
    }
}

impl<M: MeasurementAdapter> std::fmt::Debug for ToolbarLayout<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolbarLayout")
            .field("items", &self.registry.len())
            .field("config", &self.config)
            .field("generation", &self.generation)
            .field("partition", &self.partition)
            .field("pending", &self.scheduler.is_pending())
            .field(
                "listeners",
                &(self.layout_changed.connection_count() + self.overflow_visibility_changed.connection_count()),
            )
            .finish()
    }
}

static_assertions::assert_impl_all!(ToolbarLayout: Send);

fn rejected(operation: &'static str, err: &LayoutError) {
    tracing::warn!(target: "flowbar::layout", operation, %err, "operation rejected");
}
