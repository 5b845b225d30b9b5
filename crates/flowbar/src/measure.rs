//! Measurement of the container and its items.
//!
//! The engine never measures anything itself. A [`MeasurementAdapter`]
//! answers how wide the container is and, optionally, how wide each item
//! and the overflow button render. [`StaticMeasurement`] is the default
//! adapter: it reports whatever the host last told it.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::item::ItemId;

/// Source of pixel widths for planning.
pub trait MeasurementAdapter {
    /// Width the container offers to the row.
    fn available_width(&self) -> f32;

    /// Rendered width of an item; `None` keeps the width stored in the
    /// registry.
    fn natural_width(&self, id: ItemId) -> Option<f32> {
        let _ = id;
        None
    }

    /// Rendered width of the overflow button; `None` uses the configured
    /// width.
    fn overflow_button_width(&self) -> Option<f32> {
        None
    }

    /// Called when the host reports a new container width.
    fn container_resized(&mut self, width: f32);
}

#[derive(Debug, Default)]
struct Measurements {
    container: f32,
    items: HashMap<ItemId, f32>,
    overflow_button: Option<f32>,
}

/// Adapter backed by values pushed from the host.
///
/// Clones share their state, so the host can keep a handle and update item
/// widths while the layout owns another.
///
/// ```
/// use flowbar::{ItemId, MeasurementAdapter, StaticMeasurement};
///
/// let host = StaticMeasurement::new(320.0);
/// let mut adapter = host.clone();
///
/// let id = ItemId::next();
/// host.set_item_width(id, 48.0);
/// adapter.container_resized(200.0);
///
/// assert_eq!(host.available_width(), 200.0);
/// assert_eq!(adapter.natural_width(id), Some(48.0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticMeasurement {
    inner: Arc<RwLock<Measurements>>,
}

impl StaticMeasurement {
    /// Create an adapter reporting `container_width`.
    pub fn new(container_width: f32) -> Self {
        let measurement = Self::default();
        measurement.inner.write().container = container_width;
        measurement
    }

    /// Override the measured width of an item.
    pub fn set_item_width(&self, id: ItemId, width: f32) {
        self.inner.write().items.insert(id, width);
    }

    /// Drop an item override, falling back to the registry width.
    pub fn clear_item_width(&self, id: ItemId) {
        self.inner.write().items.remove(&id);
    }

    /// Override the measured width of the overflow button.
    pub fn set_overflow_button_width(&self, width: Option<f32>) {
        self.inner.write().overflow_button = width;
    }
}

impl MeasurementAdapter for StaticMeasurement {
    fn available_width(&self) -> f32 {
        self.inner.read().container
    }

    fn natural_width(&self, id: ItemId) -> Option<f32> {
        self.inner.read().items.get(&id).copied()
    }

    fn overflow_button_width(&self) -> Option<f32> {
        self.inner.read().overflow_button
    }

    fn container_resized(&mut self, width: f32) {
        self.inner.write().container = width;
    }
}
