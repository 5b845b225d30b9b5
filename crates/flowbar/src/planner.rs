//! Collapse planning.
//!
//! Given the ordered natural widths of the top-level items and the width the
//! container offers, the planner decides which items stay in the row and
//! which move into the overflow menu.
//!
//! # Algorithm
//!
//! 1. If the whole row (widths plus gaps) fits, every item is visible and no
//!    room is reserved for the overflow button.
//! 2. Otherwise the budget is the available width minus the overflow button
//!    and one gap. Items are taken in collapse-priority order (logical order,
//!    or reversed when collapsing from the start) while the kept total stays
//!    within budget. The first item that does not fit and everything after it
//!    in priority order overflow.
//! 3. The highest-priority item always stays visible.
//!
//! Both output lists are in logical order regardless of the direction.

use crate::error::{LayoutError, Result};
use crate::item::ItemId;
use crate::registry::ItemRegistry;

/// Split of the top-level items between the row and the overflow menu.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    visible: Vec<ItemId>,
    overflow: Vec<ItemId>,
}

impl Partition {
    /// Ids rendered in the row, in logical order.
    pub fn visible(&self) -> &[ItemId] {
        &self.visible
    }

    /// Ids relocated into the overflow menu, in logical order.
    pub fn overflow(&self) -> &[ItemId] {
        &self.overflow
    }

    /// Whether `id` stays in the row.
    pub fn is_visible(&self, id: ItemId) -> bool {
        self.visible.contains(&id)
    }

    /// Whether `id` moved to the overflow menu.
    pub fn is_overflowing(&self, id: ItemId) -> bool {
        self.overflow.contains(&id)
    }

    /// Whether the overflow button has anything to show.
    pub fn has_overflow(&self) -> bool {
        !self.overflow.is_empty()
    }

    /// Total number of planned items.
    pub fn len(&self) -> usize {
        self.visible.len() + self.overflow.len()
    }

    /// Whether the partition holds no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Items that changed side between `previous` and `self`.
    pub fn diff(&self, previous: &Partition) -> PartitionDiff {
        PartitionDiff {
            collapsed: self
                .overflow
                .iter()
                .copied()
                .filter(|id| !previous.overflow.contains(id))
                .collect(),
            expanded: self
                .visible
                .iter()
                .copied()
                .filter(|id| !previous.visible.contains(id))
                .collect(),
        }
    }

    /// Check the partition against the registry it was planned from.
    ///
    /// Every top-level item must appear exactly once and no nested item may
    /// appear at all; a nested id in either list means a menu root's subtree
    /// was split.
    pub fn validate(&self, registry: &ItemRegistry) -> Result<()> {
        for &id in self.visible.iter().chain(&self.overflow) {
            if let Some(root) = registry.parent_of(id).and_then(|_| registry.owning_root(id)) {
                return Err(LayoutError::MenuRootIntegrity { root });
            }
            if !registry.is_top_level(id) {
                return Err(LayoutError::UnknownItem(id));
            }
        }

        let mut planned: Vec<ItemId> = self.visible.iter().chain(&self.overflow).copied().collect();
        planned.sort_unstable();
        let mut registered = registry.ids();
        registered.sort_unstable();
        if planned != registered {
            // Either a duplicate or a missing item; report the first offender.
            let offender = registered
                .iter()
                .find(|id| !planned.contains(id))
                .or_else(|| planned.windows(2).find(|w| w[0] == w[1]).map(|w| &w[0]))
                .copied();
            if let Some(id) = offender {
                return Err(LayoutError::PlanMismatch(id));
            }
        }
        Ok(())
    }
}

/// Items that moved between the row and the overflow menu in one re-plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionDiff {
    /// Now in the overflow menu, previously not.
    pub collapsed: Vec<ItemId>,
    /// Now in the row, previously not.
    pub expanded: Vec<ItemId>,
}

impl PartitionDiff {
    /// Whether no item changed side.
    pub fn is_empty(&self) -> bool {
        self.collapsed.is_empty() && self.expanded.is_empty()
    }
}

/// Planner parameters that stay fixed between re-plans.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollapsePlanner {
    /// Width reserved for the overflow button once anything overflows.
    pub overflow_button_width: f32,
    /// Horizontal gap between adjacent items.
    pub item_gap: f32,
    /// Collapse from the start of the row instead of the end.
    pub reverse_order: bool,
}

impl CollapsePlanner {
    /// Create a planner reserving `overflow_button_width` for the button.
    pub fn new(overflow_button_width: f32) -> Self {
        Self {
            overflow_button_width,
            item_gap: 0.0,
            reverse_order: false,
        }
    }

    /// Set the gap between adjacent items.
    pub fn with_item_gap(mut self, gap: f32) -> Self {
        self.item_gap = gap;
        self
    }

    /// Collapse from the start of the row instead of the end.
    pub fn with_reverse_order(mut self, reverse: bool) -> Self {
        self.reverse_order = reverse;
        self
    }

    /// Partition `items` (in logical order) for a container `available` wide.
    #[tracing::instrument(
        skip_all,
        target = "flowbar::planner",
        level = "trace",
        fields(items = items.len(), available = available)
    )]
    pub fn plan(&self, items: &[(ItemId, f32)], available: f32) -> Partition {
        if items.is_empty() {
            return Partition::default();
        }

        let gap = self.item_gap.max(0.0);
        let full: f32 = items.iter().map(|&(_, w)| w).sum::<f32>() + gap * (items.len() - 1) as f32;
        if full <= available {
            return Partition {
                visible: items.iter().map(|&(id, _)| id).collect(),
                overflow: Vec::new(),
            };
        }

        let budget = available - self.overflow_button_width - gap;
        let priority: Box<dyn Iterator<Item = usize>> = if self.reverse_order {
            Box::new((0..items.len()).rev())
        } else {
            Box::new(0..items.len())
        };

        let mut keep = vec![false; items.len()];
        let mut used = 0.0_f32;
        let mut kept = 0_usize;
        for index in priority {
            let width = items[index].1;
            let next = if kept == 0 { width } else { used + gap + width };
            if next > budget {
                if kept == 0 {
                    // Nothing fits; the first item in priority order stays anyway.
                    keep[index] = true;
                }
                break;
            }
            keep[index] = true;
            used = next;
            kept += 1;
        }

        let mut partition = Partition::default();
        for (&(id, _), kept) in items.iter().zip(keep) {
            if kept {
                partition.visible.push(id);
            } else {
                partition.overflow.push(id);
            }
        }

        tracing::trace!(
            target: "flowbar::planner",
            visible = partition.visible.len(),
            overflow = partition.overflow.len(),
            budget,
            "planned"
        );
        partition
    }
}

/// Plan without gaps.
///
/// # Example
///
/// ```
/// use flowbar::{plan, ItemId};
///
/// let ids: Vec<ItemId> = (1..=4).filter_map(ItemId::from_raw).collect();
/// let items: Vec<(ItemId, f32)> = ids.iter().map(|&id| (id, 50.0)).collect();
///
/// let partition = plan(&items, 140.0, 20.0, false);
/// assert_eq!(partition.visible(), &ids[..2]);
/// assert_eq!(partition.overflow(), &ids[2..]);
/// ```
pub fn plan(
    items: &[(ItemId, f32)],
    available_width: f32,
    overflow_button_width: f32,
    reverse_order: bool,
) -> Partition {
    CollapsePlanner::new(overflow_button_width)
        .with_reverse_order(reverse_order)
        .plan(items, available_width)
}
