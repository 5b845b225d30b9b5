//! Item registry.
//!
//! The registry owns every [`ToolbarItem`] of a toolbar and their logical
//! (non-collapsed) order. Top-level items are the units the planner moves
//! between the row and the overflow menu; nested items live inside their menu
//! root and are reached through an explicit child → parent map recorded at
//! registration time.

use std::collections::{HashMap, HashSet};

use crate::error::{check_width, LayoutError, Result};
use crate::item::{ItemId, ToolbarItem};

/// Ordered collection of toolbar items with stable identities.
#[derive(Debug, Default, Clone)]
pub struct ItemRegistry {
    /// Top-level items in logical order; each owns its subtree.
    items: Vec<ToolbarItem>,
    /// Every registered id, nested ones included.
    known: HashSet<ItemId>,
    /// Nested item → the menu root that directly owns it.
    parents: HashMap<ItemId, ItemId>,
    /// Set by every successful mutation until taken by the controller.
    dirty: bool,
}

impl ItemRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a top-level item at `position` (clamped to the end).
    ///
    /// Fails with [`LayoutError::DuplicateItem`] if the item or anything in its
    /// subtree is already registered, leaving the registry unchanged.
    pub fn register(&mut self, item: ToolbarItem, position: usize) -> Result<ItemId> {
        self.admit(&item)?;
        let id = item.id();
        let position = position.min(self.items.len());
        self.index_subtree(&item, None);
        self.items.insert(position, item);
        self.dirty = true;
        tracing::trace!(target: "flowbar::registry", %id, position, "item registered");
        Ok(id)
    }

    /// Attach `item` to the sub-menu of `parent` at `position`.
    pub fn attach_child(&mut self, parent: ItemId, item: ToolbarItem, position: usize) -> Result<ItemId> {
        match self.get(parent) {
            None => return Err(LayoutError::UnknownItem(parent)),
            Some(owner) if !owner.is_menu_root() => return Err(LayoutError::NotAMenuRoot(parent)),
            Some(_) => {}
        }
        self.admit(&item)?;

        let id = item.id();
        self.index_subtree(&item, Some(parent));
        let children = self
            .find_mut(parent)
            .and_then(ToolbarItem::children_mut)
            .ok_or(LayoutError::NotAMenuRoot(parent))?;
        let position = position.min(children.len());
        children.insert(position, item);
        self.dirty = true;
        tracing::trace!(target: "flowbar::registry", %id, %parent, position, "sub-item attached");
        Ok(id)
    }

    /// Remove an item (and its whole subtree) from the registry.
    pub fn unregister(&mut self, id: ItemId) -> Result<ToolbarItem> {
        let removed = match self.parents.get(&id).copied() {
            None => {
                let index = self.position(id).ok_or(LayoutError::UnknownItem(id))?;
                self.items.remove(index)
            }
            Some(parent) => {
                let siblings = self
                    .find_mut(parent)
                    .and_then(ToolbarItem::children_mut)
                    .ok_or(LayoutError::UnknownItem(id))?;
                let index = siblings
                    .iter()
                    .position(|child| child.id() == id)
                    .ok_or(LayoutError::UnknownItem(id))?;
                siblings.remove(index)
            }
        };

        for gone in removed.subtree_ids() {
            self.known.remove(&gone);
            self.parents.remove(&gone);
        }
        self.dirty = true;
        tracing::trace!(target: "flowbar::registry", %id, "item unregistered");
        Ok(removed)
    }

    /// Move an item to `new_position` among its siblings (clamped).
    pub fn reorder(&mut self, id: ItemId, new_position: usize) -> Result<()> {
        let siblings = match self.parents.get(&id).copied() {
            None => &mut self.items,
            Some(parent) => self
                .find_mut(parent)
                .and_then(ToolbarItem::children_mut)
                .ok_or(LayoutError::UnknownItem(id))?,
        };
        let from = siblings
            .iter()
            .position(|item| item.id() == id)
            .ok_or(LayoutError::UnknownItem(id))?;

        let item = siblings.remove(from);
        let to = new_position.min(siblings.len());
        siblings.insert(to, item);
        if from != to {
            self.dirty = true;
        }
        tracing::trace!(target: "flowbar::registry", %id, from, to, "item reordered");
        Ok(())
    }

    /// Update the natural width of an item.
    ///
    /// Marks the registry dirty only when the width actually changed.
    pub fn update_width(&mut self, id: ItemId, width: f32) -> Result<()> {
        let width = check_width(width)?;
        let item = self.find_mut(id).ok_or(LayoutError::UnknownItem(id))?;
        if item.width() != width {
            item.set_width(width);
            self.dirty = true;
        }
        Ok(())
    }

    /// Set or clear the tooltip of any item, nested ones included.
    pub fn set_tooltip(&mut self, id: ItemId, tooltip: Option<String>) -> Result<()> {
        let item = self.find_mut(id).ok_or(LayoutError::UnknownItem(id))?;
        item.set_tooltip(tooltip);
        self.dirty = true;
        Ok(())
    }

    /// Store a measured width without marking the registry dirty.
    ///
    /// Used while a re-plan is already running.
    pub(crate) fn refresh_width(&mut self, id: ItemId, width: f32) {
        if let Some(item) = self.find_mut(id) {
            item.set_width(width);
        }
    }

    /// Look up any registered item.
    pub fn get(&self, id: ItemId) -> Option<&ToolbarItem> {
        let root = self.owning_root(id)?;
        self.items.iter().find(|item| item.id() == root)?.find(id)
    }

    /// Whether `id` is registered at any depth.
    pub fn contains(&self, id: ItemId) -> bool {
        self.known.contains(&id)
    }

    /// Whether `id` is a top-level item (a unit of the partition).
    pub fn is_top_level(&self, id: ItemId) -> bool {
        self.known.contains(&id) && !self.parents.contains_key(&id)
    }

    /// The menu root directly owning a nested item.
    pub fn parent_of(&self, id: ItemId) -> Option<ItemId> {
        self.parents.get(&id).copied()
    }

    /// The top-level item whose subtree contains `id` (itself if top-level).
    pub fn owning_root(&self, id: ItemId) -> Option<ItemId> {
        if !self.known.contains(&id) {
            return None;
        }
        let mut current = id;
        while let Some(&parent) = self.parents.get(&current) {
            current = parent;
        }
        Some(current)
    }

    /// Top-level items in logical order.
    pub fn items(&self) -> &[ToolbarItem] {
        &self.items
    }

    /// Top-level ids in logical order.
    pub fn ids(&self) -> Vec<ItemId> {
        self.items.iter().map(ToolbarItem::id).collect()
    }

    /// Top-level `(id, width)` pairs in logical order, as fed to the planner.
    pub fn widths(&self) -> Vec<(ItemId, f32)> {
        self.items.iter().map(|item| (item.id(), item.width())).collect()
    }

    /// Index of a top-level item in logical order.
    pub fn position(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    /// Number of top-level items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no top-level item is registered.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether a mutation happened since the last re-plan.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Return and clear the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Check that `item` can be added: unique ids, sane widths.
    fn admit(&self, item: &ToolbarItem) -> Result<()> {
        let ids = item.subtree_ids();
        let mut seen = HashSet::with_capacity(ids.len());
        for id in ids {
            if self.known.contains(&id) || !seen.insert(id) {
                return Err(LayoutError::DuplicateItem(id));
            }
        }
        check_subtree_widths(item)
    }

    fn index_subtree(&mut self, item: &ToolbarItem, parent: Option<ItemId>) {
        self.known.insert(item.id());
        if let Some(parent) = parent {
            self.parents.insert(item.id(), parent);
        }
        for child in item.children() {
            self.index_subtree(child, Some(item.id()));
        }
    }

    fn find_mut(&mut self, id: ItemId) -> Option<&mut ToolbarItem> {
        let root = self.owning_root(id)?;
        self.items
            .iter_mut()
            .find(|item| item.id() == root)?
            .find_mut(id)
    }
}

fn check_subtree_widths(item: &ToolbarItem) -> Result<()> {
    check_width(item.width())?;
    item.children().iter().try_for_each(check_subtree_widths)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(label: &str, width: f32) -> ToolbarItem {
        ToolbarItem::leaf(label).with_width(width)
    }

    #[test]
    fn test_register_in_order() {
        let mut registry = ItemRegistry::new();
        let a = registry.register(leaf("A", 10.0), usize::MAX).unwrap();
        let c = registry.register(leaf("C", 10.0), usize::MAX).unwrap();
        let b = registry.register(leaf("B", 10.0), 1).unwrap();

        assert_eq!(registry.ids(), vec![a, b, c]);
        assert_eq!(registry.len(), 3);
        assert!(registry.take_dirty());
        assert!(!registry.is_dirty());
    }

    #[test]
    fn test_register_duplicate_rejected() {
        let mut registry = ItemRegistry::new();
        let item = leaf("A", 10.0);
        registry.register(item.clone(), 0).unwrap();
        registry.take_dirty();

        assert_eq!(
            registry.register(item.clone(), 0),
            Err(LayoutError::DuplicateItem(item.id()))
        );
        assert_eq!(registry.len(), 1);
        assert!(!registry.is_dirty());
    }

    #[test]
    fn test_register_rejects_nested_duplicate() {
        let mut registry = ItemRegistry::new();
        let shared = leaf("Shared", 5.0);
        registry.register(shared.clone(), 0).unwrap();

        let root = ToolbarItem::menu_root("Menu", vec![leaf("X", 1.0), shared.clone()]);
        let root_id = root.id();
        assert_eq!(
            registry.register(root, 0),
            Err(LayoutError::DuplicateItem(shared.id()))
        );
        assert!(!registry.contains(root_id));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_rejects_bad_width() {
        let mut registry = ItemRegistry::new();
        let result = registry.register(leaf("A", -3.0), 0);
        assert!(matches!(result, Err(LayoutError::InvalidWidth { .. })));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unregister_unknown_is_noop() {
        let mut registry = ItemRegistry::new();
        let id = registry.register(leaf("A", 1.0), 0).unwrap();
        registry.take_dirty();

        let stranger = ItemId::next();
        assert_eq!(registry.unregister(stranger), Err(LayoutError::UnknownItem(stranger)));
        assert_eq!(
            registry.update_width(stranger, 4.0),
            Err(LayoutError::UnknownItem(stranger))
        );
        assert_eq!(registry.ids(), vec![id]);
        assert!(!registry.is_dirty());
    }

    #[test]
    fn test_menu_root_back_references() {
        let mut registry = ItemRegistry::new();
        let pdf = leaf("PDF", 1.0);
        let pdf_id = pdf.id();
        let nested = ToolbarItem::menu_root("Image", vec![pdf]);
        let nested_id = nested.id();
        let root = ToolbarItem::menu_root("Export", vec![nested]);
        let root_id = registry.register(root, 0).unwrap();

        assert_eq!(registry.parent_of(pdf_id), Some(nested_id));
        assert_eq!(registry.parent_of(nested_id), Some(root_id));
        assert_eq!(registry.owning_root(pdf_id), Some(root_id));
        assert_eq!(registry.owning_root(root_id), Some(root_id));
        assert!(registry.is_top_level(root_id));
        assert!(!registry.is_top_level(pdf_id));
        assert_eq!(registry.get(pdf_id).map(ToolbarItem::label), Some("PDF"));
        // Only top-level items take part in planning.
        assert_eq!(registry.widths().len(), 1);
    }

    #[test]
    fn test_unregister_menu_root_drops_subtree() {
        let mut registry = ItemRegistry::new();
        let child = leaf("Child", 1.0);
        let child_id = child.id();
        let root_id = registry
            .register(ToolbarItem::menu_root("Root", vec![child]), 0)
            .unwrap();

        let removed = registry.unregister(root_id).unwrap();
        assert_eq!(removed.children().len(), 1);
        assert!(!registry.contains(child_id));
        assert_eq!(registry.parent_of(child_id), None);

        // The ids are free again.
        registry.register(removed, 0).unwrap();
        assert!(registry.contains(child_id));
    }

    #[test]
    fn test_attach_and_detach_child() {
        let mut registry = ItemRegistry::new();
        let root_id = registry
            .register(ToolbarItem::menu_root("Root", Vec::new()), 0)
            .unwrap();
        let first = registry.attach_child(root_id, leaf("First", 1.0), 0).unwrap();
        let second = registry.attach_child(root_id, leaf("Second", 1.0), 0).unwrap();

        let children: Vec<ItemId> = registry.get(root_id).unwrap().children().iter().map(ToolbarItem::id).collect();
        assert_eq!(children, vec![second, first]);

        registry.unregister(second).unwrap();
        assert_eq!(registry.get(root_id).unwrap().children().len(), 1);
        assert!(registry.is_top_level(root_id));
    }

    #[test]
    fn test_attach_child_to_leaf_rejected() {
        let mut registry = ItemRegistry::new();
        let leaf_id = registry.register(leaf("Leaf", 1.0), 0).unwrap();
        let orphan = leaf("Orphan", 1.0);
        let orphan_id = orphan.id();

        assert_eq!(
            registry.attach_child(leaf_id, orphan, 0),
            Err(LayoutError::NotAMenuRoot(leaf_id))
        );
        assert!(!registry.contains(orphan_id));
    }

    #[test]
    fn test_reorder() {
        let mut registry = ItemRegistry::new();
        let a = registry.register(leaf("A", 1.0), 9).unwrap();
        let b = registry.register(leaf("B", 1.0), 9).unwrap();
        let c = registry.register(leaf("C", 1.0), 9).unwrap();
        registry.take_dirty();

        registry.reorder(a, 99).unwrap();
        assert_eq!(registry.ids(), vec![b, c, a]);
        assert!(registry.take_dirty());

        registry.reorder(c, 0).unwrap();
        assert_eq!(registry.ids(), vec![c, b, a]);

        // Same position is not a change.
        registry.take_dirty();
        registry.reorder(c, 0).unwrap();
        assert!(!registry.is_dirty());
    }

    #[test]
    fn test_update_width_marks_dirty_on_change() {
        let mut registry = ItemRegistry::new();
        let id = registry.register(leaf("A", 10.0), 0).unwrap();
        registry.take_dirty();

        registry.update_width(id, 10.0).unwrap();
        assert!(!registry.is_dirty());

        registry.update_width(id, 12.0).unwrap();
        assert!(registry.is_dirty());
        assert_eq!(registry.widths(), vec![(id, 12.0)]);

        assert!(registry.update_width(id, f32::NAN).is_err());
        assert_eq!(registry.get(id).unwrap().width(), 12.0);
    }

    #[test]
    fn test_set_tooltip_on_nested_item() {
        let mut registry = ItemRegistry::new();
        let child = leaf("Child", 1.0);
        let child_id = child.id();
        registry
            .register(ToolbarItem::menu_root("Root", vec![child]), 0)
            .unwrap();

        registry.set_tooltip(child_id, Some("Nested tip".into())).unwrap();
        assert_eq!(registry.get(child_id).unwrap().tooltip(), Some("Nested tip"));
    }
}
