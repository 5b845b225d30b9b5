//! Toolbar items.
//!
//! A [`ToolbarItem`] is one interactive unit of the row: a leaf control, a
//! menu root owning a nested sub-menu, or a separator. Items keep their
//! [`ItemId`] for their whole life, so the presentation layer can relocate
//! the widget it created for an item instead of recreating it.

use std::fmt;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

/// Width used for separators when no measurement is available.
pub const SEPARATOR_WIDTH: f32 = 8.0;

static NEXT_ITEM_ID: AtomicU64 = AtomicU64::new(1);

/// Stable, opaque identity of a toolbar item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(NonZeroU64);

impl ItemId {
    /// Allocate a fresh id, unique within the process.
    pub fn next() -> Self {
        let raw = NEXT_ITEM_ID.fetch_add(1, Ordering::Relaxed);
        // The counter starts at one and would need 2^64 allocations to wrap.
        Self(NonZeroU64::new(raw).unwrap_or(NonZeroU64::MIN))
    }

    /// Wrap an id chosen by the embedder.
    ///
    /// Returns `None` for zero. Mixing raw ids with [`ItemId::next`] is allowed;
    /// collisions are reported by the registry as duplicates.
    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    /// The raw numeric value.
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What an item is.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    /// A plain control (button, link, field).
    Leaf,
    /// An item owning an ordered sub-menu of further items.
    MenuRoot(Vec<ToolbarItem>),
    /// A visual divider between groups of items.
    Separator,
}

/// A single item of a toolbar.
///
/// # Example
///
/// ```
/// use flowbar::ToolbarItem;
///
/// let save = ToolbarItem::leaf("Save")
///     .with_width(64.0)
///     .with_icon(true)
///     .with_tooltip("Save the document");
///
/// let export = ToolbarItem::menu_root(
///     "Export",
///     vec![ToolbarItem::leaf("PDF"), ToolbarItem::leaf("PNG")],
/// );
///
/// assert_eq!(save.width(), 64.0);
/// assert_eq!(export.children().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ToolbarItem {
    id: ItemId,
    label: String,
    width: f32,
    kind: ItemKind,
    tooltip: Option<String>,
    icon: bool,
}

impl ToolbarItem {
    fn with_kind(label: String, kind: ItemKind) -> Self {
        Self {
            id: ItemId::next(),
            label,
            width: 0.0,
            kind,
            tooltip: None,
            icon: false,
        }
    }

    /// Create a leaf item with a fresh id.
    pub fn leaf(label: impl Into<String>) -> Self {
        Self::with_kind(label.into(), ItemKind::Leaf)
    }

    /// Create a menu root owning `children`.
    pub fn menu_root(label: impl Into<String>, children: Vec<ToolbarItem>) -> Self {
        Self::with_kind(label.into(), ItemKind::MenuRoot(children))
    }

    /// Create a separator.
    pub fn separator() -> Self {
        Self {
            width: SEPARATOR_WIDTH,
            ..Self::with_kind(String::new(), ItemKind::Separator)
        }
    }

    /// Replace the generated id.
    pub fn with_id(mut self, id: ItemId) -> Self {
        self.id = id;
        self
    }

    /// Set the natural width in pixels.
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    /// Set the tooltip text.
    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    /// Set whether the item renders an icon (prefix component).
    pub fn with_icon(mut self, icon: bool) -> Self {
        self.icon = icon;
        self
    }

    /// Append a sub-item, turning a leaf into a menu root.
    pub fn with_child(mut self, child: ToolbarItem) -> Self {
        match &mut self.kind {
            ItemKind::MenuRoot(children) => children.push(child),
            _ => self.kind = ItemKind::MenuRoot(vec![child]),
        }
        self
    }

    /// The item's id.
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Display text.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Last known rendered width in pixels.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Leaf, separator or menu root.
    pub fn kind(&self) -> &ItemKind {
        &self.kind
    }

    /// Tooltip text, if any.
    pub fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }

    /// Whether the item renders an icon.
    pub fn has_icon(&self) -> bool {
        self.icon
    }

    /// Whether the item owns a sub-menu.
    pub fn is_menu_root(&self) -> bool {
        matches!(self.kind, ItemKind::MenuRoot(_))
    }

    /// Whether the item is a separator.
    pub fn is_separator(&self) -> bool {
        matches!(self.kind, ItemKind::Separator)
    }

    /// Sub-items, empty unless this is a menu root.
    pub fn children(&self) -> &[ToolbarItem] {
        match &self.kind {
            ItemKind::MenuRoot(children) => children,
            _ => &[],
        }
    }

    /// Ids of this item and every item nested below it, depth first.
    pub fn subtree_ids(&self) -> Vec<ItemId> {
        let mut ids = Vec::new();
        self.collect_ids(&mut ids);
        ids
    }

    fn collect_ids(&self, out: &mut Vec<ItemId>) {
        out.push(self.id);
        for child in self.children() {
            child.collect_ids(out);
        }
    }

    /// Find an item in this subtree.
    pub fn find(&self, id: ItemId) -> Option<&ToolbarItem> {
        if self.id == id {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(id))
    }

    pub(crate) fn find_mut(&mut self, id: ItemId) -> Option<&mut ToolbarItem> {
        if self.id == id {
            return Some(self);
        }
        match &mut self.kind {
            ItemKind::MenuRoot(children) => children.iter_mut().find_map(|child| child.find_mut(id)),
            _ => None,
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<ToolbarItem>> {
        match &mut self.kind {
            ItemKind::MenuRoot(children) => Some(children),
            _ => None,
        }
    }

    pub(crate) fn set_width(&mut self, width: f32) {
        self.width = width;
    }

    pub(crate) fn set_tooltip(&mut self, tooltip: Option<String>) {
        self.tooltip = tooltip;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = ItemId::next();
        let b = ItemId::next();
        assert_ne!(a, b);
        assert!(b.get() > a.get());
    }

    #[test]
    fn test_from_raw() {
        assert!(ItemId::from_raw(0).is_none());
        let id = ItemId::from_raw(7).unwrap();
        assert_eq!(id.get(), 7);
        assert_eq!(id.to_string(), "#7");
    }

    #[test]
    fn test_leaf_builder() {
        let item = ToolbarItem::leaf("Open")
            .with_width(40.0)
            .with_icon(true)
            .with_tooltip("Open a file");

        assert_eq!(item.label(), "Open");
        assert_eq!(item.width(), 40.0);
        assert!(item.has_icon());
        assert_eq!(item.tooltip(), Some("Open a file"));
        assert!(!item.is_menu_root());
        assert!(item.children().is_empty());
    }

    #[test]
    fn test_separator_default_width() {
        let sep = ToolbarItem::separator();
        assert!(sep.is_separator());
        assert_eq!(sep.width(), SEPARATOR_WIDTH);
    }

    #[test]
    fn test_with_child_promotes_leaf() {
        let child = ToolbarItem::leaf("Child");
        let child_id = child.id();
        let root = ToolbarItem::leaf("Root").with_child(child);

        assert!(root.is_menu_root());
        assert_eq!(root.children()[0].id(), child_id);
    }

    #[test]
    fn test_subtree_ids_depth_first() {
        let leaf_a = ToolbarItem::leaf("A");
        let leaf_b = ToolbarItem::leaf("B");
        let inner = ToolbarItem::menu_root("Inner", vec![leaf_b.clone()]);
        let root = ToolbarItem::menu_root("Root", vec![leaf_a.clone(), inner.clone()]);

        assert_eq!(
            root.subtree_ids(),
            vec![root.id(), leaf_a.id(), inner.id(), leaf_b.id()]
        );
        assert_eq!(root.find(leaf_b.id()).map(|i| i.label()), Some("B"));
        assert!(leaf_a.find(leaf_b.id()).is_none());
    }
}
