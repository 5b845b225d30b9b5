//! Overflow menu construction.
//!
//! The overflow menu is rebuilt from scratch after every re-plan from the
//! overflowing top-level items. Menu roots become sub-menus carrying their
//! whole subtree; nothing is ever patched in place.

use flowbar_core::logging::span_names;
use flowbar_core::{DebugTree, PerfSpan, TreeFormatOptions, TreeFormatter};

use crate::config::{LayoutConfig, OverflowTheme};
use crate::item::{ItemId, ItemKind, ToolbarItem};
use crate::registry::ItemRegistry;

/// How the leading icon slot of an overflow entry renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconSlot {
    /// The item's icon is drawn.
    Shown,
    /// The item has an icon but the theme hides icons in the overflow menu.
    Hidden,
    /// No icon is drawn but a fixed-width slot keeps the label aligned.
    Reserved,
    /// No icon and no slot.
    Empty,
}

impl IconSlot {
    fn resolve(item: &ToolbarItem, theme: &OverflowTheme, top_level: bool) -> Self {
        let shown = item.has_icon() && (!theme.hide_icons || !top_level);
        if shown {
            Self::Shown
        } else if top_level && theme.fixed_width_prefix {
            Self::Reserved
        } else if item.has_icon() {
            Self::Hidden
        } else {
            Self::Empty
        }
    }
}

/// Everything needed to render one entry of the overflow menu.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuEntry {
    pub id: ItemId,
    pub label: String,
    pub tooltip: Option<String>,
    pub icon: IconSlot,
}

/// A node of the overflow menu.
#[derive(Debug, Clone, PartialEq)]
pub enum OverflowMenuNode {
    /// A flat, clickable entry.
    Entry(MenuEntry),
    /// A menu root with its nested items.
    SubMenu {
        entry: MenuEntry,
        children: Vec<OverflowMenuNode>,
        open_on_hover: bool,
        dropdown_indicator: bool,
    },
    /// A horizontal divider.
    Separator(ItemId),
}

impl OverflowMenuNode {
    /// The item this node was built from.
    pub fn id(&self) -> ItemId {
        match self {
            Self::Entry(entry) | Self::SubMenu { entry, .. } => entry.id,
            Self::Separator(id) => *id,
        }
    }

    /// The entry of a leaf or sub-menu; `None` for separators.
    pub fn entry(&self) -> Option<&MenuEntry> {
        match self {
            Self::Entry(entry) | Self::SubMenu { entry, .. } => Some(entry),
            Self::Separator(_) => None,
        }
    }

    /// Sub-menu children; empty for other nodes.
    pub fn children(&self) -> &[OverflowMenuNode] {
        match self {
            Self::SubMenu { children, .. } => children,
            _ => &[],
        }
    }

    /// Whether this node is a separator.
    pub fn is_separator(&self) -> bool {
        matches!(self, Self::Separator(_))
    }

    /// Whether `id` is this node or nested below it.
    pub fn contains(&self, id: ItemId) -> bool {
        self.id() == id || self.children().iter().any(|child| child.contains(id))
    }
}

impl DebugTree for OverflowMenuNode {
    fn label(&self) -> String {
        match self {
            Self::Entry(entry) => entry.label.clone(),
            Self::SubMenu { entry, .. } => format!("{} >", entry.label),
            Self::Separator(_) => "----".to_string(),
        }
    }

    fn detail(&self) -> Option<String> {
        Some(match self.entry() {
            Some(entry) => format!("{} {:?}", entry.id, entry.icon),
            None => self.id().to_string(),
        })
    }

    fn children(&self) -> Vec<&Self> {
        OverflowMenuNode::children(self).iter().collect()
    }
}

/// The rendered content of the overflow popup.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverflowMenu {
    entries: Vec<OverflowMenuNode>,
    theme: OverflowTheme,
    open_on_hover: bool,
}

impl OverflowMenu {
    /// Top-level nodes in overflow order.
    pub fn entries(&self) -> &[OverflowMenuNode] {
        &self.entries
    }

    /// Theme flags to apply to the popup surface.
    pub fn theme(&self) -> OverflowTheme {
        self.theme
    }

    /// Whether sub-menus open on hover.
    pub fn open_on_hover(&self) -> bool {
        self.open_on_hover
    }

    /// Whether the menu has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any node of the menu was built from `id`.
    pub fn contains(&self, id: ItemId) -> bool {
        self.entries.iter().any(|node| node.contains(id))
    }

    /// Render the menu as an indented tree for logs and debugging.
    pub fn dump(&self) -> String {
        self.dump_with(TreeFormatOptions::default())
    }

    /// Render the menu with custom tree options.
    pub fn dump_with(&self, options: TreeFormatOptions) -> String {
        TreeFormatter::with_options(options).format_forest("Overflow menu", &self.entries)
    }
}

/// Builds an [`OverflowMenu`] from the overflowing items.
#[derive(Debug, Clone, Copy)]
pub struct OverflowMenuBuilder<'a> {
    config: &'a LayoutConfig,
}

impl<'a> OverflowMenuBuilder<'a> {
    /// Create a builder reading `config`.
    pub fn new(config: &'a LayoutConfig) -> Self {
        Self { config }
    }

    /// Build the menu for `overflow`, a list of top-level ids in logical
    /// order. Ids the registry does not know are skipped.
    ///
    /// A separator is never the first entry, and runs of separators collapse
    /// into one.
    pub fn build(&self, registry: &ItemRegistry, overflow: &[ItemId]) -> OverflowMenu {
        let _perf = PerfSpan::new(span_names::MENU_BUILD);

        let mut entries: Vec<OverflowMenuNode> = Vec::with_capacity(overflow.len());
        for &id in overflow {
            let Some(item) = registry.get(id) else {
                tracing::warn!(target: "flowbar::menu", %id, "overflow id is not registered, skipping");
                continue;
            };
            if item.is_separator() && entries.last().is_none_or(OverflowMenuNode::is_separator) {
                continue;
            }
            entries.push(self.node(item, true));
        }

        tracing::trace!(target: "flowbar::menu", entries = entries.len(), "overflow menu built");
        OverflowMenu {
            entries,
            theme: self.config.theme,
            open_on_hover: self.config.open_on_hover,
        }
    }

    fn node(&self, item: &ToolbarItem, top_level: bool) -> OverflowMenuNode {
        let entry = || MenuEntry {
            id: item.id(),
            label: item.label().to_string(),
            tooltip: item.tooltip().map(str::to_string),
            icon: IconSlot::resolve(item, &self.config.theme, top_level),
        };

        match item.kind() {
            ItemKind::Leaf => OverflowMenuNode::Entry(entry()),
            ItemKind::Separator => OverflowMenuNode::Separator(item.id()),
            ItemKind::MenuRoot(children) => OverflowMenuNode::SubMenu {
                entry: entry(),
                children: children.iter().map(|child| self.node(child, false)).collect(),
                open_on_hover: self.config.open_on_hover,
                dropdown_indicator: self.config.dropdown_indicator_shown,
            },
        }
    }
}

/// The separator that ends the visible row, if any.
///
/// A trailing separator has nothing after it to separate, so the
/// presentation layer hides it.
pub fn trailing_separator(registry: &ItemRegistry, visible: &[ItemId]) -> Option<ItemId> {
    let last = *visible.last()?;
    registry.get(last).filter(|item| item.is_separator()).map(ToolbarItem::id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowbar_core::TreeStyle;

    fn registry_with(items: Vec<ToolbarItem>) -> (ItemRegistry, Vec<ItemId>) {
        let mut registry = ItemRegistry::new();
        let ids = items
            .into_iter()
            .map(|item| registry.register(item, usize::MAX).unwrap())
            .collect();
        (registry, ids)
    }

    #[test]
    fn test_leaf_and_sub_menu() {
        let pdf = ToolbarItem::leaf("PDF");
        let pdf_id = pdf.id();
        let (registry, ids) = registry_with(vec![
            ToolbarItem::leaf("Open").with_tooltip("Open a file"),
            ToolbarItem::menu_root("Export", vec![pdf, ToolbarItem::leaf("PNG")]),
        ]);
        let config = LayoutConfig::default().with_open_on_hover(true);

        let menu = OverflowMenuBuilder::new(&config).build(&registry, &ids);
        assert_eq!(menu.entries().len(), 2);
        assert!(menu.open_on_hover());

        match &menu.entries()[0] {
            OverflowMenuNode::Entry(entry) => {
                assert_eq!(entry.label, "Open");
                assert_eq!(entry.tooltip.as_deref(), Some("Open a file"));
                assert_eq!(entry.icon, IconSlot::Empty);
            }
            other => panic!("expected entry, got {other:?}"),
        }

        match &menu.entries()[1] {
            OverflowMenuNode::SubMenu {
                entry,
                children,
                open_on_hover,
                dropdown_indicator,
            } => {
                assert_eq!(entry.label, "Export");
                assert_eq!(children.len(), 2);
                assert_eq!(children[0].id(), pdf_id);
                assert!(*open_on_hover);
                assert!(*dropdown_indicator);
            }
            other => panic!("expected sub-menu, got {other:?}"),
        }
        assert!(menu.contains(pdf_id));
    }

    #[test]
    fn test_icon_slots() {
        let (registry, ids) = registry_with(vec![
            ToolbarItem::leaf("With icon").with_icon(true),
            ToolbarItem::leaf("Without icon"),
            ToolbarItem::menu_root(
                "Root",
                vec![ToolbarItem::leaf("Nested"), ToolbarItem::leaf("Nested icon").with_icon(true)],
            ),
        ]);
        let slots = |theme: OverflowTheme| -> Vec<IconSlot> {
            let config = LayoutConfig::default().with_theme(theme);
            let menu = OverflowMenuBuilder::new(&config).build(&registry, &ids);
            let mut slots: Vec<IconSlot> = menu.entries().iter().filter_map(|n| n.entry()).map(|e| e.icon).collect();
            slots.extend(menu.entries()[2].children().iter().filter_map(|n| n.entry()).map(|e| e.icon));
            slots
        };

        assert_eq!(
            slots(OverflowTheme::default()),
            vec![IconSlot::Shown, IconSlot::Empty, IconSlot::Empty, IconSlot::Empty, IconSlot::Shown]
        );
        // Sub-menu children keep their icons.
        assert_eq!(
            slots(OverflowTheme { hide_icons: true, fixed_width_prefix: false }),
            vec![IconSlot::Hidden, IconSlot::Empty, IconSlot::Empty, IconSlot::Empty, IconSlot::Shown]
        );
        // The reserved slot only applies to top-level entries.
        assert_eq!(
            slots(OverflowTheme { hide_icons: false, fixed_width_prefix: true }),
            vec![IconSlot::Shown, IconSlot::Reserved, IconSlot::Reserved, IconSlot::Empty, IconSlot::Shown]
        );
    }

    #[test]
    fn test_hide_icons_leaves_registry_untouched() {
        let (registry, ids) = registry_with(vec![ToolbarItem::leaf("Save").with_icon(true)]);
        let config = LayoutConfig::default().with_theme(OverflowTheme {
            hide_icons: true,
            fixed_width_prefix: false,
        });
        let menu = OverflowMenuBuilder::new(&config).build(&registry, &ids);

        assert_eq!(menu.entries()[0].entry().unwrap().icon, IconSlot::Hidden);
        assert!(registry.get(ids[0]).unwrap().has_icon());
        assert!(menu.theme().hide_icons);
    }

    #[test]
    fn test_hide_icons_spares_sub_menu_children() {
        let (registry, ids) = registry_with(vec![ToolbarItem::menu_root(
            "Export",
            vec![ToolbarItem::leaf("PDF").with_icon(true)],
        )]);
        let config = LayoutConfig::default().with_theme(OverflowTheme {
            hide_icons: true,
            fixed_width_prefix: false,
        });
        let menu = OverflowMenuBuilder::new(&config).build(&registry, &ids);

        assert_eq!(menu.entries()[0].children()[0].entry().unwrap().icon, IconSlot::Shown);
    }

    #[test]
    fn test_separator_cleanup() {
        let (registry, ids) = registry_with(vec![
            ToolbarItem::separator(),
            ToolbarItem::leaf("A"),
            ToolbarItem::separator(),
            ToolbarItem::separator(),
            ToolbarItem::leaf("B"),
        ]);
        let config = LayoutConfig::default();
        let menu = OverflowMenuBuilder::new(&config).build(&registry, &ids);

        let kinds: Vec<bool> = menu.entries().iter().map(OverflowMenuNode::is_separator).collect();
        assert_eq!(kinds, vec![false, true, false]);
    }

    #[test]
    fn test_unknown_ids_skipped() {
        let (registry, ids) = registry_with(vec![ToolbarItem::leaf("A")]);
        let config = LayoutConfig::default();
        let menu = OverflowMenuBuilder::new(&config).build(&registry, &[ItemId::next(), ids[0]]);
        assert_eq!(menu.entries().len(), 1);
    }

    #[test]
    fn test_trailing_separator() {
        let (registry, ids) = registry_with(vec![ToolbarItem::leaf("A"), ToolbarItem::separator()]);
        assert_eq!(trailing_separator(&registry, &ids), Some(ids[1]));
        assert_eq!(trailing_separator(&registry, &ids[..1]), None);
        assert_eq!(trailing_separator(&registry, &[]), None);
    }

    #[test]
    fn test_dump() {
        let (registry, ids) = registry_with(vec![
            ToolbarItem::leaf("Open"),
            ToolbarItem::menu_root("Export", vec![ToolbarItem::leaf("PDF")]),
        ]);
        let config = LayoutConfig::default();
        let dump = OverflowMenuBuilder::new(&config).build(&registry, &ids).dump();

        assert!(dump.starts_with("Overflow menu (2 entries):"));
        assert!(dump.contains("Export >"));
        assert!(dump.contains("PDF"));

        let empty = OverflowMenu::default().dump();
        assert!(empty.contains("(empty)"));

        let ascii = OverflowMenuBuilder::new(&config).build(&registry, &ids).dump_with(TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..TreeFormatOptions::minimal()
        });
        assert!(ascii.contains("`-- Export >"));
        assert!(!ascii.contains('['));
    }
}
