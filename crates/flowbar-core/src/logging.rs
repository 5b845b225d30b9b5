//! Logging and debugging facilities for Flowbar.
//!
//! This module provides:
//! - Span names for the engine's performance spans
//! - Debug visualization for trees (used for overflow menus)
//! - Performance tracing hooks for profiling
//!
//! # Tracing Integration
//!
//! Flowbar uses the `tracing` crate for instrumentation. To see logs, install
//! a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("flowbar=debug")
//!         .init();
//! }
//! ```
//!
//! # Debug Visualization
//!
//! Any type implementing [`DebugTree`] can be rendered with [`TreeFormatter`]:
//!
//! ```
//! use flowbar_core::logging::{DebugTree, TreeFormatter};
//!
//! struct Node(&'static str, Vec<Node>);
//!
//! impl DebugTree for Node {
//!     fn label(&self) -> String {
//!         self.0.to_string()
//!     }
//!
//!     fn children(&self) -> Vec<&Self> {
//!         self.1.iter().collect()
//!     }
//! }
//!
//! let tree = Node("root", vec![Node("a", vec![]), Node("b", vec![])]);
//! let output = TreeFormatter::new().format(&tree);
//! assert!(output.contains("a"));
//! ```

use std::fmt::Write as FmtWrite;

/// Span names used throughout Flowbar for tracing.
pub mod span_names {
    /// A full re-plan of a toolbar.
    pub const REPLAN: &str = "flowbar::replan";
    /// Overflow menu rebuild.
    pub const MENU_BUILD: &str = "flowbar::menu_build";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact dash-prefixed representation.
    Compact,
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to append each node's detail string.
    pub show_details: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_details: true,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Create options for minimal output.
    pub fn minimal() -> Self {
        Self {
            show_details: false,
            ..Default::default()
        }
    }
}

/// A node that can be rendered by [`TreeFormatter`].
pub trait DebugTree {
    /// Display name of this node.
    fn label(&self) -> String;

    /// Extra information printed after the label, such as an id.
    fn detail(&self) -> Option<String> {
        None
    }

    /// Child nodes in display order.
    fn children(&self) -> Vec<&Self>;
}

/// Debug utility for visualizing trees.
#[derive(Debug, Clone, Default)]
pub struct TreeFormatter {
    options: TreeFormatOptions,
}

impl TreeFormatter {
    /// Create a formatter with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a formatter with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format a single tree.
    pub fn format<T: DebugTree>(&self, root: &T) -> String {
        let mut output = String::new();
        self.format_into(root, 0, true, &mut output);
        output
    }

    /// Format a forest under a heading line.
    pub fn format_forest<T: DebugTree>(&self, heading: &str, roots: &[T]) -> String {
        let mut output = String::new();
        // Writing to a String cannot fail.
        let _ = writeln!(output, "{heading} ({} entries):", roots.len());
        if roots.is_empty() {
            output.push_str("  (empty)\n");
        }
        let count = roots.len();
        for (i, root) in roots.iter().enumerate() {
            self.format_into(root, 1, i + 1 == count, &mut output);
        }
        output
    }

    fn format_into<T: DebugTree>(&self, node: &T, depth: usize, is_last: bool, output: &mut String) {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return;
        }

        output.push_str(&self.build_prefix(depth, is_last));
        output.push_str(&node.label());
        if self.options.show_details
            && let Some(detail) = node.detail()
        {
            let _ = write!(output, " [{detail}]");
        }
        output.push('\n');

        let children = node.children();
        let count = children.len();
        for (i, child) in children.into_iter().enumerate() {
            self.format_into(child, depth + 1, i + 1 == count, output);
        }
    }

    /// Build the prefix string for a tree node.
    fn build_prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }

        let (branch, tee, corner) = match self.options.style {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500}", "\u{2514}\u{2500}\u{2500}"),
            TreeStyle::Compact => ("", "-", "-"),
        };

        let mut prefix = String::new();
        for _ in 0..(depth - 1) {
            prefix.push_str(branch);
            prefix.extend(std::iter::repeat_n(' ', self.options.indent_size));
        }
        prefix.push_str(if is_last { corner } else { tee });
        prefix.push(' ');
        prefix
    }
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "flowbar::perf", "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Node {
        name: &'static str,
        children: Vec<Node>,
    }

    impl Node {
        fn leaf(name: &'static str) -> Self {
            Self { name, children: Vec::new() }
        }
    }

    impl DebugTree for Node {
        fn label(&self) -> String {
            self.name.to_string()
        }

        fn detail(&self) -> Option<String> {
            Some(format!("{} children", self.children.len()))
        }

        fn children(&self) -> Vec<&Self> {
            self.children.iter().collect()
        }
    }

    fn sample() -> Node {
        Node {
            name: "menu",
            children: vec![
                Node::leaf("open"),
                Node {
                    name: "export",
                    children: vec![Node::leaf("pdf")],
                },
            ],
        }
    }

    #[test]
    fn test_tree_format_hierarchy() {
        let output = TreeFormatter::new().format(&sample());
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "menu [2 children]");
        assert!(lines[1].starts_with("\u{251c}"));
        assert!(lines[2].starts_with("\u{2514}"));
        assert!(lines[3].contains("pdf"));
    }

    #[test]
    fn test_tree_format_minimal_ascii() {
        let options = TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..TreeFormatOptions::minimal()
        };
        let output = TreeFormatter::with_options(options).format(&sample());

        assert!(!output.contains("children"));
        assert!(output.contains("+-- open"));
        assert!(output.contains("`-- export"));
    }

    #[test]
    fn test_tree_format_max_depth() {
        let options = TreeFormatOptions {
            max_depth: Some(1),
            ..Default::default()
        };
        let output = TreeFormatter::with_options(options).format(&sample());
        assert!(output.contains("export"));
        assert!(!output.contains("pdf"));
    }

    #[test]
    fn test_format_empty_forest() {
        let output = TreeFormatter::new().format_forest::<Node>("Overflow", &[]);
        assert!(output.contains("Overflow (0 entries)"));
        assert!(output.contains("(empty)"));
    }

    #[test]
    fn test_perf_span() {
        // Just ensure it doesn't panic without a subscriber.
        let _span = PerfSpan::new("test_operation");
    }
}
