//! Error types for the toolbar engine.

use crate::item::ItemId;

/// Result type alias for toolbar operations.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Errors that can occur while configuring or mutating a toolbar.
///
/// Every variant except [`LayoutError::MenuRootIntegrity`] and
/// [`LayoutError::PlanMismatch`] is returned to the caller of the offending
/// operation with the toolbar state left untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    /// An item with this id is already registered (at any nesting depth).
    #[error("item {0} is already registered")]
    DuplicateItem(ItemId),

    /// No item with this id is registered.
    #[error("item {0} is not registered")]
    UnknownItem(ItemId),

    /// A configuration value was rejected.
    #[error("invalid value for option '{option}': {message}")]
    InvalidConfig {
        option: &'static str,
        message: String,
    },

    /// A width was negative or not finite.
    #[error("invalid width {value}: widths must be finite and non-negative")]
    InvalidWidth { value: f32 },

    /// A sub-item was attached to an item that does not own a sub-menu.
    #[error("item {0} is not a menu root")]
    NotAMenuRoot(ItemId),

    /// A plan split a menu root's subtree across the row and the overflow menu.
    #[error("menu root {root} was split across the visible row and the overflow menu")]
    MenuRootIntegrity { root: ItemId },

    /// A plan dropped or repeated a registered top-level item.
    #[error("plan does not place item {0} exactly once")]
    PlanMismatch(ItemId),

    /// A configuration document could not be parsed.
    #[error("failed to parse layout configuration: {0}")]
    Config(String),
}

impl LayoutError {
    /// Create a configuration error.
    pub fn invalid_config(option: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            option,
            message: message.into(),
        }
    }
}

/// Validate a pixel width coming in from the measurement side.
pub(crate) fn check_width(value: f32) -> Result<f32> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(LayoutError::InvalidWidth { value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_width() {
        assert_eq!(check_width(0.0), Ok(0.0));
        assert_eq!(check_width(12.5), Ok(12.5));
        assert!(matches!(check_width(-1.0), Err(LayoutError::InvalidWidth { .. })));
        assert!(check_width(f32::NAN).is_err());
        assert!(check_width(f32::INFINITY).is_err());
    }

    #[test]
    fn test_error_messages() {
        let err = LayoutError::invalid_config("updateDebounceDelay", "must not be negative");
        assert_eq!(
            err.to_string(),
            "invalid value for option 'updateDebounceDelay': must not be negative"
        );

        let id = ItemId::from_raw(7).unwrap();
        assert_eq!(
            LayoutError::PlanMismatch(id).to_string(),
            "plan does not place item #7 exactly once"
        );
    }
}
