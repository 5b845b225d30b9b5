//! Per-toolbar configuration.
//!
//! [`LayoutConfig`] can be built in code with the `with_*` methods or loaded
//! from TOML or JSON. Option names in documents are camelCase:
//!
//! ```toml
//! reverseCollapseOrder = true
//! updateDebounceDelay = 150
//! openOnHover = false
//! dropdownIndicatorShown = true
//! overflowButtonWidth = 40.0
//! itemGap = 4.0
//!
//! [theme]
//! fixedWidthPrefix = true
//! hideIcons = false
//! ```
//!
//! Every loader validates the result; a negative delay or width is rejected
//! with [`LayoutError::InvalidConfig`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};

/// Default width reserved for the overflow button.
pub const DEFAULT_OVERFLOW_BUTTON_WIDTH: f32 = 36.0;

/// Presentation flags for the overflow menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverflowTheme {
    /// Reserve a fixed-width leading slot so entries without an icon align
    /// with entries that have one.
    pub fixed_width_prefix: bool,
    /// Suppress icons in the overflow menu.
    pub hide_icons: bool,
}

impl OverflowTheme {
    /// Variant name for [`OverflowTheme::fixed_width_prefix`].
    pub const FIXED_WIDTH_PREFIX: &'static str = "fixed-width-prefix";
    /// Variant name for [`OverflowTheme::hide_icons`].
    pub const HIDE_ICONS: &'static str = "hide-icons";

    /// Names of the enabled variants, as applied to the overflow surface.
    pub fn variant_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.fixed_width_prefix {
            names.push(Self::FIXED_WIDTH_PREFIX);
        }
        if self.hide_icons {
            names.push(Self::HIDE_ICONS);
        }
        names
    }

    /// Parse variant names; unknown names are rejected.
    pub fn from_variant_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let mut theme = Self::default();
        for name in names {
            match name.trim() {
                Self::FIXED_WIDTH_PREFIX => theme.fixed_width_prefix = true,
                Self::HIDE_ICONS => theme.hide_icons = true,
                "" => {}
                other => {
                    return Err(LayoutError::invalid_config(
                        "theme",
                        format!("unknown variant '{other}'"),
                    ));
                }
            }
        }
        Ok(theme)
    }
}

/// Options read by the planner and the overflow menu builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawLayoutConfig")]
pub struct LayoutConfig {
    /// Collapse items from the start of the row instead of the end.
    pub reverse_collapse_order: bool,
    /// Open overflow sub-menus on hover instead of click.
    pub open_on_hover: bool,
    /// Show a dropdown indicator on sub-menu entries.
    pub dropdown_indicator_shown: bool,
    /// Quiet period before a re-plan, in milliseconds. Zero re-plans
    /// synchronously.
    #[serde(rename = "updateDebounceDelay")]
    pub debounce_delay_ms: u64,
    /// Width reserved for the overflow button when anything overflows.
    pub overflow_button_width: f32,
    /// Horizontal gap between items in the row.
    pub item_gap: f32,
    /// Kept last so TOML output places the table after plain values.
    pub theme: OverflowTheme,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            reverse_collapse_order: false,
            open_on_hover: false,
            dropdown_indicator_shown: true,
            debounce_delay_ms: 0,
            theme: OverflowTheme::default(),
            overflow_button_width: DEFAULT_OVERFLOW_BUTTON_WIDTH,
            item_gap: 0.0,
        }
    }
}

impl LayoutConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collapse from the start of the row instead of the end.
    pub fn with_reverse_collapse_order(mut self, reverse: bool) -> Self {
        self.reverse_collapse_order = reverse;
        self
    }

    /// Open sub-menus on hover.
    pub fn with_open_on_hover(mut self, open_on_hover: bool) -> Self {
        self.open_on_hover = open_on_hover;
        self
    }

    /// Show or hide the dropdown indicator on menu roots.
    pub fn with_dropdown_indicator_shown(mut self, shown: bool) -> Self {
        self.dropdown_indicator_shown = shown;
        self
    }

    /// Set the quiet period before a re-plan, in milliseconds.
    pub fn with_debounce_delay_ms(mut self, delay_ms: u64) -> Self {
        self.debounce_delay_ms = delay_ms;
        self
    }

    /// Set the overflow theme flags.
    pub fn with_theme(mut self, theme: OverflowTheme) -> Self {
        self.theme = theme;
        self
    }

    /// Set the reserved width of the overflow button.
    pub fn with_overflow_button_width(mut self, width: f32) -> Self {
        self.overflow_button_width = width;
        self
    }

    /// Set the gap between adjacent items.
    pub fn with_item_gap(mut self, gap: f32) -> Self {
        self.item_gap = gap;
        self
    }

    /// The debounce delay as a [`Duration`].
    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_delay_ms)
    }

    /// Check every option.
    pub fn validate(&self) -> Result<()> {
        check_length("overflowButtonWidth", self.overflow_button_width)?;
        check_length("itemGap", self.item_gap)?;
        Ok(())
    }

    /// Load and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let raw: RawLayoutConfig = toml::from_str(source).map_err(|e| LayoutError::Config(e.to_string()))?;
        Self::try_from(raw)
    }

    /// Load and validate a JSON document.
    pub fn from_json_str(source: &str) -> Result<Self> {
        let raw: RawLayoutConfig =
            serde_json::from_str(source).map_err(|e| LayoutError::Config(e.to_string()))?;
        Self::try_from(raw)
    }

    /// Render as a TOML document.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| LayoutError::Config(e.to_string()))
    }
}

/// Convert a delay coming from a signed input into milliseconds.
pub(crate) fn check_delay(delay_ms: i64) -> Result<u64> {
    u64::try_from(delay_ms).map_err(|_| {
        LayoutError::invalid_config(
            "updateDebounceDelay",
            format!("delay must not be negative, got {delay_ms}"),
        )
    })
}

fn check_length(option: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(LayoutError::invalid_config(
            option,
            format!("expected a finite, non-negative width, got {value}"),
        ))
    }
}

/// Wire form of [`LayoutConfig`], with a signed delay so negative values
/// reach validation instead of failing to parse.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawLayoutConfig {
    reverse_collapse_order: bool,
    open_on_hover: bool,
    dropdown_indicator_shown: bool,
    update_debounce_delay: i64,
    theme: OverflowTheme,
    overflow_button_width: f32,
    item_gap: f32,
}

impl Default for RawLayoutConfig {
    fn default() -> Self {
        let defaults = LayoutConfig::default();
        Self {
            reverse_collapse_order: defaults.reverse_collapse_order,
            open_on_hover: defaults.open_on_hover,
            dropdown_indicator_shown: defaults.dropdown_indicator_shown,
            update_debounce_delay: 0,
            theme: defaults.theme,
            overflow_button_width: defaults.overflow_button_width,
            item_gap: defaults.item_gap,
        }
    }
}

impl TryFrom<RawLayoutConfig> for LayoutConfig {
    type Error = LayoutError;

    fn try_from(raw: RawLayoutConfig) -> Result<Self> {
        let config = Self {
            reverse_collapse_order: raw.reverse_collapse_order,
            open_on_hover: raw.open_on_hover,
            dropdown_indicator_shown: raw.dropdown_indicator_shown,
            debounce_delay_ms: check_delay(raw.update_debounce_delay)?,
            theme: raw.theme,
            overflow_button_width: raw.overflow_button_width,
            item_gap: raw.item_gap,
        };
        config.validate()?;
        Ok(config)
    }
}
