//! Global style attributes of the dashboard.
//!
//! Style strings are SGR parameter lists (`1;33` is bold yellow) applied
//! through [`DashboardStyle::ansi`]; turning `ansi` off strips every style
//! without touching the stored values.

use unicode_width::UnicodeWidthStr;

use super::{Attribute, is_non_negative, is_sgr};
use crate::renderer::ansi;

/// Primary dividers separate module blocks, secondary ones sub-sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Primary,
    Secondary,
}

/// Values of every global style attribute.
///
/// Construct with [`Default`], which applies the declared defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStyle {
    pub ansi: bool,
    pub syntax_highlighting: String,
    pub discard_scrollback: bool,
    pub compact_values: bool,
    pub max_value_length: i64,
    pub value_truncation_string: String,
    pub prompt: String,
    pub prompt_running: String,
    pub prompt_not_running: String,
    pub omit_divider: bool,
    pub omit_inactive_dividers: bool,
    pub divider_fill_char_primary: String,
    pub divider_fill_char_secondary: String,
    pub divider_fill_style_primary: String,
    pub divider_fill_style_secondary: String,
    pub divider_label_style_on_primary: String,
    pub divider_label_style_on_secondary: String,
    pub divider_label_style_off_primary: String,
    pub divider_label_style_off_secondary: String,
    pub divider_label_skip: i64,
    pub divider_label_margin: i64,
    pub divider_label_align_right: bool,
    pub style_selected_1: String,
    pub style_selected_2: String,
    pub style_low: String,
    pub style_high: String,
    pub style_error: String,
    pub style_critical: String,
}

/// Fill characters must occupy exactly one terminal cell.
fn is_single_cell(value: &super::Value) -> bool {
    UnicodeWidthStr::width(value.as_str()) == 1
}

macro_rules! sgr {
    ($field:ident, $default:expr, $doc:expr) => {
        Attribute::new(
            stringify!($field),
            $default,
            |s: &DashboardStyle| s.$field.clone().into(),
            |s, v| s.$field = v.as_str().to_string(),
        )
        .doc($doc)
        .check(is_sgr)
    };
}

impl DashboardStyle {
    /// The declared attribute table.
    pub fn attributes() -> Vec<Attribute<Self>> {
        vec![
            Attribute::new("ansi", true, |s: &Self| s.ansi.into(), |s, v| s.ansi = v.as_bool())
                .doc("Control the ANSI output of the dashboard."),
            Attribute::new(
                "syntax_highlighting",
                "monokai",
                |s: &Self| s.syntax_highlighting.clone().into(),
                |s, v| s.syntax_highlighting = v.as_str().to_string(),
            )
            .doc("Syntax highlighting style name handed to modules, empty disables it."),
            Attribute::new(
                "discard_scrollback",
                true,
                |s: &Self| s.discard_scrollback.into(),
                |s, v| s.discard_scrollback = v.as_bool(),
            )
            .doc("Discard the scrollback buffer at each redraw."),
            Attribute::new(
                "compact_values",
                true,
                |s: &Self| s.compact_values.into(),
                |s, v| s.compact_values = v.as_bool(),
            )
            .doc("Display complex values in a single line."),
            Attribute::new(
                "max_value_length",
                100i64,
                |s: &Self| s.max_value_length.into(),
                |s, v| s.max_value_length = v.as_int(),
            )
            .doc("Maximum length of displayed values before truncation, 0 disables it.")
            .check(is_non_negative),
            Attribute::new(
                "value_truncation_string",
                "…",
                |s: &Self| s.value_truncation_string.clone().into(),
                |s, v| s.value_truncation_string = v.as_str().to_string(),
            )
            .doc("String to use to mark value truncation."),
            Attribute::new("prompt", "{status}", |s: &Self| s.prompt.clone().into(), |s, v| {
                s.prompt = v.as_str().to_string()
            })
            .doc("Prompt template, {status} is replaced by the running or not-running prompt."),
            Attribute::new(
                "prompt_running",
                r"\[\e[1;35m\]>>>\[\e[0m\]",
                |s: &Self| s.prompt_running.clone().into(),
                |s, v| s.prompt_running = v.as_str().to_string(),
            )
            .doc("Prompt status used while the target program is alive."),
            Attribute::new(
                "prompt_not_running",
                r"\[\e[90m\]>>>\[\e[0m\]",
                |s: &Self| s.prompt_not_running.clone().into(),
                |s, v| s.prompt_not_running = v.as_str().to_string(),
            )
            .doc("Prompt status used when no target program is alive."),
            Attribute::new(
                "omit_divider",
                false,
                |s: &Self| s.omit_divider.into(),
                |s, v| s.omit_divider = v.as_bool(),
            )
            .doc("Omit the divider in external outputs when only one module is displayed."),
            Attribute::new(
                "omit_inactive_dividers",
                false,
                |s: &Self| s.omit_inactive_dividers.into(),
                |s, v| s.omit_inactive_dividers = v.as_bool(),
            )
            .doc("Omit the divider of modules without lines in external outputs."),
            Attribute::new(
                "divider_fill_char_primary",
                "─",
                |s: &Self| s.divider_fill_char_primary.clone().into(),
                |s, v| s.divider_fill_char_primary = v.as_str().to_string(),
            )
            .doc("Filler around the label for primary dividers.")
            .check(is_single_cell),
            Attribute::new(
                "divider_fill_char_secondary",
                "─",
                |s: &Self| s.divider_fill_char_secondary.clone().into(),
                |s, v| s.divider_fill_char_secondary = v.as_str().to_string(),
            )
            .doc("Filler around the label for secondary dividers.")
            .check(is_single_cell),
            sgr!(divider_fill_style_primary, "36", "Style for `divider_fill_char_primary`."),
            sgr!(divider_fill_style_secondary, "1;30", "Style for `divider_fill_char_secondary`."),
            sgr!(divider_label_style_on_primary, "1;33", "Label style for non-empty primary dividers."),
            sgr!(divider_label_style_on_secondary, "0", "Label style for non-empty secondary dividers."),
            sgr!(divider_label_style_off_primary, "33", "Label style for empty primary dividers."),
            sgr!(divider_label_style_off_secondary, "1;30", "Label style for empty secondary dividers."),
            Attribute::new(
                "divider_label_skip",
                3i64,
                |s: &Self| s.divider_label_skip.into(),
                |s, v| s.divider_label_skip = v.as_int(),
            )
            .doc("Gap between the aligning border and the label.")
            .check(is_non_negative),
            Attribute::new(
                "divider_label_margin",
                1i64,
                |s: &Self| s.divider_label_margin.into(),
                |s, v| s.divider_label_margin = v.as_int(),
            )
            .doc("Number of spaces around the label.")
            .check(is_non_negative),
            Attribute::new(
                "divider_label_align_right",
                false,
                |s: &Self| s.divider_label_align_right.into(),
                |s, v| s.divider_label_align_right = v.as_bool(),
            )
            .doc("Label alignment flag."),
            sgr!(style_selected_1, "1;32", "Style for selected items."),
            sgr!(style_selected_2, "32", "Style for selected items, secondary."),
            sgr!(style_low, "90", "Style for unimportant items."),
            sgr!(style_high, "1;37", "Style for important items."),
            sgr!(style_error, "31", "Style for error messages."),
            sgr!(style_critical, "0;41", "Style for critical errors."),
        ]
    }

    /// Wrap `text` in the SGR `style`, unless ANSI output is disabled.
    pub fn ansi(&self, text: &str, style: &str) -> String {
        if self.ansi && !style.is_empty() {
            ansi::styled(text, style)
        } else {
            text.to_string()
        }
    }

    pub fn fill_char(&self, tier: Tier) -> &str {
        match tier {
            Tier::Primary => &self.divider_fill_char_primary,
            Tier::Secondary => &self.divider_fill_char_secondary,
        }
    }

    pub fn fill_style(&self, tier: Tier) -> &str {
        match tier {
            Tier::Primary => &self.divider_fill_style_primary,
            Tier::Secondary => &self.divider_fill_style_secondary,
        }
    }

    /// Label style for a divider, depending on whether its block has content.
    pub fn label_style(&self, tier: Tier, active: bool) -> &str {
        match (tier, active) {
            (Tier::Primary, true) => &self.divider_label_style_on_primary,
            (Tier::Primary, false) => &self.divider_label_style_off_primary,
            (Tier::Secondary, true) => &self.divider_label_style_on_secondary,
            (Tier::Secondary, false) => &self.divider_label_style_off_secondary,
        }
    }

    /// Truncate a value to `max_value_length` visible characters.
    pub fn truncate_value(&self, value: &str) -> String {
        let max = self.max_value_length.max(0) as usize;
        if max == 0 || value.chars().count() <= max {
            return value.to_string();
        }
        let mut out: String = value.chars().take(max).collect();
        out.push_str(&self.value_truncation_string);
        out
    }
}

impl Default for DashboardStyle {
    fn default() -> Self {
        let mut style = Self {
            ansi: false,
            syntax_highlighting: String::new(),
            discard_scrollback: false,
            compact_values: false,
            max_value_length: 0,
            value_truncation_string: String::new(),
            prompt: String::new(),
            prompt_running: String::new(),
            prompt_not_running: String::new(),
            omit_divider: false,
            omit_inactive_dividers: false,
            divider_fill_char_primary: String::new(),
            divider_fill_char_secondary: String::new(),
            divider_fill_style_primary: String::new(),
            divider_fill_style_secondary: String::new(),
            divider_label_style_on_primary: String::new(),
            divider_label_style_on_secondary: String::new(),
            divider_label_style_off_primary: String::new(),
            divider_label_style_off_secondary: String::new(),
            divider_label_skip: 0,
            divider_label_margin: 0,
            divider_label_align_right: false,
            style_selected_1: String::new(),
            style_selected_2: String::new(),
            style_low: String::new(),
            style_high: String::new(),
            style_error: String::new(),
            style_critical: String::new(),
        };
        super::initialize(&mut style, &Self::attributes());
        style
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{self, Value};

    #[test]
    fn test_defaults_applied() {
        let style = DashboardStyle::default();
        assert!(style.ansi);
        assert_eq!(style.divider_label_skip, 3);
        assert_eq!(style.divider_label_margin, 1);
        assert_eq!(style.divider_fill_char_primary, "─");
        assert_eq!(style.style_error, "31");
        assert_eq!(style.prompt, "{status}");
    }

    #[test]
    fn test_every_default_is_valid() {
        for attr in DashboardStyle::attributes() {
            assert!(attr.validate(attr.default.clone()).is_ok(), "{}", attr.key);
        }
    }

    #[test]
    fn test_ansi_toggle() {
        let mut style = DashboardStyle::default();
        assert_eq!(style.ansi("x", "31"), "\x1b[31mx\x1b[0m");
        style.ansi = false;
        assert_eq!(style.ansi("x", "31"), "x");
    }

    #[test]
    fn test_fill_char_must_be_single() {
        let mut style = DashboardStyle::default();
        let table = DashboardStyle::attributes();
        assert!(style::set(&mut style, &table, "divider_fill_char_primary", "'=='").is_err());
        style::set(&mut style, &table, "divider_fill_char_primary", "'='").unwrap();
        assert_eq!(style.fill_char(Tier::Primary), "=");
    }

    #[test]
    fn test_wide_fill_char_rejected() {
        let mut style = DashboardStyle::default();
        let table = DashboardStyle::attributes();
        assert!(style::set(&mut style, &table, "divider_fill_char_primary", "'日'").is_err());
        assert!(style::set(&mut style, &table, "divider_fill_char_secondary", "''").is_err());
        assert_eq!(style.fill_char(Tier::Primary), "─");
    }

    #[test]
    fn test_style_must_be_sgr() {
        let mut style = DashboardStyle::default();
        let table = DashboardStyle::attributes();
        assert!(style::set(&mut style, &table, "style_low", "'grey'").is_err());
        assert_eq!(
            style::get(&style, &table, "style_low").unwrap(),
            Value::Str("90".into())
        );
    }

    #[test]
    fn test_truncate_value() {
        let mut style = DashboardStyle::default();
        style.max_value_length = 3;
        assert_eq!(style.truncate_value("abcdef"), "abc…");
        assert_eq!(style.truncate_value("abc"), "abc");
        style.max_value_length = 0;
        assert_eq!(style.truncate_value("abcdef"), "abcdef");
    }
}
