//! Divider composition.
//!
//! A divider is a full-width rule, optionally carrying a label:
//!
//! ```text
//! ─── Stack ──────────────────────────────
//! ```
//!
//! It is a pure function of the style attributes and the target width and
//! is recomputed on every render.

use super::width::visible_width;
use crate::style::{DashboardStyle, Tier};

/// Parameters of one divider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DividerSpec<'a> {
    pub width: usize,
    pub label: Option<&'a str>,
    pub tier: Tier,
    /// Inactive dividers mark blocks that produced no lines.
    pub active: bool,
}

impl<'a> DividerSpec<'a> {
    /// Unlabelled full-width rule.
    pub fn rule(width: usize, tier: Tier) -> Self {
        Self {
            width,
            label: None,
            tier,
            active: true,
        }
    }

    pub fn labelled(width: usize, label: &'a str, tier: Tier, active: bool) -> Self {
        Self {
            width,
            label: Some(label),
            tier,
            active,
        }
    }

    /// Compose the divider text.
    pub fn render(&self, style: &DashboardStyle) -> String {
        let fill = style.fill_char(self.tier);
        let fill_style = style.fill_style(self.tier);

        let label = match self.label {
            Some(label) if !label.is_empty() => label,
            _ => return style.ansi(&fill.repeat(self.width), fill_style),
        };

        // Both are bounded by the width, whatever the attributes hold.
        let skip = clamp(style.divider_label_skip, self.width);
        let margin = clamp(style.divider_label_margin, self.width);
        let used = visible_width(label)
            .saturating_add(skip)
            .saturating_add(margin.saturating_mul(2));
        let remainder = self.width.saturating_sub(used);

        let mut before = style.ansi(&fill.repeat(skip), fill_style);
        let middle = style.ansi(label, style.label_style(self.tier, self.active));
        let mut after = style.ansi(&fill.repeat(remainder), fill_style);
        if style.divider_label_align_right {
            std::mem::swap(&mut before, &mut after);
        }

        let gap = " ".repeat(margin);
        format!("{before}{gap}{middle}{gap}{after}")
    }
}

fn clamp(value: i64, width: usize) -> usize {
    usize::try_from(value.max(0)).map_or(width, |v| v.min(width))
}

/// Shorthand for a labelled divider.
pub fn divider(style: &DashboardStyle, width: usize, label: &str, tier: Tier, active: bool) -> String {
    DividerSpec::labelled(width, label, tier, active).render(style)
}

// =============================================================================
// Tests
// =============================================================================
