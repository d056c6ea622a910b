//! Layout Manager - ordering and visibility of registry entries.
//!
//! A layout is a list of directives of the form `[!]name`. Applying one
//! moves the named modules to the front in directive order and enables
//! them, unless negated. Modules not mentioned end up disabled at the tail,
//! keeping their relative order.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::registry::Registry;
use crate::error::LayoutError;
use crate::types::OutputTarget;

/// Marks a directive as "placed but disabled".
pub const NEGATION: char = '!';

/// Split a directive into module name and enabled flag.
pub fn parse_directive(directive: &str) -> (&str, bool) {
    match directive.strip_prefix(NEGATION) {
        Some(name) => (name, false),
        None => (directive, true),
    }
}

/// One row of the current layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutEntry {
    pub name: String,
    pub enabled: bool,
    /// Module-level override, if any.
    pub output: Option<PathBuf>,
    /// Where the module is written once overrides are resolved.
    pub target: OutputTarget,
}

impl Registry {
    /// Reorder and toggle modules from a directive list.
    ///
    /// The whole batch is validated first; on the first unknown or repeated
    /// name nothing is changed.
    pub fn apply_layout<S: AsRef<str>>(&mut self, directives: &[S]) -> Result<(), LayoutError> {
        let parsed: Vec<(&str, bool)> = directives
            .iter()
            .map(|d| parse_directive(d.as_ref()))
            .collect();

        let mut seen = HashSet::new();
        for &(name, _) in &parsed {
            if !self.contains(name) {
                return Err(LayoutError::UnknownModule(name.to_string()));
            }
            if !seen.insert(name) {
                return Err(LayoutError::DuplicateModule(name.to_string()));
            }
        }

        for module in &mut self.modules {
            module.enabled = false;
        }

        let mut last = 0;
        for (name, enabled) in parsed {
            // Placed modules sit before `last`: a repeat is not found here.
            let Some(offset) = self.modules[last..].iter().position(|m| m.name == name) else {
                return Err(LayoutError::DuplicateModule(name.to_string()));
            };
            let module = self.modules.remove(last + offset);
            self.modules.insert(last, module);
            self.modules[last].enabled = enabled;
            last += 1;
        }

        tracing::debug!(layout = ?self.names(), "layout applied");
        Ok(())
    }

    /// Alphabetical order, everything enabled.
    pub fn reset_layout(&mut self) {
        self.modules.sort_by(|a, b| a.name.cmp(&b.name));
        for module in &mut self.modules {
            module.enabled = true;
        }
    }

    /// Current layout in registry order.
    pub fn layout(&self, dashboard_output: Option<&Path>) -> Vec<LayoutEntry> {
        self.modules
            .iter()
            .map(|m| LayoutEntry {
                name: m.name.clone(),
                enabled: m.enabled,
                output: m.output.clone(),
                target: OutputTarget::resolve(m.output.as_deref(), dashboard_output),
            })
            .collect()
    }

    /// Directive list reproducing the current layout.
    pub fn directives(&self) -> Vec<String> {
        self.modules
            .iter()
            .map(|m| {
                if m.enabled {
                    m.name.clone()
                } else {
                    format!("{NEGATION}{}", m.name)
                }
            })
            .collect()
    }
}

// =============================================================================
// Tests
// =============================================================================
