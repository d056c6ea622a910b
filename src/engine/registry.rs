//! Module Registry - discovery and instantiation of modules.
//!
//! Manages the lifecycle of module descriptors:
//! - Static registration list (no runtime scanning)
//! - One instance per module type, created once at startup
//! - Stable ordered list carrying enabled flags and output overrides
//!
//! Descriptors are never added or removed after construction; the layout
//! manager only reorders and toggles them.

use std::collections::HashSet;
use std::path::PathBuf;

use super::module::{ModuleFactory, ModuleInstance};

// =============================================================================
// Module Descriptor
// =============================================================================

/// A registered module and its per-session state.
pub struct ModuleDescriptor {
    /// Unique name derived from the implementing type.
    pub name: String,
    pub enabled: bool,
    /// Destination override; `None` falls back to the dashboard's.
    pub output: Option<PathBuf>,
    pub instance: Box<dyn ModuleInstance>,
}

impl ModuleDescriptor {
    pub fn doc(&self) -> &str {
        self.instance.doc()
    }
}

impl std::fmt::Debug for ModuleDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleDescriptor")
            .field("name", &self.name)
            .field("enabled", &self.enabled)
            .field("output", &self.output)
            .finish()
    }
}

// =============================================================================
// Discovery
// =============================================================================

/// Order the registration list by derived name.
///
/// Later entries whose name was already seen are dropped silently, so
/// registering the same type twice is harmless.
pub fn discover(factories: Vec<ModuleFactory>) -> Vec<ModuleFactory> {
    let mut seen = HashSet::new();
    let mut unique: Vec<ModuleFactory> = factories
        .into_iter()
        .filter(|factory| {
            let fresh = seen.insert(factory.name().to_string());
            if !fresh {
                tracing::debug!(name = factory.name(), "skipping duplicate module registration");
            }
            fresh
        })
        .collect();
    unique.sort_by(|a, b| a.name().cmp(b.name()));
    unique
}

/// Build one enabled, console-bound descriptor per factory.
pub fn instantiate(factories: Vec<ModuleFactory>) -> Vec<ModuleDescriptor> {
    factories
        .into_iter()
        .map(|factory| {
            tracing::debug!(name = factory.name(), "instantiating module");
            ModuleDescriptor {
                name: factory.name().to_string(),
                enabled: true,
                output: None,
                instance: factory.build(),
            }
        })
        .collect()
}

// =============================================================================
// Registry
// =============================================================================

/// Ordered set of module descriptors.
#[derive(Debug, Default)]
pub struct Registry {
    pub(crate) modules: Vec<ModuleDescriptor>,
}

impl Registry {
    /// Discover and instantiate every registered module.
    pub fn new(factories: Vec<ModuleFactory>) -> Self {
        Self {
            modules: instantiate(discover(factories)),
        }
    }

    pub fn modules(&self) -> &[ModuleDescriptor] {
        &self.modules
    }

    pub fn modules_mut(&mut self) -> &mut [ModuleDescriptor] {
        &mut self.modules
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ModuleDescriptor> {
        self.modules.iter().find(|m| m.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ModuleDescriptor> {
        self.modules.iter_mut().find(|m| m.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Current index of a module.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.modules.iter().position(|m| m.name == name)
    }

    /// Module names in current order.
    pub fn names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name.as_str()).collect()
    }

    /// Enabled modules in current order.
    pub fn enabled(&self) -> impl Iterator<Item = &ModuleDescriptor> {
        self.modules.iter().filter(|m| m.enabled)
    }
}

// =============================================================================
// Tests
// =============================================================================
