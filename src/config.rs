//! Configuration discovery and loading.
//!
//! ## Responsibility
//! Find configuration files under a list of search directories and apply
//! them to a [`Dashboard`]. Two formats are understood:
//! - declarative TOML (`*.toml`), mapped onto attributes, outputs and layout
//! - command scripts (any other file), one dashboard command per line
//!
//! ## Guarantees
//! - TOML files load before scripts; each pass is in alphabetical path order
//! - Hidden files and directories are skipped
//! - Loading runs with rendering inhibited
//! - A failing line, key or file is announced and loading carries on
//!
//! ## NOT Responsible For
//! - Deciding which directories to search (that belongs to the host)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use walkdir::{DirEntry, WalkDir};

use crate::commands::{self, ROOT};
use crate::dashboard::Dashboard;
use crate::error::{AttributeError, ConfigError, LayoutError};
use crate::style::{self, Value};

// =============================================================================
// Schema
// =============================================================================

/// A declarative configuration file.
///
/// ```toml
/// enabled = true
/// output = "/dev/pts/3"
/// layout = ["stack", "!assembly"]
///
/// [style]
/// divider_label_skip = 5
///
/// [modules.stack]
/// output = "/dev/pts/4"
///
/// [modules.stack.style]
/// limit = 3
/// ```
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub enabled: Option<bool>,
    /// Empty string restores the console.
    pub output: Option<String>,
    pub layout: Option<Vec<String>>,
    #[serde(default)]
    pub style: BTreeMap<String, toml::Value>,
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleConfig>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleConfig {
    pub output: Option<String>,
    #[serde(default)]
    pub style: BTreeMap<String, toml::Value>,
}

fn to_value(key: &str, value: &toml::Value) -> Result<Value, AttributeError> {
    match value {
        toml::Value::Boolean(b) => Ok(Value::Bool(*b)),
        toml::Value::Integer(i) => Ok(Value::Int(*i)),
        toml::Value::String(s) => Ok(Value::Str(s.clone())),
        other => Err(AttributeError::Malformed {
            key: key.to_string(),
            reason: format!("unsupported {} value", other.type_str()),
        }),
    }
}

fn to_output(raw: &str) -> Option<PathBuf> {
    (!raw.is_empty()).then(|| PathBuf::from(raw))
}

// =============================================================================
// Discovery
// =============================================================================

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

fn is_toml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "toml")
}

/// Configuration files under `dirs`, in load order.
///
/// Directories that do not exist are skipped.
pub fn discover<P: AsRef<Path>>(dirs: &[P]) -> Result<Vec<PathBuf>, ConfigError> {
    let mut declarative = Vec::new();
    let mut scripts = Vec::new();

    for dir in dirs {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            tracing::debug!(dir = %dir.display(), "configuration directory skipped");
            continue;
        }
        let mut files = Vec::new();
        for entry in WalkDir::new(dir).into_iter().filter_entry(|e| !is_hidden(e)) {
            let entry = entry.map_err(|source| ConfigError::Walk {
                path: dir.to_path_buf(),
                source,
            })?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        files.sort();
        let (toml, other): (Vec<_>, Vec<_>) = files.into_iter().partition(|p| is_toml(p));
        declarative.extend(toml);
        scripts.extend(other);
    }

    declarative.extend(scripts);
    Ok(declarative)
}

// =============================================================================
// Loading
// =============================================================================

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse a declarative configuration.
pub fn parse(content: &str, path: &Path) -> Result<ConfigFile, ConfigError> {
    toml::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Apply a declarative configuration; returns the number of failures.
pub fn apply(dashboard: &mut Dashboard, config: &ConfigFile) -> usize {
    let mut failures = 0;
    let mut report = |dashboard: &mut Dashboard, err: &dyn std::fmt::Display| {
        dashboard.announce_error(err);
        failures += 1;
    };

    for (key, raw) in &config.style {
        if let Err(err) = to_value(key, raw).and_then(|value| dashboard.assign_style(key, value)) {
            report(dashboard, &err);
        }
    }

    for (name, module) in &config.modules {
        let Some(index) = dashboard.registry().position(name) else {
            report(dashboard, &LayoutError::UnknownModule(name.clone()));
            continue;
        };
        if let Some(output) = &module.output {
            dashboard.set_module_output(index, to_output(output));
        }
        for (key, raw) in &module.style {
            if let Err(err) = to_value(key, raw).and_then(|value| dashboard.assign_module_style(index, key, value)) {
                report(dashboard, &err);
            }
        }
    }

    if let Some(layout) = &config.layout {
        if let Err(err) = dashboard.apply_layout(layout) {
            report(dashboard, &err);
        }
    }
    if let Some(output) = &config.output {
        dashboard.set_output(to_output(output));
    }
    if let Some(enabled) = config.enabled {
        dashboard.set_enabled(enabled);
    }
    failures
}

/// Run every command of a script; returns the number of failures.
pub fn run_script(dashboard: &mut Dashboard, script: &str) -> usize {
    let mut failures = 0;
    for (number, line) in script.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if !commands::run(dashboard, line) {
            tracing::warn!(line = number + 1, command = line, "configuration command failed");
            failures += 1;
        }
    }
    failures
}

/// Load one file, picking the format from its extension.
pub fn load(dashboard: &mut Dashboard, path: &Path) -> Result<usize, ConfigError> {
    tracing::debug!(path = %path.display(), "loading configuration");
    let content = read(path)?;
    if is_toml(path) {
        let config = parse(&content, path)?;
        Ok(apply(dashboard, &config))
    } else {
        Ok(run_script(dashboard, &content))
    }
}

/// Discover and load everything under `dirs` with rendering inhibited.
///
/// Returns the number of failures; each one was already announced.
pub fn load_all<P: AsRef<Path>>(dashboard: &mut Dashboard, dirs: &[P]) -> usize {
    let failures = dashboard.inhibited(|dashboard| {
        let files = match discover(dirs) {
            Ok(files) => files,
            Err(err) => {
                dashboard.announce_error(&err);
                return 1;
            }
        };
        let mut failures = 0;
        for path in files {
            match load(dashboard, &path) {
                Ok(count) => failures += count,
                Err(err) => {
                    dashboard.announce_error(&err);
                    failures += 1;
                }
            }
        }
        failures
    });
    dashboard.refresh();
    failures
}

// =============================================================================
// Dump
// =============================================================================

/// The current state as a command script that [`run_script`] accepts.
pub fn dump(dashboard: &Dashboard) -> Vec<String> {
    let registry = dashboard.registry();
    let mut lines = Vec::new();

    if !registry.is_empty() {
        lines.push(format!("{ROOT} -layout {}", registry.directives().join(" ")));
    }
    if let Some(output) = dashboard.output() {
        lines.push(format!("{ROOT} -output {}", output.display()));
    }
    for info in style::describe(dashboard.style(), dashboard.style_table()) {
        if !info.is_default() {
            lines.push(format!("{ROOT} -style {} {}", info.name, info.value));
        }
    }
    for module in registry.modules() {
        if let Some(output) = &module.output {
            lines.push(format!("{ROOT} {} -output {}", module.name, output.display()));
        }
        for info in module.instance.attributes() {
            if !info.is_default() {
                lines.push(format!("{ROOT} {} -style {} {}", module.name, info.name, info.value));
            }
        }
    }
    if !dashboard.is_enabled() {
        lines.push(format!("{ROOT} -enabled off"));
    }
    lines
}

// =============================================================================
// Tests
// =============================================================================
