//! End-to-end session tests.
//!
//! Drives a whole `Dashboard` the way a host debugger does:
//! - lifecycle events (stop / continue / exit)
//! - command lines
//! - an in-memory console plus temporary file destinations
//!
//! Run with: cargo test --test dashboard_session

use std::fs;
use std::path::Path;

use debug_dashboard::commands;
use debug_dashboard::engine::Action;
use debug_dashboard::{
    Attribute, Dashboard, DashboardStyle, Geometry, HostEvent, MemoryConsole, Module, ModuleFactory, RenderContext,
    Tier, divider, strip_ansi, visible_width,
};

// =============================================================================
// FAKE MODULES
// =============================================================================

#[derive(Default)]
struct Assembly;

impl Module for Assembly {
    fn label(&self) -> String {
        "Assembly".into()
    }

    fn lines(&mut self, ctx: &RenderContext<'_>) -> anyhow::Result<Vec<String>> {
        Ok(vec![format!("0x401000 push rbp ({} cols)", ctx.width())])
    }
}

#[derive(Default)]
struct Registers;

impl Module for Registers {
    fn label(&self) -> String {
        "Registers".into()
    }

    fn lines(&mut self, _: &RenderContext<'_>) -> anyhow::Result<Vec<String>> {
        anyhow::bail!("No registers.")
    }
}

#[derive(Default)]
struct Stack {
    limit: i64,
    frames: Vec<String>,
}

impl Module for Stack {
    fn label(&self) -> String {
        "Stack".into()
    }

    fn lines(&mut self, ctx: &RenderContext<'_>) -> anyhow::Result<Vec<String>> {
        let mut lines = vec![ctx.divider("Frames", !self.frames.is_empty())];
        lines.extend(self.frames.iter().take(self.limit as usize).cloned());
        Ok(lines)
    }

    fn attributes() -> Vec<Attribute<Self>> {
        vec![Attribute::new("limit", 2i64, |s: &Self| s.limit.into(), |s, v| s.limit = v.as_int())]
    }

    fn actions() -> Vec<Action<Self>> {
        vec![
            Action::new("push", |s: &mut Self, arg| {
                s.frames.push(arg.to_string());
                Ok(None)
            })
            .redisplay(),
        ]
    }
}

fn session() -> (Dashboard, MemoryConsole) {
    let console = MemoryConsole::new(Some(Geometry::new(40, 20)));
    let mut dashboard = Dashboard::new(
        Box::new(console.clone()),
        vec![
            ModuleFactory::of::<Stack>(),
            ModuleFactory::of::<Registers>(),
            ModuleFactory::of::<Assembly>(),
        ],
    );
    dashboard.set_style("ansi", "False").unwrap();
    (dashboard, console)
}

fn plain(text: &str) -> String {
    strip_ansi(text).into_owned()
}

// =============================================================================
// REGISTRY & LAYOUT
// =============================================================================

#[test]
fn test_registry_is_sorted_enabled_and_console_bound() {
    let (dashboard, _) = session();
    let registry = dashboard.registry();
    assert_eq!(registry.names(), vec!["assembly", "registers", "stack"]);
    assert!(registry.modules().iter().all(|m| m.enabled && m.output.is_none()));
}

#[test]
fn test_unknown_layout_directive_changes_nothing() {
    let (mut dashboard, console) = session();
    commands::run(&mut dashboard, "dashboard -layout stack !assembly");
    let before = commands::execute(&mut dashboard, "dashboard -layout").unwrap();

    assert!(!commands::run(&mut dashboard, "dashboard -layout registers ghost"));
    assert_eq!(commands::execute(&mut dashboard, "dashboard -layout").unwrap(), before);
    assert_eq!(console.contents().matches("Cannot find module \"ghost\"").count(), 1);
}

#[test]
fn test_negated_directive_places_disabled() {
    let (mut dashboard, _) = session();
    commands::execute(&mut dashboard, "-layout !registers assembly").unwrap();
    let state: Vec<_> = dashboard
        .registry()
        .modules()
        .iter()
        .map(|m| (m.name.as_str(), m.enabled))
        .collect();
    assert_eq!(state, vec![("registers", false), ("assembly", true), ("stack", false)]);
}

// =============================================================================
// ATTRIBUTES
// =============================================================================

#[test]
fn test_boolean_attribute_literals() {
    let (mut dashboard, console) = session();
    commands::execute(&mut dashboard, "-style divider_label_align_right True").unwrap();
    assert_eq!(
        commands::execute(&mut dashboard, "-style divider_label_align_right").unwrap(),
        vec!["divider_label_align_right = True"]
    );

    assert!(!commands::run(&mut dashboard, "-style divider_label_align_right notabool"));
    assert!(dashboard.style().divider_label_align_right);
    assert!(console.contents().contains("divider_label_align_right"));
}

#[test]
fn test_style_change_is_visible_on_next_render() {
    let (mut dashboard, console) = session();
    dashboard.on_event(HostEvent::Stopped);
    console.take();

    commands::execute(&mut dashboard, "-style divider_fill_char_primary '='").unwrap();
    let out = console.take();
    assert!(out.contains("=== Assembly ="));
}

// =============================================================================
// RENDERING
// =============================================================================

#[test]
fn test_failing_module_is_isolated() {
    let (mut dashboard, console) = session();
    dashboard.on_event(HostEvent::Stopped);
    let out = plain(&console.contents());

    let assembly = out.find("0x401000 push rbp (40 cols)").unwrap();
    let error = out.find("No registers.").unwrap();
    let stack = out.find("─── Stack ").unwrap();
    assert!(assembly < error && error < stack);
    assert!(out.contains("─── Registers "));
}

#[test]
fn test_no_enabled_module_notice() {
    let (mut dashboard, console) = session();
    dashboard.apply_layout(&["!assembly", "!registers", "!stack"]).unwrap();
    dashboard.on_event(HostEvent::Stopped);
    let out = plain(&console.contents());

    assert_eq!(out.matches("No module to display").count(), 1);
    assert!(!out.contains("Assembly"));
    assert!(!out.contains("Stack"));
}

#[test]
fn test_divider_measures_forty_columns() {
    let style = DashboardStyle::default();
    let text = divider(&style, 40, "Stack", Tier::Primary, true);
    assert_eq!(visible_width(&text), 40);
    let visible = plain(&text);
    assert!(visible.starts_with("─── Stack ─"));
    assert!(visible.ends_with('─'));
}

#[test]
fn test_shared_destination_single_write_in_order() {
    let (mut dashboard, console) = session();
    let dir = tempfile::tempdir().unwrap();
    let shared = dir.path().join("shared");
    commands::execute(&mut dashboard, &format!("stack -output {}", shared.display())).unwrap();
    commands::execute(&mut dashboard, &format!("assembly -output {}", shared.display())).unwrap();

    dashboard.on_event(HostEvent::Stopped);
    let written = plain(&fs::read_to_string(&shared).unwrap());
    let assembly = written.find("─── Assembly ").unwrap();
    let stack = written.find("─── Stack ").unwrap();
    assert!(assembly < stack);

    let out = plain(&console.contents());
    assert!(out.contains("Registers"));
    assert!(!out.contains("Assembly"));
}

#[test]
fn test_non_terminal_destination_inherits_console_width() {
    let (mut dashboard, _) = session();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dash");
    commands::execute(&mut dashboard, &format!("-output {}", path.display())).unwrap();
    dashboard.on_event(HostEvent::Stopped);
    assert!(fs::read_to_string(&path).unwrap().contains("(40 cols)"));
}

// =============================================================================
// LIFECYCLE & COMMANDS
// =============================================================================

#[test]
fn test_full_session() {
    let (mut dashboard, console) = session();
    assert!(!commands::run(&mut dashboard, "dashboard"));
    assert!(console.take().contains("Is the target program running?"));

    dashboard.on_event(HostEvent::Stopped);
    assert!(plain(&console.take()).contains("─── Frames "));

    commands::execute(&mut dashboard, "stack push main").unwrap();
    let out = plain(&console.take());
    assert!(out.contains("main"));

    dashboard.on_event(HostEvent::Continued);
    assert!(plain(&console.take()).contains("Output/messages"));

    dashboard.on_event(HostEvent::Exited);
    assert!(!dashboard.is_running());
    assert!(!commands::run(&mut dashboard, "dashboard"));
}

#[test]
fn test_configuration_dump_restores_session() {
    let (mut dashboard, _) = session();
    let dir = tempfile::tempdir().unwrap();
    let saved = dir.path().join("dashboard.gdb");
    commands::execute(&mut dashboard, "-layout stack !assembly").unwrap();
    commands::execute(&mut dashboard, "stack -style limit 5").unwrap();
    commands::execute(&mut dashboard, &format!("-configuration {}", saved.display())).unwrap();

    let (mut restored, _) = session();
    let failures = debug_dashboard::config::load_all(&mut restored, &[dir.path()]);
    assert_eq!(failures, 0);
    assert_eq!(restored.registry().directives(), vec!["stack", "!assembly", "!registers"]);
    assert_eq!(
        commands::execute(&mut restored, "stack -style limit").unwrap(),
        vec!["limit = 5"]
    );
    assert!(Path::new(&saved).exists());
}
