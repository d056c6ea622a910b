//! The render pass.
//!
//! ```text
//! enabled modules ─► group by target ─► per target: open, size, collect,
//!                                         compose, single write
//! ```
//!
//! Module failures (errors and panics) become inline error blocks;
//! destination failures are returned to the caller and never stop the
//! remaining destinations.

use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use super::terminal::{Console, destination_geometry, open_destination, resolve_geometry};
use crate::engine::{ModuleInstance, Registry, RenderContext};
use crate::error::OutputError;
use crate::renderer::{DividerSpec, OutputBuffer, ansi};
use crate::style::{DashboardStyle, Tier};
use crate::types::{Geometry, OutputTarget, ScreenOps};

/// Placeholder shown on the console when nothing is enabled.
pub const NO_MODULE_ENABLED: &str = "No module to display (see `dashboard -layout`)";
/// Placeholder shown on the console when nothing was registered.
pub const NO_MODULE_LOADED: &str = "No module loaded";

// =============================================================================
// Grouping
// =============================================================================

/// Enabled modules sharing one resolved destination, in registry order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderGroup {
    pub target: OutputTarget,
    /// Indices into the registry.
    pub modules: Vec<usize>,
}

/// Partition enabled modules by target.
///
/// Groups appear in order of first use. The console group is present
/// whenever the console is the dashboard-level destination, even if empty.
pub fn group(registry: &Registry, output: Option<&Path>) -> Vec<RenderGroup> {
    let mut groups: Vec<RenderGroup> = Vec::new();
    for (index, module) in registry.modules().iter().enumerate() {
        if !module.enabled {
            continue;
        }
        let target = OutputTarget::resolve(module.output.as_deref(), output);
        match groups.iter_mut().find(|g| g.target == target) {
            Some(group) => group.modules.push(index),
            None => groups.push(RenderGroup {
                target,
                modules: vec![index],
            }),
        }
    }
    if output.is_none() && !groups.iter().any(|g| g.target.is_console()) {
        groups.push(RenderGroup {
            target: OutputTarget::Console,
            modules: Vec::new(),
        });
    }
    groups
}

// =============================================================================
// Collecting
// =============================================================================

/// Ask a module for its lines, turning errors and panics into a message.
pub fn collect(instance: &mut dyn ModuleInstance, ctx: &RenderContext<'_>) -> Result<Vec<String>, String> {
    match panic::catch_unwind(AssertUnwindSafe(|| instance.lines(ctx))) {
        Ok(Ok(lines)) => Ok(lines),
        Ok(Err(err)) => Err(format!("{err:#}")),
        Err(payload) => Err(panic_message(payload.as_ref())),
    }
}

/// Text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "module panicked".to_string()
    }
}

// =============================================================================
// Render Pass
// =============================================================================

/// Everything one pass reads or writes.
pub struct RenderPass<'a> {
    pub registry: &'a mut Registry,
    pub style: &'a DashboardStyle,
    /// Dashboard-level destination override.
    pub output: Option<&'a Path>,
    pub console: &'a mut dyn Console,
    /// Clear the console before writing (manual redisplay).
    pub clear_console: bool,
    pub style_changed: bool,
}

impl RenderPass<'_> {
    /// Render every group; returns the destinations that failed.
    pub fn run(self) -> Vec<OutputError> {
        let RenderPass {
            registry,
            style,
            output,
            console,
            clear_console,
            style_changed,
        } = self;

        let groups = group(registry, output);
        tracing::debug!(groups = groups.len(), "render pass");

        let console_geometry = console.geometry();
        let mut errors = Vec::new();

        for group in groups {
            let (geometry, file) = match &group.target {
                OutputTarget::Console => (resolve_geometry(console_geometry, None), None),
                OutputTarget::Path(path) => match open_destination(path) {
                    Ok(file) => (resolve_geometry(destination_geometry(&file), console_geometry), Some(file)),
                    Err(err) => {
                        tracing::warn!(error = %err, "destination unavailable");
                        errors.push(err);
                        continue;
                    }
                },
            };

            let mut buffer = OutputBuffer::new();
            let composed = compose(&mut buffer, registry, style, &group, geometry, clear_console, style_changed);
            let written = composed.and_then(|()| match file {
                Some(mut file) => buffer.flush_to(&mut file),
                None => buffer.flush_to(console.writer()),
            });
            if let Err(source) = written {
                let err = OutputError::Write {
                    target: group.target.to_string(),
                    source,
                };
                tracing::warn!(error = %err, "destination write failed");
                errors.push(err);
            }
        }
        errors
    }
}

/// Build the whole screen of one destination.
fn compose(
    buffer: &mut OutputBuffer,
    registry: &mut Registry,
    style: &DashboardStyle,
    group: &RenderGroup,
    geometry: Geometry,
    clear_console: bool,
    style_changed: bool,
) -> io::Result<()> {
    let width = geometry.columns();
    let external = !group.target.is_console();

    ansi::screen_ops(
        buffer,
        ScreenOps::for_write(&group.target, clear_console, style.discard_scrollback),
    )?;

    if group.modules.is_empty() {
        let notice = if registry.is_empty() {
            NO_MODULE_LOADED
        } else {
            NO_MODULE_ENABLED
        };
        buffer.write_line(&DividerSpec::labelled(width, "Warning", Tier::Primary, true).render(style));
        buffer.write_line(notice);
    } else {
        let ctx = RenderContext::new(geometry, style_changed, style);
        let single = group.modules.len() == 1;
        for &index in &group.modules {
            let module = &mut registry.modules_mut()[index];
            let lines = match collect(module.instance.as_mut(), &ctx) {
                Ok(lines) => lines,
                Err(message) => {
                    tracing::warn!(module = %module.name, %message, "module failed to render");
                    message
                        .lines()
                        .map(|line| style.ansi(line, &style.style_error))
                        .collect()
                }
            };

            let active = !lines.is_empty();
            let omit = external
                && ((style.omit_divider && single) || (style.omit_inactive_dividers && !active));
            if !omit {
                let label = module.instance.label();
                buffer.write_line(&DividerSpec::labelled(width, &label, Tier::Primary, active).render(style));
            }
            buffer.write_lines(&lines);
        }
    }

    if !external {
        buffer.write_line(&DividerSpec::rule(width, Tier::Primary).render(style));
    }
    Ok(())
}

/// Write a console-only screen: optional clear, then a labelled divider.
///
/// Used to mark where program output starts when execution resumes.
pub fn write_marker(console: &mut dyn Console, style: &DashboardStyle, label: &str) -> io::Result<()> {
    let width = resolve_geometry(console.geometry(), None).columns();
    let mut buffer = OutputBuffer::new();
    ansi::screen_ops(
        &mut buffer,
        ScreenOps::for_write(&OutputTarget::Console, true, style.discard_scrollback),
    )?;
    buffer.write_line(&DividerSpec::labelled(width, label, Tier::Primary, true).render(style));
    buffer.flush_to(console.writer())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Module, ModuleFactory};
    use crate::pipeline::terminal::MemoryConsole;
    use crate::renderer::strip_ansi;
    use std::path::PathBuf;

    #[derive(Default)]
    struct Alpha;

    impl Module for Alpha {
        fn label(&self) -> String {
            "Alpha".into()
        }

        fn lines(&mut self, ctx: &RenderContext<'_>) -> anyhow::Result<Vec<String>> {
            Ok(vec![format!("alpha {}", ctx.width())])
        }
    }

    #[derive(Default)]
    struct Broken;

    impl Module for Broken {
        fn label(&self) -> String {
            "Broken".into()
        }

        fn lines(&mut self, _: &RenderContext<'_>) -> anyhow::Result<Vec<String>> {
            anyhow::bail!("no frame selected")
        }
    }

    #[derive(Default)]
    struct Empty;

    impl Module for Empty {
        fn label(&self) -> String {
            "Empty".into()
        }

        fn lines(&mut self, _: &RenderContext<'_>) -> anyhow::Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    fn registry() -> Registry {
        Registry::new(vec![
            ModuleFactory::of::<Alpha>(),
            ModuleFactory::of::<Broken>(),
            ModuleFactory::of::<Empty>(),
        ])
    }

    fn plain() -> DashboardStyle {
        let mut style = DashboardStyle::default();
        style.ansi = false;
        style
    }

    fn render(registry: &mut Registry, style: &DashboardStyle, output: Option<&Path>) -> (String, Vec<OutputError>) {
        let console = MemoryConsole::new(Some(Geometry::new(20, 10)));
        let mut boxed = console.clone();
        let errors = RenderPass {
            registry,
            style,
            output,
            console: &mut boxed,
            clear_console: false,
            style_changed: false,
        }
        .run();
        (console.contents(), errors)
    }

    #[test]
    fn test_group_by_target() {
        let mut registry = registry();
        registry.get_mut("broken").unwrap().output = Some(PathBuf::from("/tmp/a"));
        registry.get_mut("empty").unwrap().enabled = false;

        let groups = group(&registry, None);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0], RenderGroup { target: OutputTarget::Console, modules: vec![0] });
        assert_eq!(groups[1].target, OutputTarget::Path("/tmp/a".into()));
    }

    #[test]
    fn test_group_skips_empty_external() {
        let mut registry = registry();
        for module in registry.modules_mut() {
            module.enabled = false;
        }
        assert_eq!(group(&registry, Some(Path::new("/tmp/a"))), Vec::new());
        assert_eq!(
            group(&registry, None),
            vec![RenderGroup { target: OutputTarget::Console, modules: Vec::new() }]
        );
    }

    #[test]
    fn test_failure_is_isolated() {
        let mut registry = registry();
        let (out, errors) = render(&mut registry, &plain(), None);
        assert!(errors.is_empty());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "─── Alpha ──────────",
                "alpha 20",
                "─── Broken ─────────",
                "no frame selected",
                "─── Empty ──────────",
                "────────────────────",
            ]
        );
    }

    #[test]
    fn test_error_block_uses_error_style() {
        let mut registry = registry();
        let (out, _) = render(&mut registry, &DashboardStyle::default(), None);
        assert!(out.contains("\x1b[31mno frame selected\x1b[0m"));
    }

    #[test]
    fn test_panicking_module_is_caught() {
        #[derive(Default)]
        struct Panicky;

        impl Module for Panicky {
            fn label(&self) -> String {
                "Panicky".into()
            }

            fn lines(&mut self, _: &RenderContext<'_>) -> anyhow::Result<Vec<String>> {
                panic!("boom")
            }
        }

        let mut registry = Registry::new(vec![ModuleFactory::of::<Panicky>(), ModuleFactory::of::<Alpha>()]);
        let (out, _) = render(&mut registry, &plain(), None);
        assert!(out.contains("boom"));
        assert!(out.contains("alpha 20"));
    }

    #[test]
    fn test_no_module_notice() {
        let mut registry = registry();
        for module in registry.modules_mut() {
            module.enabled = false;
        }
        let (out, _) = render(&mut registry, &plain(), None);
        assert_eq!(out.matches(NO_MODULE_ENABLED).count(), 1);
        assert!(!strip_ansi(&out).contains("Alpha"));

        let mut empty = Registry::new(Vec::new());
        let (out, _) = render(&mut empty, &plain(), None);
        assert!(out.contains(NO_MODULE_LOADED));
    }

    #[test]
    fn test_shared_external_destination() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dash");
        let mut registry = registry();
        registry.get_mut("broken").unwrap().enabled = false;

        let (console, errors) = render(&mut registry, &plain(), Some(&path));
        assert!(errors.is_empty());
        assert_eq!(console, "");

        let written = std::fs::read_to_string(&path).unwrap();
        let text = strip_ansi(&written);
        let alpha = text.find("Alpha").unwrap();
        let empty = text.find("Empty").unwrap();
        assert!(alpha < empty);
        assert!(written.starts_with("\x1b[?1049h\x1b[?25l\x1b[H\x1b[J"));
    }

    #[test]
    fn test_divider_policies() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dash");
        let mut registry = registry();
        registry.get_mut("alpha").unwrap().enabled = false;
        registry.get_mut("broken").unwrap().enabled = false;

        let mut style = plain();
        render(&mut registry, &style, Some(&path));
        assert!(std::fs::read_to_string(&path).unwrap().contains("Empty"));

        style.omit_inactive_dividers = true;
        render(&mut registry, &style, Some(&path));
        assert!(!std::fs::read_to_string(&path).unwrap().contains("Empty"));

        style.omit_inactive_dividers = false;
        style.omit_divider = true;
        render(&mut registry, &style, Some(&path));
        assert!(!std::fs::read_to_string(&path).unwrap().contains("Empty"));
    }

    #[test]
    fn test_unwritable_destination_does_not_stop_pass() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("missing").join("dash");
        let mut registry = registry();
        registry.get_mut("empty").unwrap().output = Some(bad);

        let (out, errors) = render(&mut registry, &plain(), None);
        assert_eq!(errors.len(), 1);
        assert!(out.contains("alpha 20"));
    }

    #[test]
    fn test_marker() {
        let console = MemoryConsole::new(Some(Geometry::new(20, 5)));
        let mut boxed = console.clone();
        let mut style = plain();
        style.discard_scrollback = false;
        write_marker(&mut boxed, &style, "Output/messages").unwrap();
        assert_eq!(console.contents(), "\x1b[H\x1b[J─── Output/messages \n");
    }
}
