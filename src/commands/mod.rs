//! Command surface.
//!
//! Routes a `name + raw argument` line to its handler through static
//! dispatch tables:
//!
//! ```text
//! dashboard                      → redisplay
//! dashboard -<command> [args]    → GLOBAL_COMMANDS
//! dashboard <module>             → module help
//! dashboard <module> -<command>  → MODULE_COMMANDS
//! dashboard <module> <action>    → the module's declared actions
//! ```
//!
//! Every failure comes back as a [`CommandError`]; [`run`] announces it on
//! the console instead of propagating it to the host.

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;

use crate::config;
use crate::dashboard::Dashboard;
use crate::engine::{ActionInfo, Completion};
use crate::error::{CommandError, OutputError};
use crate::pipeline::render::panic_message;
use crate::style::{Assignment, AttributeInfo, DashboardStyle};

/// Lines printed back to the user.
pub type Reply = Vec<String>;

pub type GlobalHandler = fn(&mut Dashboard, &str) -> Result<Reply, CommandError>;
pub type ModuleHandler = fn(&mut Dashboard, usize, &str) -> Result<Reply, CommandError>;

/// Leading word accepted (and ignored) in front of every command line.
pub const ROOT: &str = "dashboard";

/// Layout argument restoring the default layout.
pub const RESET_LAYOUT: &str = "--reset";

// =============================================================================
// Dispatch Tables
// =============================================================================

/// One entry of a dispatch table.
pub struct CommandEntry<H> {
    pub name: &'static str,
    pub doc: &'static str,
    pub completion: Completion,
    pub handler: H,
}

pub static GLOBAL_COMMANDS: &[CommandEntry<GlobalHandler>] = &[
    CommandEntry {
        name: "-output",
        doc: "Set the output file/TTY for the whole dashboard or single modules.\n\
              The dashboard and modules are written to the console by default.\n\
              Without argument the default output is restored.",
        completion: Completion::Filename,
        handler: global_output,
    },
    CommandEntry {
        name: "-enabled",
        doc: "Enable or disable the dashboard [on|off].\n\
              Without argument the current state is shown.",
        completion: Completion::Nothing,
        handler: global_enabled,
    },
    CommandEntry {
        name: "-layout",
        doc: "Set or show the dashboard layout.\n\
              Accepts a space-separated list of directives, each is a module name\n\
              optionally prefixed by '!' to place it disabled. Modules not listed\n\
              are disabled. Without argument the current layout is shown.\n\
              --reset restores alphabetical order with every module enabled.",
        completion: Completion::Nothing,
        handler: global_layout,
    },
    CommandEntry {
        name: "-style",
        doc: "Access the dashboard stylistic attributes.\n\
              Without argument every attribute is listed, with a name only its\n\
              value is shown, with a name and a literal value it is set.",
        completion: Completion::Nothing,
        handler: global_style,
    },
    CommandEntry {
        name: "-configuration",
        doc: "Dump the dashboard configuration as commands.\n\
              With a file argument the commands are saved there instead.",
        completion: Completion::Filename,
        handler: global_configuration,
    },
];

pub static MODULE_COMMANDS: &[CommandEntry<ModuleHandler>] = &[
    CommandEntry {
        name: "-output",
        doc: "Set the output file/TTY for this module.\n\
              Without argument the dashboard output is used.",
        completion: Completion::Filename,
        handler: module_output,
    },
    CommandEntry {
        name: "-style",
        doc: "Access the module stylistic attributes.",
        completion: Completion::Nothing,
        handler: module_style,
    },
];

fn lookup<'a, H>(table: &'a [CommandEntry<H>], name: &str) -> Option<&'a CommandEntry<H>> {
    table.iter().find(|entry| entry.name == name)
}

// =============================================================================
// Routing
// =============================================================================

/// Split off the first whitespace-separated word.
fn split_word(line: &str) -> (&str, &str) {
    let line = line.trim();
    match line.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim_start()),
        None => (line, ""),
    }
}

/// Drop the optional leading `dashboard` word.
pub fn strip_root(line: &str) -> &str {
    match split_word(line) {
        (ROOT, rest) => rest,
        _ => line.trim(),
    }
}

/// Execute one command line.
pub fn execute(dashboard: &mut Dashboard, line: &str) -> Result<Reply, CommandError> {
    let line = strip_root(line);
    tracing::debug!(line, "command");
    let (head, rest) = split_word(line);

    if head.is_empty() {
        return root(dashboard);
    }
    if head.starts_with('-') {
        let entry = lookup(GLOBAL_COMMANDS, head).ok_or_else(|| CommandError::Unknown(head.to_string()))?;
        return (entry.handler)(dashboard, rest);
    }
    match dashboard.registry().position(head) {
        Some(index) => module_command(dashboard, index, rest),
        None => Err(CommandError::WrongArgument(line.to_string())),
    }
}

/// Execute a command line, announcing the reply or the error.
///
/// Returns whether the command succeeded.
pub fn run(dashboard: &mut Dashboard, line: &str) -> bool {
    match execute(dashboard, line) {
        Ok(reply) => {
            for text in reply {
                dashboard.announce(&text);
            }
            true
        }
        Err(err) => {
            dashboard.announce_error(&err);
            false
        }
    }
}

/// Completion hint for the argument of a command line.
pub fn completion(dashboard: &Dashboard, line: &str) -> Completion {
    let (head, rest) = split_word(strip_root(line));
    if let Some(entry) = lookup(GLOBAL_COMMANDS, head) {
        return entry.completion;
    }
    let Some(module) = dashboard.registry().get(head) else {
        return Completion::Nothing;
    };
    let (sub, _) = split_word(rest);
    if let Some(entry) = lookup(MODULE_COMMANDS, sub) {
        return entry.completion;
    }
    module
        .instance
        .actions()
        .into_iter()
        .find(|action| action.name == sub)
        .map_or(Completion::Nothing, |action| action.completion)
}

fn root(dashboard: &mut Dashboard) -> Result<Reply, CommandError> {
    if !dashboard.is_running() {
        return Err(CommandError::NotRunning);
    }
    dashboard.redisplay();
    Ok(Reply::new())
}

fn module_command(dashboard: &mut Dashboard, index: usize, rest: &str) -> Result<Reply, CommandError> {
    let (head, tail) = split_word(rest);
    if head.is_empty() {
        return Ok(module_help(dashboard, index));
    }
    if head.starts_with('-') {
        let entry = lookup(MODULE_COMMANDS, head).ok_or_else(|| CommandError::Unknown(head.to_string()))?;
        return (entry.handler)(dashboard, index, tail);
    }
    invoke_action(dashboard, index, rest.trim())
}

/// Route to the longest declared action name the words start with.
fn invoke_action(dashboard: &mut Dashboard, index: usize, rest: &str) -> Result<Reply, CommandError> {
    let module = &mut dashboard.registry_mut().modules_mut()[index];
    let actions = module.instance.actions();
    let action = actions
        .iter()
        .filter(|action| matches_words(rest, action.name))
        .max_by_key(|action| action.name.len())
        .ok_or_else(|| CommandError::Unknown(format!("{} {}", module.name, rest)))?;
    let argument = rest[action.name.len()..].trim();

    if action.prefix {
        return Ok(sub_actions(&actions, action.name));
    }

    tracing::debug!(module = %module.name, action = action.name, "module action");
    let outcome = match panic::catch_unwind(AssertUnwindSafe(|| module.instance.invoke(action.name, argument))) {
        Ok(outcome) => outcome.ok_or_else(|| CommandError::Unknown(action.name.to_string()))?,
        Err(payload) => Err(anyhow::anyhow!(panic_message(payload.as_ref()))),
    };
    let reply = outcome.map_err(|source| CommandError::Action {
        module: module.name.clone(),
        source,
    })?;

    if action.redisplay {
        dashboard.refresh();
    }
    Ok(reply.map(|text| text.lines().map(str::to_string).collect()).unwrap_or_default())
}

/// `line` starts with the words of `name`, followed by a word boundary.
fn matches_words(line: &str, name: &str) -> bool {
    line.strip_prefix(name)
        .is_some_and(|tail| tail.is_empty() || tail.starts_with(char::is_whitespace))
}

fn sub_actions(actions: &[ActionInfo], prefix: &str) -> Reply {
    actions
        .iter()
        .filter_map(|action| {
            let name = action.name.strip_prefix(prefix)?.strip_prefix(' ')?;
            Some(format!("{name} -- {}", first_line(action.doc)))
        })
        .collect()
}

fn first_line(doc: &str) -> &str {
    doc.lines().next().unwrap_or("")
}

fn module_help(dashboard: &Dashboard, index: usize) -> Reply {
    let module = &dashboard.registry().modules()[index];
    let mut reply = Reply::new();
    if !module.doc().is_empty() {
        reply.extend(module.doc().lines().map(str::to_string));
        reply.push(String::new());
    }
    reply.push("List of commands:".to_string());
    reply.push(String::new());
    for entry in MODULE_COMMANDS {
        reply.push(format!("{ROOT} {} {} -- {}", module.name, entry.name, first_line(entry.doc)));
    }
    for action in module.instance.actions() {
        reply.push(format!("{ROOT} {} {} -- {}", module.name, action.name, first_line(action.doc)));
    }
    reply
}

// =============================================================================
// Global Commands
// =============================================================================

fn parse_output(arg: &str) -> Option<PathBuf> {
    let arg = arg.trim();
    (!arg.is_empty()).then(|| PathBuf::from(arg))
}

fn global_output(dashboard: &mut Dashboard, arg: &str) -> Result<Reply, CommandError> {
    dashboard.set_output(parse_output(arg));
    Ok(Reply::new())
}

fn global_enabled(dashboard: &mut Dashboard, arg: &str) -> Result<Reply, CommandError> {
    match arg.trim() {
        "" => {
            let state = if dashboard.is_enabled() { "enabled" } else { "disabled" };
            Ok(vec![format!("The dashboard is {state}")])
        }
        "on" => {
            dashboard.set_enabled(true);
            Ok(Reply::new())
        }
        "off" => {
            dashboard.set_enabled(false);
            Ok(Reply::new())
        }
        other => Err(CommandError::ExpectedOnOff(other.to_string())),
    }
}

fn global_layout(dashboard: &mut Dashboard, arg: &str) -> Result<Reply, CommandError> {
    let directives: Vec<&str> = arg.split_whitespace().collect();
    match directives.as_slice() {
        [] => Ok(show_layout(dashboard)),
        [RESET_LAYOUT] => {
            dashboard.reset_layout();
            Ok(Reply::new())
        }
        _ => {
            dashboard.apply_layout(&directives)?;
            Ok(Reply::new())
        }
    }
}

/// The dashboard output, then one row per module in current order.
fn show_layout(dashboard: &Dashboard) -> Reply {
    let style = dashboard.style();
    let layout = dashboard.registry().layout(dashboard.output());
    let width = layout.iter().map(|e| e.name.len()).max().unwrap_or(0).max("Dashboard".len());

    let default_output = dashboard
        .output()
        .map_or_else(|| "(default TTY)".to_string(), |p| p.display().to_string());
    let mut reply = vec![style.ansi(&format!("  {:<width$}  {default_output}", "Dashboard"), &style.style_high)];
    for entry in layout {
        let (mark, sgr) = if entry.enabled {
            ('-', &style.style_high)
        } else {
            ('!', &style.style_low)
        };
        let output = entry
            .output
            .as_ref()
            .map_or_else(|| "-".to_string(), |p| p.display().to_string());
        reply.push(style.ansi(&format!("{mark} {:<width$}  {output}", entry.name), sgr));
    }
    reply
}

fn global_style(dashboard: &mut Dashboard, arg: &str) -> Result<Reply, CommandError> {
    let (name, value) = split_word(arg);
    if name.is_empty() {
        let style = dashboard.style();
        let infos = crate::style::describe(style, dashboard.style_table());
        return Ok(list_attributes(style, &infos));
    }
    let assignment = dashboard.set_style(name, value)?;
    Ok(show_assignment(name, assignment))
}

fn global_configuration(dashboard: &mut Dashboard, arg: &str) -> Result<Reply, CommandError> {
    let script = config::dump(dashboard);
    match parse_output(arg) {
        None => Ok(script),
        Some(path) => {
            let mut text = script.join("\n");
            text.push('\n');
            std::fs::write(&path, text).map_err(|source| OutputError::Write {
                target: path.display().to_string(),
                source,
            })?;
            Ok(vec![format!("Configuration saved to \"{}\"", path.display())])
        }
    }
}

// =============================================================================
// Module Commands
// =============================================================================

fn module_output(dashboard: &mut Dashboard, index: usize, arg: &str) -> Result<Reply, CommandError> {
    dashboard.set_module_output(index, parse_output(arg));
    Ok(Reply::new())
}

fn module_style(dashboard: &mut Dashboard, index: usize, arg: &str) -> Result<Reply, CommandError> {
    let (name, value) = split_word(arg);
    if name.is_empty() {
        let infos = dashboard.registry().modules()[index].instance.attributes();
        return Ok(list_attributes(dashboard.style(), &infos));
    }
    let assignment = dashboard.set_module_style(index, name, value)?;
    Ok(show_assignment(name, assignment))
}

// =============================================================================
// Formatting
// =============================================================================

fn show_assignment(name: &str, assignment: Assignment) -> Reply {
    match assignment {
        Assignment::Read(value) => vec![format!("{name} = {value}")],
        Assignment::Written(_) => Reply::new(),
    }
}

/// `name = literal` per attribute, its documentation underneath.
fn list_attributes(style: &DashboardStyle, infos: &[AttributeInfo]) -> Reply {
    let mut reply = Reply::new();
    for info in infos {
        reply.push(format!("{} = {}", style.ansi(info.name, &style.style_high), info.value));
        if !info.doc.is_empty() {
            reply.push(style.ansi(&format!("    {}", info.doc), &style.style_low));
        }
    }
    reply
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::HostEvent;
    use crate::engine::{Action, Module, ModuleFactory, RenderContext};
    use crate::pipeline::MemoryConsole;
    use crate::style::Attribute;
    use crate::types::Geometry;

    #[derive(Default)]
    struct Watch {
        limit: i64,
        items: Vec<String>,
    }

    impl Module for Watch {
        fn label(&self) -> String {
            "Watch".into()
        }

        fn doc(&self) -> &str {
            "Watch expressions."
        }

        fn lines(&mut self, _: &RenderContext<'_>) -> anyhow::Result<Vec<String>> {
            Ok(self.items.iter().take(self.limit as usize).cloned().collect())
        }

        fn attributes() -> Vec<Attribute<Self>> {
            vec![
                Attribute::new("limit", 10i64, |w: &Self| w.limit.into(), |w, v| w.limit = v.as_int())
                    .doc("Maximum number of expressions."),
            ]
        }

        fn actions() -> Vec<Action<Self>> {
            vec![
                Action::new("add", |w: &mut Self, arg| {
                    anyhow::ensure!(!arg.is_empty(), "missing expression");
                    w.items.push(arg.to_string());
                    Ok(None)
                })
                .doc("Add an expression.")
                .complete(Completion::Expression)
                .redisplay(),
                Action::new("list", |w: &mut Self, _| Ok(Some(w.items.join("\n")))).doc("List expressions."),
                Action::new("clear", |_: &mut Self, _| Ok(None)).doc("Clear things.").prefix(),
                Action::new("clear all", |w: &mut Self, _| {
                    w.items.clear();
                    Ok(None)
                })
                .doc("Remove every expression."),
                Action::new("boom", |_: &mut Self, _| panic!("action exploded")).doc("Fail loudly."),
            ]
        }
    }

    #[derive(Default)]
    struct Stack;

    impl Module for Stack {
        fn label(&self) -> String {
            "Stack".into()
        }

        fn lines(&mut self, _: &RenderContext<'_>) -> anyhow::Result<Vec<String>> {
            Ok(vec!["frame 0".into()])
        }
    }

    fn dashboard() -> (Dashboard, MemoryConsole) {
        let console = MemoryConsole::new(Some(Geometry::new(30, 10)));
        let mut dashboard = Dashboard::new(
            Box::new(console.clone()),
            vec![ModuleFactory::of::<Watch>(), ModuleFactory::of::<Stack>()],
        );
        dashboard.set_style("ansi", "False").unwrap();
        (dashboard, console)
    }

    #[test]
    fn test_root_requires_running_program() {
        let (mut dashboard, _) = dashboard();
        assert!(matches!(execute(&mut dashboard, "dashboard"), Err(CommandError::NotRunning)));
        dashboard.set_running(true);
        assert!(execute(&mut dashboard, "dashboard").unwrap().is_empty());
    }

    #[test]
    fn test_root_rejects_arguments() {
        let (mut dashboard, _) = dashboard();
        let err = execute(&mut dashboard, "dashboard bogus").unwrap_err();
        assert_eq!(err.to_string(), "Wrong argument \"bogus\"");
        let err = execute(&mut dashboard, "-bogus").unwrap_err();
        assert!(matches!(err, CommandError::Unknown(_)));
    }

    #[test]
    fn test_enabled() {
        let (mut dashboard, _) = dashboard();
        assert_eq!(execute(&mut dashboard, "-enabled").unwrap(), vec!["The dashboard is enabled"]);
        execute(&mut dashboard, "-enabled off").unwrap();
        assert!(!dashboard.is_enabled());
        let err = execute(&mut dashboard, "-enabled maybe").unwrap_err();
        assert_eq!(err.to_string(), "Wrong argument \"maybe\"; expecting \"on\" or \"off\"");
    }

    #[test]
    fn test_layout_apply_and_show() {
        let (mut dashboard, _) = dashboard();
        execute(&mut dashboard, "dashboard -layout !watch stack").unwrap();
        assert_eq!(dashboard.registry().names(), vec!["watch", "stack"]);

        let reply = execute(&mut dashboard, "-layout").unwrap();
        assert_eq!(
            reply,
            vec![
                "  Dashboard  (default TTY)".to_string(),
                "! watch      -".to_string(),
                "- stack      -".to_string(),
            ]
        );

        let err = execute(&mut dashboard, "-layout stack nope").unwrap_err();
        assert_eq!(err.to_string(), "Cannot find module \"nope\"");

        execute(&mut dashboard, "-layout --reset").unwrap();
        assert_eq!(dashboard.registry().names(), vec!["stack", "watch"]);
        assert_eq!(dashboard.registry().enabled().count(), 2);
    }

    #[test]
    fn test_style_read_and_write() {
        let (mut dashboard, _) = dashboard();
        assert_eq!(
            execute(&mut dashboard, "-style divider_label_skip").unwrap(),
            vec!["divider_label_skip = 3"]
        );
        execute(&mut dashboard, "-style divider_label_skip 7").unwrap();
        assert_eq!(dashboard.style().divider_label_skip, 7);

        let err = execute(&mut dashboard, "-style ansi notabool").unwrap_err();
        assert!(matches!(err, CommandError::Attribute(_)));
        assert!(!dashboard.style().ansi);

        let listing = execute(&mut dashboard, "-style").unwrap();
        assert!(listing.contains(&"divider_label_skip = 7".to_string()));
        assert!(listing.contains(&"value_truncation_string = '…'".to_string()));
    }

    #[test]
    fn test_module_style_and_help() {
        let (mut dashboard, _) = dashboard();
        execute(&mut dashboard, "watch -style limit 2").unwrap();
        assert_eq!(execute(&mut dashboard, "watch -style limit").unwrap(), vec!["limit = 2"]);
        assert_eq!(
            execute(&mut dashboard, "watch -style").unwrap(),
            vec!["limit = 2".to_string(), "    Maximum number of expressions.".to_string()]
        );

        let help = execute(&mut dashboard, "watch").unwrap();
        assert_eq!(help[0], "Watch expressions.");
        assert!(help.contains(&"dashboard watch add -- Add an expression.".to_string()));
        assert!(help.contains(&"dashboard watch -output -- Set the output file/TTY for this module.".to_string()));
    }

    #[test]
    fn test_module_actions() {
        let (mut dashboard, console) = dashboard();
        dashboard.set_running(true);
        execute(&mut dashboard, "watch add x + 1").unwrap();
        assert!(console.contents().contains("x + 1"));
        execute(&mut dashboard, "watch add y").unwrap();
        assert_eq!(execute(&mut dashboard, "watch list").unwrap(), vec!["x + 1", "y"]);

        assert_eq!(
            execute(&mut dashboard, "watch clear").unwrap(),
            vec!["all -- Remove every expression."]
        );
        execute(&mut dashboard, "watch clear all").unwrap();
        assert!(execute(&mut dashboard, "watch list").unwrap().is_empty());
    }

    #[test]
    fn test_action_failure_names_module() {
        let (mut dashboard, console) = dashboard();
        let err = execute(&mut dashboard, "watch add").unwrap_err();
        assert_eq!(err.to_string(), "watch: missing expression");

        assert!(!run(&mut dashboard, "watch add"));
        assert!(console.contents().contains("watch: missing expression"));
        assert!(matches!(
            execute(&mut dashboard, "watch fly"),
            Err(CommandError::Unknown(_))
        ));
    }

    #[test]
    fn test_panicking_action_is_reported() {
        let (mut dashboard, console) = dashboard();
        let err = execute(&mut dashboard, "watch boom").unwrap_err();
        assert_eq!(err.to_string(), "watch: action exploded");

        assert!(!run(&mut dashboard, "watch boom"));
        assert!(console.contents().contains("watch: action exploded"));
        assert!(run(&mut dashboard, "watch add x"));
    }

    #[test]
    fn test_oversized_divider_spacing_still_renders() {
        let (mut dashboard, console) = dashboard();
        dashboard.on_event(HostEvent::Stopped);
        console.take();

        assert!(run(&mut dashboard, "-style divider_label_skip 9223372036854775807"));
        assert!(run(&mut dashboard, "-style divider_label_margin 9223372036854775807"));
        assert!(console.contents().contains("Stack"));
    }

    #[test]
    fn test_module_output() {
        let (mut dashboard, _) = dashboard();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watch");
        execute(&mut dashboard, &format!("watch -output {}", path.display())).unwrap();
        assert_eq!(dashboard.registry().get("watch").unwrap().output.as_deref(), Some(path.as_path()));
        execute(&mut dashboard, "watch -output").unwrap();
        assert!(dashboard.registry().get("watch").unwrap().output.is_none());
    }

    #[test]
    fn test_completion_hints() {
        let (dashboard, _) = dashboard();
        assert_eq!(completion(&dashboard, "dashboard -output"), Completion::Filename);
        assert_eq!(completion(&dashboard, "watch add"), Completion::Expression);
        assert_eq!(completion(&dashboard, "watch -output"), Completion::Filename);
        assert_eq!(completion(&dashboard, "stack"), Completion::Nothing);
    }
}
