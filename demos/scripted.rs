//! Scripted host for the dashboard.
//!
//! Pretends to be a debugger: reads lines from stdin and turns them into
//! lifecycle events or dashboard commands.
//!
//! - `stop` / `step`  → the program halts one instruction further
//! - `cont`           → the program resumes
//! - `exit`           → the program exits
//! - `quit`           → leave the demo
//! - anything else    → a dashboard command (`dashboard -layout`, `stack`, ...)
//!
//! Run with: cargo run --example scripted -- --config ~/.dashboard.d
//! Logs go to stderr, filtered by RUST_LOG (or --log-level).

use std::cell::Cell;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use debug_dashboard::engine::{Action, Completion};
use debug_dashboard::{Attribute, Dashboard, HostEvent, Module, ModuleFactory, RenderContext, commands, config};

#[derive(Parser, Debug)]
#[command(name = "scripted", about = "Drive the debugger dashboard from stdin")]
struct Cli {
    #[arg(long, short, help = "Configuration directory, may be repeated")]
    config: Vec<PathBuf>,

    #[arg(long, short, default_value = "warn")]
    log_level: String,
}

// =============================================================================
// FAKE INFERIOR
// =============================================================================

/// Program counter of the pretend program, shared with the modules.
type Pc = Rc<Cell<u64>>;

const BASE: u64 = 0x401000;

const LISTING: &[&str] = &[
    "int main(void) {",
    "    int total = 0;",
    "    for (int i = 0; i < 10; i++) {",
    "        total += i;",
    "    }",
    "    return total;",
    "}",
];

struct Source {
    pc: Pc,
    context: i64,
}

impl Module for Source {
    fn label(&self) -> String {
        "Source".into()
    }

    fn doc(&self) -> &str {
        "Show the program source around the current line."
    }

    fn lines(&mut self, ctx: &RenderContext<'_>) -> anyhow::Result<Vec<String>> {
        let current = (self.pc.get() - BASE) as usize % LISTING.len();
        let context = self.context.max(0) as usize;
        let first = current.saturating_sub(context);
        let last = (current + context + 1).min(LISTING.len());
        let style = ctx.style();
        Ok((first..last)
            .map(|n| {
                let text = format!("{:>3} {}", n + 1, LISTING[n]);
                if n == current {
                    ctx.ansi(&text, &style.style_selected_1)
                } else {
                    text
                }
            })
            .collect())
    }

    fn attributes() -> Vec<Attribute<Self>> {
        vec![
            Attribute::new("context", 2i64, |s: &Self| s.context.into(), |s, v| s.context = v.as_int())
                .doc("Number of context lines around the current one.")
                .check(|v| v.as_int() >= 0),
        ]
    }
}

struct Stack {
    pc: Pc,
    limit: i64,
}

impl Module for Stack {
    fn label(&self) -> String {
        "Stack".into()
    }

    fn lines(&mut self, ctx: &RenderContext<'_>) -> anyhow::Result<Vec<String>> {
        let pc = self.pc.get();
        let frames = [("main", pc), ("__libc_start_call_main", 0x7ffff7829d90), ("_start", 0x401020)];
        let mut lines = Vec::new();
        for (level, (name, address)) in frames.iter().take(self.limit.max(0) as usize).enumerate() {
            let header = ctx.ansi(&format!("[{level}]"), &ctx.style().style_selected_2);
            lines.push(format!("{header} from {address:#018x} in {name}"));
        }
        Ok(lines)
    }

    fn attributes() -> Vec<Attribute<Self>> {
        vec![Attribute::new("limit", 3i64, |s: &Self| s.limit.into(), |s, v| s.limit = v.as_int())
            .doc("Maximum number of displayed frames.")]
    }
}

#[derive(Default)]
struct Expressions {
    watched: Vec<String>,
}

impl Module for Expressions {
    fn label(&self) -> String {
        "Expressions".into()
    }

    fn doc(&self) -> &str {
        "Watch user expressions."
    }

    fn lines(&mut self, ctx: &RenderContext<'_>) -> anyhow::Result<Vec<String>> {
        let style = ctx.style();
        Ok(self
            .watched
            .iter()
            .enumerate()
            .map(|(n, expr)| {
                let index = ctx.ansi(&format!("[{n}]"), &style.style_high);
                let value = style.truncate_value("<unavailable>");
                format!("{index} {expr} = {}", ctx.ansi(&value, &style.style_low))
            })
            .collect())
    }

    fn actions() -> Vec<Action<Self>> {
        vec![
            Action::new("watch", |s: &mut Self, arg| {
                anyhow::ensure!(!arg.is_empty(), "missing expression");
                s.watched.push(arg.to_string());
                Ok(None)
            })
            .doc("Watch an expression.")
            .complete(Completion::Expression)
            .redisplay(),
            Action::new("unwatch", |s: &mut Self, arg| {
                let index: usize = arg.trim().parse()?;
                anyhow::ensure!(index < s.watched.len(), "expression not watched");
                s.watched.remove(index);
                Ok(None)
            })
            .doc("Stop watching an expression by index.")
            .redisplay(),
            Action::new("clear", |s: &mut Self, _| {
                s.watched.clear();
                Ok(None)
            })
            .doc("Clear all the watched expressions.")
            .redisplay(),
        ]
    }
}

// =============================================================================
// HOST LOOP
// =============================================================================

/// Turn readline markers and `\e` escapes of the prompt into plain bytes.
fn render_prompt(prompt: &str) -> String {
    prompt.replace(r"\[", "").replace(r"\]", "").replace(r"\e", "\x1b")
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let pc: Pc = Rc::new(Cell::new(BASE));
    let factories = vec![
        ModuleFactory::with({
            let pc = pc.clone();
            move || Source { pc: pc.clone(), context: 0 }
        }),
        ModuleFactory::with({
            let pc = pc.clone();
            move || Stack { pc: pc.clone(), limit: 0 }
        }),
        ModuleFactory::of::<Expressions>(),
    ];
    let mut dashboard = Dashboard::stdout(factories);
    config::load_all(&mut dashboard, &cli.config);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        eprint!("{} ", render_prompt(&dashboard.prompt()));
        io::stderr().flush()?;
        let Some(line) = lines.next().transpose()? else {
            break;
        };
        match line.trim() {
            "" => {}
            "quit" => break,
            "stop" | "step" => {
                if dashboard.is_running() {
                    pc.set(pc.get() + 1);
                }
                dashboard.on_event(HostEvent::Stopped);
            }
            "cont" => dashboard.on_event(HostEvent::Continued),
            "exit" => {
                dashboard.on_event(HostEvent::Exited);
                pc.set(BASE);
            }
            command => {
                commands::run(&mut dashboard, command);
            }
        }
    }

    dashboard.on_event(HostEvent::Exited);
    Ok(())
}
