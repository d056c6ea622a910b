//! The dashboard context object.
//!
//! One [`Dashboard`] owns everything a session needs: the module registry,
//! the global style values, the dashboard-level output, the render state
//! and the main console. Hosts construct it once and hand it lifecycle
//! events and command lines; there is no global state.

use std::fmt::Display;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::engine::{ModuleFactory, Registry};
use crate::error::{AttributeError, LayoutError};
use crate::pipeline::{self, Console, RenderEvent, RenderPass, RenderState, StdoutConsole};
use crate::style::{self, Assignment, Attribute, DashboardStyle, Value};

/// Label of the divider marking where program output resumes.
pub const CONTINUE_MARKER: &str = "Output/messages";

/// Lifecycle notifications from the host debugger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// Execution resumed.
    Continued,
    /// Execution halted; the dashboard is rendered.
    Stopped,
    /// The inferior process exited.
    Exited,
}

// =============================================================================
// Dashboard
// =============================================================================

pub struct Dashboard {
    registry: Registry,
    style: DashboardStyle,
    style_table: Vec<Attribute<DashboardStyle>>,
    output: Option<PathBuf>,
    enabled: bool,
    running: bool,
    state: RenderState,
    style_changed: bool,
    console: Box<dyn Console>,
}

impl Dashboard {
    /// Build a dashboard writing to `console` with the given modules.
    pub fn new(console: Box<dyn Console>, factories: Vec<ModuleFactory>) -> Self {
        let registry = Registry::new(factories);
        tracing::debug!(modules = ?registry.names(), "dashboard created");
        Self {
            registry,
            style: DashboardStyle::default(),
            style_table: DashboardStyle::attributes(),
            output: None,
            enabled: true,
            running: false,
            state: RenderState::Idle,
            style_changed: true,
            console,
        }
    }

    /// Build a dashboard on the process stdout.
    pub fn stdout(factories: Vec<ModuleFactory>) -> Self {
        Self::new(Box::new(StdoutConsole::new()), factories)
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn style(&self) -> &DashboardStyle {
        &self.style
    }

    pub fn style_table(&self) -> &[Attribute<DashboardStyle>] {
        &self.style_table
    }

    /// Dashboard-level output override.
    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the host reported a live inferior.
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    pub fn render_state(&self) -> RenderState {
        self.state
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    /// Run one render pass; returns whether it actually ran.
    ///
    /// Refused while disabled, while already rendering and while inhibited.
    pub fn render(&mut self, clear_console: bool) -> bool {
        if !self.enabled {
            return false;
        }
        let Some(next) = self.state.next(RenderEvent::Begin) else {
            tracing::debug!(state = ?self.state, "render suppressed");
            return false;
        };
        self.state = next;

        let errors = RenderPass {
            registry: &mut self.registry,
            style: &self.style,
            output: self.output.as_deref(),
            console: self.console.as_mut(),
            clear_console,
            style_changed: self.style_changed,
        }
        .run();

        self.style_changed = false;
        self.state = self.state.next(RenderEvent::Finish).unwrap_or(RenderState::Idle);
        for err in &errors {
            self.announce_error(err);
        }
        true
    }

    /// Manual redisplay: clears the console first.
    pub fn redisplay(&mut self) -> bool {
        self.render(true)
    }

    /// Redisplay only while an inferior is alive.
    pub fn refresh(&mut self) -> bool {
        self.running && self.redisplay()
    }

    /// Suppress renders; returns false if already inhibited or rendering.
    pub fn inhibit(&mut self) -> bool {
        match self.state.next(RenderEvent::Inhibit) {
            Some(next) => {
                self.state = next;
                true
            }
            None => false,
        }
    }

    /// End an inhibition window.
    pub fn release(&mut self) -> bool {
        match self.state.next(RenderEvent::Release) {
            Some(next) => {
                self.state = next;
                true
            }
            None => false,
        }
    }

    /// Run `f` with renders inhibited, releasing only what was taken.
    pub fn inhibited<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let taken = self.inhibit();
        let result = f(self);
        if taken {
            self.release();
        }
        result
    }

    // -------------------------------------------------------------------------
    // Announcements
    // -------------------------------------------------------------------------

    /// Print a message on the console.
    pub fn announce(&mut self, message: &str) {
        if let Err(err) = writeln!(self.console.writer(), "{message}") {
            tracing::warn!(error = %err, "cannot write to the console");
        }
    }

    /// Print an error on the console, styled as such.
    pub fn announce_error(&mut self, err: &dyn Display) {
        tracing::warn!(error = %err, "dashboard error");
        let text = self.style.ansi(&err.to_string(), &self.style.style_error);
        self.announce(&text);
    }

    /// Prompt text for the host, reflecting the running state.
    pub fn prompt(&self) -> String {
        let status = if self.running {
            &self.style.prompt_running
        } else {
            &self.style.prompt_not_running
        };
        self.style.prompt.replace("{status}", status)
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    pub fn on_event(&mut self, event: HostEvent) {
        tracing::debug!(?event, "host event");
        match event {
            HostEvent::Continued => {
                self.running = true;
                if self.enabled && self.console_active() {
                    if let Err(err) = pipeline::write_marker(self.console.as_mut(), &self.style, CONTINUE_MARKER) {
                        tracing::warn!(error = %err, "cannot mark the console");
                    }
                }
            }
            HostEvent::Stopped => {
                self.running = true;
                self.render(false);
            }
            HostEvent::Exited => {
                self.running = false;
                for path in self.destinations() {
                    if let Err(err) = pipeline::reset_destination(&path) {
                        tracing::debug!(error = %err, "terminal reset skipped");
                    }
                }
            }
        }
    }

    /// The console receives content: no dashboard-level override and at
    /// least one enabled module without its own.
    pub fn console_active(&self) -> bool {
        self.output.is_none() && self.registry.enabled().any(|m| m.output.is_none())
    }

    /// Every distinct external destination currently configured.
    pub fn destinations(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = Vec::new();
        let candidates = self
            .output
            .iter()
            .chain(self.registry.modules().iter().filter_map(|m| m.output.as_ref()));
        for path in candidates {
            if !paths.contains(path) {
                paths.push(path.clone());
            }
        }
        paths
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    /// Enable or disable the whole engine.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if enabled {
            self.refresh();
        }
    }

    /// Change the dashboard-level output; `None` restores the console.
    pub fn set_output(&mut self, output: Option<PathBuf>) {
        let previous = std::mem::replace(&mut self.output, output);
        reset_previous(previous.as_deref());
        self.refresh();
    }

    /// Change one module's output; `None` falls back to the dashboard's.
    ///
    /// Only the module's own previous override is reset: a dashboard-level
    /// destination stays shared with the other modules.
    pub fn set_module_output(&mut self, index: usize, output: Option<PathBuf>) {
        let Some(module) = self.registry.modules_mut().get_mut(index) else {
            return;
        };
        let previous = std::mem::replace(&mut module.output, output);
        reset_previous(previous.as_deref());
        self.refresh();
    }

    /// Write a global style attribute from its literal text.
    pub fn set_style(&mut self, name: &str, raw: &str) -> Result<Assignment, AttributeError> {
        let assignment = style::set(&mut self.style, &self.style_table, name, raw)?;
        self.after_assignment(&assignment);
        Ok(assignment)
    }

    /// Write a global style attribute from a typed value.
    pub fn assign_style(&mut self, name: &str, value: Value) -> Result<Assignment, AttributeError> {
        let assignment = style::assign(&mut self.style, &self.style_table, name, value)?;
        self.after_assignment(&assignment);
        Ok(assignment)
    }

    /// Write an attribute of the module at `index`.
    pub fn set_module_style(&mut self, index: usize, name: &str, raw: &str) -> Result<Assignment, AttributeError> {
        let module = self
            .registry
            .modules_mut()
            .get_mut(index)
            .ok_or_else(|| AttributeError::Unknown(name.to_string()))?;
        let assignment = module.instance.set_attribute(name, raw)?;
        self.after_assignment(&assignment);
        Ok(assignment)
    }

    /// Typed counterpart of [`Dashboard::set_module_style`].
    pub fn assign_module_style(&mut self, index: usize, name: &str, value: Value) -> Result<Assignment, AttributeError> {
        let module = self
            .registry
            .modules_mut()
            .get_mut(index)
            .ok_or_else(|| AttributeError::Unknown(name.to_string()))?;
        let assignment = module.instance.assign_attribute(name, value)?;
        self.after_assignment(&assignment);
        Ok(assignment)
    }

    fn after_assignment(&mut self, assignment: &Assignment) {
        if let Assignment::Written(_) = assignment {
            self.style_changed = true;
            self.refresh();
        }
    }

    /// Apply layout directives, then redisplay.
    pub fn apply_layout<S: AsRef<str>>(&mut self, directives: &[S]) -> Result<(), LayoutError> {
        self.registry.apply_layout(directives)?;
        self.refresh();
        Ok(())
    }

    /// Restore alphabetical order with everything enabled.
    pub fn reset_layout(&mut self) {
        self.registry.reset_layout();
        self.refresh();
    }
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("registry", &self.registry)
            .field("output", &self.output)
            .field("enabled", &self.enabled)
            .field("running", &self.running)
            .field("state", &self.state)
            .finish()
    }
}

fn reset_previous(previous: Option<&Path>) {
    if let Some(path) = previous {
        if let Err(err) = pipeline::reset_destination(path) {
            tracing::debug!(error = %err, "terminal reset skipped");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
