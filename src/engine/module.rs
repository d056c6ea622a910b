//! The Module contract.
//!
//! A module is an extension unit producing a labelled block of lines for one
//! render pass. Implementations declare their attributes and custom actions
//! as static tables; [`Hosted`] erases the concrete type so the registry can
//! hold any mix of modules behind [`ModuleInstance`].
//!
//! # Example
//!
//! ```rust
//! use debug_dashboard::engine::{Action, Module, RenderContext};
//! use debug_dashboard::style::Attribute;
//!
//! #[derive(Default)]
//! struct Notes {
//!     limit: i64,
//!     items: Vec<String>,
//! }
//!
//! impl Module for Notes {
//!     fn label(&self) -> String {
//!         "Notes".into()
//!     }
//!
//!     fn lines(&mut self, ctx: &RenderContext<'_>) -> anyhow::Result<Vec<String>> {
//!         let skip = self.items.len().saturating_sub(self.limit as usize);
//!         Ok(self.items.iter().skip(skip).map(|n| ctx.style().truncate_value(n)).collect())
//!     }
//!
//!     fn attributes() -> Vec<Attribute<Self>> {
//!         vec![Attribute::new("limit", 5i64, |n: &Self| n.limit.into(), |n, v| n.limit = v.as_int())]
//!     }
//!
//!     fn actions() -> Vec<Action<Self>> {
//!         vec![Action::new("add", |n: &mut Self, arg| {
//!             n.items.push(arg.to_string());
//!             Ok(None)
//!         })
//!         .doc("Add a note.")
//!         .redisplay()]
//!     }
//! }
//! ```

use std::any::type_name;

use crate::error::AttributeError;
use crate::renderer::divider;
use crate::style::{self, Assignment, Attribute, AttributeInfo, DashboardStyle, Tier, Value};
use crate::types::Geometry;

// =============================================================================
// Render Context
// =============================================================================

/// What a module receives when asked for its lines.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub geometry: Geometry,
    /// True when a style attribute changed since the previous pass.
    pub style_changed: bool,
    style: &'a DashboardStyle,
}

impl<'a> RenderContext<'a> {
    pub fn new(geometry: Geometry, style_changed: bool, style: &'a DashboardStyle) -> Self {
        Self {
            geometry,
            style_changed,
            style,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.geometry.columns()
    }

    #[inline]
    pub fn height(&self) -> Option<u16> {
        self.geometry.height
    }

    /// Global style attributes.
    pub fn style(&self) -> &'a DashboardStyle {
        self.style
    }

    /// Apply an SGR style honoring the `ansi` attribute.
    pub fn ansi(&self, text: &str, sgr: &str) -> String {
        self.style.ansi(text, sgr)
    }

    /// Secondary divider separating sub-sections of a module.
    pub fn divider(&self, label: &str, active: bool) -> String {
        divider(self.style, self.width(), label, Tier::Secondary, active)
    }
}

// =============================================================================
// Actions
// =============================================================================

/// Completion hint for an action argument, forwarded to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Completion {
    #[default]
    Nothing,
    Expression,
    Filename,
    Symbol,
    Location,
}

/// Handler of a module action: receives the raw argument text.
pub type ActionHandler<M> = fn(&mut M, &str) -> anyhow::Result<Option<String>>;

/// A named action a module exposes on the command surface.
pub struct Action<M> {
    pub name: &'static str,
    pub doc: &'static str,
    pub completion: Completion,
    /// Prefix actions only group sub-actions and take no argument.
    pub prefix: bool,
    /// Redisplay the dashboard after the handler succeeds.
    pub redisplay: bool,
    pub handler: ActionHandler<M>,
}

impl<M> Action<M> {
    pub fn new(name: &'static str, handler: ActionHandler<M>) -> Self {
        Self {
            name,
            doc: "",
            completion: Completion::Nothing,
            prefix: false,
            redisplay: false,
            handler,
        }
    }

    pub fn doc(mut self, doc: &'static str) -> Self {
        self.doc = doc;
        self
    }

    pub fn complete(mut self, completion: Completion) -> Self {
        self.completion = completion;
        self
    }

    pub fn prefix(mut self) -> Self {
        self.prefix = true;
        self
    }

    pub fn redisplay(mut self) -> Self {
        self.redisplay = true;
        self
    }

    fn info(&self) -> ActionInfo {
        ActionInfo {
            name: self.name,
            doc: self.doc,
            completion: self.completion,
            prefix: self.prefix,
            redisplay: self.redisplay,
        }
    }
}

/// Type-free description of an [`Action`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionInfo {
    pub name: &'static str,
    pub doc: &'static str,
    pub completion: Completion,
    pub prefix: bool,
    pub redisplay: bool,
}

// =============================================================================
// Module Trait
// =============================================================================

/// Contract every dashboard module satisfies.
pub trait Module {
    /// Label shown in the module's divider.
    fn label(&self) -> String;

    /// Lines to display. Zero lines marks the module temporarily inactive.
    fn lines(&mut self, ctx: &RenderContext<'_>) -> anyhow::Result<Vec<String>>;

    /// Documentation shown by the command surface.
    fn doc(&self) -> &str {
        ""
    }

    fn attributes() -> Vec<Attribute<Self>>
    where
        Self: Sized,
    {
        Vec::new()
    }

    fn actions() -> Vec<Action<Self>>
    where
        Self: Sized,
    {
        Vec::new()
    }
}

/// Object-safe view of a hosted module.
pub trait ModuleInstance {
    fn label(&self) -> String;
    fn doc(&self) -> &str;
    fn lines(&mut self, ctx: &RenderContext<'_>) -> anyhow::Result<Vec<String>>;
    fn set_attribute(&mut self, name: &str, raw: &str) -> Result<Assignment, AttributeError>;
    fn assign_attribute(&mut self, name: &str, value: Value) -> Result<Assignment, AttributeError>;
    fn attributes(&self) -> Vec<AttributeInfo>;
    fn actions(&self) -> Vec<ActionInfo>;
    /// Run an action; `None` when the module has no such action.
    fn invoke(&mut self, action: &str, arg: &str) -> Option<anyhow::Result<Option<String>>>;
}

/// A module together with its declared tables.
pub struct Hosted<M: Module> {
    module: M,
    attributes: Vec<Attribute<M>>,
    actions: Vec<Action<M>>,
}

impl<M: Module> Hosted<M> {
    /// Wrap a module and store its attribute defaults on it.
    pub fn new(mut module: M) -> Self {
        let attributes = M::attributes();
        style::initialize(&mut module, &attributes);
        Self {
            module,
            attributes,
            actions: M::actions(),
        }
    }
}

impl<M: Module> ModuleInstance for Hosted<M> {
    fn label(&self) -> String {
        self.module.label()
    }

    fn doc(&self) -> &str {
        self.module.doc()
    }

    fn lines(&mut self, ctx: &RenderContext<'_>) -> anyhow::Result<Vec<String>> {
        self.module.lines(ctx)
    }

    fn set_attribute(&mut self, name: &str, raw: &str) -> Result<Assignment, AttributeError> {
        style::set(&mut self.module, &self.attributes, name, raw)
    }

    fn assign_attribute(&mut self, name: &str, value: Value) -> Result<Assignment, AttributeError> {
        style::assign(&mut self.module, &self.attributes, name, value)
    }

    fn attributes(&self) -> Vec<AttributeInfo> {
        style::describe(&self.module, &self.attributes)
    }

    fn actions(&self) -> Vec<ActionInfo> {
        self.actions.iter().map(Action::info).collect()
    }

    fn invoke(&mut self, action: &str, arg: &str) -> Option<anyhow::Result<Option<String>>> {
        let handler = self.actions.iter().find(|a| a.name == action)?.handler;
        Some(handler(&mut self.module, arg))
    }
}

// =============================================================================
// Factories
// =============================================================================

/// Static registration entry: a derived name and a constructor.
pub struct ModuleFactory {
    name: String,
    build: Box<dyn Fn() -> Box<dyn ModuleInstance>>,
}

impl ModuleFactory {
    /// Register a default-constructible module type.
    pub fn of<M: Module + Default + 'static>() -> Self {
        Self::with(M::default)
    }

    /// Register a module type built by `build`, e.g. to capture host handles.
    pub fn with<M, F>(build: F) -> Self
    where
        M: Module + 'static,
        F: Fn() -> M + 'static,
    {
        Self {
            name: derived_name::<M>(),
            build: Box::new(move || -> Box<dyn ModuleInstance> { Box::new(Hosted::new(build())) }),
        }
    }

    /// Name derived from the implementing type.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn build(&self) -> Box<dyn ModuleInstance> {
        (self.build)()
    }
}

impl std::fmt::Debug for ModuleFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleFactory").field("name", &self.name).finish()
    }
}

/// Lower-cased last path segment of the type name, generics dropped.
pub fn derived_name<M>() -> String {
    let full = type_name::<M>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_lowercase()
}

// =============================================================================
// Tests
// =============================================================================
