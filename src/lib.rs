//! # debug-dashboard
//!
//! Modular status dashboard for interactive debuggers.
//!
//! Every time the debugged program halts, the dashboard asks each enabled
//! module for a block of lines and writes them, decorated with dividers, to
//! the console or to any number of external files and terminals.
//!
//! ## Architecture
//!
//! The host owns one [`Dashboard`] and feeds it lifecycle events and
//! command lines:
//! ```text
//! HostEvent::Stopped → Dashboard → Registry (enabled, ordered modules)
//!                               → RenderPass: group by target → divider + lines → write
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Core types (Geometry, OutputTarget, ScreenOps)
//! - [`error`] - Error taxonomy
//! - [`style`] - Typed attributes and the global style table
//! - [`renderer`] - ANSI output, dividers, width measurement
//! - [`engine`] - Module contract, registry and layout
//! - [`pipeline`] - Render state machine, destinations, the render pass
//! - [`dashboard`] - The context object and lifecycle events
//! - [`commands`] - Command routing
//! - [`config`] - Configuration discovery and loading

pub mod commands;
pub mod config;
pub mod dashboard;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod renderer;
pub mod style;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use dashboard::{CONTINUE_MARKER, Dashboard, HostEvent};

pub use engine::{
    Action, ActionInfo, Completion, LayoutEntry, Module, ModuleDescriptor, ModuleFactory, ModuleInstance, Registry,
    RenderContext,
};

pub use error::{AttributeError, CommandError, ConfigError, LayoutError, OutputError};

pub use pipeline::{Console, MemoryConsole, RenderState, StdoutConsole};

pub use renderer::{DividerSpec, OutputBuffer, divider, strip_ansi, visible_width};

pub use style::{Assignment, Attribute, AttributeInfo, DashboardStyle, Kind, Tier, Value};
