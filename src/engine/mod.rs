//! Dashboard Engine - modules, registry and layout.
//!
//! The engine manages the set of modules known to a session:
//! - Module: the contract every extension satisfies
//! - Registry: one descriptor per module type, in display order
//! - Layout: reordering and toggling descriptors from directives
//!
//! # Architecture
//!
//! Modules are registered statically through [`ModuleFactory`] values,
//! each carrying a derived name and a constructor:
//!
//! ```text
//! [factory(stack), factory(assembly)] → discover → instantiate
//!     → [assembly(enabled, output=None), stack(enabled, output=None)]
//! ```
//!
//! After startup the descriptor set is fixed. Layout operations are a
//! permutation plus a filter of it.

pub mod layout;
pub mod module;
pub mod registry;

pub use layout::{LayoutEntry, parse_directive};
pub use module::{
    Action, ActionHandler, ActionInfo, Completion, Hosted, Module, ModuleFactory, ModuleInstance, RenderContext,
    derived_name,
};
pub use registry::{ModuleDescriptor, Registry, discover, instantiate};
