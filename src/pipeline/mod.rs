//! Render Pipeline
//!
//! Turns the enabled modules of the registry into one screen per output
//! destination.
//!
//! # Pipeline Architecture
//!
//! ```text
//! lifecycle event → RenderState::Begin → group → collect → compose → write
//! ```
//!
//! ## Key Design Principles
//!
//! - **Synchronous**: a pass runs to completion before control returns
//! - **Non-reentrant**: [`RenderState`] refuses a render while one runs or
//!   while rendering is inhibited
//! - **Isolated failures**: a failing module or destination never aborts
//!   the rest of the pass

pub mod render;
pub mod state;
pub mod terminal;

pub use render::{NO_MODULE_ENABLED, NO_MODULE_LOADED, RenderGroup, RenderPass, collect, group, write_marker};
pub use state::{RenderEvent, RenderState};
pub use terminal::{
    Console, MemoryConsole, StdoutConsole, destination_geometry, open_destination, reset_destination,
    resolve_geometry,
};
