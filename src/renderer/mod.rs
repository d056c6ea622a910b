//! Text renderer - the output layer.
//!
//! The renderer knows nothing about modules or destinations. It provides
//! escape sequences, divider composition, width measurement, and the buffer
//! a destination's screen is assembled in.

pub mod ansi;
pub mod divider;
pub mod output;
pub mod width;

pub use divider::{DividerSpec, divider};
pub use output::OutputBuffer;
pub use width::{strip_ansi, visible_width};
