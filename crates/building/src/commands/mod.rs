//! Command pattern for grid edits.
//!
//! Every placement and removal runs as a [`PlacementCommand`] through a
//! [`CommandStack`]. A command captures the prior records of every cell it
//! touches, so reverting it never re-runs geometry or validation.

pub mod history;
pub mod types;


pub use history::CommandStack;
pub use types::{CommandContext, PlaceObject, PlacementCommand, RemoveObject};
