//! The command resolution engine.
//!
//! Turns the query and the active [mode](crate::model::Mode) into a ranked list of candidates, and drives the palette
//! session from key presses.

mod cursor;
mod machine;
mod palette;
mod ranker;
mod request;
mod resolve;
mod session;

pub mod grammar;

pub use cursor::SelectionCursor;
pub use machine::Transition;
pub use palette::{Palette, PaletteKey};
pub use ranker::UsageRanker;
pub use request::{Completion, Request};
pub use resolve::{rank, rank_key, resolve};
pub use session::{Calculation, Session};
