//! Data model of the palette: candidates, modes and glyph catalogs

mod candidate;
mod catalog;
mod mode;

pub use candidate::*;
pub use catalog::*;
pub use mode::*;
