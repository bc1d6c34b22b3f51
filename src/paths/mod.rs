//! Paths through a network and keyed collections of them.
pub mod collection;
mod matching;
pub mod path;

pub use collection::{PathEntry, Paths};
pub use path::{Aggregate, Path};
