//! Graph algorithms that run on top of a `Network`.
pub mod shortest_path;

pub use shortest_path::{shortest_path, shortest_path_lengths};
