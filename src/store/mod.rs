//! Identifier types, ordered storage and serializable snapshots.
pub mod registry;
pub mod snapshot;
pub mod types;

pub use registry::Registry;
pub use snapshot::{NetworkSnapshot, PathRecord, PathsSnapshot};
pub use types::{EdgeId, NodeId, PathKey};
