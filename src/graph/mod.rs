//! Defines the network data model: nodes, edges, road edges and the
//! `Network` container with its matrix views.
pub mod attributes;
pub mod edge;
pub mod matrix;
pub mod network;
pub mod node;
pub mod road;
pub mod spatial;

// Re-export key types for convenient access
pub use attributes::{AttrValue, Attributes};
pub use edge::{Edge, EdgeData, EdgeDef, WeightSource, DEFAULT_WEIGHT};
pub use matrix::NodeIndex;
pub use network::{EdgeList, Network};
pub use node::Node;
pub use road::{RoadParams, RoadSpec};
pub use spatial::{euclidean, haversine};
