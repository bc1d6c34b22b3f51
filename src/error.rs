//! Defines the error taxonomy shared by networks, edges and paths.
use crate::store::{EdgeId, NodeId};
use thiserror::Error;

/// Every failure raised by a mutating or querying operation.
///
/// Errors are reported synchronously by the call that violates an invariant.
/// Mutations that fail leave the receiving object untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// An edge or query references a node that does not exist.
    #[error("Node '{0}' is not part of the network")]
    MissingNode(NodeId),

    /// A path or query references an edge that does not exist.
    #[error("Edge '{0}' is not part of the network")]
    MissingEdge(EdgeId),

    /// An explicit id (edge id or path key) is already taken.
    #[error("The id '{0}' is already in use")]
    DuplicateId(String),

    /// The next edge or node does not continue the path from its terminal node.
    #[error("Path ending at node '{terminal}' cannot continue with {next}")]
    DisconnectedPath { terminal: NodeId, next: String },

    /// A numeric parameter lies outside its valid domain.
    #[error("Invalid value {value} for '{parameter}': {reason}")]
    Domain {
        parameter: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// A positional query lies outside the path or its bounds are unordered.
    #[error("Range {start}..={end} is invalid for a sequence of {len} nodes")]
    Range { start: usize, end: usize, len: usize },

    /// The operation is not permitted for this object in its current state.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl NetworkError {
    pub(crate) fn domain(parameter: &'static str, value: f64, reason: &'static str) -> Self {
        NetworkError::Domain { parameter, value, reason }
    }
}

pub type Result<T> = std::result::Result<T, NetworkError>;
