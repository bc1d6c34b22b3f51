use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique, stable identifier for a node within a network.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

/// A unique identifier for an edge. Parallel edges between the same pair of
/// nodes are told apart by this id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub String);

macro_rules! string_id {
    ($ty:ident) => {
        impl $ty {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[inline(always)]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $ty {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $ty {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&String> for $ty {
            fn from(s: &String) -> Self {
                Self(s.clone())
            }
        }

        impl From<&$ty> for $ty {
            fn from(id: &$ty) -> Self {
                id.clone()
            }
        }

        impl From<u32> for $ty {
            fn from(n: u32) -> Self {
                Self(n.to_string())
            }
        }

        impl From<u64> for $ty {
            fn from(n: u64) -> Self {
                Self(n.to_string())
            }
        }

        impl From<usize> for $ty {
            fn from(n: usize) -> Self {
                Self(n.to_string())
            }
        }

        impl From<i32> for $ty {
            fn from(n: i32) -> Self {
                Self(n.to_string())
            }
        }
    };
}

string_id!(NodeId);
string_id!(EdgeId);

/// The identity of a path inside a `Paths` collection: its node sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathKey(pub Vec<NodeId>);

impl PathKey {
    pub fn nodes(&self) -> &[NodeId] {
        &self.0
    }

    /// Joins the node ids with `separator`, e.g. `a-b-c`.
    pub fn joined(&self, separator: &str) -> String {
        self.0.iter().map(NodeId::as_str).collect::<Vec<_>>().join(separator)
    }
}

impl From<&[NodeId]> for PathKey {
    fn from(nodes: &[NodeId]) -> Self {
        Self(nodes.to_vec())
    }
}
