//! Defines the `Node` type: an identifier with an attribute table.

use super::attributes::{AttrValue, Attributes};
use crate::store::NodeId;
use serde::{Deserialize, Serialize};

/// A vertex of a network.
///
/// Nodes carry no structural state of their own; incidence is tracked by the
/// owning `Network` so that a node can be copied or serialized on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(default)]
    pub attributes: Attributes,
}

impl Node {
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self { id: id.into(), attributes: Attributes::new() }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.attributes.set(key, value);
    }

    pub fn update(&mut self, attrs: &Attributes) {
        self.attributes.update(attrs);
    }
}
