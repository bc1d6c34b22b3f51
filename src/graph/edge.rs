//! Defines the `Edge` type, a connection between two nodes.

use super::attributes::{AttrValue, Attributes};
use super::road::RoadParams;
use crate::error::{NetworkError, Result};
use crate::store::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};

/// Weight used when an edge neither stores one nor has a cost function.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Selects which number an edge contributes as its weight.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WeightSource {
    /// Every edge counts as 1.
    Unweighted,
    /// The stored weight, falling back to the road cost and then to 1.
    #[default]
    Weight,
    /// A numeric attribute; edges without it count as 1.
    Attribute(String),
}

impl WeightSource {
    pub fn attribute(name: impl Into<String>) -> Self {
        WeightSource::Attribute(name.into())
    }
}

/// The payload of an edge, independent of its endpoints.
///
/// A road edge is an ordinary edge whose `road` slot is filled; code that
/// needs a cost function checks for it with [`Edge::has_cost_function`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Overrides the directedness of the owning network when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directed: Option<bool>,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub road: Option<RoadParams>,
}

/// An edge owned by a network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub u: NodeId,
    pub v: NodeId,
    #[serde(flatten)]
    pub data: EdgeData,
}

impl Edge {
    pub fn new(id: impl Into<EdgeId>, u: impl Into<NodeId>, v: impl Into<NodeId>) -> Self {
        Self { id: id.into(), u: u.into(), v: v.into(), data: EdgeData::default() }
    }

    pub fn endpoints(&self) -> (&NodeId, &NodeId) {
        (&self.u, &self.v)
    }

    pub fn is_self_loop(&self) -> bool {
        self.u == self.v
    }

    /// Directedness after applying this edge's override to `network_directed`.
    #[inline(always)]
    pub fn is_directed(&self, network_directed: bool) -> bool {
        self.data.directed.unwrap_or(network_directed)
    }

    /// The endpoint reached when traversing the edge from `from`, if the
    /// edge may be traversed from there.
    pub fn traverse_from(&self, from: &NodeId, network_directed: bool) -> Option<&NodeId> {
        if &self.u == from {
            Some(&self.v)
        } else if &self.v == from && !self.is_directed(network_directed) {
            Some(&self.u)
        } else {
            None
        }
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.data.attributes.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.data.attributes.set(key, value);
    }

    /// Merges `attrs` into the attribute table; last write wins per key.
    pub fn update(&mut self, attrs: &Attributes) {
        self.data.attributes.update(attrs);
    }

    /// The edge's own weight: stored value, else current road cost, else 1.
    pub fn weight(&self) -> f64 {
        self.data
            .weight
            .or_else(|| self.data.road.as_ref().map(RoadParams::cost))
            .unwrap_or(DEFAULT_WEIGHT)
    }

    pub fn weight_by(&self, source: &WeightSource) -> f64 {
        match source {
            WeightSource::Unweighted => DEFAULT_WEIGHT,
            WeightSource::Weight => self.weight(),
            WeightSource::Attribute(key) => self.data.attributes.get_f64(key).unwrap_or(DEFAULT_WEIGHT),
        }
    }

    /// Returns a copy running the other way, with id `r_<id>`.
    pub fn reversed(&self) -> Edge {
        Edge {
            id: EdgeId(format!("r_{}", self.id)),
            u: self.v.clone(),
            v: self.u.clone(),
            data: self.data.clone(),
        }
    }

    /// Swaps the endpoints in place.
    ///
    /// Refused for edges explicitly marked as directed: their orientation is
    /// part of what they mean. Edges that merely inherit directedness from
    /// their network may be flipped.
    pub fn reverse(&mut self) -> Result<()> {
        if self.data.directed == Some(true) {
            return Err(NetworkError::InvalidOperation(format!(
                "Edge '{}' is explicitly directed and cannot be reversed",
                self.id
            )));
        }
        std::mem::swap(&mut self.u, &mut self.v);
        Ok(())
    }

    pub fn has_cost_function(&self) -> bool {
        self.data.road.is_some()
    }

    pub fn road(&self) -> Option<&RoadParams> {
        self.data.road.as_ref()
    }

    pub fn road_mut(&mut self) -> Option<&mut RoadParams> {
        self.data.road.as_mut()
    }

    /// Evaluates the volume-delay function of a road edge.
    pub fn cost_function(&self, volume: f64) -> Result<f64> {
        match &self.data.road {
            Some(road) => road.cost_function(volume),
            None => Err(NetworkError::InvalidOperation(format!("Edge '{}' has no cost function", self.id))),
        }
    }
}

/// Describes an edge to be added to a network.
///
/// The id is optional; a network assigns one from its sequence counter when
/// it is left out.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeDef {
    pub id: Option<EdgeId>,
    pub u: NodeId,
    pub v: NodeId,
    pub data: EdgeData,
}

impl EdgeDef {
    pub fn new(u: impl Into<NodeId>, v: impl Into<NodeId>) -> Self {
        Self { id: None, u: u.into(), v: v.into(), data: EdgeData::default() }
    }

    pub fn id(mut self, id: impl Into<EdgeId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn weight(mut self, weight: f64) -> Self {
        self.data.weight = Some(weight);
        self
    }

    pub fn directed(mut self, directed: bool) -> Self {
        self.data.directed = Some(directed);
        self
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.data.attributes.set(key, value);
        self
    }

    pub fn attrs(mut self, attrs: &Attributes) -> Self {
        self.data.attributes.update(attrs);
        self
    }

    pub fn road(mut self, road: RoadParams) -> Self {
        self.data.road = Some(road);
        self
    }
}

impl<U: Into<NodeId>, V: Into<NodeId>> From<(U, V)> for EdgeDef {
    fn from((u, v): (U, V)) -> Self {
        EdgeDef::new(u, v)
    }
}

impl From<Edge> for EdgeDef {
    fn from(edge: Edge) -> Self {
        Self { id: Some(edge.id), u: edge.u, v: edge.v, data: edge.data }
    }
}
