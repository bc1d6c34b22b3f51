//! network.rs
//! The `Network` container: attributed nodes, attributed edges and the index
//! maps that keep them consistent.
//!
//! Nodes and edges live in insertion-ordered registries. Two incidence maps
//! are maintained on every mutation:
//!
//! * `incident`: node -> ids of the edges touching it (self-loops listed once),
//! * `pair_edges`: ordered node pair -> ids of the edges traversable from the
//!   first node to the second (undirected edges are listed under both orders).
//!
//! Matrix views are derived lazily from these and dropped on every mutation,
//! see `matrix.rs`.

use super::attributes::{AttrValue, Attributes};
use super::edge::{Edge, EdgeDef, WeightSource};
use super::matrix::DerivedViews;
use super::node::Node;
use super::road::{RoadParams, RoadSpec};
use crate::config::{CnetConfig, NetworkConfig, RemovalPolicy, RoadDefaults};
use crate::error::{NetworkError, Result};
use crate::store::{EdgeId, NodeId, Registry};
use petgraph::Direction;
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};

/// Edge ids attached to a node or a node pair. Most nodes have few edges.
pub type EdgeList = SmallVec<[EdgeId; 4]>;

#[derive(Debug, Clone)]
pub struct Network {
    pub(crate) directed: bool,
    pub(crate) attributes: Attributes,
    pub(crate) config: NetworkConfig,
    pub(crate) road_defaults: RoadDefaults,
    pub(crate) nodes: Registry<NodeId, Node>,
    pub(crate) edges: Registry<EdgeId, Edge>,
    incident: HashMap<NodeId, EdgeList>,
    pair_edges: HashMap<(NodeId, NodeId), EdgeList>,
    pub(crate) next_edge_seq: u64,
    pub(crate) derived: DerivedViews,
}

impl Default for Network {
    fn default() -> Self {
        Self::with_config(&CnetConfig::default())
    }
}

impl Network {
    pub fn new(directed: bool) -> Self {
        let mut net = Self::default();
        net.directed = directed;
        net.config.directed = directed;
        net
    }

    pub fn with_config(config: &CnetConfig) -> Self {
        Self {
            directed: config.network.directed,
            attributes: Attributes::new(),
            config: config.network.clone(),
            road_defaults: config.road.clone(),
            nodes: Registry::new(),
            edges: Registry::new(),
            incident: HashMap::new(),
            pair_edges: HashMap::new(),
            next_edge_seq: 0,
            derived: DerivedViews::default(),
        }
    }

    pub fn is_directed(&self) -> bool { self.directed }

    pub fn config(&self) -> &NetworkConfig { &self.config }

    pub fn road_defaults(&self) -> &RoadDefaults { &self.road_defaults }

    // --- Network attributes ---

    pub fn name(&self) -> Option<&str> {
        self.attributes.get("name").and_then(AttrValue::as_str)
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.attributes.set("name", name.into());
    }

    pub fn attributes(&self) -> &Attributes { &self.attributes }

    pub fn update(&mut self, attrs: &Attributes) {
        self.attributes.update(attrs);
    }

    // --- Nodes ---

    /// Adds `id` if absent. Returns `true` if the node is new.
    pub fn add_node(&mut self, id: impl Into<NodeId>) -> bool {
        self.add_node_with(Node::new(id))
    }

    /// Upserts `node`: a new id is inserted, an existing one has its
    /// attributes merged. Returns `true` if the node is new.
    pub fn add_node_with(&mut self, node: Node) -> bool {
        if let Some(existing) = self.nodes.get_mut(&node.id) {
            log::warn!("Node '{}' already exists; merging attributes", node.id);
            existing.update(&node.attributes);
            return false;
        }
        self.incident.entry(node.id.clone()).or_default();
        let id = node.id.clone();
        // The key was just checked, so the insert cannot be refused.
        let _ = self.nodes.insert(id, node);
        self.invalidate();
        true
    }

    pub fn add_nodes_from<I, T>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = T>,
        T: Into<NodeId>,
    {
        let added = ids.into_iter().map(|id| self.add_node(id)).filter(|new| *new).count();
        log::debug!("Added {} new nodes", added);
        added
    }

    pub fn has_node(&self, id: &NodeId) -> bool { self.nodes.contains(id) }

    pub fn node(&self, id: &NodeId) -> Option<&Node> { self.nodes.get(id) }

    /// Mutable access to a node's attributes. Identity cannot change.
    pub fn node_attributes_mut(&mut self, id: &NodeId) -> Option<&mut Attributes> {
        self.nodes.get_mut(id).map(|n| &mut n.attributes)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ { self.nodes.values() }

    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> + '_ { self.nodes.keys() }

    pub fn number_of_nodes(&self) -> usize { self.nodes.len() }

    /// Removes a node. Under `RemovalPolicy::Cascade` its incident edges go
    /// with it; under `Reject` a node with incident edges is refused.
    pub fn remove_node(&mut self, id: &NodeId) -> Result<Node> {
        self.check_node_removable(id)?;
        Ok(self.take_node(id))
    }

    /// Removes several nodes. Nothing is removed unless all of them can be.
    pub fn remove_nodes_from(&mut self, ids: &[NodeId]) -> Result<Vec<Node>> {
        for id in ids {
            self.check_node_removable(id)?;
        }
        let mut seen = HashSet::new();
        let removed: Vec<Node> = ids.iter().filter(|id| seen.insert(*id)).map(|id| self.take_node(id)).collect();
        log::debug!("Removed {} nodes", removed.len());
        Ok(removed)
    }

    fn check_node_removable(&self, id: &NodeId) -> Result<()> {
        if !self.nodes.contains(id) {
            return Err(NetworkError::MissingNode(id.clone()));
        }
        let degree = self.incident.get(id).map_or(0, |list| list.len());
        if degree > 0 && self.config.removal_policy == RemovalPolicy::Reject {
            return Err(NetworkError::InvalidOperation(format!(
                "Node '{}' still has {} incident edges",
                id, degree
            )));
        }
        Ok(())
    }

    /// Removes a node known to be removable, cascading to its edges.
    fn take_node(&mut self, id: &NodeId) -> Node {
        let incident = self.incident.remove(id).unwrap_or_default();
        if !incident.is_empty() {
            log::warn!("Removing node '{}' also removes {} incident edges", id, incident.len());
        }
        for edge_id in &incident {
            self.take_edge(edge_id);
        }
        self.invalidate();
        self.nodes.remove(id).unwrap_or_else(|| Node::new(id))
    }

    // --- Edges ---

    /// Adds an edge and returns its id.
    ///
    /// Accepts anything convertible into an [`EdgeDef`], so both
    /// `net.add_edge(("a", "b"))` and builder-style definitions work.
    pub fn add_edge(&mut self, def: impl Into<EdgeDef>) -> Result<EdgeId> {
        let def = def.into();
        self.check_edge_def(&def, &HashSet::new())?;
        Ok(self.insert_edge(def, &HashSet::new()))
    }

    /// Adds several edges. The whole batch is validated first, so a failure
    /// leaves the network unchanged.
    pub fn add_edges_from<I, T>(&mut self, defs: I) -> Result<Vec<EdgeId>>
    where
        I: IntoIterator<Item = T>,
        T: Into<EdgeDef>,
    {
        let defs: Vec<EdgeDef> = defs.into_iter().map(Into::into).collect();
        let mut reserved = HashSet::new();
        for def in &defs {
            self.check_edge_def(def, &reserved)?;
            if let Some(id) = &def.id {
                reserved.insert(id.clone());
            }
        }
        let ids: Vec<EdgeId> = defs.into_iter().map(|def| self.insert_edge(def, &reserved)).collect();
        log::debug!("Added {} edges", ids.len());
        Ok(ids)
    }

    /// Adds a road edge whose free-flow time is `length / free_flow_speed`.
    ///
    /// See [`RoadSpec`] for where each parameter comes from. The edge keeps
    /// its length as the `length` attribute. Parameters that fell back to the
    /// network defaults are logged once the edge is in place.
    pub fn add_road_edge(&mut self, def: impl Into<EdgeDef>, spec: RoadSpec) -> Result<EdgeId> {
        let def = def.into();
        self.check_edge_def(&def, &HashSet::new())?;
        let attrs = &def.data.attributes;
        let length = match spec.length.or_else(|| attrs.get_f64("length")) {
            Some(length) => length,
            None => self.def_length(&def, spec.length_mode.unwrap_or(self.road_defaults.length_mode))?,
        };
        let capacity = spec.capacity.or_else(|| attrs.get_f64("capacity"));
        let speed = spec.free_flow_speed.or_else(|| attrs.get_f64("free_flow_speed"));
        let road = RoadParams::from_length_with_defaults(
            length,
            speed.unwrap_or(self.road_defaults.free_flow_speed),
            capacity.unwrap_or(self.road_defaults.capacity),
            &self.road_defaults,
        )?;
        let mut def = def.road(road);
        def.data.attributes.set("length", length);
        let id = self.add_edge(def)?;
        if capacity.is_none() {
            log::warn!("No capacity given for road edge '{}'; using default {}", id, self.road_defaults.capacity);
        }
        if speed.is_none() {
            log::warn!(
                "No free flow speed given for road edge '{}'; using default {}",
                id,
                self.road_defaults.free_flow_speed
            );
        }
        Ok(id)
    }

    fn check_edge_def(&self, def: &EdgeDef, reserved: &HashSet<EdgeId>) -> Result<()> {
        if let Some(id) = &def.id {
            if self.edges.contains(id) || reserved.contains(id) {
                return Err(NetworkError::DuplicateId(id.to_string()));
            }
        }
        if !self.config.auto_create_nodes {
            for node in [&def.u, &def.v] {
                if !self.nodes.contains(node) {
                    return Err(NetworkError::MissingNode(node.clone()));
                }
            }
        }
        if let Some(w) = def.data.weight {
            check_weight(w)?;
        }
        if let Some(road) = &def.data.road {
            road.validate()?;
        }
        Ok(())
    }

    /// Inserts a validated definition, creating endpoints if configured.
    fn insert_edge(&mut self, def: EdgeDef, reserved: &HashSet<EdgeId>) -> EdgeId {
        for node in [&def.u, &def.v] {
            if !self.nodes.contains(node) {
                self.add_node(node.clone());
            }
        }
        let id = match def.id {
            Some(id) => id,
            None => self.next_edge_id(reserved),
        };
        let edge = Edge { id: id.clone(), u: def.u, v: def.v, data: def.data };
        self.index_edge(&edge);
        // Ids are checked by `check_edge_def` or freshly generated.
        let _ = self.edges.insert(id.clone(), edge);
        self.invalidate();
        id
    }

    fn next_edge_id(&mut self, reserved: &HashSet<EdgeId>) -> EdgeId {
        loop {
            let candidate = EdgeId(format!("{}{}", self.config.edge_id_prefix, self.next_edge_seq));
            self.next_edge_seq += 1;
            if !self.edges.contains(&candidate) && !reserved.contains(&candidate) {
                return candidate;
            }
        }
    }

    fn index_edge(&mut self, edge: &Edge) {
        self.incident.entry(edge.u.clone()).or_default().push(edge.id.clone());
        if !edge.is_self_loop() {
            self.incident.entry(edge.v.clone()).or_default().push(edge.id.clone());
        }
        self.index_pairs(edge);
    }

    fn index_pairs(&mut self, edge: &Edge) {
        self.pair_edges.entry((edge.u.clone(), edge.v.clone())).or_default().push(edge.id.clone());
        if !edge.is_directed(self.directed) && !edge.is_self_loop() {
            self.pair_edges.entry((edge.v.clone(), edge.u.clone())).or_default().push(edge.id.clone());
        }
    }

    fn unindex_pairs(&mut self, edge: &Edge) {
        for key in [(edge.u.clone(), edge.v.clone()), (edge.v.clone(), edge.u.clone())] {
            if let Some(list) = self.pair_edges.get_mut(&key) {
                list.retain(|e| e != &edge.id);
                if list.is_empty() {
                    self.pair_edges.remove(&key);
                }
            }
        }
    }

    pub fn has_edge(&self, id: &EdgeId) -> bool { self.edges.contains(id) }

    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> { self.edges.get(id) }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ { self.edges.values() }

    pub fn edge_ids(&self) -> impl Iterator<Item = &EdgeId> + '_ { self.edges.keys() }

    pub fn number_of_edges(&self) -> usize { self.edges.len() }

    /// Edges traversable from `u` to `v`, in insertion order.
    pub fn edges_between(&self, u: &NodeId, v: &NodeId) -> &[EdgeId] {
        self.pair_edges.get(&(u.clone(), v.clone())).map(|list| list.as_slice()).unwrap_or(&[])
    }

    pub fn has_edge_between(&self, u: &NodeId, v: &NodeId) -> bool {
        !self.edges_between(u, v).is_empty()
    }

    pub fn remove_edge(&mut self, id: &EdgeId) -> Result<Edge> {
        self.take_edge(id).ok_or_else(|| NetworkError::MissingEdge(id.clone()))
    }

    /// Removes several edges. Nothing is removed unless all of them exist.
    pub fn remove_edges_from(&mut self, ids: &[EdgeId]) -> Result<Vec<Edge>> {
        if let Some(missing) = ids.iter().find(|id| !self.edges.contains(id)) {
            return Err(NetworkError::MissingEdge(missing.clone()));
        }
        let removed: Vec<Edge> = ids.iter().filter_map(|id| self.take_edge(id)).collect();
        log::debug!("Removed {} edges", removed.len());
        Ok(removed)
    }

    /// Removes the single edge running from `u` to `v`.
    pub fn remove_edge_between(&mut self, u: &NodeId, v: &NodeId) -> Result<Edge> {
        for node in [u, v] {
            if !self.nodes.contains(node) {
                return Err(NetworkError::MissingNode(node.clone()));
            }
        }
        match self.edges_between(u, v) {
            [] => Err(NetworkError::InvalidOperation(format!("No edge from '{}' to '{}'", u, v))),
            [id] => {
                let id = id.clone();
                self.remove_edge(&id)
            }
            many => Err(NetworkError::InvalidOperation(format!(
                "{} parallel edges from '{}' to '{}'; remove one by id",
                many.len(),
                u,
                v
            ))),
        }
    }

    fn take_edge(&mut self, id: &EdgeId) -> Option<Edge> {
        let edge = self.edges.remove(id)?;
        for node in [&edge.u, &edge.v] {
            if let Some(list) = self.incident.get_mut(node) {
                list.retain(|e| e != id);
            }
        }
        self.unindex_pairs(&edge);
        self.invalidate();
        Some(edge)
    }

    /// Swaps the endpoints of an edge in place, keeping its id.
    pub fn reverse_edge(&mut self, id: &EdgeId) -> Result<()> {
        let mut edge = self.edges.get(id).cloned().ok_or_else(|| NetworkError::MissingEdge(id.clone()))?;
        let before = edge.clone();
        edge.reverse()?;
        self.unindex_pairs(&before);
        self.index_pairs(&edge);
        if let Some(slot) = self.edges.get_mut(id) {
            *slot = edge;
        }
        self.invalidate();
        Ok(())
    }

    /// Merges attributes into an edge.
    pub fn update_edge(&mut self, id: &EdgeId, attrs: &Attributes) -> Result<()> {
        let edge = self.edges.get_mut(id).ok_or_else(|| NetworkError::MissingEdge(id.clone()))?;
        edge.update(attrs);
        self.invalidate();
        Ok(())
    }

    pub fn set_edge_weight(&mut self, id: &EdgeId, weight: f64) -> Result<()> {
        check_weight(weight)?;
        let edge = self.edges.get_mut(id).ok_or_else(|| NetworkError::MissingEdge(id.clone()))?;
        edge.data.weight = Some(weight);
        self.invalidate();
        Ok(())
    }

    /// Sets the volume of a road edge and returns its new cost.
    pub fn set_edge_volume(&mut self, id: &EdgeId, volume: f64) -> Result<f64> {
        let edge = self.edges.get_mut(id).ok_or_else(|| NetworkError::MissingEdge(id.clone()))?;
        let road = edge
            .data
            .road
            .as_mut()
            .ok_or_else(|| NetworkError::InvalidOperation(format!("Edge '{}' has no cost function", id)))?;
        let cost = road.set_volume(volume)?;
        self.invalidate();
        Ok(cost)
    }

    /// Edge weights in insertion order.
    pub fn weights(&self, source: &WeightSource) -> Vec<(EdgeId, f64)> {
        self.edges.values().map(|e| (e.id.clone(), e.weight_by(source))).collect()
    }

    // --- Degrees ---

    /// How often `edge` leaves (or enters) `node`: undirected edges count in
    /// both directions and an undirected self-loop counts twice, matching the
    /// adjacency matrix.
    fn multiplicity(&self, edge: &Edge, node: &NodeId, direction: Direction) -> usize {
        let (near, far) = match direction {
            Direction::Outgoing => (&edge.u, &edge.v),
            Direction::Incoming => (&edge.v, &edge.u),
        };
        let mut count = usize::from(near == node);
        if !edge.is_directed(self.directed) && far == node {
            count += 1;
        }
        count
    }

    /// Number of edge ends leaving (`Outgoing`) or entering (`Incoming`) a node.
    pub fn degree(&self, node: &NodeId, direction: Direction) -> Result<usize> {
        let incident = self.incident.get(node).ok_or_else(|| NetworkError::MissingNode(node.clone()))?;
        Ok(incident
            .iter()
            .filter_map(|id| self.edges.get(id))
            .map(|e| self.multiplicity(e, node, direction))
            .sum())
    }

    /// Weighted degree; equals the node's adjacency row (or column) sum.
    pub fn weighted_degree(&self, node: &NodeId, direction: Direction, source: &WeightSource) -> Result<f64> {
        let incident = self.incident.get(node).ok_or_else(|| NetworkError::MissingNode(node.clone()))?;
        Ok(incident
            .iter()
            .filter_map(|id| self.edges.get(id))
            .map(|e| self.multiplicity(e, node, direction) as f64 * e.weight_by(source))
            .sum())
    }

    // --- Index maps ---

    /// Node -> incident edge ids. Every node has an entry.
    pub fn node_to_edges_map(&self) -> &HashMap<NodeId, EdgeList> { &self.incident }

    /// Ordered node pair -> ids of the edges traversable from the first node
    /// to the second. Undirected edges appear under both orders.
    pub fn nodes_to_edges_map(&self) -> &HashMap<(NodeId, NodeId), EdgeList> { &self.pair_edges }

    /// Edge id -> `(u, v)`.
    pub fn edge_to_nodes_map(&self) -> HashMap<EdgeId, (NodeId, NodeId)> {
        self.edges.values().map(|e| (e.id.clone(), (e.u.clone(), e.v.clone()))).collect()
    }

    /// Drops every derived view; the next matrix read rebuilds it.
    #[inline(always)]
    pub(crate) fn invalidate(&mut self) {
        self.derived = DerivedViews::default();
    }
}

fn check_weight(w: f64) -> Result<()> {
    if w.is_finite() {
        Ok(())
    } else {
        Err(NetworkError::domain("weight", w, "must be finite"))
    }
}
