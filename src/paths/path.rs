//! Defines `Path`: a walk through a network, stored as the node sequence and
//! the ids of the edges between consecutive nodes.
//!
//! A path refers to its network's edges by id only. Operations that need
//! edge data (weights) take the network as an argument.

use super::collection::Paths;
use super::matching::{find_window, maximal_common_runs};
use crate::config::{PathsConfig, SharedPolicy};
use crate::error::{NetworkError, Result};
use crate::graph::{AttrValue, Attributes, Network, WeightSource};
use crate::store::{EdgeId, NodeId, PathKey};
use serde::{Deserialize, Serialize};

/// How edge weights are combined into a path weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Aggregate {
    #[default]
    Sum,
    Product,
    Min,
    Max,
    Mean,
}

/// Invariant: `edges.len() + 1 == nodes.len()` unless both are empty, and
/// `edges[i]` connects `nodes[i]` to `nodes[i + 1]`.
///
/// Deserialization checks the lengths; whether the edges exist is only known
/// to a network, see [`Path::validate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PathParts")]
pub struct Path {
    nodes: Vec<NodeId>,
    edges: Vec<EdgeId>,
    attributes: Attributes,
}

#[derive(Deserialize)]
struct PathParts {
    nodes: Vec<NodeId>,
    #[serde(default)]
    edges: Vec<EdgeId>,
    #[serde(default)]
    attributes: Attributes,
}

impl TryFrom<PathParts> for Path {
    type Error = NetworkError;

    fn try_from(parts: PathParts) -> Result<Self> {
        check_shape(&parts.nodes, &parts.edges)?;
        Ok(Path { nodes: parts.nodes, edges: parts.edges, attributes: parts.attributes })
    }
}

fn check_shape(nodes: &[NodeId], edges: &[EdgeId]) -> Result<()> {
    if nodes.len() == edges.len() + 1 || (nodes.is_empty() && edges.is_empty()) {
        Ok(())
    } else {
        Err(NetworkError::InvalidOperation(format!(
            "{} nodes cannot be joined by {} edges",
            nodes.len(),
            edges.len()
        )))
    }
}

impl Path {
    pub fn new() -> Self { Self::default() }

    /// Builds a path visiting `nodes` in order, taking the first edge
    /// between each consecutive pair.
    pub fn from_nodes<I, T>(net: &Network, nodes: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<NodeId>,
    {
        let mut path = Path::new();
        for id in nodes {
            path.add_node(net, id)?;
        }
        Ok(path)
    }

    pub fn from_edges<I, T>(net: &Network, edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<EdgeId>,
    {
        let mut path = Path::new();
        for id in edges {
            path.add_edge(net, id)?;
        }
        Ok(path)
    }

    /// Assembles a path from sequences already known to be contiguous.
    pub(crate) fn from_parts(nodes: Vec<NodeId>, edges: Vec<EdgeId>) -> Self {
        Self { nodes, edges, attributes: Attributes::new() }
    }

    pub(crate) fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Checks that every node and edge exists in `net` and that each edge
    /// leads from its node to the next one.
    pub fn validate(&self, net: &Network) -> Result<()> {
        if let Some(missing) = self.nodes.iter().find(|n| !net.has_node(n)) {
            return Err(NetworkError::MissingNode(missing.clone()));
        }
        check_shape(&self.nodes, &self.edges)?;
        for (i, id) in self.edges.iter().enumerate() {
            let edge = net.edge(id).ok_or_else(|| NetworkError::MissingEdge(id.clone()))?;
            if edge.traverse_from(&self.nodes[i], net.is_directed()) != Some(&self.nodes[i + 1]) {
                return Err(NetworkError::DisconnectedPath {
                    terminal: self.nodes[i].clone(),
                    next: format!("edge '{}'", id),
                });
            }
        }
        Ok(())
    }

    /// Number of edges, the usual graph-theoretic length.
    ///
    /// Not the opposite of [`is_empty`](Self::is_empty): a single-node path
    /// has length 0 but is not empty. Use [`node_count`](Self::node_count)
    /// for the number of positions.
    pub fn len(&self) -> usize { self.edges.len() }

    /// True iff the path has no nodes at all. A single-node path is not
    /// empty even though its [`len`](Self::len) is 0.
    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

    pub fn node_count(&self) -> usize { self.nodes.len() }

    pub fn nodes(&self) -> &[NodeId] { &self.nodes }

    pub fn edges(&self) -> &[EdgeId] { &self.edges }

    pub fn source(&self) -> Option<&NodeId> { self.nodes.first() }

    pub fn terminal(&self) -> Option<&NodeId> { self.nodes.last() }

    pub fn key(&self) -> PathKey { PathKey(self.nodes.clone()) }

    pub fn attributes(&self) -> &Attributes { &self.attributes }

    pub fn get(&self, key: &str) -> Option<&AttrValue> { self.attributes.get(key) }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.attributes.set(key, value);
    }

    pub fn update(&mut self, attrs: &Attributes) {
        self.attributes.update(attrs);
    }

    /// The `name` attribute, or the node ids joined by `-`.
    pub fn name(&self) -> String {
        self.name_with(&PathsConfig::default().separator)
    }

    pub fn name_with(&self, separator: &str) -> String {
        match self.attributes.get("name").and_then(AttrValue::as_str) {
            Some(name) => name.to_string(),
            None => self.key().joined(separator),
        }
    }

    /// Extends the path to node `id` over the first edge leading there from
    /// the current terminal node. On an empty path the node becomes the start.
    pub fn add_node(&mut self, net: &Network, id: impl Into<NodeId>) -> Result<()> {
        let id = id.into();
        if !net.has_node(&id) {
            return Err(NetworkError::MissingNode(id));
        }
        let Some(terminal) = self.nodes.last() else {
            self.nodes.push(id);
            return Ok(());
        };
        match net.edges_between(terminal, &id).first() {
            Some(edge) => {
                self.edges.push(edge.clone());
                self.nodes.push(id);
                Ok(())
            }
            None => Err(NetworkError::DisconnectedPath {
                terminal: terminal.clone(),
                next: format!("node '{}'", id),
            }),
        }
    }

    /// Extends the path over edge `id`, which must leave the current terminal
    /// node. On an empty path the edge's `(u, v)` become the first two nodes.
    pub fn add_edge(&mut self, net: &Network, id: impl Into<EdgeId>) -> Result<()> {
        let id = id.into();
        let edge = net.edge(&id).ok_or_else(|| NetworkError::MissingEdge(id.clone()))?;
        let Some(terminal) = self.nodes.last() else {
            self.nodes.push(edge.u.clone());
            self.nodes.push(edge.v.clone());
            self.edges.push(id);
            return Ok(());
        };
        match edge.traverse_from(terminal, net.is_directed()) {
            Some(next) => {
                self.nodes.push(next.clone());
                self.edges.push(id);
                Ok(())
            }
            None => Err(NetworkError::DisconnectedPath {
                terminal: terminal.clone(),
                next: format!("edge '{}'", id),
            }),
        }
    }

    /// Adds several nodes; on failure the path is left as it was.
    pub fn add_nodes_from<I, T>(&mut self, net: &Network, nodes: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<NodeId>,
    {
        let mut extended = self.clone();
        for id in nodes {
            extended.add_node(net, id)?;
        }
        *self = extended;
        Ok(())
    }

    pub fn add_edges_from<I, T>(&mut self, net: &Network, edges: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<EdgeId>,
    {
        let mut extended = self.clone();
        for id in edges {
            extended.add_edge(net, id)?;
        }
        *self = extended;
        Ok(())
    }

    // --- Sub-paths ---

    /// True iff `other`'s node sequence appears contiguously, in the same
    /// direction, in this path. The empty path is a sub-path of every path.
    pub fn has_subpath(&self, other: &Path) -> bool {
        self.has_subpath_nodes(&other.nodes)
    }

    pub fn has_subpath_nodes(&self, nodes: &[NodeId]) -> bool {
        find_window(&self.nodes, nodes).is_some()
    }

    pub fn has_subpath_edges(&self, edges: &[EdgeId]) -> bool {
        find_window(&self.edges, edges).is_some()
    }

    /// The slice between node positions `start` and `end`, both inclusive.
    pub fn subpath(&self, start: usize, end: usize) -> Result<Path> {
        if start > end || end >= self.nodes.len() {
            return Err(NetworkError::Range { start, end, len: self.nodes.len() });
        }
        Ok(self.window(start, end))
    }

    /// The slice from the first occurrence of `from` to the first occurrence
    /// of `to`.
    pub fn subpath_between(&self, from: &NodeId, to: &NodeId) -> Result<Path> {
        let start = self.position(from)?;
        let end = self.position(to)?;
        self.subpath(start, end)
    }

    fn position(&self, id: &NodeId) -> Result<usize> {
        self.nodes.iter().position(|n| n == id).ok_or_else(|| NetworkError::MissingNode(id.clone()))
    }

    /// Unchecked slice; callers guarantee `start <= end < nodes.len()`.
    fn window(&self, start: usize, end: usize) -> Path {
        Path {
            nodes: self.nodes[start..=end].to_vec(),
            edges: self.edges[start..end].to_vec(),
            attributes: self.attributes.clone(),
        }
    }

    /// Lazily yields every contiguous sub-path with `node_count` nodes, front
    /// to back. Yields nothing unless `1 <= node_count <= self.node_count()`.
    pub fn subpaths(&self, node_count: usize) -> impl Iterator<Item = Path> + '_ {
        let windows = if node_count == 0 || node_count > self.nodes.len() {
            0
        } else {
            self.nodes.len() - node_count + 1
        };
        (0..windows).map(move |i| self.window(i, i + node_count - 1))
    }

    /// Collects the sub-paths with `min_nodes..=max_nodes` nodes.
    ///
    /// Bounds default to 2 and `node_count - 1` and are clamped to that range.
    /// The path itself is added when `include_self` is set, or when it is a
    /// single edge and would otherwise yield nothing.
    pub fn subpaths_range(
        &self,
        min_nodes: Option<usize>,
        max_nodes: Option<usize>,
        include_self: bool,
    ) -> Result<Paths> {
        let count = self.nodes.len();
        if let (Some(lo), Some(hi)) = (min_nodes, max_nodes) {
            if lo > hi {
                return Err(NetworkError::Range { start: lo, end: hi, len: count });
            }
        }
        let lo = min_nodes.unwrap_or(2).max(2);
        let hi = max_nodes.unwrap_or(usize::MAX).min(count.saturating_sub(1));

        let mut paths = Paths::new();
        paths.set_name(format!("sub paths of {}", self.name()));
        for size in lo..=hi {
            for sub in self.subpaths(size) {
                paths.add_path(sub)?;
            }
        }
        if (paths.is_empty() && count == 2) || (include_self && count > 0) {
            paths.add_path(self.clone())?;
        }
        Ok(paths)
    }

    // --- Shared sub-paths ---

    /// All maximal common contiguous sub-paths with at least two nodes.
    pub fn shared_paths(&self, other: &Path) -> Vec<Path> {
        let defaults = PathsConfig::default();
        self.shared_paths_with(other, defaults.shared_policy, defaults.min_shared_nodes)
    }

    /// Common contiguous sub-paths of `self` and `other`, taken from `self`.
    ///
    /// Runs over an O(n·m) table of the two node sequences.
    pub fn shared_paths_with(&self, other: &Path, policy: SharedPolicy, min_nodes: usize) -> Vec<Path> {
        let runs = maximal_common_runs(&self.nodes, &other.nodes, min_nodes);
        let mut shared: Vec<Path> = runs.into_iter().map(|r| self.window(r.start, r.end - 1)).collect();
        if policy == SharedPolicy::LongestOnly {
            retain_longest(&mut shared);
        }
        shared
    }

    // --- Weights ---

    /// Sum of the stored edge weights.
    pub fn weight(&self, net: &Network) -> Result<f64> {
        self.weight_by(net, &WeightSource::Weight, Aggregate::Sum)
    }

    pub fn weight_by(&self, net: &Network, source: &WeightSource, aggregate: Aggregate) -> Result<f64> {
        let weights = self.edge_weights(net, source)?;
        let value: f64 = match aggregate {
            Aggregate::Sum => weights.iter().sum(),
            Aggregate::Product => weights.iter().product(),
            Aggregate::Min => weights.iter().copied().reduce(f64::min).unwrap_or(0.0),
            Aggregate::Max => weights.iter().copied().reduce(f64::max).unwrap_or(0.0),
            Aggregate::Mean if weights.is_empty() => 0.0,
            Aggregate::Mean => weights.iter().sum::<f64>() / weights.len() as f64,
        };
        Ok(value)
    }

    /// Folds the edge weights with a caller-supplied combinator.
    pub fn fold_weights<F>(&self, net: &Network, source: &WeightSource, init: f64, f: F) -> Result<f64>
    where
        F: FnMut(f64, f64) -> f64,
    {
        Ok(self.edge_weights(net, source)?.into_iter().fold(init, f))
    }

    fn edge_weights(&self, net: &Network, source: &WeightSource) -> Result<Vec<f64>> {
        self.edges
            .iter()
            .map(|id| {
                net.edge(id)
                    .map(|e| e.weight_by(source))
                    .ok_or_else(|| NetworkError::MissingEdge(id.clone()))
            })
            .collect()
    }
}

/// Keeps only the paths with the most nodes.
pub(crate) fn retain_longest(paths: &mut Vec<Path>) {
    let longest = paths.iter().map(Path::node_count).max().unwrap_or(0);
    paths.retain(|p| p.node_count() == longest);
}
