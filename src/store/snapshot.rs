//! Order-preserving, serializable images of `Network` and `Paths`.
//!
//! A snapshot holds plain data only. Index maps and cached matrices are not
//! stored; `from_snapshot` rebuilds them through the regular mutation API, so
//! a hand-edited snapshot is checked exactly like live input.

use crate::config::{CnetConfig, NetworkConfig, PathsConfig, RoadDefaults};
use crate::error::{NetworkError, Result};
use crate::graph::{Attributes, Edge, EdgeDef, Network, Node};
use crate::paths::{Path, Paths};
use crate::store::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub directed: bool,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub config: NetworkConfig,
    #[serde(default)]
    pub road: RoadDefaults,
    /// Next value of the edge id counter.
    #[serde(default)]
    pub next_edge_seq: u64,
    /// Nodes in insertion order.
    pub nodes: Vec<Node>,
    /// Edges in insertion order.
    pub edges: Vec<Edge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathRecord {
    pub nodes: Vec<NodeId>,
    #[serde(default)]
    pub edges: Vec<EdgeId>,
    #[serde(default)]
    pub attributes: Attributes,
    pub frequency: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsSnapshot {
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub config: PathsConfig,
    /// Paths in collection order.
    pub paths: Vec<PathRecord>,
}

impl Network {
    pub fn to_snapshot(&self) -> NetworkSnapshot {
        let mut config = self.config.clone();
        config.directed = self.directed;
        NetworkSnapshot {
            directed: self.directed,
            attributes: self.attributes.clone(),
            config,
            road: self.road_defaults.clone(),
            next_edge_seq: self.next_edge_seq,
            nodes: self.nodes().cloned().collect(),
            edges: self.edges().cloned().collect(),
        }
    }

    /// Rebuilds a network, re-checking every invariant on the way.
    pub fn from_snapshot(snapshot: NetworkSnapshot) -> Result<Self> {
        let mut config = CnetConfig { network: snapshot.config, road: snapshot.road, ..CnetConfig::default() };
        config.network.directed = snapshot.directed;
        // Endpoints must be listed explicitly.
        let auto_create = std::mem::replace(&mut config.network.auto_create_nodes, false);

        let mut net = Network::with_config(&config);
        net.attributes = snapshot.attributes;
        for node in snapshot.nodes {
            if net.has_node(&node.id) {
                return Err(NetworkError::DuplicateId(node.id.to_string()));
            }
            net.add_node_with(node);
        }
        let edge_count = snapshot.edges.len();
        let edges = snapshot.edges.into_iter().map(|mut edge| {
            if let Some(road) = edge.data.road.as_mut() {
                road.refresh();
            }
            EdgeDef::from(edge)
        });
        net.add_edges_from(edges)?;
        net.config.auto_create_nodes = auto_create;
        net.next_edge_seq = net.next_edge_seq.max(snapshot.next_edge_seq);
        log::debug!("Restored network with {} nodes and {} edges", net.number_of_nodes(), edge_count);
        Ok(net)
    }
}

impl Paths {
    pub fn to_snapshot(&self) -> PathsSnapshot {
        PathsSnapshot {
            attributes: self.attributes().clone(),
            config: self.config().clone(),
            paths: self
                .entries()
                .iter()
                .map(|entry| PathRecord {
                    nodes: entry.path.nodes().to_vec(),
                    edges: entry.path.edges().to_vec(),
                    attributes: entry.path.attributes().clone(),
                    frequency: entry.frequency,
                })
                .collect(),
        }
    }

    /// Rebuilds a collection whose paths run over `net`.
    pub fn from_snapshot(snapshot: PathsSnapshot, net: &Network) -> Result<Self> {
        let mut paths = Paths::with_config(&snapshot.config);
        paths.update_attributes(&snapshot.attributes);
        for record in snapshot.paths {
            let path = Path::from_parts(record.nodes, record.edges).with_attributes(record.attributes);
            path.validate(net)?;
            if paths.contains(&path) {
                return Err(NetworkError::DuplicateId(path.key().joined(&paths.config().separator)));
            }
            paths.add_path_with_frequency(path, record.frequency)?;
        }
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{AttrValue, WeightSource};
    use crate::testing::{complete_network, road_grid};
    use std::io::{Read, Write};

    #[test]
    fn test_network_round_trip_through_json_file() {
        let mut net = road_grid();
        net.set_name("grid");
        net.set_edge_volume(&EdgeId::from("ab"), 1800.0).unwrap();

        let json = serde_json::to_string_pretty(&net.to_snapshot()).unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let mut text = String::new();
        std::fs::File::open(file.path()).unwrap().read_to_string(&mut text).unwrap();
        let restored = Network::from_snapshot(serde_json::from_str(&text).unwrap()).unwrap();

        assert_eq!(restored.name(), Some("grid"));
        assert_eq!(restored.is_directed(), net.is_directed());
        assert_eq!(restored.node_ids().collect::<Vec<_>>(), net.node_ids().collect::<Vec<_>>());
        assert_eq!(restored.edges().collect::<Vec<_>>(), net.edges().collect::<Vec<_>>());
        assert_eq!(restored.adjacency_matrix(&WeightSource::Weight), net.adjacency_matrix(&WeightSource::Weight));
        assert_eq!(restored.node(&NodeId::from("b")).unwrap().get("x"), Some(&AttrValue::from(4000)));
        let ab = restored.edge(&EdgeId::from("ab")).unwrap();
        assert_eq!(ab.road().unwrap().volume(), 1800.0);
    }

    #[test]
    fn test_generated_ids_continue_after_restore() {
        let mut net = complete_network(&["a", "b"]);
        net.add_edge(("a", "b")).unwrap();
        let mut restored = Network::from_snapshot(net.to_snapshot()).unwrap();
        let next = restored.add_edge(("b", "a")).unwrap();
        assert_eq!(next, net.add_edge(("b", "a")).unwrap());
    }

    #[test]
    fn test_invalid_network_snapshot_is_rejected() {
        let mut snapshot = complete_network(&["a", "b"]).to_snapshot();
        snapshot.nodes.retain(|n| n.id.as_str() != "b");
        assert_eq!(Network::from_snapshot(snapshot).unwrap_err(), NetworkError::MissingNode(NodeId::from("b")));

        let mut snapshot = complete_network(&["a", "b"]).to_snapshot();
        let dup = snapshot.nodes[0].clone();
        snapshot.nodes.push(dup);
        assert!(matches!(Network::from_snapshot(snapshot), Err(NetworkError::DuplicateId(_))));

        let json = r#"{"directed":true,"nodes":[{"id":"a"},{"id":"b"}],
            "edges":[{"id":"ab","u":"a","v":"b","road":{"alpha":0.15,"beta":4.0,"free_flow_time":10.0,
            "free_flow_speed":25.0,"capacity":-1.0,"volume":0.0,"cost":10.0}}]}"#;
        let snapshot: NetworkSnapshot = serde_json::from_str(json).unwrap();
        assert!(matches!(
            Network::from_snapshot(snapshot),
            Err(NetworkError::Domain { parameter: "capacity", .. })
        ));
    }

    #[test]
    fn test_paths_round_trip() {
        let net = complete_network(&["a", "b", "c"]);
        let mut paths = Paths::new();
        paths.set_name("observed");
        let mut abc = Path::from_nodes(&net, ["a", "b", "c"]).unwrap();
        abc.set("cost", 12);
        paths.add_path_with_frequency(abc, 3).unwrap();
        paths.add_path(Path::from_nodes(&net, ["c"]).unwrap()).unwrap();

        let json = serde_json::to_string(&paths.to_snapshot()).unwrap();
        let restored = Paths::from_snapshot(serde_json::from_str(&json).unwrap(), &net).unwrap();
        assert_eq!(restored.name(), Some("observed"));
        assert_eq!(restored.entries(), paths.entries());
    }

    #[test]
    fn test_paths_snapshot_is_validated_against_network() {
        let net = complete_network(&["a", "b", "c"]);
        let record = |nodes: &[&str], edges: &[&str]| PathRecord {
            nodes: nodes.iter().map(|n| NodeId::from(*n)).collect(),
            edges: edges.iter().map(|e| EdgeId::from(*e)).collect(),
            attributes: Attributes::new(),
            frequency: 1,
        };
        let snapshot = |records| PathsSnapshot { attributes: Attributes::new(), config: PathsConfig::default(), paths: records };

        let broken = snapshot(vec![record(&["a", "b", "c"], &["a-b", "a-c"])]);
        assert!(matches!(Paths::from_snapshot(broken, &net), Err(NetworkError::DisconnectedPath { .. })));

        let missing = snapshot(vec![record(&["a", "z"], &["a-z"])]);
        assert!(matches!(Paths::from_snapshot(missing, &net), Err(NetworkError::MissingNode(_))));

        let gap = snapshot(vec![record(&["a", "b", "c"], &["a-b"])]);
        assert!(matches!(Paths::from_snapshot(gap, &net), Err(NetworkError::InvalidOperation(_))));

        let twice = snapshot(vec![record(&["a", "b"], &["a-b"]), record(&["a", "b"], &["a-b"])]);
        assert!(matches!(Paths::from_snapshot(twice, &net), Err(NetworkError::DuplicateId(_))));
    }
}
