//! cnet_core: networks, paths and road cost functions for network science
//! and transportation modelling.
//!
//! The crate is organised bottom-up:
//!
//! * [`graph`]: attributed nodes and edges, road edges with a BPR
//!   volume-delay function, and the [`Network`] container with its matrix views,
//! * [`paths`]: [`Path`] walks through a network and [`Paths`] collections with
//!   shared sub-path queries,
//! * [`analysis`]: shortest paths,
//! * [`store`]: identifiers, ordered storage and serializable snapshots.
//!
//! Logging goes through the `log` facade; the application picks the backend.

pub mod analysis;
pub mod config;
pub mod error;
pub mod graph;
pub mod paths;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{CnetConfig, ConfigError, LengthMode};
pub use error::{NetworkError, Result};
pub use graph::{
    AttrValue, Attributes, Edge, EdgeDef, Network, Node, NodeIndex, RoadParams, RoadSpec, WeightSource,
};
pub use paths::{Aggregate, Path, Paths};
pub use store::{EdgeId, NodeId};

#[cfg(test)]
mod tests {
    use super::*;
    use petgraph::Direction;

    #[test]
    fn test_end_to_end_road_assignment_step() {
        let _ = env_logger::builder().is_test(true).try_init();

        let config = CnetConfig::from_toml_str("[network]\ndirected = false\n[road]\nfree_flow_speed = 10.0\n").unwrap();
        let mut net = Network::with_config(&config);
        net.add_nodes_from(["a", "b", "c"]);
        let ab = net.add_road_edge(("a", "b"), RoadSpec::new().length(1000.0).capacity(100.0)).unwrap();
        let bc = net.add_road_edge(("b", "c"), RoadSpec::new().length(500.0)).unwrap();
        let ac = net.add_road_edge(("a", "c"), RoadSpec::new().length(1600.0).capacity(100.0)).unwrap();

        let (path, cost) =
            analysis::shortest_path(&net, &"a".into(), &"c".into(), &WeightSource::Weight).unwrap().unwrap();
        assert_eq!(path.edges(), &[ab.clone(), bc.clone()]);
        assert_eq!(cost, 150.0);

        // Loading the first route makes the direct road cheaper.
        net.set_edge_volume(&ab, 200.0).unwrap();
        let (path, _) =
            analysis::shortest_path(&net, &"a".into(), &"c".into(), &WeightSource::Weight).unwrap().unwrap();
        assert_eq!(path.edges(), &[ac]);
        assert_eq!(net.degree(&"b".into(), Direction::Outgoing).unwrap(), 2);
    }
}
