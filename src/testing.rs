//! Network fixtures shared by the unit tests.

use crate::graph::{EdgeDef, Network, Node, RoadSpec};
use crate::store::NodeId;

pub(crate) fn ids(names: &[&str]) -> Vec<NodeId> {
    names.iter().map(|n| NodeId::from(*n)).collect()
}

/// Nodes `1, 2, 3` with directed edges `12` (w=1) and `23` (w=2).
pub(crate) fn scenario_network() -> Network {
    let mut net = Network::new(true);
    net.add_nodes_from(["1", "2", "3"]);
    net.add_edges_from([
        EdgeDef::new("1", "2").id("12").weight(1.0),
        EdgeDef::new("2", "3").id("23").weight(2.0),
    ])
    .expect("scenario edges");
    net
}

/// A directed chain over `names`, with edge ids `u-v`.
pub(crate) fn chain_network(names: &[&str]) -> Network {
    let mut net = Network::new(true);
    net.add_nodes_from(names.iter().copied());
    let defs = names.windows(2).map(|w| EdgeDef::new(w[0], w[1]).id(format!("{}-{}", w[0], w[1])));
    net.add_edges_from(defs).expect("chain edges");
    net
}

/// A directed network with an edge `u-v` between every ordered pair.
pub(crate) fn complete_network(names: &[&str]) -> Network {
    let mut net = Network::new(true);
    net.add_nodes_from(names.iter().copied());
    for u in names {
        for v in names.iter().filter(|v| *v != u) {
            net.add_edge(EdgeDef::new(*u, *v).id(format!("{}-{}", u, v))).expect("complete edges");
        }
    }
    net
}

/// A small undirected road network with coordinates in metres.
///
/// ```text
///  g --- f --- e
///   \    |    /
///    \-- d --/
///        |
///        b
///       / \
///      a---c
/// ```
pub(crate) fn road_grid() -> Network {
    let mut net = Network::new(false);
    for (id, x, y) in [
        ("a", 0, 0),
        ("b", 4000, 3000),
        ("c", 8000, 0),
        ("d", 4000, 7000),
        ("e", 8000, 10000),
        ("f", 4000, 10000),
        ("g", 0, 10000),
    ] {
        net.add_node_with(Node::new(id).with_attr("x", x).with_attr("y", y));
    }
    // Lengths are measured from the coordinates.
    for (id, u, v) in [
        ("ab", "a", "b"),
        ("ac", "a", "c"),
        ("bc", "b", "c"),
        ("bd", "b", "d"),
        ("de", "d", "e"),
        ("df", "d", "f"),
        ("dg", "d", "g"),
        ("ef", "e", "f"),
        ("fg", "f", "g"),
    ] {
        let spec = RoadSpec::new().capacity(3600.0).free_flow_speed(25.0);
        net.add_road_edge(EdgeDef::new(u, v).id(id), spec).expect("road edges");
    }
    net
}
