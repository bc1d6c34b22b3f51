//! Shortest paths over a `Network`, delegated to petgraph.
//!
//! The network is projected onto a `DiGraphMap` over matrix positions.
//! Parallel edges collapse to their cheapest member and undirected edges
//! become a pair of arcs.

use crate::error::{NetworkError, Result};
use crate::graph::{Network, WeightSource};
use crate::paths::Path;
use crate::store::{EdgeId, NodeId};
use petgraph::algo::{astar, dijkstra};
use petgraph::graphmap::DiGraphMap;
use std::collections::HashMap;

fn project(net: &Network, source: &WeightSource) -> Result<DiGraphMap<usize, f64>> {
    let index = net.node_index();
    let mut graph = DiGraphMap::with_capacity(index.len(), net.number_of_edges());
    for i in 0..index.len() {
        graph.add_node(i);
    }
    for edge in net.edges() {
        let w = edge.weight_by(source);
        if w.is_nan() || w < 0.0 {
            return Err(NetworkError::domain("weight", w, "shortest paths need non-negative weights"));
        }
        let (Some(u), Some(v)) = (index.position(&edge.u), index.position(&edge.v)) else {
            continue;
        };
        let mut arcs = vec![(u, v)];
        if !edge.is_directed(net.is_directed()) {
            arcs.push((v, u));
        }
        for (a, b) in arcs {
            match graph.edge_weight_mut(a, b) {
                Some(existing) if *existing <= w => {}
                Some(existing) => *existing = w,
                None => {
                    graph.add_edge(a, b, w);
                }
            }
        }
    }
    Ok(graph)
}

fn position(net: &Network, id: &NodeId) -> Result<usize> {
    net.node_index().position(id).ok_or_else(|| NetworkError::MissingNode(id.clone()))
}

/// The cheapest edge traversable from `u` to `v`.
fn cheapest_edge(net: &Network, u: &NodeId, v: &NodeId, source: &WeightSource) -> Option<EdgeId> {
    net.edges_between(u, v)
        .iter()
        .filter_map(|id| net.edge(id))
        .min_by(|a, b| a.weight_by(source).total_cmp(&b.weight_by(source)))
        .map(|e| e.id.clone())
}

/// The cheapest path from `source` to `target` and its cost, or `None` if
/// `target` is unreachable. Uses A* with a zero heuristic.
pub fn shortest_path(
    net: &Network,
    source: &NodeId,
    target: &NodeId,
    weight: &WeightSource,
) -> Result<Option<(Path, f64)>> {
    let start = position(net, source)?;
    let goal = position(net, target)?;
    let graph = project(net, weight)?;

    let edge_cost = |(_, _, w): (usize, usize, &f64)| *w;
    let Some((cost, positions)) = astar(&graph, start, |n| n == goal, edge_cost, |_| 0.0) else {
        log::warn!("No path from '{}' to '{}'", source, target);
        return Ok(None);
    };

    let index = net.node_index();
    let nodes: Vec<NodeId> = positions.iter().filter_map(|&p| index.id(p).cloned()).collect();
    let edges = nodes
        .windows(2)
        .map(|pair| {
            cheapest_edge(net, &pair[0], &pair[1], weight).ok_or_else(|| NetworkError::DisconnectedPath {
                terminal: pair[0].clone(),
                next: format!("node '{}'", pair[1]),
            })
        })
        .collect::<Result<Vec<EdgeId>>>()?;
    Ok(Some((Path::from_parts(nodes, edges), cost)))
}

/// Cost of the cheapest path from `source` to every reachable node.
pub fn shortest_path_lengths(net: &Network, source: &NodeId, weight: &WeightSource) -> Result<HashMap<NodeId, f64>> {
    let start = position(net, source)?;
    let graph = project(net, weight)?;
    let index = net.node_index();
    let costs = dijkstra(&graph, start, None, |(_, _, w): (usize, usize, &f64)| *w);
    Ok(costs.into_iter().filter_map(|(p, cost)| index.id(p).map(|id| (id.clone(), cost))).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EdgeDef;
    use crate::testing::{ids, road_grid};

    fn n(id: &str) -> NodeId { NodeId::from(id) }

    /// Road lengths are measured from coordinates and may be off by rounding.
    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_shortest_path_on_road_grid() {
        let net = road_grid();
        let length = WeightSource::attribute("length");
        let (path, cost) = shortest_path(&net, &n("a"), &n("f"), &length).unwrap().unwrap();
        assert_eq!(path.nodes(), &ids(&["a", "b", "d", "f"])[..]);
        assert!(approx(cost, 12000.0));
        assert_eq!(path.weight_by(&net, &length, crate::paths::Aggregate::Sum).unwrap(), cost);

        // Undirected edges are walked against their stored orientation.
        let (back, _) = shortest_path(&net, &n("g"), &n("a"), &length).unwrap().unwrap();
        assert_eq!(back.nodes(), &ids(&["g", "d", "b", "a"])[..]);
        assert_eq!(back.edges().len(), 3);
    }

    #[test]
    fn test_trivial_and_unreachable() {
        let mut net = Network::default();
        net.add_nodes_from(["a", "b", "c"]);
        net.add_edge(EdgeDef::new("a", "b").weight(2.0)).unwrap();

        let (path, cost) = shortest_path(&net, &n("a"), &n("a"), &WeightSource::Weight).unwrap().unwrap();
        assert_eq!(path.nodes(), &ids(&["a"])[..]);
        assert_eq!(cost, 0.0);

        assert!(shortest_path(&net, &n("b"), &n("a"), &WeightSource::Weight).unwrap().is_none());
        assert!(shortest_path(&net, &n("a"), &n("c"), &WeightSource::Weight).unwrap().is_none());
        assert_eq!(
            shortest_path(&net, &n("a"), &n("z"), &WeightSource::Weight).unwrap_err(),
            NetworkError::MissingNode(n("z"))
        );
    }

    #[test]
    fn test_parallel_edges_pick_the_cheapest() {
        let mut net = Network::default();
        net.add_nodes_from(["a", "b"]);
        net.add_edges_from([
            EdgeDef::new("a", "b").id("slow").weight(5.0),
            EdgeDef::new("a", "b").id("fast").weight(1.5),
        ])
        .unwrap();
        let (path, cost) = shortest_path(&net, &n("a"), &n("b"), &WeightSource::Weight).unwrap().unwrap();
        assert_eq!(path.edges(), &[EdgeId::from("fast")]);
        assert_eq!(cost, 1.5);
    }

    #[test]
    fn test_negative_weights_are_rejected() {
        let mut net = Network::default();
        net.add_nodes_from(["a", "b"]);
        net.add_edge(EdgeDef::new("a", "b").weight(-1.0)).unwrap();
        assert!(matches!(
            shortest_path_lengths(&net, &n("a"), &WeightSource::Weight),
            Err(NetworkError::Domain { .. })
        ));
    }

    #[test]
    fn test_shortest_path_lengths() {
        let net = road_grid();
        let lengths = shortest_path_lengths(&net, &n("a"), &WeightSource::attribute("length")).unwrap();
        assert_eq!(lengths.len(), 7);
        assert_eq!(lengths[&n("a")], 0.0);
        assert!(approx(lengths[&n("c")], 8000.0));
        assert!(approx(lengths[&n("e")], 14000.0));
        assert!(approx(lengths[&n("g")], 14000.0));
    }
}
