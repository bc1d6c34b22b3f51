//! Edge lengths from node coordinates.
//!
//! Nodes place themselves with numeric `x` and `y` attributes. For
//! geographic networks `x` holds the latitude and `y` the longitude, in
//! decimal degrees, and lengths come out in metres.

use super::edge::EdgeDef;
use super::network::Network;
use super::node::Node;
use crate::config::LengthMode;
use crate::error::{NetworkError, Result};
use crate::store::{EdgeId, NodeId};
use geo::{Distance, Euclidean, Haversine, Point};

impl Node {
    /// The `(x, y)` position, if both attributes are numbers.
    pub fn coordinate(&self) -> Option<(f64, f64)> {
        let x = self.attributes.get_f64("x")?;
        let y = self.attributes.get_f64("y")?;
        Some((x, y))
    }
}

pub fn euclidean(p: (f64, f64), q: (f64, f64)) -> f64 {
    Euclidean.distance(Point::new(p.0, p.1), Point::new(q.0, q.1))
}

/// Great-circle distance in metres between two `(lat, lon)` points.
pub fn haversine(p: (f64, f64), q: (f64, f64)) -> f64 {
    Haversine.distance(Point::new(p.1, p.0), Point::new(q.1, q.0))
}

impl Network {
    /// Position of node `id`.
    pub fn coordinate(&self, id: &NodeId) -> Result<(f64, f64)> {
        let node = self.node(id).ok_or_else(|| NetworkError::MissingNode(id.clone()))?;
        node.coordinate().ok_or_else(|| {
            NetworkError::InvalidOperation(format!("Node '{}' has no numeric 'x'/'y' coordinates", id))
        })
    }

    /// Length of edge `id` under `mode`.
    ///
    /// `Attribute` reads the edge's numeric `length` attribute; the other
    /// modes ignore it.
    pub fn edge_length(&self, id: &EdgeId, mode: LengthMode) -> Result<f64> {
        let edge = self.edge(id).ok_or_else(|| NetworkError::MissingEdge(id.clone()))?;
        match mode {
            LengthMode::Attribute => edge
                .data
                .attributes
                .get_f64("length")
                .ok_or_else(|| NetworkError::InvalidOperation(format!("Edge '{}' has no 'length' attribute", id))),
            _ => self.segment_length(&edge.u, &edge.v, mode),
        }
    }

    /// Length of a not yet inserted edge.
    pub(crate) fn def_length(&self, def: &EdgeDef, mode: LengthMode) -> Result<f64> {
        match mode {
            LengthMode::Attribute => def.data.attributes.get_f64("length").ok_or_else(|| {
                NetworkError::InvalidOperation(format!("Edge {} -> {} has no 'length' attribute", def.u, def.v))
            }),
            _ => self.segment_length(&def.u, &def.v, mode),
        }
    }

    fn segment_length(&self, u: &NodeId, v: &NodeId, mode: LengthMode) -> Result<f64> {
        match mode {
            LengthMode::Topological => Ok(1.0),
            LengthMode::Euclidean => Ok(euclidean(self.coordinate(u)?, self.coordinate(v)?)),
            LengthMode::Haversine => Ok(haversine(self.coordinate(u)?, self.coordinate(v)?)),
            LengthMode::Attribute => Err(NetworkError::InvalidOperation(
                "attribute lengths are read from the edge, not its endpoints".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EdgeDef;
    use crate::testing::road_grid;
    use rstest::rstest;

    fn e(id: &str) -> EdgeId { EdgeId::from(id) }

    #[rstest]
    #[case("ab", 5000.0)]
    #[case("ac", 8000.0)]
    #[case("bd", 4000.0)]
    #[case("de", 5000.0)]
    #[case("fg", 4000.0)]
    fn test_euclidean_length_matches_stored_length(#[case] id: &str, #[case] expected: f64) {
        let net = road_grid();
        let measured = net.edge_length(&e(id), LengthMode::Euclidean).unwrap();
        assert!((measured - expected).abs() < 1e-6);
        assert_eq!(net.edge_length(&e(id), LengthMode::Attribute).unwrap(), measured);
        assert_eq!(net.edge_length(&e(id), LengthMode::Topological).unwrap(), 1.0);
    }

    #[test]
    fn test_haversine_distance() {
        let d = haversine((47.409589, 8.502555), (47.410344, 8.503037));
        assert!((d - 91.45).abs() < 0.1, "got {}", d);
        assert_eq!(haversine((10.0, 20.0), (10.0, 20.0)), 0.0);
        // A quarter meridian is a little over 10 000 km.
        let quarter = haversine((0.0, 0.0), (90.0, 0.0));
        assert!((quarter - 10_007_557.0).abs() < 10.0, "got {}", quarter);
        // Latitude and longitude are not interchangeable.
        assert!(haversine((60.0, 0.0), (60.0, 10.0)) < haversine((0.0, 60.0), (10.0, 60.0)));
    }

    #[test]
    fn test_missing_coordinates_and_lengths() {
        let mut net = Network::default();
        net.add_node_with(Node::new("a").with_attr("x", 0).with_attr("y", 0));
        net.add_node_with(Node::new("b").with_attr("x", "far"));
        let ab = net.add_edge(EdgeDef::new("a", "b").id("ab")).unwrap();

        assert!(matches!(net.edge_length(&ab, LengthMode::Euclidean), Err(NetworkError::InvalidOperation(_))));
        assert!(matches!(net.edge_length(&ab, LengthMode::Attribute), Err(NetworkError::InvalidOperation(_))));
        assert_eq!(net.edge_length(&ab, LengthMode::Topological).unwrap(), 1.0);
        assert_eq!(net.edge_length(&e("zz"), LengthMode::Topological).unwrap_err(), NetworkError::MissingEdge(e("zz")));

        net.node_attributes_mut(&"b".into()).unwrap().set("x", 3);
        net.node_attributes_mut(&"b".into()).unwrap().set("y", 4);
        assert!((net.edge_length(&ab, LengthMode::Euclidean).unwrap() - 5.0).abs() < 1e-12);
    }
}
