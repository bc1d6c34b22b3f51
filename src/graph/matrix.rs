//! matrix.rs
//! Dense algebraic views of a `Network`: adjacency, degree, transition and
//! Laplacian matrices.
//!
//! Rows and columns follow node insertion order, exposed as a [`NodeIndex`]
//! so callers can map positions back to ids. The node index and the
//! default-weight adjacency are cached until the next mutation; every other
//! view is rebuilt from them in O(V + E) (plus the O(V^2) dense fill).

use super::edge::WeightSource;
use super::network::Network;
use crate::error::{NetworkError, Result};
use crate::store::NodeId;
use ndarray::{Array1, Array2, Axis};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Maps matrix positions to node ids and back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeIndex {
    ids: Vec<NodeId>,
    positions: HashMap<NodeId, usize>,
}

impl NodeIndex {
    pub fn len(&self) -> usize { self.ids.len() }

    pub fn is_empty(&self) -> bool { self.ids.is_empty() }

    #[inline(always)]
    pub fn position(&self, id: &NodeId) -> Option<usize> { self.positions.get(id).copied() }

    pub fn id(&self, position: usize) -> Option<&NodeId> { self.ids.get(position) }

    pub fn ids(&self) -> &[NodeId] { &self.ids }
}

impl<'a> FromIterator<&'a NodeId> for NodeIndex {
    fn from_iter<I: IntoIterator<Item = &'a NodeId>>(iter: I) -> Self {
        let ids: Vec<NodeId> = iter.into_iter().cloned().collect();
        let positions = ids.iter().enumerate().map(|(i, id)| (id.clone(), i)).collect();
        Self { ids, positions }
    }
}

/// Views cached between mutations. Replaced wholesale by `Network::invalidate`.
#[derive(Debug, Clone, Default)]
pub(crate) struct DerivedViews {
    index: OnceLock<NodeIndex>,
    adjacency: OnceLock<Array2<f64>>,
}

impl Network {
    /// The node ordering shared by every matrix view.
    pub fn node_index(&self) -> &NodeIndex {
        self.derived.index.get_or_init(|| {
            log::debug!("Rebuilding node index for {} nodes", self.number_of_nodes());
            self.node_ids().collect()
        })
    }

    /// `A[i][j]` is the summed weight of the edges traversable from node `i`
    /// to node `j`. Undirected edges fill both cells; an undirected self-loop
    /// therefore contributes twice its weight to the diagonal.
    pub fn adjacency_matrix(&self, source: &WeightSource) -> Array2<f64> {
        match source {
            WeightSource::Weight => self
                .derived
                .adjacency
                .get_or_init(|| {
                    log::debug!("Rebuilding adjacency matrix");
                    self.build_adjacency(source)
                })
                .clone(),
            _ => self.build_adjacency(source),
        }
    }

    fn build_adjacency(&self, source: &WeightSource) -> Array2<f64> {
        let index = self.node_index();
        let n = index.len();
        let mut matrix = Array2::<f64>::zeros((n, n));
        for edge in self.edges() {
            let (Some(i), Some(j)) = (index.position(&edge.u), index.position(&edge.v)) else {
                continue;
            };
            let w = edge.weight_by(source);
            matrix[[i, j]] += w;
            if !edge.is_directed(self.directed) {
                matrix[[j, i]] += w;
            }
        }
        matrix
    }

    /// Diagonal matrix of out-weight sums (adjacency row sums).
    pub fn degree_matrix(&self, source: &WeightSource) -> Array2<f64> {
        Array2::from_diag(&row_sums(&self.adjacency_matrix(source)))
    }

    /// Row-normalized adjacency. Rows of nodes without out-weight are all zero.
    ///
    /// Fails with `Domain` if a weight is negative while the network does not
    /// allow it, if a row's weights cancel out to zero, or if a row sum is not
    /// finite (attribute weights are not checked on insertion).
    pub fn transition_matrix(&self, source: &WeightSource) -> Result<Array2<f64>> {
        let mut matrix = self.adjacency_matrix(source);
        if !self.config.allow_negative_weights {
            if let Some(w) = matrix.iter().copied().find(|w| *w < 0.0) {
                return Err(NetworkError::domain("weight", w, "negative weights cannot be row-normalized"));
            }
        }
        for mut row in matrix.axis_iter_mut(Axis(0)) {
            let sum = row.sum();
            if !sum.is_finite() {
                return Err(NetworkError::domain("row sum", sum, "row weights must be finite"));
            }
            if sum == 0.0 {
                if row.iter().any(|w| *w != 0.0) {
                    return Err(NetworkError::domain("row sum", sum, "row weights cancel out"));
                }
                continue;
            }
            row.mapv_inplace(|w| w / sum);
        }
        Ok(matrix)
    }

    /// `L = D - A`, with `D` the out-weight degree matrix.
    pub fn laplacian_matrix(&self, source: &WeightSource) -> Array2<f64> {
        let adjacency = self.adjacency_matrix(source);
        Array2::from_diag(&row_sums(&adjacency)) - &adjacency
    }
}

fn row_sums(matrix: &Array2<f64>) -> Array1<f64> {
    matrix.sum_axis(Axis(1))
}
