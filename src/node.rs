//! Per-variable network state: parents, children, CPT tensor, CPT
//! estimation from the shared samples matrix, factor lookup (spec §4.3).
//!
//! Grounded on `original_source/bayesnet/network/Node.cc`.

use ndarray::{ArrayD, Axis, IxDyn};
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub parents: Vec<String>,
    pub children: Vec<String>,
    pub num_states: usize,
    pub cpt: Option<ArrayD<f64>>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Node {
            name: name.into(),
            parents: Vec::new(),
            children: Vec::new(),
            num_states: 0,
            cpt: None,
        }
    }

    /// Resets parents/children/CPT, keeping the name (used by `Network::initialize`).
    pub fn clear(&mut self) {
        self.parents.clear();
        self.children.clear();
        self.num_states = 0;
        self.cpt = None;
    }

    /// `computeCPT`: initializes the CPT to `smoothing_factor`, scatter-adds
    /// each sample's weight into its own/parent-state cell, then normalizes
    /// along axis 0 (spec §4.3 steps 1-4).
    ///
    /// `self_row` and `parent_rows` are aligned views into the shared
    /// samples matrix (own row first conceptually, but passed separately
    /// since the node doesn't own sample storage); `parent_cardinalities`
    /// are each parent's `num_states` in the same order as `self.parents`.
    pub fn compute_cpt(
        &mut self,
        self_row: ndarray::ArrayView1<i32>,
        parent_rows: &[ndarray::ArrayView1<i32>],
        parent_cardinalities: &[usize],
        smoothing_factor: f64,
        weights: &[f64],
    ) {
        let mut dims = vec![self.num_states];
        dims.extend_from_slice(parent_cardinalities);
        let mut cpt = ArrayD::<f64>::from_elem(IxDyn(&dims), smoothing_factor);

        let n = self_row.len();
        for s in 0..n {
            let mut idx = vec![self_row[s] as usize];
            for row in parent_rows {
                idx.push(row[s] as usize);
            }
            cpt[IxDyn(&idx)] += weights[s];
        }

        // Normalize every axis-0 column to sum to 1.
        let mut lanes = cpt.lanes_mut(Axis(0));
        for mut lane in lanes.into_iter() {
            let sum: f64 = lane.iter().sum();
            if sum > 0.0 {
                lane.mapv_inplace(|v| v / sum);
            }
        }
        self.cpt = Some(cpt);
    }

    /// `CPT[evidence[self], evidence[parent_1], ...]` (spec §4.3).
    /// `evidence` gives the state index for `self.name` followed by each
    /// parent in `self.parents` order, as resolved by the caller.
    pub fn get_factor_value(&self, evidence: &[usize]) -> f64 {
        let cpt = self.cpt.as_ref().expect("node not fitted");
        cpt[IxDyn(evidence)]
    }

    /// Size of the set of unordered pairs over the node's neighborhood
    /// (parents + children, deduplicated); a variable-elimination
    /// heuristic, not on the inference path (spec §4.3).
    pub fn min_fill(&self) -> usize {
        let neighbors: HashSet<&String> = self.parents.iter().chain(self.children.iter()).collect();
        let n = neighbors.len();
        n * n.saturating_sub(1) / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn compute_cpt_columns_sum_to_one() {
        let mut node = Node::new("A");
        node.num_states = 2;
        node.parents = vec!["C".into()];
        let self_row = array![0, 1, 1, 0, 1];
        let parent = array![0, 0, 1, 1, 1];
        let weights = vec![0.2; 5];
        node.compute_cpt(self_row.view(), &[parent.view()], &[2], 0.0, &weights);
        let cpt = node.cpt.as_ref().unwrap();
        for j in 0..2 {
            let sum: f64 = cpt.index_axis(Axis(1), j).iter().sum();
            assert!((sum - 1.0).abs() < 1e-9 || sum == 0.0);
        }
    }

    #[test]
    fn min_fill_counts_unordered_neighbor_pairs() {
        let mut node = Node::new("X");
        node.parents = vec!["A".into(), "B".into()];
        node.children = vec!["C".into()];
        assert_eq!(node.min_fill(), 3);
    }
}
