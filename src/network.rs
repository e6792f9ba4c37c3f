//! The DAG substrate (spec §4.4): node insertion with transactional cycle
//! checking, parallel CPT estimation, exact inference by factor product,
//! topological sort, Graphviz export, structural equality and deep copy.
//!
//! Grounded on `original_source/bayesnet/network/Network.cc`.

use std::collections::HashSet;

use indexmap::IndexMap;
use ndarray::Array2;
use rayon::prelude::*;

use crate::concurrency;
use crate::dataset::{Dataset, Smoothing, States};
use crate::error::{BayesNetError, Result};
use crate::node::Node;

/// DAG of `Node`s plus the shared samples matrix (spec §3, §4.4).
#[derive(Debug, Clone)]
pub struct Network {
    nodes: IndexMap<String, Node>,
    features: Vec<String>,
    class_name: String,
    samples: Option<Array2<i32>>,
    fitted: bool,
}

impl Network {
    pub fn new(class_name: impl Into<String>) -> Self {
        Network {
            nodes: IndexMap::new(),
            features: Vec::new(),
            class_name: class_name.into(),
            samples: None,
            fitted: false,
        }
    }

    pub fn fitted(&self) -> bool {
        self.fitted
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn get_number_of_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn get_number_of_edges(&self) -> usize {
        self.nodes.values().map(|n| n.children.len()).sum()
    }

    pub fn get_number_of_states(&self) -> usize {
        self.nodes.values().map(|n| n.num_states).sum()
    }

    pub fn get_class_num_states(&self) -> usize {
        self.nodes.get(&self.class_name).map(|n| n.num_states).unwrap_or(0)
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }

    /// Resets the network to its pre-fit, edge-free state, keeping the
    /// registered node names (spec §3 lifecycle).
    pub fn initialize(&mut self) {
        for node in self.nodes.values_mut() {
            node.clear();
        }
        self.fitted = false;
        self.samples = None;
    }

    /// Creates an empty node. Fails on an empty name or after fit (spec §4.4).
    pub fn add_node(&mut self, name: impl Into<String>) -> Result<()> {
        if self.fitted {
            return Err(BayesNetError::InvalidArgument(
                "cannot add a node to a fitted network".into(),
            ));
        }
        let name = name.into();
        if name.is_empty() {
            return Err(BayesNetError::InvalidArgument("node name must not be empty".into()));
        }
        if self.nodes.contains_key(&name) {
            return Err(BayesNetError::InvalidArgument(format!("node {name} already exists")));
        }
        if name != self.class_name && !self.features.contains(&name) {
            self.features.push(name.clone());
        }
        self.nodes.insert(name.clone(), Node::new(name));
        Ok(())
    }

    /// Attaches `parent -> child`. Fails if either endpoint is missing, the
    /// edge already exists, it would close a cycle, or the network is
    /// fitted (spec §4.4). Cycle detection is transactional: the edge is
    /// tentatively added, checked, and rolled back on failure (spec §9).
    pub fn add_edge(&mut self, parent: &str, child: &str) -> Result<()> {
        if self.fitted {
            return Err(BayesNetError::InvalidArgument(
                "cannot add an edge to a fitted network".into(),
            ));
        }
        if !self.nodes.contains_key(parent) {
            return Err(BayesNetError::InvalidArgument(format!("unknown parent node {parent}")));
        }
        if !self.nodes.contains_key(child) {
            return Err(BayesNetError::InvalidArgument(format!("unknown child node {child}")));
        }
        if self.nodes[parent].children.iter().any(|c| c == child) {
            return Err(BayesNetError::InvalidArgument(format!(
                "edge {parent} -> {child} already exists"
            )));
        }

        self.nodes.get_mut(parent).unwrap().children.push(child.to_string());
        self.nodes.get_mut(child).unwrap().parents.push(parent.to_string());

        if self.creates_cycle(child) {
            // Roll back.
            self.nodes.get_mut(parent).unwrap().children.pop();
            self.nodes.get_mut(child).unwrap().parents.pop();
            return Err(BayesNetError::InvalidArgument(format!(
                "edge {parent} -> {child} would create a cycle"
            )));
        }
        Ok(())
    }

    /// DFS from `start` using a global visited set and a recursion stack
    /// (spec §4.4).
    fn creates_cycle(&self, start: &str) -> bool {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut stack: HashSet<&str> = HashSet::new();
        self.dfs_has_cycle(start, &mut visited, &mut stack)
    }

    fn dfs_has_cycle<'a>(
        &'a self,
        node: &'a str,
        visited: &mut HashSet<&'a str>,
        stack: &mut HashSet<&'a str>,
    ) -> bool {
        if stack.contains(node) {
            return true;
        }
        if visited.contains(node) {
            return false;
        }
        visited.insert(node);
        stack.insert(node);
        for child in &self.nodes[node].children {
            if self.dfs_has_cycle(child, visited, stack) {
                return true;
            }
        }
        stack.remove(node);
        false
    }

    /// Validates invariants before fitting (spec §4.4 `checkFitData`).
    fn check_fit_data(&self, dataset: &Dataset, weights: &[f64], states: &States) -> Result<()> {
        if weights.len() != dataset.n_samples() {
            return Err(BayesNetError::InvalidArgument(format!(
                "weights length {} does not match sample count {}",
                weights.len(),
                dataset.n_samples()
            )));
        }
        if !self.nodes.contains_key(&self.class_name) {
            return Err(BayesNetError::InvalidArgument(format!(
                "class name {} not present among network nodes",
                self.class_name
            )));
        }
        for f in &self.features {
            if !states.contains_key(f) {
                return Err(BayesNetError::InvalidArgument(format!("feature {f} missing from states")));
            }
        }
        if !states.contains_key(&self.class_name) {
            return Err(BayesNetError::InvalidArgument(format!(
                "class name {} missing from states",
                self.class_name
            )));
        }
        Ok(())
    }

    /// `completeFit`: sets cardinalities from `states`, fits every node's
    /// CPT in parallel (bounded by the process-wide semaphore), then marks
    /// the network fitted (spec §4.4).
    pub fn fit(&mut self, dataset: &Dataset, states: &States, weights: &[f64], smoothing: Smoothing) -> Result<()> {
        if self.fitted {
            return Err(BayesNetError::InvalidArgument("network already fitted".into()));
        }
        self.check_fit_data(dataset, weights, states)?;

        for (name, node) in self.nodes.iter_mut() {
            node.num_states = states[name].len();
        }

        let semaphore = concurrency::global();
        let samples = dataset.matrix().clone();
        let names: Vec<String> = self.nodes.keys().cloned().collect();
        let n_samples = dataset.n_samples();

        let fitted_nodes: Vec<(String, Node)> = names
            .par_iter()
            .map(|name| {
                semaphore.acquire();
                let mut node = self.nodes[name].clone();
                let self_row_idx = dataset.row_of(name).expect("registered node missing from dataset");
                let self_row = samples.row(self_row_idx);
                let parent_rows: Vec<_> = node
                    .parents
                    .iter()
                    .map(|p| samples.row(dataset.row_of(p).expect("parent missing from dataset")))
                    .collect();
                let parent_cards: Vec<usize> = node.parents.iter().map(|p| states[p].len()).collect();
                let factor = smoothing.factor(n_samples, node.num_states);
                node.compute_cpt(self_row, &parent_rows, &parent_cards, factor, weights);
                semaphore.release();
                (name.clone(), node)
            })
            .collect();

        for (name, node) in fitted_nodes {
            self.nodes.insert(name, node);
        }

        self.samples = Some(samples);
        self.fitted = true;
        log::debug!("fitted network with {} nodes, {} edges", self.nodes.len(), self.get_number_of_edges());
        Ok(())
    }

    /// `score[c] = prod_v CPT_v[evidence_with_class=c]`, normalized to a
    /// probability vector over class values (spec §4.4).
    fn predict_sample_proba(&self, evidence: &IndexMap<String, usize>) -> Result<Vec<f64>> {
        if !self.fitted {
            return Err(BayesNetError::LogicError("network is not fitted".into()));
        }
        let class_node = &self.nodes[&self.class_name];
        let n_classes = class_node.num_states;
        let mut scores = vec![0.0; n_classes];
        for c in 0..n_classes {
            let mut local = evidence.clone();
            local.insert(self.class_name.clone(), c);
            let mut p = 1.0;
            for node in self.nodes.values() {
                let mut idx = Vec::with_capacity(1 + node.parents.len());
                idx.push(*local.get(&node.name).ok_or_else(|| {
                    BayesNetError::InvalidArgument(format!("missing evidence for {}", node.name))
                })?);
                for parent in &node.parents {
                    idx.push(*local.get(parent).ok_or_else(|| {
                        BayesNetError::InvalidArgument(format!("missing evidence for {parent}"))
                    })?);
                }
                p *= node.get_factor_value(&idx);
            }
            scores[c] = p;
        }
        let total: f64 = scores.iter().sum();
        if total > 0.0 {
            for s in scores.iter_mut() {
                *s /= total;
            }
        } else {
            let uniform = 1.0 / n_classes.max(1) as f64;
            scores.iter_mut().for_each(|s| *s = uniform);
        }
        Ok(scores)
    }

    /// Runs inference for every row of `x` (features only, in
    /// `self.features` order) in parallel, writing results into
    /// preallocated row positions so output order matches input order
    /// regardless of worker completion order (spec §4.4, §5).
    pub fn predict_proba(&self, x: &Array2<i32>) -> Result<Vec<Vec<f64>>> {
        if !self.fitted {
            return Err(BayesNetError::LogicError("network is not fitted".into()));
        }
        if x.nrows() != self.features.len() {
            return Err(BayesNetError::InvalidArgument(format!(
                "expected {} feature rows, got {}",
                self.features.len(),
                x.nrows()
            )));
        }
        let semaphore = concurrency::global();
        let n_samples = x.ncols();
        let rows: Vec<Result<Vec<f64>>> = (0..n_samples)
            .into_par_iter()
            .map(|s| {
                semaphore.acquire();
                let mut evidence = IndexMap::new();
                for (i, f) in self.features.iter().enumerate() {
                    evidence.insert(f.clone(), x[[i, s]] as usize);
                }
                let result = self.predict_sample_proba(&evidence);
                semaphore.release();
                result
            })
            .collect();
        rows.into_iter().collect()
    }

    pub fn predict(&self, x: &Array2<i32>) -> Result<Vec<usize>> {
        let proba = self.predict_proba(x)?;
        Ok(proba
            .into_iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
                    .map(|(i, _)| i)
                    .unwrap_or(0)
            })
            .collect())
    }

    pub fn score(&self, x: &Array2<i32>, y: &[i32]) -> Result<f64> {
        let predicted = self.predict(x)?;
        let correct = predicted
            .iter()
            .zip(y.iter())
            .filter(|(&p, &t)| p as i32 == t)
            .count();
        Ok(correct as f64 / predicted.len().max(1) as f64)
    }

    /// Repeated-pass correction: for every feature, if any non-class
    /// parent appears later in the order, move it just before; stops when
    /// a full pass makes no change (spec §4.4).
    pub fn topological_sort(&self) -> Vec<String> {
        let mut order: Vec<String> = self.features.clone();
        loop {
            let mut changed = false;
            'outer: for i in 0..order.len() {
                let node = &self.nodes[&order[i]];
                for parent in &node.parents {
                    if parent == &self.class_name {
                        continue;
                    }
                    if let Some(parent_pos) = order.iter().position(|n| n == parent) {
                        if parent_pos > i {
                            let parent_name = order.remove(parent_pos);
                            let new_i = order.iter().position(|n| n == &order[i]).unwrap_or(i);
                            order.insert(new_i, parent_name);
                            changed = true;
                            break 'outer;
                        }
                    }
                }
            }
            if !changed {
                break;
            }
        }
        order
    }

    /// Graphviz description (spec §6).
    pub fn graph(&self, title: &str) -> String {
        let mut lines = Vec::new();
        lines.push(format!(
            "digraph BayesNet {{\nlabel=<BayesNet {title}>\nfontsize=30\nfontcolor=blue\nlabelloc=t\nlayout=circo\n"
        ));
        for name in self.nodes.keys() {
            if name == &self.class_name {
                lines.push(
                    "\"class\" [shape=circle, fontcolor=red, fillcolor=lightblue, style=filled ]".to_string(),
                );
            } else {
                lines.push(format!("\"{name}\" [shape=circle]"));
            }
        }
        for node in self.nodes.values() {
            for child in &node.children {
                lines.push(format!("\"{}\" -> \"{}\"", node.name, child));
            }
        }
        lines.push("}".to_string());
        lines.join("\n")
    }

    /// `node -> child, child, ...` lines (spec §6).
    pub fn show(&self) -> String {
        self.nodes
            .values()
            .map(|n| {
                if n.children.is_empty() {
                    n.name.clone()
                } else {
                    format!("{} -> {}", n.name, n.children.join(", "))
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn edge_set(&self) -> HashSet<(String, String)> {
        self.nodes
            .values()
            .flat_map(|n| n.children.iter().map(move |c| (n.name.clone(), c.clone())))
            .collect()
    }
}

impl PartialEq for Network {
    /// Topology only: same node-name set and same unordered edge set
    /// (spec §4.4).
    fn eq(&self, other: &Self) -> bool {
        let self_names: HashSet<&String> = self.nodes.keys().collect();
        let other_names: HashSet<&String> = other.nodes.keys().collect();
        self_names == other_names && self.edge_set() == other.edge_set()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset as Ds;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn toy_network() -> (Network, Ds, States) {
        let mut net = Network::new("class");
        net.add_node("class").unwrap();
        net.add_node("A").unwrap();
        net.add_edge("class", "A").unwrap();

        let x = array![[1, 1, 1, 1, 1, 1, 1, 0, 0, 0]];
        let y = array![1, 2, 1, 0, 0, 2, 0, 1, 0, 2];
        let dataset = Ds::from_x_y(&x, &y, vec!["A".into()], "class".into()).unwrap();

        let mut states = States::new();
        states.insert("A".to_string(), vec![0, 1]);
        states.insert("class".to_string(), vec![0, 1, 2]);
        (net, dataset, states)
    }

    #[test]
    fn add_edge_rejects_cycle() {
        let mut net = Network::new("class");
        net.add_node("class").unwrap();
        net.add_node("A").unwrap();
        net.add_node("B").unwrap();
        net.add_edge("A", "B").unwrap();
        net.add_edge("B", "A").unwrap_err();
        assert_eq!(net.get_number_of_edges(), 1);
    }

    #[test]
    fn laplace_smoothing_matches_hand_computed_cell() {
        // Spec §8 scenario 1, reproduced with unit (not normalized) weights
        // to match the hand-worked counts: C=0 rows are indices 3,4,6,8 ->
        // A values 1,1,1,0 (three ones), so Laplace gives (3+1)/(4+2) = 2/3.
        let (mut net, dataset, states) = toy_network();
        let weights = vec![1.0; dataset.n_samples()];
        net.fit(&dataset, &states, &weights, Smoothing::Laplace).unwrap();
        let node_a = net.node("A").unwrap();
        assert_relative_eq!(node_a.get_factor_value(&[1, 0]), 2.0 / 3.0, epsilon = 1e-4);
        assert_relative_eq!(node_a.get_factor_value(&[0, 0]), 1.0 / 3.0, epsilon = 1e-4);
        assert_relative_eq!(node_a.get_factor_value(&[1, 1]), 0.6000, epsilon = 1e-4);
        assert_relative_eq!(node_a.get_factor_value(&[1, 2]), 0.6000, epsilon = 1e-4);
    }

    #[test]
    fn cestnik_smoothing_matches_hand_computed_cells() {
        // Spec §8 scenario 1, CESTNIK branch: factor = 1 / numStates(node).
        let (mut net, dataset, states) = toy_network();
        let weights = vec![1.0; dataset.n_samples()];
        net.fit(&dataset, &states, &weights, Smoothing::Cestnik).unwrap();
        let node_a = net.node("A").unwrap();
        assert_relative_eq!(node_a.get_factor_value(&[0, 0]), 0.3000, epsilon = 1e-4);
        assert_relative_eq!(node_a.get_factor_value(&[0, 1]), 0.3750, epsilon = 1e-4);
        assert_relative_eq!(node_a.get_factor_value(&[0, 2]), 0.3750, epsilon = 1e-4);
    }

    #[test]
    fn predict_proba_rows_sum_to_one() {
        let (mut net, dataset, states) = toy_network();
        let weights = dataset.uniform_weights();
        net.fit(&dataset, &states, &weights, Smoothing::Laplace).unwrap();
        let x = array![[0, 1]];
        let proba = net.predict_proba(&x).unwrap();
        for row in &proba {
            let sum: f64 = row.iter().sum();
            assert_relative_eq!(sum, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn topological_sort_orders_parents_before_children() {
        let mut net = Network::new("class");
        net.add_node("class").unwrap();
        net.add_node("X").unwrap();
        net.add_node("Y").unwrap();
        net.add_node("Z").unwrap();
        net.add_edge("class", "X").unwrap();
        net.add_edge("class", "Y").unwrap();
        net.add_edge("class", "Z").unwrap();
        net.add_edge("Y", "Z").unwrap();
        let order = net.topological_sort();
        let pos_y = order.iter().position(|n| n == "Y").unwrap();
        let pos_z = order.iter().position(|n| n == "Z").unwrap();
        assert!(pos_y < pos_z);
    }

    #[test]
    fn equality_is_topology_only() {
        let mut a = Network::new("class");
        a.add_node("class").unwrap();
        a.add_node("X").unwrap();
        a.add_edge("class", "X").unwrap();

        let mut b = Network::new("class");
        b.add_node("X").unwrap();
        b.add_node("class").unwrap();
        b.add_edge("class", "X").unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn deep_copy_mutation_does_not_affect_original() {
        let mut a = Network::new("class");
        a.add_node("class").unwrap();
        a.add_node("X").unwrap();
        a.add_node("Y").unwrap();
        a.add_edge("class", "X").unwrap();

        let mut copy = a.clone();
        assert_eq!(a, copy);

        copy.add_edge("class", "Y").unwrap();
        assert_ne!(a, copy);
        assert_eq!(a.get_number_of_edges(), 1);
        assert_eq!(copy.get_number_of_edges(), 2);
    }
}
