//! Local-discretization proposal (spec §4.10): discretizes every
//! continuous feature, fits a structure learner on the codes, then
//! iteratively refines each feature's cut points against the label
//! factorized with its learned parents until the network topology
//! stops changing.
//!
//! Grounded on `original_source/bayesnet/classifiers/Proposal.cc`. The
//! C++ template is instantiated only for `KDB`/`TAN`/`SPODE`; the Rust
//! version drops that restriction by bounding `iterative_local_discretization`
//! over the plain `StructureLearner` trait instead of a closed enum of
//! permitted learners (spec §9 Open Question) — any learner, including
//! ones added later, composes with the proposal for free.

use std::collections::HashMap;

use ndarray::Array2;

use crate::dataset::{Dataset, Smoothing, States};
use crate::discretization::{Discretizer, Mdlp, Quantile, Uniform};
use crate::error::{BayesNetError, Result};
use crate::metrics::Metrics;
use crate::network::Network;
use crate::structure_learning::StructureLearner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LdAlgorithm {
    Mdlp,
    Binq,
    Binu,
}

#[derive(Debug, Clone)]
pub struct LdParams {
    pub algorithm: LdAlgorithm,
    pub proposed_cuts: usize,
    pub mdlp_min_length: usize,
    pub mdlp_max_depth: usize,
    pub max_iterations: usize,
    pub verbose_convergence: bool,
}

impl Default for LdParams {
    fn default() -> Self {
        LdParams {
            algorithm: LdAlgorithm::Mdlp,
            proposed_cuts: 5,
            mdlp_min_length: 3,
            mdlp_max_depth: usize::MAX,
            max_iterations: 10,
            verbose_convergence: false,
        }
    }
}

fn new_discretizer(params: &LdParams) -> Result<Box<dyn Discretizer>> {
    match params.algorithm {
        LdAlgorithm::Mdlp => Ok(Box::new(Mdlp::new(params.mdlp_min_length, params.mdlp_max_depth))),
        LdAlgorithm::Binq => Ok(Box::new(Quantile::new(params.proposed_cuts.max(1))?)),
        LdAlgorithm::Binu => Ok(Box::new(Uniform::new(params.proposed_cuts.max(1))?)),
    }
}

/// Combines the class label with a set of already-discretized parent
/// rows into one factorized integer label (spec §4.10 step 3).
fn factorize_label(y: &[i32], parent_rows: &[Vec<i32>]) -> Vec<i32> {
    let mut map: HashMap<Vec<i32>, i32> = HashMap::new();
    let mut next = 0;
    y.iter()
        .enumerate()
        .map(|(s, &label)| {
            let mut key = vec![label];
            key.extend(parent_rows.iter().map(|row| row[s]));
            *map.entry(key).or_insert_with(|| {
                let code = next;
                next += 1;
                code
            })
        })
        .collect()
}

/// The result of an iterative local discretization run: the fitted
/// network over the final codes, the final `states` map, the per-feature
/// discretizers needed to transform new continuous rows the same way,
/// and accumulated diagnostics.
pub struct LdFit {
    pub network: Network,
    pub states: States,
    pub discretizers: Vec<Box<dyn Discretizer>>,
    pub notes: Vec<String>,
}

/// `x` is `(n_features, n_samples)` continuous. `class_states` gives the
/// class's legal integer codes (already discrete).
pub fn iterative_local_discretization<L: StructureLearner>(
    learner: &mut L,
    x: &Array2<f64>,
    y: &[i32],
    feature_names: &[String],
    class_name: &str,
    class_states: &[i32],
    params: &LdParams,
) -> Result<LdFit> {
    let n_features = feature_names.len();
    let n_samples = y.len();
    if x.nrows() != n_features || x.ncols() != n_samples {
        return Err(BayesNetError::InvalidArgument(format!(
            "expected a ({n_features}, {n_samples}) continuous matrix, got ({}, {})",
            x.nrows(),
            x.ncols()
        )));
    }

    let mut states = States::new();
    let mut discretized = Array2::<i32>::zeros((n_features, n_samples));
    let mut discretizers: Vec<Box<dyn Discretizer>> = Vec::with_capacity(n_features);

    for (i, name) in feature_names.iter().enumerate() {
        let mut disc = new_discretizer(params)?;
        let row: Vec<f64> = x.row(i).to_vec();
        disc.fit(&row, y)?;
        let codes = disc.transform(&row);
        for (s, &c) in codes.iter().enumerate() {
            discretized[[i, s]] = c;
        }
        states.insert(name.clone(), (0..disc.num_bins()? as i32).collect());
        discretizers.push(disc);
    }
    states.insert(class_name.to_string(), class_states.to_vec());

    let weights = vec![1.0 / n_samples.max(1) as f64; n_samples];
    let mut notes = Vec::new();
    let mut previous: Option<Network> = None;
    let max_iterations = params.max_iterations.max(1);

    for iteration in 0..max_iterations {
        let dataset = stacked_dataset(&discretized, y, feature_names, class_name)?;

        let mut network = Network::new(class_name.to_string());
        for f in feature_names {
            network.add_node(f)?;
        }
        network.add_node(class_name)?;
        let mut metrics = Metrics::new(dataset.matrix(), feature_names.to_vec(), class_name.to_string(), class_states.len());
        learner.build(&mut network, &mut metrics, &weights)?;
        network.fit(&dataset, &states, &weights, Smoothing::Laplace)?;

        if previous.as_ref() == Some(&network) {
            if params.verbose_convergence {
                notes.push(format!("converged after {iteration} iterations"));
            }
            previous = Some(network);
            break;
        }

        for (i, name) in feature_names.iter().enumerate() {
            let node = network.node(name).expect("feature node must exist");
            let extra_parents: Vec<&String> = node.parents.iter().filter(|p| p.as_str() != class_name).collect();
            if extra_parents.is_empty() {
                continue;
            }
            let parent_rows: Vec<Vec<i32>> = extra_parents
                .iter()
                .map(|p| {
                    let idx = feature_names.iter().position(|f| f == *p).expect("parent must be a known feature");
                    discretized.row(idx).to_vec()
                })
                .collect();
            let factorized = factorize_label(y, &parent_rows);

            let mut disc = new_discretizer(params)?;
            let row: Vec<f64> = x.row(i).to_vec();
            disc.fit(&row, &factorized)?;
            let codes = disc.transform(&row);
            for (s, &c) in codes.iter().enumerate() {
                discretized[[i, s]] = c;
            }
            states.insert(name.clone(), (0..disc.num_bins()? as i32).collect());
            discretizers[i] = disc;
        }

        if iteration + 1 == max_iterations && params.verbose_convergence {
            notes.push(format!("reached max_iterations ({max_iterations}) without convergence"));
        }
        previous = Some(network);
    }

    Ok(LdFit {
        network: previous.expect("at least one iteration always runs"),
        states,
        discretizers,
        notes,
    })
}

fn stacked_dataset(discretized: &Array2<i32>, y: &[i32], feature_names: &[String], class_name: &str) -> Result<Dataset> {
    let n_features = discretized.nrows();
    let n_samples = discretized.ncols();
    let mut data = Array2::<i32>::zeros((n_features + 1, n_samples));
    data.slice_mut(ndarray::s![0..n_features, ..]).assign(discretized);
    for (s, &label) in y.iter().enumerate() {
        data[[n_features, s]] = label;
    }
    Dataset::new(data, feature_names.to_vec(), class_name.to_string())
}

/// Transforms a new continuous `(n_features, n_samples)` matrix through
/// previously fitted discretizers, for use at predict time.
pub fn transform_with(discretizers: &[Box<dyn Discretizer>], x: &Array2<f64>) -> Array2<i32> {
    let n_features = discretizers.len();
    let n_samples = x.ncols();
    let mut out = Array2::<i32>::zeros((n_features, n_samples));
    for (i, disc) in discretizers.iter().enumerate() {
        let row: Vec<f64> = x.row(i).to_vec();
        let codes = disc.transform(&row);
        for (s, &c) in codes.iter().enumerate() {
            out[[i, s]] = c;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure_learning::Tan;
    use ndarray::array;

    #[test]
    fn converges_on_a_trivially_separable_dataset() {
        let x = array![[0.0, 0.1, 5.0, 5.1, 0.2, 5.2], [1.0, 1.1, 6.0, 6.1, 1.2, 6.2]];
        let y = vec![0, 0, 1, 1, 0, 1];
        let features = vec!["A".to_string(), "B".to_string()];
        let mut tan = Tan::default();
        let params = LdParams {
            max_iterations: 5,
            ..LdParams::default()
        };
        let fit = iterative_local_discretization(&mut tan, &x, &y, &features, "class", &[0, 1], &params).unwrap();
        assert!(fit.network.fitted());
        assert_eq!(fit.discretizers.len(), 2);
    }

    #[test]
    fn transform_with_preserves_sample_count() {
        let x = array![[0.0, 0.1, 5.0, 5.1], [1.0, 1.1, 6.0, 6.1]];
        let y = vec![0, 0, 1, 1];
        let features = vec!["A".to_string(), "B".to_string()];
        let mut tan = Tan::default();
        let fit = iterative_local_discretization(&mut tan, &x, &y, &features, "class", &[0, 1], &LdParams::default()).unwrap();
        let coded = transform_with(&fit.discretizers, &x);
        assert_eq!(coded.ncols(), 4);
    }
}
