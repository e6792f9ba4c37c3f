//! Filter feature selectors over symmetrical-uncertainty scores (spec
//! §4.8): CFS, FCBF, IWSS. All share SU-based scoring with caching of
//! feature-feature SU.
//!
//! Grounded on `original_source/bayesnet/feature_selection/FeatureSelect.cc`
//! (`symmetricalUncertainty`, `computeSuLabels`, `computeSuFeatures`,
//! `computeMeritCFS`).

pub mod cfs;
pub mod fcbf;
pub mod iwss;

pub use cfs::Cfs;
pub use fcbf::Fcbf;
pub use iwss::Iwss;

use std::collections::HashMap;

use itertools::Itertools;

use crate::error::{BayesNetError, Result};
use crate::metrics::Metrics;

/// A greedy/filter feature selector producing an ordered subset of
/// feature indices with per-feature merit scores.
pub trait FeatureSelector {
    fn fit(&mut self, scorer: &mut SuScorer<'_, '_>, weights: &[f64]) -> Result<()>;
    fn get_features(&self) -> Result<&[usize]>;
    fn get_scores(&self) -> Result<&[f64]>;
}

/// Shared SU bookkeeping: `SU(Xi;C)` per feature and a cached symmetric
/// `SU(Xi;Xj)` map, computed against a fixed weight vector for the
/// lifetime of one `fit` call (spec §4.8).
pub struct SuScorer<'m, 'a> {
    metrics: &'m mut Metrics<'a>,
    n_features: usize,
    weights: Vec<f64>,
    su_labels: Vec<f64>,
    su_features: HashMap<(usize, usize), f64>,
}

impl<'m, 'a> SuScorer<'m, 'a> {
    pub fn new(metrics: &'m mut Metrics<'a>, n_features: usize, weights: &[f64]) -> Self {
        let su_labels = (0..n_features)
            .map(|i| metrics.symmetrical_uncertainty_of(i, None, weights))
            .collect::<Vec<_>>();
        SuScorer {
            metrics,
            n_features,
            weights: weights.to_vec(),
            su_labels,
            su_features: HashMap::new(),
        }
    }

    pub fn su_label(&self, i: usize) -> f64 {
        self.su_labels[i]
    }

    pub fn su_feature(&mut self, a: usize, b: usize) -> f64 {
        let key = if a < b { (a, b) } else { (b, a) };
        if let Some(&v) = self.su_features.get(&key) {
            return v;
        }
        let v = self.metrics.symmetrical_uncertainty_of(key.0, Some(key.1), &self.weights);
        self.su_features.insert(key, v);
        v
    }

    /// `Merit(S) = k * r_cf_avg / sqrt(k + k(k-1) * r_ff_avg)` (spec §4.8 CFS).
    pub fn merit_cfs(&mut self, selected: &[usize]) -> f64 {
        let k = selected.len();
        if k == 0 {
            return 0.0;
        }
        let rcf_avg: f64 = selected.iter().map(|&f| self.su_label(f)).sum::<f64>() / k as f64;
        let pairs: Vec<(usize, usize)> = selected.iter().copied().tuple_combinations().collect();
        let rff_avg = if pairs.is_empty() {
            0.0
        } else {
            let sum: f64 = pairs.iter().map(|&(a, b)| self.su_feature(a, b)).sum();
            sum / pairs.len() as f64
        };
        let k_f = k as f64;
        (k_f * rcf_avg) / (k_f + k_f * (k_f - 1.0) * rff_avg).sqrt()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }
}

pub(crate) fn not_fitted(what: &str) -> BayesNetError {
    BayesNetError::RuntimeError(format!("{what} not fitted"))
}
