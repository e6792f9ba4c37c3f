//! Ensemble base (spec §4.9): a weighted collection of fitted sub-networks
//! combined either by averaging `predict_proba` (probability mode) or by
//! weighted voting over each sub-model's `argmax` (voting mode).
//!
//! Grounded on `original_source/src/BayesNet/Ensemble.h`.

pub mod aode;
pub mod boost_aode;

pub use aode::Aode;
pub use boost_aode::{BoostAode, BoostAodeParams};

use ndarray::Array2;

use crate::error::{BayesNetError, Result};
use crate::network::Network;

/// Invariant: `models.len() == significance.len()` (spec §3).
pub struct Ensemble {
    models: Vec<Network>,
    significance: Vec<f64>,
    voting: bool,
}

impl Ensemble {
    pub fn new(voting: bool) -> Self {
        Ensemble {
            models: Vec::new(),
            significance: Vec::new(),
            voting,
        }
    }

    pub fn push(&mut self, model: Network, significance: f64) {
        self.models.push(model);
        self.significance.push(significance);
    }

    pub fn n_models(&self) -> usize {
        self.models.len()
    }

    pub fn models(&self) -> &[Network] {
        &self.models
    }

    pub fn significance(&self) -> &[f64] {
        &self.significance
    }

    pub fn set_significance(&mut self, idx: usize, value: f64) {
        if let Some(sig) = self.significance.get_mut(idx) {
            *sig = value;
        }
    }

    pub fn pop_last(&mut self) -> Option<(Network, f64)> {
        match (self.models.pop(), self.significance.pop()) {
            (Some(m), Some(s)) => Some((m, s)),
            _ => None,
        }
    }

    pub fn set_voting(&mut self, voting: bool) {
        self.voting = voting;
    }

    pub fn voting(&self) -> bool {
        self.voting
    }

    /// Probability mode: weighted sum of `predict_proba`, normalized.
    /// Voting mode: per-model `argmax`, weighted vote, normalized to a
    /// probability-shaped vector so `predict` is always `argmax(predict_proba)`
    /// (spec §4.9, §8).
    pub fn predict_proba(&self, x: &Array2<i32>) -> Result<Vec<Vec<f64>>> {
        if self.models.is_empty() {
            return Err(BayesNetError::LogicError("ensemble has no models".into()));
        }
        let n_classes = self.models[0].get_class_num_states();
        let n_samples = x.ncols();
        let mut acc = vec![vec![0.0; n_classes]; n_samples];

        if self.voting {
            for (model, &sig) in self.models.iter().zip(self.significance.iter()) {
                let preds = model.predict(x)?;
                for (row, &c) in preds.iter().enumerate() {
                    acc[row][c] += sig;
                }
            }
        } else {
            for (model, &sig) in self.models.iter().zip(self.significance.iter()) {
                let proba = model.predict_proba(x)?;
                for (row, probs) in proba.iter().enumerate() {
                    for (c, &p) in probs.iter().enumerate() {
                        acc[row][c] += sig * p;
                    }
                }
            }
        }

        for row in acc.iter_mut() {
            let total: f64 = row.iter().sum();
            if total > 0.0 {
                row.iter_mut().for_each(|v| *v /= total);
            } else {
                let uniform = 1.0 / n_classes.max(1) as f64;
                row.iter_mut().for_each(|v| *v = uniform);
            }
        }
        Ok(acc)
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
        let correct = predicted.iter().zip(y.iter()).filter(|(&p, &t)| p as i32 == t).count();
        Ok(correct as f64 / predicted.len().max(1) as f64)
    }

    pub fn get_number_of_nodes(&self) -> usize {
        self.models.iter().map(|m| m.get_number_of_nodes()).sum()
    }

    pub fn get_number_of_edges(&self) -> usize {
        self.models.iter().map(|m| m.get_number_of_edges()).sum()
    }

    pub fn get_number_of_states(&self) -> usize {
        self.models.iter().map(|m| m.get_number_of_states()).sum()
    }

    /// Concatenated Graphviz description of every sub-model (spec §6).
    pub fn graph(&self, title: &str) -> String {
        self.models.iter().map(|m| m.graph(title)).collect::<Vec<_>>().join("\n")
    }

    pub fn show(&self) -> String {
        self.models.iter().map(|m| m.show()).collect::<Vec<_>>().join("\n---\n")
    }
}
