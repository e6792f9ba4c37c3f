//! Averaged One-Dependence Estimator: one SPODE per feature as root,
//! trained independently on the same data and averaged with uniform
//! significance (spec §4.7, §4.9).

use ndarray::Array2;

use super::Ensemble;
use crate::dataset::{Dataset, Smoothing, States};
use crate::error::{BayesNetError, Result};
use crate::metrics::Metrics;
use crate::network::Network;
use crate::structure_learning::{Spode, StructureLearner};

pub struct Aode {
    ensemble: Ensemble,
    fitted: bool,
}

impl Aode {
    pub fn new(voting: bool) -> Self {
        Aode {
            ensemble: Ensemble::new(voting),
            fitted: false,
        }
    }

    /// One SPODE sub-model per feature as root (spec §4.7 AODE, §8 law:
    /// `n` SPODE sub-models).
    pub fn fit(&mut self, dataset: &Dataset, states: &States, weights: &[f64], smoothing: Smoothing) -> Result<()> {
        let features = dataset.feature_names().to_vec();
        let class_name = dataset.class_name().to_string();
        let n = features.len();

        for root in 0..n {
            let mut net = Network::new(class_name.clone());
            for f in &features {
                net.add_node(f)?;
            }
            net.add_node(&class_name)?;

            let mut metrics = Metrics::new(dataset.matrix(), features.clone(), class_name.clone(), states[&class_name].len());
            Spode::new(root).build(&mut net, &mut metrics, weights)?;
            net.fit(dataset, states, weights, smoothing)?;
            self.ensemble.push(net, 1.0);
        }
        self.fitted = true;
        Ok(())
    }

    pub fn predict(&self, x: &Array2<i32>) -> Result<Vec<usize>> {
        self.require_fitted()?;
        self.ensemble.predict(x)
    }

    pub fn predict_proba(&self, x: &Array2<i32>) -> Result<Vec<Vec<f64>>> {
        self.require_fitted()?;
        self.ensemble.predict_proba(x)
    }

    pub fn score(&self, x: &Array2<i32>, y: &[i32]) -> Result<f64> {
        self.require_fitted()?;
        self.ensemble.score(x, y)
    }

    pub fn n_models(&self) -> usize {
        self.ensemble.n_models()
    }

    fn require_fitted(&self) -> Result<()> {
        if !self.fitted {
            return Err(BayesNetError::LogicError("AODE is not fitted".into()));
        }
        Ok(())
    }
}
