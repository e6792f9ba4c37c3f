//! Local-discretization classifiers: `TanLd`, `KdbLd`, `SpodeLd` and
//! `AodeLd`, the continuous-input counterparts of the discrete structure
//! learners, each composing a structure learner with the iterative
//! discretization proposal (spec §4.10 preamble).
//!
//! Grounded on `original_source/bayesnet/classifiers/{TANLd,KDBLd,SPODELd,AODELd}.cc`.
//! The C++ source expresses these via diamond inheritance (e.g. `TAN` +
//! `Proposal` -> `TANLd`); per spec §9's design note this is re-architected
//! as composition, with each `*Ld` type holding its structure learner
//! rather than inheriting from it.

use ndarray::Array2;

use crate::error::{BayesNetError, Result};
use crate::proposal::{iterative_local_discretization, transform_with, LdFit, LdParams};
use crate::structure_learning::{Kdb, Spode, StructureLearner, Tan};

fn not_fitted() -> BayesNetError {
    BayesNetError::LogicError("classifier is not fitted".into())
}

fn score_predictions(predicted: &[usize], y: &[i32]) -> f64 {
    let correct = predicted.iter().zip(y.iter()).filter(|(&p, &t)| p as i32 == t).count();
    correct as f64 / predicted.len().max(1) as f64
}

/// Shared fit/predict plumbing for a single structure learner composed
/// with the local-discretization proposal.
struct LdCore<L: StructureLearner> {
    learner: L,
    params: LdParams,
    fit: Option<LdFit>,
}

impl<L: StructureLearner> LdCore<L> {
    fn new(learner: L, params: LdParams) -> Self {
        LdCore { learner, params, fit: None }
    }

    fn fit(
        &mut self,
        x: &Array2<f64>,
        y: &[i32],
        feature_names: &[String],
        class_name: &str,
        class_states: &[i32],
    ) -> Result<()> {
        let fit = iterative_local_discretization(
            &mut self.learner,
            x,
            y,
            feature_names,
            class_name,
            class_states,
            &self.params,
        )?;
        self.fit = Some(fit);
        Ok(())
    }

    fn fitted(&self) -> bool {
        self.fit.is_some()
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Vec<Vec<f64>>> {
        let fit = self.fit.as_ref().ok_or_else(not_fitted)?;
        let coded = transform_with(&fit.discretizers, x);
        fit.network.predict_proba(&coded)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>> {
        let fit = self.fit.as_ref().ok_or_else(not_fitted)?;
        let coded = transform_with(&fit.discretizers, x);
        fit.network.predict(&coded)
    }

    fn score(&self, x: &Array2<f64>, y: &[i32]) -> Result<f64> {
        Ok(score_predictions(&self.predict(x)?, y))
    }

    fn notes(&self) -> &[String] {
        self.fit.as_ref().map(|f| f.notes.as_slice()).unwrap_or(&[])
    }

    fn get_number_of_nodes(&self) -> Result<usize> {
        Ok(self.fit.as_ref().ok_or_else(not_fitted)?.network.get_number_of_nodes())
    }

    fn get_number_of_edges(&self) -> Result<usize> {
        Ok(self.fit.as_ref().ok_or_else(not_fitted)?.network.get_number_of_edges())
    }
}

macro_rules! ld_wrapper {
    ($name:ident, $learner:ty, $doc:expr) => {
        #[doc = $doc]
        pub struct $name(LdCore<$learner>);

        impl $name {
            pub fn new(learner: $learner, params: LdParams) -> Self {
                $name(LdCore::new(learner, params))
            }

            pub fn fit(
                &mut self,
                x: &Array2<f64>,
                y: &[i32],
                feature_names: &[String],
                class_name: &str,
                class_states: &[i32],
            ) -> Result<()> {
                self.0.fit(x, y, feature_names, class_name, class_states)
            }

            pub fn fitted(&self) -> bool {
                self.0.fitted()
            }

            pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>> {
                self.0.predict(x)
            }

            pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Vec<Vec<f64>>> {
                self.0.predict_proba(x)
            }

            pub fn score(&self, x: &Array2<f64>, y: &[i32]) -> Result<f64> {
                self.0.score(x, y)
            }

            pub fn get_notes(&self) -> &[String] {
                self.0.notes()
            }

            pub fn get_number_of_nodes(&self) -> Result<usize> {
                self.0.get_number_of_nodes()
            }

            pub fn get_number_of_edges(&self) -> Result<usize> {
                self.0.get_number_of_edges()
            }
        }
    };
}

ld_wrapper!(TanLd, Tan, "TAN over locally-discretized continuous features.");
ld_wrapper!(KdbLd, Kdb, "K-DB over locally-discretized continuous features.");
ld_wrapper!(SpodeLd, Spode, "SPODE over locally-discretized continuous features.");

/// Ensemble of `SpodeLd` sub-models, one per feature as super-parent, each
/// independently discretized and trained (spec §4.7 AODE, applied to the
/// continuous-input setting per §4.10 preamble). Unlike `TanLd`/`KdbLd`,
/// AODE has no single DAG to iterate the proposal against — every root
/// induces a different topology — so each sub-model runs its own
/// discretization-refinement loop independently, mirroring how plain
/// `Aode` trains `n` independent `Spode` sub-models on the same data.
pub struct AodeLd {
    voting: bool,
    params: LdParams,
    submodels: Vec<LdCore<Spode>>,
}

impl AodeLd {
    pub fn new(voting: bool, params: LdParams) -> Self {
        AodeLd {
            voting,
            params,
            submodels: Vec::new(),
        }
    }

    pub fn fit(
        &mut self,
        x: &Array2<f64>,
        y: &[i32],
        feature_names: &[String],
        class_name: &str,
        class_states: &[i32],
    ) -> Result<()> {
        let n = feature_names.len();
        let mut submodels = Vec::with_capacity(n);
        for root in 0..n {
            let mut core = LdCore::new(Spode::new(root), self.params.clone());
            core.fit(x, y, feature_names, class_name, class_states)?;
            submodels.push(core);
        }
        self.submodels = submodels;
        Ok(())
    }

    pub fn fitted(&self) -> bool {
        !self.submodels.is_empty()
    }

    pub fn n_models(&self) -> usize {
        self.submodels.len()
    }

    fn require_fitted(&self) -> Result<()> {
        if self.submodels.is_empty() {
            return Err(not_fitted());
        }
        Ok(())
    }

    /// Probability mode: average of `predict_proba` across sub-models.
    /// Voting mode: per-model `argmax`, equally weighted, normalized to a
    /// probability-shaped vector (spec §4.9, applied with uniform
    /// significance since AODE sub-models are not boosted).
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Vec<Vec<f64>>> {
        self.require_fitted()?;
        let n_classes = self
            .submodels
            .first()
            .unwrap()
            .fit
            .as_ref()
            .unwrap()
            .network
            .get_class_num_states();
        let n_samples = x.ncols();
        let mut acc = vec![vec![0.0; n_classes]; n_samples];

        if self.voting {
            for core in &self.submodels {
                let preds = core.predict(x)?;
                for (row, &c) in preds.iter().enumerate() {
                    acc[row][c] += 1.0;
                }
            }
        } else {
            for core in &self.submodels {
                let proba = core.predict_proba(x)?;
                for (row, probs) in proba.iter().enumerate() {
                    for (c, &p) in probs.iter().enumerate() {
                        acc[row][c] += p;
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

    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>> {
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

    pub fn score(&self, x: &Array2<f64>, y: &[i32]) -> Result<f64> {
        Ok(score_predictions(&self.predict(x)?, y))
    }

    pub fn get_number_of_nodes(&self) -> Result<usize> {
        self.require_fitted()?;
        self.submodels.iter().map(|c| c.get_number_of_nodes()).sum()
    }

    pub fn get_number_of_edges(&self) -> Result<usize> {
        self.require_fitted()?;
        self.submodels.iter().map(|c| c.get_number_of_edges()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn toy_xy() -> (Array2<f64>, Vec<i32>, Vec<String>) {
        let x = array![
            [0.0, 0.1, 5.0, 5.1, 0.2, 5.2, 0.3, 5.3],
            [1.0, 1.1, 6.0, 6.1, 1.2, 6.2, 1.3, 6.3],
        ];
        let y = vec![0, 0, 1, 1, 0, 1, 0, 1];
        (x, y, vec!["A".to_string(), "B".to_string()])
    }

    #[test]
    fn tan_ld_round_trips() {
        let (x, y, features) = toy_xy();
        let mut clf = TanLd::new(Tan::default(), LdParams::default());
        clf.fit(&x, &y, &features, "class", &[0, 1]).unwrap();
        assert!(clf.fitted());
        let preds = clf.predict(&x).unwrap();
        assert_eq!(preds.len(), y.len());
    }

    #[test]
    fn kdb_ld_predict_before_fit_is_logic_error() {
        let clf = KdbLd::new(Kdb::new(1, 0.0), LdParams::default());
        let (x, _, _) = toy_xy();
        assert!(matches!(clf.predict(&x), Err(BayesNetError::LogicError(_))));
    }

    #[test]
    fn spode_ld_round_trips() {
        let (x, y, features) = toy_xy();
        let mut clf = SpodeLd::new(Spode::new(0), LdParams::default());
        clf.fit(&x, &y, &features, "class", &[0, 1]).unwrap();
        let proba = clf.predict_proba(&x).unwrap();
        for row in &proba {
            assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn aode_ld_produces_n_submodels() {
        let (x, y, features) = toy_xy();
        let mut clf = AodeLd::new(false, LdParams::default());
        clf.fit(&x, &y, &features, "class", &[0, 1]).unwrap();
        assert_eq!(clf.n_models(), features.len());
        let preds = clf.predict(&x).unwrap();
        assert_eq!(preds.len(), y.len());
    }
}
