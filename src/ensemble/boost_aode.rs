//! SAMME-style boosted ensemble of SPODEs with optional filter feature
//! selection, bisection pack sizing, convergence-driven early stopping
//! and pack rollback (spec §4.9).
//!
//! Grounded on `original_source/bayesnet/ensembles/BoostAODE.cc`.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::Value;

use super::Ensemble;
use crate::classifier::Status;
use crate::dataset::{Dataset, Smoothing, States};
use crate::error::{BayesNetError, Result};
use crate::feature_selection::{Cfs, Fcbf, FeatureSelector, Iwss, SuScorer};
use crate::metrics::Metrics;
use crate::network::Network;
use crate::structure_learning::{Spode, StructureLearner};
use ndarray::Array2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
    Rand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectFeatures {
    Cfs,
    Fcbf,
    Iwss,
}

/// Recognized hyperparameters (spec §4.9 table).
#[derive(Debug, Clone)]
pub struct BoostAodeParams {
    pub order: Order,
    pub convergence: bool,
    pub convergence_best: bool,
    pub bisection: bool,
    pub max_tolerance: u32,
    pub select_features: Option<SelectFeatures>,
    pub threshold: f64,
    pub predict_voting: bool,
    pub block_update: bool,
    pub alpha_block: bool,
}

impl Default for BoostAodeParams {
    fn default() -> Self {
        BoostAodeParams {
            order: Order::Desc,
            convergence: false,
            convergence_best: false,
            bisection: false,
            max_tolerance: 1,
            select_features: None,
            threshold: 0.0,
            predict_voting: false,
            block_update: false,
            alpha_block: false,
        }
    }
}

impl BoostAodeParams {
    /// Parses and validates a hyperparameter JSON object. Validation
    /// failures surface before training starts (spec §4.9 final
    /// paragraph), not mid-loop.
    pub fn from_json(json: &serde_json::Map<String, Value>) -> Result<Self> {
        let mut params = BoostAodeParams::default();
        if let Some(v) = json.get("order") {
            params.order = match v.as_str() {
                Some("asc") => Order::Asc,
                Some("desc") => Order::Desc,
                Some("rand") => Order::Rand,
                _ => return Err(BayesNetError::InvalidArgument("order must be asc/desc/rand".into())),
            };
        }
        if let Some(v) = json.get("convergence") {
            params.convergence = v
                .as_bool()
                .ok_or_else(|| BayesNetError::InvalidArgument("convergence must be a bool".into()))?;
        }
        if let Some(v) = json.get("convergence_best") {
            params.convergence_best = v
                .as_bool()
                .ok_or_else(|| BayesNetError::InvalidArgument("convergence_best must be a bool".into()))?;
        }
        if let Some(v) = json.get("bisection") {
            params.bisection = v
                .as_bool()
                .ok_or_else(|| BayesNetError::InvalidArgument("bisection must be a bool".into()))?;
        }
        if let Some(v) = json.get("maxTolerance") {
            let t = v
                .as_u64()
                .ok_or_else(|| BayesNetError::InvalidArgument("maxTolerance must be an integer".into()))?;
            if !(1..=4).contains(&t) {
                return Err(BayesNetError::InvalidArgument("maxTolerance must be in 1..4".into()));
            }
            params.max_tolerance = t as u32;
        }
        if let Some(v) = json.get("select_features") {
            params.select_features = if v.is_null() {
                None
            } else {
                match v.as_str() {
                    Some("CFS") => Some(SelectFeatures::Cfs),
                    Some("FCBF") => Some(SelectFeatures::Fcbf),
                    Some("IWSS") => Some(SelectFeatures::Iwss),
                    _ => return Err(BayesNetError::InvalidArgument("select_features must be CFS/FCBF/IWSS".into())),
                }
            };
        }
        if let Some(v) = json.get("threshold") {
            params.threshold = v
                .as_f64()
                .ok_or_else(|| BayesNetError::InvalidArgument("threshold must be a number".into()))?;
        }
        // Validate the threshold against the chosen selector's constraint
        // up front (spec §4.9 final paragraph).
        match params.select_features {
            Some(SelectFeatures::Fcbf) if params.threshold < 1e-7 => {
                return Err(BayesNetError::InvalidArgument("FCBF threshold must be >= 1e-7".into()));
            }
            Some(SelectFeatures::Iwss) if !(0.0..=0.5).contains(&params.threshold) => {
                return Err(BayesNetError::InvalidArgument("IWSS threshold must be in [0, 0.5]".into()));
            }
            _ => {}
        }
        if let Some(v) = json.get("predict_voting") {
            params.predict_voting = v
                .as_bool()
                .ok_or_else(|| BayesNetError::InvalidArgument("predict_voting must be a bool".into()))?;
        }
        if let Some(v) = json.get("block_update") {
            params.block_update = v
                .as_bool()
                .ok_or_else(|| BayesNetError::InvalidArgument("block_update must be a bool".into()))?;
        }
        if let Some(v) = json.get("alpha_block") {
            params.alpha_block = v
                .as_bool()
                .ok_or_else(|| BayesNetError::InvalidArgument("alpha_block must be a bool".into()))?;
        }
        Ok(params)
    }
}

pub struct BoostAode {
    params: BoostAodeParams,
    ensemble: Ensemble,
    notes: Vec<String>,
    fitted: bool,
    status: Status,
}

impl BoostAode {
    pub fn new(params: BoostAodeParams) -> Self {
        let voting = params.predict_voting;
        BoostAode {
            params,
            ensemble: Ensemble::new(voting),
            notes: Vec::new(),
            fitted: false,
            status: Status::Normal,
        }
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// `Status::Warning` once training used fewer than every feature
    /// (spec §4.6 `getStatus`, §9 diagnostics); `Status::Normal` otherwise.
    pub fn get_status(&self) -> Status {
        self.status
    }

    pub fn n_models(&self) -> usize {
        self.ensemble.n_models()
    }

    pub fn get_number_of_nodes(&self) -> usize {
        self.ensemble.get_number_of_nodes()
    }

    pub fn get_number_of_edges(&self) -> usize {
        self.ensemble.get_number_of_edges()
    }

    fn train_spode(&self, dataset: &Dataset, states: &States, weights: &[f64], smoothing: Smoothing, root: usize) -> Result<Network> {
        let features = dataset.feature_names().to_vec();
        let class_name = dataset.class_name().to_string();
        let mut net = Network::new(class_name.clone());
        for f in &features {
            net.add_node(f)?;
        }
        net.add_node(&class_name)?;
        let mut metrics = Metrics::new(dataset.matrix(), features.clone(), class_name.clone(), states[&class_name].len());
        Spode::new(root).build(&mut net, &mut metrics, weights)?;
        net.fit(dataset, states, weights, smoothing)?;
        Ok(net)
    }

    /// SAMME weight/alpha update (spec §4.9 steps d-e): weighted error
    /// `eps`, `alpha = 0.5*ln((1-eps)/eps) + ln(K-1)`; flips the stopping
    /// flag when `eps > 0.5`.
    fn update_weights(y: &[i32], y_pred: &[usize], weights: &[f64], n_classes: usize) -> (Vec<f64>, f64, bool) {
        let eps: f64 = y
            .iter()
            .zip(y_pred.iter())
            .zip(weights.iter())
            .filter(|((&t, &p), _)| p as i32 != t)
            .map(|(_, &w)| w)
            .sum();
        let eps = eps.clamp(1e-12, 1.0 - 1e-12);
        if eps > 0.5 {
            return (weights.to_vec(), 0.0, true);
        }
        let alpha = 0.5 * ((1.0 - eps) / eps).ln() + (n_classes.saturating_sub(1).max(1) as f64).ln();
        let mut new_weights: Vec<f64> = y
            .iter()
            .zip(y_pred.iter())
            .zip(weights.iter())
            .map(|((&t, &p), &w)| if p as i32 != t { w * alpha.exp() } else { w })
            .collect();
        let total: f64 = new_weights.iter().sum();
        if total > 0.0 {
            new_weights.iter_mut().for_each(|w| *w /= total);
        }
        (new_weights, alpha, false)
    }

    fn select_features(&self, dataset: &Dataset, states: &States, weights: &[f64]) -> Result<Vec<usize>> {
        let features = dataset.feature_names().to_vec();
        let n = features.len();
        let n_classes = states[dataset.class_name()].len();
        let mut metrics = Metrics::new(dataset.matrix(), features.clone(), dataset.class_name().to_string(), n_classes);
        let mut scorer = SuScorer::new(&mut metrics, n, weights);
        match self.params.select_features {
            None => Ok((0..n).collect()),
            Some(SelectFeatures::Cfs) => {
                let mut cfs = Cfs::new(0);
                cfs.fit(&mut scorer, weights)?;
                Ok(cfs.get_features()?.to_vec())
            }
            Some(SelectFeatures::Fcbf) => {
                let mut fcbf = Fcbf::new(self.params.threshold)?;
                fcbf.fit(&mut scorer, weights)?;
                Ok(fcbf.get_features()?.to_vec())
            }
            Some(SelectFeatures::Iwss) => {
                let mut iwss = Iwss::new(self.params.threshold)?;
                iwss.fit(&mut scorer, weights)?;
                Ok(iwss.get_features()?.to_vec())
            }
        }
    }

    fn selector_name(&self) -> &'static str {
        match self.params.select_features {
            None => "none",
            Some(SelectFeatures::Cfs) => "CFS",
            Some(SelectFeatures::Fcbf) => "FCBF",
            Some(SelectFeatures::Iwss) => "IWSS",
        }
    }

    /// Trains the boosted ensemble (spec §4.9 training loop). `validation`
    /// is an optional held-out `(X, y)` pair consulted when
    /// `convergence` is set; without one, convergence falls back to
    /// train-set accuracy.
    pub fn fit(
        &mut self,
        dataset: &Dataset,
        states: &States,
        smoothing: Smoothing,
        validation: Option<(&Array2<i32>, &[i32])>,
    ) -> Result<()> {
        let n_samples = dataset.n_samples();
        let n_features = dataset.n_features();
        let n_classes = states[dataset.class_name()].len();
        let x_train = dataset.matrix().slice(ndarray::s![0..n_features, ..]).to_owned();
        let y_train: Vec<i32> = dataset.class_row().to_vec();

        let mut weights = vec![1.0 / n_samples.max(1) as f64; n_samples];
        let mut features_used: Vec<usize> = Vec::new();

        if self.params.select_features.is_some() {
            let selected = self.select_features(dataset, states, &weights)?;
            for &feature in &selected {
                let net = self.train_spode(dataset, states, &weights, smoothing, feature)?;
                self.ensemble.push(net, 1.0);
                features_used.push(feature);
            }
            self.notes.push(format!(
                "Used features in initialization: {} of {} with {}",
                selected.len(),
                n_features,
                self.selector_name()
            ));
            if selected.len() < n_features {
                self.status = Status::Warning;
            }
            let y_pred = self.ensemble.predict(&x_train)?;
            let (new_weights, alpha, finished) = Self::update_weights(&y_train, &y_pred, &weights, n_classes);
            weights = new_weights;
            let start = self.ensemble.n_models() - selected.len();
            for idx in start..self.ensemble.n_models() {
                self.ensemble.set_significance(idx, alpha);
            }
            if finished {
                self.notes.push(format!("Number of models: {}", self.ensemble.n_models()));
                self.fitted = true;
                return Ok(());
            }
        }

        let ascending = matches!(self.params.order, Order::Asc);
        let mut rng = ChaCha8Rng::seed_from_u64(173);
        let mut num_items_pack = 0usize;
        let mut prior_accuracy = 0.0;
        let mut tolerance = 0u32;
        let mut finished = false;

        while !finished {
            let mut remaining: Vec<usize> = {
                let mut metrics = Metrics::new(dataset.matrix(), dataset.feature_names().to_vec(), dataset.class_name().to_string(), n_classes);
                metrics.select_k_best_weighted(&weights, ascending, 0)?
            };
            if matches!(self.params.order, Order::Rand) {
                remaining.shuffle(&mut rng);
            }
            remaining.retain(|f| !features_used.contains(f));

            let k = if self.params.bisection { 1usize << tolerance } else { 1 };
            let mut counter = 0;
            while counter < k && !remaining.is_empty() {
                counter += 1;
                let feature = remaining.remove(0);
                let net = self.train_spode(dataset, states, &weights, smoothing, feature)?;

                let mut alpha_t = 0.0;
                if !self.params.block_update {
                    let y_pred = if self.params.alpha_block {
                        self.ensemble.push(net, 1.0);
                        let pred = self.ensemble.predict(&x_train)?;
                        let (popped_net, _) = self.ensemble.pop_last().unwrap();
                        let (new_weights, alpha, fin) = Self::update_weights(&y_train, &pred, &weights, n_classes);
                        weights = new_weights;
                        alpha_t = alpha;
                        finished = finished || fin;
                        self.ensemble.push(popped_net, alpha_t);
                        features_used.push(feature);
                        num_items_pack += 1;
                        continue;
                    } else {
                        net.predict(&x_train)?
                    };
                    let (new_weights, alpha, fin) = Self::update_weights(&y_train, &y_pred, &weights, n_classes);
                    weights = new_weights;
                    alpha_t = alpha;
                    finished = finished || fin;
                }
                num_items_pack += 1;
                features_used.push(feature);
                self.ensemble.push(net, alpha_t);
            }

            if self.params.block_update {
                let y_pred = self.ensemble.predict(&x_train)?;
                let (new_weights, alpha, fin) = Self::update_weights(&y_train, &y_pred, &weights, n_classes);
                weights = new_weights;
                finished = finished || fin;
                let start = self.ensemble.n_models().saturating_sub(counter);
                for idx in start..self.ensemble.n_models() {
                    self.ensemble.set_significance(idx, alpha);
                }
            }

            if self.params.convergence && !finished {
                let accuracy = match validation {
                    Some((xv, yv)) => self.ensemble.score(xv, yv)?,
                    None => self.ensemble.score(&x_train, &y_train)?,
                };
                let improvement = if prior_accuracy == 0.0 {
                    prior_accuracy = accuracy;
                    1.0
                } else {
                    accuracy - prior_accuracy
                };
                if improvement < 1e-4 {
                    tolerance += 1;
                    log::debug!("BoostAODE: no improvement ({improvement:.6}), tolerance now {tolerance}");
                } else {
                    tolerance = 0;
                    num_items_pack = 0;
                }
                prior_accuracy = if self.params.convergence_best {
                    prior_accuracy.max(accuracy)
                } else {
                    accuracy
                };
            }

            finished = finished || tolerance > self.params.max_tolerance || features_used.len() == n_features;
        }

        if tolerance > self.params.max_tolerance {
            if num_items_pack < self.ensemble.n_models() {
                self.notes.push(format!("Convergence threshold reached & {num_items_pack} models eliminated"));
                for _ in 0..num_items_pack {
                    self.ensemble.pop_last();
                }
            } else {
                self.notes.push("Convergence threshold reached & 0 models eliminated".to_string());
            }
        }
        if features_used.len() != n_features {
            self.notes.push(format!("Used features in train: {} of {}", features_used.len(), n_features));
            self.status = Status::Warning;
        }
        self.notes.push(format!("Number of models: {}", self.ensemble.n_models()));
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

    fn require_fitted(&self) -> Result<()> {
        if !self.fitted {
            return Err(BayesNetError::LogicError("BoostAODE is not fitted".into()));
        }
        Ok(())
    }
}
