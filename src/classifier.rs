//! Classifier base (spec §4.6): turns user inputs into the internal
//! dataset, delegates structure discovery to a `StructureLearner`, then
//! delegates parameter estimation to `Network::fit`.
//!
//! Grounded on `original_source/bayesnet/classifiers/Classifier.cc`.

use serde_json::{Map, Value};

use crate::dataset::{Dataset, Smoothing, States};
use crate::error::{BayesNetError, Result};
use crate::metrics::Metrics;
use crate::network::Network;
use crate::structure_learning::StructureLearner;
use ndarray::Array2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Normal,
    Warning,
    Error,
}

pub struct Classifier {
    learner: Box<dyn StructureLearner>,
    network: Option<Network>,
    notes: Vec<String>,
    status: Status,
}

impl Classifier {
    pub fn new(learner: Box<dyn StructureLearner>) -> Self {
        Classifier {
            learner,
            network: None,
            notes: Vec::new(),
            status: Status::Normal,
        }
    }

    /// `fit(X, y, features, className, states, smoothing)`; weights default
    /// to uniform `1/n_samples`.
    pub fn fit_xy(
        &mut self,
        x: &Array2<i32>,
        y: &[i32],
        feature_names: Vec<String>,
        class_name: String,
        states: &States,
        smoothing: Smoothing,
    ) -> Result<()> {
        let dataset = Dataset::from_x_y(x, y, feature_names, class_name)?;
        let weights = dataset.uniform_weights();
        self.fit_dataset(dataset, states, &weights, smoothing)
    }

    pub fn fit_xy_weighted(
        &mut self,
        x: &Array2<i32>,
        y: &[i32],
        feature_names: Vec<String>,
        class_name: String,
        states: &States,
        weights: &[f64],
        smoothing: Smoothing,
    ) -> Result<()> {
        let dataset = Dataset::from_x_y(x, y, feature_names, class_name)?;
        self.fit_dataset(dataset, states, weights, smoothing)
    }

    /// `fit(datasetMatrix, …)`: the caller already stacked `[features; class]`.
    pub fn fit_dataset(&mut self, dataset: Dataset, states: &States, weights: &[f64], smoothing: Smoothing) -> Result<()> {
        Self::check_fit_parameters(&dataset, states, weights)?;

        let features = dataset.feature_names().to_vec();
        let class_name = dataset.class_name().to_string();
        let n_classes = states[&class_name].len();

        let mut network = Network::new(class_name.clone());
        for f in &features {
            network.add_node(f)?;
        }
        network.add_node(&class_name)?;

        let mut metrics = Metrics::new(dataset.matrix(), features.clone(), class_name.clone(), n_classes);
        self.learner.build(&mut network, &mut metrics, weights)?;
        network.fit(&dataset, states, weights, smoothing)?;

        self.network = Some(network);
        self.notes.clear();
        self.status = Status::Normal;
        Ok(())
    }

    fn check_fit_parameters(dataset: &Dataset, states: &States, weights: &[f64]) -> Result<()> {
        if !states.contains_key(dataset.class_name()) {
            return Err(BayesNetError::InvalidArgument(format!(
                "states is missing the class variable {:?}",
                dataset.class_name()
            )));
        }
        for f in dataset.feature_names() {
            if !states.contains_key(f) {
                return Err(BayesNetError::InvalidArgument(format!("states is missing feature {f:?}")));
            }
        }
        if weights.len() != dataset.n_samples() {
            return Err(BayesNetError::InvalidArgument(format!(
                "weights length {} does not match sample count {}",
                weights.len(),
                dataset.n_samples()
            )));
        }
        Ok(())
    }

    fn network(&self) -> Result<&Network> {
        self.network.as_ref().ok_or_else(|| BayesNetError::LogicError("classifier is not fitted".into()))
    }

    pub fn fitted(&self) -> bool {
        self.network.as_ref().map(Network::fitted).unwrap_or(false)
    }

    pub fn predict(&self, x: &Array2<i32>) -> Result<Vec<usize>> {
        self.network()?.predict(x)
    }

    pub fn predict_proba(&self, x: &Array2<i32>) -> Result<Vec<Vec<f64>>> {
        self.network()?.predict_proba(x)
    }

    pub fn score(&self, x: &Array2<i32>, y: &[i32]) -> Result<f64> {
        self.network()?.score(x, y)
    }

    /// `0` before fit, not an error (spec §4.6 `Classifier.cc`'s
    /// `fitted ? model.getFeatures().size() : 0` ternary).
    pub fn get_number_of_nodes(&self) -> usize {
        self.network.as_ref().map(Network::get_number_of_nodes).unwrap_or(0)
    }

    pub fn get_number_of_edges(&self) -> usize {
        self.network.as_ref().map(Network::get_number_of_edges).unwrap_or(0)
    }

    pub fn get_number_of_states(&self) -> usize {
        self.network.as_ref().map(Network::get_number_of_states).unwrap_or(0)
    }

    pub fn get_class_num_states(&self) -> usize {
        self.network.as_ref().map(Network::get_class_num_states).unwrap_or(0)
    }

    pub fn show(&self) -> Result<String> {
        Ok(self.network()?.show())
    }

    pub fn graph(&self, title: &str) -> Result<String> {
        Ok(self.network()?.graph(title))
    }

    /// Feature names in learned topological order, class excluded.
    pub fn topological_order(&self) -> Result<Vec<String>> {
        let network = self.network()?;
        let class_name = network.class_name().to_string();
        Ok(network.topological_sort().into_iter().filter(|n| n != &class_name).collect())
    }

    pub fn get_notes(&self) -> &[String] {
        &self.notes
    }

    pub(crate) fn push_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    pub(crate) fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    /// Textual dump of every node's CPT tensor, one node per block.
    pub fn dump_cpt(&self) -> Result<String> {
        let network = self.network()?;
        let mut out = String::new();
        for name in network.topological_sort() {
            let node = network.node(&name).expect("topological_sort name must resolve");
            out.push_str(&format!("* {}\n", node.name));
            if let Some(cpt) = &node.cpt {
                out.push_str(&format!("{cpt}\n"));
            }
        }
        Ok(out)
    }

    /// Consumes the structure learner's recognized keys, then rejects
    /// anything left over (spec §4.6, §6).
    pub fn set_hyperparameters(&mut self, mut json: Map<String, Value>) -> Result<()> {
        self.learner.set_hyperparameters(&mut json)?;
        if let Some((key, _)) = json.into_iter().next() {
            return Err(BayesNetError::InvalidArgument(format!("unknown hyperparameter {key:?}")));
        }
        Ok(())
    }

    pub fn get_valid_hyperparameters(&self) -> &'static [&'static str] {
        self.learner.valid_hyperparameters()
    }

    pub fn get_status(&self) -> Status {
        self.status
    }

    pub fn get_version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
