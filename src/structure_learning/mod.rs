//! Structure learners that populate a [`Network`](crate::network::Network)'s
//! edges (spec §4.7): naive Bayes, TAN, K-DB and SPODE. AODE, being an
//! ensemble of SPODEs rather than a single DAG, lives in
//! [`crate::ensemble`].
//!
//! All learners assume the class node has already been added and share the
//! convention that every feature gets a `class -> feature` edge (spec §4.7
//! preamble).

pub mod kdb;
pub mod naive_bayes;
pub mod spode;
pub mod tan;

pub use kdb::Kdb;
pub use naive_bayes::NaiveBayes;
pub use spode::Spode;
pub use tan::Tan;

use serde_json::{Map, Value};

use crate::error::Result;
use crate::metrics::Metrics;
use crate::network::Network;

/// A structure-learning algorithm: given an already-node-populated,
/// edge-free network plus weighted metrics over the training sample, add
/// the edges that define the classifier's DAG.
pub trait StructureLearner: Send + Sync {
    fn name(&self) -> &'static str;

    /// Hyperparameter keys this learner recognizes (spec §6 schema).
    fn valid_hyperparameters(&self) -> &'static [&'static str] {
        &[]
    }

    /// Consumes recognized keys from `params`, removing them, per the
    /// pass-down dispatch contract (spec §9).
    fn set_hyperparameters(&mut self, _params: &mut Map<String, Value>) -> Result<()> {
        Ok(())
    }

    fn build(&mut self, network: &mut Network, metrics: &mut Metrics, weights: &[f64]) -> Result<()>;
}

/// `class -> feature` for every feature; shared by every learner below
/// (spec §4.7 preamble).
pub(crate) fn add_class_edges(network: &mut Network, class_name: &str, features: &[String]) -> Result<()> {
    for f in features {
        network.add_edge(class_name, f)?;
    }
    Ok(())
}
