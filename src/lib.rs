//! Discrete Bayesian network classifiers: Naive Bayes, TAN, K-DB, SPODE,
//! AODE and BoostAODE, plus the filter feature selectors and
//! local-discretization proposal that compose with them.

#[cfg(test)]
extern crate approx;

pub mod classifier;
pub mod concurrency;
pub mod dataset;
pub mod discretization;
pub mod ensemble;
pub mod error;
pub mod feature_selection;
pub mod ld_classifiers;
pub mod metrics;
pub mod mst;
pub mod network;
pub mod node;
pub mod proposal;
pub mod structure_learning;

pub use classifier::{Classifier, Status};
pub use dataset::{Dataset, Smoothing, States};
pub use error::{BayesNetError, Result};
pub use network::Network;
