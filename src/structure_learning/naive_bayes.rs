//! Naive Bayes: `class -> feature` for every feature, no feature-feature
//! edges (spec §1, §4.7 preamble).

use super::{add_class_edges, StructureLearner};
use crate::error::Result;
use crate::metrics::Metrics;
use crate::network::Network;

#[derive(Debug, Default, Clone)]
pub struct NaiveBayes;

impl NaiveBayes {
    pub fn new() -> Self {
        NaiveBayes
    }
}

impl StructureLearner for NaiveBayes {
    fn name(&self) -> &'static str {
        "NaiveBayes"
    }

    fn build(&mut self, network: &mut Network, _metrics: &mut Metrics, _weights: &[f64]) -> Result<()> {
        let class_name = network.class_name().to_string();
        let features = network.features().to_vec();
        add_class_edges(network, &class_name, &features)
    }
}
