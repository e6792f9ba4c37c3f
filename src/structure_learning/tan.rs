//! Tree-Augmented Naive Bayes: a maximum-weight spanning tree over
//! `CMI(Xi;Xj|C)` oriented from a root, plus the implicit `class -> Xi`
//! edges (spec §4.7).
//!
//! Grounded on `original_source/bayesnet/classifiers/TAN.cc`.

use serde_json::{Map, Value};

use super::{add_class_edges, StructureLearner};
use crate::error::{BayesNetError, Result};
use crate::metrics::Metrics;
use crate::mst::maximum_spanning_tree;
use crate::network::Network;

#[derive(Debug, Clone)]
pub struct Tan {
    root: usize,
}

impl Default for Tan {
    fn default() -> Self {
        Tan { root: 0 }
    }
}

impl Tan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: usize) -> Self {
        Tan { root }
    }
}

impl StructureLearner for Tan {
    fn name(&self) -> &'static str {
        "TAN"
    }

    fn valid_hyperparameters(&self) -> &'static [&'static str] {
        &["root", "parent"]
    }

    fn set_hyperparameters(&mut self, params: &mut Map<String, Value>) -> Result<()> {
        if let Some(v) = params.remove("root") {
            self.root = v.as_u64().ok_or_else(|| BayesNetError::InvalidArgument("root must be an integer".into()))? as usize;
        }
        // The original codebase toggles the root to feature index 1 when the
        // "parent" hyperparameter is present (spec §4.7 step 3).
        if let Some(_v) = params.remove("parent") {
            self.root = 1;
        }
        Ok(())
    }

    fn build(&mut self, network: &mut Network, metrics: &mut Metrics, weights: &[f64]) -> Result<()> {
        let class_name = network.class_name().to_string();
        let features = network.features().to_vec();
        if self.root >= features.len() {
            return Err(BayesNetError::InvalidArgument(format!(
                "TAN root {} out of range for {} features",
                self.root,
                features.len()
            )));
        }
        add_class_edges(network, &class_name, &features)?;

        let cmi = metrics.conditional_edge(weights);
        let edges = maximum_spanning_tree(&cmi, self.root);
        log::debug!("TAN: maximum spanning tree rooted at {} has {} feature edges", features[self.root], edges.len());
        for (p, c) in edges {
            network.add_edge(&features[p], &features[c])?;
        }
        Ok(())
    }
}
