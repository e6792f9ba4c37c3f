//! Superparent One-Dependence Estimator: `class -> Xi` for every feature
//! plus `root -> Xi` for every `i != root` (spec §4.7).

use serde_json::{Map, Value};

use super::{add_class_edges, StructureLearner};
use crate::error::{BayesNetError, Result};
use crate::metrics::Metrics;
use crate::network::Network;

#[derive(Debug, Clone)]
pub struct Spode {
    root: usize,
}

impl Spode {
    pub fn new(root: usize) -> Self {
        Spode { root }
    }

    pub fn root(&self) -> usize {
        self.root
    }
}

impl StructureLearner for Spode {
    fn name(&self) -> &'static str {
        "SPODE"
    }

    fn valid_hyperparameters(&self) -> &'static [&'static str] {
        &["root"]
    }

    fn set_hyperparameters(&mut self, params: &mut Map<String, Value>) -> Result<()> {
        if let Some(v) = params.remove("root") {
            self.root = v
                .as_u64()
                .ok_or_else(|| BayesNetError::InvalidArgument("root must be an integer".into()))? as usize;
        }
        Ok(())
    }

    fn build(&mut self, network: &mut Network, _metrics: &mut Metrics, _weights: &[f64]) -> Result<()> {
        let class_name = network.class_name().to_string();
        let features = network.features().to_vec();
        if self.root >= features.len() {
            return Err(BayesNetError::InvalidArgument(format!(
                "SPODE root {} out of range for {} features",
                self.root,
                features.len()
            )));
        }
        add_class_edges(network, &class_name, &features)?;
        let root_name = features[self.root].clone();
        for (i, f) in features.iter().enumerate() {
            if i != self.root {
                network.add_edge(&root_name, f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use ndarray::array;

    #[test]
    fn produces_two_n_minus_one_edges() {
        let features = ["A", "B", "C", "D"];
        let mut net = Network::new("class");
        for f in features {
            net.add_node(f).unwrap();
        }
        net.add_node("class").unwrap();
        let x = array![
            [0, 1, 0, 1],
            [1, 1, 0, 0],
            [0, 0, 1, 1],
            [1, 0, 1, 0],
        ];
        let y = vec![0, 1, 0, 1];
        let dataset = Dataset::from_x_y(
            &x,
            &y,
            features.iter().map(|s| s.to_string()).collect(),
            "class".into(),
        )
        .unwrap();
        let w = dataset.uniform_weights();
        let mut metrics = Metrics::new(
            dataset.matrix(),
            features.iter().map(|s| s.to_string()).collect(),
            "class".into(),
            2,
        );
        Spode::new(1).build(&mut net, &mut metrics, &w).unwrap();
        assert_eq!(net.get_number_of_edges(), 2 * features.len() - 1);
    }
}
