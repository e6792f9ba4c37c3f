//! The shared data model (spec §3): the samples matrix, the states map,
//! sample weights, and the smoothing-kind enum consumed by every CPT
//! estimator.

use crate::error::{BayesNetError, Result};
use indexmap::IndexMap;
use ndarray::Array2;

/// `{NONE, ORIGINAL, LAPLACE, CESTNIK}` (spec §3, factors in §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Smoothing {
    None,
    Original,
    Laplace,
    Cestnik,
}

impl Smoothing {
    /// The constant added to every CPT cell before normalization.
    pub fn factor(&self, n_samples: usize, num_states: usize) -> f64 {
        match self {
            Smoothing::None => 0.0,
            Smoothing::Original => 1.0 / n_samples.max(1) as f64,
            Smoothing::Laplace => 1.0,
            Smoothing::Cestnik => 1.0 / num_states.max(1) as f64,
        }
    }
}

/// Mapping from variable name (feature or class) to its ordered list of
/// legal integer codes. Order-preserving: axis positions in a CPT are
/// derived from state-list position, so insertion order is load-bearing
/// (unlike the teacher's `BTreeSet<String>` domain, which only needed
/// lexicographic order for a CIM's label axis).
pub type States = IndexMap<String, Vec<i32>>;

/// `(n_features + 1, n_samples)` integer matrix; last row is the class.
#[derive(Debug, Clone)]
pub struct Dataset {
    data: Array2<i32>,
    feature_names: Vec<String>,
    class_name: String,
}

impl Dataset {
    pub fn new(data: Array2<i32>, feature_names: Vec<String>, class_name: String) -> Result<Self> {
        if data.nrows() != feature_names.len() + 1 {
            return Err(BayesNetError::InvalidArgument(format!(
                "feature-name arity {} does not match dataset rows {}",
                feature_names.len(),
                data.nrows()
            )));
        }
        Ok(Dataset {
            data,
            feature_names,
            class_name,
        })
    }

    pub fn from_x_y(x: &Array2<i32>, y: &[i32], feature_names: Vec<String>, class_name: String) -> Result<Self> {
        if x.ncols() != y.len() {
            return Err(BayesNetError::InvalidArgument(format!(
                "|X| = {} does not match |y| = {}",
                x.ncols(),
                y.len()
            )));
        }
        let mut data = Array2::<i32>::zeros((x.nrows() + 1, x.ncols()));
        data.slice_mut(ndarray::s![0..x.nrows(), ..]).assign(x);
        for (j, &yv) in y.iter().enumerate() {
            data[[x.nrows(), j]] = yv;
        }
        Dataset::new(data, feature_names, class_name)
    }

    pub fn matrix(&self) -> &Array2<i32> {
        &self.data
    }

    pub fn n_samples(&self) -> usize {
        self.data.ncols()
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Row index of a named variable; the class row is `n_features`.
    pub fn row_of(&self, name: &str) -> Option<usize> {
        if name == self.class_name {
            Some(self.feature_names.len())
        } else {
            self.feature_names.iter().position(|f| f == name)
        }
    }

    pub fn row(&self, idx: usize) -> ndarray::ArrayView1<i32> {
        self.data.row(idx)
    }

    pub fn class_row(&self) -> ndarray::ArrayView1<i32> {
        self.data.row(self.feature_names.len())
    }

    /// Uniform `1/n_samples` default weights (spec §3, §4.6).
    pub fn uniform_weights(&self) -> Vec<f64> {
        let n = self.n_samples();
        vec![1.0 / n.max(1) as f64; n]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoothing_factors_match_spec_table() {
        assert_eq!(Smoothing::None.factor(10, 3), 0.0);
        assert_eq!(Smoothing::Original.factor(10, 3), 0.1);
        assert_eq!(Smoothing::Laplace.factor(10, 3), 1.0);
        assert_eq!(Smoothing::Cestnik.factor(10, 3), 1.0 / 3.0);
    }

    #[test]
    fn from_x_y_rejects_length_mismatch() {
        let x = Array2::<i32>::zeros((2, 5));
        let y = vec![0, 1, 0];
        let err = Dataset::from_x_y(&x, &y, vec!["a".into(), "b".into()], "class".into());
        assert!(matches!(err, Err(BayesNetError::InvalidArgument(_))));
    }
}
