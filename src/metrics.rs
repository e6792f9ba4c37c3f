//! Information-theoretic metrics (spec §4.1): weighted entropy, mutual
//! information, conditional entropy, conditional mutual information,
//! symmetrical uncertainty, the conditional-edge weight matrix used by TAN,
//! and K-best feature/pair ranking with caching.
//!
//! Grounded on `bayesnet::Metrics` (`original_source/bayesnet/utils/BayesMetrics.h`)
//! and `FeatureSelect::symmetricalUncertainty`.

use crate::error::{BayesNetError, Result};
use itertools::Itertools;
use ndarray::{Array2, ArrayView1};
use std::collections::HashMap;

/// Weighted Shannon entropy (natural log) of a discrete row. Empty or
/// single-valued input is 0 (spec §4.1).
pub fn entropy(x: ArrayView1<i32>, w: &[f64]) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    let counts = weighted_counts(&[x], w);
    let total: f64 = counts.values().sum();
    if total <= 0.0 {
        return 0.0;
    }
    counts
        .values()
        .map(|&c| {
            if c <= 0.0 {
                0.0
            } else {
                let p = c / total;
                -p * p.ln()
            }
        })
        .sum()
}

/// Joint weighted entropy over any number of aligned discrete rows.
fn joint_entropy(rows: &[ArrayView1<i32>], w: &[f64]) -> f64 {
    if rows.is_empty() || rows[0].is_empty() {
        return 0.0;
    }
    let counts = weighted_counts(rows, w);
    let total: f64 = counts.values().sum();
    if total <= 0.0 {
        return 0.0;
    }
    counts
        .values()
        .map(|&c| {
            if c <= 0.0 {
                0.0
            } else {
                let p = c / total;
                -p * p.ln()
            }
        })
        .sum()
}

fn weighted_counts(rows: &[ArrayView1<i32>], w: &[f64]) -> HashMap<Vec<i32>, f64> {
    let n = rows[0].len();
    let mut counts: HashMap<Vec<i32>, f64> = HashMap::new();
    for s in 0..n {
        let key: Vec<i32> = rows.iter().map(|r| r[s]).collect();
        *counts.entry(key).or_insert(0.0) += w[s];
    }
    counts
}

/// `I(X;Y) = H(X) + H(Y) - H(X,Y)`. Non-negative; 0 iff independent.
pub fn mutual_information(x: ArrayView1<i32>, y: ArrayView1<i32>, w: &[f64]) -> f64 {
    let hx = entropy(x, w);
    let hy = entropy(y, w);
    let hxy = joint_entropy(&[x, y], w);
    (hx + hy - hxy).max(0.0)
}

/// `H(x,y,z) - H(y,z)` (chain rule form, spec §4.1).
pub fn conditional_entropy(x: ArrayView1<i32>, y: ArrayView1<i32>, z: ArrayView1<i32>, w: &[f64]) -> f64 {
    let hxyz = joint_entropy(&[x, y, z], w);
    let hyz = joint_entropy(&[y, z], w);
    (hxyz - hyz).max(0.0)
}

/// `I(X;Y|Z) = H(X|Z) - H(X|Y,Z)`.
pub fn conditional_mutual_information(
    x: ArrayView1<i32>,
    y: ArrayView1<i32>,
    z: ArrayView1<i32>,
    w: &[f64],
) -> f64 {
    let hxz = {
        let hxz = joint_entropy(&[x, z], w);
        let hz = entropy(z, w);
        (hxz - hz).max(0.0)
    };
    let hxyz_given = conditional_entropy(x, y, z, w);
    (hxz - hxyz_given).max(0.0)
}

/// `2 * I(X;Y) / (H(X) + H(Y))`, 0 when the denominator is 0.
pub fn symmetrical_uncertainty(x: ArrayView1<i32>, y: ArrayView1<i32>, w: &[f64]) -> f64 {
    let mi = mutual_information(x, y, w);
    let hx = entropy(x, w);
    let hy = entropy(y, w);
    let denom = hx + hy;
    if denom == 0.0 {
        0.0
    } else {
        2.0 * mi / denom
    }
}

/// Computes weighted information-theoretic quantities over a fixed sample
/// matrix, with K-best caching (spec §4.1).
pub struct Metrics<'a> {
    samples: &'a Array2<i32>,
    features: Vec<String>,
    class_name: String,
    class_num_states: usize,
    cache_k_best: Option<(Vec<f64>, bool, Vec<usize>, Vec<f64>)>,
    cache_su_features: HashMap<(usize, usize), f64>,
}

impl<'a> Metrics<'a> {
    pub fn new(
        samples: &'a Array2<i32>,
        features: Vec<String>,
        class_name: String,
        class_num_states: usize,
    ) -> Self {
        Metrics {
            samples,
            features,
            class_name,
            class_num_states,
            cache_k_best: None,
            cache_su_features: HashMap::new(),
        }
    }

    pub fn class_num_states(&self) -> usize {
        self.class_num_states
    }

    fn class_row_idx(&self) -> usize {
        self.features.len()
    }

    /// Row `-1` (encoded as `None`) means the class row (spec §4.1).
    fn row(&self, idx: Option<usize>) -> ArrayView1<i32> {
        match idx {
            Some(i) => self.samples.row(i),
            None => self.samples.row(self.class_row_idx()),
        }
    }

    pub fn entropy_of(&self, idx: Option<usize>, w: &[f64]) -> f64 {
        entropy(self.row(idx), w)
    }

    pub fn mutual_information_of(&self, a: Option<usize>, b: Option<usize>, w: &[f64]) -> f64 {
        mutual_information(self.row(a), self.row(b), w)
    }

    pub fn conditional_mutual_information_of(
        &self,
        a: Option<usize>,
        b: Option<usize>,
        z: Option<usize>,
        w: &[f64],
    ) -> f64 {
        conditional_mutual_information(self.row(a), self.row(b), self.row(z), w)
    }

    pub fn symmetrical_uncertainty_of(&mut self, a: usize, b: Option<usize>, w: &[f64]) -> f64 {
        if let Some(bi) = b {
            let key = if a < bi { (a, bi) } else { (bi, a) };
            if let Some(&v) = self.cache_su_features.get(&key) {
                return v;
            }
            let v = symmetrical_uncertainty(self.row(Some(a)), self.row(Some(bi)), w);
            self.cache_su_features.insert(key, v);
            v
        } else {
            symmetrical_uncertainty(self.row(Some(a)), self.row(None), w)
        }
    }

    /// `(n_features x n_features)` symmetric tensor, `(i,j) = CMI(Xi;Xj|C)`,
    /// diagonal 0 (spec §4.1).
    pub fn conditional_edge(&self, w: &[f64]) -> Array2<f64> {
        let n = self.features.len();
        let mut out = Array2::<f64>::zeros((n, n));
        let class_idx = Some(self.class_row_idx());
        for i in 0..n {
            for j in (i + 1)..n {
                let v = conditional_mutual_information(
                    self.row(Some(i)),
                    self.row(Some(j)),
                    self.row(class_idx),
                    w,
                );
                out[[i, j]] = v;
                out[[j, i]] = v;
            }
        }
        out
    }

    /// K feature indices sorted by `MI(Xi;C|w)`; ties broken by insertion
    /// order. Caches the full sorted list so a later call with larger `k`
    /// doesn't recompute (spec §4.1).
    pub fn select_k_best_weighted(&mut self, w: &[f64], ascending: bool, k: usize) -> Result<Vec<usize>> {
        let n = self.features.len();
        let k = if k == 0 { n } else { k };
        if k > n {
            return Err(BayesNetError::InvalidArgument(format!(
                "k={} exceeds feature count {}",
                k, n
            )));
        }
        let need_recompute = match &self.cache_k_best {
            Some((cached_w, cached_asc, _, _)) => cached_w.as_slice() != w || *cached_asc != ascending,
            None => true,
        };
        if need_recompute {
            let class_idx = Some(self.class_row_idx());
            let mut scored: Vec<(usize, f64)> = (0..n)
                .map(|i| (i, mutual_information(self.row(Some(i)), self.row(class_idx), w)))
                .collect();
            if ascending {
                scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap().then(a.0.cmp(&b.0)));
            } else {
                scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap().then(a.0.cmp(&b.0)));
            }
            let (indices, scores): (Vec<usize>, Vec<f64>) = scored.into_iter().unzip();
            self.cache_k_best = Some((w.to_vec(), ascending, indices, scores));
        }
        let (_, _, indices, _) = self.cache_k_best.as_ref().unwrap();
        Ok(indices[..k].to_vec())
    }

    pub fn scores_k_best(&self) -> Option<&[f64]> {
        self.cache_k_best.as_ref().map(|(_, _, _, s)| s.as_slice())
    }

    /// K feature-index pairs `(i<j)` sorted by `CMI(Xi;Xj|C)`; pairs
    /// touching `excluded` removed (spec §4.1).
    pub fn select_k_pairs(
        &self,
        w: &[f64],
        excluded: &[usize],
        ascending: bool,
        k: usize,
    ) -> Vec<(usize, usize, f64)> {
        let n = self.features.len();
        let class_idx = Some(self.class_row_idx());
        let mut pairs: Vec<(usize, usize, f64)> = (0..n)
            .tuple_combinations()
            .filter(|(i, j)| !excluded.contains(i) && !excluded.contains(j))
            .map(|(i, j)| {
                let cmi = conditional_mutual_information(self.row(Some(i)), self.row(Some(j)), self.row(class_idx), w);
                (i, j, cmi)
            })
            .collect();
        if ascending {
            pairs.sort_by(|a, b| a.2.partial_cmp(&b.2).unwrap());
        } else {
            pairs.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap());
        }
        let k = if k == 0 || k > pairs.len() { pairs.len() } else { k };
        pairs.truncate(k);
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn entropy_of_constant_is_zero() {
        let x = array![0, 0, 0, 0];
        let w = vec![0.25; 4];
        assert_eq!(entropy(x.view(), &w), 0.0);
    }

    #[test]
    fn mutual_information_with_self_equals_entropy() {
        let x = array![0, 1, 0, 1, 1];
        let w = vec![0.2; 5];
        let mi = mutual_information(x.view(), x.view(), &w);
        let h = entropy(x.view(), &w);
        assert_relative_eq!(mi, h, epsilon = 1e-9);
    }

    #[test]
    fn mutual_information_is_nonnegative() {
        let x = array![0, 1, 2, 0, 1, 2, 0];
        let y = array![1, 1, 0, 0, 1, 0, 1];
        let w = vec![1.0 / 7.0; 7];
        assert!(mutual_information(x.view(), y.view(), &w) >= -1e-12);
    }

    #[test]
    fn symmetrical_uncertainty_self_is_one() {
        let x = array![0, 1, 2, 0, 1, 2];
        let w = vec![1.0 / 6.0; 6];
        let su = symmetrical_uncertainty(x.view(), x.view(), &w);
        assert_relative_eq!(su, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn select_k_best_weighted_rejects_oversized_k() {
        let samples = array![[0, 1, 0, 1], [1, 1, 0, 0], [0, 0, 1, 1]];
        let mut m = Metrics::new(&samples, vec!["a".into(), "b".into()], "class".into(), 2);
        let w = vec![0.25; 4];
        assert!(m.select_k_best_weighted(&w, false, 3).is_err());
    }
}
