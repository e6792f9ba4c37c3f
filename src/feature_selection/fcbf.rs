//! Fast Correlation-Based Filter: keep features with `SU(Xi;C) >=
//! threshold`, sorted descending, then drop any feature dominated by an
//! earlier, more-class-relevant feature (spec §4.8).

use super::{not_fitted, FeatureSelector, SuScorer};
use crate::error::{BayesNetError, Result};

#[derive(Debug, Clone)]
pub struct Fcbf {
    threshold: f64,
    selected: Option<Vec<usize>>,
    scores: Option<Vec<f64>>,
}

impl Fcbf {
    pub fn new(threshold: f64) -> Result<Self> {
        if threshold < 1e-7 {
            return Err(BayesNetError::InvalidArgument("FCBF threshold must be >= 1e-7".into()));
        }
        Ok(Fcbf {
            threshold,
            selected: None,
            scores: None,
        })
    }
}

impl FeatureSelector for Fcbf {
    fn fit(&mut self, scorer: &mut SuScorer<'_, '_>, _weights: &[f64]) -> Result<()> {
        let n = scorer.n_features();
        let mut candidates: Vec<usize> = (0..n).filter(|&i| scorer.su_label(i) >= self.threshold).collect();
        candidates.sort_by(|&a, &b| scorer.su_label(b).partial_cmp(&scorer.su_label(a)).unwrap());

        let mut kept: Vec<usize> = Vec::new();
        let mut i = 0;
        while i < candidates.len() {
            let xi = candidates[i];
            kept.push(xi);
            candidates = candidates[i + 1..]
                .iter()
                .copied()
                .filter(|&xj| scorer.su_feature(xi, xj) < scorer.su_label(xj))
                .collect();
            i = 0;
        }

        let scores = kept.iter().map(|&f| scorer.su_label(f)).collect();
        self.selected = Some(kept);
        self.scores = Some(scores);
        Ok(())
    }

    fn get_features(&self) -> Result<&[usize]> {
        self.selected.as_deref().ok_or_else(|| not_fitted("FCBF"))
    }

    fn get_scores(&self) -> Result<&[f64]> {
        self.scores.as_deref().ok_or_else(|| not_fitted("FCBF"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_threshold_below_minimum() {
        assert!(Fcbf::new(1e-8).is_err());
    }

    #[test]
    fn accepts_minimum_threshold() {
        assert!(Fcbf::new(1e-7).is_ok());
    }
}
