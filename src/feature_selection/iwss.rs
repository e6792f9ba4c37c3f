//! Incremental Wrapper Subset Selection (filter variant): start from the
//! top-SU feature, add whichever candidate maximizes merit paired with it,
//! then keep adding the next candidate while merit improves or only
//! deteriorates within `threshold` (spec §4.8).
//!
//! Grounded on `original_source/bayesnet/feature_selection/IWSS.cc`.

use super::{not_fitted, FeatureSelector, SuScorer};
use crate::error::{BayesNetError, Result};

#[derive(Debug, Clone)]
pub struct Iwss {
    threshold: f64,
    max_features: usize,
    selected: Option<Vec<usize>>,
    scores: Option<Vec<f64>>,
}

impl Iwss {
    /// `max_features == 0` defaults to all features once `fit` observes the
    /// feature count, matching `IWSS.cc`'s `maxFeatures == 0 ? samples.size(0)
    /// - 1 : maxFeatures` default (spec §4.8).
    pub fn new(threshold: f64) -> Result<Self> {
        if !(0.0..=0.5).contains(&threshold) {
            return Err(BayesNetError::InvalidArgument("IWSS threshold must be in [0, 0.5]".into()));
        }
        Ok(Iwss {
            threshold,
            max_features: 0,
            selected: None,
            scores: None,
        })
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = max_features;
        self
    }
}

impl FeatureSelector for Iwss {
    fn fit(&mut self, scorer: &mut SuScorer<'_, '_>, _weights: &[f64]) -> Result<()> {
        let n = scorer.n_features();
        let max_features = if self.max_features == 0 { n } else { self.max_features };

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| scorer.su_label(b).partial_cmp(&scorer.su_label(a)).unwrap());
        if order.is_empty() {
            self.selected = Some(Vec::new());
            self.scores = Some(Vec::new());
            return Ok(());
        }

        let mut selected = vec![order.remove(0)];
        let mut scores = vec![scorer.su_label(selected[0])];

        // Second feature: whichever remaining candidate maximizes merit
        // paired with the first (IWSS.cc:30-47), not merely the SU runner-up.
        let mut best_merit = 0.0;
        let mut second_feature = None;
        for &candidate in &order {
            selected.push(candidate);
            let candidate_merit = scorer.merit_cfs(&selected);
            selected.pop();
            if candidate_merit > best_merit {
                best_merit = candidate_merit;
                second_feature = Some(candidate);
            }
        }

        if let Some(second_feature) = second_feature {
            selected.push(second_feature);
            scores.push(best_merit);
            order.retain(|&f| f != second_feature);
        }

        let mut merit = best_merit;
        for candidate in order {
            selected.push(candidate);
            let new_merit = scorer.merit_cfs(&selected);
            let delta = if merit != 0.0 { (merit - new_merit).abs() / merit } else { 0.0 };
            if new_merit > merit || delta < self.threshold {
                if new_merit > merit {
                    merit = new_merit;
                }
                scores.push(new_merit);
            } else {
                selected.pop();
                break;
            }
            if selected.len() == max_features {
                break;
            }
        }

        self.selected = Some(selected);
        self.scores = Some(scores);
        Ok(())
    }

    fn get_features(&self) -> Result<&[usize]> {
        self.selected.as_deref().ok_or_else(|| not_fitted("IWSS"))
    }

    fn get_scores(&self) -> Result<&[f64]> {
        self.scores.as_deref().ok_or_else(|| not_fitted("IWSS"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Metrics;
    use approx::assert_relative_eq;
    use ndarray::{array, Array2};

    #[test]
    fn rejects_threshold_out_of_range() {
        assert!(Iwss::new(0.6).is_err());
        assert!(Iwss::new(-0.1).is_err());
        assert!(Iwss::new(0.5).is_ok());
    }

    // A is the most class-relevant feature (SU ~0.5616). Among the rest, B
    // has the higher standalone SU (~0.0499) but is more redundant with A,
    // so C (SU ~0, but SU(A,C) lower than SU(A,B)) pairs with A at a higher
    // CFS merit (~0.3876 vs ~0.3702). The second feature must be C, not the
    // SU runner-up B.
    fn abc_samples() -> Array2<i32> {
        array![
            [0, 0, 0, 0, 1, 1, 1, 0],
            [1, 0, 0, 1, 1, 1, 1, 0],
            [0, 1, 0, 1, 0, 1, 0, 1],
            [0, 0, 0, 0, 1, 1, 1, 1],
        ]
    }

    #[test]
    fn second_feature_is_merit_argmax_not_su_runner_up() {
        let samples = abc_samples();
        let features = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let w = vec![1.0; 8];
        let mut metrics = Metrics::new(&samples, features, "class".to_string(), 2);
        let mut scorer = SuScorer::new(&mut metrics, 3, &w);

        let mut iwss = Iwss::new(0.1).unwrap();
        iwss.fit(&mut scorer, &w).unwrap();

        // B (index 1) is rejected: its merit with [A, C] deteriorates by
        // ~20%, past the 0.1 threshold, and the loop must stop there.
        assert_eq!(iwss.get_features().unwrap(), &[0, 2]);
        let scores = iwss.get_scores().unwrap();
        assert_eq!(scores.len(), 2);
        assert_relative_eq!(scores[0], 0.561633, epsilon = 1e-3);
        assert_relative_eq!(scores[1], 0.387571, epsilon = 1e-3);
    }

    #[test]
    fn max_features_caps_growth_before_later_candidates() {
        // Same A/B/C plus a duplicate-of-C fourth feature D. With a looser
        // threshold B's addition is accepted (~20% deterioration < 0.25),
        // and max_features = 3 must stop growth right there, before D is
        // ever evaluated.
        let samples = array![
            [0, 0, 0, 0, 1, 1, 1, 0],
            [1, 0, 0, 1, 1, 1, 1, 0],
            [0, 1, 0, 1, 0, 1, 0, 1],
            [0, 1, 0, 1, 0, 1, 0, 1],
            [0, 0, 0, 0, 1, 1, 1, 1],
        ];
        let features = vec!["A".to_string(), "B".to_string(), "C".to_string(), "D".to_string()];
        let w = vec![1.0; 8];
        let mut metrics = Metrics::new(&samples, features, "class".to_string(), 2);
        let mut scorer = SuScorer::new(&mut metrics, 4, &w);

        let mut iwss = Iwss::new(0.25).unwrap().with_max_features(3);
        iwss.fit(&mut scorer, &w).unwrap();

        assert_eq!(iwss.get_features().unwrap(), &[0, 2, 1]);
    }
}
