//! Correlation-based Feature Selection: greedy best-first search
//! maximizing the Hall merit, with the five-consecutive-no-improvement
//! stopping rule (spec §4.8).
//!
//! Grounded on `original_source/bayesnet/feature_selection/CFS.cc`.

use super::{not_fitted, FeatureSelector, SuScorer};
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct Cfs {
    max_features: usize,
    selected: Option<Vec<usize>>,
    scores: Option<Vec<f64>>,
}

impl Cfs {
    /// `max_features == 0` defaults to all features once `fit` observes the
    /// feature count (spec §4.8).
    pub fn new(max_features: usize) -> Self {
        Cfs {
            max_features,
            selected: None,
            scores: None,
        }
    }
}

impl FeatureSelector for Cfs {
    fn fit(&mut self, scorer: &mut SuScorer<'_, '_>, _weights: &[f64]) -> Result<()> {
        let n = scorer.n_features();
        let max_features = if self.max_features == 0 { n } else { self.max_features };

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| scorer.su_label(b).partial_cmp(&scorer.su_label(a)).unwrap());

        let mut selected = vec![order.remove(0)];
        let mut scores = vec![scorer.su_label(selected[0])];

        loop {
            let mut best_merit = f64::MIN;
            let mut best_feature = None;
            for &candidate in &order {
                selected.push(candidate);
                let merit = scorer.merit_cfs(&selected);
                selected.pop();
                if merit > best_merit {
                    best_merit = merit;
                    best_feature = Some(candidate);
                }
            }
            let Some(best_feature) = best_feature else {
                break;
            };
            selected.push(best_feature);
            scores.push(best_merit);
            order.retain(|&f| f != best_feature);

            if selected.len() == max_features || order.is_empty() {
                break;
            }
            if scores.len() >= 5 {
                let last_five = &scores[scores.len() - 5..];
                let mut non_improving = 0;
                let mut prev = f64::MIN;
                for &item in last_five {
                    if prev == f64::MIN {
                        prev = item;
                        continue;
                    }
                    if item > prev {
                        break;
                    }
                    non_improving += 1;
                    prev = item;
                }
                if non_improving == 4 {
                    break;
                }
            }
        }

        self.selected = Some(selected);
        self.scores = Some(scores);
        Ok(())
    }

    fn get_features(&self) -> Result<&[usize]> {
        self.selected.as_deref().ok_or_else(|| not_fitted("CFS"))
    }

    fn get_scores(&self) -> Result<&[f64]> {
        self.scores.as_deref().ok_or_else(|| not_fitted("CFS"))
    }
}
