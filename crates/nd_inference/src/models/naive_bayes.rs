//! Multinomial naive Bayes on TF-IDF weights.

use nd_core::Result;
use serde::{Deserialize, Serialize};

use super::{argmax, Estimator};
use crate::vectorizer::SparseVec;

/// Finite stand-in for ln(0), JSON cannot carry infinities.
const UNSEEN_CLASS_LOG_PRIOR: f64 = -1e300;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultinomialNb {
    /// Additive (Laplace) smoothing
    alpha: f64,
    class_log_prior: Vec<f64>,
    /// `[class][feature]` log P(feature | class)
    feature_log_prob: Vec<Vec<f64>>,
}

impl MultinomialNb {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            class_log_prior: Vec::new(),
            feature_log_prob: Vec::new(),
        }
    }

    pub fn joint_log_likelihood(&self, row: &SparseVec) -> Vec<f64> {
        self.class_log_prior
            .iter()
            .zip(&self.feature_log_prob)
            .map(|(prior, log_probs)| prior + row.dot_dense(log_probs))
            .collect()
    }
}

impl Estimator for MultinomialNb {
    fn fit(
        &mut self,
        rows: &[SparseVec],
        labels: &[usize],
        n_classes: usize,
        n_features: usize,
    ) -> Result<()> {
        let mut class_count = vec![0usize; n_classes];
        let mut feature_count = vec![vec![0.0; n_features]; n_classes];
        for (row, &label) in rows.iter().zip(labels) {
            class_count[label] += 1;
            row.add_scaled_to(1.0, &mut feature_count[label]);
        }

        let n = rows.len() as f64;
        // a class absent from the training split can never be predicted
        self.class_log_prior = class_count
            .iter()
            .map(|&c| if c == 0 { UNSEEN_CLASS_LOG_PRIOR } else { (c as f64 / n).ln() })
            .collect();

        self.feature_log_prob = feature_count
            .into_iter()
            .map(|counts| {
                let total: f64 = counts.iter().sum::<f64>() + self.alpha * n_features as f64;
                counts
                    .into_iter()
                    .map(|c| ((c + self.alpha) / total).ln())
                    .collect()
            })
            .collect();
        Ok(())
    }

    fn predict(&self, row: &SparseVec) -> usize {
        argmax(&self.joint_log_likelihood(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::separable_corpus;

    #[test]
    fn test_empty_row_falls_back_to_prior() {
        let rows = vec![
            SparseVec { indices: vec![0], values: vec![1.0] },
            SparseVec { indices: vec![1], values: vec![1.0] },
            SparseVec { indices: vec![1], values: vec![1.0] },
        ];
        let mut nb = MultinomialNb::new(1.0);
        nb.fit(&rows, &[0, 1, 1], 2, 2).unwrap();
        assert_eq!(nb.predict(&SparseVec::default()), 1);
    }

    #[test]
    fn test_log_probabilities_are_normalized() {
        let (rows, labels, n_features) = separable_corpus();
        let mut nb = MultinomialNb::new(1.0);
        nb.fit(&rows, &labels, 2, n_features).unwrap();
        for log_probs in &nb.feature_log_prob {
            let total: f64 = log_probs.iter().map(|lp| lp.exp()).sum();
            assert!((total - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_unseen_class_is_never_predicted() {
        let rows = vec![SparseVec { indices: vec![0], values: vec![1.0] }];
        let mut nb = MultinomialNb::new(1.0);
        nb.fit(&rows, &[1], 2, 1).unwrap();
        assert_eq!(nb.predict(&rows[0]), 1);
    }
}
