//! Multinomial logistic regression fitted by stochastic gradient descent.
//!
//! Minimizes the mean softmax cross-entropy plus `||W||² / (2 C n)`. The
//! learning rate decays every epoch and fitting stops once an epoch improves
//! the mean loss by less than the tolerance.

use nd_core::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::{argmax, Estimator, RANDOM_SEED};
use crate::vectorizer::SparseVec;

const TOLERANCE: f64 = 1e-4;
const INITIAL_LEARNING_RATE: f64 = 0.5;
const LEARNING_RATE_DECAY: f64 = 0.01;
/// Below this the lazily scaled weights are folded back in.
const MIN_SCALE: f64 = 1e-9;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    c: f64,
    max_iter: usize,
    weights: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

impl LogisticRegression {
    pub fn new(c: f64, max_iter: usize) -> Self {
        Self {
            c,
            max_iter,
            weights: Vec::new(),
            intercepts: Vec::new(),
        }
    }

    pub fn predict_proba(&self, row: &SparseVec) -> Vec<f64> {
        let scores: Vec<f64> = self
            .weights
            .iter()
            .zip(&self.intercepts)
            .map(|(w, b)| row.dot_dense(w) + b)
            .collect();
        softmax(&scores)
    }
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

impl Estimator for LogisticRegression {
    fn fit(
        &mut self,
        rows: &[SparseVec],
        labels: &[usize],
        n_classes: usize,
        n_features: usize,
    ) -> Result<()> {
        let n = rows.len();
        let lambda = 1.0 / (self.c * n as f64);
        let mut rng = StdRng::seed_from_u64(RANDOM_SEED);
        let mut order: Vec<usize> = (0..n).collect();

        // actual weights are `scale * weights`, so the L2 shrink stays O(1)
        let mut weights = vec![vec![0.0; n_features]; n_classes];
        let mut scale = 1.0;
        let mut intercepts = vec![0.0; n_classes];
        let mut previous_loss = f64::INFINITY;

        for epoch in 0..self.max_iter {
            let eta = INITIAL_LEARNING_RATE / (1.0 + LEARNING_RATE_DECAY * epoch as f64);
            order.shuffle(&mut rng);
            let mut loss = 0.0;

            for &i in &order {
                let row = &rows[i];
                let scores: Vec<f64> = weights
                    .iter()
                    .zip(&intercepts)
                    .map(|(w, b)| scale * row.dot_dense(w) + b)
                    .collect();
                let probs = softmax(&scores);
                loss -= probs[labels[i]].max(f64::MIN_POSITIVE).ln();

                scale *= 1.0 - eta * lambda;
                for (class, p) in probs.iter().enumerate() {
                    let gradient = p - if class == labels[i] { 1.0 } else { 0.0 };
                    row.add_scaled_to(-eta * gradient / scale, &mut weights[class]);
                    intercepts[class] -= eta * gradient;
                }

                if scale < MIN_SCALE {
                    for w in weights.iter_mut().flatten() {
                        *w *= scale;
                    }
                    scale = 1.0;
                }
            }

            let squared: f64 = weights.iter().flatten().map(|w| w * w).sum();
            loss = loss / n as f64 + 0.5 * lambda * scale * scale * squared;
            if previous_loss - loss < TOLERANCE {
                tracing::debug!("LogisticRegression converged after {} epochs", epoch + 1);
                break;
            }
            previous_loss = loss;
        }

        for w in weights.iter_mut().flatten() {
            *w *= scale;
        }
        self.weights = weights;
        self.intercepts = intercepts;
        Ok(())
    }

    fn predict(&self, row: &SparseVec) -> usize {
        argmax(&self.predict_proba(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::separable_corpus;

    #[test]
    fn test_probabilities_sum_to_one() {
        let (rows, labels, n_features) = separable_corpus();
        let mut model = LogisticRegression::new(1.0, 1000);
        model.fit(&rows, &labels, 2, n_features).unwrap();
        for row in &rows {
            let probs = model.predict_proba(row);
            assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (rows, labels, n_features) = separable_corpus();
        let mut a = LogisticRegression::new(1.0, 50);
        let mut b = LogisticRegression::new(1.0, 50);
        a.fit(&rows, &labels, 2, n_features).unwrap();
        b.fit(&rows, &labels, 2, n_features).unwrap();
        assert_eq!(a.weights, b.weights);
        assert_eq!(a.intercepts, b.intercepts);
    }

    #[test]
    fn test_softmax_is_stable_for_large_scores() {
        let probs = softmax(&[1000.0, 1000.0]);
        assert!((probs[0] - 0.5).abs() < 1e-12);
    }
}
