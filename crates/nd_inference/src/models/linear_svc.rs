//! One-vs-rest linear SVM trained by dual coordinate descent
//! (squared hinge loss, L2 penalty, bias as an extra unit feature).

use nd_core::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::{argmax, Estimator, RANDOM_SEED};
use crate::vectorizer::SparseVec;

const TOLERANCE: f64 = 1e-4;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSvc {
    c: f64,
    max_iter: usize,
    /// One weight vector per class
    weights: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

impl LinearSvc {
    pub fn new(c: f64, max_iter: usize) -> Self {
        Self {
            c,
            max_iter,
            weights: Vec::new(),
            intercepts: Vec::new(),
        }
    }

    pub fn decision_function(&self, row: &SparseVec) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.intercepts)
            .map(|(w, b)| row.dot_dense(w) + b)
            .collect()
    }

    fn fit_binary(
        &self,
        rows: &[SparseVec],
        targets: &[f64],
        n_features: usize,
        rng: &mut StdRng,
    ) -> (Vec<f64>, f64) {
        let diag = 0.5 / self.c;
        let q_diag: Vec<f64> = rows.iter().map(|r| r.squared_norm() + 1.0 + diag).collect();
        let mut alpha = vec![0.0; rows.len()];
        let mut w = vec![0.0; n_features];
        let mut b = 0.0;
        let mut order: Vec<usize> = (0..rows.len()).collect();

        for iteration in 0..self.max_iter {
            order.shuffle(rng);
            let mut pg_max = f64::NEG_INFINITY;
            let mut pg_min = f64::INFINITY;

            for &i in &order {
                let y = targets[i];
                let g = y * (rows[i].dot_dense(&w) + b) - 1.0 + diag * alpha[i];
                let pg = if alpha[i] == 0.0 { g.min(0.0) } else { g };
                pg_max = pg_max.max(pg);
                pg_min = pg_min.min(pg);

                if pg.abs() > 1e-12 {
                    let old = alpha[i];
                    alpha[i] = (old - g / q_diag[i]).max(0.0);
                    let delta = (alpha[i] - old) * y;
                    rows[i].add_scaled_to(delta, &mut w);
                    b += delta;
                }
            }

            if pg_max - pg_min <= TOLERANCE {
                tracing::debug!("LinearSvc converged after {} iterations", iteration + 1);
                break;
            }
        }
        (w, b)
    }
}

impl Estimator for LinearSvc {
    fn fit(
        &mut self,
        rows: &[SparseVec],
        labels: &[usize],
        n_classes: usize,
        n_features: usize,
    ) -> Result<()> {
        let mut rng = StdRng::seed_from_u64(RANDOM_SEED);
        let mut weights = Vec::with_capacity(n_classes);
        let mut intercepts = Vec::with_capacity(n_classes);
        for class in 0..n_classes {
            let targets: Vec<f64> = labels
                .iter()
                .map(|&l| if l == class { 1.0 } else { -1.0 })
                .collect();
            let (w, b) = self.fit_binary(rows, &targets, n_features, &mut rng);
            weights.push(w);
            intercepts.push(b);
        }
        self.weights = weights;
        self.intercepts = intercepts;
        Ok(())
    }

    fn predict(&self, row: &SparseVec) -> usize {
        argmax(&self.decision_function(row))
    }
}
