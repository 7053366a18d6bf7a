//! K-nearest neighbours over TF-IDF rows.

use nd_core::Result;
use serde::{Deserialize, Serialize};

use super::Estimator;
use crate::vectorizer::SparseVec;

/// Euclidean distance, uniform vote; the smallest class index wins tied votes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KNeighbors {
    k: usize,
    n_classes: usize,
    n_features: usize,
    rows: Vec<SparseVec>,
    norms: Vec<f64>,
    labels: Vec<usize>,
}

impl KNeighbors {
    pub fn new(k: usize) -> Self {
        Self {
            k: k.max(1),
            n_classes: 0,
            n_features: 0,
            rows: Vec::new(),
            norms: Vec::new(),
            labels: Vec::new(),
        }
    }

    /// Squared distances to every stored row, nearest first.
    fn neighbours(&self, row: &SparseVec) -> Vec<(f64, usize)> {
        let query = row.to_dense(self.n_features);
        let query_norm = row.squared_norm();
        let mut distances: Vec<(f64, usize)> = self
            .rows
            .iter()
            .zip(&self.norms)
            .enumerate()
            .map(|(i, (train, norm))| {
                let d = (query_norm + norm - 2.0 * train.dot_dense(&query)).max(0.0);
                (d, i)
            })
            .collect();
        distances.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        distances.truncate(self.k);
        distances
    }
}

impl Estimator for KNeighbors {
    fn fit(
        &mut self,
        rows: &[SparseVec],
        labels: &[usize],
        n_classes: usize,
        n_features: usize,
    ) -> Result<()> {
        self.n_classes = n_classes;
        self.n_features = n_features;
        self.rows = rows.to_vec();
        self.norms = rows.iter().map(SparseVec::squared_norm).collect();
        self.labels = labels.to_vec();
        Ok(())
    }

    fn predict(&self, row: &SparseVec) -> usize {
        let mut votes = vec![0usize; self.n_classes.max(1)];
        for (_, i) in self.neighbours(row) {
            votes[self.labels[i]] += 1;
        }
        let mut best = 0;
        for (class, &count) in votes.iter().enumerate() {
            if count > votes[best] {
                best = class;
            }
        }
        best
    }
}
