use nd_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::vectorizer::SparseVec;

pub mod fallback;
pub mod knn;
pub mod linear_svc;
pub mod logistic;
pub mod naive_bayes;

pub use fallback::FallbackClassifier;
pub use knn::KNeighbors;
pub use linear_svc::LinearSvc;
pub use logistic::LogisticRegression;
pub use naive_bayes::MultinomialNb;

/// Seed shared by every randomized fit so model selection is reproducible.
pub const RANDOM_SEED: u64 = 42;

/// A classifier over TF-IDF rows with labels encoded as class indices.
pub trait Estimator {
    fn fit(
        &mut self,
        rows: &[SparseVec],
        labels: &[usize],
        n_classes: usize,
        n_features: usize,
    ) -> Result<()>;

    fn predict(&self, row: &SparseVec) -> usize;
}

/// The four candidate models compared during training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    KNeighbors,
    NaiveBayes,
    LinearSvm,
    LogisticRegression,
}

impl ModelKind {
    pub fn all() -> [ModelKind; 4] {
        [
            ModelKind::KNeighbors,
            ModelKind::NaiveBayes,
            ModelKind::LinearSvm,
            ModelKind::LogisticRegression,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::KNeighbors => "KNN",
            ModelKind::NaiveBayes => "Naive Bayes",
            ModelKind::LinearSvm => "Linear SVM",
            ModelKind::LogisticRegression => "Logistic Regression",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Model {
    KNeighbors(KNeighbors),
    NaiveBayes(MultinomialNb),
    LinearSvm(LinearSvc),
    LogisticRegression(LogisticRegression),
}

impl Model {
    pub fn kind(&self) -> ModelKind {
        match self {
            Model::KNeighbors(_) => ModelKind::KNeighbors,
            Model::NaiveBayes(_) => ModelKind::NaiveBayes,
            Model::LinearSvm(_) => ModelKind::LinearSvm,
            Model::LogisticRegression(_) => ModelKind::LogisticRegression,
        }
    }
}

impl Estimator for Model {
    fn fit(
        &mut self,
        rows: &[SparseVec],
        labels: &[usize],
        n_classes: usize,
        n_features: usize,
    ) -> Result<()> {
        if rows.len() != labels.len() {
            return Err(Error::Training(format!(
                "{} rows but {} labels",
                rows.len(),
                labels.len()
            )));
        }
        if rows.is_empty() {
            return Err(Error::Training("cannot fit on an empty dataset".to_string()));
        }
        match self {
            Model::KNeighbors(m) => m.fit(rows, labels, n_classes, n_features),
            Model::NaiveBayes(m) => m.fit(rows, labels, n_classes, n_features),
            Model::LinearSvm(m) => m.fit(rows, labels, n_classes, n_features),
            Model::LogisticRegression(m) => m.fit(rows, labels, n_classes, n_features),
        }
    }

    fn predict(&self, row: &SparseVec) -> usize {
        match self {
            Model::KNeighbors(m) => m.predict(row),
            Model::NaiveBayes(m) => m.predict(row),
            Model::LinearSvm(m) => m.predict(row),
            Model::LogisticRegression(m) => m.predict(row),
        }
    }
}

/// Fresh, unfitted model with the default hyper-parameters for `kind`.
pub fn create_model(kind: ModelKind) -> Model {
    match kind {
        ModelKind::KNeighbors => Model::KNeighbors(KNeighbors::new(5)),
        ModelKind::NaiveBayes => Model::NaiveBayes(MultinomialNb::new(1.0)),
        ModelKind::LinearSvm => Model::LinearSvm(LinearSvc::new(1.0, 1000)),
        ModelKind::LogisticRegression => {
            Model::LogisticRegression(LogisticRegression::new(1.0, 1000))
        }
    }
}

/// Index of the largest score; the first one wins ties.
pub(crate) fn argmax(scores: &[f64]) -> usize {
    let mut best = 0;
    for (i, &s) in scores.iter().enumerate().skip(1) {
        if s > scores[best] {
            best = i;
        }
    }
    best
}
