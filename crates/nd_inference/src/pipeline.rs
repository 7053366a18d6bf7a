//! Preprocess -> TF-IDF -> classifier, bundled so it can be saved and reloaded
//! as a single JSON artifact.

use chrono::{DateTime, Utc};
use nd_core::{Classifier, Error, Result, NEUTRAL_SENTIMENT, UNKNOWN_CATEGORY};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::models::{create_model, Estimator, FallbackClassifier, Model, ModelKind};
use crate::preprocess::TextPreprocessor;
use crate::vectorizer::TfidfVectorizer;

/// What a trained model labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    Category,
    Sentiment,
}

impl Task {
    /// Label assigned when there is nothing to classify.
    pub fn default_label(&self) -> &'static str {
        match self {
            Task::Category => UNKNOWN_CATEGORY,
            Task::Sentiment => NEUTRAL_SENTIMENT,
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Task::Category => write!(f, "category"),
            Task::Sentiment => write!(f, "sentiment"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextPipeline {
    preprocessor: TextPreprocessor,
    vectorizer: TfidfVectorizer,
    /// Label of each class index, sorted
    classes: Vec<String>,
    model: Model,
}

impl TextPipeline {
    pub fn new(kind: ModelKind) -> Self {
        Self {
            preprocessor: TextPreprocessor::default(),
            vectorizer: TfidfVectorizer::default(),
            classes: Vec::new(),
            model: create_model(kind),
        }
    }

    pub fn kind(&self) -> ModelKind {
        self.model.kind()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn fit(&mut self, texts: &[String], labels: &[String]) -> Result<()> {
        if texts.len() != labels.len() {
            return Err(Error::Training(format!(
                "{} texts but {} labels",
                texts.len(),
                labels.len()
            )));
        }
        self.classes = labels
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let encoded: Vec<usize> = labels
            .iter()
            .filter_map(|l| self.classes.binary_search(l).ok())
            .collect();

        let cleaned = self.preprocessor.preprocess_all(texts);
        let rows = self.vectorizer.fit_transform(&cleaned)?;
        self.model.fit(
            &rows,
            &encoded,
            self.classes.len(),
            self.vectorizer.n_features(),
        )
    }

    pub fn predict_one(&self, text: &str) -> Result<String> {
        if self.classes.is_empty() {
            return Err(Error::Inference(format!(
                "{} pipeline has not been fitted",
                self.kind()
            )));
        }
        let row = self.vectorizer.transform(&self.preprocessor.preprocess(text));
        let index = self.model.predict(&row);
        self.classes
            .get(index)
            .cloned()
            .ok_or_else(|| Error::Inference(format!("class index {} out of range", index)))
    }

    pub fn predict_many(&self, texts: &[String]) -> Result<Vec<String>> {
        texts.iter().map(|t| self.predict_one(t)).collect()
    }
}

impl Classifier for TextPipeline {
    fn name(&self) -> &str {
        self.kind().name()
    }

    fn predict(&self, text: &str) -> Result<String> {
        self.predict_one(text)
    }
}

/// A selected pipeline plus the facts recorded when it was chosen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub name: String,
    pub task: Task,
    pub accuracy: f64,
    pub trained_at: DateTime<Utc>,
    pub pipeline: TextPipeline,
}

impl ModelArtifact {
    pub fn new(task: Task, accuracy: f64, pipeline: TextPipeline) -> Self {
        Self {
            name: pipeline.kind().name().to_string(),
            task,
            accuracy,
            trained_at: Utc::now(),
            pipeline,
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_vec(self)?)?;
        info!("Saved {} model ({}) to {}", self.task, self.name, path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| {
            Error::Inference(format!("cannot read model file {}: {}", path.display(), e))
        })?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

pub fn load_classifier(path: &Path) -> Result<Arc<dyn Classifier>> {
    let artifact = ModelArtifact::load(path)?;
    info!(
        "Loaded {} model {} (accuracy {:.4}) from {}",
        artifact.task,
        artifact.name,
        artifact.accuracy,
        path.display()
    );
    Ok(Arc::new(artifact.pipeline))
}

/// Loads the model at `path`, or a [`FallbackClassifier`] answering the task's
/// default label when it cannot be loaded.
pub fn load_or_fallback(path: &Path, task: Task) -> Arc<dyn Classifier> {
    match load_classifier(path) {
        Ok(model) => model,
        Err(e) => {
            warn!(
                "Could not load {} model: {}. Every record will be labeled {:?}",
                task,
                e,
                task.default_label()
            );
            Arc::new(FallbackClassifier::new(task.default_label()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn corpus() -> (Vec<String>, Vec<String>) {
        let rows = [
            ("Striker scores twice as the football club wins the league", "SPORTS"),
            ("Football coach praises keeper after cup match", "SPORTS"),
            ("Tennis champion wins final match in straight sets", "SPORTS"),
            ("Stock market rallies as investors cheer earnings", "BUSINESS"),
            ("Bank shares slide after profit warning", "BUSINESS"),
            ("Investors sell shares as market earnings disappoint", "BUSINESS"),
        ];
        rows.iter()
            .map(|(t, l)| (t.to_string(), l.to_string()))
            .unzip()
    }

    #[test]
    fn test_fit_and_predict() {
        let (texts, labels) = corpus();
        let mut pipeline = TextPipeline::new(ModelKind::NaiveBayes);
        pipeline.fit(&texts, &labels).unwrap();
        assert_eq!(pipeline.classes(), ["BUSINESS", "SPORTS"]);
        assert_eq!(pipeline.predict_one("Football match tonight").unwrap(), "SPORTS");
        assert_eq!(
            pipeline.predict_many(&texts).unwrap(),
            labels,
        );
    }

    #[test]
    fn test_unfitted_pipeline_errors() {
        let pipeline = TextPipeline::new(ModelKind::KNeighbors);
        assert!(matches!(
            pipeline.predict_one("anything"),
            Err(Error::Inference(_))
        ));
    }

    #[test]
    fn test_artifact_round_trip() {
        let (texts, labels) = corpus();
        let mut pipeline = TextPipeline::new(ModelKind::LinearSvm);
        pipeline.fit(&texts, &labels).unwrap();
        let expected = pipeline.predict_many(&texts).unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("models").join("best_category_model.json");
        ModelArtifact::new(Task::Category, 1.0, pipeline).save(&path).unwrap();

        let classifier = load_classifier(&path).unwrap();
        assert_eq!(classifier.name(), "Linear SVM");
        for (text, label) in texts.iter().zip(&expected) {
            assert_eq!(&classifier.predict(text).unwrap(), label);
        }
    }

    #[test]
    fn test_missing_model_falls_back() {
        let dir = tempdir().unwrap();
        let classifier = load_or_fallback(&dir.path().join("missing.json"), Task::Sentiment);
        assert_eq!(classifier.name(), "Fallback");
        assert_eq!(classifier.predict("Markets crash").unwrap(), "Neutral");
    }
}
