//! Attach category and sentiment labels to fetched records.

use nd_core::{Classifier, NewsDocument, NewsRecord};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::pipeline::Task;

/// Labels one field of every record with a classifier.
#[derive(Debug, Clone)]
pub struct Labeler {
    task: Task,
    model: Arc<dyn Classifier>,
}

impl Labeler {
    pub fn new(task: Task, model: Arc<dyn Classifier>) -> Self {
        Self { task, model }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Model output for one record, `None` without a headline or when the
    /// prediction fails.
    fn predict(&self, record: &NewsRecord) -> Option<String> {
        let headline = record.headline()?;
        match self.model.predict(headline) {
            Ok(label) => Some(label),
            Err(e) => {
                warn!("Could not predict {} for {:?}: {}", self.task, headline, e);
                None
            }
        }
    }

    /// Label for one headline; records without one, or whose prediction
    /// fails, get the task's default.
    pub fn label(&self, record: &NewsRecord) -> String {
        self.predict(record)
            .unwrap_or_else(|| self.task.default_label().to_string())
    }

    /// Returns how many records were labeled by the model.
    pub fn apply(&self, document: &mut NewsDocument) -> usize {
        let mut predicted = 0;
        for record in document.news.iter_mut() {
            let label = match self.predict(record) {
                Some(label) => {
                    predicted += 1;
                    label
                }
                None => self.task.default_label().to_string(),
            };
            match self.task {
                Task::Category => record.predicted_category = Some(label),
                Task::Sentiment => record.sentiment = Some(label),
            }
        }
        debug!(
            "{} labeled {} of {} records with {}",
            self.task,
            predicted,
            document.len(),
            self.model.name()
        );
        predicted
    }
}

/// Sets `predicted_category`, "Unknown" when there is no headline.
#[derive(Debug, Clone)]
pub struct Categorizer(Labeler);

impl Categorizer {
    pub fn new(model: Arc<dyn Classifier>) -> Self {
        Self(Labeler::new(Task::Category, model))
    }

    pub fn model_name(&self) -> &str {
        self.0.model_name()
    }

    pub fn categorize(&self, document: &mut NewsDocument) -> usize {
        self.0.apply(document)
    }

    pub fn predict(&self, headline: &str) -> String {
        self.0.label(&NewsRecord::with_title(headline))
    }
}

/// Sets `sentiment`, "Neutral" when there is no headline.
#[derive(Debug, Clone)]
pub struct SentimentAnalyzer(Labeler);

impl SentimentAnalyzer {
    pub fn new(model: Arc<dyn Classifier>) -> Self {
        Self(Labeler::new(Task::Sentiment, model))
    }

    pub fn model_name(&self) -> &str {
        self.0.model_name()
    }

    pub fn analyze(&self, document: &mut NewsDocument) -> usize {
        self.0.apply(document)
    }

    pub fn predict(&self, headline: &str) -> String {
        self.0.label(&NewsRecord::with_title(headline))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nd_core::{Error, Result};
    use crate::models::FallbackClassifier;

    /// Labels by keyword, fails on "boom".
    #[derive(Debug)]
    struct KeywordModel;

    impl Classifier for KeywordModel {
        fn name(&self) -> &str {
            "Keyword"
        }

        fn predict(&self, text: &str) -> Result<String> {
            if text.contains("boom") {
                return Err(Error::Inference("model exploded".to_string()));
            }
            Ok(if text.contains("match") { "SPORTS" } else { "BUSINESS" }.to_string())
        }
    }

    fn document() -> NewsDocument {
        let mut doc = NewsDocument::new(&["us".to_string()]);
        doc.news = vec![
            NewsRecord::with_title("Cup match tonight"),
            NewsRecord::with_title("Shares rise"),
            NewsRecord::with_title("   "),
            NewsRecord::default(),
            NewsRecord::with_title("Sonic boom heard"),
        ];
        doc
    }

    #[test]
    fn test_categorize_defaults() {
        let mut doc = document();
        let categorizer = Categorizer::new(Arc::new(KeywordModel));
        // the failed "boom" prediction falls back and is not counted
        assert_eq!(categorizer.categorize(&mut doc), 2);

        let categories: Vec<_> = doc
            .news
            .iter()
            .map(|r| r.predicted_category.as_deref().unwrap())
            .collect();
        assert_eq!(categories, ["SPORTS", "BUSINESS", "Unknown", "Unknown", "Unknown"]);
        assert!(doc.news.iter().all(|r| r.sentiment.is_none()));
    }

    #[test]
    fn test_sentiment_after_categorize_enriches_every_record() {
        let mut doc = document();
        Categorizer::new(Arc::new(KeywordModel)).categorize(&mut doc);
        let analyzer = SentimentAnalyzer::new(Arc::new(FallbackClassifier::new("Positive")));
        assert_eq!(analyzer.analyze(&mut doc), 3);

        assert!(doc.news.iter().all(NewsRecord::is_enriched));
        assert_eq!(doc.news[0].sentiment.as_deref(), Some("Positive"));
        assert_eq!(doc.news[2].sentiment.as_deref(), Some("Neutral"));
        assert_eq!(doc.news[3].sentiment.as_deref(), Some("Neutral"));
    }

    #[test]
    fn test_single_prediction() {
        let analyzer = SentimentAnalyzer::new(Arc::new(KeywordModel));
        assert_eq!(analyzer.predict("big boom"), "Neutral");
        assert_eq!(analyzer.predict(""), "Neutral");
        assert_eq!(Categorizer::new(Arc::new(KeywordModel)).predict("match"), "SPORTS");
    }
}
