pub mod enrich;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod preprocess;
pub mod training;
pub mod vectorizer;

pub mod prelude {
    pub use super::enrich::{Categorizer, SentimentAnalyzer};
    pub use super::models::{create_model, FallbackClassifier, ModelKind};
    pub use super::pipeline::{load_classifier, load_or_fallback, ModelArtifact, Task, TextPipeline};
    pub use super::training::{train_task, CATEGORY_COLUMNS, DEMO_HEADLINE, SENTIMENT_COLUMNS};
    pub use nd_core::{Classifier, Error, Result};
}

pub use enrich::{Categorizer, SentimentAnalyzer};
pub use pipeline::{load_classifier, load_or_fallback, ModelArtifact, Task, TextPipeline};

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_inference_pipeline() {
        let texts: Vec<String> = ["Goal in the final minute", "Oil prices climb"]
            .iter()
            .map(|t| t.to_string())
            .collect();
        let labels = vec!["SPORTS".to_string(), "BUSINESS".to_string()];

        let mut pipeline = TextPipeline::new(ModelKind::LogisticRegression);
        pipeline.fit(&texts, &labels).unwrap();
        let categorizer = Categorizer::new(std::sync::Arc::new(pipeline));
        assert_eq!(categorizer.predict("Late goal decides the final"), "SPORTS");
    }
}
