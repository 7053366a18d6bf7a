use std::fmt;
use nd_core::{Classifier, Result};

/// Answers every headline with one fixed label.
///
/// Stands in for a trained model whose artifact could not be loaded, so the
/// enrichment stages still produce a label for every record.
pub struct FallbackClassifier {
    label: String,
}

impl fmt::Debug for FallbackClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackClassifier")
            .field("label", &self.label)
            .finish()
    }
}

impl FallbackClassifier {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Classifier for FallbackClassifier {
    fn name(&self) -> &str {
        "Fallback"
    }

    fn predict(&self, _text: &str) -> Result<String> {
        Ok(self.label.clone())
    }
}
