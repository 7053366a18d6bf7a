use std::fmt;
use crate::Result;

/// A trained text model mapping a headline to one label.
pub trait Classifier: Send + Sync + fmt::Debug {
    /// Human readable model name, e.g. "Linear SVM"
    fn name(&self) -> &str;

    /// Predict the label for a single piece of text
    fn predict(&self, text: &str) -> Result<String>;
}
