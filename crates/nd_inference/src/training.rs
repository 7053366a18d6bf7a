//! Model comparison and selection for the category and sentiment tasks.

use nd_core::{Error, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::io::Read;
use std::path::Path;
use tracing::{error, info};

use crate::metrics::{accuracy, ClassificationReport};
use crate::models::{ModelKind, RANDOM_SEED};
use crate::pipeline::{ModelArtifact, Task, TextPipeline};

pub const DEFAULT_TEST_SIZE: f64 = 0.2;
pub const DEMO_HEADLINE: &str = "Apple launches new iPhone with innovative features";

/// Column names of the category training set.
pub const CATEGORY_COLUMNS: (&str, &str) = ("headline", "category");
/// Column names of the sentiment training set.
pub const SENTIMENT_COLUMNS: (&str, &str) = ("Headlines", "Sentiment");

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub texts: Vec<String>,
    pub labels: Vec<String>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            texts: indices.iter().map(|&i| self.texts[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i].clone()).collect(),
        }
    }
}

pub fn load_labeled_csv(path: &Path, text_column: &str, label_column: &str) -> Result<Dataset> {
    let file = std::fs::File::open(path)
        .map_err(|e| Error::Training(format!("'{}' not found: {}", path.display(), e)))?;
    let dataset = load_labeled_reader(file, text_column, label_column)?;
    info!("Loaded {} labeled rows from {}", dataset.len(), path.display());
    Ok(dataset)
}

/// Rows with an empty label are dropped; an empty text is kept as "".
pub fn load_labeled_reader<R: Read>(
    reader: R,
    text_column: &str,
    label_column: &str,
) -> Result<Dataset> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader
        .headers()
        .map_err(|e| Error::Training(format!("cannot read CSV header: {}", e)))?
        .clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::Training(format!("missing column '{}'", name)))
    };
    let text_index = column(text_column)?;
    let label_index = column(label_column)?;

    let mut dataset = Dataset::default();
    for record in reader.records() {
        let record = record.map_err(|e| Error::Training(format!("malformed CSV row: {}", e)))?;
        let label = record.get(label_index).map(str::trim).unwrap_or("");
        if label.is_empty() {
            continue;
        }
        dataset
            .texts
            .push(record.get(text_index).unwrap_or("").to_string());
        dataset.labels.push(label.to_string());
    }
    Ok(dataset)
}

/// Seeded shuffle, then the first `ceil(test_size * n)` rows become the test set.
pub fn train_test_split(dataset: &Dataset, test_size: f64, seed: u64) -> (Dataset, Dataset) {
    let mut indices: Vec<usize> = (0..dataset.len()).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));
    let n_test = ((dataset.len() as f64) * test_size).ceil() as usize;
    let n_test = n_test.min(dataset.len());
    let (test, train) = indices.split_at(n_test);
    (dataset.select(train), dataset.select(test))
}

#[derive(Debug)]
pub struct Selection {
    pub artifact: ModelArtifact,
    /// Held-out accuracy of every candidate that trained successfully
    pub scores: Vec<(ModelKind, f64)>,
}

fn task_title(task: Task) -> &'static str {
    match task {
        Task::Category => "News Categorization",
        Task::Sentiment => "Sentiment Analysis",
    }
}

/// Fits every candidate on `train`, scores it on `test` and keeps the most
/// accurate one. Earlier candidates win ties.
pub fn train_and_select(train: &Dataset, test: &Dataset, task: Task) -> Result<Selection> {
    if train.is_empty() || test.is_empty() {
        return Err(Error::Training(format!(
            "{} needs both training and test rows ({} / {})",
            task,
            train.len(),
            test.len()
        )));
    }

    info!("=== {} Model Comparison ===", task_title(task));
    let mut best: Option<(f64, TextPipeline)> = None;
    let mut scores = Vec::new();

    for kind in ModelKind::all() {
        let mut pipeline = TextPipeline::new(kind);
        let predictions = match pipeline
            .fit(&train.texts, &train.labels)
            .and_then(|_| pipeline.predict_many(&test.texts))
        {
            Ok(predictions) => predictions,
            Err(e) => {
                error!("{} failed: {}", kind, e);
                continue;
            }
        };

        let acc = accuracy(&test.labels, &predictions);
        info!("{} Accuracy: {:.4}", kind, acc);
        info!("\n{}", ClassificationReport::new(&test.labels, &predictions));
        scores.push((kind, acc));

        if best.as_ref().map_or(true, |(best_acc, _)| acc > *best_acc) {
            best = Some((acc, pipeline));
        }
    }

    let (best_accuracy, pipeline) = best.ok_or_else(|| {
        Error::Training(format!("no candidate model could be trained for {}", task))
    })?;
    info!(
        "Best Model for {}: {} with Accuracy {:.4}",
        task_title(task),
        pipeline.kind(),
        best_accuracy
    );
    Ok(Selection {
        artifact: ModelArtifact::new(task, best_accuracy, pipeline),
        scores,
    })
}

/// Load, split, select and save the best model for one task.
pub fn train_task(
    csv_path: &Path,
    (text_column, label_column): (&str, &str),
    task: Task,
    output: &Path,
) -> Result<ModelArtifact> {
    let dataset = load_labeled_csv(csv_path, text_column, label_column)?;
    let (train, test) = train_test_split(&dataset, DEFAULT_TEST_SIZE, RANDOM_SEED);
    let selection = train_and_select(&train, &test, task)?;
    selection.artifact.save(output)?;
    Ok(selection.artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nd_core::Classifier;

    const SENTIMENT_CSV: &str = "\
Headlines,Sentiment
Markets soar as profits beat forecasts,Positive
Company celebrates record profits and growth,Positive
Investors cheer strong growth and record gains,Positive
Shares soar after record quarterly gains,Positive
Profits beat forecasts as growth accelerates,Positive
Markets crash as losses deepen,Negative
Company warns of heavy losses and layoffs,Negative
Investors fear crash after layoffs announced,Negative
Shares plunge after heavy quarterly losses,Negative
Losses deepen as layoffs spread,Negative
Headline without a label,
";

    fn dataset() -> Dataset {
        load_labeled_reader(SENTIMENT_CSV.as_bytes(), "Headlines", "Sentiment").unwrap()
    }

    #[test]
    fn test_rows_without_label_are_dropped() {
        let data = dataset();
        assert_eq!(data.len(), 10);
        assert_eq!(data.labels[0], "Positive");
        assert_eq!(data.texts[5], "Markets crash as losses deepen");
    }

    #[test]
    fn test_missing_column() {
        let err = load_labeled_reader(SENTIMENT_CSV.as_bytes(), "headline", "category").unwrap_err();
        assert!(matches!(err, Error::Training(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_labeled_csv(Path::new("does/not/exist.csv"), "a", "b").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_split_sizes_and_determinism() {
        let data = dataset();
        let (train, test) = train_test_split(&data, 0.2, RANDOM_SEED);
        assert_eq!(test.len(), 2);
        assert_eq!(train.len(), 8);
        assert_eq!(train_test_split(&data, 0.2, RANDOM_SEED), (train.clone(), test.clone()));

        let mut all: Vec<String> = train.texts.into_iter().chain(test.texts).collect();
        let mut expected = data.texts.clone();
        all.sort();
        expected.sort();
        assert_eq!(all, expected);
    }

    #[test]
    fn test_split_rounds_test_size_up() {
        let data = Dataset {
            texts: vec!["a".into(); 11],
            labels: vec!["x".into(); 11],
        };
        let (_, test) = train_test_split(&data, 0.2, 7);
        assert_eq!(test.len(), 3);
    }

    #[test]
    fn test_selection_keeps_best_accuracy() {
        let data = dataset();
        let test = Dataset {
            texts: vec![
                "Record profits and strong growth".to_string(),
                "Heavy losses and layoffs".to_string(),
            ],
            labels: vec!["Positive".to_string(), "Negative".to_string()],
        };
        let selection = train_and_select(&data, &test, Task::Sentiment).unwrap();
        assert_eq!(selection.scores.len(), 4);

        let best = selection
            .scores
            .iter()
            .map(|(_, acc)| *acc)
            .fold(0.0, f64::max);
        assert_eq!(selection.artifact.accuracy, best);
        let first_best = selection
            .scores
            .iter()
            .find(|(_, acc)| *acc == best)
            .map(|(kind, _)| kind.name())
            .unwrap();
        assert_eq!(selection.artifact.name, first_best);
        assert_eq!(selection.artifact.task, Task::Sentiment);
        assert!(selection.artifact.pipeline.predict(DEMO_HEADLINE).is_ok());
    }

    #[test]
    fn test_empty_test_set_is_an_error() {
        let err = train_and_select(&dataset(), &Dataset::default(), Task::Category).unwrap_err();
        assert!(matches!(err, Error::Training(_)));
    }
}
