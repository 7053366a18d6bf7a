//! Held-out evaluation: accuracy and a per-class precision/recall/f1 report.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Fraction of positions where the prediction equals the truth.
pub fn accuracy(truth: &[String], predicted: &[String]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let correct = truth
        .iter()
        .zip(predicted)
        .filter(|(t, p)| t == p)
        .count();
    correct as f64 / truth.len() as f64
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassScores {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Default)]
struct Tally {
    true_positive: usize,
    false_positive: usize,
    false_negative: usize,
}

/// Zero when the denominator is zero.
fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassificationReport {
    /// Keyed by label, alphabetical
    pub classes: BTreeMap<String, ClassScores>,
    pub accuracy: f64,
    pub macro_avg: ClassScores,
    pub weighted_avg: ClassScores,
}

impl ClassificationReport {
    pub fn new(truth: &[String], predicted: &[String]) -> Self {
        let labels: BTreeSet<&String> = truth.iter().chain(predicted).collect();
        let mut tallies: BTreeMap<&String, Tally> =
            labels.into_iter().map(|l| (l, Tally::default())).collect();

        for (t, p) in truth.iter().zip(predicted) {
            if t == p {
                if let Some(tally) = tallies.get_mut(t) {
                    tally.true_positive += 1;
                }
            } else {
                if let Some(tally) = tallies.get_mut(p) {
                    tally.false_positive += 1;
                }
                if let Some(tally) = tallies.get_mut(t) {
                    tally.false_negative += 1;
                }
            }
        }

        let classes: BTreeMap<String, ClassScores> = tallies
            .into_iter()
            .map(|(label, tally)| {
                let support = tally.true_positive + tally.false_negative;
                let precision = ratio(tally.true_positive, tally.true_positive + tally.false_positive);
                let recall = ratio(tally.true_positive, support);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                (label.clone(), ClassScores { precision, recall, f1, support })
            })
            .collect();

        let total_support: usize = classes.values().map(|s| s.support).sum();
        let n_classes = classes.len().max(1) as f64;
        let mut macro_avg = ClassScores { support: total_support, ..Default::default() };
        let mut weighted_avg = ClassScores { support: total_support, ..Default::default() };
        for scores in classes.values() {
            macro_avg.precision += scores.precision / n_classes;
            macro_avg.recall += scores.recall / n_classes;
            macro_avg.f1 += scores.f1 / n_classes;
            let weight = ratio(scores.support, total_support);
            weighted_avg.precision += scores.precision * weight;
            weighted_avg.recall += scores.recall * weight;
            weighted_avg.f1 += scores.f1 * weight;
        }

        Self {
            classes,
            accuracy: accuracy(truth, predicted),
            macro_avg,
            weighted_avg,
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .classes
            .keys()
            .map(|l| l.chars().count())
            .chain(std::iter::once("weighted avg".len()))
            .max()
            .unwrap_or(12);

        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for (label, s) in &self.classes {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                label, s.precision, s.recall, s.f1, s.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        for (name, s) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, s.precision, s.recall, s.f1, s.support
            )?;
        }
        Ok(())
    }
}
