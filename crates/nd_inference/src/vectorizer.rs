//! TF-IDF vectorization
//!
//! Follows the usual defaults: `\b\w\w+\b` tokens, raw counts, smoothed idf
//! `ln((1 + n) / (1 + df)) + 1` and L2-normalized rows.

use lazy_static::lazy_static;
use nd_core::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

lazy_static! {
    static ref TOKEN_RE: Regex = Regex::new(r"\b\w\w+\b").unwrap();
}

pub const DEFAULT_MAX_FEATURES: usize = 10_000;

/// Sparse row: strictly increasing feature indices with their weights.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVec {
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
}

impl SparseVec {
    pub fn from_map(map: BTreeMap<usize, f64>) -> Self {
        let (indices, values) = map.into_iter().unzip();
        Self { indices, values }
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    pub fn squared_norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum()
    }

    pub fn dot_dense(&self, dense: &[f64]) -> f64 {
        self.iter().map(|(i, v)| dense[i] * v).sum()
    }

    /// `dense += scale * self`
    pub fn add_scaled_to(&self, scale: f64, dense: &mut [f64]) {
        for (i, v) in self.iter() {
            dense[i] += scale * v;
        }
    }

    pub fn to_dense(&self, n_features: usize) -> Vec<f64> {
        let mut dense = vec![0.0; n_features];
        for (i, v) in self.iter() {
            dense[i] = v;
        }
        dense
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    max_features: Option<usize>,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new(Some(DEFAULT_MAX_FEATURES))
    }
}

impl TfidfVectorizer {
    pub fn new(max_features: Option<usize>) -> Self {
        Self {
            max_features,
            vocabulary: HashMap::new(),
            idf: Vec::new(),
        }
    }

    pub fn n_features(&self) -> usize {
        self.idf.len()
    }

    pub fn vocabulary(&self) -> &HashMap<String, usize> {
        &self.vocabulary
    }

    fn analyze(doc: &str) -> Vec<String> {
        TOKEN_RE
            .find_iter(&doc.to_lowercase())
            .map(|m| m.as_str().to_string())
            .collect()
    }

    pub fn fit(&mut self, documents: &[String]) -> Result<()> {
        let analyzed: Vec<Vec<String>> = documents.iter().map(|d| Self::analyze(d)).collect();

        // BTreeMap keeps terms in alphabetical order for the final indices
        let mut term_counts: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for tokens in &analyzed {
            let mut seen = HashSet::new();
            for token in tokens {
                let entry = term_counts.entry(token.as_str()).or_insert((0, 0));
                entry.0 += 1;
                if seen.insert(token.as_str()) {
                    entry.1 += 1;
                }
            }
        }

        if term_counts.is_empty() {
            return Err(Error::Training(
                "empty vocabulary; perhaps the documents only contain stop words".to_string(),
            ));
        }

        let mut kept: Vec<(&str, usize, usize)> = term_counts
            .into_iter()
            .map(|(term, (tf, df))| (term, tf, df))
            .collect();
        if let Some(limit) = self.max_features {
            if kept.len() > limit {
                // stable sort: equal counts stay alphabetical
                kept.sort_by(|a, b| b.1.cmp(&a.1));
                kept.truncate(limit);
                kept.sort_by(|a, b| a.0.cmp(b.0));
            }
        }

        let n_docs = documents.len() as f64;
        self.vocabulary.clear();
        self.idf = Vec::with_capacity(kept.len());
        for (index, (term, _, df)) in kept.into_iter().enumerate() {
            self.vocabulary.insert(term.to_string(), index);
            self.idf.push(((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0);
        }
        Ok(())
    }

    pub fn transform(&self, document: &str) -> SparseVec {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for token in Self::analyze(document) {
            if let Some(&index) = self.vocabulary.get(&token) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }
        for (index, value) in counts.iter_mut() {
            *value *= self.idf[*index];
        }
        let norm = counts.values().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in counts.values_mut() {
                *value /= norm;
            }
        }
        SparseVec::from_map(counts)
    }

    pub fn transform_all(&self, documents: &[String]) -> Vec<SparseVec> {
        documents.iter().map(|d| self.transform(d)).collect()
    }

    pub fn fit_transform(&mut self, documents: &[String]) -> Result<Vec<SparseVec>> {
        self.fit(documents)?;
        Ok(self.transform_all(documents))
    }
}
