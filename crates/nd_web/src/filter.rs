//! Dashboard data preparation: cleaning, filter options, filtering and counts.

use chrono::{DateTime, NaiveDate, Utc};
use nd_core::{NewsDocument, NewsRecord};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

pub const NO_DATA_MESSAGE: &str = "No news data available or missing 'country' field in the data.";
pub const NO_FILTERED_DATA_MESSAGE: &str = "No data available for the selected filters.";
pub const NO_ARTICLES_MESSAGE: &str = "No articles to display for the selected filters.";
/// Hidden field sent by the sidebar form, so an emptied multiselect means "none".
pub const SUBMITTED_PARAM: &str = "applied";

/// A record whose publication time parsed.
#[derive(Debug, Clone)]
pub struct DatedRecord {
    pub record: NewsRecord,
    pub published: DateTime<Utc>,
}

impl DatedRecord {
    pub fn date(&self) -> NaiveDate {
        self.published.date_naive()
    }
}

/// Drops records whose `publishedAt` does not parse. Fails when there is
/// nothing to show at all.
pub fn clean(document: &NewsDocument) -> Result<Vec<DatedRecord>, &'static str> {
    if document.is_empty() || document.news.iter().all(|r| r.country.is_none()) {
        return Err(NO_DATA_MESSAGE);
    }
    Ok(document
        .news
        .iter()
        .filter_map(|record| {
            record.published_at().map(|published| DatedRecord {
                record: record.clone(),
                published,
            })
        })
        .collect())
}

/// Values offered by the sidebar.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub countries: Vec<String>,
    pub categories: Vec<String>,
    pub sentiments: Vec<String>,
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
}

fn distinct<'a>(values: impl Iterator<Item = Option<&'a String>>) -> Vec<String> {
    values
        .flatten()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

impl FilterOptions {
    pub fn from_records(records: &[DatedRecord]) -> Self {
        Self {
            countries: distinct(records.iter().map(|r| r.record.country.as_ref())),
            categories: distinct(records.iter().map(|r| r.record.predicted_category.as_ref())),
            sentiments: distinct(records.iter().map(|r| r.record.sentiment.as_ref())),
            min_date: records.iter().map(DatedRecord::date).min(),
            max_date: records.iter().map(DatedRecord::date).max(),
        }
    }
}

/// Raw query string selections; `None` means the parameter was absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardQuery {
    pub countries: Option<Vec<String>>,
    pub categories: Option<Vec<String>>,
    pub sentiments: Option<Vec<String>>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DashboardQuery {
    /// Parses `country=us&country=gb&start=2024-05-01...`; keys may repeat
    /// and unparseable dates are ignored. Once the form was submitted, a
    /// missing selection key selects nothing instead of everything.
    pub fn parse(raw: Option<&str>) -> Self {
        let mut query = Self::default();
        let Some(raw) = raw else {
            return query;
        };
        let mut submitted = false;
        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            let value = value.trim().to_string();
            match &*key {
                SUBMITTED_PARAM => submitted = true,
                "country" => query.countries.get_or_insert_with(Vec::new).push(value),
                "category" => query.categories.get_or_insert_with(Vec::new).push(value),
                "sentiment" => query.sentiments.get_or_insert_with(Vec::new).push(value),
                "start" => query.start = NaiveDate::parse_from_str(&value, "%Y-%m-%d").ok(),
                "end" => query.end = NaiveDate::parse_from_str(&value, "%Y-%m-%d").ok(),
                _ => {}
            }
        }
        if submitted {
            query.countries.get_or_insert_with(Vec::new);
            query.categories.get_or_insert_with(Vec::new);
            query.sentiments.get_or_insert_with(Vec::new);
        }
        query
    }
}

/// Selections with defaults filled in from the data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveFilter {
    pub countries: BTreeSet<String>,
    pub categories: BTreeSet<String>,
    pub sentiments: BTreeSet<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl ActiveFilter {
    pub fn resolve(query: &DashboardQuery, options: &FilterOptions) -> Self {
        let pick = |selected: &Option<Vec<String>>, all: &[String]| -> BTreeSet<String> {
            selected
                .clone()
                .unwrap_or_else(|| all.to_vec())
                .into_iter()
                .collect()
        };
        let mut start = query.start.or(options.min_date);
        let mut end = query.end.or(options.max_date);
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                std::mem::swap(&mut start, &mut end);
            }
        }
        Self {
            countries: pick(&query.countries, &options.countries),
            categories: pick(&query.categories, &options.categories),
            sentiments: pick(&query.sentiments, &options.sentiments),
            start,
            end,
        }
    }

    /// Absent values never match a selection.
    pub fn matches(&self, record: &DatedRecord) -> bool {
        let selected = |set: &BTreeSet<String>, value: &Option<String>| {
            value.as_ref().is_some_and(|v| set.contains(v))
        };
        let date = record.date();
        selected(&self.countries, &record.record.country)
            && selected(&self.categories, &record.record.predicted_category)
            && selected(&self.sentiments, &record.record.sentiment)
            && self.start.map_or(true, |s| date >= s)
            && self.end.map_or(true, |e| date <= e)
    }

    pub fn apply<'a>(&self, records: &'a [DatedRecord]) -> Vec<&'a DatedRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Counts behind the KPIs and charts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total: usize,
    /// Most frequent first, ties alphabetical
    pub categories: Vec<(String, usize)>,
    pub sentiments: Vec<(String, usize)>,
    /// Ascending by date
    pub per_date: Vec<(NaiveDate, usize)>,
}

fn value_counts<'a>(values: impl Iterator<Item = Option<&'a String>>) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&String, usize> = BTreeMap::new();
    for value in values.flatten() {
        *counts.entry(value).or_insert(0) += 1;
    }
    let mut counts: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(value, count)| (value.clone(), count))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

impl Summary {
    pub fn from_records(records: &[&DatedRecord]) -> Self {
        let mut per_date: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        for record in records {
            *per_date.entry(record.date()).or_insert(0) += 1;
        }
        Self {
            total: records.len(),
            categories: value_counts(records.iter().map(|r| r.record.predicted_category.as_ref())),
            sentiments: value_counts(records.iter().map(|r| r.record.sentiment.as_ref())),
            per_date: per_date.into_iter().collect(),
        }
    }

    pub fn distinct_categories(&self) -> usize {
        self.categories.len()
    }

    pub fn distinct_sentiments(&self) -> usize {
        self.sentiments.len()
    }
}
