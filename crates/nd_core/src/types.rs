use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Label written when a record has no headline to categorize.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Label written when a record has no headline to analyze.
pub const NEUTRAL_SENTIMENT: &str = "Neutral";

/// One headline as persisted in the news document.
///
/// Every field is independently optional: the provider may omit any of them
/// and the two labels only appear once the enrichment stages have run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsRecord {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(rename = "publishedAt", default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<String>,
}

impl NewsRecord {
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// The trimmed headline, if there is one worth classifying.
    pub fn headline(&self) -> Option<&str> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.published_at.as_deref()?.trim();
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn is_enriched(&self) -> bool {
        self.predicted_category.is_some() && self.sentiment.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentHeader {
    pub timestamp: String,
    pub countries: Vec<String>,
}

/// The JSON document regenerated on every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredDocument")]
pub struct NewsDocument {
    pub header: DocumentHeader,
    pub news: Vec<NewsRecord>,
    /// Set when a loaded document had no `news` array at all
    #[serde(skip_serializing)]
    pub news_missing: bool,
}

/// On-disk shape, where the `news` array may be absent.
#[derive(Deserialize)]
struct StoredDocument {
    header: DocumentHeader,
    #[serde(default)]
    news: Option<Vec<NewsRecord>>,
}

impl From<StoredDocument> for NewsDocument {
    fn from(stored: StoredDocument) -> Self {
        Self {
            header: stored.header,
            news_missing: stored.news.is_none(),
            news: stored.news.unwrap_or_default(),
        }
    }
}

impl NewsDocument {
    pub fn new(countries: &[String]) -> Self {
        Self {
            header: DocumentHeader {
                timestamp: Local::now()
                    .naive_local()
                    .format("%Y-%m-%dT%H:%M:%S%.6f")
                    .to_string(),
                countries: countries.to_vec(),
            },
            news: Vec::new(),
            news_missing: false,
        }
    }

    pub fn len(&self) -> usize {
        self.news.len()
    }

    pub fn is_empty(&self) -> bool {
        self.news.is_empty()
    }
}

/// Which of the two persisted documents an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// Fetch output, before any labels.
    Raw,
    /// Categorized and sentiment-tagged output read by the dashboard.
    Enriched,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentKind::Raw => write!(f, "raw"),
            DocumentKind::Enriched => write!(f, "enriched"),
        }
    }
}
