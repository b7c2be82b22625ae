use crate::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One indexed document as written to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub path: String,
    /// Seconds since the Unix epoch.
    pub modification_time: f64,
    /// Comma-delimited keyphrases.
    pub keywords: String,
    pub summary: String,
    /// Searchable only; never returned by readers.
    pub content: String,
}

/// The stored part of a record that the reconciliation pass reads back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub path: String,
    pub modification_time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    Content,
    Summary,
    Keywords,
}

impl SearchField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchField::Content => "content",
            SearchField::Summary => "summary",
            SearchField::Keywords => "keywords",
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchField {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "content" => Ok(SearchField::Content),
            "summary" => Ok(SearchField::Summary),
            "keywords" => Ok(SearchField::Keywords),
            other => Err(StoreError::InvalidQueryField(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub path: String,
    pub score: f32,
    pub modification_time: f64,
    pub keywords: String,
    pub summary: String,
}
