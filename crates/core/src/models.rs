use serde::{Deserialize, Serialize};

/// A document read from disk, ready to be summarized and indexed.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: String,
    pub modification_time: f64,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexMode {
    Clean,
    Incremental,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedDocument {
    pub path: String,
    pub reason: String,
}

/// What one indexing run did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSummary {
    pub mode: IndexMode,
    /// Plain-text documents found under the root.
    pub discovered: usize,
    pub added: usize,
    pub deleted: usize,
    pub skipped: Vec<SkippedDocument>,
}

impl IndexSummary {
    pub fn new(mode: IndexMode, discovered: usize) -> Self {
        Self {
            mode,
            discovered,
            added: 0,
            deleted: 0,
            skipped: Vec::new(),
        }
    }
}
