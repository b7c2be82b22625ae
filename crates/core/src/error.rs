use std::path::PathBuf;
use storage::StoreError;
use thiserror::Error;

/// Failures of the text algorithms themselves.
#[derive(Debug, Error)]
pub enum TextError {
    #[error("no scorable words: every token is a stopword or punctuation")]
    EmptyVocabulary,
    #[error("invalid frequency cutoffs: need 0 <= min_cut < max_cut, got {min_cut} and {max_cut}")]
    InvalidCutoffs { min_cut: f64, max_cut: f64 },
    #[error("top_fraction must be a finite number of at least 1, got {0}")]
    InvalidTopFraction(f64),
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("no index exists yet; run a clean index first")]
    MissingIndex,
    #[error("documents root {0} does not exist")]
    MissingDocumentsRoot(PathBuf),
    #[error("cannot read {path}: {source}")]
    UnreadableDocument {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid exclude pattern: {0}")]
    Pattern(#[from] globset::Error),
    #[error(transparent)]
    Text(#[from] TextError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
