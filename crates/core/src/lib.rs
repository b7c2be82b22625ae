//! Core library: document discovery, summarization, keyphrase extraction and
//! index reconciliation.

pub mod config;
pub mod error;
pub mod indexer;
pub mod keywords;
pub mod language;
pub mod models;
pub mod reconcile;
pub mod scanner;
pub mod summarizer;

pub use error::{IndexError, TextError};
pub use indexer::TextIndexer;
pub use keywords::RakeExtractor;
pub use language::{EnglishLinguistics, Linguistics};
pub use models::{IndexMode, IndexSummary};
pub use summarizer::FrequencySummarizer;
