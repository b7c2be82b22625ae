//! Drives a full or incremental indexing run over the documents root.

use crate::config::{AppConfig, DocumentsConfig, MissingIndexPolicy};
use crate::error::{IndexError, TextError};
use crate::keywords::RakeExtractor;
use crate::language::{EnglishLinguistics, Linguistics};
use crate::models::{Document, IndexMode, IndexSummary, SkippedDocument};
use crate::reconcile::reconcile;
use crate::scanner::{self, ContentSniffer, DiscoveredDocument, FsProbe, PlainTextSniffer};
use crate::summarizer::FrequencySummarizer;
use anyhow::Context;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use storage::{IndexRecord, IndexStore, WriteTransaction};
use tracing::{debug, info, warn};

pub struct TextIndexer<S: IndexStore> {
    store: S,
    summarizer: FrequencySummarizer,
    extractor: RakeExtractor,
    sniffer: Box<dyn ContentSniffer>,
    documents: DocumentsConfig,
    summary_size: usize,
    on_missing: MissingIndexPolicy,
}

impl<S: IndexStore> TextIndexer<S> {
    pub fn new(
        store: S,
        summarizer: FrequencySummarizer,
        extractor: RakeExtractor,
        documents: DocumentsConfig,
        summary_size: usize,
    ) -> Self {
        Self {
            store,
            summarizer,
            extractor,
            sniffer: Box::new(PlainTextSniffer::new()),
            documents,
            summary_size,
            on_missing: MissingIndexPolicy::default(),
        }
    }

    /// Builds the summarizer, extractor and stopwords from `cfg`.
    pub fn from_config(store: S, cfg: &AppConfig) -> anyhow::Result<Self> {
        let linguistics: Arc<dyn Linguistics> = Arc::new(
            EnglishLinguistics::from_config(&cfg.language).context("load stopwords")?,
        );
        let summarizer = FrequencySummarizer::new(
            linguistics.clone(),
            cfg.summary.min_cut,
            cfg.summary.max_cut,
        )?;
        let extractor =
            RakeExtractor::new(linguistics).with_top_fraction(cfg.keywords.top_fraction)?;
        Ok(Self::new(
            store,
            summarizer,
            extractor,
            cfg.documents.clone(),
            cfg.summary.sentences,
        )
        .with_missing_index_policy(cfg.index.on_missing))
    }

    pub fn with_sniffer(mut self, sniffer: Box<dyn ContentSniffer>) -> Self {
        self.sniffer = sniffer;
        self
    }

    pub fn with_missing_index_policy(mut self, policy: MissingIndexPolicy) -> Self {
        self.on_missing = policy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Rebuilds the index from scratch when `clean`, otherwise brings it in
    /// line with the documents root. Everything lands in one commit.
    pub fn index(&self, clean: bool) -> Result<IndexSummary, IndexError> {
        let root = Path::new(&self.documents.root);
        info!(root = %root.display(), clean, "scanning documents");
        let discovered = scanner::discover(
            root,
            &self.documents.exclude,
            self.documents.include_hidden,
            self.sniffer.as_ref(),
        )?;
        debug!(count = discovered.len(), "plain-text documents found");

        if clean {
            return self.clean_index(&discovered);
        }
        if !self.store.exists() {
            match self.on_missing {
                MissingIndexPolicy::Fail => return Err(IndexError::MissingIndex),
                MissingIndexPolicy::Rebuild => {
                    warn!("no index found, rebuilding from scratch");
                    return self.clean_index(&discovered);
                }
            }
        }
        self.incremental_index(&discovered)
    }

    fn clean_index(&self, discovered: &[DiscoveredDocument]) -> Result<IndexSummary, IndexError> {
        self.store.create()?;
        let mut summary = IndexSummary::new(IndexMode::Clean, discovered.len());
        let mut tx = self.store.begin()?;
        for doc in discovered {
            self.add_document(tx.as_mut(), doc, &mut summary)?;
        }
        tx.commit()?;
        info!(
            added = summary.added,
            skipped = summary.skipped.len(),
            "clean index complete"
        );
        Ok(summary)
    }

    fn incremental_index(
        &self,
        discovered: &[DiscoveredDocument],
    ) -> Result<IndexSummary, IndexError> {
        let prior = self.store.records()?;
        let plan = reconcile(&prior, discovered, &FsProbe);
        info!(
            stored = prior.len(),
            deletes = plan.deletes.len(),
            adds = plan.adds.len(),
            "reconciled index with documents"
        );

        let by_path: HashMap<&str, &DiscoveredDocument> =
            discovered.iter().map(|d| (d.path.as_str(), d)).collect();
        let mut summary = IndexSummary::new(IndexMode::Incremental, discovered.len());
        let mut tx = self.store.begin()?;
        for path in &plan.deletes {
            tx.delete_by_key(path)?;
            summary.deleted += 1;
        }
        for path in &plan.adds {
            if let Some(doc) = by_path.get(path.as_str()) {
                self.add_document(tx.as_mut(), doc, &mut summary)?;
            }
        }
        tx.commit()?;
        info!(
            added = summary.added,
            deleted = summary.deleted,
            skipped = summary.skipped.len(),
            "incremental index complete"
        );
        Ok(summary)
    }

    fn add_document(
        &self,
        tx: &mut (dyn WriteTransaction + '_),
        discovered: &DiscoveredDocument,
        summary: &mut IndexSummary,
    ) -> Result<(), IndexError> {
        let content = match fs::read_to_string(&discovered.path) {
            Ok(content) => content,
            Err(source) => {
                let err = IndexError::UnreadableDocument {
                    path: discovered.path.clone(),
                    source,
                };
                warn!(error = %err, "skipping document");
                summary.skipped.push(SkippedDocument {
                    path: discovered.path.clone(),
                    reason: err.to_string(),
                });
                return Ok(());
            }
        };
        let record = self.build_record(Document {
            path: discovered.path.clone(),
            modification_time: discovered.modification_time,
            content,
        })?;
        tx.add_document(record)?;
        summary.added += 1;
        Ok(())
    }

    /// Summary sentences are joined with newlines, keyphrases with commas.
    /// Commas inside a keyphrase ("1,000") are dropped so each phrase stays
    /// one keyword.
    pub fn build_record(&self, doc: Document) -> Result<IndexRecord, TextError> {
        let summary = match self.summarizer.summarize(&doc.content, self.summary_size) {
            Ok(sentences) => sentences.join("\n"),
            Err(TextError::EmptyVocabulary) => {
                debug!(path = %doc.path, "nothing to summarize");
                String::new()
            }
            Err(e) => return Err(e),
        };
        let keywords = self
            .extractor
            .extract(&doc.content)
            .iter()
            .map(|phrase| phrase.replace(',', ""))
            .filter(|phrase| !phrase.is_empty())
            .collect::<Vec<_>>()
            .join(",");
        Ok(IndexRecord {
            path: doc.path,
            modification_time: doc.modification_time,
            keywords,
            summary,
            content: doc.content,
        })
    }
}
