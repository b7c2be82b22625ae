//! Tantivy-backed index store.

use crate::models::{IndexRecord, SearchField, SearchHit, StoredRecord};
use crate::{IndexStore, StoreError, WriteTransaction};
use std::fs;
use std::path::PathBuf;
use tantivy::collector::{DocSetCollector, TopDocs};
use tantivy::query::{AllQuery, QueryParser};
use tantivy::schema::{
    Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED, STRING, TEXT,
};
use tantivy::tokenizer::{LowerCaser, RegexTokenizer, TextAnalyzer};
use tantivy::{doc, Directory, Document, Index, IndexReader, IndexWriter, ReloadPolicy, Term};
use tracing::debug;

/// Splits the keywords field on commas so each keyphrase is one term.
const KEYWORD_TOKENIZER: &str = "comma_keywords";
const WRITER_MEMORY_BUDGET: usize = 50_000_000;

#[derive(Debug, Clone, Copy)]
struct Fields {
    path: Field,
    modification_time: Field,
    keywords: Field,
    summary: Field,
    content: Field,
}

impl Fields {
    fn resolve(schema: &Schema) -> Result<Self, StoreError> {
        let get = |name: &'static str| {
            schema
                .get_field(name)
                .map_err(|_| StoreError::MissingField(name))
        };
        Ok(Self {
            path: get("path")?,
            modification_time: get("modification_time")?,
            keywords: get("keywords")?,
            summary: get("summary")?,
            content: get("content")?,
        })
    }

    fn searchable(&self, field: SearchField) -> Field {
        match field {
            SearchField::Content => self.content,
            SearchField::Summary => self.summary,
            SearchField::Keywords => self.keywords,
        }
    }
}

fn build_schema() -> Schema {
    let keyword_options = TextOptions::default()
        .set_indexing_options(
            TextFieldIndexing::default()
                .set_tokenizer(KEYWORD_TOKENIZER)
                .set_index_option(IndexRecordOption::WithFreqsAndPositions),
        )
        .set_stored();

    let mut schema_builder = Schema::builder();
    schema_builder.add_text_field("path", STRING | STORED);
    schema_builder.add_f64_field("modification_time", STORED);
    schema_builder.add_text_field("keywords", keyword_options);
    schema_builder.add_text_field("summary", TEXT | STORED);
    schema_builder.add_text_field("content", TEXT);
    schema_builder.build()
}

// Tokenizers are not persisted with the index and must be registered on every open.
fn register_tokenizers(index: &Index) -> Result<(), StoreError> {
    let analyzer = TextAnalyzer::builder(RegexTokenizer::new(r"[^,]+")?)
        .filter(LowerCaser)
        .build();
    index.tokenizers().register(KEYWORD_TOKENIZER, analyzer);
    Ok(())
}

pub struct TantivyStore {
    dir: PathBuf,
}

impl TantivyStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn open(&self) -> Result<(Index, Fields), StoreError> {
        if !self.exists() {
            return Err(StoreError::NotFound(self.dir.clone()));
        }
        let index = Index::open_in_dir(&self.dir)?;
        register_tokenizers(&index)?;
        let fields = Fields::resolve(&index.schema())?;
        Ok((index, fields))
    }
}

// Readers are opened per call, so there is nothing to reload.
fn open_reader(index: &Index) -> Result<IndexReader, StoreError> {
    let reader = index
        .reader_builder()
        .reload_policy(ReloadPolicy::Manual)
        .try_into()?;
    Ok(reader)
}

impl IndexStore for TantivyStore {
    fn exists(&self) -> bool {
        self.dir.join("meta.json").is_file()
    }

    fn create(&self) -> Result<(), StoreError> {
        // Only an existing index is removed; a non-empty directory that holds
        // no index is left alone and the index is created next to its files.
        if self.exists() {
            fs::remove_dir_all(&self.dir)?;
        }
        fs::create_dir_all(&self.dir)?;
        let index = Index::create_in_dir(&self.dir, build_schema())?;
        index.directory().sync_directory()?;
        debug!(dir = %self.dir.display(), "created empty index");
        Ok(())
    }

    fn records(&self) -> Result<Vec<StoredRecord>, StoreError> {
        let (index, fields) = self.open()?;
        let reader = open_reader(&index)?;
        let searcher = reader.searcher();
        let addresses = searcher.search(&AllQuery, &DocSetCollector)?;
        let mut records = Vec::with_capacity(addresses.len());
        for address in addresses {
            let doc: Document = searcher.doc(address)?;
            let path = doc.get_first(fields.path).and_then(|v| v.as_text());
            let modification_time = doc
                .get_first(fields.modification_time)
                .and_then(|v| v.as_f64());
            match (path, modification_time) {
                (Some(path), Some(modification_time)) => records.push(StoredRecord {
                    path: path.to_string(),
                    modification_time,
                }),
                _ => debug!(?address, "skipping stored document without path or time"),
            }
        }
        records.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(records)
    }

    fn begin(&self) -> Result<Box<dyn WriteTransaction + '_>, StoreError> {
        let (index, fields) = self.open()?;
        let writer: IndexWriter = index.writer_with_num_threads(1, WRITER_MEMORY_BUDGET)?;
        Ok(Box::new(TantivyTransaction {
            index,
            writer,
            fields,
        }))
    }

    fn search(
        &self,
        field: SearchField,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchHit>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let (index, fields) = self.open()?;
        let reader = open_reader(&index)?;
        let searcher = reader.searcher();
        let parser = QueryParser::for_index(&index, vec![fields.searchable(field)]);
        let query = parser.parse_query(query)?;
        let top_docs = searcher.search(&query, &TopDocs::with_limit(limit))?;
        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let doc: Document = searcher.doc(address)?;
            let text = |f: Field| {
                doc.get_first(f)
                    .and_then(|v| v.as_text())
                    .unwrap_or_default()
                    .to_string()
            };
            hits.push(SearchHit {
                path: text(fields.path),
                score,
                modification_time: doc
                    .get_first(fields.modification_time)
                    .and_then(|v| v.as_f64())
                    .unwrap_or_default(),
                keywords: text(fields.keywords),
                summary: text(fields.summary),
            });
        }
        Ok(hits)
    }
}

struct TantivyTransaction {
    index: Index,
    writer: IndexWriter,
    fields: Fields,
}

impl WriteTransaction for TantivyTransaction {
    fn add_document(&mut self, record: IndexRecord) -> Result<(), StoreError> {
        let f = self.fields;
        self.writer.add_document(doc!(
            f.path => record.path,
            f.modification_time => record.modification_time,
            f.keywords => record.keywords,
            f.summary => record.summary,
            f.content => record.content
        ))?;
        Ok(())
    }

    fn delete_by_key(&mut self, path: &str) -> Result<(), StoreError> {
        // Deletes only affect documents added before this operation.
        self.writer
            .delete_term(Term::from_field_text(self.fields.path, path));
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let TantivyTransaction {
            index, mut writer, ..
        } = *self;
        writer.commit()?;
        writer.wait_merging_threads()?;
        index.directory().sync_directory()?;
        Ok(())
    }
}
