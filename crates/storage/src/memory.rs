//! In-process index store.
//!
//! Same add/delete/commit semantics as the Tantivy store; search is a plain
//! case-insensitive term match and exists for tests and dry runs.

use crate::models::{IndexRecord, SearchField, SearchHit, StoredRecord};
use crate::{IndexStore, StoreError, WriteTransaction};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Default)]
pub struct MemoryStore {
    // `None` until `create` is called.
    records: RefCell<Option<BTreeMap<String, IndexRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<IndexRecord> {
        self.records
            .borrow()
            .as_ref()
            .and_then(|records| records.get(path).cloned())
    }

    pub fn len(&self) -> usize {
        self.records.borrow().as_ref().map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn not_found() -> StoreError {
        StoreError::NotFound(PathBuf::from(":memory:"))
    }
}

impl IndexStore for MemoryStore {
    fn exists(&self) -> bool {
        self.records.borrow().is_some()
    }

    fn create(&self) -> Result<(), StoreError> {
        *self.records.borrow_mut() = Some(BTreeMap::new());
        Ok(())
    }

    fn records(&self) -> Result<Vec<StoredRecord>, StoreError> {
        let records = self.records.borrow();
        let records = records.as_ref().ok_or_else(Self::not_found)?;
        Ok(records
            .values()
            .map(|r| StoredRecord {
                path: r.path.clone(),
                modification_time: r.modification_time,
            })
            .collect())
    }

    fn begin(&self) -> Result<Box<dyn WriteTransaction + '_>, StoreError> {
        if !self.exists() {
            return Err(Self::not_found());
        }
        Ok(Box::new(MemoryTransaction {
            store: self,
            ops: Vec::new(),
        }))
    }

    fn search(
        &self,
        field: SearchField,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchHit>, StoreError> {
        let records = self.records.borrow();
        let records = records.as_ref().ok_or_else(Self::not_found)?;
        let needle = query.trim().trim_matches('"').to_lowercase();
        let terms = words(&needle);
        let mut hits: Vec<SearchHit> = records
            .values()
            .filter_map(|r| {
                let score = match field {
                    SearchField::Keywords => r
                        .keywords
                        .split(',')
                        .filter(|k| k.trim().to_lowercase() == needle)
                        .count(),
                    SearchField::Summary => term_hits(&r.summary, &terms),
                    SearchField::Content => term_hits(&r.content, &terms),
                };
                (score > 0).then(|| SearchHit {
                    path: r.path.clone(),
                    score: score as f32,
                    modification_time: r.modification_time,
                    keywords: r.keywords.clone(),
                    summary: r.summary.clone(),
                })
            })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(limit);
        Ok(hits)
    }
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

// Occurrences of the query terms, or 0 unless every term appears.
fn term_hits(text: &str, terms: &[String]) -> usize {
    if terms.is_empty() {
        return 0;
    }
    let haystack = words(text);
    let mut total = 0;
    for term in terms {
        let n = haystack.iter().filter(|w| *w == term).count();
        if n == 0 {
            return 0;
        }
        total += n;
    }
    total
}

enum Op {
    Add(IndexRecord),
    Delete(String),
}

struct MemoryTransaction<'a> {
    store: &'a MemoryStore,
    ops: Vec<Op>,
}

impl WriteTransaction for MemoryTransaction<'_> {
    fn add_document(&mut self, record: IndexRecord) -> Result<(), StoreError> {
        self.ops.push(Op::Add(record));
        Ok(())
    }

    fn delete_by_key(&mut self, path: &str) -> Result<(), StoreError> {
        self.ops.push(Op::Delete(path.to_string()));
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryTransaction { store, ops } = *self;
        let mut guard = store.records.borrow_mut();
        let records = guard.as_mut().ok_or_else(MemoryStore::not_found)?;
        for op in ops {
            match op {
                Op::Add(record) => {
                    records.insert(record.path.clone(), record);
                }
                Op::Delete(path) => {
                    records.remove(&path);
                }
            }
        }
        Ok(())
    }
}
