use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use storage::{IndexStore, SearchField, SearchHit, StoreError, TantivyStore};
use textsift_core::config::AppConfig;
use textsift_core::{IndexSummary, TextIndexer};

/// Indexes `cfg.documents.root` into the Tantivy index at `cfg.index.path`.
pub fn run_index(cfg: &AppConfig, clean: bool) -> Result<IndexSummary> {
    let store = TantivyStore::new(&cfg.index.path);
    let indexer = TextIndexer::from_config(store, cfg)?;
    let summary = indexer
        .index(clean)
        .with_context(|| format!("indexing {} failed", cfg.documents.root))?;
    Ok(summary)
}

/// Picks the field named by the query flags. `content` wins over `summary`,
/// which wins over `keywords`; `--field` is consulted only without a flag.
pub fn resolve_field(
    content: bool,
    summary: bool,
    keywords: bool,
    field: Option<&str>,
) -> Result<SearchField, StoreError> {
    match (content, summary, keywords, field) {
        (true, ..) => Ok(SearchField::Content),
        (_, true, ..) => Ok(SearchField::Summary),
        (_, _, true, _) => Ok(SearchField::Keywords),
        (_, _, _, Some(name)) => name.parse(),
        _ => Err(StoreError::InvalidQueryField(
            "none given; pass --content, --summary, --keywords or --field".to_string(),
        )),
    }
}

pub fn run_query(
    cfg: &AppConfig,
    field: SearchField,
    query: &str,
    limit: usize,
) -> Result<Vec<SearchHit>> {
    let store = TantivyStore::new(&cfg.index.path);
    let hits = store
        .search(field, query, limit)
        .with_context(|| format!("searching {field} for {query:?}"))?;
    Ok(hits)
}

pub fn format_summary(summary: &IndexSummary) -> String {
    let mut out = format!(
        "{:?}: discovered {}, added {}, deleted {}, skipped {}",
        summary.mode,
        summary.discovered,
        summary.added,
        summary.deleted,
        summary.skipped.len()
    )
    .to_lowercase();
    for skipped in &summary.skipped {
        out.push_str(&format!("\n  skipped {}: {}", skipped.path, skipped.reason));
    }
    out
}

pub fn format_hit(hit: &SearchHit) -> String {
    let mut out = format!(
        "{:.3}  {}  ({})",
        hit.score,
        hit.path,
        format_mtime(hit.modification_time)
    );
    if !hit.keywords.is_empty() {
        out.push_str(&format!("\n  keywords: {}", hit.keywords));
    }
    for line in hit.summary.lines() {
        out.push_str(&format!("\n  | {line}"));
    }
    out
}

/// RFC 3339 in UTC, or the raw seconds when out of range.
pub fn format_mtime(seconds: f64) -> String {
    DateTime::<Utc>::from_timestamp(seconds.floor() as i64, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| seconds.to_string())
}
