use cli::commands::{run_index, run_query};
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};
use storage::{IndexStore, SearchField, TantivyStore};
use tempfile::tempdir;
use textsift_core::config::{AppConfig, MissingIndexPolicy};
use textsift_core::{IndexError, IndexMode};

fn config(root: &Path, index: &Path) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.documents.root = root.to_string_lossy().into_owned();
    cfg.index.path = index.to_string_lossy().into_owned();
    cfg
}

fn key(root: &Path, name: &str) -> String {
    root.join(name).to_string_lossy().into_owned()
}

fn stored_times(index: &Path) -> Vec<(String, f64)> {
    TantivyStore::new(index)
        .records()
        .unwrap()
        .into_iter()
        .map(|r| (r.path, r.modification_time))
        .collect()
}

fn bump_mtime(path: &Path) {
    let later = SystemTime::now() + Duration::from_secs(30);
    fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(later)
        .unwrap();
}

#[test]
fn incremental_indexing_tracks_the_documents_root() {
    let temp = tempdir().unwrap();
    let docs = temp.path().join("docs");
    let index = temp.path().join("index");
    fs::create_dir_all(&docs).unwrap();

    fs::write(
        docs.join("cats.txt"),
        "The cat sat. The cat sat on the mat. Dogs bark loudly.",
    )
    .unwrap();
    fs::write(
        docs.join("rust.txt"),
        "Rust checks borrows at compile time. Borrow checking prevents data races.",
    )
    .unwrap();
    fs::write(docs.join("gone.txt"), "Temporary notes about lunch.").unwrap();
    let cfg = config(&docs, &index);

    let first = run_index(&cfg, true).unwrap();
    assert_eq!(first.mode, IndexMode::Clean);
    assert_eq!(first.added, 3);
    let before = stored_times(&index);
    assert_eq!(before.len(), 3);

    // Edit one file, remove one, add one text file and one binary file.
    fs::write(docs.join("rust.txt"), "Ownership moves values between bindings.").unwrap();
    bump_mtime(&docs.join("rust.txt"));
    fs::remove_file(docs.join("gone.txt")).unwrap();
    fs::write(docs.join("new.txt"), "Fresh paragraph about gardens.").unwrap();
    fs::write(docs.join("binary.dat"), [0u8, 159, 146, 150]).unwrap();

    let second = run_index(&cfg, false).unwrap();
    assert_eq!(second.mode, IndexMode::Incremental);
    assert_eq!(second.deleted, 2);
    assert_eq!(second.added, 2);
    assert!(second.skipped.is_empty());

    let after = stored_times(&index);
    let paths: Vec<&str> = after.iter().map(|(p, _)| p.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            key(&docs, "cats.txt"),
            key(&docs, "new.txt"),
            key(&docs, "rust.txt")
        ]
    );
    // Untouched document keeps its stored time.
    let cats = key(&docs, "cats.txt");
    let time_of = |records: &[(String, f64)], path: &str| {
        records.iter().find(|(p, _)| p == path).map(|(_, t)| *t)
    };
    assert_eq!(time_of(&after, &cats), time_of(&before, &cats));
    let rust = key(&docs, "rust.txt");
    assert!(time_of(&after, &rust) > time_of(&before, &rust));

    // Replaced content is searchable, the old content is not.
    let hits = run_query(&cfg, SearchField::Content, "ownership", 10).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].path, rust);
    assert!(run_query(&cfg, SearchField::Content, "borrows", 10)
        .unwrap()
        .is_empty());
    assert!(run_query(&cfg, SearchField::Content, "lunch", 10)
        .unwrap()
        .is_empty());

    // Nothing changed since the last run.
    let third = run_index(&cfg, false).unwrap();
    assert_eq!((third.added, third.deleted), (0, 0));
}

#[test]
fn unreadable_document_does_not_abort_the_commit() {
    let temp = tempdir().unwrap();
    let docs = temp.path().join("docs");
    let index = temp.path().join("index");
    fs::create_dir_all(&docs).unwrap();
    fs::write(docs.join("ok.txt"), "Readable prose about rivers.").unwrap();
    let cfg = config(&docs, &index);
    run_index(&cfg, true).unwrap();

    // Valid UTF-8 for the sniffed prefix, broken further in.
    let mut broken = "word ".repeat(4096).into_bytes();
    broken.extend_from_slice(&[0xff, 0xfe, b'\n']);
    fs::write(docs.join("broken.txt"), broken).unwrap();
    fs::write(docs.join("later.txt"), "Late arrival about mountains.").unwrap();

    let summary = run_index(&cfg, false).unwrap();
    assert_eq!(summary.added, 1);
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].path, key(&docs, "broken.txt"));

    let paths: Vec<String> = stored_times(&index).into_iter().map(|(p, _)| p).collect();
    assert_eq!(paths, vec![key(&docs, "later.txt"), key(&docs, "ok.txt")]);
}

#[test]
fn keyphrases_and_summaries_are_searchable() {
    let temp = tempdir().unwrap();
    let docs = temp.path().join("docs");
    let index = temp.path().join("index");
    fs::create_dir_all(&docs).unwrap();
    fs::write(
        docs.join("cats.txt"),
        "The cat sat. The cat sat on the mat. Dogs bark loudly.",
    )
    .unwrap();
    fs::write(docs.join("other.txt"), "Nothing feline here at all.").unwrap();
    let cfg = config(&docs, &index);
    run_index(&cfg, true).unwrap();

    let hits = run_query(&cfg, SearchField::Keywords, "\"Dogs Bark Loudly\"", 5).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].path, key(&docs, "cats.txt"));
    assert!(hits[0].keywords.split(',').any(|k| k == "cat sat"));
    assert!(hits[0].summary.contains("Dogs bark loudly."));

    let hits = run_query(&cfg, SearchField::Summary, "mat", 5).unwrap();
    assert_eq!(hits.len(), 1);

    assert!(run_query(&cfg, SearchField::Summary, "feline", 0)
        .unwrap()
        .is_empty());
}

#[test]
fn incremental_run_without_index_follows_policy() {
    let temp = tempdir().unwrap();
    let docs = temp.path().join("docs");
    fs::create_dir_all(&docs).unwrap();
    fs::write(docs.join("a.txt"), "Some words worth indexing.").unwrap();

    let mut cfg = config(&docs, &temp.path().join("index"));
    let err = run_index(&cfg, false).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<IndexError>(),
        Some(IndexError::MissingIndex)
    ));

    cfg.index.on_missing = MissingIndexPolicy::Rebuild;
    let summary = run_index(&cfg, false).unwrap();
    assert_eq!(summary.mode, IndexMode::Clean);
    assert_eq!(summary.added, 1);
}

#[test]
fn querying_without_an_index_fails() {
    let temp = tempdir().unwrap();
    let cfg = config(temp.path(), &temp.path().join("missing"));
    assert!(run_query(&cfg, SearchField::Content, "anything", 5).is_err());
}
