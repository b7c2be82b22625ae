//! Walks the documents root and keeps the plain-text files.

use crate::error::IndexError;
use crate::reconcile::FileProbe;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::fs;
use std::io::Read;
use std::path::Path;
use std::time::UNIX_EPOCH;
use tracing::debug;
use walkdir::WalkDir;

const SNIFF_BYTES: u64 = 8 * 1024;

/// A plain-text file found by [`discover`].
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredDocument {
    pub path: String,
    /// Seconds since the Unix epoch.
    pub modification_time: f64,
}

/// Decides whether a file holds plain text worth indexing.
pub trait ContentSniffer: Send + Sync {
    fn is_plain_text(&self, path: &Path) -> bool;
}

/// Looks at the first bytes of a file. Anything with a recognised signature
/// (images, archives, but also HTML, XML and shell scripts) or a NUL byte is
/// not plain text; otherwise the sample must be UTF-8.
#[derive(Debug, Clone)]
pub struct PlainTextSniffer {
    sample_bytes: u64,
}

impl PlainTextSniffer {
    pub fn new() -> Self {
        Self {
            sample_bytes: SNIFF_BYTES,
        }
    }
}

impl Default for PlainTextSniffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentSniffer for PlainTextSniffer {
    fn is_plain_text(&self, path: &Path) -> bool {
        let mut sample = Vec::new();
        let read = fs::File::open(path)
            .and_then(|f| f.take(self.sample_bytes).read_to_end(&mut sample));
        match read {
            Ok(_) => looks_like_plain_text(&sample),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "cannot sniff");
                false
            }
        }
    }
}

pub fn looks_like_plain_text(sample: &[u8]) -> bool {
    if sample.is_empty() {
        return false;
    }
    if let Some(kind) = infer::get(sample) {
        debug!(mime = kind.mime_type(), "typed content is not plain text");
        return false;
    }
    if sample.contains(&0) {
        return false;
    }
    match std::str::from_utf8(sample) {
        Ok(_) => true,
        // The sample may end in the middle of a multi-byte character.
        Err(e) => e.error_len().is_none(),
    }
}

/// Reads modification times straight from the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe;

impl FileProbe for FsProbe {
    fn modified(&self, path: &str) -> Option<f64> {
        fs::metadata(path).ok().as_ref().and_then(modification_time)
    }
}

pub fn modification_time(meta: &fs::Metadata) -> Option<f64> {
    meta.modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs_f64())
}

/// Every plain-text file under `root`, sorted by path within each directory.
pub fn discover(
    root: &Path,
    excludes: &[String],
    include_hidden: bool,
    sniffer: &dyn ContentSniffer,
) -> Result<Vec<DiscoveredDocument>, IndexError> {
    if !root.exists() {
        return Err(IndexError::MissingDocumentsRoot(root.to_path_buf()));
    }
    let exclude_set = build_globset(excludes)?;

    let mut documents = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || should_descend(e.path(), include_hidden, &exclude_set))
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(path_str) = path.to_str() else {
            debug!(path = %path.display(), "skipping non-UTF-8 path");
            continue;
        };
        let Some(modification_time) = entry.metadata().ok().as_ref().and_then(modification_time)
        else {
            debug!(path = path_str, "skipping file without modification time");
            continue;
        };
        if !sniffer.is_plain_text(path) {
            debug!(path = path_str, "not plain text");
            continue;
        }
        documents.push(DiscoveredDocument {
            path: path_str.to_string(),
            modification_time,
        });
    }
    Ok(documents)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, globset::Error> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(Glob::new(pat)?);
    }
    builder.build()
}

fn should_descend(path: &Path, include_hidden: bool, excludes: &GlobSet) -> bool {
    if excludes.is_match(path) {
        return false;
    }
    include_hidden || !is_hidden(path)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(docs: &[DiscoveredDocument], root: &Path) -> Vec<String> {
        docs.iter()
            .map(|d| {
                Path::new(&d.path)
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn finds_text_files_and_skips_binaries() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        fs::create_dir(root.join("notes")).unwrap();
        fs::write(root.join("a.txt"), "Plain words.").unwrap();
        fs::write(root.join("notes/b.md"), "# Heading\n\nMore words.").unwrap();
        fs::write(root.join("image.png"), b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR").unwrap();
        fs::write(root.join("blob.bin"), [1u8, 0, 2, 3]).unwrap();
        fs::write(root.join("empty.txt"), "").unwrap();

        let docs = discover(root, &[], false, &PlainTextSniffer::new()).unwrap();
        assert_eq!(paths(&docs, root), vec!["a.txt", "notes/b.md"]);
        assert!(docs.iter().all(|d| d.modification_time > 0.0));
    }

    #[test]
    fn hidden_entries_are_skipped_unless_requested() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        fs::create_dir(root.join(".git")).unwrap();
        fs::write(root.join(".git/config"), "text").unwrap();
        fs::write(root.join(".env"), "text").unwrap();
        fs::write(root.join("visible.txt"), "text").unwrap();

        let docs = discover(root, &[], false, &PlainTextSniffer::new()).unwrap();
        assert_eq!(paths(&docs, root), vec!["visible.txt"]);

        let docs = discover(root, &[], true, &PlainTextSniffer::new()).unwrap();
        assert_eq!(paths(&docs, root), vec![".env", ".git/config", "visible.txt"]);
    }

    #[test]
    fn exclude_globs_prune_files_and_directories() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        fs::create_dir(root.join("target")).unwrap();
        fs::write(root.join("target/out.txt"), "text").unwrap();
        fs::write(root.join("keep.txt"), "text").unwrap();
        fs::write(root.join("debug.log"), "text").unwrap();

        let excludes = vec!["**/target".to_string(), "**/*.log".to_string()];
        let docs = discover(root, &excludes, false, &PlainTextSniffer::new()).unwrap();
        assert_eq!(paths(&docs, root), vec!["keep.txt"]);

        let bad = vec!["[".to_string()];
        assert!(matches!(
            discover(root, &bad, false, &PlainTextSniffer::new()),
            Err(IndexError::Pattern(_))
        ));
    }

    #[test]
    fn missing_root_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let missing = temp.path().join("nope");
        assert!(matches!(
            discover(&missing, &[], false, &PlainTextSniffer::new()),
            Err(IndexError::MissingDocumentsRoot(_))
        ));
    }

    #[test]
    fn sniffing_rules() {
        assert!(looks_like_plain_text("héllo wörld".as_bytes()));
        assert!(!looks_like_plain_text(b""));
        assert!(!looks_like_plain_text(b"text\0more"));
        assert!(!looks_like_plain_text(b"%PDF-1.7\n"));
        assert!(!looks_like_plain_text(&[0xff, 0xfe, 0x41]));
        // "é" cut after its first byte.
        assert!(looks_like_plain_text(&[b'a', 0xc3]));
    }

    #[test]
    fn markup_and_scripts_are_not_plain_text() {
        assert!(!looks_like_plain_text(
            b"<!DOCTYPE html>\n<html><body><p>Hello there.</p></body></html>"
        ));
        assert!(!looks_like_plain_text(
            b"<?xml version=\"1.0\"?>\n<note><to>Tove</to></note>"
        ));
        assert!(!looks_like_plain_text(b"#!/bin/sh\necho hello\n"));
        assert!(looks_like_plain_text(b"Prose that mentions <html> in passing."));
    }

    #[test]
    fn discovery_skips_markup_files() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        fs::write(root.join("page.html"), "<!DOCTYPE html><html><body>Hi.</body></html>").unwrap();
        fs::write(root.join("run.sh"), "#!/bin/sh\necho hi\n").unwrap();
        fs::write(root.join("notes.txt"), "Plain words only.").unwrap();

        let docs = discover(root, &[], false, &PlainTextSniffer::new()).unwrap();
        assert_eq!(paths(&docs, root), vec!["notes.txt"]);
    }

    #[test]
    fn missing_files_have_no_modification_time() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("a.txt");
        fs::write(&file, "x").unwrap();
        assert!(FsProbe.modified(file.to_str().unwrap()).is_some());
        assert!(FsProbe.modified(temp.path().join("b.txt").to_str().unwrap()).is_none());
    }
}
