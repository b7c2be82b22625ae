//! Sentence segmentation, word tokenization and stopwords.
//!
//! The rules approximate a Punkt-style segmenter and a Treebank-style word
//! tokenizer for English prose: sentence terminators followed by whitespace
//! end a sentence unless they close a known abbreviation or an initial, blank
//! lines always end one, and words are split from surrounding punctuation and
//! clitics (`don't` becomes `do` + `n't`).

use crate::config::LanguageConfig;
use std::collections::HashSet;
use std::fs;

const ENGLISH_STOPWORDS: &str = include_str!("../data/stopwords_en.txt");

const TERMINATORS: &[char] = &['.', '!', '?'];
const CLOSERS: &[char] = &['"', '\'', ')', ']', '}', '”', '’', '»'];
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "e.g", "i.e", "cf", "fig",
    "approx", "dept", "est", "inc", "ltd",
];
const CLITICS: &[&str] = &["'s", "'re", "'ve", "'ll", "'d", "'m"];

/// Language-specific text resources used by the summarizer and the keyword
/// extractor.
pub trait Linguistics: Send + Sync {
    /// Splits text into sentences, in document order, verbatim but trimmed.
    fn segment_sentences(&self, text: &str) -> Vec<String>;

    /// Splits one sentence into lowercase tokens. Punctuation marks become
    /// single-character tokens.
    fn tokenize_words(&self, sentence: &str) -> Vec<String>;

    fn stopwords(&self) -> &HashSet<String>;

    fn is_stopword(&self, word: &str) -> bool {
        self.stopwords().contains(word)
    }
}

#[derive(Debug, Clone)]
pub struct EnglishLinguistics {
    stopwords: HashSet<String>,
}

impl EnglishLinguistics {
    pub fn new() -> Self {
        Self {
            stopwords: parse_word_list(ENGLISH_STOPWORDS).collect(),
        }
    }

    /// Adds `words` to the stopword set.
    pub fn with_stopwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stopwords
            .extend(words.into_iter().map(|w| w.as_ref().trim().to_lowercase()));
        self
    }

    /// Built-in English stopwords plus the optional newline-separated list at
    /// `stopwords_path`.
    pub fn from_config(cfg: &LanguageConfig) -> std::io::Result<Self> {
        let base = Self::new();
        match cfg.stopwords_path.as_deref().filter(|p| !p.is_empty()) {
            Some(path) => {
                let text = fs::read_to_string(path)?;
                let extra: Vec<String> = parse_word_list(&text).collect();
                Ok(base.with_stopwords(extra))
            }
            None => Ok(base),
        }
    }
}

impl Default for EnglishLinguistics {
    fn default() -> Self {
        Self::new()
    }
}

impl Linguistics for EnglishLinguistics {
    fn segment_sentences(&self, text: &str) -> Vec<String> {
        split_sentences(text)
    }

    fn tokenize_words(&self, sentence: &str) -> Vec<String> {
        split_words(sentence)
    }

    fn stopwords(&self) -> &HashSet<String> {
        &self.stopwords
    }
}

// One word per line; blank lines and `#` comments are ignored.
fn parse_word_list(text: &str) -> impl Iterator<Item = String> + '_ {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_lowercase)
}

fn is_punct_char(c: char) -> bool {
    c.is_ascii_punctuation() || matches!(c, '“' | '”' | '‘' | '’' | '«' | '»' | '…' | '—' | '–')
}

/// True for a token made of exactly one punctuation character.
pub fn is_punctuation(token: &str) -> bool {
    let mut chars = token.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if is_punct_char(c))
}

pub fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < chars.len() {
        let (offset, c) = chars[i];
        if TERMINATORS.contains(&c) {
            let mut j = i + 1;
            while j < chars.len()
                && (TERMINATORS.contains(&chars[j].1) || CLOSERS.contains(&chars[j].1))
            {
                j += 1;
            }
            let end = chars.get(j).map_or(text.len(), |&(b, _)| b);
            let at_boundary = j == chars.len() || chars[j].1.is_whitespace();
            if at_boundary
                && !(c == '.' && ends_with_abbreviation(&text[start..offset]))
                && !continues_lowercase(&chars[j..])
            {
                push_trimmed(&mut sentences, &text[start..end]);
                start = end;
            }
            i = j;
            continue;
        }
        if c == '\n' && blank_line_follows(&chars[i + 1..]) {
            push_trimmed(&mut sentences, &text[start..offset]);
            start = offset;
        }
        i += 1;
    }
    push_trimmed(&mut sentences, &text[start..]);
    sentences
}

fn push_trimmed(out: &mut Vec<String>, sentence: &str) {
    let sentence = sentence.trim();
    if !sentence.is_empty() {
        out.push(sentence.to_string());
    }
}

fn ends_with_abbreviation(preceding: &str) -> bool {
    let word = preceding
        .split_whitespace()
        .last()
        .unwrap_or_default()
        .trim_start_matches(|c: char| is_punct_char(c))
        .to_lowercase();
    let mut chars = word.chars();
    let initial = matches!((chars.next(), chars.next()), (Some(c), None) if c.is_alphabetic());
    initial || ABBREVIATIONS.contains(&word.as_str())
}

fn continues_lowercase(rest: &[(usize, char)]) -> bool {
    rest.iter()
        .map(|&(_, c)| c)
        .find(|c| !c.is_whitespace())
        .is_some_and(char::is_lowercase)
}

fn blank_line_follows(rest: &[(usize, char)]) -> bool {
    for &(_, c) in rest {
        if c == '\n' {
            return true;
        }
        if !c.is_whitespace() {
            return false;
        }
    }
    false
}

pub fn split_words(sentence: &str) -> Vec<String> {
    let lowered = sentence.to_lowercase().replace('’', "'");
    let mut tokens = Vec::new();
    for chunk in lowered.split_whitespace() {
        let chars: Vec<char> = chunk.chars().collect();
        let (mut lo, mut hi) = (0, chars.len());
        while lo < hi && is_punct_char(chars[lo]) && !starts_number(&chars[lo..hi]) {
            tokens.push(chars[lo].to_string());
            lo += 1;
        }
        let mut trailing = Vec::new();
        while hi > lo && is_punct_char(chars[hi - 1]) && !closes_abbreviation(&chars[lo..hi]) {
            trailing.push(chars[hi - 1].to_string());
            hi -= 1;
        }
        if lo < hi {
            let word: String = chars[lo..hi].iter().collect();
            push_with_clitic(&mut tokens, word);
        }
        tokens.extend(trailing.into_iter().rev());
    }
    tokens
}

// "-5", "+3", ".5"
fn starts_number(chars: &[char]) -> bool {
    matches!(chars, [sign, digit, ..] if matches!(sign, '+' | '-' | '.') && digit.is_ascii_digit())
}

// "e.g." and "u.s." keep their final period.
fn closes_abbreviation(word: &[char]) -> bool {
    match word.split_last() {
        Some(('.', stem)) => {
            stem.contains(&'.') && stem.iter().all(|c| c.is_alphabetic() || *c == '.')
        }
        _ => false,
    }
}

fn push_with_clitic(tokens: &mut Vec<String>, word: String) {
    if let Some(stem) = word.strip_suffix("n't").filter(|s| !s.is_empty()) {
        tokens.push(stem.to_string());
        tokens.push("n't".to_string());
        return;
    }
    for clitic in CLITICS {
        if let Some(stem) = word.strip_suffix(clitic).filter(|s| !s.is_empty()) {
            tokens.push(stem.to_string());
            tokens.push(clitic.to_string());
            return;
        }
    }
    tokens.push(word);
}
