//! RAKE keyphrase extraction.
//!
//! Candidate phrases are the runs of words between stopwords and punctuation.
//! Each word scores `degree / frequency`, where degree counts the non-numeric
//! words it shares phrases with (itself included), and a phrase scores the
//! sum of its words.

use crate::error::TextError;
use crate::language::{is_punctuation, Linguistics};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// A maximal run of consecutive non-stopword, non-punctuation tokens.
pub type PhraseCandidate = Vec<String>;

/// Word to `degree / frequency`.
pub type WordScores = HashMap<String, f64>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredPhrase {
    pub phrase: String,
    pub score: f64,
}

pub struct RakeExtractor {
    linguistics: Arc<dyn Linguistics>,
    top_fraction: f64,
}

impl RakeExtractor {
    pub fn new(linguistics: Arc<dyn Linguistics>) -> Self {
        Self {
            linguistics,
            top_fraction: 1.0,
        }
    }

    /// Keeps only the first `len / top_fraction` ranked phrases; 3.0 keeps
    /// the top third. Must be at least 1.
    pub fn with_top_fraction(mut self, top_fraction: f64) -> Result<Self, TextError> {
        if !(top_fraction.is_finite() && top_fraction >= 1.0) {
            return Err(TextError::InvalidTopFraction(top_fraction));
        }
        self.top_fraction = top_fraction;
        Ok(self)
    }

    /// Ranked keyphrases, best first.
    pub fn extract(&self, text: &str) -> Vec<String> {
        self.extract_scored(text)
            .into_iter()
            .map(|p| p.phrase)
            .collect()
    }

    /// Ranked keyphrases with their scores, best first.
    pub fn extract_scored(&self, text: &str) -> Vec<ScoredPhrase> {
        let phrases = self.candidate_phrases(text);
        let word_scores = word_scores(&phrases);
        let mut ranked = phrase_scores(&phrases, &word_scores);
        // Stable, so equal scores keep first-seen order.
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        let keep = (ranked.len() as f64 / self.top_fraction) as usize;
        ranked.truncate(keep);
        if let Some(top) = ranked.first() {
            debug!(phrase = %top.phrase, score = top.score, "top phrase");
        }
        ranked
    }

    pub fn candidate_phrases(&self, text: &str) -> Vec<PhraseCandidate> {
        let mut phrases = Vec::new();
        for sentence in self.linguistics.segment_sentences(text) {
            let mut phrase = PhraseCandidate::new();
            for word in self.linguistics.tokenize_words(&sentence) {
                if self.linguistics.is_stopword(&word) || is_punctuation(&word) {
                    if !phrase.is_empty() {
                        phrases.push(std::mem::take(&mut phrase));
                    }
                } else {
                    phrase.push(word);
                }
            }
            if !phrase.is_empty() {
                phrases.push(phrase);
            }
        }
        phrases
    }
}

/// Integers, or floats when the token contains a `.`.
pub fn is_numeric(token: &str) -> bool {
    if token.contains('.') {
        return token.parse::<f64>().is_ok();
    }
    let digits = token
        .strip_prefix(|c: char| c == '+' || c == '-')
        .unwrap_or(token);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

pub fn word_scores(phrases: &[PhraseCandidate]) -> WordScores {
    let mut freq: HashMap<&str, i64> = HashMap::new();
    let mut degree: HashMap<&str, i64> = HashMap::new();
    for phrase in phrases {
        let co_occurring = phrase.iter().filter(|w| !is_numeric(w)).count() as i64 - 1;
        for word in phrase {
            *freq.entry(word.as_str()).or_default() += 1;
            *degree.entry(word.as_str()).or_default() += co_occurring;
        }
    }
    freq.iter()
        .map(|(&word, &f)| {
            let d = degree.get(word).copied().unwrap_or_default() + f;
            (word.to_string(), d as f64 / f as f64)
        })
        .collect()
}

/// One entry per distinct phrase text, in first-seen order. A repeated
/// phrase takes the score computed at its last occurrence.
fn phrase_scores(phrases: &[PhraseCandidate], word_scores: &WordScores) -> Vec<ScoredPhrase> {
    let mut scored: Vec<ScoredPhrase> = Vec::new();
    let mut position: HashMap<String, usize> = HashMap::new();
    for phrase in phrases {
        let score: f64 = phrase
            .iter()
            .map(|w| word_scores.get(w).copied().unwrap_or_default())
            .sum();
        let text = phrase.join(" ");
        match position.get(&text) {
            Some(&i) => scored[i].score = score,
            None => {
                position.insert(text.clone(), scored.len());
                scored.push(ScoredPhrase {
                    phrase: text,
                    score,
                });
            }
        }
    }
    scored
}
