//! Extractive summarization by normalized word frequency.

use crate::error::TextError;
use crate::language::{is_punctuation, Linguistics};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Word to normalized frequency, restricted to `(min_cut, max_cut)`.
pub type FrequencyTable = HashMap<String, f64>;

/// Picks the sentences whose words are most frequent across the document.
///
/// Words whose normalized frequency is at or below `min_cut`, or at or above
/// `max_cut`, do not contribute to sentence scores.
pub struct FrequencySummarizer {
    linguistics: Arc<dyn Linguistics>,
    min_cut: f64,
    max_cut: f64,
}

impl FrequencySummarizer {
    pub fn new(
        linguistics: Arc<dyn Linguistics>,
        min_cut: f64,
        max_cut: f64,
    ) -> Result<Self, TextError> {
        if !(min_cut.is_finite() && max_cut.is_finite() && 0.0 <= min_cut && min_cut < max_cut) {
            return Err(TextError::InvalidCutoffs { min_cut, max_cut });
        }
        Ok(Self {
            linguistics,
            min_cut,
            max_cut,
        })
    }

    /// Returns up to `n` sentences of `text`, highest score first.
    ///
    /// Texts with fewer than `n` sentences come back whole, in document
    /// order. Equal scores keep document order.
    pub fn summarize(&self, text: &str, n: usize) -> Result<Vec<String>, TextError> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let sentences = self.linguistics.segment_sentences(text);
        if sentences.len() < n {
            debug!(sentences = sentences.len(), n, "fewer sentences than requested");
            return Ok(sentences);
        }

        let tokenized: Vec<Vec<String>> = sentences
            .iter()
            .map(|s| self.linguistics.tokenize_words(s))
            .collect();
        let freq = self.frequencies(&tokenized)?;

        let mut ranking: Vec<(usize, f64)> = tokenized
            .iter()
            .enumerate()
            .map(|(i, words)| (i, words.iter().filter_map(|w| freq.get(w)).sum()))
            .collect();
        ranking.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranking.truncate(n);

        Ok(ranking
            .into_iter()
            .map(|(i, _)| sentences[i].clone())
            .collect())
    }

    /// Counts non-stopword tokens, normalizes by the largest count and keeps
    /// the words strictly between the cutoffs.
    pub fn frequencies(&self, tokenized: &[Vec<String>]) -> Result<FrequencyTable, TextError> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for word in tokenized.iter().flatten() {
            if !is_punctuation(word) && !self.linguistics.is_stopword(word) {
                *counts.entry(word.as_str()).or_default() += 1;
            }
        }
        let max = counts
            .values()
            .copied()
            .max()
            .ok_or(TextError::EmptyVocabulary)? as f64;

        Ok(counts
            .into_iter()
            .filter_map(|(word, count)| {
                let freq = count as f64 / max;
                (self.min_cut < freq && freq < self.max_cut).then(|| (word.to_string(), freq))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::EnglishLinguistics;

    const CATS: &str = "The cat sat. The cat sat on the mat. Dogs bark loudly.";

    fn summarizer(min_cut: f64, max_cut: f64) -> FrequencySummarizer {
        FrequencySummarizer::new(Arc::new(EnglishLinguistics::new()), min_cut, max_cut).unwrap()
    }

    fn tokenize(text: &str) -> Vec<Vec<String>> {
        let lang = EnglishLinguistics::new();
        lang.segment_sentences(text)
            .iter()
            .map(|s| lang.tokenize_words(s))
            .collect()
    }

    #[test]
    fn picks_sentence_with_most_frequent_words() {
        let s = summarizer(0.1, 1.1);
        assert_eq!(s.summarize(CATS, 1).unwrap(), vec!["The cat sat on the mat."]);
    }

    #[test]
    fn words_at_max_cut_are_dropped() {
        // "cat" and "sat" normalize to exactly 1.0, which is not below a
        // max_cut of 1.0 or 0.9, so only the once-seen words score.
        let s = summarizer(0.1, 0.9);
        let freq = s.frequencies(&tokenize(CATS)).unwrap();
        assert!(!freq.contains_key("cat"));
        assert!(!freq.contains_key("sat"));
        assert_eq!(freq.get("mat"), Some(&0.5));
        assert_eq!(s.summarize(CATS, 1).unwrap(), vec!["Dogs bark loudly."]);

        let at_one = summarizer(0.1, 1.0);
        assert!(!at_one.frequencies(&tokenize(CATS)).unwrap().contains_key("cat"));
    }

    #[test]
    fn words_at_min_cut_are_dropped() {
        // "rare" normalizes to exactly 0.5.
        let s = summarizer(0.5, 1.1);
        let freq = s
            .frequencies(&tokenize("Common rare. Common."))
            .unwrap();
        assert_eq!(freq.get("common"), Some(&1.0));
        assert!(!freq.contains_key("rare"));
    }

    #[test]
    fn retained_frequencies_lie_strictly_between_cutoffs() {
        let text = "Rust compiles code. Rust checks borrows. Code runs fast. \
                    Borrows end early. Rust is fast.";
        let s = summarizer(0.3, 0.8);
        let freq = s.frequencies(&tokenize(text)).unwrap();
        assert!(!freq.is_empty());
        for (word, f) in &freq {
            assert!(0.3 < *f && *f < 0.8, "{word} has frequency {f}");
        }
    }

    #[test]
    fn returns_exactly_n_distinct_input_sentences() {
        let text = "Alpha beta gamma. Beta gamma delta. Gamma delta epsilon. \
                    Delta epsilon zeta. Epsilon zeta eta.";
        let sentences = EnglishLinguistics::new().segment_sentences(text);
        let summary = summarizer(0.1, 0.9).summarize(text, 3).unwrap();
        assert_eq!(summary.len(), 3);
        for s in &summary {
            assert!(sentences.contains(s));
        }
        let mut unique = summary.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn short_text_is_returned_whole_in_order() {
        let s = summarizer(0.1, 0.9);
        assert_eq!(
            s.summarize("Second place. First place!", 3).unwrap(),
            vec!["Second place.", "First place!"]
        );
        assert!(s.summarize("", 1).unwrap().is_empty());
    }

    #[test]
    fn zero_score_sentences_fill_the_summary_in_document_order() {
        // Every word is seen once, normalizes to 1.0 and is cut.
        let s = summarizer(0.1, 0.9);
        assert_eq!(
            s.summarize("Red fox. Blue whale. Green frog.", 2).unwrap(),
            vec!["Red fox.", "Blue whale."]
        );
    }

    #[test]
    fn stopword_only_text_is_an_empty_vocabulary() {
        let s = summarizer(0.1, 0.9);
        assert!(matches!(
            s.summarize("It is what it is. And so on.", 2),
            Err(TextError::EmptyVocabulary)
        ));
    }

    #[test]
    fn rejects_inverted_cutoffs() {
        let lang: Arc<dyn Linguistics> = Arc::new(EnglishLinguistics::new());
        assert!(matches!(
            FrequencySummarizer::new(lang.clone(), 0.9, 0.1),
            Err(TextError::InvalidCutoffs { .. })
        ));
        assert!(FrequencySummarizer::new(lang.clone(), 0.5, f64::NAN).is_err());
        assert!(FrequencySummarizer::new(lang, -0.1, 0.9).is_err());
    }
}
