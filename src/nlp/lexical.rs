//! Word counts, reading time and keywords.

use std::collections::HashMap;

use schemars::JsonSchema;

use crate::prelude::*;

use super::{StopWords, Tokenizer};

/// A keyword and how often it occurs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Keyword {
    /// The lower-cased word.
    pub word: String,
    /// Number of occurrences in the text.
    pub count: usize,
}

/// Statistics about a text.
#[derive(Clone, Debug, PartialEq, Serialize, JsonSchema)]
pub struct AnalysisResult {
    /// Number of alphabetic words, stopwords included.
    pub word_count: usize,
    /// Number of characters, whitespace and punctuation included.
    pub char_count: usize,
    /// `word_count` divided by the reading speed, rounded to 2 decimal places.
    pub reading_time_minutes: f64,
    /// The most frequent non-stopwords, most frequent first. Ties keep the
    /// order in which the words first appear.
    pub top_keywords: Vec<Keyword>,
}

/// Computes an [`AnalysisResult`] for a text.
#[derive(Clone, Debug)]
pub struct LexicalAnalyzer {
    tokenizer: Tokenizer,
    stopwords: StopWords,
    top_words: usize,
    words_per_minute: u32,
}

impl LexicalAnalyzer {
    pub fn new(
        tokenizer: Tokenizer,
        stopwords: StopWords,
        top_words: usize,
        words_per_minute: u32,
    ) -> Self {
        Self {
            tokenizer,
            stopwords,
            top_words,
            words_per_minute,
        }
    }

    /// Analyze `text`. Never fails; empty text gives all zeros.
    #[instrument(level = "debug", skip_all, fields(chars = text.len()))]
    pub fn analyze(&self, text: &str) -> AnalysisResult {
        let words = self.tokenizer.alphabetic_words(text);
        let word_count = words.len();
        let top_keywords = most_common(
            words
                .iter()
                .map(String::as_str)
                .filter(|word| !self.stopwords.contains(word)),
            self.top_words,
        );
        AnalysisResult {
            word_count,
            char_count: text.chars().count(),
            reading_time_minutes: reading_time(word_count, self.words_per_minute),
            top_keywords,
        }
    }
}

/// Minutes needed to read `word_count` words, rounded to 2 decimal places.
///
/// This rounds the exact binary value of the quotient, with ties to even:
/// `3 / 200` is stored just below 0.015 and becomes 0.01, and `25 / 200` is
/// exactly 0.125 and becomes 0.12. Scaling by 100 first would round twice.
fn reading_time(word_count: usize, words_per_minute: u32) -> f64 {
    let minutes = word_count as f64 / f64::from(words_per_minute);
    format!("{minutes:.2}").parse().unwrap_or(minutes)
}

/// Count `words` and return the `n` most frequent. Ties are broken by first
/// occurrence.
fn most_common<'a>(words: impl Iterator<Item = &'a str>, n: usize) -> Vec<Keyword> {
    let mut index = HashMap::<&str, usize>::new();
    let mut counts: Vec<Keyword> = Vec::new();
    for word in words {
        match index.get(word) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(word, counts.len());
                counts.push(Keyword {
                    word: word.to_owned(),
                    count: 1,
                });
            }
        }
    }
    // `sort_by` is stable, so first-seen order survives among equal counts.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(n);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> LexicalAnalyzer {
        LexicalAnalyzer::new(Tokenizer::new().unwrap(), StopWords::english(), 5, 200)
    }

    fn keywords(result: &AnalysisResult) -> Vec<(&str, usize)> {
        result
            .top_keywords
            .iter()
            .map(|k| (k.word.as_str(), k.count))
            .collect()
    }

    #[test]
    fn analyzes_short_text() {
        let result = analyzer().analyze("Hello world. Hello again.\n");
        assert_eq!(result.word_count, 4);
        assert_eq!(result.char_count, 26);
        assert_eq!(result.reading_time_minutes, 0.02);
        // "again" is a stopword.
        assert_eq!(keywords(&result), vec![("hello", 2), ("world", 1)]);
    }

    #[test]
    fn empty_text_is_all_zeros() {
        let result = analyzer().analyze("");
        assert_eq!(
            result,
            AnalysisResult {
                word_count: 0,
                char_count: 0,
                reading_time_minutes: 0.0,
                top_keywords: vec![],
            }
        );
    }

    #[test]
    fn stopwords_count_as_words_but_not_keywords() {
        let result = analyzer().analyze("The cat and the hat.");
        assert_eq!(result.word_count, 5);
        assert_eq!(keywords(&result), vec![("cat", 1), ("hat", 1)]);
    }

    #[test]
    fn keywords_are_limited_and_ties_keep_first_seen_order() {
        let text = "delta alpha beta gamma alpha epsilon zeta beta eta";
        let result = analyzer().analyze(text);
        assert_eq!(
            keywords(&result),
            vec![
                ("alpha", 2),
                ("beta", 2),
                ("delta", 1),
                ("gamma", 1),
                ("epsilon", 1)
            ]
        );
    }

    #[test]
    fn numbers_and_punctuation_are_not_words() {
        let result = analyzer().analyze("42 ... 3.14 !!");
        assert_eq!(result.word_count, 0);
        assert_eq!(result.char_count, 14);
        assert!(result.top_keywords.is_empty());
    }

    #[test]
    fn char_count_counts_characters_not_bytes() {
        let result = analyzer().analyze("café");
        assert_eq!(result.char_count, 4);
        assert_eq!(keywords(&result), vec![("café", 1)]);
    }

    #[test]
    fn reading_time_is_rounded_to_two_places() {
        assert_eq!(reading_time(0, 200), 0.0);
        assert_eq!(reading_time(300, 200), 1.5);
        assert_eq!(reading_time(1, 200), 0.01);
        assert_eq!(reading_time(1, 300), 0.0);
        assert_eq!(reading_time(2, 300), 0.01);
        assert_eq!(reading_time(250, 250), 1.0);
    }

    #[test]
    fn reading_time_rounds_the_exact_quotient() {
        for (words, expected) in [(3, 0.01), (21, 0.1), (25, 0.12), (125, 0.62), (127, 0.64)]
        {
            assert_eq!(reading_time(words, 200), expected, "{words} words");
        }
    }

    #[test]
    fn extra_stopwords_are_ignored() {
        let analyzer = LexicalAnalyzer::new(
            Tokenizer::new().unwrap(),
            StopWords::english().with_extra(["Hello"]),
            5,
            200,
        );
        let result = analyzer.analyze("Hello world. Hello again.");
        assert_eq!(result.word_count, 4);
        assert_eq!(keywords(&result), vec![("world", 1)]);
    }
}
