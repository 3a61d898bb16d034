//! Extractive summaries.

use std::fmt;

use crate::prelude::*;

use super::{Tokenizer, lsa};

/// Shown in place of a summary we couldn't compute.
pub const FALLBACK_TEXT: &str = "Could not generate summary.";

/// The outcome of summarizing a text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Summary {
    /// Sentences taken from the text, in document order, joined by
    /// single spaces.
    Extracted(String),
    /// We couldn't summarize the text. Displays as [`FALLBACK_TEXT`].
    Fallback {
        /// Why not.
        reason: String,
    },
}

impl Summary {
    /// The text to show the user.
    pub fn text(&self) -> &str {
        match self {
            Summary::Extracted(text) => text,
            Summary::Fallback { .. } => FALLBACK_TEXT,
        }
    }

    /// If this is a fallback, the reason we couldn't summarize.
    pub fn fallback_reason(&self) -> Option<&str> {
        match self {
            Summary::Extracted(_) => None,
            Summary::Fallback { reason } => Some(reason),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Picks the most representative sentences of a text, using latent semantic
/// analysis.
#[derive(Clone, Debug)]
pub struct Summarizer {
    tokenizer: Tokenizer,
}

impl Summarizer {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self { tokenizer }
    }

    /// Summarize `text` in at most `sentence_count` sentences.
    ///
    /// This never fails. Text we can't summarize (no sentence boundaries, no
    /// words) produces [`Summary::Fallback`], and we log why.
    #[instrument(level = "debug", skip_all, fields(sentence_count = sentence_count))]
    pub fn summarize(&self, text: &str, sentence_count: usize) -> Summary {
        match self.try_summarize(text, sentence_count) {
            Ok(summary) => Summary::Extracted(summary),
            Err(err) => {
                warn!("could not generate summary: {:#}", err);
                Summary::Fallback {
                    reason: format!("{:#}", err),
                }
            }
        }
    }

    fn try_summarize(&self, text: &str, sentence_count: usize) -> Result<String> {
        let sentences = self.tokenizer.sentences(text);
        match sentences.as_slice() {
            [] => bail!("no sentences found"),
            [only] if !only.terminated => bail!("no sentence boundaries found"),
            _ => {}
        }
        debug!(sentences = sentences.len(), "Split text into sentences");

        let words = sentences
            .iter()
            .map(|sentence| self.tokenizer.summary_words(&sentence.text))
            .collect::<Vec<_>>();
        let ranks = lsa::sentence_ranks(&words).context("cannot rank sentences")?;

        // Best first (stable, so equal ranks keep document order), then
        // back into document order.
        let mut chosen = (0..sentences.len()).collect::<Vec<_>>();
        chosen.sort_by(|&a, &b| ranks[b].total_cmp(&ranks[a]));
        chosen.truncate(sentence_count);
        chosen.sort_unstable();

        Ok(chosen
            .into_iter()
            .map(|idx| sentences[idx].text.as_str())
            .collect::<Vec<_>>()
            .join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summarizer() -> Summarizer {
        Summarizer::new(Tokenizer::new().unwrap())
    }

    #[test]
    fn single_sentence_is_its_own_summary() {
        let summary = summarizer().summarize("Only one sentence here.", 3);
        assert_eq!(
            summary,
            Summary::Extracted("Only one sentence here.".to_owned())
        );
    }

    #[test]
    fn single_word_falls_back() {
        let summary = summarizer().summarize("Hello", 3);
        assert_eq!(summary.text(), FALLBACK_TEXT);
        assert_eq!(
            summary.fallback_reason(),
            Some("no sentence boundaries found")
        );
    }

    #[test]
    fn blank_text_falls_back() {
        let summary = summarizer().summarize("  \n ", 3);
        assert_eq!(summary.to_string(), FALLBACK_TEXT);
        assert_eq!(summary.fallback_reason(), Some("no sentences found"));
    }

    #[test]
    fn punctuation_only_falls_back() {
        let summary = summarizer().summarize("... !!! ???", 3);
        assert_eq!(summary.text(), FALLBACK_TEXT);
        assert!(summary.fallback_reason().is_some());
    }

    #[test]
    fn picks_top_sentences_in_document_order() {
        let text = "Short one. This sentence has many more distinct words in it. Tiny. \
                    Another fairly long sentence with several words.";
        let summary = summarizer().summarize(text, 2);
        assert_eq!(
            summary.text(),
            "This sentence has many more distinct words in it. \
             Another fairly long sentence with several words."
        );
    }

    #[test]
    fn headings_are_never_picked() {
        let text = "ANNUAL REPORT\n\nSales grew. Costs fell sharply this year.";
        let summary = summarizer().summarize(text, 3);
        assert_eq!(summary.text(), "Sales grew. Costs fell sharply this year.");
    }

    #[test]
    fn short_text_is_returned_whole() {
        let text = "Hello world. Hello again.";
        let summary = summarizer().summarize(text, 3);
        assert_eq!(summary, Summary::Extracted(text.to_owned()));
    }
}
