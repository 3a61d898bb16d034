//! Word and sentence tokenization.
//!
//! Words are split roughly the way the Penn Treebank does it: punctuation
//! becomes separate tokens, hyphenated words and numbers stay whole, and
//! English contractions are split into two tokens (`don't` → `do`, `n't`).

use regex::Regex;

use crate::prelude::*;

/// Words after which a single period does not end a sentence.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "e.g", "i.e", "fig",
    "approx",
];

/// A sentence found by [`Tokenizer::sentences`].
#[derive(Clone, Debug, PartialEq)]
pub struct Sentence {
    /// The sentence, with its lines joined by single spaces.
    pub text: String,
    /// Did the sentence end with `.`, `!` or `?`?
    pub terminated: bool,
}

/// Splits text into words and sentences.
///
/// Build one of these at startup and share it; the regexes are compiled in
/// [`Tokenizer::new`].
#[derive(Clone, Debug)]
pub struct Tokenizer {
    /// A word (possibly with inner hyphens, apostrophes or periods), or a
    /// single punctuation character.
    token: Regex,
    /// `n't` contractions.
    negation: Regex,
    /// `'s`, `'re`, `'ve`, `'ll`, `'m` and `'d` contractions.
    clitic: Regex,
    /// Blank lines between paragraphs.
    paragraph_break: Regex,
    /// Sentence-ending punctuation, with any closing quotes or brackets, and
    /// the whitespace after it.
    sentence_end: Regex,
    /// Words used for summarization: alphabetic, with inner `'` or `-`.
    summary_word: Regex,
}

impl Tokenizer {
    /// Compile our regexes.
    pub fn new() -> Result<Self> {
        Ok(Self {
            token: Regex::new(r"\w+(?:[-'’.]\w+)*|[^\w\s]")?,
            negation: Regex::new(r"(?i)^(\w+)(n['’]t)$")?,
            clitic: Regex::new(r"(?i)^(\w.*?)(['’](?:s|re|ve|ll|m|d))$")?,
            paragraph_break: Regex::new(r"\n[ \t\r\x0c]*\n")?,
            sentence_end: Regex::new(r#"[.!?]+["'’”)\]]*(?:\s+|$)"#)?,
            summary_word: Regex::new(r"^[^\W\d_](?:[^\W\d_]|['’-])*$")?,
        })
    }

    /// Split `text` into word and punctuation tokens, in order.
    pub fn words<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let mut tokens = Vec::new();
        for m in self.token.find_iter(text) {
            let token = m.as_str();
            let split = self
                .negation
                .captures(token)
                .or_else(|| self.clitic.captures(token));
            match split {
                Some(caps) => {
                    let (_, [stem, suffix]) = caps.extract();
                    tokens.push(stem);
                    tokens.push(suffix);
                }
                None => tokens.push(token),
            }
        }
        tokens
    }

    /// Alphabetic tokens, lower-cased. Everything else (punctuation, numbers,
    /// hyphenated words, contraction suffixes) is dropped.
    pub fn alphabetic_words(&self, text: &str) -> Vec<String> {
        self.words(text)
            .into_iter()
            .filter(|token| is_alphabetic(token))
            .map(|token| token.to_lowercase())
            .collect()
    }

    /// Lower-cased words used to compare sentences when summarizing. Unlike
    /// [`Self::alphabetic_words`], these may contain `'` or `-`.
    pub fn summary_words(&self, sentence: &str) -> Vec<String> {
        self.words(sentence)
            .into_iter()
            .filter(|token| self.summary_word.is_match(token))
            .map(|token| token.to_lowercase())
            .collect()
    }

    /// Split `text` into sentences.
    ///
    /// Paragraphs are separated by blank lines; the lines of a paragraph are
    /// joined with spaces. A sentence ends at `.`, `!` or `?` followed by
    /// whitespace or the end of the paragraph, except after a few common
    /// abbreviations and single-letter initials. Text after the last
    /// terminator of a paragraph is a sentence of its own.
    ///
    /// All-caps lines (like an OCR'd `INTRODUCTION`) are headings, and are
    /// left out.
    pub fn sentences(&self, text: &str) -> Vec<Sentence> {
        let mut sentences = Vec::new();
        for paragraph in self.paragraph_break.split(text) {
            let paragraph = paragraph
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !is_heading(line))
                .collect::<Vec<_>>()
                .join(" ");
            let mut start = 0;
            for m in self.sentence_end.find_iter(&paragraph) {
                let punctuation = m.as_str().trim_end();
                if punctuation == "." && ends_with_abbreviation(&paragraph[start..m.start()]) {
                    continue;
                }
                let sentence = paragraph[start..m.end()].trim();
                if !sentence.is_empty() {
                    sentences.push(Sentence {
                        text: sentence.to_owned(),
                        terminated: true,
                    });
                }
                start = m.end();
            }
            let rest = paragraph[start..].trim();
            if !rest.is_empty() {
                sentences.push(Sentence {
                    text: rest.to_owned(),
                    terminated: false,
                });
            }
        }
        sentences
    }
}

/// Is every character of a non-empty token alphabetic?
fn is_alphabetic(token: &str) -> bool {
    !token.is_empty() && token.chars().all(char::is_alphabetic)
}

/// Is this line a heading? It must have a cased letter, and no lower-case
/// ones.
fn is_heading(line: &str) -> bool {
    line.chars().any(char::is_uppercase) && !line.chars().any(char::is_lowercase)
}

/// Does `text` end with a word that a period doesn't terminate?
fn ends_with_abbreviation(text: &str) -> bool {
    let Some(word) = text.split_whitespace().last() else {
        return false;
    };
    let word = word.trim_start_matches(|c: char| !c.is_alphanumeric());
    let mut chars = word.chars();
    if let (Some(first), None) = (chars.next(), chars.next()) {
        // An initial, as in "J. R. R. Tolkien".
        return first.is_uppercase();
    }
    ABBREVIATIONS.contains(&word.to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenizer() -> Tokenizer {
        Tokenizer::new().unwrap()
    }

    #[test]
    fn splits_punctuation_into_tokens() {
        assert_eq!(
            tokenizer().words("Hello world. Hello again."),
            vec!["Hello", "world", ".", "Hello", "again", "."]
        );
        assert_eq!(
            tokenizer().words("(quoted), \"really\"?"),
            vec!["(", "quoted", ")", ",", "\"", "really", "\"", "?"]
        );
    }

    #[test]
    fn keeps_hyphenated_words_and_numbers_whole() {
        assert_eq!(
            tokenizer().words("A well-known fact costs 3.50 today"),
            vec!["A", "well-known", "fact", "costs", "3.50", "today"]
        );
    }

    #[test]
    fn splits_contractions() {
        assert_eq!(
            tokenizer().words("Don't panic, it's Bob's car and we'll go"),
            vec![
                "Do", "n't", "panic", ",", "it", "'s", "Bob", "'s", "car", "and", "we",
                "'ll", "go"
            ]
        );
        assert_eq!(tokenizer().words("can't"), vec!["ca", "n't"]);
    }

    #[test]
    fn alphabetic_words_are_lower_cased_and_filtered() {
        assert_eq!(
            tokenizer().alphabetic_words("The 2 well-known Cafés don't close."),
            vec!["the", "cafés", "do", "close"]
        );
        assert!(tokenizer().alphabetic_words("").is_empty());
        assert!(tokenizer().alphabetic_words("123 ... 4.5").is_empty());
    }

    #[test]
    fn summary_words_allow_inner_hyphens() {
        assert_eq!(
            tokenizer().summary_words("A well-known fact, 42 times."),
            vec!["a", "well-known", "fact", "times"]
        );
    }

    #[test]
    fn splits_sentences() {
        let sentences = tokenizer().sentences("Hello world. Hello again!  Is it you?");
        let texts = sentences.iter().map(|s| s.text.as_str()).collect::<Vec<_>>();
        assert_eq!(texts, vec!["Hello world.", "Hello again!", "Is it you?"]);
        assert!(sentences.iter().all(|s| s.terminated));
    }

    #[test]
    fn sentences_respect_paragraphs_and_line_breaks() {
        let text = "A heading without a period\n\nFirst line\ncontinues here. Then\nmore";
        let sentences = tokenizer().sentences(text);
        assert_eq!(
            sentences,
            vec![
                Sentence {
                    text: "A heading without a period".to_owned(),
                    terminated: false,
                },
                Sentence {
                    text: "First line continues here.".to_owned(),
                    terminated: true,
                },
                Sentence {
                    text: "Then more".to_owned(),
                    terminated: false,
                },
            ]
        );
    }

    #[test]
    fn all_caps_lines_are_headings() {
        let text =
            "INTRODUCTION\n\nThe study began in May.\nSECTION 2: RESULTS\nIt ended in June.";
        let sentences = tokenizer().sentences(text);
        let texts = sentences.iter().map(|s| s.text.as_str()).collect::<Vec<_>>();
        assert_eq!(texts, vec!["The study began in May.", "It ended in June."]);
        assert!(tokenizer().sentences("NOTICE\n\nTO ALL STAFF").is_empty());
        assert!(!is_heading("Results for Q3"));
        assert!(is_heading("Q3 2024 REPORT"));
        assert!(!is_heading("1932"));
    }

    #[test]
    fn abbreviations_and_initials_do_not_end_sentences() {
        let text = "Dr. Smith met J. R. Tolkien. They talked (briefly.) Then left.";
        let sentences = tokenizer().sentences(text);
        let texts = sentences.iter().map(|s| s.text.as_str()).collect::<Vec<_>>();
        assert_eq!(
            texts,
            vec![
                "Dr. Smith met J. R. Tolkien.",
                "They talked (briefly.)",
                "Then left."
            ]
        );
    }

    #[test]
    fn decimals_do_not_end_sentences() {
        let sentences = tokenizer().sentences("Pi is 3.14 roughly. Yes.");
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].text, "Pi is 3.14 roughly.");
    }

    #[test]
    fn no_sentences_in_blank_text() {
        assert!(tokenizer().sentences("").is_empty());
        assert!(tokenizer().sentences(" \n\n\t ").is_empty());
    }
}
