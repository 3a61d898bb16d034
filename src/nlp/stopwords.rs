//! English stopwords.

use std::collections::HashSet;

/// The NLTK English stopword list.
const ENGLISH: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're",
    "you've", "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he",
    "him", "his", "himself", "she", "she's", "her", "hers", "herself", "it", "it's",
    "its", "itself", "they", "them", "their", "theirs", "themselves", "what",
    "which", "who", "whom", "this", "that", "that'll", "these", "those", "am", "is",
    "are", "was", "were", "be", "been", "being", "have", "has", "had", "having",
    "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about",
    "against", "between", "into", "through", "during", "before", "after", "above",
    "below", "to", "from", "up", "down", "in", "out", "on", "off", "over", "under",
    "again", "further", "then", "once", "here", "there", "when", "where", "why",
    "how", "all", "any", "both", "each", "few", "more", "most", "other", "some",
    "such", "no", "nor", "not", "only", "own", "same", "so", "than", "too", "very",
    "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn",
    "couldn't", "didn", "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn",
    "hasn't", "haven", "haven't", "isn", "isn't", "ma", "mightn", "mightn't",
    "mustn", "mustn't", "needn", "needn't", "shan", "shan't", "shouldn",
    "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
    "wouldn't",
];

/// A set of lower-case words to leave out of keyword counts.
#[derive(Clone, Debug)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    /// The standard English list.
    pub fn english() -> Self {
        Self {
            words: ENGLISH.iter().map(|&w| w.to_owned()).collect(),
        }
    }

    /// Add more words. They are lower-cased and trimmed.
    pub fn with_extra<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.words.extend(
            extra
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty()),
        );
        self
    }

    /// Is `word` (already lower-cased) a stopword?
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Number of distinct stopwords.
    pub fn len(&self) -> usize {
        self.words.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_list_is_complete() {
        assert_eq!(StopWords::english().len(), 179);
    }

    #[test]
    fn common_words_are_stopwords() {
        let stopwords = StopWords::english();
        for word in ["the", "and", "again", "don't", "s"] {
            assert!(stopwords.contains(word), "{word}");
        }
        assert!(!stopwords.contains("hello"));
        assert!(!stopwords.contains("The"));
    }

    #[test]
    fn extra_words_are_normalized() {
        let stopwords = StopWords::english().with_extra([" Lorem ", "IPSUM", ""]);
        assert!(stopwords.contains("lorem"));
        assert!(stopwords.contains("ipsum"));
        assert_eq!(stopwords.len(), 181);
    }
}
