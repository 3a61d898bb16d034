//! Text analysis: word statistics, keywords and extractive summaries.
//!
//! Everything here is pure computation over strings. The tokenizer and the
//! stopword list are built once, up front, and only read afterwards.

pub mod lexical;
pub mod lsa;
pub mod stopwords;
pub mod summarize;
pub mod tokenize;

pub use self::{
    lexical::{AnalysisResult, Keyword, LexicalAnalyzer},
    stopwords::StopWords,
    summarize::{Summarizer, Summary},
    tokenize::Tokenizer,
};
