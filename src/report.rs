//! The human-readable report.

use std::fmt;

use crate::nlp::{AnalysisResult, Keyword, Summary};

/// Everything we found out about a document.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    pub analysis: AnalysisResult,
    pub summary: Summary,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_report(&self.analysis, &self.summary))
    }
}

/// Format the analysis and summary of a document for display.
pub fn format_report(analysis: &AnalysisResult, summary: &Summary) -> String {
    // `{:?}` always shows a fractional part, so we print `0.0`, not `0`.
    format!(
        "📊 Document Analysis:\n\
         - Word Count: {}\n\
         - Character Count: {}\n\
         - Estimated Reading Time (min): {:?}\n\
         - Top Words: {}\n\
         \n\
         📝 Summary:\n\
         {}",
        analysis.word_count,
        analysis.char_count,
        analysis.reading_time_minutes,
        format_keywords(&analysis.top_keywords),
        summary,
    )
}

/// `word (count), word (count), ...`
fn format_keywords(keywords: &[Keyword]) -> String {
    keywords
        .iter()
        .map(|k| format!("{} ({})", k.word, k.count))
        .collect::<Vec<_>>()
        .join(", ")
}
