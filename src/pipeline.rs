//! Extract, analyze, summarize and report, for one file.

use std::{fmt, sync::Arc};

use schemars::JsonSchema;

use crate::{
    config::Settings,
    extract::{DocumentKind, Extractor, ocr::OcrEngine},
    nlp::{AnalysisResult, LexicalAnalyzer, StopWords, Summarizer, Tokenizer},
    prelude::*,
    report::Report,
};

/// Shown when a file contains nothing but whitespace.
pub const NO_READABLE_TEXT: &str = "No readable text found in the file.";

/// What happened when we analyzed a file.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// We have a report.
    Report(Report),
    /// The file had no text. This is a normal outcome, not an error.
    NoReadableText,
    /// Something went wrong. Holds the full error chain.
    Failed(String),
}

impl Outcome {
    /// Should the process exit with a failure status?
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    /// Convert to our JSON output format.
    pub fn to_json(&self, path: &Path) -> JsonReport {
        let (status, analysis, summary, summary_error) = match self {
            Outcome::Report(report) => (
                Status::Report,
                Some(report.analysis.clone()),
                Some(report.summary.text().to_owned()),
                report.summary.fallback_reason().map(str::to_owned),
            ),
            Outcome::NoReadableText => (Status::NoReadableText, None, None, None),
            Outcome::Failed(_) => (Status::Failed, None, None, None),
        };
        JsonReport {
            path: path.to_owned(),
            kind: DocumentKind::from_path(path),
            status,
            message: self.to_string(),
            analysis,
            summary,
            summary_error,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Report(report) => write!(f, "{}", report),
            Outcome::NoReadableText => f.write_str(NO_READABLE_TEXT),
            Outcome::Failed(cause) => write!(f, "Error analyzing file: {}", cause),
        }
    }
}

/// How an analysis ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Report,
    NoReadableText,
    Failed,
}

/// The result of analyzing one file, as printed by `--format json`.
#[derive(Clone, Debug, PartialEq, Serialize, JsonSchema)]
pub struct JsonReport {
    /// The file we analyzed.
    pub path: PathBuf,
    /// The kind of document, based on its extension.
    pub kind: DocumentKind,
    /// How the analysis ended.
    pub status: Status,
    /// The text we would print with `--format text`.
    pub message: String,
    /// Word statistics and keywords, if we got that far.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisResult>,
    /// The summary, or the fallback text if we couldn't summarize.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Why we couldn't summarize, if we couldn't.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_error: Option<String>,
}

/// Our document analysis pipeline. Build one at startup, then call
/// [`Pipeline::analyze_file`] as often as you like.
pub struct Pipeline {
    extractor: Extractor,
    analyzer: LexicalAnalyzer,
    summarizer: Summarizer,
    summary_sentences: usize,
}

impl Pipeline {
    /// Create a new pipeline. Compiles our regexes and loads the stopwords.
    pub fn new(settings: &Settings, ocr: Arc<dyn OcrEngine>) -> Result<Self> {
        let tokenizer = Tokenizer::new().context("cannot build tokenizer")?;
        let stopwords = StopWords::english().with_extra(&settings.extra_stopwords);
        debug!(stopwords = stopwords.len(), "Loaded stopwords");
        Ok(Self {
            extractor: Extractor::new(ocr, settings.max_pages),
            analyzer: LexicalAnalyzer::new(
                tokenizer.clone(),
                stopwords,
                settings.top_words,
                settings.words_per_minute,
            ),
            summarizer: Summarizer::new(tokenizer),
            summary_sentences: settings.summary_sentences,
        })
    }

    /// Extract the text of `path` without analyzing it.
    pub async fn extract(&self, path: &Path) -> Result<String> {
        self.extractor.extract(path).await
    }

    /// Analyze `path`. Errors are reported as [`Outcome::Failed`].
    #[instrument(level = "debug", skip_all, fields(path = %path.display()))]
    pub async fn analyze_file(&self, path: &Path) -> Outcome {
        match self.extract(path).await {
            Ok(text) => self.analyze_text(&text),
            Err(err) => {
                debug!("analysis failed: {:?}", err);
                Outcome::Failed(format!("{:#}", err))
            }
        }
    }

    /// Analyze text we have already extracted.
    pub fn analyze_text(&self, text: &str) -> Outcome {
        if text.trim().is_empty() {
            return Outcome::NoReadableText;
        }
        let analysis = self.analyzer.analyze(text);
        let summary = self.summarizer.summarize(text, self.summary_sentences);
        Outcome::Report(Report { analysis, summary })
    }
}
