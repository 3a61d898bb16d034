//! Settings: built-in defaults, an optional TOML settings file, and
//! command-line overrides, in increasing order of precedence.

use clap::Args;
use toml_span::{DeserError, Deserialize as TomlDeserialize, de_helpers::TableHelper};

use crate::prelude::*;

/// How many sentences go into a summary by default.
pub const DEFAULT_SUMMARY_SENTENCES: usize = 3;

/// How many keywords we report by default.
pub const DEFAULT_TOP_WORDS: usize = 5;

/// Average adult silent reading speed.
pub const DEFAULT_WORDS_PER_MINUTE: u32 = 200;

/// Default `tesseract` language pack.
pub const DEFAULT_OCR_LANGUAGE: &str = "eng";

/// Fully-resolved settings for one run.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    /// Maximum number of sentences in the summary.
    pub summary_sentences: usize,
    /// Maximum number of keywords to report.
    pub top_words: usize,
    /// Reading speed used for the reading time estimate.
    pub words_per_minute: u32,
    /// Language passed to `tesseract -l`.
    pub ocr_language: String,
    /// Only extract this many PDF pages.
    pub max_pages: Option<usize>,
    /// Words to ignore in addition to the built-in English stopwords.
    pub extra_stopwords: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            summary_sentences: DEFAULT_SUMMARY_SENTENCES,
            top_words: DEFAULT_TOP_WORDS,
            words_per_minute: DEFAULT_WORDS_PER_MINUTE,
            ocr_language: DEFAULT_OCR_LANGUAGE.to_owned(),
            max_pages: None,
            extra_stopwords: vec![],
        }
    }
}

impl Settings {
    /// Resolve settings from defaults, `args.config` (if any) and `args`.
    #[instrument(level = "debug", skip_all)]
    pub async fn load(args: &SettingsArgs) -> Result<Self> {
        let mut settings = Settings::default();
        if let Some(path) = &args.config {
            let file = SettingsFile::read(path).await?;
            settings.apply_file(file);
        }
        settings.apply_args(args);
        settings.validate()?;
        debug!(?settings, "Resolved settings");
        Ok(settings)
    }

    fn apply_file(&mut self, file: SettingsFile) {
        if let Some(sentences) = file.sentences {
            self.summary_sentences = sentences as usize;
        }
        if let Some(top_words) = file.top_words {
            self.top_words = top_words as usize;
        }
        if let Some(wpm) = file.words_per_minute {
            self.words_per_minute = wpm;
        }
        if let Some(lang) = file.ocr_language {
            self.ocr_language = lang;
        }
        if let Some(max_pages) = file.max_pages {
            self.max_pages = Some(max_pages as usize);
        }
        self.extra_stopwords.extend(file.extra_stopwords);
    }

    fn apply_args(&mut self, args: &SettingsArgs) {
        if let Some(sentences) = args.sentences {
            self.summary_sentences = sentences;
        }
        if let Some(top_words) = args.top_words {
            self.top_words = top_words;
        }
        if let Some(wpm) = args.words_per_minute {
            self.words_per_minute = wpm;
        }
        if let Some(lang) = &args.ocr_language {
            self.ocr_language = lang.clone();
        }
        if args.max_pages.is_some() {
            self.max_pages = args.max_pages;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.summary_sentences == 0 {
            bail!("sentences must be at least 1");
        }
        if self.top_words == 0 {
            bail!("top_words must be at least 1");
        }
        if self.words_per_minute == 0 {
            bail!("words_per_minute must be at least 1");
        }
        if self.max_pages == Some(0) {
            bail!("max_pages must be at least 1");
        }
        if self.ocr_language.trim().is_empty() {
            bail!("ocr_language must not be empty");
        }
        Ok(())
    }
}

/// Command-line settings shared by the subcommands that read documents.
#[derive(Args, Clone, Debug, Default)]
pub struct SettingsArgs {
    /// A TOML settings file. Command-line flags override its values.
    #[clap(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Maximum number of sentences in the summary [default: 3].
    #[clap(long)]
    pub sentences: Option<usize>,

    /// Number of keywords to report [default: 5].
    #[clap(long)]
    pub top_words: Option<usize>,

    /// Reading speed for the reading time estimate [default: 200].
    #[clap(long)]
    pub words_per_minute: Option<u32>,

    /// Tesseract language for OCR, such as `eng` or `eng+fra` [default: eng].
    #[clap(long)]
    pub ocr_language: Option<String>,

    /// Only extract the first N pages of a PDF.
    #[clap(long)]
    pub max_pages: Option<usize>,
}

/// The contents of a settings file. Every key is optional.
#[derive(Debug, Default, PartialEq)]
struct SettingsFile {
    sentences: Option<u32>,
    top_words: Option<u32>,
    words_per_minute: Option<u32>,
    ocr_language: Option<String>,
    max_pages: Option<u32>,
    extra_stopwords: Vec<String>,
}

impl SettingsFile {
    async fn read(path: &Path) -> Result<Self> {
        let data = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("cannot read settings file {:?}", path.display()))?;
        Self::parse(&data).map_err(|err| {
            anyhow!(
                "invalid settings file {:?}:\n{}",
                path.display(),
                describe_deser_error(&data, &err)
            )
        })
    }

    fn parse(data: &str) -> Result<Self, DeserError> {
        let mut value = toml_span::de::parse(data)?;
        Self::deserialize(&mut value)
    }
}

impl<'de> TomlDeserialize<'de> for SettingsFile {
    fn deserialize(value: &mut toml_span::Value<'de>) -> Result<Self, DeserError> {
        let mut th = TableHelper::new(value)?;
        let sentences = th.optional("sentences");
        let top_words = th.optional("top_words");
        let words_per_minute = th.optional("words_per_minute");
        let ocr_language = th.optional("ocr_language");
        let max_pages = th.optional("max_pages");
        let extra_stopwords = th.optional("extra_stopwords").unwrap_or_default();
        th.finalize(None)?;
        Ok(Self {
            sentences,
            top_words,
            words_per_minute,
            ocr_language,
            max_pages,
            extra_stopwords,
        })
    }
}

/// Describe each TOML error with a 1-based `line:column` position.
fn describe_deser_error(source: &str, err: &DeserError) -> String {
    err.errors
        .iter()
        .map(|error| {
            let (line, column) = line_and_column(source, error.span.start);
            format!("  {}:{}: {}", line, column, error)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn line_and_column(source: &str, offset: usize) -> (usize, usize) {
    let before = &source[..offset.min(source.len())];
    let line = before.matches('\n').count() + 1;
    let column = before
        .rsplit('\n')
        .next()
        .map(|l| l.chars().count())
        .unwrap_or(0)
        + 1;
    (line, column)
}
