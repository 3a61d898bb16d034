//! The `analyze` subcommand.

use std::{process::ExitCode, sync::Arc};

use clap::{Args, ValueEnum};

use crate::{
    config::{Settings, SettingsArgs},
    extract::ocr::TesseractOcrEngine,
    output::write_output,
    pipeline::Pipeline,
    prelude::*,
    ui::{ProgressConfig, Ui},
};

/// Printed when we're not given a file.
pub const NO_FILE_SELECTED: &str = "No file selected!";

/// How to print our results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// A human-readable report.
    #[default]
    Text,
    /// A JSON object. Run `doc-insight schema Report` for the schema.
    Json,
}

/// Analyze command line arguments.
#[derive(Debug, Args)]
pub struct AnalyzeOpts {
    /// The document or image to analyze (.txt, .docx, .pdf, .png, .jpg or
    /// .jpeg).
    pub path: Option<PathBuf>,

    /// Output format.
    #[clap(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[clap(flatten)]
    pub settings: SettingsArgs,

    /// The output path to write the report to.
    #[clap(short = 'o', long = "out")]
    pub output_path: Option<PathBuf>,
}

/// The `analyze` subcommand.
///
/// Failed analyses print an `Error analyzing file: ...` message and give a
/// failing exit code. Only problems with our own setup (bad settings,
/// unwritable output) are returned as errors.
#[instrument(level = "debug", skip_all)]
pub async fn cmd_analyze(ui: &Ui, opts: &AnalyzeOpts) -> Result<ExitCode> {
    let Some(path) = opts.path.as_deref() else {
        write_output(opts.output_path.as_deref(), NO_FILE_SELECTED).await?;
        return Ok(ExitCode::FAILURE);
    };

    let settings = Settings::load(&opts.settings).await?;
    let ocr = Arc::new(TesseractOcrEngine::new(settings.ocr_language.clone()));
    let pipeline = Pipeline::new(&settings, ocr)?;

    let outcome = ui
        .with_spinner(&ProgressConfig::ANALYZING, pipeline.analyze_file(path))
        .await;
    let output = match opts.format {
        OutputFormat::Text => outcome.to_string(),
        OutputFormat::Json => serde_json::to_string_pretty(&outcome.to_json(path))
            .context("failed to serialize report")?,
    };
    write_output(opts.output_path.as_deref(), &output).await?;

    if outcome.is_failure() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
