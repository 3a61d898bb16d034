//! The `extract` subcommand.

use std::sync::Arc;

use clap::Args;

use crate::{
    config::{Settings, SettingsArgs},
    extract::ocr::TesseractOcrEngine,
    output::write_output,
    pipeline::Pipeline,
    prelude::*,
    ui::{ProgressConfig, Ui},
};

/// Extract command line arguments.
#[derive(Debug, Args)]
pub struct ExtractOpts {
    /// The document or image to read.
    pub path: PathBuf,

    #[clap(flatten)]
    pub settings: SettingsArgs,

    /// The output path to write the text to.
    #[clap(short = 'o', long = "out")]
    pub output_path: Option<PathBuf>,
}

/// The `extract` subcommand.
#[instrument(level = "debug", skip_all, fields(path = %opts.path.display()))]
pub async fn cmd_extract(ui: &Ui, opts: &ExtractOpts) -> Result<()> {
    let settings = Settings::load(&opts.settings).await?;
    let ocr = Arc::new(TesseractOcrEngine::new(settings.ocr_language.clone()));
    let pipeline = Pipeline::new(&settings, ocr)?;

    let text = ui
        .with_spinner(&ProgressConfig::EXTRACTING, pipeline.extract(&opts.path))
        .await
        .with_context(|| format!("cannot extract text from {:?}", opts.path.display()))?;
    write_output(opts.output_path.as_deref(), &text).await
}
