use std::{process::ExitCode, str::FromStr};

use clap::{Parser, Subcommand};
use tracing_subscriber::{
    EnvFilter, Layer as _, filter::Directive, fmt::format::FmtSpan, layer::SubscriberExt,
    util::SubscriberInitExt as _,
};

use self::{prelude::*, ui::Ui};

mod cmd;
mod config;
mod extract;
mod nlp;
mod output;
mod pipeline;
mod prelude;
mod process;
mod report;
mod ui;

/// Extract text from documents and images, and report word statistics,
/// keywords and a short summary.
#[derive(Debug, Parser)]
#[clap(
    version,
    author,
    after_help = r#"
External tools:
  - tesseract: OCR for .png, .jpg and .jpeg files.
  - pdftotext, pdfinfo (poppler-utils): text from .pdf files.

Environment Variables:
  - RUST_LOG (optional): Log filter, such as `debug` or `doc_insight=trace`.
    Defaults to `warn`.

  These variables may be set in a standard `.env` file.
"#
)]
struct Opts {
    #[clap(subcommand)]
    subcmd: Cmd,
}

/// The subcommands we support.
#[derive(Debug, Subcommand)]
enum Cmd {
    /// Analyze a document: word count, reading time, keywords and summary.
    Analyze(cmd::analyze::AnalyzeOpts),
    /// Print the text we extract from a document, without analyzing it.
    Extract(cmd::extract::ExtractOpts),
    /// Print schemas for output formats.
    Schema(cmd::schema::SchemaOpts),
}

impl Cmd {
    /// Does this subcommand do enough work to need a spinner?
    fn shows_progress(&self) -> bool {
        match self {
            Cmd::Analyze(opts) => opts.path.is_some(),
            Cmd::Extract(_) => true,
            Cmd::Schema(_) => false,
        }
    }
}

/// Our entry point, which can return an error. [`anyhow::Result`] will
/// automatically print a nice error message with optional backtrace.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    // Load environment variables from a `.env` file, if it exists, so that it
    // can set `RUST_LOG`.
    dotenvy::dotenv().ok();

    let ui = Ui::init();

    // Initialize tracing.
    let directive =
        Directive::from_str("warn").expect("built-in directive should be valid");
    let env_filter = EnvFilter::builder()
        .with_default_directive(directive)
        .from_env_lossy();

    let subscriber = tracing_subscriber::fmt::layer()
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(ui.get_stderr_writer())
        .with_filter(env_filter);

    tracing_subscriber::registry().with(subscriber).init();

    // Call our real `main` function now that logging is set up.
    real_main(ui).await
}

/// Our real entry point.
#[instrument(level = "debug", name = "main", skip_all)]
async fn real_main(ui: Ui) -> Result<ExitCode> {
    // Parse command-line arguments.
    let opts = Opts::parse();
    debug!("Parsed options: {:?}", opts);

    if !opts.subcmd.shows_progress() {
        ui.hide_progress_bars();
    }

    // Run the appropriate subcommand.
    match &opts.subcmd {
        Cmd::Analyze(analyze_opts) => cmd::analyze::cmd_analyze(&ui, analyze_opts).await,
        Cmd::Extract(extract_opts) => {
            cmd::extract::cmd_extract(&ui, extract_opts).await?;
            Ok(ExitCode::SUCCESS)
        }
        Cmd::Schema(schema_opts) => {
            cmd::schema::cmd_schema(schema_opts).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
