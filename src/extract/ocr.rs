//! OCR engine interface, and the `tesseract` engine.

use tokio::process::Command;

use crate::{
    prelude::*,
    process::{check_for_command_failure, run_command},
};

/// Interface for recognizing the text in an image file.
#[async_trait]
pub trait OcrEngine: Send + Sync + 'static {
    /// Return the best-effort text of the image at `path`.
    async fn image_to_string(&self, path: &Path) -> Result<String>;
}

/// OCR engine wrapping the `tesseract` CLI tool.
#[non_exhaustive]
pub struct TesseractOcrEngine {
    /// The language pack(s) to use, such as `eng` or `eng+deu`.
    language: String,
}

impl TesseractOcrEngine {
    /// Create a new `tesseract` engine.
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractOcrEngine {
    #[instrument(level = "debug", skip_all, fields(path = %path.display(), lang = %self.language))]
    async fn image_to_string(&self, path: &Path) -> Result<String> {
        // Tesseract insists on writing `{base}.txt` itself.
        let tmpdir = tempfile::TempDir::with_prefix("tesseract")?;
        let output_base = tmpdir.path().join("output");
        let output_path = output_base.with_extension("txt");

        let mut cmd = Command::new("tesseract");
        cmd.arg(path)
            .arg(&output_base)
            .arg("-l")
            .arg(&self.language);
        let output = run_command("tesseract", &mut cmd).await?;
        check_for_command_failure("tesseract", &output, None)?;

        let text = tokio::fs::read_to_string(&output_path)
            .await
            .context("cannot read tesseract output file")?;
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "Requires tesseract to be installed"]
    async fn missing_image_is_an_error() {
        let engine = TesseractOcrEngine::new("eng");
        let result = engine
            .image_to_string(Path::new("/definitely/not/here.png"))
            .await;
        assert!(result.is_err());
    }
}
