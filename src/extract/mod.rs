//! Turning documents and images into plain text.
//!
//! We dispatch on the file extension, never on content. Content sniffing is
//! only used to warn about files whose extension looks wrong.

use std::sync::Arc;

use schemars::JsonSchema;

use crate::prelude::*;

use self::ocr::OcrEngine;

pub mod docx;
pub mod ocr;
pub mod pdf;

/// The kinds of documents we know how to read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// `.txt`, read as UTF-8.
    PlainText,
    /// `.docx`, an Office Open XML word-processing document.
    WordProcessor,
    /// `.pdf`, read with poppler's `pdftotext`.
    Pdf,
    /// `.png`, `.jpg` or `.jpeg`, read with OCR.
    Image,
    /// Anything else. These produce no text.
    Unsupported,
}

impl DocumentKind {
    /// File extensions we support, without the leading dot.
    pub const SUPPORTED_EXTENSIONS: &'static [&'static str] =
        &["txt", "docx", "pdf", "png", "jpg", "jpeg"];

    /// Detect the kind of a document from its extension, ignoring case.
    pub fn from_path(path: &Path) -> Self {
        let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
            return DocumentKind::Unsupported;
        };
        match ext.to_ascii_lowercase().as_str() {
            "txt" => DocumentKind::PlainText,
            "docx" => DocumentKind::WordProcessor,
            "pdf" => DocumentKind::Pdf,
            "png" | "jpg" | "jpeg" => DocumentKind::Image,
            _ => DocumentKind::Unsupported,
        }
    }

    /// MIME types that `infer` may report for a correctly-named file of this
    /// kind.
    fn expected_mime_types(self) -> &'static [&'static str] {
        match self {
            DocumentKind::PlainText | DocumentKind::Unsupported => &[],
            DocumentKind::WordProcessor => &[
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                "application/zip",
            ],
            DocumentKind::Pdf => &["application/pdf"],
            DocumentKind::Image => &["image/png", "image/jpeg"],
        }
    }
}

/// Extracts text from a file, using the right reader for its [`DocumentKind`].
pub struct Extractor {
    /// Used for [`DocumentKind::Image`].
    ocr: Arc<dyn OcrEngine>,
    /// Passed to the PDF reader.
    max_pages: Option<usize>,
}

impl Extractor {
    /// Create a new extractor.
    pub fn new(ocr: Arc<dyn OcrEngine>, max_pages: Option<usize>) -> Self {
        Self { ocr, max_pages }
    }

    /// Extract the text of `path`.
    ///
    /// Unsupported extensions produce an empty string, not an error. Missing
    /// or unreadable files, and failing external tools, are errors.
    #[instrument(level = "debug", skip_all, fields(path = %path.display()))]
    pub async fn extract(&self, path: &Path) -> Result<String> {
        let kind = DocumentKind::from_path(path);
        debug!(?kind, "Detected document kind");
        warn_on_content_mismatch(path, kind);
        let text = match kind {
            DocumentKind::PlainText => read_plain_text(path).await?,
            DocumentKind::WordProcessor => docx::extract_docx(path).await?,
            DocumentKind::Pdf => pdf::extract_pdf(path, self.max_pages).await?,
            DocumentKind::Image => self.ocr.image_to_string(path).await?,
            DocumentKind::Unsupported => {
                warn!(
                    "unsupported file type {:?} (supported: .{})",
                    path.display(),
                    DocumentKind::SUPPORTED_EXTENSIONS.join(", .")
                );
                String::new()
            }
        };
        debug!(chars = text.chars().count(), "Extracted text");
        Ok(text)
    }
}

/// Read a UTF-8 text file, translating `\r\n` and `\r` line endings to `\n`.
async fn read_plain_text(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("cannot read {:?}", path.display()))?;
    let text = String::from_utf8(bytes)
        .with_context(|| format!("{:?} is not valid UTF-8 text", path.display()))?;
    if text.contains('\r') {
        Ok(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Ok(text)
    }
}

/// Log a warning if the file's magic bytes don't match its extension.
fn warn_on_content_mismatch(path: &Path, kind: DocumentKind) {
    if kind == DocumentKind::Unsupported {
        return;
    }
    // Unreadable files are reported properly by the reader itself.
    let Ok(Some(detected)) = infer::get_from_path(path) else {
        return;
    };
    let mime_type = detected.mime_type();
    if !kind.expected_mime_types().contains(&mime_type) {
        warn!(
            "{:?} looks like {} but will be read as {:?}",
            path.display(),
            mime_type,
            kind
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// OCR engine that never gets called.
    struct PanicOcrEngine;

    #[async_trait]
    impl OcrEngine for PanicOcrEngine {
        async fn image_to_string(&self, path: &Path) -> Result<String> {
            panic!("unexpected OCR of {:?}", path)
        }
    }

    /// OCR engine that reports the file name it was given.
    struct FileNameOcrEngine;

    #[async_trait]
    impl OcrEngine for FileNameOcrEngine {
        async fn image_to_string(&self, path: &Path) -> Result<String> {
            Ok(format!(
                "text of {}",
                path.file_name().unwrap_or_default().to_string_lossy()
            ))
        }
    }

    fn extractor(ocr: impl OcrEngine) -> Extractor {
        Extractor::new(Arc::new(ocr), None)
    }

    #[test]
    fn kind_from_path_ignores_case() {
        let cases = [
            ("notes.txt", DocumentKind::PlainText),
            ("NOTES.TXT", DocumentKind::PlainText),
            ("report.Docx", DocumentKind::WordProcessor),
            ("paper.PDF", DocumentKind::Pdf),
            ("scan.png", DocumentKind::Image),
            ("scan.JPG", DocumentKind::Image),
            ("scan.jpeg", DocumentKind::Image),
            ("scan.bmp", DocumentKind::Unsupported),
            ("README", DocumentKind::Unsupported),
            ("archive.tar.gz", DocumentKind::Unsupported),
        ];
        for (path, expected) in cases {
            assert_eq!(DocumentKind::from_path(Path::new(path)), expected, "{path}");
        }
    }

    #[tokio::test]
    async fn reads_plain_text_and_normalizes_newlines() -> Result<()> {
        let dir = tempfile::TempDir::with_prefix("extract")?;
        let path = dir.path().join("input.txt");
        std::fs::write(&path, "one\r\ntwo\rthree\n")?;
        let text = extractor(PanicOcrEngine).extract(&path).await?;
        assert_eq!(text, "one\ntwo\nthree\n");
        Ok(())
    }

    #[tokio::test]
    async fn missing_text_file_is_an_error() {
        let err = extractor(PanicOcrEngine)
            .extract(Path::new("/definitely/not/here.txt"))
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("cannot read"));
    }

    #[tokio::test]
    async fn invalid_utf8_is_an_error() -> Result<()> {
        let dir = tempfile::TempDir::with_prefix("extract")?;
        let path = dir.path().join("latin1.txt");
        std::fs::write(&path, b"caf\xe9")?;
        let err = extractor(PanicOcrEngine).extract(&path).await.unwrap_err();
        assert!(err.to_string().contains("not valid UTF-8"));
        Ok(())
    }

    #[tokio::test]
    async fn unsupported_extension_yields_empty_text() -> Result<()> {
        let dir = tempfile::TempDir::with_prefix("extract")?;
        let path = dir.path().join("picture.bmp");
        std::fs::write(&path, "BM not really a bitmap")?;
        let text = extractor(PanicOcrEngine).extract(&path).await?;
        assert_eq!(text, "");
        Ok(())
    }

    #[tokio::test]
    async fn unsupported_extension_does_not_need_the_file() -> Result<()> {
        let text = extractor(PanicOcrEngine)
            .extract(Path::new("/definitely/not/here.bmp"))
            .await?;
        assert_eq!(text, "");
        Ok(())
    }

    #[tokio::test]
    async fn images_go_to_the_ocr_engine() -> Result<()> {
        let text = extractor(FileNameOcrEngine)
            .extract(Path::new("/some/where/scan.JPEG"))
            .await?;
        assert_eq!(text, "text of scan.JPEG");
        Ok(())
    }
}
