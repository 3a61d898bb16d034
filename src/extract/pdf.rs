//! Reading `.pdf` files with poppler's `pdftotext`.
//!
//! This only finds "searchable" text. Scanned pages without a text layer come
//! back empty; we don't rasterize and OCR them.

use std::{collections::BTreeMap, sync::LazyLock};

use regex::Regex;
use tokio::process::Command;

use crate::{
    prelude::*,
    process::{check_for_command_failure, run_command},
};

/// Lines of poppler output that mean something actually went wrong.
static ERROR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)error").expect("failed to compile regex"));

/// Poppler complains about this, but recovers fine.
static DOWNGRADE_TO_WARNING_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)error: xref num").expect("failed to compile regex")
});

/// Does this line contain an error?
fn is_error_line(line: &str) -> bool {
    ERROR_REGEX.is_match(line) && !DOWNGRADE_TO_WARNING_REGEX.is_match(line)
}

/// `pdftotext` ends every page with a form feed.
const PAGE_SEPARATOR: char = '\x0c';

/// Extract the text of each page, in page order, concatenated without any
/// separator.
///
/// If `max_pages` is set, only that many pages are extracted.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn extract_pdf(path: &Path, max_pages: Option<usize>) -> Result<String> {
    let mut cmd = Command::new("pdftotext");
    cmd.arg("-enc").arg("UTF-8");
    if let Some(max_pages) = max_pages {
        let total_pages = get_pdf_page_count(path).await?;
        if total_pages > max_pages {
            warn!(
                "only extracting {}/{} pages of {:?} (because of --max-pages)",
                max_pages,
                total_pages,
                path.display()
            );
            // Poppler page numbers are 1-based and the range is inclusive.
            cmd.arg("-l").arg(max_pages.to_string());
        }
    }
    // Write the text to standard output.
    cmd.arg(path).arg("-");

    let output = run_command("pdftotext", &mut cmd).await?;
    check_for_command_failure("pdftotext", &output, Some(&is_error_line))?;
    let raw = String::from_utf8(output.stdout)
        .context("pdftotext output was not valid UTF-8")?;
    let pages = split_pages(&raw);
    debug!(pages = pages.len(), "Extracted PDF pages");
    Ok(pages.concat())
}

/// Split `pdftotext` output into pages.
fn split_pages(raw: &str) -> Vec<&str> {
    let mut pages = raw.split(PAGE_SEPARATOR).collect::<Vec<_>>();
    // The final form feed is a terminator, not a separator.
    if pages.len() > 1 && pages.last().is_some_and(|page| page.is_empty()) {
        pages.pop();
    }
    pages
}

/// Get the number of pages in a PDF file.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn get_pdf_page_count(path: &Path) -> Result<usize> {
    // Run pdfinfo to get the number of pages.
    let mut cmd = Command::new("pdfinfo");
    cmd.arg(path);
    let output = run_command("pdfinfo", &mut cmd).await?;
    check_for_command_failure("pdfinfo", &output, None)?;

    // Parse the output of pdfinfo into properties.
    let output =
        String::from_utf8(output.stdout).context("pdfinfo output was not valid UTF-8")?;
    let properties = parse_pdfinfo(&output);

    // Get the number of pages from the properties.
    let page_count_str = properties
        .get("Pages")
        .ok_or_else(|| anyhow!("failed to find page count in pdfinfo output"))?;
    page_count_str.parse::<usize>().with_context(|| {
        format!(
            "failed to parse page count for {:?} from pdfinfo output",
            path.display()
        )
    })
}

/// Parse `Key: value` lines.
fn parse_pdfinfo(output: &str) -> BTreeMap<&str, &str> {
    output
        .lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim(), value.trim()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A one-page PDF containing the text "Searchable PDF text." with a
    /// correct cross-reference table.
    fn minimal_pdf() -> Vec<u8> {
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_owned(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_owned(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R \
             /Resources << /Font << /F1 5 0 R >> >> >>"
                .to_owned(),
            {
                let stream = "BT /F1 12 Tf 72 700 Td (Searchable PDF text.) Tj ET";
                format!("<< /Length {} >>\nstream\n{}\nendstream", stream.len(), stream)
            },
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_owned(),
        ];
        let mut out = b"%PDF-1.4\n".to_vec();
        let mut offsets = vec![];
        for (idx, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(
                format!("{} 0 obj\n{}\nendobj\n", idx + 1, body).as_bytes(),
            );
        }
        let xref_start = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for offset in offsets {
            out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                objects.len() + 1,
                xref_start
            )
            .as_bytes(),
        );
        out
    }

    #[test]
    fn is_error_line_works() {
        assert!(is_error_line("error: something went wrong"));
        assert!(is_error_line("ERROR: something went wrong"));
        assert!(!is_error_line("Warning: something is odd"));
        assert!(!is_error_line(
            "Internal Error: xref num 1234 not found but needed, document has changes, reconstruct aborted"
        ));
    }

    #[test]
    fn pages_are_split_on_form_feeds() {
        assert_eq!(split_pages("one\n\x0ctwo\n\x0c"), vec!["one\n", "two\n"]);
        assert_eq!(split_pages("no separators"), vec!["no separators"]);
        assert_eq!(split_pages(""), vec![""]);
        assert_eq!(split_pages("\x0c\x0cthree\x0c"), vec!["", "", "three"]);
    }

    #[test]
    fn parses_pdfinfo_output() {
        let output = "Title:          Quarterly report\nPages:          12\nPage size:      612 x 792 pts (letter)\n";
        let properties = parse_pdfinfo(output);
        assert_eq!(properties.get("Pages"), Some(&"12"));
        assert_eq!(properties.get("Title"), Some(&"Quarterly report"));
        assert_eq!(
            properties.get("Page size"),
            Some(&"612 x 792 pts (letter)")
        );
    }

    #[tokio::test]
    #[ignore = "Requires poppler-utils to be installed"]
    async fn extracts_text_from_pdf() -> Result<()> {
        let dir = tempfile::TempDir::with_prefix("pdf")?;
        let path = dir.path().join("minimal.pdf");
        std::fs::write(&path, minimal_pdf())?;
        assert_eq!(get_pdf_page_count(&path).await?, 1);
        let text = extract_pdf(&path, Some(1)).await?;
        assert!(text.contains("Searchable PDF text."), "{text:?}");
        assert!(!text.contains(PAGE_SEPARATOR));
        Ok(())
    }

    #[tokio::test]
    #[ignore = "Requires poppler-utils to be installed"]
    async fn corrupt_pdf_is_an_error() -> Result<()> {
        let dir = tempfile::TempDir::with_prefix("pdf")?;
        let path = dir.path().join("corrupt.pdf");
        std::fs::write(&path, b"this is not a pdf")?;
        assert!(extract_pdf(&path, None).await.is_err());
        Ok(())
    }
}
