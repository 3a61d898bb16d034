//! Reading `.docx` files.
//!
//! A `.docx` file is a ZIP archive. The body text lives in
//! `word/document.xml`, as `w:p` paragraphs containing `w:r` runs containing
//! `w:t` text. We return the body's top-level paragraphs, one per line, which
//! leaves out tables, headers, footers and text boxes.

use std::io::{Cursor, Read as _};

use quick_xml::events::{BytesStart, Event};
use zip::ZipArchive;

use crate::prelude::*;

/// The ZIP entry holding the main document body.
const DOCUMENT_XML: &str = "word/document.xml";

/// Maximum decompressed bytes to read from the document entry (zip-bomb
/// protection).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// Extract the paragraphs of a `.docx` file, joined with newlines.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn extract_docx(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("cannot read {:?}", path.display()))?;
    let xml = read_document_xml(&bytes)
        .with_context(|| format!("cannot open {:?} as a .docx file", path.display()))?;
    let paragraphs = body_paragraphs(&xml)
        .with_context(|| format!("cannot parse {} in {:?}", DOCUMENT_XML, path.display()))?;
    debug!(paragraphs = paragraphs.len(), "Read .docx paragraphs");
    Ok(paragraphs.join("\n"))
}

/// Read `word/document.xml` out of the archive.
fn read_document_xml(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).context("not a ZIP archive")?;
    let entry = archive
        .by_name(DOCUMENT_XML)
        .with_context(|| format!("{} not found", DOCUMENT_XML))?;
    let mut xml = Vec::new();
    entry
        .take(MAX_XML_ENTRY_BYTES)
        .read_to_end(&mut xml)
        .with_context(|| format!("cannot decompress {}", DOCUMENT_XML))?;
    if xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
        bail!(
            "{} exceeds size limit ({} bytes)",
            DOCUMENT_XML,
            MAX_XML_ENTRY_BYTES
        );
    }
    Ok(xml)
}

/// A top-level paragraph we are in the middle of reading.
#[derive(Default)]
struct OpenParagraph {
    text: String,
    /// How many `w:p` elements deep we are inside this paragraph. Text boxes
    /// nest whole paragraphs inside runs, and we skip those.
    nested: usize,
    /// Are we inside a `w:t` element that belongs to this paragraph?
    in_text: bool,
}

/// Return the text of each `w:p` that is a direct child of `w:body`, in
/// document order.
///
/// Within a paragraph, `w:t` text is concatenated, `w:tab` becomes a tab and
/// `w:cr` and text-wrapping `w:br` become newlines. Page and column breaks
/// add nothing.
fn body_paragraphs(xml: &[u8]) -> Result<Vec<String>> {
    let mut reader = quick_xml::Reader::from_reader(xml);
    let mut buf = Vec::new();
    // Local names of the elements we're inside.
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut current: Option<OpenParagraph> = None;
    let mut paragraphs = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                if let Some(para) = current.as_mut() {
                    match name.as_slice() {
                        b"p" => para.nested += 1,
                        b"t" if para.nested == 0 => para.in_text = true,
                        _ => {}
                    }
                } else if name == b"p" && is_body(&stack) {
                    current = Some(OpenParagraph::default());
                }
                stack.push(name);
            }
            Event::Empty(e) => {
                let name = e.local_name();
                if let Some(para) = current.as_mut() {
                    if para.nested == 0 {
                        match name.as_ref() {
                            b"tab" => para.text.push('\t'),
                            b"br" if is_line_break(&e) => para.text.push('\n'),
                            b"cr" => para.text.push('\n'),
                            _ => {}
                        }
                    }
                } else if name.as_ref() == b"p" && is_body(&stack) {
                    paragraphs.push(String::new());
                }
            }
            Event::Text(e) => {
                if let Some(para) = current.as_mut()
                    && para.in_text
                {
                    para.text.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if let Some(para) = current.as_mut()
                    && para.in_text
                {
                    para.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(e) => {
                stack.pop();
                let finished = match current.as_mut() {
                    Some(para) => match e.local_name().as_ref() {
                        b"p" if para.nested > 0 => {
                            para.nested -= 1;
                            false
                        }
                        b"p" => true,
                        b"t" => {
                            para.in_text = false;
                            false
                        }
                        _ => false,
                    },
                    None => false,
                };
                if finished && let Some(para) = current.take() {
                    paragraphs.push(para.text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(paragraphs)
}

/// Is this `w:br` a line break? `w:type="page"` and `w:type="column"` are
/// not.
fn is_line_break(br: &BytesStart<'_>) -> bool {
    !br.attributes().flatten().any(|attr| {
        attr.key.local_name().as_ref() == b"type"
            && matches!(attr.value.as_ref(), b"page" | b"column")
    })
}

/// Is the innermost open element `w:body`?
fn is_body(stack: &[Vec<u8>]) -> bool {
    stack.last().is_some_and(|name| name == b"body")
}
