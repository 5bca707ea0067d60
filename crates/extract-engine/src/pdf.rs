//! PDF text-layer extraction via pdf-extract
//!
//! pdf-extract returns the whole text layer in one string with form
//! feeds between pages, so pages are split on `\x0C` and rejoined with
//! an explicit page marker. A PDF whose stripped text layer is shorter
//! than [`MIN_TEXT_CHARS`](crate::MIN_TEXT_CHARS) is treated as a
//! scanned document and rejected rather than returned near-empty.

use tracing::debug;

use crate::error::ExtractError;
use crate::MIN_TEXT_CHARS;

/// Extract the text layer of a PDF, one marker-delimited block per page.
pub fn extract_pdf_text(data: &[u8]) -> Result<String, ExtractError> {
    let text = pdf_extract::extract_text_from_mem(data)
        .map_err(|e| ExtractError::Read(e.to_string()))?;

    // Threshold check runs on the raw layer text, before page markers
    // are added.
    require_text_layer(&text)?;

    let page_count = match lopdf::Document::load_mem(data) {
        Ok(doc) => doc.get_pages().len(),
        Err(_) => 1,
    };
    debug!(page_count, "extracted PDF text layer");

    Ok(join_pages(&text))
}

/// Fail with `ScannedDocument` when the whitespace-stripped text layer
/// is below the minimum threshold.
pub(crate) fn require_text_layer(text: &str) -> Result<(), ExtractError> {
    let stripped = text.chars().filter(|c| !c.is_whitespace()).count();
    if stripped < MIN_TEXT_CHARS {
        return Err(ExtractError::ScannedDocument);
    }
    Ok(())
}

/// Concatenate per-page text with a page-delimiter marker.
pub(crate) fn join_pages(text: &str) -> String {
    text.split('\x0C')
        .enumerate()
        .map(|(i, page)| format!("--- Page {} ---\n{}", i + 1, page.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}
