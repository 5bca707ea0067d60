//! Text extraction for uploaded documents
//!
//! Routes an uploaded file to the right backend based on its declared
//! extension:
//!
//! - `.txt` / `.md` — read bytes as UTF-8
//! - `.pdf` — text layer via pdf-extract, with scanned-document detection
//! - `.jpg` / `.jpeg` / `.png` — OCR via the [`OcrEngine`] capability
//!
//! Anything else fails with `UnsupportedType` before any parsing library
//! is invoked. Failures are terminal for the attempt; the caller decides
//! how to surface them.

pub mod error;
pub mod ocr;
mod pdf;

pub use error::ExtractError;
pub use ocr::{OcrEngine, TrocrEngine};
pub use pdf::extract_pdf_text;

use review_types::{Document, DocumentKind};
use tracing::info;

/// Minimum number of non-whitespace characters a document must carry.
/// Shared by the scanned-PDF check and the manual-paste precondition.
pub const MIN_TEXT_CHARS: usize = 50;

/// File kinds accepted by the extractor, detected from the extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Plain,
    Pdf,
    Image,
}

fn detect(filename: &str) -> Result<FileKind, ExtractError> {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "txt" | "md" => Ok(FileKind::Plain),
        "pdf" => Ok(FileKind::Pdf),
        "jpg" | "jpeg" | "png" => Ok(FileKind::Image),
        _ => Err(ExtractError::UnsupportedType(filename.to_string())),
    }
}

/// Extraction front end holding the OCR backend.
pub struct Extractor {
    ocr: Box<dyn OcrEngine>,
}

impl Extractor {
    pub fn new(ocr: Box<dyn OcrEngine>) -> Self {
        Self { ocr }
    }

    /// Extract text from an uploaded file and produce a [`Document`].
    pub fn extract(&mut self, filename: &str, data: &[u8]) -> Result<Document, ExtractError> {
        let kind = detect(filename)?;

        let (text, doc_kind) = match kind {
            FileKind::Plain => {
                let text = String::from_utf8(data.to_vec())
                    .map_err(|e| ExtractError::Read(e.to_string()))?;
                (text, DocumentKind::Plain)
            }
            FileKind::Pdf => (extract_pdf_text(data)?, DocumentKind::Pdf),
            FileKind::Image => {
                let text = self
                    .ocr
                    .recognize(data)
                    .map_err(|e| ExtractError::Ocr(e.to_string()))?;
                (text, DocumentKind::Image)
            }
        };

        info!(
            filename,
            kind = ?doc_kind,
            chars = text.chars().count(),
            "document extracted"
        );
        Ok(Document::new(filename, text, doc_kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    /// OCR stub that never touches a model.
    struct FixedOcr(Result<String, String>);

    impl OcrEngine for FixedOcr {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn recognize(&mut self, _image_data: &[u8]) -> anyhow::Result<String> {
            match &self.0 {
                Ok(text) => Ok(text.clone()),
                Err(msg) => Err(anyhow::anyhow!(msg.clone())),
            }
        }
    }

    fn extractor() -> Extractor {
        Extractor::new(Box::new(FixedOcr(Ok("RECOGNIZED".to_string()))))
    }

    #[test]
    fn test_plain_text_round_trips() {
        let mut ex = extractor();
        let doc = ex.extract("contract.txt", "Exact   text\nwith lines".as_bytes()).unwrap();
        assert_eq!(doc.text, "Exact   text\nwith lines");
        assert_eq!(doc.kind, DocumentKind::Plain);
        assert_eq!(doc.name, "contract.txt");
    }

    #[test]
    fn test_markdown_treated_as_plain() {
        let mut ex = extractor();
        let doc = ex.extract("notes.MD", b"# Heading").unwrap();
        assert_eq!(doc.kind, DocumentKind::Plain);
    }

    #[test]
    fn test_unsupported_type_rejected_before_parsing() {
        let mut ex = extractor();
        // Valid text bytes, but .docx is not on the allow-list: the
        // failure must come from detection, not from a parser.
        let err = ex.extract("contract.docx", b"plenty of perfectly readable text").unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedType(_)));
    }

    #[test]
    fn test_no_extension_rejected() {
        let mut ex = extractor();
        let err = ex.extract("README", b"text").unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedType(_)));
    }

    #[test]
    fn test_image_goes_through_ocr() {
        let mut ex = extractor();
        let doc = ex.extract("scan.jpeg", &[0xFF, 0xD8, 0xFF]).unwrap();
        assert_eq!(doc.text, "RECOGNIZED");
        assert_eq!(doc.kind, DocumentKind::Image);
    }

    #[test]
    fn test_ocr_failure_surfaces_reason() {
        let mut ex = Extractor::new(Box::new(FixedOcr(Err("model missing".to_string()))));
        let err = ex.extract("scan.png", &[0u8]).unwrap_err();
        match err {
            ExtractError::Ocr(msg) => assert!(msg.contains("model missing")),
            other => panic!("expected Ocr error, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_utf8_is_read_error() {
        let mut ex = extractor();
        let err = ex.extract("broken.txt", &[0xFF, 0xFE, 0x00]).unwrap_err();
        assert!(matches!(err, ExtractError::Read(_)));
    }

    proptest! {
        /// Plain-text extraction is the identity for any input of at
        /// least one character.
        #[test]
        fn plain_extraction_is_identity(text in ".{1,400}") {
            let mut ex = extractor();
            let doc = ex.extract("pasted.txt", text.as_bytes()).unwrap();
            prop_assert_eq!(doc.text, text);
        }

        /// Unknown extensions never reach a backend.
        #[test]
        fn unknown_extensions_rejected(ext in "[a-z]{2,6}") {
            prop_assume!(!matches!(ext.as_str(), "txt" | "md" | "pdf" | "jpg" | "jpeg" | "png"));
            let mut ex = extractor();
            let err = ex.extract(&format!("file.{ext}"), b"data").unwrap_err();
            prop_assert!(matches!(err, ExtractError::UnsupportedType(_)));
        }
    }
}
