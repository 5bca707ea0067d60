//! Loaded documents and their detected kinds

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How the text of a document was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Plain text or markdown, read as-is
    Plain,
    /// Text layer of a PDF
    Pdf,
    /// Optical character recognition over an image
    Image,
}

/// A successfully loaded document
///
/// Created once per successful extraction and immutable afterward;
/// discarded on reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Original file name (or a synthetic name for pasted text)
    pub name: String,
    /// Extracted UTF-8 text
    pub text: String,
    /// Detected source kind
    pub kind: DocumentKind,
    /// When extraction completed
    pub loaded_at: DateTime<Utc>,
}

impl Document {
    pub fn new(name: impl Into<String>, text: impl Into<String>, kind: DocumentKind) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            kind,
            loaded_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_kind_serializes_lowercase() {
        let json = serde_json::to_string(&DocumentKind::Pdf).unwrap();
        assert_eq!(json, "\"pdf\"");
    }

    #[test]
    fn test_document_keeps_text_verbatim() {
        let doc = Document::new("a.txt", "  spaced \n text ", DocumentKind::Plain);
        assert_eq!(doc.text, "  spaced \n text ");
    }
}
