//! Extraction failure modes
//!
//! Every failure is terminal for the attempt; there is no retry logic.
//! The display strings are shown to the end user as-is.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Unsupported file type '{0}'. Supported: .txt, .md, .pdf, .jpg, .jpeg, .png")]
    UnsupportedType(String),

    #[error("Could not read document: {0}")]
    Read(String),

    #[error(
        "This PDF appears to be a scanned document with no extractable text layer. \
         Upload the pages as images to run text recognition instead."
    )]
    ScannedDocument,

    #[error("Text recognition failed: {0}")]
    Ocr(String),
}
