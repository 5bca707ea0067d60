//! Tokenizer wrapper for the OCR decoder

use std::path::Path;

use anyhow::{Context, Result};
use tokenizers::tokenizer::Tokenizer;

// RoBERTa-style special token ids used by the TrOCR decoder.
const BOS_TOKEN_ID: u32 = 0;
const EOS_TOKEN_ID: u32 = 2;

pub struct OcrTokenizer {
    inner: Tokenizer,
}

impl OcrTokenizer {
    pub fn load(path: &Path) -> Result<Self> {
        let inner = Tokenizer::from_file(path)
            .map_err(|e| anyhow::anyhow!("failed to load OCR tokenizer: {e}"))?;
        Ok(Self { inner })
    }

    /// Initial decoder input: a single BOS token.
    pub fn decoder_start_ids(&self) -> Vec<i64> {
        vec![BOS_TOKEN_ID as i64]
    }

    pub fn eos_id(&self) -> u32 {
        EOS_TOKEN_ID
    }

    /// Decode generated ids to text, skipping special tokens.
    pub fn decode(&self, ids: &[u32]) -> Result<String> {
        self.inner
            .decode(ids, true)
            .map(|text| text.trim().to_string())
            .map_err(|e| anyhow::anyhow!("token decode failed: {e}"))
            .context("OCR output could not be decoded")
    }
}
