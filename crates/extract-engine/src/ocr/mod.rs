//! Optical character recognition over uploaded images
//!
//! The extractor consumes OCR as an opaque capability: given image
//! bytes, produce recognized text or fail. The bundled backend drives a
//! TrOCR encoder/decoder ONNX pair through `ort`, configured for a
//! single fixed language (printed English).

mod tokenizer;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::imageops::FilterType;
use ort::{
    inputs,
    session::builder::GraphOptimizationLevel,
    session::Session,
    value::Value,
};
use tracing::debug;

use tokenizer::OcrTokenizer;

/// TrOCR expects square 384x384 RGB input.
const INPUT_SIZE: u32 = 384;

/// Generation cap; a contract page rarely exceeds a few hundred tokens.
const MAX_DECODE_STEPS: usize = 512;

/// Capability: recognize text in an image, or fail.
pub trait OcrEngine: Send {
    fn name(&self) -> &'static str;

    fn recognize(&mut self, image_data: &[u8]) -> Result<String>;
}

/// ONNX TrOCR backend
pub struct TrocrEngine {
    encoder: Session,
    decoder: Session,
    tokenizer: OcrTokenizer,
}

impl TrocrEngine {
    /// Load the encoder, decoder, and tokenizer from a model directory
    /// containing `trocr_encoder.onnx`, `trocr_decoder.onnx`, and
    /// `tokenizer.json`.
    pub fn load(model_dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = model_dir.into();
        let _ = ort::init();

        let encoder = Self::load_session(&dir.join("trocr_encoder.onnx"))?;
        let decoder = Self::load_session(&dir.join("trocr_decoder.onnx"))?;
        let tokenizer = OcrTokenizer::load(&dir.join("tokenizer.json"))?;

        debug!(dir = %dir.display(), "OCR engine loaded");
        Ok(Self {
            encoder,
            decoder,
            tokenizer,
        })
    }

    fn load_session(path: &Path) -> Result<Session> {
        Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?
            .commit_from_file(path)
            .with_context(|| format!("failed to load OCR model '{}'", path.display()))
    }

    /// Normalize an image into the CHW float tensor the encoder expects.
    fn preprocess(image_data: &[u8]) -> Result<Vec<f32>> {
        let image = image::load_from_memory(image_data).context("failed to decode image")?;

        // Grayscale pass improves recognition of low-contrast scans;
        // the model still wants three channels.
        let gray = image.to_luma8();
        let mut rgb = image::RgbImage::new(gray.width(), gray.height());
        for (x, y, pixel) in gray.enumerate_pixels() {
            let v = pixel[0];
            rgb.put_pixel(x, y, image::Rgb([v, v, v]));
        }

        let size = INPUT_SIZE;
        let resized = image::DynamicImage::ImageRgb8(rgb)
            .resize_exact(size, size, FilterType::Lanczos3)
            .to_rgb8();

        let mut pixels = Vec::with_capacity(3 * (size * size) as usize);
        for channel in 0..3 {
            for y in 0..size {
                for x in 0..size {
                    let pixel = resized.get_pixel(x, y);
                    pixels.push(pixel[channel] as f32 / 255.0);
                }
            }
        }
        Ok(pixels)
    }

    /// Greedy autoregressive decode against the encoder hidden states.
    fn decode(&mut self, enc_shape: Vec<i64>, enc_data: Vec<f32>) -> Result<Vec<u32>> {
        let mut input_ids = self.tokenizer.decoder_start_ids();
        let mut generated: Vec<u32> = Vec::new();

        for step in 0..MAX_DECODE_STEPS {
            let ids_value = Value::from_array((
                [1_usize, input_ids.len()],
                input_ids.clone().into_boxed_slice(),
            ))?;
            let hidden_states =
                Value::from_array((enc_shape.clone(), enc_data.clone().into_boxed_slice()))?;
            let use_cache = Value::from_array(([1_usize], vec![false].into_boxed_slice()))?;

            let outputs = self.decoder.run(inputs![
                "input_ids" => ids_value,
                "encoder_hidden_states" => hidden_states,
                "use_cache_branch" => use_cache
            ])?;

            let (logits_shape, logits_data) = outputs[0].try_extract_tensor::<f32>()?;
            let vocab_size = logits_shape[2] as usize;
            let last_start = ((logits_shape[1] - 1) * logits_shape[2]) as usize;
            let last_logits = &logits_data[last_start..last_start + vocab_size];

            let next_id = last_logits
                .iter()
                .enumerate()
                .max_by(|(_, a), (_, b)| a.total_cmp(b))
                .map(|(idx, _)| idx as u32)
                .unwrap_or(self.tokenizer.eos_id());

            if next_id == self.tokenizer.eos_id() {
                debug!(step, "EOS reached");
                break;
            }

            generated.push(next_id);
            input_ids.push(next_id as i64);

            if stuck_in_repetition(&generated) {
                debug!(step, "repetition loop detected, stopping decode");
                break;
            }
        }

        Ok(generated)
    }
}

/// Bail out of decoding when the tail repeats a 1- or 2-token pattern.
fn stuck_in_repetition(generated: &[u32]) -> bool {
    if generated.len() >= 5 {
        let tail = &generated[generated.len() - 5..];
        if tail.iter().all(|&t| t == tail[0]) {
            return true;
        }
    }
    if generated.len() >= 8 {
        let tail = &generated[generated.len() - 8..];
        let pair_repeat = tail
            .chunks(2)
            .all(|pair| pair[0] == tail[0] && pair[1] == tail[1]);
        if pair_repeat && tail[0] != tail[1] {
            return true;
        }
    }
    false
}

impl OcrEngine for TrocrEngine {
    fn name(&self) -> &'static str {
        "trocr"
    }

    fn recognize(&mut self, image_data: &[u8]) -> Result<String> {
        let pixels = Self::preprocess(image_data)?;

        let size = INPUT_SIZE as usize;
        let input = Value::from_array(([1_usize, 3, size, size], pixels.into_boxed_slice()))?;
        let outputs = self.encoder.run(inputs![input])?;

        let (shape, data) = outputs[0].try_extract_tensor::<f32>()?;
        let enc_shape: Vec<i64> = shape.iter().copied().collect();
        let enc_data: Vec<f32> = data.to_vec();
        drop(outputs);

        let generated = self.decode(enc_shape, enc_data)?;
        if generated.is_empty() {
            anyhow::bail!("no text recognized; the image may be blank or unreadable");
        }

        self.tokenizer.decode(&generated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_token_repetition_detected() {
        assert!(stuck_in_repetition(&[9, 9, 9, 9, 9]));
        assert!(!stuck_in_repetition(&[1, 2, 3, 4, 5]));
    }

    #[test]
    fn test_pair_repetition_detected() {
        assert!(stuck_in_repetition(&[7, 3, 7, 3, 7, 3, 7, 3]));
        assert!(!stuck_in_repetition(&[7, 3, 7, 3, 1, 3, 7, 3]));
    }

    #[test]
    fn test_short_sequences_not_flagged() {
        assert!(!stuck_in_repetition(&[4, 4, 4]));
    }
}
