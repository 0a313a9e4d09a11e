//! finrag-embed
//!
//! Local sentence embeddings for the collection. [`MiniLmEmbedder`] runs
//! all-MiniLM-L6-v2 (BERT, 384 dims) through candle from files on disk;
//! [`HashEmbedder`] is a deterministic token-hash embedder selected with
//! `APP_USE_FAKE_EMBEDDINGS=1` for tests and offline development.

use anyhow::{Result, anyhow};
use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::{Device, DType, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::{Tokenizer, TruncationParams};

pub use finrag_core::traits::Embedder;

pub mod pooling;

pub use pooling::masked_mean_l2;

pub const MINILM_DIM: usize = 384;
const MINILM_MAX_LEN: usize = 256;

fn select_device() -> Device {
    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(dev) => return dev,
            Err(e) => tracing::warn!(error = %e, "Metal unavailable, embedding on CPU"),
        }
    }
    Device::Cpu
}

/// Truncate encodings to `max_len` tokens, special tokens included, and drop padding.
pub fn limit_tokenizer(tokenizer: &mut Tokenizer, max_len: usize) -> Result<()> {
    let truncation = TruncationParams { max_length: max_len, ..TruncationParams::default() };
    tokenizer
        .with_truncation(Some(truncation))
        .map_err(|e| anyhow!("Invalid truncation for {} tokens: {}", max_len, e))?;
    tokenizer.with_padding(None);
    Ok(())
}

pub struct MiniLmEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
}

impl MiniLmEmbedder {
    pub fn new() -> Result<Self> {
        Self::from_dir(&resolve_model_dir()?)
    }

    /// Load `tokenizer.json`, `config.json` and `model.safetensors` from `model_dir`.
    pub fn from_dir(model_dir: &Path) -> Result<Self> {
        let device = select_device();
        tracing::info!(dir = %model_dir.display(), "loading all-MiniLM-L6-v2");
        let tokenizer_path = model_dir.join("tokenizer.json");
        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;
        limit_tokenizer(&mut tokenizer, MINILM_MAX_LEN)?;
        let config_path = model_dir.join("config.json");
        let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&config_path)?)?;
        let dim = raw.get("hidden_size").and_then(|v| v.as_u64()).map(|v| v as usize).unwrap_or(MINILM_DIM);
        let config: BertConfig = serde_json::from_value(raw)?;
        let weights_path = model_dir.join("model.safetensors");
        let weights = candle_core::safetensors::load(&weights_path, &device)
            .map_err(|e| anyhow!("Failed to load weights from {}: {}", weights_path.display(), e))?;
        let vb = VarBuilder::from_tensors(weights, DType::F32, &device);
        let model = BertModel::load(vb, &config)?;
        tracing::info!(dim, "embedding model loaded");
        Ok(Self { model, tokenizer, device, dim })
    }

    /// `[1, T]` input ids, token type ids and attention mask.
    fn encode(&self, text: &str) -> Result<(Tensor, Tensor, Tensor)> {
        let enc = self.tokenizer.encode(text, true).map_err(|e| anyhow!("Tokenization failed: {}", e))?;
        let input_ids = Tensor::new(enc.get_ids(), &self.device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(enc.get_attention_mask(), &self.device)?.unsqueeze(0)?;
        let token_type_ids = input_ids.zeros_like()?;
        Ok((input_ids, token_type_ids, attention_mask))
    }
}

impl Embedder for MiniLmEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let start = Instant::now();
        let (input_ids, token_type_ids, attention_mask) = self.encode(text)?;
        let hidden = self.model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        let emb = pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1::<f32>()?;
        if emb.len() != self.dim {
            return Err(anyhow!("model produced {} dims, expected {}", emb.len(), self.dim));
        }
        tracing::trace!(elapsed_ms = start.elapsed().as_millis() as u64, "embedded text");
        Ok(emb)
    }
}

/// Hashes whitespace tokens into buckets; same text always yields the same unit vector.
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Embedder for HashEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        use std::hash::{Hash, Hasher};
        use twox_hash::XxHash64;

        let mut v = vec![0f32; self.dim];
        for token in text.split_whitespace() {
            let mut hasher = XxHash64::with_seed(0);
            token.to_lowercase().hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            v[idx] += 0.5 + (((h >> 32) as u32) as f32) / (u32::MAX as f32);
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt();
        if norm == 0.0 {
            // empty text still needs a unit vector for L2 search
            v[0] = 1.0;
            return Ok(v);
        }
        for x in &mut v {
            *x /= norm;
        }
        Ok(v)
    }
}

pub fn use_fake_embeddings() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

pub fn get_default_embedder() -> Result<Box<dyn Embedder>> {
    if use_fake_embeddings() {
        tracing::info!("using HashEmbedder");
        return Ok(Box::new(HashEmbedder::new(MINILM_DIM)));
    }
    Ok(Box::new(MiniLmEmbedder::new()?))
}

fn resolve_model_dir() -> Result<PathBuf> {
    for var in ["APP_MODEL_DIR", "MODEL_DIR"] {
        if let Ok(dir) = std::env::var(var) {
            let p = PathBuf::from(&dir);
            if p.exists() {
                tracing::debug!(var, dir = %p.display(), "model dir from env");
                return Ok(p);
            }
        }
    }
    for candidate in ["models/all-MiniLM-L6-v2", "../models/all-MiniLM-L6-v2"] {
        let p = Path::new(candidate);
        if p.exists() {
            return Ok(p.to_path_buf());
        }
    }
    Err(anyhow!("Could not locate all-MiniLM-L6-v2 model directory (set APP_MODEL_DIR)"))
}
