use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::text::normalize_keyword;

pub const LOCAL_MODEL_ID: &str = "keyword-hash-v1";
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

pub trait EmbeddingProvider {
    fn model_id(&self) -> &str;
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingSource {
    Provider,
    Local,
    LocalFallback,
}

#[derive(Debug, Clone)]
pub struct LocalHashEmbedder {
    dimensions: usize,
}

impl Default for LocalHashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_EMBEDDING_DIM)
    }
}

impl LocalHashEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(8),
        }
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0_f32; self.dimensions];
        for feature in keyword_features(text) {
            let hash = stable_hash(&feature);
            let index = (hash % self.dimensions as u64) as usize;
            let sign = if (hash >> 63) & 1 == 0 { 1.0 } else { -1.0 };
            let weight = 1.0 + (((hash >> 48) & 0xFF) as f32 / 255.0);
            vector[index] += sign * weight;
        }

        normalize_vector(&mut vector);
        vector
    }
}

impl EmbeddingProvider for LocalHashEmbedder {
    fn model_id(&self) -> &str {
        LOCAL_MODEL_ID
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

pub fn embed_keywords(
    provider: Option<&dyn EmbeddingProvider>,
    fallback: &LocalHashEmbedder,
    keywords: &[String],
) -> (Vec<Vec<f32>>, EmbeddingSource) {
    let Some(provider) = provider else {
        return (local_batch(fallback, keywords), EmbeddingSource::Local);
    };

    match provider
        .embed_batch(keywords)
        .and_then(|vectors| validate_batch(vectors, keywords.len()))
    {
        Ok(vectors) => (vectors, EmbeddingSource::Provider),
        Err(err) => {
            warn!(
                model_id = provider.model_id(),
                error = %err,
                "embedding provider failed; using local hash embeddings"
            );
            (local_batch(fallback, keywords), EmbeddingSource::LocalFallback)
        }
    }
}

fn local_batch(embedder: &LocalHashEmbedder, keywords: &[String]) -> Vec<Vec<f32>> {
    keywords
        .iter()
        .map(|keyword| embedder.embed_text(keyword))
        .collect()
}

fn validate_batch(vectors: Vec<Vec<f32>>, expected: usize) -> Result<Vec<Vec<f32>>> {
    if vectors.len() != expected {
        bail!(
            "provider returned {} vectors for {} keywords",
            vectors.len(),
            expected
        );
    }

    let dimensions = vectors.first().map(Vec::len).unwrap_or(0);
    if expected > 0 && dimensions == 0 {
        bail!("provider returned empty vectors");
    }

    for vector in &vectors {
        if vector.len() != dimensions {
            bail!("provider returned mixed dimensions");
        }
        if vector.iter().any(|value| !value.is_finite()) {
            bail!("provider returned non-finite values");
        }
    }

    Ok(vectors)
}

fn keyword_features(text: &str) -> Vec<String> {
    let words = normalize_keyword(text)
        .split(' ')
        .map(|word| {
            word.chars()
                .filter(|character| character.is_alphanumeric())
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<String>>();

    let mut features = Vec::<String>::with_capacity(words.len() * 2);
    for (index, word) in words.iter().enumerate() {
        features.push(format!("w:{word}"));
        if let Some(next) = words.get(index + 1) {
            features.push(format!("b:{word}_{next}"));
        }
    }
    features
}

fn stable_hash(value: &str) -> u64 {
    let digest = Sha256::digest(value.as_bytes());
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

fn normalize_vector(values: &mut [f32]) {
    let squared_norm = values
        .iter()
        .map(|value| f64::from(*value) * f64::from(*value))
        .sum::<f64>();

    if squared_norm <= 0.0 {
        return;
    }

    let norm = squared_norm.sqrt() as f32;
    for value in values {
        *value /= norm;
    }
}
