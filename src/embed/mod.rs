//! Text embeddings for the document store.

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;

static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9_]+").expect("valid token regex"));

pub trait Embedder {
    fn name(&self) -> &'static str;
    fn dimension(&self) -> usize;
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed(&[text])?;
        vectors.pop().ok_or_else(|| anyhow::anyhow!("{} returned no vector", self.name()))
    }
}

/// Feature-hashing embedder: each token is hashed into one of `dimension`
/// buckets and the resulting counts are L2-normalized.
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension: dimension.max(1) }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vec = vec![0.0_f32; self.dimension];
        for token in tokenize(text) {
            let hash = fnv1a_64(token.as_bytes());
            let idx = (hash % self.dimension as u64) as usize;
            vec[idx] += 1.0;
        }
        normalize(&mut vec);
        vec
    }
}

impl Embedder for HashEmbedder {
    fn name(&self) -> &'static str {
        "hash"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

pub fn build_embedder(dimension: usize) -> Box<dyn Embedder + Send + Sync> {
    Box::new(HashEmbedder::new(dimension))
}

/// Lower-cased identifier-like tokens of two or more characters.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    TOKEN_RE
        .find_iter(text)
        .filter(|m| m.as_str().len() >= 2)
        .map(|m| m.as_str().to_ascii_lowercase())
}

fn normalize(vec: &mut [f32]) {
    let norm = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in vec.iter_mut() {
            *value /= norm;
        }
    }
}

/// Cosine similarity. Zero vectors and mismatched lengths score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot = a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>();
    let na = a.iter().map(|v| v * v).sum::<f32>().sqrt();
    let nb = b.iter().map(|v| v * v).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na * nb)
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    let mut hash = OFFSET;
    for byte in bytes {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}
