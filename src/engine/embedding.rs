//! Embedding generation for category and interest text.
//!
//! Two backends implement the [`Embedder`] trait:
//!
//! - [`HashEmbedder`] (default): a deterministic hash embedding. No model,
//!   no I/O, bit-for-bit reproducible across runs and platforms. This is the
//!   backend tests and offline tooling rely on.
//! - `ModelEmbedder` (feature `model-embeddings`): a real sentence-embedding
//!   model via fastembed. Better semantic quality, but pulls a model download
//!   and pins its version; scores are only reproducible against a fixed model.
//!
//! The choice is configuration, not a compile-time collapse: deployments that
//! accept model pinning select `backend: model`, everything else stays on the
//! hash backend.

/// Embedding vector length for every backend-independent code path.
pub const EMBEDDING_DIM: usize = 384;

/// Weight added per word-hash hit.
const WORD_SIGNAL_WEIGHT: f32 = 2.0;

/// Weight added per food-lexicon hit.
const LEXICON_BOOST: f32 = 5.0;

/// Curated food terms, each bound to a fixed bucket. A term that occurs as a
/// substring of the (lowercased) input boosts its bucket, which pulls texts
/// mentioning the same food closer together than raw character statistics
/// alone would.
const FOOD_LEXICON: [(&str, usize); 20] = [
    ("pizza", 17),
    ("burger", 31),
    ("sushi", 47),
    ("taco", 59),
    ("pasta", 73),
    ("curry", 89),
    ("ramen", 103),
    ("noodle", 127),
    ("salad", 139),
    ("steak", 151),
    ("seafood", 167),
    ("bbq", 181),
    ("vegan", 197),
    ("dessert", 211),
    ("coffee", 227),
    ("bakery", 241),
    ("breakfast", 257),
    ("brunch", 271),
    ("sandwich", 283),
    ("grill", 307),
];

/// Error type for embedding operations.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("Embedding generation failed: {0}")]
    Generation(String),

    #[cfg(feature = "model-embeddings")]
    #[error("Model initialization failed: {0}")]
    InitFailed(String),

    #[cfg(feature = "model-embeddings")]
    #[error("Invalid model name: {0}")]
    InvalidModel(String),
}

/// A text-to-vector embedding backend.
///
/// Implementations are total over strings: empty input yields the zero
/// vector, everything else a unit-length vector of `dimensions()` floats.
pub trait Embedder: Send + Sync {
    /// The embedding vector length this backend emits.
    fn dimensions(&self) -> usize;

    /// Generate an embedding for a single text.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Deterministic hash embedding.
///
/// The vector is a 384-bucket accumulation of three signals over the
/// lowercased, trimmed input:
///
/// 1. character histogram: `bucket[char_code % 384] += 1`
/// 2. word signal: per word, a 32-bit rolling hash, `bucket[|hash| % 384] += 2`
/// 3. lexicon boost: per matching food term, `bucket[fixed index] += 5`
///
/// followed by L2 normalization. All components are non-negative, so cosine
/// similarity between any two outputs lands in `[0, 1]`.
#[derive(Debug, Default, Clone, Copy)]
pub struct HashEmbedder;

impl HashEmbedder {
    pub fn new() -> Self {
        Self
    }

    fn generate(text: &str) -> Vec<f32> {
        let text = text.trim().to_lowercase();
        let mut buckets = vec![0.0f32; EMBEDDING_DIM];

        if text.is_empty() {
            return buckets;
        }

        for ch in text.chars() {
            buckets[(ch as u32 as usize) % EMBEDDING_DIM] += 1.0;
        }

        for word in text
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|word| !word.is_empty())
        {
            buckets[(word_hash(word).unsigned_abs() as usize) % EMBEDDING_DIM] +=
                WORD_SIGNAL_WEIGHT;
        }

        for (term, bucket) in FOOD_LEXICON {
            if text.contains(term) {
                buckets[bucket] += LEXICON_BOOST;
            }
        }

        let norm = buckets.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for bucket in buckets.iter_mut() {
                *bucket /= norm;
            }
        }

        buckets
    }
}

/// 32-bit rolling hash over a word's characters (`h = h * 31 + ch`, wrapping).
fn word_hash(word: &str) -> i32 {
    let mut hash: i32 = 0;
    for ch in word.chars() {
        hash = hash.wrapping_mul(31).wrapping_add(ch as i32);
    }
    hash
}

impl Embedder for HashEmbedder {
    fn dimensions(&self) -> usize {
        EMBEDDING_DIM
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(Self::generate(text))
    }
}

/// Real sentence-embedding backend over fastembed.
///
/// Uses a Mutex because fastembed's embed() requires &mut self.
#[cfg(feature = "model-embeddings")]
pub struct ModelEmbedder {
    model: std::sync::Mutex<fastembed::TextEmbedding>,
    model_name: String,
    dimensions: usize,
}

#[cfg(feature = "model-embeddings")]
impl ModelEmbedder {
    /// Create a model-backed embedder.
    ///
    /// The model is downloaded on first use and cached in the `models/`
    /// subdirectory of `cache_dir`.
    pub fn new(model_name: &str, cache_dir: std::path::PathBuf) -> Result<Self, EmbeddingError> {
        let model_enum = Self::parse_model_name(model_name)?;

        let models_dir = cache_dir.join("models");
        std::fs::create_dir_all(&models_dir).map_err(|e| {
            EmbeddingError::InitFailed(format!("Failed to create models directory: {}", e))
        })?;

        let options = fastembed::InitOptions::new(model_enum)
            .with_cache_dir(models_dir)
            .with_show_download_progress(true);

        let mut model = fastembed::TextEmbedding::try_new(options)
            .map_err(|e| EmbeddingError::InitFailed(e.to_string()))?;

        let dimensions = Self::probe_dimensions(&mut model)?;

        Ok(Self {
            model: std::sync::Mutex::new(model),
            model_name: model_name.to_string(),
            dimensions,
        })
    }

    /// Get the model name.
    pub fn name(&self) -> &str {
        &self.model_name
    }

    fn parse_model_name(name: &str) -> Result<fastembed::EmbeddingModel, EmbeddingError> {
        match name.to_lowercase().as_str() {
            "all-minilm-l6-v2" | "allminiml6v2" => Ok(fastembed::EmbeddingModel::AllMiniLML6V2),
            "bge-small-en-v1.5" | "bgesmallenv15" => Ok(fastembed::EmbeddingModel::BGESmallENV15),
            "bge-base-en-v1.5" | "bgebaseenv15" => Ok(fastembed::EmbeddingModel::BGEBaseENV15),
            _ => Err(EmbeddingError::InvalidModel(format!(
                "Unknown model: {}. Supported models: all-MiniLM-L6-v2, bge-small-en-v1.5, bge-base-en-v1.5",
                name
            ))),
        }
    }

    /// Probe the model to determine embedding dimensions.
    fn probe_dimensions(model: &mut fastembed::TextEmbedding) -> Result<usize, EmbeddingError> {
        let test_embeddings = model
            .embed(vec!["test"], None)
            .map_err(|e| EmbeddingError::InitFailed(format!("Failed to probe dimensions: {}", e)))?;

        test_embeddings
            .first()
            .map(|v| v.len())
            .ok_or_else(|| EmbeddingError::InitFailed("Model returned no embedding".to_string()))
    }
}

#[cfg(feature = "model-embeddings")]
impl Embedder for ModelEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut model = self
            .model
            .lock()
            .map_err(|e| EmbeddingError::Generation(format!("Failed to acquire model lock: {}", e)))?;

        let embeddings = model
            .embed(vec![text], None)
            .map_err(|e| EmbeddingError::Generation(e.to_string()))?;

        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::Generation("No embedding returned".to_string()))
    }
}
