//! Category-to-interest semantic mapping engine.
//!
//! Converts free-text restaurant category labels (as scraped from external
//! listings) into a fixed taxonomy of canonical food interests.
//!
//! # Architecture
//!
//! - `enhance`: Role-specific context prefixes for embedding input
//! - `embedding`: Deterministic hash embeddings (and an optional real model)
//! - `cache`: Bounded memoization of enhanced text -> embedding
//! - `similarity`: Cosine similarity between embedding vectors
//! - `keywords`: Static substring rules for direct, high-confidence matches
//! - `combine`: Score adjustments, ranking and truncation per category
//! - `service`: Batch orchestration over the full interest taxonomy

pub mod embedding;
mod cache;
mod combine;
mod enhance;
mod interests;
mod keywords;
mod service;
mod similarity;

pub use cache::EmbeddingCache;
pub use combine::CategoryMapping;
pub use embedding::{Embedder, EmbeddingError, HashEmbedder, EMBEDDING_DIM};
pub use interests::canonical_interests;
pub use service::{EngineError, MappingService};
pub use similarity::{cosine_similarity, SimilarityError};

/// Default minimum adjusted similarity score for an embedding-only match.
pub const DEFAULT_THRESHOLD: f32 = 0.75;

/// A mapping never carries more than this many interests.
pub const MAX_INTERESTS_PER_CATEGORY: usize = 5;
