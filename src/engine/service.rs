//! Batch orchestration over the interest taxonomy.
//!
//! `MappingService` owns the embedding backend and the cache, and turns a
//! list of scraped category labels into one `CategoryMapping` per label.
//! Categories in a batch never influence each other; a failure while scoring
//! one category degrades that entry to an empty mapping and the batch
//! continues.

use std::sync::Arc;

use rayon::prelude::*;

use crate::config::{Config, EmbeddingBackend};
use crate::engine::cache::EmbeddingCache;
use crate::engine::combine::{combine_category, CategoryMapping};
use crate::engine::embedding::{Embedder, EmbeddingError, HashEmbedder};
use crate::engine::enhance::{enhance_category, enhance_interest};
use crate::engine::interests::canonical_interests;
use crate::engine::similarity::SimilarityError;

/// Errors surfaced to callers of the mapping service.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Similarity error: {0}")]
    Similarity(#[from] SimilarityError),
}

/// Category-to-interest mapping service.
///
/// Construct once and share; the embedding cache spans calls, so repeated
/// batches only pay for unseen category text.
pub struct MappingService {
    default_threshold: f32,
    embedder: Box<dyn Embedder>,
    cache: EmbeddingCache,
}

impl MappingService {
    /// Build a service from configuration: backend selection, default
    /// threshold, cache capacity.
    pub fn from_config(config: &Config) -> Result<Self, EngineError> {
        let embedder: Box<dyn Embedder> = match config.mapping.backend {
            EmbeddingBackend::Hash => Box::new(HashEmbedder::new()),
            #[cfg(feature = "model-embeddings")]
            EmbeddingBackend::Model => Box::new(crate::engine::embedding::ModelEmbedder::new(
                &config.mapping.model,
                config.base_path().into(),
            )?),
            #[cfg(not(feature = "model-embeddings"))]
            EmbeddingBackend::Model => {
                return Err(EngineError::Validation(
                    "backend 'model' requires the model-embeddings feature".to_string(),
                ))
            }
        };

        Ok(Self {
            default_threshold: config.mapping.default_threshold,
            embedder,
            cache: EmbeddingCache::new(config.mapping.cache_capacity),
        })
    }

    /// Service over an explicit embedder, with the given cache capacity.
    pub fn new(embedder: Box<dyn Embedder>, default_threshold: f32, cache_capacity: usize) -> Self {
        Self {
            default_threshold,
            embedder,
            cache: EmbeddingCache::new(cache_capacity),
        }
    }

    /// The threshold used when a call does not supply one.
    pub fn default_threshold(&self) -> f32 {
        self.default_threshold
    }

    /// Map a batch of category labels onto the canonical interest taxonomy.
    ///
    /// Blank labels are dropped before processing; every surviving label
    /// yields exactly one mapping, in input order. `threshold` falls back to
    /// the configured default.
    pub fn map_categories(
        &self,
        categories: &[String],
        threshold: Option<f32>,
    ) -> Result<Vec<CategoryMapping>, EngineError> {
        if categories.is_empty() {
            return Err(EngineError::Validation(
                "categories must be a non-empty list".to_string(),
            ));
        }

        let threshold = threshold.unwrap_or(self.default_threshold);

        let categories: Vec<&str> = categories
            .iter()
            .map(|category| category.trim())
            .filter(|category| !category.is_empty())
            .collect();

        // Taxonomy embeddings once per call; after the first call these are
        // all cache hits.
        let mut taxonomy_embeddings: Vec<(&'static str, Arc<Vec<f32>>)> =
            Vec::with_capacity(canonical_interests().len());
        for interest in canonical_interests() {
            let vector = self
                .cache
                .get_or_compute(&enhance_interest(interest), self.embedder.as_ref())?;
            taxonomy_embeddings.push((*interest, vector));
        }

        log::debug!(
            "mapping {} categories at threshold {threshold}",
            categories.len()
        );

        // Per-category work only reads shared immutable state; fan out.
        let mappings = categories
            .par_iter()
            .map(|category| {
                self.map_single(category, &taxonomy_embeddings, threshold)
                    .unwrap_or_else(|err| {
                        log::warn!("mapping failed for category {category:?}: {err}");
                        CategoryMapping::empty(category)
                    })
            })
            .collect();

        Ok(mappings)
    }

    fn map_single(
        &self,
        category: &str,
        taxonomy_embeddings: &[(&'static str, Arc<Vec<f32>>)],
        threshold: f32,
    ) -> Result<CategoryMapping, EngineError> {
        let embedding = self
            .cache
            .get_or_compute(&enhance_category(category), self.embedder.as_ref())?;

        combine_category(category, &embedding, taxonomy_embeddings, threshold).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::embedding::EMBEDDING_DIM;

    fn test_service() -> MappingService {
        MappingService::new(Box::new(HashEmbedder::new()), 0.75, 256)
    }

    /// Embedder that fails on demand, for exercising partial-failure paths.
    struct FailingEmbedder;

    impl Embedder for FailingEmbedder {
        fn dimensions(&self) -> usize {
            EMBEDDING_DIM
        }

        fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            if text.contains("Broken") {
                return Err(EmbeddingError::Generation("synthetic failure".to_string()));
            }
            HashEmbedder::new().embed(text)
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_batch_is_validation_error() {
        let service = test_service();
        let result = service.map_categories(&[], None);
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }

    #[test]
    fn test_blank_entries_filtered() {
        let service = test_service();
        let mappings = service
            .map_categories(&strings(&["", "  ", "Pizza"]), None)
            .unwrap();

        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].category, "Pizza");
    }

    #[test]
    fn test_all_blank_batch_yields_no_mappings() {
        let service = test_service();
        let mappings = service.map_categories(&strings(&["", "   "]), None).unwrap();
        assert!(mappings.is_empty());
    }

    #[test]
    fn test_one_mapping_per_category_in_input_order() {
        let service = test_service();
        let mappings = service
            .map_categories(&strings(&["Sushi Bar", "Taco Truck", "Fine Dining"]), None)
            .unwrap();

        assert_eq!(mappings.len(), 3);
        assert_eq!(mappings[0].category, "Sushi Bar");
        assert_eq!(mappings[1].category, "Taco Truck");
        assert_eq!(mappings[2].category, "Fine Dining");
    }

    #[test]
    fn test_input_trimmed_in_output() {
        let service = test_service();
        let mappings = service
            .map_categories(&strings(&["  Sushi Bar  "]), None)
            .unwrap();
        assert_eq!(mappings[0].category, "Sushi Bar");
    }

    #[test]
    fn test_batch_isolation() {
        let service = test_service();

        let alone = service.map_categories(&strings(&["Sushi Bar"]), None).unwrap();
        let in_batch = service
            .map_categories(&strings(&["Taco Truck", "Sushi Bar", "Pizza"]), None)
            .unwrap();

        let from_batch = in_batch.iter().find(|m| m.category == "Sushi Bar").unwrap();
        assert_eq!(alone[0].interests, from_batch.interests);
        assert_eq!(alone[0].similarity_scores, from_batch.similarity_scores);
    }

    #[test]
    fn test_cache_does_not_change_results() {
        let service = test_service();

        let cold = service.map_categories(&strings(&["Sushi Bar"]), None).unwrap();
        let warm = service.map_categories(&strings(&["Sushi Bar"]), None).unwrap();

        assert_eq!(cold[0].interests, warm[0].interests);
        assert_eq!(cold[0].similarity_scores, warm[0].similarity_scores);
    }

    #[test]
    fn test_threshold_monotonicity() {
        let service = test_service();
        let categories = strings(&["Sushi Bar", "Fine Dining", "Noodle House"]);

        let loose = service.map_categories(&categories, Some(0.3)).unwrap();
        let strict = service.map_categories(&categories, Some(0.9)).unwrap();

        for (loose_mapping, strict_mapping) in loose.iter().zip(strict.iter()) {
            for interest in &strict_mapping.interests {
                assert!(
                    loose_mapping.interests.contains(interest),
                    "{interest} appeared only at the stricter threshold"
                );
            }
        }
    }

    #[test]
    fn test_direct_matches_unaffected_by_threshold() {
        let service = test_service();
        let mappings = service
            .map_categories(&strings(&["Taco Truck"]), Some(0.99))
            .unwrap();

        assert!(mappings[0].interests.contains(&"Tacos".to_string()));
        assert!(mappings[0].interests.contains(&"Mexican".to_string()));
    }

    #[test]
    fn test_per_category_failure_is_isolated() {
        let service = MappingService::new(Box::new(FailingEmbedder), 0.75, 256);
        let mappings = service
            .map_categories(&strings(&["Broken Category", "Pizza"]), None)
            .unwrap();

        // The failed entry degrades to an empty mapping; the rest of the
        // batch is unaffected.
        assert_eq!(mappings.len(), 2);
        assert_eq!(mappings[0].category, "Broken Category");
        assert!(mappings[0].interests.is_empty());
        assert!(mappings[0].similarity_scores.is_empty());

        assert_eq!(mappings[1].interests[0], "Pizza");
    }

    #[test]
    fn test_from_config_hash_backend() {
        let config = Config::default();
        let service = MappingService::from_config(&config).unwrap();
        assert_eq!(service.default_threshold(), crate::engine::DEFAULT_THRESHOLD);
    }
}
