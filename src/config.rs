use crate::engine::DEFAULT_THRESHOLD;
use crate::storage::{BackendLocal, StorageManager};
use serde::{Deserialize, Serialize};

/// Default model for the `model` embedding backend.
const DEFAULT_MODEL: &str = "bge-small-en-v1.5";
/// Default cap on categories processed per mapping request.
const DEFAULT_MAX_BATCH_SIZE: usize = 20;
/// Default embedding cache capacity (entries).
const DEFAULT_CACHE_CAPACITY: usize = 4096;

/// Which embedding backend the mapping service uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Deterministic hash embedding. No model download, reproducible scores.
    #[default]
    Hash,
    /// Real sentence-embedding model (requires the `model-embeddings`
    /// feature).
    Model,
}

/// Configuration for the category mapping engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MappingConfig {
    /// Embedding backend: "hash" or "model"
    #[serde(default)]
    pub backend: EmbeddingBackend,

    /// Model name for the `model` backend (e.g., "bge-small-en-v1.5")
    #[serde(default = "default_model")]
    pub model: String,

    /// Default similarity threshold [0.0, 1.0]
    #[serde(default = "default_threshold")]
    pub default_threshold: f32,

    /// Maximum categories processed per request
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// Embedding cache capacity (entries)
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::Hash,
            model: DEFAULT_MODEL.to_string(),
            default_threshold: DEFAULT_THRESHOLD,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_threshold() -> f32 {
    DEFAULT_THRESHOLD
}

fn default_max_batch_size() -> usize {
    DEFAULT_MAX_BATCH_SIZE
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub mapping: MappingConfig,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: String,
}

impl Config {
    fn validate(&self) {
        let mapping = &self.mapping;
        if !(0.0..=1.0).contains(&mapping.default_threshold) {
            panic!(
                "mapping.default_threshold must be between 0.0 and 1.0, got {}",
                mapping.default_threshold
            );
        }

        if mapping.max_batch_size == 0 {
            panic!("mapping.max_batch_size must be greater than 0");
        }

        if mapping.cache_capacity == 0 {
            panic!("mapping.cache_capacity must be greater than 0");
        }
    }

    /// Load from the default base path: `$PALATE_BASE_PATH`, or `~/.palate`.
    pub fn load() -> Self {
        let base_path = std::env::var("PALATE_BASE_PATH").unwrap_or_else(|_| {
            homedir::my_home()
                .ok()
                .flatten()
                .map(|home| home.join(".palate").to_string_lossy().into_owned())
                .expect("could not resolve home directory")
        });

        Self::load_with(&base_path)
    }

    pub fn load_with(base_path: &str) -> Self {
        let store = BackendLocal::new(base_path).expect("could not create base directory");

        // create new if does not exist
        if !store.exists("config.yaml") {
            store
                .write(
                    "config.yaml",
                    serde_yml::to_string(&Self::default()).unwrap().as_bytes(),
                )
                .expect("could not write default config");
        }

        let config_str = String::from_utf8(
            store.read("config.yaml").expect("could not read config"),
        )
        .expect("config file is not valid utf8");
        let mut config: Self = serde_yml::from_str(&config_str).expect("config is malformed");

        config.base_path = base_path.to_string();

        config.validate();

        // resave in case config version needs an upgrade
        if config_str != serde_yml::to_string(&config).unwrap() {
            config.save();
        }

        config
    }

    pub fn save(&self) {
        let store = BackendLocal::new(&self.base_path).expect("could not create base directory");

        let config_str = serde_yml::to_string(&self).unwrap();
        store
            .write("config.yaml", config_str.as_bytes())
            .expect("could not write config");
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }
}
