//! Configuration loader and path helpers.
//!
//! Figment merges `config.toml` + `config.<env>.toml` + `GEMINI_API_KEY` +
//! `APP_*` env vars (`__` separates nested keys, e.g.
//! `APP_RAG__SIMILARITY_THRESHOLD=0.5`). [`Settings`] is the typed view with
//! defaults for every key, so an empty environment is a valid configuration.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::error::Error;
use crate::splitter::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub data: DataSettings,
    pub store: StoreSettings,
    pub chunking: ChunkingSettings,
    pub rag: RagSettings,
    pub llm: LlmSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DataSettings {
    pub dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreSettings {
    pub path: String,
    pub collection: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChunkingSettings {
    pub size: usize,
    pub overlap: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RagSettings {
    pub n_results: usize,
    pub similarity_threshold: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmSettings {
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub api_key: Option<String>,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self { dir: "data".to_string() }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self { path: "vector_store".to_string(), collection: "finance_collection".to_string() }
    }
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self { size: DEFAULT_CHUNK_SIZE, overlap: DEFAULT_CHUNK_OVERLAP }
    }
}

impl Default for RagSettings {
    fn default() -> Self {
        Self { n_results: 3, similarity_threshold: 0.65 }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout_secs: 60,
            api_key: None,
        }
    }
}

impl Settings {
    /// Store path after `~`/`$VAR` expansion, relative paths kept relative to the CWD.
    pub fn store_path(&self) -> PathBuf {
        expand_path(&self.store.path)
    }

    pub fn data_dir(&self) -> PathBuf {
        expand_path(&self.data.dir)
    }

    fn validate(&self) -> crate::error::Result<()> {
        if self.chunking.size == 0 {
            return Err(Error::InvalidConfig("chunking.size must be positive".into()));
        }
        if self.chunking.overlap >= self.chunking.size {
            return Err(Error::InvalidConfig(format!(
                "chunking.overlap ({}) must be smaller than chunking.size ({})",
                self.chunking.overlap, self.chunking.size
            )));
        }
        if self.rag.n_results == 0 {
            return Err(Error::InvalidConfig("rag.n_results must be positive".into()));
        }
        if !self.rag.similarity_threshold.is_finite() || self.rag.similarity_threshold < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "rag.similarity_threshold must be a non-negative number, got {}",
                self.rag.similarity_threshold
            )));
        }
        if self.store.collection.trim().is_empty() {
            return Err(Error::InvalidConfig("store.collection must not be empty".into()));
        }
        Ok(())
    }
}

pub struct Config {
    figment: Figment,
    settings: Settings,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment
            .merge(Env::raw().only(&[API_KEY_ENV]).map(|_| "llm.api_key".into()))
            .merge(Env::prefixed("APP_").split("__"));

        Self::from_figment(figment)
    }

    pub fn from_figment(figment: Figment) -> anyhow::Result<Self> {
        let settings: Settings = figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to read settings: {}", e))?;
        settings.validate()?;
        tracing::debug!(store = ?settings.store, rag = ?settings.rag, model = %settings.llm.model, "configuration loaded");
        Ok(Self { figment, settings })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}
