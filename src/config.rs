//! Configuration management for Bedtime Stories
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{BedtimeError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
///
/// Holds the settings for the story store and the generation endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where stories are persisted
    #[serde(default)]
    pub store: StoreConfig,
    /// Text-generation endpoint settings
    #[serde(default)]
    pub generation: GenerationConfig,
}

/// Story store configuration
///
/// Specifies which store backend to use and its settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Type of store to use
    #[serde(rename = "type", default = "default_store_type")]
    pub store_type: String,

    /// Firestore configuration
    #[serde(default)]
    pub firestore: FirestoreConfig,

    /// SQLite configuration
    #[serde(default)]
    pub sqlite: SqliteConfig,
}

fn default_store_type() -> String {
    "firestore".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_type: default_store_type(),
            firestore: FirestoreConfig::default(),
            sqlite: SqliteConfig::default(),
        }
    }
}

/// Firestore REST configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirestoreConfig {
    /// API base URL (override for emulators and tests)
    #[serde(default = "default_firestore_api_base")]
    pub api_base: String,

    /// Google Cloud project id
    #[serde(default)]
    pub project_id: String,

    /// Database id within the project
    #[serde(default = "default_firestore_database")]
    pub database: String,

    /// Collection holding story documents
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Optional API key sent as the `key` query parameter
    #[serde(default)]
    pub api_key: Option<String>,

    /// Optional OAuth access token sent as a bearer token
    #[serde(default)]
    pub access_token: Option<String>,

    /// HTTP timeout for each request (seconds)
    #[serde(default = "default_firestore_timeout")]
    pub timeout_seconds: u64,
}

fn default_firestore_api_base() -> String {
    "https://firestore.googleapis.com".to_string()
}

fn default_firestore_database() -> String {
    "(default)".to_string()
}

fn default_collection() -> String {
    "stories".to_string()
}

fn default_firestore_timeout() -> u64 {
    30
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            api_base: default_firestore_api_base(),
            project_id: String::new(),
            database: default_firestore_database(),
            collection: default_collection(),
            api_key: None,
            access_token: None,
            timeout_seconds: default_firestore_timeout(),
        }
    }
}

/// Local SQLite store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SqliteConfig {
    /// Database file; defaults to `stories.db` in the platform data directory
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Generation endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Type of generation endpoint
    #[serde(rename = "type", default = "default_generation_type")]
    pub generation_type: String,

    /// Gemini configuration
    #[serde(default)]
    pub gemini: GeminiConfig,
}

fn default_generation_type() -> String {
    "gemini".to_string()
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            generation_type: default_generation_type(),
            gemini: GeminiConfig::default(),
        }
    }
}

/// Gemini `generateContent` configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API base URL (override for tests and local mocks)
    #[serde(default = "default_gemini_api_base")]
    pub api_base: String,

    /// Model to use
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// API key sent in the `x-goog-api-key` header
    #[serde(default)]
    pub api_key: Option<String>,

    /// HTTP timeout for a generation request (seconds)
    #[serde(default = "default_gemini_timeout")]
    pub timeout_seconds: u64,
}

fn default_gemini_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_gemini_timeout() -> u64 {
    120
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_base: default_gemini_api_base(),
            model: default_gemini_model(),
            api_key: None,
            timeout_seconds: default_gemini_timeout(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| BedtimeError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| BedtimeError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(store_type) = std::env::var("BEDTIME_STORE") {
            self.store.store_type = store_type;
        }

        let firestore = &mut self.store.firestore;
        if let Ok(api_base) = std::env::var("BEDTIME_FIRESTORE_API_BASE") {
            firestore.api_base = api_base;
        }
        if let Ok(project_id) = std::env::var("BEDTIME_FIRESTORE_PROJECT") {
            firestore.project_id = project_id;
        }
        if let Ok(collection) = std::env::var("BEDTIME_FIRESTORE_COLLECTION") {
            firestore.collection = collection;
        }
        if let Ok(api_key) = std::env::var("BEDTIME_FIRESTORE_API_KEY") {
            firestore.api_key = Some(api_key);
        }
        if let Ok(token) = std::env::var("BEDTIME_FIRESTORE_TOKEN") {
            firestore.access_token = Some(token);
        }

        if let Ok(path) = std::env::var("BEDTIME_SQLITE_PATH") {
            self.store.sqlite.path = Some(PathBuf::from(path));
        }

        let gemini = &mut self.generation.gemini;
        if let Ok(api_base) = std::env::var("BEDTIME_GEMINI_API_BASE") {
            gemini.api_base = api_base;
        }
        if let Ok(model) = std::env::var("BEDTIME_GEMINI_MODEL") {
            gemini.model = model;
        }
        if let Ok(key) = std::env::var("BEDTIME_GEMINI_API_KEY") {
            gemini.api_key = Some(key);
        } else if gemini.api_key.is_none() {
            if let Ok(key) = std::env::var("GEMINI_API_KEY") {
                tracing::debug!("Using GEMINI_API_KEY for generation");
                gemini.api_key = Some(key);
            }
        }

        if let Ok(timeout) = std::env::var("BEDTIME_GEMINI_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                gemini.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid BEDTIME_GEMINI_TIMEOUT_SECONDS: {}", timeout);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(store) = &cli.store {
            tracing::debug!("Using store override: {}", store);
            self.store.store_type = store.clone();
        }
        if let Some(path) = &cli.db_path {
            self.store.sqlite.path = Some(path.clone());
        }
    }

    /// Validate the configuration
    ///
    /// Checks the selected backends and the values they depend on. Settings
    /// for backends that are not selected are not checked.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        let valid_stores = ["firestore", "sqlite"];
        if !valid_stores.contains(&self.store.store_type.as_str()) {
            return Err(BedtimeError::Config(format!(
                "Invalid store type: {}. Must be one of: {}",
                self.store.store_type,
                valid_stores.join(", ")
            ))
            .into());
        }

        if self.store.store_type == "firestore" {
            let firestore = &self.store.firestore;
            if firestore.project_id.trim().is_empty() {
                return Err(BedtimeError::Config(
                    "store.firestore.project_id is required for the firestore store".to_string(),
                )
                .into());
            }
            if firestore.collection.trim().is_empty() {
                return Err(BedtimeError::Config(
                    "store.firestore.collection cannot be empty".to_string(),
                )
                .into());
            }
            if firestore.timeout_seconds == 0 {
                return Err(BedtimeError::Config(
                    "store.firestore.timeout_seconds must be greater than 0".to_string(),
                )
                .into());
            }
        }

        if self.generation.generation_type != "gemini" {
            return Err(BedtimeError::Config(format!(
                "Invalid generation type: {}. Must be: gemini",
                self.generation.generation_type
            ))
            .into());
        }

        if self.generation.gemini.model.trim().is_empty() {
            return Err(
                BedtimeError::Config("generation.gemini.model cannot be empty".to_string()).into(),
            );
        }

        if self.generation.gemini.timeout_seconds == 0 {
            return Err(BedtimeError::Config(
                "generation.gemini.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
