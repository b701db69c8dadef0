//! Configuration management for the Tomato Ripeness Management Service
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with TRM_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

use shared::DEFAULT_CLASS_NAMES;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Object detector configuration
    pub detector: DetectorConfig,

    /// Image storage configuration
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DetectorConfig {
    /// Detection microservice base URL
    pub endpoint: String,

    /// Optional API key sent as x-api-key
    pub api_key: Option<String>,

    /// Confidence threshold the detector filters at
    pub confidence_threshold: f32,

    /// Ordered class list, three stages per cultivar
    pub class_names: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory for uploaded originals and annotated renders
    pub predictions_dir: String,

    /// Maximum accepted multipart body size in bytes
    pub max_upload_bytes: usize,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("TRM_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let default_class_names: Vec<String> =
            DEFAULT_CLASS_NAMES.iter().map(|n| n.to_string()).collect();

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 5000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("detector.confidence_threshold", 0.5)?
            .set_default("detector.class_names", default_class_names)?
            .set_default("storage.predictions_dir", "static/predictions")?
            .set_default("storage.max_upload_bytes", 25 * 1024 * 1024)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (TRM_ prefix)
            .add_source(
                Environment::with_prefix("TRM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            host: "0.0.0.0".to_string(),
        }
    }
}
