use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    pub article_map: PathBuf,
    pub category_map: PathBuf,
    pub edge_list: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    pub dir: PathBuf,
    /// When true, cached blobs are rebuilt if the source-file fingerprint
    /// no longer matches. The default trusts whatever is on disk.
    #[serde(default)]
    pub verify_fingerprint: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    pub category_model: String,
    pub article_model: String,
    #[serde(default = "default_dimension")]
    pub dimension: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub data: DataConfig,
    pub cache: CacheConfig,
    pub models: ModelConfig,
}

const fn default_dimension() -> usize {
    256
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        tracing::debug!("loading configuration for run mode {}", run_mode);

        let builder = Config::builder()
            .add_source(File::with_name("config/default"))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(Environment::with_prefix("TOPCATS").separator("__"));

        builder.build()?.try_deserialize()
    }
}
