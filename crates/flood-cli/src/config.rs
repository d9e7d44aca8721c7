//! CLI configuration

use flood_sdk::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Overrides applied on top of a pipeline configuration
///
/// Sources, later ones winning: `config/flood.*`, `FLOOD_*` environment
/// variables, then command-line flags (see [`crate::cli::Cli`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// YAML or JSON pipeline file with the full model grid
    #[serde(default)]
    pub pipeline_file: Option<PathBuf>,

    #[serde(default)]
    pub project_root: Option<PathBuf>,

    #[serde(default)]
    pub city: Option<String>,

    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default)]
    pub top_n_importances: Option<usize>,
}

impl AppConfig {
    /// Load configuration from environment variables and config file
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file if exists
        dotenvy::dotenv().ok();
        Self::load_from("config/flood")
    }

    /// Load from an optional config file (name without extension) and the environment
    pub fn load_from(name: &str) -> anyhow::Result<Self> {
        let config_result = config::Config::builder()
            .add_source(config::File::with_name(name).required(false))
            .add_source(config::Environment::with_prefix("FLOOD"))
            .build();

        match config_result {
            Ok(cfg) => cfg
                .try_deserialize()
                .map_err(|e| anyhow::anyhow!("Failed to deserialize config: {}", e)),
            Err(e) => {
                tracing::info!("No usable config source ({}), using defaults", e);
                Ok(Self::default())
            }
        }
    }

    /// Resolve into a validated pipeline configuration
    pub fn into_pipeline_config(self) -> anyhow::Result<PipelineConfig> {
        let mut config = match &self.pipeline_file {
            Some(path) => PipelineConfig::from_file(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(root) = self.project_root {
            config.project_root = root;
        }
        if let Some(city) = self.city {
            config.city = city;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(top_n) = self.top_n_importances {
            config.top_n_importances = top_n;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert!(config.pipeline_file.is_none());
        assert!(config.city.is_none());
    }

    #[test]
    fn test_overrides_applied() {
        let app = AppConfig {
            project_root: Some(PathBuf::from("/data/flood")),
            city: Some("chennai".to_string()),
            seed: Some(3),
            ..AppConfig::default()
        };

        let config = app.into_pipeline_config().unwrap();
        assert_eq!(config.project_root, PathBuf::from("/data/flood"));
        assert_eq!(config.city, "chennai");
        assert_eq!(config.seed, 3);
        assert_eq!(config.top_n_importances, 20);
    }

    #[test]
    fn test_empty_city_rejected() {
        let app = AppConfig {
            city: Some("  ".to_string()),
            ..AppConfig::default()
        };
        assert!(app.into_pipeline_config().is_err());
    }
}
