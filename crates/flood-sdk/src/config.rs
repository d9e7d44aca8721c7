//! Configuration types for the flood pipeline

use crate::error::{Result, SdkError};
use flood_runtime::{SplitConfig, TrainerConfig, DEFAULT_SEED, DEFAULT_TOP_IMPORTANCES};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main pipeline configuration
///
/// Every stage derives its input and output locations from `project_root`
/// and `city`; see the path accessors below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory containing `data/`
    #[serde(default = "default_project_root")]
    pub project_root: PathBuf,

    /// City whose processed frames are read
    #[serde(default = "default_city")]
    pub city: String,

    /// Seed for every randomized model fit
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Importances kept in the training metrics record
    #[serde(default = "default_top_n")]
    pub top_n_importances: usize,

    #[serde(default)]
    pub split: SplitConfig,

    #[serde(default)]
    pub trainer: TrainerConfig,
}

fn default_project_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_city() -> String {
    "bengaluru".to_string()
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_top_n() -> usize {
    DEFAULT_TOP_IMPORTANCES
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            project_root: default_project_root(),
            city: default_city(),
            seed: default_seed(),
            top_n_importances: default_top_n(),
            split: SplitConfig::default(),
            trainer: TrainerConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a configuration rooted at `project_root`
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            ..Self::default()
        }
    }

    /// Load from a YAML (`.yaml`/`.yml`) or JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SdkError::MissingArtifact {
                kind: "Pipeline config",
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            Some("json") => serde_json::from_str(&content)?,
            other => {
                return Err(SdkError::ConfigError(format!(
                    "unsupported config format: {:?}",
                    other
                )))
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.city.trim().is_empty() {
            return Err(SdkError::ConfigError("city must not be empty".to_string()));
        }
        if self.trainer.candidates.is_empty() {
            return Err(SdkError::ConfigError(
                "trainer.candidates must list at least one model".to_string(),
            ));
        }
        if self.split.validation_buckets == 0 || self.split.test_buckets == 0 {
            return Err(SdkError::ConfigError(
                "validation and test partitions need at least one bucket each".to_string(),
            ));
        }
        Ok(())
    }

    // ========== Derived paths ==========

    /// Monthly per-tile frames: `data/processed/<city>/`
    pub fn processed_dir(&self) -> PathBuf {
        self.project_root.join("data").join("processed").join(&self.city)
    }

    pub fn features_dir(&self) -> PathBuf {
        self.project_root.join("data").join("features")
    }

    pub fn dataset_path(&self) -> PathBuf {
        self.features_dir().join("flood_dataset.csv")
    }

    pub fn results_dir(&self) -> PathBuf {
        self.project_root.join("data").join("results")
    }

    pub fn models_dir(&self) -> PathBuf {
        self.results_dir().join("models")
    }

    pub fn baseline_model_path(&self) -> PathBuf {
        self.models_dir().join("baseline_model.json")
    }

    pub fn temporal_model_path(&self) -> PathBuf {
        self.models_dir().join("temporal_model.json")
    }

    pub fn training_metrics_path(&self) -> PathBuf {
        self.results_dir().join("training_metrics.json")
    }

    pub fn feature_importance_path(&self) -> PathBuf {
        self.results_dir().join("feature_importance.json")
    }

    pub fn scores_path(&self) -> PathBuf {
        self.results_dir().join("vulnerability_scores.csv")
    }

    pub fn evaluation_path(&self) -> PathBuf {
        self.results_dir().join("evaluation.json")
    }
}
