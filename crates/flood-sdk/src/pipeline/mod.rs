//! Pipeline stages
//!
//! Each stage reads its inputs from the paths derived by
//! [`PipelineConfig`](crate::config::PipelineConfig), runs the matching
//! flood-runtime operation and persists its outputs:
//!
//! | Stage | Reads | Writes |
//! |-------|-------|--------|
//! | [`FeatureBuildPipeline`] | processed monthly frames | feature dataset |
//! | [`TrainingPipeline`] | feature dataset | both models, metrics, importances |
//! | [`InferencePipeline`] | feature dataset, temporal model | scored table |
//! | [`EvaluationPipeline`] | scored table | evaluation record |

pub mod evaluation;
pub mod feature_build;
pub mod inference;
pub mod training;

pub use evaluation::EvaluationPipeline;
pub use feature_build::FeatureBuildPipeline;
pub use inference::InferencePipeline;
pub use training::TrainingPipeline;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::storage;
use flood_core::TileMonthRecord;
use flood_runtime::FeatureTable;

/// Load the persisted feature dataset
pub(crate) fn load_dataset(config: &PipelineConfig) -> Result<FeatureTable> {
    let path = config.dataset_path();
    storage::require(&path, "Dataset")?;
    let records: Vec<TileMonthRecord> = storage::read_records(&path)?;
    Ok(FeatureTable::from_dataset(records)?)
}
