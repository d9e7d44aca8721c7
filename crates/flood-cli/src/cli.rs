//! Command-line interface

use crate::config::AppConfig;
use anyhow::Result;
use clap::{Parser, Subcommand};
use flood_sdk::{FloodPipeline, PipelineBuilder};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "flood",
    version,
    about = "Urban flood vulnerability pipeline: features, training, scoring and evaluation"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// YAML or JSON pipeline file (model grid, split sizes, seed)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory containing `data/`
    #[arg(long, global = true)]
    pub project_root: Option<PathBuf>,

    /// City whose processed frames are used
    #[arg(long, global = true)]
    pub city: Option<String>,

    #[arg(long, global = true)]
    pub seed: Option<u64>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Concatenate processed monthly frames into the feature dataset
    BuildFeatures,
    /// Fit the baseline, select the temporal model and write metrics
    Train,
    /// Score every tile-month with the trained temporal model
    Infer,
    /// Compare monthly mean scores with the seasonal event proxy
    Evaluate,
    /// Run every stage in order
    RunAll,
}

impl Cli {
    /// Layer command-line flags over the loaded configuration
    pub fn apply(&self, mut app: AppConfig) -> AppConfig {
        if let Some(path) = &self.config {
            app.pipeline_file = Some(path.clone());
        }
        if let Some(root) = &self.project_root {
            app.project_root = Some(root.clone());
        }
        if let Some(city) = &self.city {
            app.city = Some(city.clone());
        }
        if let Some(seed) = self.seed {
            app.seed = Some(seed);
        }
        app
    }
}

/// Build the pipeline from `app` and run the selected command
pub fn run(command: Command, app: AppConfig) -> Result<()> {
    let config = app.into_pipeline_config()?;
    let pipeline = PipelineBuilder::from_config(config).build()?;
    execute(command, &pipeline)
}

fn execute(command: Command, pipeline: &FloodPipeline) -> Result<()> {
    match command {
        Command::BuildFeatures => {
            let path = pipeline.build_features()?;
            info!("Feature dataset ready: {}", path.display());
        }
        Command::Train => print_json(&pipeline.train()?)?,
        Command::Infer => {
            let path = pipeline.infer()?;
            info!("Scores written: {}", path.display());
        }
        Command::Evaluate => print_json(&pipeline.evaluate()?)?,
        Command::RunAll => print_json(&pipeline.run_all()?)?,
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
