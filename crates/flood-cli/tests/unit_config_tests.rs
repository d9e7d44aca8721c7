//! Unit tests for AppConfig layering and argument parsing

use clap::Parser;
use flood_cli::cli::{self, Cli, Command};
use flood_cli::config::AppConfig;
use std::path::PathBuf;
use tempfile::TempDir;

// ========== Argument Parsing Tests ==========

#[test]
fn test_parse_subcommands() {
    let cases = [
        ("build-features", Command::BuildFeatures),
        ("train", Command::Train),
        ("infer", Command::Infer),
        ("evaluate", Command::Evaluate),
        ("run-all", Command::RunAll),
    ];
    for (arg, expected) in cases {
        let cli = Cli::try_parse_from(["flood", arg]).unwrap();
        assert_eq!(cli.command, expected);
    }
}

#[test]
fn test_parse_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "flood",
        "train",
        "--project-root",
        "/srv/flood",
        "--city",
        "mumbai",
        "--seed",
        "5",
    ])
    .unwrap();

    assert_eq!(cli.project_root, Some(PathBuf::from("/srv/flood")));
    assert_eq!(cli.city.as_deref(), Some("mumbai"));
    assert_eq!(cli.seed, Some(5));
}

#[test]
fn test_unknown_subcommand_rejected() {
    assert!(Cli::try_parse_from(["flood", "serve"]).is_err());
}

// ========== Config Layering Tests ==========

#[test]
fn test_flags_override_loaded_config() {
    let loaded = AppConfig {
        city: Some("delhi".to_string()),
        seed: Some(1),
        top_n_importances: Some(10),
        ..AppConfig::default()
    };
    let cli = Cli::try_parse_from(["flood", "run-all", "--city", "pune"]).unwrap();

    let app = cli.apply(loaded);
    assert_eq!(app.city.as_deref(), Some("pune"));
    assert_eq!(app.seed, Some(1));

    let config = app.into_pipeline_config().unwrap();
    assert_eq!(config.city, "pune");
    assert_eq!(config.top_n_importances, 10);
}

#[test]
fn test_load_from_yaml_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("flood.yaml"),
        "city: kolkata\nseed: 11\ntop_n_importances: 8\n",
    )
    .unwrap();

    let name = dir.path().join("flood");
    let app = AppConfig::load_from(name.to_str().unwrap()).unwrap();
    assert_eq!(app.city.as_deref(), Some("kolkata"));
    assert_eq!(app.seed, Some(11));
    assert_eq!(app.top_n_importances, Some(8));
}

#[test]
fn test_pipeline_file_is_loaded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pipeline.json");
    std::fs::write(
        &path,
        r#"{"city": "hyderabad", "seed": 99, "trainer": {"candidates": [
            {"family": "extra_trees", "n_estimators": 5}
        ]}}"#,
    )
    .unwrap();

    let app = AppConfig {
        pipeline_file: Some(path),
        seed: Some(4),
        ..AppConfig::default()
    };
    let config = app.into_pipeline_config().unwrap();
    assert_eq!(config.city, "hyderabad");
    assert_eq!(config.seed, 4);
    assert_eq!(config.trainer.candidates.len(), 1);
}

#[test]
fn test_missing_pipeline_file() {
    let app = AppConfig {
        pipeline_file: Some(PathBuf::from("/nonexistent/pipeline.yaml")),
        ..AppConfig::default()
    };
    let err = app.into_pipeline_config().unwrap_err();
    assert!(err.to_string().contains("Pipeline config not found"));
}

// ========== Command Tests ==========

#[test]
fn test_evaluate_without_scores_fails() {
    let dir = TempDir::new().unwrap();
    let app = AppConfig {
        project_root: Some(dir.path().to_path_buf()),
        ..AppConfig::default()
    };

    let err = cli::run(Command::Evaluate, app).unwrap_err();
    assert!(err.to_string().starts_with("Scores not found"));
}
