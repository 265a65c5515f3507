use std::fs;
use std::path::{Path, PathBuf};

use log::{error, info, warn};
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::scenario::Scenario;
use crate::validate::{ValidationReport, validate_scenario};

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("batch I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to write results: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

pub struct BatchConfig {
    pub scenarios_dir: PathBuf,
    pub output_file: PathBuf,
    /// Worker thread count; 0 means one per available CPU.
    pub workers: usize,
}

/// Result of evaluating one scenario file. A file that fails to load or has
/// a malformed network records its error here rather than aborting the batch.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    pub scenario_id: String,
    pub file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub overall_valid: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub total_scenarios: usize,
    pub valid_scenarios: usize,
    pub invalid_scenarios: usize,
    pub valid_percentage: f64,
    pub results: Vec<ScenarioOutcome>,
}

/// Evaluates a single scenario file.
pub fn evaluate_scenario(path: &Path) -> ScenarioOutcome {
    let scenario_id = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_path = path.display().to_string();
    info!("evaluating scenario {scenario_id}");

    let result = Scenario::from_path(path)
        .map_err(|e| e.to_string())
        .and_then(|scenario| validate_scenario(&scenario).map_err(|e| e.to_string()));

    match result {
        Ok(report) => {
            let overall_valid = report.is_valid;
            info!(
                "evaluation complete for {scenario_id}: {}",
                if overall_valid { "VALID" } else { "INVALID" }
            );
            ScenarioOutcome {
                scenario_id,
                file_path,
                validation: Some(report),
                error: None,
                overall_valid,
            }
        }
        Err(err) => {
            error!("error evaluating scenario {file_path}: {err}");
            ScenarioOutcome {
                scenario_id,
                file_path,
                validation: None,
                error: Some(err),
                overall_valid: false,
            }
        }
    }
}

/// Evaluates every `*.json` scenario in a directory on a worker pool and
/// writes a summary document to `output_file`.
///
/// Each validation is self-contained, so the scenarios fan out with no
/// shared state. The file list is sorted to keep the output deterministic.
pub fn evaluate_dir(config: &BatchConfig) -> Result<BatchSummary, BatchError> {
    let mut files: Vec<PathBuf> = fs::read_dir(&config.scenarios_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();

    if files.is_empty() {
        warn!(
            "no scenario files found in {}",
            config.scenarios_dir.display()
        );
    }

    let workers = if config.workers == 0 {
        num_cpus::get()
    } else {
        config.workers
    };
    let pool = ThreadPoolBuilder::new().num_threads(workers).build()?;

    info!("evaluating {} scenarios using {workers} workers", files.len());

    let results: Vec<ScenarioOutcome> =
        pool.install(|| files.par_iter().map(|path| evaluate_scenario(path)).collect());

    let total_scenarios = results.len();
    let valid_scenarios = results.iter().filter(|r| r.overall_valid).count();
    let summary = BatchSummary {
        total_scenarios,
        valid_scenarios,
        invalid_scenarios: total_scenarios - valid_scenarios,
        valid_percentage: if total_scenarios > 0 {
            valid_scenarios as f64 / total_scenarios as f64 * 100.0
        } else {
            0.0
        },
        results,
    };

    if let Some(parent) = config.output_file.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = fs::File::create(&config.output_file)?;
    serde_json::to_writer_pretty(file, &summary)?;

    info!(
        "evaluation complete: {valid_scenarios}/{total_scenarios} valid scenarios ({:.2}%)",
        summary.valid_percentage
    );
    info!("results saved to {}", config.output_file.display());

    Ok(summary)
}
