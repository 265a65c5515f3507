use std::path::Path;
use std::process::ExitCode;

use log::{error, info};

use gridcheck::batch::{BatchConfig, evaluate_dir};
use gridcheck::scenario::Scenario;
use gridcheck::validate::validate_scenario;

fn main() -> ExitCode {
    // establish logger, default level info, overridable via RUST_LOG
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [path] if Path::new(path).is_file() => run_single(path),
        [dir, output] => run_batch(dir, output, 0),
        [dir, output, workers] => match workers.parse() {
            Ok(workers) => run_batch(dir, output, workers),
            Err(_) => {
                eprintln!("invalid worker count: {workers}");
                ExitCode::FAILURE
            }
        },
        _ => {
            eprintln!("usage: gridcheck <scenario.json>");
            eprintln!("       gridcheck <scenarios_dir> <output.json> [workers]");
            ExitCode::FAILURE
        }
    }
}

// Validate one scenario and print its report. Exit 0 if valid, 2 if invalid.
fn run_single(path: &str) -> ExitCode {
    let scenario = match Scenario::from_path(path) {
        Ok(scenario) => scenario,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    match validate_scenario(&scenario) {
        Ok(report) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).expect("report serialization cannot fail")
            );
            if report.is_valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            }
        }
        Err(e) => {
            error!("malformed network: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_batch(dir: &str, output: &str, workers: usize) -> ExitCode {
    let config = BatchConfig {
        scenarios_dir: dir.into(),
        output_file: output.into(),
        workers,
    };
    match evaluate_dir(&config) {
        Ok(summary) => {
            info!(
                "{}/{} scenarios valid",
                summary.valid_scenarios, summary.total_scenarios
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("batch evaluation failed: {e}");
            ExitCode::FAILURE
        }
    }
}
