//! Trains the winning-bid price regressor and prints a sample comparison.

use std::path::PathBuf;

use nakchal::config::{self, RunConfig};
use nakchal::logging::{self, LogFile};
use nakchal::pipeline::{self, RunEvent, RunStatus};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    init_logging(options.log_file.clone());

    let mut config = match &options.config_path {
        Some(path) => config::load_from_path(path),
        None => config::load_or_default(),
    }
    .map_err(|err| err.to_string())?;
    apply_overrides(&mut config, &options);
    config.validate().map_err(|err| err.to_string())?;

    let status = pipeline::run(&config, &mut print_event).map_err(|err| err.to_string())?;
    if let RunStatus::Completed(outcome) = status {
        println!();
        print!("{}", outcome.render());
        if let Some(path) = &options.summary_out {
            pipeline::write_summary(path, &outcome).map_err(|err| err.to_string())?;
            println!("Saved run summary to {}", path.display());
        }
    }
    Ok(())
}

fn init_logging(file: LogFile) {
    let wants_file = file != LogFile::Disabled;
    match logging::init(file) {
        Ok(Some(path)) => eprintln!("Writing log file: {}", path.display()),
        Ok(None) => {}
        Err(err) if wants_file => {
            eprintln!("File logging disabled: {err}");
            if let Err(err) = logging::init(LogFile::Disabled) {
                eprintln!("Logging disabled: {err}");
            }
        }
        Err(err) => eprintln!("Logging disabled: {err}"),
    }
}

fn print_event(event: RunEvent<'_>) {
    match event {
        RunEvent::DataMissing { path } => {
            println!("Data file not found: {}", path.display());
        }
        RunEvent::FallbackFound { path } => {
            println!("Found data file in current directory: {}", path.display());
        }
        RunEvent::Loading { path } => println!("Loading data from: {}", path.display()),
        RunEvent::FeaturesDetected { features } => {
            println!(
                "Detected input features ({}): [{}]",
                features.len(),
                features.join(", ")
            );
        }
        RunEvent::TrainingStarted => println!("Training started..."),
        RunEvent::TrainingFinished { best_val, test } => {
            println!();
            println!("Best VAL loss: {best_val}");
            println!("TEST loss: {test}");
        }
    }
}

#[derive(Debug, Clone, Default)]
struct CliOptions {
    config_path: Option<PathBuf>,
    data_path: Option<PathBuf>,
    epochs: Option<usize>,
    seed: Option<u64>,
    summary_out: Option<PathBuf>,
    log_file: LogFile,
}

fn apply_overrides(config: &mut RunConfig, options: &CliOptions) {
    if let Some(path) = &options.data_path {
        config.data.path = path.clone();
    }
    if let Some(epochs) = options.epochs {
        config.training.epochs = epochs;
    }
    if let Some(seed) = options.seed {
        config.training.seed = seed;
        config.sample.seed = seed;
    }
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--config" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--config requires a value".to_string())?;
                options.config_path = Some(PathBuf::from(value));
            }
            "--data" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--data requires a value".to_string())?;
                options.data_path = Some(PathBuf::from(value));
            }
            "--summary-out" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--summary-out requires a value".to_string())?;
                options.summary_out = Some(PathBuf::from(value));
            }
            "--log-file" => options.log_file = LogFile::AppDir,
            "--log-dir" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--log-dir requires a value".to_string())?;
                options.log_file = LogFile::Dir(PathBuf::from(value));
            }
            "--epochs" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--epochs requires a value".to_string())?;
                options.epochs = Some(
                    value
                        .parse::<usize>()
                        .map_err(|_| format!("Invalid --epochs value: {value}"))?,
                );
            }
            "--seed" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--seed requires a value".to_string())?;
                options.seed = Some(
                    value
                        .parse::<u64>()
                        .map_err(|_| format!("Invalid --seed value: {value}"))?,
                );
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }
    Ok(options)
}

fn help_text() -> String {
    [
        "nakchal",
        "",
        "Trains the winning-bid (낙찰가) transformer regressor on a CSV dataset and",
        "prints predictions for a small sample next to the actual prices.",
        "",
        "Usage:",
        "  nakchal [--data <csv>] [--config <toml>]",
        "",
        "Options:",
        "  --data <csv>      Dataset path (default ../dataset/dataset_feature_selected.csv,",
        "                    falling back to ./dataset_feature_selected.csv)",
        "  --config <toml>   Run configuration (default: config.toml in the app directory)",
        "  --epochs <n>      Training epochs (default 50)",
        "  --seed <n>        Split, shuffle and sample seed (default 42)",
        "  --summary-out <json>",
        "                    Write metrics, scalers and sample rows as JSON",
        "  --log-file        Also write a log file under <app dir>/logs",
        "  --log-dir <dir>   Also write a log file into <dir>",
    ]
    .join("\n")
}
