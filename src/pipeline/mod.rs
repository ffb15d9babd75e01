//! End-to-end run: resolve data, train, sample and report.

pub mod report;
pub mod sample;
pub mod summary;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::config::RunConfig;
use crate::dataset::{DatasetError, PathResolution, Schema, SchemaError, Table, resolve_data_path};
use crate::ml::TrainBackend;
use crate::ml::scaler::StandardScaler;
use crate::ml::transformer::{TrainError, train_transformer};

pub use report::{ComparisonRow, REPORT_TITLE, comparison_rows, format_thousands, render_table};
pub use sample::{EvalError, predict_prices, recover_target, sample_indices};
pub use summary::{RunSummary, SummaryError, write_summary};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to load dataset: {0}")]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("Training failed: {0}")]
    Train(#[from] TrainError),
    #[error("Sample prediction failed: {0}")]
    Eval(#[from] EvalError),
}

/// Progress notifications emitted while a run advances.
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent<'a> {
    DataMissing { path: &'a Path },
    FallbackFound { path: &'a Path },
    Loading { path: &'a Path },
    FeaturesDetected { features: &'a [String] },
    TrainingStarted,
    TrainingFinished { best_val: f64, test: f64 },
}

#[derive(Debug, Clone)]
pub enum RunStatus {
    /// Neither the configured path nor the fallback exists.
    DataNotFound,
    Completed(RunOutcome),
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub data_path: PathBuf,
    pub schema: Schema,
    pub best_val: f64,
    pub test: f64,
    pub epochs_run: usize,
    pub x_scaler: StandardScaler,
    pub y_scaler: StandardScaler,
    pub target_log: bool,
    pub rows: Vec<ComparisonRow>,
}

impl RunOutcome {
    pub fn render(&self) -> String {
        format!(
            "{REPORT_TITLE}\n{}",
            render_table(&self.schema.target, &self.rows)
        )
    }
}

/// Execute the whole run on the CPU training backend.
pub fn run(
    config: &RunConfig,
    on_event: &mut dyn FnMut(RunEvent<'_>),
) -> Result<RunStatus, PipelineError> {
    let resolution = resolve_data_path(&config.data.path, &config.data.fallback_path);
    let data_path = match resolution {
        PathResolution::Primary(path) => path,
        PathResolution::Fallback { missing, found } => {
            on_event(RunEvent::DataMissing { path: &missing });
            on_event(RunEvent::FallbackFound { path: &found });
            found
        }
        PathResolution::NotFound { missing, .. } => {
            on_event(RunEvent::DataMissing { path: &missing });
            return Ok(RunStatus::DataNotFound);
        }
    };

    on_event(RunEvent::Loading { path: &data_path });
    let table = Table::from_csv_path(&data_path)?;
    info!(
        "Loaded {} rows x {} columns from {}",
        table.len(),
        table.columns().len(),
        data_path.display()
    );
    let schema = Schema::resolve(&table, &config.data.target_column)?;
    on_event(RunEvent::FeaturesDetected {
        features: &schema.feature_cols,
    });

    on_event(RunEvent::TrainingStarted);
    let device = Default::default();
    let result = train_transformer::<TrainBackend>(
        &table,
        &schema.feature_cols,
        &schema.target,
        &config.training,
        &device,
    )?;
    on_event(RunEvent::TrainingFinished {
        best_val: result.best_val,
        test: result.test,
    });

    let picked = sample_indices(table.len(), config.sample.size, config.sample.seed);
    let features = table.select_f32(&picked, schema.feature_indices());
    let predicted = result.predict_prices(&features, &device)?;
    let actual = table.column_values(&picked, schema.target_index());
    let rows = comparison_rows(&picked, &actual, &predicted);

    Ok(RunStatus::Completed(RunOutcome {
        data_path,
        schema,
        best_val: result.best_val,
        test: result.test,
        epochs_run: result.epochs_run,
        x_scaler: result.x_scaler,
        y_scaler: result.y_scaler,
        target_log: result.target_log,
        rows,
    }))
}
