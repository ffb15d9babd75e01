//! JSON export of a completed run.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use super::RunOutcome;
use super::report::ComparisonRow;
use crate::ml::scaler::StandardScaler;

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("Failed to encode run summary: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Serializable view of a [`RunOutcome`].
#[derive(Debug, Serialize)]
pub struct RunSummary<'a> {
    pub data_path: &'a Path,
    pub target: &'a str,
    pub feature_cols: &'a [String],
    pub best_val: f64,
    pub test: f64,
    pub epochs_run: usize,
    pub target_log: bool,
    pub x_scaler: &'a StandardScaler,
    pub y_scaler: &'a StandardScaler,
    pub rows: &'a [ComparisonRow],
}

impl<'a> From<&'a RunOutcome> for RunSummary<'a> {
    fn from(outcome: &'a RunOutcome) -> Self {
        Self {
            data_path: &outcome.data_path,
            target: &outcome.schema.target,
            feature_cols: &outcome.schema.feature_cols,
            best_val: outcome.best_val,
            test: outcome.test,
            epochs_run: outcome.epochs_run,
            target_log: outcome.target_log,
            x_scaler: &outcome.x_scaler,
            y_scaler: &outcome.y_scaler,
            rows: &outcome.rows,
        }
    }
}

/// Write `outcome` to `path` as pretty-printed JSON.
pub fn write_summary(path: &Path, outcome: &RunOutcome) -> Result<(), SummaryError> {
    let json = serde_json::to_string_pretty(&RunSummary::from(outcome))?;
    std::fs::write(path, json).map_err(|source| SummaryError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Schema, Table};

    fn outcome() -> RunOutcome {
        let table = Table::new(
            vec!["area".into(), "낙찰가".into()],
            vec![vec![1.0, 100.0], vec![2.0, 200.0]],
        )
        .unwrap();
        RunOutcome {
            data_path: PathBuf::from("bids.csv"),
            schema: Schema::resolve(&table, "낙찰가").unwrap(),
            best_val: 0.25,
            test: 0.5,
            epochs_run: 3,
            x_scaler: StandardScaler {
                mean: vec![1.5],
                scale: vec![0.5],
            },
            y_scaler: StandardScaler {
                mean: vec![5.0],
                scale: vec![0.3],
            },
            target_log: true,
            rows: vec![ComparisonRow::new(1, 200.0, 210.0)],
        }
    }

    #[test]
    fn summary_json_carries_metrics_scalers_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        write_summary(&path, &outcome()).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["target"], "낙찰가");
        assert_eq!(value["feature_cols"], serde_json::json!(["area"]));
        assert_eq!(value["epochs_run"], 3);
        assert_eq!(value["target_log"], true);
        assert_eq!(value["x_scaler"]["mean"], serde_json::json!([1.5]));
        assert_eq!(value["rows"][0]["row_index"], 1);
        assert_eq!(value["rows"][0]["error"], 10.0);
    }

    #[test]
    fn unwritable_path_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("summary.json");
        let err = write_summary(&path, &outcome()).unwrap_err();
        assert!(matches!(err, SummaryError::Write { .. }));
    }
}
