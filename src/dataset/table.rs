//! In-memory numeric table loaded from a headered CSV file.

use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to open {path}: {source}")]
    Open { path: PathBuf, source: csv::Error },
    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV has no header columns")]
    NoColumns,
    #[error("Duplicate column '{0}' in CSV header")]
    DuplicateColumn(String),
    /// `line` is the 1-based CSV line; the header is line 1.
    #[error("Line {line} has {found} cells (expected {expected})")]
    RaggedRow {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("Line {line}, column '{column}': '{value}' is not a number")]
    NonNumeric {
        line: u64,
        column: String,
        value: String,
    },
    #[error("Table row index {index} has {found} cells (expected {expected})")]
    RowWidth {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),
}

/// Ordered columns and row-major numeric cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl Table {
    /// Build a table, checking that every row matches the column count.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self, DatasetError> {
        if columns.is_empty() {
            return Err(DatasetError::NoColumns);
        }
        for (idx, name) in columns.iter().enumerate() {
            if columns[..idx].contains(name) {
                return Err(DatasetError::DuplicateColumn(name.clone()));
            }
        }
        for (index, cells) in rows.iter().enumerate() {
            if cells.len() != columns.len() {
                return Err(DatasetError::RowWidth {
                    index,
                    expected: columns.len(),
                    found: cells.len(),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    pub fn from_csv_path(path: &Path) -> Result<Self, DatasetError> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .map_err(|source| DatasetError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_csv(reader)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        Self::from_csv(reader)
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, DatasetError> {
        let columns: Vec<String> = reader
            .headers()?
            .iter()
            .enumerate()
            // Excel exports prefix the first header with a UTF-8 BOM.
            .map(|(idx, name)| {
                let name = if idx == 0 { name.trim_start_matches('\u{feff}') } else { name };
                name.trim().to_string()
            })
            .collect();
        if columns.iter().all(|name| name.is_empty()) {
            return Err(DatasetError::NoColumns);
        }

        let mut rows = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record?;
            let line = record
                .position()
                .map_or(idx as u64 + 2, |position| position.line());
            if record.len() != columns.len() {
                return Err(DatasetError::RaggedRow {
                    line,
                    expected: columns.len(),
                    found: record.len(),
                });
            }
            let mut cells = Vec::with_capacity(columns.len());
            for (column, raw) in columns.iter().zip(record.iter()) {
                let value = raw.trim().parse::<f64>().map_err(|_| DatasetError::NonNumeric {
                    line,
                    column: column.clone(),
                    value: raw.to_string(),
                })?;
                cells.push(value);
            }
            rows.push(cells);
        }
        Self::new(columns, rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Resolve column names to indices, failing on the first unknown name.
    pub fn column_indices(&self, names: &[String]) -> Result<Vec<usize>, DatasetError> {
        names
            .iter()
            .map(|name| {
                self.column_index(name)
                    .ok_or_else(|| DatasetError::UnknownColumn(name.clone()))
            })
            .collect()
    }

    /// Copy the given columns of the given rows into an `f32` matrix.
    pub fn select_f32(&self, row_indices: &[usize], column_indices: &[usize]) -> Vec<Vec<f32>> {
        row_indices
            .iter()
            .map(|&row| {
                column_indices
                    .iter()
                    .map(|&col| self.rows[row][col] as f32)
                    .collect()
            })
            .collect()
    }

    pub fn column_values(&self, row_indices: &[usize], column: usize) -> Vec<f64> {
        row_indices.iter().map(|&row| self.rows[row][column]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_and_numeric_rows() {
        let csv = "feat_a, feat_b ,낙찰가\n1,2.5,1000\n-3, 4 ,2e3\n";
        let table = Table::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.columns(), ["feat_a", "feat_b", "낙찰가"]);
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.select_f32(&[0, 1], &[0, 1, 2]),
            vec![vec![1.0, 2.5, 1000.0], vec![-3.0, 4.0, 2000.0]]
        );
    }

    #[test]
    fn strips_byte_order_mark_from_first_header() {
        let csv = "\u{feff}a,b\n1,2\n";
        let table = Table::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.column_index("a"), Some(0));
    }

    #[test]
    fn non_numeric_cell_names_row_and_column() {
        let csv = "a,b\n1,2\n3,abc\n";
        let err = Table::from_csv_reader(csv.as_bytes()).unwrap_err();
        match err {
            DatasetError::NonNumeric { line, column, value } => {
                assert_eq!(line, 3);
                assert_eq!(column, "b");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_cell_is_rejected() {
        let csv = "a,b\n1,\n";
        let err = Table::from_csv_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DatasetError::NonNumeric { line: 2, .. }));
        assert!(err.to_string().starts_with("Line 2, column 'b'"));
    }

    #[test]
    fn ragged_row_is_rejected() {
        let csv = "a,b,c\n1,2,3\n4,5\n";
        let err = Table::from_csv_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::RaggedRow {
                line: 3,
                expected: 3,
                found: 2
            }
        ));
        let err = Table::new(vec!["a".into(), "b".into()], vec![vec![1.0]]).unwrap_err();
        assert!(matches!(err, DatasetError::RowWidth { index: 0, .. }));
    }

    #[test]
    fn duplicate_header_is_rejected() {
        let err = Table::new(vec!["a".into(), "a".into()], Vec::new()).unwrap_err();
        assert!(matches!(err, DatasetError::DuplicateColumn(name) if name == "a"));
    }

    #[test]
    fn select_f32_follows_requested_order() {
        let table = Table::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]],
        )
        .unwrap();
        let picked = table.select_f32(&[1, 0], &[2, 0]);
        assert_eq!(picked, vec![vec![6.0, 4.0], vec![3.0, 1.0]]);
        assert_eq!(table.column_values(&[1], 1), vec![5.0]);
    }
}
