//! Target/feature column split for a loaded table.

use thiserror::Error;

use super::Table;

/// Winning bid amount column in the procurement dataset exports.
pub const DEFAULT_TARGET_COLUMN: &str = "낙찰가";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("CSV has no target column '{target}' (columns: {})", .available.join(", "))]
    MissingTarget {
        target: String,
        available: Vec<String>,
    },
    #[error("CSV has no feature columns besides target '{0}'")]
    NoFeatures(String),
}

/// Resolved target column plus every other column as a feature, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub target: String,
    pub feature_cols: Vec<String>,
    target_index: usize,
    feature_indices: Vec<usize>,
}

impl Schema {
    pub fn resolve(table: &Table, target: &str) -> Result<Self, SchemaError> {
        let target_index =
            table
                .column_index(target)
                .ok_or_else(|| SchemaError::MissingTarget {
                    target: target.to_string(),
                    available: table.columns().to_vec(),
                })?;
        let (feature_indices, feature_cols): (Vec<usize>, Vec<String>) = table
            .columns()
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != target_index)
            .map(|(idx, name)| (idx, name.clone()))
            .unzip();
        if feature_cols.is_empty() {
            return Err(SchemaError::NoFeatures(target.to_string()));
        }
        Ok(Self {
            target: target.to_string(),
            feature_cols,
            target_index,
            feature_indices,
        })
    }

    pub fn target_index(&self) -> usize {
        self.target_index
    }

    pub fn feature_indices(&self) -> &[usize] {
        &self.feature_indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str]) -> Table {
        let columns: Vec<String> = columns.iter().map(|name| name.to_string()).collect();
        let row = vec![0.0; columns.len()];
        Table::new(columns, vec![row]).unwrap()
    }

    #[test]
    fn features_are_all_columns_except_target_in_order() {
        let table = table(&["z", DEFAULT_TARGET_COLUMN, "a", "m"]);
        let schema = Schema::resolve(&table, DEFAULT_TARGET_COLUMN).unwrap();
        assert_eq!(schema.feature_cols, ["z", "a", "m"]);
        assert_eq!(schema.feature_indices(), [0, 2, 3]);
        assert_eq!(schema.target_index(), 1);
    }

    #[test]
    fn missing_target_is_descriptive() {
        let table = table(&["feat_a", "feat_b"]);
        let err = Schema::resolve(&table, DEFAULT_TARGET_COLUMN).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingTarget {
                target: DEFAULT_TARGET_COLUMN.to_string(),
                available: vec!["feat_a".into(), "feat_b".into()],
            }
        );
        let message = err.to_string();
        assert!(message.contains(DEFAULT_TARGET_COLUMN));
        assert!(message.contains("feat_a, feat_b"));
    }

    #[test]
    fn target_only_table_has_no_features() {
        let table = table(&[DEFAULT_TARGET_COLUMN]);
        let err = Schema::resolve(&table, DEFAULT_TARGET_COLUMN).unwrap_err();
        assert!(matches!(err, SchemaError::NoFeatures(_)));
    }
}
