//! Input CSV lookup with a current-directory fallback.

use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_PATH: &str = "../dataset/dataset_feature_selected.csv";
pub const FALLBACK_DATA_PATH: &str = "./dataset_feature_selected.csv";

/// Outcome of looking up the input CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathResolution {
    /// The primary path exists.
    Primary(PathBuf),
    /// The primary path was missing but the fallback exists.
    Fallback { missing: PathBuf, found: PathBuf },
    /// Neither candidate exists.
    NotFound { missing: PathBuf, fallback: PathBuf },
}

pub fn resolve_data_path(primary: &Path, fallback: &Path) -> PathResolution {
    if primary.is_file() {
        return PathResolution::Primary(primary.to_path_buf());
    }
    if fallback.is_file() {
        return PathResolution::Fallback {
            missing: primary.to_path_buf(),
            found: fallback.to_path_buf(),
        };
    }
    PathResolution::NotFound {
        missing: primary.to_path_buf(),
        fallback: fallback.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn prefers_primary_then_fallback() {
        let dir = tempdir().unwrap();
        let primary = dir.path().join("primary.csv");
        let fallback = dir.path().join("fallback.csv");

        let resolved = resolve_data_path(&primary, &fallback);
        assert_eq!(
            resolved,
            PathResolution::NotFound {
                missing: primary.clone(),
                fallback: fallback.clone(),
            }
        );

        std::fs::write(&fallback, "a\n1\n").unwrap();
        let resolved = resolve_data_path(&primary, &fallback);
        assert_eq!(
            resolved,
            PathResolution::Fallback {
                missing: primary.clone(),
                found: fallback.clone(),
            }
        );

        std::fs::write(&primary, "a\n1\n").unwrap();
        let resolved = resolve_data_path(&primary, &fallback);
        assert_eq!(resolved, PathResolution::Primary(primary.clone()));
    }

    #[test]
    fn directory_is_not_a_data_file() {
        let dir = tempdir().unwrap();
        let resolved = resolve_data_path(dir.path(), &dir.path().join("missing.csv"));
        assert!(matches!(resolved, PathResolution::NotFound { .. }));
    }
}
