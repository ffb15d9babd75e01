//! Per-column standardization fitted on training rows.

use serde::{Deserialize, Serialize};

/// Zero-mean, unit-variance scaler for fixed-width `f32` rows.
///
/// Statistics are accumulated in `f64`; a column with zero variance keeps a
/// scale of `1.0` so it passes through centered but unscaled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(rows: &[Vec<f32>]) -> Result<Self, String> {
        let Some(first) = rows.first() else {
            return Err("Cannot fit scaler on zero rows".to_string());
        };
        let width = first.len();
        if rows.iter().any(|row| row.len() != width) {
            return Err("Inconsistent row width while fitting scaler".to_string());
        }
        let n = rows.len() as f64;
        let mut mean = vec![0.0f64; width];
        for row in rows {
            for (acc, &value) in mean.iter_mut().zip(row) {
                *acc += value as f64;
            }
        }
        for value in &mut mean {
            *value /= n;
        }
        let mut scale = vec![0.0f64; width];
        for row in rows {
            for ((acc, &value), &m) in scale.iter_mut().zip(row).zip(&mean) {
                let diff = value as f64 - m;
                *acc += diff * diff;
            }
        }
        for value in &mut scale {
            let std = (*value / n).sqrt();
            *value = if std > f64::EPSILON && std.is_finite() { std } else { 1.0 };
        }
        Ok(Self { mean, scale })
    }

    pub fn width(&self) -> usize {
        self.mean.len()
    }

    pub fn transform(&self, rows: &[Vec<f32>]) -> Result<Vec<Vec<f32>>, String> {
        rows.iter()
            .map(|row| {
                self.check_width(row)?;
                Ok(row
                    .iter()
                    .zip(self.mean.iter().zip(&self.scale))
                    .map(|(&value, (&mean, &scale))| ((value as f64 - mean) / scale) as f32)
                    .collect())
            })
            .collect()
    }

    pub fn inverse_transform(&self, rows: &[Vec<f32>]) -> Result<Vec<Vec<f64>>, String> {
        rows.iter()
            .map(|row| {
                self.check_width(row)?;
                Ok(row
                    .iter()
                    .zip(self.mean.iter().zip(&self.scale))
                    .map(|(&value, (&mean, &scale))| value as f64 * scale + mean)
                    .collect())
            })
            .collect()
    }

    fn check_width(&self, row: &[f32]) -> Result<(), String> {
        if row.len() != self.width() {
            return Err(format!(
                "Scaler expects {} columns, got {}",
                self.width(),
                row.len()
            ));
        }
        Ok(())
    }
}
