//! Post-training sanity sample: draw rows, predict, recover prices.

use burn::tensor::backend::Backend;
use burn::tensor::{Tensor, TensorData};
use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;

use crate::ml::scaler::StandardScaler;
use crate::ml::transformer::{ModelInput, Regressor, ShapeError, TrainingResult};

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("Model input shape error: {0}")]
    Shape(#[from] ShapeError),
    #[error("Scaler error: {0}")]
    Scaler(String),
    #[error("Model returned shape {found:?} (expected [{rows}, 1])")]
    OutputShape { rows: usize, found: Vec<usize> },
    #[error("Failed to read model output: {0}")]
    Tensor(String),
}

/// Deterministically draw `min(size, rows)` distinct row indices.
pub fn sample_indices(rows: usize, size: usize, seed: u64) -> Vec<usize> {
    let amount = size.min(rows);
    let mut rng = StdRng::seed_from_u64(seed);
    rand::seq::index::sample(&mut rng, rows, amount).into_vec()
}

/// Undo the training-time target transform on an inverse-scaled prediction.
pub fn recover_target(value: f64, target_log: bool) -> f64 {
    if target_log { value.exp_m1() } else { value }
}

/// Run `model` on already scaled rows in the rank it declares.
pub fn predict_scaled<B: Backend, M: Regressor<B>>(
    model: &M,
    scaled: &[Vec<f32>],
    device: &B::Device,
) -> Result<Vec<f32>, EvalError> {
    let rows = scaled.len();
    if rows == 0 {
        return Ok(Vec::new());
    }
    let width = scaled[0].len();
    let flat: Vec<f32> = scaled.iter().flatten().copied().collect();
    let batch = Tensor::<B, 2>::from_data(TensorData::new(flat, [rows, width]), device);
    let output = model.predict(ModelInput::shaped(batch, model.input_rank()))?;
    let dims = output.dims();
    if dims != [rows, 1] {
        return Err(EvalError::OutputShape {
            rows,
            found: dims.to_vec(),
        });
    }
    output
        .into_data()
        .to_vec::<f32>()
        .map_err(|err| EvalError::Tensor(format!("{err:?}")))
}

/// Scale raw feature rows, predict, inverse-scale and invert the log transform.
pub fn predict_prices<B: Backend, M: Regressor<B>>(
    model: &M,
    x_scaler: &StandardScaler,
    y_scaler: &StandardScaler,
    target_log: bool,
    features: &[Vec<f32>],
    device: &B::Device,
) -> Result<Vec<f64>, EvalError> {
    let scaled = x_scaler.transform(features).map_err(EvalError::Scaler)?;
    let predicted: Vec<Vec<f32>> = predict_scaled(model, &scaled, device)?
        .into_iter()
        .map(|value| vec![value])
        .collect();
    let restored = y_scaler
        .inverse_transform(&predicted)
        .map_err(EvalError::Scaler)?;
    Ok(restored
        .into_iter()
        .map(|row| recover_target(row[0], target_log))
        .collect())
}

impl<B: Backend> TrainingResult<B> {
    /// Predict prices for raw (unscaled) feature rows.
    pub fn predict_prices(
        &self,
        features: &[Vec<f32>],
        device: &B::Device,
    ) -> Result<Vec<f64>, EvalError> {
        predict_prices(
            &self.model,
            &self.x_scaler,
            &self.y_scaler,
            self.target_log,
            features,
            device,
        )
    }
}
