//! Seeded splitting and the AdamW training loop for [`TabularTransformer`].

use burn::module::AutodiffModule;
use burn::nn::loss::{MseLoss, Reduction};
use burn::optim::{AdamWConfig, GradientsParams, Optimizer};
use burn::tensor::backend::{AutodiffBackend, Backend};
use burn::tensor::{ElementConversion, Tensor, TensorData};
use rand::rngs::StdRng;
use rand::{SeedableRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::model::{TabularTransformer, TabularTransformerConfig};
use crate::dataset::{DatasetError, Table};
use crate::ml::metrics;
use crate::ml::scaler::StandardScaler;

/// Minimum rows needed to carve out non-empty train, val and test splits.
pub const MIN_TRAINING_ROWS: usize = 3;

/// Training hyperparameters for [`train_transformer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainOptions {
    /// Train on `ln(1 + target)` and report predictions through `exp(x) - 1`.
    pub target_log: bool,
    pub epochs: usize,
    /// Epochs without validation improvement before stopping; `0` disables.
    pub patience: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub weight_decay: f64,
    pub d_model: usize,
    pub n_heads: usize,
    pub n_layers: usize,
    pub dim_feedforward: usize,
    pub dropout: f64,
    /// Log every epoch at info level instead of debug.
    pub verbose: bool,
    pub val_fraction: f64,
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            target_log: true,
            epochs: 50,
            patience: 10,
            batch_size: 64,
            learning_rate: 1e-4,
            weight_decay: 1e-4,
            d_model: 512,
            n_heads: 4,
            n_layers: 2,
            dim_feedforward: 2048,
            dropout: 0.1,
            verbose: true,
            val_fraction: 0.15,
            test_fraction: 0.15,
            seed: 42,
        }
    }
}

impl TrainOptions {
    pub fn validate(&self) -> Result<(), String> {
        if self.epochs == 0 {
            return Err("epochs must be at least 1".to_string());
        }
        if self.batch_size == 0 {
            return Err("batch_size must be at least 1".to_string());
        }
        if !self.learning_rate.is_finite() || self.learning_rate < 0.0 {
            return Err(format!("Invalid learning_rate {}", self.learning_rate));
        }
        if !self.weight_decay.is_finite() || self.weight_decay < 0.0 {
            return Err(format!("Invalid weight_decay {}", self.weight_decay));
        }
        let fraction_ok = |f: f64| f > 0.0 && f < 1.0;
        if !fraction_ok(self.val_fraction)
            || !fraction_ok(self.test_fraction)
            || self.val_fraction + self.test_fraction >= 1.0
        {
            return Err(format!(
                "val_fraction {} and test_fraction {} must be in (0, 1) and sum below 1",
                self.val_fraction, self.test_fraction
            ));
        }
        Ok(())
    }

    fn model_config(&self, n_features: usize) -> TabularTransformerConfig {
        TabularTransformerConfig::new(n_features)
            .with_d_model(self.d_model)
            .with_n_heads(self.n_heads)
            .with_n_layers(self.n_layers)
            .with_dim_feedforward(self.dim_feedforward)
            .with_dropout(self.dropout)
    }
}

#[derive(Debug, Error)]
pub enum TrainError {
    #[error("Invalid training options: {0}")]
    InvalidOptions(String),
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),
    #[error("Need at least {min} rows to train, got {rows}")]
    TooFewRows { rows: usize, min: usize },
    #[error("Row {row}: target {value} cannot be log-transformed (must be > -1)")]
    InvalidTarget { row: usize, value: f64 },
    #[error("Scaler error: {0}")]
    Scaler(String),
    #[error("Tensor error: {0}")]
    Tensor(String),
    #[error("Validation loss became non-finite at epoch {epoch}")]
    NonFiniteLoss { epoch: usize },
}

/// Everything a caller needs to run inference on the original price scale.
#[derive(Debug, Clone)]
pub struct TrainingResult<B: Backend> {
    /// Lowest validation MSE in scaled target space.
    pub best_val: f64,
    /// Test MSE of the best model in scaled target space.
    pub test: f64,
    pub x_scaler: StandardScaler,
    pub y_scaler: StandardScaler,
    /// Best model, on a backend without autodiff.
    pub model: TabularTransformer<B>,
    pub target_log: bool,
    pub epochs_run: usize,
}

/// Row indices of a seeded train/val/test split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub val: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..rows` and cut test, then val, from the front.
///
/// Val and test each keep at least one row and train keeps the remainder.
pub fn split_indices(
    rows: usize,
    val_fraction: f64,
    test_fraction: f64,
    seed: u64,
) -> Result<SplitIndices, TrainError> {
    if rows < MIN_TRAINING_ROWS {
        return Err(TrainError::TooFewRows {
            rows,
            min: MIN_TRAINING_ROWS,
        });
    }
    let mut indices: Vec<usize> = (0..rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = ((rows as f64 * test_fraction).round() as usize).clamp(1, rows - 2);
    let n_val = ((rows as f64 * val_fraction).round() as usize).clamp(1, rows - n_test - 1);
    let train = indices.split_off(n_test + n_val);
    let val = indices.split_off(n_test);
    Ok(SplitIndices {
        train,
        val,
        test: indices,
    })
}

/// Train a [`TabularTransformer`] to predict `target_col` from `feature_cols`.
///
/// Scalers are fitted on the train split only. Losses are MSE on the scaled
/// (and, with `target_log`, log-transformed) target.
pub fn train_transformer<B: AutodiffBackend>(
    table: &Table,
    feature_cols: &[String],
    target_col: &str,
    options: &TrainOptions,
    device: &B::Device,
) -> Result<TrainingResult<B::InnerBackend>, TrainError> {
    options.validate().map_err(TrainError::InvalidOptions)?;
    if feature_cols.is_empty() {
        return Err(TrainError::InvalidOptions(
            "feature_cols must not be empty".to_string(),
        ));
    }
    let model_config = options.model_config(feature_cols.len());
    model_config.validate().map_err(TrainError::InvalidOptions)?;

    let feature_indices = table.column_indices(feature_cols)?;
    let target_index = table
        .column_index(target_col)
        .ok_or_else(|| DatasetError::UnknownColumn(target_col.to_string()))?;
    let split = split_indices(
        table.len(),
        options.val_fraction,
        options.test_fraction,
        options.seed,
    )?;

    let all_rows: Vec<usize> = (0..table.len()).collect();
    let features = table.select_f32(&all_rows, &feature_indices);
    let targets = encode_targets(&table.column_values(&all_rows, target_index), options.target_log)?;

    let x_scaler = StandardScaler::fit(&pick(&features, &split.train)).map_err(TrainError::Scaler)?;
    let y_scaler = StandardScaler::fit(&pick(&targets, &split.train)).map_err(TrainError::Scaler)?;
    let xs = x_scaler.transform(&features).map_err(TrainError::Scaler)?;
    let ys = y_scaler.transform(&targets).map_err(TrainError::Scaler)?;

    info!(
        "Training transformer on {} features: {} train / {} val / {} test rows",
        feature_cols.len(),
        split.train.len(),
        split.val.len(),
        split.test.len()
    );

    let mut model = model_config.init::<B>(device);
    let mut optim = AdamWConfig::new()
        .with_weight_decay(options.weight_decay as f32)
        .init::<B, TabularTransformer<B>>();
    let mut rng = StdRng::seed_from_u64(options.seed.wrapping_add(1));
    let mut train_order = split.train.clone();
    let mut best: Option<(f64, TabularTransformer<B::InnerBackend>)> = None;
    let mut since_best = 0usize;
    let mut epochs_run = 0usize;

    for epoch in 1..=options.epochs {
        train_order.shuffle(&mut rng);
        let mut loss_sum = 0.0f64;
        for batch in train_order.chunks(options.batch_size) {
            let (tokens, target) = batch_tensors::<B>(&xs, &ys, batch, device);
            let output = model.forward(tokens);
            let loss = MseLoss::new().forward(output, target, Reduction::Mean);
            loss_sum += loss.clone().into_scalar().elem::<f64>() * batch.len() as f64;
            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optim.step(options.learning_rate, model, grads);
        }
        let train_loss = loss_sum / train_order.len() as f64;
        let val_loss = evaluate_mse(&model.valid(), &xs, &ys, &split.val, options.batch_size, device)?;
        epochs_run = epoch;
        if !val_loss.is_finite() {
            return Err(TrainError::NonFiniteLoss { epoch });
        }

        let improved = best
            .as_ref()
            .is_none_or(|(best_val, _)| val_loss < *best_val);
        if improved {
            best = Some((val_loss, model.valid()));
            since_best = 0;
        } else {
            since_best += 1;
        }
        if options.verbose {
            info!("epoch {epoch}/{}: train={train_loss:.6} val={val_loss:.6}", options.epochs);
        } else {
            debug!("epoch {epoch}/{}: train={train_loss:.6} val={val_loss:.6}", options.epochs);
        }
        if options.patience > 0 && since_best >= options.patience {
            info!("Early stopping after {epoch} epochs (no val improvement for {since_best})");
            break;
        }
    }

    let (best_val, best_model) = best.ok_or(TrainError::NonFiniteLoss { epoch: epochs_run })?;
    let test = evaluate_mse(&best_model, &xs, &ys, &split.test, options.batch_size, device)?;
    Ok(TrainingResult {
        best_val,
        test,
        x_scaler,
        y_scaler,
        model: best_model,
        target_log: options.target_log,
        epochs_run,
    })
}

fn encode_targets(values: &[f64], target_log: bool) -> Result<Vec<Vec<f32>>, TrainError> {
    values
        .iter()
        .enumerate()
        .map(|(row, &value)| {
            if !target_log {
                return Ok(vec![value as f32]);
            }
            if value <= -1.0 || !value.is_finite() {
                return Err(TrainError::InvalidTarget { row, value });
            }
            Ok(vec![value.ln_1p() as f32])
        })
        .collect()
}

fn pick(rows: &[Vec<f32>], indices: &[usize]) -> Vec<Vec<f32>> {
    indices.iter().map(|&idx| rows[idx].clone()).collect()
}

fn batch_tensors<B: Backend>(
    xs: &[Vec<f32>],
    ys: &[Vec<f32>],
    batch: &[usize],
    device: &B::Device,
) -> (Tensor<B, 3>, Tensor<B, 2>) {
    let width = xs.first().map(Vec::len).unwrap_or(0);
    let mut flat_x = Vec::with_capacity(batch.len() * width);
    let mut flat_y = Vec::with_capacity(batch.len());
    for &idx in batch {
        flat_x.extend_from_slice(&xs[idx]);
        flat_y.push(ys[idx][0]);
    }
    let tokens = Tensor::<B, 3>::from_data(TensorData::new(flat_x, [batch.len(), width, 1]), device);
    let target = Tensor::<B, 2>::from_data(TensorData::new(flat_y, [batch.len(), 1]), device);
    (tokens, target)
}

/// Scaled-target MSE of `model` over `indices`, predicted in batches.
fn evaluate_mse<B: Backend>(
    model: &TabularTransformer<B>,
    xs: &[Vec<f32>],
    ys: &[Vec<f32>],
    indices: &[usize],
    batch_size: usize,
    device: &B::Device,
) -> Result<f64, TrainError> {
    let mut predicted = Vec::with_capacity(indices.len());
    for batch in indices.chunks(batch_size) {
        let (tokens, _) = batch_tensors::<B>(xs, ys, batch, device);
        let values = model
            .forward(tokens)
            .into_data()
            .to_vec::<f32>()
            .map_err(|err| TrainError::Tensor(format!("{err:?}")))?;
        predicted.extend(values.into_iter().map(f64::from));
    }
    let actual: Vec<f64> = indices.iter().map(|&idx| f64::from(ys[idx][0])).collect();
    Ok(metrics::mean_squared_error(&predicted, &actual))
}
