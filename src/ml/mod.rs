//! Machine learning helpers for training and inference.
//!
//! Scalers, regression metrics and the burn transformer used to predict
//! winning bid prices.

pub mod metrics;
pub mod scaler;
pub mod transformer;

use burn::backend::{Autodiff, NdArray};

/// CPU backend used for inference.
pub type InferBackend = NdArray;
/// CPU backend with autodiff used for training.
pub type TrainBackend = Autodiff<InferBackend>;
