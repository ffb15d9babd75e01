//! Input layouts a regressor can declare, and the inference seam that checks them.

use burn::tensor::Tensor;
use burn::tensor::backend::Backend;
use thiserror::Error;

/// Tensor layout a regressor accepts for a batch of feature rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRank {
    /// `[rows, features]`
    Flat,
    /// `[rows, features, 1]`, one token per feature.
    Tokens,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShapeError {
    #[error("Model expects {expected:?} input, got {actual:?}")]
    RankMismatch {
        expected: InputRank,
        actual: InputRank,
    },
    #[error("Model expects {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },
    #[error("Token input must have a trailing dimension of 1, got {0}")]
    TokenWidth(usize),
}

/// A batch shaped for a specific [`InputRank`].
#[derive(Debug, Clone)]
pub enum ModelInput<B: Backend> {
    Flat(Tensor<B, 2>),
    Tokens(Tensor<B, 3>),
}

impl<B: Backend> ModelInput<B> {
    /// Lay out a `[rows, features]` batch the way `rank` declares.
    pub fn shaped(rows: Tensor<B, 2>, rank: InputRank) -> Self {
        match rank {
            InputRank::Flat => Self::Flat(rows),
            InputRank::Tokens => {
                let [batch, features] = rows.dims();
                Self::Tokens(rows.reshape([batch, features, 1]))
            }
        }
    }

    pub fn rank(&self) -> InputRank {
        match self {
            Self::Flat(_) => InputRank::Flat,
            Self::Tokens(_) => InputRank::Tokens,
        }
    }
}

/// Inference seam between the evaluator and a trained model.
pub trait Regressor<B: Backend> {
    fn input_rank(&self) -> InputRank;

    /// Predict one scaled target per row as a `[rows, 1]` tensor.
    fn predict(&self, input: ModelInput<B>) -> Result<Tensor<B, 2>, ShapeError>;
}
