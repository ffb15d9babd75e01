//! Feature-token transformer regressor and its training loop.

mod input;
mod model;
mod train;

pub use input::{InputRank, ModelInput, Regressor, ShapeError};
pub use model::{TabularTransformer, TabularTransformerConfig};
pub use train::{
    MIN_TRAINING_ROWS, SplitIndices, TrainError, TrainOptions, TrainingResult, split_indices,
    train_transformer,
};
