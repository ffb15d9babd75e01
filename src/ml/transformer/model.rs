//! Feature-token transformer built from burn encoder layers.

use burn::config::Config;
use burn::module::Module;
use burn::nn::transformer::{TransformerEncoder, TransformerEncoderConfig, TransformerEncoderInput};
use burn::nn::{Embedding, EmbeddingConfig, LayerNorm, LayerNormConfig, Linear, LinearConfig};
use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor};

use super::input::{InputRank, ModelInput, Regressor, ShapeError};

/// Architecture hyperparameters for [`TabularTransformer`].
#[derive(Config, Debug)]
pub struct TabularTransformerConfig {
    pub n_features: usize,
    #[config(default = 512)]
    pub d_model: usize,
    #[config(default = 4)]
    pub n_heads: usize,
    #[config(default = 2)]
    pub n_layers: usize,
    #[config(default = 2048)]
    pub dim_feedforward: usize,
    #[config(default = 0.1)]
    pub dropout: f64,
}

impl TabularTransformerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.n_features == 0 {
            return Err("Model needs at least one feature".to_string());
        }
        if self.d_model == 0 || self.n_heads == 0 || self.n_layers == 0 {
            return Err("d_model, n_heads and n_layers must be positive".to_string());
        }
        if self.d_model % self.n_heads != 0 {
            return Err(format!(
                "d_model {} is not divisible by n_heads {}",
                self.d_model, self.n_heads
            ));
        }
        if self.dim_feedforward == 0 {
            return Err("dim_feedforward must be positive".to_string());
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(format!("dropout {} must be in [0, 1)", self.dropout));
        }
        Ok(())
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> TabularTransformer<B> {
        TabularTransformer {
            value_projection: LinearConfig::new(1, self.d_model).init(device),
            feature_embedding: EmbeddingConfig::new(self.n_features, self.d_model).init(device),
            encoder: TransformerEncoderConfig::new(
                self.d_model,
                self.dim_feedforward,
                self.n_heads,
                self.n_layers,
            )
            .with_dropout(self.dropout)
            .with_norm_first(true)
            .init(device),
            norm: LayerNormConfig::new(self.d_model).init(device),
            head: LinearConfig::new(self.d_model, 1).init(device),
        }
    }
}

/// Feature-token transformer regressor.
///
/// Every scaled feature value becomes one token: a shared linear projection of
/// the value plus a learned embedding of the feature's column position. The
/// encoded tokens are mean-pooled and mapped to a single output.
#[derive(Module, Debug)]
pub struct TabularTransformer<B: Backend> {
    value_projection: Linear<B>,
    feature_embedding: Embedding<B>,
    encoder: TransformerEncoder<B>,
    norm: LayerNorm<B>,
    head: Linear<B>,
}

impl<B: Backend> TabularTransformer<B> {
    pub fn n_features(&self) -> usize {
        self.feature_embedding.weight.val().dims()[0]
    }

    /// `[rows, features, 1]` tokens to `[rows, 1]` predictions.
    pub fn forward(&self, tokens: Tensor<B, 3>) -> Tensor<B, 2> {
        let [batch, features, _] = tokens.dims();
        let device = tokens.device();
        let values = self.value_projection.forward(tokens);
        let ids = Tensor::<B, 1, Int>::arange(0..features as i64, &device).reshape([1, features]);
        let positions = self.feature_embedding.forward(ids).repeat_dim(0, batch);
        let encoded = self
            .encoder
            .forward(TransformerEncoderInput::new(values + positions));
        let [_, _, d_model] = encoded.dims();
        let pooled = encoded.mean_dim(1).reshape([batch, d_model]);
        self.head.forward(self.norm.forward(pooled))
    }
}

impl<B: Backend> Regressor<B> for TabularTransformer<B> {
    fn input_rank(&self) -> InputRank {
        InputRank::Tokens
    }

    fn predict(&self, input: ModelInput<B>) -> Result<Tensor<B, 2>, ShapeError> {
        let tokens = match input {
            ModelInput::Tokens(tokens) => tokens,
            other => {
                return Err(ShapeError::RankMismatch {
                    expected: InputRank::Tokens,
                    actual: other.rank(),
                });
            }
        };
        let [_, features, width] = tokens.dims();
        if width != 1 {
            return Err(ShapeError::TokenWidth(width));
        }
        let expected = self.n_features();
        if features != expected {
            return Err(ShapeError::FeatureCount {
                expected,
                actual: features,
            });
        }
        Ok(self.forward(tokens))
    }
}
