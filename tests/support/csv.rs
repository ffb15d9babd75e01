use std::path::{Path, PathBuf};

use nakchal::config::RunConfig;
use nakchal::ml::transformer::TrainOptions;

/// Write a `[feat_a, feat_b, 낙찰가]` CSV with `rows` rows and return its path.
pub fn write_bid_csv(dir: &Path, rows: usize) -> PathBuf {
    let mut text = String::from("feat_a,feat_b,낙찰가\n");
    for i in 0..rows {
        let a = i as f64 * 1.5;
        let b = (i % 3) as f64;
        let price = 10_000_000.0 + 750_000.0 * a + 120_000.0 * b;
        text.push_str(&format!("{a},{b},{price}\n"));
    }
    let path = dir.join("dataset_feature_selected.csv");
    std::fs::write(&path, text).expect("write csv");
    path
}

/// Default run config pointed at `data` with a model small enough for tests.
pub fn tiny_run_config(data: PathBuf, fallback: PathBuf) -> RunConfig {
    let mut config = RunConfig::default();
    config.data.path = data;
    config.data.fallback_path = fallback;
    config.training = TrainOptions {
        epochs: 2,
        patience: 0,
        batch_size: 4,
        learning_rate: 1e-3,
        d_model: 8,
        n_heads: 2,
        n_layers: 1,
        dim_feedforward: 16,
        dropout: 0.0,
        verbose: false,
        ..TrainOptions::default()
    };
    config
}
