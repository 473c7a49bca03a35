//! Held-out scoring

use crate::error::Result;
use crate::preprocessing::Partition;
use super::models::{ModelMetrics, Regressor};
use tracing::info;

/// Scores a fitted model against the test partition
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelEvaluator;

impl ModelEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Test-set metrics; `r2` is the primary score
    pub fn evaluate(&self, model: &Regressor, test: &Partition) -> Result<ModelMetrics> {
        let predictions = model.predict(&test.x)?;
        let metrics = ModelMetrics::compute_regression(&test.y, &predictions)?;
        info!(
            r2 = metrics.r2,
            rmse = metrics.rmse,
            mae = metrics.mae,
            samples = metrics.n_samples,
            "Evaluated model on test set"
        );
        Ok(metrics)
    }
}
