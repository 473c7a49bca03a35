//! Baseline model fitting

use crate::config::TrainerConfig;
use crate::error::Result;
use crate::preprocessing::Partition;
use super::models::{ModelMetrics, Regressor, RegressorParams};
use std::time::Instant;
use tracing::{error, info};

/// Fits the baseline model on the train partition
#[derive(Debug, Clone, Default)]
pub struct ModelTrainer {
    params: RegressorParams,
}

impl ModelTrainer {
    pub fn new(params: RegressorParams) -> Self {
        Self { params }
    }

    /// Default parameters of the configured model family
    pub fn from_config(config: &TrainerConfig) -> Self {
        Self::new(RegressorParams::defaults(config.model, config.random_state))
    }

    pub fn params(&self) -> &RegressorParams {
        &self.params
    }

    pub fn train(&self, train: &Partition) -> Result<Regressor> {
        let start = Instant::now();
        let model = Regressor::fit(self.params, &train.x, &train.y).map_err(|e| {
            error!(error = %e, "Baseline fit failed");
            e
        })?;

        let fit = ModelMetrics::compute_regression(&train.y, &model.predict(&train.x)?)?;
        info!(
            model = model.name(),
            train_r2 = fit.r2,
            secs = start.elapsed().as_secs_f64(),
            "Trained baseline model"
        );
        Ok(model)
    }
}
