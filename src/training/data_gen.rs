//! Synthetic labeled dataset generation

use crate::config::TrainerConfig;
use crate::error::{HousePriceError, Result};
use crate::features::{FEATURE_COLUMNS, TARGET_COLUMN};
use ndarray::{Array1, Array2};
use ndarray_rand::rand_distr::{StandardNormal, Uniform};
use ndarray_rand::RandomExt;
use polars::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

/// Generated frame and the coefficients that produced its target
#[derive(Debug, Clone)]
pub struct GeneratedData {
    /// Feature columns followed by the target column
    pub frame: DataFrame,
    /// Ground-truth linear coefficients, one per feature
    pub coefficients: Array1<f64>,
}

/// Draws a linear regression problem with gaussian features and noise
#[derive(Debug, Clone)]
pub struct DataGenerator {
    n_samples: usize,
    n_features: usize,
    noise: f64,
    random_state: u64,
}

impl DataGenerator {
    pub fn new(config: &TrainerConfig) -> Self {
        Self {
            n_samples: config.gen_n_samples,
            n_features: config.gen_n_features,
            noise: config.gen_noise,
            random_state: config.random_state,
        }
    }

    pub fn run(&self) -> Result<GeneratedData> {
        if self.n_features != FEATURE_COLUMNS.len() {
            return Err(HousePriceError::DataError(format!(
                "expected {} features, got {}",
                FEATURE_COLUMNS.len(),
                self.n_features
            )));
        }
        if self.n_samples == 0 {
            return Err(HousePriceError::DataError("n_samples must be positive".to_string()));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state);

        let x: Array2<f64> = Array2::random_using((self.n_samples, self.n_features), StandardNormal, &mut rng);
        let coefficients: Array1<f64> =
            Array1::random_using(self.n_features, Uniform::new(0.0, 1.0), &mut rng) * 100.0;

        let mut y = x.dot(&coefficients);
        if self.noise > 0.0 {
            let noise: Array1<f64> = Array1::random_using(self.n_samples, StandardNormal, &mut rng);
            y = y + noise * self.noise;
        }

        let mut columns: Vec<Column> = FEATURE_COLUMNS
            .iter()
            .enumerate()
            .map(|(j, name)| Series::new((*name).into(), x.column(j).to_vec()).into())
            .collect();
        columns.push(Series::new(TARGET_COLUMN.into(), y.to_vec()).into());

        let frame = DataFrame::new(columns)?;
        info!(rows = frame.height(), features = self.n_features, "Generated dataset");

        Ok(GeneratedData { frame, coefficients })
    }
}
