//! Training-time preprocessing: split, normalize, persist the scaler

use crate::artifacts::ArtifactLayout;
use crate::config::TrainerConfig;
use crate::error::Result;
use crate::features::{FEATURE_COLUMNS, TARGET_COLUMN};
use polars::prelude::*;
use tracing::{debug, info};

use super::split::train_test_split;
use super::{column_to_array, frame_to_array, Partition, StandardScaler};

/// Output of [`DataPreprocessor::run`]
#[derive(Debug, Clone)]
pub struct PreprocessedData {
    pub train: Partition,
    pub test: Partition,
    pub scaler: StandardScaler,
}

/// Splits a labeled frame, fits the scaler on the train rows and applies it to both partitions
#[derive(Debug, Clone)]
pub struct DataPreprocessor {
    test_size: f64,
    random_state: u64,
}

impl DataPreprocessor {
    pub fn new(test_size: f64, random_state: u64) -> Self {
        Self { test_size, random_state }
    }

    pub fn from_config(config: &TrainerConfig) -> Self {
        Self::new(config.test_size, config.random_state)
    }

    /// Run every step and persist the fitted scaler under `layout`
    pub fn run(&self, data: &DataFrame, layout: &ArtifactLayout) -> Result<PreprocessedData> {
        let (train_df, test_df) = self.split_data(data)?;
        let (train, test, scaler) = self.normalize_data(&train_df, &test_df)?;
        self.save_scaler(&scaler, layout)?;
        Ok(PreprocessedData { train, test, scaler })
    }

    fn split_data(&self, data: &DataFrame) -> Result<(DataFrame, DataFrame)> {
        let (train, test) = train_test_split(data, self.test_size, self.random_state)?;
        debug!(train_rows = train.height(), test_rows = test.height(), "Split dataset");
        Ok((train, test))
    }

    fn normalize_data(
        &self,
        train_df: &DataFrame,
        test_df: &DataFrame,
    ) -> Result<(Partition, Partition, StandardScaler)> {
        let mut scaler = StandardScaler::new();
        let scaled_train = scaler.fit_transform(train_df, &FEATURE_COLUMNS)?;
        let scaled_test = scaler.transform(test_df)?;

        let train = Partition::new(
            frame_to_array(&scaled_train, &FEATURE_COLUMNS)?,
            column_to_array(&scaled_train, TARGET_COLUMN)?,
        )?;
        let test = Partition::new(
            frame_to_array(&scaled_test, &FEATURE_COLUMNS)?,
            column_to_array(&scaled_test, TARGET_COLUMN)?,
        )?;

        Ok((train, test, scaler))
    }

    fn save_scaler(&self, scaler: &StandardScaler, layout: &ArtifactLayout) -> Result<()> {
        let path = layout.scaler_path();
        scaler.save(&path)?;
        info!(path = %path.display(), "Saved scaler");
        Ok(())
    }
}
