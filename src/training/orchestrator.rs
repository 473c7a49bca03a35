//! End-to-end training pipeline

use crate::artifacts::ArtifactLayout;
use crate::config::TrainerConfig;
use crate::error::Result;
use crate::preprocessing::DataPreprocessor;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};

use super::data_gen::DataGenerator;
use super::evaluator::ModelEvaluator;
use super::hpo::ModelHpo;
use super::models::{ModelMetrics, RegressorParams};
use super::saver::{ModelSaver, SavedArtifacts};
use super::trainer::ModelTrainer;

/// Summary of one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    /// Test-set R²
    pub score: f64,
    pub metrics: ModelMetrics,
    /// Test-set metrics of the untuned baseline
    pub baseline_metrics: ModelMetrics,
    pub best_params: RegressorParams,
    pub n_trials: usize,
    pub n_failed_trials: usize,
    /// Run date (`YYYYMMDD`)
    pub date: String,
    pub scaler_path: PathBuf,
    pub artifacts: SavedArtifacts,
    pub duration_secs: f64,
}

/// Runs data generation, preprocessing, training, search, evaluation and saving
#[derive(Debug, Clone)]
pub struct ModelOrchestrator {
    config: TrainerConfig,
}

impl ModelOrchestrator {
    pub fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Run under today's date in `models_dir`
    pub fn run(&self) -> Result<TrainingReport> {
        self.run_with_layout(ArtifactLayout::today(&self.config.models_dir))
    }

    /// Run with an explicit artifact layout
    pub fn run_with_layout(&self, layout: ArtifactLayout) -> Result<TrainingReport> {
        let start = Instant::now();
        info!(
            model = %self.config.model,
            samples = self.config.gen_n_samples,
            trials = self.config.n_trials,
            sampler = %self.config.sampler,
            dir = %layout.run_dir().display(),
            "Starting training pipeline"
        );

        stage("config", || self.config.validate())?;
        let data = stage("data_gen", || DataGenerator::new(&self.config).run())?;
        let prepared = stage("preprocess", || {
            DataPreprocessor::from_config(&self.config).run(&data.frame, &layout)
        })?;
        let baseline = stage("trainer", || ModelTrainer::from_config(&self.config).train(&prepared.train))?;
        let tuned = stage("hpo", || ModelHpo::from_config(&self.config).optimize(&prepared.train))?;

        let evaluator = ModelEvaluator::new();
        let (baseline_metrics, metrics) = stage("evaluator", || {
            Ok((
                evaluator.evaluate(&baseline, &prepared.test)?,
                evaluator.evaluate(&tuned.model, &prepared.test)?,
            ))
        })?;

        let artifacts = stage("saver", || {
            ModelSaver::new(layout.clone()).save(&tuned.model, &metrics, Some(&tuned.study))
        })?;

        let report = TrainingReport {
            score: metrics.r2,
            baseline_metrics,
            best_params: tuned.best_params,
            n_trials: tuned.study.trials.len(),
            n_failed_trials: tuned.study.n_failed(),
            date: layout.date().to_string(),
            scaler_path: layout.scaler_path(),
            artifacts,
            duration_secs: start.elapsed().as_secs_f64(),
            metrics,
        };
        info!(
            score = report.score,
            baseline = report.baseline_metrics.r2,
            secs = report.duration_secs,
            "Training pipeline finished"
        );
        Ok(report)
    }
}

/// Run one pipeline stage, logging completion or failure
fn stage<T>(name: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    match f() {
        Ok(value) => {
            info!(stage = name, "Stage complete");
            Ok(value)
        }
        Err(e) => {
            error!(stage = name, error = %e, "Stage failed");
            Err(e)
        }
    }
}
