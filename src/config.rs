//! Training and serving configuration
//!
//! Every field has a default and can be overridden by an environment
//! variable; the CLI layers its own flags on top.

use crate::artifacts::ArtifactLayout;
use crate::error::{HousePriceError, Result};
use crate::features::FEATURE_COLUMNS;
use crate::optimizer::SamplerType;
use crate::training::ModelKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Read `key` from the environment, falling back to `default` when unset or unparseable
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Read an optional setting; unset, blank or unparseable means `None`
fn env_opt<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Configuration of the training pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Number of synthetic samples to generate
    pub gen_n_samples: usize,
    /// Number of synthetic features
    pub gen_n_features: usize,
    /// Standard deviation of the gaussian noise added to the target
    pub gen_noise: f64,
    /// Seed shared by generation, splitting and the search sampler
    pub random_state: u64,
    /// Fraction of rows held out for evaluation
    pub test_size: f64,
    /// Model family to train
    pub model: ModelKind,
    /// Hyperparameter search trial budget
    pub n_trials: usize,
    /// Wall-clock cap on the search in seconds; the first trial always runs
    pub timeout_secs: Option<f64>,
    /// Stop the search after this many trials without improvement
    pub patience: Option<usize>,
    /// Hyperparameter search sampler
    pub sampler: SamplerType,
    /// Parallel trial evaluations (random sampler only)
    pub n_jobs: usize,
    /// Root directory for training artifacts
    pub models_dir: PathBuf,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            gen_n_samples: 100,
            gen_n_features: 3,
            gen_noise: 0.1,
            random_state: 42,
            test_size: 0.2,
            model: ModelKind::default(),
            n_trials: 100,
            timeout_secs: None,
            patience: None,
            sampler: SamplerType::Tpe,
            n_jobs: 1,
            models_dir: PathBuf::from("models"),
        }
    }
}

impl TrainerConfig {
    /// Defaults overridden by environment variables
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            gen_n_samples: env_or("GEN_N_SAMPLES", d.gen_n_samples),
            gen_n_features: env_or("GEN_N_FEATURES", d.gen_n_features),
            gen_noise: env_or("GEN_NOISE", d.gen_noise),
            random_state: env_or("RANDOM_STATE", d.random_state),
            test_size: env_or("TEST_SIZE", d.test_size),
            model: env_or("MODEL_TYPE", d.model),
            n_trials: env_or("HPO_N_TRIALS", d.n_trials),
            timeout_secs: env_opt("HPO_TIMEOUT_SECS").or(d.timeout_secs),
            patience: env_opt("HPO_PATIENCE").or(d.patience),
            sampler: env_or("HPO_SAMPLER", d.sampler),
            n_jobs: env_or("HPO_N_JOBS", d.n_jobs),
            models_dir: std::env::var("MODELS_DIR")
                .map(PathBuf::from)
                .unwrap_or(d.models_dir),
        }
    }

    /// Builder method to set the sample count
    pub fn with_n_samples(mut self, n: usize) -> Self {
        self.gen_n_samples = n;
        self
    }

    /// Builder method to set the target noise
    pub fn with_noise(mut self, noise: f64) -> Self {
        self.gen_noise = noise;
        self
    }

    /// Builder method to set the seed
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Builder method to set the held-out fraction
    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    /// Builder method to set the model family
    pub fn with_model(mut self, model: ModelKind) -> Self {
        self.model = model;
        self
    }

    /// Builder method to cap the search duration
    pub fn with_timeout(mut self, secs: f64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Builder method to stop the search early
    pub fn with_patience(mut self, trials: usize) -> Self {
        self.patience = Some(trials);
        self
    }

    /// Builder method to set the trial budget
    pub fn with_n_trials(mut self, n: usize) -> Self {
        self.n_trials = n;
        self
    }

    /// Builder method to set the sampler
    pub fn with_sampler(mut self, sampler: SamplerType) -> Self {
        self.sampler = sampler;
        self
    }

    /// Builder method to set parallel trial evaluations
    pub fn with_n_jobs(mut self, n: usize) -> Self {
        self.n_jobs = n;
        self
    }

    /// Builder method to set the artifact root
    pub fn with_models_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.models_dir = dir.into();
        self
    }

    /// Check ranges before the pipeline starts
    pub fn validate(&self) -> Result<()> {
        if self.gen_n_samples < 2 {
            return Err(HousePriceError::invalid_parameter(
                "gen_n_samples",
                self.gen_n_samples,
                "need at least 2 samples to split",
            ));
        }
        if self.gen_n_features != FEATURE_COLUMNS.len() {
            return Err(HousePriceError::invalid_parameter(
                "gen_n_features",
                self.gen_n_features,
                format!("served requests carry exactly {} features", FEATURE_COLUMNS.len()),
            ));
        }
        if !(self.gen_noise >= 0.0 && self.gen_noise.is_finite()) {
            return Err(HousePriceError::invalid_parameter(
                "gen_noise",
                self.gen_noise,
                "must be a finite non-negative number",
            ));
        }
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(HousePriceError::invalid_parameter(
                "test_size",
                self.test_size,
                "must be in (0, 1)",
            ));
        }
        if self.n_trials == 0 {
            return Err(HousePriceError::invalid_parameter(
                "n_trials",
                self.n_trials,
                "must be at least 1",
            ));
        }
        if let Some(t) = self.timeout_secs {
            if !(t >= 0.0 && t.is_finite()) {
                return Err(HousePriceError::invalid_parameter(
                    "timeout_secs",
                    t,
                    "must be a finite non-negative number",
                ));
            }
        }
        if self.patience == Some(0) {
            return Err(HousePriceError::invalid_parameter("patience", 0, "must be at least 1"));
        }
        if self.n_jobs == 0 {
            return Err(HousePriceError::invalid_parameter(
                "n_jobs",
                self.n_jobs,
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Configuration of the prediction service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Root directory holding dated artifact directories
    pub models_path: PathBuf,
    /// Artifact date (`YYYYMMDD`); the latest one on disk when unset
    pub model_date: Option<String>,
    /// Model subdirectory name
    pub model_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            models_path: PathBuf::from("models"),
            model_date: None,
            model_name: ModelKind::default().name().to_string(),
        }
    }
}

impl AppConfig {
    /// Defaults overridden by environment variables
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            models_path: std::env::var("MODELS_PATH")
                .map(PathBuf::from)
                .unwrap_or(d.models_path),
            model_date: std::env::var("MODEL_DATE")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .or(d.model_date),
            model_name: std::env::var("MODEL_NAME").unwrap_or(d.model_name),
        }
    }

    /// Builder method to set the artifact root
    pub fn with_models_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.models_path = path.into();
        self
    }

    /// Builder method to serve another model family
    pub fn with_model(mut self, model: ModelKind) -> Self {
        self.model_name = model.name().to_string();
        self
    }

    /// Builder method to pin the artifact date
    pub fn with_model_date(mut self, date: impl Into<String>) -> Self {
        self.model_date = Some(date.into());
        self
    }

    /// The configured date, or the most recent dated directory under `models_path`
    pub fn resolve_date(&self) -> Result<String> {
        match &self.model_date {
            Some(date) => {
                if !ArtifactLayout::is_date_name(date) {
                    return Err(HousePriceError::invalid_parameter(
                        "model_date",
                        date,
                        "expected YYYYMMDD",
                    ));
                }
                Ok(date.clone())
            }
            None => ArtifactLayout::latest_date(&self.models_path),
        }
    }

    /// Artifact layout for the resolved date
    pub fn layout(&self) -> Result<ArtifactLayout> {
        Ok(ArtifactLayout::new(&self.models_path, self.resolve_date()?))
    }

    /// Path of the persisted scaler
    pub fn scaler_path(&self) -> Result<PathBuf> {
        Ok(self.layout()?.scaler_path())
    }

    /// Path of the persisted model
    pub fn model_path(&self) -> Result<PathBuf> {
        Ok(self.layout()?.model_path(&self.model_name))
    }
}
