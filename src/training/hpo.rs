//! Hyperparameter search for the regressor

use crate::config::TrainerConfig;
use crate::error::{HousePriceError, Result};
use crate::optimizer::{HyperOptX, OptimizationConfig, OptimizeDirection, SearchSpace, Study, TrialParams};
use crate::preprocessing::Partition;
use super::models::{r2_score, ElasticNetParams, ForestParams, ModelKind, Regressor, RegressorParams};
use tracing::info;

/// Bounded search space of a model family
pub fn search_space(kind: ModelKind) -> SearchSpace {
    match kind {
        ModelKind::RandomForest => SearchSpace::new()
            .int_step("n_estimators", 100, 1000, 100)
            .int("max_depth", 1, 50)
            .float("min_samples_leaf", 0.01, 0.5),
        ModelKind::ElasticNet => SearchSpace::new()
            .log_float("penalty", 1e-4, 10.0)
            .float("l1_ratio", 0.0, 1.0)
            .int_step("max_iterations", 100, 1000, 100),
    }
}

fn float(trial: &TrialParams, name: &str) -> Result<f64> {
    trial
        .get(name)
        .and_then(|v| v.as_float())
        .ok_or_else(|| HousePriceError::OptimizationError(format!("trial is missing '{}'", name)))
}

fn int<T: TryFrom<i64>>(trial: &TrialParams, name: &str) -> Result<T> {
    let value = trial
        .get(name)
        .and_then(|v| v.as_int())
        .ok_or_else(|| HousePriceError::OptimizationError(format!("trial is missing '{}'", name)))?;
    T::try_from(value).map_err(|_| HousePriceError::invalid_parameter(name, value, "out of range"))
}

/// Build regressor parameters of `kind` from a sampled trial
pub fn params_from_trial(kind: ModelKind, trial: &TrialParams, seed: u64) -> Result<RegressorParams> {
    Ok(match kind {
        ModelKind::RandomForest => RegressorParams::RandomForest(ForestParams {
            n_estimators: int(trial, "n_estimators")?,
            max_depth: Some(int(trial, "max_depth")?),
            min_samples_leaf: float(trial, "min_samples_leaf")?,
            seed,
        }),
        ModelKind::ElasticNet => RegressorParams::ElasticNet(ElasticNetParams {
            penalty: float(trial, "penalty")?,
            l1_ratio: float(trial, "l1_ratio")?,
            max_iterations: int(trial, "max_iterations")?,
            ..ElasticNetParams::default()
        }),
    })
}

/// Result of a search: the refitted model and the trial record
#[derive(Debug)]
pub struct HpoOutcome {
    pub model: Regressor,
    pub best_params: RegressorParams,
    pub study: Study,
}

/// Tunes the regressor by maximizing R² on the train partition, then refits
#[derive(Debug, Clone)]
pub struct ModelHpo {
    kind: ModelKind,
    seed: u64,
    config: OptimizationConfig,
}

impl ModelHpo {
    pub fn new(kind: ModelKind, seed: u64, config: OptimizationConfig) -> Self {
        Self { kind, seed, config }
    }

    pub fn from_config(config: &TrainerConfig) -> Self {
        let mut optimization = OptimizationConfig::new()
            .with_n_trials(config.n_trials)
            .with_sampler(config.sampler)
            .with_n_jobs(config.n_jobs)
            .with_random_state(config.random_state)
            .with_direction(OptimizeDirection::Maximize);
        if let Some(secs) = config.timeout_secs {
            optimization = optimization.with_timeout(secs);
        }
        if let Some(patience) = config.patience {
            optimization = optimization.with_patience(patience);
        }
        Self::new(config.model, config.random_state, optimization)
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    pub fn config(&self) -> &OptimizationConfig {
        &self.config
    }

    pub fn optimize(&self, train: &Partition) -> Result<HpoOutcome> {
        let objective = |trial: &TrialParams| -> Result<f64> {
            let params = params_from_trial(self.kind, trial, self.seed)?;
            let model = Regressor::fit(params, &train.x, &train.y)?;
            r2_score(&train.y, &model.predict(&train.x)?)
        };

        let mut optimizer = HyperOptX::new(self.config.clone(), search_space(self.kind));
        optimizer.optimize(objective)?;
        let study = optimizer.into_study();

        let best = study
            .best_trial()
            .ok_or_else(|| HousePriceError::OptimizationError("no successful trial".to_string()))?;
        let best_params = params_from_trial(self.kind, &best.params, self.seed)?;
        info!(
            model = self.kind.name(),
            trials = study.trials.len(),
            failed = study.n_failed(),
            best_r2 = best.value,
            params = ?best_params,
            "Hyperparameter search finished"
        );

        let model = Regressor::fit(best_params, &train.x, &train.y)?;
        Ok(HpoOutcome {
            model,
            best_params,
            study,
        })
    }
}
