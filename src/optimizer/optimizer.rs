//! HyperOptX - Main hyperparameter optimizer

use crate::artifacts::{read_json, write_json};
use crate::error::{HousePriceError, Result};
use super::{
    config::{OptimizationConfig, OptimizeDirection},
    search_space::{SearchSpace, TrialParams},
    samplers::{create_sampler, Sampler},
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of a single trial
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialResult {
    /// Trial number
    pub trial_id: usize,
    /// Parameters used
    pub params: TrialParams,
    /// Objective value (non-finite values are stored as `null`)
    #[serde(deserialize_with = "value_or_nan")]
    pub value: f64,
    /// Trial duration in seconds
    pub duration_secs: f64,
    /// Whether the objective failed for this trial
    pub failed: bool,
    /// Failure message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Study containing all trials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Study {
    /// All trial results
    pub trials: Vec<TrialResult>,
    /// Best trial index
    pub best_trial_idx: Option<usize>,
    /// Total duration
    pub total_duration_secs: f64,
    /// Optimization direction
    pub direction: OptimizeDirection,
}

impl Study {
    /// Create a new study
    pub fn new(direction: OptimizeDirection) -> Self {
        Self {
            trials: Vec::new(),
            best_trial_idx: None,
            total_duration_secs: 0.0,
            direction,
        }
    }

    /// Get the best trial
    pub fn best_trial(&self) -> Option<&TrialResult> {
        self.best_trial_idx.and_then(|idx| self.trials.get(idx))
    }

    /// Get the best value
    pub fn best_value(&self) -> Option<f64> {
        self.best_trial().map(|t| t.value)
    }

    /// Number of failed trials
    pub fn n_failed(&self) -> usize {
        self.trials.iter().filter(|t| t.failed).count()
    }

    /// Add a trial result
    pub fn add_trial(&mut self, result: TrialResult) {
        let idx = self.trials.len();

        let is_better = match self.best_value() {
            None => true,
            Some(best) => self.direction.improves(result.value, best, 0.0),
        };

        if is_better && !result.failed {
            self.best_trial_idx = Some(idx);
        }

        self.trials.push(result);
    }

    /// Save study to file
    pub fn save(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }

    /// Load study from file
    pub fn load(path: &Path) -> Result<Self> {
        let mut study: Study = read_json(path)?;
        let worst = study.direction.worst();
        for trial in study.trials.iter_mut().filter(|t| t.failed) {
            trial.value = worst;
        }
        Ok(study)
    }
}

/// Main hyperparameter optimizer
pub struct HyperOptX {
    config: OptimizationConfig,
    search_space: SearchSpace,
    sampler: Box<dyn Sampler>,
    study: Study,
}

impl HyperOptX {
    /// Create a new optimizer
    pub fn new(config: OptimizationConfig, search_space: SearchSpace) -> Self {
        let sampler = create_sampler(config.sampler, config.random_state);
        let study = Study::new(config.direction);

        Self {
            config,
            search_space,
            sampler,
            study,
        }
    }

    /// Run optimization with an objective function
    ///
    /// Trials whose objective errors (or returns NaN) are recorded as failed
    /// with the worst value. Errors when no trial succeeds.
    pub fn optimize<F>(&mut self, objective: F) -> Result<&Study>
    where
        F: Fn(&TrialParams) -> Result<f64> + Sync,
    {
        self.search_space.validate()?;
        if self.config.n_trials == 0 {
            return Err(HousePriceError::invalid_parameter("n_trials", 0, "must be at least 1"));
        }

        let start = Instant::now();
        let n_trials = self.config.n_trials;
        let batch_size = if self.sampler.is_independent() {
            self.config.n_jobs.max(1)
        } else {
            1
        };
        let pool = if batch_size > 1 {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(batch_size)
                    .build()
                    .map_err(|e| HousePriceError::OptimizationError(e.to_string()))?,
            )
        } else {
            None
        };

        let mut trials_without_improvement = 0;
        let mut trial_id = 0;

        while trial_id < n_trials {
            // the first batch always runs so a study is never empty
            if let Some(t) = self.config.timeout_secs.filter(|_| trial_id > 0) {
                if start.elapsed().as_secs_f64() > t {
                    info!(trials = trial_id, "Optimization timeout reached");
                    break;
                }
            }

            if let Some(p) = self.config.early_stopping_patience {
                if trials_without_improvement >= p {
                    info!(patience = p, trials = trial_id, "Early stopping without improvement");
                    break;
                }
            }

            let batch: Vec<TrialParams> = (0..batch_size.min(n_trials - trial_id))
                .map(|_| self.sampler.sample(&self.search_space))
                .collect::<Result<_>>()?;

            let outcomes: Vec<(Result<f64>, f64)> = match &pool {
                Some(pool) => pool.install(|| {
                    batch.par_iter().map(|params| evaluate(&objective, params)).collect()
                }),
                None => batch.iter().map(|params| evaluate(&objective, params)).collect(),
            };

            for (params, (outcome, duration_secs)) in batch.into_iter().zip(outcomes) {
                let result = match outcome {
                    Ok(value) => {
                        let is_improvement = match self.study.best_value() {
                            None => true,
                            Some(best) => {
                                self.config.direction.improves(value, best, self.config.min_improvement)
                            }
                        };
                        if is_improvement {
                            trials_without_improvement = 0;
                        } else {
                            trials_without_improvement += 1;
                        }

                        self.sampler.observe(
                            &self.search_space,
                            &params,
                            self.config.direction.to_loss(value),
                        )?;

                        TrialResult {
                            trial_id,
                            params,
                            value,
                            duration_secs,
                            failed: false,
                            error: None,
                        }
                    }
                    Err(e) => {
                        warn!(trial = trial_id, error = %e, "Trial failed");
                        trials_without_improvement += 1;
                        TrialResult {
                            trial_id,
                            params,
                            value: self.config.direction.worst(),
                            duration_secs,
                            failed: true,
                            error: Some(e.to_string()),
                        }
                    }
                };

                debug!(
                    trial = trial_id,
                    value = result.value,
                    best = self.study.best_value().unwrap_or(result.value),
                    "Trial complete"
                );

                self.study.add_trial(result);
                trial_id += 1;
            }
        }

        self.study.total_duration_secs = start.elapsed().as_secs_f64();

        if self.study.best_trial().is_none() {
            return Err(HousePriceError::OptimizationError(format!(
                "all {} trials failed",
                self.study.trials.len()
            )));
        }

        Ok(&self.study)
    }

    /// Get the study results
    pub fn study(&self) -> &Study {
        &self.study
    }

    /// Take ownership of the study
    pub fn into_study(self) -> Study {
        self.study
    }
}

fn value_or_nan<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

fn evaluate<F>(objective: &F, params: &TrialParams) -> (Result<f64>, f64)
where
    F: Fn(&TrialParams) -> Result<f64>,
{
    let trial_start = Instant::now();
    let outcome = objective(params).and_then(|v| {
        if v.is_nan() {
            Err(HousePriceError::OptimizationError("objective returned NaN".to_string()))
        } else {
            Ok(v)
        }
    });
    (outcome, trial_start.elapsed().as_secs_f64())
}
