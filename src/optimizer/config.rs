//! Optimization configuration

use serde::{Deserialize, Serialize};
use super::SamplerType;

/// Direction of optimization
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OptimizeDirection {
    Minimize,
    Maximize,
}

impl OptimizeDirection {
    /// Worst possible objective value in this direction
    pub fn worst(&self) -> f64 {
        match self {
            OptimizeDirection::Minimize => f64::INFINITY,
            OptimizeDirection::Maximize => f64::NEG_INFINITY,
        }
    }

    /// Whether `value` beats `best` by more than `margin`
    pub fn improves(&self, value: f64, best: f64, margin: f64) -> bool {
        match self {
            OptimizeDirection::Minimize => value < best - margin,
            OptimizeDirection::Maximize => value > best + margin,
        }
    }

    /// Objective value as a loss (lower is better)
    pub fn to_loss(&self, value: f64) -> f64 {
        match self {
            OptimizeDirection::Minimize => value,
            OptimizeDirection::Maximize => -value,
        }
    }
}

/// Configuration for hyperparameter optimization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationConfig {
    /// Number of trials to run
    pub n_trials: usize,

    /// Maximum time in seconds
    pub timeout_secs: Option<f64>,

    /// Optimization direction
    pub direction: OptimizeDirection,

    /// Sampler type
    pub sampler: SamplerType,

    /// Number of parallel workers (independent samplers only)
    pub n_jobs: usize,

    /// Random seed
    pub random_state: u64,

    /// Stop after this many trials without improvement
    pub early_stopping_patience: Option<usize>,

    /// Minimum improvement to reset the patience counter
    pub min_improvement: f64,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            n_trials: 100,
            timeout_secs: None,
            direction: OptimizeDirection::Maximize,
            sampler: SamplerType::Tpe,
            n_jobs: 1,
            random_state: 42,
            early_stopping_patience: None,
            min_improvement: 1e-6,
        }
    }
}

impl OptimizationConfig {
    /// Create a new configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set number of trials
    pub fn with_n_trials(mut self, n: usize) -> Self {
        self.n_trials = n;
        self
    }

    /// Builder method to set timeout
    pub fn with_timeout(mut self, secs: f64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Builder method to set direction
    pub fn with_direction(mut self, direction: OptimizeDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Builder method to set sampler
    pub fn with_sampler(mut self, sampler: SamplerType) -> Self {
        self.sampler = sampler;
        self
    }

    /// Builder method to enable parallel execution
    pub fn with_n_jobs(mut self, n: usize) -> Self {
        self.n_jobs = n;
        self
    }

    /// Builder method to set the seed
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Builder method to enable early stopping
    pub fn with_patience(mut self, patience: usize) -> Self {
        self.early_stopping_patience = Some(patience);
        self
    }
}
