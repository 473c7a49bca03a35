//! Sampling strategies for hyperparameter optimization
//!
//! Samplers propose parameters and receive a loss (lower is better) for
//! each completed trial. The optimizer converts maximized scores into losses
//! before reporting them.

use crate::error::{HousePriceError, Result};
use super::search_space::{Parameter, ParameterType, ParameterValue, SearchSpace, TrialParams};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tpe::TpeOptimizer;

/// Type of sampler to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SamplerType {
    /// Tree-structured Parzen Estimator
    Tpe,
    /// Uniform random sampling
    Random,
}

impl fmt::Display for SamplerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamplerType::Tpe => write!(f, "tpe"),
            SamplerType::Random => write!(f, "random"),
        }
    }
}

impl FromStr for SamplerType {
    type Err = HousePriceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tpe" => Ok(SamplerType::Tpe),
            "random" => Ok(SamplerType::Random),
            other => Err(HousePriceError::invalid_parameter(
                "sampler",
                other,
                "expected 'tpe' or 'random'",
            )),
        }
    }
}

/// Trait for hyperparameter samplers
pub trait Sampler: Send {
    /// Propose the next set of hyperparameters
    fn sample(&mut self, search_space: &SearchSpace) -> Result<TrialParams>;

    /// Report the loss of a completed trial
    fn observe(&mut self, _search_space: &SearchSpace, _params: &TrialParams, _loss: f64) -> Result<()> {
        Ok(())
    }

    /// Whether proposals ignore trial history and can be drawn in batches
    fn is_independent(&self) -> bool {
        false
    }
}

/// Random sampler
#[derive(Debug)]
pub struct RandomSampler {
    rng: ChaCha8Rng,
}

impl RandomSampler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Sampler for RandomSampler {
    fn sample(&mut self, search_space: &SearchSpace) -> Result<TrialParams> {
        Ok(search_space.sample(&mut self.rng))
    }

    fn is_independent(&self) -> bool {
        true
    }
}

/// Tree-structured Parzen Estimator sampler
///
/// Holds one univariate `tpe` optimizer per parameter, created lazily for
/// the first search space it sees. Parameters are searched in an internal
/// coordinate: the log of log-scale floats and the grid index of integers.
pub struct TpeSampler {
    rng: ChaCha8Rng,
    optimizers: Vec<TpeOptimizer>,
}

impl TpeSampler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            optimizers: Vec::new(),
        }
    }

    fn ensure_optimizers(&mut self, search_space: &SearchSpace) -> Result<()> {
        if self.optimizers.len() == search_space.len() {
            return Ok(());
        }
        self.optimizers = search_space
            .parameters()
            .iter()
            .map(|p| {
                let (low, high) = internal_bounds(p);
                let range = tpe::range(low, high).map_err(|e| {
                    HousePriceError::OptimizationError(format!("parameter '{}': {}", p.name, e))
                })?;
                Ok(TpeOptimizer::new(tpe::parzen_estimator(), range))
            })
            .collect::<Result<_>>()?;
        Ok(())
    }
}

impl Sampler for TpeSampler {
    fn sample(&mut self, search_space: &SearchSpace) -> Result<TrialParams> {
        self.ensure_optimizers(search_space)?;

        let mut params = TrialParams::new();
        for (param, optim) in search_space.parameters().iter().zip(self.optimizers.iter_mut()) {
            let x = optim
                .ask(&mut self.rng)
                .map_err(|e| HousePriceError::OptimizationError(e.to_string()))?;
            params.insert(param.name.clone(), from_internal(param, x));
        }
        Ok(params)
    }

    fn observe(&mut self, search_space: &SearchSpace, params: &TrialParams, loss: f64) -> Result<()> {
        if !loss.is_finite() {
            return Ok(());
        }
        self.ensure_optimizers(search_space)?;

        for (param, optim) in search_space.parameters().iter().zip(self.optimizers.iter_mut()) {
            let value = params.get(&param.name).ok_or_else(|| {
                HousePriceError::OptimizationError(format!("trial is missing parameter '{}'", param.name))
            })?;
            optim
                .tell(to_internal(param, value), loss)
                .map_err(|e| HousePriceError::OptimizationError(e.to_string()))?;
        }
        Ok(())
    }
}

/// Half-open internal search interval of a parameter
fn internal_bounds(param: &Parameter) -> (f64, f64) {
    match &param.param_type {
        ParameterType::Float { low, high, log_scale: true } => (low.ln(), high.ln()),
        ParameterType::Float { low, high, .. } => (*low, *high),
        ParameterType::Int { low, high, step } => (0.0, Parameter::n_steps(*low, *high, *step) as f64),
    }
}

fn from_internal(param: &Parameter, x: f64) -> ParameterValue {
    match &param.param_type {
        ParameterType::Float { low, high, log_scale } => {
            let v = if *log_scale { x.exp() } else { x };
            ParameterValue::Float(v.clamp(*low, *high))
        }
        ParameterType::Int { low, high, step } => {
            let last = Parameter::n_steps(*low, *high, *step) - 1;
            let idx = (x.floor() as i64).clamp(0, last);
            ParameterValue::Int(low + idx * step)
        }
    }
}

fn to_internal(param: &Parameter, value: &ParameterValue) -> f64 {
    let (low, high) = internal_bounds(param);
    let x = match &param.param_type {
        ParameterType::Float { log_scale: true, .. } => value.as_float().unwrap_or(1.0).ln(),
        ParameterType::Float { .. } => value.as_float().unwrap_or(low),
        ParameterType::Int { low: int_low, step, .. } => {
            // middle of the index cell
            let v = value.as_int().unwrap_or(*int_low);
            ((v - int_low) / step) as f64 + 0.5
        }
    };
    // keep strictly below the open upper bound
    x.clamp(low, high - (high - low) * 1e-9)
}

/// Create a sampler of the given type
pub fn create_sampler(sampler_type: SamplerType, seed: u64) -> Box<dyn Sampler> {
    match sampler_type {
        SamplerType::Tpe => Box::new(TpeSampler::new(seed)),
        SamplerType::Random => Box::new(RandomSampler::new(seed)),
    }
}
