//! Search space definition for hyperparameters

use crate::error::{HousePriceError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Type of parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterType {
    /// Continuous float parameter in `[low, high]`
    Float {
        low: f64,
        high: f64,
        log_scale: bool,
    },
    /// Integer parameter taking `low, low + step, ...` up to `high`
    Int {
        low: i64,
        high: i64,
        step: i64,
    },
}

/// A single hyperparameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub param_type: ParameterType,
}

impl Parameter {
    /// Create a float parameter
    pub fn float(name: impl Into<String>, low: f64, high: f64) -> Self {
        Self {
            name: name.into(),
            param_type: ParameterType::Float {
                low,
                high,
                log_scale: false,
            },
        }
    }

    /// Create a log-scale float parameter
    pub fn log_float(name: impl Into<String>, low: f64, high: f64) -> Self {
        Self {
            name: name.into(),
            param_type: ParameterType::Float {
                low,
                high,
                log_scale: true,
            },
        }
    }

    /// Create an integer parameter
    pub fn int(name: impl Into<String>, low: i64, high: i64) -> Self {
        Self::int_step(name, low, high, 1)
    }

    /// Create an integer parameter on a step grid
    pub fn int_step(name: impl Into<String>, low: i64, high: i64, step: i64) -> Self {
        Self {
            name: name.into(),
            param_type: ParameterType::Int { low, high, step },
        }
    }

    /// Check bounds
    pub fn validate(&self) -> Result<()> {
        let reason = match &self.param_type {
            ParameterType::Float { low, high, log_scale } => {
                if !(low.is_finite() && high.is_finite() && low < high) {
                    Some("bounds must be finite with low < high")
                } else if *log_scale && *low <= 0.0 {
                    Some("log-scale bounds must be positive")
                } else {
                    None
                }
            }
            ParameterType::Int { low, high, step } => {
                if low > high {
                    Some("low must not exceed high")
                } else if *step <= 0 {
                    Some("step must be positive")
                } else {
                    None
                }
            }
        };

        match reason {
            Some(reason) => Err(HousePriceError::invalid_parameter(
                &self.name,
                format!("{:?}", self.param_type),
                reason,
            )),
            None => Ok(()),
        }
    }

    /// Number of grid points of an integer parameter
    pub(crate) fn n_steps(low: i64, high: i64, step: i64) -> i64 {
        (high - low) / step + 1
    }

    /// Sample a uniformly random value
    pub fn sample(&self, rng: &mut impl Rng) -> ParameterValue {
        match &self.param_type {
            ParameterType::Float { low, high, log_scale } => {
                let val = if *log_scale {
                    rng.gen_range(low.ln()..=high.ln()).exp().clamp(*low, *high)
                } else {
                    rng.gen_range(*low..=*high)
                };
                ParameterValue::Float(val)
            }
            ParameterType::Int { low, high, step } => {
                let idx = rng.gen_range(0..Self::n_steps(*low, *high, *step));
                ParameterValue::Int(low + idx * step)
            }
        }
    }
}

/// Sampled parameter value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Int(i64),
    Float(f64),
}

impl ParameterValue {
    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ParameterValue::Float(v) => Some(*v),
            ParameterValue::Int(v) => Some(*v as f64),
        }
    }

    /// Get as int
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParameterValue::Int(v) => Some(*v),
            ParameterValue::Float(_) => None,
        }
    }
}

/// Search space for hyperparameter optimization
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchSpace {
    parameters: Vec<Parameter>,
}

impl SearchSpace {
    /// Create a new empty search space
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter to the search space
    pub fn add(mut self, param: Parameter) -> Self {
        self.parameters.push(param);
        self
    }

    /// Add a float parameter
    pub fn float(self, name: impl Into<String>, low: f64, high: f64) -> Self {
        self.add(Parameter::float(name, low, high))
    }

    /// Add a log-scale float parameter
    pub fn log_float(self, name: impl Into<String>, low: f64, high: f64) -> Self {
        self.add(Parameter::log_float(name, low, high))
    }

    /// Add an integer parameter
    pub fn int(self, name: impl Into<String>, low: i64, high: i64) -> Self {
        self.add(Parameter::int(name, low, high))
    }

    /// Add an integer parameter on a step grid
    pub fn int_step(self, name: impl Into<String>, low: i64, high: i64, step: i64) -> Self {
        self.add(Parameter::int_step(name, low, high, step))
    }

    /// Get all parameters
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Check every parameter, and that the space is non-empty
    pub fn validate(&self) -> Result<()> {
        if self.parameters.is_empty() {
            return Err(HousePriceError::OptimizationError("empty search space".to_string()));
        }
        self.parameters.iter().try_for_each(Parameter::validate)
    }

    /// Sample a random configuration
    pub fn sample(&self, rng: &mut impl Rng) -> TrialParams {
        self.parameters
            .iter()
            .map(|p| (p.name.clone(), p.sample(rng)))
            .collect()
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

/// Alias for sampled configuration
pub type TrialParams = BTreeMap<String, ParameterValue>;

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_search_space_builder() {
        let space = SearchSpace::new()
            .log_float("penalty", 1e-4, 10.0)
            .float("l1_ratio", 0.0, 1.0)
            .int_step("max_iterations", 100, 1000, 100);

        assert_eq!(space.len(), 3);
        let names: Vec<&str> = space.parameters().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["penalty", "l1_ratio", "max_iterations"]);
        assert!(space.validate().is_ok());
    }

    #[test]
    fn test_log_scale_sampling() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let param = Parameter::log_float("penalty", 1e-4, 10.0);

        let samples: Vec<f64> = (0..200)
            .filter_map(|_| param.sample(&mut rng).as_float())
            .collect();

        assert!(samples.iter().all(|&v| (1e-4..=10.0).contains(&v)));
        // log-uniform puts a fair share of draws below 0.01
        assert!(samples.iter().filter(|&&v| v < 1e-2).count() > 40);
    }

    #[test]
    fn test_int_step_sampling_stays_on_grid() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let param = Parameter::int_step("max_iterations", 100, 1000, 100);

        for _ in 0..100 {
            let v = param.sample(&mut rng).as_int().unwrap();
            assert!((100..=1000).contains(&v));
            assert_eq!(v % 100, 0);
        }
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(Parameter::float("x", 1.0, 0.0).validate().is_err());
        assert!(Parameter::log_float("x", 0.0, 1.0).validate().is_err());
        assert!(Parameter::int_step("x", 0, 10, 0).validate().is_err());
        assert!(SearchSpace::new().validate().is_err());
    }

    #[test]
    fn test_params_serialize_as_plain_numbers() {
        let mut params = TrialParams::new();
        params.insert("l1_ratio".to_string(), ParameterValue::Float(0.25));
        params.insert("max_iterations".to_string(), ParameterValue::Int(300));

        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"{"l1_ratio":0.25,"max_iterations":300}"#);
    }
}
