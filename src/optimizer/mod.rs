//! Hyperparameter optimization module (HyperOptX)
//!
//! Provides bounded hyperparameter search with:
//! - Tree-structured Parzen Estimators (TPE, via the `tpe` crate)
//! - Random search, optionally evaluated in parallel
//! - Early stopping and wall-clock timeout

mod config;
mod optimizer;
mod samplers;
mod search_space;

pub use config::{OptimizationConfig, OptimizeDirection};
pub use optimizer::{HyperOptX, Study, TrialResult};
pub use samplers::{create_sampler, RandomSampler, Sampler, SamplerType, TpeSampler};
pub use search_space::{Parameter, ParameterType, ParameterValue, SearchSpace, TrialParams};
