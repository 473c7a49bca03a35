//! House price prediction service
//!
//! This crate provides a small end-to-end regression service:
//! - A training pipeline: synthetic data, splitting and scaling, a baseline
//!   random forest or elastic net, hyperparameter search, held-out
//!   evaluation, dated artifacts
//! - A prediction service guarded by business rules
//! - An HTTP API and a command-line interface
//!
//! # Modules
//!
//! ## Training
//! - [`preprocessing`] - Train/test split and standard scaling
//! - [`training`] - Data generation, model fitting, evaluation, persistence
//! - [`optimizer`] - Hyperparameter search (TPE, random)
//!
//! ## Serving
//! - [`business`] - Business rules applied before prediction
//! - [`inference`] - Prediction from persisted artifacts
//! - [`server`] - HTTP server with REST API
//! - [`cli`] - Command-line interface
//!
//! ## Shared
//! - [`config`] - Environment-backed configuration
//! - [`artifacts`] - On-disk artifact layout
//! - [`features`] - Feature schema
//! - [`logging`] - Console and rolling file logs
//! - [`error`] - Error types

// Core error handling
pub mod error;

// Shared schema and configuration
pub mod artifacts;
pub mod config;
pub mod features;
pub mod logging;

// Training pipeline
pub mod preprocessing;
pub mod training;
pub mod optimizer;

// Serving
pub mod business;
pub mod inference;

// Services
pub mod server;
pub mod cli;

pub use error::{HousePriceError, Result};

/// Prelude for common imports
pub mod prelude {
    pub use crate::business::{BusinessRule, BusinessRuleEngine};
    pub use crate::config::{AppConfig, TrainerConfig};
    pub use crate::error::{HousePriceError, Result};
    pub use crate::features::HouseFeatures;
    pub use crate::inference::{HousePredictor, Prediction};
    pub use crate::optimizer::SamplerType;
    pub use crate::preprocessing::StandardScaler;
    pub use crate::training::{ModelKind, ModelOrchestrator, Regressor, RegressorParams, TrainingReport};
}
