//! Model training module
//!
//! The training pipeline stages:
//! - Synthetic data generation
//! - Baseline model fitting (random forest or elastic net)
//! - Hyperparameter search and refit
//! - Held-out evaluation
//! - Artifact persistence
//! - Orchestration of all of the above

mod data_gen;
mod evaluator;
mod hpo;
mod models;
mod orchestrator;
mod saver;
mod trainer;

pub use data_gen::{DataGenerator, GeneratedData};
pub use evaluator::ModelEvaluator;
pub use hpo::{params_from_trial, search_space, HpoOutcome, ModelHpo};
pub use models::{
    r2_score, ElasticNetParams, ForestParams, ModelKind, ModelMetrics, Regressor, RegressorParams,
};
pub use orchestrator::{ModelOrchestrator, TrainingReport};
pub use saver::{ModelSaver, SavedArtifacts};
pub use trainer::ModelTrainer;
