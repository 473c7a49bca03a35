//! Prediction service
//!
//! Loads the persisted scaler and model once, checks business rules and
//! predicts one house at a time.

mod predictor;

pub use predictor::{HousePredictor, Prediction, REJECTED_PREDICTION};
