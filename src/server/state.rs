//! Application state management

use std::sync::Arc;

use crate::inference::HousePredictor;

/// Application state shared across handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub predictor: Arc<HousePredictor>,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(predictor: HousePredictor) -> Self {
        Self {
            predictor: Arc::new(predictor),
            started_at: chrono::Utc::now(),
        }
    }
}
