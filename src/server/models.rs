//! Request and response bodies

use serde::{Deserialize, Deserializer, Serialize};

use crate::features::HouseFeatures;
use crate::inference::Prediction;

use super::error::{Result, ServerError};

/// Largest accepted room and bathroom counts
pub const MAX_COUNT: i64 = 10;
/// Largest accepted floor area in square meters
pub const MAX_SIZE: f64 = 1000.0;

/// Accepts `3` and `3.0` for a count, rejects `3.5`
fn integral<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(i64),
        Float(f64),
    }

    match Number::deserialize(deserializer)? {
        Number::Int(v) => Ok(v),
        Number::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => Ok(v as i64),
        Number::Float(v) => Err(serde::de::Error::custom(format!(
            "expected a whole number, got {}",
            v
        ))),
    }
}

/// Body of `POST /api/v1/predict`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRequest {
    /// Number of rooms, `0 < rooms <= 10`
    #[serde(deserialize_with = "integral")]
    pub rooms: i64,
    /// Floor area in m², `0 < size <= 1000`
    pub size: f64,
    /// Number of bathrooms, `0 < bathrooms <= 10`
    #[serde(deserialize_with = "integral")]
    pub bathrooms: i64,
}

impl PredictionRequest {
    /// Check field ranges and convert to model features
    pub fn validate(&self) -> Result<HouseFeatures> {
        let count = |name: &str, value: i64| -> Result<u32> {
            if value <= 0 || value > MAX_COUNT {
                return Err(ServerError::Validation(format!(
                    "{} must be greater than 0 and at most {}, got {}",
                    name, MAX_COUNT, value
                )));
            }
            Ok(value as u32)
        };

        let rooms = count("rooms", self.rooms)?;
        let bathrooms = count("bathrooms", self.bathrooms)?;
        if !(self.size > 0.0 && self.size <= MAX_SIZE) {
            return Err(ServerError::Validation(format!(
                "size must be greater than 0 and at most {}, got {}",
                MAX_SIZE, self.size
            )));
        }

        Ok(HouseFeatures::new(rooms, self.size, bathrooms))
    }
}

/// Body returned by `POST /api/v1/predict`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<String>,
}

impl From<Prediction> for PredictionResponse {
    fn from(prediction: Prediction) -> Self {
        Self {
            prediction: prediction.value(),
            violations: prediction.violations().to_vec(),
        }
    }
}

/// Body returned by `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    /// Unix time in seconds
    pub timestamp: f64,
    /// Seconds since the server started
    pub uptime_secs: f64,
}
