//! Single-house prediction from persisted artifacts

use crate::business::BusinessRuleEngine;
use crate::config::AppConfig;
use crate::error::{HousePriceError, Result};
use crate::features::{HouseFeatures, FEATURE_COLUMNS};
use crate::preprocessing::{frame_to_array, StandardScaler};
use crate::training::Regressor;
use serde::Serialize;
use tracing::{error, info, warn};

/// Value reported in place of a price when business rules reject a request
pub const REJECTED_PREDICTION: f64 = -1.0;

/// Outcome of [`HousePredictor::predict`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Prediction {
    /// Predicted price
    Accepted { value: f64 },
    /// Names of the violated business rules
    Rejected { violations: Vec<String> },
}

impl Prediction {
    /// Predicted price, or [`REJECTED_PREDICTION`]
    pub fn value(&self) -> f64 {
        match self {
            Prediction::Accepted { value } => *value,
            Prediction::Rejected { .. } => REJECTED_PREDICTION,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Prediction::Rejected { .. })
    }

    pub fn violations(&self) -> &[String] {
        match self {
            Prediction::Accepted { .. } => &[],
            Prediction::Rejected { violations } => violations,
        }
    }
}

/// Business rules, scaler and model loaded once and shared across requests
#[derive(Debug)]
pub struct HousePredictor {
    rules: BusinessRuleEngine,
    scaler: StandardScaler,
    regressor: Regressor,
}

impl HousePredictor {
    pub fn new(rules: BusinessRuleEngine, scaler: StandardScaler, regressor: Regressor) -> Result<Self> {
        check_compatible(&scaler, &regressor)?;
        Ok(Self {
            rules,
            scaler,
            regressor,
        })
    }

    /// Load the scaler and model selected by `config`, with the default rules
    pub fn load(config: &AppConfig) -> Result<Self> {
        let layout = config.layout()?;
        let scaler_path = layout.scaler_path();
        let model_path = layout.model_path(&config.model_name);

        let scaler = StandardScaler::load(&scaler_path).map_err(|e| {
            error!(path = %scaler_path.display(), error = %e, "Failed to load scaler");
            e
        })?;
        let regressor = Regressor::load(&model_path).map_err(|e| {
            error!(path = %model_path.display(), error = %e, "Failed to load model");
            e
        })?;

        let predictor = Self::new(BusinessRuleEngine::with_default_rules(), scaler, regressor)?;
        info!(
            date = layout.date(),
            model = predictor.regressor.name(),
            rules = ?predictor.rules.rule_names(),
            "Loaded predictor"
        );
        Ok(predictor)
    }

    pub fn rules(&self) -> &BusinessRuleEngine {
        &self.rules
    }

    pub fn regressor(&self) -> &Regressor {
        &self.regressor
    }

    pub fn predict(&self, features: &HouseFeatures) -> Result<Prediction> {
        let violations = self.rules.violations(features);
        if !violations.is_empty() {
            warn!(?features, ?violations, "Business rules violated");
            return Ok(Prediction::Rejected {
                violations: violations.into_iter().map(String::from).collect(),
            });
        }

        let scaled = self.scaler.transform(&features.to_frame()?)?;
        let x = frame_to_array(&scaled, &FEATURE_COLUMNS)?;
        let value = self
            .regressor
            .predict(&x)?
            .first()
            .copied()
            .ok_or_else(|| HousePriceError::ValidationError("model returned no prediction".to_string()))?;

        info!(?features, prediction = value, "Prediction made");
        Ok(Prediction::Accepted { value })
    }
}

fn check_compatible(scaler: &StandardScaler, regressor: &Regressor) -> Result<()> {
    if !scaler.is_fitted() {
        return Err(HousePriceError::ModelNotFitted);
    }
    let names = scaler.feature_names();
    if names != FEATURE_COLUMNS {
        return Err(HousePriceError::ValidationError(format!(
            "scaler was fitted on {:?}, expected {:?}",
            names, FEATURE_COLUMNS
        )));
    }
    if regressor.n_features() != FEATURE_COLUMNS.len() {
        return Err(HousePriceError::ShapeError {
            expected: format!("{} model features", FEATURE_COLUMNS.len()),
            actual: format!("{} model features", regressor.n_features()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::{ElasticNetParams, RegressorParams};
    use approx::assert_abs_diff_eq;
    use ndarray::{Array1, Array2};
    use polars::prelude::*;

    fn fitted_scaler() -> StandardScaler {
        let df = df!(
            "rooms" => &[1.0, 2.0, 3.0, 4.0],
            "size" => &[50.0, 100.0, 150.0, 200.0],
            "bathrooms" => &[1.0, 1.0, 2.0, 2.0]
        )
        .unwrap();
        let mut scaler = StandardScaler::new();
        scaler.fit(&df, &FEATURE_COLUMNS).unwrap();
        scaler
    }

    fn regressor() -> Regressor {
        let x = Array2::from_shape_fn((30, 3), |(i, j)| (((i * 5 + j * 2) % 9) as f64 - 4.0) / 2.0);
        let y: Array1<f64> = x.rows().into_iter().map(|r| 10.0 * r[0] + 5.0 * r[1] + r[2] + 100.0).collect();
        let params = RegressorParams::ElasticNet(ElasticNetParams {
            penalty: 1e-4,
            ..Default::default()
        });
        Regressor::fit(params, &x, &y).unwrap()
    }

    fn predictor() -> HousePredictor {
        HousePredictor::new(BusinessRuleEngine::with_default_rules(), fitted_scaler(), regressor()).unwrap()
    }

    #[test]
    fn test_accepted_prediction_matches_manual_pipeline() {
        let predictor = predictor();
        let house = HouseFeatures::new(3, 120.0, 2);

        let prediction = predictor.predict(&house).unwrap();
        assert!(!prediction.is_rejected());

        let scaled = fitted_scaler().transform(&house.to_frame().unwrap()).unwrap();
        let x = frame_to_array(&scaled, &FEATURE_COLUMNS).unwrap();
        let expected = regressor().predict(&x).unwrap()[0];
        assert_abs_diff_eq!(prediction.value(), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_rejected_prediction_returns_sentinel() {
        let prediction = predictor().predict(&HouseFeatures::new(6, 120.0, 2)).unwrap();
        assert!(prediction.is_rejected());
        assert_eq!(prediction.value(), REJECTED_PREDICTION);
        assert_eq!(prediction.violations(), &["rooms".to_string()]);
    }

    #[test]
    fn test_bathrooms_rule_is_enforced() {
        let prediction = predictor().predict(&HouseFeatures::new(3, 120.0, 5)).unwrap();
        assert_eq!(prediction.violations(), &["bathrooms".to_string()]);
    }

    #[test]
    fn test_rejects_scaler_with_other_features() {
        let df = df!("a" => &[1.0, 2.0], "b" => &[3.0, 4.0], "c" => &[5.0, 6.0]).unwrap();
        let mut scaler = StandardScaler::new();
        scaler.fit(&df, &["a", "b", "c"]).unwrap();

        let result = HousePredictor::new(BusinessRuleEngine::new(), scaler, regressor());
        assert!(matches!(result, Err(HousePriceError::ValidationError(_))));
    }

    #[test]
    fn test_rejects_unfitted_scaler() {
        let result = HousePredictor::new(BusinessRuleEngine::new(), StandardScaler::new(), regressor());
        assert!(matches!(result, Err(HousePriceError::ModelNotFitted)));
    }

    #[test]
    fn test_load_missing_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::default()
            .with_models_path(dir.path())
            .with_model_date("20250805");
        assert!(matches!(
            HousePredictor::load(&config),
            Err(HousePriceError::ArtifactError { .. })
        ));
    }
}
