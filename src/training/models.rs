//! Regression models and evaluation metrics
//!
//! Fitting and prediction are delegated to `smartcore` (random forest) and
//! `linfa-elasticnet` (elastic net); this module only owns the parameter
//! records, input checks and persistence.

use crate::artifacts::{read_json, write_json};
use crate::error::{HousePriceError, Result};
use linfa::prelude::*;
use linfa_elasticnet::ElasticNet;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

type Forest = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Model family; its name is the artifact subdirectory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ModelKind {
    #[default]
    RandomForest,
    ElasticNet,
}

impl ModelKind {
    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::RandomForest => "RandomForest",
            ModelKind::ElasticNet => "ElasticNet",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelKind {
    type Err = HousePriceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace(&['_', '-'][..], "").as_str() {
            "randomforest" | "rf" => Ok(ModelKind::RandomForest),
            "elasticnet" | "enet" => Ok(ModelKind::ElasticNet),
            other => Err(HousePriceError::invalid_parameter(
                "model",
                other,
                "expected 'random_forest' or 'elastic_net'",
            )),
        }
    }
}

/// Hyperparameters of the random forest
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    /// Number of trees
    pub n_estimators: usize,
    /// Maximum tree depth, unbounded when `None`
    pub max_depth: Option<u16>,
    /// Minimum leaf size as a fraction of the training rows (at least one row)
    pub min_samples_leaf: f64,
    /// Bootstrap and feature sampling seed
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_leaf: 0.0,
            seed: 42,
        }
    }
}

impl ForestParams {
    /// Leaf size in rows for a training set of `n_rows`
    pub fn leaf_rows(&self, n_rows: usize) -> usize {
        ((self.min_samples_leaf * n_rows as f64).ceil() as usize).max(1)
    }

    fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(HousePriceError::invalid_parameter(
                "n_estimators",
                self.n_estimators,
                "must be at least 1",
            ));
        }
        if self.max_depth == Some(0) {
            return Err(HousePriceError::invalid_parameter("max_depth", 0, "must be at least 1"));
        }
        if !(0.0..1.0).contains(&self.min_samples_leaf) {
            return Err(HousePriceError::invalid_parameter(
                "min_samples_leaf",
                self.min_samples_leaf,
                "must be a fraction in [0, 1)",
            ));
        }
        Ok(())
    }
}

/// Hyperparameters of the elastic net
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElasticNetParams {
    /// Overall regularization strength
    pub penalty: f64,
    /// Mix between L1 (1.0) and L2 (0.0) regularization
    pub l1_ratio: f64,
    /// Coordinate descent iteration cap
    pub max_iterations: u32,
    /// Convergence tolerance
    pub tolerance: f64,
}

impl Default for ElasticNetParams {
    fn default() -> Self {
        Self {
            penalty: 1.0,
            l1_ratio: 0.5,
            max_iterations: 1000,
            tolerance: 1e-4,
        }
    }
}

impl ElasticNetParams {
    fn validate(&self) -> Result<()> {
        if !(self.penalty >= 0.0 && self.penalty.is_finite()) {
            return Err(HousePriceError::invalid_parameter("penalty", self.penalty, "must be >= 0"));
        }
        if !(0.0..=1.0).contains(&self.l1_ratio) {
            return Err(HousePriceError::invalid_parameter("l1_ratio", self.l1_ratio, "must be in [0, 1]"));
        }
        if self.max_iterations == 0 {
            return Err(HousePriceError::invalid_parameter(
                "max_iterations",
                self.max_iterations,
                "must be at least 1",
            ));
        }
        if !(self.tolerance > 0.0) {
            return Err(HousePriceError::invalid_parameter("tolerance", self.tolerance, "must be > 0"));
        }
        Ok(())
    }
}

/// Hyperparameters of either model family
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model")]
pub enum RegressorParams {
    RandomForest(ForestParams),
    ElasticNet(ElasticNetParams),
}

impl Default for RegressorParams {
    fn default() -> Self {
        RegressorParams::RandomForest(ForestParams::default())
    }
}

impl RegressorParams {
    /// Default parameters of `kind`, seeded where the model is randomized
    pub fn defaults(kind: ModelKind, seed: u64) -> Self {
        match kind {
            ModelKind::RandomForest => RegressorParams::RandomForest(ForestParams {
                seed,
                ..ForestParams::default()
            }),
            ModelKind::ElasticNet => RegressorParams::ElasticNet(ElasticNetParams::default()),
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            RegressorParams::RandomForest(_) => ModelKind::RandomForest,
            RegressorParams::ElasticNet(_) => ModelKind::ElasticNet,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            RegressorParams::RandomForest(p) => p.validate(),
            RegressorParams::ElasticNet(p) => p.validate(),
        }
    }

    /// Name/value pairs for display
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        match self {
            RegressorParams::RandomForest(p) => vec![
                ("n_estimators", p.n_estimators.to_string()),
                (
                    "max_depth",
                    p.max_depth.map_or_else(|| "none".to_string(), |d| d.to_string()),
                ),
                ("min_samples_leaf", format!("{:.4}", p.min_samples_leaf)),
            ],
            RegressorParams::ElasticNet(p) => vec![
                ("penalty", format!("{:.6}", p.penalty)),
                ("l1_ratio", format!("{:.4}", p.l1_ratio)),
                ("max_iterations", p.max_iterations.to_string()),
            ],
        }
    }
}

#[derive(Serialize, Deserialize)]
enum Estimator {
    RandomForest(Forest),
    /// Fitted on column-centered features; `x_mean` recenters at predict time
    ElasticNet {
        model: ElasticNet<f64>,
        x_mean: Array1<f64>,
    },
}

/// A fitted regressor
#[derive(Serialize, Deserialize)]
pub struct Regressor {
    params: RegressorParams,
    estimator: Estimator,
    n_features: usize,
}

impl fmt::Debug for Regressor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Regressor")
            .field("params", &self.params)
            .field("n_features", &self.n_features)
            .finish()
    }
}

impl Regressor {
    /// Fit a new model on `x`, `y`
    pub fn fit(params: RegressorParams, x: &Array2<f64>, y: &Array1<f64>) -> Result<Self> {
        params.validate()?;
        if x.nrows() != y.len() {
            return Err(HousePriceError::ShapeError {
                expected: format!("y length = {}", x.nrows()),
                actual: format!("y length = {}", y.len()),
            });
        }
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(HousePriceError::TrainingError("no training samples".to_string()));
        }

        let estimator = match &params {
            RegressorParams::RandomForest(p) => Estimator::RandomForest(fit_forest(p, x, y)?),
            RegressorParams::ElasticNet(p) => fit_elastic_net(p, x, y)?,
        };

        Ok(Self {
            params,
            estimator,
            n_features: x.ncols(),
        })
    }

    /// Predict one value per row of `x`
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if x.ncols() != self.n_features {
            return Err(HousePriceError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }
        match &self.estimator {
            Estimator::RandomForest(forest) => {
                let predictions = forest
                    .predict(&to_dense(x))
                    .map_err(|e| HousePriceError::TrainingError(e.to_string()))?;
                Ok(Array1::from_vec(predictions))
            }
            Estimator::ElasticNet { model, x_mean } => {
                let centered = x - x_mean;
                let predictions: Array1<f64> = model.predict(&centered);
                Ok(predictions)
            }
        }
    }

    pub fn kind(&self) -> ModelKind {
        self.params.kind()
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn params(&self) -> &RegressorParams {
        &self.params
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Linear coefficients in input feature space (elastic net only)
    pub fn coefficients(&self) -> Option<Array1<f64>> {
        match &self.estimator {
            Estimator::ElasticNet { model, .. } => Some(model.hyperplane().clone()),
            Estimator::RandomForest(_) => None,
        }
    }

    /// Intercept in input feature space (elastic net only)
    pub fn intercept(&self) -> Option<f64> {
        match &self.estimator {
            Estimator::ElasticNet { model, x_mean } => {
                Some(model.intercept() - x_mean.dot(model.hyperplane()))
            }
            Estimator::RandomForest(_) => None,
        }
    }

    /// Persist as JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }

    /// Load a model persisted with [`Regressor::save`]
    pub fn load(path: &Path) -> Result<Self> {
        read_json(path)
    }
}

fn to_dense(x: &Array2<f64>) -> DenseMatrix<f64> {
    let rows: Vec<Vec<f64>> = x.rows().into_iter().map(|r| r.to_vec()).collect();
    DenseMatrix::from_2d_vec(&rows)
}

fn fit_forest(p: &ForestParams, x: &Array2<f64>, y: &Array1<f64>) -> Result<Forest> {
    // every split considers all features
    let mut parameters = RandomForestRegressorParameters::default()
        .with_n_trees(p.n_estimators as _)
        .with_min_samples_leaf(p.leaf_rows(x.nrows()) as _)
        .with_m(x.ncols() as _)
        .with_seed(p.seed);
    if let Some(depth) = p.max_depth {
        parameters = parameters.with_max_depth(depth as _);
    }

    Forest::fit(&to_dense(x), &y.to_vec(), parameters)
        .map_err(|e| HousePriceError::TrainingError(e.to_string()))
}

fn fit_elastic_net(p: &ElasticNetParams, x: &Array2<f64>, y: &Array1<f64>) -> Result<Estimator> {
    // the solver only centers the target, so the features are centered here
    let x_mean = x
        .mean_axis(Axis(0))
        .ok_or_else(|| HousePriceError::TrainingError("no training samples".to_string()))?;
    let dataset = Dataset::new(x - &x_mean, y.clone());

    let model = ElasticNet::params()
        .penalty(p.penalty)
        .l1_ratio(p.l1_ratio)
        .max_iterations(p.max_iterations)
        .tolerance(p.tolerance)
        .fit(&dataset)
        .map_err(|e| HousePriceError::TrainingError(e.to_string()))?;

    Ok(Estimator::ElasticNet { model, x_mean })
}

/// Regression metrics for model evaluation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelMetrics {
    /// R-squared
    pub r2: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Error
    pub mae: f64,
    /// Number of scored samples
    pub n_samples: usize,
}

impl ModelMetrics {
    /// Compute regression metrics
    pub fn compute_regression(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(HousePriceError::ShapeError {
                expected: format!("{} predictions", y_true.len()),
                actual: format!("{} predictions", y_pred.len()),
            });
        }
        if y_true.is_empty() {
            return Err(HousePriceError::EvaluationError("no samples to score".to_string()));
        }

        let n = y_true.len() as f64;
        let errors: Vec<f64> = y_true.iter().zip(y_pred.iter()).map(|(t, p)| t - p).collect();

        let ss_res: f64 = errors.iter().map(|e| e * e).sum();
        let mse = ss_res / n;
        let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;

        let y_mean = y_true.sum() / n;
        let ss_tot: f64 = y_true.iter().map(|y| (y - y_mean).powi(2)).sum();
        let r2 = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

        Ok(Self {
            r2,
            mse,
            rmse: mse.sqrt(),
            mae,
            n_samples: y_true.len(),
        })
    }
}

/// R² of `y_pred` against `y_true`
pub fn r2_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64> {
    Ok(ModelMetrics::compute_regression(y_true, y_pred)?.r2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn linear_data() -> (Array2<f64>, Array1<f64>) {
        let x = array![
            [1.0, 0.5],
            [2.0, -1.0],
            [3.0, 0.0],
            [4.0, 1.5],
            [5.0, -0.5],
            [6.0, 2.0],
            [7.0, 1.0],
            [8.0, -2.0],
        ];
        let y = x.column(0).mapv(|v| 3.0 * v) + x.column(1).mapv(|v| -2.0 * v) + 1.0;
        (x, y)
    }

    fn enet(penalty: f64) -> RegressorParams {
        RegressorParams::ElasticNet(ElasticNetParams {
            penalty,
            ..Default::default()
        })
    }

    fn step_data() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((40, 2), |(i, j)| ((i * (j + 3)) % 17) as f64);
        let y: Array1<f64> = x.column(0).mapv(|v| if v > 8.0 { 50.0 } else { 10.0 });
        (x, y)
    }

    #[test]
    fn test_regression_metrics() {
        let y_true = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let y_pred = array![1.1, 2.0, 2.9, 4.1, 5.0];

        let metrics = ModelMetrics::compute_regression(&y_true, &y_pred).unwrap();

        assert_abs_diff_eq!(metrics.mse, 0.006, epsilon = 1e-12);
        assert_abs_diff_eq!(metrics.rmse, 0.006f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(metrics.mae, 0.06, epsilon = 1e-12);
        assert_abs_diff_eq!(metrics.r2, 1.0 - 0.03 / 10.0, epsilon = 1e-12);
        assert_eq!(metrics.n_samples, 5);
    }

    #[test]
    fn test_r2_constant_target_is_zero() {
        let y = array![2.0, 2.0, 2.0];
        assert_eq!(r2_score(&y, &array![1.0, 2.0, 3.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_metrics_reject_mismatched_lengths() {
        assert!(ModelMetrics::compute_regression(&array![1.0], &array![1.0, 2.0]).is_err());
        assert!(ModelMetrics::compute_regression(&array![], &array![]).is_err());
    }

    #[test]
    fn test_model_kind_parsing() {
        assert_eq!("random_forest".parse::<ModelKind>().unwrap(), ModelKind::RandomForest);
        assert_eq!("ElasticNet".parse::<ModelKind>().unwrap(), ModelKind::ElasticNet);
        assert!("svm".parse::<ModelKind>().is_err());
        assert_eq!(ModelKind::default().name(), "RandomForest");
    }

    #[test]
    fn test_leaf_fraction_maps_to_rows() {
        let params = ForestParams { min_samples_leaf: 0.01, ..Default::default() };
        assert_eq!(params.leaf_rows(80), 1);
        let params = ForestParams { min_samples_leaf: 0.5, ..Default::default() };
        assert_eq!(params.leaf_rows(80), 40);
        assert_eq!(ForestParams::default().leaf_rows(80), 1);
    }

    #[test]
    fn test_elastic_net_fits_uncentered_features() {
        let (x, y) = linear_data();
        let model = Regressor::fit(enet(1e-4), &x, &y).unwrap();

        let pred = model.predict(&x).unwrap();
        assert!(r2_score(&y, &pred).unwrap() > 0.99);
        assert_eq!(model.name(), "ElasticNet");

        let coef = model.coefficients().unwrap();
        assert_abs_diff_eq!(coef[0], 3.0, epsilon = 0.05);
        assert_abs_diff_eq!(coef[1], -2.0, epsilon = 0.05);
        assert_abs_diff_eq!(model.intercept().unwrap(), 1.0, epsilon = 0.2);
    }

    #[test]
    fn test_elastic_net_one_feature_offset() {
        let x = Array2::from_shape_fn((12, 1), |(i, _)| i as f64);
        let y = x.column(0).mapv(|v| 2.0 * v + 1.0);
        let model = Regressor::fit(enet(1e-6), &x, &y).unwrap();

        let pred = model.predict(&array![[20.0], [30.0]]).unwrap();
        assert_abs_diff_eq!(pred[0], 41.0, epsilon = 0.1);
        assert_abs_diff_eq!(pred[1], 61.0, epsilon = 0.1);
    }

    #[test]
    fn test_stronger_penalty_shrinks_coefficients() {
        let (x, y) = linear_data();
        let light = Regressor::fit(enet(1e-4), &x, &y).unwrap();
        let heavy = Regressor::fit(enet(5.0), &x, &y).unwrap();

        let norm = |m: &Regressor| m.coefficients().unwrap().iter().map(|c| c.abs()).sum::<f64>();
        assert!(norm(&heavy) < norm(&light));
    }

    #[test]
    fn test_forest_learns_step_function() {
        let (x, y) = step_data();
        let model = Regressor::fit(RegressorParams::default(), &x, &y).unwrap();

        let pred = model.predict(&x).unwrap();
        assert!(r2_score(&y, &pred).unwrap() > 0.9);
        assert_eq!(model.name(), "RandomForest");
        assert!(model.coefficients().is_none());
        assert!(model.intercept().is_none());
    }

    #[test]
    fn test_forest_is_seeded() {
        let (x, y) = step_data();
        let params = RegressorParams::RandomForest(ForestParams {
            n_estimators: 20,
            ..Default::default()
        });
        let a = Regressor::fit(params, &x, &y).unwrap();
        let b = Regressor::fit(params, &x, &y).unwrap();
        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn test_shallow_forest_fits_worse() {
        let (x, y) = step_data();
        let stump = RegressorParams::RandomForest(ForestParams {
            n_estimators: 20,
            min_samples_leaf: 0.5,
            ..Default::default()
        });
        let deep = RegressorParams::RandomForest(ForestParams {
            n_estimators: 20,
            ..Default::default()
        });

        let score = |p: RegressorParams| {
            let model = Regressor::fit(p, &x, &y).unwrap();
            r2_score(&y, &model.predict(&x).unwrap()).unwrap()
        };
        assert!(score(stump) < score(deep));
    }

    #[test]
    fn test_predict_rejects_wrong_width() {
        let (x, y) = linear_data();
        let model = Regressor::fit(enet(1.0), &x, &y).unwrap();
        assert!(model.predict(&Array2::zeros((1, 3))).is_err());
    }

    #[test]
    fn test_invalid_params() {
        let (x, y) = linear_data();
        let bad = RegressorParams::ElasticNet(ElasticNetParams {
            l1_ratio: 1.5,
            ..Default::default()
        });
        assert!(matches!(
            Regressor::fit(bad, &x, &y),
            Err(HousePriceError::InvalidParameter { .. })
        ));

        let bad = RegressorParams::RandomForest(ForestParams {
            max_depth: Some(0),
            ..Default::default()
        });
        assert!(Regressor::fit(bad, &x, &y).is_err());
    }

    #[test]
    fn test_params_json_is_tagged() {
        let json = serde_json::to_value(RegressorParams::default()).unwrap();
        assert_eq!(json["model"], "RandomForest");
        assert_eq!(json["n_estimators"], 100);

        let back: RegressorParams = serde_json::from_value(json).unwrap();
        assert_eq!(back, RegressorParams::default());
    }

    #[test]
    fn test_save_and_load_both_families() {
        let dir = tempfile::tempdir().unwrap();
        let (x, y) = linear_data();

        for params in [enet(0.1), RegressorParams::RandomForest(ForestParams { n_estimators: 10, ..Default::default() })] {
            let path = dir.path().join(params.kind().name()).join("model.json");
            let model = Regressor::fit(params, &x, &y).unwrap();
            model.save(&path).unwrap();
            let loaded = Regressor::load(&path).unwrap();

            assert_eq!(loaded.params(), model.params());
            assert_eq!(loaded.predict(&x).unwrap(), model.predict(&x).unwrap());
        }
    }
}
