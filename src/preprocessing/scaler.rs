//! Standard (z-score) feature scaling

use crate::artifacts::{read_json, write_json};
use crate::error::{HousePriceError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Fitted parameters of one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ColumnParams {
    name: String,
    mean: f64,
    scale: f64, // population std, 1.0 for constant columns
}

/// Standard scaler: `(x - mean) / std`
///
/// Columns keep the order they were fitted in, which is the order the
/// model sees them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    params: Vec<ColumnParams>,
    is_fitted: bool,
}

impl StandardScaler {
    /// Create an unfitted scaler
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit the scaler to the given columns of `df`
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        if df.height() == 0 {
            return Err(HousePriceError::PreprocessingError(
                "cannot fit scaler on an empty frame".to_string(),
            ));
        }

        let params = columns
            .iter()
            .map(|name| {
                let series = float_column(df, name)?;
                let ca = series.f64()?;
                let mean = ca.mean().unwrap_or(0.0);
                let std = ca.std(0).unwrap_or(0.0);
                Ok(ColumnParams {
                    name: name.to_string(),
                    mean,
                    scale: if std == 0.0 || !std.is_finite() { 1.0 } else { std },
                })
            })
            .collect::<Result<Vec<_>>>()?;

        self.params = params;
        self.is_fitted = true;
        Ok(self)
    }

    /// Scale every fitted column of `df`; other columns pass through untouched
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        self.map_columns(df, |v, p| (v - p.mean) / p.scale)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// Undo `transform`
    pub fn inverse_transform(&self, df: &DataFrame) -> Result<DataFrame> {
        self.map_columns(df, |v, p| v * p.scale + p.mean)
    }

    /// Fitted column names, in fit order
    pub fn feature_names(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Persist as JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if !self.is_fitted {
            return Err(HousePriceError::ModelNotFitted);
        }
        write_json(path, self)
    }

    /// Load a scaler persisted with [`StandardScaler::save`]
    pub fn load(path: &Path) -> Result<Self> {
        let scaler: Self = read_json(path)?;
        if !scaler.is_fitted {
            return Err(HousePriceError::artifact(path, "scaler was saved unfitted"));
        }
        Ok(scaler)
    }

    /// Build every replacement column first, then apply them in one pass
    fn map_columns(&self, df: &DataFrame, f: impl Fn(f64, &ColumnParams) -> f64) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(HousePriceError::ModelNotFitted);
        }

        let replacements: Vec<Series> = self
            .params
            .iter()
            .map(|params| {
                let series = float_column(df, &params.name)?;
                let mapped: Float64Chunked = series
                    .f64()?
                    .into_iter()
                    .map(|opt| opt.map(|v| f(v, params)))
                    .collect();
                Ok(mapped.with_name(params.name.as_str().into()).into_series())
            })
            .collect::<Result<Vec<_>>>()?;

        let mut result = df.clone();
        for series in replacements {
            result.with_column(series)?;
        }
        Ok(result)
    }
}

fn float_column(df: &DataFrame, name: &str) -> Result<Series> {
    let column = df
        .column(name)
        .map_err(|_| HousePriceError::FeatureNotFound(name.to_string()))?;
    Ok(column.as_materialized_series().cast(&DataType::Float64)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn frame() -> DataFrame {
        df!(
            "a" => &[1.0, 2.0, 3.0, 4.0, 5.0],
            "b" => &[7.0, 7.0, 7.0, 7.0, 7.0],
            "target" => &[10.0, 20.0, 30.0, 40.0, 50.0]
        )
        .unwrap()
    }

    fn values(df: &DataFrame, name: &str) -> Vec<f64> {
        df.column(name)
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect()
    }

    #[test]
    fn test_standard_scaler_zero_mean_unit_variance() {
        let mut scaler = StandardScaler::new();
        let result = scaler.fit_transform(&frame(), &["a"]).unwrap();

        let col = values(&result, "a");
        let mean = col.iter().sum::<f64>() / col.len() as f64;
        let var = col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / col.len() as f64;
        assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-10);
        // population variance, as used for standardization
        assert_abs_diff_eq!(var, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_constant_column_scales_by_one() {
        let mut scaler = StandardScaler::new();
        let result = scaler.fit_transform(&frame(), &["b"]).unwrap();
        assert!(values(&result, "b").iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn test_unfitted_columns_pass_through() {
        let mut scaler = StandardScaler::new();
        let result = scaler.fit_transform(&frame(), &["a"]).unwrap();
        assert_eq!(values(&result, "target"), vec![10.0, 20.0, 30.0, 40.0, 50.0]);
    }

    #[test]
    fn test_inverse_transform() {
        let df = frame();
        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(&df, &["a", "b"]).unwrap();
        let restored = scaler.inverse_transform(&scaled).unwrap();

        for (o, r) in values(&df, "a").iter().zip(values(&restored, "a")) {
            assert_abs_diff_eq!(*o, r, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_transform_before_fit_fails() {
        let scaler = StandardScaler::new();
        assert!(matches!(
            scaler.transform(&frame()),
            Err(HousePriceError::ModelNotFitted)
        ));
    }

    #[test]
    fn test_transform_missing_column_fails() {
        let mut scaler = StandardScaler::new();
        scaler.fit(&frame(), &["a"]).unwrap();
        let other = df!("z" => &[1.0]).unwrap();
        assert!(matches!(
            scaler.transform(&other),
            Err(HousePriceError::FeatureNotFound(name)) if name == "a"
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("20250805/scaler.json");

        let mut scaler = StandardScaler::new();
        scaler.fit(&frame(), &["a", "b"]).unwrap();
        scaler.save(&path).unwrap();

        let loaded = StandardScaler::load(&path).unwrap();
        assert_eq!(loaded, scaler);
        assert_eq!(loaded.feature_names(), vec!["a", "b"]);
    }

    #[test]
    fn test_save_unfitted_fails() {
        let dir = tempfile::tempdir().unwrap();
        let scaler = StandardScaler::new();
        assert!(scaler.save(&dir.path().join("scaler.json")).is_err());
    }
}
