//! Data preprocessing module
//!
//! Provides the preprocessing used by both sides of the service:
//! - Seeded train/test splitting
//! - Standard scaling fitted on the train partition only
//! - DataFrame to ndarray conversion for model fitting

mod pipeline;
mod scaler;
mod split;

pub use pipeline::{DataPreprocessor, PreprocessedData};
pub use scaler::StandardScaler;
pub use split::{test_rows, train_test_split};

use crate::error::{HousePriceError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;

/// Feature matrix and target vector of one partition
#[derive(Debug, Clone)]
pub struct Partition {
    pub x: Array2<f64>,
    pub y: Array1<f64>,
}

impl Partition {
    pub fn new(x: Array2<f64>, y: Array1<f64>) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(HousePriceError::ShapeError {
                expected: format!("y length = {}", x.nrows()),
                actual: format!("y length = {}", y.len()),
            });
        }
        Ok(Self { x, y })
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }
}

fn column_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|_| HousePriceError::FeatureNotFound(name.to_string()))?;
    let series = column.as_materialized_series().cast(&DataType::Float64)?;
    let ca = series.f64()?;
    if ca.null_count() > 0 {
        return Err(HousePriceError::DataError(format!(
            "column '{}' has {} missing values",
            name,
            ca.null_count()
        )));
    }
    Ok(ca.into_no_null_iter().collect())
}

/// Extract named columns into a row-major `Array2<f64>`
pub fn frame_to_array(df: &DataFrame, columns: &[&str]) -> Result<Array2<f64>> {
    let col_data: Vec<Vec<f64>> = columns
        .iter()
        .map(|name| column_values(df, name))
        .collect::<Result<_>>()?;

    Ok(Array2::from_shape_fn((df.height(), columns.len()), |(r, c)| col_data[c][r]))
}

/// Extract one column into an `Array1<f64>`
pub fn column_to_array(df: &DataFrame, column: &str) -> Result<Array1<f64>> {
    Ok(Array1::from_vec(column_values(df, column)?))
}
