//! House feature schema shared by training and serving

use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Feature columns, in model order
pub const FEATURE_COLUMNS: [&str; 3] = ["rooms", "size", "bathrooms"];

/// Target column
pub const TARGET_COLUMN: &str = "price";

/// One house to price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HouseFeatures {
    /// Number of rooms
    pub rooms: u32,
    /// Floor area in square meters
    pub size: f64,
    /// Number of bathrooms
    pub bathrooms: u32,
}

impl HouseFeatures {
    pub fn new(rooms: u32, size: f64, bathrooms: u32) -> Self {
        Self { rooms, size, bathrooms }
    }

    /// Values in `FEATURE_COLUMNS` order
    pub fn values(&self) -> [f64; 3] {
        [self.rooms as f64, self.size, self.bathrooms as f64]
    }

    /// Single-row frame with one Float64 column per feature
    pub fn to_frame(&self) -> Result<DataFrame> {
        let columns: Vec<Column> = FEATURE_COLUMNS
            .iter()
            .zip(self.values())
            .map(|(name, value)| Series::new((*name).into(), &[value]).into())
            .collect();
        Ok(DataFrame::new(columns)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_frame_single_row() {
        let house = HouseFeatures::new(3, 120.5, 2);
        let df = house.to_frame().unwrap();

        assert_eq!(df.height(), 1);
        assert_eq!(df.width(), 3);
        let size = df.column("size").unwrap().as_materialized_series().f64().unwrap().get(0);
        assert_eq!(size, Some(120.5));
        let rooms = df.column("rooms").unwrap().as_materialized_series().f64().unwrap().get(0);
        assert_eq!(rooms, Some(3.0));
    }

    #[test]
    fn test_values_order_matches_columns() {
        let house = HouseFeatures::new(4, 80.0, 1);
        assert_eq!(house.values(), [4.0, 80.0, 1.0]);
    }
}
