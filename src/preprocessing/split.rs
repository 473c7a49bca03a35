//! Seeded train/test row split

use crate::error::{HousePriceError, Result};
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Number of held-out rows for `n` rows: `ceil(test_size * n)`
pub fn test_rows(n: usize, test_size: f64) -> usize {
    (n as f64 * test_size).ceil() as usize
}

/// Shuffle rows with a seeded RNG and split them into `(train, test)`
///
/// Both partitions must end up non-empty.
pub fn train_test_split(df: &DataFrame, test_size: f64, seed: u64) -> Result<(DataFrame, DataFrame)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(HousePriceError::invalid_parameter(
            "test_size",
            test_size,
            "must be in (0, 1)",
        ));
    }

    let n = df.height();
    let n_test = test_rows(n, test_size);
    if n_test == 0 || n_test >= n {
        return Err(HousePriceError::PreprocessingError(format!(
            "cannot split {} rows with test_size {}: a partition would be empty",
            n, test_size
        )));
    }

    let mut indices: Vec<IdxSize> = (0..n as IdxSize).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (test_idx, train_idx) = indices.split_at(n_test);
    let train = df.take(&IdxCa::from_vec("idx".into(), train_idx.to_vec()))?;
    let test = df.take(&IdxCa::from_vec("idx".into(), test_idx.to_vec()))?;

    Ok((train, test))
}
