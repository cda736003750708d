//! Elementwise rescaling and per-feature mean-centering.

use ndarray::{Array1, Array2, Axis};

use crate::core::{DataError, DataResult};

/// Divide every feature value by `scale`.
///
/// With `scale = 255.0` this maps 8-bit pixel intensities into \[0, 1\].
#[inline]
#[must_use]
pub fn rescale(features: &Array2<f64>, scale: f64) -> Array2<f64> {
    features.mapv(|v| v / scale)
}

/// Per-feature mean of a training matrix.
///
/// Computed once from the training features and applied unchanged to any
/// other matrix with the same column count, so test data is always centered
/// with the training statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMean {
    /// One mean value per column.
    pub mean: Array1<f64>,
}

impl FeatureMean {
    /// Column-wise arithmetic mean over the sample axis.
    ///
    /// # Errors
    /// - `EmptyDataset` if `features` has no rows
    pub fn fit(features: &Array2<f64>) -> DataResult<Self> {
        let mean = features.mean_axis(Axis(0)).ok_or_else(|| {
            DataError::EmptyDataset("cannot compute a feature mean over zero rows".to_string())
        })?;
        Ok(Self { mean })
    }

    /// Number of features the mean was fitted on.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    /// Subtract the mean from every row of `features`.
    ///
    /// # Errors
    /// - `ShapeMismatch` if the column count differs from [`FeatureMean::dim`]
    pub fn center(&self, features: &Array2<f64>) -> DataResult<Array2<f64>> {
        if features.ncols() != self.dim() {
            return Err(DataError::ShapeMismatch(format!(
                "cannot center {} columns with a {}-dim mean",
                features.ncols(),
                self.dim()
            )));
        }
        Ok(features - &self.mean)
    }
}
