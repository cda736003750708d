//! Core dataset types shared by both loaders.
//!
//! A [`Dataset`] is a pair of [`Split`]s (train and test). Each split holds a
//! feature matrix and an index-aligned label vector:
//! ```text
//! features: (n_samples, n_features)   f64
//! labels:   (n_samples,)              i64
//! ```
//!
//! Constructors check the row/label alignment so every `Split` that exists
//! satisfies `features.nrows() == labels.len()`.

use ndarray::{Array1, Array2};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for dataset loading and preprocessing.
#[derive(Debug, Error)]
pub enum DataError {
    /// A file could not be opened or read.
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The process working directory could not be resolved.
    #[error("Failed to resolve current directory: {0}")]
    CurrentDir(#[source] io::Error),

    /// An IDX file had a bad header or truncated payload.
    #[error("Invalid IDX file {}: {reason}", .path.display())]
    InvalidIdx { path: PathBuf, reason: String },

    /// An array could not be read from a `.npz` archive.
    #[error("Failed to read array '{name}' from {}: {reason}", .path.display())]
    Archive {
        path: PathBuf,
        name: String,
        reason: String,
    },

    /// Matrix dimensions disagree.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// A statistic was requested over zero samples.
    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    /// Configuration could not be parsed or holds an unusable value.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl DataError {
    /// Wrap an I/O error together with the path that produced it.
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        DataError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type DataResult<T> = Result<T, DataError>;

/// One partition of a dataset: feature rows and their class labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    /// Feature matrix, shape `(n_samples, n_features)`.
    pub features: Array2<f64>,
    /// Class identifiers, one per feature row.
    pub labels: Array1<i64>,
}

impl Split {
    /// Build a split, rejecting feature/label count disagreement.
    ///
    /// # Errors
    /// - `ShapeMismatch` if `features.nrows() != labels.len()`
    pub fn new(features: Array2<f64>, labels: Array1<i64>) -> DataResult<Self> {
        if features.nrows() != labels.len() {
            return Err(DataError::ShapeMismatch(format!(
                "{} feature rows but {} labels",
                features.nrows(),
                labels.len()
            )));
        }
        Ok(Self { features, labels })
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of feature columns.
    #[must_use]
    pub fn num_features(&self) -> usize {
        self.features.ncols()
    }
}

/// Train and test partitions as produced by a [`crate::data::DatasetLoader`].
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub train: Split,
    pub test: Split,
}

impl Dataset {
    /// Pair two splits, requiring the same feature width.
    ///
    /// # Errors
    /// - `ShapeMismatch` if train and test have different column counts
    pub fn new(train: Split, test: Split) -> DataResult<Self> {
        if train.num_features() != test.num_features() {
            return Err(DataError::ShapeMismatch(format!(
                "train has {} features, test has {}",
                train.num_features(),
                test.num_features()
            )));
        }
        Ok(Self { train, test })
    }
}
