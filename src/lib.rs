//! # IAML data helpers
//!
//! Data preparation for the IAML coursework: loading the CoVoST2
//! spoken-language classification data and loading and normalizing the
//! Fashion-MNIST image data.
//!
//! ## Overview
//!
//! Two independent, stateless entry points:
//!
//! - [`load_language_data`] — train/test splits plus language display names
//!   parsed from `languages.txt` and the class identifiers `"0"`..`"21"`
//! - [`normalize_image_data`] — train/test splits rescaled to \[0, 1\], the
//!   training per-feature mean, and both splits centered on that mean
//!
//! Both read from [`Config::data_dir`]. The on-disk formats are owned by a
//! [`DatasetLoader`]; the bundled loaders read CoVoST2 `.npz` and
//! Fashion-MNIST IDX files.
//!
//! ## Structure
//!
//! - [`core`] — Error type, dataset splits
//! - [`data`] — Loaders and the two entry points
//! - [`utils`] — Rescaling and mean-centering

pub mod core;
pub mod data;
pub mod utils;

pub use crate::core::{DataError, DataResult, Dataset, Split};
pub use data::{
    load_language_data, load_language_data_with, normalize_image_data,
    normalize_image_data_with, CoVoST2Loader, DatasetLoader, FashionMnistLoader, LanguageData,
    NormalizedImages,
};
pub use utils::{rescale, FeatureMean};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Dataset locations and preprocessing constants.
///
/// Used by [`load_language_data`] and [`normalize_image_data`]. Any field
/// missing from a JSON config file takes its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Dataset root directory.
    pub data_dir: PathBuf,
    /// Language label table, relative to `data_dir`.
    pub languages_file: String,
    /// CoVoST2 archive, relative to `data_dir`.
    pub language_archive: String,
    /// Number of class identifiers produced for the language task.
    pub num_language_classes: usize,
    /// Width of the code prefix on each label-table line.
    pub language_code_width: usize,
    /// Divisor mapping raw pixel values into \[0, 1\].
    pub pixel_max: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            languages_file: "languages.txt".to_string(),
            language_archive: data::language::COVOST2_ARCHIVE.to_string(),
            num_language_classes: data::language::COVOST2_NUM_CLASSES,
            language_code_width: 3,
            pixel_max: 255.0,
        }
    }
}

impl Config {
    /// Defaults rooted at `<cwd>/data`.
    ///
    /// # Errors
    ///
    /// Returns `CurrentDir` if the working directory cannot be resolved.
    pub fn from_current_dir() -> DataResult<Self> {
        let cwd = std::env::current_dir().map_err(DataError::CurrentDir)?;
        Ok(Self::with_data_dir(cwd.join("data")))
    }

    /// Defaults rooted at an explicit directory.
    #[must_use]
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Read a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, `InvalidConfig` if it does
    /// not parse or fails [`Config::validate`].
    pub fn from_json_file(path: &Path) -> DataResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| DataError::io(path, e))?;
        let config: Self = serde_json::from_str(&json).map_err(|e| {
            DataError::InvalidConfig(format!("failed to parse {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the rescaling divisor is usable.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `pixel_max` is not finite and positive.
    pub fn validate(&self) -> DataResult<()> {
        if !self.pixel_max.is_finite() || self.pixel_max <= 0.0 {
            return Err(DataError::InvalidConfig(format!(
                "pixel_max must be positive and finite, got {}",
                self.pixel_max
            )));
        }
        Ok(())
    }

    /// Full path of the language label table.
    #[must_use]
    pub fn languages_path(&self) -> PathBuf {
        self.data_dir.join(&self.languages_file)
    }
}
