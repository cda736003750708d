//! Dataset loading and preprocessing.
//!
//! ## Submodules
//!
//! - [`language`] — CoVoST2 language-classification data and the language label table
//! - [`image`] — Fashion-MNIST image data, rescaling and mean-centering
//!
//! Both entry points delegate the on-disk format to a [`DatasetLoader`], so any
//! source producing a [`Dataset`] can stand in for the bundled loaders.

pub mod image;
pub mod language;

pub use image::{
    normalize_image_data, normalize_image_data_with, FashionMnistLoader, NormalizedImages,
};
pub use language::{
    class_labels, display_name, load_language_data, load_language_data_with,
    parse_language_table, CoVoST2Loader, LanguageData,
};

use crate::core::{DataResult, Dataset};
use std::path::Path;

/// Source of a train/test dataset rooted at a directory.
///
/// Implementations own the file format entirely; callers only see the
/// resulting [`Dataset`].
pub trait DatasetLoader: Send + Sync {
    /// Load both partitions from `data_dir`.
    fn load(&self, data_dir: &Path) -> DataResult<Dataset>;

    /// Name for logging.
    fn name(&self) -> &'static str;
}
