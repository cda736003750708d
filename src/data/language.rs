//! CoVoST2 spoken-language classification data.
//!
//! The language label table `languages.txt` has one language per line:
//! ```text
//! <code prefix, fixed width><spaces><display name>[ <anything else>]
//! ```
//! e.g. `"001 English extra"`. The display name is the first space-delimited
//! token after the prefix. The file ends with a newline, so the final
//! element of a `'\n'` split is always dropped.
//!
//! Class identifiers are the strings `"0"`..`"N-1"` for the configured class
//! count `N`, independent of how many lines the table has.

use ndarray::{Array1, Array2, Ix1, Ix2, OwnedRepr};
use ndarray_npy::{NpzReader, ReadNpzError};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::DatasetLoader;
use crate::core::{DataError, DataResult, Dataset, Split};
use crate::Config;

/// Default archive name read by [`CoVoST2Loader`].
pub const COVOST2_ARCHIVE: &str = "covost2.npz";
/// Number of language classes in the CoVoST2 subset.
pub const COVOST2_NUM_CLASSES: usize = 22;

/// Everything the language-classification task needs.
#[derive(Debug, Clone)]
pub struct LanguageData {
    pub train: Split,
    pub test: Split,
    /// Display names, one per line of the label table.
    pub language_names: Vec<String>,
    /// Class identifiers `"0"`..`"N-1"`.
    pub language_labels: Vec<String>,
}

impl LanguageData {
    /// Unpack into `(Xtrn, Ytrn, Xtst, Ytst, language_name, language_label)`.
    #[must_use]
    #[allow(clippy::type_complexity)]
    pub fn into_parts(
        self,
    ) -> (
        Array2<f64>,
        Array1<i64>,
        Array2<f64>,
        Array1<i64>,
        Vec<String>,
        Vec<String>,
    ) {
        (
            self.train.features,
            self.train.labels,
            self.test.features,
            self.test.labels,
            self.language_names,
            self.language_labels,
        )
    }
}

/// Split label-table text into lines, dropping the final element.
///
/// The last element is the empty string after the trailing newline. It is
/// dropped unconditionally, so a file without a trailing newline loses its
/// last line.
#[must_use]
pub fn parse_language_table(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = text.split('\n').collect();
    lines.pop();
    lines
}

/// Extract the display name from one label-table line.
///
/// Skips `code_width` characters, then any spaces separating the code from
/// the name, and returns everything up to the next space. Lines no longer
/// than the prefix yield an empty name.
#[must_use]
pub fn display_name(line: &str, code_width: usize) -> &str {
    let rest = match line.char_indices().nth(code_width) {
        Some((idx, _)) => &line[idx..],
        None => "",
    };
    let rest = rest.trim_start_matches(' ');
    rest.split(' ').next().unwrap_or_default()
}

/// Class identifier strings `"0"`..`"n-1"`.
#[must_use]
pub fn class_labels(n: usize) -> Vec<String> {
    (0..n).map(|i| i.to_string()).collect()
}

/// Load CoVoST2 with the bundled `.npz` loader.
///
/// # Errors
///
/// Returns `DataError` if the archive or the label table cannot be read.
pub fn load_language_data(config: &Config) -> DataResult<LanguageData> {
    let loader = CoVoST2Loader::new(&config.language_archive);
    load_language_data_with(&loader, config)
}

/// Load language data through an arbitrary [`DatasetLoader`].
///
/// The dataset is loaded from `config.data_dir` first, then the label table
/// is read from [`Config::languages_path`].
///
/// # Errors
///
/// Returns whatever the loader returns, or `DataError::Io` if the label
/// table is missing or unreadable.
pub fn load_language_data_with(
    loader: &dyn DatasetLoader,
    config: &Config,
) -> DataResult<LanguageData> {
    let Dataset { train, test } = loader.load(&config.data_dir)?;
    info!(
        loader = loader.name(),
        data_dir = %config.data_dir.display(),
        train = train.len(),
        test = test.len(),
        "loaded language dataset"
    );

    let languages_path = config.languages_path();
    let text =
        fs::read_to_string(&languages_path).map_err(|e| DataError::io(&languages_path, e))?;

    let code_width = config.language_code_width;
    let language_names: Vec<String> = parse_language_table(&text)
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            if line.chars().count() <= code_width {
                warn!(line = i + 1, "label line has no name after the code prefix");
            }
            display_name(line, code_width).to_string()
        })
        .collect();

    let language_labels = class_labels(config.num_language_classes);
    if language_names.len() != language_labels.len() {
        warn!(
            names = language_names.len(),
            classes = language_labels.len(),
            path = %languages_path.display(),
            "language name count differs from configured class count"
        );
    }
    debug!(names = ?language_names, "parsed language table");

    Ok(LanguageData {
        train,
        test,
        language_names,
        language_labels,
    })
}

/// Reads CoVoST2 features from a NumPy `.npz` archive.
///
/// The archive holds `Xtrn`, `Ytrn`, `Xtst`, `Ytst`. Features may be stored
/// as float64 or float32; labels as int64, int32 or uint8.
#[derive(Debug, Clone)]
pub struct CoVoST2Loader {
    archive: String,
}

impl CoVoST2Loader {
    #[must_use]
    pub fn new(archive: impl Into<String>) -> Self {
        Self {
            archive: archive.into(),
        }
    }

    /// Path of the archive under `data_dir`.
    #[must_use]
    pub fn archive_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.archive)
    }
}

impl Default for CoVoST2Loader {
    fn default() -> Self {
        Self::new(COVOST2_ARCHIVE)
    }
}

impl DatasetLoader for CoVoST2Loader {
    fn load(&self, data_dir: &Path) -> DataResult<Dataset> {
        let path = self.archive_path(data_dir);
        let file = File::open(&path).map_err(|e| DataError::io(&path, e))?;
        let mut npz = NpzReader::new(file)
            .map_err(|e| archive_error(&path, "<archive>", e.to_string()))?;
        let names = npz
            .names()
            .map_err(|e| archive_error(&path, "<archive>", e.to_string()))?;

        let mut archive = Archive {
            npz: &mut npz,
            path: &path,
            names: &names,
        };
        let train = Split::new(archive.features("Xtrn")?, archive.labels("Ytrn")?)?;
        let test = Split::new(archive.features("Xtst")?, archive.labels("Ytst")?)?;
        Dataset::new(train, test)
    }

    fn name(&self) -> &'static str {
        "covost2"
    }
}

/// Open `.npz` archive plus the entry names it contains.
struct Archive<'a> {
    npz: &'a mut NpzReader<File>,
    path: &'a Path,
    names: &'a [String],
}

impl Archive<'_> {
    /// Entry names may or may not carry the `.npy` suffix depending on the writer.
    fn entry(&self, name: &str) -> DataResult<String> {
        self.names
            .iter()
            .find(|n| n.as_str() == name || n.strip_suffix(".npy") == Some(name))
            .cloned()
            .ok_or_else(|| DataError::Archive {
                path: self.path.to_path_buf(),
                name: name.to_string(),
                reason: format!("no such array (found {:?})", self.names),
            })
    }

    /// Features stored as float64 or float32.
    fn features(&mut self, name: &str) -> DataResult<Array2<f64>> {
        let entry = self.entry(name)?;
        let f64_err = match self.npz.by_name::<OwnedRepr<f64>, Ix2>(&entry) {
            Ok(features) => return Ok(features),
            Err(e) => e,
        };
        let f32_err = match self.npz.by_name::<OwnedRepr<f32>, Ix2>(&entry) {
            Ok(features) => return Ok(features.mapv(f64::from)),
            Err(e) => e,
        };
        Err(self.dtype_error(name, &[("float64", f64_err), ("float32", f32_err)]))
    }

    /// Labels stored as int64, int32 or uint8.
    fn labels(&mut self, name: &str) -> DataResult<Array1<i64>> {
        let entry = self.entry(name)?;
        let i64_err = match self.npz.by_name::<OwnedRepr<i64>, Ix1>(&entry) {
            Ok(labels) => return Ok(labels),
            Err(e) => e,
        };
        let i32_err = match self.npz.by_name::<OwnedRepr<i32>, Ix1>(&entry) {
            Ok(labels) => return Ok(labels.mapv(i64::from)),
            Err(e) => e,
        };
        let u8_err = match self.npz.by_name::<OwnedRepr<u8>, Ix1>(&entry) {
            Ok(labels) => return Ok(labels.mapv(i64::from)),
            Err(e) => e,
        };
        Err(self.dtype_error(
            name,
            &[("int64", i64_err), ("int32", i32_err), ("uint8", u8_err)],
        ))
    }

    /// Error naming every dtype attempted and why each read failed.
    fn dtype_error(&self, name: &str, attempts: &[(&str, ReadNpzError)]) -> DataError {
        let tried: Vec<String> = attempts
            .iter()
            .map(|(dtype, err)| format!("as {dtype}: {err}"))
            .collect();
        archive_error(self.path, name, tried.join("; "))
    }
}

fn archive_error(path: &Path, name: &str, reason: impl Into<String>) -> DataError {
    DataError::Archive {
        path: path.to_path_buf(),
        name: name.to_string(),
        reason: reason.into(),
    }
}
