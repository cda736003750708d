//! Fashion-MNIST image data: loading, rescaling and mean-centering.
//!
//! ## IDX Format
//!
//! Fashion-MNIST ships as four IDX files, usually gzip-compressed:
//! ```text
//! images: [magic 0x00000803][n: u32][rows: u32][cols: u32][pixels: n×rows×cols u8]
//! labels: [magic 0x00000801][n: u32][labels: n u8]
//! ```
//! All header integers are big-endian. Images are flattened row-major into
//! `rows × cols` feature columns with raw intensities in \[0, 255\].
//!
//! ## Normalization
//!
//! [`normalize_image_data`] divides every pixel by `Config::pixel_max`,
//! fits the per-feature mean on the rescaled training set, and subtracts that
//! training mean from both partitions.

use flate2::read::GzDecoder;
use ndarray::{Array1, Array2};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::DatasetLoader;
use crate::core::{DataError, DataResult, Dataset, Split};
use crate::utils::{rescale, FeatureMean};
use crate::Config;

/// Fashion-MNIST image height.
pub const FASHION_HEIGHT: usize = 28;
/// Fashion-MNIST image width.
pub const FASHION_WIDTH: usize = 28;
/// Pixels per flattened image (28 × 28 = 784).
pub const FASHION_PIXELS: usize = FASHION_HEIGHT * FASHION_WIDTH;
/// Number of classes in Fashion-MNIST.
pub const FASHION_NUM_CLASSES: usize = 10;

/// Fashion-MNIST class label names.
pub const FASHION_CLASS_NAMES: [&str; FASHION_NUM_CLASSES] = [
    "T-shirt/top",
    "Trouser",
    "Pullover",
    "Dress",
    "Coat",
    "Sandal",
    "Shirt",
    "Sneaker",
    "Bag",
    "Ankle boot",
];

const IDX_IMAGES_MAGIC: u32 = 0x0000_0803;
const IDX_LABELS_MAGIC: u32 = 0x0000_0801;
const IDX_IMAGES_HEADER: usize = 16;
const IDX_LABELS_HEADER: usize = 8;

/// Rescaled and mean-centered image data.
#[derive(Debug, Clone)]
pub struct NormalizedImages {
    /// Per-feature mean of the rescaled training features.
    pub mean: FeatureMean,
    /// Training split with features in \[0, 1\].
    pub train: Split,
    /// Test split with features in \[0, 1\].
    pub test: Split,
    /// Rescaled training features minus the training mean.
    pub train_centered: Array2<f64>,
    /// Rescaled test features minus the training mean.
    pub test_centered: Array2<f64>,
}

impl NormalizedImages {
    /// Unpack into `(Xmean, Xtrn, Ytrn, Xtst, Ytst, Xtrn_nm, Xtst_nm)`.
    #[must_use]
    #[allow(clippy::type_complexity)]
    pub fn into_parts(
        self,
    ) -> (
        Array1<f64>,
        Array2<f64>,
        Array1<i64>,
        Array2<f64>,
        Array1<i64>,
        Array2<f64>,
        Array2<f64>,
    ) {
        (
            self.mean.mean,
            self.train.features,
            self.train.labels,
            self.test.features,
            self.test.labels,
            self.train_centered,
            self.test_centered,
        )
    }
}

/// Load Fashion-MNIST with the bundled IDX loader and normalize it.
///
/// # Errors
///
/// Returns `DataError` if the IDX files cannot be read or the config is invalid.
pub fn normalize_image_data(config: &Config) -> DataResult<NormalizedImages> {
    normalize_image_data_with(&FashionMnistLoader, config)
}

/// Load images through an arbitrary [`DatasetLoader`] and normalize them.
///
/// Every call reloads the data and refits the mean; nothing is cached.
///
/// # Errors
///
/// - `InvalidConfig` if `pixel_max` is not a positive finite number
/// - `EmptyDataset` if the training split has no rows
/// - whatever the loader returns
pub fn normalize_image_data_with(
    loader: &dyn DatasetLoader,
    config: &Config,
) -> DataResult<NormalizedImages> {
    config.validate()?;

    let Dataset { train, test } = loader.load(&config.data_dir)?;
    info!(
        loader = loader.name(),
        data_dir = %config.data_dir.display(),
        train = train.len(),
        test = test.len(),
        features = train.num_features(),
        "loaded image dataset"
    );

    let train = Split {
        features: rescale(&train.features, config.pixel_max),
        labels: train.labels,
    };
    let test = Split {
        features: rescale(&test.features, config.pixel_max),
        labels: test.labels,
    };

    let mean = FeatureMean::fit(&train.features)?;
    let train_centered = mean.center(&train.features)?;
    let test_centered = mean.center(&test.features)?;
    debug!(
        dim = mean.dim(),
        mean_min = mean.mean.fold(f64::INFINITY, |a, &b| a.min(b)),
        mean_max = mean.mean.fold(f64::NEG_INFINITY, |a, &b| a.max(b)),
        "fitted training mean"
    );

    Ok(NormalizedImages {
        mean,
        train,
        test,
        train_centered,
        test_centered,
    })
}

/// Reads the four Fashion-MNIST IDX files from a directory.
///
/// Each file is looked up as `<name>.gz` first, then as the uncompressed `<name>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FashionMnistLoader;

impl FashionMnistLoader {
    fn load_kind(data_dir: &Path, kind: &str) -> DataResult<Split> {
        let images = read_idx_images(&data_dir.join(format!("{kind}-images-idx3-ubyte")))?;
        let labels = read_idx_labels(&data_dir.join(format!("{kind}-labels-idx1-ubyte")))?;
        Split::new(images, labels)
    }
}

impl DatasetLoader for FashionMnistLoader {
    fn load(&self, data_dir: &Path) -> DataResult<Dataset> {
        let train = Self::load_kind(data_dir, "train")?;
        let test = Self::load_kind(data_dir, "t10k")?;
        Dataset::new(train, test)
    }

    fn name(&self) -> &'static str {
        "fashion-mnist"
    }
}

/// Read an IDX file, preferring the gzip-compressed `<path>.gz` variant.
fn read_idx_file(path: &Path) -> DataResult<(PathBuf, Vec<u8>)> {
    let gz_path = PathBuf::from(format!("{}.gz", path.display()));
    if gz_path.exists() {
        let file = File::open(&gz_path).map_err(|e| DataError::io(&gz_path, e))?;
        let mut bytes = Vec::new();
        GzDecoder::new(file)
            .read_to_end(&mut bytes)
            .map_err(|e| DataError::io(&gz_path, e))?;
        return Ok((gz_path, bytes));
    }
    let bytes = fs::read(path).map_err(|e| DataError::io(path, e))?;
    Ok((path.to_path_buf(), bytes))
}

fn read_be_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn check_header(path: &Path, bytes: &[u8], header_len: usize, magic: u32) -> DataResult<()> {
    if bytes.len() < header_len {
        return Err(DataError::InvalidIdx {
            path: path.to_path_buf(),
            reason: format!("{} bytes is shorter than the {header_len}-byte header", bytes.len()),
        });
    }
    let found = read_be_u32(bytes, 0);
    if found != magic {
        return Err(DataError::InvalidIdx {
            path: path.to_path_buf(),
            reason: format!("magic number 0x{found:08x}, expected 0x{magic:08x}"),
        });
    }
    Ok(())
}

fn check_payload(path: &Path, payload: &[u8], expected: usize) -> DataResult<()> {
    if payload.len() != expected {
        return Err(DataError::InvalidIdx {
            path: path.to_path_buf(),
            reason: format!("payload is {} bytes, header declares {expected}", payload.len()),
        });
    }
    Ok(())
}

/// Parse IDX image bytes into a `(n, rows × cols)` matrix of raw intensities.
pub fn parse_idx_images(path: &Path, bytes: &[u8]) -> DataResult<Array2<f64>> {
    check_header(path, bytes, IDX_IMAGES_HEADER, IDX_IMAGES_MAGIC)?;
    let num_images = read_be_u32(bytes, 4) as usize;
    let rows = read_be_u32(bytes, 8) as usize;
    let cols = read_be_u32(bytes, 12) as usize;
    let (image_dim, total) = rows
        .checked_mul(cols)
        .and_then(|dim| num_images.checked_mul(dim).map(|total| (dim, total)))
        .ok_or_else(|| DataError::InvalidIdx {
            path: path.to_path_buf(),
            reason: format!("declared size overflows ({num_images} × {rows} × {cols})"),
        })?;

    let payload = &bytes[IDX_IMAGES_HEADER..];
    check_payload(path, payload, total)?;

    let pixels: Vec<f64> = payload.iter().map(|&p| f64::from(p)).collect();
    Array2::from_shape_vec((num_images, image_dim), pixels).map_err(|e| DataError::InvalidIdx {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Parse IDX label bytes into class identifiers.
pub fn parse_idx_labels(path: &Path, bytes: &[u8]) -> DataResult<Array1<i64>> {
    check_header(path, bytes, IDX_LABELS_HEADER, IDX_LABELS_MAGIC)?;
    let num_labels = read_be_u32(bytes, 4) as usize;
    let payload = &bytes[IDX_LABELS_HEADER..];
    check_payload(path, payload, num_labels)?;
    Ok(payload.iter().map(|&l| i64::from(l)).collect())
}

fn read_idx_images(path: &Path) -> DataResult<Array2<f64>> {
    let (source, bytes) = read_idx_file(path)?;
    let images = parse_idx_images(&source, &bytes)?;
    debug!(path = %source.display(), shape = ?images.dim(), "read IDX images");
    Ok(images)
}

fn read_idx_labels(path: &Path) -> DataResult<Array1<i64>> {
    let (source, bytes) = read_idx_file(path)?;
    let labels = parse_idx_labels(&source, &bytes)?;
    debug!(path = %source.display(), count = labels.len(), "read IDX labels");
    Ok(labels)
}
