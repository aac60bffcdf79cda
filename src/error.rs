use std::path::PathBuf;

use crate::fits::FitsError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to access {path:?}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: FitsError,
    },
    #[error("galaxy {0} is not in the catalog")]
    NotFound(String),
    #[error("reference cube lookup failed: {0}")]
    ExternalService(String, #[source] Option<Box<dyn std::error::Error + Send + Sync>>),
    #[error("cannot crop a {rows}x{cols} grid to {requested}x{requested}")]
    ShapeMismatch {
        requested: usize,
        rows: usize,
        cols: usize,
    },
    #[error("bin id {bin} at row {row}, column {col} is not one of the {n_bins} catalog bins")]
    InvalidBin {
        row: usize,
        col: usize,
        bin: i64,
        n_bins: usize,
    },
    #[error("bin id {value} at row {row}, column {col} is not a number")]
    NonFiniteBin { row: usize, col: usize, value: f64 },
    #[error("`{0}` is not a plate-ifu designation (expected e.g. 8485-1901)")]
    InvalidPlateIfu(String),
    #[error("failed to write {path:?}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read the catalog")]
    Fits(#[from] FitsError),
}
impl Error {
    pub(crate) fn external<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error::ExternalService(message.into(), Some(source.into()))
    }
}
pub type Result<T> = std::result::Result<T, Error>;
