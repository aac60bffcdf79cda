#[derive(thiserror::Error, Debug)]
pub enum FitsError {
    #[error("FITS read error")]
    Io(#[from] std::io::Error),
    #[error("FITS parse error: {0}")]
    Parse(String),
    #[error("unsupported FITS feature: {0}")]
    Unsupported(String),
    #[error("missing FITS extension `{0}`")]
    MissingExtension(String),
    #[error("missing binary table column `{0}`")]
    MissingColumn(String),
    #[error("index {index} is out of bounds for an axis of length {len}")]
    OutOfBounds { index: usize, len: usize },
}
