//! Minimal FITS reader
//!
//! Just enough of the FITS standard to walk the HDUs of a file, read planes of
//! N-dimensional images and character columns of binary tables.

mod error;
mod hdu;
mod header;
mod image;
mod table;

pub use error::FitsError;
pub use hdu::{find_header, Fits, Hdu};
pub use header::{Card, Header, Value};

/// FITS logical record length
pub const BLOCK_SIZE: usize = 2880;

/// Length of a data unit rounded up to a whole number of blocks
pub fn padded_len(len: usize) -> usize {
    len.div_ceil(BLOCK_SIZE) * BLOCK_SIZE
}
