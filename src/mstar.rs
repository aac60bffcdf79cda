use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::{Error, Result};

/// Bin id of spaxels outside of any Voronoi bin
pub const SENTINEL_BIN: i64 = -99;

/// Maps each spaxel bin id to the stellar mass of its bin
///
/// Spaxels with the [sentinel](SENTINEL_BIN) bin id are set to NaN,
/// any other id that does not address a bin of `mass` is an error.
pub fn mass_grid(bin_ids: ArrayView2<i64>, mass: ArrayView1<f64>) -> Result<Array2<f64>> {
    let mut grid = Array2::from_elem(bin_ids.raw_dim(), f64::NAN);
    for ((row, col), &bin) in bin_ids.indexed_iter() {
        if bin == SENTINEL_BIN {
            continue;
        }
        grid[[row, col]] = usize::try_from(bin)
            .ok()
            .and_then(|i| mass.get(i).copied())
            .ok_or(Error::InvalidBin {
                row,
                col,
                bin,
                n_bins: mass.len(),
            })?;
    }
    Ok(grid)
}
