//! Firefly stellar population catalog
//!
//! The `manga_firefly-<version>-STELLARPOP.fits` file gathers, for every MaNGA
//! galaxy, the Voronoi bin of each spaxel and the stellar mass of each bin:
//!  - `GALAXY_INFO`: binary table, one row per galaxy, `PLATEIFU` column
//!  - `SPAXEL_BINID`: image, galaxy x row x column x (binid, xmin, xmax, ymin, ymax, image size)
//!  - `STELLAR_MASS_VORONOI`: image, galaxy x bin x (mass, mass error) in log10 solar masses

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    time::Instant,
};

use ndarray::{s, Array1, Array2, ArrayView2, Ix2, Ix3};

use crate::{fits::Fits, Error, FitsError, PlateIfu, Result};

/// Names of the catalog extensions
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogLayout {
    pub galaxy_info: String,
    pub plateifu_column: String,
    pub spaxel_binid: String,
    pub stellar_mass: String,
}
impl Default for CatalogLayout {
    fn default() -> Self {
        Self {
            galaxy_info: String::from("GALAXY_INFO"),
            plateifu_column: String::from("PLATEIFU"),
            spaxel_binid: String::from("SPAXEL_BINID"),
            stellar_mass: String::from("STELLAR_MASS_VORONOI"),
        }
    }
}

/// Catalog opened read-only
///
/// The file is released when the catalog is dropped or [closed](Catalog::close).
#[derive(Debug)]
pub struct Catalog {
    path: PathBuf,
    fits: Fits<BufReader<File>>,
    layout: CatalogLayout,
    plateifus: Vec<String>,
}
impl Catalog {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, CatalogLayout::default())
    }
    pub fn open_with<P: AsRef<Path>>(path: P, layout: CatalogLayout) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        log::info!("Loading {:?}...", path);
        let now = Instant::now();
        let access = |source: FitsError| Error::FileAccess {
            path: path.clone(),
            source,
        };
        let mut fits = Fits::open(&path).map_err(access)?;
        for extname in [&layout.spaxel_binid, &layout.stellar_mass] {
            fits.position(extname).map_err(access)?;
        }
        let plateifus = fits
            .read_string_column(&layout.galaxy_info, &layout.plateifu_column)
            .map_err(access)?;
        log::info!(
            "... loaded {} galaxies in {:}ms",
            plateifus.len(),
            now.elapsed().as_millis()
        );
        Ok(Self {
            path,
            fits,
            layout,
            plateifus,
        })
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
    /// Galaxy designations, in catalog row order
    pub fn plateifus(&self) -> &[String] {
        &self.plateifus
    }
    /// Row of the first galaxy whose designation is exactly `plateifu`
    pub fn galaxy_index(&self, plateifu: &PlateIfu) -> Result<usize> {
        self.plateifus
            .iter()
            .position(|p| p == plateifu.as_str())
            .ok_or_else(|| Error::NotFound(plateifu.to_string()))
    }
    /// Bin id of each spaxel of galaxy `#index`, truncated toward zero
    pub fn bin_ids(&mut self, index: usize) -> Result<Array2<i64>> {
        let page = self
            .fits
            .read_image_plane(&self.layout.spaxel_binid, index)?
            .into_dimensionality::<Ix3>()
            .map_err(|e| shape_error(&self.layout.spaxel_binid, e))?;
        log::debug!("spaxel bin ids page: {:?}", page.shape());
        truncate_bin_ids(page.slice(s![.., .., 0]))
    }
    /// Stellar mass of each Voronoi bin of galaxy `#index`
    pub fn stellar_mass(&mut self, index: usize) -> Result<Array1<f64>> {
        let page = self
            .fits
            .read_image_plane(&self.layout.stellar_mass, index)?
            .into_dimensionality::<Ix2>()
            .map_err(|e| shape_error(&self.layout.stellar_mass, e))?;
        log::debug!("stellar mass page: {:?}", page.shape());
        Ok(page.column(0).to_owned())
    }
    pub fn close(self) {
        log::debug!("closing {:?}", self.path);
    }
}

fn shape_error(extname: &str, e: ndarray::ShapeError) -> Error {
    FitsError::Parse(format!("unexpected `{extname}` dimensions: {e}")).into()
}

/// Bin ids truncated toward zero, NaN and infinite ids are errors
fn truncate_bin_ids(ids: ArrayView2<f64>) -> Result<Array2<i64>> {
    if let Some(((row, col), &value)) = ids.indexed_iter().find(|(_, id)| !id.is_finite()) {
        return Err(Error::NonFiniteBin { row, col, value });
    }
    Ok(ids.mapv(|id| id as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn bin_ids_truncate_toward_zero() {
        let ids = array![[0.9, -99.], [1., 2.5]];
        assert_eq!(truncate_bin_ids(ids.view()).unwrap(), array![[0, -99], [1, 2]]);
    }

    #[test]
    fn non_finite_bin_ids_are_errors() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let ids = array![[0., 1.], [value, 0.]];
            match truncate_bin_ids(ids.view()) {
                Err(Error::NonFiniteBin { row: 1, col: 0, .. }) => (),
                other => panic!("expected a non-finite bin error, got {other:?}"),
            }
        }
    }
}
