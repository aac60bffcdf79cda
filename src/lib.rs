//! # Spaxel stellar masses of MaNGA galaxies
//!
//! Extracts the spaxel stellar mass map of a single galaxy from the Firefly
//! stellar population catalog of Goddard et al. (2017) and writes it to CSV,
//! trimmed to the spatial size of the galaxy DRP data cube.
//!
//! ```no_run
//! use spaxel_mstar::{CubeConfig, LocalCube, MstarExtractor, PlateIfu};
//!
//! # fn main() -> Result<(), spaxel_mstar::Error> {
//! let plateifu: PlateIfu = "8485-1901".parse()?;
//! let cube = LocalCube::new(CubeConfig::default());
//! let path = MstarExtractor::default()
//!     .data_path("../data")
//!     .extract(&plateifu, &cube)?;
//! println!("Wrote: {path:?}");
//! # Ok(())
//! # }
//! ```

use std::{
    env,
    path::{Path, PathBuf},
    time::Instant,
};

use ndarray::Array2;

pub mod catalog;
pub mod cube;
mod error;
pub mod fits;
pub mod mstar;
mod plateifu;
pub mod writer;

pub use catalog::{Catalog, CatalogLayout};
pub use cube::{AccessMode, CubeConfig, FixedDimension, LocalCube, ReferenceDimension};
pub use error::{Error, Result};
pub use fits::FitsError;
pub use plateifu::PlateIfu;

/// Firefly stellar population catalog file name
pub const FIREFLY_CATALOG: &str = "manga_firefly-v2_1_2-STELLARPOP.fits";

/// Stellar mass map extraction
pub struct MstarExtractor {
    data_path: PathBuf,
    catalog_file: String,
    layout: CatalogLayout,
}
impl Default for MstarExtractor {
    /// Data in the `data` directory next to the current one
    fn default() -> Self {
        let data_path = env::current_dir()
            .ok()
            .and_then(|cwd| cwd.parent().map(|repo| repo.join("data")))
            .unwrap_or_else(|| PathBuf::from("../data"));
        Self {
            data_path,
            catalog_file: String::from(FIREFLY_CATALOG),
            layout: CatalogLayout::default(),
        }
    }
}
impl MstarExtractor {
    /// Directory with the catalog, where the CSV files are written
    pub fn data_path<P: AsRef<Path>>(self, data_path: P) -> Self {
        Self {
            data_path: data_path.as_ref().to_path_buf(),
            ..self
        }
    }
    pub fn catalog_file<S: Into<String>>(self, catalog_file: S) -> Self {
        Self {
            catalog_file: catalog_file.into(),
            ..self
        }
    }
    pub fn layout(self, layout: CatalogLayout) -> Self {
        Self { layout, ..self }
    }
    pub fn catalog_path(&self) -> PathBuf {
        self.data_path.join(&self.catalog_file)
    }
    pub fn output_path(&self, plateifu: &PlateIfu) -> PathBuf {
        writer::output_path(&self.data_path, plateifu)
    }
    /// Stellar mass of each spaxel of `plateifu`, NaN outside the Voronoi bins
    pub fn mass_map(&self, plateifu: &PlateIfu) -> Result<Array2<f64>> {
        let mut catalog = Catalog::open_with(self.catalog_path(), self.layout.clone())?;
        let index = catalog.galaxy_index(plateifu)?;
        log::info!("{plateifu} is galaxy #{index}");
        let bin_ids = catalog.bin_ids(index)?;
        let mass = catalog.stellar_mass(index)?;
        catalog.close();
        let grid = mstar::mass_grid(bin_ids.view(), mass.view())?;
        log::debug!("mass map: {:?}", grid.dim());
        Ok(grid)
    }
    /// Writes the mass map of `plateifu`, cropped to the `cube` size, and returns the CSV path
    pub fn extract(&self, plateifu: &PlateIfu, cube: &dyn ReferenceDimension) -> Result<PathBuf> {
        let now = Instant::now();
        let grid = self.mass_map(plateifu)?;
        let n = cube.dimension(plateifu)?;
        let cropped = writer::crop(grid.view(), n)?;
        let path = self.output_path(plateifu);
        writer::write_csv(cropped.view(), &path)?;
        log::info!(
            "{plateifu} {n}x{n} mass map written in {:}ms",
            now.elapsed().as_millis()
        );
        Ok(path)
    }
}
