//! Spatial size of the MaNGA data cube of a galaxy
//!
//! The stellar mass maps are trimmed to the size of the DRP data cubes.
//! The cube is looked up in a local copy of the SAS tree:
//! `<redux>/<drpver>/<plate>/stack/manga-<plateifu>-LOGCUBE.fits.gz`

use std::{
    env,
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use flate2::read::GzDecoder;

use crate::{fits, Error, PlateIfu, Result};

/// DRP version paired with the Firefly v2_1_2 catalog
pub const DEFAULT_DRPVER: &str = "v2_3_1";

/// Something that knows the spatial size of a galaxy data product
pub trait ReferenceDimension {
    fn dimension(&self, plateifu: &PlateIfu) -> Result<usize>;
}

/// Known size, no lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedDimension(pub usize);
impl ReferenceDimension for FixedDimension {
    fn dimension(&self, _plateifu: &PlateIfu) -> Result<usize> {
        Ok(self.0)
    }
}

/// Where the cubes are looked up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessMode {
    /// Local files only
    #[default]
    Local,
    /// Remote data service
    Remote,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CubeConfig {
    pub mode: AccessMode,
    pub redux_dir: Option<PathBuf>,
    pub drpver: String,
}
impl Default for CubeConfig {
    /// `MANGA_SPECTRO_REDUX`, or `$SAS_BASE_DIR/mangawork/manga/spectro/redux`
    fn default() -> Self {
        let redux_dir = env::var_os("MANGA_SPECTRO_REDUX")
            .map(PathBuf::from)
            .or_else(|| {
                env::var_os("SAS_BASE_DIR")
                    .map(|sas| Path::new(&sas).join("mangawork/manga/spectro/redux"))
            });
        Self {
            mode: AccessMode::Local,
            redux_dir,
            drpver: String::from(DEFAULT_DRPVER),
        }
    }
}
impl CubeConfig {
    pub fn mode(self, mode: AccessMode) -> Self {
        Self { mode, ..self }
    }
    pub fn redux_dir<P: Into<PathBuf>>(self, redux_dir: P) -> Self {
        Self {
            redux_dir: Some(redux_dir.into()),
            ..self
        }
    }
    pub fn drpver<S: Into<String>>(self, drpver: S) -> Self {
        Self {
            drpver: drpver.into(),
            ..self
        }
    }
}

/// Reads `NAXIS1` of the `FLUX` extension of the local LOGCUBE file
#[derive(Debug, Clone, Default)]
pub struct LocalCube {
    config: CubeConfig,
}
impl LocalCube {
    pub fn new(config: CubeConfig) -> Self {
        Self { config }
    }
    /// Path of the gzipped cube of `plateifu`
    pub fn path(&self, plateifu: &PlateIfu) -> Result<PathBuf> {
        let redux = self.config.redux_dir.as_ref().ok_or_else(|| {
            Error::ExternalService(
                "no local cube directory, set MANGA_SPECTRO_REDUX or SAS_BASE_DIR".into(),
                None,
            )
        })?;
        Ok(redux
            .join(&self.config.drpver)
            .join(plateifu.plate())
            .join("stack")
            .join(format!("manga-{plateifu}-LOGCUBE.fits.gz")))
    }
    fn flux_header(&self, plateifu: &PlateIfu) -> Result<fits::Header> {
        let gz_path = self.path(plateifu)?;
        let header = if gz_path.is_file() {
            log::info!("Reading cube header from {:?}", gz_path);
            let file = File::open(&gz_path)
                .map_err(|e| Error::external(format!("cannot open {gz_path:?}"), e))?;
            find_flux(GzDecoder::new(BufReader::new(file)), &gz_path)?
        } else {
            let path = gz_path.with_extension("");
            log::warn!("{:?} not found, trying {:?}", gz_path, path);
            let file = File::open(&path).map_err(|e| {
                Error::external(format!("no cube for {plateifu} at {gz_path:?}"), e)
            })?;
            find_flux(BufReader::new(file), &path)?
        };
        Ok(header)
    }
}
impl ReferenceDimension for LocalCube {
    fn dimension(&self, plateifu: &PlateIfu) -> Result<usize> {
        if self.config.mode == AccessMode::Remote {
            return Err(Error::ExternalService(
                "remote cube access is not available, use the local mode".into(),
                None,
            ));
        }
        let header = self.flux_header(plateifu)?;
        let naxis1 = header
            .get("NAXIS1")
            .and_then(fits::Value::as_int)
            .ok_or_else(|| {
                Error::ExternalService("cube header has no integer NAXIS1".into(), None)
            })?;
        let naxis1 = usize::try_from(naxis1)
            .map_err(|e| Error::external(format!("invalid cube NAXIS1 = {naxis1}"), e))?;
        log::debug!("{plateifu} cube is {naxis1} pixels wide");
        Ok(naxis1)
    }
}

fn find_flux<R: Read>(mut reader: R, path: &Path) -> Result<fits::Header> {
    fits::find_header(&mut reader, "FLUX")
        .map_err(|e| Error::external(format!("cannot read the FLUX header of {path:?}"), e))
}
