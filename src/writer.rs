use std::{
    fs,
    path::{Path, PathBuf},
};

use ndarray::{s, Array2, ArrayView2};

use crate::{Error, PlateIfu, Result};

/// Token written for spaxels without a stellar mass
pub const MISSING: &str = "nan";

/// Top-left `n x n` corner of `grid`
pub fn crop(grid: ArrayView2<f64>, n: usize) -> Result<Array2<f64>> {
    let (rows, cols) = grid.dim();
    if n > rows || n > cols {
        return Err(Error::ShapeMismatch {
            requested: n,
            rows,
            cols,
        });
    }
    Ok(grid.slice(s![..n, ..n]).to_owned())
}

/// `<data_dir>/manga-<plateifu>_mstar.csv`
pub fn output_path<P: AsRef<Path>>(data_dir: P, plateifu: &PlateIfu) -> PathBuf {
    data_dir
        .as_ref()
        .join(format!("manga-{plateifu}_mstar.csv"))
}

/// Shortest text that parses back to `value`, integral values keep a `.0`
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        MISSING.to_string()
    } else {
        format!("{value:?}")
    }
}

/// Writes `grid` as headerless CSV, one grid row per line
///
/// The file is written next to `path` and renamed over it once complete.
pub fn write_csv<P: AsRef<Path>>(grid: ArrayView2<f64>, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    let write_error = |source: std::io::Error| Error::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Err(e) = write_rows(grid, &tmp) {
        let _ = fs::remove_file(&tmp);
        return Err(write_error(e));
    }
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        write_error(e)
    })?;
    log::debug!("wrote {:?} rows to {:?}", grid.nrows(), path);
    Ok(())
}

fn write_rows(grid: ArrayView2<f64>, path: &Path) -> std::io::Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(std::io::Error::from)?;
    for row in grid.rows() {
        wtr.write_record(row.iter().map(|&v| format_value(v)))
            .map_err(std::io::Error::from)?;
    }
    wtr.flush()
}
