//! Synthetic Firefly catalogs and MaNGA cubes
#![allow(dead_code)]

use std::{fs, io::Write, path::Path};

use flate2::{write::GzEncoder, Compression};

const BLOCK: usize = 2880;

fn pad(mut bytes: Vec<u8>, fill: u8) -> Vec<u8> {
    bytes.resize(bytes.len().div_ceil(BLOCK) * BLOCK, fill);
    bytes
}

fn header(cards: &[String]) -> Vec<u8> {
    let mut out: Vec<u8> = cards
        .iter()
        .chain(std::iter::once(&"END".to_string()))
        .flat_map(|c| format!("{c:<80}").into_bytes())
        .collect();
    out = pad(out, b' ');
    out
}

fn primary() -> Vec<u8> {
    header(&[
        "SIMPLE  =                    T".into(),
        "BITPIX  =                    8".into(),
        "NAXIS   =                    0".into(),
        "EXTEND  =                    T".into(),
    ])
}

/// `f64` image extension, `naxes` fastest axis first
fn image(extname: &str, naxes: &[usize], values: &[f64]) -> Vec<u8> {
    assert_eq!(naxes.iter().product::<usize>(), values.len());
    let mut cards = vec![
        "XTENSION= 'IMAGE   '".to_string(),
        "BITPIX  =                  -64".to_string(),
        format!("NAXIS   = {:>20}", naxes.len()),
    ];
    for (i, n) in naxes.iter().enumerate() {
        cards.push(format!("NAXIS{:<3}= {:>20}", i + 1, n));
    }
    cards.push("PCOUNT  =                    0".into());
    cards.push("GCOUNT  =                    1".into());
    cards.push(format!("EXTNAME = '{extname}'"));
    let mut out = header(&cards);
    out.extend(pad(values.iter().flat_map(|v| v.to_be_bytes()).collect(), 0));
    out
}

fn galaxy_info(plateifus: &[&str]) -> Vec<u8> {
    let cards = [
        "XTENSION= 'BINTABLE'".to_string(),
        "BITPIX  =                    8".to_string(),
        "NAXIS   =                    2".to_string(),
        "NAXIS1  =                   18".to_string(),
        format!("NAXIS2  = {:>20}", plateifus.len()),
        "PCOUNT  =                    0".to_string(),
        "GCOUNT  =                    1".to_string(),
        "TFIELDS =                    2".to_string(),
        "TTYPE1  = 'PLATEIFU'".to_string(),
        "TFORM1  = '10A     '".to_string(),
        "TTYPE2  = 'REDSHIFT'".to_string(),
        "TFORM2  = 'D       '".to_string(),
        "EXTNAME = 'GALAXY_INFO'".to_string(),
    ];
    let mut out = header(&cards);
    let mut data = Vec::new();
    for plateifu in plateifus {
        let mut text = plateifu.as_bytes().to_vec();
        text.resize(10, b' ');
        data.extend(text);
        data.extend(0.03f64.to_be_bytes());
    }
    out.extend(pad(data, 0));
    out
}

/// Galaxy entry: spaxel bin ids (rows x columns) and stellar mass per bin
pub struct Galaxy<'a> {
    pub plateifu: &'a str,
    pub bin_ids: Vec<Vec<i64>>,
    pub mass: Vec<f64>,
}

/// Writes a catalog with the Firefly layout, all galaxies sharing the same map size
pub fn write_catalog(path: &Path, galaxies: &[Galaxy]) {
    let ny = galaxies[0].bin_ids.len();
    let nx = galaxies[0].bin_ids[0].len();
    let n_bins = galaxies.iter().map(|g| g.mass.len()).max().unwrap();
    let mut bin_ids = Vec::new();
    let mut mass = Vec::new();
    for galaxy in galaxies {
        for (y, row) in galaxy.bin_ids.iter().enumerate() {
            assert_eq!(row.len(), nx);
            for (x, &id) in row.iter().enumerate() {
                let (x, y) = (x as f64, y as f64);
                bin_ids.extend([id as f64, x - 0.25, x + 0.25, y - 0.25, y + 0.25, nx as f64]);
            }
        }
        for i in 0..n_bins {
            mass.push(galaxy.mass.get(i).copied().unwrap_or(f64::NAN));
            mass.push(0.1);
        }
    }
    let plateifus: Vec<&str> = galaxies.iter().map(|g| g.plateifu).collect();
    let mut bytes = primary();
    bytes.extend(galaxy_info(&plateifus));
    bytes.extend(image("SPAXEL_BINID", &[6, nx, ny, galaxies.len()], &bin_ids));
    bytes.extend(image("STELLAR_MASS_VORONOI", &[2, n_bins, galaxies.len()], &mass));
    fs::write(path, bytes).unwrap();
}

/// Writes a LOGCUBE file with a `n x n x 3` FLUX extension, gzipped if the path ends with `.gz`
pub fn write_cube(path: &Path, n: usize) {
    let mut bytes = primary();
    bytes.extend(image("FLUX", &[n, n, 3], &vec![1.; n * n * 3]));
    bytes.extend(image("IVAR", &[n, n, 3], &vec![0.5; n * n * 3]));
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    if path.extension().is_some_and(|ext| ext == "gz") {
        let mut gz = GzEncoder::new(fs::File::create(path).unwrap(), Compression::default());
        gz.write_all(&bytes).unwrap();
        gz.finish().unwrap();
    } else {
        fs::write(path, bytes).unwrap();
    }
}
