use std::io::{Read, Seek};

use ndarray::{ArrayD, IxDyn};

use super::{Fits, FitsError, Header, Value};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Pixel {
    U8,
    I16,
    I32,
    I64,
    F32,
    F64,
}
impl Pixel {
    fn from_bitpix(bitpix: i64) -> Result<Self, FitsError> {
        Ok(match bitpix {
            8 => Pixel::U8,
            16 => Pixel::I16,
            32 => Pixel::I32,
            64 => Pixel::I64,
            -32 => Pixel::F32,
            -64 => Pixel::F64,
            _ => return Err(FitsError::Parse(format!("invalid BITPIX = {bitpix}"))),
        })
    }
    fn size(self) -> usize {
        match self {
            Pixel::U8 => 1,
            Pixel::I16 => 2,
            Pixel::I32 | Pixel::F32 => 4,
            Pixel::I64 | Pixel::F64 => 8,
        }
    }
    /// Big-endian bytes to `f64`, `bytes` is exactly `size()` long
    fn decode(self, bytes: &[u8]) -> f64 {
        match self {
            Pixel::U8 => bytes[0] as f64,
            Pixel::I16 => i16::from_be_bytes(array(bytes)) as f64,
            Pixel::I32 => i32::from_be_bytes(array(bytes)) as f64,
            Pixel::I64 => i64::from_be_bytes(array(bytes)) as f64,
            Pixel::F32 => f32::from_be_bytes(array(bytes)) as f64,
            Pixel::F64 => f64::from_be_bytes(array(bytes)),
        }
    }
}

fn array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut a = [0u8; N];
    a.copy_from_slice(bytes);
    a
}

fn scaling(header: &Header) -> (f64, f64) {
    let get = |key, default| header.get(key).and_then(Value::as_float).unwrap_or(default);
    (get("BSCALE", 1.), get("BZERO", 0.))
}

impl<R: Read + Seek> Fits<R> {
    /// Reads the sub-array at `index` along the slowest varying axis of image `extname`
    ///
    /// For an image with `NAXIS = n` the returned array has `n - 1` dimensions
    /// in row-major order: `[NAXIS(n-1), ..., NAXIS1]`.
    /// BSCALE and BZERO are applied.
    pub fn read_image_plane(
        &mut self,
        extname: &str,
        index: usize,
    ) -> Result<ArrayD<f64>, FitsError> {
        let position = self.position(extname)?;
        let header = &self.hdus[position].header;
        if let Some(xtension) = header.xtension().filter(|x| x != "IMAGE") {
            return Err(FitsError::Unsupported(format!(
                "`{extname}` is a {xtension} extension, not an image"
            )));
        }
        let pixel = Pixel::from_bitpix(header.bitpix()?)?;
        let naxes = header.naxes()?;
        let (bscale, bzero) = scaling(header);
        let Some((&outer, inner)) = naxes.split_last() else {
            return Err(FitsError::Parse(format!("`{extname}` has no data")));
        };
        if index >= outer {
            return Err(FitsError::OutOfBounds { index, len: outer });
        }
        let plane_len: usize = inner.iter().product();
        let nbytes = plane_len * pixel.size();
        let buf = self.read_data(position, index * nbytes, nbytes)?;
        let values: Vec<f64> = buf
            .chunks_exact(pixel.size())
            .map(|b| pixel.decode(b) * bscale + bzero)
            .collect();
        let shape: Vec<usize> = inner.iter().rev().copied().collect();
        ArrayD::from_shape_vec(IxDyn(&shape), values)
            .map_err(|e| FitsError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fits::fixtures::{header_bytes, image_f32, pad_data, primary, string_table};
    use std::io::Cursor;

    #[test]
    fn reads_one_plane_of_a_cube() {
        // 2 planes of 3 rows x 2 columns, value = 100 * plane + 10 * row + col
        let values: Vec<f32> = (0..2)
            .flat_map(|p| {
                (0..3).flat_map(move |r| (0..2).map(move |c| (100 * p + 10 * r + c) as f32))
            })
            .collect();
        let mut bytes = primary();
        bytes.extend(image_f32("CUBE", &[2, 3, 2], &values));
        let mut fits = Fits::from_reader(Cursor::new(bytes)).unwrap();
        let plane = fits.read_image_plane("CUBE", 1).unwrap();
        assert_eq!(plane.shape(), &[3, 2]);
        assert_eq!(plane[[0, 0]], 100.);
        assert_eq!(plane[[2, 1]], 121.);
        assert!(matches!(
            fits.read_image_plane("CUBE", 2),
            Err(FitsError::OutOfBounds { index: 2, len: 2 })
        ));
    }

    #[test]
    fn applies_scaling_to_integers() {
        let mut bytes = primary();
        bytes.extend(header_bytes(&[
            "XTENSION= 'IMAGE   '",
            "BITPIX  =                   16",
            "NAXIS   =                    2",
            "NAXIS1  =                    2",
            "NAXIS2  =                    1",
            "BSCALE  =                  0.5",
            "BZERO   =                   10",
            "EXTNAME = 'SCALED  '",
        ]));
        let data: Vec<u8> = [-4i16, 6].iter().flat_map(|v| v.to_be_bytes()).collect();
        bytes.extend(pad_data(data));
        let mut fits = Fits::from_reader(Cursor::new(bytes)).unwrap();
        let plane = fits.read_image_plane("SCALED", 0).unwrap();
        assert_eq!(plane.as_slice().unwrap(), &[8., 13.]);
    }

    #[test]
    fn refuses_tables() {
        let mut bytes = primary();
        bytes.extend(string_table("GALAXY_INFO", "PLATEIFU", 10, &["8485-1901"]));
        let mut fits = Fits::from_reader(Cursor::new(bytes)).unwrap();
        assert!(matches!(
            fits.read_image_plane("GALAXY_INFO", 0),
            Err(FitsError::Unsupported(_))
        ));
    }
}
