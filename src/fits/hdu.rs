use std::{
    fs::File,
    io::{self, BufReader, Read, Seek, SeekFrom},
    path::Path,
};

use super::{padded_len, FitsError, Header, Value};

/// Header data unit: the parsed header and where its data lives
#[derive(Debug, Clone)]
pub struct Hdu {
    pub header: Header,
    pub data_start: u64,
    pub data_len: usize,
}

/// FITS file opened for random access
///
/// All the headers are parsed on opening, data is read on demand.
#[derive(Debug)]
pub struct Fits<R> {
    pub(super) reader: R,
    pub(super) hdus: Vec<Hdu>,
}
impl Fits<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FitsError> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }
}
impl<R: Read + Seek> Fits<R> {
    pub fn from_reader(mut reader: R) -> Result<Self, FitsError> {
        let file_len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;
        let mut hdus = Vec::new();
        while let Some(header) = Header::read_from(&mut reader)? {
            if hdus.is_empty() && header.get("SIMPLE").and_then(Value::as_bool) != Some(true) {
                return Err(FitsError::Parse("not a FITS file: missing SIMPLE = T".into()));
            }
            let data_start = reader.stream_position()?;
            let data_len = header.data_len()?;
            if data_start + data_len as u64 > file_len {
                return Err(FitsError::Parse(format!(
                    "HDU #{} data unit of {data_len} bytes runs past the end of the file",
                    hdus.len()
                )));
            }
            let skip = i64::try_from(padded_len(data_len))
                .map_err(|_| FitsError::Parse(format!("data unit of {data_len} bytes")))?;
            reader.seek(SeekFrom::Current(skip))?;
            hdus.push(Hdu {
                header,
                data_start,
                data_len,
            });
        }
        if hdus.is_empty() {
            return Err(FitsError::Parse("empty FITS file".into()));
        }
        log::debug!("found {} HDUs", hdus.len());
        Ok(Self { reader, hdus })
    }
    pub fn hdus(&self) -> &[Hdu] {
        &self.hdus
    }
    /// Index of the extension named `extname`
    pub fn position(&self, extname: &str) -> Result<usize, FitsError> {
        self.hdus
            .iter()
            .position(|hdu| hdu.header.is_named(extname))
            .ok_or_else(|| FitsError::MissingExtension(extname.to_string()))
    }
    pub fn hdu(&self, extname: &str) -> Result<&Hdu, FitsError> {
        self.position(extname).map(|i| &self.hdus[i])
    }
    /// Reads `len` bytes of the data unit of HDU `#index`, starting `offset` bytes in
    pub(super) fn read_data(
        &mut self,
        index: usize,
        offset: usize,
        len: usize,
    ) -> Result<Vec<u8>, FitsError> {
        let hdu = &self.hdus[index];
        if offset.checked_add(len).is_none_or(|end| end > hdu.data_len) {
            return Err(FitsError::Parse(format!(
                "read of {len} bytes at {offset} overruns a data unit of {} bytes",
                hdu.data_len
            )));
        }
        self.reader
            .seek(SeekFrom::Start(hdu.data_start + offset as u64))?;
        let mut buf = vec![0u8; len];
        self.reader.read_exact(&mut buf)?;
        Ok(buf)
    }
    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Walks the HDUs of a sequential stream until the extension `extname`
///
/// Data units are skipped by reading through them, so any `Read` works,
/// including a gzip decoder.
pub fn find_header<R: Read>(reader: &mut R, extname: &str) -> Result<Header, FitsError> {
    while let Some(header) = Header::read_from(reader)? {
        if header.is_named(extname) {
            return Ok(header);
        }
        let skip = padded_len(header.data_len()?) as u64;
        let skipped = io::copy(&mut reader.by_ref().take(skip), &mut io::sink())?;
        if skipped < skip {
            return Err(FitsError::Io(io::ErrorKind::UnexpectedEof.into()));
        }
    }
    Err(FitsError::MissingExtension(extname.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fits::fixtures::{image_f32, primary, string_table};
    use std::io::Cursor;

    fn sample() -> Vec<u8> {
        let mut bytes = primary();
        bytes.extend(string_table("GALAXY_INFO", "PLATEIFU", 10, &["8485-1901"]));
        bytes.extend(image_f32("FLUX", &[2, 3], &[0.; 6]));
        bytes
    }

    #[test]
    fn scans_every_hdu() {
        let fits = Fits::from_reader(Cursor::new(sample())).unwrap();
        assert_eq!(fits.hdus().len(), 3);
        assert_eq!(fits.position("galaxy_info").unwrap(), 1);
        let flux = fits.hdu("FLUX").unwrap();
        assert_eq!(flux.data_len, 24);
        assert_eq!(flux.data_start % 2880, 0);
    }

    #[test]
    fn missing_extension() {
        let fits = Fits::from_reader(Cursor::new(sample())).unwrap();
        assert!(matches!(
            fits.position("STELLAR_MASS_VORONOI"),
            Err(FitsError::MissingExtension(_))
        ));
    }

    #[test]
    fn rejects_non_fits() {
        let bytes = crate::fits::fixtures::header_bytes(&["XTENSION= 'IMAGE   '"]);
        assert!(Fits::from_reader(Cursor::new(bytes)).is_err());
        assert!(Fits::from_reader(Cursor::new(Vec::new())).is_err());
    }

    #[test]
    fn malformed_data_sizes_are_errors() {
        let extension = |naxis1: &str, pcount: &str| {
            let mut bytes = primary();
            bytes.extend(crate::fits::fixtures::header_bytes(&[
                "XTENSION= 'BINTABLE'",
                "BITPIX  =                    8",
                "NAXIS   =                    2",
                naxis1,
                "NAXIS2  =                    4",
                pcount,
                "EXTNAME = 'BROKEN  '",
            ]));
            bytes.extend(vec![0u8; 2880]);
            bytes
        };
        for (naxis1, pcount) in [
            ("NAXIS1  =                   10", "PCOUNT  =                   -1"),
            ("NAXIS1  =  9223372036854775807", "PCOUNT  =                    0"),
            // 4 MB claimed, one block present
            ("NAXIS1  =              1000000", "PCOUNT  =                    0"),
        ] {
            let bytes = extension(naxis1, pcount);
            assert!(
                matches!(Fits::from_reader(Cursor::new(bytes)), Err(FitsError::Parse(_))),
                "{naxis1} {pcount} should be rejected"
            );
            let mut stream = Cursor::new(extension(naxis1, pcount));
            assert!(find_header(&mut stream, "FLUX").is_err());
        }
        let fits = Fits::from_reader(Cursor::new(extension(
            "NAXIS1  =                   10",
            "PCOUNT  =                   16",
        )))
        .unwrap();
        assert_eq!(fits.hdu("BROKEN").unwrap().data_len, 56);
    }

    #[test]
    fn finds_header_in_a_stream() {
        let mut stream = io::Cursor::new(sample()).chain(io::empty());
        let header = find_header(&mut stream, "FLUX").unwrap();
        assert_eq!(header.int("NAXIS1").unwrap(), 2);
        let mut stream = Cursor::new(sample());
        assert!(matches!(
            find_header(&mut stream, "IVAR"),
            Err(FitsError::MissingExtension(_))
        ));
    }
}
