use std::io::{Read, Seek};

use super::{Fits, FitsError, Header, Value};

/// Binary table column layout
#[derive(Debug, Clone, PartialEq)]
struct Column {
    name: String,
    code: char,
    offset: usize,
    width: usize,
}

/// Repeat count, type code and byte width of a `TFORMn` value
fn parse_tform(tform: &str) -> Result<(usize, char, usize), FitsError> {
    let tform = tform.trim();
    let split = tform
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| FitsError::Parse(format!("invalid TFORM `{tform}`")))?;
    let repeat: usize = match &tform[..split] {
        "" => 1,
        digits => digits
            .parse()
            .map_err(|_| FitsError::Parse(format!("invalid TFORM `{tform}`")))?,
    };
    let code = tform[split..].chars().next().unwrap_or(' ').to_ascii_uppercase();
    let width = match code {
        'L' | 'B' | 'A' => repeat,
        'X' => repeat.div_ceil(8),
        'I' => 2 * repeat,
        'J' | 'E' => 4 * repeat,
        'K' | 'D' | 'C' | 'P' => 8 * repeat,
        'M' | 'Q' => 16 * repeat,
        _ => return Err(FitsError::Unsupported(format!("TFORM `{tform}`"))),
    };
    Ok((repeat, code, width))
}

fn columns(header: &Header) -> Result<Vec<Column>, FitsError> {
    let tfields = header.int("TFIELDS")?;
    let mut offset = 0;
    let mut columns = Vec::with_capacity(tfields.max(0) as usize);
    for i in 1..=tfields {
        let tform = header
            .get(&format!("TFORM{i}"))
            .and_then(Value::as_str)
            .ok_or_else(|| FitsError::Parse(format!("missing TFORM{i}")))?;
        let (_, code, width) = parse_tform(tform)?;
        let name = header
            .get(&format!("TTYPE{i}"))
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        columns.push(Column {
            name,
            code,
            offset,
            width,
        });
        offset += width;
    }
    Ok(columns)
}

impl<R: Read + Seek> Fits<R> {
    /// Reads the character column `name` of binary table `extname`, one string per row
    ///
    /// Trailing blanks and NULs are removed, column names match case-insensitively.
    pub fn read_string_column(
        &mut self,
        extname: &str,
        name: &str,
    ) -> Result<Vec<String>, FitsError> {
        let position = self.position(extname)?;
        let header = &self.hdus[position].header;
        if header.xtension().as_deref() != Some("BINTABLE") {
            return Err(FitsError::Unsupported(format!(
                "`{extname}` is not a binary table"
            )));
        }
        let column = columns(header)?
            .into_iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| FitsError::MissingColumn(name.to_string()))?;
        if column.code != 'A' {
            return Err(FitsError::Unsupported(format!(
                "column `{name}` holds `{}` values, not characters",
                column.code
            )));
        }
        let (row_len, n_rows) = match header.naxes()?[..] {
            [row_len, n_rows] => (row_len, n_rows),
            _ => return Err(FitsError::Parse(format!("`{extname}` must have NAXIS = 2"))),
        };
        if column.offset + column.width > row_len {
            return Err(FitsError::Parse(format!(
                "column `{name}` extends past the {row_len} bytes row"
            )));
        }
        let data = self.read_data(position, 0, row_len * n_rows)?;
        Ok(data
            .chunks_exact(row_len.max(1))
            .take(n_rows)
            .map(|row| {
                let cell = &row[column.offset..column.offset + column.width];
                let end = cell
                    .iter()
                    .rposition(|&b| b != b' ' && b != 0)
                    .map_or(0, |i| i + 1);
                String::from_utf8_lossy(&cell[..end]).into_owned()
            })
            .collect())
    }
}
