use std::io::{self, Read};

use super::{FitsError, BLOCK_SIZE};

const CARD_SIZE: usize = 80;

/// FITS header card value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Logical(bool),
    Str(String),
    Empty,
}
impl Value {
    /// Integer value, also accepting integral floats and numeric strings
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            // `i64::MAX as f64` rounds up to 2^63
            Value::Float(v) if v.fract() == 0. && (i64::MIN as f64..i64::MAX as f64).contains(v) => {
                Some(*v as i64)
            }
            Value::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Logical(b) => Some(*b),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub keyword: String,
    pub value: Value,
    pub comment: Option<String>,
}
impl Card {
    /// Parses one 80 column card image
    pub fn parse(card: &str) -> Self {
        let keyword = card.get(..8).unwrap_or(card).trim_end().to_string();
        if keyword == "HIERARCH" {
            if let Some((key, rest)) = card[8..].split_once('=') {
                let (value, comment) = split_value(rest);
                return Self {
                    keyword: key.trim().to_string(),
                    value,
                    comment,
                };
            }
        }
        let field = match card.get(8..10) {
            Some("= ") => card.get(10..),
            _ if keyword == "CONTINUE" => card.get(8..),
            _ => None,
        };
        match field {
            Some(field) => {
                let (value, comment) = split_value(field);
                Self {
                    keyword,
                    value,
                    comment,
                }
            }
            None => Self {
                keyword,
                value: Value::Empty,
                comment: card
                    .get(8..)
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty()),
            },
        }
    }
    fn append_continue(&mut self, next: Card) {
        if let (Value::Str(head), Value::Str(tail)) = (&mut self.value, next.value) {
            if head.ends_with('&') {
                head.pop();
            }
            head.push_str(&tail);
        }
    }
    fn is_continued(&self) -> bool {
        matches!(&self.value, Value::Str(s) if s.ends_with('&'))
    }
}

fn split_value(field: &str) -> (Value, Option<String>) {
    let field = field.trim_start();
    let comment = |s: &str| {
        s.split_once('/')
            .map(|(_, c)| c.trim().to_string())
            .filter(|c| !c.is_empty())
    };
    if let Some(quoted) = field.strip_prefix('\'') {
        let mut text = String::new();
        let mut chars = quoted.char_indices().peekable();
        let mut rest = "";
        while let Some((i, c)) = chars.next() {
            if c == '\'' {
                if let Some((_, '\'')) = chars.peek() {
                    text.push('\'');
                    chars.next();
                    continue;
                }
                rest = &quoted[i + 1..];
                break;
            }
            text.push(c);
        }
        return (Value::Str(text.trim_end().to_string()), comment(rest));
    }
    let (raw, cmt) = match field.split_once('/') {
        Some((v, _)) => (v.trim(), comment(field)),
        None => (field.trim(), None),
    };
    let value = match raw {
        "" => Value::Empty,
        "T" => Value::Logical(true),
        "F" => Value::Logical(false),
        _ => raw
            .parse::<i64>()
            .map(Value::Int)
            .or_else(|_| raw.replace(['D', 'd'], "E").parse::<f64>().map(Value::Float))
            .unwrap_or_else(|_| Value::Str(raw.to_string())),
    };
    (value, cmt)
}

/// Reads one 2880 byte block, `Ok(false)` on a clean end of stream
fn read_block<R: Read>(reader: &mut R, block: &mut [u8; BLOCK_SIZE]) -> io::Result<bool> {
    let mut filled = 0;
    while filled < BLOCK_SIZE {
        match reader.read(&mut block[filled..]) {
            Ok(0) if filled == 0 => return Ok(false),
            Ok(0) => return Err(io::ErrorKind::UnexpectedEof.into()),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(true)
}

/// HDU header
#[derive(Debug, Clone, Default)]
pub struct Header {
    cards: Vec<Card>,
}
impl Header {
    /// Reads the next header, returns `None` at the end of the stream
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Option<Self>, FitsError> {
        let mut cards: Vec<Card> = Vec::new();
        let mut block = [0u8; BLOCK_SIZE];
        let mut first = true;
        loop {
            if !read_block(reader, &mut block)? {
                return if first {
                    Ok(None)
                } else {
                    Err(FitsError::Parse("header ended before END card".into()))
                };
            }
            first = false;
            for chunk in block.chunks(CARD_SIZE) {
                let image: String = chunk
                    .iter()
                    .map(|&b| if b.is_ascii() { b as char } else { '?' })
                    .collect();
                let card = Card::parse(&image);
                match card.keyword.as_str() {
                    "END" => return Ok(Some(Self { cards })),
                    "CONTINUE" => match cards.last_mut() {
                        Some(last) if last.is_continued() => last.append_continue(card),
                        _ => {
                            return Err(FitsError::Parse(
                                "CONTINUE without a previous long string".into(),
                            ))
                        }
                    },
                    "" => (),
                    _ => cards.push(card),
                }
            }
        }
    }
    pub fn get_card(&self, keyword: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.keyword == keyword)
    }
    pub fn get(&self, keyword: &str) -> Option<&Value> {
        self.get_card(keyword).map(|c| &c.value)
    }
    pub fn iter(&self) -> std::slice::Iter<'_, Card> {
        self.cards.iter()
    }
    /// Mandatory integer keyword
    pub fn int(&self, keyword: &str) -> Result<i64, FitsError> {
        self.get(keyword)
            .and_then(Value::as_int)
            .ok_or_else(|| FitsError::Parse(format!("missing or non-integer `{keyword}`")))
    }
    /// Extension name, upper cased without trailing blanks
    pub fn extname(&self) -> Option<String> {
        self.get("EXTNAME")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_uppercase())
    }
    pub fn is_named(&self, extname: &str) -> bool {
        self.extname()
            .is_some_and(|name| name == extname.trim().to_uppercase())
    }
    pub fn xtension(&self) -> Option<String> {
        self.get("XTENSION")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_uppercase())
    }
    pub fn bitpix(&self) -> Result<i64, FitsError> {
        self.int("BITPIX")
    }
    /// `[NAXIS1, NAXIS2, ...]`, fastest varying axis first
    pub fn naxes(&self) -> Result<Vec<usize>, FitsError> {
        let naxis = self.int("NAXIS")?;
        (1..=naxis)
            .map(|i| {
                let n = self.int(&format!("NAXIS{i}"))?;
                usize::try_from(n)
                    .map_err(|_| FitsError::Parse(format!("negative NAXIS{i} = {n}")))
            })
            .collect()
    }
    /// Size of the data unit in bytes, without block padding
    ///
    /// Sizes that do not fit a seekable offset once padded are rejected.
    pub fn data_len(&self) -> Result<usize, FitsError> {
        let naxes = self.naxes()?;
        if naxes.is_empty() {
            return Ok(0);
        }
        let count = |keyword: &str, default: i64| {
            let n = self.get(keyword).and_then(Value::as_int).unwrap_or(default);
            usize::try_from(n).map_err(|_| FitsError::Parse(format!("negative {keyword} = {n}")))
        };
        let pcount = count("PCOUNT", 0)?;
        let gcount = count("GCOUNT", 1)?;
        let bytes = (self.bitpix()?.unsigned_abs() / 8) as usize;
        let overflow = || FitsError::Parse(format!("data unit size overflows: {naxes:?}"));
        let len = naxes
            .iter()
            .try_fold(1usize, |n, &axis| n.checked_mul(axis))
            .and_then(|n| n.checked_add(pcount))
            .and_then(|n| n.checked_mul(gcount))
            .and_then(|n| n.checked_mul(bytes))
            .ok_or_else(overflow)?;
        if len > i64::MAX as usize - BLOCK_SIZE {
            return Err(overflow());
        }
        Ok(len)
    }
}
