use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;

use crate::Error;

/// ASCII digits only, `\d` would also take other scripts' digits
static DESIGNATION: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[0-9]+-[0-9]+$"));

/// MaNGA galaxy designation `<plate>-<ifu design>`, e.g. `8485-1901`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlateIfu {
    designation: String,
    dash: usize,
}
impl PlateIfu {
    pub fn plate(&self) -> &str {
        &self.designation[..self.dash]
    }
    pub fn ifu(&self) -> &str {
        &self.designation[self.dash + 1..]
    }
    pub fn as_str(&self) -> &str {
        &self.designation
    }
}
impl FromStr for PlateIfu {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.find('-') {
            Some(dash) if DESIGNATION.as_ref().is_ok_and(|re| re.is_match(s)) => Ok(Self {
                designation: s.to_string(),
                dash,
            }),
            _ => Err(Error::InvalidPlateIfu(s.to_string())),
        }
    }
}
impl fmt::Display for PlateIfu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.designation)
    }
}
