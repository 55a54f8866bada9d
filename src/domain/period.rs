//! Billing period (`YYYY-MM`)

use std::fmt;
use std::str::FromStr;

use crate::domain::{DomainError, DomainResult};

/// A calendar month a meter reading is billed against.
///
/// Parsed from the `YYYY-MM` form used throughout the system. Years are
/// bounded to [2000, 2100] to catch obviously bogus input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    year: u16,
    month: u8,
}

impl Period {
    pub fn new(year: u16, month: u8) -> DomainResult<Self> {
        if !(2000..=2100).contains(&year) || !(1..=12).contains(&month) {
            return Err(DomainError::invalid_input(format!(
                "Invalid period \"{:04}-{:02}\". Expected format: YYYY-MM (e.g., 2025-12)",
                year, month
            )));
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }
}

impl FromStr for Period {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        let invalid = || {
            DomainError::invalid_input(format!(
                "Invalid period format \"{}\". Expected format: YYYY-MM (e.g., 2025-12)",
                s
            ))
        };

        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: u16 = year.parse().map_err(|_| invalid())?;
        let month: u8 = month.parse().map_err(|_| invalid())?;

        Period::new(year, month)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_period() {
        let p: Period = "2025-12".parse().unwrap();
        assert_eq!(p.year(), 2025);
        assert_eq!(p.month(), 12);
        assert_eq!(p.to_string(), "2025-12");
    }

    #[test]
    fn rejects_malformed_strings() {
        for s in ["2025", "2025-13", "2025-00", "25-01", "2025-1", "abcd-ef", "2025/01", ""] {
            assert!(s.parse::<Period>().is_err(), "expected {:?} to fail", s);
        }
    }

    #[test]
    fn rejects_out_of_range_years() {
        assert!("1999-12".parse::<Period>().is_err());
        assert!("2101-01".parse::<Period>().is_err());
        assert!("2000-01".parse::<Period>().is_ok());
        assert!("2100-12".parse::<Period>().is_ok());
    }
}
