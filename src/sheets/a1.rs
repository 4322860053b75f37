//! A1 notation helpers: `AC2` cell references and `A:AC` column spans.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// `"A"` → 0, `"AC"` → 28.
pub fn column_index(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    let mut index = 0u32;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        index = index.checked_mul(26)?.checked_add(digit)?;
    }
    Some(index - 1)
}

/// 0 → `"A"`, 28 → `"AC"`.
pub fn column_letters(index: u32) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Zero-based cell position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

impl FromStr for CellRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|ch: char| ch.is_ascii_digit())
            .ok_or_else(|| Error::InvalidRange(s.to_string()))?;
        let (letters, digits) = s.split_at(split);
        let col = column_index(letters).ok_or_else(|| Error::InvalidRange(s.to_string()))?;
        let row: u32 = digits
            .parse()
            .map_err(|_| Error::InvalidRange(s.to_string()))?;
        if row == 0 {
            return Err(Error::InvalidRange(s.to_string()));
        }
        Ok(CellRef { row: row - 1, col })
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letters(self.col), self.row + 1)
    }
}

/// Area that is wiped before a table is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearRange {
    /// Every cell of the worksheet.
    Sheet,
    /// Whole columns, `end` exclusive.
    Columns { start: u32, end: u32 },
}

impl FromStr for ClearRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(ClearRange::Sheet);
        }
        let (first, last) = s.split_once(':').ok_or_else(|| Error::InvalidRange(s.to_string()))?;
        let start = column_index(first).ok_or_else(|| Error::InvalidRange(s.to_string()))?;
        let last = column_index(last).ok_or_else(|| Error::InvalidRange(s.to_string()))?;
        if last < start {
            return Err(Error::InvalidRange(s.to_string()));
        }
        Ok(ClearRange::Columns { start, end: last + 1 })
    }
}

impl fmt::Display for ClearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClearRange::Sheet => f.write_str("<sheet>"),
            ClearRange::Columns { start, end } => {
                write!(f, "{}:{}", column_letters(*start), column_letters(end - 1))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_conversions() {
        assert_eq!(column_index("A"), Some(0));
        assert_eq!(column_index("h"), Some(7));
        assert_eq!(column_index("AB"), Some(27));
        assert_eq!(column_index("AC"), Some(28));
        assert_eq!(column_index("ZZ"), Some(701));
        assert_eq!(column_index("A1"), None);
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(28), "AC");
        assert_eq!(column_letters(701), "ZZ");
        assert_eq!(column_letters(702), "AAA");
    }

    #[test]
    fn cell_refs() {
        assert_eq!("AC2".parse::<CellRef>().unwrap(), CellRef { row: 1, col: 28 });
        assert_eq!("I1".parse::<CellRef>().unwrap(), CellRef { row: 0, col: 8 });
        assert_eq!(CellRef { row: 1, col: 28 }.to_string(), "AC2");
        assert!("AC".parse::<CellRef>().is_err());
        assert!("A0".parse::<CellRef>().is_err());
        assert!("2".parse::<CellRef>().is_err());
    }

    #[test]
    fn clear_ranges() {
        assert_eq!(
            "A:AC".parse::<ClearRange>().unwrap(),
            ClearRange::Columns { start: 0, end: 29 }
        );
        assert_eq!(
            "A:H".parse::<ClearRange>().unwrap(),
            ClearRange::Columns { start: 0, end: 8 }
        );
        assert_eq!("".parse::<ClearRange>().unwrap(), ClearRange::Sheet);
        assert_eq!(ClearRange::Columns { start: 0, end: 28 }.to_string(), "A:AB");
        assert!("H:A".parse::<ClearRange>().is_err());
        assert!("A1".parse::<ClearRange>().is_err());
    }
}
