//! Committed matrix snapshot
//!
//! The only grid state visible to consumers. Rows are fixed-width bitsets
//! covering both halves; the debounce engine is the sole writer, everything
//! else reads between scan cycles.

use core::fmt;

use bitfield::Bit;

use crate::config::{NCOLS, NROWS};

/// One row of key state, column 0 at bit 0, 1 = pressed.
///
/// Local columns occupy the low bits, remote columns the bits above them.
pub type Row = u16;

/// All valid column bits of a row value.
pub(crate) const ROW_MASK: Row = ((1u32 << NCOLS) - 1) as Row;

/// Debounced state of the whole grid
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(test, derive(Debug))]
pub struct Matrix {
    rows: [Row; NROWS],
}

impl Default for Matrix {
    fn default() -> Self {
        Self::new()
    }
}

impl Matrix {
    /// All keys released.
    pub const fn new() -> Self {
        Self { rows: [0; NROWS] }
    }

    /// Number of rows in the grid.
    pub const fn rows() -> usize {
        NROWS
    }

    /// Number of columns in the grid (local + remote).
    pub const fn cols() -> usize {
        NCOLS
    }

    /// Committed value of one row.
    pub fn get_row(&self, row: usize) -> Row {
        self.rows[row]
    }

    /// Whether the key at (row, col) is pressed.
    pub fn is_on(&self, row: usize, col: usize) -> bool {
        debug_assert!(col < NCOLS);
        self.rows[row].bit(col)
    }

    /// Total number of pressed keys.
    pub fn key_count(&self) -> u32 {
        self.rows.iter().map(|row| row.count_ones()).sum()
    }

    pub(crate) fn set_row(&mut self, row: usize, value: Row) {
        self.rows[row] = value & ROW_MASK;
    }
}

/// Diagnostic dump: one line per row, column 0 leftmost, `1` = pressed.
impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("r/c ")?;
        for col in 0..NCOLS {
            write!(f, "{:X}", col)?;
        }
        writeln!(f)?;
        for (i, row) in self.rows.iter().enumerate() {
            write!(f, "{:X}: ", i)?;
            for col in 0..NCOLS {
                f.write_str(if row.bit(col) { "1" } else { "0" })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::ToString;

    #[test]
    fn starts_empty() {
        let matrix = Matrix::new();
        assert_eq!(matrix.key_count(), 0);
        for row in 0..Matrix::rows() {
            assert_eq!(matrix.get_row(row), 0);
        }
    }

    #[test]
    fn key_count_is_total_popcount() {
        let mut matrix = Matrix::new();
        matrix.set_row(0, 0b1000_0000_0000_0001);
        matrix.set_row(2, 0b0000_0110_0000_0000);
        matrix.set_row(4, 0b1111_0000_0000_0000);
        assert_eq!(matrix.key_count(), 8);
    }

    #[test]
    fn is_on_addresses_single_bits() {
        let mut matrix = Matrix::new();
        matrix.set_row(1, 1 << 9);
        assert!(matrix.is_on(1, 9));
        assert!(!matrix.is_on(1, 8));
        assert!(!matrix.is_on(0, 9));
    }

    #[test]
    fn dump_format() {
        let mut matrix = Matrix::new();
        matrix.set_row(0, 0b1);
        matrix.set_row(3, 1 << 15);
        let dump = matrix.to_string();
        let mut lines = dump.lines();
        assert_eq!(lines.next(), Some("r/c 0123456789ABCDEF"));
        assert_eq!(lines.next(), Some("0: 1000000000000000"));
        assert_eq!(lines.next(), Some("1: 0000000000000000"));
        assert_eq!(lines.next(), Some("2: 0000000000000000"));
        assert_eq!(lines.next(), Some("3: 0000000000000001"));
        assert_eq!(lines.next(), Some("4: 0000000000000000"));
        assert_eq!(lines.next(), None);
    }
}
