//! Per-key debounce engine
//!
//! Every key has a remaining-cycles counter. A counter above zero means the
//! key's last observed edge is still inside the debounce window and new
//! changes are not trusted; it reaches zero exactly when eligibility is
//! restored. Counters are reset to the window on every observed raw edge
//! (not only on committed changes), so a bouncing contact keeps re-arming
//! its own window and a clean change becomes visible `window + 1` cycles
//! after the edge. A window of zero disables filtering entirely.

use bitfield::{Bit, BitMut};

use crate::config::{NCOLS, NROWS};
use crate::matrix::{Matrix, Row, ROW_MASK};

pub struct Debouncer {
    /// Debounce window in scan cycles.
    window: u8,
    /// Remaining lock cycles per key.
    counters: [[u8; NCOLS]; NROWS],
    /// Raw samples from the previous cycle, for edge detection.
    last_raw: [Row; NROWS],
}

impl Debouncer {
    pub const fn new(window: u8) -> Self {
        Self {
            window,
            counters: [[0; NCOLS]; NROWS],
            last_raw: [0; NROWS],
        }
    }

    /// Filter one freshly sampled row and commit it to the matrix
    ///
    /// Eligible bits take the sampled value, locked bits keep their last
    /// committed value. Returns whether the committed row changed.
    pub fn commit(&mut self, matrix: &mut Matrix, row: usize, raw: Row) -> bool {
        let mut mask = ROW_MASK;

        // Locked keys pay one cycle and stay excluded, including the cycle
        // the counter hits zero.
        for col in 0..NCOLS {
            let counter = &mut self.counters[row][col];
            if *counter > 0 {
                *counter -= 1;
                mask.set_bit(col, false);
            }
        }

        // Every raw edge restarts the key's window before the merge, so a
        // fresh change is only committed once it has stayed stable for the
        // whole window.
        let edges = raw ^ self.last_raw[row];
        if self.window > 0 && edges != 0 {
            for col in 0..NCOLS {
                if edges.bit(col) {
                    self.counters[row][col] = self.window;
                    mask.set_bit(col, false);
                }
            }
        }
        self.last_raw[row] = raw;

        let previous = matrix.get_row(row);
        let committed = (raw & mask) | (previous & !mask);
        matrix.set_row(row, committed);
        committed != previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: u8 = 5;

    /// Run `raw` samples through row 0, returning the committed row after
    /// each cycle.
    fn run(debouncer: &mut Debouncer, matrix: &mut Matrix, raw: &[Row]) -> std::vec::Vec<Row> {
        raw.iter()
            .map(|&r| {
                debouncer.commit(matrix, 0, r);
                matrix.get_row(0)
            })
            .collect()
    }

    #[test]
    fn zero_window_commits_every_sample() {
        let mut debouncer = Debouncer::new(0);
        let mut matrix = Matrix::new();
        let committed = run(&mut debouncer, &mut matrix, &[0b1, 0b0, 0b1, 0b1]);
        assert_eq!(committed, [0b1, 0b0, 0b1, 0b1]);
    }

    #[test]
    fn clean_press_commits_after_window() {
        let mut debouncer = Debouncer::new(WINDOW);
        let mut matrix = Matrix::new();
        // Edge at cycle 1, eligible again at cycle 7.
        let committed = run(&mut debouncer, &mut matrix, &[0b1; 8]);
        assert_eq!(committed, [0, 0, 0, 0, 0, 0, 0b1, 0b1]);
    }

    #[test]
    fn flip_and_flip_back_is_never_visible() {
        let mut debouncer = Debouncer::new(WINDOW);
        let mut matrix = Matrix::new();
        // Spurious press for two cycles, gone before the window expires.
        let committed = run(&mut debouncer, &mut matrix, &[0b1, 0b1, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(committed, [0; 10]);
    }

    #[test]
    fn bounce_restarts_the_window() {
        let mut debouncer = Debouncer::new(WINDOW);
        let mut matrix = Matrix::new();
        // Press bouncing at cycle 3: edges at cycles 1, 3 and 4. The last
        // edge re-arms the counter, so the press is committed on the first
        // eligible cycle after it (cycle 10) and the bounce never shows.
        let raw = [0b1, 0b1, 0b0, 0b1, 0b1, 0b1, 0b1, 0b1, 0b1, 0b1, 0b1];
        let committed = run(&mut debouncer, &mut matrix, &raw);
        assert_eq!(committed, [0, 0, 0, 0, 0, 0, 0, 0, 0, 0b1, 0b1]);
    }

    #[test]
    fn stable_state_stays_committed() {
        let mut debouncer = Debouncer::new(WINDOW);
        let mut matrix = Matrix::new();
        let committed = run(&mut debouncer, &mut matrix, &[0b1; 20]);
        assert!(committed[7..].iter().all(|&row| row == 0b1));
    }

    #[test]
    fn release_is_debounced_like_press() {
        let mut debouncer = Debouncer::new(WINDOW);
        let mut matrix = Matrix::new();
        run(&mut debouncer, &mut matrix, &[0b1; 8]);
        assert_eq!(matrix.get_row(0), 0b1);
        let committed = run(&mut debouncer, &mut matrix, &[0b0; 8]);
        assert_eq!(committed, [0b1, 0b1, 0b1, 0b1, 0b1, 0b1, 0, 0]);
    }

    #[test]
    fn keys_are_debounced_independently() {
        let mut debouncer = Debouncer::new(WINDOW);
        let mut matrix = Matrix::new();
        // Column 0 held from cycle 1, column 1 joins at cycle 3.
        let raw = [0b01, 0b01, 0b11, 0b11, 0b11, 0b11, 0b11, 0b11, 0b11];
        let committed = run(&mut debouncer, &mut matrix, &raw);
        assert_eq!(committed[6], 0b01);
        assert_eq!(committed[8], 0b11);
    }

    #[test]
    fn commit_reports_changes() {
        let mut debouncer = Debouncer::new(WINDOW);
        let mut matrix = Matrix::new();
        let changes: std::vec::Vec<bool> = [0b1; 10]
            .iter()
            .map(|&raw| debouncer.commit(&mut matrix, 0, raw))
            .collect();
        assert_eq!(changes.iter().filter(|&&c| c).count(), 1);
        assert!(changes[6]);
    }

    #[test]
    fn rows_are_independent() {
        let mut debouncer = Debouncer::new(WINDOW);
        let mut matrix = Matrix::new();
        for _ in 0..8 {
            debouncer.commit(&mut matrix, 1, 0b100);
            debouncer.commit(&mut matrix, 2, 0);
        }
        assert_eq!(matrix.get_row(1), 0b100);
        assert_eq!(matrix.get_row(2), 0);
    }
}
