//! Row/column grid reading and the scan cycle
//!
//! One scan cycle walks all rows: select the row on both halves, wait for
//! the column lines to settle, sample, debounce, commit, unselect. The
//! local half is reached through the [`LocalHalf`] capability (implemented
//! over embedded-hal pins by [`LocalPins`]), the remote half through the
//! expander bridge. Remote bits land in the high-order columns of the row
//! value; both halves are wired active-low.

use core::convert::Infallible;

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::{InputPin, OutputPin};
use heapless::Vec;

use crate::bus::Bus;
use crate::config::{DEBOUNCE_CYCLES, MAX_HOOKS, NCOLS_LOCAL, NCOLS_REMOTE, NROWS, SETTLE_DELAY_US};
use crate::debounce::Debouncer;
use crate::expander::{regs, Expander};
use crate::matrix::{Matrix, Row};
use crate::utils::InfallibleResult;

/// The half of the grid wired directly to MCU pins.
pub trait LocalHalf {
    /// Drive the select line for `row` active.
    fn select_row(&mut self, row: usize);
    /// Return all select lines to their inactive state.
    fn unselect_rows(&mut self);
    /// Read the local column lines, raw and active-low (bit set = released).
    fn read_columns(&mut self) -> u8;
}

/// [`LocalHalf`] over embedded-hal pins
///
/// Select lines are push-pull outputs driven low to select; columns are
/// inputs with pull-ups.
pub struct LocalPins<C, R>
where
    C: InputPin<Error = Infallible>,
    R: OutputPin<Error = Infallible>,
{
    cols: [C; NCOLS_LOCAL],
    rows: [R; NROWS],
}

impl<C, R> LocalPins<C, R>
where
    C: InputPin<Error = Infallible>,
    R: OutputPin<Error = Infallible>,
{
    pub fn new(cols: [C; NCOLS_LOCAL], rows: [R; NROWS]) -> Self {
        let mut pins = Self { cols, rows };
        pins.unselect_rows();
        pins
    }
}

impl<C, R> LocalHalf for LocalPins<C, R>
where
    C: InputPin<Error = Infallible>,
    R: OutputPin<Error = Infallible>,
{
    fn select_row(&mut self, row: usize) {
        self.rows[row].set_low().infallible();
    }

    fn unselect_rows(&mut self) {
        for row in self.rows.iter_mut() {
            row.set_high().infallible();
        }
    }

    fn read_columns(&mut self) -> u8 {
        let mut bits = 0;
        for (i, col) in self.cols.iter().enumerate() {
            if col.is_high().infallible() {
                bits |= 1 << i;
            }
        }
        bits
    }
}

/// Callback run by the scanner on behalf of outer layers.
pub type Hook = fn();

/// Ordered, independently optional scanner callbacks
///
/// Init hooks run once from [`Scanner::init`], scan hooks at the end of
/// every scan cycle, each list in registration order.
#[derive(Default)]
pub struct Hooks {
    init: Vec<Hook, MAX_HOOKS>,
    scan: Vec<Hook, MAX_HOOKS>,
}

impl Hooks {
    pub fn on_init(&mut self, hook: Hook) -> Result<(), Hook> {
        self.init.push(hook)
    }

    pub fn on_scan(&mut self, hook: Hook) -> Result<(), Hook> {
        self.scan.push(hook)
    }
}

/// Grid scanner: local pins plus the expander bridge, debounced into the
/// committed matrix.
pub struct Scanner<L, B, D>
where
    L: LocalHalf,
    B: Bus,
    D: DelayUs<u16>,
{
    local: L,
    remote: Expander<B>,
    delay: D,
    debouncer: Debouncer,
    matrix: Matrix,
    hooks: Hooks,
}

impl<L, B, D> Scanner<L, B, D>
where
    L: LocalHalf,
    B: Bus,
    D: DelayUs<u16>,
{
    pub fn new(local: L, remote: Expander<B>, delay: D) -> Self {
        Self::with_hooks(local, remote, delay, Hooks::default())
    }

    pub fn with_hooks(local: L, remote: Expander<B>, delay: D, hooks: Hooks) -> Self {
        Self {
            local,
            remote,
            delay,
            debouncer: Debouncer::new(DEBOUNCE_CYCLES),
            matrix: Matrix::new(),
            hooks,
        }
    }

    /// Committed matrix snapshot.
    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    /// Remote bridge state, for diagnostics.
    pub fn remote(&self) -> &Expander<B> {
        &self.remote
    }

    /// Prepare the grid and attempt the first expander connection
    ///
    /// Runs the init hooks afterwards. A failed connection is not an
    /// error; the next scan cycle will retry.
    pub fn init(&mut self) {
        self.unselect_rows();
        let _ = self.remote.ensure_connected();
        for hook in &self.hooks.init {
            hook();
        }
    }

    /// Run one scan cycle over all rows
    ///
    /// Returns whether any committed row changed this cycle.
    pub fn scan(&mut self) -> bool {
        let mut changed = false;
        for row in 0..NROWS {
            self.select_row(row);
            self.delay.delay_us(SETTLE_DELAY_US);
            let raw = self.sample_row();
            changed |= self.debouncer.commit(&mut self.matrix, row, raw);
            self.unselect_rows();
        }
        for hook in &self.hooks.scan {
            hook();
        }
        changed
    }

    fn select_row(&mut self, row: usize) {
        self.local.select_row(row);
        // One write drives all remote rows: selected low, the rest high.
        self.remote.write_byte(regs::GPIOA, !(1u8 << row));
    }

    fn unselect_rows(&mut self) {
        self.local.unselect_rows();
        self.remote.write_byte(regs::GPIOA, 0xFF);
    }

    fn sample_row(&mut self) -> Row {
        const LOCAL_MASK: u8 = ((1u16 << NCOLS_LOCAL) - 1) as u8;
        const REMOTE_MASK: u8 = ((1u16 << NCOLS_REMOTE) - 1) as u8;
        // Active-low on both halves; an unreachable remote half reads as
        // all released.
        let local = !self.local.read_columns() & LOCAL_MASK;
        let remote = !self.remote.read_byte(regs::GPIOB, 0xFF) & REMOTE_MASK;
        Row::from(local) | (Row::from(remote) << NCOLS_LOCAL)
    }
}
