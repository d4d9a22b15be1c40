//! Build-time configuration of the switch grid
//!
//! Everything here is fixed at build time: grid geometry, the local/remote
//! split point, the debounce window and the electrical settle delay. The
//! values describe the splitaf PCB; changing them reconfigures the whole
//! crate consistently (row bitset layout, expander init, debounce grid).

use static_assertions as sa;

/// Number of rows in the grid (both halves share row indices).
pub const NROWS: usize = 5;
/// Columns wired directly to local MCU pins (bits `0..NCOLS_LOCAL` of a row).
pub const NCOLS_LOCAL: usize = 8;
/// Columns behind the port expander (bits above the local ones).
pub const NCOLS_REMOTE: usize = 8;
/// Total number of columns.
pub const NCOLS: usize = NCOLS_LOCAL + NCOLS_REMOTE;

/// Debounce window in scan cycles. Zero disables filtering.
pub const DEBOUNCE_CYCLES: u8 = 5;

/// Wait between selecting a row and sampling its columns, in microseconds.
///
/// Required for the column pull-ups to charge the line after the select
/// transition; a hard constraint of the switch grid, not a tunable.
pub const SETTLE_DELAY_US: u16 = 30;

/// 7-bit bus address of the MCP23018 (all address pins grounded).
pub const EXPANDER_ADDRESS: u8 = 0b0100000;

/// Capacity of each scanner hook list.
pub const MAX_HOOKS: usize = 4;

// One expander register covers 8 lines, and a row value is 16 bits wide.
sa::const_assert!(NCOLS_LOCAL <= 8);
sa::const_assert!(NCOLS_REMOTE <= 8);
sa::const_assert!(NROWS <= 8);
sa::const_assert!(NCOLS <= 16);
