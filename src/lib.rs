#![no_std]

// Use std when running tests, see: https://stackoverflow.com/a/28186509
// Make sure to use different target when testing, e.g.
//   cargo test --target x86_64-unknown-linux-gnu
#[cfg(test)]
#[macro_use]
extern crate std;

#[macro_use]
mod macros;

pub mod bus;
pub mod config;
pub mod debounce;
pub mod expander;
pub mod matrix;
pub mod scan;
pub mod utils;
