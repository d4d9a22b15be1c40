//! Bus transport capability consumed by the expander bridge
//!
//! The core never touches bus hardware directly; it only requires the
//! ability to run addressed start/write/read/stop transactions. Firmware
//! implements [`Bus`] on top of its I2C peripheral, tests implement it
//! with scripted mocks.

/// A bus transaction did not complete (e.g. the device did not acknowledge).
///
/// This is the only transport error kind and it is never fatal: the bridge
/// reacts by dropping the connection and reconnecting on the next access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransportError;

/// Synchronous master access to a shared two-wire bus.
pub trait Bus {
    /// Issue a (repeated) start condition addressing `address`
    ///
    /// `address` already encodes the direction bit, see [`write_address`]
    /// and [`read_address`].
    fn start(&mut self, address: u8) -> Result<(), TransportError>;

    /// Transmit one byte.
    fn write(&mut self, byte: u8) -> Result<(), TransportError>;

    /// Receive one byte, acknowledging it if `ack` is true
    ///
    /// The last byte of a transfer is read with `ack = false`.
    fn read(&mut self, ack: bool) -> u8;

    /// Issue a stop condition, releasing the bus.
    fn stop(&mut self);
}

/// Encode a 7-bit device address for a write transaction.
pub const fn write_address(address: u8) -> u8 {
    address << 1
}

/// Encode a 7-bit device address for a read transaction.
pub const fn read_address(address: u8) -> u8 {
    (address << 1) | 1
}
