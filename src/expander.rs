//! Remote I/O bridge to the far half's port expander
//!
//! Owns the connection lifecycle to one MCP23018-class device on the shared
//! bus. All register operations lazily (re)initialize the device, and any
//! transport failure drops the connection so that the next access pays a
//! fresh reconnect instead of the caller seeing an error: reads degrade to
//! a caller-supplied default, writes are dropped. A permanently absent
//! device therefore never blocks scanning, the remote half just reads as
//! the default pattern until the bus recovers.

use crate::bus::{read_address, write_address, Bus, TransportError};

/// MCP23018 register addresses (`IOCON.BANK = 0`)
///
/// Each register pair has its port-A half (lines 0-7) and port-B half
/// (lines 8-15) at consecutive addresses, so word operations cover both
/// ports in one transaction.
pub mod regs {
    /// I/O direction (1 = input).
    pub const IODIRA: u8 = 0x00;
    pub const IODIRB: u8 = 0x01;
    /// Pull-up resistor enable.
    pub const GPPUA: u8 = 0x0C;
    pub const GPPUB: u8 = 0x0D;
    /// I/O port (reads pins; writes modify the output latch).
    pub const GPIOA: u8 = 0x12;
    pub const GPIOB: u8 = 0x13;
    /// Output latch.
    pub const OLATA: u8 = 0x14;
    pub const OLATB: u8 = 0x15;
}

/// Raw register access to an expander, without connection tracking
///
/// This is what initialization sequences run on: the device is not
/// considered connected until the whole sequence succeeds.
pub struct Port<'a, B: Bus> {
    bus: &'a mut B,
    address: u8,
}

impl<'a, B: Bus> Port<'a, B> {
    pub fn new(bus: &'a mut B, address: u8) -> Self {
        Self { bus, address }
    }

    /// Write one register.
    pub fn write_byte(&mut self, reg: u8, value: u8) -> Result<(), TransportError> {
        self.bus.start(write_address(self.address))?;
        self.bus.write(reg)?;
        self.bus.write(value)?;
        self.bus.stop();
        Ok(())
    }

    /// Write a register pair starting at `reg`, low byte first.
    pub fn write_word(&mut self, reg: u8, value: u16) -> Result<(), TransportError> {
        self.bus.start(write_address(self.address))?;
        self.bus.write(reg)?;
        self.bus.write(value as u8)?;
        self.bus.write((value >> 8) as u8)?;
        self.bus.stop();
        Ok(())
    }

    /// Read one register.
    pub fn read_byte(&mut self, reg: u8) -> Result<u8, TransportError> {
        self.bus.start(write_address(self.address))?;
        self.bus.write(reg)?;
        self.bus.start(read_address(self.address))?;
        let value = self.bus.read(false);
        self.bus.stop();
        Ok(value)
    }

    /// Read a register pair starting at `reg`, composed as `lo | hi << 8`.
    pub fn read_word(&mut self, reg: u8) -> Result<u16, TransportError> {
        self.bus.start(write_address(self.address))?;
        self.bus.write(reg)?;
        self.bus.start(read_address(self.address))?;
        let lo = self.bus.read(true);
        let hi = self.bus.read(false);
        self.bus.stop();
        Ok(u16::from(lo) | (u16::from(hi) << 8))
    }
}

/// Device initialization strategy run on every (re)connect.
pub type InitSequence<B> = fn(&mut Port<'_, B>) -> Result<(), TransportError>;

/// Default register setup for the far half of the switch grid
///
/// Port A drives rows (outputs, idle high, selected row pulled low),
/// port B reads columns (inputs with pull-ups, active low).
pub fn mcp23018_init<B: Bus>(port: &mut Port<'_, B>) -> Result<(), TransportError> {
    // A all outputs, B all inputs
    port.write_word(regs::IODIRA, 0xFF00)?;
    // pull-ups on the column inputs only
    port.write_word(regs::GPPUA, 0xFF00)?;
    // all rows unselected
    port.write_byte(regs::OLATA, 0xFF)?;
    Ok(())
}

/// Connection-tracking bridge to one port expander
///
/// Created disconnected; connects on first use and reconnects after any
/// failure on the next access. There is no retry within a single call.
pub struct Expander<B: Bus> {
    bus: B,
    address: u8,
    init: InitSequence<B>,
    connected: bool,
}

impl<B: Bus> Expander<B> {
    /// Create a bridge to the device at the 7-bit `address`, disconnected.
    pub fn new(bus: B, address: u8, init: InitSequence<B>) -> Self {
        Self {
            bus,
            address,
            init,
            connected: false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Release the underlying bus.
    pub fn free(self) -> B {
        self.bus
    }

    /// Run the initialization sequence unless already connected
    ///
    /// On any step failure the state stays disconnected and the error is
    /// returned; a later call will run the full sequence again.
    pub fn ensure_connected(&mut self) -> Result<(), TransportError> {
        if self.connected {
            return Ok(());
        }
        let mut port = Port::new(&mut self.bus, self.address);
        match (self.init)(&mut port) {
            Ok(()) => {
                info!("expander {:#x}: connected", self.address);
                self.connected = true;
                Ok(())
            }
            Err(e) => {
                warn!("expander {:#x}: init failed", self.address);
                Err(e)
            }
        }
    }

    /// Read one register, or `default` if the device is unreachable.
    pub fn read_byte(&mut self, reg: u8, default: u8) -> u8 {
        self.run(|port| port.read_byte(reg)).unwrap_or(default)
    }

    /// Read a register pair, or `default` if the device is unreachable.
    pub fn read_word(&mut self, reg: u8, default: u16) -> u16 {
        self.run(|port| port.read_word(reg)).unwrap_or(default)
    }

    /// Write one register; dropped if the device is unreachable.
    pub fn write_byte(&mut self, reg: u8, value: u8) {
        let _ = self.run(|port| port.write_byte(reg, value));
    }

    /// Write a register pair; dropped if the device is unreachable.
    pub fn write_word(&mut self, reg: u8, value: u16) {
        let _ = self.run(|port| port.write_word(reg, value));
    }

    /// Connect if needed, run `op`, disconnect on any failure.
    fn run<T>(
        &mut self,
        op: impl FnOnce(&mut Port<'_, B>) -> Result<T, TransportError>,
    ) -> Result<T, TransportError> {
        let result = self.ensure_connected().and_then(|()| {
            let mut port = Port::new(&mut self.bus, self.address);
            op(&mut port)
        });
        if result.is_err() {
            self.disconnect();
        }
        result
    }

    fn disconnect(&mut self) {
        if self.connected {
            info!("expander {:#x}: disconnected", self.address);
        }
        self.connected = false;
    }
}
