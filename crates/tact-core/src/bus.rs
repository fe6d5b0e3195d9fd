//! Memory and I/O bus interfaces.

use std::collections::HashMap;

/// Tacts of an uncontended Z80 I/O cycle.
pub const IO_CYCLE_TACTS: u32 = 4;

/// Memory bus interface.
///
/// Each call is exactly one hardware bus cycle. The CPU charges the tacts
/// for the cycle itself; implementations never batch or align accesses.
pub trait Bus {
    /// Read a byte from the given address.
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to the given address.
    fn write(&mut self, address: u16, value: u8);
}

/// Result of an I/O port read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoResult {
    /// Byte placed on the data bus.
    pub data: u8,
    /// Tacts consumed by the I/O cycle, wait states included.
    pub tacts: u32,
}

impl IoResult {
    /// Uncontended read.
    #[must_use]
    pub const fn new(data: u8) -> Self {
        Self {
            data,
            tacts: IO_CYCLE_TACTS,
        }
    }

    /// Read that took `tacts` in total.
    #[must_use]
    pub const fn with_tacts(data: u8, tacts: u32) -> Self {
        Self { data, tacts }
    }
}

/// A bus that also decodes the separate 16-bit I/O address space.
///
/// The port device owns the timing of the I/O cycle: it reports how many
/// tacts the access took (normally [`IO_CYCLE_TACTS`] plus any contention)
/// and the CPU adds exactly that to its counter.
pub trait IoBus: Bus {
    /// Read a byte from the given I/O port.
    fn read_port(&mut self, port: u16) -> IoResult;

    /// Write a byte to the given I/O port. Returns the tacts consumed.
    fn write_port(&mut self, port: u16, value: u8) -> u32;
}

/// One recorded bus cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusAccess {
    Read(u16),
    Write(u16, u8),
    PortRead(u16),
    PortWrite(u16, u8),
}

/// Flat 64 KiB RAM with a port map and an optional access log.
///
/// Meant for tests and simple hosts. Unmapped ports read as 0xFF.
pub struct SimpleBus {
    ram: Box<[u8; 0x1_0000]>,
    ports: HashMap<u16, u8>,
    port_writes: Vec<(u16, u8)>,
    log: Option<Vec<BusAccess>>,
}

impl Default for SimpleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ram: Box::new([0; 0x1_0000]),
            ports: HashMap::new(),
            port_writes: Vec::new(),
            log: None,
        }
    }

    /// Copy `data` into RAM starting at `address`, wrapping at 64 KiB.
    pub fn load(&mut self, address: u16, data: &[u8]) {
        let mut addr = address;
        for &byte in data {
            self.ram[addr as usize] = byte;
            addr = addr.wrapping_add(1);
        }
    }

    /// Read RAM without recording an access.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.ram[address as usize]
    }

    /// Write RAM without recording an access.
    pub fn poke(&mut self, address: u16, value: u8) {
        self.ram[address as usize] = value;
    }

    /// Value returned by reads of `port`.
    pub fn set_port(&mut self, port: u16, value: u8) {
        self.ports.insert(port, value);
    }

    /// Every port write seen so far, in order.
    #[must_use]
    pub fn port_writes(&self) -> &[(u16, u8)] {
        &self.port_writes
    }

    /// Start recording accesses. Clears any previous log.
    pub fn enable_log(&mut self) {
        self.log = Some(Vec::new());
    }

    /// Recorded accesses since logging was enabled.
    #[must_use]
    pub fn log(&self) -> &[BusAccess] {
        self.log.as_deref().unwrap_or(&[])
    }

    /// Drain the access log, keeping logging enabled.
    pub fn take_log(&mut self) -> Vec<BusAccess> {
        self.log.as_mut().map(std::mem::take).unwrap_or_default()
    }

    fn record(&mut self, access: BusAccess) {
        if let Some(log) = self.log.as_mut() {
            log.push(access);
        }
    }
}

impl Bus for SimpleBus {
    fn read(&mut self, address: u16) -> u8 {
        self.record(BusAccess::Read(address));
        self.ram[address as usize]
    }

    fn write(&mut self, address: u16, value: u8) {
        self.record(BusAccess::Write(address, value));
        self.ram[address as usize] = value;
    }
}

impl IoBus for SimpleBus {
    fn read_port(&mut self, port: u16) -> IoResult {
        self.record(BusAccess::PortRead(port));
        IoResult::new(self.ports.get(&port).copied().unwrap_or(0xFF))
    }

    fn write_port(&mut self, port: u16, value: u8) -> u32 {
        self.record(BusAccess::PortWrite(port, value));
        self.port_writes.push((port, value));
        IO_CYCLE_TACTS
    }
}
