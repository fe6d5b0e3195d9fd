//! Whole-CPU snapshots and raw test access.

use tact_core::Tacts;

use crate::registers::Registers;
use crate::signals::{IndexMode, PrefixMode, Signals};

#[cfg(feature = "test-utils")]
use crate::{Z80, Z80Error};

/// Everything externally visible about the CPU at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct State {
    pub registers: Registers,
    pub tacts: Tacts,
    pub signals: Signals,
    pub interrupt_blocked: bool,
    pub in_progress: bool,
    pub prefix: PrefixMode,
    pub index: IndexMode,
    pub opcode: u8,
}

/// Raw register and latch setters for test setup.
///
/// These bypass instruction semantics. Obtain via [`Z80::test_support`].
#[cfg(feature = "test-utils")]
pub struct TestSupport<'a> {
    cpu: &'a mut Z80,
}

#[cfg(feature = "test-utils")]
impl Z80 {
    pub fn test_support(&mut self) -> TestSupport<'_> {
        TestSupport { cpu: self }
    }
}

#[cfg(feature = "test-utils")]
impl TestSupport<'_> {
    /// Replace the whole register file.
    pub fn set_registers(&mut self, registers: Registers) {
        self.cpu.regs = registers;
    }

    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.cpu.regs
    }

    pub fn set_pc(&mut self, value: u16) {
        self.cpu.regs.pc = value;
    }

    pub fn set_sp(&mut self, value: u16) {
        self.cpu.regs.sp = value;
    }

    pub fn set_a(&mut self, value: u8) {
        self.cpu.regs.a = value;
    }

    pub fn set_f(&mut self, value: u8) {
        self.cpu.regs.f = value;
    }

    pub fn set_af(&mut self, value: u16) {
        self.cpu.regs.set_af(value);
    }

    pub fn set_bc(&mut self, value: u16) {
        self.cpu.regs.set_bc(value);
    }

    pub fn set_de(&mut self, value: u16) {
        self.cpu.regs.set_de(value);
    }

    pub fn set_hl(&mut self, value: u16) {
        self.cpu.regs.set_hl(value);
    }

    pub fn set_ix(&mut self, value: u16) {
        self.cpu.regs.ix = value;
    }

    pub fn set_iy(&mut self, value: u16) {
        self.cpu.regs.iy = value;
    }

    pub fn set_ixh(&mut self, value: u8) {
        self.cpu.regs.set_ixh(value);
    }

    pub fn set_ixl(&mut self, value: u8) {
        self.cpu.regs.set_ixl(value);
    }

    pub fn set_iyh(&mut self, value: u8) {
        self.cpu.regs.set_iyh(value);
    }

    pub fn set_iyl(&mut self, value: u8) {
        self.cpu.regs.set_iyl(value);
    }

    pub fn set_i(&mut self, value: u8) {
        self.cpu.regs.i = value;
    }

    pub fn set_r(&mut self, value: u8) {
        self.cpu.regs.r = value;
    }

    pub fn set_wz(&mut self, value: u16) {
        self.cpu.regs.wz = value;
    }

    pub fn set_iff1(&mut self, value: bool) {
        self.cpu.regs.iff1 = value;
    }

    pub fn set_iff2(&mut self, value: bool) {
        self.cpu.regs.iff2 = value;
    }

    /// # Errors
    ///
    /// Returns [`Z80Error::InvalidInterruptMode`] for modes other than 0-2.
    pub fn set_interrupt_mode(&mut self, mode: u8) -> Result<(), Z80Error> {
        if mode > 2 {
            return Err(Z80Error::InvalidInterruptMode(mode));
        }
        self.cpu.regs.im = mode;
        Ok(())
    }

    pub fn set_tacts(&mut self, tacts: Tacts) {
        self.cpu.tacts = tacts;
    }

    pub fn set_signals(&mut self, signals: Signals) {
        self.cpu.signals = signals;
    }

    pub fn set_interrupt_blocked(&mut self, blocked: bool) {
        self.cpu.interrupt_blocked = blocked;
    }
}
