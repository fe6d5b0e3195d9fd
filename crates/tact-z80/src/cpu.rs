//! Z80 CPU core with per-fetch execution.

use log::debug;
use tact_core::{Cpu, IoBus, Observable, Tacts, Value};

use crate::config::{ContentionMode, Z80Config};
use crate::flags::{CF, HF, NF, PF, SF, XF, YF, ZF};
use crate::registers::Registers;
use crate::signals::{IndexMode, PrefixMode, Signals};
use crate::state::State;

mod bit;
mod dispatch;
mod extended;
mod indexed;
mod interrupts;
mod standard;

/// Z80 CPU.
///
/// The CPU does not own the bus. The host passes it to `execute_cycle()`,
/// which performs exactly one opcode fetch (or one signal response) and
/// charges every bus cycle and internal delay to the tact counter.
pub struct Z80 {
    // === Registers ===
    pub(crate) regs: Registers,

    // === Timing ===
    /// Tacts elapsed since the last reset.
    pub(crate) tacts: Tacts,

    // === Signals ===
    pub(crate) signals: Signals,
    /// Set for one fetch after EI or a prefix byte.
    pub(crate) interrupt_blocked: bool,
    /// True between a prefix byte and the opcode that completes it.
    pub(crate) in_progress: bool,

    // === Decode state ===
    pub(crate) prefix: PrefixMode,
    pub(crate) index: IndexMode,
    /// Most recently fetched opcode byte.
    pub(crate) opcode: u8,

    config: Z80Config,
}

impl Z80 {
    /// Create a Z80 with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Z80Config::default())
    }

    #[must_use]
    pub fn with_config(config: Z80Config) -> Self {
        debug!(
            "z80: contention={:?} im2_byte={:#04X}",
            config.contention, config.interrupt_vector_byte
        );
        Self {
            regs: Registers::default(),
            tacts: Tacts::ZERO,
            signals: Signals::NONE,
            interrupt_blocked: false,
            in_progress: false,
            prefix: PrefixMode::Unprefixed,
            index: IndexMode::None,
            opcode: 0,
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &Z80Config {
        &self.config
    }

    /// Register file, read-only.
    #[must_use]
    pub const fn registers(&self) -> &Registers {
        &self.regs
    }

    #[must_use]
    pub const fn signals(&self) -> Signals {
        self.signals
    }

    #[must_use]
    pub const fn interrupt_blocked(&self) -> bool {
        self.interrupt_blocked
    }

    #[must_use]
    pub const fn in_progress(&self) -> bool {
        self.in_progress
    }

    /// Run one full instruction, including any prefix bytes.
    ///
    /// Returns the tacts consumed. A signal response (interrupt, halted
    /// cycle) counts as one instruction.
    ///
    /// Only available in test builds.
    #[cfg(feature = "test-utils")]
    pub fn step<B: IoBus>(&mut self, bus: &mut B) -> u64 {
        let start = self.tacts;
        loop {
            self.cycle(bus);
            if !self.in_progress {
                break;
            }
        }
        (self.tacts - start).get()
    }

    fn cycle(&mut self, bus: &mut dyn IoBus) {
        if self.process_signals(bus) {
            return;
        }
        let opcode = self.fetch_opcode(bus);
        self.dispatch(bus, opcode);
    }
}

impl Default for Z80 {
    fn default() -> Self {
        Self::new()
    }
}

// Bus cycles. Each helper charges the documented tacts for one machine cycle.
impl Z80 {
    pub(crate) fn internal(&mut self, tacts: u32) {
        self.tacts.advance(tacts);
    }

    /// M1: read opcode at PC, bump PC and R (4 tacts).
    fn fetch_opcode(&mut self, bus: &mut dyn IoBus) -> u8 {
        let opcode = bus.read(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        self.regs.refresh();
        self.tacts.advance(4);
        opcode
    }

    /// Read the byte at PC and advance PC (3 tacts).
    fn read_code(&mut self, bus: &mut dyn IoBus) -> u8 {
        let value = self.read_mem(bus, self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    /// Little-endian word at PC (6 tacts).
    fn read_code_word(&mut self, bus: &mut dyn IoBus) -> u16 {
        let lo = self.read_code(bus);
        let hi = self.read_code(bus);
        u16::from_le_bytes([lo, hi])
    }

    fn read_mem(&mut self, bus: &mut dyn IoBus, address: u16) -> u8 {
        let value = bus.read(address);
        self.tacts.advance(3);
        value
    }

    fn write_mem(&mut self, bus: &mut dyn IoBus, address: u16, value: u8) {
        bus.write(address, value);
        self.tacts.advance(3);
    }

    fn read_mem_word(&mut self, bus: &mut dyn IoBus, address: u16) -> u16 {
        let lo = self.read_mem(bus, address);
        let hi = self.read_mem(bus, address.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    fn write_mem_word(&mut self, bus: &mut dyn IoBus, address: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write_mem(bus, address, lo);
        self.write_mem(bus, address.wrapping_add(1), hi);
    }

    /// I/O read; the port device reports the cycle length.
    fn read_port(&mut self, bus: &mut dyn IoBus, port: u16) -> u8 {
        let result = bus.read_port(port);
        self.tacts.advance(result.tacts);
        result.data
    }

    fn write_port(&mut self, bus: &mut dyn IoBus, port: u16, value: u8) {
        let tacts = bus.write_port(port, value);
        self.tacts.advance(tacts);
    }

    /// Push high byte then low byte (6 tacts).
    fn push(&mut self, bus: &mut dyn IoBus, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        self.write_mem(bus, self.regs.sp, hi);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        self.write_mem(bus, self.regs.sp, lo);
    }

    /// Pop low byte then high byte (6 tacts).
    fn pop(&mut self, bus: &mut dyn IoBus) -> u16 {
        let lo = self.read_mem(bus, self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        let hi = self.read_mem(bus, self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        u16::from_le_bytes([lo, hi])
    }

    /// Five extra tacts of a taken relative jump. `address` is where the
    /// displacement byte was read.
    fn relative_jump_delay(&mut self, bus: &mut dyn IoBus, address: u16) {
        match self.config.contention {
            ContentionMode::GateArray => self.internal(5),
            ContentionMode::Ula => {
                for _ in 0..5 {
                    let _ = bus.read(address);
                    self.internal(1);
                }
            }
        }
    }

    /// Read the displacement of an `(IX+d)`/`(IY+d)` operand, charge
    /// `penalty` internal tacts, and return the effective address. WZ takes
    /// the address.
    fn indexed_address(&mut self, bus: &mut dyn IoBus, penalty: u32) -> u16 {
        let d = self.read_code(bus) as i8;
        self.internal(penalty);
        let address = self.index_reg().wrapping_add_signed(i16::from(d));
        self.regs.wz = address;
        address
    }
}

// Register selection by opcode field.
impl Z80 {
    /// HL, IX or IY depending on the active prefix.
    fn index_reg(&self) -> u16 {
        match self.index {
            IndexMode::None => self.regs.hl(),
            IndexMode::Ix => self.regs.ix,
            IndexMode::Iy => self.regs.iy,
        }
    }

    fn set_index_reg(&mut self, value: u16) {
        match self.index {
            IndexMode::None => self.regs.set_hl(value),
            IndexMode::Ix => self.regs.ix = value,
            IndexMode::Iy => self.regs.iy = value,
        }
    }

    /// 8-bit register by 3-bit code; H/L become IXH/IXL or IYH/IYL under a
    /// prefix. Code 6 is a memory operand and is handled by the caller.
    fn reg8(&self, r: u8) -> u8 {
        match r & 7 {
            4 => (self.index_reg() >> 8) as u8,
            5 => self.index_reg() as u8,
            r => self.plain_reg8(r),
        }
    }

    fn set_reg8(&mut self, r: u8, value: u8) {
        match r & 7 {
            4 => {
                let idx = self.index_reg();
                self.set_index_reg((idx & 0x00FF) | (u16::from(value) << 8));
            }
            5 => {
                let idx = self.index_reg();
                self.set_index_reg((idx & 0xFF00) | u16::from(value));
            }
            r => self.set_plain_reg8(r, value),
        }
    }

    /// 8-bit register by 3-bit code, ignoring any index prefix.
    fn plain_reg8(&self, r: u8) -> u8 {
        match r & 7 {
            0 => self.regs.b,
            1 => self.regs.c,
            2 => self.regs.d,
            3 => self.regs.e,
            4 => self.regs.h,
            5 => self.regs.l,
            7 => self.regs.a,
            _ => unreachable!("memory operand has no register"),
        }
    }

    fn set_plain_reg8(&mut self, r: u8, value: u8) {
        match r & 7 {
            0 => self.regs.b = value,
            1 => self.regs.c = value,
            2 => self.regs.d = value,
            3 => self.regs.e = value,
            4 => self.regs.h = value,
            5 => self.regs.l = value,
            7 => self.regs.a = value,
            _ => unreachable!("memory operand has no register"),
        }
    }

    /// Register pair by 2-bit code (BC, DE, HL/IX/IY, SP).
    fn reg16(&self, rp: u8) -> u16 {
        match rp & 3 {
            0 => self.regs.bc(),
            1 => self.regs.de(),
            2 => self.index_reg(),
            3 => self.regs.sp,
            _ => unreachable!(),
        }
    }

    fn set_reg16(&mut self, rp: u8, value: u16) {
        match rp & 3 {
            0 => self.regs.set_bc(value),
            1 => self.regs.set_de(value),
            2 => self.set_index_reg(value),
            3 => self.regs.sp = value,
            _ => unreachable!(),
        }
    }

    /// Register pair for PUSH/POP (AF instead of SP).
    fn reg16_af(&self, rp: u8) -> u16 {
        match rp & 3 {
            3 => self.regs.af(),
            rp => self.reg16(rp),
        }
    }

    fn set_reg16_af(&mut self, rp: u8, value: u16) {
        match rp & 3 {
            3 => self.regs.set_af(value),
            rp => self.set_reg16(rp, value),
        }
    }

    /// Evaluate condition code (NZ Z NC C PO PE P M).
    fn condition(&self, cc: u8) -> bool {
        match cc & 7 {
            0 => self.regs.f & ZF == 0,
            1 => self.regs.f & ZF != 0,
            2 => self.regs.f & CF == 0,
            3 => self.regs.f & CF != 0,
            4 => self.regs.f & PF == 0,
            5 => self.regs.f & PF != 0,
            6 => self.regs.f & SF == 0,
            7 => self.regs.f & SF != 0,
            _ => unreachable!(),
        }
    }
}

impl Cpu for Z80 {
    type State = State;

    fn execute_cycle<B: IoBus>(&mut self, bus: &mut B) {
        self.cycle(bus);
    }

    fn state(&self) -> State {
        State {
            registers: self.regs,
            tacts: self.tacts,
            signals: self.signals,
            interrupt_blocked: self.interrupt_blocked,
            in_progress: self.in_progress,
            prefix: self.prefix,
            index: self.index,
            opcode: self.opcode,
        }
    }

    fn tacts(&self) -> Tacts {
        self.tacts
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn is_halted(&self) -> bool {
        self.signals.contains(Signals::HALTED)
    }

    fn contention_delay(&mut self, tacts: u32) {
        self.tacts.advance(tacts);
    }

    fn interrupt(&mut self) {
        self.signals.insert(Signals::INT);
    }

    fn clear_interrupt(&mut self) {
        self.signals.remove(Signals::INT);
    }

    fn nmi(&mut self) {
        self.signals.insert(Signals::NMI);
    }

    fn set_reset_signal(&mut self) {
        self.signals.insert(Signals::RESET);
    }

    fn clear_reset_signal(&mut self) {
        self.signals.remove(Signals::RESET);
    }

    /// General-purpose registers, SP, IX, IY and WZ survive a reset.
    fn reset(&mut self) {
        debug!("z80: reset at {}", self.tacts);
        self.regs.iff1 = false;
        self.regs.iff2 = false;
        self.regs.im = 0;
        self.regs.i = 0;
        self.regs.r = 0;
        self.regs.pc = 0;
        self.signals = Signals::NONE;
        self.interrupt_blocked = false;
        self.in_progress = false;
        self.prefix = PrefixMode::Unprefixed;
        self.index = IndexMode::None;
        self.tacts = Tacts::ZERO;
    }
}

/// All query paths supported by the Z80.
const Z80_QUERY_PATHS: &[&str] = &[
    // Main registers
    "a", "f", "b", "c", "d", "e", "h", "l",
    // Register pairs
    "af", "bc", "de", "hl",
    // Alternate pairs
    "af'", "bc'", "de'", "hl'",
    // Index registers
    "ix", "iy", "ixh", "ixl", "iyh", "iyl",
    // Other registers
    "sp", "pc", "i", "r", "wz",
    // Flags
    "flags.s", "flags.z", "flags.y", "flags.h",
    "flags.x", "flags.p", "flags.n", "flags.c",
    // Interrupt state
    "iff1", "iff2", "im", "interrupt_blocked",
    // Signals
    "signals", "halted",
    // Decode state
    "opcode", "prefix", "index", "in_progress",
    "tacts",
];

impl Observable for Z80 {
    fn query(&self, path: &str) -> Option<Value> {
        let r = &self.regs;
        Some(match path {
            "a" => r.a.into(),
            "f" => r.f.into(),
            "b" => r.b.into(),
            "c" => r.c.into(),
            "d" => r.d.into(),
            "e" => r.e.into(),
            "h" => r.h.into(),
            "l" => r.l.into(),

            "af" => r.af().into(),
            "bc" => r.bc().into(),
            "de" => r.de().into(),
            "hl" => r.hl().into(),

            "af'" => r.af_alt().into(),
            "bc'" => r.bc_alt().into(),
            "de'" => r.de_alt().into(),
            "hl'" => r.hl_alt().into(),

            "ix" => r.ix.into(),
            "iy" => r.iy.into(),
            "ixh" => r.ixh().into(),
            "ixl" => r.ixl().into(),
            "iyh" => r.iyh().into(),
            "iyl" => r.iyl().into(),

            "sp" => r.sp.into(),
            "pc" => r.pc.into(),
            "i" => r.i.into(),
            "r" => r.r.into(),
            "wz" => r.wz.into(),

            "flags.s" => (r.f & SF != 0).into(),
            "flags.z" => (r.f & ZF != 0).into(),
            "flags.y" => (r.f & YF != 0).into(),
            "flags.h" => (r.f & HF != 0).into(),
            "flags.x" => (r.f & XF != 0).into(),
            "flags.p" => (r.f & PF != 0).into(),
            "flags.n" => (r.f & NF != 0).into(),
            "flags.c" => (r.f & CF != 0).into(),

            "iff1" => r.iff1.into(),
            "iff2" => r.iff2.into(),
            "im" => r.im.into(),
            "interrupt_blocked" => self.interrupt_blocked.into(),

            "signals" => self.signals.bits().into(),
            "halted" => self.signals.contains(Signals::HALTED).into(),

            "opcode" => self.opcode.into(),
            "prefix" => self.prefix.name().into(),
            "index" => self.index.name().into(),
            "in_progress" => self.in_progress.into(),
            "tacts" => self.tacts.get().into(),

            _ => return None,
        })
    }

    fn query_paths(&self) -> &'static [&'static str] {
        Z80_QUERY_PATHS
    }
}
