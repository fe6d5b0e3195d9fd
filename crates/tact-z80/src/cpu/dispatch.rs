//! Prefix state machine and the four opcode tables.
//!
//! Each table maps an opcode byte to a handler. The index table (DD/FD)
//! only lists opcodes that touch HL, H or L; every other entry falls back to
//! the unprefixed handler.

use tact_core::IoBus;

use super::{Z80, bit, extended, indexed, standard};
use crate::signals::{IndexMode, PrefixMode};

/// Instruction implementation. Operand fields are decoded from `cpu.opcode`.
pub(super) type Handler = fn(&mut Z80, &mut dyn IoBus);

/// Index-table entry.
#[derive(Clone, Copy)]
pub(super) enum Op {
    Exec(Handler),
    /// Same as the unprefixed opcode.
    Inherited,
}

macro_rules! table {
    ($entry:path) => {{
        let mut table = [$entry(0); 256];
        let mut op = 1;
        while op < 256 {
            table[op] = $entry(op as u8);
            op += 1;
        }
        table
    }};
}

static STANDARD: [Handler; 256] = table!(standard::entry);
static INDEXED: [Op; 256] = table!(indexed::entry);
static BIT: [Handler; 256] = table!(bit::entry);
static EXTENDED: [Handler; 256] = table!(extended::entry);

impl Z80 {
    /// Route a freshly fetched opcode byte through the prefix state.
    pub(super) fn dispatch(&mut self, bus: &mut dyn IoBus, opcode: u8) {
        self.opcode = opcode;
        match self.prefix {
            PrefixMode::Unprefixed => match opcode {
                0xDD => self.enter_prefix(PrefixMode::IndexPending, IndexMode::Ix),
                0xFD => self.enter_prefix(PrefixMode::IndexPending, IndexMode::Iy),
                0xCB => self.enter_prefix(PrefixMode::BitPrefixPending, IndexMode::None),
                0xED => self.enter_prefix(PrefixMode::ExtendedPrefixPending, IndexMode::None),
                _ => self.run(bus, STANDARD[usize::from(opcode)]),
            },
            PrefixMode::IndexPending => match opcode {
                // A later DD/FD overrides the earlier one.
                0xDD => self.enter_prefix(PrefixMode::IndexPending, IndexMode::Ix),
                0xFD => self.enter_prefix(PrefixMode::IndexPending, IndexMode::Iy),
                0xED => self.enter_prefix(PrefixMode::ExtendedPrefixPending, IndexMode::None),
                _ => match INDEXED[usize::from(opcode)] {
                    Op::Exec(handler) => self.run(bus, handler),
                    Op::Inherited => self.run(bus, STANDARD[usize::from(opcode)]),
                },
            },
            PrefixMode::BitPrefixPending => self.run(bus, BIT[usize::from(opcode)]),
            PrefixMode::ExtendedPrefixPending => self.run(bus, EXTENDED[usize::from(opcode)]),
        }
    }

    fn enter_prefix(&mut self, prefix: PrefixMode, index: IndexMode) {
        self.prefix = prefix;
        self.index = index;
        self.interrupt_blocked = true;
        self.in_progress = true;
    }

    fn run(&mut self, bus: &mut dyn IoBus, handler: Handler) {
        self.interrupt_blocked = false;
        handler(self, bus);
        self.prefix = PrefixMode::Unprefixed;
        self.index = IndexMode::None;
        self.in_progress = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_table_overrides_only_hl_forms() {
        for op in [0x00, 0x01, 0x3E, 0x41, 0x76, 0x80, 0xC3, 0xD9, 0xEB] {
            assert!(matches!(INDEXED[op], Op::Inherited), "{op:#04X}");
        }
        for op in [0x21, 0x24, 0x34, 0x46, 0x66, 0x74, 0x84, 0x86, 0xCB, 0xE9] {
            assert!(matches!(INDEXED[op], Op::Exec(_)), "{op:#04X}");
        }
    }
}
