//! Signal handling between instructions.
//!
//! Checked at the start of every cycle, in priority order: maskable
//! interrupt, halted NOP, reset, NMI. A pending reset or NMI ends the halted
//! NOP loop instead of waiting behind it. At most one signal is serviced per
//! cycle, and servicing one replaces the opcode fetch.

use log::trace;
use tact_core::{Cpu, IoBus};

use super::Z80;
use crate::signals::Signals;

impl Z80 {
    /// Returns true if a signal consumed this cycle.
    pub(super) fn process_signals(&mut self, bus: &mut dyn IoBus) -> bool {
        if self.signals.is_empty() {
            return false;
        }

        if self.signals.contains(Signals::INT) && self.regs.iff1 && !self.interrupt_blocked {
            self.acknowledge_interrupt(bus);
        } else if self.signals.contains(Signals::HALTED)
            && !self.signals.intersects(Signals::RESET | Signals::NMI)
        {
            // Halted: a NOP that still refreshes memory.
            self.regs.refresh();
            self.internal(4);
        } else if self.signals.contains(Signals::RESET) {
            self.reset();
        } else if self.signals.contains(Signals::NMI) && !self.in_progress {
            self.accept_nmi(bus);
        } else {
            return false;
        }
        true
    }

    fn leave_halt(&mut self) {
        if self.signals.contains(Signals::HALTED) {
            self.signals.remove(Signals::HALTED);
            self.regs.pc = self.regs.pc.wrapping_add(1);
        }
    }

    /// Maskable interrupt: 13 tacts in IM 0/1, 19 in IM 2.
    ///
    /// INT is level-triggered and stays asserted until the host clears it.
    fn acknowledge_interrupt(&mut self, bus: &mut dyn IoBus) {
        self.leave_halt();
        trace!(
            "z80: INT accepted at {} (IM {}, PC {:#06X})",
            self.tacts, self.regs.im, self.regs.pc
        );
        self.regs.iff1 = false;
        self.regs.iff2 = false;
        self.regs.refresh();
        // Acknowledge M1 with two wait states, then one more before the push.
        self.internal(6);
        self.internal(1);
        self.push(bus, self.regs.pc);

        let target = if self.regs.im == 2 {
            let pointer =
                (u16::from(self.regs.i) << 8) | u16::from(self.config.interrupt_vector_byte);
            self.read_mem_word(bus, pointer)
        } else {
            // IM 0 assumes 0xFF on the bus, which is RST 38h.
            0x0038
        };
        self.regs.wz = target;
        self.regs.pc = target;
    }

    /// Non-maskable interrupt: 11 tacts. Edge-triggered, so accepting it
    /// clears the request.
    fn accept_nmi(&mut self, bus: &mut dyn IoBus) {
        self.leave_halt();
        trace!("z80: NMI accepted at {} (PC {:#06X})", self.tacts, self.regs.pc);
        self.signals.remove(Signals::NMI);
        self.regs.iff2 = self.regs.iff1;
        self.regs.iff1 = false;
        self.regs.refresh();
        self.internal(5);
        self.push(bus, self.regs.pc);
        self.regs.wz = 0x0066;
        self.regs.pc = 0x0066;
    }
}
