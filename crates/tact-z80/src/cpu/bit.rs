//! CB-prefixed rotates, shifts and bit operations.

use tact_core::IoBus;

use super::Z80;
use super::dispatch::Handler;
use crate::alu;

pub(super) const fn entry(op: u8) -> Handler {
    let memory = op & 7 == 6;
    match op >> 6 {
        0 if memory => rotate_hl,
        0 => rotate_r,
        1 if memory => bit_hl,
        1 => bit_r,
        _ if memory => set_res_hl,
        _ => set_res_r,
    }
}

/// Apply RES (`op` bits 7-6 = 2) or SET (= 3) of bit `n`.
const fn set_res(op: u8, value: u8) -> u8 {
    let mask = 1 << ((op >> 3) & 7);
    if op & 0x40 == 0 {
        value & !mask
    } else {
        value | mask
    }
}

fn rotate_r(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    let value = cpu.plain_reg8(cpu.opcode);
    let result = alu::rotate_shift(&mut cpu.regs, cpu.opcode >> 3, value);
    cpu.set_plain_reg8(cpu.opcode, result);
}

fn rotate_hl(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.regs.hl();
    let value = cpu.read_mem(bus, address);
    cpu.internal(1);
    let result = alu::rotate_shift(&mut cpu.regs, cpu.opcode >> 3, value);
    cpu.write_mem(bus, address, result);
}

/// Undocumented bits 5 and 3 come from the operand.
fn bit_r(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    let value = cpu.plain_reg8(cpu.opcode);
    alu::bit(&mut cpu.regs, cpu.opcode >> 3, value, value);
}

/// Undocumented bits 5 and 3 leak from the high byte of WZ.
fn bit_hl(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let value = cpu.read_mem(bus, cpu.regs.hl());
    cpu.internal(1);
    let wzh = cpu.regs.wzh();
    alu::bit(&mut cpu.regs, cpu.opcode >> 3, value, wzh);
}

fn set_res_r(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    let value = set_res(cpu.opcode, cpu.plain_reg8(cpu.opcode));
    cpu.set_plain_reg8(cpu.opcode, value);
}

fn set_res_hl(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.regs.hl();
    let value = cpu.read_mem(bus, address);
    cpu.internal(1);
    cpu.write_mem(bus, address, set_res(cpu.opcode, value));
}
