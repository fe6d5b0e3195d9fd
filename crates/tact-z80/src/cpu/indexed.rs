//! DD/FD-prefixed instructions.
//!
//! HL becomes IX or IY, H and L become the index halves, and `(HL)` becomes
//! `(IX+d)`. A memory operand keeps the plain H and L for its register
//! operand: `LD H,(IX+d)` loads H, not IXH.

use tact_core::IoBus;

use super::dispatch::Op;
use super::{Z80, standard};
use crate::alu;

pub(super) const fn entry(op: u8) -> Op {
    let y = (op >> 3) & 7;
    let z = op & 7;
    let touches_hl = y == 4 || y == 5 || z == 4 || z == 5;
    match op {
        0x09 | 0x19 | 0x29 | 0x39 => Op::Exec(standard::add_hl_rr),
        0x21 => Op::Exec(standard::ld_rr_nn),
        0x22 => Op::Exec(standard::ld_nn_hl),
        0x2A => Op::Exec(standard::ld_hl_nn),
        0x23 => Op::Exec(standard::inc_rr),
        0x2B => Op::Exec(standard::dec_rr),
        0x24 | 0x2C => Op::Exec(standard::inc_r),
        0x25 | 0x2D => Op::Exec(standard::dec_r),
        0x26 | 0x2E => Op::Exec(standard::ld_r_n),
        0x34 => Op::Exec(inc_indexed),
        0x35 => Op::Exec(dec_indexed),
        0x36 => Op::Exec(ld_indexed_n),
        0x76 => Op::Inherited,
        0x40..=0x7F if z == 6 => Op::Exec(ld_r_indexed),
        0x40..=0x7F if y == 6 => Op::Exec(ld_indexed_r),
        0x40..=0x7F if touches_hl => Op::Exec(standard::ld_r_r),
        0x80..=0xBF if z == 6 => Op::Exec(alu_indexed),
        0x80..=0xBF if z == 4 || z == 5 => Op::Exec(standard::alu_r),
        0xCB => Op::Exec(indexed_bit),
        0xE1 => Op::Exec(standard::pop),
        0xE3 => Op::Exec(standard::ex_sp_hl),
        0xE5 => Op::Exec(standard::push),
        0xE9 => Op::Exec(standard::jp_hl),
        0xF9 => Op::Exec(standard::ld_sp_hl),
        _ => Op::Inherited,
    }
}

/// `LD r,(IX+d)`: 19 tacts.
fn ld_r_indexed(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.indexed_address(bus, 5);
    let value = cpu.read_mem(bus, address);
    cpu.set_plain_reg8(cpu.opcode >> 3, value);
}

/// `LD (IX+d),r`: 19 tacts.
fn ld_indexed_r(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.indexed_address(bus, 5);
    let value = cpu.plain_reg8(cpu.opcode);
    cpu.write_mem(bus, address, value);
}

/// `LD (IX+d),n`: the immediate follows the displacement, so only two
/// internal tacts remain after it.
fn ld_indexed_n(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.indexed_address(bus, 0);
    let value = cpu.read_code(bus);
    cpu.internal(2);
    cpu.write_mem(bus, address, value);
}

fn alu_indexed(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.indexed_address(bus, 5);
    let value = cpu.read_mem(bus, address);
    alu::accumulate(&mut cpu.regs, cpu.opcode >> 3, value);
}

fn inc_indexed(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.indexed_address(bus, 5);
    let value = cpu.read_mem(bus, address);
    cpu.internal(1);
    let value = alu::inc8(&mut cpu.regs, value);
    cpu.write_mem(bus, address, value);
}

fn dec_indexed(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.indexed_address(bus, 5);
    let value = cpu.read_mem(bus, address);
    cpu.internal(1);
    let value = alu::dec8(&mut cpu.regs, value);
    cpu.write_mem(bus, address, value);
}

/// `DD CB d op` / `FD CB d op`.
///
/// The displacement comes before the final opcode, and the opcode is read
/// as data: no M1 cycle and no R increment. BIT takes 20 tacts, everything
/// else 23. Non-`(HL)` register encodings also copy the result into that
/// register.
fn indexed_bit(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.indexed_address(bus, 0);
    let op = cpu.read_code(bus);
    cpu.internal(2);
    cpu.opcode = op;

    let n = (op >> 3) & 7;
    let value = cpu.read_mem(bus, address);
    cpu.internal(1);

    let result = match op >> 6 {
        0 => alu::rotate_shift(&mut cpu.regs, n, value),
        1 => {
            alu::bit(&mut cpu.regs, n, value, (address >> 8) as u8);
            return;
        }
        2 => value & !(1 << n),
        _ => value | (1 << n),
    };
    cpu.write_mem(bus, address, result);
    if op & 7 != 6 {
        cpu.set_plain_reg8(op, result);
    }
}
