//! Unprefixed instructions.
//!
//! Handlers that touch HL, H or L go through the index-aware register
//! accessors, so the index table reuses them for their IX/IY forms.

use log::trace;
use tact_core::IoBus;

use super::Z80;
use super::dispatch::Handler;
use crate::alu;
use crate::signals::Signals;

/// Handler for an unprefixed opcode.
pub(super) const fn entry(op: u8) -> Handler {
    let y = (op >> 3) & 7;
    let z = op & 7;
    match op {
        0x00 => nop,
        0x08 => ex_af,
        0x10 => djnz,
        0x18 => jr,
        0x20 | 0x28 | 0x30 | 0x38 => jr_cc,
        0x01 | 0x11 | 0x21 | 0x31 => ld_rr_nn,
        0x09 | 0x19 | 0x29 | 0x39 => add_hl_rr,
        0x02 | 0x12 => ld_indirect_a,
        0x0A | 0x1A => ld_a_indirect,
        0x22 => ld_nn_hl,
        0x2A => ld_hl_nn,
        0x32 => ld_nn_a,
        0x3A => ld_a_nn,
        0x03 | 0x13 | 0x23 | 0x33 => inc_rr,
        0x0B | 0x1B | 0x2B | 0x3B => dec_rr,
        0x34 => inc_hl_ind,
        0x35 => dec_hl_ind,
        0x36 => ld_hl_ind_n,
        0x07 | 0x0F | 0x17 | 0x1F => rotate_a,
        0x27 => daa,
        0x2F => cpl,
        0x37 => scf,
        0x3F => ccf,
        0x00..=0x3F => match z {
            4 => inc_r,
            5 => dec_r,
            _ => ld_r_n,
        },
        0x76 => halt,
        0x40..=0x7F if z == 6 => ld_r_hl,
        0x40..=0x7F if y == 6 => ld_hl_r,
        0x40..=0x7F => ld_r_r,
        0x80..=0xBF if z == 6 => alu_hl,
        0x80..=0xBF => alu_r,
        0xC9 => ret,
        0xCD => call,
        0xC3 => jp,
        0xD3 => out_n_a,
        0xDB => in_a_n,
        0xD9 => exx,
        0xE3 => ex_sp_hl,
        0xE9 => jp_hl,
        0xEB => ex_de_hl,
        0xF3 => di,
        0xFB => ei,
        0xF9 => ld_sp_hl,
        0xCB | 0xDD | 0xED | 0xFD => prefix,
        _ => match z {
            0 => ret_cc,
            1 => pop,
            2 => jp_cc,
            4 => call_cc,
            5 => push,
            6 => alu_n,
            _ => rst,
        },
    }
}

fn prefix(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    unreachable!("prefix byte {:#04X} reached the instruction table", cpu.opcode);
}

fn nop(_cpu: &mut Z80, _bus: &mut dyn IoBus) {}

fn halt(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    // Re-execute HALT until an interrupt moves PC past it.
    cpu.regs.pc = cpu.regs.pc.wrapping_sub(1);
    cpu.signals.insert(Signals::HALTED);
    trace!("z80: HALT at {:#06X}", cpu.regs.pc);
}

// === 8-bit loads ===

pub(super) fn ld_r_r(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    let value = cpu.reg8(cpu.opcode);
    cpu.set_reg8(cpu.opcode >> 3, value);
}

pub(super) fn ld_r_n(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let value = cpu.read_code(bus);
    cpu.set_reg8(cpu.opcode >> 3, value);
}

fn ld_r_hl(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let value = cpu.read_mem(bus, cpu.regs.hl());
    cpu.set_reg8(cpu.opcode >> 3, value);
}

fn ld_hl_r(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let value = cpu.reg8(cpu.opcode);
    cpu.write_mem(bus, cpu.regs.hl(), value);
}

fn ld_hl_ind_n(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let value = cpu.read_code(bus);
    cpu.write_mem(bus, cpu.regs.hl(), value);
}

/// `LD (BC),A` / `LD (DE),A`
fn ld_indirect_a(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.reg16(cpu.opcode >> 4);
    cpu.write_mem(bus, address, cpu.regs.a);
    cpu.regs.wz = (u16::from(cpu.regs.a) << 8) | (address.wrapping_add(1) & 0x00FF);
}

/// `LD A,(BC)` / `LD A,(DE)`
fn ld_a_indirect(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.reg16(cpu.opcode >> 4);
    cpu.regs.a = cpu.read_mem(bus, address);
    cpu.regs.wz = address.wrapping_add(1);
}

fn ld_nn_a(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.read_code_word(bus);
    cpu.write_mem(bus, address, cpu.regs.a);
    cpu.regs.wz = (u16::from(cpu.regs.a) << 8) | (address.wrapping_add(1) & 0x00FF);
}

fn ld_a_nn(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.read_code_word(bus);
    cpu.regs.a = cpu.read_mem(bus, address);
    cpu.regs.wz = address.wrapping_add(1);
}

// === 16-bit loads ===

pub(super) fn ld_rr_nn(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let value = cpu.read_code_word(bus);
    cpu.set_reg16(cpu.opcode >> 4, value);
}

pub(super) fn ld_nn_hl(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.read_code_word(bus);
    cpu.write_mem_word(bus, address, cpu.index_reg());
    cpu.regs.wz = address.wrapping_add(1);
}

pub(super) fn ld_hl_nn(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.read_code_word(bus);
    let value = cpu.read_mem_word(bus, address);
    cpu.set_index_reg(value);
    cpu.regs.wz = address.wrapping_add(1);
}

pub(super) fn ld_sp_hl(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.internal(2);
    cpu.regs.sp = cpu.index_reg();
}

pub(super) fn push(cpu: &mut Z80, bus: &mut dyn IoBus) {
    cpu.internal(1);
    let value = cpu.reg16_af(cpu.opcode >> 4);
    cpu.push(bus, value);
}

pub(super) fn pop(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let value = cpu.pop(bus);
    cpu.set_reg16_af(cpu.opcode >> 4, value);
}

// === Exchanges ===

fn ex_af(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.regs.exchange_af();
}

fn exx(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.regs.exchange_main();
}

/// Always HL, even under DD/FD.
fn ex_de_hl(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    let de = cpu.regs.de();
    cpu.regs.set_de(cpu.regs.hl());
    cpu.regs.set_hl(de);
}

pub(super) fn ex_sp_hl(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let sp = cpu.regs.sp;
    let value = cpu.read_mem_word(bus, sp);
    cpu.internal(1);
    let [lo, hi] = cpu.index_reg().to_le_bytes();
    cpu.write_mem(bus, sp.wrapping_add(1), hi);
    cpu.write_mem(bus, sp, lo);
    cpu.internal(2);
    cpu.set_index_reg(value);
    cpu.regs.wz = value;
}

// === 8-bit arithmetic ===

pub(super) fn alu_r(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    let value = cpu.reg8(cpu.opcode);
    alu::accumulate(&mut cpu.regs, cpu.opcode >> 3, value);
}

fn alu_hl(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let value = cpu.read_mem(bus, cpu.regs.hl());
    alu::accumulate(&mut cpu.regs, cpu.opcode >> 3, value);
}

fn alu_n(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let value = cpu.read_code(bus);
    alu::accumulate(&mut cpu.regs, cpu.opcode >> 3, value);
}

pub(super) fn inc_r(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    let r = cpu.opcode >> 3;
    let value = cpu.reg8(r);
    let value = alu::inc8(&mut cpu.regs, value);
    cpu.set_reg8(r, value);
}

pub(super) fn dec_r(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    let r = cpu.opcode >> 3;
    let value = cpu.reg8(r);
    let value = alu::dec8(&mut cpu.regs, value);
    cpu.set_reg8(r, value);
}

fn inc_hl_ind(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.regs.hl();
    let value = cpu.read_mem(bus, address);
    cpu.internal(1);
    let value = alu::inc8(&mut cpu.regs, value);
    cpu.write_mem(bus, address, value);
}

fn dec_hl_ind(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.regs.hl();
    let value = cpu.read_mem(bus, address);
    cpu.internal(1);
    let value = alu::dec8(&mut cpu.regs, value);
    cpu.write_mem(bus, address, value);
}

fn daa(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    alu::daa(&mut cpu.regs);
}

fn cpl(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    alu::cpl(&mut cpu.regs);
}

fn scf(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    alu::scf(&mut cpu.regs);
}

fn ccf(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    alu::ccf(&mut cpu.regs);
}

fn rotate_a(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    alu::rotate_accumulator(&mut cpu.regs, cpu.opcode >> 3);
}

// === 16-bit arithmetic ===

pub(super) fn add_hl_rr(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.internal(7);
    let left = cpu.index_reg();
    let right = cpu.reg16(cpu.opcode >> 4);
    let result = alu::add16(&mut cpu.regs, left, right);
    cpu.set_index_reg(result);
    cpu.regs.wz = left.wrapping_add(1);
}

pub(super) fn inc_rr(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.internal(2);
    let rp = cpu.opcode >> 4;
    cpu.set_reg16(rp, cpu.reg16(rp).wrapping_add(1));
}

pub(super) fn dec_rr(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.internal(2);
    let rp = cpu.opcode >> 4;
    cpu.set_reg16(rp, cpu.reg16(rp).wrapping_sub(1));
}

// === Jumps ===

fn jp(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let target = cpu.read_code_word(bus);
    cpu.regs.wz = target;
    cpu.regs.pc = target;
}

/// Always 10 tacts; the target is read either way.
fn jp_cc(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let target = cpu.read_code_word(bus);
    cpu.regs.wz = target;
    if cpu.condition(cpu.opcode >> 3) {
        cpu.regs.pc = target;
    }
}

pub(super) fn jp_hl(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.regs.pc = cpu.index_reg();
}

/// Read the displacement and, if `taken`, jump relative to the next
/// instruction after the five-tact delay.
fn relative_jump(cpu: &mut Z80, bus: &mut dyn IoBus, taken: bool) {
    let displacement_address = cpu.regs.pc;
    let e = cpu.read_code(bus) as i8;
    if taken {
        cpu.relative_jump_delay(bus, displacement_address);
        let target = cpu.regs.pc.wrapping_add_signed(i16::from(e));
        cpu.regs.wz = target;
        cpu.regs.pc = target;
    }
}

fn jr(cpu: &mut Z80, bus: &mut dyn IoBus) {
    relative_jump(cpu, bus, true);
}

fn jr_cc(cpu: &mut Z80, bus: &mut dyn IoBus) {
    // Only NZ Z NC C are encodable.
    let taken = cpu.condition((cpu.opcode >> 3) & 3);
    relative_jump(cpu, bus, taken);
}

fn djnz(cpu: &mut Z80, bus: &mut dyn IoBus) {
    cpu.internal(1);
    cpu.regs.b = cpu.regs.b.wrapping_sub(1);
    let taken = cpu.regs.b != 0;
    relative_jump(cpu, bus, taken);
}

// === Calls and returns ===

fn call(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let target = cpu.read_code_word(bus);
    cpu.regs.wz = target;
    cpu.internal(1);
    cpu.push(bus, cpu.regs.pc);
    cpu.regs.pc = target;
}

fn call_cc(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let target = cpu.read_code_word(bus);
    cpu.regs.wz = target;
    if cpu.condition(cpu.opcode >> 3) {
        cpu.internal(1);
        cpu.push(bus, cpu.regs.pc);
        cpu.regs.pc = target;
    }
}

fn ret(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let target = cpu.pop(bus);
    cpu.regs.wz = target;
    cpu.regs.pc = target;
}

fn ret_cc(cpu: &mut Z80, bus: &mut dyn IoBus) {
    cpu.internal(1);
    if cpu.condition(cpu.opcode >> 3) {
        ret(cpu, bus);
    }
}

fn rst(cpu: &mut Z80, bus: &mut dyn IoBus) {
    cpu.internal(1);
    cpu.push(bus, cpu.regs.pc);
    let target = u16::from(cpu.opcode & 0x38);
    cpu.regs.wz = target;
    cpu.regs.pc = target;
}

// === I/O ===

fn out_n_a(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let n = cpu.read_code(bus);
    let a = cpu.regs.a;
    let port = (u16::from(a) << 8) | u16::from(n);
    cpu.write_port(bus, port, a);
    cpu.regs.wz = (u16::from(a) << 8) | u16::from(n.wrapping_add(1));
}

fn in_a_n(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let n = cpu.read_code(bus);
    let port = (u16::from(cpu.regs.a) << 8) | u16::from(n);
    cpu.regs.a = cpu.read_port(bus, port);
    cpu.regs.wz = port.wrapping_add(1);
}

// === Interrupt control ===

fn di(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.regs.iff1 = false;
    cpu.regs.iff2 = false;
}

/// Interrupts stay blocked until the next instruction has been fetched.
fn ei(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.regs.iff1 = true;
    cpu.regs.iff2 = true;
    cpu.interrupt_blocked = true;
}
