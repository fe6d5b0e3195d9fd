//! ED-prefixed instructions.
//!
//! Undefined opcodes in ED space execute as 8-tact NOPs.

use log::trace;
use tact_core::IoBus;

use super::Z80;
use super::dispatch::Handler;
use crate::alu;
use crate::flags::{CF, HF, NF, PF, SF, XF, YF, ZF, parity, sz53, sz53p};

pub(super) const fn entry(op: u8) -> Handler {
    match op {
        0x40..=0x7F => match op & 7 {
            0 => in_r_c,
            1 => out_c_r,
            2 if op & 0x08 == 0 => sbc_hl_rr,
            2 => adc_hl_rr,
            3 if op & 0x08 == 0 => ld_nn_rr,
            3 => ld_rr_nn,
            4 => neg,
            5 => retn,
            6 => im,
            _ => match op {
                0x47 => ld_i_a,
                0x4F => ld_r_a,
                0x57 => ld_a_i,
                0x5F => ld_a_r,
                0x67 => rrd,
                0x6F => rld,
                _ => undefined,
            },
        },
        0xA0 | 0xA8 | 0xB0 | 0xB8 => ldi,
        0xA1 | 0xA9 | 0xB1 | 0xB9 => cpi,
        0xA2 | 0xAA | 0xB2 | 0xBA => ini,
        0xA3 | 0xAB | 0xB3 | 0xBB => outi,
        _ => undefined,
    }
}

fn undefined(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    trace!(
        "z80: undefined opcode ED {:02X} at {:#06X}",
        cpu.opcode,
        cpu.regs.pc.wrapping_sub(2)
    );
}

// === I/O through C ===

/// `IN r,(C)`. ED 70 only sets flags.
fn in_r_c(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let port = cpu.regs.bc();
    let value = cpu.read_port(bus, port);
    cpu.regs.f = (cpu.regs.f & CF) | sz53p(value);
    let r = cpu.opcode >> 3;
    if r & 7 != 6 {
        cpu.set_plain_reg8(r, value);
    }
    cpu.regs.wz = port.wrapping_add(1);
}

/// `OUT (C),r`. ED 71 outputs zero.
fn out_c_r(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let port = cpu.regs.bc();
    let r = cpu.opcode >> 3;
    let value = if r & 7 == 6 { 0 } else { cpu.plain_reg8(r) };
    cpu.write_port(bus, port, value);
    cpu.regs.wz = port.wrapping_add(1);
}

// === 16-bit arithmetic and loads ===

fn sbc_hl_rr(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.internal(7);
    let left = cpu.regs.hl();
    let right = cpu.reg16(cpu.opcode >> 4);
    let result = alu::sbc16(&mut cpu.regs, left, right);
    cpu.regs.set_hl(result);
    cpu.regs.wz = left.wrapping_add(1);
}

fn adc_hl_rr(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.internal(7);
    let left = cpu.regs.hl();
    let right = cpu.reg16(cpu.opcode >> 4);
    let result = alu::adc16(&mut cpu.regs, left, right);
    cpu.regs.set_hl(result);
    cpu.regs.wz = left.wrapping_add(1);
}

/// `LD (nn),rr`
fn ld_nn_rr(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.read_code_word(bus);
    let value = cpu.reg16(cpu.opcode >> 4);
    cpu.write_mem_word(bus, address, value);
    cpu.regs.wz = address.wrapping_add(1);
}

/// `LD rr,(nn)`
fn ld_rr_nn(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.read_code_word(bus);
    let value = cpu.read_mem_word(bus, address);
    cpu.set_reg16(cpu.opcode >> 4, value);
    cpu.regs.wz = address.wrapping_add(1);
}

// === Accumulator and interrupt control ===

fn neg(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    alu::neg(&mut cpu.regs);
}

/// `RETN`, `RETI` and their mirrors: IFF1 is restored from IFF2.
fn retn(cpu: &mut Z80, bus: &mut dyn IoBus) {
    cpu.regs.iff1 = cpu.regs.iff2;
    let target = cpu.pop(bus);
    cpu.regs.wz = target;
    cpu.regs.pc = target;
}

fn im(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.regs.im = match (cpu.opcode >> 3) & 3 {
        0 | 1 => 0,
        2 => 1,
        _ => 2,
    };
}

fn ld_i_a(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.internal(1);
    cpu.regs.i = cpu.regs.a;
}

fn ld_r_a(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.internal(1);
    cpu.regs.r = cpu.regs.a;
}

/// P/V reports IFF2.
fn ld_a_special(cpu: &mut Z80, value: u8) {
    cpu.internal(1);
    cpu.regs.a = value;
    let mut f = (cpu.regs.f & CF) | sz53(value);
    if cpu.regs.iff2 {
        f |= PF;
    }
    cpu.regs.f = f;
}

fn ld_a_i(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    let value = cpu.regs.i;
    ld_a_special(cpu, value);
}

fn ld_a_r(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    let value = cpu.regs.r;
    ld_a_special(cpu, value);
}

/// `RRD`: rotate the low nibbles of A and (HL) right through (HL).
fn rrd(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.regs.hl();
    let value = cpu.read_mem(bus, address);
    cpu.internal(4);
    let a = cpu.regs.a;
    cpu.write_mem(bus, address, (a << 4) | (value >> 4));
    digit_rotate_done(cpu, (a & 0xF0) | (value & 0x0F), address);
}

/// `RLD`: rotate the low nibbles of A and (HL) left through (HL).
fn rld(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.regs.hl();
    let value = cpu.read_mem(bus, address);
    cpu.internal(4);
    let a = cpu.regs.a;
    cpu.write_mem(bus, address, (value << 4) | (a & 0x0F));
    digit_rotate_done(cpu, (a & 0xF0) | (value >> 4), address);
}

fn digit_rotate_done(cpu: &mut Z80, a: u8, address: u16) {
    cpu.regs.a = a;
    cpu.regs.f = (cpu.regs.f & CF) | sz53p(a);
    cpu.regs.wz = address.wrapping_add(1);
}

// === Block instructions ===
//
// Opcode bit 3 selects decrement, bit 4 selects repeat. A repeating form
// that has not finished rewinds PC onto its own prefix and spends five more
// tacts.

const fn block_step(op: u8) -> u16 {
    if op & 0x08 == 0 { 1 } else { 0xFFFF }
}

const fn block_repeats(op: u8) -> bool {
    op & 0x10 != 0
}

fn block_repeat(cpu: &mut Z80) {
    cpu.internal(5);
    cpu.regs.pc = cpu.regs.pc.wrapping_sub(2);
}

/// `LDI`, `LDD`, `LDIR`, `LDDR`
fn ldi(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let step = block_step(cpu.opcode);
    let hl = cpu.regs.hl();
    let de = cpu.regs.de();
    let value = cpu.read_mem(bus, hl);
    cpu.write_mem(bus, de, value);
    cpu.internal(2);
    cpu.regs.set_hl(hl.wrapping_add(step));
    cpu.regs.set_de(de.wrapping_add(step));
    let bc = cpu.regs.bc().wrapping_sub(1);
    cpu.regs.set_bc(bc);

    // Bits 5 and 3 come from A + value: bit 1 and bit 3 respectively.
    let n = cpu.regs.a.wrapping_add(value);
    let mut f = (cpu.regs.f & (SF | ZF | CF)) | (n & XF) | ((n << 4) & YF);
    if bc != 0 {
        f |= PF;
    }
    cpu.regs.f = f;

    if block_repeats(cpu.opcode) && bc != 0 {
        block_repeat(cpu);
        cpu.regs.wz = cpu.regs.pc.wrapping_add(1);
    }
}

/// `CPI`, `CPD`, `CPIR`, `CPDR`
fn cpi(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let step = block_step(cpu.opcode);
    let hl = cpu.regs.hl();
    let value = cpu.read_mem(bus, hl);
    cpu.internal(5);
    cpu.regs.set_hl(hl.wrapping_add(step));
    let bc = cpu.regs.bc().wrapping_sub(1);
    cpu.regs.set_bc(bc);
    cpu.regs.wz = cpu.regs.wz.wrapping_add(step);

    let a = cpu.regs.a;
    let result = a.wrapping_sub(value);
    let half = (a & 0x0F) < (value & 0x0F);
    let mut f = (cpu.regs.f & CF) | NF | (result & SF);
    if result == 0 {
        f |= ZF;
    }
    if half {
        f |= HF;
    }
    // Bits 5 and 3 come from result - H: bit 1 and bit 3 respectively.
    let n = result.wrapping_sub(u8::from(half));
    f |= (n & XF) | ((n << 4) & YF);
    if bc != 0 {
        f |= PF;
    }
    cpu.regs.f = f;

    if block_repeats(cpu.opcode) && bc != 0 && result != 0 {
        block_repeat(cpu);
        cpu.regs.wz = cpu.regs.pc.wrapping_add(1);
    }
}

/// Flags shared by the block I/O instructions. `k` is the transferred byte
/// plus the adjusted C (INI/IND) or L (OUTI/OUTD).
fn block_io_flags(cpu: &mut Z80, value: u8, k: u16) {
    let b = cpu.regs.b;
    let mut f = sz53(b);
    if value & 0x80 != 0 {
        f |= NF;
    }
    if k > 0xFF {
        f |= HF | CF;
    }
    if parity((k as u8 & 7) ^ b) {
        f |= PF;
    }
    cpu.regs.f = f;
}

/// `INI`, `IND`, `INIR`, `INDR`
fn ini(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let step = block_step(cpu.opcode);
    cpu.internal(1);
    let port = cpu.regs.bc();
    let value = cpu.read_port(bus, port);
    let hl = cpu.regs.hl();
    cpu.write_mem(bus, hl, value);
    cpu.regs.wz = port.wrapping_add(step);
    cpu.regs.b = cpu.regs.b.wrapping_sub(1);
    cpu.regs.set_hl(hl.wrapping_add(step));

    let c = cpu.regs.c.wrapping_add(step as u8);
    block_io_flags(cpu, value, u16::from(value) + u16::from(c));

    if block_repeats(cpu.opcode) && cpu.regs.b != 0 {
        block_repeat(cpu);
    }
}

/// `OUTI`, `OUTD`, `OTIR`, `OTDR`. B is decremented before the port write.
fn outi(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let step = block_step(cpu.opcode);
    cpu.internal(1);
    let hl = cpu.regs.hl();
    let value = cpu.read_mem(bus, hl);
    cpu.regs.b = cpu.regs.b.wrapping_sub(1);
    let port = cpu.regs.bc();
    cpu.write_port(bus, port, value);
    cpu.regs.wz = port.wrapping_add(step);
    cpu.regs.set_hl(hl.wrapping_add(step));

    let l = cpu.regs.l;
    block_io_flags(cpu, value, u16::from(value) + u16::from(l));

    if block_repeats(cpu.opcode) && cpu.regs.b != 0 {
        block_repeat(cpu);
    }
}
