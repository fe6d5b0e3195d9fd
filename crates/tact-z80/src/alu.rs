//! ALU operations.
//!
//! Every function reads the accumulator and flags from the register file and
//! writes the result back. The 8-bit arithmetic and logic paths are pure
//! table lookups.

use crate::flags::{CF, HF, NF, PF, SF, XF, YF, ZF, sz53p};
use crate::registers::Registers;
use crate::tables::{
    ADC_FLAGS, DAA_RESULTS, DEC_FLAGS, INC_FLAGS, LOGIC_FLAGS, SBC_FLAGS, arith_index, daa_index,
};

/// `ADD A,v`
pub fn add(regs: &mut Registers, value: u8) {
    regs.f = ADC_FLAGS[arith_index(false, regs.a, value)];
    regs.a = regs.a.wrapping_add(value);
}

/// `ADC A,v`
pub fn adc(regs: &mut Registers, value: u8) {
    let carry = regs.carry();
    regs.f = ADC_FLAGS[arith_index(carry, regs.a, value)];
    regs.a = regs.a.wrapping_add(value).wrapping_add(u8::from(carry));
}

/// `SUB v`
pub fn sub(regs: &mut Registers, value: u8) {
    regs.f = SBC_FLAGS[arith_index(false, regs.a, value)];
    regs.a = regs.a.wrapping_sub(value);
}

/// `SBC A,v`
pub fn sbc(regs: &mut Registers, value: u8) {
    let carry = regs.carry();
    regs.f = SBC_FLAGS[arith_index(carry, regs.a, value)];
    regs.a = regs.a.wrapping_sub(value).wrapping_sub(u8::from(carry));
}

/// `AND v`
pub fn and(regs: &mut Registers, value: u8) {
    regs.a &= value;
    regs.f = LOGIC_FLAGS[regs.a as usize] | HF;
}

/// `XOR v`
pub fn xor(regs: &mut Registers, value: u8) {
    regs.a ^= value;
    regs.f = LOGIC_FLAGS[regs.a as usize];
}

/// `OR v`
pub fn or(regs: &mut Registers, value: u8) {
    regs.a |= value;
    regs.f = LOGIC_FLAGS[regs.a as usize];
}

/// `CP v` - flags exactly as `SUB v`, accumulator untouched.
pub fn cp(regs: &mut Registers, value: u8) {
    regs.f = SBC_FLAGS[arith_index(false, regs.a, value)];
}

/// Run the accumulator operation selected by opcode bits 5-3.
pub fn accumulate(regs: &mut Registers, op: u8, value: u8) {
    match op & 7 {
        0 => add(regs, value),
        1 => adc(regs, value),
        2 => sub(regs, value),
        3 => sbc(regs, value),
        4 => and(regs, value),
        5 => xor(regs, value),
        6 => or(regs, value),
        7 => cp(regs, value),
        _ => unreachable!(),
    }
}

/// `INC v` - returns the result, carry preserved.
pub fn inc8(regs: &mut Registers, value: u8) -> u8 {
    regs.f = (regs.f & CF) | INC_FLAGS[value as usize];
    value.wrapping_add(1)
}

/// `DEC v` - returns the result, carry preserved.
pub fn dec8(regs: &mut Registers, value: u8) -> u8 {
    regs.f = (regs.f & CF) | DEC_FLAGS[value as usize];
    value.wrapping_sub(1)
}

/// `ADD rr,rr` - S, Z and P/V are left alone.
pub fn add16(regs: &mut Registers, left: u16, right: u16) -> u16 {
    let sum = u32::from(left) + u32::from(right);
    let result = sum as u16;

    let mut f = regs.f & (SF | ZF | PF);
    f |= ((result >> 8) as u8) & (YF | XF);
    if (left & 0x0FFF) + (right & 0x0FFF) > 0x0FFF {
        f |= HF;
    }
    if sum > 0xFFFF {
        f |= CF;
    }
    regs.f = f;
    result
}

/// `ADC HL,rr`
pub fn adc16(regs: &mut Registers, left: u16, right: u16) -> u16 {
    let c = u32::from(regs.carry());
    let sum = u32::from(left) + u32::from(right) + c;
    let result = sum as u16;

    let mut f = ((result >> 8) as u8) & (SF | YF | XF);
    if result == 0 {
        f |= ZF;
    }
    if u32::from(left & 0x0FFF) + u32::from(right & 0x0FFF) + c > 0x0FFF {
        f |= HF;
    }
    if (left ^ right) & 0x8000 == 0 && (left ^ result) & 0x8000 != 0 {
        f |= PF;
    }
    if sum > 0xFFFF {
        f |= CF;
    }
    regs.f = f;
    result
}

/// `SBC HL,rr`
pub fn sbc16(regs: &mut Registers, left: u16, right: u16) -> u16 {
    let c = u16::from(regs.carry());
    let result = left.wrapping_sub(right).wrapping_sub(c);

    let mut f = NF | (((result >> 8) as u8) & (SF | YF | XF));
    if result == 0 {
        f |= ZF;
    }
    if (left & 0x0FFF) < (right & 0x0FFF) + c {
        f |= HF;
    }
    if (left ^ right) & 0x8000 != 0 && (left ^ result) & 0x8000 != 0 {
        f |= PF;
    }
    if u32::from(left) < u32::from(right) + u32::from(c) {
        f |= CF;
    }
    regs.f = f;
    result
}

/// `DAA`
pub fn daa(regs: &mut Registers) {
    regs.set_af(DAA_RESULTS[daa_index(regs.a, regs.f)]);
}

/// `NEG`
pub fn neg(regs: &mut Registers) {
    let value = regs.a;
    regs.a = 0;
    sub(regs, value);
}

/// `CPL`
pub fn cpl(regs: &mut Registers) {
    regs.a = !regs.a;
    regs.f = (regs.f & (SF | ZF | PF | CF)) | HF | NF | (regs.a & (YF | XF));
}

/// `SCF`
pub fn scf(regs: &mut Registers) {
    regs.f = (regs.f & (SF | ZF | PF)) | CF | (regs.a & (YF | XF));
}

/// `CCF` - H takes the old carry.
pub fn ccf(regs: &mut Registers) {
    let carry = regs.f & CF;
    let mut f = (regs.f & (SF | ZF | PF)) | (regs.a & (YF | XF));
    if carry != 0 {
        f |= HF;
    } else {
        f |= CF;
    }
    regs.f = f;
}

/// Accumulator rotates (`RLCA`, `RRCA`, `RLA`, `RRA`) selected by opcode
/// bits 4-3. S, Z and P/V are preserved.
pub fn rotate_accumulator(regs: &mut Registers, op: u8) {
    let a = regs.a;
    let carry_in = regs.f & CF;
    let (result, carry_out) = match op & 3 {
        0 => (a.rotate_left(1), a >> 7),
        1 => (a.rotate_right(1), a & 1),
        2 => ((a << 1) | carry_in, a >> 7),
        3 => ((a >> 1) | (carry_in << 7), a & 1),
        _ => unreachable!(),
    };
    regs.a = result;
    regs.f = (regs.f & (SF | ZF | PF)) | (result & (YF | XF)) | carry_out;
}

/// CB-space rotate/shift selected by opcode bits 5-3
/// (`RLC RRC RL RR SLA SRA SLL SRL`). Returns the result; F is replaced.
pub fn rotate_shift(regs: &mut Registers, op: u8, value: u8) -> u8 {
    let carry_in = regs.f & CF;
    let (result, carry_out) = match op & 7 {
        0 => (value.rotate_left(1), value >> 7),
        1 => (value.rotate_right(1), value & 1),
        2 => ((value << 1) | carry_in, value >> 7),
        3 => ((value >> 1) | (carry_in << 7), value & 1),
        4 => (value << 1, value >> 7),
        5 => ((value >> 1) | (value & 0x80), value & 1),
        6 => ((value << 1) | 1, value >> 7),
        7 => (value >> 1, value & 1),
        _ => unreachable!(),
    };
    regs.f = sz53p(result) | carry_out;
    result
}

/// `BIT n,v`. `undocumented` supplies bits 5 and 3: the operand for
/// register forms, the high byte of the address latch for memory forms.
pub fn bit(regs: &mut Registers, n: u8, value: u8, undocumented: u8) {
    let set = value & (1 << (n & 7));
    let mut f = (regs.f & CF) | HF | (undocumented & (YF | XF));
    if set == 0 {
        f |= ZF | PF;
    }
    if n & 7 == 7 && set != 0 {
        f |= SF;
    }
    regs.f = f;
}
