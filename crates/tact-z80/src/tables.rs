//! Precomputed flag tables.
//!
//! The 256-entry tables and the DAA table are built at compile time. The
//! ADC/SBC tables cover every `(carry, left, right)` triple (128 KiB each) and
//! are built once, on first use.

use std::sync::LazyLock;

use crate::flags::{CF, HF, NF, PF, sz53, sz53p};

/// Flags after `INC v`, indexed by the operand. Carry is not included.
pub static INC_FLAGS: [u8; 256] = build_inc();

/// Flags after `DEC v`, indexed by the operand. Carry is not included.
pub static DEC_FLAGS: [u8; 256] = build_dec();

/// S, Z, P/V (parity), 5 and 3 for a logical-operation result.
pub static LOGIC_FLAGS: [u8; 256] = build_logic();

/// `A:F` after DAA, indexed by [`daa_index`].
pub static DAA_RESULTS: [u16; 2048] = build_daa();

/// Flags of `left + right + carry`, indexed by [`arith_index`].
pub static ADC_FLAGS: LazyLock<Box<[u8]>> = LazyLock::new(build_adc);

/// Flags of `left - right - carry`, indexed by [`arith_index`].
pub static SBC_FLAGS: LazyLock<Box<[u8]>> = LazyLock::new(build_sbc);

/// Index into [`ADC_FLAGS`] / [`SBC_FLAGS`].
#[must_use]
#[inline]
pub const fn arith_index(carry: bool, left: u8, right: u8) -> usize {
    ((carry as usize) << 16) | ((left as usize) << 8) | right as usize
}

/// Index into [`DAA_RESULTS`] from the accumulator and current flags.
#[must_use]
#[inline]
pub const fn daa_index(a: u8, f: u8) -> usize {
    let hnc = ((f & HF) >> 2) | (f & (NF | CF));
    ((hnc as usize) << 8) | a as usize
}

const fn build_inc() -> [u8; 256] {
    let mut table = [0; 256];
    let mut v = 0;
    while v < 256 {
        let operand = v as u8;
        let mut f = sz53(operand.wrapping_add(1));
        if operand & 0x0F == 0x0F {
            f |= HF;
        }
        if operand == 0x7F {
            f |= PF;
        }
        table[v] = f;
        v += 1;
    }
    table
}

const fn build_dec() -> [u8; 256] {
    let mut table = [0; 256];
    let mut v = 0;
    while v < 256 {
        let operand = v as u8;
        let mut f = sz53(operand.wrapping_sub(1)) | NF;
        if operand & 0x0F == 0 {
            f |= HF;
        }
        if operand == 0x80 {
            f |= PF;
        }
        table[v] = f;
        v += 1;
    }
    table
}

const fn build_logic() -> [u8; 256] {
    let mut table = [0; 256];
    let mut v = 0;
    while v < 256 {
        table[v] = sz53p(v as u8);
        v += 1;
    }
    table
}

const fn build_daa() -> [u16; 2048] {
    let mut table = [0; 2048];
    let mut hnc = 0;
    while hnc < 8 {
        let carry = hnc & 1 != 0;
        let subtract = hnc & 2 != 0;
        let half = hnc & 4 != 0;
        let mut v = 0;
        while v < 256 {
            let a = v as u8;
            let low = a & 0x0F;

            let mut diff = 0u8;
            let mut carry_out = carry;
            if half || low > 9 {
                diff |= 0x06;
            }
            if carry || a > 0x99 {
                diff |= 0x60;
                carry_out = true;
            }

            let (result, half_out) = if subtract {
                (a.wrapping_sub(diff), half && low < 6)
            } else {
                (a.wrapping_add(diff), low > 9)
            };

            let mut f = sz53p(result);
            if carry_out {
                f |= CF;
            }
            if half_out {
                f |= HF;
            }
            if subtract {
                f |= NF;
            }
            table[(hnc << 8) | v] = ((result as u16) << 8) | f as u16;
            v += 1;
        }
        hnc += 1;
    }
    table
}

fn build_adc() -> Box<[u8]> {
    let mut table = vec![0u8; 0x2_0000];
    for carry in [false, true] {
        let c = u8::from(carry);
        for left in 0..=0xFFu8 {
            for right in 0..=0xFFu8 {
                let sum = u16::from(left) + u16::from(right) + u16::from(c);
                let result = sum as u8;
                let mut f = sz53(result);
                if (left & 0x0F) + (right & 0x0F) + c > 0x0F {
                    f |= HF;
                }
                if (left ^ right) & 0x80 == 0 && (left ^ result) & 0x80 != 0 {
                    f |= PF;
                }
                if sum > 0xFF {
                    f |= CF;
                }
                table[arith_index(carry, left, right)] = f;
            }
        }
    }
    table.into_boxed_slice()
}

fn build_sbc() -> Box<[u8]> {
    let mut table = vec![0u8; 0x2_0000];
    for carry in [false, true] {
        let c = u8::from(carry);
        for left in 0..=0xFFu8 {
            for right in 0..=0xFFu8 {
                let result = left.wrapping_sub(right).wrapping_sub(c);
                let mut f = sz53(result) | NF;
                if (left & 0x0F) < (right & 0x0F) + c {
                    f |= HF;
                }
                if (left ^ right) & 0x80 != 0 && (left ^ result) & 0x80 != 0 {
                    f |= PF;
                }
                if u16::from(left) < u16::from(right) + u16::from(c) {
                    f |= CF;
                }
                table[arith_index(carry, left, right)] = f;
            }
        }
    }
    table.into_boxed_slice()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{SF, XF, YF, ZF};

    #[test]
    fn inc_flags_edges() {
        assert_eq!(INC_FLAGS[0x7F], SF | HF | PF);
        assert_eq!(INC_FLAGS[0xFF], ZF | HF);
        assert_eq!(INC_FLAGS[0x27], YF | XF);
    }

    #[test]
    fn dec_flags_edges() {
        assert_eq!(DEC_FLAGS[0x80], HF | PF | NF | YF | XF);
        assert_eq!(DEC_FLAGS[0x01], ZF | NF);
        assert_eq!(DEC_FLAGS[0x00], SF | HF | NF | YF | XF);
    }

    #[test]
    fn logic_flags_report_parity() {
        assert_eq!(LOGIC_FLAGS[0x00], ZF | PF);
        assert_eq!(LOGIC_FLAGS[0x01], 0);
        assert_eq!(LOGIC_FLAGS[0x81], SF | PF);
    }

    #[test]
    fn adc_table_overflow_and_carry() {
        assert_eq!(ADC_FLAGS[arith_index(false, 0x7F, 0x01)], SF | HF | PF);
        assert_eq!(ADC_FLAGS[arith_index(false, 0xFF, 0x01)], ZF | HF | CF);
        assert_eq!(ADC_FLAGS[arith_index(true, 0x0F, 0x00)], HF);
    }

    #[test]
    fn sbc_table_borrow_and_overflow() {
        assert_eq!(SBC_FLAGS[arith_index(false, 0x00, 0x01)], SF | YF | HF | XF | NF | CF);
        assert_eq!(SBC_FLAGS[arith_index(false, 0x80, 0x01)], YF | HF | XF | PF | NF);
        assert_eq!(SBC_FLAGS[arith_index(true, 0x01, 0x00)], ZF | NF);
    }

    #[test]
    fn daa_after_bcd_add() {
        // 0x15 + 0x27 = 0x3C, DAA -> 0x42
        let r = DAA_RESULTS[daa_index(0x3C, 0)];
        assert_eq!(r >> 8, 0x42);
        assert_eq!(r as u8 & CF, 0);

        // 0x99 + 0x01 = 0x9A, DAA -> 0x00 with carry
        let r = DAA_RESULTS[daa_index(0x9A, 0)];
        assert_eq!(r >> 8, 0x00);
        assert_ne!(r as u8 & CF, 0);
        assert_ne!(r as u8 & ZF, 0);
    }

    #[test]
    fn daa_after_bcd_subtract() {
        // 0x00 - 0x01 = 0xFF with H, N, C -> 0x99
        let r = DAA_RESULTS[daa_index(0xFF, HF | NF | CF)];
        assert_eq!(r >> 8, 0x99);
        assert_eq!(r as u8 & (NF | CF), NF | CF);
    }
}
