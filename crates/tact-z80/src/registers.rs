//! Z80 register file.
//!
//! Registers are stored as individual bytes and pairs are composed on read,
//! so a pair always equals `(high << 8) | low` no matter which side was
//! written last.

use crate::flags::{CF, HF, NF, PF, SF, XF, YF, ZF};

/// Programmer-visible registers plus WZ and the interrupt flip-flops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Registers {
    // Main registers
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,

    // Alternate registers
    pub a_alt: u8,
    pub f_alt: u8,
    pub b_alt: u8,
    pub c_alt: u8,
    pub d_alt: u8,
    pub e_alt: u8,
    pub h_alt: u8,
    pub l_alt: u8,

    // Index registers
    pub ix: u16,
    pub iy: u16,

    // Other registers
    pub sp: u16,
    pub pc: u16,
    pub i: u8,
    pub r: u8,

    /// WZ/MEMPTR - internal address latch.
    /// Leaks into the undocumented flags of `BIT n,(HL)`.
    pub wz: u16,

    // Interrupt state
    pub iff1: bool,
    pub iff2: bool,
    pub im: u8,
}

const fn pair(high: u8, low: u8) -> u16 {
    (high as u16) << 8 | low as u16
}

const fn split(value: u16) -> (u8, u8) {
    ((value >> 8) as u8, value as u8)
}

impl Registers {
    #[must_use]
    pub const fn af(&self) -> u16 {
        pair(self.a, self.f)
    }

    #[must_use]
    pub const fn bc(&self) -> u16 {
        pair(self.b, self.c)
    }

    #[must_use]
    pub const fn de(&self) -> u16 {
        pair(self.d, self.e)
    }

    #[must_use]
    pub const fn hl(&self) -> u16 {
        pair(self.h, self.l)
    }

    #[must_use]
    pub const fn af_alt(&self) -> u16 {
        pair(self.a_alt, self.f_alt)
    }

    #[must_use]
    pub const fn bc_alt(&self) -> u16 {
        pair(self.b_alt, self.c_alt)
    }

    #[must_use]
    pub const fn de_alt(&self) -> u16 {
        pair(self.d_alt, self.e_alt)
    }

    #[must_use]
    pub const fn hl_alt(&self) -> u16 {
        pair(self.h_alt, self.l_alt)
    }

    pub fn set_af(&mut self, value: u16) {
        (self.a, self.f) = split(value);
    }

    pub fn set_bc(&mut self, value: u16) {
        (self.b, self.c) = split(value);
    }

    pub fn set_de(&mut self, value: u16) {
        (self.d, self.e) = split(value);
    }

    pub fn set_hl(&mut self, value: u16) {
        (self.h, self.l) = split(value);
    }

    pub fn set_af_alt(&mut self, value: u16) {
        (self.a_alt, self.f_alt) = split(value);
    }

    pub fn set_bc_alt(&mut self, value: u16) {
        (self.b_alt, self.c_alt) = split(value);
    }

    pub fn set_de_alt(&mut self, value: u16) {
        (self.d_alt, self.e_alt) = split(value);
    }

    pub fn set_hl_alt(&mut self, value: u16) {
        (self.h_alt, self.l_alt) = split(value);
    }

    // Index register halves

    #[must_use]
    pub const fn ixh(&self) -> u8 {
        (self.ix >> 8) as u8
    }

    #[must_use]
    pub const fn ixl(&self) -> u8 {
        self.ix as u8
    }

    #[must_use]
    pub const fn iyh(&self) -> u8 {
        (self.iy >> 8) as u8
    }

    #[must_use]
    pub const fn iyl(&self) -> u8 {
        self.iy as u8
    }

    pub fn set_ixh(&mut self, value: u8) {
        self.ix = pair(value, self.ixl());
    }

    pub fn set_ixl(&mut self, value: u8) {
        self.ix = pair(self.ixh(), value);
    }

    pub fn set_iyh(&mut self, value: u8) {
        self.iy = pair(value, self.iyl());
    }

    pub fn set_iyl(&mut self, value: u8) {
        self.iy = pair(self.iyh(), value);
    }

    #[must_use]
    pub const fn wzh(&self) -> u8 {
        (self.wz >> 8) as u8
    }

    #[must_use]
    pub const fn wzl(&self) -> u8 {
        self.wz as u8
    }

    pub fn set_wzh(&mut self, value: u8) {
        self.wz = pair(value, self.wzl());
    }

    pub fn set_wzl(&mut self, value: u8) {
        self.wz = pair(self.wzh(), value);
    }

    /// `EX AF,AF'`
    pub fn exchange_af(&mut self) {
        std::mem::swap(&mut self.a, &mut self.a_alt);
        std::mem::swap(&mut self.f, &mut self.f_alt);
    }

    /// `EXX`
    pub fn exchange_main(&mut self) {
        std::mem::swap(&mut self.b, &mut self.b_alt);
        std::mem::swap(&mut self.c, &mut self.c_alt);
        std::mem::swap(&mut self.d, &mut self.d_alt);
        std::mem::swap(&mut self.e, &mut self.e_alt);
        std::mem::swap(&mut self.h, &mut self.h_alt);
        std::mem::swap(&mut self.l, &mut self.l_alt);
    }

    /// Bump the memory refresh counter. Bit 7 is never touched.
    pub fn refresh(&mut self) {
        self.r = (self.r & 0x80) | (self.r.wrapping_add(1) & 0x7F);
    }

    // Flag views

    #[must_use]
    pub const fn sign(&self) -> bool {
        self.f & SF != 0
    }

    #[must_use]
    pub const fn zero(&self) -> bool {
        self.f & ZF != 0
    }

    #[must_use]
    pub const fn bit5(&self) -> bool {
        self.f & YF != 0
    }

    #[must_use]
    pub const fn half_carry(&self) -> bool {
        self.f & HF != 0
    }

    #[must_use]
    pub const fn bit3(&self) -> bool {
        self.f & XF != 0
    }

    #[must_use]
    pub const fn parity_overflow(&self) -> bool {
        self.f & PF != 0
    }

    #[must_use]
    pub const fn subtract(&self) -> bool {
        self.f & NF != 0
    }

    #[must_use]
    pub const fn carry(&self) -> bool {
        self.f & CF != 0
    }

    /// Set or clear the flag bits in `mask`.
    pub fn set_flag(&mut self, mask: u8, on: bool) {
        if on {
            self.f |= mask;
        } else {
            self.f &= !mask;
        }
    }
}
