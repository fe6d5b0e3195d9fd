//! CPU input signals and decode latches.

/// Bitmask of pending CPU signals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Signals(u8);

impl Signals {
    pub const NONE: Self = Self(0);
    /// Maskable interrupt line asserted.
    pub const INT: Self = Self(0x01);
    /// Non-maskable interrupt requested.
    pub const NMI: Self = Self(0x02);
    /// Reset line asserted.
    pub const RESET: Self = Self(0x04);
    /// Parked on a HALT instruction.
    pub const HALTED: Self = Self(0x08);

    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x0F)
    }

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if any bit of `other` is set.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

impl core::ops::BitOr for Signals {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Which index register a DD/FD prefix selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IndexMode {
    #[default]
    None,
    Ix,
    Iy,
}

/// Prefix-decode state between opcode fetches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PrefixMode {
    #[default]
    Unprefixed,
    /// DD or FD fetched; the next byte indexes the index table.
    IndexPending,
    /// CB fetched.
    BitPrefixPending,
    /// ED fetched.
    ExtendedPrefixPending,
}

impl PrefixMode {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Unprefixed => "none",
            Self::IndexPending => "index",
            Self::BitPrefixPending => "cb",
            Self::ExtendedPrefixPending => "ed",
        }
    }
}

impl IndexMode {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Ix => "ix",
            Self::Iy => "iy",
        }
    }
}
