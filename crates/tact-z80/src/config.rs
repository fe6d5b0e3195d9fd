//! Core configuration.

use std::str::FromStr;

use crate::Z80Error;

/// How the extra delay of a taken relative jump reaches the bus.
///
/// Both modes charge the same total tacts; they differ in the memory cycles
/// a contention-aware bus gets to see.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ContentionMode {
    /// Sinclair ULA machines: five 1-tact reads of the displacement address.
    #[default]
    Ula,
    /// Amstrad gate array (+2A/+3): one uncontended 5-tact delay.
    GateArray,
}

impl FromStr for ContentionMode {
    type Err = Z80Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ula" => Ok(Self::Ula),
            "gate-array" | "gatearray" | "gate_array" => Ok(Self::GateArray),
            _ => Err(Z80Error::UnknownContentionMode(s.to_string())),
        }
    }
}

/// Configuration for creating a [`crate::Z80`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Z80Config {
    pub contention: ContentionMode,
    /// Byte the interrupting device puts on the data bus during an IM 2
    /// acknowledge. 0xFF when nothing drives the bus.
    pub interrupt_vector_byte: u8,
}

impl Default for Z80Config {
    fn default() -> Self {
        Self {
            contention: ContentionMode::Ula,
            interrupt_vector_byte: 0xFF,
        }
    }
}

impl Z80Config {
    #[must_use]
    pub fn gate_array() -> Self {
        Self {
            contention: ContentionMode::GateArray,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn uses_gate_array_contention(&self) -> bool {
        matches!(self.contention, ContentionMode::GateArray)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_contention_mode() {
        assert_eq!("ula".parse(), Ok(ContentionMode::Ula));
        assert_eq!("Gate-Array".parse(), Ok(ContentionMode::GateArray));
        assert_eq!(
            "pentagon".parse::<ContentionMode>(),
            Err(Z80Error::UnknownContentionMode("pentagon".to_string()))
        );
    }

    #[test]
    fn defaults() {
        let config = Z80Config::default();
        assert!(!config.uses_gate_array_contention());
        assert_eq!(config.interrupt_vector_byte, 0xFF);
        assert!(Z80Config::gate_array().uses_gate_array_contention());
    }
}
