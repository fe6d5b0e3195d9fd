use thiserror::Error;

/// Errors from host-facing configuration and test-support setters.
///
/// Instruction execution itself never fails.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Z80Error {
    #[error("interrupt mode must be 0, 1 or 2 (got {0})")]
    InvalidInterruptMode(u8),
    #[error("unknown contention mode: {0:?} (expected \"ula\" or \"gate-array\")")]
    UnknownContentionMode(String),
}
