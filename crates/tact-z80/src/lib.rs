//! Tact-exact Z80 CPU core.
//!
//! Each call to `execute_cycle()` performs one opcode fetch, or one signal
//! response, and charges the exact number of tacts the hardware would.
//! Prefix bytes are separate cycles: interrupts cannot land between a
//! prefix and the opcode it modifies.

mod alu;
mod config;
mod cpu;
mod error;
mod flags;
mod registers;
mod signals;
mod state;
mod tables;

pub use config::{ContentionMode, Z80Config};
pub use cpu::Z80;
pub use error::Z80Error;
pub use flags::{CF, HF, NF, PF, SF, XF, YF, ZF};
pub use registers::Registers;
pub use signals::{IndexMode, PrefixMode, Signals};
pub use state::State;
#[cfg(feature = "test-utils")]
pub use state::TestSupport;
