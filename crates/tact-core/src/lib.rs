//! Core traits and types for tact-exact emulation.
//!
//! The CPU owns the tact counter. Every device that needs timing (video,
//! sound, tape) reads it and resynchronises; nothing else drives it.

mod bus;
mod cpu;
mod observable;
mod tacts;

pub use bus::{Bus, BusAccess, IO_CYCLE_TACTS, IoBus, IoResult, SimpleBus};
pub use cpu::Cpu;
pub use observable::{Observable, Value};
pub use tacts::Tacts;
