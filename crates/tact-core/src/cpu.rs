//! CPU core trait.

use crate::{IoBus, Tacts};

/// A CPU core.
///
/// The bus is passed in, not owned, so the host can share it with other
/// devices between calls. Each `execute_cycle` performs one opcode fetch (or
/// one signal response) and runs to completion before returning.
pub trait Cpu {
    /// Immutable snapshot type returned by [`Cpu::state`].
    type State;

    /// Run one fetch/execute step or one signal response.
    fn execute_cycle<B: IoBus>(&mut self, bus: &mut B);

    /// Returns a snapshot of the whole visible state.
    fn state(&self) -> Self::State;

    /// Tacts elapsed since the last reset.
    fn tacts(&self) -> Tacts;

    /// Returns the current program counter.
    fn pc(&self) -> u16;

    /// Returns true if the CPU is parked on a HALT.
    fn is_halted(&self) -> bool;

    /// Add wait-state tacts on behalf of an external device.
    fn contention_delay(&mut self, tacts: u32);

    /// Assert the maskable interrupt line.
    fn interrupt(&mut self);

    /// Release the maskable interrupt line.
    fn clear_interrupt(&mut self);

    /// Request a non-maskable interrupt.
    fn nmi(&mut self);

    /// Assert the reset line; acted on at the next cycle.
    fn set_reset_signal(&mut self);

    /// Release the reset line.
    fn clear_reset_signal(&mut self);

    /// Reset the CPU immediately.
    fn reset(&mut self);
}
