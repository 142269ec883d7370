//! CPU wrapper layer: thin clock-accounting adapters around opaque
//! interpreter cores for the 68000, Z80 and YM2612. The interpreters
//! themselves are out of scope (external collaborators) — these wrappers
//! only own the master-clock bookkeeping, IRQ plumbing and (for the Z80)
//! the RESET/BUSREQ handshake described by the console's timing spine.

pub mod state;
pub use state::{CpuStateTrait, M68kState, Z80State};

pub mod p68k;
pub use p68k::{M68kCore, P68k};

pub mod pz80;
pub use pz80::{PZ80, Z80Core};

pub mod ym2612;
pub use ym2612::Ym2612Core;

use crate::core::bus::InterruptState;

/// Generic CPU wrapper interface shared by P68k and PZ80.
pub trait Cpu: CpuStateTrait {
    /// Reset vector fetch / interpreter reset.
    fn reset(&mut self);

    /// Signal a specific interrupt line (implementation-defined per CPU).
    fn signal_interrupt(&mut self, int: InterruptState);

    /// Query if the CPU is internally halted (STOP instruction, Z80 BUSREQ, ...).
    fn is_sleeping(&self) -> bool;
}
