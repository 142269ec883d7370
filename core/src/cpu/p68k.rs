//! P68K: the master-clock wrapper around an opaque 68000 interpreter core.
//!
//! Grounded in the reference emulator's `CpuM68K` wrapper (`_running`,
//! `_delta`), adopting the last of its three historical revisions per the
//! documented open question: `clock()` reflects the interpreter's own
//! committed cycle count, and `delta` banks the master-clock remainder
//! across timeslices rather than being recomputed from scratch each call.

use super::{Cpu, CpuStateTrait, M68kState};
use crate::core::bus::InterruptState;

/// The 68000 interpreter itself — out of scope. A real implementation
/// plugs in a binding to an external core (e.g. Musashi); this trait is
/// the seam P68k dispatches through.
pub trait M68kCore {
    /// Execute up to `cycles` CPU cycles, return cycles actually consumed.
    /// Normally equal to `cycles`; may come up short only if the core hit
    /// an unrecoverable condition (never happens for a STOP instruction,
    /// which the core is expected to idle through internally).
    fn step(&mut self, cycles: u32) -> u32;

    /// Forward an interrupt request at the given 68000 priority level
    /// (1..7; 0 clears the request). Recognized by the core at its next
    /// instruction boundary.
    fn set_irq(&mut self, level: u8);

    /// Fetch the reset vectors and initialize registers.
    fn pulse_reset(&mut self);

    fn snapshot(&self) -> M68kState;
    fn restore(&mut self, state: &M68kState);

    /// True while executing a STOP instruction (interrupts still serviced).
    fn is_stopped(&self) -> bool {
        false
    }
}

pub struct P68k<C> {
    core: C,
    /// Master-clock dots the wrapper has accounted for so far.
    clock_dots: u64,
    /// Dots banked from a previous `run()` that weren't an exact multiple
    /// of 7 (the 68000's master-clock divisor), carried to the next call.
    delta: i64,
}

impl<C: M68kCore> P68k<C> {
    pub const CLOCK_DIVISOR: u64 = 7;

    pub fn new(core: C) -> Self {
        P68k {
            core,
            clock_dots: 0,
            delta: 0,
        }
    }

    pub fn core(&self) -> &C {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut C {
        &mut self.core
    }

    /// Master-clock position this wrapper has run up to.
    pub fn clock(&self) -> u64 {
        self.clock_dots
    }

    /// Run the 68000 up to `target_dots` on the master clock. Returns the
    /// number of CPU cycles actually executed.
    ///
    /// Caller invariant: no 68K->VDP DMA may be in progress when `run`
    /// is entered (the DMA engine burns the clock instead via `burn`).
    pub fn run(&mut self, target_dots: u64) -> u32 {
        let available = (target_dots as i64 - self.clock_dots as i64) + self.delta;
        let cycles = (available / Self::CLOCK_DIVISOR as i64).max(0) as u32;
        let actual = self.core.step(cycles);
        self.clock_dots = target_dots;
        self.delta = available - (actual as i64) * Self::CLOCK_DIVISOR as i64;
        actual
    }

    /// Advance the clock without executing instructions (used by the VDP
    /// FIFO/DMA engine to force the 68K to wait out a bus stall).
    pub fn burn(&mut self, target_dots: u64) {
        self.clock_dots = target_dots;
        self.delta = 0;
    }

    /// Forward an interrupt request to the core.
    pub fn irq(&mut self, level: u8) {
        self.core.set_irq(level);
    }
}

impl<C: M68kCore> Cpu for P68k<C> {
    fn reset(&mut self) {
        self.core.pulse_reset();
        self.clock_dots = 0;
        self.delta = 0;
    }

    fn signal_interrupt(&mut self, int: InterruptState) {
        self.core.set_irq(int.irq_level);
    }

    fn is_sleeping(&self) -> bool {
        self.core.is_stopped()
    }
}

impl<C: M68kCore> CpuStateTrait for P68k<C> {
    type Snapshot = M68kState;

    fn snapshot(&self) -> M68kState {
        self.core.snapshot()
    }

    fn restore(&mut self, snapshot: &M68kState) {
        self.core.restore(snapshot);
    }
}

/// A no-op 68000 core: consumes the requested cycles without executing
/// anything. Exercises `P68k`'s clock bookkeeping in isolation, and doubles
/// as the placeholder binding `frontend` links against until a real 68000
/// interpreter (e.g. a Musashi binding) is wired in — the decoder itself is
/// out of scope for this crate.
pub mod stub {
    use super::*;

    #[derive(Default)]
    pub struct NullM68kCore {
        pub state: M68kState,
        pub irq_level: u8,
        pub reset_count: u32,
    }

    impl M68kCore for NullM68kCore {
        fn step(&mut self, cycles: u32) -> u32 {
            cycles
        }
        fn set_irq(&mut self, level: u8) {
            self.irq_level = level;
        }
        fn pulse_reset(&mut self) {
            self.reset_count += 1;
        }
        fn snapshot(&self) -> M68kState {
            self.state
        }
        fn restore(&mut self, state: &M68kState) {
            self.state = *state;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::stub::NullM68kCore;
    use super::*;

    #[test]
    fn run_converts_dots_to_cycles_and_banks_remainder() {
        let mut cpu = P68k::new(NullM68kCore::default());
        let executed = cpu.run(10);
        assert_eq!(executed, 1); // floor(10/7) = 1
        assert_eq!(cpu.clock(), 10);

        // remainder of 3 dots should be banked and added to the next run
        let executed = cpu.run(17); // +7 dots => 10 banked => 1 more cycle
        assert_eq!(executed, 1);
        assert_eq!(cpu.clock(), 17);
    }

    #[test]
    fn burn_advances_clock_without_executing() {
        let mut cpu = P68k::new(NullM68kCore::default());
        cpu.burn(100);
        assert_eq!(cpu.clock(), 100);
        assert_eq!(cpu.core().reset_count, 0);
    }

    #[test]
    fn irq_forwards_to_core() {
        let mut cpu = P68k::new(NullM68kCore::default());
        cpu.irq(4);
        assert_eq!(cpu.core().irq_level, 4);
    }
}
