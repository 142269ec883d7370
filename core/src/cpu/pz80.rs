//! PZ80: the master-clock wrapper around an opaque Z80 interpreter core,
//! including the RESET/BUSREQ handshake with the 68000.
//!
//! Grounded in the reference emulator's `CpuZ80` wrapper (`_reset_line`,
//! `_busreq_line`, `_reset_once`, `_reset_start`, `sync()`), which filters
//! reset pulses narrower than 8 Z80 cycles and jumps the Z80 clock forward
//! by 20 cycles when a qualifying reset edge completes.

use super::{Cpu, CpuStateTrait, Z80State};
use crate::core::bus::InterruptState;

/// The Z80 interpreter itself — out of scope.
pub trait Z80Core {
    /// Execute up to `cycles` Z80 cycles, return cycles actually consumed.
    fn step(&mut self, cycles: u32) -> u32;
    fn set_irq(&mut self, asserted: bool);
    fn set_nmi(&mut self, asserted: bool);
    fn pulse_reset(&mut self);
    fn snapshot(&self) -> Z80State;
    fn restore(&mut self, state: &Z80State);
}

pub struct PZ80<C> {
    core: C,
    clock_dots: u64,
    delta: i64,
    reset_line: bool,
    busreq_line: bool,
    reset_once: bool,
    reset_start_dots: Option<u64>,
}

impl<C: Z80Core> PZ80<C> {
    pub const CLOCK_DIVISOR: u64 = 14;
    /// Reset pulses shorter than this (in Z80 cycles) are ignored.
    pub const RESET_FILTER_CYCLES: u64 = 8;
    /// On a qualifying reset, the Z80 clock jumps forward by this many cycles.
    pub const RESET_CLOCK_JUMP_CYCLES: u64 = 20;

    pub fn new(core: C) -> Self {
        PZ80 {
            core,
            clock_dots: 0,
            delta: 0,
            reset_line: false,
            busreq_line: false,
            reset_once: false,
            reset_start_dots: None,
        }
    }

    pub fn core(&self) -> &C {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut C {
        &mut self.core
    }

    pub fn clock(&self) -> u64 {
        self.clock_dots
    }

    pub fn reset_once(&self) -> bool {
        self.reset_once
    }

    pub fn busreq_line(&self) -> bool {
        self.busreq_line
    }

    pub fn reset_line(&self) -> bool {
        self.reset_line
    }

    /// Z80 may fetch/execute only once it has seen a qualifying reset and
    /// is neither held in reset nor ceded to the 68K via BUSREQ.
    pub fn running(&self) -> bool {
        self.reset_once && !self.reset_line && !self.busreq_line
    }

    /// Drive the RESET line (true = asserted/active-low-reset-in-effect).
    /// `now_dots` is the current master-clock position.
    pub fn set_reset_line(&mut self, asserted: bool, now_dots: u64) {
        if asserted && !self.reset_line {
            self.reset_line = true;
            self.reset_start_dots = Some(now_dots);
        } else if !asserted && self.reset_line {
            self.reset_line = false;
            if let Some(start) = self.reset_start_dots.take() {
                let pulse_cycles = now_dots.saturating_sub(start) / Self::CLOCK_DIVISOR;
                if pulse_cycles >= Self::RESET_FILTER_CYCLES {
                    self.reset_once = true;
                    self.core.pulse_reset();
                    self.clock_dots = now_dots + Self::RESET_CLOCK_JUMP_CYCLES * Self::CLOCK_DIVISOR;
                    self.delta = 0;
                }
                // else: pulse too narrow, ignored entirely — no reset, no clock jump.
            }
        }
    }

    /// Drive the BUSREQ line. Synchronizes the Z80 clock to `now_dots`
    /// before mutating the handshake state, per the ordering guarantee that
    /// a write to the bus-control latch observes Z80-clock-now first.
    pub fn set_busreq(&mut self, active: bool, now_dots: u64) {
        self.sync(now_dots);
        self.busreq_line = active;
    }

    /// Keep the Z80 clock at or ahead of the 68K's current position.
    pub fn sync(&mut self, now_dots: u64) {
        if now_dots > self.clock_dots {
            self.clock_dots = now_dots;
            self.delta = 0;
        }
    }

    /// Run the Z80 up to `target_dots`. No-op (but still advances the
    /// accounted clock) while `!running()`.
    pub fn run(&mut self, target_dots: u64) -> u32 {
        if !self.running() {
            self.clock_dots = target_dots.max(self.clock_dots);
            self.delta = 0;
            return 0;
        }
        let available = (target_dots as i64 - self.clock_dots as i64) + self.delta;
        let cycles = (available / Self::CLOCK_DIVISOR as i64).max(0) as u32;
        let actual = self.core.step(cycles);
        self.clock_dots = target_dots;
        self.delta = available - actual as i64 * Self::CLOCK_DIVISOR as i64;
        actual
    }

    /// Assert or deassert the Z80 IRQ line (driven by the VDP's VINT logic).
    pub fn set_irq_line(&mut self, asserted: bool) {
        self.core.set_irq(asserted);
    }

    /// Reapply RESET/BUSREQ handshake lines restored from a save state,
    /// bypassing the reset-pulse filter in `set_reset_line` (the saved
    /// `reset_once` has already happened, so there's no pulse to measure).
    pub fn restore_handshake(&mut self, busreq: bool, reset: bool, now_dots: u64) {
        self.sync(now_dots);
        self.busreq_line = busreq;
        self.reset_line = reset;
        self.reset_once = true;
        self.reset_start_dots = None;
    }
}

impl<C: Z80Core> Cpu for PZ80<C> {
    fn reset(&mut self) {
        self.reset_once = true;
        self.reset_line = false;
        self.busreq_line = false;
        self.reset_start_dots = None;
        self.clock_dots = 0;
        self.delta = 0;
        self.core.pulse_reset();
    }

    fn signal_interrupt(&mut self, int: InterruptState) {
        self.core.set_irq(int.irq);
        self.core.set_nmi(int.nmi);
    }

    fn is_sleeping(&self) -> bool {
        !self.running()
    }
}

impl<C: Z80Core> CpuStateTrait for PZ80<C> {
    type Snapshot = Z80State;

    fn snapshot(&self) -> Z80State {
        self.core.snapshot()
    }

    fn restore(&mut self, snapshot: &Z80State) {
        self.core.restore(snapshot);
    }
}

/// A no-op Z80 core, mirroring `p68k::stub::NullM68kCore`: exercises the
/// reset/busreq handshake in isolation and serves as the placeholder
/// binding `frontend` links against until a real Z80 interpreter is wired
/// in.
pub mod stub {
    use super::*;

    #[derive(Default)]
    pub struct NullZ80Core {
        pub state: Z80State,
        pub reset_count: u32,
        pub irq: bool,
        pub nmi: bool,
    }

    impl Z80Core for NullZ80Core {
        fn step(&mut self, cycles: u32) -> u32 {
            cycles
        }
        fn set_irq(&mut self, asserted: bool) {
            self.irq = asserted;
        }
        fn set_nmi(&mut self, asserted: bool) {
            self.nmi = asserted;
        }
        fn pulse_reset(&mut self) {
            self.reset_count += 1;
        }
        fn snapshot(&self) -> Z80State {
            self.state
        }
        fn restore(&mut self, state: &Z80State) {
            self.state = *state;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::stub::NullZ80Core;
    use super::*;

    #[test]
    fn short_reset_pulse_is_ignored() {
        let mut z80 = PZ80::new(NullZ80Core::default());
        z80.set_reset_line(true, 0);
        z80.set_reset_line(false, 4 * PZ80::<NullZ80Core>::CLOCK_DIVISOR);
        assert!(!z80.reset_once());
        assert_eq!(z80.core().reset_count, 0);
    }

    #[test]
    fn qualifying_reset_pulse_jumps_clock_forward() {
        let mut z80 = PZ80::new(NullZ80Core::default());
        let release_at = 12 * PZ80::<NullZ80Core>::CLOCK_DIVISOR;
        z80.set_reset_line(true, 0);
        z80.set_reset_line(false, release_at);
        assert!(z80.reset_once());
        assert_eq!(z80.core().reset_count, 1);
        assert_eq!(
            z80.clock(),
            release_at + 20 * PZ80::<NullZ80Core>::CLOCK_DIVISOR
        );
    }

    #[test]
    fn busreq_halts_run_without_executing() {
        let mut z80 = PZ80::new(NullZ80Core::default());
        z80.set_reset_line(true, 0);
        z80.set_reset_line(false, 12 * PZ80::<NullZ80Core>::CLOCK_DIVISOR);
        z80.set_busreq(true, z80.clock());
        let executed = z80.run(z80.clock() + 1000);
        assert_eq!(executed, 0);
    }
}
