//! Frame timing constants and the master-clock-dots-per-line arithmetic
//! the per-scanline scheduler loop in `genesis.rs` steps by.
//!
//! Master clock runs at a fixed multiple of the line rate; P68K divides it
//! by 7, PZ80 by 14 (see `cpu::p68k`/`cpu::pz80`).

use crate::cartridge::Region;
use crate::vdp::VMode;

pub const MASTER_CLOCK_NTSC: u64 = 53_693_175;
pub const MASTER_CLOCK_PAL: u64 = 53_203_424;

/// Dots (master-clock ticks) per scanline. Fixed regardless of H32/H40;
/// only the access-slot frequency inside a line changes with mode.
pub const DOTS_PER_LINE: u64 = 3420;

#[derive(Clone, Copy)]
pub struct FrameTiming {
    pub master_clock_hz: u64,
    pub lines_per_frame: u16,
    pub vblank_start_line: u16,
}

pub fn timing_for(region: Region, vmode: VMode) -> FrameTiming {
    match (region, vmode) {
        (Region::Ntsc, _) => FrameTiming {
            master_clock_hz: MASTER_CLOCK_NTSC,
            lines_per_frame: 262,
            vblank_start_line: 224,
        },
        (Region::Pal, VMode::V28) => FrameTiming {
            master_clock_hz: MASTER_CLOCK_PAL,
            lines_per_frame: 313,
            vblank_start_line: 224,
        },
        (Region::Pal, VMode::V30) => FrameTiming {
            master_clock_hz: MASTER_CLOCK_PAL,
            lines_per_frame: 313,
            vblank_start_line: 240,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ntsc_timing_has_262_lines() {
        let t = timing_for(Region::Ntsc, VMode::V28);
        assert_eq!(t.lines_per_frame, 262);
        assert_eq!(t.vblank_start_line, 224);
    }

    #[test]
    fn pal_v30_extends_active_area() {
        let t = timing_for(Region::Pal, VMode::V30);
        assert_eq!(t.vblank_start_line, 240);
    }
}
