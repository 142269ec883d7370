//! The top-level Genesis/Mega Drive machine: owns every component by
//! value and implements `Machine` for the frontend, plus `Bus` (68K
//! address space) for the VDP's 68K->VDP DMA source reads.
//!
//! `M68kCore`/`Z80Core`/`Ym2612Core` are opaque external collaborators —
//! they take no bus parameter of their own, so unlike the reference
//! emulator's in-repo interpreters (driven cycle-by-cycle through a Bus
//! callback) this machine does not need the self-referential
//! `unsafe { &mut *(self as *mut Self) }` re-borrow trick: the only
//! caller-side bus access left to implement is the VDP DMA engine's,
//! which this struct satisfies directly as the owner of both the VDP and
//! memory.

use genesis_core::core::bus::{Bus, BusMaster, InterruptState};
use genesis_core::core::machine::{InputButton, Machine};
use genesis_core::cpu::{Cpu, CpuStateTrait, M68kCore, P68k, Ym2612Core, Z80Core, PZ80};

use crate::bus::{m68k_page_kind, z80_page_kind, BusSlot};
use crate::cartridge::{Cartridge, Region};
use crate::gfx::GfxRenderer;
use crate::ioports::{GamepadState, IoPorts};
use crate::savestate::{self, SaveStateInput};
use crate::scheduler::{self, DOTS_PER_LINE};
use crate::vdp::{VMode, Vdp};

const WORK_RAM_SIZE: usize = 0x10000;
const ZRAM_SIZE: usize = 0x2000;

fn is_vdp_page(page: u8) -> bool {
    matches!(page, 0xC0 | 0xC8 | 0xD0 | 0xD8)
}

pub struct GenesisMachine<M: M68kCore, Z: Z80Core, Y: Ym2612Core> {
    cartridge: Cartridge,
    vdp: Vdp,
    gfx: GfxRenderer,
    io: IoPorts,
    work_ram: Vec<u8>,
    zram: Vec<u8>,
    z80_bank_addr: u32,
    ym_addr_latch: [u8; 2],
    m68k: P68k<M>,
    z80: PZ80<Z>,
    ym2612: Y,
    clock_dots: u64,
    region: Region,
    input_buttons: Vec<InputButton>,
    pad_a: GamepadState,
    pad_b: GamepadState,
    audio_buffer: Vec<i16>,
}

fn input_button_list() -> Vec<InputButton> {
    const NAMES_P1: [&str; 8] = ["P1 Up", "P1 Down", "P1 Left", "P1 Right", "P1 A", "P1 B", "P1 C", "P1 Start"];
    const NAMES_P2: [&str; 8] = ["P2 Up", "P2 Down", "P2 Left", "P2 Right", "P2 A", "P2 B", "P2 C", "P2 Start"];
    let mut out = Vec::with_capacity(16);
    for (i, name) in NAMES_P1.iter().enumerate() {
        out.push(InputButton { id: i as u8, name });
    }
    for (i, name) in NAMES_P2.iter().enumerate() {
        out.push(InputButton { id: 8 + i as u8, name });
    }
    out
}

impl<M: M68kCore, Z: Z80Core, Y: Ym2612Core> GenesisMachine<M, Z, Y> {
    pub fn new(rom: Vec<u8>, forced_region: Option<Region>, m68k_core: M, z80_core: Z, ym2612_core: Y) -> Self {
        let default_region = forced_region.unwrap_or(Region::Ntsc);
        let cartridge = Cartridge::from_rom(rom, default_region);
        let region = forced_region.unwrap_or(cartridge.region);
        let mut machine = GenesisMachine {
            cartridge,
            vdp: Vdp::new(region),
            gfx: GfxRenderer::new(),
            io: IoPorts::new(region == Region::Pal, false),
            work_ram: vec![0; WORK_RAM_SIZE],
            zram: vec![0; ZRAM_SIZE],
            z80_bank_addr: 0,
            ym_addr_latch: [0, 0],
            m68k: P68k::new(m68k_core),
            z80: PZ80::new(z80_core),
            ym2612: ym2612_core,
            clock_dots: 0,
            region,
            input_buttons: input_button_list(),
            pad_a: GamepadState::default(),
            pad_b: GamepadState::default(),
            audio_buffer: Vec::new(),
        };
        machine.vdp.resync_slot_clock(0);
        machine
    }

    fn vmode(&self) -> VMode {
        if self.vdp.reg(1) & (1 << 3) != 0 { VMode::V30 } else { VMode::V28 }
    }

    // -- 68K address space ---------------------------------------------------

    fn read_68k_byte(&mut self, addr: u32) -> u8 {
        let page = ((addr >> 16) & 0xFF) as u8;
        match m68k_page_kind(page) {
            BusSlot::RomMirror => self.cartridge.read_rom(addr),
            BusSlot::Ram => self.work_ram[(addr & 0xFFFF) as usize],
            BusSlot::Device => self.read_68k_device_byte(addr),
            BusSlot::Absent => {
                log::warn!("68K: unmapped read at {addr:#08x}");
                0xFF
            }
        }
    }

    fn write_68k_byte(&mut self, addr: u32, value: u8) {
        let page = ((addr >> 16) & 0xFF) as u8;
        match m68k_page_kind(page) {
            BusSlot::RomMirror => log::warn!("68K: write to ROM at {addr:#08x} ignored"),
            BusSlot::Ram => self.work_ram[(addr & 0xFFFF) as usize] = value,
            BusSlot::Device => self.write_68k_device_byte(addr, value),
            BusSlot::Absent => log::warn!("68K: unmapped write at {addr:#08x} = {value:#04x}"),
        }
    }

    fn read_68k_device_byte(&mut self, addr: u32) -> u8 {
        let page = (addr >> 16) & 0xFF;
        let reg = addr & 0xFFFF;
        match page {
            0xA0 => self.read_z80_window_byte(addr),
            0xA1 if reg < 0x20 => self.io.read(addr).unwrap_or(0xFF),
            0xA1 if reg == 0x1100 => self.z80.running() as u8,
            0xA1 => self.cartridge.read_a1(addr),
            0x20 => self.cartridge.read_sram(addr),
            0xC0 | 0xC8 | 0xD0 | 0xD8 => self.read_vdp_byte(addr),
            _ => {
                log::warn!("68K: unmapped device read at {addr:#08x}");
                0xFF
            }
        }
    }

    fn write_68k_device_byte(&mut self, addr: u32, value: u8) {
        let page = (addr >> 16) & 0xFF;
        let reg = addr & 0xFFFF;
        match page {
            0xA0 => self.write_z80_window_byte(addr, value),
            0xA1 if reg < 0x20 => {
                self.io.write(addr, value);
            }
            0xA1 if reg == 0x1100 => self.z80.set_busreq(value & 1 != 0, self.clock_dots),
            0xA1 if reg == 0x1200 => self.z80.set_reset_line(value & 1 == 0, self.clock_dots),
            0xA1 => self.cartridge.write_a1(addr, value),
            0x20 => self.cartridge.write_sram(addr, value),
            0xC0 | 0xC8 | 0xD0 | 0xD8 => self.write_vdp_byte(addr, value),
            _ => log::warn!("68K: unmapped device write at {addr:#08x} = {value:#04x}"),
        }
    }

    fn read_vdp_byte(&mut self, addr: u32) -> u8 {
        let word = self.read_vdp_word(addr & !1);
        if addr & 1 == 0 { (word >> 8) as u8 } else { word as u8 }
    }

    fn write_vdp_byte(&mut self, addr: u32, value: u8) {
        // Byte writes to the VDP duplicate the byte into both halves of the word,
        // matching the reference emulator's handling of odd 8-bit accesses.
        self.write_vdp_word(addr & !1, (value as u16) << 8 | value as u16);
    }

    fn read_vdp_word(&mut self, addr: u32) -> u16 {
        match addr & 0x1F {
            0x00 | 0x02 => self.vdp.data_port_r(),
            0x04 | 0x06 => self.vdp.status_register_r(self.clock_dots),
            0x08 => self.hv_counter(),
            _ => {
                log::warn!("VDP: unmapped read at {addr:#08x}");
                0xFFFF
            }
        }
    }

    fn write_vdp_word(&mut self, addr: u32, value: u16) {
        match addr & 0x1F {
            0x00 | 0x02 => {
                self.stall_for_fifo_room();
                self.vdp.data_port_w(value, self.clock_dots);
            }
            0x04 | 0x06 => self.vdp.control_port_w(value, self.clock_dots),
            _ => log::warn!("VDP: unmapped write at {addr:#08x} = {value:#06x}"),
        }
    }

    /// Burns 68K cycles until the VDP's write FIFO has room, so a tight
    /// loop of data-port writes observes the same backpressure real
    /// hardware imposes instead of draining the FIFO instantly.
    fn stall_for_fifo_room(&mut self) {
        let now_slot = self.vdp.now_slot(self.clock_dots);
        if self.vdp.fifo_full_at(now_slot) {
            let drain_dots = self.vdp.fifo_drain_dots(self.clock_dots);
            self.m68k.burn(drain_dots);
            self.clock_dots = drain_dots;
        }
    }

    fn hv_counter(&self) -> u16 {
        let line_pos = self.clock_dots % DOTS_PER_LINE;
        let h = self.vdp.hcounter(line_pos, DOTS_PER_LINE);
        let v = self.vdp.vcounter_register();
        ((v & 0xFF) << 8) | (h >> 1 & 0xFF)
    }

    /// The 68K's A0xxxx window onto Z80 address space is only live while
    /// the 68K holds BUSREQ asserted and the Z80 isn't actively running
    /// (i.e. it has ceded the bus), matching the reference handshake.
    fn z80_window_open(&self) -> bool {
        self.z80.busreq_line() && !self.z80.running()
    }

    fn read_z80_window_byte(&mut self, addr: u32) -> u8 {
        if self.z80_window_open() {
            self.read_z80_byte((addr & 0x7FFF) as u16)
        } else {
            0xFF
        }
    }

    fn write_z80_window_byte(&mut self, addr: u32, value: u8) {
        if self.z80_window_open() {
            self.write_z80_byte((addr & 0x7FFF) as u16, value);
        }
    }

    pub fn read_68k_word(&mut self, addr: u32) -> u16 {
        let page = ((addr >> 16) & 0xFF) as u8;
        if is_vdp_page(page) {
            // The VDP's ports are 16-bit registers; a genuine word access
            // must land as one read, not two independent byte reads that
            // would each re-derive a whole word from half of it.
            return self.read_vdp_word(addr & !1);
        }
        let hi = self.read_68k_byte(addr);
        let lo = self.read_68k_byte(addr ^ 1);
        u16::from_be_bytes([hi, lo])
    }

    pub fn write_68k_word(&mut self, addr: u32, value: u16) {
        let page = ((addr >> 16) & 0xFF) as u8;
        if is_vdp_page(page) {
            self.write_vdp_word(addr & !1, value);
            return;
        }
        let bytes = value.to_be_bytes();
        self.write_68k_byte(addr, bytes[0]);
        self.write_68k_byte(addr ^ 1, bytes[1]);
    }

    // -- Z80 address space ----------------------------------------------------

    fn read_z80_byte(&mut self, addr: u16) -> u8 {
        let nibble = (addr >> 12) as u8;
        match z80_page_kind(nibble) {
            BusSlot::Ram => self.zram[(addr & 0x1FFF) as usize],
            BusSlot::Device => self.read_z80_device_byte(addr),
            BusSlot::RomMirror | BusSlot::Absent => {
                log::warn!("Z80: unmapped read at {addr:#06x}");
                0xFF
            }
        }
    }

    fn read_z80_device_byte(&mut self, addr: u16) -> u8 {
        match addr {
            0x4000..=0x4003 => 0xFF, // busy flag, never busy in this model
            0x6000..=0x60FF => 0xFF,
            0x7F00..=0x7FFF => self.read_vdp_byte(0xC00000 | (addr as u32 & 0x1F)),
            _ => self.read_68k_byte(self.z80_bank_addr | (addr as u32 & 0x7FFF)),
        }
    }

    fn write_z80_byte(&mut self, addr: u16, value: u8) {
        let nibble = (addr >> 12) as u8;
        match z80_page_kind(nibble) {
            BusSlot::Ram => self.zram[(addr & 0x1FFF) as usize] = value,
            BusSlot::Device => self.write_z80_device_byte(addr, value),
            BusSlot::RomMirror | BusSlot::Absent => {
                log::warn!("Z80: unmapped write at {addr:#06x} = {value:#04x}");
            }
        }
    }

    fn write_z80_device_byte(&mut self, addr: u16, value: u8) {
        match addr {
            0x4000 | 0x4002 => {
                let port = ((addr - 0x4000) / 2) as usize;
                self.ym_addr_latch[port] = value;
            }
            0x4001 | 0x4003 => {
                let port = ((addr - 0x4000) / 2) as usize;
                self.ym2612.write(port as u8, self.ym_addr_latch[port], value);
            }
            0x6000..=0x60FF => {
                self.z80_bank_addr = ((self.z80_bank_addr >> 1) | ((value as u32 & 1) << 23)) & 0xFF8000;
            }
            0x7F00..=0x7FFF => self.write_vdp_byte(0xC00000 | (addr as u32 & 0x1F), value),
            _ => self.write_68k_byte(self.z80_bank_addr | (addr as u32 & 0x7FFF), value),
        }
    }

    // -- scheduler (4.7) --------------------------------------------------------

    fn run_68k_dma_if_pending(&mut self) {
        while let Some(src) = self.vdp.pending_68k_dma_source() {
            let word = self.read_68k_word(src);
            self.vdp.dma_68k_deposit(word, self.clock_dots);
        }
    }

    fn step_scanline(&mut self, timing: scheduler::FrameTiming) {
        self.vdp.scanline_begin();

        let line = self.vdp.scanline() as usize;
        if line < self.gfx.dimensions().1 {
            let (plane_a_base, plane_b_base, window_base) = self.plane_bases();
            let (window_left, window_split_col, window_top, window_split_row) = self.window_bounds();
            self.gfx.render_scanline(
                &self.vdp,
                line,
                plane_a_base,
                plane_b_base,
                window_base,
                window_left,
                window_split_col,
                window_top,
                window_split_row,
            );
        }

        let hblank_dots = self.clock_dots + DOTS_PER_LINE * 4 / 5;
        self.advance_to(hblank_dots);

        if let Some(level) = self.vdp.scanline_hblank(timing) {
            self.m68k.irq(level);
        }

        let end_of_line_dots = self.clock_dots - (self.clock_dots % DOTS_PER_LINE) + DOTS_PER_LINE;
        self.advance_to(end_of_line_dots);

        if self.vdp.scanline_end(timing) {
            self.m68k.irq(6);
            self.z80.set_irq_line(true);
        } else {
            self.z80.set_irq_line(false);
        }
        self.vdp.clear_virq_pending();
    }

    /// VRAM byte offsets for plane A/B/window nametables, per REG[2]/[4]/[3].
    fn plane_bases(&self) -> (usize, usize, usize) {
        let plane_a_base = ((self.vdp.reg(2) as usize) & 0x38) << 10;
        let plane_b_base = ((self.vdp.reg(4) as usize) & 0x07) << 13;
        let window_base = ((self.vdp.reg(3) as usize) & 0x3E) << 10;
        (plane_a_base, plane_b_base, window_base)
    }

    /// Window-plane split side/column and top/row, per REG[17]/[18].
    fn window_bounds(&self) -> (bool, u32, bool, u32) {
        let reg17 = self.vdp.reg(17);
        let reg18 = self.vdp.reg(18);
        let window_left = reg17 & 0x80 != 0;
        let window_split_col = (reg17 & 0x1F) as u32 * 2;
        let window_top = reg18 & 0x80 != 0;
        let window_split_row = (reg18 & 0x1F) as u32;
        (window_left, window_split_col, window_top, window_split_row)
    }

    fn advance_to(&mut self, target_dots: u64) {
        if self.vdp.m68k_dma_in_progress() {
            self.run_68k_dma_if_pending();
            self.m68k.burn(target_dots);
        } else {
            self.m68k.run(target_dots);
        }
        self.z80.run(target_dots);
        self.clock_dots = target_dots;
    }
}

impl<M: M68kCore, Z: Z80Core, Y: Ym2612Core> Bus for GenesisMachine<M, Z, Y> {
    type Address = u32;
    type Data = u16;

    fn read(&mut self, _master: BusMaster, addr: u32) -> u16 {
        self.read_68k_word(addr)
    }

    fn write(&mut self, _master: BusMaster, addr: u32, data: u16) {
        self.write_68k_word(addr, data);
    }

    fn is_halted_for(&self, master: BusMaster) -> bool {
        matches!(master, BusMaster::Cpu(0)) && self.vdp.m68k_dma_in_progress()
    }

    fn check_interrupts(&self, target: BusMaster) -> InterruptState {
        match target {
            BusMaster::Cpu(1) => InterruptState { irq_level: 0, irq: self.z80.reset_line(), nmi: false },
            _ => InterruptState::default(),
        }
    }
}

impl<M: M68kCore, Z: Z80Core, Y: Ym2612Core> Machine for GenesisMachine<M, Z, Y> {
    fn display_size(&self) -> (u32, u32) {
        let (w, h) = self.gfx.dimensions();
        (w as u32, h as u32)
    }

    fn run_frame(&mut self) {
        let timing = scheduler::timing_for(self.region, self.vmode());
        for _ in 0..timing.lines_per_frame {
            self.step_scanline(timing);
        }
        let mut samples = vec![0i16; 1600];
        self.ym2612.generate(&mut samples, 800);
        self.audio_buffer = samples;
    }

    fn render_frame(&self, buffer: &mut [u8]) {
        let fb = self.gfx.framebuffer();
        let n = fb.len().min(buffer.len());
        buffer[..n].copy_from_slice(&fb[..n]);
    }

    fn set_input(&mut self, button: u8, pressed: bool) {
        if button < 8 {
            self.pad_a.set_button(button, pressed);
            self.io.port_a.set_pad(self.pad_a);
        } else if button < 16 {
            self.pad_b.set_button(button - 8, pressed);
            self.io.port_b.set_pad(self.pad_b);
        }
    }

    fn input_map(&self) -> &[InputButton] {
        &self.input_buttons
    }

    fn reset(&mut self) {
        self.m68k.reset();
        self.z80.reset();
        self.vdp.reset();
        self.clock_dots = 0;
    }

    fn load_nvram(&mut self, data: &[u8]) {
        self.cartridge.load_sram(data);
    }

    fn save_nvram(&self) -> Option<Vec<u8>> {
        self.cartridge.save_sram().map(|s| s.to_vec())
    }

    fn audio_sample_rate(&self) -> u32 {
        44_100
    }

    fn audio_samples(&self) -> &[i16] {
        &self.audio_buffer
    }
}

impl<M: M68kCore, Z: Z80Core, Y: Ym2612Core> GenesisMachine<M, Z, Y> {
    pub fn save_state(&self) -> Vec<u8> {
        let mut vdp_regs = [0u8; 32];
        for i in 0..32 {
            vdp_regs[i] = self.vdp.reg(i);
        }
        savestate::save(SaveStateInput {
            m68k: self.m68k.snapshot(),
            vdp_regs: &vdp_regs,
            cram: self.vdp.cram(),
            vsram: self.vdp.vsram(),
            ym2612_regs: &self.ym2612.save_regs(),
            z80: self.z80.snapshot(),
            z80_bank_reg: self.z80_bank_addr,
            z80_busreq: self.z80.busreq_line(),
            z80_reset: self.z80.reset_line(),
            zram: &self.zram,
            work_ram: &self.work_ram,
            vram: self.vdp.vram(),
        })
    }

    pub fn load_state(&mut self, data: &[u8]) -> Result<(), savestate::SaveStateError> {
        let restored = savestate::load(data)?;
        self.m68k.restore(&restored.m68k);
        self.z80.restore(&restored.z80);
        self.z80
            .restore_handshake(restored.z80_busreq, restored.z80_reset, self.clock_dots);
        self.z80_bank_addr = restored.z80_bank_reg;
        self.zram = restored.zram;
        self.work_ram = restored.work_ram;
        self.ym2612.load_regs(&restored.ym2612_regs);
        self.vdp
            .restore(&restored.vdp_regs, &restored.vram, &restored.cram, &restored.vsram);
        Ok(())
    }
}
