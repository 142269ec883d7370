use genesis_core::core::bus::{Bus, BusMaster};
use genesis_core::core::machine::Machine;
use genesis_core::cpu::p68k::stub::NullM68kCore;
use genesis_core::cpu::pz80::stub::NullZ80Core;
use genesis_core::cpu::ym2612::NullYm2612Core;
use genesis_machines::cartridge::Region;
use genesis_machines::game_genie;
use genesis_machines::GenesisMachine;

fn rom_with_header(len: usize, region_byte: u8) -> Vec<u8> {
    let mut rom = vec![0u8; len.max(0x200)];
    rom[0x1F0] = region_byte;
    rom
}

fn machine(rom: Vec<u8>, region: Option<Region>) -> GenesisMachine<NullM68kCore, NullZ80Core, NullYm2612Core> {
    GenesisMachine::new(rom, region, NullM68kCore::default(), NullZ80Core::default(), NullYm2612Core::default())
}

// =================================================================
// Machine Trait Tests
// =================================================================

#[test]
fn test_display_size_is_320x240() {
    let sys = machine(rom_with_header(0x10000, b'J'), None);
    assert_eq!(sys.display_size(), (320, 240));
}

#[test]
fn test_input_map_has_sixteen_buttons() {
    let sys = machine(rom_with_header(0x10000, b'J'), None);
    let map = sys.input_map();
    assert_eq!(map.len(), 16);
    assert_eq!(map[0].name, "P1 Up");
    assert_eq!(map[8].name, "P2 Up");
}

#[test]
fn test_render_frame_does_not_panic() {
    let sys = machine(rom_with_header(0x10000, b'J'), None);
    let (w, h) = sys.display_size();
    let mut buf = vec![0u8; (w * h * 3) as usize];
    sys.render_frame(&mut buf);
}

#[test]
fn test_run_frame_produces_stereo_audio_at_44100hz() {
    let mut sys = machine(rom_with_header(0x10000, b'J'), None);
    assert_eq!(sys.audio_sample_rate(), 44_100);
    sys.reset();
    sys.run_frame();
    assert_eq!(sys.audio_samples().len(), 1600); // 800 stereo frames
}

// =================================================================
// Pad Wiring (port A data register, TH multiplexed)
// =================================================================

// Port data/ctrl registers sit at odd addresses (0xA10003 etc); a 16-bit
// bus write/read must be aimed at the preceding even address so the real
// register lands in the low byte of the word, exactly as 68K software
// addresses them.

#[test]
fn test_pad_a_up_button_reads_through_bus() {
    let mut sys = machine(rom_with_header(0x10000, b'J'), None);
    sys.write(BusMaster::Cpu(0), 0xA10002, 1 << 6); // TH=1 selects up/down/left/right/b/c row

    let released = sys.read(BusMaster::Cpu(0), 0xA10002);
    assert_eq!(released & 1, 1, "released line reads high (active-low, nothing pressed)");

    sys.set_input(0, true); // P1 Up
    let pressed = sys.read(BusMaster::Cpu(0), 0xA10002);
    assert_eq!(pressed & 1, 0, "P1 Up pressed pulls bit 0 low");
}

#[test]
fn test_pad_b_start_button_is_independent_of_pad_a() {
    let mut sys = machine(rom_with_header(0x10000, b'J'), None);
    sys.write(BusMaster::Cpu(0), 0xA10004, 0); // port B, TH=0 -> start on bit 4

    sys.set_input(8 + 7, true); // P2 Start
    let val = sys.read(BusMaster::Cpu(0), 0xA10004);
    assert_eq!(val & (1 << 4), 0, "P2 Start pulls bit 4 low");

    let pad_a = sys.read(BusMaster::Cpu(0), 0xA10002);
    assert_ne!(pad_a & 1, 0, "port A is untouched by a port B button");
}

// =================================================================
// Cartridge / Region / NVRAM Integration
// =================================================================

#[test]
fn test_region_autodetected_from_header_when_not_forced() {
    let sys = machine(rom_with_header(0x10000, b'E'), None);
    assert_eq!(sys.audio_sample_rate(), 44_100); // region doesn't change sample rate, but construction must succeed
    let _ = sys; // PAL detection is exercised directly in cartridge.rs; this just proves the machine wires it through.
}

#[test]
fn test_forced_region_overrides_header() {
    let sys_ntsc = machine(rom_with_header(0x10000, b'E'), Some(Region::Ntsc));
    let sys_pal = machine(rom_with_header(0x10000, b'E'), Some(Region::Pal));
    // Both construct successfully; the timing difference (262 vs 313 lines) is
    // exercised by the scheduler directly. Here we only confirm the override path.
    assert_eq!(sys_ntsc.display_size(), sys_pal.display_size());
}

#[test]
fn test_nvram_round_trips_through_machine() {
    let mut rom = rom_with_header(0x10000, b'J');
    rom[0x1B0] = b'R';
    rom[0x1B1] = b'A';
    let mut sys = machine(rom, None);

    sys.load_nvram(&[0xAB; 0x2000]);
    let saved = sys.save_nvram().expect("cartridge advertises backup RAM");
    assert_eq!(saved[0], 0xAB);
}

// =================================================================
// VDP Access Through the 68K Device Window (0xC00000..)
// =================================================================

#[test]
fn test_vdp_register_write_then_status_read_through_bus() {
    let mut sys = machine(rom_with_header(0x10000, b'J'), None);
    // Register write: reg 1, value with display-enable bit set.
    sys.write(BusMaster::Cpu(0), 0xC00004, 0x8140);
    let status = sys.read(BusMaster::Cpu(0), 0xC00004);
    assert_ne!(status & (1 << 9), 0, "FIFO should read empty right after reset");
}

#[test]
fn test_vdp_data_port_write_then_read_round_trips_vram() {
    let mut sys = machine(rom_with_header(0x10000, b'J'), None);
    sys.write(BusMaster::Cpu(0), 0xC00004, 0x8F02); // REG[15] = 2 (auto-increment)
    sys.write(BusMaster::Cpu(0), 0xC00004, 0x4000); // first command word: code=1 (VRAM write), addr=0
    sys.write(BusMaster::Cpu(0), 0xC00004, 0x0000); // second command word
    sys.write(BusMaster::Cpu(0), 0xC00000, 0xBEEF);

    sys.write(BusMaster::Cpu(0), 0xC00004, 0x0000); // addr=0 again (code bits unset -> read mode needs reg write below)
    sys.write(BusMaster::Cpu(0), 0xC00004, 0x0000);
    let readback = sys.read(BusMaster::Cpu(0), 0xC00000);
    assert_eq!(readback, 0xBEEF);
}

// =================================================================
// Z80 Bus Window (0xA00000) and BUSREQ/RESET Handshake
// =================================================================

// The BUSREQ/RESET latches are single bytes at the exact even addresses
// 0xA11100/0xA11200; genesis software conventionally writes 0x0100/0x0000
// (not 0x0001/0x0000) because the control bit lives in the high byte of
// the 16-bit access, matching real hardware and this machine's dispatch.

#[test]
fn test_z80_zram_visible_through_68k_bus_window_while_halted() {
    let mut sys = machine(rom_with_header(0x10000, b'J'), None);
    // Before a qualifying reset pulse the Z80 is held in reset, so the
    // window still grants access (genesis software always stops the Z80
    // with BUSREQ before poking ZRAM directly).
    sys.write(BusMaster::Cpu(0), 0xA11100, 0x0100); // BUSREQ asserted
    sys.write(BusMaster::Cpu(0), 0xA00010, 0x42);
    assert_eq!(sys.read(BusMaster::Cpu(0), 0xA00010), 0x42);
}

#[test]
fn test_z80_busreq_status_bit_reflects_running_state() {
    let mut sys = machine(rom_with_header(0x10000, b'J'), None);
    assert_eq!(
        (sys.read(BusMaster::Cpu(0), 0xA11100) >> 8) & 1,
        0,
        "not running before any reset pulse"
    );
}

// =================================================================
// Game Genie: Apply Before Boot
// =================================================================

#[test]
fn test_game_genie_patch_applied_before_cartridge_construction() {
    let mut rom = rom_with_header(0x10000, b'J');
    let patch = game_genie::decode("AAAA-AAAA").expect("well-formed code");
    let addr = patch.addr as usize;
    rom[addr] = 0x11;
    rom[addr + 1] = 0x22;

    game_genie::apply_patch(&mut rom, patch);
    let sys = machine(rom, None);

    assert_eq!(sys.display_size(), (320, 240)); // machine still constructs normally after patching
}

// =================================================================
// Save States
// =================================================================

#[test]
fn test_save_state_then_load_state_restores_zram() {
    let mut sys = machine(rom_with_header(0x10000, b'J'), None);
    sys.reset();
    sys.write(BusMaster::Cpu(0), 0xA11100, 0x0100); // BUSREQ so the 68K can poke ZRAM
    sys.write(BusMaster::Cpu(0), 0xA00020, 0x77);

    let state = sys.save_state();

    sys.write(BusMaster::Cpu(0), 0xA00020, 0x00);
    assert_eq!(sys.read(BusMaster::Cpu(0), 0xA00020), 0x00);

    sys.load_state(&state).expect("just-saved state must load");
    assert_eq!(sys.read(BusMaster::Cpu(0), 0xA00020), 0x77);
}

#[test]
fn test_load_state_rejects_garbage() {
    let mut sys = machine(rom_with_header(0x10000, b'J'), None);
    assert!(sys.load_state(&[0u8; 16]).is_err());
}

// =================================================================
// Reset
// =================================================================

#[test]
fn test_reset_clears_clock_and_does_not_panic_mid_frame() {
    let mut sys = machine(rom_with_header(0x10000, b'J'), None);
    sys.run_frame();
    sys.reset();
    sys.run_frame();
}
