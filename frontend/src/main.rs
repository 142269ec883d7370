use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use genesis_core::core::machine::Machine;
use genesis_core::cpu::p68k::stub::NullM68kCore;
use genesis_core::cpu::pz80::stub::NullZ80Core;
use genesis_core::cpu::ym2612::NullYm2612Core;
use genesis_machines::{game_genie, GenesisMachine, Region};

mod audio;
mod config;
mod emulator;
mod input;
mod overlay;
mod rom_path;
mod screenshot;
mod video;

/// Sega Genesis / Mega Drive emulator.
#[derive(Parser)]
#[command(name = "genesis", version, about)]
struct Cli {
    /// Path to a .bin or .smd ROM image.
    rom: PathBuf,

    /// Game Genie codes to apply before boot (format ABCD-EFGH, comma-separated).
    #[arg(long = "gamegenie", value_delimiter = ',')]
    gamegenie: Vec<String>,

    /// Force PAL or NTSC timing instead of autodetecting from the cartridge header.
    #[arg(short = 'm', long = "mode")]
    mode: Option<String>,

    /// Frame numbers at which to dump a screenshot, comma-separated.
    #[arg(long = "screenshots", value_delimiter = ',')]
    screenshots: Vec<u64>,

    /// Window scale factor.
    #[arg(long, default_value_t = 3)]
    scale: u32,
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            e.print().ok();
            return ExitCode::from(if e.kind() == clap::error::ErrorKind::DisplayHelp { 0 } else { 1 });
        }
    };

    let region = match cli.mode.as_deref() {
        None => None,
        Some(m) if m.eq_ignore_ascii_case("pal") => Some(Region::Pal),
        Some(m) if m.eq_ignore_ascii_case("ntsc") => Some(Region::Ntsc),
        Some(other) => {
            eprintln!("invalid --mode {other:?}: expected PAL or NTSC");
            return ExitCode::from(2);
        }
    };

    let mut rom_bytes = match rom_path::load_rom(&cli.rom) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("failed to load ROM {}: {e}", cli.rom.display());
            return ExitCode::from(2);
        }
    };

    if !cli.gamegenie.is_empty() {
        match cli.gamegenie.iter().map(|c| game_genie::decode(c)).collect::<Result<Vec<_>, _>>() {
            Ok(patches) => {
                for patch in patches {
                    game_genie::apply_patch(&mut rom_bytes, patch);
                }
            }
            Err(e) => {
                eprintln!("invalid Game Genie code: {e}");
                return ExitCode::from(2);
            }
        }
    }

    let cfg = config::load();
    let scale = cli.scale.max(1).min(8);
    let region = region.or(match cfg.video_mode {
        config::VideoMode::Pal => Some(Region::Pal),
        config::VideoMode::Ntsc => Some(Region::Ntsc),
        config::VideoMode::Auto => None,
    });

    let mut machine = GenesisMachine::new(
        rom_bytes,
        region,
        NullM68kCore::default(),
        NullZ80Core::default(),
        NullYm2612Core::default(),
    );

    let nvram_path = rom_path::nvram_path(&cli.rom);
    if let Ok(data) = std::fs::read(&nvram_path) {
        machine.load_nvram(&data);
    }

    let key_map = input::default_key_map(machine.input_map());
    machine.reset();
    emulator::run(&mut machine, &key_map, scale, &cli.rom, &cli.screenshots);

    if let Some(data) = machine.save_nvram() {
        if let Err(e) = std::fs::write(&nvram_path, data) {
            log::warn!("failed to save NVRAM: {e}");
        }
    }

    ExitCode::SUCCESS
}
