//! The main emulation loop: event pump, video present, audio feed and
//! the save-state hotkeys (LCtrl+digit save, LShift+digit load, ten
//! slots 0-9, Esc quits) described for the host keyboard bindings.
//!
//! Unlike the multi-system frontend this was adapted from (which ran
//! against `&mut dyn Machine` to stay agnostic across four different
//! arcade boards), this binary only ever drives one console, so the
//! loop is generic over the concrete `GenesisMachine` instead of a
//! trait object — that's what lets it reach `save_state`/`load_state`,
//! which aren't part of the machine-agnostic `Machine` trait.

use std::path::Path;

use genesis_core::core::machine::Machine;
use genesis_core::cpu::{M68kCore, Ym2612Core, Z80Core};
use genesis_machines::savestate;
use genesis_machines::GenesisMachine;
use sdl2::event::Event;
use sdl2::keyboard::{Keycode, Scancode};

use crate::audio;
use crate::input::KeyMap;
use crate::rom_path;
use crate::screenshot;
use crate::video::Video;

pub fn run<M: M68kCore, Z: Z80Core, Y: Ym2612Core>(
    machine: &mut GenesisMachine<M, Z, Y>,
    key_map: &KeyMap,
    scale: u32,
    rom_path_arg: &Path,
    screenshot_frames: &[u64],
) {
    let sdl_context = sdl2::init().expect("Failed to initialize SDL2");
    let sdl_video = sdl_context.video().expect("Failed to init SDL video");
    let sdl_audio = sdl_context.audio().expect("Failed to init SDL audio");

    let (width, height) = machine.display_size();
    let mut video = Video::new(&sdl_video, "Genesis", width, height, scale);
    let mut event_pump = sdl_context.event_pump().expect("Failed to get event pump");

    let audio_handle = audio::init(&sdl_audio, machine.audio_sample_rate());
    if let Some((ref device, ..)) = audio_handle {
        device.resume();
    }

    let buffer_size = (width * height * 3) as usize;
    let mut framebuffer = vec![0u8; buffer_size];
    let mut frame: u64 = 0;

    'main: loop {
        for event in event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => break 'main,

                Event::KeyDown { scancode: Some(Scancode::Escape), .. } => break 'main,

                Event::KeyDown { keycode: Some(key), repeat: false, keymod, .. }
                    if digit_slot(key).is_some()
                        && keymod.intersects(sdl2::keyboard::Mod::LCTRLMOD | sdl2::keyboard::Mod::LSHIFTMOD) =>
                {
                    let slot = digit_slot(key).unwrap();
                    if keymod.intersects(sdl2::keyboard::Mod::LCTRLMOD) {
                        save_slot(machine, rom_path_arg, slot);
                    } else {
                        load_slot(machine, rom_path_arg, slot);
                    }
                }

                Event::KeyDown { scancode: Some(sc), repeat: false, .. } => {
                    if let Some(button_id) = key_map.get(sc) {
                        machine.set_input(button_id, true);
                    }
                }
                Event::KeyUp { scancode: Some(sc), .. } => {
                    if let Some(button_id) = key_map.get(sc) {
                        machine.set_input(button_id, false);
                    }
                }

                _ => {}
            }
        }

        machine.run_frame();
        machine.render_frame(&mut framebuffer);
        video.present(&framebuffer);

        if let Some((_, ref ring, _)) = audio_handle {
            let mut buf = ring.lock().unwrap();
            buf.extend(machine.audio_samples().iter().copied());
        }

        if screenshot_frames.contains(&frame) {
            let path = rom_path::screenshot_path(rom_path_arg, frame);
            if let Err(e) = screenshot::save_png(&path, &framebuffer, width, height) {
                log::warn!("screenshot: failed to write {}: {e}", path.display());
            } else {
                log::info!("screenshot: wrote {}", path.display());
            }
        }
        frame += 1;
    }

    if let Some((device, _, fade_out)) = audio_handle {
        fade_out.store(true, std::sync::atomic::Ordering::Relaxed);
        std::thread::sleep(audio::fade_out_duration());
        device.pause();
    }
}

fn digit_slot(key: Keycode) -> Option<u8> {
    let code = key as i32;
    if (Keycode::Num0 as i32..=Keycode::Num9 as i32).contains(&code) {
        Some((code - Keycode::Num0 as i32) as u8)
    } else {
        None
    }
}

fn save_slot<M: M68kCore, Z: Z80Core, Y: Ym2612Core>(
    machine: &GenesisMachine<M, Z, Y>,
    rom_path: &Path,
    slot: u8,
) {
    let path = savestate::slot_path(rom_path, slot);
    if let Err(e) = std::fs::write(&path, machine.save_state()) {
        log::warn!("save-state: failed to write {}: {e}", path.display());
    } else {
        log::info!("save-state: saved slot {slot} to {}", path.display());
    }
}

fn load_slot<M: M68kCore, Z: Z80Core, Y: Ym2612Core>(
    machine: &mut GenesisMachine<M, Z, Y>,
    rom_path: &Path,
    slot: u8,
) {
    let path = savestate::slot_path(rom_path, slot);
    match std::fs::read(&path) {
        Ok(data) => match machine.load_state(&data) {
            Ok(()) => log::info!("save-state: loaded slot {slot} from {}", path.display()),
            Err(e) => log::warn!("save-state: {} is not a valid state file: {e}", path.display()),
        },
        Err(e) => log::warn!("save-state: failed to read {}: {e}", path.display()),
    }
}
