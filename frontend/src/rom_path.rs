//! ROM path helpers: loading the ROM image and deriving the sibling
//! paths (NVRAM, screenshots) the frontend writes next to it, all by
//! extension swap on the ROM's own path.

use std::path::{Path, PathBuf};

use genesis_machines::rom::{self, RomLoadError};

/// Load a ROM image (`.bin` or `.smd`) from disk.
pub fn load_rom(path: &Path) -> Result<Vec<u8>, RomLoadError> {
    rom::load_rom_file(path)
}

/// Battery-backed NVRAM sibling path: `rom.bin` -> `rom.nvram`.
pub fn nvram_path(rom_path: &Path) -> PathBuf {
    rom_path.with_extension("nvram")
}

/// Screenshot sibling path for frame `frame`: `rom.bin` -> `rom-000123.png`.
pub fn screenshot_path(rom_path: &Path, frame: u64) -> PathBuf {
    let stem = rom_path.file_stem().and_then(|s| s.to_str()).unwrap_or("screenshot");
    let dir = rom_path.parent().unwrap_or_else(|| Path::new("."));
    dir.join(format!("{stem}-{frame:06}.png"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nvram_path_swaps_extension() {
        assert_eq!(nvram_path(Path::new("sonic.bin")), PathBuf::from("sonic.nvram"));
    }

    #[test]
    fn screenshot_path_is_numbered_and_siblings_the_rom() {
        let p = screenshot_path(Path::new("/roms/sonic.bin"), 42);
        assert_eq!(p, PathBuf::from("/roms/sonic-000042.png"));
    }
}
