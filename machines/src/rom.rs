//! ROM image loading: raw `.bin` dumps and interleaved `.smd` dumps.
//!
//! Error-handling idiom (plain enum + hand-written `Display`/`Error`, no
//! external error crate) follows the ROM-loading code this was adapted
//! from, which validated arcade ROM sets the same way.

use std::fmt;

#[derive(Debug)]
pub enum RomLoadError {
    Io(std::io::Error),
    /// The file was empty, or an `.smd` header claimed more blocks than
    /// the file actually contains.
    InvalidRomFormat(String),
}

impl fmt::Display for RomLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidRomFormat(msg) => write!(f, "invalid ROM format: {msg}"),
        }
    }
}

impl std::error::Error for RomLoadError {}

impl From<std::io::Error> for RomLoadError {
    fn from(e: std::io::Error) -> Self {
        RomLoadError::Io(e)
    }
}

const SMD_BLOCK_SIZE: usize = 0x4000;
const SMD_HEADER_SIZE: usize = 512;

/// Load a ROM image from a file path, auto-detecting `.smd` interleaving
/// by extension and falling back to a raw `.bin` load otherwise.
pub fn load_rom_file(path: &std::path::Path) -> Result<Vec<u8>, RomLoadError> {
    let raw = std::fs::read(path)?;
    let is_smd = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("smd"))
        .unwrap_or(false);
    if is_smd {
        load_smd(&raw)
    } else {
        Ok(load_bin(&raw))
    }
}

/// `.bin` = raw ROM, rounded up to the next 64 KiB boundary (mirrors
/// hardware's page-granular ROM mirroring, see the bus module).
pub fn load_bin(raw: &[u8]) -> Vec<u8> {
    let rounded = raw.len().next_multiple_of(0x10000).max(0x10000);
    let mut out = vec![0xFF; rounded];
    out[..raw.len()].copy_from_slice(raw);
    out
}

/// `.smd` = interleaved. First byte is the 16 KiB block count (0 means
/// 256 blocks); a 512-byte header follows, then for each block, 8 KiB of
/// odd bytes followed by 8 KiB of even bytes, which this function
/// deinterleaves back into straight ROM order.
pub fn load_smd(raw: &[u8]) -> Result<Vec<u8>, RomLoadError> {
    if raw.is_empty() {
        return Err(RomLoadError::InvalidRomFormat("empty file".into()));
    }
    let block_count = if raw[0] == 0 { 256usize } else { raw[0] as usize };
    let needed = SMD_HEADER_SIZE + block_count * SMD_BLOCK_SIZE;
    if raw.len() < needed {
        return Err(RomLoadError::InvalidRomFormat(format!(
            "header claims {block_count} blocks ({needed} bytes) but file is only {} bytes",
            raw.len()
        )));
    }

    let mut out = load_bin(&vec![0u8; block_count * SMD_BLOCK_SIZE]);
    for block in 0..block_count {
        let src = &raw[SMD_HEADER_SIZE + block * SMD_BLOCK_SIZE..][..SMD_BLOCK_SIZE];
        let (odd, even) = src.split_at(SMD_BLOCK_SIZE / 2);
        let dst = &mut out[block * SMD_BLOCK_SIZE..][..SMD_BLOCK_SIZE];
        for i in 0..SMD_BLOCK_SIZE / 2 {
            dst[i * 2] = odd[i];
            dst[i * 2 + 1] = even[i];
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bin_is_padded_to_next_64k_boundary() {
        let rom = load_bin(&[1, 2, 3]);
        assert_eq!(rom.len(), 0x10000);
        assert_eq!(&rom[..3], &[1, 2, 3]);
        assert_eq!(rom[3], 0xFF);
    }

    #[test]
    fn bin_exact_multiple_is_unpadded() {
        let raw = vec![0xAAu8; 0x10000];
        let rom = load_bin(&raw);
        assert_eq!(rom.len(), 0x10000);
    }

    #[test]
    fn smd_deinterleaves_one_block() {
        let mut raw = vec![0u8; SMD_HEADER_SIZE + SMD_BLOCK_SIZE];
        raw[0] = 1; // one block
        let odd: Vec<u8> = (0..SMD_BLOCK_SIZE / 2).map(|i| i as u8).collect();
        let even: Vec<u8> = (0..SMD_BLOCK_SIZE / 2).map(|i| (i as u8).wrapping_add(1)).collect();
        raw[SMD_HEADER_SIZE..SMD_HEADER_SIZE + SMD_BLOCK_SIZE / 2].copy_from_slice(&odd);
        raw[SMD_HEADER_SIZE + SMD_BLOCK_SIZE / 2..SMD_HEADER_SIZE + SMD_BLOCK_SIZE]
            .copy_from_slice(&even);

        let rom = load_smd(&raw).unwrap();
        assert_eq!(rom[0], odd[0]);
        assert_eq!(rom[1], even[0]);
        assert_eq!(rom[2], odd[1]);
        assert_eq!(rom[3], even[1]);
    }

    #[test]
    fn smd_zero_byte_means_256_blocks() {
        let needed = SMD_HEADER_SIZE + 256 * SMD_BLOCK_SIZE;
        let raw = vec![0u8; needed];
        let rom = load_smd(&raw).unwrap();
        assert_eq!(rom.len(), 256 * SMD_BLOCK_SIZE);
    }

    #[test]
    fn smd_truncated_file_is_rejected() {
        let raw = vec![2u8; SMD_HEADER_SIZE]; // claims 2 blocks, has 0
        assert!(load_smd(&raw).is_err());
    }

    #[test]
    fn smd_empty_file_is_rejected() {
        assert!(load_smd(&[]).is_err());
    }
}
