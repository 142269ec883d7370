//! Game Genie code decoding and ROM-overlay application.
//!
//! Codes are 8 meaningful symbols (displayed as 9 characters with a
//! formatting dash) drawn from a 32-character alphabet that skips the
//! visually-ambiguous letters I, O, Q and U. Each symbol contributes 5
//! bits, packed most-significant-symbol-first into a 40-bit value that is
//! then re-sliced into a ROM address and a replacement word.

use std::fmt;

const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPRSTVWXYZ0123456789";

#[derive(Debug)]
pub enum GameGenieError {
    InvalidLength(usize),
    InvalidSymbol(char),
}

impl fmt::Display for GameGenieError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLength(n) => write!(f, "expected 8 symbols, got {n}"),
            Self::InvalidSymbol(c) => write!(f, "'{c}' is not a valid Game Genie symbol"),
        }
    }
}

impl std::error::Error for GameGenieError {}

fn symbol_value(c: char) -> Result<u8, GameGenieError> {
    let upper = c.to_ascii_uppercase();
    ALPHABET
        .iter()
        .position(|&a| a == upper as u8)
        .map(|i| i as u8)
        .ok_or(GameGenieError::InvalidSymbol(c))
}

fn symbol_char(v: u8) -> char {
    ALPHABET[v as usize & 0x1F] as char
}

/// A single decoded patch: overwrite the word at `addr` with `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Patch {
    pub addr: u32,
    pub value: u16,
}

pub fn decode(code: &str) -> Result<Patch, GameGenieError> {
    let symbols: Vec<u8> = code
        .chars()
        .filter(|&c| c != '-')
        .map(symbol_value)
        .collect::<Result<_, _>>()?;
    if symbols.len() != 8 {
        return Err(GameGenieError::InvalidLength(symbols.len()));
    }

    let mut bits: u64 = 0;
    for s in &symbols {
        bits = (bits << 5) | *s as u64;
    }
    let byte0 = ((bits >> 32) & 0xFF) as u8;
    let byte1 = ((bits >> 24) & 0xFF) as u8;
    let byte2 = ((bits >> 16) & 0xFF) as u8;
    let byte3 = ((bits >> 8) & 0xFF) as u8;
    let byte4 = (bits & 0xFF) as u8;

    let addr = ((byte2 as u32) << 16) | ((byte3 as u32) << 8) | byte0 as u32;
    let value_high = byte1.rotate_right(3);
    let value = ((value_high as u16) << 8) | byte4 as u16;
    Ok(Patch { addr, value })
}

/// The exact inverse of `decode`, used both by the round-trip test and by
/// anything that wants to present a canonical code string for a patch.
pub fn encode(patch: Patch) -> String {
    let byte0 = (patch.addr & 0xFF) as u8;
    let byte2 = ((patch.addr >> 16) & 0xFF) as u8;
    let byte3 = ((patch.addr >> 8) & 0xFF) as u8;
    let byte1 = ((patch.value >> 8) as u8).rotate_left(3);
    let byte4 = (patch.value & 0xFF) as u8;

    let bits: u64 = ((byte0 as u64) << 32)
        | ((byte1 as u64) << 24)
        | ((byte2 as u64) << 16)
        | ((byte3 as u64) << 8)
        | byte4 as u64;

    let mut symbols = [0u8; 8];
    for i in 0..8 {
        symbols[7 - i] = ((bits >> (i * 5)) & 0x1F) as u8;
    }
    let mut out = String::with_capacity(9);
    for (i, s) in symbols.iter().enumerate() {
        if i == 4 {
            out.push('-');
        }
        out.push(symbol_char(*s));
    }
    out
}

/// Apply a patch to a ROM image, overwriting the big-endian word at
/// `patch.addr`. Out-of-range addresses are logged and ignored.
pub fn apply_patch(rom: &mut [u8], patch: Patch) {
    let addr = patch.addr as usize;
    if addr + 1 >= rom.len() {
        log::warn!("game genie: patch address {addr:#x} out of range for {}-byte ROM", rom.len());
        return;
    }
    rom[addr] = (patch.value >> 8) as u8;
    rom[addr + 1] = patch.value as u8;
}

pub fn apply_codes(rom: &mut [u8], codes: &[String]) {
    for code in codes {
        match decode(code) {
            Ok(patch) => apply_patch(rom, patch),
            Err(e) => log::warn!("game genie: rejected code {code:?}: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_encode_decode() {
        let patch = Patch { addr: 0x00A13C, value: 0x4E71 };
        let code = encode(patch);
        let decoded = decode(&code).unwrap();
        assert_eq!(decoded, patch);
    }

    #[test]
    fn rejects_wrong_symbol_count() {
        assert!(matches!(decode("ABCD"), Err(GameGenieError::InvalidLength(_))));
    }

    #[test]
    fn rejects_invalid_symbol() {
        assert!(matches!(decode("IIIIIIII"), Err(GameGenieError::InvalidSymbol(_))));
    }

    #[test]
    fn apply_patch_writes_big_endian_word() {
        let mut rom = vec![0u8; 16];
        apply_patch(&mut rom, Patch { addr: 4, value: 0xBEEF });
        assert_eq!(rom[4], 0xBE);
        assert_eq!(rom[5], 0xEF);
    }
}
