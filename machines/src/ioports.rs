//! I/O Ports: three gamepad-style bidirectional ports, the version
//! register, and the Z80 BUSREQ/RESET latches.
//!
//! Grounded directly in the reference emulator's `IoPort`/`Gamepad`
//! classes: a latched data byte, a latched control (direction) byte, and
//! `connected_lines()`/`write_lines()`/`read_lines()` hooks a gamepad
//! specializes with TH-bit (bit 6) multiplexing.

/// 6-button controller state, independent of the host key binding layer.
#[derive(Default, Clone, Copy)]
pub struct GamepadState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub a: bool,
    pub b: bool,
    pub c: bool,
    pub start: bool,
}

impl GamepadState {
    /// Set one button by index (0=up,1=down,2=left,3=right,4=a,5=b,6=c,7=start),
    /// matching the bit order `Machine::input_map` hands out button IDs in.
    pub fn set_button(&mut self, index: u8, pressed: bool) {
        match index {
            0 => self.up = pressed,
            1 => self.down = pressed,
            2 => self.left = pressed,
            3 => self.right = pressed,
            4 => self.a = pressed,
            5 => self.b = pressed,
            6 => self.c = pressed,
            7 => self.start = pressed,
            _ => {}
        }
    }
}

pub struct IoPort {
    data: u8,
    ctrl: u8,
    pad: GamepadState,
    connected: bool,
}

const CONNECTED_LINES: u8 = 0x7F;

impl IoPort {
    pub fn new() -> Self {
        IoPort {
            data: 0x7F,
            ctrl: 0,
            pad: GamepadState::default(),
            connected: true,
        }
    }

    pub fn set_pad(&mut self, pad: GamepadState) {
        self.pad = pad;
    }

    pub fn disconnect(&mut self) {
        self.connected = false;
    }

    fn connected_lines(&self) -> u8 {
        if self.connected { CONNECTED_LINES } else { 0 }
    }

    /// TH (bit 6) of the latched data byte selects one of two 6-button
    /// multiplexed rows. Lines are active-low on real hardware; callers
    /// read the already-inverted, ready-to-return byte.
    fn read_lines(&self) -> u8 {
        if !self.connected {
            return 0xFF;
        }
        let th = self.data & (1 << 6) != 0;
        let p = &self.pad;
        let mut bits: u8 = 0;
        if th {
            bits |= (p.up as u8) << 0;
            bits |= (p.down as u8) << 1;
            bits |= (p.left as u8) << 2;
            bits |= (p.right as u8) << 3;
            bits |= (p.b as u8) << 4;
            bits |= (p.c as u8) << 5;
        } else {
            bits |= (p.up as u8) << 0;
            bits |= (p.down as u8) << 1;
            bits |= 1 << 2;
            bits |= 1 << 3;
            bits |= (p.start as u8) << 4;
            bits |= (p.a as u8) << 5;
        }
        !bits
    }

    pub fn write_data(&mut self, value: u8) {
        self.data = value;
    }

    pub fn read_data(&self) -> u8 {
        let input_mask = !self.ctrl & self.connected_lines();
        let external = self.read_lines();
        (external & input_mask) | (self.data & !input_mask)
    }

    pub fn write_ctrl(&mut self, value: u8) {
        self.ctrl = value;
    }

    pub fn read_ctrl(&self) -> u8 {
        self.ctrl
    }
}

/// The three I/O ports plus the version register and Z80 handshake
/// latches, as exposed on the 68K bus starting at 0xA10000.
pub struct IoPorts {
    pub port_a: IoPort,
    pub port_b: IoPort,
    pub port_c: IoPort,
    pub pal: bool,
    pub oversea: bool,
}

impl IoPorts {
    pub fn new(pal: bool, oversea: bool) -> Self {
        IoPorts {
            port_a: IoPort::new(),
            port_b: IoPort::new(),
            port_c: IoPort::new(),
            pal,
            oversea,
        }
    }

    pub fn version_register(&self) -> u8 {
        0x01 | if self.pal { 0x40 } else { 0 } | if self.oversea { 0x80 } else { 0 }
    }

    /// Reads/writes in the range 0xA10000..0xA10020 (ports + version reg).
    /// Returns `None` for addresses this module doesn't own.
    pub fn read(&self, addr: u32) -> Option<u8> {
        match addr & 0x1F {
            0x00 => Some(self.version_register()),
            0x03 => Some(self.port_a.read_data()),
            0x05 => Some(self.port_b.read_data()),
            0x07 => Some(self.port_c.read_data()),
            0x09 => Some(self.port_a.read_ctrl()),
            0x0B => Some(self.port_b.read_ctrl()),
            0x0D => Some(self.port_c.read_ctrl()),
            _ => None,
        }
    }

    pub fn write(&mut self, addr: u32, value: u8) -> bool {
        match addr & 0x1F {
            0x03 => self.port_a.write_data(value),
            0x05 => self.port_b.write_data(value),
            0x07 => self.port_c.write_data(value),
            0x09 => self.port_a.write_ctrl(value),
            0x0B => self.port_b.write_ctrl(value),
            0x0D => self.port_c.write_ctrl(value),
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn th_high_reads_direction_and_bc() {
        let mut port = IoPort::new();
        port.set_pad(GamepadState {
            up: true,
            b: true,
            ..Default::default()
        });
        port.write_data(1 << 6); // TH=1
        let v = port.read_data();
        assert_eq!(v & 1, 0); // up pressed -> bit low (active-low line)
        assert_eq!(v & (1 << 4), 0); // b pressed -> bit low
        assert_ne!(v & (1 << 1), 0); // down not pressed -> bit high
    }

    #[test]
    fn th_low_forces_bits_2_and_3_high() {
        let mut port = IoPort::new();
        port.write_data(0); // TH=0
        let v = port.read_data();
        assert_ne!(v & (1 << 2), 0);
        assert_ne!(v & (1 << 3), 0);
    }

    #[test]
    fn version_register_reflects_region_flags() {
        let io = IoPorts::new(true, true);
        assert_eq!(io.version_register(), 0x01 | 0x40 | 0x80);
        let io = IoPorts::new(false, false);
        assert_eq!(io.version_register(), 0x01);
    }
}
