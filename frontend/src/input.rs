use std::collections::HashMap;

use genesis_core::core::machine::InputButton;
use sdl2::keyboard::Scancode;

/// Maps SDL scancodes to machine button IDs.
pub struct KeyMap {
    map: HashMap<Scancode, u8>,
}

impl KeyMap {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Bind a scancode to a machine button ID.
    pub fn bind(&mut self, scancode: Scancode, button_id: u8) {
        self.map.insert(scancode, button_id);
    }

    /// Look up the machine button ID for a scancode.
    pub fn get(&self, scancode: Scancode) -> Option<u8> {
        self.map.get(&scancode).copied()
    }
}

/// Default bindings: arrow keys for the D-pad, Z/X/C for the A/B/C
/// buttons, 1 for Start. Player 2 uses WASD plus a separate row for its
/// face buttons, matching the console's two-pad convention.
pub fn default_key_map(buttons: &[InputButton]) -> KeyMap {
    let mut km = KeyMap::new();

    for button in buttons {
        let scancode = match button.name {
            "P1 Up" => Some(Scancode::Up),
            "P1 Down" => Some(Scancode::Down),
            "P1 Left" => Some(Scancode::Left),
            "P1 Right" => Some(Scancode::Right),
            "P1 A" => Some(Scancode::Z),
            "P1 B" => Some(Scancode::X),
            "P1 C" => Some(Scancode::C),
            "P1 Start" => Some(Scancode::Num1),

            "P2 Up" => Some(Scancode::W),
            "P2 Down" => Some(Scancode::S),
            "P2 Left" => Some(Scancode::A),
            "P2 Right" => Some(Scancode::D),
            "P2 A" => Some(Scancode::J),
            "P2 B" => Some(Scancode::K),
            "P2 C" => Some(Scancode::L),
            "P2 Start" => Some(Scancode::Num2),

            _ => None,
        };

        if let Some(sc) = scancode {
            km.bind(sc, button.id);
        }
    }

    km
}
