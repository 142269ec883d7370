/// Describes a single input button that a machine accepts.
pub struct InputButton {
    /// Machine-defined button identifier, passed to `set_input()`.
    pub id: u8,
    /// Human-readable name for display/configuration (e.g., "P1 Up").
    pub name: &'static str,
}

/// Machine-agnostic interface for the emulated console.
///
/// The frontend is a pure presentation layer that does not know about
/// VDP registers, bank switching or dual-CPU scheduling; it only calls
/// this trait.
pub trait Machine {
    /// Native display resolution as (width, height) in pixels.
    fn display_size(&self) -> (u32, u32);

    /// Run one frame of emulation (advance the clock by one frame's worth of cycles).
    fn run_frame(&mut self);

    /// Render the current video state into an RGB24 pixel buffer.
    ///
    /// The buffer must be at least `width * height * 3` bytes (from `display_size()`).
    /// Pixels are stored left-to-right, top-to-bottom, 3 bytes per pixel (R, G, B).
    fn render_frame(&self, buffer: &mut [u8]);

    /// Handle an input event. `button` is a machine-defined ID from `input_map()`.
    /// `pressed` is true for key-down, false for key-up.
    fn set_input(&mut self, button: u8, pressed: bool);

    /// Get the list of input buttons this machine accepts.
    fn input_map(&self) -> &[InputButton];

    /// Reset the machine to its initial power-on state.
    fn reset(&mut self);

    /// Load battery-backed cartridge RAM from a save file, if the cartridge has any.
    /// Default no-op for machines without backup RAM.
    fn load_nvram(&mut self, _data: &[u8]) {}

    /// Dump battery-backed cartridge RAM for persistence. Returns `None` if the
    /// cartridge has no backup RAM (or it was never enabled).
    fn save_nvram(&self) -> Option<Vec<u8>> {
        None
    }

    /// Sample rate the audio generated by `run_frame()` is produced at, in
    /// Hz. `0` means the machine has no audio (the default).
    fn audio_sample_rate(&self) -> u32 {
        0
    }

    /// Interleaved stereo samples produced by the most recent `run_frame()`
    /// call. Empty for machines without audio.
    fn audio_samples(&self) -> &[i16] {
        &[]
    }
}
