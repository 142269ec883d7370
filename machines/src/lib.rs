pub mod bus;
pub mod cartridge;
pub mod game_genie;
pub mod genesis;
pub mod gfx;
pub mod ioports;
pub mod rom;
pub mod savestate;
pub mod scheduler;
pub mod vdp;

pub use cartridge::Region;
pub use genesis::GenesisMachine;
