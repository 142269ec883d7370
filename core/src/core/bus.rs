/// Identifies who is accessing the bus (for multi-CPU/DMA arbitration)
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BusMaster {
    Cpu(usize), // Cpu(0) = P68K, Cpu(1) = PZ80
    Dma,        // VDP 68k->VDP DMA reads through the bus (sees ROM/RAM mapping)
    DmaVram,    // VDP VRAM copy reads directly from VRAM, bypassing the bus
}

/// Generic bus interface supporting halt/arbitration (TSC, RDY, BUSREQ, etc.)
pub trait Bus {
    type Address: Copy + Into<u64>; // u16 for Z80, u32 for 68K
    type Data; // u8 or u16

    fn read(&mut self, master: BusMaster, addr: Self::Address) -> Self::Data;
    fn write(&mut self, master: BusMaster, addr: Self::Address, data: Self::Data);

    /// Read from I/O port address space (separate from memory on Z80).
    /// Default maps to memory read; override for CPUs with separate I/O.
    fn io_read(&mut self, master: BusMaster, addr: Self::Address) -> Self::Data {
        self.read(master, addr)
    }

    /// Write to I/O port address space (separate from memory on Z80).
    /// Default maps to memory write; override for CPUs with separate I/O.
    fn io_write(&mut self, master: BusMaster, addr: Self::Address, data: Self::Data) {
        self.write(master, addr, data)
    }

    /// Check if the bus is halted for this master (TSC/RDY/BUSREQ, or a
    /// VDP DMA in progress burning the 68K).
    fn is_halted_for(&self, master: BusMaster) -> bool;

    /// Generic interrupt query. CPUs pick what they need.
    fn check_interrupts(&self, target: BusMaster) -> InterruptState;
}

/// Interrupt lines visible to a bus master. `irq_level` is the 68000's
/// 3-bit priority (1..7, 0 = none); `irq`/`nmi` are the Z80's two lines.
#[derive(Default, Clone, Copy, Debug)]
pub struct InterruptState {
    pub irq_level: u8,
    pub irq: bool,
    pub nmi: bool,
}
