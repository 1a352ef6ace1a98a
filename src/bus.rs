//! Memory bus and address decoding for the NES.
//!
//! Implements the [CPU memory map](https://www.nesdev.org/wiki/CPU_memory_map):
//!
//! | Range       | Size   | Device |
//! |-------------|--------|--------|
//! | $0000–$07FF | 2 KiB  | Internal RAM |
//! | $0800–$1FFF | mirror | Mirrors of $0000–$07FF (incomplete decode) |
//! | $2000–$2007 | 8 B    | [PPU registers](https://www.nesdev.org/wiki/PPU_registers) (mirrored every 8 bytes to $3FFF) |
//! | $4000–$4017 |        | APU (unimplemented; open bus) and I/O ($4014 = OAM DMA, $4016 = controller) |
//! | $4018–$7FFF |        | Unmapped / cartridge (e.g. PRG RAM at $6000–$7FFF) |
//! | $8000–$FFFF |        | Cartridge PRG ROM and mapper registers |
//!
//! PPU runs at 3× CPU clock; each `tick(cycles)` advances it by `cycles*3`.

use crate::cartridge::cartridge::Cartridge;
use crate::controller::Controller;
use crate::dma::OamDma;
use crate::interrupts::Interrupts;
use crate::ppu::frame::Frame;
use crate::ppu::ppu::PPU;

/// Trait for memory-mapped I/O and bus access used by the CPU.
/// See NESdev "CPU memory map" for read/write behavior and open bus.
pub trait Bus {
    fn read(&mut self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, data: u8);
    fn tick(&mut self, cycles: usize);
    fn poll_nmi(&mut self) -> bool;
    fn poll_irq(&mut self) -> bool;
    /// Run any pending OAM DMA transfer, returning the CPU stall cost in cycles (0 if none armed).
    fn service_dma(&mut self) -> usize;
}

/// Main NES bus: 2 KiB internal RAM, PPU, cartridge, controller, OAM DMA unit, and the shared
/// NMI/IRQ interrupt lines. Decoding matches the NES 2A03 address map; unmapped reads return 0
/// (open bus).
pub struct NesBus {
    /// Internal RAM; $0000–$07FF is the only physical RAM; $0800–$1FFF mirror it (addr & $07FF).
    pub ram: [u8; 2048],
    pub cart: Cartridge,
    pub ppu: PPU,
    /// Controller port 1 ($4016). Port 2 ($4017) not implemented.
    pub controller: Controller,
    dma: OamDma,
    interrupts: Interrupts,
    last_frame: Option<Frame>,
}

impl NesBus {
    /// Create a new bus with the given cartridge.
    pub fn new(cart: Cartridge) -> Self {
        Self {
            ram: [0; 2048],
            cart,
            ppu: PPU::new(),
            controller: Controller::new(),
            dma: OamDma::new(),
            interrupts: Interrupts::new(),
            last_frame: None,
        }
    }

    /// Take the most recently completed frame, if one finished since the last call.
    pub fn take_frame(&mut self) -> Option<Frame> {
        self.last_frame.take()
    }
}

impl Bus for NesBus {
    fn read(&mut self, addr: u16) -> u8 {
        match addr {
            // $0000–$1FFF: Internal RAM; addresses incompletely decoded → 4 mirrors (addr & $07FF).
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],
            // $2000–$3FFF: PPU registers; incompletely decoded → repeat every 8 bytes. $2002=PPUSTATUS,
            // $2004=OAMDATA, $2007=PPUDATA are readable; others return open bus (e.g. $40).
            0x2000..=0x3FFF => {
                let r = addr & 0x2007;
                match r {
                    0x2002 => self.ppu.read_status(),
                    0x2004 => self.ppu.read_oam_data(),
                    0x2007 => self.ppu.read_data(&mut self.cart),
                    _ => 0, // Write-only or unused; open bus reads as 0.
                }
            }
            // $4000–$4015, $4017–$401F: no APU implemented; open bus reads as 0.
            0x4000..=0x4015 | 0x4017..=0x401F => 0,
            0x4016 => self.controller.read(),
            // $4020–$7FFF: Unmapped; available for cartridge (e.g. PRG RAM $6000–$7FFF). Open bus reads as 0.
            0x4020..=0x7FFF => 0,
            // $8000–$FFFF: Cartridge PRG ROM (and fixed last bank for vectors $FFFA–$FFFF).
            0x8000..=0xFFFF => self.cart.read(addr),
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize] = data,
            // PPU: $2000=PPUCTRL, $2001=PPUMASK, $2003=OAMADDR, $2004=OAMDATA, $2005=PPUSCROLL,
            // $2006=PPUADDR, $2007=PPUDATA. Writes to $2002 (PPUSTATUS) are ignored.
            0x2000..=0x3FFF => {
                let r = addr & 0x2007;
                match r {
                    0x2000 => self.ppu.write_ctrl(data),
                    0x2001 => self.ppu.write_mask(data),
                    0x2003 => self.ppu.write_oam_addr(data),
                    0x2004 => self.ppu.write_oam_data(data),
                    0x2005 => self.ppu.write_scroll(data),
                    0x2006 => self.ppu.write_addr(data),
                    0x2007 => self.ppu.write_data(&mut self.cart, data),
                    _ => {}
                }
            }
            0x4000..=0x4013 | 0x4015 | 0x4017 => {} // no APU implemented.
            0x4014 => self.dma.write(data),          // OAMDMA: arms a 256-byte copy from page `data`.
            0x4016 => self.controller.write(data),   // Latch (bit 0): 1=strobe, then read $4016 for bits.
            0x4018..=0x401F => {}
            0x4020..=0x7FFF => {}
            // Cartridge: mapper registers (e.g. bank select).
            0x8000..=0xFFFF => self.cart.write(addr, data),
        }
    }

    /// Advance the PPU by `cycles*3` dots. Captures the finished frame (if any) for `take_frame`.
    fn tick(&mut self, cycles: usize) {
        if let Some(frame) = self.ppu.run(cycles * 3, &mut self.cart, &mut self.interrupts) {
            self.last_frame = Some(frame);
        }
    }

    /// Edge-consume a pending NMI raised by the PPU at vblank start.
    fn poll_nmi(&mut self) -> bool {
        self.interrupts.take_nmi()
    }

    /// Edge-consume a pending IRQ. Nothing currently raises one (no mapper IRQ, no APU), but the
    /// line exists so a future mapper can use it without touching the CPU.
    fn poll_irq(&mut self) -> bool {
        self.interrupts.take_irq()
    }

    fn service_dma(&mut self) -> usize {
        if self.dma.is_pending() {
            self.dma.run(&self.ram, &mut self.ppu)
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::mapper::Mirroring;
    use crate::cartridge::mapper::mapper0::Mapper0;

    fn test_bus() -> NesBus {
        let mapper = Mapper0::new(vec![0; 32 * 1024], vec![0; 8 * 1024], Mirroring::Horizontal);
        let cart = Cartridge { mapper: Box::new(mapper) };
        NesBus::new(cart)
    }

    #[test]
    fn ram_mirrors_every_two_kilobytes() {
        let mut bus = test_bus();
        bus.write(0x0000, 0x42);
        assert_eq!(bus.read(0x0800), 0x42);
        assert_eq!(bus.read(0x1000), 0x42);
        assert_eq!(bus.read(0x1800), 0x42);
    }

    #[test]
    fn ppu_registers_mirror_every_eight_bytes() {
        let mut bus = test_bus();
        bus.write(0x2000, 0x80);
        assert_eq!(bus.ppu.ctrl, 0x80);
        bus.write(0x2008, 0x10);
        assert_eq!(bus.ppu.ctrl, 0x10);
    }

    #[test]
    fn oam_dma_write_arms_transfer_and_tick_drains_it() {
        let mut bus = test_bus();
        bus.ram[0x0200] = 0xAB;
        bus.write(0x4014, 0x02);
        assert!(bus.dma.is_pending());
        let cycles = bus.service_dma();
        assert_eq!(cycles, crate::dma::OAM_DMA_CYCLES);
        assert_eq!(bus.ppu.oam[0], 0xAB);
        assert!(!bus.dma.is_pending());
    }
}
