//! Top-level system: wires the CPU, bus, PPU, and controller into one runnable unit.
//!
//! [`Nes::step_frame`] runs the CPU until a PPU frame completes and hands back the rendered RGBA
//! buffer; [`Nes::latch_buttons`] feeds controller input in from whatever front end is driving it.

use crate::bus::{Bus, NesBus};
use crate::cartridge::cartridge::Cartridge;
use crate::cpu::cpu::CPU;
use crate::ppu::renderer;

/// A runnable NES: CPU wired to the standard bus (RAM, PPU, controller, cartridge).
pub struct Nes {
    cpu: CPU<NesBus>,
}

impl Nes {
    /// Build a fresh system from a loaded cartridge and run the reset sequence.
    pub fn new(cart: Cartridge) -> Self {
        let bus = NesBus::new(cart);
        let mut cpu = CPU::new(bus);
        cpu.reset();
        Self { cpu }
    }

    /// Run the CPU until the PPU completes a frame, then render it to a 256×256 RGBA buffer.
    /// Returns `None` if the CPU hit a JAM/KIL opcode and halted before a frame finished.
    pub fn step_frame(&mut self) -> Option<Vec<u8>> {
        loop {
            if self.cpu.halted {
                return None;
            }
            self.cpu.step();
            if let Some(frame) = self.cpu.bus.take_frame() {
                return Some(renderer::render(&frame));
            }
        }
    }

    /// Latch the current button state (see [`Controller`](crate::controller::Controller) bit
    /// order) into controller port 1.
    pub fn latch_buttons(&mut self, buttons: u8) {
        self.cpu.bus.controller.buttons = buttons;
    }

    pub fn halted(&self) -> bool {
        self.cpu.halted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::mapper::Mirroring;
    use crate::cartridge::mapper::mapper0::Mapper0;

    fn blank_cart() -> Cartridge {
        Cartridge {
            mapper: Box::new(Mapper0::new(vec![0xEA; 32 * 1024], vec![0; 8 * 1024], Mirroring::Horizontal)),
        }
    }

    #[test]
    fn step_frame_returns_a_full_size_buffer() {
        let mut nes = Nes::new(blank_cart());
        let frame = nes.step_frame().expect("cpu should not halt on a field of NOPs");
        assert_eq!(frame.len(), 256 * 256 * 4);
    }
}
