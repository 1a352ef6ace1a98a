//! nescoil: an NES (Nintendo Entertainment System) emulator core.
//!
//! ## Modules
//!
//! - **bus** – Memory map, PPU/controller/cartridge access, OAM DMA dispatch
//! - **cartridge** – iNES loading (NROM only)
//! - **controller** – NES controller shift-register protocol
//! - **cpu** – 6502 instruction set and execution
//! - **dma** – OAM DMA transfer unit
//! - **interrupts** – Shared NMI/IRQ lines between CPU and PPU
//! - **nes** – Top-level system wiring CPU, bus, and PPU together
//! - **ppu** – Background/sprite tile accumulation, palettes, frame rendering

pub mod bus;
pub mod cartridge;
pub mod controller;
pub mod cpu;
pub mod dma;
pub mod interrupts;
pub mod nes;
pub mod ppu;
