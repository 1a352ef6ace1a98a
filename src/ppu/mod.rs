//! PPU (Picture Processing Unit) emulation for the NES.
//!
//! Handles scanline timing, background and sprite tile accumulation, nametable mirroring, palette
//! RAM, and OAM (sprites). [`frame`] defines the handoff type from the timing state machine to
//! [`renderer`], which turns a completed frame into a 256×256 RGBA byte buffer.

pub mod frame;
pub mod ppu;
pub mod renderer;
