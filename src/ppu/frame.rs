//! The value a completed PPU frame hands to the [`Renderer`](super::renderer): a palette snapshot
//! plus the background and sprite tile lists built while the scanlines ran, decoupled from pixel
//! output so rendering stays a pure function of PPU state. See [PPU rendering](https://www.nesdev.org/wiki/PPU_rendering).

/// One 8×8 background tile, already resolved to its palette bank and bitplane-decoded pixels.
///
/// `pattern[row][col]` is a 2-bit color index (0–3) into `palette_id`'s four-entry bank; 0 is the
/// tile's own "transparent" entry, but background compositing (unlike sprites) draws it anyway —
/// see [`Renderer`](super::renderer).
#[derive(Clone)]
pub struct BackgroundTile {
    pub palette_id: u8,
    pub pattern: [[u8; 8]; 8],
}

/// One active sprite, resolved from an OAM entry at the start of the frame.
#[derive(Clone)]
pub struct SpriteTile {
    pub oam_index: u8,
    pub x: u8,
    pub y: u8,
    pub attr: u8,
    pub pattern: [[u8; 8]; 8],
}

impl SpriteTile {
    pub fn palette_id(&self) -> u8 {
        self.attr & 0b11
    }

    /// Bit 5: 1 = sprite drawn behind opaque background pixels.
    pub fn behind_background(&self) -> bool {
        self.attr & 0x20 != 0
    }

    /// Bit 6: horizontal flip.
    pub fn flip_h(&self) -> bool {
        self.attr & 0x40 != 0
    }

    /// Bit 7: vertical flip.
    pub fn flip_v(&self) -> bool {
        self.attr & 0x80 != 0
    }
}

/// Snapshot of one completed PPU frame, emitted once from [`PPU::run`](super::ppu::PPU::run) at
/// the end of the pre-render scanline. Background tiles are listed in raster order, 33 per row
/// (see [`Renderer`](super::renderer) for how the linear index maps back to screen coordinates).
#[derive(Clone)]
pub struct Frame {
    pub palette: [u8; 32],
    pub background: Vec<BackgroundTile>,
    pub sprites: Vec<SpriteTile>,
    pub scroll_x: u8,
    pub scroll_y: u8,
}
