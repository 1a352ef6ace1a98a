//! NES cartridge loading from iNES format (.nes files).
//!
//! Header: 16 bytes (magic "NES\x1A", PRG size × 16 KiB, CHR size × 8 KiB, flags, mapper, etc.).
//! Then PRG ROM, then CHR ROM (or CHR RAM for some mappers). See
//! [INES](https://www.nesdev.org/wiki/INES).

use std::fmt;
use std::fs::File;
use std::io::{self, Read};

use crate::cartridge::mapper::Mirroring;
use crate::cartridge::mapper::mapper::Mapper;
use crate::cartridge::mapper::mapper0::Mapper0;

const HEADER_LEN: usize = 16;
const MAGIC: [u8; 4] = [b'N', b'E', b'S', 0x1A];

/// Errors that can occur while loading an iNES ROM image.
#[derive(Debug)]
pub enum CartridgeError {
    Io(io::Error),
    /// File is shorter than the declared header + PRG + CHR size.
    Truncated,
    /// Missing the "NES\x1A" magic bytes.
    BadSignature,
    /// Mapper number not implemented by this core (only mapper 0 / NROM is supported).
    UnsupportedMapper(u8),
}

impl fmt::Display for CartridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartridgeError::Io(e) => write!(f, "failed to read ROM file: {e}"),
            CartridgeError::Truncated => write!(f, "ROM file is truncated"),
            CartridgeError::BadSignature => write!(f, "not an iNES file (bad signature)"),
            CartridgeError::UnsupportedMapper(id) => write!(f, "unsupported mapper {id}"),
        }
    }
}

impl std::error::Error for CartridgeError {}

impl From<io::Error> for CartridgeError {
    fn from(e: io::Error) -> Self {
        CartridgeError::Io(e)
    }
}

/// Cartridge: holds the mapper that implements PRG ($8000–$FFFF) and CHR ($0000–$1FFF) access.
pub struct Cartridge {
    pub mapper: Box<dyn Mapper>,
}

impl Cartridge {
    /// Load a cartridge from an iNES (.nes) file on disk.
    pub fn load(path: &str) -> Result<Self, CartridgeError> {
        let mut file = File::open(path)?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    /// Parse a cartridge from raw iNES bytes already in memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self, CartridgeError> {
        if data.len() < HEADER_LEN {
            return Err(CartridgeError::Truncated);
        }
        if data[0..4] != MAGIC {
            return Err(CartridgeError::BadSignature);
        }

        let prg_rom_size = data[4] as usize * 16 * 1024;
        let chr_rom_size = data[5] as usize * 8 * 1024;

        let prg_start = HEADER_LEN;
        let prg_end = prg_start + prg_rom_size;
        let chr_start = prg_end;
        let chr_end = chr_start + chr_rom_size;
        if data.len() < chr_end {
            return Err(CartridgeError::Truncated);
        }

        let prg_rom = data[prg_start..prg_end].to_vec();
        let chr_rom = if chr_rom_size > 0 {
            data[chr_start..chr_end].to_vec()
        } else {
            vec![0; 8 * 1024] // CHR RAM
        };

        let mirroring = if data[6] & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };

        let mapper_id = (data[6] >> 4) | (data[7] & 0xF0);
        let mapper: Box<dyn Mapper> = match mapper_id {
            0 => Box::new(Mapper0::new(prg_rom, chr_rom, mirroring)),
            other => return Err(CartridgeError::UnsupportedMapper(other)),
        };

        Ok(Self { mapper })
    }

    /// Read from PRG or CHR depending on address.
    pub fn read(&self, addr: u16) -> u8 {
        self.mapper.read(addr)
    }

    /// Write to CHR RAM or mapper registers.
    pub fn write(&mut self, addr: u16, data: u8) {
        self.mapper.write(addr, data);
    }
}
