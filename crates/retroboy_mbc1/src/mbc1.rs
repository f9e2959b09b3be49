use std::sync::Arc;

use log::{debug, trace};

use crate::header::{CartridgeHeader, HeaderError};
use crate::image::{Ram, Rom};
use crate::{BusDevice, OPEN_BUS};

/// Low nibble that must be written to `$0000–$1FFF` to enable external RAM.
const RAM_ENABLE_MAGIC: u8 = 0x0A;

/// Banking mode selected through `$6000–$7FFF`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum Mode {
    /// The two high bank bits only extend the switchable ROM bank number.
    #[default]
    Mode0,
    /// The two high bank bits also select the RAM bank and the bank mapped
    /// into the "fixed" `$0000–$3FFF` window (0, 32, 64 or 96).
    Mode1,
}

/// Snapshot of the MBC1 write-only registers.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Latches {
    pub ram_enable: bool,
    pub banking_mode: Mode,
    /// Bits 0–4 of the ROM bank number. Always in the range 1–31.
    pub rom_bank_low5: u8,
    /// Secondary 2-bit bank register. Bits 5–6 of the ROM bank number, and
    /// the RAM bank number in mode 1.
    pub rom_bank_high2: u8,
}

impl Default for Latches {
    fn default() -> Self {
        Self {
            ram_enable: false,
            banking_mode: Mode::Mode0,
            rom_bank_low5: 1, // bank 1 by default
            rom_bank_high2: 0,
        }
    }
}

/// Where a bus address lands once it has been decoded.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Target {
    Rom(usize),
    Ram(usize),
    None,
}

/// MBC1 cartridge controller.
///
/// The 16-bit address space is split into eight 8 KiB windows by address
/// bits 13–15. Windows 0–3 read from ROM and double as the four register
/// ports on write; window 5 is the external RAM. Everything else belongs to
/// other devices and reads as open bus.
///
/// ROM and RAM sizes are expected to be powers of two. Physical offsets are
/// masked with `size - 1`, so bank numbers larger than the image silently
/// wrap around the way they do on a real board with fewer address lines
/// wired.
pub struct Mbc1 {
    rom: Rom,
    ram: Ram,
    latches: Latches,
    rom_mask: usize,
    ram_mask: usize,
}

impl Mbc1 {
    pub fn new(rom: Rom, ram_size: usize) -> Self {
        let rom_mask = rom.size().saturating_sub(1);
        let ram_mask = ram_size.saturating_sub(1);
        debug!(
            "[mbc1] {} KiB ROM ({} banks), {} KiB RAM",
            rom.size() / 1024,
            rom.size() / crate::ROM_BANK_SIZE,
            ram_size / 1024
        );

        Self {
            rom,
            ram: Ram::new(ram_size),
            latches: Latches::default(),
            rom_mask,
            ram_mask,
        }
    }

    /// Builds a controller for a full cartridge image, taking the RAM size
    /// from the cartridge header.
    pub fn from_image(image: impl Into<Arc<[u8]>>) -> Result<Self, HeaderError> {
        let rom = Rom::new(image);
        let header = CartridgeHeader::parse(rom.as_bytes())?;
        Ok(Self::new(rom, header.ram_size))
    }

    pub fn rom(&self) -> &Rom {
        &self.rom
    }

    pub fn ram(&self) -> &Ram {
        &self.ram
    }

    pub(crate) fn ram_mut(&mut self) -> &mut Ram {
        &mut self.ram
    }

    pub fn latches(&self) -> Latches {
        self.latches
    }

    /// The two bank bits that apply to the `$0000–$3FFF` ROM window and to
    /// the RAM window: zero in mode 0, the secondary register in mode 1.
    pub fn msb2(&self) -> u8 {
        match self.latches.banking_mode {
            Mode::Mode0 => 0,
            Mode::Mode1 => self.latches.rom_bank_high2,
        }
    }

    /// ROM bank currently visible at `$4000–$7FFF`, after wraparound.
    pub fn rom_bank(&self) -> usize {
        self.rom_address(self.latches.rom_bank_high2, self.latches.rom_bank_low5, 0) >> 14
    }

    /// RAM bank currently visible at `$A000–$BFFF`, after wraparound.
    pub fn ram_bank(&self) -> usize {
        self.ram_address(0) >> 13
    }

    /// Maps a bus address to a physical ROM/RAM offset using the current
    /// latches. RAM offsets are produced even while RAM is disabled; the
    /// enable latch only gates the actual access.
    pub fn decode(&self, address: u16) -> Target {
        match address >> 13 {
            0 | 1 => Target::Rom(self.rom_address(self.msb2(), 0, address)),
            2 | 3 => Target::Rom(self.rom_address(
                self.latches.rom_bank_high2,
                self.latches.rom_bank_low5,
                address,
            )),
            5 => Target::Ram(self.ram_address(address)),
            _ => Target::None,
        }
    }

    #[inline]
    fn rom_address(&self, bits_20_19: u8, bits_18_14: u8, address: u16) -> usize {
        (((bits_20_19 as usize) << 19) | ((bits_18_14 as usize) << 14) | (address & 0x3FFF) as usize)
            & self.rom_mask
    }

    #[inline]
    fn ram_address(&self, address: u16) -> usize {
        (((self.msb2() as usize) << 13) | (address & 0x1FFF) as usize) & self.ram_mask
    }

    fn write_register(&mut self, window: u16, value: u8) {
        match window {
            0 => {
                // RAM enable: lower 4 bits must be 0x0A, anything else
                // write-protects the RAM again.
                self.latches.ram_enable = (value & 0x0F) == RAM_ENABLE_MAGIC;
            }
            1 => {
                // Bank 0 cannot be selected through this register.
                self.latches.rom_bank_low5 = (value & 0x1F).max(1);
                trace!("[mbc1] ROM bank -> {}", self.rom_bank());
            }
            2 => {
                self.latches.rom_bank_high2 = value & 0x03;
                trace!(
                    "[mbc1] high bank bits -> {} (ROM bank {}, RAM bank {})",
                    self.latches.rom_bank_high2,
                    self.rom_bank(),
                    self.ram_bank()
                );
            }
            3 => {
                let mode = if value & 0x01 != 0 {
                    Mode::Mode1
                } else {
                    Mode::Mode0
                };
                if mode != self.latches.banking_mode {
                    debug!("[mbc1] banking mode {:?} -> {:?}", self.latches.banking_mode, mode);
                }
                self.latches.banking_mode = mode;
            }
            _ => unreachable!("window {window} is not a register port"),
        }
    }
}

impl BusDevice for Mbc1 {
    fn read(&self, address: u16) -> u8 {
        match self.decode(address) {
            Target::Rom(offset) => self.rom.read(offset),
            Target::Ram(offset) if self.latches.ram_enable => self.ram.read(offset),
            Target::Ram(_) | Target::None => OPEN_BUS,
        }
    }

    fn write(&mut self, address: u16, data: u8) {
        let window = address >> 13;
        match window {
            0..=3 => self.write_register(window, data),
            5 if self.latches.ram_enable => {
                let offset = self.ram_address(address);
                self.ram.write(offset, data);
            }
            _ => {}
        }
    }
}
