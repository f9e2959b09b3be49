use log::warn;
use thiserror::Error;

/// Cartridge header fields needed to wire up an MBC1 board.
///
/// See Pan Docs "The Cartridge Header": the title lives at `$0134–$0143`,
/// the cartridge type at `$0147`, the ROM size code at `$0148` and the RAM
/// size code at `$0149`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CartridgeHeader {
    pub title: String,
    pub cartridge_type: CartridgeType,
    /// ROM size declared by the header, in bytes.
    pub rom_size: usize,
    /// External RAM size declared by the header, in bytes.
    pub ram_size: usize,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CartridgeType {
    Mbc1,
    Mbc1Ram,
    Mbc1RamBattery,
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum HeaderError {
    #[error("image is {0} bytes, too short to contain a cartridge header")]
    TooShort(usize),
    #[error("cartridge type {0:#04x} is not an MBC1 board")]
    UnsupportedCartridgeType(u8),
    #[error("ROM size code {0:#04x} is not valid for MBC1")]
    UnsupportedRomSize(u8),
    #[error("RAM size code {0:#04x} is not valid for MBC1")]
    UnsupportedRamSize(u8),
}

const TITLE: std::ops::Range<usize> = 0x0134..0x0144;
const CARTRIDGE_TYPE: usize = 0x0147;
const ROM_SIZE: usize = 0x0148;
const RAM_SIZE: usize = 0x0149;
const HEADER_END: usize = 0x0150;

impl CartridgeHeader {
    pub fn parse(image: &[u8]) -> Result<Self, HeaderError> {
        if image.len() < HEADER_END {
            return Err(HeaderError::TooShort(image.len()));
        }

        let cartridge_type = match image[CARTRIDGE_TYPE] {
            0x01 => CartridgeType::Mbc1,
            0x02 => CartridgeType::Mbc1Ram,
            0x03 => CartridgeType::Mbc1RamBattery,
            other => return Err(HeaderError::UnsupportedCartridgeType(other)),
        };

        // 32 KiB << code. MBC1 tops out at 2 MiB (128 banks).
        let rom_size = match image[ROM_SIZE] {
            code @ 0x00..=0x06 => 0x8000 << code,
            other => return Err(HeaderError::UnsupportedRomSize(other)),
        };

        // MBC1 can address at most four 8 KiB RAM banks.
        let ram_size = match image[RAM_SIZE] {
            0x00 => 0,
            0x01 => 0x800,
            0x02 => 0x2000,
            0x03 => 0x8000,
            other => return Err(HeaderError::UnsupportedRamSize(other)),
        };

        if cartridge_type == CartridgeType::Mbc1 && ram_size != 0 {
            warn!("[mbc1] header declares {ram_size} bytes of RAM on a board without RAM");
        }
        if rom_size != image.len() {
            warn!(
                "[mbc1] header declares a {} byte ROM but the image is {} bytes",
                rom_size,
                image.len()
            );
        }

        let title = image[TITLE]
            .iter()
            .take_while(|&&b| b != 0)
            .map(|&b| b as char)
            .collect::<String>()
            .trim_end()
            .to_string();

        Ok(Self {
            title,
            cartridge_type,
            rom_size,
            ram_size,
        })
    }

    /// Whether the external RAM is battery-backed and should be persisted.
    pub fn has_battery(&self) -> bool {
        self.cartridge_type == CartridgeType::Mbc1RamBattery
    }
}
