//! MBC1 memory bank controller for Game Boy cartridges.
//!
//! The controller sits between the CPU bus and the cartridge. It exposes a
//! 16 KiB fixed ROM window, a 16 KiB switchable ROM window and an 8 KiB
//! external RAM window, and translates bus addresses into offsets into much
//! larger ROM/RAM images depending on a handful of write-only latches.

mod battery;
mod bus;
mod header;
mod image;
mod mbc1;
mod persist;

pub use battery::BatteryStore;
pub use bus::BusDevice;
pub use header::{CartridgeHeader, CartridgeType, HeaderError};
pub use image::{Ram, Rom};
pub use mbc1::{Latches, Mbc1, Mode, Target};
pub use persist::PersistError;

/// Value driven on the data bus when nothing responds to a read.
pub const OPEN_BUS: u8 = 0xFF;

/// Size of one switchable ROM bank (mapped at `$4000–$7FFF`).
pub const ROM_BANK_SIZE: usize = 0x4000;

/// Size of one external RAM bank (mapped at `$A000–$BFFF`).
pub const RAM_BANK_SIZE: usize = 0x2000;
