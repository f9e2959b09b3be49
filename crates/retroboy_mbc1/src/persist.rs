//! Battery RAM persistence.
//!
//! The save format is the raw RAM image: no header, length equal to the
//! cartridge RAM size. Only RAM contents are persisted; the bank latches
//! always start from their power-on values.

use std::io::{self, Read, Write};

use log::{info, warn};
use thiserror::Error;

use crate::Mbc1;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("battery RAM I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("battery image is {actual} bytes, cartridge RAM is {expected} bytes")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("battery image is longer than the {expected} bytes of cartridge RAM")]
    Oversized { expected: usize },
}

impl Mbc1 {
    /// Writes the whole RAM image to `sink`.
    ///
    /// A failure leaves the sink in an unspecified state; nothing is rolled
    /// back.
    pub fn save_ram<W: Write>(&self, mut sink: W) -> Result<(), PersistError> {
        sink.write_all(self.ram().as_bytes())?;
        sink.flush()?;
        info!("[mbc1] saved {} bytes of battery RAM", self.ram().size());
        Ok(())
    }

    /// Replaces the RAM image with exactly `ram().size()` bytes from
    /// `source`.
    ///
    /// At most one byte past the image is read, so an endless source is
    /// rejected instead of drained. The image is staged and only committed
    /// once it is complete, so on error the RAM is left untouched.
    pub fn load_ram<R: Read>(&mut self, source: R) -> Result<(), PersistError> {
        let expected = self.ram().size();
        let mut staged = Vec::with_capacity(expected + 1);
        // One byte past the image is enough to tell an oversized source apart
        // without draining it.
        source.take(expected as u64 + 1).read_to_end(&mut staged)?;

        if staged.len() > expected {
            warn!("[mbc1] rejected battery image longer than {expected} bytes");
            return Err(PersistError::Oversized { expected });
        }
        if staged.len() < expected {
            let actual = staged.len();
            warn!("[mbc1] rejected battery image of {actual} bytes, expected {expected}");
            return Err(PersistError::SizeMismatch { expected, actual });
        }

        self.ram_mut().restore(&staged);
        info!("[mbc1] restored {expected} bytes of battery RAM");
        Ok(())
    }
}
