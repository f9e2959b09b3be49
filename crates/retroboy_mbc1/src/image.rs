use std::sync::Arc;

use crate::OPEN_BUS;

/// Read-only cartridge ROM image.
///
/// Cloning a `Rom` shares the bytes with the original, so the host can keep
/// its own handle to the image while the controller reads from it.
#[derive(Clone, Debug)]
pub struct Rom {
    data: Arc<[u8]>,
}

impl Rom {
    pub fn new(data: impl Into<Arc<[u8]>>) -> Self {
        Self { data: data.into() }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Reads the byte at `offset`. Only an empty image can be indexed out of
    /// range once the controller has masked the offset; that yields
    /// [`OPEN_BUS`].
    #[inline]
    pub fn read(&self, offset: usize) -> u8 {
        self.data.get(offset).copied().unwrap_or(OPEN_BUS)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// External cartridge RAM, zero-filled at power-on.
#[derive(Clone, Debug)]
pub struct Ram {
    data: Box<[u8]>,
}

impl Ram {
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0; size].into_boxed_slice(),
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn read(&self, offset: usize) -> u8 {
        self.data.get(offset).copied().unwrap_or(OPEN_BUS)
    }

    #[inline]
    pub fn write(&mut self, offset: usize, data: u8) {
        if let Some(slot) = self.data.get_mut(offset) {
            *slot = data;
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Replaces the whole image. `bytes` must be exactly `size()` long.
    pub(crate) fn restore(&mut self, bytes: &[u8]) {
        self.data.copy_from_slice(bytes);
    }
}
