/// A device mapped into the 16-bit CPU address space.
///
/// The enclosing bus decides which address ranges are routed to a device;
/// the device only sees the raw address. Address and data widths are part of
/// the signature, so out-of-range values cannot reach an implementation.
pub trait BusDevice {
    /// Returns the byte at `address`, or [`crate::OPEN_BUS`] when the device
    /// does not drive the bus there.
    fn read(&self, address: u16) -> u8;

    /// Handles a CPU write. Writes a device does not care about are ignored.
    fn write(&mut self, address: u16, data: u8);
}
