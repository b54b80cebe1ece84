// Device access used by the transfer helpers

use super::TransportResult;

/// Block-level access to a radio's memory banks.
///
/// Implementations wrap a USB or serial link. All calls are blocking;
/// run a transfer through the `*_in_background` helpers to keep an async
/// front end responsive.
pub trait RadioInterface: Send {
    /// Human readable name of the connected device
    fn identifier(&self) -> String;

    /// Enter programming mode
    fn start(&mut self) -> TransportResult<()> {
        Ok(())
    }

    /// Read `buf.len()` bytes from `address` of `bank`
    fn read(&mut self, bank: u32, address: u32, buf: &mut [u8]) -> TransportResult<()>;

    /// Write `data` to `address` of `bank`
    fn write(&mut self, bank: u32, address: u32, data: &[u8]) -> TransportResult<()>;

    /// Leave programming mode, the device usually reboots
    fn finish(&mut self) -> TransportResult<()> {
        Ok(())
    }
}
