use crate::PAGE_SIZE;

/// Monotonic millisecond counter used to bound busy-waits.
///
/// The timer handed to the driver provides this alongside `DelayNs`.
pub trait Monotonic {
    /// Milliseconds since an arbitrary fixed point. Must never go backwards.
    fn now_ms(&mut self) -> u64;
}

pub trait HardwareFlashDevice {
    type Error;

    /// Reads flash contents into `buf`, starting at `addr`.
    fn read(&mut self, addr: u32, data: &mut [u8]) -> Result<(), Self::Error>;

    /// The Sector Erase instruction sets all memory within a specified sector
    /// to the erased state of all 1s (FFh).
    fn sector_erase(&mut self, addr: u32) -> Result<(), Self::Error>;

    /// The Page Program instruction allows from one byte to 256 bytes (a page) of data
    /// to be programmed at previously erased (FFh) memory locations.
    fn page_program(&mut self, addr: u32, data: &[u8]) -> Result<(), Self::Error>;

    /// Chip Erase (see datasheet 8.2.32)
    /// The Chip Erase instruction sets all memory within the device to the erased
    /// state of all 1s (FFh).
    fn chip_erase(&mut self) -> Result<(), Self::Error>;

    /// Size of the programmable unit.
    fn page_size(&self) -> usize {
        PAGE_SIZE
    }
}

#[allow(async_fn_in_trait)]
pub trait AsyncHardwareFlashDevice {
    type Error;

    /// Reads flash contents into `buf`, starting at `addr`.
    async fn read(&mut self, addr: u32, data: &mut [u8]) -> Result<(), Self::Error>;

    /// Sets a 4 KiB sector to all 1s (FFh).
    async fn sector_erase(&mut self, addr: u32) -> Result<(), Self::Error>;

    /// Programs one to 256 bytes within a single page.
    async fn page_program(&mut self, addr: u32, data: &[u8]) -> Result<(), Self::Error>;

    /// Sets the whole array to all 1s (FFh).
    async fn chip_erase(&mut self) -> Result<(), Self::Error>;

    fn page_size(&self) -> usize {
        PAGE_SIZE
    }
}
