/// Refer to datasheet:
/// https://www.winbond.com/resource-files/w25q64fv%20revq%2006142016.pdf
use crate::command::{Command, EraseUnit};
use crate::error::Error;
use crate::register::{DeviceId, JedecId, Status};
use crate::traits::{HardwareFlashDevice, Monotonic};
use crate::transport::{self, Data, Frame};
use crate::{BUSY_POLL_INTERVAL_MS, CAPACITY, PAGE_SIZE};
use core::fmt::Debug;
use embedded_hal::delay::DelayNs;
use embedded_hal::spi::SpiDevice;

/// Blocking W25Q64FV driver.
///
/// `SPI` owns the chip-select line; `T` provides the settle delays and the
/// millisecond clock that bounds busy-waits.
pub struct W25q64fv<SPI, T> {
    spi: SPI,
    timer: T,
    /// Mirror of the chip's write enable latch. The chip can clear its latch
    /// on its own, so this is a hint that saves a round-trip, never a
    /// guarantee.
    write_enabled: bool,
}

impl<SPI, T> Debug for W25q64fv<SPI, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("W25q64fv")
            .field("write_enabled", &self.write_enabled)
            .finish()
    }
}

impl<SPI, T> W25q64fv<SPI, T>
where
    SPI: SpiDevice,
    T: DelayNs + Monotonic,
{
    /// Wraps the bus without talking to the chip. Call [`begin`](Self::begin)
    /// before anything else.
    pub fn new(spi: SPI, timer: T) -> Self {
        Self {
            spi,
            timer,
            write_enabled: false,
        }
    }

    /// [`new`](Self::new) followed by [`begin`](Self::begin).
    pub fn init(spi: SPI, timer: T) -> Result<Self, Error<SPI>> {
        let mut this = Self::new(spi, timer);
        this.begin()?;
        Ok(this)
    }

    /// Gives the bus and timer back.
    pub fn release(self) -> (SPI, T) {
        (self.spi, self.timer)
    }

    /// Probes the chip and resets it to its power-on state.
    ///
    /// Fails with [`Error::CommunicationFail`] without resetting when the
    /// manufacturer/device ID read back is implausible.
    pub fn begin(&mut self) -> Result<(), Error<SPI>> {
        let id = self.read_device_id()?;
        if !id.is_plausible() {
            warn!("Implausible device ID: {:?}", id);
            return Err(Error::CommunicationFail);
        }
        debug!("Found device: {:?}", id);
        self.reset()
    }

    /// Whether the driver believes the write enable latch is set.
    pub fn write_enable_tracked(&self) -> bool {
        self.write_enabled
    }

    /// Sets the write enable latch (datasheet 8.2.1).
    pub fn enable_writing(&mut self) -> Result<(), Error<SPI>> {
        self.issue(Command::WriteEnable, 0, Data::None)?;
        self.write_enabled = true;
        Ok(())
    }

    /// Clears the write enable latch (datasheet 8.2.3).
    pub fn disable_writing(&mut self) -> Result<(), Error<SPI>> {
        self.issue(Command::WriteDisable, 0, Data::None)?;
        self.write_enabled = false;
        Ok(())
    }

    /// Programs one full page. `addr` should be page aligned: the chip wraps
    /// to the start of the page instead of crossing into the next one.
    ///
    /// Does not wait for the program to finish; follow with
    /// [`wait_until_free`](Self::wait_until_free) before the next command.
    pub fn write_page(&mut self, addr: u32, buf: &[u8; PAGE_SIZE]) -> Result<(), Error<SPI>> {
        self.program(addr, buf)
    }

    /// Programs 1 to 256 bytes within one page (datasheet 8.2.13).
    pub fn program(&mut self, addr: u32, data: &[u8]) -> Result<(), Error<SPI>> {
        if data.is_empty() || data.len() > PAGE_SIZE || addr >= CAPACITY {
            return Err(Error::NotValid);
        }
        self.guarded(Command::PageProgram, addr, Data::Write(data), false)
    }

    /// Reads one full page.
    pub fn read_page(&mut self, addr: u32, buf: &mut [u8; PAGE_SIZE]) -> Result<(), Error<SPI>> {
        self.read(addr, buf)
    }

    /// Reads `buf.len()` bytes starting at `addr` (datasheet 8.2.6). The chip
    /// streams across page boundaries, so any length up to the end of the
    /// array is accepted.
    pub fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), Error<SPI>> {
        if u64::from(addr) + buf.len() as u64 > u64::from(CAPACITY) || addr >= CAPACITY {
            return Err(Error::NotValid);
        }
        if buf.is_empty() {
            return Ok(());
        }
        self.issue(Command::ReadData, addr, Data::Read(buf))
    }

    /// Erases `unit`. With `hold` the call returns only once the chip is
    /// ready again, or with [`Error::Timeout`].
    pub fn erase(&mut self, unit: EraseUnit, hold: bool) -> Result<(), Error<SPI>> {
        if unit.address() >= CAPACITY {
            return Err(Error::NotValid);
        }
        self.guarded(unit.command(), unit.address(), Data::None, hold)
    }

    /// Sector erase (see datasheet 8.2.15)
    pub fn erase_sector(&mut self, addr: u32, hold: bool) -> Result<(), Error<SPI>> {
        self.erase(EraseUnit::Sector(addr), hold)
    }

    /// 32KB Block Erase (see datasheet 8.2.16)
    pub fn erase_block_32(&mut self, addr: u32, hold: bool) -> Result<(), Error<SPI>> {
        self.erase(EraseUnit::Block32(addr), hold)
    }

    /// 64KB Block Erase (see datasheet 8.2.17)
    pub fn erase_block_64(&mut self, addr: u32, hold: bool) -> Result<(), Error<SPI>> {
        self.erase(EraseUnit::Block64(addr), hold)
    }

    /// Chip Erase (see datasheet 8.2.18). Holding waits up to
    /// [`CHIP_ERASE_TIMEOUT_MS`](crate::CHIP_ERASE_TIMEOUT_MS).
    pub fn erase_chip(&mut self, hold: bool) -> Result<(), Error<SPI>> {
        self.erase(EraseUnit::Chip, hold)
    }

    /// Reads the JEDEC manufacturer/device identification.
    pub fn get_jedec(&mut self) -> Result<JedecId, Error<SPI>> {
        let mut response = [0u8; 3];
        self.issue(Command::JedecId, 0, Data::Read(&mut response))?;
        Ok(JedecId::from_bytes(response))
    }

    /// Reads the manufacturer and device ID (instruction 90h).
    pub fn read_device_id(&mut self) -> Result<DeviceId, Error<SPI>> {
        let mut response = [0u8; 5];
        self.issue(Command::ManufacturerDeviceId, 0, Data::Read(&mut response))?;
        Ok(DeviceId::from_response(response))
    }

    /// Reads status register 1.
    pub fn read_status(&mut self) -> Result<Status, Error<SPI>> {
        let mut response = [0u8; 1];
        self.send(Command::ReadStatus1, 0, Data::Read(&mut response))?;
        Ok(Status::from_bits_truncate(response[0]))
    }

    pub fn busy(&mut self) -> Result<bool, Error<SPI>> {
        Ok(self.read_status()?.is_busy())
    }

    /// Reads the real write enable latch rather than the tracked copy.
    pub fn is_write_enabled(&mut self) -> Result<bool, Error<SPI>> {
        Ok(self.read_status()?.is_write_enabled())
    }

    /// Polls the busy bit every millisecond until it clears, or until
    /// `max_timeout_ms` have passed and a last poll still reports busy.
    pub fn wait_until_free(&mut self, max_timeout_ms: u64) -> Result<(), Error<SPI>> {
        let start = self.timer.now_ms();
        while self.busy()? && self.timer.now_ms().saturating_sub(start) < max_timeout_ms {
            self.timer.delay_ms(BUSY_POLL_INTERVAL_MS);
        }
        if self.busy()? {
            warn!("Still busy after {=u64} ms", max_timeout_ms);
            return Err(Error::Timeout);
        }
        Ok(())
    }

    /// Software reset (see datasheet 8.2.43)
    /// Enable Reset (66h) immediately followed by Reset (99h). The device
    /// takes about 30μs (tRST) to reset, during which no instruction is
    /// accepted.
    pub fn reset(&mut self) -> Result<(), Error<SPI>> {
        self.issue(Command::EnableReset, 0, Data::None)?;
        self.send(Command::Reset, 0, Data::None)?;
        self.write_enabled = false;
        Ok(())
    }

    /// Enters the low-power state. Only
    /// [`release_power_down`](Self::release_power_down) is accepted afterwards.
    pub fn power_down(&mut self) -> Result<(), Error<SPI>> {
        self.issue(Command::PowerDown, 0, Data::None)
    }

    /// Leaves the low-power state. Sent unconditionally since a powered-down
    /// chip cannot answer a status read.
    pub fn release_power_down(&mut self) -> Result<(), Error<SPI>> {
        self.issue(Command::ReleasePowerDown, 0, Data::None)
    }

    /// Runs a program or erase: refuses while busy, sets the write enable
    /// latch if it is not known to be set, issues the command and optionally
    /// waits for the chip to finish.
    fn guarded(
        &mut self,
        command: Command,
        addr: u32,
        data: Data<'_>,
        hold: bool,
    ) -> Result<(), Error<SPI>> {
        debug_assert!(command.needs_write_enable());
        if self.busy()? {
            return Err(Error::Busy);
        }
        if !self.write_enabled {
            self.enable_writing()?;
        }
        self.send(command, addr, data)?;
        // The chip clears its latch when the operation completes.
        self.write_enabled = false;
        if hold {
            self.wait_until_free(command.wait_ceiling_ms())?;
        }
        Ok(())
    }

    /// Sends `command`, first refusing with [`Error::Busy`] if the command
    /// requires an idle chip and the chip reports busy.
    fn issue(&mut self, command: Command, addr: u32, data: Data<'_>) -> Result<(), Error<SPI>> {
        if command.checks_busy() && self.busy()? {
            return Err(Error::Busy);
        }
        self.send(command, addr, data)
    }

    /// Frames and sends `command` in one transaction, then waits out the
    /// command's settle time.
    fn send(&mut self, command: Command, addr: u32, data: Data<'_>) -> Result<(), Error<SPI>> {
        trace!("{:?} @ {=u32:#x}", command, addr);
        transport::transact(&mut self.spi, Frame::new(command, addr, data)).map_err(Error::Spi)?;
        let settle_us = command.settle_us();
        if settle_us > 0 {
            self.timer.delay_us(settle_us);
        }
        Ok(())
    }
}

impl<SPI, T> HardwareFlashDevice for W25q64fv<SPI, T>
where
    SPI: SpiDevice,
    T: DelayNs + Monotonic,
{
    type Error = Error<SPI>;

    fn read(&mut self, addr: u32, data: &mut [u8]) -> Result<(), Error<SPI>> {
        W25q64fv::read(self, addr, data)
    }

    fn sector_erase(&mut self, addr: u32) -> Result<(), Error<SPI>> {
        self.erase_sector(addr, true)
    }

    fn page_program(&mut self, addr: u32, data: &[u8]) -> Result<(), Error<SPI>> {
        self.program(addr, data)?;
        self.wait_until_free(Command::PageProgram.wait_ceiling_ms())
    }

    fn chip_erase(&mut self) -> Result<(), Error<SPI>> {
        self.erase_chip(true)
    }
}
