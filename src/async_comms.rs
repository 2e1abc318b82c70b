use core::fmt::Debug;

use crate::command::{Command, EraseUnit};
/// Refer to datasheet:
/// https://www.winbond.com/resource-files/w25q64fv%20revq%2006142016.pdf
use crate::error::Error;
use crate::register::{DeviceId, JedecId, Status};
use crate::traits::{AsyncHardwareFlashDevice, Monotonic};
use crate::transport::{self, Data, Frame};
use crate::{BUSY_POLL_INTERVAL_MS, CAPACITY, PAGE_SIZE};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::spi::SpiDevice;

/// Async W25Q64FV driver. Same operations and guarantees as
/// [`W25q64fv`](crate::W25q64fv); busy-waits yield to the executor between
/// polls instead of blocking.
pub struct AsyncW25q64fv<SPI, T> {
    spi: SPI,
    timer: T,
    write_enabled: bool,
}

impl<SPI, T> Debug for AsyncW25q64fv<SPI, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AsyncW25q64fv")
            .field("write_enabled", &self.write_enabled)
            .finish()
    }
}

impl<SPI, T> AsyncW25q64fv<SPI, T>
where
    SPI: SpiDevice,
    T: DelayNs + Monotonic,
{
    pub fn new(spi: SPI, timer: T) -> Self {
        Self {
            spi,
            timer,
            write_enabled: false,
        }
    }

    pub async fn init(spi: SPI, timer: T) -> Result<Self, Error<SPI>> {
        let mut this = Self::new(spi, timer);
        this.begin().await?;
        Ok(this)
    }

    pub fn release(self) -> (SPI, T) {
        (self.spi, self.timer)
    }

    /// Probes the manufacturer/device ID, then resets the chip.
    pub async fn begin(&mut self) -> Result<(), Error<SPI>> {
        let id = self.read_device_id().await?;
        if !id.is_plausible() {
            warn!("Implausible device ID: {:?}", id);
            return Err(Error::CommunicationFail);
        }
        debug!("Found device: {:?}", id);
        self.reset().await
    }

    pub fn write_enable_tracked(&self) -> bool {
        self.write_enabled
    }

    pub async fn enable_writing(&mut self) -> Result<(), Error<SPI>> {
        self.issue(Command::WriteEnable, 0, Data::None).await?;
        self.write_enabled = true;
        Ok(())
    }

    pub async fn disable_writing(&mut self) -> Result<(), Error<SPI>> {
        self.issue(Command::WriteDisable, 0, Data::None).await?;
        self.write_enabled = false;
        Ok(())
    }

    pub async fn write_page(&mut self, addr: u32, buf: &[u8; PAGE_SIZE]) -> Result<(), Error<SPI>> {
        self.program(addr, buf).await
    }

    pub async fn program(&mut self, addr: u32, data: &[u8]) -> Result<(), Error<SPI>> {
        if data.is_empty() || data.len() > PAGE_SIZE || addr >= CAPACITY {
            return Err(Error::NotValid);
        }
        self.guarded(Command::PageProgram, addr, Data::Write(data), false)
            .await
    }

    pub async fn read_page(
        &mut self,
        addr: u32,
        buf: &mut [u8; PAGE_SIZE],
    ) -> Result<(), Error<SPI>> {
        self.read(addr, buf).await
    }

    pub async fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), Error<SPI>> {
        if u64::from(addr) + buf.len() as u64 > u64::from(CAPACITY) || addr >= CAPACITY {
            return Err(Error::NotValid);
        }
        if buf.is_empty() {
            return Ok(());
        }
        self.issue(Command::ReadData, addr, Data::Read(buf)).await
    }

    pub async fn erase(&mut self, unit: EraseUnit, hold: bool) -> Result<(), Error<SPI>> {
        if unit.address() >= CAPACITY {
            return Err(Error::NotValid);
        }
        self.guarded(unit.command(), unit.address(), Data::None, hold)
            .await
    }

    pub async fn erase_sector(&mut self, addr: u32, hold: bool) -> Result<(), Error<SPI>> {
        self.erase(EraseUnit::Sector(addr), hold).await
    }

    pub async fn erase_block_32(&mut self, addr: u32, hold: bool) -> Result<(), Error<SPI>> {
        self.erase(EraseUnit::Block32(addr), hold).await
    }

    pub async fn erase_block_64(&mut self, addr: u32, hold: bool) -> Result<(), Error<SPI>> {
        self.erase(EraseUnit::Block64(addr), hold).await
    }

    pub async fn erase_chip(&mut self, hold: bool) -> Result<(), Error<SPI>> {
        self.erase(EraseUnit::Chip, hold).await
    }

    pub async fn get_jedec(&mut self) -> Result<JedecId, Error<SPI>> {
        let mut response = [0u8; 3];
        self.issue(Command::JedecId, 0, Data::Read(&mut response))
            .await?;
        Ok(JedecId::from_bytes(response))
    }

    pub async fn read_device_id(&mut self) -> Result<DeviceId, Error<SPI>> {
        let mut response = [0u8; 5];
        self.issue(Command::ManufacturerDeviceId, 0, Data::Read(&mut response))
            .await?;
        Ok(DeviceId::from_response(response))
    }

    pub async fn read_status(&mut self) -> Result<Status, Error<SPI>> {
        let mut response = [0u8; 1];
        self.send(Command::ReadStatus1, 0, Data::Read(&mut response))
            .await?;
        Ok(Status::from_bits_truncate(response[0]))
    }

    pub async fn busy(&mut self) -> Result<bool, Error<SPI>> {
        Ok(self.read_status().await?.is_busy())
    }

    pub async fn is_write_enabled(&mut self) -> Result<bool, Error<SPI>> {
        Ok(self.read_status().await?.is_write_enabled())
    }

    pub async fn wait_until_free(&mut self, max_timeout_ms: u64) -> Result<(), Error<SPI>> {
        let start = self.timer.now_ms();
        while self.busy().await? && self.timer.now_ms().saturating_sub(start) < max_timeout_ms {
            self.timer.delay_ms(BUSY_POLL_INTERVAL_MS).await;
        }
        if self.busy().await? {
            warn!("Still busy after {=u64} ms", max_timeout_ms);
            return Err(Error::Timeout);
        }
        Ok(())
    }

    pub async fn reset(&mut self) -> Result<(), Error<SPI>> {
        self.issue(Command::EnableReset, 0, Data::None).await?;
        self.send(Command::Reset, 0, Data::None).await?;
        self.write_enabled = false;
        Ok(())
    }

    pub async fn power_down(&mut self) -> Result<(), Error<SPI>> {
        self.issue(Command::PowerDown, 0, Data::None).await
    }

    /// Sent without a busy check: a powered-down chip does not answer status
    /// reads.
    pub async fn release_power_down(&mut self) -> Result<(), Error<SPI>> {
        self.issue(Command::ReleasePowerDown, 0, Data::None).await
    }

    async fn guarded(
        &mut self,
        command: Command,
        addr: u32,
        data: Data<'_>,
        hold: bool,
    ) -> Result<(), Error<SPI>> {
        debug_assert!(command.needs_write_enable());
        if self.busy().await? {
            return Err(Error::Busy);
        }
        if !self.write_enabled {
            self.enable_writing().await?;
        }
        self.send(command, addr, data).await?;
        self.write_enabled = false;
        if hold {
            self.wait_until_free(command.wait_ceiling_ms()).await?;
        }
        Ok(())
    }

    async fn issue(
        &mut self,
        command: Command,
        addr: u32,
        data: Data<'_>,
    ) -> Result<(), Error<SPI>> {
        if command.checks_busy() && self.busy().await? {
            return Err(Error::Busy);
        }
        self.send(command, addr, data).await
    }

    async fn send(&mut self, command: Command, addr: u32, data: Data<'_>) -> Result<(), Error<SPI>> {
        trace!("{:?} @ {=u32:#x}", command, addr);
        transport::transact_async(&mut self.spi, Frame::new(command, addr, data))
            .await
            .map_err(Error::Spi)?;
        let settle_us = command.settle_us();
        if settle_us > 0 {
            self.timer.delay_us(settle_us).await;
        }
        Ok(())
    }
}

impl<SPI, T> AsyncHardwareFlashDevice for AsyncW25q64fv<SPI, T>
where
    SPI: SpiDevice,
    T: DelayNs + Monotonic,
{
    type Error = Error<SPI>;

    async fn read(&mut self, addr: u32, data: &mut [u8]) -> Result<(), Error<SPI>> {
        AsyncW25q64fv::read(self, addr, data).await
    }

    async fn sector_erase(&mut self, addr: u32) -> Result<(), Error<SPI>> {
        self.erase_sector(addr, true).await
    }

    async fn page_program(&mut self, addr: u32, data: &[u8]) -> Result<(), Error<SPI>> {
        self.program(addr, data).await?;
        self.wait_until_free(Command::PageProgram.wait_ceiling_ms())
            .await
    }

    async fn chip_erase(&mut self) -> Result<(), Error<SPI>> {
        self.erase_chip(true).await
    }
}
