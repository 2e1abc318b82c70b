//! Driver for the Winbond W25Q64FV serial NOR flash (64M-bit) over SPI.
//!
//! Built on `embedded-hal` 1.0: the chip-select line, clock rate and SPI mode
//! belong to the [`SpiDevice`](embedded_hal::spi::SpiDevice) the host hands
//! over, and every chip instruction is issued as exactly one SPI transaction.
//! Configure that device with [`SPI_MODE`] and at most [`SPI_FREQUENCY_HZ`].
//!
//! ```ignore
//! let mut flash = W25q64fv::init(spi, timer)?;
//! flash.erase_sector(0, true)?;
//! flash.write_page(0, &page)?;
//! flash.wait_until_free(DEFAULT_TIMEOUT_MS)?;
//! flash.read_page(0, &mut page)?;
//! ```
//!
//! Refer to datasheet:
//! https://www.winbond.com/resource-files/w25q64fv%20revq%2006142016.pdf
#![cfg_attr(not(test), no_std)]

#[macro_use]
mod log;

pub mod async_comms;
pub mod comms;
pub mod command;
pub mod error;
pub mod opcodes;
pub mod register;
pub mod traits;
mod transport;

#[cfg(test)]
mod sim;

pub use async_comms::AsyncW25q64fv;
pub use comms::W25q64fv;
pub use command::{Command, EraseUnit, Shape};
pub use error::Error;
pub use register::{DeviceId, JedecId, Status};
pub use traits::{AsyncHardwareFlashDevice, HardwareFlashDevice, Monotonic};

use embedded_hal::spi::{Mode, MODE_0};

/// Smallest programmable unit. A program never crosses a page boundary; bytes
/// past the end of the page wrap to its start.
pub const PAGE_SIZE: usize = 256;
/// Smallest erasable unit (4 KiB).
pub const SECTOR_SIZE: u32 = 4 * 1024;
pub const BLOCK_32K_SIZE: u32 = 32 * 1024;
pub const BLOCK_64K_SIZE: u32 = 64 * 1024;
/// Size of the whole array in bytes (64 Mbit).
pub const CAPACITY: u32 = 8 * 1024 * 1024;

/// Clock rate the driver is characterised at (the part tops out at 104 MHz).
pub const SPI_FREQUENCY_HZ: u32 = 20_000_000;
/// Sample on the leading edge, clock idle low. Data is MSB first.
pub const SPI_MODE: Mode = MODE_0;

/// Busy-wait ceiling for program, sector and block operations.
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
/// Busy-wait ceiling for a whole-chip erase (typically 20 s, at most 100 s).
pub const CHIP_ERASE_TIMEOUT_MS: u64 = 100_000;
/// Pause between two status samples while waiting for the chip.
pub const BUSY_POLL_INTERVAL_MS: u32 = 1;

/// Time the chip needs after a software reset (tRST is 30 µs).
pub const RESET_SETTLE_US: u32 = 35;
/// Time the chip needs to enter or leave power-down (tDP / tRES1).
pub const POWER_SETTLE_US: u32 = 10;
