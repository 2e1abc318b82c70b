//! Framing of commands onto the bus.
//!
//! One [`Frame`] is one SPI transaction: chip select is asserted for the
//! header and data phases and released once at the end.

use crate::command::{Command, Shape};
use embedded_hal::spi::{Operation, SpiDevice};
use embedded_hal_async::spi::SpiDevice as AsyncSpiDevice;

/// Data phase following the header.
pub(crate) enum Data<'a> {
    None,
    /// Bytes shifted out as given.
    Write(&'a [u8]),
    /// Filled with the bytes clocked in while `0x00` is shifted out.
    Read(&'a mut [u8]),
}

pub(crate) struct Frame<'a> {
    header: [u8; 4],
    header_len: usize,
    data: Data<'a>,
}

impl<'a> Frame<'a> {
    pub(crate) fn new(command: Command, addr: u32, data: Data<'a>) -> Self {
        debug_assert!(
            match (command.shape(), &data) {
                (Shape::Bare | Shape::Address, Data::None) => true,
                (Shape::AddressData, Data::Write(_) | Data::Read(_)) => true,
                (Shape::Response(len), Data::Read(buf)) => buf.len() == len,
                _ => false,
            },
            "frame data does not match command shape"
        );
        let (header, header_len) = command.header(addr);
        Self {
            header,
            header_len,
            data,
        }
    }
}

/// Dummy byte shifted out while reading.
const DUMMY: u8 = 0x00;

/// Runs `frame` as a single blocking transaction.
pub(crate) fn transact<SPI: SpiDevice>(spi: &mut SPI, frame: Frame<'_>) -> Result<(), SPI::Error> {
    let header = &frame.header[..frame.header_len];
    match frame.data {
        Data::None => spi.transaction(&mut [Operation::Write(header)]),
        Data::Write(bytes) => {
            spi.transaction(&mut [Operation::Write(header), Operation::Write(bytes)])
        }
        Data::Read(buf) => {
            buf.fill(DUMMY);
            spi.transaction(&mut [Operation::Write(header), Operation::TransferInPlace(buf)])
        }
    }
}

/// Runs `frame` as a single async transaction.
pub(crate) async fn transact_async<SPI: AsyncSpiDevice>(
    spi: &mut SPI,
    frame: Frame<'_>,
) -> Result<(), SPI::Error> {
    let header = &frame.header[..frame.header_len];
    match frame.data {
        Data::None => spi.transaction(&mut [Operation::Write(header)]).await,
        Data::Write(bytes) => {
            spi.transaction(&mut [Operation::Write(header), Operation::Write(bytes)])
                .await
        }
        Data::Read(buf) => {
            buf.fill(DUMMY);
            spi.transaction(&mut [Operation::Write(header), Operation::TransferInPlace(buf)])
                .await
        }
    }
}
