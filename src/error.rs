use core::fmt::{self, Debug};
use embedded_hal::spi::ErrorType;

/// The error type used by this library.
///
/// This can encapsulate an SPI error, and adds the chip's own protocol
/// failures on top of that. `SPI` is either a blocking or an async
/// `SpiDevice`; both share [`ErrorType`].
pub enum Error<SPI: ErrorType> {
    /// An SPI transfer failed.
    Spi(SPI::Error),
    /// The identification read at start-up was implausible, so nothing is
    /// answering on the bus.
    CommunicationFail,
    /// The chip reported an internal operation in progress. Nothing was sent.
    Busy,
    /// The chip was still busy when the wait deadline passed.
    Timeout,
    /// The request cannot be encoded for this chip (address past the end of
    /// the array, or a program payload that is empty or longer than a page).
    NotValid,
}

#[cfg(feature = "defmt")]
impl<SPI: ErrorType> defmt::Format for Error<SPI> {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Error::Spi(_spi) => defmt::write!(fmt, "Error::Spi"),
            Error::CommunicationFail => defmt::write!(fmt, "Error::CommunicationFail"),
            Error::Busy => defmt::write!(fmt, "Error::Busy"),
            Error::Timeout => defmt::write!(fmt, "Error::Timeout"),
            Error::NotValid => defmt::write!(fmt, "Error::NotValid"),
        }
    }
}

impl<SPI: ErrorType> Debug for Error<SPI> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Spi(spi) => write!(f, "Error::Spi({:?})", spi),
            Error::CommunicationFail => f.write_str("Error::CommunicationFail"),
            Error::Busy => f.write_str("Error::Busy"),
            Error::Timeout => f.write_str("Error::Timeout"),
            Error::NotValid => f.write_str("Error::NotValid"),
        }
    }
}

impl<SPI: ErrorType> PartialEq for Error<SPI>
where
    SPI::Error: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Error::Spi(a), Error::Spi(b)) => a == b,
            (Error::CommunicationFail, Error::CommunicationFail)
            | (Error::Busy, Error::Busy)
            | (Error::Timeout, Error::Timeout)
            | (Error::NotValid, Error::NotValid) => true,
            _ => false,
        }
    }
}
