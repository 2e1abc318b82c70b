use bitflags::bitflags;

bitflags! {
    /// Status register 1 bits.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Status: u8 {
        /// Erase or write in progress.
        const BUSY = 1 << 0;
        /// Status of the **W**rite **E**nable **L**atch.
        const WEL = 1 << 1;
        /// The 3 block protect bits.
        const BP = 0b0001_1100;
        /// Protect from the **T**op or **B**ottom of the array.
        const TB = 1 << 5;
        /// Protect 4 KiB **SEC**tors instead of 64 KiB blocks.
        const SEC = 1 << 6;
        /// **S**tatus **R**egister **P**rotect 0.
        const SRP = 1 << 7;
    }
}

impl Status {
    pub fn is_busy(self) -> bool {
        self.contains(Status::BUSY)
    }

    pub fn is_write_enabled(self) -> bool {
        self.contains(Status::WEL)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Status {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Status({=u8:#b})", self.bits())
    }
}

/// Winbond's JEDEC manufacturer ID.
pub const WINBOND_MANUFACTURER_ID: u8 = 0xEF;

/// JEDEC identification (instruction 9Fh).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JedecId {
    pub manufacturer: u8,
    /// `0x40` for the W25Q64FV in SPI mode.
    pub memory_type: u8,
    /// Log2 of the capacity in bytes, `0x17` for 8 MiB.
    pub capacity: u8,
}

impl JedecId {
    pub(crate) fn from_bytes(bytes: [u8; 3]) -> Self {
        let [manufacturer, memory_type, capacity] = bytes;
        Self {
            manufacturer,
            memory_type,
            capacity,
        }
    }

    /// Array size implied by the capacity code, if it is a sensible one.
    pub fn capacity_bytes(&self) -> Option<u32> {
        match self.capacity {
            code @ 0x0A..=0x1F => Some(1u32 << code),
            _ => None,
        }
    }
}

/// Manufacturer and device ID (instruction 90h).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceId {
    pub manufacturer: u8,
    /// `0x16` for the W25Q64FV.
    pub device: u8,
}

impl DeviceId {
    /// Decodes the five bytes clocked out after the opcode: three while the
    /// dummy address is shifted in, then the two IDs.
    pub(crate) fn from_response(response: [u8; 5]) -> Self {
        Self {
            manufacturer: response[3],
            device: response[4],
        }
    }

    /// A responsive chip never reports zero in the device field, while a
    /// floating or unpowered bus reads back as all zeros.
    pub fn is_plausible(&self) -> bool {
        self.device != 0
    }
}
