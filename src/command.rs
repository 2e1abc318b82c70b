use crate::{
    opcodes, BLOCK_32K_SIZE, BLOCK_64K_SIZE, CAPACITY, CHIP_ERASE_TIMEOUT_MS, DEFAULT_TIMEOUT_MS,
    POWER_SETTLE_US, RESET_SETTLE_US, SECTOR_SIZE,
};

/// Every instruction the driver issues.
///
/// Each command carries its opcode, the layout of its frame on the wire and
/// the conditions the chip must be in before it is sent, so the driver can
/// issue any of them through one path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    WriteEnable,
    WriteDisable,
    ReadStatus1,
    ReadData,
    PageProgram,
    SectorErase,
    Block32Erase,
    Block64Erase,
    ChipErase,
    PowerDown,
    ReleasePowerDown,
    ManufacturerDeviceId,
    JedecId,
    EnableReset,
    Reset,
}

/// Layout of a command frame after the opcode byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Shape {
    /// Opcode only.
    Bare,
    /// Opcode followed by a 24-bit address, most significant byte first.
    Address,
    /// Opcode and 24-bit address, then data in one direction (up to a page
    /// when programming, any length when reading).
    AddressData,
    /// Opcode, then a fixed number of response bytes clocked out with dummy
    /// `0x00` bytes.
    Response(usize),
}

impl Command {
    pub const fn opcode(self) -> u8 {
        match self {
            Command::WriteEnable => opcodes::WRITE_ENABLE,
            Command::WriteDisable => opcodes::WRITE_DISABLE,
            Command::ReadStatus1 => opcodes::READ_STATUS_REGISTER_1,
            Command::ReadData => opcodes::READ_DATA,
            Command::PageProgram => opcodes::PAGE_PROGRAM,
            Command::SectorErase => opcodes::SECTOR_4K_ERASE,
            Command::Block32Erase => opcodes::BLOCK_32K_ERASE,
            Command::Block64Erase => opcodes::BLOCK_64K_ERASE,
            Command::ChipErase => opcodes::CHIP_ERASE,
            Command::PowerDown => opcodes::POWER_DOWN,
            Command::ReleasePowerDown => opcodes::RELEASE_POWER_DOWN,
            Command::ManufacturerDeviceId => opcodes::MANUFACTURER_DEVICE_ID,
            Command::JedecId => opcodes::JEDEC_ID,
            Command::EnableReset => opcodes::ENABLE_RESET,
            Command::Reset => opcodes::RESET,
        }
    }

    pub const fn shape(self) -> Shape {
        match self {
            Command::ReadStatus1 => Shape::Response(1),
            // Three dummy address bytes, then manufacturer and device ID.
            Command::ManufacturerDeviceId => Shape::Response(5),
            Command::JedecId => Shape::Response(3),
            Command::SectorErase | Command::Block32Erase | Command::Block64Erase => {
                Shape::Address
            }
            Command::ReadData | Command::PageProgram => Shape::AddressData,
            Command::WriteEnable
            | Command::WriteDisable
            | Command::ChipErase
            | Command::PowerDown
            | Command::ReleasePowerDown
            | Command::EnableReset
            | Command::Reset => Shape::Bare,
        }
    }

    /// Whether the chip must report not-busy before this command is sent.
    ///
    /// The status read is the poll itself, and a chip in power-down cannot
    /// answer a status read at all.
    pub const fn checks_busy(self) -> bool {
        !matches!(self, Command::ReadStatus1 | Command::ReleasePowerDown)
    }

    /// Whether the write enable latch must be set for the chip to accept
    /// this command. The chip clears the latch once the command completes.
    pub const fn needs_write_enable(self) -> bool {
        matches!(
            self,
            Command::PageProgram
                | Command::SectorErase
                | Command::Block32Erase
                | Command::Block64Erase
                | Command::ChipErase
        )
    }

    /// Fixed delay the chip needs after the command before it responds again.
    pub const fn settle_us(self) -> u32 {
        match self {
            Command::Reset => RESET_SETTLE_US,
            Command::PowerDown | Command::ReleasePowerDown => POWER_SETTLE_US,
            _ => 0,
        }
    }

    /// Ceiling for waiting on the internal operation this command starts.
    pub const fn wait_ceiling_ms(self) -> u64 {
        match self {
            Command::ChipErase => CHIP_ERASE_TIMEOUT_MS,
            _ => DEFAULT_TIMEOUT_MS,
        }
    }

    /// Encodes the opcode and, for addressed shapes, the 24-bit address.
    ///
    /// Returns the header buffer and the number of bytes of it to send.
    pub(crate) fn header(self, addr: u32) -> ([u8; 4], usize) {
        let opcode = self.opcode();
        match self.shape() {
            Shape::Address | Shape::AddressData => (
                [opcode, (addr >> 16) as u8, (addr >> 8) as u8, addr as u8],
                4,
            ),
            Shape::Bare | Shape::Response(_) => ([opcode, 0, 0, 0], 1),
        }
    }
}

/// Erase granularities. The address is truncated by the chip to the start of
/// the containing unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EraseUnit {
    /// 4 KiB. Typical erase time 45 ms, at most 400 ms.
    Sector(u32),
    /// 32 KiB. Typical 120 ms, at most 1.6 s.
    Block32(u32),
    /// 64 KiB. Typical 150 ms, at most 2 s.
    Block64(u32),
    /// The whole array. Typical 20 s, at most 100 s.
    Chip,
}

impl EraseUnit {
    pub const fn command(self) -> Command {
        match self {
            EraseUnit::Sector(_) => Command::SectorErase,
            EraseUnit::Block32(_) => Command::Block32Erase,
            EraseUnit::Block64(_) => Command::Block64Erase,
            EraseUnit::Chip => Command::ChipErase,
        }
    }

    pub const fn address(self) -> u32 {
        match self {
            EraseUnit::Sector(addr) | EraseUnit::Block32(addr) | EraseUnit::Block64(addr) => addr,
            EraseUnit::Chip => 0,
        }
    }

    /// Number of bytes set to `0xFF` by this erase.
    pub const fn size(self) -> u32 {
        match self {
            EraseUnit::Sector(_) => SECTOR_SIZE,
            EraseUnit::Block32(_) => BLOCK_32K_SIZE,
            EraseUnit::Block64(_) => BLOCK_64K_SIZE,
            EraseUnit::Chip => CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcodes_match_instruction_table() {
        assert_eq!(Command::WriteEnable.opcode(), 0x06);
        assert_eq!(Command::WriteDisable.opcode(), 0x04);
        assert_eq!(Command::ReadStatus1.opcode(), 0x05);
        assert_eq!(Command::ReadData.opcode(), 0x03);
        assert_eq!(Command::PageProgram.opcode(), 0x02);
        assert_eq!(Command::SectorErase.opcode(), 0x20);
        assert_eq!(Command::Block32Erase.opcode(), 0x52);
        assert_eq!(Command::Block64Erase.opcode(), 0xD8);
        assert_eq!(Command::ChipErase.opcode(), 0xC7);
        assert_eq!(Command::PowerDown.opcode(), 0xB9);
        assert_eq!(Command::ReleasePowerDown.opcode(), 0xAB);
        assert_eq!(Command::ManufacturerDeviceId.opcode(), 0x90);
        assert_eq!(Command::JedecId.opcode(), 0x9F);
        assert_eq!(Command::EnableReset.opcode(), 0x66);
        assert_eq!(Command::Reset.opcode(), 0x99);
    }

    #[test]
    fn addressed_header_is_big_endian() {
        assert_eq!(
            Command::SectorErase.header(0x12_3456),
            ([0x20, 0x12, 0x34, 0x56], 4)
        );
        assert_eq!(
            Command::PageProgram.header(0x00_0100),
            ([0x02, 0x00, 0x01, 0x00], 4)
        );
    }

    #[test]
    fn bare_header_ignores_address() {
        let (header, len) = Command::ChipErase.header(0xFF_FFFF);
        assert_eq!(&header[..len], &[0xC7]);
        let (header, len) = Command::JedecId.header(0x12_3456);
        assert_eq!(&header[..len], &[0x9F]);
    }

    #[test]
    fn only_program_and_erase_need_write_enable() {
        let mutating = [
            Command::PageProgram,
            Command::SectorErase,
            Command::Block32Erase,
            Command::Block64Erase,
            Command::ChipErase,
        ];
        for command in mutating {
            assert!(command.needs_write_enable(), "{:?}", command);
        }
        for command in [
            Command::WriteEnable,
            Command::ReadData,
            Command::PowerDown,
            Command::Reset,
            Command::JedecId,
        ] {
            assert!(!command.needs_write_enable(), "{:?}", command);
        }
    }

    #[test]
    fn release_power_down_skips_busy_check() {
        assert!(!Command::ReleasePowerDown.checks_busy());
        assert!(!Command::ReadStatus1.checks_busy());
        assert!(Command::PowerDown.checks_busy());
        assert!(Command::PageProgram.checks_busy());
    }

    #[test]
    fn chip_erase_waits_longest() {
        assert_eq!(Command::ChipErase.wait_ceiling_ms(), CHIP_ERASE_TIMEOUT_MS);
        assert_eq!(Command::SectorErase.wait_ceiling_ms(), DEFAULT_TIMEOUT_MS);
        assert!(CHIP_ERASE_TIMEOUT_MS > DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn erase_units_map_to_commands() {
        assert_eq!(EraseUnit::Sector(0x1000).command(), Command::SectorErase);
        assert_eq!(EraseUnit::Block32(0x8000).command(), Command::Block32Erase);
        assert_eq!(EraseUnit::Block64(0x1_0000).command(), Command::Block64Erase);
        assert_eq!(EraseUnit::Chip.command(), Command::ChipErase);
        assert_eq!(EraseUnit::Block32(0x8000).size(), 0x8000);
        assert_eq!(EraseUnit::Chip.size(), CAPACITY);
    }
}
