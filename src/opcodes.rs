//! W25Q64FV instruction set (datasheet section 8.1).
//!
//! Only the single-I/O subset is issued by the driver, through
//! [`Command`](crate::command::Command). The rest of the table is kept so
//! callers talking to the chip directly share one set of names.

// ============================================================================
// Write control
// ============================================================================

/// Write Enable - sets WEL, required before any program or erase
pub const WRITE_ENABLE: u8 = 0x06;
/// Write Enable for Volatile Status Register
pub const VOLATILE_SR_WRITE_ENABLE: u8 = 0x50;
/// Write Disable - clears WEL
pub const WRITE_DISABLE: u8 = 0x04;

// ============================================================================
// Status registers
// ============================================================================

pub const READ_STATUS_REGISTER_1: u8 = 0x05;
pub const READ_STATUS_REGISTER_2: u8 = 0x35;
pub const WRITE_STATUS_REGISTER: u8 = 0x01;

// ============================================================================
// Program / erase
// ============================================================================

pub const PAGE_PROGRAM: u8 = 0x02;
pub const SECTOR_4K_ERASE: u8 = 0x20;
pub const BLOCK_32K_ERASE: u8 = 0x52;
pub const BLOCK_64K_ERASE: u8 = 0xD8;
/// Chip Erase (0x60 is accepted as an alias)
pub const CHIP_ERASE: u8 = 0xC7;
pub const ERASE_PROGRAM_SUSPEND: u8 = 0x75;
pub const ERASE_PROGRAM_RESUME: u8 = 0x7A;

// ============================================================================
// Power
// ============================================================================

pub const POWER_DOWN: u8 = 0xB9;
/// Release Power-down / Device ID
pub const RELEASE_POWER_DOWN: u8 = 0xAB;

// ============================================================================
// Read
// ============================================================================

pub const READ_DATA: u8 = 0x03;
/// Fast Read (one dummy byte after the address)
pub const FAST_READ: u8 = 0x0B;

// ============================================================================
// Identification
// ============================================================================

/// Manufacturer/Device ID, preceded by a 24-bit dummy address
pub const MANUFACTURER_DEVICE_ID: u8 = 0x90;
pub const JEDEC_ID: u8 = 0x9F;
pub const READ_UNIQUE_ID: u8 = 0x4B;
pub const READ_SFDP_REGISTER: u8 = 0x5A;

// ============================================================================
// Security registers
// ============================================================================

pub const ERASE_SECURITY_REGISTERS: u8 = 0x44;
pub const PROGRAM_SECURITY_REGISTERS: u8 = 0x42;
pub const READ_SECURITY_REGISTERS: u8 = 0x48;

// ============================================================================
// Mode / reset
// ============================================================================

pub const ENABLE_QPI: u8 = 0x38;
pub const ENABLE_RESET: u8 = 0x66;
pub const RESET: u8 = 0x99;

// ============================================================================
// Dual I/O
// ============================================================================

pub const FAST_READ_DUAL_OUTPUT: u8 = 0x3B;
pub const FAST_READ_DUAL_IO: u8 = 0xBB;
pub const MANUFACTURER_DEVICE_ID_DUAL_IO: u8 = 0x92;

// ============================================================================
// Quad I/O
// ============================================================================

pub const QUAD_PAGE_PROGRAM: u8 = 0x32;
pub const FAST_READ_QUAD_OUTPUT: u8 = 0x6B;
pub const FAST_READ_QUAD_IO: u8 = 0xEB;
pub const WORD_READ_QUAD_IO: u8 = 0xE7;
pub const OCTAL_WORD_READ_QUAD_IO: u8 = 0xE3;
pub const SET_BURST_WITH_WRAP: u8 = 0x77;
pub const MANUFACTURER_DEVICE_ID_QUAD_IO: u8 = 0x94;
