//! Simulated W25Q64FV and timer for unit tests.

use crate::traits::Monotonic;
use crate::CAPACITY;
use embedded_hal::spi::{ErrorKind, ErrorType, Operation};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimError;

impl embedded_hal::spi::Error for SimError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Decodes every transaction the way the chip does at chip-select release.
pub struct SimFlash {
    memory: BTreeMap<u32, u8>,
    pub wel: bool,
    /// Status reads left that will still report busy.
    pub busy_polls: u32,
    pub stuck_busy: bool,
    pub program_busy_polls: u32,
    pub erase_busy_polls: u32,
    pub powered_down: bool,
    pub device_id: [u8; 5],
    pub jedec: [u8; 3],
    reset_enabled: bool,
    pub resets: u32,
    /// Fail the transaction whose first byte is this opcode.
    pub fail_on: Option<u8>,
    /// MOSI bytes of every completed transaction.
    pub log: Vec<Vec<u8>>,
}

impl SimFlash {
    pub fn new() -> Self {
        Self {
            memory: BTreeMap::new(),
            wel: false,
            busy_polls: 0,
            stuck_busy: false,
            program_busy_polls: 1,
            erase_busy_polls: 3,
            powered_down: false,
            device_id: [0xFF, 0xFF, 0xFF, 0xEF, 0x16],
            jedec: [0xEF, 0x40, 0x17],
            reset_enabled: false,
            resets: 0,
            fail_on: None,
            log: Vec::new(),
        }
    }

    pub fn peek(&self, addr: u32) -> u8 {
        self.memory.get(&addr).copied().unwrap_or(0xFF)
    }

    pub fn poke(&mut self, addr: u32, value: u8) {
        self.memory.insert(addr, value);
    }

    /// Opcodes of every transaction except status polls.
    pub fn commands(&self) -> Vec<u8> {
        self.log
            .iter()
            .filter_map(|t| t.first().copied())
            .filter(|&opcode| opcode != 0x05)
            .collect()
    }

    /// Full frames of every transaction except status polls.
    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.log
            .iter()
            .filter(|t| t.first() != Some(&0x05))
            .cloned()
            .collect()
    }

    pub fn is_busy(&self) -> bool {
        self.stuck_busy || self.busy_polls > 0
    }

    fn status(&self) -> u8 {
        u8::from(self.is_busy()) | (u8::from(self.wel) << 1)
    }

    fn respond(&self, mosi: &[u8]) -> u8 {
        let Some(&opcode) = mosi.first() else {
            return 0xFF;
        };
        if self.powered_down {
            return 0xFF;
        }
        let idx = mosi.len();
        match opcode {
            0x05 => self.status(),
            0x9F => self.jedec.get(idx - 1).copied().unwrap_or(0xFF),
            0x90 => self.device_id.get(idx - 1).copied().unwrap_or(0xFF),
            0x03 if idx >= 4 => {
                let addr = u32::from_be_bytes([0, mosi[1], mosi[2], mosi[3]]);
                self.peek((addr + (idx - 4) as u32) % CAPACITY)
            }
            _ => 0xFF,
        }
    }

    fn exchange(&self, mosi: &mut Vec<u8>, out: u8) -> u8 {
        let miso = self.respond(mosi);
        mosi.push(out);
        miso
    }

    fn finish(&mut self, mosi: &[u8]) {
        let Some(&opcode) = mosi.first() else {
            return;
        };
        if self.powered_down {
            if opcode == 0xAB {
                self.powered_down = false;
            }
            return;
        }
        let addr = if mosi.len() >= 4 {
            u32::from_be_bytes([0, mosi[1], mosi[2], mosi[3]])
        } else {
            0
        };
        let busy = self.is_busy();
        match opcode {
            0x05 => self.busy_polls = self.busy_polls.saturating_sub(1),
            // Everything else is ignored while an operation is in flight.
            _ if busy => {}
            0x06 => self.wel = true,
            0x04 => self.wel = false,
            0x02 if self.wel => {
                let page = addr & !0xFF;
                for (i, byte) in mosi[4..].iter().enumerate() {
                    let target = page | ((addr + i as u32) & 0xFF);
                    let old = self.peek(target);
                    self.memory.insert(target, old & byte);
                }
                self.wel = false;
                self.busy_polls = self.program_busy_polls;
            }
            0x20 | 0x52 | 0xD8 if self.wel => {
                let size = match opcode {
                    0x20 => 0x1000,
                    0x52 => 0x8000,
                    _ => 0x1_0000,
                };
                let base = addr & !(size - 1);
                self.memory.retain(|a, _| !(base..base + size).contains(a));
                self.wel = false;
                self.busy_polls = self.erase_busy_polls;
            }
            0xC7 if self.wel => {
                self.memory.clear();
                self.wel = false;
                self.busy_polls = self.erase_busy_polls;
            }
            0x99 if self.reset_enabled => {
                self.wel = false;
                self.resets += 1;
            }
            0xB9 => self.powered_down = true,
            _ => {}
        }
        self.reset_enabled = opcode == 0x66 && !busy;
    }

    fn run(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), SimError> {
        let mut mosi = Vec::new();
        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => {
                    if mosi.is_empty() && self.fail_on.is_some() && bytes.first() == self.fail_on.as_ref()
                    {
                        return Err(SimError);
                    }
                    for &byte in bytes.iter() {
                        self.exchange(&mut mosi, byte);
                    }
                }
                Operation::Read(buf) => {
                    for slot in buf.iter_mut() {
                        *slot = self.exchange(&mut mosi, 0x00);
                    }
                }
                Operation::Transfer(read, write) => {
                    for i in 0..read.len().max(write.len()) {
                        let out = write.get(i).copied().unwrap_or(0x00);
                        let miso = self.exchange(&mut mosi, out);
                        if let Some(slot) = read.get_mut(i) {
                            *slot = miso;
                        }
                    }
                }
                Operation::TransferInPlace(buf) => {
                    for slot in buf.iter_mut() {
                        *slot = self.exchange(&mut mosi, *slot);
                    }
                }
                Operation::DelayNs(_) => {}
            }
        }
        self.finish(&mosi);
        self.log.push(mosi);
        Ok(())
    }
}

impl ErrorType for SimFlash {
    type Error = SimError;
}

impl embedded_hal::spi::SpiDevice for SimFlash {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), SimError> {
        self.run(operations)
    }
}

impl embedded_hal_async::spi::SpiDevice for SimFlash {
    async fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), SimError> {
        self.run(operations)
    }
}

/// Time only moves when the driver sleeps.
pub struct FakeTimer {
    now_ns: u64,
    /// Every microsecond-granularity delay requested.
    pub us_delays: Vec<u32>,
}

impl FakeTimer {
    pub fn new() -> Self {
        Self {
            now_ns: 0,
            us_delays: Vec::new(),
        }
    }

    fn advance_ns(&mut self, ns: u64) {
        self.now_ns += ns;
    }
}

impl Monotonic for FakeTimer {
    fn now_ms(&mut self) -> u64 {
        self.now_ns / 1_000_000
    }
}

impl embedded_hal::delay::DelayNs for FakeTimer {
    fn delay_ns(&mut self, ns: u32) {
        self.advance_ns(u64::from(ns));
    }

    fn delay_us(&mut self, us: u32) {
        self.us_delays.push(us);
        self.advance_ns(u64::from(us) * 1_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.advance_ns(u64::from(ms) * 1_000_000);
    }
}

impl embedded_hal_async::delay::DelayNs for FakeTimer {
    async fn delay_ns(&mut self, ns: u32) {
        self.advance_ns(u64::from(ns));
    }

    async fn delay_us(&mut self, us: u32) {
        self.us_delays.push(us);
        self.advance_ns(u64::from(us) * 1_000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.advance_ns(u64::from(ms) * 1_000_000);
    }
}
