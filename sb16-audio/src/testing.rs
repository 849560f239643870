//! Simulated hardware shared by the unit and integration tests.
//!
//! Everything here is backed by fixed-size arrays so the tests run under
//! the same `no_std` constraints as the driver.

use core::cell::RefCell;

use embedded_hal::delay::DelayNs;

use crate::dma::{TransferEngine, TransferError, TransferMode};
use crate::dsp::registers as reg;
use crate::hal::{DmaAllocator, DmaMemory, PortIo};

// ── Simulated DSP ─────────────────────────────────────────────────────────

/// A DSP register block answering at `base`.
///
/// Models the reset handshake, the version command and the write-busy /
/// read-available status bits. Every byte written to the command port is
/// logged.
pub struct SimulatedDsp {
    pub base: u16,
    /// Byte queued after a reset pulse (0xAA on a healthy card).
    pub reset_response: u8,
    pub version: (u8, u8),
    /// When false, nothing is ever readable and the write port stays busy.
    pub present: bool,
    /// Number of busy reads reported before each accepted byte.
    pub busy_polls: u32,
    busy_left: u32,
    reset_line: u8,
    pub resets: u32,
    queue: [u8; 8],
    queue_len: usize,
    /// Argument bytes still owed to the last multi-byte command.
    pending_args: u8,
    pub commands: [u8; 64],
    pub command_count: usize,
    pub status_polls: u32,
}

impl SimulatedDsp {
    pub fn new() -> Self {
        Self {
            base: 0x220,
            reset_response: reg::READY_BYTE,
            version: (4, 5),
            present: true,
            busy_polls: 0,
            busy_left: 0,
            reset_line: 0,
            resets: 0,
            queue: [0; 8],
            queue_len: 0,
            pending_args: 0,
            commands: [0; 64],
            command_count: 0,
            status_polls: 0,
        }
    }

    /// A card that never answers.
    pub fn absent() -> Self {
        Self {
            present: false,
            ..Self::new()
        }
    }

    /// Bytes written to the command port, in order.
    pub fn commands(&self) -> &[u8] {
        &self.commands[..self.command_count]
    }

    fn push(&mut self, byte: u8) {
        if self.queue_len < self.queue.len() {
            self.queue[self.queue_len] = byte;
            self.queue_len += 1;
        }
    }

    fn pop(&mut self) -> u8 {
        if self.queue_len == 0 {
            return 0xFF;
        }
        let byte = self.queue[0];
        self.queue.copy_within(1..self.queue_len, 0);
        self.queue_len -= 1;
        byte
    }

    fn command(&mut self, byte: u8) {
        if self.command_count < self.commands.len() {
            self.commands[self.command_count] = byte;
            self.command_count += 1;
        }
        if self.pending_args > 0 {
            self.pending_args -= 1;
            return;
        }
        match byte {
            reg::CMD_GET_VERSION => {
                self.push(self.version.0);
                self.push(self.version.1);
            }
            reg::CMD_SET_OUTPUT_RATE => self.pending_args = 2,
            reg::CMD_DMA8_SINGLE_OUTPUT => self.pending_args = 3,
            _ => {}
        }
    }
}

impl PortIo for SimulatedDsp {
    fn read_u8(&mut self, port: u16) -> u8 {
        match port.wrapping_sub(self.base) {
            reg::DSP_WRITE => {
                self.status_polls += 1;
                if !self.present {
                    return reg::WRITE_BUSY;
                }
                if self.busy_left > 0 {
                    self.busy_left -= 1;
                    reg::WRITE_BUSY
                } else {
                    0
                }
            }
            reg::DSP_READ_STATUS => {
                self.status_polls += 1;
                if self.present && self.queue_len > 0 {
                    reg::READ_AVAILABLE
                } else {
                    0
                }
            }
            reg::DSP_READ_DATA => self.pop(),
            _ => 0xFF,
        }
    }

    fn write_u8(&mut self, port: u16, value: u8) {
        match port.wrapping_sub(self.base) {
            reg::DSP_RESET => {
                if self.reset_line == reg::RESET_ASSERT && value == reg::RESET_DEASSERT {
                    self.resets += 1;
                    self.queue_len = 0;
                    self.pending_args = 0;
                    if self.present {
                        self.push(self.reset_response);
                    }
                }
                self.reset_line = value;
            }
            reg::DSP_WRITE => {
                self.busy_left = self.busy_polls;
                self.command(value);
            }
            _ => {}
        }
    }
}

// ── Simulated 8237 ────────────────────────────────────────────────────────

/// The ISA DMA controller's port space.
///
/// Tracks the byte-pointer flip-flop and per-channel address, count and
/// page registers, and logs every port write.
pub struct SimulatedDmac {
    flip_flop: bool,
    pub address: [u16; 4],
    pub count: [u16; 4],
    pub page: [u8; 4],
    pub mode: u8,
    pub masked: [bool; 4],
    /// Terminal-count bits, cleared when the status register is read.
    pub status: u8,
    pub writes: [(u16, u8); 64],
    pub write_count: usize,
}

impl SimulatedDmac {
    pub fn new() -> Self {
        Self {
            flip_flop: false,
            address: [0; 4],
            count: [0; 4],
            page: [0; 4],
            mode: 0,
            masked: [true; 4],
            status: 0,
            writes: [(0, 0); 64],
            write_count: 0,
        }
    }

    /// Port writes, in order.
    pub fn writes(&self) -> &[(u16, u8)] {
        &self.writes[..self.write_count]
    }

    /// Run `channel` to terminal count: the counter wraps to 0xFFFF and
    /// the channel's TC status bit is raised.
    pub fn complete(&mut self, channel: usize) {
        self.count[channel] = 0xFFFF;
        self.status |= 1 << channel;
    }

    fn page_channel(port: u16) -> Option<usize> {
        match port {
            0x87 => Some(0),
            0x83 => Some(1),
            0x81 => Some(2),
            0x82 => Some(3),
            _ => None,
        }
    }

    fn step(&mut self, word: &mut u16, value: Option<u8>) -> u8 {
        let high = self.flip_flop;
        self.flip_flop = !self.flip_flop;
        let shift = if high { 8 } else { 0 };
        if let Some(value) = value {
            *word = (*word & !(0xFF << shift)) | ((value as u16) << shift);
        }
        (*word >> shift) as u8
    }
}

impl PortIo for SimulatedDmac {
    fn read_u8(&mut self, port: u16) -> u8 {
        match port {
            0x00..=0x07 => {
                let channel = (port / 2) as usize;
                let mut word = if port % 2 == 0 {
                    self.address[channel]
                } else {
                    self.count[channel]
                };
                self.step(&mut word, None)
            }
            0x08 => core::mem::take(&mut self.status),
            _ => 0xFF,
        }
    }

    fn write_u8(&mut self, port: u16, value: u8) {
        if self.write_count < self.writes.len() {
            self.writes[self.write_count] = (port, value);
            self.write_count += 1;
        }
        match port {
            0x00..=0x07 => {
                let channel = (port / 2) as usize;
                if port % 2 == 0 {
                    let mut word = self.address[channel];
                    self.step(&mut word, Some(value));
                    self.address[channel] = word;
                } else {
                    let mut word = self.count[channel];
                    self.step(&mut word, Some(value));
                    self.count[channel] = word;
                }
            }
            0x0A => self.masked[(value & 3) as usize] = value & 0x04 != 0,
            0x0B => self.mode = value,
            0x0C => self.flip_flop = false,
            _ => {
                if let Some(channel) = Self::page_channel(port) {
                    self.page[channel] = value;
                }
            }
        }
    }
}

/// Port access to a [`SimulatedDmac`] the test keeps a handle on, so it
/// can raise terminal count while a driver owns the controller.
pub struct SharedDmac<'a>(pub &'a RefCell<SimulatedDmac>);

impl PortIo for SharedDmac<'_> {
    fn read_u8(&mut self, port: u16) -> u8 {
        self.0.borrow_mut().read_u8(port)
    }

    fn write_u8(&mut self, port: u16, value: u8) {
        self.0.borrow_mut().write_u8(port, value)
    }
}

// ── Recording transfer engine ─────────────────────────────────────────────

/// A [`TransferEngine`] that records each `prepare` call.
pub struct RecordingEngine {
    pub prepared: [(u8, TransferMode, u64, usize); 8],
    pub prepare_count: usize,
    pub residue: usize,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self {
            prepared: [(0, TransferMode::Write, 0, 0); 8],
            prepare_count: 0,
            residue: 0,
        }
    }
}

impl TransferEngine for RecordingEngine {
    fn prepare(
        &mut self,
        channel: u8,
        mode: TransferMode,
        bus_address: u64,
        len: usize,
    ) -> Result<(), TransferError> {
        if self.prepare_count < self.prepared.len() {
            self.prepared[self.prepare_count] = (channel, mode, bus_address, len);
        }
        self.prepare_count += 1;
        self.residue = len;
        Ok(())
    }

    fn residue(&mut self, _channel: u8) -> usize {
        self.residue
    }
}

// ── Delay ─────────────────────────────────────────────────────────────────

/// Accumulates requested delay instead of sleeping.
#[derive(Default)]
pub struct MockDelay {
    pub total_ns: u64,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }
}

// ── DMA memory ────────────────────────────────────────────────────────────

/// Fixed-capacity stand-in for a DMA page allocation.
pub struct TestMemory<const N: usize> {
    bytes: [u8; N],
    len: usize,
    bus: u64,
}

impl<const N: usize> DmaMemory for TestMemory<N> {
    fn bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes[..self.len]
    }

    fn bus_address(&self) -> u64 {
        self.bus
    }
}

/// Hands out one [`TestMemory`] at a time and counts traffic.
pub struct TestAllocator<const N: usize> {
    pub bus: u64,
    pub exhausted: bool,
    pub allocations: u32,
    pub releases: u32,
}

impl<const N: usize> TestAllocator<N> {
    pub fn new() -> Self {
        Self {
            bus: 0x0001_0000,
            exhausted: false,
            allocations: 0,
            releases: 0,
        }
    }

    /// An allocator with no DMA memory left.
    pub fn exhausted() -> Self {
        Self {
            exhausted: true,
            ..Self::new()
        }
    }

    pub fn at(bus: u64) -> Self {
        Self { bus, ..Self::new() }
    }

    /// Memory not tracked by the allocator, for buffer-level tests.
    pub fn memory(len: usize) -> TestMemory<N> {
        TestMemory {
            bytes: [0; N],
            len: len.min(N),
            bus: 0x0001_0000,
        }
    }
}

impl<const N: usize> DmaAllocator for TestAllocator<N> {
    type Memory = TestMemory<N>;

    fn allocate(&mut self, len: usize) -> Option<Self::Memory> {
        if self.exhausted || len > N {
            return None;
        }
        self.allocations += 1;
        Some(TestMemory {
            bytes: [0; N],
            len,
            bus: self.bus,
        })
    }

    fn release(&mut self, _memory: Self::Memory) {
        self.releases += 1;
    }
}
