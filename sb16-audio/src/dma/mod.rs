//! Hardware transfer engine.
//!
//! The DSP does not read the sample buffer itself; a DMA controller
//! streams it over the ISA bus. [`TransferEngine`] is the seam the
//! playback path programs; [`Dma8237`] implements it for the PC's 8237
//! controller pair.
//!
//! ## ISA DMA constraints
//!
//! An 8-bit ISA channel addresses 24 bits (16 MiB) through a 16-bit
//! address counter plus a page register, so one transfer covers at most
//! 64 KiB and must not straddle a 64 KiB boundary.

mod i8237;

use thiserror::Error;

pub use i8237::Dma8237;

/// Highest bus address an ISA DMA channel can reach, exclusive.
pub const ISA_DMA_LIMIT: u64 = 1 << 24;

/// Largest single 8-bit transfer.
pub const MAX_TRANSFER: usize = 1 << 16;

/// Direction of a transfer, as encoded in the 8237 mode register
/// (single mode, address increment, no auto-init).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    /// Memory to device (playback).
    Write = 0x48,
    /// Device to memory (capture).
    Read = 0x44,
}

/// Rejected transfer parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransferError {
    /// Not an 8-bit channel (channel 4 is the cascade).
    #[error("DMA channel {channel} is not an 8-bit channel")]
    InvalidChannel { channel: u8 },
    /// Zero bytes or more than 64 KiB.
    #[error("transfer length {len} is outside 1..=65536")]
    InvalidLength { len: usize },
    /// Region above 16 MiB or crossing a 64 KiB boundary.
    #[error("region {bus_address:#x}+{len:#x} is not reachable by ISA DMA")]
    Unreachable { bus_address: u64, len: usize },
}

/// A DMA controller able to run single-cycle transfers.
pub trait TransferEngine {
    /// Program and unmask `channel` for a transfer of `len` bytes starting
    /// at `bus_address`. Any transfer already running on the channel is
    /// abandoned.
    fn prepare(
        &mut self,
        channel: u8,
        mode: TransferMode,
        bus_address: u64,
        len: usize,
    ) -> Result<(), TransferError>;

    /// Bytes still to be transferred on `channel`.
    fn residue(&mut self, channel: u8) -> usize;

    /// Whether the last transfer programmed on `channel` has finished.
    fn is_done(&mut self, channel: u8) -> bool {
        self.residue(channel) == 0
    }
}

/// Poll whether `channel` has moved its last byte.
pub fn is_transfer_done<T: TransferEngine + ?Sized>(engine: &mut T, channel: u8) -> bool {
    engine.is_done(channel)
}

/// Check that `len` bytes at `bus_address` fit one ISA DMA transfer.
pub fn check_reachable(bus_address: u64, len: usize) -> Result<(), TransferError> {
    if len == 0 || len > MAX_TRANSFER {
        return Err(TransferError::InvalidLength { len });
    }
    match bus_address.checked_add(len as u64 - 1) {
        Some(last) if last < ISA_DMA_LIMIT && (bus_address >> 16) == (last >> 16) => Ok(()),
        _ => Err(TransferError::Unreachable { bus_address, len }),
    }
}
