//! Playback transfer buffer.
//!
//! [`TransferBuffer`] accumulates 8-bit samples written by user code into
//! a single DMA-capable region. It only does the accounting: the caller
//! learns from the returned [`Fill`] when a write completed the buffer and
//! starts playback itself before returning to its own caller.
//!
//! ## Fill accounting
//!
//! ```text
//!  0            cursor                    capacity
//!  ├────────────┼─────────────────────────┤
//!  │  samples   │                         │
//! ```
//!
//! - `remaining` counts down by exactly the bytes each write copies, so
//!   over a cycle the accepted bytes sum to `capacity - remaining`
//! - a write may start at any offset in `0..capacity`; `cursor` is the
//!   highest offset written so far
//! - for appending writes `remaining == capacity - cursor`
//! - once `remaining` hits zero every write fails with [`BufferError::Full`]
//!   until [`reset()`](TransferBuffer::reset)

use thiserror::Error;

use crate::hal::DmaMemory;

/// Rejected buffer writes. Buffer state is unchanged when one is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BufferError {
    /// The buffer is full, or the offset is at or past its end.
    #[error("transfer buffer is full")]
    Full,
}

/// Outcome of an accepted write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fill {
    /// Bytes copied into the buffer; may be fewer than offered.
    pub accepted: usize,
    /// Offset the next appending write should use.
    pub next_offset: usize,
    /// This write brought `remaining` from non-zero to zero.
    pub completed: bool,
}

/// Fixed-capacity sample buffer backed by DMA memory.
pub struct TransferBuffer<M> {
    memory: M,
    cursor: usize,
    remaining: usize,
}

impl<M: DmaMemory> TransferBuffer<M> {
    /// Wrap `memory`; the whole region is the buffer's capacity.
    pub fn new(memory: M) -> Self {
        let remaining = memory.len();
        Self {
            memory,
            cursor: 0,
            remaining,
        }
    }

    pub fn capacity(&self) -> usize {
        self.memory.len()
    }

    /// Offset one past the last buffered byte.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn is_full(&self) -> bool {
        self.remaining == 0
    }

    /// Samples buffered so far.
    pub fn filled(&self) -> &[u8] {
        &self.memory.bytes()[..self.cursor]
    }

    /// Bus address of the first sample.
    pub fn bus_address(&self) -> u64 {
        self.memory.bus_address()
    }

    /// Copy as much of `data` as fits at `offset`.
    ///
    /// At most `capacity - offset` bytes are taken, and never more than
    /// `remaining`, so a cycle always completes after exactly `capacity`
    /// accepted bytes.
    pub fn write_at(&mut self, offset: usize, data: &[u8]) -> Result<Fill, BufferError> {
        let capacity = self.capacity();
        if self.remaining == 0 || offset >= capacity {
            return Err(BufferError::Full);
        }

        let accepted = data.len().min(capacity - offset).min(self.remaining);
        let end = offset + accepted;
        self.memory.bytes_mut()[offset..end].copy_from_slice(&data[..accepted]);

        self.cursor = self.cursor.max(end);
        self.remaining -= accepted;

        Ok(Fill {
            accepted,
            next_offset: end,
            completed: self.remaining == 0,
        })
    }

    /// Empty the buffer for a new fill cycle. Contents are left in place.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.remaining = self.capacity();
    }

    /// Consume the buffer and return its memory.
    pub fn into_memory(self) -> M {
        self.memory
    }
}
