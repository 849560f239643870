//! SB16 DSP register offsets, status bits and command bytes.
//!
//! Offsets are relative to the card's I/O base (0x220 by default). All
//! registers are 8 bits wide.

// Speaker and DMA pause/continue commands are not issued by playback.
#![allow(dead_code)]

// ── Register offsets ───────────────────────────────────────────────────────

/// DSP reset (write-only).
/// - Write 1, wait ≥ 3 µs, write 0; the DSP then queues [`READY_BYTE`].
pub const DSP_RESET: u16 = 0x6;

/// DSP read data (read-only). Valid when [`DSP_READ_STATUS`] bit 7 is set.
pub const DSP_READ_DATA: u16 = 0xA;

/// DSP write command/data (write) and write-buffer status (read).
/// - Bit 7: BUSY (1 = DSP not ready to accept a byte)
pub const DSP_WRITE: u16 = 0xC;

/// DSP read-buffer status (read-only).
/// - Bit 7: DATA_AVAILABLE (1 = a byte is waiting at [`DSP_READ_DATA`])
///
/// Reading this port also acknowledges the 8-bit DMA interrupt.
pub const DSP_READ_STATUS: u16 = 0xE;

// ── Status bits ────────────────────────────────────────────────────────────

/// Write status: DSP still busy with the previous byte.
pub const WRITE_BUSY: u8 = 1 << 7;

/// Read status: a byte is available.
pub const READ_AVAILABLE: u8 = 1 << 7;

// ── Reset handshake ────────────────────────────────────────────────────────

pub const RESET_ASSERT: u8 = 1;
pub const RESET_DEASSERT: u8 = 0;

/// Byte queued by the DSP after a successful reset.
pub const READY_BYTE: u8 = 0xAA;

// ── Commands ───────────────────────────────────────────────────────────────

/// Set output sample rate (DSP 4.xx). Followed by rate high byte, low byte.
pub const CMD_SET_OUTPUT_RATE: u8 = 0x41;

/// 8-bit single-cycle DMA output (DSP 4.xx, `Bx/Cx` family).
/// Followed by the mode byte and the transfer length − 1 (low, high).
pub const CMD_DMA8_SINGLE_OUTPUT: u8 = 0xC0;

/// Pause 8-bit DMA.
pub const CMD_PAUSE_DMA8: u8 = 0xD0;

/// Turn the speaker on.
pub const CMD_SPEAKER_ON: u8 = 0xD1;

/// Turn the speaker off.
pub const CMD_SPEAKER_OFF: u8 = 0xD3;

/// Continue 8-bit DMA.
pub const CMD_CONTINUE_DMA8: u8 = 0xD4;

/// Get DSP version. The DSP answers with major, then minor.
pub const CMD_GET_VERSION: u8 = 0xE1;

// ── Transfer mode byte (second byte of `Bx/Cx` commands) ──────────────────

/// Mono, unsigned samples.
pub const MODE_MONO_UNSIGNED: u8 = 0x00;

/// Bit 4: signed samples.
pub const MODE_SIGNED: u8 = 1 << 4;

/// Bit 5: stereo.
pub const MODE_STEREO: u8 = 1 << 5;
