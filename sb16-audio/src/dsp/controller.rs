//! SB16 DSP command channel.
//!
//! The DSP is driven one byte at a time through a write port and a read
//! port, each gated by a status bit. [`Dsp`] wraps that handshake and
//! builds the reset, version and playback-programming sequences on top.
//!
//! The driver is generic over any [`PortIo`] and
//! [`embedded_hal::delay::DelayNs`] implementation. The delay is used
//! only for the reset pulse.
//!
//! # Example
//!
//! ```ignore
//! let mut dsp = Dsp::new(ports, delay);
//! let version = dsp.query_version()?; // reset + 0xE1
//! dsp.set_output_rate(11_025)?;
//! ```

use core::fmt;

use embedded_hal::delay::DelayNs;
use thiserror::Error;
use tracing::{debug, error};

use super::registers as reg;
use crate::config::DriverConfig;
use crate::hal::PortIo;

// ── Errors ────────────────────────────────────────────────────────────────

/// Which status bit a command was waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Write buffer to drain (BUSY bit to clear).
    Write,
    /// Read data to arrive (DATA_AVAILABLE bit to set).
    Read,
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Readiness::Write => f.write_str("accept a byte"),
            Readiness::Read => f.write_str("return a byte"),
        }
    }
}

/// DSP protocol failures. None of them is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DspError {
    /// The reset handshake returned something other than 0xAA.
    #[error("DSP reset failed: expected 0xAA, got {response:#04x}")]
    ResetFailed { response: u8 },
    /// The poll budget ran out before the DSP became ready.
    #[error("DSP did not {waiting_for} within the poll budget")]
    Timeout { waiting_for: Readiness },
}

// ── Version ───────────────────────────────────────────────────────────────

/// DSP firmware version as reported by command 0xE1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DspVersion {
    pub major: u8,
    pub minor: u8,
}

impl fmt::Display for DspVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.major, self.minor)
    }
}

// ── Driver struct ─────────────────────────────────────────────────────────

/// SB16 DSP command channel.
///
/// Owns the port accessor for the card's register block. Every blocking
/// wait is bounded by `poll_budget` status reads.
pub struct Dsp<P, D> {
    ports: P,
    delay: D,
    base: u16,
    poll_budget: u32,
    reset_hold_us: u32,
}

impl<P, D> Dsp<P, D>
where
    P: PortIo,
    D: DelayNs,
{
    /// Create a channel for a card at the stock base address.
    pub fn new(ports: P, delay: D) -> Self {
        Self::new_with_config(ports, delay, &DriverConfig::new())
    }

    /// Create a channel using the base port, poll budget and reset pulse
    /// width from `config`.
    pub fn new_with_config(ports: P, delay: D, config: &DriverConfig) -> Self {
        Self {
            ports,
            delay,
            base: config.base_port,
            poll_budget: config.poll_budget,
            reset_hold_us: config.reset_hold_us,
        }
    }

    /// I/O base this channel talks to.
    pub fn base_port(&self) -> u16 {
        self.base
    }

    /// Absolute port of a register. Wraps instead of overflowing for a
    /// base that was never validated.
    fn port(&self, offset: u16) -> u16 {
        self.base.wrapping_add(offset)
    }

    // ── Byte handshake ────────────────────────────────────────────────

    /// Wait for the write buffer to drain, then write `byte`.
    pub fn send(&mut self, byte: u8) -> Result<(), DspError> {
        let port = self.port(reg::DSP_WRITE);
        self.poll(port, Readiness::Write, |s| s & reg::WRITE_BUSY == 0)?;
        self.ports.write_u8(port, byte);
        Ok(())
    }

    /// Wait for a byte to become available, then read it.
    pub fn receive(&mut self) -> Result<u8, DspError> {
        let status = self.port(reg::DSP_READ_STATUS);
        self.poll(status, Readiness::Read, |s| s & reg::READ_AVAILABLE != 0)?;
        Ok(self.ports.read_u8(self.port(reg::DSP_READ_DATA)))
    }

    fn poll(
        &mut self,
        port: u16,
        waiting_for: Readiness,
        ready: impl Fn(u8) -> bool,
    ) -> Result<(), DspError> {
        for _ in 0..self.poll_budget {
            if ready(self.ports.read_u8(port)) {
                return Ok(());
            }
            core::hint::spin_loop();
        }
        Err(DspError::Timeout { waiting_for })
    }

    // ── Reset and identification ──────────────────────────────────────

    /// Pulse the reset line and check for the ready byte.
    pub fn reset(&mut self) -> Result<(), DspError> {
        let reset = self.port(reg::DSP_RESET);
        self.ports.write_u8(reset, reg::RESET_ASSERT);
        self.delay.delay_us(self.reset_hold_us);
        self.ports.write_u8(reset, reg::RESET_DEASSERT);

        let response = self.receive()?;
        if response != reg::READY_BYTE {
            error!(response, "SB reset unsuccessful");
            return Err(DspError::ResetFailed { response });
        }
        debug!("SB reset successful");
        Ok(())
    }

    /// Reset the DSP, then ask for its firmware version.
    ///
    /// A failed reset is returned as-is and no command is sent.
    pub fn query_version(&mut self) -> Result<DspVersion, DspError> {
        self.reset()?;
        self.send(reg::CMD_GET_VERSION)?;
        let major = self.receive()?;
        let minor = self.receive()?;
        debug!(major, minor, "DSP version query");
        Ok(DspVersion { major, minor })
    }

    // ── Playback programming (DSP 4.xx) ───────────────────────────────

    /// Program the output sample rate in Hz (command 0x41, high byte first).
    pub fn set_output_rate(&mut self, rate: u16) -> Result<(), DspError> {
        let [high, low] = rate.to_be_bytes();
        self.send(reg::CMD_SET_OUTPUT_RATE)?;
        self.send(high)?;
        self.send(low)
    }

    /// Start an 8-bit single-cycle DMA output of `len` bytes in `mode`.
    ///
    /// The DSP takes the length minus one, low byte first. `len` must be
    /// in `1..=65536`; the transfer engine has already checked it.
    pub fn start_dma8_output(&mut self, mode: u8, len: usize) -> Result<(), DspError> {
        debug_assert!((1..=0x1_0000).contains(&len));
        let [low, high] = (len.wrapping_sub(1) as u16).to_le_bytes();
        self.send(reg::CMD_DMA8_SINGLE_OUTPUT)?;
        self.send(mode)?;
        self.send(low)?;
        self.send(high)
    }

    /// Consume the driver and return the port accessor and delay.
    pub fn release(self) -> (P, D) {
        (self.ports, self.delay)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
