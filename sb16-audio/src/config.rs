//! Driver configuration.
//!
//! [`DriverConfig`] gathers every knob of the playback driver. Its
//! [`Default`] reproduces the stock card layout from [`crate::constants`];
//! the `with_*` setters adjust individual fields for cards jumpered
//! differently or for simulated hardware.
//!
//! ```ignore
//! let config = DriverConfig::new()
//!     .with_base_port(0x240)
//!     .with_poll_budget(10_000);
//! config.validate()?;
//! ```

use thiserror::Error;

use crate::constants::{
    DMA_BUFFER_SIZE, DSP_POLL_BUDGET, DSP_RESET_HOLD_US, MIN_DSP_MAJOR, PLAYBACK_DMA_CHANNEL,
    PLAYBACK_SAMPLE_RATE, SB16_BASE_PORT,
};
use crate::dsp::registers::DSP_READ_STATUS;

/// Largest buffer a single 8-bit ISA DMA transfer can cover.
pub const MAX_BUFFER_SIZE: usize = 64 * 1024;

/// Highest base port that leaves room for the whole DSP register block.
pub const MAX_BASE_PORT: u16 = u16::MAX - DSP_READ_STATUS;

/// Rejected configuration values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The DSP register block would run past the end of the port space.
    #[error("base port {port:#06x} leaves no room for the DSP registers")]
    BasePort { port: u16 },
    /// Buffer size is zero or exceeds one DMA page.
    #[error("buffer size {size} is outside 1..=65536")]
    BufferSize { size: usize },
    /// Only the 8-bit channels 0–3 can feed the DSP's 8-bit path.
    #[error("DMA channel {channel} is not an 8-bit channel")]
    DmaChannel { channel: u8 },
    /// A zero sample rate cannot be programmed.
    #[error("sample rate must be non-zero")]
    SampleRate,
    /// A zero poll budget would time out every command.
    #[error("poll budget must be non-zero")]
    PollBudget,
}

/// Settings for [`Sb16Driver`](crate::device::Sb16Driver).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    /// I/O base of the DSP register block.
    pub base_port: u16,
    /// 8-bit DMA channel used for playback.
    pub dma_channel: u8,
    /// Output sample rate in Hz.
    pub sample_rate: u16,
    /// Transfer buffer capacity in bytes.
    pub buffer_size: usize,
    /// Status polls allowed per DSP byte before giving up.
    pub poll_budget: u32,
    /// Reset pulse width in microseconds.
    pub reset_hold_us: u32,
    /// Minimum DSP major version accepted at initialization.
    pub min_dsp_major: u8,
}

impl DriverConfig {
    /// Stock configuration: base 0x220, DMA 1, 11025 Hz, 64 KiB buffer.
    pub const fn new() -> Self {
        Self {
            base_port: SB16_BASE_PORT,
            dma_channel: PLAYBACK_DMA_CHANNEL,
            sample_rate: PLAYBACK_SAMPLE_RATE,
            buffer_size: DMA_BUFFER_SIZE,
            poll_budget: DSP_POLL_BUDGET,
            reset_hold_us: DSP_RESET_HOLD_US,
            min_dsp_major: MIN_DSP_MAJOR,
        }
    }

    pub const fn with_base_port(mut self, base_port: u16) -> Self {
        self.base_port = base_port;
        self
    }

    pub const fn with_dma_channel(mut self, channel: u8) -> Self {
        self.dma_channel = channel;
        self
    }

    pub const fn with_sample_rate(mut self, rate: u16) -> Self {
        self.sample_rate = rate;
        self
    }

    pub const fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    pub const fn with_poll_budget(mut self, budget: u32) -> Self {
        self.poll_budget = budget;
        self
    }

    pub const fn with_reset_hold_us(mut self, us: u32) -> Self {
        self.reset_hold_us = us;
        self
    }

    pub const fn with_min_dsp_major(mut self, major: u8) -> Self {
        self.min_dsp_major = major;
        self
    }

    /// Check the values the hardware cannot accept.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_port > MAX_BASE_PORT {
            return Err(ConfigError::BasePort {
                port: self.base_port,
            });
        }
        if self.buffer_size == 0 || self.buffer_size > MAX_BUFFER_SIZE {
            return Err(ConfigError::BufferSize {
                size: self.buffer_size,
            });
        }
        if self.dma_channel > 3 {
            return Err(ConfigError::DmaChannel {
                channel: self.dma_channel,
            });
        }
        if self.sample_rate == 0 {
            return Err(ConfigError::SampleRate);
        }
        if self.poll_budget == 0 {
            return Err(ConfigError::PollBudget);
        }
        Ok(())
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::new()
    }
}
