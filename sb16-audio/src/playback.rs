//! Playback trigger.
//!
//! Once the transfer buffer is full, [`start()`] arms the DMA channel over
//! the buffered samples and tells the DSP to stream them:
//!
//! ```text
//!  TransferBuffer          8237 channel 1              DSP
//! ┌──────────────┐  prepare(Write, addr, len)  ┌─────────────────────┐
//! │ u8 mono PCM  │────────────DMA─────────────►│ 0x41 rate_hi rate_lo│
//! │ capacity B   │                             │ 0xC0 0x00 len-1     │
//! └──────────────┘                             └─────────────────────┘
//! ```
//!
//! Nothing waits for playback to finish. The returned [`Transfer`] can be
//! polled instead.

use embedded_hal::delay::DelayNs;
use thiserror::Error;
use tracing::debug;

use crate::buffer::TransferBuffer;
use crate::config::DriverConfig;
use crate::dma::{TransferEngine, TransferError, TransferMode};
use crate::dsp::registers::MODE_MONO_UNSIGNED;
use crate::dsp::{Dsp, DspError};
use crate::hal::{DmaMemory, PortIo};

/// Failures while arming playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error(transparent)]
    Transfer(#[from] TransferError),
    #[error(transparent)]
    Dsp(#[from] DspError),
}

/// Where the device is in its fill cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing buffered.
    Idle,
    /// Some samples buffered, room for more.
    Filling,
    /// Buffer full and handed to the hardware.
    Playing,
}

impl PlaybackState {
    pub fn of<M: DmaMemory>(buffer: &TransferBuffer<M>) -> Self {
        if buffer.is_full() {
            PlaybackState::Playing
        } else if buffer.cursor() == 0 {
            PlaybackState::Idle
        } else {
            PlaybackState::Filling
        }
    }
}

/// A transfer handed to the DMA engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct Transfer {
    channel: u8,
    len: usize,
}

impl Transfer {
    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Bytes in the transfer.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes the engine has not moved yet.
    pub fn residue<T: TransferEngine + ?Sized>(&self, engine: &mut T) -> usize {
        engine.residue(self.channel)
    }

    /// Whether the engine has moved the last byte.
    pub fn is_done<T: TransferEngine + ?Sized>(&self, engine: &mut T) -> bool {
        engine.is_done(self.channel)
    }
}

/// Arm DMA over the whole of `buffer`, then program the DSP for an 8-bit
/// mono unsigned single-cycle output at `config.sample_rate`.
///
/// The DMA channel is programmed first so the DSP never requests a byte
/// from an unarmed channel.
pub fn start<P, D, T, M>(
    dsp: &mut Dsp<P, D>,
    engine: &mut T,
    buffer: &TransferBuffer<M>,
    config: &DriverConfig,
) -> Result<Transfer, PlaybackError>
where
    P: PortIo,
    D: DelayNs,
    T: TransferEngine + ?Sized,
    M: DmaMemory,
{
    let len = buffer.capacity();
    let channel = config.dma_channel;

    engine.prepare(channel, TransferMode::Write, buffer.bus_address(), len)?;
    dsp.set_output_rate(config.sample_rate)?;
    dsp.start_dma8_output(MODE_MONO_UNSIGNED, len)?;

    debug!(channel, len, rate = config.sample_rate, "Started play");
    Ok(Transfer { channel, len })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dma::Dma8237;
    use crate::testing::{
        MockDelay, RecordingEngine, SimulatedDmac, SimulatedDsp, TestAllocator, TestMemory,
    };

    fn make_dsp() -> Dsp<SimulatedDsp, MockDelay> {
        Dsp::new_with_config(
            SimulatedDsp::new(),
            MockDelay::default(),
            &DriverConfig::new().with_poll_budget(64),
        )
    }

    fn full_buffer(capacity: usize) -> TransferBuffer<TestMemory<64>> {
        let mut buf = TransferBuffer::new(TestAllocator::<64>::memory(capacity));
        buf.write_at(0, &[0x80; 64]).unwrap();
        buf
    }

    #[test]
    fn start_arms_dma_then_programs_dsp() {
        let mut dsp = make_dsp();
        let mut engine = RecordingEngine::new();
        let buf = full_buffer(8);

        let transfer = start(&mut dsp, &mut engine, &buf, &DriverConfig::new()).unwrap();
        assert_eq!(transfer.channel(), 1);
        assert_eq!(transfer.len(), 8);

        assert_eq!(engine.prepare_count, 1);
        assert_eq!(
            engine.prepared[0],
            (1, TransferMode::Write, buf.bus_address(), 8)
        );

        let (card, _) = dsp.release();
        assert_eq!(
            card.commands(),
            &[0x41, 0x2B, 0x11, 0xC0, 0x00, 0x07, 0x00]
        );
    }

    #[test]
    fn transfer_token_polls_engine() {
        let mut dsp = make_dsp();
        let mut engine = RecordingEngine::new();
        let buf = full_buffer(8);

        let transfer = start(&mut dsp, &mut engine, &buf, &DriverConfig::new()).unwrap();
        assert_eq!(transfer.residue(&mut engine), 8);
        assert!(!transfer.is_done(&mut engine));

        engine.residue = 0;
        assert!(transfer.is_done(&mut engine));
    }

    #[test]
    fn engine_rejection_sends_no_dsp_commands() {
        let mut dsp = make_dsp();
        let mut engine = Dma8237::new(SimulatedDmac::new());
        let buf = full_buffer(8);
        let config = DriverConfig::new().with_dma_channel(5);

        assert_eq!(
            start(&mut dsp, &mut engine, &buf, &config),
            Err(PlaybackError::Transfer(TransferError::InvalidChannel {
                channel: 5
            }))
        );
        let (card, _) = dsp.release();
        assert!(card.commands().is_empty());
    }

    #[test]
    fn dsp_timeout_is_reported() {
        let mut dsp = Dsp::new_with_config(
            SimulatedDsp::absent(),
            MockDelay::default(),
            &DriverConfig::new().with_poll_budget(4),
        );
        let mut engine = RecordingEngine::new();
        let buf = full_buffer(8);

        assert!(matches!(
            start(&mut dsp, &mut engine, &buf, &DriverConfig::new()),
            Err(PlaybackError::Dsp(DspError::Timeout { .. }))
        ));
    }

    #[test]
    fn state_follows_fill_level() {
        let mut buf = TransferBuffer::new(TestAllocator::<64>::memory(8));
        assert_eq!(PlaybackState::of(&buf), PlaybackState::Idle);
        buf.write_at(0, &[1; 3]).unwrap();
        assert_eq!(PlaybackState::of(&buf), PlaybackState::Filling);
        buf.write_at(3, &[1; 5]).unwrap();
        assert_eq!(PlaybackState::of(&buf), PlaybackState::Playing);
        buf.reset();
        assert_eq!(PlaybackState::of(&buf), PlaybackState::Idle);
    }
}
