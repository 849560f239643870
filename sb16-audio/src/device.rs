//! Playback device driver.
//!
//! [`Sb16Driver`] is the driver context: it owns the DSP channel, the DMA
//! engine, the DMA allocator and the transfer buffer, and exposes the
//! open / close / read / write operations of the playback device.
//!
//! ## Lifecycle
//!
//! ```text
//!  init ──► Closed ──open──► Open ──close──► Closed ──shutdown──► (parts)
//!                              │
//!                            write ──(buffer full)──► playback::start
//! ```
//!
//! `init` resets the DSP, checks its version and allocates the buffer. If
//! any step fails, whatever was acquired is released and no driver exists.
//! Only one opener is allowed at a time.

use embedded_hal::delay::DelayNs;
use thiserror::Error;
use tracing::{debug, error, info, trace, warn};

use crate::buffer::{BufferError, Fill, TransferBuffer};
use crate::config::{ConfigError, DriverConfig};
use crate::dma::{check_reachable, TransferEngine, TransferError};
use crate::dsp::{Dsp, DspError, DspVersion};
use crate::hal::{DmaAllocator, DmaMemory, PortIo};
use crate::playback::{self, PlaybackError, PlaybackState, Transfer};

// ── Errors ────────────────────────────────────────────────────────────────

/// Reasons initialization aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InitError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Dsp(#[from] DspError),
    /// The DSP predates the 4.xx playback commands.
    #[error("DSP version {version} is not supported")]
    UnsupportedDsp { version: DspVersion },
    /// The allocator had no DMA memory for the buffer.
    #[error("could not allocate {requested} bytes of DMA memory")]
    OutOfDmaMemory { requested: usize },
    /// The allocated region cannot be reached by the transfer engine.
    #[error("DMA buffer unusable: {0}")]
    UnusableDmaMemory(TransferError),
}

/// Failures of device-file operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// Another opener holds the device.
    #[error("device is already open")]
    Busy,
    #[error("device is not open")]
    NotOpen,
    /// The buffer is full or the offset is at or past its end.
    #[error("no space left in the transfer buffer")]
    NoSpace,
    /// Samples were buffered but playback could not be started.
    #[error("playback failed to start: {0}")]
    Playback(#[from] PlaybackError),
}

impl From<BufferError> for DeviceError {
    fn from(e: BufferError) -> Self {
        match e {
            BufferError::Full => DeviceError::NoSpace,
        }
    }
}

impl DeviceError {
    /// Negative errno for a device-file layer.
    pub fn errno(&self) -> i32 {
        match self {
            DeviceError::Busy => -16,       // EBUSY
            DeviceError::NotOpen => -9,     // EBADF
            DeviceError::NoSpace => -28,    // ENOSPC
            DeviceError::Playback(_) => -5, // EIO
        }
    }
}

// ── Driver ────────────────────────────────────────────────────────────────

/// Whether the device file is held by an opener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    Closed,
    Open,
}

/// SB16 playback driver context.
pub struct Sb16Driver<P, D, T, A: DmaAllocator> {
    config: DriverConfig,
    dsp: Dsp<P, D>,
    engine: T,
    allocator: A,
    buffer: TransferBuffer<A::Memory>,
    version: DspVersion,
    state: DeviceState,
    transfer: Option<Transfer>,
}

impl<P, D, T, A> Sb16Driver<P, D, T, A>
where
    P: PortIo,
    D: DelayNs,
    T: TransferEngine,
    A: DmaAllocator,
{
    /// Bring up the card and allocate the transfer buffer.
    pub fn init(
        config: DriverConfig,
        ports: P,
        delay: D,
        engine: T,
        mut allocator: A,
    ) -> Result<Self, InitError> {
        info!("SB16Driver module loaded");
        config.validate()?;

        let mut dsp = Dsp::new_with_config(ports, delay, &config);
        let version = dsp.query_version().map_err(|e| {
            error!(error = %e, "DSP version query failed");
            e
        })?;
        if version.major < config.min_dsp_major {
            error!(%version, "DSP too old for 4.xx playback commands");
            return Err(InitError::UnsupportedDsp { version });
        }
        info!("Found SB16 card, DSP version: {}", version);

        let requested = config.buffer_size;
        let memory = allocator.allocate(requested).ok_or_else(|| {
            error!(requested, "dma_buffer allocation failed");
            InitError::OutOfDmaMemory { requested }
        })?;
        if let Err(e) = check_reachable(memory.bus_address(), memory.len()) {
            error!(error = %e, "dma_buffer not usable for ISA DMA");
            allocator.release(memory);
            return Err(InitError::UnusableDmaMemory(e));
        }
        debug!(
            bus_address = memory.bus_address(),
            len = memory.len(),
            "dma_buffer allocated"
        );

        Ok(Self {
            config,
            dsp,
            engine,
            allocator,
            buffer: TransferBuffer::new(memory),
            version,
            state: DeviceState::Closed,
            transfer: None,
        })
    }

    // ── Device file operations ────────────────────────────────────────

    /// Claim the device. Fails with [`DeviceError::Busy`] while another
    /// opener holds it.
    pub fn open(&mut self) -> Result<(), DeviceError> {
        if self.state == DeviceState::Open {
            warn!("rejecting second open");
            return Err(DeviceError::Busy);
        }
        self.state = DeviceState::Open;
        debug!("Device Opened");
        Ok(())
    }

    /// Release the device and empty the buffer for the next fill cycle.
    ///
    /// A transfer already started keeps running; its token stays pollable
    /// through [`is_playback_done()`](Self::is_playback_done).
    pub fn close(&mut self) -> Result<(), DeviceError> {
        self.require_open()?;
        self.buffer.reset();
        self.state = DeviceState::Closed;
        debug!("Device Closed");
        Ok(())
    }

    /// The device is not a data source: always end-of-stream.
    pub fn read(&mut self, _buf: &mut [u8]) -> Result<usize, DeviceError> {
        self.require_open()?;
        Ok(0)
    }

    /// Buffer `data` at `offset`; starts playback when the buffer fills.
    ///
    /// Returns how many bytes were taken and where the next write should
    /// go. If playback cannot be started the samples stay buffered and
    /// the error is returned; the buffer reports full until `close`.
    pub fn write(&mut self, data: &[u8], offset: usize) -> Result<Fill, DeviceError> {
        self.require_open()?;
        trace!(offset, count = data.len(), "write");

        let fill = self.buffer.write_at(offset, data)?;
        if fill.completed {
            debug!("Calling start_play()");
            let transfer =
                playback::start(&mut self.dsp, &mut self.engine, &self.buffer, &self.config)?;
            self.transfer = Some(transfer);
        }
        Ok(fill)
    }

    fn require_open(&self) -> Result<(), DeviceError> {
        match self.state {
            DeviceState::Open => Ok(()),
            DeviceState::Closed => Err(DeviceError::NotOpen),
        }
    }

    // ── Status ────────────────────────────────────────────────────────

    pub fn state(&self) -> DeviceState {
        self.state
    }

    pub fn version(&self) -> DspVersion {
        self.version
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn buffer(&self) -> &TransferBuffer<A::Memory> {
        &self.buffer
    }

    pub fn playback_state(&self) -> PlaybackState {
        PlaybackState::of(&self.buffer)
    }

    /// The most recently started transfer, if any.
    pub fn transfer(&self) -> Option<Transfer> {
        self.transfer
    }

    /// Poll the last started transfer. `None` if playback never started.
    pub fn is_playback_done(&mut self) -> Option<bool> {
        let transfer = self.transfer?;
        Some(transfer.is_done(&mut self.engine))
    }

    /// Bytes the last started transfer has still to move.
    pub fn playback_residue(&mut self) -> Option<usize> {
        let transfer = self.transfer?;
        Some(transfer.residue(&mut self.engine))
    }

    // ── Teardown ──────────────────────────────────────────────────────

    /// Free the buffer, reset the DSP (stopping any transfer) and hand the
    /// hardware back.
    pub fn shutdown(self) -> (P, D, T, A) {
        let Self {
            mut dsp,
            engine,
            mut allocator,
            buffer,
            ..
        } = self;

        allocator.release(buffer.into_memory());
        if let Err(e) = dsp.reset() {
            warn!(error = %e, "DSP reset during unload failed");
        }
        info!("SB16Driver module unloaded");

        let (ports, delay) = dsp.release();
        (ports, delay, engine, allocator)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
