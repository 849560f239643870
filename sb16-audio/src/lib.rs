//! # sb16-audio
//!
//! A `no_std` driver core for the playback side of a
//! [Sound Blaster 16](https://en.wikipedia.org/wiki/Sound_Blaster_16) card.
//! Samples written to the device file are collected in a DMA buffer; when
//! the buffer fills, the 8237 DMA controller and the card's DSP are
//! programmed for a single-cycle 8-bit mono transfer.
//!
//! Hardware access goes through small traits ([`hal::PortIo`],
//! [`hal::DmaAllocator`], [`dma::TransferEngine`] and `embedded-hal`'s
//! `DelayNs`), so the whole driver runs against simulated hardware in
//! tests.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Seams | [`hal`] | Port I/O, DMA memory and allocator traits |
//! | Card | [`dsp`] | DSP command channel, reset, version query |
//! | Motherboard | [`dma`] | 8237 ISA DMA channel programming |
//! | Buffer | [`buffer`] | Fill cursor over the DMA memory |
//! | Playback | [`playback`] | Start a transfer over the filled buffer |
//! | Driver | [`device`] / [`file`] | Driver context and device-file surface |
//! | Tools | [`probe`] / [`ioctl`] | Version probe, query ioctl layout |
//!
//! ## Quick start
//!
//! ```ignore
//! use sb16_audio::config::DriverConfig;
//! use sb16_audio::device::Sb16Driver;
//! use sb16_audio::dma::Dma8237;
//! use sb16_audio::file::{FileOperations, Sb16Device};
//! use sb16_audio::hal::X86PortIo;
//!
//! let driver = Sb16Driver::init(
//!     DriverConfig::default(),
//!     unsafe { X86PortIo::new() },
//!     kernel_delay,
//!     Dma8237::new(unsafe { X86PortIo::new() }),
//!     kernel_dma_allocator,
//! )?;
//! let device = Sb16Device::new(driver);
//!
//! device.open()?;
//! let mut pos = 0;
//! device.write(&samples, &mut pos)?;
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `x86` | yes | [`hal::X86PortIo`] using `in`/`out` instructions (x86 targets only) |
//!
//! ## Playback parameters
//!
//! - **Base port:** 0x220 ([`constants::SB16_BASE_PORT`])
//! - **Sample rate:** 11 025 Hz ([`constants::PLAYBACK_SAMPLE_RATE`])
//! - **Sample format:** `u8` (unsigned 8-bit mono)
//! - **DMA:** channel 1, buffer up to 64 KiB ([`constants::DMA_BUFFER_SIZE`])

#![no_std]

#[cfg(test)]
extern crate std;

pub mod constants;
pub mod config;
pub mod hal;
pub mod dsp;
pub mod dma;
pub mod buffer;
pub mod playback;
pub mod device;
pub mod file;
pub mod probe;
pub mod ioctl;

#[cfg(test)]
mod testing;
