//! Sound Blaster 16 DSP.
//!
//! [`Dsp`] is the byte-level command channel to the card's digital signal
//! processor: the bounded send/receive handshake, the reset protocol, the
//! version query and the 4.xx playback commands. Register offsets and
//! command bytes live in [`registers`].

pub mod registers;
mod controller;

pub use controller::{Dsp, DspError, DspVersion, Readiness};
