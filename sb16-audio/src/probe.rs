//! Standalone DSP version probe.
//!
//! For loaders that only want to know whether a card is present: reset
//! the DSP, read its version, log it. No device file, no DMA.

use embedded_hal::delay::DelayNs;
use tracing::{debug, error, info};

use crate::config::DriverConfig;
use crate::dsp::{Dsp, DspError, DspVersion};
use crate::hal::PortIo;

/// Probe the card described by `config` and log what answers.
pub fn probe_version<P, D>(ports: P, delay: D, config: &DriverConfig) -> Result<DspVersion, DspError>
where
    P: PortIo,
    D: DelayNs,
{
    debug!(base_port = config.base_port, "DSP_IO module loaded");
    let mut dsp = Dsp::new_with_config(ports, delay, config);
    match dsp.query_version() {
        Ok(version) => {
            info!("Found SB16 card, DSP version: {}", version);
            Ok(version)
        }
        Err(e) => {
            error!(error = %e, "no SB16 DSP answered");
            Err(e)
        }
    }
}
