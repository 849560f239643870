//! Intel 8237 DMA controller, 8-bit channels 0–3.

use super::{check_reachable, TransferEngine, TransferError, TransferMode};
use crate::hal::PortIo;

/// Address register port per channel (count register is the next port).
const ADDRESS_PORTS: [u16; 4] = [0x00, 0x02, 0x04, 0x06];
/// Page register port per channel.
const PAGE_PORTS: [u16; 4] = [0x87, 0x83, 0x81, 0x82];

/// Status register (read). Bits 3:0: terminal count reached, cleared on read.
const STATUS: u16 = 0x08;
/// Single-channel mask register (write). Bit 2 set masks, bits 1:0 select.
const SINGLE_MASK: u16 = 0x0A;
const MODE: u16 = 0x0B;
/// Any write resets the byte-pointer flip-flop to the low byte.
const CLEAR_FLIP_FLOP: u16 = 0x0C;

const MASK_ON: u8 = 1 << 2;

/// The first (8-bit) 8237 of a PC.
///
/// Terminal-count bits are sticky: reading the status register clears
/// them for all channels, so each read is folded into `completed` until
/// the channel is programmed again.
pub struct Dma8237<P> {
    ports: P,
    completed: u8,
}

impl<P: PortIo> Dma8237<P> {
    pub fn new(ports: P) -> Self {
        Self {
            ports,
            completed: 0,
        }
    }

    /// Consume the controller and return the port accessor.
    pub fn release(self) -> P {
        self.ports
    }

    fn write_word(&mut self, port: u16, word: u16) {
        let [low, high] = word.to_le_bytes();
        self.ports.write_u8(port, low);
        self.ports.write_u8(port, high);
    }

    fn read_word(&mut self, port: u16) -> u16 {
        let low = self.ports.read_u8(port);
        let high = self.ports.read_u8(port);
        u16::from_le_bytes([low, high])
    }
}

impl<P: PortIo> TransferEngine for Dma8237<P> {
    fn prepare(
        &mut self,
        channel: u8,
        mode: TransferMode,
        bus_address: u64,
        len: usize,
    ) -> Result<(), TransferError> {
        if channel > 3 {
            return Err(TransferError::InvalidChannel { channel });
        }
        check_reachable(bus_address, len)?;

        let ch = channel as usize;
        self.ports.write_u8(SINGLE_MASK, MASK_ON | channel);
        self.ports.write_u8(CLEAR_FLIP_FLOP, 0);
        self.ports.write_u8(MODE, mode as u8 | channel);
        self.ports.write_u8(PAGE_PORTS[ch], (bus_address >> 16) as u8);
        self.write_word(ADDRESS_PORTS[ch], bus_address as u16);
        self.write_word(ADDRESS_PORTS[ch] + 1, (len - 1) as u16);
        self.completed &= !(1 << channel);
        self.ports.write_u8(SINGLE_MASK, channel);
        Ok(())
    }

    fn residue(&mut self, channel: u8) -> usize {
        if channel > 3 || self.is_done(channel) {
            return 0;
        }
        self.ports.write_u8(CLEAR_FLIP_FLOP, 0);
        // The counter holds bytes-left minus one; 0xFFFF is a full page
        // until terminal count is flagged.
        let count = self.read_word(ADDRESS_PORTS[channel as usize] + 1);
        count as usize + 1
    }

    fn is_done(&mut self, channel: u8) -> bool {
        if channel > 3 {
            return false;
        }
        self.completed |= self.ports.read_u8(STATUS) & 0x0F;
        self.completed & (1 << channel) != 0
    }
}
