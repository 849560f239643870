/// Default I/O base of the Sound Blaster 16 (jumper setting `A220`).
pub const SB16_BASE_PORT: u16 = 0x220;

/// Size of the playback transfer buffer in bytes (one full ISA DMA page).
pub const DMA_BUFFER_SIZE: usize = 64 * 1024;

/// Playback sample rate in Hz.
pub const PLAYBACK_SAMPLE_RATE: u16 = 11_025;

/// 8-bit ISA DMA channel wired to the DSP (jumper setting `D1`).
pub const PLAYBACK_DMA_CHANNEL: u8 = 1;

/// Polls of a DSP status port before a command is abandoned.
pub const DSP_POLL_BUDGET: u32 = 100_000;

/// Time the reset line is held high, in microseconds.
pub const DSP_RESET_HOLD_US: u32 = 3;

/// Oldest DSP major version that understands the 4.xx playback commands.
pub const MIN_DSP_MAJOR: u8 = 4;

/// Character device major number for the playback device.
pub const DEVICE_MAJOR: u32 = 62;

/// Character device name for the playback device.
pub const DEVICE_NAME: &str = "sb16driver";
