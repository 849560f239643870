//! Character-device surface.
//!
//! Kernels call file operations through shared references, possibly from
//! several contexts at once. [`Sb16Device`] puts the driver context behind
//! a spinlock and implements [`FileOperations`] over it, translating the
//! file position to and from the buffer offset.

use embedded_hal::delay::DelayNs;
use spin::{Mutex, MutexGuard};

use crate::constants::{DEVICE_MAJOR, DEVICE_NAME};
use crate::device::{DeviceError, Sb16Driver};
use crate::dma::TransferEngine;
use crate::hal::{DmaAllocator, PortIo};

/// The four operations a device file supports.
pub trait FileOperations {
    fn open(&self) -> Result<(), DeviceError>;

    fn release(&self) -> Result<(), DeviceError>;

    /// Read into `buf` at `*pos`, advancing it.
    fn read(&self, buf: &mut [u8], pos: &mut u64) -> Result<usize, DeviceError>;

    /// Write `buf` at `*pos`, advancing it by the bytes accepted.
    fn write(&self, buf: &[u8], pos: &mut u64) -> Result<usize, DeviceError>;
}

/// Convert an operation result to the `ssize_t` convention: a byte count,
/// or a negative errno.
pub fn to_ssize(result: Result<usize, DeviceError>) -> isize {
    match result {
        Ok(n) => n as isize,
        Err(e) => e.errno() as isize,
    }
}

/// The playback device as registered with the device-file layer.
pub struct Sb16Device<P, D, T, A: DmaAllocator> {
    driver: Mutex<Sb16Driver<P, D, T, A>>,
}

impl<P, D, T, A> Sb16Device<P, D, T, A>
where
    P: PortIo,
    D: DelayNs,
    T: TransferEngine,
    A: DmaAllocator,
{
    pub const MAJOR: u32 = DEVICE_MAJOR;
    pub const NAME: &'static str = DEVICE_NAME;

    pub fn new(driver: Sb16Driver<P, D, T, A>) -> Self {
        Self {
            driver: Mutex::new(driver),
        }
    }

    /// Lock the driver context for status queries.
    pub fn lock(&self) -> MutexGuard<'_, Sb16Driver<P, D, T, A>> {
        self.driver.lock()
    }

    /// Unregister: give the driver context back for shutdown.
    pub fn into_inner(self) -> Sb16Driver<P, D, T, A> {
        self.driver.into_inner()
    }
}

impl<P, D, T, A> FileOperations for Sb16Device<P, D, T, A>
where
    P: PortIo,
    D: DelayNs,
    T: TransferEngine,
    A: DmaAllocator,
{
    fn open(&self) -> Result<(), DeviceError> {
        self.driver.lock().open()
    }

    fn release(&self) -> Result<(), DeviceError> {
        self.driver.lock().close()
    }

    fn read(&self, buf: &mut [u8], _pos: &mut u64) -> Result<usize, DeviceError> {
        self.driver.lock().read(buf)
    }

    fn write(&self, buf: &[u8], pos: &mut u64) -> Result<usize, DeviceError> {
        // Positions beyond the address space are past any buffer end.
        let offset = usize::try_from(*pos).unwrap_or(usize::MAX);
        let fill = self.driver.lock().write(buf, offset)?;
        *pos = fill.next_offset as u64;
        Ok(fill.accepted)
    }
}
