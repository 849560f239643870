//! x86 port I/O via `in`/`out` instructions.

use super::PortIo;

/// Direct access to the x86 I/O port space.
///
/// Requires ring 0 (or an I/O permission bitmap granting the ports).
#[derive(Debug)]
pub struct X86PortIo {
    _private: (),
}

impl X86PortIo {
    /// # Safety
    /// The caller must be privileged to execute `in`/`out`, and must own
    /// every port the driver will touch.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl PortIo for X86PortIo {
    #[inline]
    fn read_u8(&mut self, port: u16) -> u8 {
        let value: u8;
        // SAFETY: privilege and port ownership are guaranteed by `new`.
        unsafe {
            core::arch::asm!(
                "in al, dx",
                in("dx") port,
                out("al") value,
                options(nomem, nostack, preserves_flags)
            );
        }
        value
    }

    #[inline]
    fn write_u8(&mut self, port: u16, value: u8) {
        // SAFETY: privilege and port ownership are guaranteed by `new`.
        unsafe {
            core::arch::asm!(
                "out dx, al",
                in("dx") port,
                in("al") value,
                options(nomem, nostack, preserves_flags)
            );
        }
    }
}
