//! Hardware seams.
//!
//! The driver never touches hardware directly. Port I/O goes through
//! [`PortIo`], transfer-capable memory comes from a [`DmaAllocator`], and
//! timing uses [`embedded_hal::delay::DelayNs`]. A kernel supplies real
//! implementations (see [`X86PortIo`] and [`DmaRegion`]); tests supply
//! simulated ones.

#[cfg(all(feature = "x86", any(target_arch = "x86", target_arch = "x86_64")))]
mod x86;

#[cfg(all(feature = "x86", any(target_arch = "x86", target_arch = "x86_64")))]
pub use x86::X86PortIo;

/// Byte-wide access to an I/O port space.
///
/// Both operations are side-effecting: reading a data port may pop a
/// byte from the device, and writes may start hardware activity.
pub trait PortIo {
    /// Read one byte from `port`.
    fn read_u8(&mut self, port: u16) -> u8;

    /// Write one byte to `port`.
    fn write_u8(&mut self, port: u16, value: u8);
}

impl<T: PortIo + ?Sized> PortIo for &mut T {
    fn read_u8(&mut self, port: u16) -> u8 {
        T::read_u8(self, port)
    }

    fn write_u8(&mut self, port: u16, value: u8) {
        T::write_u8(self, port, value)
    }
}

/// Memory a bus-master or ISA DMA engine can read from.
pub trait DmaMemory {
    /// CPU view of the region.
    fn bytes(&self) -> &[u8];

    /// Mutable CPU view of the region.
    fn bytes_mut(&mut self) -> &mut [u8];

    /// Physical address the transfer engine sees for the first byte.
    fn bus_address(&self) -> u64;

    /// Region length in bytes.
    fn len(&self) -> usize {
        self.bytes().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Source of transfer-capable memory.
pub trait DmaAllocator {
    type Memory: DmaMemory;

    /// Allocate `len` bytes of physically contiguous DMA memory.
    ///
    /// Returns `None` when no suitable memory is available.
    fn allocate(&mut self, len: usize) -> Option<Self::Memory>;

    /// Give a region back.
    fn release(&mut self, memory: Self::Memory);
}

impl<A: DmaAllocator + ?Sized> DmaAllocator for &mut A {
    type Memory = A::Memory;

    fn allocate(&mut self, len: usize) -> Option<Self::Memory> {
        A::allocate(self, len)
    }

    fn release(&mut self, memory: Self::Memory) {
        A::release(self, memory)
    }
}

/// DMA-capable memory region handed out by a kernel page allocator.
///
/// Holds both the CPU pointer and the device-visible bus address.
pub struct DmaRegion {
    cpu_ptr: *mut u8,
    bus_addr: u64,
    size: usize,
}

impl DmaRegion {
    /// Wrap an allocated region.
    ///
    /// # Safety
    /// - `cpu_ptr` must point to `size` bytes of valid, exclusively owned memory
    /// - `bus_addr` must be the address the DMA engine uses for `cpu_ptr`
    pub const unsafe fn new(cpu_ptr: *mut u8, bus_addr: u64, size: usize) -> Self {
        Self {
            cpu_ptr,
            bus_addr,
            size,
        }
    }

    /// CPU base pointer.
    #[inline]
    pub const fn cpu_base(&self) -> *mut u8 {
        self.cpu_ptr
    }
}

impl DmaMemory for DmaRegion {
    fn bytes(&self) -> &[u8] {
        // SAFETY: `new` requires `cpu_ptr` to cover `size` owned bytes.
        unsafe { core::slice::from_raw_parts(self.cpu_ptr, self.size) }
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: as above, and `&mut self` makes the borrow unique.
        unsafe { core::slice::from_raw_parts_mut(self.cpu_ptr, self.size) }
    }

    fn bus_address(&self) -> u64 {
        self.bus_addr
    }

    fn len(&self) -> usize {
        self.size
    }
}

// SAFETY: the region is exclusively owned by whoever holds the `DmaRegion`.
unsafe impl Send for DmaRegion {}

impl core::fmt::Debug for DmaRegion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DmaRegion")
            .field("cpu_ptr", &self.cpu_ptr)
            .field("bus_addr", &format_args!("{:#x}", self.bus_addr))
            .field("size", &format_args!("{:#x}", self.size))
            .finish()
    }
}
