//! Query ioctl argument shape.
//!
//! A companion character device exchanges three integers with user space
//! through `get` / `clear` / `set` ioctls. Nothing in the playback path
//! uses it; only the wire layout and request codes are defined here.

use core::mem::size_of;

/// Argument block shared with user space (`struct query_arg_t`).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryArgs {
    pub status: i32,
    pub dignity: i32,
    pub ego: i32,
}

/// ioctl magic for the query device.
pub const QUERY_MAGIC: u8 = b'q';

const IOC_NONE: u32 = 0;
const IOC_WRITE: u32 = 1;
const IOC_READ: u32 = 2;

/// Linux `_IOC(dir, type, nr, size)`.
const fn ioc(dir: u32, ty: u8, nr: u8, size: usize) -> u32 {
    (dir << 30) | ((size as u32 & 0x3FFF) << 16) | ((ty as u32) << 8) | nr as u32
}

/// The request is declared with a pointer argument type, so the encoded
/// size is the pointer width.
const ARG_SIZE: usize = size_of::<*mut QueryArgs>();

pub const QUERY_GET_VARIABLES: u32 = ioc(IOC_READ, QUERY_MAGIC, 1, ARG_SIZE);
pub const QUERY_CLR_VARIABLES: u32 = ioc(IOC_NONE, QUERY_MAGIC, 2, 0);
pub const QUERY_SET_VARIABLES: u32 = ioc(IOC_WRITE, QUERY_MAGIC, 3, ARG_SIZE);

/// Decoded query request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryRequest {
    /// Copy the current values out to user space.
    Get,
    /// Zero all three values.
    Clear,
    /// Copy new values in from user space.
    Set,
}

impl QueryRequest {
    pub const fn code(self) -> u32 {
        match self {
            QueryRequest::Get => QUERY_GET_VARIABLES,
            QueryRequest::Clear => QUERY_CLR_VARIABLES,
            QueryRequest::Set => QUERY_SET_VARIABLES,
        }
    }

    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            QUERY_GET_VARIABLES => Some(QueryRequest::Get),
            QUERY_CLR_VARIABLES => Some(QueryRequest::Clear),
            QUERY_SET_VARIABLES => Some(QueryRequest::Set),
            _ => None,
        }
    }
}
