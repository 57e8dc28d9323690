//! Library error types.
//!
use std::fmt;

/// A packval [`Result`], normally returning a packval [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A packval decode error. Encompasses every way a byte buffer can fail to
/// decode as a valid MessagePack value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The cursor, or a length field read from the buffer, would read past
    /// the end of the available bytes.
    LengthTooShort {
        /// What step of decoding was in progress.
        step: &'static str,
        /// How many bytes were needed to complete that step.
        needed: usize,
        /// How many bytes were actually left in the buffer.
        available: usize,
    },
    /// The reserved format byte `0xC1` was found where a format byte was
    /// expected.
    ReservedByte,
    /// A format byte did not match any entry in the dispatch table. Should be
    /// unreachable, since the table is total over `0x00..=0xFF` except
    /// `0xC1`, but kept as a defensive catch-all.
    UnknownByte(u8),
    /// Array/Map nesting exceeded the decoder's depth limit.
    DepthLimitExceeded,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::LengthTooShort {
                step,
                needed,
                available,
            } => write!(
                f,
                "expected {} more byte(s) to {}, but only {} remain",
                needed, step, available
            ),
            Error::ReservedByte => write!(f, "encountered reserved format byte 0xC1"),
            Error::UnknownByte(b) => write!(f, "unrecognized format byte 0x{:02X}", b),
            Error::DepthLimitExceeded => write!(f, "exceeded maximum array/map nesting depth"),
        }
    }
}

impl std::error::Error for Error {}
