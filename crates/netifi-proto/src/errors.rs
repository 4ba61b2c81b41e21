//! Error types for the Netifi frame codec.
//!
//! All errors are structured, comparable in tests, and raised synchronously at
//! decode (or encode) time. Nothing in this crate retries.

use thiserror::Error;

use crate::FrameType;

/// Protocol-level errors raised while encoding or decoding frames.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    // Buffer shape errors
    /// A field claims more bytes than the buffer has left
    #[error("malformed frame: {field} needs {needed} bytes, only {remaining} remaining")]
    MalformedFrame {
        /// Field being read
        field: &'static str,
        /// Bytes the field requires
        needed: usize,
        /// Bytes left in the buffer
        remaining: usize,
    },

    /// A length prefix is negative
    #[error("invalid length prefix for {field}: {length}")]
    InvalidLength {
        /// Field being read
        field: &'static str,
        /// Raw int32 read from the wire
        length: i32,
    },

    /// A string field is not valid UTF-8
    #[error("invalid utf-8 in {field}")]
    InvalidUtf8 {
        /// Field being read
        field: &'static str,
    },

    /// Bytes left over after the last field of a frame without a tag map
    #[error("{remaining} trailing bytes after {frame_type:?} frame")]
    TrailingBytes {
        /// Frame being read
        frame_type: FrameType,
        /// Bytes left in the buffer
        remaining: usize,
    },

    /// An address length other than 0, 4 or 16
    #[error("invalid ip address length: {0} (expected 0, 4 or 16)")]
    InvalidAddressLength(usize),

    // Dispatch errors
    /// Header carries a frame type outside the known set
    #[error("unknown frame type: {0:#06x}")]
    UnknownFrameType(u16),

    /// Frame type is known but not handled by the caller
    #[error("unsupported frame type: {0:?}")]
    UnsupportedFrameType(FrameType),

    /// A variant decoder was handed a header for a different variant
    #[error("unexpected frame type: expected {expected:?}, got {actual:#06x}")]
    UnexpectedFrameType {
        /// Variant the decoder reads
        expected: FrameType,
        /// Raw type found in the header
        actual: u16,
    },

    // Tag map errors
    /// The tag map ends part way through a key/value pair
    #[error("truncated tag map: partial pair at offset {offset}, frame ends at {end}")]
    TruncatedTagMap {
        /// Offset where the partial pair starts
        offset: usize,
        /// End offset of the frame
        end: usize,
    },

    /// The same tag key appears twice on the wire
    #[error("duplicate tag key: {0:?}")]
    DuplicateKey(String),

    // Encode errors
    /// Encoded frame exceeds the transport metadata limit
    #[error("frame too large: {size} bytes exceeds maximum {max}")]
    FrameTooLarge {
        /// Encoded size
        size: usize,
        /// Maximum allowed size
        max: usize,
    },
}

/// Convenient Result type alias for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;
