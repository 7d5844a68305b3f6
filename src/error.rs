//! Error types
//!
//! Central error module for the crate. Each layer has its own error enum
//! (protocol, validation, transport, source) and the top-level [`Error`]
//! wraps them for APIs that can fail for more than one reason.

use std::path::PathBuf;

/// Convenience result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type
#[derive(Debug)]
pub enum Error {
    /// Wire-level decode failure, tied to one specific message
    Protocol(ProtocolError),
    /// StreamState schema violation
    Validation(ValidationError),
    /// Transport-level failure
    Transport(TransportError),
    /// Media/image source failure (fatal at startup)
    Source(SourceError),
    /// Meta blob could not be serialized as JSON
    Serialization(serde_json::Error),
    /// I/O error (bind, accept, file read)
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Protocol(e) => write!(f, "protocol error: {}", e),
            Error::Validation(e) => write!(f, "validation error: {}", e),
            Error::Transport(e) => write!(f, "transport error: {}", e),
            Error::Source(e) => write!(f, "source error: {}", e),
            Error::Serialization(e) => write!(f, "meta serialization error: {}", e),
            Error::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Protocol(e) => Some(e),
            Error::Validation(e) => Some(e),
            Error::Transport(e) => Some(e),
            Error::Source(e) => Some(e),
            Error::Serialization(e) => Some(e),
            Error::Io(e) => Some(e),
        }
    }
}

impl From<ProtocolError> for Error {
    fn from(e: ProtocolError) -> Self {
        Error::Protocol(e)
    }
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Error::Validation(e)
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Error::Transport(e)
    }
}

impl From<SourceError> for Error {
    fn from(e: SourceError) -> Self {
        Error::Source(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

/// Wire-level decode errors
///
/// Every variant is tied to one specific malformed payload; the caller
/// decides whether to abort the connection or drop the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Payload ended before a declared section was complete
    Truncated {
        /// Bytes needed to finish the current section
        needed: usize,
        /// Bytes actually remaining
        remaining: usize,
    },
    /// Magic value did not match
    BadMagic([u8; 4]),
    /// Version byte did not match exactly (no negotiation)
    UnsupportedVersion(u8),
    /// Payload longer than the sum of its declared sections
    LengthMismatch {
        /// Total length implied by the header and length prefixes
        expected: usize,
        /// Actual payload length
        actual: usize,
    },
    /// Image role byte outside the known enumeration
    UnknownImageRole(u8),
    /// Meta bytes were not a valid UTF-8 JSON object
    MetaParse(String),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProtocolError::Truncated { needed, remaining } => {
                write!(f, "payload truncated: need {} bytes, {} remaining", needed, remaining)
            }
            ProtocolError::BadMagic(magic) => write!(f, "bad magic: {:02x?}", magic),
            ProtocolError::UnsupportedVersion(v) => write!(f, "unsupported version: {}", v),
            ProtocolError::LengthMismatch { expected, actual } => {
                write!(f, "payload length mismatch: expected {}, got {}", expected, actual)
            }
            ProtocolError::UnknownImageRole(b) => write!(f, "unknown image role: {}", b),
            ProtocolError::MetaParse(msg) => write!(f, "meta parse error: {}", msg),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// StreamState schema violations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The state vector was not exactly the required length
    StateLength(usize),
    /// The number of action chunk rows was outside the allowed bounds
    ChunkCount(usize),
    /// An action chunk row had the wrong length
    ChunkRowLength {
        /// Index of the offending row
        index: usize,
        /// Actual row length
        len: usize,
    },
    /// Structural failure: missing field or wrong JSON type
    Schema(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::StateLength(len) => {
                write!(f, "state vector must have length {}, got {}", crate::state::STATE_LEN, len)
            }
            ValidationError::ChunkCount(count) => write!(
                f,
                "remaining_action_chunks must have {}..={} rows, got {}",
                crate::state::MIN_CHUNK_ROWS,
                crate::state::MAX_CHUNK_ROWS,
                count
            ),
            ValidationError::ChunkRowLength { index, len } => write!(
                f,
                "remaining_action_chunks[{}] must have length {}, got {}",
                index,
                crate::state::ACTION_DIM,
                len
            ),
            ValidationError::Schema(msg) => write!(f, "stream state schema error: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Transport-level errors
#[derive(Debug)]
pub enum TransportError {
    /// Connection closed by the peer (expected lifecycle, not a defect)
    Closed,
    /// Bounded-time send attempt expired (backpressure signal, not fatal)
    SendTimeout,
    /// Underlying WebSocket failure
    WebSocket(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Closed => write!(f, "connection closed"),
            TransportError::SendTimeout => write!(f, "send attempt timed out"),
            TransportError::WebSocket(msg) => write!(f, "websocket error: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}

/// Media source errors (fatal at startup, no retry)
#[derive(Debug)]
pub enum SourceError {
    /// Directory or file could not be opened
    Open { path: PathBuf, reason: String },
    /// Not enough images to build a full role set
    TooFewImages { found: usize, need: usize },
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Open { path, reason } => {
                write!(f, "failed to open {}: {}", path.display(), reason)
            }
            SourceError::TooFewImages { found, need } => {
                write!(f, "source must have at least {} images; got {}", need, found)
            }
        }
    }
}

impl std::error::Error for SourceError {}
