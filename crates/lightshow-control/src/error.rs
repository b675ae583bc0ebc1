//! Error types for the control system
use thiserror::Error;

/// Control system errors
#[derive(Error, Debug)]
pub enum ControlError {
    /// Redirector failed to start
    #[error("Start error: {0}")]
    Start(#[from] StartError),

    /// Redirector failed to stop
    #[error("Stop error: {0}")]
    Stop(#[from] StopError),

    /// Show configuration rejected by the core
    #[error("Core error: {0}")]
    Core(#[from] lightshow_core::CoreError),
}

/// Why a redirector session did not start.
///
/// On any of these the session stays `Stopped`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StartError {
    /// A session is already `Starting` or `Running` on this handle
    #[error("Redirector already started")]
    AlreadyStarted,

    /// The listen or forward endpoint could not be resolved or bound
    #[error("Invalid address {endpoint}: {reason}")]
    InvalidAddress {
        /// Endpoint as configured
        endpoint: String,
        /// What went wrong
        reason: String,
    },

    /// Resolving and binding took longer than the startup timeout
    #[error("Redirector did not start within {0:?}")]
    Timeout(std::time::Duration),
}

/// Why a redirector session did not stop
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StopError {
    /// The session is not running
    #[error("Redirector is not running")]
    NotRunning,
}

/// Why an inbound datagram was dropped.
///
/// Never leaves the listener task.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Shorter than the fixed 18-byte header
    #[error("Datagram too short: {0} bytes")]
    TooShort(usize),

    /// Does not start with `Art-Net\0`
    #[error("Bad protocol identifier")]
    BadIdentifier,

    /// Not an OpDmx frame
    #[error("Unsupported opcode 0x{0:04x}")]
    UnsupportedOpcode(u16),

    /// Universe address above 32767
    #[error("Universe {0} out of range")]
    UniverseOutOfRange(u16),

    /// Declared length above 512
    #[error("Data length {0} exceeds 512")]
    LengthTooLarge(usize),

    /// Declared length does not match the bytes received
    #[error("Data length {declared} does not match payload of {actual} bytes")]
    LengthMismatch {
        /// Length field
        declared: usize,
        /// Bytes after the header
        actual: usize,
    },
}

/// Result type for control operations
pub type Result<T> = std::result::Result<T, ControlError>;
