use crate::schedule::TimeInterval;
use thiserror::Error;

/// The primary error type for the `audiomoth-lib` library.
#[derive(Error, Debug)]
pub enum AMError {
    #[error("AudioMoth not found. Is the device connected and switched to USB/OFF?")]
    DeviceNotFound,

    #[cfg(feature = "hid")]
    #[error("HID error: {0}")]
    Hid(#[from] hidapi::HidError),

    #[error("Timeout during HID operation: {0}")]
    Timeout(#[from] tokio::time::error::Elapsed),

    #[error("Transport task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Transport error: {0}")]
    Transport(String),

    /// The transport will never answer again; polling stops on this one.
    #[error("Transport closed")]
    TransportClosed,

    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),

    #[error("Configuration was not applied: {0}. Please reconnect the device and try again.")]
    ConfigurationRejected(#[from] Rejection),

    #[error("Malformed status packet: {0}")]
    Malformed(String),
}

impl AMError {
    /// Whether the transport behind this error is gone for good.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AMError::TransportClosed)
    }
}

/// Caller-supplied data that does not fit the wire format.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("Hardware profile index {index} out of range (table has {len} entries)")]
    OutOfRange { index: usize, len: usize },

    #[error("Schedule has {count} intervals, at most 255 can be encoded")]
    TooManyIntervals { count: usize },

    #[error("{field} = {value} exceeds the maximum of {max}")]
    ValueOutOfRange { field: &'static str, value: i64, max: i64 },

    #[error("Encoded schedule needs {needed} bytes but only {available} remain in the packet")]
    PacketOverflow { needed: usize, available: usize },

    #[error("Invalid time interval '{0}'")]
    InvalidInterval(String),

    #[error("Interval {0} ends before it starts")]
    EmptyInterval(TimeInterval),

    #[error("Interval {next} starts before {previous} ends")]
    Overlap { previous: TimeInterval, next: TimeInterval },
}

/// Why an echoed configuration did not confirm the packet we sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("no response from device")]
    Empty,

    #[error("response too short ({len} bytes)")]
    TooShort { len: usize },

    #[error("byte {offset} echoed as {received:#04x}, sent {sent:#04x}")]
    Mismatch { offset: usize, sent: u8, received: u8 },
}
