// Protocol constants for the AudioMoth USB HID interface

/// Total size of the configuration packet (62 bytes)
pub const CONFIG_PACKET_SIZE: usize = 62;

/// Size of the fixed configuration header, up to and including the LED flag (18 bytes)
pub const CONFIG_HEADER_SIZE: usize = 18;

/// Bytes left for the encoded schedule (count byte plus intervals)
pub const SCHEDULE_CAPACITY: usize = CONFIG_PACKET_SIZE - CONFIG_HEADER_SIZE;

/// Size of one encoded schedule interval: start and end minute, u16 each
pub const SCHEDULE_INTERVAL_SIZE: usize = 4;

/// Largest interval count the one-byte length prefix can carry
pub const MAX_ENCODABLE_INTERVALS: usize = u8::MAX as usize;

/// Largest interval count that fits the configuration packet
pub const MAX_PACKET_INTERVALS: usize = (SCHEDULE_CAPACITY - 1) / SCHEDULE_INTERVAL_SIZE;

/// Size of the status byte that precedes every device response
pub const RESPONSE_STATUS_SIZE: usize = 1;

/// Minimum size of a status packet: status + timestamp + id + battery
pub const STATUS_PACKET_MIN_SIZE: usize = 14;

/// Minutes in a day; the only valid end value that is not a valid start
pub const MINUTES_PER_DAY: u16 = 1440;

/// Default delay between status polls
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Size of an input report read from the device
pub const HID_REPORT_SIZE: usize = 64;

/// Message type requesting the status packet
pub const MSG_GET_APP_PACKET: u8 = 0x05;

/// Message type carrying a configuration packet
pub const MSG_SET_APP_PACKET: u8 = 0x06;
