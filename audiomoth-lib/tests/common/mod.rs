//! Common test utilities and shared imports

// Allow unused imports and dead code since this is a shared module
// used across multiple test files - not all items are used in every test file
#[allow(unused_imports)]
pub use audiomoth_lib::config::{
    Accepted, ConfigurationPacket, ConfigurationRequest, build_packet, verify_echoed_response,
};
#[allow(unused_imports)]
pub use audiomoth_lib::error::{AMError, EncodingError, Rejection};
#[allow(unused_imports)]
pub use audiomoth_lib::profile::{HARDWARE_PROFILES, profile_for_index};
#[allow(unused_imports)]
pub use audiomoth_lib::schedule::{Schedule, TimeInterval};
#[allow(unused_imports)]
pub use audiomoth_lib::status::{BatteryState, DeviceId, StatusPacket};
#[allow(unused_imports)]
pub use bytes::Bytes;
#[allow(unused_imports)]
pub use chrono::{DateTime, Utc};

/// Unix time used by the 48 kHz reference scenario
#[allow(dead_code)]
pub const SCENARIO_TIME: i64 = 1_000_000_000;

/// Real status response: type 0x05, 2023-06-01 12:00:00 UTC, id 24F319055FDF2F5B, battery 4.2 V
#[allow(dead_code)]
pub const REAL_STATUS_RESPONSE: &str = "05408878645b2fdf5f0519f32407";

/// Decode hex string to bytes for testing
#[allow(dead_code)]
pub fn hex_to_bytes(hex_data: &str) -> Bytes {
    Bytes::from(hex::decode(hex_data).expect("Failed to decode hex"))
}

#[allow(dead_code)]
pub fn interval(start: u16, end: u16) -> TimeInterval {
    TimeInterval::new(start, end).expect("valid interval")
}

/// 48 kHz, gain 2, record 60 s without sleeping, LED on, 08:00-17:00
#[allow(dead_code)]
pub fn scenario_request() -> ConfigurationRequest {
    ConfigurationRequest {
        time: DateTime::from_timestamp(SCENARIO_TIME, 0).unwrap(),
        gain: 2,
        sample_rate_index: 3,
        sleep_duration_s: 0,
        recording_duration_s: 60,
        led_enabled: true,
        schedule: Schedule::new(vec![interval(480, 1020)]),
    }
}

/// Prefix a packet with a status byte, the way the device echoes it.
#[allow(dead_code)]
pub fn echo_of(packet: &ConfigurationPacket, status: u8) -> Vec<u8> {
    let mut response = vec![status];
    response.extend_from_slice(packet.as_bytes());
    response
}
