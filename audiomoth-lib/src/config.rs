//! Configuration packet assembly and echo verification.

use crate::constants::{
    CONFIG_HEADER_SIZE, CONFIG_PACKET_SIZE, RESPONSE_STATUS_SIZE, SCHEDULE_CAPACITY, SCHEDULE_INTERVAL_SIZE,
};
use crate::error::{EncodingError, Rejection};
use crate::profile::{HardwareProfile, profile_for_index};
use crate::schedule::Schedule;
use chrono::{DateTime, Utc};
use std::fmt;
use tracing::{debug, warn};
use zerocopy::byteorder::little_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

const _: () = assert!(size_of::<ConfigHeaderRaw>() == CONFIG_HEADER_SIZE);
const _: () = assert!(size_of::<ConfigurationPacket>() == CONFIG_PACKET_SIZE);

/// Fixed part of the configuration packet as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct ConfigHeaderRaw {
    pub time: U32, // Unix time, seconds
    pub gain: u8,
    pub clock_band: u8,
    pub clock_divider: u8,
    pub acquisition_cycles: u8,
    pub oversample_rate: u8,
    pub sample_rate: U32,        // Hz
    pub sleep_duration: U16,     // seconds
    pub recording_duration: U16, // seconds
    pub led_enabled: u8,         // 0x01 or 0x00
}

/// Everything the device needs to know, gathered once by the front end.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationRequest {
    pub time: DateTime<Utc>,
    /// Gain level, 0-4
    pub gain: u32,
    /// Index into [`crate::profile::HARDWARE_PROFILES`]
    pub sample_rate_index: usize,
    pub sleep_duration_s: u32,
    pub recording_duration_s: u32,
    pub led_enabled: bool,
    pub schedule: Schedule,
}

impl ConfigurationRequest {
    pub fn profile(&self) -> Result<HardwareProfile, EncodingError> {
        profile_for_index(self.sample_rate_index)
    }

    /// Encode the request into the 62-byte packet sent to the device.
    pub fn to_packet(&self) -> Result<ConfigurationPacket, EncodingError> {
        let profile = self.profile()?;
        let schedule = self.schedule.encode()?;
        build_packet(
            self.time,
            self.gain,
            &profile,
            self.sleep_duration_s,
            self.recording_duration_s,
            self.led_enabled,
            &schedule,
        )
    }
}

/// A fully encoded configuration packet: the fixed header followed by the
/// schedule area (count byte, intervals, zero padding).
#[derive(Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct ConfigurationPacket {
    header: ConfigHeaderRaw,
    schedule: [u8; SCHEDULE_CAPACITY],
}

impl ConfigurationPacket {
    pub fn as_bytes(&self) -> &[u8] {
        IntoBytes::as_bytes(self)
    }

    /// The fixed fields in front of the schedule.
    pub fn header(&self) -> &ConfigHeaderRaw {
        &self.header
    }

    pub fn interval_count(&self) -> usize {
        self.schedule[0] as usize
    }

    /// `(start, end)` minute pairs as stored in the packet.
    pub fn intervals(&self) -> Vec<(u16, u16)> {
        self.schedule[1..]
            .chunks_exact(SCHEDULE_INTERVAL_SIZE)
            .take(self.interval_count())
            .map(|c| (u16::from_le_bytes([c[0], c[1]]), u16::from_le_bytes([c[2], c[3]])))
            .collect()
    }

    /// Number of meaningful bytes; the rest of the packet is zero padding.
    pub fn used_len(&self) -> usize {
        (CONFIG_HEADER_SIZE + 1 + self.interval_count() * SCHEDULE_INTERVAL_SIZE).min(CONFIG_PACKET_SIZE)
    }
}

impl AsRef<[u8]> for ConfigurationPacket {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Debug for ConfigurationPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConfigurationPacket")
            .field(&hex::encode(self.as_bytes()))
            .finish()
    }
}

fn narrow<T: TryFrom<i64>>(field: &'static str, value: i64, max: i64) -> Result<T, EncodingError> {
    T::try_from(value).map_err(|_| EncodingError::ValueOutOfRange { field, value, max })
}

/// Assemble a configuration packet.
///
/// `schedule` is the output of [`crate::schedule::encode`]. Values that do not fit
/// their wire field are reported instead of truncated.
pub fn build_packet(
    now: DateTime<Utc>,
    gain: u32,
    profile: &HardwareProfile,
    sleep_duration_s: u32,
    recording_duration_s: u32,
    led_enabled: bool,
    schedule: &[u8],
) -> Result<ConfigurationPacket, EncodingError> {
    let time: u32 = narrow("time", now.timestamp(), u32::MAX.into())?;
    let gain: u8 = narrow("gain", gain.into(), u8::MAX.into())?;
    let sleep: u16 = narrow("sleep duration", sleep_duration_s.into(), u16::MAX.into())?;
    let recording: u16 = narrow("recording duration", recording_duration_s.into(), u16::MAX.into())?;

    if schedule.len() > SCHEDULE_CAPACITY {
        return Err(EncodingError::PacketOverflow {
            needed: schedule.len(),
            available: SCHEDULE_CAPACITY,
        });
    }

    let header = ConfigHeaderRaw {
        time: U32::new(time),
        gain,
        clock_band: profile.clock_band.into(),
        clock_divider: profile.clock_divider,
        acquisition_cycles: profile.acquisition_cycles,
        oversample_rate: profile.oversample_rate,
        sample_rate: U32::new(profile.sample_rate_hz),
        sleep_duration: U16::new(sleep),
        recording_duration: U16::new(recording),
        led_enabled: u8::from(led_enabled),
    };

    let mut schedule_area = [0u8; SCHEDULE_CAPACITY];
    schedule_area[..schedule.len()].copy_from_slice(schedule);

    let packet = ConfigurationPacket {
        header,
        schedule: schedule_area,
    };
    debug!(bytes = hex::encode(packet.as_bytes()), "Built configuration packet");
    Ok(packet)
}

/// The device confirmed every byte of the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accepted;

/// Check the device's echo of a configuration packet.
///
/// The response starts with a status byte; `received[i + 1]` must equal `sent[i]`
/// for every index both buffers cover.
pub fn verify_echoed_response(sent: &ConfigurationPacket, received: Option<&[u8]>) -> Result<Accepted, Rejection> {
    let received = match received {
        Some(r) if !r.is_empty() => r,
        _ => return Err(Rejection::Empty),
    };
    if received.len() < RESPONSE_STATUS_SIZE + 1 {
        return Err(Rejection::TooShort { len: received.len() });
    }

    let echo = &received[RESPONSE_STATUS_SIZE..];
    if let Some((offset, (&expected, &actual))) = sent
        .as_bytes()
        .iter()
        .zip(echo)
        .enumerate()
        .find(|(_, (s, r))| s != r)
    {
        warn!(offset, expected, actual, "Configuration echo mismatch");
        return Err(Rejection::Mismatch {
            offset,
            sent: expected,
            received: actual,
        });
    }

    Ok(Accepted)
}
