use crate::constants::STATUS_PACKET_MIN_SIZE;
use crate::error::AMError;
use chrono::{DateTime, Utc};
use num_enum::{FromPrimitive, IntoPrimitive};
use serde::{Serialize, Serializer};
use std::fmt;
use strum_macros::Display;
use zerocopy::byteorder::little_endian::{U32, U64};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

const _: () = assert!(size_of::<StatusPacketRaw>() == STATUS_PACKET_MIN_SIZE);

/// Status packet as returned by the device (first 14 bytes; the rest is ignored).
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct StatusPacketRaw {
    pub status: u8,     // Echo of the request message type
    pub time: U32,      // Unix time, seconds
    pub device_id: U64, // Unique id, stored least significant byte first
    pub battery: u8,    // Battery band code
}

/// Battery voltage band reported by the device. The raw code is kept
/// untouched; mapping it to a display is up to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, FromPrimitive, IntoPrimitive, Serialize)]
#[repr(u8)]
pub enum BatteryState {
    #[strum(to_string = "< 3.6 V")]
    Low = 0,
    #[strum(to_string = "3.6 V")]
    V3_6 = 1,
    #[strum(to_string = "3.7 V")]
    V3_7 = 2,
    #[strum(to_string = "3.8 V")]
    V3_8 = 3,
    #[strum(to_string = "3.9 V")]
    V3_9 = 4,
    #[strum(to_string = "4.0 V")]
    V4_0 = 5,
    #[strum(to_string = "4.1 V")]
    V4_1 = 6,
    #[strum(to_string = "4.2 V")]
    V4_2 = 7,
    #[strum(to_string = "4.3 V")]
    V4_3 = 8,
    #[strum(to_string = "4.4 V")]
    V4_4 = 9,
    #[strum(to_string = "4.5 V")]
    V4_5 = 10,
    #[strum(to_string = "4.6 V")]
    V4_6 = 11,
    #[strum(to_string = "4.7 V")]
    V4_7 = 12,
    #[strum(to_string = "4.8 V")]
    V4_8 = 13,
    #[strum(to_string = "4.9 V")]
    V4_9 = 14,
    #[strum(to_string = "> 4.9 V")]
    Full = 15,

    #[num_enum(catch_all)]
    #[strum(to_string = "unknown")]
    Unknown(u8),
}

/// Device serial, rendered as 16 upper-case hex digits, most significant byte first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(pub u64);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016X}", self.0)
    }
}

impl Serialize for DeviceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Decoded status poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusPacket {
    pub device_time: DateTime<Utc>,
    pub device_id: DeviceId,
    pub battery: BatteryState,
}

impl TryFrom<&[u8]> for StatusPacket {
    type Error = AMError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let (raw, _) = StatusPacketRaw::ref_from_prefix(bytes).map_err(|_| {
            AMError::Malformed(format!(
                "expected at least {} bytes, got {}",
                STATUS_PACKET_MIN_SIZE,
                bytes.len()
            ))
        })?;
        StatusPacket::try_from(*raw)
    }
}

impl TryFrom<StatusPacketRaw> for StatusPacket {
    type Error = AMError;

    fn try_from(raw: StatusPacketRaw) -> Result<Self, Self::Error> {
        let seconds = raw.time.get();
        let device_time = DateTime::from_timestamp(seconds.into(), 0)
            .ok_or_else(|| AMError::Malformed(format!("timestamp {seconds} out of range")))?;

        Ok(StatusPacket {
            device_time,
            device_id: DeviceId(raw.device_id.get()),
            battery: BatteryState::from_primitive(raw.battery),
        })
    }
}

impl fmt::Display for StatusPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Time: {}, ID: {}, Battery: {}",
            self.device_time.format("%Y-%m-%d %H:%M:%S UTC"),
            self.device_id,
            self.battery
        )
    }
}

/// Decode a status packet handed over by the transport. `None` means the
/// transport had no packet to give (usually because the device is unplugged).
pub fn decode(packet: Option<&[u8]>) -> Result<StatusPacket, AMError> {
    let packet = packet.ok_or_else(|| AMError::Malformed("no packet".to_string()))?;
    StatusPacket::try_from(packet)
}
