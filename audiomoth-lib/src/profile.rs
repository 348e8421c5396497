use crate::error::EncodingError;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::Display;

/// Clock source selected for a sample rate. The discriminant is the byte
/// written to the configuration packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize)]
#[repr(u8)]
pub enum ClockBand {
    #[strum(to_string = "HFRCO 21 MHz")]
    Low = 4,
    #[strum(to_string = "HFRCO 28 MHz")]
    Mid = 5,
    #[strum(to_string = "HFXO")]
    High = 6,
}

/// Clock and oversampling parameters for one supported sample rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HardwareProfile {
    pub sample_rate_hz: u32,
    pub clock_band: ClockBand,
    pub clock_divider: u8,
    pub acquisition_cycles: u8,
    pub oversample_rate: u8,
    /// Current draw while recording, in milliamps
    pub estimated_current_ma: f64,
}

impl HardwareProfile {
    const fn new(
        sample_rate_hz: u32,
        clock_divider: u8,
        acquisition_cycles: u8,
        oversample_rate: u8,
        estimated_current_ma: f64,
    ) -> Self {
        Self {
            sample_rate_hz,
            clock_band: ClockBand::Low,
            clock_divider,
            acquisition_cycles,
            oversample_rate,
            estimated_current_ma,
        }
    }
}

impl fmt::Display for HardwareProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} kHz ({}, div {}, acq {}, oversample {}, ~{:.1} mA)",
            self.sample_rate_hz / 1000,
            self.clock_band,
            self.clock_divider,
            self.acquisition_cycles,
            self.oversample_rate,
            self.estimated_current_ma
        )
    }
}

/// Supported sample rates. The position in this table is the index the
/// firmware expects, so entries must never be reordered.
pub const HARDWARE_PROFILES: [HardwareProfile; 6] = [
    HardwareProfile::new(8_000, 2, 8, 64, 5.6),
    HardwareProfile::new(16_000, 2, 8, 32, 6.1),
    HardwareProfile::new(32_000, 2, 8, 16, 7.1),
    HardwareProfile::new(48_000, 2, 2, 16, 7.6),
    HardwareProfile::new(96_000, 2, 1, 8, 10.4),
    HardwareProfile::new(192_000, 2, 1, 4, 18.1),
];

/// Look up the hardware profile stored at `index` in the fixed table.
pub fn profile_for_index(index: usize) -> Result<HardwareProfile, EncodingError> {
    HARDWARE_PROFILES
        .get(index)
        .copied()
        .ok_or(EncodingError::OutOfRange {
            index,
            len: HARDWARE_PROFILES.len(),
        })
}

/// Find the table index of a sample rate given in Hz.
pub fn index_for_sample_rate(sample_rate_hz: u32) -> Option<usize> {
    HARDWARE_PROFILES
        .iter()
        .position(|p| p.sample_rate_hz == sample_rate_hz)
}

/// Look up the hardware profile for a sample rate given in Hz.
pub fn profile_for_sample_rate(sample_rate_hz: u32) -> Option<HardwareProfile> {
    HARDWARE_PROFILES
        .iter()
        .find(|p| p.sample_rate_hz == sample_rate_hz)
        .copied()
}
