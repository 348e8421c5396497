//! Daily storage and energy estimate for a configuration.

use crate::config::ConfigurationRequest;
use crate::error::EncodingError;
use serde::Serialize;
use std::fmt;

/// Size of the WAV header written at the start of every file
pub const WAV_HEADER_SIZE: u64 = 488;

/// Bytes per sample (16-bit mono)
pub const BYTES_PER_SAMPLE: u64 = 2;

/// Current drawn between recordings, in milliamps
pub const SLEEP_CURRENT_MA: f64 = 0.1;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LifeEstimate {
    pub recording_seconds_per_day: u64,
    pub files_per_day: u64,
    pub bytes_per_day: u64,
    pub largest_file_bytes: u64,
    pub energy_mah_per_day: f64,
}

impl LifeEstimate {
    /// Within each active interval the device records for the recording duration,
    /// sleeps for the sleep duration, and repeats; the last recording is cut
    /// short at the end of the interval.
    pub fn for_request(request: &ConfigurationRequest) -> Result<Self, EncodingError> {
        let profile = request.profile()?;
        let record = u64::from(request.recording_duration_s);
        let sleep = u64::from(request.sleep_duration_s);
        let cycle = record + sleep;

        let mut recording_seconds = 0;
        let mut files = 0;
        let mut longest = 0;

        if record > 0 {
            for interval in request.schedule.intervals() {
                let length = u64::from(interval.duration_minutes()) * 60;
                let full_cycles = length / cycle;
                let remainder = (length % cycle).min(record);

                recording_seconds += full_cycles * record + remainder;
                files += full_cycles + u64::from(remainder > 0);
                if full_cycles > 0 {
                    longest = record;
                } else {
                    longest = longest.max(remainder);
                }
            }
        }

        let bytes_per_second = u64::from(profile.sample_rate_hz) * BYTES_PER_SAMPLE;
        let sleeping_seconds = SECONDS_PER_DAY.saturating_sub(recording_seconds);
        let energy_mah_per_day = (recording_seconds as f64 * profile.estimated_current_ma
            + sleeping_seconds as f64 * SLEEP_CURRENT_MA)
            / 3600.0;

        Ok(LifeEstimate {
            recording_seconds_per_day: recording_seconds,
            files_per_day: files,
            bytes_per_day: recording_seconds * bytes_per_second + files * WAV_HEADER_SIZE,
            largest_file_bytes: if files > 0 {
                longest * bytes_per_second + WAV_HEADER_SIZE
            } else {
                0
            },
            energy_mah_per_day,
        })
    }

    /// Days a battery of `capacity_mah` would last at this consumption.
    pub fn days_on_battery(&self, capacity_mah: f64) -> f64 {
        capacity_mah / self.energy_mah_per_day
    }
}

impl fmt::Display for LifeEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} files per day, {:.1} MB total (largest {:.1} MB), ~{:.0} mAh per day",
            self.files_per_day,
            self.bytes_per_day as f64 / 1_000_000.0,
            self.largest_file_bytes as f64 / 1_000_000.0,
            self.energy_mah_per_day
        )
    }
}
