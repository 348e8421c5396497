use crate::config::{build_packet, verify_echoed_response};
use crate::constants::{CONFIG_PACKET_SIZE, MAX_PACKET_INTERVALS, SCHEDULE_CAPACITY};
use crate::error::{EncodingError, Rejection};
use crate::error::AMError;
use crate::profile::{
    ClockBand, HARDWARE_PROFILES, index_for_sample_rate, profile_for_index, profile_for_sample_rate,
};
use crate::transport::check_response_type;
use crate::schedule::{self, Schedule, TimeInterval};
use chrono::DateTime;

fn interval(start: u16, end: u16) -> TimeInterval {
    TimeInterval::new(start, end).unwrap()
}

#[test]
fn test_profile_table_order() {
    let rates: Vec<u32> = HARDWARE_PROFILES.iter().map(|p| p.sample_rate_hz).collect();
    assert_eq!(rates, vec![8_000, 16_000, 32_000, 48_000, 96_000, 192_000]);
    assert!(HARDWARE_PROFILES.iter().all(|p| p.clock_band == ClockBand::Low));
    assert!(HARDWARE_PROFILES.iter().all(|p| p.clock_divider == 2));
}

#[test]
fn test_profile_table_values() {
    // (rate, acquisition cycles, oversample rate, current mA)
    let expected: [(u32, u8, u8, f64); 6] = [
        (8_000, 8, 64, 5.6),
        (16_000, 8, 32, 6.1),
        (32_000, 8, 16, 7.1),
        (48_000, 2, 16, 7.6),
        (96_000, 1, 8, 10.4),
        (192_000, 1, 4, 18.1),
    ];
    for (index, (rate, acquisition, oversample, current)) in expected.into_iter().enumerate() {
        let profile = profile_for_index(index).unwrap();
        assert_eq!(profile.sample_rate_hz, rate, "index {index}");
        assert_eq!(profile.clock_band, ClockBand::Low, "index {index}");
        assert_eq!(profile.clock_divider, 2, "index {index}");
        assert_eq!(profile.acquisition_cycles, acquisition, "index {index}");
        assert_eq!(profile.oversample_rate, oversample, "index {index}");
        assert_eq!(profile.estimated_current_ma, current, "index {index}");
    }
}

#[test]
fn test_profile_48k() {
    let profile = profile_for_index(3).unwrap();
    assert_eq!(profile.sample_rate_hz, 48_000);
    assert_eq!(u8::from(profile.clock_band), 4);
    assert_eq!(profile.clock_divider, 2);
    assert_eq!(profile.acquisition_cycles, 2);
    assert_eq!(profile.oversample_rate, 16);
    assert_eq!(profile.estimated_current_ma, 7.6);
}

#[test]
fn test_profile_index_out_of_range() {
    assert_eq!(
        profile_for_index(6),
        Err(EncodingError::OutOfRange { index: 6, len: 6 })
    );
}

#[test]
fn test_index_for_sample_rate() {
    assert_eq!(index_for_sample_rate(8_000), Some(0));
    assert_eq!(index_for_sample_rate(192_000), Some(5));
    assert_eq!(index_for_sample_rate(44_100), None);
}

#[test]
fn test_profile_for_sample_rate() {
    assert_eq!(profile_for_sample_rate(96_000), Some(HARDWARE_PROFILES[4]));
    assert_eq!(profile_for_sample_rate(8_000).map(|p| p.oversample_rate), Some(64));
    assert_eq!(profile_for_sample_rate(44_100), None);
}

#[test]
fn test_response_type_check() {
    assert!(check_response_type(0x05, &[0x05, 0x40, 0x88]).is_ok());
    // configuration echo read back while waiting for status
    assert!(matches!(
        check_response_type(0x05, &[0x06, 0x00]),
        Err(AMError::Transport(_))
    ));
    assert!(matches!(check_response_type(0x06, &[]), Err(AMError::Transport(_))));
}

#[test]
fn test_encode_single_interval() {
    let bytes = schedule::encode(&[interval(480, 1020)]).unwrap();
    assert_eq!(bytes.as_ref(), &[0x01, 0xE0, 0x01, 0xFC, 0x03]);
}

#[test]
fn test_encode_keeps_caller_order() {
    let bytes = schedule::encode(&[interval(600, 700), interval(60, 120)]).unwrap();
    assert_eq!(hex::encode(&bytes), "025802bc023c007800");
}

#[test]
fn test_interval_bounds() {
    assert!(TimeInterval::new(1439, 1440).is_ok());
    assert!(matches!(
        TimeInterval::new(1440, 1440),
        Err(EncodingError::ValueOutOfRange { field: "start minute", .. })
    ));
    assert!(matches!(
        TimeInterval::new(0, 1441),
        Err(EncodingError::ValueOutOfRange { field: "end minute", .. })
    ));
}

#[test]
fn test_packet_overflow_limit() {
    assert_eq!(MAX_PACKET_INTERVALS, 10);
    let profile = profile_for_index(0).unwrap();
    let now = DateTime::from_timestamp(0, 0).unwrap();
    let too_long = vec![0u8; SCHEDULE_CAPACITY + 1];
    assert_eq!(
        build_packet(now, 0, &profile, 0, 0, false, &too_long),
        Err(EncodingError::PacketOverflow {
            needed: SCHEDULE_CAPACITY + 1,
            available: SCHEDULE_CAPACITY,
        })
    );
}

#[test]
fn test_echo_mismatch_reports_first_offset() {
    let profile = profile_for_index(1).unwrap();
    let now = DateTime::from_timestamp(1_600_000_000, 0).unwrap();
    let schedule = Schedule::new(vec![interval(0, 60)]).encode().unwrap();
    let packet = build_packet(now, 1, &profile, 5, 10, true, &schedule).unwrap();

    let mut response = vec![0x06];
    response.extend_from_slice(packet.as_bytes());
    response[5] ^= 0x01; // gain, packet offset 4
    response[10] ^= 0x01; // later difference is not reported

    assert_eq!(
        verify_echoed_response(&packet, Some(response.as_slice())),
        Err(Rejection::Mismatch {
            offset: 4,
            sent: 1,
            received: 0
        })
    );
    assert_eq!(packet.as_bytes().len(), CONFIG_PACKET_SIZE);
}
