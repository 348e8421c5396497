//! Tests for the schedule encoder and schedule helpers

mod common;

use audiomoth_lib::schedule::encode;
use common::*;

#[test]
fn test_empty_schedule_is_single_zero_byte() {
    let bytes = encode(&[]).unwrap();
    assert_eq!(bytes.as_ref(), &[0x00]);
}

#[test]
fn test_255_intervals_encodable() {
    let intervals = vec![interval(0, 1); 255];
    let bytes = encode(&intervals).unwrap();
    assert_eq!(bytes.len(), 1 + 255 * 4);
    assert_eq!(bytes[0], 255);
}

#[test]
fn test_256_intervals_rejected() {
    let intervals = vec![interval(0, 1); 256];
    assert_eq!(encode(&intervals), Err(EncodingError::TooManyIntervals { count: 256 }));
}

#[test]
fn test_midnight_end() {
    let bytes = encode(&[interval(1380, 1440)]).unwrap();
    assert_eq!(hex::encode(&bytes), "016405a005");
}

#[test]
fn test_parse_interval() {
    let parsed: TimeInterval = "08:00-17:00".parse().unwrap();
    assert_eq!(parsed, interval(480, 1020));
    assert_eq!(parsed.to_string(), "08:00-17:00");
    assert_eq!(parsed.duration_minutes(), 540);

    let late: TimeInterval = "22:30-24:00".parse().unwrap();
    assert_eq!((late.start_minute(), late.end_minute()), (1350, 1440));
}

#[test]
fn test_parse_interval_errors() {
    for text in ["", "08:00", "8-17", "08:60-09:00", "25:00-26:00", "aa:bb-cc:dd"] {
        assert!(
            matches!(text.parse::<TimeInterval>(), Err(EncodingError::InvalidInterval(_))),
            "'{text}' should not parse"
        );
    }
    assert!(matches!(
        "24:00-24:00".parse::<TimeInterval>(),
        Err(EncodingError::ValueOutOfRange { .. })
    ));
}

#[test]
fn test_parse_interval_requires_plain_digits() {
    for text in ["+8:05-09:00", "08:5-09:00", "8:005-09:00", "08:00-+9:00", "008:00-09:00", " 8:-9:00"] {
        assert!(
            matches!(text.parse::<TimeInterval>(), Err(EncodingError::InvalidInterval(_))),
            "'{text}' should not parse"
        );
    }
    let short_hour: TimeInterval = "8:05-9:00".parse().unwrap();
    assert_eq!(short_hour, interval(485, 540));
}

#[test]
fn test_validate_sorted_schedule() {
    let schedule = Schedule::new(vec![interval(0, 60), interval(60, 120), interval(600, 1440)]);
    assert_eq!(schedule.validate(), Ok(()));
    assert_eq!(schedule.active_minutes(), 60 + 60 + 840);
}

#[test]
fn test_validate_rejects_overlap() {
    let schedule = Schedule::new(vec![interval(0, 90), interval(60, 120)]);
    assert_eq!(
        schedule.validate(),
        Err(EncodingError::Overlap {
            previous: interval(0, 90),
            next: interval(60, 120)
        })
    );
}

#[test]
fn test_validate_rejects_unsorted_and_empty() {
    let unsorted = Schedule::new(vec![interval(600, 700), interval(0, 60)]);
    assert!(matches!(unsorted.validate(), Err(EncodingError::Overlap { .. })));

    let empty = Schedule::new(vec![interval(300, 300)]);
    assert_eq!(empty.validate(), Err(EncodingError::EmptyInterval(interval(300, 300))));
}

#[test]
fn test_encoder_does_not_reorder_invalid_schedule() {
    let unsorted = Schedule::new(vec![interval(600, 700), interval(0, 60)]);
    let bytes = unsorted.encode().unwrap();
    assert_eq!(u16::from_le_bytes([bytes[1], bytes[2]]), 600);
    assert_eq!(u16::from_le_bytes([bytes[5], bytes[6]]), 0);
}
