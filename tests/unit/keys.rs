//! Unit tests for the object key codec through the public API

use cdn_log_downloader::{decode, encode, KeyError, LogType};
use chrono::{Duration, TimeZone, Utc};

#[test]
fn test_encoded_prefixes_sort_like_time_across_boundaries() {
    let cds = LogType::parse("cds").unwrap();
    let instants = [
        Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 9, 23, 59, 59).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap(),
    ];

    let encoded: Vec<String> = instants.iter().map(|t| encode(&cds, *t)).collect();
    let mut sorted = encoded.clone();
    sorted.sort();
    assert_eq!(encoded, sorted);
}

#[test]
fn test_every_second_of_an_hour_round_trips() {
    let cds = LogType::parse("cds").unwrap();
    let start = Utc.with_ymd_and_hms(2024, 6, 30, 23, 0, 0).unwrap();
    let mut previous = String::new();
    for offset in (0..3_600).step_by(7) {
        let at = start + Duration::seconds(offset);
        let key = encode(&cds, at);
        assert!(key > previous);
        assert_eq!(decode(&key).unwrap(), (cds.clone(), at));
        previous = key;
    }
}

#[test]
fn test_decode_listing_key_with_suffix() {
    let (log_type, at) = decode("waf/2024/03/05/waf_20240305-070809-4f2a.log.gz").unwrap();
    assert_eq!(log_type.as_str(), "waf");
    assert_eq!(at, Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap());
}

#[test]
fn test_decode_rejects_foreign_keys() {
    assert!(matches!(decode("readme.txt"), Err(KeyError::InvalidKey(_))));
    assert!(matches!(
        decode("cds/2024/03/05/waf_20240305-070809.log.gz"),
        Err(KeyError::InvalidKey(_))
    ));
}
