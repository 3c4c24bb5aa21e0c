//! Integration tests for time-range listing against a mock storage service

use cdn_log_downloader::fetcher::{ListingError, TRUNCATION_CEILING};
use cdn_log_downloader::{LogCredential, LogLister, LogType, StorageConfig, StorageHttpClient};
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use wiremock::{
    matchers::{header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

const TOKEN: &str = "secret-token";

fn lister(server: &MockServer, token: Option<&str>) -> LogLister<Arc<StorageHttpClient>> {
    let config = StorageConfig::new(&server.uri()).unwrap();
    let client = StorageHttpClient::from_config(&config, token.map(LogCredential::new)).unwrap();
    LogLister::new(Arc::new(client))
}

fn cds() -> LogType {
    LogType::parse("cds").unwrap()
}

fn utc(day: u32, hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, hour, min, sec).unwrap()
}

fn keys(count: usize, tag: &str) -> String {
    (0..count)
        .map(|i| format!("cds/2024/01/01/cds_20240101-000000-{tag}{i}.log.gz"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[tokio::test]
async fn test_single_request_sends_encoded_markers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/h1"))
        .and(query_param("marker", "cds/2024/01/01/cds_20240101-000000"))
        .and(query_param("end_marker", "cds/2024/01/01/cds_20240101-000030"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "cds/2024/01/01/cds_20240101-000000-a.log.gz\ncds/2024/01/01/cds_20240101-000010-b.log.gz\n",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let urls = lister(&server, Some(TOKEN))
        .list("h1", &cds(), utc(1, 0, 0, 0), utc(1, 0, 0, 30))
        .await
        .unwrap();

    assert_eq!(
        urls,
        vec![
            "h1/cds/2024/01/01/cds_20240101-000000-a.log.gz",
            "h1/cds/2024/01/01/cds_20240101-000010-b.log.gz",
        ]
    );
}

#[tokio::test]
async fn test_truncated_response_is_bisected() {
    let server = MockServer::start().await;

    // Whole range hits the ceiling
    Mock::given(method("GET"))
        .and(path("/h1"))
        .and(query_param("marker", "cds/2024/01/01/cds_20240101-000000"))
        .and(query_param("end_marker", "cds/2024/01/03/cds_20240103-000000"))
        .respond_with(ResponseTemplate::new(200).set_body_string(keys(TRUNCATION_CEILING, "w")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/h1"))
        .and(query_param("marker", "cds/2024/01/01/cds_20240101-000000"))
        .and(query_param("end_marker", "cds/2024/01/02/cds_20240102-000000"))
        .respond_with(ResponseTemplate::new(200).set_body_string(keys(4_000, "l")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/h1"))
        .and(query_param("marker", "cds/2024/01/02/cds_20240102-000000"))
        .and(query_param("end_marker", "cds/2024/01/03/cds_20240103-000000"))
        .respond_with(ResponseTemplate::new(200).set_body_string(keys(4_000, "r")))
        .expect(1)
        .mount(&server)
        .await;

    let urls = lister(&server, Some(TOKEN))
        .list("h1", &cds(), utc(1, 0, 0, 0), utc(3, 0, 0, 0))
        .await
        .unwrap();

    assert_eq!(urls.len(), 8_000);
    assert!(urls[..4_000].iter().all(|u| u.contains("-l")));
    assert!(urls[4_000..].iter().all(|u| u.contains("-r")));
}

#[tokio::test]
async fn test_just_below_ceiling_is_not_bisected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/h1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(keys(TRUNCATION_CEILING - 1, "k")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let urls = lister(&server, Some(TOKEN))
        .list("h1", &cds(), utc(1, 0, 0, 0), utc(2, 0, 0, 0))
        .await
        .unwrap();
    assert_eq!(urls.len(), TRUNCATION_CEILING - 1);
}

#[tokio::test]
async fn test_reversed_bounds_are_swapped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/h1"))
        .and(query_param("marker", "cds/2024/01/01/cds_20240101-000000"))
        .and(query_param("end_marker", "cds/2024/01/01/cds_20240101-010000"))
        .respond_with(ResponseTemplate::new(200).set_body_string(keys(3, "s")))
        .expect(1)
        .mount(&server)
        .await;

    let urls = lister(&server, Some(TOKEN))
        .list("h1", &cds(), utc(1, 1, 0, 0), utc(1, 0, 0, 0))
        .await
        .unwrap();
    assert_eq!(urls.len(), 3);
}

#[tokio::test]
async fn test_failed_sub_range_fails_whole_listing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/h1"))
        .and(query_param("end_marker", "cds/2024/01/03/cds_20240103-000000"))
        .and(query_param("marker", "cds/2024/01/01/cds_20240101-000000"))
        .respond_with(ResponseTemplate::new(200).set_body_string(keys(TRUNCATION_CEILING, "w")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/h1"))
        .and(query_param("end_marker", "cds/2024/01/02/cds_20240102-000000"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    // Second half is never requested once the first half fails
    Mock::given(method("GET"))
        .and(path("/h1"))
        .and(query_param("marker", "cds/2024/01/02/cds_20240102-000000"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = lister(&server, Some(TOKEN))
        .list("h1", &cds(), utc(1, 0, 0, 0), utc(3, 0, 0, 0))
        .await;

    match result {
        Err(ListingError::Request { range, source }) => {
            assert_eq!(range.start, utc(1, 0, 0, 0));
            assert_eq!(range.end, utc(2, 0, 0, 0));
            assert!(source.to_string().contains("500"));
        }
        other => panic!("expected a sub-range request error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_credential_fails_before_any_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = lister(&server, None)
        .list("h1", &cds(), utc(1, 0, 0, 0), utc(1, 1, 0, 0))
        .await;
    assert!(matches!(result, Err(ListingError::Unauthorized)));
}
