//! Unit tests for the authenticated storage client

use cdn_log_downloader::fetcher::ListingSource;
use cdn_log_downloader::{FetcherError, LogCredential, StorageConfig, StorageHttpClient};
use wiremock::{
    matchers::{header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn client(server: &MockServer, token: Option<&str>) -> StorageHttpClient {
    let config = StorageConfig::new(&server.uri()).unwrap();
    StorageHttpClient::from_config(&config, token.map(LogCredential::new)).unwrap()
}

#[tokio::test]
async fn test_list_keys_sends_bearer_and_markers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/h1"))
        .and(header("authorization", "Bearer abc"))
        .and(query_param("marker", "cds/2024/01/01/cds_20240101-000000"))
        .and(query_param("end_marker", "cds/2024/01/01/cds_20240101-000100"))
        .respond_with(ResponseTemplate::new(200).set_body_string("k1\nk2\n"))
        .expect(1)
        .mount(&server)
        .await;

    let body = client(&server, Some("abc"))
        .list_keys(
            "h1",
            "cds/2024/01/01/cds_20240101-000000",
            "cds/2024/01/01/cds_20240101-000100",
        )
        .await
        .unwrap();
    assert_eq!(body, "k1\nk2\n");
}

#[tokio::test]
async fn test_non_success_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let url = format!("{}/h1/a.log.gz", server.uri());
    let result = client(&server, Some("abc")).get(&url, &[]).await;
    match result {
        Err(FetcherError::HttpError { status, url: failed }) => {
            assert_eq!(status, 403);
            assert_eq!(failed, url);
        }
        other => panic!("expected HTTP error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_credential_never_reaches_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let http = client(&server, None);
    assert!(matches!(
        http.get_text(&server.uri(), &[]).await,
        Err(FetcherError::Unauthorized)
    ));
    assert!(http.check_authorized().is_err());
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let config = StorageConfig::new("http://127.0.0.1:9").unwrap();
    let http = StorageHttpClient::from_config(&config, Some(LogCredential::new("t"))).unwrap();
    assert!(matches!(
        http.get_text("http://127.0.0.1:9/h1", &[]).await,
        Err(FetcherError::NetworkError(_))
    ));
}
