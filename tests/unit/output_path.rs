//! Unit tests for mapping download URLs to local paths

use cdn_log_downloader::output::{DestinationPath, OutputError};
use std::path::{Path, PathBuf};
use url::Url;

fn map(dest: &str, url: &str) -> Result<DestinationPath, OutputError> {
    DestinationPath::for_url(Path::new(dest), &Url::parse(url).unwrap())
}

#[test]
fn test_listing_url_maps_to_mirrored_tree() {
    let path = map(
        "logs",
        "https://logs.example.com/f6g4s8v3/cds/2024/01/01/cds_20240101-000000-abc.log.gz",
    )
    .unwrap();

    assert_eq!(path.dir(), Path::new("logs/f6g4s8v3/cds/2024/01/01"));
    assert_eq!(path.file_name(), "cds_20240101-000000-abc.log.gz");
    assert_eq!(
        path.file_path(),
        PathBuf::from("logs/f6g4s8v3/cds/2024/01/01/cds_20240101-000000-abc.log.gz")
    );
}

#[test]
fn test_base_path_prefix_is_kept() {
    let path = map("out", "http://127.0.0.1:9000/v1/h1/a.log.gz").unwrap();
    assert_eq!(path.file_path(), PathBuf::from("out/v1/h1/a.log.gz"));
}

#[test]
fn test_encoded_separator_stays_in_file_name() {
    let path = map("out", "https://s/h1/a%2Fb.log.gz").unwrap();
    assert_eq!(path.dir(), Path::new("out/h1"));
    assert_eq!(path.file_name(), "a%2Fb.log.gz");
}

#[test]
fn test_trailing_slash_has_no_file_name() {
    assert!(matches!(
        map("out", "https://s/h1/cds/"),
        Err(OutputError::InvalidPath(_))
    ));
}
