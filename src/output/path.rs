//! Destination paths mirroring the URL layout
//!
//! A URL whose path is `/<host>/<type>/YYYY/MM/DD/<file>` lands at
//! `<dest_dir>/<host>/<type>/YYYY/MM/DD/<file>`.
//!
//! # Usage Example
//!
//! ```rust
//! use cdn_log_downloader::output::DestinationPath;
//! use std::path::Path;
//! use url::Url;
//!
//! let url = Url::parse("https://logs.example.com/h1/cds/2024/01/01/cds_20240101-000000-abc.log.gz").unwrap();
//! let dest = DestinationPath::for_url(Path::new("out"), &url).unwrap();
//! assert_eq!(dest.dir(), Path::new("out/h1/cds/2024/01/01"));
//! assert_eq!(dest.file_name(), "cds_20240101-000000-abc.log.gz");
//! ```

use super::{OutputError, OutputResult};
use std::path::{Path, PathBuf};
use url::Url;

/// Directory and file a downloaded object is written to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationPath {
    dir: PathBuf,
    file_name: String,
}

impl DestinationPath {
    /// Map `url`'s path beneath `dest_dir`
    ///
    /// Segments stay percent-encoded, so an encoded `/` can never introduce an
    /// extra directory level. Empty, `.` and `..` segments are rejected.
    pub fn for_url(dest_dir: &Path, url: &Url) -> OutputResult<Self> {
        let segments: Vec<&str> = url
            .path_segments()
            .ok_or_else(|| OutputError::InvalidPath(format!("URL has no path: {url}")))?
            .collect();

        let Some((file_name, parents)) = segments.split_last() else {
            return Err(OutputError::InvalidPath(format!("URL has no path: {url}")));
        };
        if file_name.is_empty() {
            return Err(OutputError::InvalidPath(format!(
                "URL path does not name a file: {url}"
            )));
        }

        let mut dir = dest_dir.to_path_buf();
        for segment in parents.iter().chain(std::iter::once(file_name)) {
            if segment.is_empty() || *segment == "." || *segment == ".." {
                return Err(OutputError::InvalidPath(format!(
                    "unsafe path segment '{segment}' in {url}"
                )));
            }
        }
        for segment in parents {
            dir.push(segment);
        }

        Ok(Self {
            dir,
            file_name: (*file_name).to_string(),
        })
    }

    /// Directory to create
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name within [`DestinationPath::dir`]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Full file path
    pub fn file_path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}
