//! Response header derivation module
//!
//! Composes content-type and cache-validation headers from a file
//! extension (or a logical kind such as `json` / `html`) and optional
//! file stats. Headers are built fresh per response.

use std::fs::Metadata;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use hyper::http::response::Builder;

use super::mime;

/// Format a timestamp as an HTTP-date (RFC 7231, always GMT)
pub fn http_date(time: SystemTime) -> String {
    let time: DateTime<Utc> = time.into();
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Last-Modified value for a file, if its mtime is available
pub fn last_modified(stat: &Metadata) -> Option<String> {
    stat.modified().ok().map(http_date)
}

/// Apply content-type and cache headers to a response builder.
///
/// `kind` is a file extension or a logical type (`json`, `html`); both
/// resolve through the same lookup table. Last-Modified is set only when
/// file stats are present, enabling conditional GET on static resources.
pub fn apply(builder: Builder, kind: Option<&str>, stat: Option<&Metadata>) -> Builder {
    let mut builder = builder.header("Content-Type", mime::content_type(kind));
    if let Some(stat) = stat {
        builder = builder.header("Cache-Control", "public, max-age=3600");
        if let Some(modified) = last_modified(stat) {
            builder = builder.header("Last-Modified", modified);
        }
    }
    builder
}
