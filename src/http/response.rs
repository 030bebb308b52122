//! HTTP response building module
//!
//! Provides builders for the server's terminal outcomes, decoupled from
//! routing logic. File responses stream their bytes; the transport never
//! buffers a whole file in memory.

use std::fs::Metadata;
use std::io;

use futures::TryStreamExt;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full, StreamBody};
use hyper::body::{Bytes, Frame};
use hyper::Response;
use serde::Serialize;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use super::headers;
use crate::logger;

/// Response body: a buffered payload or a file stream
pub type Body = BoxBody<Bytes, io::Error>;

/// Wrap a buffered payload
pub fn full_body(data: impl Into<Bytes>) -> Body {
    Full::new(data.into()).map_err(io::Error::other).boxed()
}

/// Stream an open file chunk by chunk, preserving backpressure.
/// Dropping the body (client disconnect) releases the file handle.
pub fn file_body(file: File) -> Body {
    StreamBody::new(ReaderStream::new(file).map_ok(Frame::data)).boxed()
}

/// Build 200 JSON response from an already-serialized payload
pub fn json(body: String) -> Response<Body> {
    Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .body(full_body(body))
        .unwrap_or_else(|e| {
            log_build_error("JSON", &e);
            Response::new(full_body(Bytes::new()))
        })
}

/// Serialize a value and build a 200 JSON response
pub fn json_value<T: Serialize>(value: &T) -> Response<Body> {
    match serde_json::to_string(value) {
        Ok(body) => json(body),
        Err(e) => {
            logger::log_error(&format!("Failed to serialize response: {e}"));
            internal_error()
        }
    }
}

/// Build 404 response with a plain-text diagnostic body
pub fn not_found_text(message: &str) -> Response<Body> {
    Response::builder()
        .status(404)
        .header("Content-Type", "text/plain; charset=utf-8")
        .body(full_body(message.to_string()))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(full_body(Bytes::new()))
        })
}

/// Build 304 Not Modified response with an empty body
pub fn not_modified() -> Response<Body> {
    Response::builder()
        .status(304)
        .body(full_body(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("304", &e);
            Response::new(full_body(Bytes::new()))
        })
}

/// Build 200 response streaming a static file.
///
/// Content-Length comes from the file stats so the transport does not
/// fall back to chunked encoding.
pub fn streamed_file(file: File, extension: Option<&str>, stat: &Metadata) -> Response<Body> {
    headers::apply(Response::builder().status(200), extension, Some(stat))
        .header("Content-Length", stat.len())
        .body(file_body(file))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(full_body(Bytes::new()))
        })
}

/// Build 200 HTML response from rendered page content
pub fn html_page(content: String, stat: Option<&Metadata>) -> Response<Body> {
    headers::apply(Response::builder().status(200), Some("html"), stat)
        .body(full_body(content))
        .unwrap_or_else(|e| {
            log_build_error("HTML", &e);
            Response::new(full_body(Bytes::new()))
        })
}

/// Build the response carrying the pre-rendered 404 page.
///
/// Status is 200, not 404. The client-side loader treats any non-200 as
/// a hard failure, so missing paths answer with the page body under a
/// success status. Stats of the requested file are usually absent here;
/// headers are then built without cache-validation fields.
pub fn not_found_page(file: File, stat: Option<&Metadata>) -> Response<Body> {
    headers::apply(Response::builder().status(200), Some("html"), stat)
        .body(file_body(file))
        .unwrap_or_else(|e| {
            log_build_error("404 page", &e);
            Response::new(full_body(Bytes::new()))
        })
}

/// Build 301 redirect to the HTTPS endpoint
pub fn https_redirect(location: &str) -> Response<Body> {
    Response::builder()
        .status(301)
        .header("Location", location)
        .body(full_body(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("301", &e);
            Response::new(full_body(Bytes::new()))
        })
}

/// Build 500 response for serialization failures
fn internal_error() -> Response<Body> {
    Response::builder()
        .status(500)
        .header("Content-Type", "text/plain")
        .body(full_body("internal server error"))
        .unwrap_or_else(|e| {
            log_build_error("500", &e);
            Response::new(full_body(Bytes::new()))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    logger::log_error(&format!("Failed to build {status} response: {error}"));
}
