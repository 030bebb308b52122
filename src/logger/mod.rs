//! Logger module
//!
//! Logging utilities for the content server: lifecycle banners, request
//! and response logging, errors and warnings, optional file targets.

pub mod writer;

use std::net::SocketAddr;

use hyper::{Method, Uri};

use crate::config::Config;

/// Initialize the logger with configuration.
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info("Blog content server started");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!(
        "Archive directory: {}",
        config.resource_path.archive
    ));
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_https_start(addr: &SocketAddr) {
    write_info(&format!("HTTPS listener on: https://{addr}"));
}

pub fn log_redirect_start(addr: &SocketAddr) {
    write_info(&format!(
        "HTTP listener on: http://{addr} (redirecting to HTTPS)"
    ));
}

pub fn log_request(method: &Method, uri: &Uri) {
    write_info(&format!("[Request] {method} {uri}"));
}

pub fn log_response(size: usize) {
    write_info(&format!("[Response] {size} bytes"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}
