//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from the
//! routing and content-resolution logic.

pub mod headers;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use response::Body;
