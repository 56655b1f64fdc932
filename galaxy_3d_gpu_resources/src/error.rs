//! Error types for the Galaxy3D GPU resource core
//!
//! This module defines the error types used by buffer licensing,
//! render targets and the graphics device contracts.

use std::fmt;

/// Result type for Galaxy3D GPU resource operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D GPU resource errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Release/touch on a buffer with no active license, or with the wrong license type
    InvalidLeaseState(String),

    /// Index (slice, z-offset) outside the addressable range of a resource
    OutOfRange(String),

    /// The vertex buffer pool could not satisfy a request
    ResourceUnavailable(String),

    /// Operation attempted on a render target after disposal
    AlreadyDisposed(String),

    /// Invalid resource description or conflicting resource state
    InvalidResource(String),

    /// Backend-specific error (Vulkan, DirectX, etc.)
    BackendError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidLeaseState(msg) => write!(f, "Invalid lease state: {}", msg),
            Error::OutOfRange(msg) => write!(f, "Out of range: {}", msg),
            Error::ResourceUnavailable(msg) => write!(f, "Resource unavailable: {}", msg),
            Error::AlreadyDisposed(msg) => write!(f, "Already disposed: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
