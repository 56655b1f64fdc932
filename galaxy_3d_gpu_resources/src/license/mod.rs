//! Vertex buffer licensing module
//!
//! Lends temporary pool vertex buffers to rendering operations under a
//! lease-and-expiry discipline and reclaims them for reuse.

mod config;
mod license;
mod license_manager;

pub use config::LicenseConfig;
pub use license::{
    BufferLicensee, LeaseCountdown, LicenseType, LicensedBuffer, VertexBufferKey,
    VertexBufferLicense,
};
pub use license_manager::BufferLicenseManager;
