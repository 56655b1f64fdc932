//! Render device context module
//!
//! Groups the per-device GPU resource managers behind one owner.

mod device_context;

pub use device_context::{DeviceContext, DeviceLostReport};
