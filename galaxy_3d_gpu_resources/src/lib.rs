/*!
# Galaxy 3D GPU Resources

Transient GPU resource management for the Galaxy 3D rendering engine.

This crate manages two kinds of short-lived GPU resources on behalf of the
renderer, independently of the graphics API. Backend implementations
(Vulkan, Direct3D 12, etc.) plug in through the `graphics_device` traits.

## Architecture

- **BufferLicenseManager**: lends temporary vertex buffers from a pool under
  manual or frame-counted (automatic) leases, and reclaims them for reuse
- **RenderTexture**: render target bound to one slice of a pixel surface,
  unbound exactly once on disposal
- **TargetManager**: named registry of render targets, updated by priority
- **DeviceContext**: owns both managers for one render device
- **VertexBufferPool / VertexBuffer / PixelSurface**: backend contracts

```no_run
use std::sync::{Arc, Mutex};
use galaxy_3d_gpu_resources::galaxy3d::device::DeviceContext;
use galaxy_3d_gpu_resources::galaxy3d::license::LicenseConfig;
use galaxy_3d_gpu_resources::galaxy3d::device::VertexBufferPool;

fn render_loop(pool: Arc<Mutex<dyn VertexBufferPool>>) {
    let mut ctx = DeviceContext::new(pool, LicenseConfig::default());
    loop {
        // ... acquire licensed buffers, update render targets ...
        ctx.end_frame();
    }
}
```
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod graphics_device;
pub mod license;
pub mod target;
pub mod device;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Process-wide logging entry point
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        // Note: engine_* macros are exported at the crate root
    }

    // Device sub-module: per-device context and backend contracts
    pub mod device {
        pub use crate::device::*;
        pub use crate::graphics_device::*;
    }

    // Vertex buffer licensing sub-module
    pub mod license {
        pub use crate::license::*;
    }

    // Render target sub-module
    pub mod target {
        pub use crate::target::*;
    }
}

// Re-export math library at crate root
pub use glam;
