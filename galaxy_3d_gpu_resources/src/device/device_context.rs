/// Device context: the GPU resource managers of one render device.
///
/// Owns the vertex buffer license manager and the render target manager.
/// Each render device gets its own context; nothing here is global.

use std::sync::{Arc, Mutex};
use crate::graphics_device::VertexBufferPool;
use crate::license::{BufferLicenseManager, LicenseConfig};
use crate::target::TargetManager;
use crate::{engine_info, engine_trace};

const SOURCE: &str = "galaxy3d::DeviceContext";

/// What `device_lost` tore down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceLostReport {
    /// Leases forcibly reclaimed (licensees were notified)
    pub leases_reclaimed: usize,
    /// Pool buffers dropped
    pub buffers_freed: usize,
    /// Render targets disposed and removed
    pub targets_disposed: usize,
}

pub struct DeviceContext {
    license_manager: BufferLicenseManager,
    target_manager: TargetManager,
}

impl DeviceContext {
    /// Create a context drawing temporary vertex buffers from `pool`
    pub fn new(pool: Arc<Mutex<dyn VertexBufferPool>>, config: LicenseConfig) -> Self {
        engine_info!(SOURCE, "DeviceContext created (expired delay {}, idle threshold {})",
            config.default_expired_delay, config.idle_frame_threshold);
        Self {
            license_manager: BufferLicenseManager::new(pool, config),
            target_manager: TargetManager::new(),
        }
    }

    pub fn license_manager(&self) -> &BufferLicenseManager {
        &self.license_manager
    }

    pub fn license_manager_mut(&mut self) -> &mut BufferLicenseManager {
        &mut self.license_manager
    }

    pub fn target_manager(&self) -> &TargetManager {
        &self.target_manager
    }

    pub fn target_manager_mut(&mut self) -> &mut TargetManager {
        &mut self.target_manager
    }

    /// Frame boundary: advance every automatic lease by one frame
    ///
    /// Returns the number of leases that expired this frame.
    pub fn end_frame(&mut self) -> usize {
        let expired = self.license_manager.tick();
        engine_trace!(SOURCE, "Frame {} ended ({} leases expired)",
            self.license_manager.frame_count(), expired);
        expired
    }

    /// Tear down every GPU-side resource after the device was lost
    ///
    /// Leases are reclaimed first (licensees notified), then idle buffers
    /// are freed, then every render target is disposed and removed.
    pub fn device_lost(&mut self) -> DeviceLostReport {
        let leases_reclaimed = self.license_manager.force_release_all();
        let buffers_freed = self.license_manager.free_unused_buffers();
        let targets_disposed = self.target_manager.render_target_count();
        self.target_manager.clear();

        engine_info!(SOURCE,
            "Device lost: {} leases reclaimed, {} buffers freed, {} targets disposed",
            leases_reclaimed, buffers_freed, targets_disposed);

        DeviceLostReport { leases_reclaimed, buffers_freed, targets_disposed }
    }
}

#[cfg(test)]
#[path = "device_context_tests.rs"]
mod tests;
