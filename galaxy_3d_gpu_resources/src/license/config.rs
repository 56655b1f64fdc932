/// Buffer license manager configuration

/// Configuration of a BufferLicenseManager
#[derive(Debug, Clone)]
pub struct LicenseConfig {
    /// Expiry delay (in frames) used by `acquire_automatic`
    pub default_expired_delay: u32,
    /// An idle buffer not reused for this many ticks is freed
    pub idle_frame_threshold: u32,
    /// Upper bound on idle buffers kept for reuse (`None` = unbounded)
    pub max_idle_buffers: Option<usize>,
}

impl Default for LicenseConfig {
    fn default() -> Self {
        Self {
            default_expired_delay: 5,
            idle_frame_threshold: 30_000,
            max_idle_buffers: None,
        }
    }
}
