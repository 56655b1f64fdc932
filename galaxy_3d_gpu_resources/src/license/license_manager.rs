/// Buffer license manager: lends temporary vertex buffers to callers.
///
/// Rendering operations that need scratch vertex storage (software skinning,
/// morph targets, batched geometry) ask for a temporary copy of a buffer
/// profile. The manager hands out an idle pool buffer when one fits, otherwise
/// creates one through the VertexBufferPool, and records a license.
///
/// Licenses end in one of three ways:
/// - `release` (ManualRelease only)
/// - expiry, counted in frames by `tick` (AutomaticRelease only)
/// - `force_release_all` (any license, e.g. on device loss)
///
/// Reclaimed buffers go to an idle list and are reused LIFO: the most
/// recently reclaimed matching buffer is handed out first. Buffers reclaimed
/// by the same call are pushed in acquisition order.

use std::sync::{Arc, Mutex};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use crate::error::Result;
use crate::graphics_device::{VertexBuffer, VertexBufferDesc, VertexBufferPool};
use crate::{engine_bail, engine_bail_warn, engine_debug, engine_err, engine_info, engine_trace};
use super::config::LicenseConfig;
use super::license::{
    BufferLicensee, LicenseType, LicensedBuffer, VertexBufferKey, VertexBufferLicense,
};

const SOURCE: &str = "galaxy3d::BufferLicenseManager";

/// A buffer waiting in the idle list
#[derive(Debug, Clone, Copy)]
struct IdleBuffer {
    key: VertexBufferKey,
    /// Frame at which the buffer became idle
    idle_since: u64,
}

/// Tracks leases of pool vertex buffers
///
/// One manager per render device (owned by `DeviceContext`). Not internally
/// synchronized: `acquire`, `release` and `tick` are called from the render
/// loop thread.
pub struct BufferLicenseManager {
    pool: Arc<Mutex<dyn VertexBufferPool>>,
    config: LicenseConfig,
    /// Every buffer obtained from the pool and not yet freed (licensed or idle)
    buffers: SlotMap<VertexBufferKey, Arc<dyn VertexBuffer>>,
    /// Active licenses, keyed by licensed buffer
    licenses: FxHashMap<VertexBufferKey, VertexBufferLicense>,
    /// Idle buffers, most recently reclaimed last
    idle: Vec<IdleBuffer>,
    frame: u64,
    next_sequence: u64,
}

impl BufferLicenseManager {
    /// Create a manager drawing buffers from `pool`
    pub fn new(pool: Arc<Mutex<dyn VertexBufferPool>>, config: LicenseConfig) -> Self {
        Self {
            pool,
            config,
            buffers: SlotMap::with_key(),
            licenses: FxHashMap::default(),
            idle: Vec::new(),
            frame: 0,
            next_sequence: 0,
        }
    }

    // ===== ACQUISITION =====

    /// License a temporary buffer matching the profile of `original`
    ///
    /// Never blocks: an idle buffer is reused when one satisfies the profile,
    /// otherwise a new buffer is created by the pool. Pool failures
    /// (`ResourceUnavailable`) are returned unchanged.
    ///
    /// `expired_delay` is the number of `tick` calls after which an
    /// AutomaticRelease lease is reclaimed; it is ignored for ManualRelease.
    pub fn acquire(
        &mut self,
        original: &Arc<dyn VertexBuffer>,
        license_type: LicenseType,
        expired_delay: u32,
        licensee: &Arc<dyn BufferLicensee>,
    ) -> Result<LicensedBuffer> {
        let desc = *original.desc();
        desc.validate()?;

        let key = match self.take_idle(&desc) {
            Some(key) => key,
            None => self.create_buffer(desc)?,
        };

        let buffer = self.buffers.get(key).cloned().ok_or_else(|| {
            engine_err!(SOURCE, BackendError, "buffer {:?} missing from buffer table", key)
        })?;
        let lease = self.next_sequence;
        self.next_sequence += 1;
        let licensed = LicensedBuffer::new(key, lease, buffer);

        debug_assert!(!self.licenses.contains_key(&key), "buffer {:?} licensed twice", key);

        self.licenses.insert(key, VertexBufferLicense::new(
            original,
            licensed.clone(),
            license_type,
            expired_delay,
            licensee,
        ));

        engine_trace!(SOURCE, "Licensed buffer {:?} ({:?}, delay {}, {} bytes)",
            key, license_type, expired_delay, licensed.desc().capacity());

        Ok(licensed)
    }

    /// Like `acquire`, and copy the contents of `original` into the licensed buffer
    ///
    /// If the copy fails the buffer goes back to the idle list and the error is returned.
    pub fn acquire_copy(
        &mut self,
        original: &Arc<dyn VertexBuffer>,
        license_type: LicenseType,
        expired_delay: u32,
        licensee: &Arc<dyn BufferLicensee>,
    ) -> Result<LicensedBuffer> {
        let licensed = self.acquire(original, license_type, expired_delay, licensee)?;
        if let Err(error) = licensed.buffer().copy_from(original.as_ref()) {
            self.reclaim(licensed.key(), false);
            return Err(error);
        }
        Ok(licensed)
    }

    /// AutomaticRelease acquisition with `LicenseConfig::default_expired_delay`
    pub fn acquire_automatic(
        &mut self,
        original: &Arc<dyn VertexBuffer>,
        licensee: &Arc<dyn BufferLicensee>,
    ) -> Result<LicensedBuffer> {
        let delay = self.config.default_expired_delay;
        self.acquire(original, LicenseType::AutomaticRelease, delay, licensee)
    }

    // ===== RELEASE =====

    /// End a ManualRelease lease and return its buffer to the idle list
    ///
    /// `buffer` must be the handle returned by the acquisition being ended.
    ///
    /// # Errors
    ///
    /// `InvalidLeaseState` if the handle's lease is no longer active (never
    /// licensed, already released, reclaimed, or the buffer has since been
    /// lent to someone else) or is licensed as AutomaticRelease.
    pub fn release(&mut self, buffer: &LicensedBuffer) -> Result<()> {
        let key = buffer.key();
        match self.licenses.get(&key) {
            Some(license) if !license.is_held_by(buffer) => {
                engine_bail_warn!(SOURCE, InvalidLeaseState,
                    "lease {} of buffer {:?} has ended; the buffer is now held by lease {}",
                    buffer.lease(), key, license.sequence());
            }
            Some(license) if license.license_type() == LicenseType::AutomaticRelease => {
                engine_bail_warn!(SOURCE, InvalidLeaseState,
                    "buffer {:?} is licensed for automatic release and cannot be released manually",
                    key);
            }
            Some(_) => {}
            None => {
                engine_bail_warn!(SOURCE, InvalidLeaseState,
                    "buffer {:?} is not licensed", key);
            }
        }

        self.reclaim(key, false);
        engine_trace!(SOURCE, "Released buffer {:?} (lease {})", key, buffer.lease());
        Ok(())
    }

    /// Restart the expiry countdown of an AutomaticRelease lease
    ///
    /// Lets a caller keep a buffer across frames while it is still in use.
    /// Fails with `InvalidLeaseState` unless `buffer` names the active lease.
    pub fn touch(&mut self, buffer: &LicensedBuffer) -> Result<()> {
        let key = buffer.key();
        match self.licenses.get_mut(&key) {
            Some(license) if !license.is_held_by(buffer) => {
                engine_bail_warn!(SOURCE, InvalidLeaseState,
                    "lease {} of buffer {:?} has ended", buffer.lease(), key);
            }
            Some(license) if license.license_type() == LicenseType::AutomaticRelease => {
                license.touch();
                Ok(())
            }
            Some(_) => {
                engine_bail_warn!(SOURCE, InvalidLeaseState,
                    "buffer {:?} is licensed for manual release and has no countdown", key);
            }
            None => {
                engine_bail_warn!(SOURCE, InvalidLeaseState,
                    "buffer {:?} is not licensed", key);
            }
        }
    }

    // ===== FRAME BOUNDARY =====

    /// Advance one frame
    ///
    /// Must be called exactly once per frame, from the render loop. Every
    /// AutomaticRelease lease moves one step toward expiry; expired leases are
    /// reclaimed and their licensees notified. Idle buffers past the
    /// configured age or count limits are then freed.
    ///
    /// Returns the number of leases reclaimed.
    pub fn tick(&mut self) -> usize {
        self.frame += 1;

        let mut expired: Vec<(u64, VertexBufferKey)> = self.licenses
            .iter_mut()
            .filter_map(|(key, license)| {
                license.advance().then(|| (license.sequence(), *key))
            })
            .collect();
        expired.sort_unstable();

        for (_, key) in &expired {
            self.reclaim(*key, true);
        }
        if !expired.is_empty() {
            engine_debug!(SOURCE, "Frame {}: {} lease(s) expired", self.frame, expired.len());
        }

        self.trim_idle();
        expired.len()
    }

    /// Reclaim every active lease regardless of type or remaining delay
    ///
    /// For abnormal paths such as device loss. Every licensee is notified.
    /// Reclaimed buffers stay in the idle list; use `free_unused_buffers` to
    /// drop them. Returns the number of leases reclaimed.
    pub fn force_release_all(&mut self) -> usize {
        let mut keys: Vec<(u64, VertexBufferKey)> = self.licenses
            .iter()
            .map(|(key, license)| (license.sequence(), *key))
            .collect();
        keys.sort_unstable();

        for (_, key) in &keys {
            self.reclaim(*key, true);
        }

        engine_info!(SOURCE, "Force-released {} lease(s)", keys.len());
        keys.len()
    }

    /// Free every idle buffer now. Returns how many were freed.
    pub fn free_unused_buffers(&mut self) -> usize {
        let freed = self.idle.len();
        for idle in std::mem::take(&mut self.idle) {
            self.buffers.remove(idle.key);
        }
        if freed > 0 {
            engine_debug!(SOURCE, "Freed {} idle buffer(s)", freed);
        }
        freed
    }

    // ===== QUERIES =====

    /// Active license for `key`
    pub fn license(&self, key: VertexBufferKey) -> Option<&VertexBufferLicense> {
        self.licenses.get(&key)
    }

    /// Whether `key` has an active license
    pub fn is_licensed(&self, key: VertexBufferKey) -> bool {
        self.licenses.contains_key(&key)
    }

    /// Whether `buffer` is the handle of a lease that is still active
    pub fn holds_lease(&self, buffer: &LicensedBuffer) -> bool {
        self.licenses
            .get(&buffer.key())
            .is_some_and(|license| license.is_held_by(buffer))
    }

    /// Iterate over active licenses (unordered)
    pub fn licenses(&self) -> impl Iterator<Item = &VertexBufferLicense> + '_ {
        self.licenses.values()
    }

    /// Number of active licenses
    pub fn active_license_count(&self) -> usize {
        self.licenses.len()
    }

    /// Number of buffers waiting for reuse
    pub fn idle_buffer_count(&self) -> usize {
        self.idle.len()
    }

    /// Number of buffers tracked (licensed + idle)
    pub fn total_buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Number of `tick` calls so far
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn config(&self) -> &LicenseConfig {
        &self.config
    }

    // ===== INTERNAL =====

    /// Remove the most recently idled buffer satisfying `desc` from the idle list
    fn take_idle(&mut self, desc: &VertexBufferDesc) -> Option<VertexBufferKey> {
        let buffers = &self.buffers;
        let index = self.idle.iter().rposition(|idle| {
            buffers.get(idle.key)
                .map(|buffer| desc.is_satisfied_by(buffer.desc()))
                .unwrap_or(false)
        })?;
        Some(self.idle.remove(index).key)
    }

    fn create_buffer(&mut self, desc: VertexBufferDesc) -> Result<VertexBufferKey> {
        let buffer = self.pool.lock()
            .map_err(|_| engine_err!(SOURCE, BackendError, "VertexBufferPool lock poisoned"))?
            .create_vertex_buffer(desc)?;

        if !desc.is_satisfied_by(buffer.desc()) {
            engine_bail!(SOURCE, BackendError,
                "pool returned {:?} for a request of {:?}", buffer.desc(), desc);
        }

        let key = self.buffers.insert(buffer);
        engine_trace!(SOURCE, "Created pool buffer {:?} ({} bytes)", key, desc.capacity());
        Ok(key)
    }

    /// End the license of `key` and move its buffer to the idle list
    fn reclaim(&mut self, key: VertexBufferKey, notify: bool) {
        if let Some(license) = self.licenses.remove(&key) {
            self.idle.push(IdleBuffer { key, idle_since: self.frame });
            if notify {
                license.notify_expired();
            }
        }
    }

    /// Free idle buffers that are too old, then the oldest beyond the idle cap
    fn trim_idle(&mut self) {
        let frame = self.frame;
        let threshold = self.config.idle_frame_threshold as u64;
        let buffers = &mut self.buffers;
        let before = self.idle.len();

        self.idle.retain(|idle| {
            let keep = frame - idle.idle_since < threshold;
            if !keep {
                buffers.remove(idle.key);
            }
            keep
        });

        if let Some(max) = self.config.max_idle_buffers {
            if self.idle.len() > max {
                let excess = self.idle.len() - max;
                for idle in self.idle.drain(..excess) {
                    self.buffers.remove(idle.key);
                }
            }
        }

        let freed = before - self.idle.len();
        if freed > 0 {
            engine_debug!(SOURCE, "Freed {} idle buffer(s) at frame {}", freed, frame);
        }
    }
}

#[cfg(test)]
#[path = "license_manager_tests.rs"]
mod tests;
