/// Vertex buffer license types.
///
/// A license records that one pool buffer has been lent to one licensee.
/// The manager owns licenses; licenses only point back at the licensee and
/// at the buffer the caller originally asked to shadow.

use std::fmt;
use std::sync::{Arc, Weak};
use bytemuck::Pod;
use slotmap::new_key_type;
use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::{VertexBuffer, VertexBufferDesc};

// ===== SLOT MAP KEY =====

new_key_type! {
    /// Stable key for a vertex buffer tracked by a BufferLicenseManager.
    ///
    /// The key stays the same while the buffer cycles between licensed and
    /// idle. It becomes invalid once the manager frees the buffer.
    pub struct VertexBufferKey;
}

// ===== LICENSE TYPE =====

/// Release policy of a license
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseType {
    /// The licensee must call `BufferLicenseManager::release`
    ManualRelease,
    /// Reclaimed by `BufferLicenseManager::tick` once the expiry delay has elapsed
    AutomaticRelease,
}

// ===== COUNTDOWN =====

/// Expiry state of an automatically released lease
///
/// Advanced once per frame by the manager. `Active(n)` means the buffer is
/// reclaimed at the n-th following tick (`Active(0)` and `Active(1)` both
/// expire at the next tick).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaseCountdown {
    Active(u32),
    Expired,
}

impl LeaseCountdown {
    /// State after one more frame
    pub fn advance(self) -> Self {
        match self {
            LeaseCountdown::Active(remaining) if remaining > 1 => {
                LeaseCountdown::Active(remaining - 1)
            }
            _ => LeaseCountdown::Expired,
        }
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, LeaseCountdown::Expired)
    }

    /// Frames left before expiry (0 once expired)
    pub fn remaining(&self) -> u32 {
        match self {
            LeaseCountdown::Active(remaining) => *remaining,
            LeaseCountdown::Expired => 0,
        }
    }
}

// ===== LICENSEE =====

/// Holder of a buffer license
///
/// Licensees are referenced weakly: a license never keeps its licensee alive.
/// Implement `license_expired` to learn when a buffer was taken back without
/// an explicit release (expiry or forced release) and stop writing to it.
pub trait BufferLicensee: Send + Sync {
    /// The licensed buffer has been reclaimed by the manager
    fn license_expired(&self, _buffer: &LicensedBuffer) {}
}

// ===== LICENSED BUFFER =====

/// Handle to a buffer lent out by a BufferLicenseManager
///
/// The handle names one lease, not just the buffer: once that lease has
/// ended, `release` and `touch` reject the handle even if the same buffer
/// has been lent out again. Cloning the handle does not extend the lease.
#[derive(Clone)]
pub struct LicensedBuffer {
    key: VertexBufferKey,
    lease: u64,
    buffer: Arc<dyn VertexBuffer>,
}

impl LicensedBuffer {
    pub(crate) fn new(key: VertexBufferKey, lease: u64, buffer: Arc<dyn VertexBuffer>) -> Self {
        Self { key, lease, buffer }
    }

    /// Key of the pool buffer (shared by every lease of that buffer)
    pub fn key(&self) -> VertexBufferKey { self.key }

    /// Identity of the lease this handle was issued for
    pub fn lease(&self) -> u64 { self.lease }

    /// The underlying pool buffer
    pub fn buffer(&self) -> &Arc<dyn VertexBuffer> { &self.buffer }

    /// Descriptor of the underlying pool buffer (may be larger than requested)
    pub fn desc(&self) -> &VertexBufferDesc { self.buffer.desc() }

    /// Write typed vertices starting at vertex index `first_vertex`
    pub fn write<T: Pod>(&self, first_vertex: u32, vertices: &[T]) -> Result<()> {
        let bytes: &[u8] = bytemuck::cast_slice(vertices);
        let desc = self.desc();
        let offset = first_vertex as u64 * desc.vertex_size as u64;
        if offset + bytes.len() as u64 > desc.capacity() {
            engine_bail!("galaxy3d::LicensedBuffer", OutOfRange,
                "write of {} bytes at vertex {} exceeds buffer capacity of {} bytes",
                bytes.len(), first_vertex, desc.capacity());
        }
        self.buffer.update(offset, bytes)
    }

    /// Whether both handles refer to the same pool buffer
    pub fn same_buffer(&self, other: &LicensedBuffer) -> bool {
        Arc::ptr_eq(&self.buffer, &other.buffer)
    }
}

impl fmt::Debug for LicensedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LicensedBuffer")
            .field("key", &self.key)
            .field("lease", &self.lease)
            .field("desc", self.buffer.desc())
            .finish()
    }
}

// ===== LICENSE =====

/// One active lease of a pool buffer
pub struct VertexBufferLicense {
    original: Weak<dyn VertexBuffer>,
    original_desc: VertexBufferDesc,
    licensed: LicensedBuffer,
    license_type: LicenseType,
    initial_delay: u32,
    /// `None` for manual leases: they never expire
    countdown: Option<LeaseCountdown>,
    licensee: Weak<dyn BufferLicensee>,
}

impl VertexBufferLicense {
    pub(crate) fn new(
        original: &Arc<dyn VertexBuffer>,
        licensed: LicensedBuffer,
        license_type: LicenseType,
        expired_delay: u32,
        licensee: &Arc<dyn BufferLicensee>,
    ) -> Self {
        let countdown = match license_type {
            LicenseType::ManualRelease => None,
            LicenseType::AutomaticRelease => Some(LeaseCountdown::Active(expired_delay)),
        };
        Self {
            original: Arc::downgrade(original),
            original_desc: *original.desc(),
            licensed,
            license_type,
            initial_delay: expired_delay,
            countdown,
            licensee: Arc::downgrade(licensee),
        }
    }

    /// The buffer the caller asked to shadow, if still alive
    pub fn original_buffer(&self) -> Option<Arc<dyn VertexBuffer>> {
        self.original.upgrade()
    }

    /// Profile the licensed buffer satisfies
    pub fn original_desc(&self) -> &VertexBufferDesc { &self.original_desc }

    /// The pool buffer handed out
    pub fn licensed_buffer(&self) -> &LicensedBuffer { &self.licensed }

    pub fn license_type(&self) -> LicenseType { self.license_type }

    /// Frames left before an automatic lease is reclaimed (always 0 for manual leases)
    pub fn expired_delay(&self) -> u32 {
        self.countdown.map(|c| c.remaining()).unwrap_or(0)
    }

    /// Expiry state (`None` for manual leases)
    pub fn countdown(&self) -> Option<LeaseCountdown> { self.countdown }

    /// The licensee, if still alive
    pub fn licensee(&self) -> Option<Arc<dyn BufferLicensee>> {
        self.licensee.upgrade()
    }

    /// Acquisition order, used to reclaim deterministically
    pub(crate) fn sequence(&self) -> u64 { self.licensed.lease() }

    /// Whether `handle` was issued for this lease
    pub(crate) fn is_held_by(&self, handle: &LicensedBuffer) -> bool {
        self.licensed.lease() == handle.lease()
    }

    /// Advance the countdown by one frame. Returns true once expired.
    pub(crate) fn advance(&mut self) -> bool {
        match self.countdown {
            Some(countdown) => {
                let next = countdown.advance();
                self.countdown = Some(next);
                next.is_expired()
            }
            None => false,
        }
    }

    /// Restart the countdown from the delay given at acquisition
    pub(crate) fn touch(&mut self) {
        if self.countdown.is_some() {
            self.countdown = Some(LeaseCountdown::Active(self.initial_delay));
        }
    }

    /// Tell the licensee (if alive) that its buffer was reclaimed
    pub(crate) fn notify_expired(&self) {
        if let Some(licensee) = self.licensee.upgrade() {
            licensee.license_expired(&self.licensed);
        }
    }
}

impl fmt::Debug for VertexBufferLicense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VertexBufferLicense")
            .field("licensed", &self.licensed)
            .field("license_type", &self.license_type)
            .field("countdown", &self.countdown)
            .finish()
    }
}

#[cfg(test)]
#[path = "license_tests.rs"]
mod tests;
