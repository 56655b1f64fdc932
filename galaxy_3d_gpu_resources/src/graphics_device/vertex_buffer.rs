/// Vertex buffer trait, vertex buffer descriptor and vertex buffer pool trait

use std::sync::Arc;
use bitflags::bitflags;
use crate::error::Result;
use crate::engine_bail;

bitflags! {
    /// Vertex buffer usage flags
    ///
    /// Describes how the CPU and GPU access the buffer. A pooled buffer can
    /// stand in for a request only if it carries every requested flag.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        /// Written once, read many times by the GPU
        const STATIC = 1 << 0;
        /// Rewritten frequently by the CPU
        const DYNAMIC = 1 << 1;
        /// CPU never reads the contents back
        const WRITE_ONLY = 1 << 2;
        /// Contents may be discarded on every write (per-frame scratch data)
        const DISCARDABLE = 1 << 3;
    }
}

/// Descriptor for creating a vertex buffer
///
/// The size/usage profile a licensed buffer must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexBufferDesc {
    /// Size of one vertex in bytes
    pub vertex_size: u32,
    /// Number of vertices
    pub vertex_count: u32,
    /// Buffer usage
    pub usage: BufferUsage,
}

impl VertexBufferDesc {
    /// Total size in bytes
    pub fn capacity(&self) -> u64 {
        self.vertex_size as u64 * self.vertex_count as u64
    }

    /// Check that this descriptor describes a buffer that can exist
    pub fn validate(&self) -> Result<()> {
        if self.vertex_size == 0 {
            engine_bail!("galaxy3d::VertexBufferDesc", InvalidResource,
                "vertex_size must be > 0");
        }
        if self.vertex_count == 0 {
            engine_bail!("galaxy3d::VertexBufferDesc", InvalidResource,
                "vertex_count must be > 0");
        }
        Ok(())
    }

    /// Whether a buffer created from `candidate` can be used in place of one created from `self`
    ///
    /// Same vertex layout size, at least as many vertices, and every requested usage flag.
    pub fn is_satisfied_by(&self, candidate: &VertexBufferDesc) -> bool {
        candidate.vertex_size == self.vertex_size
            && candidate.vertex_count >= self.vertex_count
            && candidate.usage.contains(self.usage)
    }
}

/// Vertex buffer resource trait
///
/// Implemented by backend-specific buffer types (e.g., VulkanVertexBuffer).
/// The buffer is automatically destroyed when the last reference is dropped.
pub trait VertexBuffer: Send + Sync {
    /// Descriptor the buffer was created from
    fn desc(&self) -> &VertexBufferDesc;

    /// Update buffer data
    ///
    /// # Arguments
    ///
    /// * `offset` - Offset into the buffer in bytes
    /// * `data` - Data to write
    fn update(&self, offset: u64, data: &[u8]) -> Result<()>;

    /// Read buffer data back into `out`, starting at `offset` bytes
    fn read(&self, offset: u64, out: &mut [u8]) -> Result<()>;

    /// Copy the contents of `source` into this buffer
    ///
    /// Copies `min(source capacity, self capacity)` bytes from offset 0.
    fn copy_from(&self, source: &dyn VertexBuffer) -> Result<()>;
}

/// Owner of the real GPU vertex buffers
///
/// Creates pool-backed buffers matching a size/usage profile. Capacity
/// management (memory budgets, heaps) is the pool's business; when it
/// cannot satisfy a request it returns `Error::ResourceUnavailable`.
pub trait VertexBufferPool: Send + Sync {
    /// Create a new vertex buffer matching `desc`
    fn create_vertex_buffer(&mut self, desc: VertexBufferDesc) -> Result<Arc<dyn VertexBuffer>>;
}

#[cfg(test)]
#[path = "vertex_buffer_tests.rs"]
mod tests;
