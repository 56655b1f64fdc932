/// Mock graphics device for unit tests (no GPU required)
///
/// Provides CPU-side vertex buffers, a vertex buffer pool with an optional
/// buffer budget, and a pixel surface that records render target bindings.

use std::sync::{Arc, Mutex};
use rustc_hash::FxHashSet;
use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::{
    PixelFormat, PixelSurface, VertexBuffer, VertexBufferDesc, VertexBufferPool,
};

// ============================================================================
// Mock VertexBuffer
// ============================================================================

#[derive(Debug)]
pub struct MockVertexBuffer {
    pub desc: VertexBufferDesc,
    pub name: String,
    pub data: Mutex<Vec<u8>>,
}

impl MockVertexBuffer {
    pub fn new(desc: VertexBufferDesc, name: String) -> Self {
        Self {
            data: Mutex::new(vec![0; desc.capacity() as usize]),
            desc,
            name,
        }
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.data.lock().unwrap().clone()
    }
}

impl VertexBuffer for MockVertexBuffer {
    fn desc(&self) -> &VertexBufferDesc {
        &self.desc
    }

    fn update(&self, offset: u64, data: &[u8]) -> Result<()> {
        let mut storage = self.data.lock().unwrap();
        let start = offset as usize;
        let end = start + data.len();
        if end > storage.len() {
            engine_bail!("galaxy3d::MockVertexBuffer", OutOfRange,
                "write of {} bytes at {} exceeds {} bytes", data.len(), offset, storage.len());
        }
        storage[start..end].copy_from_slice(data);
        Ok(())
    }

    fn read(&self, offset: u64, out: &mut [u8]) -> Result<()> {
        let storage = self.data.lock().unwrap();
        let start = offset as usize;
        let end = start + out.len();
        if end > storage.len() {
            engine_bail!("galaxy3d::MockVertexBuffer", OutOfRange,
                "read of {} bytes at {} exceeds {} bytes", out.len(), offset, storage.len());
        }
        out.copy_from_slice(&storage[start..end]);
        Ok(())
    }

    fn copy_from(&self, source: &dyn VertexBuffer) -> Result<()> {
        let len = source.desc().capacity().min(self.desc.capacity()) as usize;
        let mut staging = vec![0; len];
        source.read(0, &mut staging)?;
        self.update(0, &staging)
    }
}

// ============================================================================
// Mock VertexBufferPool
// ============================================================================

#[derive(Debug, Default)]
pub struct MockVertexBufferPool {
    /// Number of buffers created so far
    pub created: u32,
    /// Refuse creation once `created` reaches this budget
    pub max_buffers: Option<u32>,
}

impl MockVertexBufferPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_budget(max_buffers: u32) -> Self {
        Self { created: 0, max_buffers: Some(max_buffers) }
    }
}

impl VertexBufferPool for MockVertexBufferPool {
    fn create_vertex_buffer(&mut self, desc: VertexBufferDesc) -> Result<Arc<dyn VertexBuffer>> {
        if let Some(max) = self.max_buffers {
            if self.created >= max {
                engine_bail!("galaxy3d::MockVertexBufferPool", ResourceUnavailable,
                    "buffer budget of {} exhausted", max);
            }
        }
        let name = format!("mock_vb_{}", self.created);
        self.created += 1;
        Ok(Arc::new(MockVertexBuffer::new(desc, name)))
    }
}

// ============================================================================
// Mock PixelSurface
// ============================================================================

#[derive(Debug)]
pub struct MockPixelSurface {
    pub width: u32,
    pub height: u32,
    pub slices: u32,
    pub format: PixelFormat,
    pub bound: Mutex<FxHashSet<u32>>,
    /// Every slice passed to clear_render_target_binding, in call order
    pub cleared: Mutex<Vec<u32>>,
}

impl MockPixelSurface {
    pub fn new(width: u32, height: u32, slices: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            slices,
            format,
            bound: Mutex::new(FxHashSet::default()),
            cleared: Mutex::new(Vec::new()),
        }
    }

    pub fn cleared_slices(&self) -> Vec<u32> {
        self.cleared.lock().unwrap().clone()
    }
}

impl PixelSurface for MockPixelSurface {
    fn width(&self) -> u32 { self.width }
    fn height(&self) -> u32 { self.height }
    fn slice_count(&self) -> u32 { self.slices }
    fn format(&self) -> PixelFormat { self.format }

    fn is_render_target_bound(&self, slice: u32) -> bool {
        self.bound.lock().unwrap().contains(&slice)
    }

    fn bind_render_target(&self, slice: u32) {
        self.bound.lock().unwrap().insert(slice);
    }

    fn clear_render_target_binding(&self, slice: u32) {
        self.bound.lock().unwrap().remove(&slice);
        self.cleared.lock().unwrap().push(slice);
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
