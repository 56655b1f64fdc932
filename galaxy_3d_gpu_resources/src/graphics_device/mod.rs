/// Graphics device module - contracts the GPU backend implements
///
/// The resource core never talks to a GPU API directly: backends provide
/// vertex buffers, a vertex buffer pool and pixel surfaces through these traits.

// Module declarations
pub mod vertex_buffer;
pub mod pixel_surface;

// Re-export from modules
pub use vertex_buffer::*;
pub use pixel_surface::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
