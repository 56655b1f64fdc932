/// Pixel surface trait and pixel format

/// Pixel storage format of a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum PixelFormat {
    // Color formats
    R8_UNORM,
    R8G8_UNORM,
    R8G8B8A8_SRGB,
    R8G8B8A8_UNORM,
    B8G8R8A8_SRGB,
    B8G8R8A8_UNORM,
    A2B10G10R10_UNORM,
    R16G16B16A16_SFLOAT,
    R32_SFLOAT,
    R32G32B32A32_SFLOAT,

    // Depth/stencil formats
    D16_UNORM,
    D24_UNORM_S8_UINT,
    D32_FLOAT,
}

impl PixelFormat {
    /// Bits per pixel element (the color depth of a target using this format)
    pub fn bits_per_element(&self) -> u32 {
        match self {
            PixelFormat::R8_UNORM => 8,
            PixelFormat::R8G8_UNORM | PixelFormat::D16_UNORM => 16,
            PixelFormat::R8G8B8A8_SRGB
            | PixelFormat::R8G8B8A8_UNORM
            | PixelFormat::B8G8R8A8_SRGB
            | PixelFormat::B8G8R8A8_UNORM
            | PixelFormat::A2B10G10R10_UNORM
            | PixelFormat::R32_SFLOAT
            | PixelFormat::D24_UNORM_S8_UINT
            | PixelFormat::D32_FLOAT => 32,
            PixelFormat::R16G16B16A16_SFLOAT => 64,
            PixelFormat::R32G32B32A32_SFLOAT => 128,
        }
    }

    /// Returns true for depth/stencil formats
    pub fn is_depth(&self) -> bool {
        matches!(
            self,
            PixelFormat::D16_UNORM | PixelFormat::D24_UNORM_S8_UINT | PixelFormat::D32_FLOAT
        )
    }
}

/// Raw pixel storage for one texture image
///
/// Implemented by backend-specific pixel buffers. A surface has one or more
/// slices (depth slices of a volume, faces of a cube map, layers of an array);
/// each slice can be bound as a render target independently of the others.
///
/// Binding state is interior: surfaces are shared (`Arc`) between the texture
/// that owns the image and every render target drawing into it.
pub trait PixelSurface: Send + Sync {
    /// Width in pixels
    fn width(&self) -> u32;

    /// Height in pixels
    fn height(&self) -> u32;

    /// Number of addressable slices (depth, faces or array layers)
    fn slice_count(&self) -> u32;

    /// Pixel format
    fn format(&self) -> PixelFormat;

    /// Whether `slice` is currently bound as a render target
    fn is_render_target_bound(&self, slice: u32) -> bool;

    /// Record that `slice` is bound as a render target
    fn bind_render_target(&self, slice: u32);

    /// Clear the render target binding at `slice`
    ///
    /// Only the binding metadata of that slice is touched; the pixel data
    /// and the bindings of other slices are left intact.
    fn clear_render_target_binding(&self, slice: u32);
}

#[cfg(test)]
#[path = "pixel_surface_tests.rs"]
mod tests;
