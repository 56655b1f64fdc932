/// RenderTexture: a render target bound to one slice of a pixel surface.
///
/// The slice stays bound for as long as the texture is Active. Disposal
/// (explicit, through the TargetManager, or on drop) clears exactly that
/// slice's binding, exactly once.

use std::fmt;
use std::sync::Arc;
use crate::error::Result;
use crate::graphics_device::{PixelFormat, PixelSurface};
use crate::{engine_bail, engine_debug, engine_warn};
use super::render_target::{
    RenderTarget, RenderTargetListener, RenderTargetPriority, TargetLifecycle, TargetState,
};

const SOURCE: &str = "galaxy3d::RenderTexture";

pub struct RenderTexture {
    state: TargetState,
    surface: Arc<dyn PixelSurface>,
    z_offset: u32,
}

impl RenderTexture {
    /// Bind a new render texture to slice `z_offset` of `surface`
    ///
    /// Width and height come from the surface, color depth from its
    /// format, and the priority is always High.
    ///
    /// # Errors
    ///
    /// - `OutOfRange` if `z_offset` is not a valid slice of the surface
    /// - `InvalidResource` if the slice is already bound to another target
    pub fn new(name: impl Into<String>, surface: Arc<dyn PixelSurface>, z_offset: u32) -> Result<Self> {
        let name = name.into();
        let slice_count = surface.slice_count();
        if z_offset >= slice_count {
            engine_bail!(SOURCE, OutOfRange,
                "RenderTexture '{}': slice {} out of range (surface has {} slices)",
                name, z_offset, slice_count);
        }
        if surface.is_render_target_bound(z_offset) {
            engine_bail!(SOURCE, InvalidResource,
                "RenderTexture '{}': slice {} is already bound", name, z_offset);
        }

        surface.bind_render_target(z_offset);

        let state = TargetState::new(
            name,
            surface.width(),
            surface.height(),
            surface.format().bits_per_element(),
            RenderTargetPriority::High,
        );
        engine_debug!(SOURCE, "RenderTexture '{}' bound to slice {} ({}x{} {:?})",
            state.name(), z_offset, state.width(), state.height(), surface.format());

        Ok(Self { state, surface, z_offset })
    }

    // Descriptive accessors stay valid after disposal; only `update`,
    // `add_listener` and `dispose` report `AlreadyDisposed`.

    /// The pixel surface this texture renders (or rendered) into
    pub fn surface(&self) -> &Arc<dyn PixelSurface> {
        &self.surface
    }

    /// Slice of the surface this texture is (or was) bound to
    pub fn z_offset(&self) -> u32 {
        self.z_offset
    }

    /// Pixel format of the surface, consistent with `color_depth`
    pub fn format(&self) -> PixelFormat {
        self.surface.format()
    }
}

impl RenderTarget for RenderTexture {
    fn name(&self) -> &str { self.state.name() }
    fn width(&self) -> u32 { self.state.width() }
    fn height(&self) -> u32 { self.state.height() }

    fn color_depth(&self) -> u32 {
        self.surface.format().bits_per_element()
    }

    fn priority(&self) -> RenderTargetPriority { self.state.priority() }
    fn lifecycle(&self) -> TargetLifecycle { self.state.lifecycle() }

    fn add_listener(&mut self, listener: Arc<dyn RenderTargetListener>) -> Result<()> {
        self.state.add_listener(listener)
    }

    fn update(&mut self) -> Result<()> {
        // Drawing is recorded by the backend; the texture only owns the slice binding
        self.state.update_with(|| Ok(()))
    }

    fn update_count(&self) -> u64 { self.state.update_count() }

    fn dispose(&mut self) -> Result<()> {
        self.state.teardown()?;
        self.surface.clear_render_target_binding(self.z_offset);
        engine_debug!(SOURCE, "RenderTexture '{}' released slice {}",
            self.state.name(), self.z_offset);
        Ok(())
    }

    fn as_render_texture(&self) -> Option<&RenderTexture> { Some(self) }
}

impl Drop for RenderTexture {
    fn drop(&mut self) {
        if !self.state.is_disposed() {
            if let Err(e) = self.dispose() {
                engine_warn!(SOURCE, "Failed to dispose RenderTexture '{}' on drop: {}",
                    self.state.name(), e);
            }
        }
    }
}

impl fmt::Debug for RenderTexture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderTexture")
            .field("state", &self.state)
            .field("format", &self.surface.format())
            .field("z_offset", &self.z_offset)
            .finish()
    }
}

#[cfg(test)]
#[path = "render_texture_tests.rs"]
mod tests;
