/// Central render target manager for a render device.
///
/// Manages named render targets. Render targets define where
/// scenes get rendered to (screen, textures, etc.). Every target
/// leaving the manager is disposed first.

use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::graphics_device::PixelSurface;
use crate::{engine_bail, engine_err, engine_info, engine_warn};
use super::render_target::RenderTarget;
use super::render_texture::RenderTexture;

const SOURCE: &str = "galaxy3d::TargetManager";

/// Target manager (owned by DeviceContext)
///
/// Stores named render targets. Multiple render targets can exist
/// simultaneously (screen, shadow maps, post-processing buffers, etc.).
pub struct TargetManager {
    render_targets: FxHashMap<String, Box<dyn RenderTarget>>,
    /// Names in insertion order (update order tie-breaker)
    order: Vec<String>,
}

impl TargetManager {
    /// Create a new empty target manager
    pub fn new() -> Self {
        Self {
            render_targets: FxHashMap::default(),
            order: Vec::new(),
        }
    }

    /// Create a named render texture bound to slice `z_offset` of `surface`
    ///
    /// Returns a reference to the created render texture.
    ///
    /// # Errors
    ///
    /// Returns `InvalidResource` if a render target with the same name already
    /// exists, otherwise any error from `RenderTexture::new`.
    pub fn create_render_texture(
        &mut self,
        name: &str,
        surface: Arc<dyn PixelSurface>,
        z_offset: u32,
    ) -> Result<&RenderTexture> {
        self.ensure_name_free(name)?;
        let texture = RenderTexture::new(name, surface, z_offset)?;
        self.insert(name, Box::new(texture));

        self.render_targets
            .get(name)
            .and_then(|target| target.as_render_texture())
            .ok_or_else(|| engine_err!(SOURCE, BackendError,
                "RenderTexture '{}' missing after insertion", name))
    }

    /// Register a render target of any kind under `name`
    ///
    /// # Errors
    ///
    /// Returns `InvalidResource` if the name is taken or the target is
    /// already disposed.
    pub fn add_render_target(&mut self, name: &str, target: Box<dyn RenderTarget>) -> Result<()> {
        self.ensure_name_free(name)?;
        if target.is_disposed() {
            engine_bail!(SOURCE, InvalidResource,
                "RenderTarget '{}' is disposed and cannot be registered", name);
        }
        self.insert(name, target);
        Ok(())
    }

    /// Get a render target by name
    pub fn render_target(&self, name: &str) -> Option<&dyn RenderTarget> {
        self.render_targets.get(name).map(|target| target.as_ref())
    }

    /// Get a mutable render target by name
    pub fn render_target_mut(&mut self, name: &str) -> Option<&mut (dyn RenderTarget + 'static)> {
        self.render_targets.get_mut(name).map(|target| target.as_mut())
    }

    /// Dispose and remove a render target by name
    ///
    /// # Errors
    ///
    /// Returns `InvalidResource` if no target has this name.
    pub fn remove_render_target(&mut self, name: &str) -> Result<()> {
        let Some(mut target) = self.render_targets.remove(name) else {
            engine_bail!(SOURCE, InvalidResource, "RenderTarget '{}' not found", name);
        };
        self.order.retain(|n| n != name);

        if !target.is_disposed() {
            target.dispose()?;
        }
        Ok(())
    }

    /// Update every live target, High priority first
    ///
    /// Targets of equal priority update in insertion order. Disposed targets
    /// are skipped. Returns the number of targets updated.
    pub fn update_all(&mut self) -> Result<usize> {
        let mut names: Vec<&String> = self.order.iter().collect();
        // Stable sort keeps insertion order within a priority
        names.sort_by_key(|name| {
            self.render_targets.get(name.as_str()).map(|target| target.priority())
        });
        let names: Vec<String> = names.into_iter().cloned().collect();

        let mut updated = 0;
        for name in names {
            if let Some(target) = self.render_targets.get_mut(&name) {
                if target.is_disposed() {
                    continue;
                }
                target.update()?;
                updated += 1;
            }
        }
        Ok(updated)
    }

    /// Get the number of render targets
    pub fn render_target_count(&self) -> usize {
        self.render_targets.len()
    }

    /// Get all render target names, in insertion order
    pub fn render_target_names(&self) -> Vec<&str> {
        self.order.iter().map(|name| name.as_str()).collect()
    }

    /// Dispose and remove all render targets
    pub fn clear(&mut self) {
        let count = self.render_targets.len();
        for name in std::mem::take(&mut self.order) {
            if let Some(mut target) = self.render_targets.remove(&name) {
                if target.is_disposed() {
                    continue;
                }
                if let Err(e) = target.dispose() {
                    engine_warn!(SOURCE, "Failed to dispose RenderTarget '{}': {}", name, e);
                }
            }
        }
        self.render_targets.clear();
        if count > 0 {
            engine_info!(SOURCE, "Cleared {} render targets", count);
        }
    }

    fn ensure_name_free(&self, name: &str) -> Result<()> {
        if self.render_targets.contains_key(name) {
            engine_bail!(SOURCE, InvalidResource, "RenderTarget '{}' already exists", name);
        }
        Ok(())
    }

    fn insert(&mut self, name: &str, target: Box<dyn RenderTarget>) {
        self.render_targets.insert(name.to_string(), target);
        self.order.push(name.to_string());
    }
}

impl Default for TargetManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "target_manager_tests.rs"]
mod tests;
