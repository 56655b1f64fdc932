/// Render target: a destination for rendered pixels.
///
/// `RenderTarget` is the capability set shared by every target kind
/// (render-to-texture, window-backed, multisample...). Kinds compose a
/// `TargetState` for the generic bookkeeping instead of inheriting it.

use std::fmt;
use std::sync::Arc;
use glam::UVec2;
use crate::error::Result;
use crate::engine_bail_warn;
use super::render_texture::RenderTexture;

// ===== PRIORITY =====

/// Rendering-order hint, ordered by render order (High renders first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum RenderTargetPriority {
    /// Render-to-texture targets whose output is consumed later in the same frame
    High,
    /// Regular scene passes
    #[default]
    Normal,
    /// Presentation and overlays
    Low,
}

// ===== LIFECYCLE =====

/// Lifecycle state of a render target
///
/// Targets become Active at construction; Disposed is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetLifecycle {
    Active,
    Disposed,
}

// ===== LISTENER =====

/// Observer of a render target's updates and disposal
pub trait RenderTargetListener: Send + Sync {
    /// Called before the target is updated
    fn pre_update(&self, _target: &str) {}

    /// Called after the target is updated
    fn post_update(&self, _target: &str) {}

    /// Called once when the target is disposed; the listener is detached afterwards
    fn target_disposed(&self, _target: &str) {}
}

// ===== TRAIT =====

/// Render target trait
///
/// Implemented by every target kind. Width, height and color depth are
/// fixed for the lifetime of a target.
pub trait RenderTarget: Send + Sync {
    /// Target name (unique within a TargetManager)
    fn name(&self) -> &str;

    /// Width in pixels
    fn width(&self) -> u32;

    /// Height in pixels
    fn height(&self) -> u32;

    /// Bits per pixel
    fn color_depth(&self) -> u32;

    /// Rendering-order hint
    fn priority(&self) -> RenderTargetPriority;

    /// Current lifecycle state
    fn lifecycle(&self) -> TargetLifecycle;

    /// Attach a listener
    fn add_listener(&mut self, listener: Arc<dyn RenderTargetListener>) -> Result<()>;

    /// Render one update of this target
    ///
    /// Fails with `AlreadyDisposed` after disposal.
    fn update(&mut self) -> Result<()>;

    /// Number of successful updates
    fn update_count(&self) -> u64;

    /// Release every binding held by this target
    ///
    /// Happens exactly once; a second call fails with `AlreadyDisposed`
    /// and touches nothing.
    fn dispose(&mut self) -> Result<()>;

    /// Whether `dispose` has run
    fn is_disposed(&self) -> bool {
        self.lifecycle() == TargetLifecycle::Disposed
    }

    /// Width and height in pixels
    fn size(&self) -> UVec2 {
        UVec2::new(self.width(), self.height())
    }

    /// Downcast to RenderTexture (returns None for other kinds)
    fn as_render_texture(&self) -> Option<&RenderTexture> { None }
}

// ===== SHARED STATE =====

/// Bookkeeping common to all render target kinds
pub struct TargetState {
    name: String,
    width: u32,
    height: u32,
    color_depth: u32,
    priority: RenderTargetPriority,
    lifecycle: TargetLifecycle,
    listeners: Vec<Arc<dyn RenderTargetListener>>,
    update_count: u64,
}

impl TargetState {
    /// State of a freshly constructed (Active) target
    pub fn new(
        name: impl Into<String>,
        width: u32,
        height: u32,
        color_depth: u32,
        priority: RenderTargetPriority,
    ) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            color_depth,
            priority,
            lifecycle: TargetLifecycle::Active,
            listeners: Vec::new(),
            update_count: 0,
        }
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn width(&self) -> u32 { self.width }
    pub fn height(&self) -> u32 { self.height }
    pub fn color_depth(&self) -> u32 { self.color_depth }
    pub fn priority(&self) -> RenderTargetPriority { self.priority }
    pub fn lifecycle(&self) -> TargetLifecycle { self.lifecycle }
    pub fn update_count(&self) -> u64 { self.update_count }

    pub fn is_disposed(&self) -> bool {
        self.lifecycle == TargetLifecycle::Disposed
    }

    /// Fail with `AlreadyDisposed` once disposed
    pub fn ensure_active(&self) -> Result<()> {
        if self.is_disposed() {
            engine_bail_warn!("galaxy3d::RenderTarget", AlreadyDisposed,
                "render target '{}' is disposed", self.name);
        }
        Ok(())
    }

    /// Number of attached listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn add_listener(&mut self, listener: Arc<dyn RenderTargetListener>) -> Result<()> {
        self.ensure_active()?;
        self.listeners.push(listener);
        Ok(())
    }

    /// Run one update, notifying listeners around `render`
    pub fn update_with<F>(&mut self, render: F) -> Result<()>
    where
        F: FnOnce() -> Result<()>,
    {
        self.ensure_active()?;
        for listener in &self.listeners {
            listener.pre_update(&self.name);
        }
        render()?;
        self.update_count += 1;
        for listener in &self.listeners {
            listener.post_update(&self.name);
        }
        Ok(())
    }

    /// Generic teardown: notify and detach listeners, enter Disposed
    ///
    /// Fails with `AlreadyDisposed` if already disposed.
    pub fn teardown(&mut self) -> Result<()> {
        self.ensure_active()?;
        for listener in self.listeners.drain(..) {
            listener.target_disposed(&self.name);
        }
        self.lifecycle = TargetLifecycle::Disposed;
        Ok(())
    }
}

impl fmt::Debug for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetState")
            .field("name", &self.name)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("color_depth", &self.color_depth)
            .field("priority", &self.priority)
            .field("lifecycle", &self.lifecycle)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "render_target_tests.rs"]
mod tests;
