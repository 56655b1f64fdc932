//! Render target management module
//!
//! Provides render target creation and management.
//! A render target defines where a scene gets rendered to
//! (screen, texture, a slice of a volume texture, etc.).

mod render_target;
mod render_texture;
mod target_manager;

pub use render_target::{
    RenderTarget, RenderTargetListener, RenderTargetPriority, TargetLifecycle, TargetState,
};
pub use render_texture::RenderTexture;
pub use target_manager::TargetManager;
