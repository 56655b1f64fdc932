/// Tests for TargetManager
///
/// These tests validate render target creation, retrieval, removal,
/// naming, update ordering and disposal on teardown.

use std::sync::{Arc, Mutex};
use crate::error::Error;
use crate::graphics_device::PixelFormat;
use crate::graphics_device::mock_graphics_device::MockPixelSurface;
use super::*;
use super::super::render_target::{
    RenderTargetListener, RenderTargetPriority, TargetLifecycle, TargetState,
};

// ============================================================================
// Test helpers
// ============================================================================

fn surface(slices: u32) -> Arc<MockPixelSurface> {
    Arc::new(MockPixelSurface::new(64, 64, slices, PixelFormat::R8G8B8A8_UNORM))
}

fn dyn_surface(surface: &Arc<MockPixelSurface>) -> Arc<dyn PixelSurface> {
    surface.clone()
}

/// Window-backed target stand-in with a configurable priority
struct WindowTarget {
    state: TargetState,
}

impl WindowTarget {
    fn boxed(name: &str, priority: RenderTargetPriority) -> Box<dyn RenderTarget> {
        Box::new(Self { state: TargetState::new(name, 800, 600, 32, priority) })
    }
}

impl RenderTarget for WindowTarget {
    fn name(&self) -> &str { self.state.name() }
    fn width(&self) -> u32 { self.state.width() }
    fn height(&self) -> u32 { self.state.height() }
    fn color_depth(&self) -> u32 { self.state.color_depth() }
    fn priority(&self) -> RenderTargetPriority { self.state.priority() }
    fn lifecycle(&self) -> TargetLifecycle { self.state.lifecycle() }

    fn add_listener(&mut self, listener: Arc<dyn RenderTargetListener>) -> Result<()> {
        self.state.add_listener(listener)
    }

    fn update(&mut self) -> Result<()> {
        self.state.update_with(|| Ok(()))
    }

    fn update_count(&self) -> u64 { self.state.update_count() }

    fn dispose(&mut self) -> Result<()> {
        self.state.teardown()
    }
}

/// Records pre_update calls across several targets
#[derive(Default)]
struct UpdateOrder {
    names: Mutex<Vec<String>>,
}

impl RenderTargetListener for UpdateOrder {
    fn pre_update(&self, target: &str) {
        self.names.lock().unwrap().push(target.to_string());
    }
}

// ============================================================================
// Tests: TargetManager Creation
// ============================================================================

#[test]
fn test_target_manager_new() {
    let tm = TargetManager::new();
    assert_eq!(tm.render_target_count(), 0);
}

// ============================================================================
// Tests: Create RenderTexture
// ============================================================================

#[test]
fn test_create_render_texture() {
    let s = surface(1);
    let mut tm = TargetManager::new();

    let rt = tm.create_render_texture("reflection", dyn_surface(&s), 0).unwrap();
    assert_eq!(rt.name(), "reflection");
    assert_eq!(rt.z_offset(), 0);
    assert_eq!(tm.render_target_count(), 1);
    assert!(s.is_render_target_bound(0));
}

#[test]
fn test_create_render_textures_on_volume_slices() {
    let s = surface(3);
    let mut tm = TargetManager::new();
    tm.create_render_texture("slice0", dyn_surface(&s), 0).unwrap();
    tm.create_render_texture("slice1", dyn_surface(&s), 1).unwrap();
    tm.create_render_texture("slice2", dyn_surface(&s), 2).unwrap();

    assert_eq!(tm.render_target_count(), 3);
    assert_eq!(s.bound.lock().unwrap().len(), 3);
}

#[test]
fn test_create_render_texture_duplicate_name_fails() {
    let s = surface(2);
    let mut tm = TargetManager::new();
    tm.create_render_texture("reflection", dyn_surface(&s), 0).unwrap();

    let result = tm.create_render_texture("reflection", dyn_surface(&s), 1);
    assert!(matches!(result, Err(Error::InvalidResource(_))));
    assert_eq!(tm.render_target_count(), 1);
    // The rejected texture never bound its slice
    assert!(!s.is_render_target_bound(1));
}

#[test]
fn test_create_render_texture_invalid_slice_fails() {
    let s = surface(1);
    let mut tm = TargetManager::new();

    let result = tm.create_render_texture("reflection", dyn_surface(&s), 5);
    assert!(matches!(result, Err(Error::OutOfRange(_))));
    assert_eq!(tm.render_target_count(), 0);
}

#[test]
fn test_add_render_target_of_other_kind() {
    let mut tm = TargetManager::new();
    tm.add_render_target("window", WindowTarget::boxed("window", RenderTargetPriority::Low)).unwrap();

    let target = tm.render_target("window").unwrap();
    assert_eq!(target.size(), glam::UVec2::new(800, 600));
    assert!(target.as_render_texture().is_none());
}

#[test]
fn test_add_disposed_render_target_fails() {
    let mut tm = TargetManager::new();
    let mut target = WindowTarget::boxed("window", RenderTargetPriority::Low);
    target.dispose().unwrap();

    let result = tm.add_render_target("window", target);
    assert!(matches!(result, Err(Error::InvalidResource(_))));
}

// ============================================================================
// Tests: Get RenderTarget
// ============================================================================

#[test]
fn test_render_target_found() {
    let s = surface(1);
    let mut tm = TargetManager::new();
    tm.create_render_texture("reflection", dyn_surface(&s), 0).unwrap();

    assert!(tm.render_target("reflection").is_some());
}

#[test]
fn test_render_target_not_found() {
    let tm = TargetManager::new();
    assert!(tm.render_target("nonexistent").is_none());
}

#[test]
fn test_render_target_mut_can_dispose() {
    let s = surface(1);
    let mut tm = TargetManager::new();
    tm.create_render_texture("reflection", dyn_surface(&s), 0).unwrap();

    tm.render_target_mut("reflection").unwrap().dispose().unwrap();

    assert!(tm.render_target("reflection").unwrap().is_disposed());
    assert!(!s.is_render_target_bound(0));
}

#[test]
fn test_render_target_mut_not_found() {
    let mut tm = TargetManager::new();
    assert!(tm.render_target_mut("nonexistent").is_none());
}

// ============================================================================
// Tests: Remove RenderTarget
// ============================================================================

#[test]
fn test_remove_render_target_disposes() {
    let s = surface(1);
    let mut tm = TargetManager::new();
    tm.create_render_texture("reflection", dyn_surface(&s), 0).unwrap();

    tm.remove_render_target("reflection").unwrap();

    assert_eq!(tm.render_target_count(), 0);
    assert!(!s.is_render_target_bound(0));
    assert_eq!(s.cleared_slices(), vec![0]);
}

#[test]
fn test_remove_render_target_not_found() {
    let mut tm = TargetManager::new();
    let result = tm.remove_render_target("nonexistent");
    assert!(matches!(result, Err(Error::InvalidResource(_))));
}

#[test]
fn test_remove_already_disposed_target_clears_once() {
    let s = surface(1);
    let mut tm = TargetManager::new();
    tm.create_render_texture("reflection", dyn_surface(&s), 0).unwrap();
    tm.render_target_mut("reflection").unwrap().dispose().unwrap();

    tm.remove_render_target("reflection").unwrap();

    assert_eq!(s.cleared_slices(), vec![0]);
}

#[test]
fn test_remove_render_target_does_not_affect_others() {
    let s = surface(2);
    let mut tm = TargetManager::new();
    tm.create_render_texture("slice0", dyn_surface(&s), 0).unwrap();
    tm.create_render_texture("slice1", dyn_surface(&s), 1).unwrap();

    tm.remove_render_target("slice0").unwrap();

    assert!(tm.render_target("slice0").is_none());
    assert!(tm.render_target("slice1").is_some());
    assert!(s.is_render_target_bound(1));
    assert_eq!(tm.render_target_names(), vec!["slice1"]);
}

#[test]
fn test_remove_and_recreate_render_texture() {
    let s = surface(1);
    let mut tm = TargetManager::new();
    tm.create_render_texture("reflection", dyn_surface(&s), 0).unwrap();
    tm.remove_render_target("reflection").unwrap();

    let result = tm.create_render_texture("reflection", dyn_surface(&s), 0);
    assert!(result.is_ok());
    assert_eq!(tm.render_target_count(), 1);
}

// ============================================================================
// Tests: Update ordering
// ============================================================================

#[test]
fn test_update_all_runs_high_priority_first() {
    let s = surface(2);
    let order = Arc::new(UpdateOrder::default());
    let mut tm = TargetManager::new();

    tm.add_render_target("window", WindowTarget::boxed("window", RenderTargetPriority::Low)).unwrap();
    tm.add_render_target("scene", WindowTarget::boxed("scene", RenderTargetPriority::Normal)).unwrap();
    tm.create_render_texture("shadow", dyn_surface(&s), 0).unwrap();
    tm.create_render_texture("reflection", dyn_surface(&s), 1).unwrap();
    for name in ["window", "scene", "shadow", "reflection"] {
        tm.render_target_mut(name).unwrap().add_listener(order.clone()).unwrap();
    }

    let updated = tm.update_all().unwrap();

    assert_eq!(updated, 4);
    assert_eq!(*order.names.lock().unwrap(), vec!["shadow", "reflection", "scene", "window"]);
}

#[test]
fn test_update_all_skips_disposed_targets() {
    let s = surface(2);
    let mut tm = TargetManager::new();
    tm.create_render_texture("a", dyn_surface(&s), 0).unwrap();
    tm.create_render_texture("b", dyn_surface(&s), 1).unwrap();
    tm.render_target_mut("a").unwrap().dispose().unwrap();

    assert_eq!(tm.update_all().unwrap(), 1);
    assert_eq!(tm.render_target("a").unwrap().update_count(), 0);
    assert_eq!(tm.render_target("b").unwrap().update_count(), 1);
}

// ============================================================================
// Tests: RenderTarget Names
// ============================================================================

#[test]
fn test_render_target_names_empty() {
    let tm = TargetManager::new();
    assert!(tm.render_target_names().is_empty());
}

#[test]
fn test_render_target_names_in_insertion_order() {
    let s = surface(3);
    let mut tm = TargetManager::new();
    tm.create_render_texture("shadow_map", dyn_surface(&s), 0).unwrap();
    tm.add_render_target("screen", WindowTarget::boxed("screen", RenderTargetPriority::Low)).unwrap();
    tm.create_render_texture("post_process", dyn_surface(&s), 1).unwrap();

    assert_eq!(tm.render_target_names(), vec!["shadow_map", "screen", "post_process"]);
}

// ============================================================================
// Tests: Clear
// ============================================================================

#[test]
fn test_clear_disposes_all() {
    let s = surface(2);
    let mut tm = TargetManager::new();
    tm.create_render_texture("a", dyn_surface(&s), 0).unwrap();
    tm.create_render_texture("b", dyn_surface(&s), 1).unwrap();

    tm.clear();

    assert_eq!(tm.render_target_count(), 0);
    assert!(tm.render_target_names().is_empty());
    assert!(s.bound.lock().unwrap().is_empty());
    let mut cleared = s.cleared_slices();
    cleared.sort();
    assert_eq!(cleared, vec![0, 1]);
}

#[test]
fn test_clear_then_create() {
    let s = surface(1);
    let mut tm = TargetManager::new();
    tm.create_render_texture("reflection", dyn_surface(&s), 0).unwrap();
    tm.clear();

    let result = tm.create_render_texture("reflection", dyn_surface(&s), 0);
    assert!(result.is_ok());
    assert_eq!(tm.render_target_count(), 1);
}

// ============================================================================
// Tests: RenderTarget Count
// ============================================================================

#[test]
fn test_render_target_count_tracks_correctly() {
    let s = surface(2);
    let mut tm = TargetManager::new();
    assert_eq!(tm.render_target_count(), 0);

    tm.create_render_texture("a", dyn_surface(&s), 0).unwrap();
    assert_eq!(tm.render_target_count(), 1);

    tm.create_render_texture("b", dyn_surface(&s), 1).unwrap();
    assert_eq!(tm.render_target_count(), 2);

    tm.remove_render_target("a").unwrap();
    assert_eq!(tm.render_target_count(), 1);

    tm.remove_render_target("b").unwrap();
    assert_eq!(tm.render_target_count(), 0);
}

// ============================================================================
// Tests: Error Messages
// ============================================================================

#[test]
fn test_create_render_texture_duplicate_error_message() {
    let s = surface(2);
    let mut tm = TargetManager::new();
    tm.create_render_texture("reflection", dyn_surface(&s), 0).unwrap();

    let result = tm.create_render_texture("reflection", dyn_surface(&s), 1);
    match result {
        Err(Error::InvalidResource(msg)) => {
            assert!(msg.contains("already exists"));
        }
        _ => panic!("Expected InvalidResource with 'already exists'"),
    }
}
