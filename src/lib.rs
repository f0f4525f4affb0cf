// src/lib.rs
//! Shadowbox
//!
//! A small real-time 3D rendering demo built on wgpu and winit: a
//! hierarchical scene graph, handle-based GPU resource tables, and a
//! multi-pass renderer drawing point-light shadow cubes before the main
//! color pass.

pub mod app;
pub mod engine;
pub mod gfx;
pub mod input;
pub mod timer;

// Re-export main types for convenience
pub use app::ShadowboxApp;
pub use engine::{Engine, SceneObject};

/// Creates a default application instance
pub fn default() -> ShadowboxApp {
    ShadowboxApp::new()
}
