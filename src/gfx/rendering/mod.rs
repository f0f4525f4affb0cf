// src/gfx/rendering/mod.rs
//! Frame recording and the wgpu renderer

pub mod frame;
pub mod renderer;
pub mod vertex;

// Re-export main types
pub use frame::{FrameCommands, PassKind, RenderObject, RenderScene};
pub use renderer::{PassTarget, Renderer};
pub use vertex::Vertex3D;
