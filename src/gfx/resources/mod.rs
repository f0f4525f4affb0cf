// src/gfx/resources/mod.rs
//! Handle-based GPU resource management

pub mod gpu;
pub mod handles;

// Re-export main types
pub use gpu::{GpuResources, TextureBundle};
pub use handles::{Handle, ResourceTable};
