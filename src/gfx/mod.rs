//! # Graphics Module
//!
//! Everything between the scene description and the screen: the transform
//! and camera math, the scene graph walks, mesh and texture loading, the
//! handle-based GPU resource tables, and the multi-pass renderer.
//!
//! The pieces are deliberately separable. [`transform`], [`camera`],
//! [`light`] and [`scene_graph`] are plain math with no GPU types in their
//! signatures; [`resources`] owns everything device-shaped; [`rendering`]
//! records passes into command lists and executes them.

pub mod camera;
pub mod error;
pub mod light;
pub mod math;
pub mod mesh;
pub mod rendering;
pub mod resources;
pub mod scene_graph;
pub mod texture;
pub mod transform;

// Re-export commonly used types
pub use camera::Camera;
pub use error::GfxError;
pub use light::Light;
pub use rendering::Renderer;
pub use resources::{GpuResources, Handle};
pub use transform::Transform;
