//! Error types for the graphics stack
//!
//! Two failure classes exist in this engine: device-level failures that are
//! always fatal to the process (surface lost, adapter/device request failed),
//! and content failures (missing texture, unreadable mesh) that the caller
//! degrades into a fallback asset or a null handle at the call site.

use thiserror::Error;

/// Errors produced by the graphics subsystem
#[derive(Debug, Error)]
pub enum GfxError {
    /// A native device call failed. Always fatal; propagated to the main
    /// loop, logged, then the process shuts down cleanly.
    #[error("device error ({code}): {message}")]
    Device { code: i64, message: String },

    /// The presentation surface could not be created or acquired
    #[error("surface error: {0}")]
    Surface(String),

    /// A mesh file could not be read or parsed. Degradable: callers fall
    /// back to the built-in triangle mesh.
    #[error("failed to load mesh '{path}': {reason}")]
    MeshLoad { path: String, reason: String },

    /// A texture file could not be read or decoded. Degradable: callers
    /// continue with a null texture handle.
    #[error("failed to load texture '{path}': {reason}")]
    TextureLoad { path: String, reason: String },

    /// Texture array layers did not share identical dimensions. The whole
    /// load fails and nothing is registered.
    #[error(
        "texture array dimension mismatch: layer {layer} is {width}x{height}, expected {expected_width}x{expected_height}"
    )]
    TextureDimensionMismatch {
        layer: usize,
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },

    /// A renderer-owned handle (frame uniform buffer, pipeline, bind
    /// group) no longer resolves to a live resource
    #[error("renderer resource '{0}' is not live")]
    MissingFrameBuffer(&'static str),
}

impl From<wgpu::SurfaceError> for GfxError {
    fn from(err: wgpu::SurfaceError) -> Self {
        GfxError::Surface(err.to_string())
    }
}

impl From<wgpu::CreateSurfaceError> for GfxError {
    fn from(err: wgpu::CreateSurfaceError) -> Self {
        GfxError::Surface(err.to_string())
    }
}

impl From<wgpu::RequestAdapterError> for GfxError {
    fn from(err: wgpu::RequestAdapterError) -> Self {
        GfxError::Device {
            code: -1,
            message: err.to_string(),
        }
    }
}

impl From<wgpu::RequestDeviceError> for GfxError {
    fn from(err: wgpu::RequestDeviceError) -> Self {
        GfxError::Device {
            code: -2,
            message: err.to_string(),
        }
    }
}
