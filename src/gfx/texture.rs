//! Texture data loading
//!
//! Decodes image files into flat RGBA8 byte buffers plus dimension
//! metadata. Texture arrays are stacked from several files; all layers must
//! share identical dimensions or the whole load fails and nothing is
//! registered. GPU upload happens separately in the resource manager.

use std::path::Path;

use crate::gfx::error::GfxError;

/// Decoded RGBA8 pixel data for one texture or texture array
///
/// `depth` is the number of array layers; layer data is packed
/// back-to-back, `width * height * 4` bytes each.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub channels: u32,
    pub data: Vec<u8>,
}

impl TextureData {
    /// Bytes per layer
    pub fn layer_size(&self) -> usize {
        (self.width * self.height * self.channels) as usize
    }
}

/// One decoded layer before stacking
#[derive(Debug, Clone)]
pub struct TextureLayer {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Loads a single texture file as RGBA8
pub fn load_texture<P: AsRef<Path>>(path: P) -> Result<TextureData, GfxError> {
    let layer = load_layer(path.as_ref())?;
    stack_layers(vec![layer])
}

/// Loads several files into one texture array
///
/// Every layer must have the same dimensions; otherwise the whole load
/// fails with [`GfxError::TextureDimensionMismatch`].
pub fn load_texture_array<P: AsRef<Path>>(paths: &[P]) -> Result<TextureData, GfxError> {
    let mut layers = Vec::with_capacity(paths.len());
    for path in paths {
        layers.push(load_layer(path.as_ref())?);
    }
    stack_layers(layers)
}

/// Validates layer dimensions and packs them into one buffer
///
/// Split out from the file loaders so the dimension contract is checkable
/// without touching the filesystem.
pub fn stack_layers(layers: Vec<TextureLayer>) -> Result<TextureData, GfxError> {
    let first = layers.first().ok_or_else(|| GfxError::TextureLoad {
        path: String::new(),
        reason: "texture array has no layers".into(),
    })?;
    let (width, height) = (first.width, first.height);

    for (index, layer) in layers.iter().enumerate() {
        if layer.width != width || layer.height != height {
            return Err(GfxError::TextureDimensionMismatch {
                layer: index,
                width: layer.width,
                height: layer.height,
                expected_width: width,
                expected_height: height,
            });
        }
    }

    let mut data = Vec::with_capacity(layers.len() * (width * height * 4) as usize);
    let depth = layers.len() as u32;
    for layer in layers {
        data.extend_from_slice(&layer.data);
    }

    Ok(TextureData {
        width,
        height,
        depth,
        channels: 4,
        data,
    })
}

fn load_layer(path: &Path) -> Result<TextureLayer, GfxError> {
    let image = image::open(path).map_err(|err| GfxError::TextureLoad {
        path: path.display().to_string(),
        reason: err.to_string(),
    })?;

    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(TextureLayer {
        width,
        height,
        data: rgba.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(width: u32, height: u32) -> TextureLayer {
        TextureLayer {
            width,
            height,
            data: vec![0xff; (width * height * 4) as usize],
        }
    }

    #[test]
    fn test_stack_uniform_layers() {
        let data = stack_layers(vec![layer(4, 4), layer(4, 4), layer(4, 4)]).unwrap();

        assert_eq!(data.width, 4);
        assert_eq!(data.height, 4);
        assert_eq!(data.depth, 3);
        assert_eq!(data.channels, 4);
        assert_eq!(data.data.len(), 3 * data.layer_size());
    }

    #[test]
    fn test_mismatched_layer_dimensions_fail_as_whole() {
        let result = stack_layers(vec![layer(4, 4), layer(8, 4)]);

        match result {
            Err(GfxError::TextureDimensionMismatch {
                layer,
                width,
                expected_width,
                ..
            }) => {
                assert_eq!(layer, 1);
                assert_eq!(width, 8);
                assert_eq!(expected_width, 4);
            }
            other => panic!("expected dimension mismatch, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_empty_layer_list_is_an_error() {
        assert!(stack_layers(Vec::new()).is_err());
    }

    #[test]
    fn test_missing_file_degrades_to_error() {
        let result = load_texture("does/not/exist.png");
        assert!(matches!(result, Err(GfxError::TextureLoad { .. })));
    }
}
