//! Per-frame render DTOs and command recording
//!
//! The engine hands the renderer a [`RenderScene`]: draw entries referencing
//! GPU resources by handle, plus callbacks that fill the uniform structs at
//! well-defined points of the pass. Recording turns a scene into
//! [`FrameCommands`], an ordered list of uniform writes and indexed draws.
//! The ordering contract: the camera write comes first, then (for the main
//! pass) one write per light and the display-mode write, then each draw
//! entry is immediately preceded by exactly one object uniform write.
//!
//! Recording is pure bookkeeping with no device access, so the pass
//! structure is unit-testable without a GPU; execution against wgpu happens
//! in the renderer.

use bytemuck::Zeroable;

use crate::gfx::resources::handles::Handle;

/// Maximum number of lights the light uniform buffer can hold
pub const MAX_LIGHTS: usize = 4;

/// Byte stride between per-object uniform slots
///
/// Matches wgpu's guaranteed `min_uniform_buffer_offset_alignment` so each
/// draw can bind its slot with a dynamic offset.
pub const OBJECT_UNIFORM_STRIDE: u64 = 256;

/// Which render pass a scene is recorded for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Color + depth to the presentation surface
    Main,
    /// Depth only, into one shadow-cube face
    ShadowMap,
}

/// Camera matrices as uploaded to the shaders
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

/// Per-object world matrix
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub world: [[f32; 4]; 4],
}

/// One light's slot in the light uniform buffer
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub camera_position: [f32; 4],
    pub light_position: [f32; 4],
}

/// Frame-global flags for the main pass
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct OtherUniform {
    pub display_mode: u32,
    pub _padding: [u32; 3],
}

/// One draw entry produced by the render walk
///
/// A null texture bind group is legal; the renderer substitutes the default
/// white texture. Null geometry or pipeline handles make the entry skip.
#[derive(Debug, Clone, Copy)]
pub struct RenderObject {
    pub object_id: u64,
    pub vertex_buffer: Handle<wgpu::Buffer>,
    pub index_buffer: Handle<wgpu::Buffer>,
    pub pipeline: Handle<wgpu::RenderPipeline>,
    pub texture_bind_group: Handle<wgpu::BindGroup>,
    pub index_count: u32,
}

impl RenderObject {
    /// True when any handle required for drawing is the null handle
    pub fn has_null_requirements(&self) -> bool {
        self.vertex_buffer.is_null() || self.index_buffer.is_null() || self.pipeline.is_null()
    }
}

/// Everything the renderer needs for one pass over the scene
///
/// The callbacks fill uniform data on demand and return `false` to skip the
/// corresponding write (and, for objects, the draw).
pub struct RenderScene<'a> {
    pub camera_buffer: Handle<wgpu::Buffer>,
    pub object_buffer: Handle<wgpu::Buffer>,
    pub light_buffer: Handle<wgpu::Buffer>,
    pub other_buffer: Handle<wgpu::Buffer>,

    pub camera_update: Box<dyn FnMut(&mut CameraUniform) -> bool + 'a>,
    pub object_update: Box<dyn FnMut(&mut ObjectUniform, u64) -> bool + 'a>,
    pub light_update: Box<dyn FnMut(&mut LightUniform, u64) -> bool + 'a>,

    pub objects: Vec<RenderObject>,
    pub lights: Vec<u64>,
    pub display_mode: u32,
}

/// One recorded command
#[derive(Debug, Clone)]
pub enum Command {
    /// Upload `data` into `buffer` at `offset`
    WriteUniform {
        buffer: Handle<wgpu::Buffer>,
        offset: u64,
        data: Vec<u8>,
    },
    /// Indexed draw of one entry; `object_offset` is the dynamic offset of
    /// the object uniform slot written immediately before this command
    DrawIndexed {
        entry: RenderObject,
        object_offset: u64,
    },
}

/// Ordered command list for one pass
#[derive(Debug, Default)]
pub struct FrameCommands {
    pub commands: Vec<Command>,
}

impl FrameCommands {
    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::DrawIndexed { .. }))
            .count()
    }
}

/// Records one pass over a scene into a command list
///
/// `is_live` resolves whether a draw entry's handles refer to live
/// resources; entries with null or dead handles are skipped without
/// disturbing the write/draw pairing of the remaining entries.
pub fn record_pass<F>(pass: PassKind, scene: &mut RenderScene<'_>, is_live: F) -> FrameCommands
where
    F: Fn(&RenderObject) -> bool,
{
    let mut frame = FrameCommands::default();

    let mut camera = CameraUniform::zeroed();
    if (scene.camera_update)(&mut camera) {
        frame.commands.push(Command::WriteUniform {
            buffer: scene.camera_buffer,
            offset: 0,
            data: bytemuck::bytes_of(&camera).to_vec(),
        });
    }

    if pass == PassKind::Main {
        for (slot, light_id) in scene.lights.iter().take(MAX_LIGHTS).enumerate() {
            let mut light = LightUniform::zeroed();
            if (scene.light_update)(&mut light, *light_id) {
                frame.commands.push(Command::WriteUniform {
                    buffer: scene.light_buffer,
                    offset: (slot * std::mem::size_of::<LightUniform>()) as u64,
                    data: bytemuck::bytes_of(&light).to_vec(),
                });
            }
        }

        let other = OtherUniform {
            display_mode: scene.display_mode,
            _padding: [0; 3],
        };
        frame.commands.push(Command::WriteUniform {
            buffer: scene.other_buffer,
            offset: 0,
            data: bytemuck::bytes_of(&other).to_vec(),
        });
    }

    let mut draw_slot: u64 = 0;
    for entry in &scene.objects {
        if entry.has_null_requirements() || !is_live(entry) {
            continue;
        }

        let mut object = ObjectUniform::zeroed();
        if !(scene.object_update)(&mut object, entry.object_id) {
            continue;
        }

        let object_offset = draw_slot * OBJECT_UNIFORM_STRIDE;
        frame.commands.push(Command::WriteUniform {
            buffer: scene.object_buffer,
            offset: object_offset,
            data: bytemuck::bytes_of(&object).to_vec(),
        });
        frame.commands.push(Command::DrawIndexed {
            entry: *entry,
            object_offset,
        });
        draw_slot += 1;
    }

    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(object_id: u64) -> RenderObject {
        RenderObject {
            object_id,
            vertex_buffer: Handle::from_raw(object_id + 100),
            index_buffer: Handle::from_raw(object_id + 200),
            pipeline: Handle::from_raw(object_id + 300),
            texture_bind_group: Handle::NULL,
            index_count: 3,
        }
    }

    fn scene(objects: Vec<RenderObject>, lights: Vec<u64>) -> RenderScene<'static> {
        RenderScene {
            camera_buffer: Handle::from_raw(1),
            object_buffer: Handle::from_raw(2),
            light_buffer: Handle::from_raw(3),
            other_buffer: Handle::from_raw(4),
            camera_update: Box::new(|_camera| true),
            object_update: Box::new(|_object, _id| true),
            light_update: Box::new(|_light, _id| true),
            objects,
            lights,
            display_mode: 0,
        }
    }

    #[test]
    fn test_each_draw_preceded_by_one_object_write() {
        let mut scene = scene(vec![entry(1), entry(2), entry(3)], vec![]);
        let frame = record_pass(PassKind::Main, &mut scene, |_| true);

        assert_eq!(frame.draw_count(), 3);
        for (index, command) in frame.commands.iter().enumerate() {
            if let Command::DrawIndexed { object_offset, .. } = command {
                match &frame.commands[index - 1] {
                    Command::WriteUniform { buffer, offset, .. } => {
                        assert_eq!(*buffer, scene.object_buffer);
                        assert_eq!(offset, object_offset);
                    }
                    other => panic!("draw not preceded by object write: {:?}", other),
                }
            }
        }
    }

    #[test]
    fn test_object_slots_use_aligned_offsets() {
        let mut scene = scene(vec![entry(1), entry(2)], vec![]);
        let frame = record_pass(PassKind::Main, &mut scene, |_| true);

        let offsets: Vec<u64> = frame
            .commands
            .iter()
            .filter_map(|c| match c {
                Command::DrawIndexed { object_offset, .. } => Some(*object_offset),
                _ => None,
            })
            .collect();
        assert_eq!(offsets, vec![0, OBJECT_UNIFORM_STRIDE]);
    }

    #[test]
    fn test_camera_write_comes_first() {
        let mut scene = scene(vec![entry(1)], vec![7]);
        let frame = record_pass(PassKind::Main, &mut scene, |_| true);

        match &frame.commands[0] {
            Command::WriteUniform { buffer, offset, .. } => {
                assert_eq!(*buffer, scene.camera_buffer);
                assert_eq!(*offset, 0);
            }
            other => panic!("first command is not the camera write: {:?}", other),
        }
    }

    #[test]
    fn test_main_pass_writes_lights_and_other() {
        let mut scene = scene(vec![], vec![7, 8]);
        let frame = record_pass(PassKind::Main, &mut scene, |_| true);

        let light_writes: Vec<u64> = frame
            .commands
            .iter()
            .filter_map(|c| match c {
                Command::WriteUniform { buffer, offset, .. }
                    if *buffer == scene.light_buffer =>
                {
                    Some(*offset)
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            light_writes,
            vec![0, std::mem::size_of::<LightUniform>() as u64]
        );

        assert!(frame.commands.iter().any(|c| matches!(
            c,
            Command::WriteUniform { buffer, .. } if *buffer == scene.other_buffer
        )));
    }

    #[test]
    fn test_shadow_pass_skips_lights_and_other() {
        let mut scene = scene(vec![entry(1)], vec![7, 8]);
        let frame = record_pass(PassKind::ShadowMap, &mut scene, |_| true);

        for command in &frame.commands {
            if let Command::WriteUniform { buffer, .. } = command {
                assert_ne!(*buffer, scene.light_buffer);
                assert_ne!(*buffer, scene.other_buffer);
            }
        }
    }

    #[test]
    fn test_null_and_dead_entries_are_skipped() {
        let mut dead = entry(2);
        dead.vertex_buffer = Handle::NULL;

        let mut scene = scene(vec![entry(1), dead, entry(3)], vec![]);
        // Entry 3 resolves to a dead table slot.
        let frame = record_pass(PassKind::Main, &mut scene, |e| e.object_id != 3);

        assert_eq!(frame.draw_count(), 1);
        let drawn: Vec<u64> = frame
            .commands
            .iter()
            .filter_map(|c| match c {
                Command::DrawIndexed { entry, .. } => Some(entry.object_id),
                _ => None,
            })
            .collect();
        assert_eq!(drawn, vec![1]);
    }

    #[test]
    fn test_light_list_is_capped_at_max_lights() {
        let mut scene = scene(vec![], vec![1, 2, 3, 4, 5, 6]);
        let frame = record_pass(PassKind::Main, &mut scene, |_| true);

        let light_writes = frame
            .commands
            .iter()
            .filter(|c| matches!(
                c,
                Command::WriteUniform { buffer, .. } if *buffer == scene.light_buffer
            ))
            .count();
        assert_eq!(light_writes, MAX_LIGHTS);
    }

    #[test]
    fn test_object_callback_false_skips_draw() {
        let mut scene = scene(vec![entry(1), entry(2)], vec![]);
        scene.object_update = Box::new(|_object, id| id != 2);

        let frame = record_pass(PassKind::Main, &mut scene, |_| true);
        assert_eq!(frame.draw_count(), 1);
    }
}
