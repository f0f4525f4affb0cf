// src/engine.rs
//! Scene ownership and per-frame orchestration
//!
//! The [`Engine`] owns the node tree, the objects behind the node ids, the
//! lights and the camera. Each frame it applies input to the camera, runs
//! the frame hook, then runs the update walk so every object caches its
//! composed world matrix.
//!
//! It also constructs the per-pass [`RenderScene`]s: one per shadow-cube
//! face per light, then one for the main color pass. The scenes carry
//! closures over the cached matrices, so scene construction itself touches
//! no GPU state.

use std::collections::HashMap;

use cgmath::{Matrix4, SquareMatrix};
use log::warn;

use crate::gfx::camera::{Camera, CameraProperties};
use crate::gfx::light::{Light, SHADOW_CUBE_FACES};
use crate::gfx::math;
use crate::gfx::mesh::GpuMesh;
use crate::gfx::rendering::frame::{
    LightUniform, ObjectUniform, RenderObject, RenderScene, MAX_LIGHTS,
};
use crate::gfx::rendering::renderer::FrameBuffers;
use crate::gfx::resources::handles::Handle;
use crate::gfx::scene_graph::{self, Node, STRUCTURAL_ID};
use crate::gfx::transform::Transform;
use crate::input::{InputState, KeyCode};
use crate::timer;

/// Camera translation speed in units per second
const MOVE_SPEED: f32 = 4.0;
/// Camera rotation speed in degrees per second
const TURN_SPEED: f32 = 60.0;

/// One drawable entity: a transform plus the GPU handles its draw entry
/// will reference
pub struct SceneObject {
    pub transform: Transform,
    pub mesh: GpuMesh,
    pub pipeline: Handle<wgpu::RenderPipeline>,
    pub texture_bind_group: Handle<wgpu::BindGroup>,
    composed: Matrix4<f32>,
}

impl SceneObject {
    pub fn new(mesh: GpuMesh, pipeline: Handle<wgpu::RenderPipeline>) -> Self {
        Self {
            transform: Transform::new(),
            mesh,
            pipeline,
            texture_bind_group: Handle::NULL,
            composed: Matrix4::identity(),
        }
    }

    pub fn composed_world_matrix(&self) -> Matrix4<f32> {
        self.composed
    }
}

/// Per-frame mutation hook, handed the timer state and the object map
pub type FrameHook = Box<dyn FnMut(timer::State, &mut HashMap<u64, SceneObject>)>;

pub struct Engine {
    root: Node,
    objects: HashMap<u64, SceneObject>,
    lights: Vec<Light>,
    camera: Camera,
    display_mode: u32,
    next_id: u64,
    frame_hook: Option<FrameHook>,
}

impl Engine {
    pub fn new(camera_properties: CameraProperties) -> Self {
        let mut camera = Camera::new(camera_properties);
        camera.initialize();
        Self {
            root: Node::new(STRUCTURAL_ID),
            objects: HashMap::new(),
            lights: Vec::new(),
            camera,
            display_mode: 0,
            next_id: 1,
            frame_hook: None,
        }
    }

    /// Registers an object and returns the id to hang into the node tree
    pub fn register(&mut self, object: SceneObject) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.objects.insert(id, object);
        id
    }

    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    pub fn object_mut(&mut self, id: u64) -> Option<&mut SceneObject> {
        self.objects.get_mut(&id)
    }

    pub fn transform_mut(&mut self, id: u64) -> Option<&mut Transform> {
        self.objects.get_mut(&id).map(|o| &mut o.transform)
    }

    /// Adds a light; slots beyond the uniform buffer capacity are dropped
    pub fn add_light(&mut self, light: Light) -> Option<usize> {
        if self.lights.len() >= MAX_LIGHTS {
            warn!("light limit of {} reached, ignoring light", MAX_LIGHTS);
            return None;
        }
        self.lights.push(light);
        Some(self.lights.len() - 1)
    }

    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    pub fn light_mut(&mut self, slot: usize) -> Option<&mut Light> {
        self.lights.get_mut(slot)
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn display_mode(&self) -> u32 {
        self.display_mode
    }

    pub fn set_frame_hook(&mut self, hook: FrameHook) {
        self.frame_hook = Some(hook);
    }

    /// One simulation step: input, frame hook, then the update walk
    pub fn update(&mut self, timer: timer::State, input: &InputState) {
        self.apply_input(timer, input);

        if let Some(hook) = self.frame_hook.as_mut() {
            hook(timer, &mut self.objects);
        }

        let objects = &mut self.objects;
        scene_graph::update_walk(&self.root, Matrix4::identity(), |id, parent| {
            match objects.get_mut(&id) {
                Some(object) => {
                    object.composed = object.transform.world_matrix(parent);
                    object.composed
                }
                None => parent,
            }
        });
    }

    fn apply_input(&mut self, timer: timer::State, input: &InputState) {
        let step = MOVE_SPEED * timer.elapsed;
        let turn = TURN_SPEED * timer.elapsed;
        let transform = self.camera.transform_mut();

        if input.is_pressed(KeyCode::W) {
            transform.translate_directional_by(step);
        }
        if input.is_pressed(KeyCode::S) {
            transform.translate_directional_by(-step);
        }
        if input.is_pressed(KeyCode::D) {
            transform.translate_lateral_by(step);
        }
        if input.is_pressed(KeyCode::A) {
            transform.translate_lateral_by(-step);
        }
        if input.is_pressed(KeyCode::E) {
            transform.translate_vertical_by(step);
        }
        if input.is_pressed(KeyCode::Q) {
            transform.translate_vertical_by(-step);
        }
        if input.is_pressed(KeyCode::Right) {
            transform.rotate_y_by(turn);
        }
        if input.is_pressed(KeyCode::Left) {
            transform.rotate_y_by(-turn);
        }
        if input.is_pressed(KeyCode::Up) {
            transform.pitch_by(-turn);
        }
        if input.is_pressed(KeyCode::Down) {
            transform.pitch_by(turn);
        }
        self.camera.update();

        if input.is_pressed(KeyCode::Zero) {
            self.display_mode = 0;
        }
        if input.is_pressed(KeyCode::One) {
            self.display_mode = 1;
        }
        if input.is_pressed(KeyCode::Two) {
            self.display_mode = 2;
        }
    }

    /// Flattens the node tree into draw entries, post-order
    fn draw_entries(&self) -> Vec<RenderObject> {
        let mut entries = Vec::with_capacity(self.objects.len());
        scene_graph::render_walk(&self.root, |id| {
            if let Some(object) = self.objects.get(&id) {
                entries.push(RenderObject {
                    object_id: id,
                    vertex_buffer: object.mesh.vertex_buffer,
                    index_buffer: object.mesh.index_buffer,
                    pipeline: object.pipeline,
                    texture_bind_group: object.texture_bind_group,
                    index_count: object.mesh.index_count,
                });
            }
        });
        entries
    }

    fn object_update_callback(&self) -> impl FnMut(&mut ObjectUniform, u64) -> bool + '_ {
        let objects = &self.objects;
        move |uniform, id| match objects.get(&id) {
            Some(object) => {
                uniform.world = math::matrix_to_array(object.composed);
                true
            }
            None => false,
        }
    }

    /// Scene for one shadow-cube face of one light
    ///
    /// Returns `None` when the slot holds no light, so the caller can loop
    /// over the full slot range without bookkeeping.
    pub fn shadow_scene(&self, light_slot: usize, face: usize, buffers: FrameBuffers) -> Option<RenderScene<'_>> {
        debug_assert!(face < SHADOW_CUBE_FACES);
        let light = self.lights.get(light_slot)?;
        let view = math::matrix_to_array(light.view_matrix(face));
        let projection = math::matrix_to_array(light.projection_matrix(face));

        Some(RenderScene {
            camera_buffer: buffers.camera,
            object_buffer: buffers.object,
            light_buffer: buffers.light,
            other_buffer: buffers.other,
            camera_update: Box::new(move |camera| {
                camera.view = view;
                camera.projection = projection;
                true
            }),
            object_update: Box::new(self.object_update_callback()),
            light_update: Box::new(|_, _| false),
            objects: self.draw_entries(),
            lights: Vec::new(),
            display_mode: self.display_mode,
        })
    }

    /// Scene for the main color pass
    pub fn main_scene(&self, buffers: FrameBuffers) -> RenderScene<'_> {
        let view = math::matrix_to_array(self.camera.view_matrix());
        let projection = math::matrix_to_array(self.camera.projection_matrix());
        let eye = self.camera.transform().translation();
        let lights = &self.lights;

        RenderScene {
            camera_buffer: buffers.camera,
            object_buffer: buffers.object,
            light_buffer: buffers.light,
            other_buffer: buffers.other,
            camera_update: Box::new(move |camera| {
                camera.view = view;
                camera.projection = projection;
                true
            }),
            object_update: Box::new(self.object_update_callback()),
            light_update: Box::new(move |uniform: &mut LightUniform, slot| {
                let Some(light) = lights.get(slot as usize) else {
                    return false;
                };
                let position = light.transform().translation();
                uniform.camera_position = [eye.x, eye.y, eye.z, 1.0];
                uniform.light_position =
                    [position.x, position.y, position.z, light.falloff_distance()];
                true
            }),
            objects: self.draw_entries(),
            lights: (0..self.lights.len() as u64).collect(),
            display_mode: self.display_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::light::LightProperties;
    use crate::gfx::rendering::frame::{self, CameraUniform, ObjectUniform, PassKind};
    use bytemuck::Zeroable;
    use cgmath::Matrix;

    fn test_mesh(seed: u64) -> GpuMesh {
        GpuMesh {
            vertex_buffer: Handle::from_raw(seed + 100),
            index_buffer: Handle::from_raw(seed + 200),
            index_count: 3,
        }
    }

    fn test_buffers() -> FrameBuffers {
        FrameBuffers {
            camera: Handle::from_raw(1),
            object: Handle::from_raw(2),
            light: Handle::from_raw(3),
            other: Handle::from_raw(4),
        }
    }

    fn test_engine() -> Engine {
        Engine::new(CameraProperties::default())
    }

    #[test]
    fn test_update_walk_caches_composed_matrices() {
        let mut engine = test_engine();
        let parent = engine.register(SceneObject::new(test_mesh(1), Handle::from_raw(9)));
        let child = engine.register(SceneObject::new(test_mesh(2), Handle::from_raw(9)));

        let mut parent_node = Node::new(parent);
        parent_node.add_child(Node::new(child));
        engine.root_mut().add_child(parent_node);

        engine
            .transform_mut(parent)
            .unwrap()
            .set_translation(1.0, 0.0, 0.0);
        engine
            .transform_mut(child)
            .unwrap()
            .set_translation(0.0, 2.0, 0.0);

        engine.update(timer::State::default(), &InputState::new());

        let expected = engine.objects[&child].transform.composed_world_matrix();
        assert_eq!(engine.objects[&child].composed, expected);
        // The child picks up the parent's translation.
        let world = engine.objects[&child].composed;
        let position = world.transpose() * cgmath::Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!((position.x - 1.0).abs() < 1e-5);
        assert!((position.y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_main_scene_issues_one_draw_per_object() {
        let mut engine = test_engine();
        for _ in 0..3 {
            let id = engine.register(SceneObject::new(test_mesh(7), Handle::from_raw(9)));
            engine.root_mut().add_child(Node::new(id));
        }
        engine.update(timer::State::default(), &InputState::new());

        let mut scene = engine.main_scene(test_buffers());
        let commands = frame::record_pass(PassKind::Main, &mut scene, |_| true);
        assert_eq!(commands.draw_count(), 3);
    }

    #[test]
    fn test_object_callback_reports_cached_world_matrix() {
        let mut engine = test_engine();
        let id = engine.register(SceneObject::new(test_mesh(1), Handle::from_raw(9)));
        engine.root_mut().add_child(Node::new(id));
        engine
            .transform_mut(id)
            .unwrap()
            .set_translation(3.0, 0.0, 0.0);
        engine.update(timer::State::default(), &InputState::new());

        let scene = engine.main_scene(test_buffers());
        let mut object_update = scene.object_update;
        let mut uniform = ObjectUniform::zeroed();
        assert!(object_update(&mut uniform, id));
        assert_eq!(
            uniform.world,
            math::matrix_to_array(engine.objects[&id].composed)
        );
        assert!(!object_update(&mut uniform, 999));
    }

    #[test]
    fn test_light_callback_carries_falloff_in_w() {
        let mut engine = test_engine();
        engine.add_light(Light::new(LightProperties::default()));
        engine
            .light_mut(0)
            .unwrap()
            .transform_mut()
            .set_translation(1.0, 2.0, 3.0);

        let scene = engine.main_scene(test_buffers());
        let mut light_update = scene.light_update;
        let mut uniform = LightUniform::zeroed();
        assert!(light_update(&mut uniform, 0));
        assert_eq!(uniform.light_position[0], 1.0);
        assert_eq!(uniform.light_position[1], 2.0);
        assert_eq!(uniform.light_position[2], 3.0);
        assert!(uniform.light_position[3] > 0.0);
        assert!(!light_update(&mut uniform, 5));
    }

    #[test]
    fn test_shadow_scene_uses_light_face_matrices() {
        let mut engine = test_engine();
        engine.add_light(Light::new(LightProperties::default()));
        engine
            .light_mut(0)
            .unwrap()
            .transform_mut()
            .set_translation(0.0, 5.0, 0.0);

        let scene = engine.shadow_scene(0, 2, test_buffers());
        let mut scene = scene.expect("slot 0 holds a light");
        let mut camera = CameraUniform::zeroed();
        assert!((scene.camera_update)(&mut camera));

        // No lights are uploaded during shadow passes.
        assert!(scene.lights.is_empty());
        assert_ne!(camera.view, CameraUniform::zeroed().view);

        assert!(engine.shadow_scene(3, 0, test_buffers()).is_none());
    }

    #[test]
    fn test_light_slots_are_capped() {
        let mut engine = test_engine();
        for _ in 0..MAX_LIGHTS {
            assert!(engine.add_light(Light::new(LightProperties::default())).is_some());
        }
        assert!(engine.add_light(Light::new(LightProperties::default())).is_none());
        assert_eq!(engine.light_count(), MAX_LIGHTS);
    }

    #[test]
    fn test_display_mode_keys() {
        let mut engine = test_engine();
        let mut input = InputState::new();
        input.set_key(KeyCode::Two, true);
        engine.update(timer::State::default(), &input);
        assert_eq!(engine.display_mode(), 2);

        input.set_key(KeyCode::Two, false);
        input.set_key(KeyCode::Zero, true);
        engine.update(timer::State::default(), &input);
        assert_eq!(engine.display_mode(), 0);
    }
}
