// demos/main.rs
//! Demo scene: a floor, a spinning crate with a satellite child, and two
//! shadow-casting point lights.
//!
//! Controls: WASD + Q/E move the camera, arrows turn it, 0/1/2 switch the
//! display mode (lit / albedo / normals), escape quits.

use anyhow::Result;
use cgmath::Vector4;
use log::warn;

use shadowbox::engine::SceneObject;
use shadowbox::gfx::light::{Light, LightProperties};
use shadowbox::gfx::mesh::{self, GpuMesh, MeshData};
use shadowbox::gfx::rendering::vertex::Vertex3D;
use shadowbox::gfx::scene_graph::Node;
use shadowbox::gfx::texture;

fn main() -> Result<()> {
    env_logger::init();

    let mut app = shadowbox::default();
    app.set_scene_setup(|renderer, engine| {
        let device = renderer.device().clone();
        let queue = renderer.queue().clone();
        let pipeline = renderer.main_pipeline();

        let floor_mesh = GpuMesh::upload(renderer.resources_mut(), &device, "floor", &floor());
        let crate_mesh = GpuMesh::upload(
            renderer.resources_mut(),
            &device,
            "crate",
            &mesh::load_or_fallback("demos/assets/crate.obj"),
        );

        let crate_texture = match texture::load_texture("demos/assets/crate.png") {
            Ok(data) => {
                let handle = renderer.resources_mut().create_texture_from_data(
                    &device,
                    &queue,
                    "crate texture",
                    &data,
                );
                Some(renderer.create_texture_bind_group(handle)?)
            }
            Err(err) => {
                warn!("{}, rendering untextured", err);
                None
            }
        };

        let floor_id = {
            let mut object = SceneObject::new(floor_mesh, pipeline);
            object.transform.set_scale(20.0, 1.0, 20.0);
            engine.register(object)
        };

        let crate_id = {
            let mut object = SceneObject::new(crate_mesh, pipeline);
            if let Some(group) = crate_texture {
                object.texture_bind_group = group;
            }
            object.transform.set_translation(0.0, 1.0, 0.0);
            engine.register(object)
        };

        let satellite_id = {
            let mut object = SceneObject::new(crate_mesh, pipeline);
            object.transform.set_scale(0.4, 0.4, 0.4);
            object.transform.set_translation(2.5, 0.5, 0.0);
            engine.register(object)
        };

        let mut crate_node = Node::new(crate_id);
        crate_node.add_child(Node::new(satellite_id));
        engine.root_mut().add_child(Node::new(floor_id));
        engine.root_mut().add_child(crate_node);

        for (position, intensity, color) in [
            ([4.0, 5.0, -3.0], 1.5, Vector4::new(1.0, 0.95, 0.85, 1.0)),
            ([-4.0, 4.0, 3.0], 1.0, Vector4::new(0.8, 0.85, 1.0, 1.0)),
        ] {
            let mut light = Light::new(LightProperties {
                intensity,
                color,
                ..Default::default()
            });
            light
                .transform_mut()
                .set_translation(position[0], position[1], position[2]);
            engine.add_light(light);
        }

        engine
            .camera_mut()
            .transform_mut()
            .set_translation(0.0, 3.0, -8.0);
        engine.camera_mut().transform_mut().pitch_by(15.0);
        engine.camera_mut().update();

        // The crate spins; the satellite orbits with it through the node
        // hierarchy.
        engine.set_frame_hook(Box::new(move |timer, objects| {
            if let Some(object) = objects.get_mut(&crate_id) {
                object
                    .transform
                    .set_rotation(0.0, timer.total_elapsed * 30.0, 0.0);
            }
        }));

        Ok(())
    });

    app.run();
    Ok(())
}

/// A unit quad in the xz plane facing up
fn floor() -> MeshData {
    let normal = [0.0, 1.0, 0.0];
    let tangent = [1.0, 0.0, 0.0];
    let color = [0.85, 0.85, 0.85, 1.0];
    MeshData {
        vertices: vec![
            Vertex3D {
                position: [-0.5, 0.0, -0.5],
                normal,
                tangent,
                uv: [0.0, 1.0],
                color,
            },
            Vertex3D {
                position: [0.5, 0.0, -0.5],
                normal,
                tangent,
                uv: [1.0, 1.0],
                color,
            },
            Vertex3D {
                position: [0.5, 0.0, 0.5],
                normal,
                tangent,
                uv: [1.0, 0.0],
                color,
            },
            Vertex3D {
                position: [-0.5, 0.0, 0.5],
                normal,
                tangent,
                uv: [0.0, 0.0],
                color,
            },
        ],
        indices: vec![0, 1, 2, 0, 2, 3],
    }
}
