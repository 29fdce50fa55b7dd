//! Static sketch: a single flat-shaded triangle floating above a reference
//! grid.

use glam::Vec3;

use crate::camera::CameraConfig;
use crate::scene::{Geometry, Material, Mesh, Scene};
use crate::shader::{ShaderError, ShaderLibrary};

use super::SceneProvider;

pub const TRIANGLE_VERTICES: [[f32; 3]; 3] =
    [[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0]];

const TRIANGLE_COLOR: Vec3 = Vec3::new(0.529, 0.808, 0.922); // skyblue
const AXIS_COLOR: Vec3 = Vec3::new(0.5, 0.5, 0.5);
const GRID_COLOR: Vec3 = Vec3::new(0.7, 0.7, 0.7);
const GRID_SCALE: f32 = 10.0;
const GRID_DIVISIONS: u32 = 10;

pub struct GeometrySketch;

impl SceneProvider for GeometrySketch {
    fn name(&self) -> &'static str {
        "geometry"
    }

    fn camera_config(&self) -> CameraConfig {
        CameraConfig {
            fov_degrees: 25.0,
            near: 0.01,
            far: 100.0,
            position: Vec3::new(2.0, 2.0, -10.0),
            target: Vec3::ZERO,
        }
    }

    fn zoom_enabled(&self) -> bool {
        false
    }

    fn build(&self, _shaders: &ShaderLibrary) -> Result<Scene, ShaderError> {
        let mut scene = Scene::new(Vec3::ONE);
        scene.add(Mesh::new(
            "grid-axes",
            Geometry::axis_lines(GRID_SCALE),
            Material::Flat {
                color: AXIS_COLOR,
                double_sided: false,
            },
        ));
        scene.add(Mesh::new(
            "grid",
            Geometry::grid(GRID_SCALE, GRID_DIVISIONS),
            Material::Flat {
                color: GRID_COLOR,
                double_sided: false,
            },
        ));
        scene.add(Mesh::new(
            "triangle",
            Geometry::triangle(TRIANGLE_VERTICES),
            Material::Flat {
                color: TRIANGLE_COLOR,
                double_sided: true,
            },
        ));
        Ok(scene)
    }

    fn update(&self, _scene: &mut Scene, _time: f32) {
        // Static content; nothing varies with time.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Topology;

    fn build() -> Scene {
        GeometrySketch.build(&ShaderLibrary::new()).unwrap()
    }

    #[test]
    fn triangle_mesh_has_the_literal_vertices() {
        let scene = build();
        let triangles: Vec<_> = scene
            .meshes()
            .iter()
            .filter(|mesh| mesh.geometry.topology == Topology::TriangleList)
            .collect();
        assert_eq!(triangles.len(), 1);
        let triangle = triangles[0];
        assert_eq!(triangle.geometry.vertex_count(), 3);
        assert_eq!(triangle.geometry.positions, TRIANGLE_VERTICES.to_vec());
    }

    #[test]
    fn triangle_is_double_sided() {
        let scene = build();
        match scene.mesh("triangle").unwrap().material {
            Material::Flat { double_sided, .. } => assert!(double_sided),
            Material::Shader(_) => panic!("expected flat material"),
        }
    }

    #[test]
    fn grid_sits_behind_the_triangle() {
        let scene = build();
        assert!(scene.mesh("grid").is_some());
        assert!(scene.mesh("grid-axes").is_some());
        assert_eq!(
            scene.mesh("grid").unwrap().geometry.topology,
            Topology::LineList
        );
    }

    #[test]
    fn update_leaves_the_scene_untouched() {
        let mut scene = build();
        let before = scene.clone();
        GeometrySketch.update(&mut scene, 42.0);
        assert_eq!(scene, before);
    }
}
