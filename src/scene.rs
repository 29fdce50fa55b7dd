use std::f32::consts::PI;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Primitive topology of a geometry's index list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Topology {
    TriangleList,
    LineList,
}

/// Immutable vertex data: positions with matching uvs plus an index list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub positions: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    pub topology: Topology,
}

impl Geometry {
    /// Single triangle with explicit world-space vertices.
    pub fn triangle(vertices: [[f32; 3]; 3]) -> Self {
        Self {
            positions: vertices.to_vec(),
            uvs: vec![[0.0, 0.0]; 3],
            indices: vec![0, 1, 2],
            topology: Topology::TriangleList,
        }
    }

    /// Latitude/longitude sphere with uv coordinates.
    pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let mut positions = Vec::new();
        let mut uvs = Vec::new();
        let mut indices = Vec::new();

        for row in 0..=height_segments {
            let v = row as f32 / height_segments as f32;
            let theta = v * PI;
            for column in 0..=width_segments {
                let u = column as f32 / width_segments as f32;
                let phi = u * 2.0 * PI;
                positions.push([
                    -radius * theta.sin() * phi.cos(),
                    radius * theta.cos(),
                    radius * theta.sin() * phi.sin(),
                ]);
                uvs.push([u, 1.0 - v]);
            }
        }

        let stride = width_segments + 1;
        for row in 0..height_segments {
            for column in 0..width_segments {
                let a = row * stride + column;
                let b = a + stride;
                indices.extend_from_slice(&[a, b, a + 1]);
                indices.extend_from_slice(&[b, b + 1, a + 1]);
            }
        }

        Self {
            positions,
            uvs,
            indices,
            topology: Topology::TriangleList,
        }
    }

    /// Line grid on the XZ plane, excluding the two lines through the origin
    /// (see [`Geometry::axis_lines`]).
    pub fn grid(size: f32, divisions: u32) -> Self {
        let half = size / 2.0;
        let step = size / divisions as f32;
        let mut positions = Vec::new();

        for line in 0..=divisions {
            let offset = -half + line as f32 * step;
            if offset.abs() < step * 1e-3 {
                continue;
            }
            positions.push([offset, 0.0, -half]);
            positions.push([offset, 0.0, half]);
            positions.push([-half, 0.0, offset]);
            positions.push([half, 0.0, offset]);
        }

        Self::lines(positions)
    }

    /// The two center lines of a grid, drawn separately so the sketch can give
    /// them their own color.
    pub fn axis_lines(size: f32) -> Self {
        let half = size / 2.0;
        Self::lines(vec![
            [0.0, 0.0, -half],
            [0.0, 0.0, half],
            [-half, 0.0, 0.0],
            [half, 0.0, 0.0],
        ])
    }

    fn lines(positions: Vec<[f32; 3]>) -> Self {
        let uvs = vec![[0.0, 0.0]; positions.len()];
        let indices = (0..positions.len() as u32).collect();
        Self {
            positions,
            uvs,
            indices,
            topology: Topology::LineList,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

/// Named per-draw shader input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum UniformValue {
    Float(f32),
    Vec3(Vec3),
}

/// Mutable uniform set attached to a shader material.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UniformBlock {
    values: Vec<(String, UniformValue)>,
}

impl UniformBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: UniformValue) {
        match self.values.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.values.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<UniformValue> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| *value)
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        match self.get(name)? {
            UniformValue::Float(value) => Some(value),
            UniformValue::Vec3(_) => None,
        }
    }

    pub fn vec3(&self, name: &str) -> Option<Vec3> {
        match self.get(name)? {
            UniformValue::Vec3(value) => Some(value),
            UniformValue::Float(_) => None,
        }
    }
}

/// Shader material: resolved WGSL source plus its live uniforms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShaderMaterial {
    pub source: String,
    pub uniforms: UniformBlock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Material {
    Flat { color: Vec3, double_sided: bool },
    Shader(ShaderMaterial),
}

/// Geometry paired with a material. The shape is immutable once built; only
/// shader uniforms change per frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub name: String,
    pub geometry: Geometry,
    pub material: Material,
}

impl Mesh {
    pub fn new(name: &str, geometry: Geometry, material: Material) -> Self {
        Self {
            name: name.to_string(),
            geometry,
            material,
        }
    }
}

/// Append-only scene root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub background: Vec3,
    meshes: Vec<Mesh>,
}

impl Scene {
    pub fn new(background: Vec3) -> Self {
        Self {
            background,
            meshes: Vec::new(),
        }
    }

    pub fn add(&mut self, mesh: Mesh) {
        self.meshes.push(mesh);
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn meshes_mut(&mut self) -> &mut [Mesh] {
        &mut self.meshes
    }

    pub fn mesh(&self, name: &str) -> Option<&Mesh> {
        self.meshes.iter().find(|mesh| mesh.name == name)
    }

    pub fn mesh_mut(&mut self, name: &str) -> Option<&mut Mesh> {
        self.meshes.iter_mut().find(|mesh| mesh.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_keeps_literal_vertices() {
        let triangle = Geometry::triangle([[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0]]);
        assert_eq!(triangle.vertex_count(), 3);
        assert_eq!(triangle.positions[0], [-1.0, -1.0, 1.0]);
        assert_eq!(triangle.indices, vec![0, 1, 2]);
    }

    #[test]
    fn sphere_has_expected_vertex_and_index_counts() {
        let sphere = Geometry::uv_sphere(1.0, 32, 16);
        assert_eq!(sphere.vertex_count(), 33 * 17);
        assert_eq!(sphere.indices.len() as u32, 32 * 16 * 6);
        assert_eq!(sphere.topology, Topology::TriangleList);
    }

    #[test]
    fn sphere_vertices_sit_on_the_radius() {
        let sphere = Geometry::uv_sphere(2.0, 8, 4);
        for position in &sphere.positions {
            let length = Vec3::from_array(*position).length();
            assert!((length - 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn grid_excludes_center_lines() {
        let grid = Geometry::grid(10.0, 10);
        // Ten non-center offsets, two lines of two vertices each per offset.
        assert_eq!(grid.vertex_count(), 10 * 4);
        for position in &grid.positions {
            assert!(position[0].abs() > 1e-3 || position[2].abs() > 1e-3);
        }
        assert_eq!(Geometry::axis_lines(10.0).vertex_count(), 4);
    }

    #[test]
    fn uniform_block_overwrites_by_name() {
        let mut uniforms = UniformBlock::new();
        uniforms.set("time", UniformValue::Float(0.0));
        uniforms.set("time", UniformValue::Float(2.5));
        assert_eq!(uniforms.float("time"), Some(2.5));
        assert_eq!(uniforms.float("missing"), None);
    }

    #[test]
    fn scene_finds_meshes_by_name() {
        let mut scene = Scene::new(Vec3::ONE);
        scene.add(Mesh::new(
            "triangle",
            Geometry::triangle([[0.0; 3]; 3]),
            Material::Flat {
                color: Vec3::ONE,
                double_sided: false,
            },
        ));
        assert!(scene.mesh("triangle").is_some());
        assert!(scene.mesh("sphere").is_none());
    }
}
