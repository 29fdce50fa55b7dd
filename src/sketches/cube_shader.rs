//! Animated sphere whose surface dissolves between a base color and neutral
//! gray, driven by per-cell noise.

use glam::{Vec2, Vec3};

use crate::camera::CameraConfig;
use crate::noise::value_noise3;
use crate::scene::{Geometry, Material, Mesh, Scene, ShaderMaterial, UniformBlock, UniformValue};
use crate::shader::{ShaderError, ShaderLibrary};

use super::SceneProvider;

pub const BASE_COLOR: Vec3 = Vec3::new(0.529, 0.808, 0.922); // skyblue
const NEUTRAL_GRAY: f32 = 0.5;
const GRID_SCALE: f32 = 8.0;
const THRESHOLD: f32 = 0.25;
const NOISE_AMPLITUDE: f32 = 0.15;

pub struct CubeShaderSketch;

impl SceneProvider for CubeShaderSketch {
    fn name(&self) -> &'static str {
        "cube-shader"
    }

    fn camera_config(&self) -> CameraConfig {
        CameraConfig {
            fov_degrees: 50.0,
            near: 0.01,
            far: 100.0,
            position: Vec3::new(0.0, 0.0, -4.0),
            target: Vec3::ZERO,
        }
    }

    fn build(&self, shaders: &ShaderLibrary) -> Result<Scene, ShaderError> {
        let mut uniforms = UniformBlock::new();
        uniforms.set("time", UniformValue::Float(0.0));
        uniforms.set("color", UniformValue::Vec3(BASE_COLOR));

        let material = ShaderMaterial {
            source: shaders.resolve(SPHERE_SHADER)?,
            uniforms,
        };

        let mut scene = Scene::new(Vec3::ONE);
        scene.add(Mesh::new(
            "sphere",
            Geometry::uv_sphere(1.0, 32, 16),
            Material::Shader(material),
        ));
        Ok(scene)
    }

    fn update(&self, scene: &mut Scene, time: f32) {
        if let Some(mesh) = scene.mesh_mut("sphere") {
            if let Material::Shader(material) = &mut mesh.material {
                material.uniforms.set("time", UniformValue::Float(time));
            }
        }
    }
}

/// Threshold perturbation for one grid cell, sampled from the shared lattice
/// noise. Deterministic per (cell, time) and continuous in time.
pub fn threshold_offset(cell: Vec2, time: f32) -> f32 {
    value_noise3(Vec3::new(cell.x, cell.y, time)) * NOISE_AMPLITUDE
}

/// CPU reference of the fragment shading: tiles uv space into a grid, measures
/// the distance to the cell center, and blends toward gray inside the
/// noise-perturbed threshold. Mirrors the WGSL below.
pub fn cell_color(uv: Vec2, time: f32) -> Vec3 {
    let q = Vec2::new(uv.x * 2.0, uv.y);
    let scaled = q * GRID_SCALE;
    let pos = scaled - scaled.floor();
    let d = pos.distance(Vec2::splat(0.5));

    let cell = scaled.floor();
    let offset = threshold_offset(cell, time);
    let mask = if d < THRESHOLD + offset { 1.0 } else { 0.0 };
    BASE_COLOR.lerp(Vec3::splat(NEUTRAL_GRAY), mask)
}

const SPHERE_SHADER: &str = r#"
struct SketchUniform {
    view_proj: mat4x4<f32>,
    color: vec4<f32>,
    params: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> u: SketchUniform;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) uv: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.position = u.view_proj * vec4<f32>(input.position, 1.0);
    out.uv = input.uv;
    return out;
}

//#include <noise/lattice3>

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    let center = vec2<f32>(0.5, 0.5);

    var q = input.uv;
    q.x = q.x * 2.0;

    let scaled = q * 8.0;
    let pos = scaled - floor(scaled);
    let d = distance(pos, center);

    let cell = floor(scaled);
    let time = u.params.x;
    let offset = lattice_noise3(vec3<f32>(cell, time)) * 0.15;
    var mask = step(0.25 + offset, d);
    mask = 1.0 - mask;
    let rgb = mix(u.color.rgb, vec3<f32>(0.5), mask);
    return vec4<f32>(rgb, 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shading_depends_on_time_at_the_first_cell() {
        let offset_start = threshold_offset(Vec2::ZERO, 0.0);
        let offset_later = threshold_offset(Vec2::ZERO, 1.0);
        assert_ne!(offset_start, offset_later);
    }

    #[test]
    fn shading_is_deterministic() {
        let uv = Vec2::new(0.03, 0.07);
        assert_eq!(cell_color(uv, 0.8), cell_color(uv, 0.8));
        assert_eq!(
            threshold_offset(Vec2::new(3.0, 5.0), 2.5),
            threshold_offset(Vec2::new(3.0, 5.0), 2.5)
        );
    }

    #[test]
    fn offset_stays_within_amplitude() {
        for i in 0..32 {
            let cell = Vec2::new((i % 8) as f32, (i / 8) as f32);
            let offset = threshold_offset(cell, i as f32 * 0.33);
            assert!(offset.abs() <= NOISE_AMPLITUDE + 1e-6);
        }
    }

    #[test]
    fn cell_center_blends_to_gray() {
        // The exact cell center is well inside any perturbed threshold.
        let uv = Vec2::new(0.5 / 16.0, 0.5 / 8.0);
        assert_eq!(cell_color(uv, 0.0), Vec3::splat(NEUTRAL_GRAY));
    }

    #[test]
    fn cell_corner_keeps_the_base_color() {
        // A corner sits at distance ~0.707 from the center, beyond any
        // perturbed threshold.
        let uv = Vec2::new(0.001, 0.001);
        assert_eq!(cell_color(uv, 0.0), BASE_COLOR);
    }

    #[test]
    fn scene_has_one_shaded_sphere() {
        let scene = CubeShaderSketch
            .build(&ShaderLibrary::with_builtins())
            .unwrap();
        assert_eq!(scene.meshes().len(), 1);
        let mesh = scene.mesh("sphere").unwrap();
        match &mesh.material {
            Material::Shader(material) => {
                assert!(material.source.contains("fn lattice_noise3"));
                assert!(!material.source.contains("#include"));
            }
            Material::Flat { .. } => panic!("expected shader material"),
        }
    }

    #[test]
    fn update_writes_the_time_uniform() {
        let mut scene = CubeShaderSketch
            .build(&ShaderLibrary::with_builtins())
            .unwrap();
        CubeShaderSketch.update(&mut scene, 3.5);
        let mesh = scene.mesh("sphere").unwrap();
        match &mesh.material {
            Material::Shader(material) => {
                assert_eq!(material.uniforms.float("time"), Some(3.5));
            }
            Material::Flat { .. } => panic!("expected shader material"),
        }
    }

    #[test]
    fn unresolved_include_surfaces_as_error() {
        let empty = ShaderLibrary::new();
        assert!(CubeShaderSketch.build(&empty).is_err());
    }
}
