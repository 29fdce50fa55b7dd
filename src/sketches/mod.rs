//! Scene content providers, one per sketch.

pub mod cube_shader;
pub mod geometry;

use crate::camera::CameraConfig;
use crate::scene::{Material, Scene, Topology};
use crate::shader::{ShaderError, ShaderLibrary};

pub use cube_shader::CubeShaderSketch;
pub use geometry::GeometrySketch;

/// Builds the camera configuration and scene content for one sketch and
/// applies its per-frame mutation.
pub trait SceneProvider {
    fn name(&self) -> &'static str;

    fn camera_config(&self) -> CameraConfig;

    fn zoom_enabled(&self) -> bool {
        true
    }

    /// Constructs the scene, resolving shader includes through `shaders`.
    fn build(&self, shaders: &ShaderLibrary) -> Result<Scene, ShaderError>;

    /// Per-frame mutation: writes time-driven uniforms into the scene.
    fn update(&self, scene: &mut Scene, time: f32);
}

pub const SKETCH_NAMES: &[&str] = &["cube-shader", "geometry"];

pub fn provider_for(name: &str) -> Option<Box<dyn SceneProvider>> {
    match name {
        "cube-shader" => Some(Box::new(CubeShaderSketch)),
        "geometry" => Some(Box::new(GeometrySketch)),
        _ => None,
    }
}

/// Human-readable summary of a provider's built scene, used by the CLI's
/// headless describe mode.
pub fn describe(provider: &dyn SceneProvider) -> Result<String, ShaderError> {
    let shaders = ShaderLibrary::with_builtins();
    let scene = provider.build(&shaders)?;
    let config = provider.camera_config();

    let mut out = String::new();
    out.push_str(&format!("sketch: {}\n", provider.name()));
    out.push_str(&format!(
        "camera: fov {:.1} deg, position ({:.2}, {:.2}, {:.2})\n",
        config.fov_degrees, config.position.x, config.position.y, config.position.z
    ));
    out.push_str(&format!("meshes: {}\n", scene.meshes().len()));
    for mesh in scene.meshes() {
        let topology = match mesh.geometry.topology {
            Topology::TriangleList => "triangles",
            Topology::LineList => "lines",
        };
        let material = match &mesh.material {
            Material::Flat { .. } => "flat",
            Material::Shader(_) => "shader",
        };
        out.push_str(&format!(
            " - {}: {} vertices, {topology}, {material} material\n",
            mesh.name,
            mesh.geometry.vertex_count()
        ));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn providers_resolve_by_name() {
        for name in SKETCH_NAMES {
            let provider = provider_for(name).expect("registered sketch");
            assert_eq!(provider.name(), *name);
        }
        assert!(provider_for("unknown").is_none());
    }

    #[test]
    fn describe_lists_scene_content() {
        let provider = provider_for("geometry").unwrap();
        let summary = describe(provider.as_ref()).unwrap();
        assert!(summary.contains("sketch: geometry"));
        assert!(summary.contains("triangle: 3 vertices"));
    }
}
