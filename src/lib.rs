//! Building blocks for small animated 3D sketches.
//!
//! The crate separates sketch content (scenes, cameras, shader sources) from
//! the rendering backend behind the [`harness::RenderBackend`] seam, so the
//! whole lifecycle stays testable without a GPU and easy to embed in headless
//! tools.

pub mod camera;
pub mod controls;
pub mod harness;
pub mod noise;
pub mod renderer;
pub mod scene;
pub mod shader;
pub mod sketches;

pub use camera::{CameraConfig, PerspectiveCamera};
pub use controls::{InputSender, OrbitControls, PointerEvent};
pub use harness::{HarnessError, RenderBackend, SceneHarness, SurfaceSize};
pub use renderer::Renderer;
pub use scene::{Geometry, Material, Mesh, Scene, ShaderMaterial, UniformBlock, UniformValue};
pub use shader::{ShaderError, ShaderLibrary};
pub use sketches::{provider_for, SceneProvider, SKETCH_NAMES};
