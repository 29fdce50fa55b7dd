use glam::Vec3;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::camera::PerspectiveCamera;
use crate::controls::{InputSender, OrbitControls};
use crate::scene::Scene;
use crate::shader::{ShaderError, ShaderLibrary};
use crate::sketches::SceneProvider;

/// Errors surfaced to the animation driver.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The render backend could not bind to the drawable target. Fatal,
    /// raised at creation.
    #[error("render surface unavailable: {0}")]
    SurfaceUnavailable(String),
    #[error(transparent)]
    Shader(#[from] ShaderError),
    /// A lifecycle hook was invoked after `unload`.
    #[error("scene harness used after unload")]
    Unloaded,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Dimensions of the drawable target, owned by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32, pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            pixel_ratio,
        }
    }

    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// The injected rendering-library handle.
///
/// The harness never reaches for a global renderer; whoever constructs it
/// passes the backend in, which also keeps the lifecycle testable headlessly.
pub trait RenderBackend {
    fn set_clear_color(&mut self, color: Vec3);
    fn set_pixel_ratio(&mut self, ratio: f32);
    fn set_size(&mut self, width: u32, height: u32);
    /// Uploads scene resources (buffers, pipelines). Called once at creation.
    fn prepare(&mut self, scene: &Scene) -> anyhow::Result<()>;
    /// Submits one frame of the scene through the camera.
    fn draw(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> anyhow::Result<()>;
    /// Releases GPU resources. Called exactly once, via `unload`.
    fn dispose(&mut self);
}

/// Owns renderer, camera, controls, and scene for one sketch and exposes the
/// `resize`/`render`/`unload` lifecycle to an external animation driver.
///
/// Single-threaded cooperative model: the driver invokes the hooks
/// sequentially on its own tick schedule.
pub struct SceneHarness {
    backend: Box<dyn RenderBackend>,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    scene: Scene,
    provider: Box<dyn SceneProvider>,
    unloaded: bool,
}

impl SceneHarness {
    /// Builds the camera from the provider's configuration, resolves the
    /// scene's shader includes, binds the orbit controls, and uploads GPU
    /// state through the backend.
    pub fn create(
        mut backend: Box<dyn RenderBackend>,
        provider: Box<dyn SceneProvider>,
        surface: SurfaceSize,
    ) -> Result<(Self, InputSender), HarnessError> {
        let camera = PerspectiveCamera::new(&provider.camera_config(), surface.aspect());
        let (controls, input) = OrbitControls::bind(&camera, provider.zoom_enabled());

        let shaders = ShaderLibrary::with_builtins();
        let scene = provider.build(&shaders)?;

        backend.set_clear_color(scene.background);
        backend.set_pixel_ratio(surface.pixel_ratio);
        backend.set_size(surface.width, surface.height);
        backend.prepare(&scene)?;

        debug!(
            "created harness for sketch `{}` ({} meshes)",
            provider.name(),
            scene.meshes().len()
        );

        let harness = Self {
            backend,
            camera,
            controls,
            scene,
            provider,
            unloaded: false,
        };
        Ok((harness, input))
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Updates the backend output size and the camera aspect ratio.
    ///
    /// A zero-area viewport is a silent no-op: mid-resize transients are
    /// expected and the caller keeps the previous dimensions.
    pub fn resize(&mut self, pixel_ratio: f32, width: u32, height: u32) -> Result<(), HarnessError> {
        if self.unloaded {
            return Err(HarnessError::Unloaded);
        }
        if width == 0 || height == 0 {
            warn!("ignoring degenerate resize to {width}x{height}");
            return Ok(());
        }
        self.backend.set_pixel_ratio(pixel_ratio);
        self.backend.set_size(width, height);
        self.camera.set_aspect(width as f32 / height as f32);
        Ok(())
    }

    /// Advances controller state, writes time-driven uniforms, and issues one
    /// draw. `elapsed` uses the same units as shader time uniforms.
    pub fn render(&mut self, elapsed: f32) -> Result<(), HarnessError> {
        if self.unloaded {
            return Err(HarnessError::Unloaded);
        }
        self.controls.update(&mut self.camera);
        self.provider.update(&mut self.scene, elapsed);
        if self.camera.projection_stale() {
            self.camera.update_projection_matrix();
        }
        self.backend.draw(&self.scene, &self.camera)?;
        Ok(())
    }

    /// Releases the controller input binding and the backend GPU resources.
    /// Every lifecycle call after this fails with [`HarnessError::Unloaded`].
    pub fn unload(&mut self) -> Result<(), HarnessError> {
        if self.unloaded {
            return Err(HarnessError::Unloaded);
        }
        self.controls.dispose();
        self.backend.dispose();
        self.unloaded = true;
        debug!("harness unloaded");
        Ok(())
    }
}
