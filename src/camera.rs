use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Static camera parameters chosen by a sketch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 50.0,
            near: 0.01,
            far: 100.0,
            position: Vec3::new(0.0, 0.0, -4.0),
            target: Vec3::ZERO,
        }
    }
}

/// Perspective camera with a cached projection matrix.
///
/// The projection is recomputed lazily: `set_aspect` only marks it stale and
/// the owner calls `update_projection_matrix` before the next draw.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    fov_degrees: f32,
    aspect: f32,
    near: f32,
    far: f32,
    position: Vec3,
    target: Vec3,
    up: Vec3,
    projection: Mat4,
    projection_stale: bool,
}

impl PerspectiveCamera {
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        let mut camera = Self {
            fov_degrees: config.fov_degrees,
            aspect,
            near: config.near,
            far: config.far,
            position: config.position,
            target: config.target,
            up: Vec3::Y,
            projection: Mat4::IDENTITY,
            projection_stale: true,
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Updates the aspect ratio and marks the projection stale.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.projection_stale = true;
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn projection_stale(&self) -> bool {
        self.projection_stale
    }

    /// Recomputes the cached projection matrix from the current parameters.
    pub fn update_projection_matrix(&mut self) {
        self.projection = Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            self.aspect.max(f32::EPSILON),
            self.near,
            self.far,
        );
        self.projection_stale = false;
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection * self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_with_aspect(aspect: f32) -> PerspectiveCamera {
        PerspectiveCamera::new(&CameraConfig::default(), aspect)
    }

    #[test]
    fn new_camera_has_fresh_projection() {
        let camera = camera_with_aspect(1.0);
        assert!(!camera.projection_stale());
    }

    #[test]
    fn set_aspect_marks_projection_stale() {
        let mut camera = camera_with_aspect(1.0);
        camera.set_aspect(2.0);
        assert!(camera.projection_stale());
        assert_eq!(camera.aspect(), 2.0);
        camera.update_projection_matrix();
        assert!(!camera.projection_stale());
    }

    #[test]
    fn widescreen_surface_yields_expected_aspect() {
        let camera = camera_with_aspect(1920.0 / 1080.0);
        assert!((camera.aspect() - 1.7778).abs() < 1e-3);
    }

    #[test]
    fn view_matrix_tracks_position() {
        let mut camera = camera_with_aspect(1.0);
        let before = camera.view();
        camera.set_position(Vec3::new(3.0, 1.0, -2.0));
        assert_ne!(before, camera.view());
    }
}
