use std::collections::VecDeque;
use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use glam::Vec3;
use log::debug;
use parking_lot::Mutex;

use crate::camera::PerspectiveCamera;

const ROTATE_SPEED: f32 = 0.005;
const ZOOM_SPEED: f32 = 0.1;
const MIN_DISTANCE: f32 = 0.1;
const MAX_DISTANCE: f32 = 1000.0;
const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;

/// Pointer event delivered from the window side to the controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Drag { dx: f32, dy: f32 },
    Scroll { delta: f32 },
}

#[derive(Debug, Default)]
struct SharedQueue {
    events: VecDeque<PointerEvent>,
    connected: bool,
}

/// Window-side handle pushing pointer events into a bound [`OrbitControls`].
/// Events sent after the controls are disposed are dropped.
#[derive(Debug, Clone)]
pub struct InputSender {
    shared: Arc<Mutex<SharedQueue>>,
}

impl InputSender {
    pub fn send(&self, event: PointerEvent) {
        let mut shared = self.shared.lock();
        if shared.connected {
            shared.events.push_back(event);
        }
    }

    pub fn is_connected(&self) -> bool {
        self.shared.lock().connected
    }
}

/// Orbit-style camera controller: rotates and zooms the camera around a fixed
/// target in response to queued pointer events.
#[derive(Debug)]
pub struct OrbitControls {
    target: Vec3,
    distance: f32,
    yaw: f32,
    pitch: f32,
    zoom_enabled: bool,
    shared: Option<Arc<Mutex<SharedQueue>>>,
}

impl OrbitControls {
    /// Binds controls to the camera's current pose and returns the sender the
    /// window side uses to deliver pointer events.
    pub fn bind(camera: &PerspectiveCamera, zoom_enabled: bool) -> (Self, InputSender) {
        let offset = camera.position() - camera.target();
        let distance = offset.length().max(MIN_DISTANCE);
        let pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
        let yaw = offset.x.atan2(offset.z);

        let shared = Arc::new(Mutex::new(SharedQueue {
            events: VecDeque::new(),
            connected: true,
        }));
        let sender = InputSender {
            shared: Arc::clone(&shared),
        };
        let controls = Self {
            target: camera.target(),
            distance,
            yaw,
            pitch,
            zoom_enabled,
            shared: Some(shared),
        };
        (controls, sender)
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn is_bound(&self) -> bool {
        self.shared.is_some()
    }

    /// Consumes queued input and repositions the camera on its orbit.
    /// No-op once disposed.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) {
        let Some(shared) = self.shared.as_ref() else {
            return;
        };

        let events: Vec<PointerEvent> = shared.lock().events.drain(..).collect();
        for event in events {
            match event {
                PointerEvent::Drag { dx, dy } => {
                    self.yaw -= dx * ROTATE_SPEED;
                    self.pitch =
                        (self.pitch - dy * ROTATE_SPEED).clamp(-PITCH_LIMIT, PITCH_LIMIT);
                }
                PointerEvent::Scroll { delta } => {
                    if self.zoom_enabled {
                        self.distance = (self.distance * (1.0 + delta * ZOOM_SPEED))
                            .clamp(MIN_DISTANCE, MAX_DISTANCE);
                    }
                }
            }
        }

        camera.set_position(self.eye());
        camera.look_at(self.target);
    }

    /// Releases the input binding. Senders created at bind time keep working
    /// as handles but their events are dropped from here on.
    pub fn dispose(&mut self) {
        if let Some(shared) = self.shared.take() {
            shared.lock().connected = false;
            debug!("orbit controls disposed");
        }
    }

    fn eye(&self) -> Vec3 {
        let offset = Vec3::new(
            self.distance * self.pitch.cos() * self.yaw.sin(),
            self.distance * self.pitch.sin(),
            self.distance * self.pitch.cos() * self.yaw.cos(),
        );
        self.target + offset
    }
}
