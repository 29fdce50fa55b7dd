use std::env;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use log::{info, warn};
use pollster::block_on;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use sketch_runtime::{
    provider_for, sketches, HarnessError, InputSender, PointerEvent, Renderer, SceneHarness,
    SurfaceSize, SKETCH_NAMES,
};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let provider = provider_for(&options.sketch).ok_or_else(|| {
        anyhow!(
            "unknown sketch `{}`. Available: {}",
            options.sketch,
            SKETCH_NAMES.join(", ")
        )
    })?;

    if options.describe {
        print!("{}", sketches::describe(provider.as_ref())?);
        return Ok(());
    }

    let event_loop = EventLoop::new()?;
    let mut app = App {
        sketch: options.sketch,
        frozen: options.frozen,
        state: None,
        last_error: None,
    };
    event_loop.run_app(&mut app)?;

    if let Some(err) = app.last_error {
        return Err(err);
    }
    Ok(())
}

struct CliOptions {
    sketch: String,
    describe: bool,
    frozen: bool,
}

impl CliOptions {
    fn parse() -> Result<Self> {
        let mut args = env::args().skip(1);
        let Some(sketch) = args.next() else {
            return Err(anyhow!("Usage: sketch-runtime <sketch> [--describe] [--static]"));
        };
        let mut describe = false;
        let mut frozen = false;
        for arg in args {
            match arg.as_str() {
                "--describe" => describe = true,
                "--static" => frozen = true,
                other => {
                    return Err(anyhow!(
                        "Unknown argument: {other}. Expected --describe or --static"
                    ));
                }
            }
        }
        Ok(Self {
            sketch,
            describe,
            frozen,
        })
    }
}

/// Live window state, created lazily on the first `resumed`.
struct SketchState {
    window: Arc<Window>,
    harness: SceneHarness,
    input: InputSender,
    started: Instant,
    cursor: Option<(f64, f64)>,
    dragging: bool,
}

struct App {
    sketch: String,
    frozen: bool,
    state: Option<SketchState>,
    last_error: Option<anyhow::Error>,
}

impl App {
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let provider = provider_for(&self.sketch)
            .ok_or_else(|| anyhow!("unknown sketch `{}`", self.sketch))?;

        let window = Arc::new(event_loop.create_window(
            Window::default_attributes()
                .with_title(format!("sketch: {}", self.sketch))
                .with_inner_size(LogicalSize::new(1280.0, 720.0)),
        )?);

        let backend = block_on(Renderer::new(Arc::clone(&window)))?;
        let scale = window.scale_factor();
        let logical = window.inner_size().to_logical::<f64>(scale);
        let surface = SurfaceSize::new(logical.width as u32, logical.height as u32, scale as f32);

        let (harness, input) = SceneHarness::create(Box::new(backend), provider, surface)?;
        info!("running sketch `{}`", self.sketch);

        self.state = Some(SketchState {
            window,
            harness,
            input,
            started: Instant::now(),
            cursor: None,
            dragging: false,
        });
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        self.last_error = Some(err);
        event_loop.exit();
    }

    fn resize_to_window(state: &mut SketchState) -> Result<(), HarnessError> {
        let scale = state.window.scale_factor();
        let logical = state.window.inner_size().to_logical::<f64>(scale);
        state
            .harness
            .resize(scale as f32, logical.width as u32, logical.height as u32)
    }

    fn redraw(state: &mut SketchState, frozen: bool) -> Result<()> {
        let elapsed = if frozen {
            0.0
        } else {
            state.started.elapsed().as_secs_f32()
        };
        match state.harness.render(elapsed) {
            Ok(()) => Ok(()),
            Err(HarnessError::Backend(err)) => match err.downcast_ref::<wgpu::SurfaceError>() {
                Some(wgpu::SurfaceError::Lost) | Some(wgpu::SurfaceError::Outdated) => {
                    Self::resize_to_window(state)?;
                    Ok(())
                }
                Some(wgpu::SurfaceError::OutOfMemory) => Err(anyhow!("GPU is out of memory")),
                Some(wgpu::SurfaceError::Timeout) => {
                    info!("surface timeout; retrying next frame");
                    Ok(())
                }
                _ => Err(err),
            },
            Err(err) => Err(err.into()),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_none() {
            if let Err(err) = self.init(event_loop) {
                self.fail(event_loop, err);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let frozen = self.frozen;
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let mut failure = None;

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                if let Err(err) = Self::resize_to_window(state) {
                    failure = Some(err.into());
                }
            }
            WindowEvent::MouseInput {
                state: element_state,
                button: MouseButton::Left,
                ..
            } => {
                state.dragging = element_state == ElementState::Pressed;
                if !state.dragging {
                    state.cursor = None;
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if state.dragging {
                    if let Some((last_x, last_y)) = state.cursor {
                        state.input.send(PointerEvent::Drag {
                            dx: (position.x - last_x) as f32,
                            dy: (position.y - last_y) as f32,
                        });
                    }
                    state.cursor = Some((position.x, position.y));
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32 / 60.0,
                };
                state.input.send(PointerEvent::Scroll { delta });
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = Self::redraw(state, frozen) {
                    failure = Some(err);
                }
            }
            _ => {}
        }

        if let Some(err) = failure {
            self.fail(event_loop, err);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = self.state.as_mut() {
            if let Err(err) = state.harness.unload() {
                warn!("unload failed: {err}");
            }
        }
    }
}
