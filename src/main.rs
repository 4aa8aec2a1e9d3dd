use std::any::Any;
use std::env;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use glam::{Vec2, Vec3};
use log::info;
use pollster::block_on;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::platform::run_return::EventLoopExtRunReturn;
use winit::window::WindowBuilder;

use spincube::{
    generate_cube, projection_matrix, FrameParams, FrameTimer, Renderer, ResourceStore,
    SceneSettings, ShaderProgram, Spin, Transformations, WindowViewport,
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

    let settings = match &options.settings_path {
        Some(path) => {
            let xml = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read settings {path}"))?;
            SceneSettings::from_xml(&xml).context("failed to parse settings")?
        }
        None => SceneSettings::default(),
    };

    let store = match &options.assets_dir {
        Some(dir) => ResourceStore::dir(dir),
        None => ResourceStore::builtin(),
    };

    let program = ShaderProgram::load(&store, &settings.shaders.vertex, &settings.shaders.fragment)
        .context("failed to build shader program")?;
    let mesh = generate_cube(settings.cube.scale).context("failed to generate cube")?;

    println!("Loaded shaders from {}", store.describe());
    println!(
        "Program entry points: {} / {}",
        program.vertex().entry_point(),
        program.fragment().entry_point()
    );
    println!(
        "Cube mesh: {} vertices, {} indices",
        mesh.vertex_count(),
        mesh.indices.len()
    );

    if options.summary_only {
        run_headless(&settings, options.frames)
    } else {
        match run_interactive(&settings, program, mesh) {
            Ok(()) => Ok(()),
            Err(err) => {
                if err.downcast_ref::<WindowInitError>().is_some() {
                    eprintln!(
                        "{err}. Falling back to --summary-only mode (set DISPLAY or install GPU drivers to enable rendering)."
                    );
                    run_headless(&settings, options.frames)
                } else {
                    Err(err)
                }
            }
        }
    }
}

/// Advances the spin/transform state at a fixed 60 Hz step and prints the
/// resulting state, so runs are deterministic without a GPU.
fn run_headless(settings: &SceneSettings, frames: u32) -> Result<()> {
    let mut transforms = Transformations::new(
        settings.camera.depth,
        1.0,
        Vec2::ZERO,
        settings.cube.rotation_radians(),
    );
    transforms.start();
    let spin = Spin::new(Vec3::Y, settings.cube.spin_radians());

    for _ in 0..frames {
        transforms.rotate(spin.advance(1.0 / 60.0), 1.0);
    }

    let rotation = transforms.rotation();
    let matrix = transforms.model_view_matrix();
    println!("Simulated {frames} frames");
    println!(
        "Final rotation: ({:.4}, {:.4}, {:.4}) rad",
        rotation.x, rotation.y, rotation.z
    );
    println!(
        "Final model-view translation: ({:.2}, {:.2}, {:.2})",
        matrix.w_axis.x, matrix.w_axis.y, matrix.w_axis.z
    );
    Ok(())
}

fn run_interactive(
    settings: &SceneSettings,
    program: ShaderProgram,
    mesh: spincube::MeshBuffers,
) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let event_loop =
        event_loop.map_err(|panic| WindowInitError::from_panic("event loop", panic))?;

    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Spincube")
            .with_inner_size(LogicalSize::new(960.0, 720.0))
            .build(&event_loop)
            .map_err(|err| WindowInitError::from_error("window", err))?,
    );

    let renderer = block_on(Renderer::new(Arc::clone(&window), &program, &mesh))
        .map_err(|err| WindowInitError::from_error("renderer", format!("{err:#}")))?;

    let viewport = WindowViewport::new(window.inner_size().width, window.inner_size().height);

    let mut transforms = Transformations::new(
        settings.camera.depth,
        1.0,
        Vec2::ZERO,
        settings.cube.rotation_radians(),
    );
    transforms.start();

    let mut app = AppState {
        renderer,
        viewport,
        transforms,
        spin: Spin::new(Vec3::Y, settings.cube.spin_radians()),
        timer: FrameTimer::new(),
        camera: settings.camera,
        color: settings.cube.color,
        last_error: None,
    };

    let mut event_loop = event_loop;
    event_loop.run_return(|event, _, control_flow| {
        *control_flow = ControlFlow::Poll;
        if let Err(err) = app.process_event(&event, control_flow) {
            app.last_error = Some(err);
            control_flow.set_exit();
        }
    });

    if let Some(err) = app.last_error {
        return Err(err);
    }

    Ok(())
}

struct AppState {
    renderer: Renderer,
    viewport: WindowViewport,
    transforms: Transformations,
    spin: Spin,
    timer: FrameTimer,
    camera: spincube::CameraSettings,
    color: Vec3,
    last_error: Option<anyhow::Error>,
}

impl AppState {
    fn process_event(&mut self, event: &Event<()>, control_flow: &mut ControlFlow) -> Result<()> {
        match event {
            Event::WindowEvent { event, window_id } if *window_id == self.renderer.window_id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        control_flow.set_exit();
                    }
                    WindowEvent::Resized(size) => {
                        self.renderer.resize(*size);
                        self.viewport.update(size.width, size.height);
                    }
                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        self.renderer.resize(**new_inner_size);
                        self.viewport
                            .update(new_inner_size.width, new_inner_size.height);
                    }
                    WindowEvent::KeyboardInput { input, .. } => {
                        self.handle_keyboard(input, control_flow);
                    }
                    _ => {}
                }
            }
            Event::RedrawRequested(window_id) if *window_id == self.renderer.window_id() => {
                let dt = self.timer.tick();
                self.transforms.rotate(self.spin.advance(dt), 1.0);

                let frame = FrameParams {
                    model_view: self.transforms.model_view_matrix(),
                    projection: projection_matrix(&self.camera, self.viewport.aspect()),
                    color: self.color,
                };
                if let Err(err) = self.renderer.render(&frame) {
                    match err {
                        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                            let size = self.renderer.window().inner_size();
                            self.renderer.resize(size);
                        }
                        wgpu::SurfaceError::OutOfMemory => {
                            return Err(anyhow!("GPU is out of memory"));
                        }
                        wgpu::SurfaceError::Timeout => {
                            info!("Surface timeout; retrying next frame");
                        }
                    }
                }
            }
            Event::MainEventsCleared => {
                self.renderer.window().request_redraw();
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_keyboard(&mut self, input: &KeyboardInput, control_flow: &mut ControlFlow) {
        if input.state != ElementState::Pressed {
            return;
        }
        let Some(key) = input.virtual_keycode else {
            return;
        };

        // One degree per key press, mirroring the drag gesture granularity.
        const NUDGE: f32 = std::f32::consts::PI / 180.0;
        match key {
            VirtualKeyCode::Space => self.spin.toggle(),
            VirtualKeyCode::Up => self.transforms.rotate(Vec3::new(-1.0, 0.0, 0.0), NUDGE),
            VirtualKeyCode::Down => self.transforms.rotate(Vec3::new(1.0, 0.0, 0.0), NUDGE),
            VirtualKeyCode::Left => self.transforms.rotate(Vec3::new(0.0, -1.0, 0.0), NUDGE),
            VirtualKeyCode::Right => self.transforms.rotate(Vec3::new(0.0, 1.0, 0.0), NUDGE),
            VirtualKeyCode::R => {
                self.transforms.reset();
                self.transforms.start();
            }
            VirtualKeyCode::Escape => control_flow.set_exit(),
            _ => {}
        }
    }
}

#[derive(Debug)]
struct WindowInitError {
    message: String,
}

impl WindowInitError {
    fn from_panic(stage: &str, panic: Box<dyn Any + Send>) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {}", panic_message(panic)),
        }
    }

    fn from_error(stage: &str, err: impl fmt::Display) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {err}"),
        }
    }
}

impl fmt::Display for WindowInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WindowInitError {}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

struct CliOptions {
    settings_path: Option<String>,
    assets_dir: Option<String>,
    summary_only: bool,
    frames: u32,
}

impl CliOptions {
    fn parse() -> Result<Self> {
        let mut options = Self {
            settings_path: None,
            assets_dir: None,
            summary_only: false,
            frames: 120,
        };

        let mut args = env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--assets" => {
                    let dir = args
                        .next()
                        .ok_or_else(|| anyhow!("--assets requires a directory"))?;
                    options.assets_dir = Some(dir);
                }
                "--frames" => {
                    let count = args
                        .next()
                        .ok_or_else(|| anyhow!("--frames requires a count"))?;
                    options.frames = count
                        .parse()
                        .map_err(|err| anyhow!("invalid frame count: {err}"))?;
                }
                "--summary-only" => options.summary_only = true,
                other if other.starts_with("--") => {
                    return Err(anyhow!(
                        "Unknown argument: {other}. Usage: spincube [settings.xml] [--assets DIR] [--summary-only] [--frames N]"
                    ));
                }
                positional => {
                    if options.settings_path.is_some() {
                        return Err(anyhow!("more than one settings file given"));
                    }
                    options.settings_path = Some(positional.to_string());
                }
            }
        }

        Ok(options)
    }
}
