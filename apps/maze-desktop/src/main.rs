mod keymap;

use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use maze_common::{MazeConfig, StrategyPreference};
use maze_input::Action;
use maze_render::{FrameStats, Gpu, Scene};
use maze_render_wgpu::{WgpuGpu, program_source};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

/// Record one frame into the backend. `None` means nothing should be
/// presented this frame.
fn record_frame<G: Gpu>(scene: &mut Scene<G>) -> Option<FrameStats> {
    match scene.frame() {
        Ok(stats) => Some(stats),
        Err(e) => {
            tracing::error!("frame failed: {e}");
            None
        }
    }
}

#[derive(Parser)]
#[command(name = "maze-desktop", about = "Maze viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Block drawing strategy: auto, instanced or per-instance
    #[arg(long)]
    strategy: Option<StrategyPreference>,
}

/// Application state.
struct AppState {
    config: MazeConfig,
    scene: Option<Scene<WgpuGpu>>,
    show_help: bool,
    last_stats: FrameStats,
    frames: u64,
}

impl AppState {
    fn new(config: MazeConfig) -> Self {
        Self {
            config,
            scene: None,
            show_help: true,
            last_stats: FrameStats::default(),
            frames: 0,
        }
    }

    /// Returns `false` when the app should exit.
    fn handle_action(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return false,
            Action::ToggleHelp => self.show_help = !self.show_help,
            action => {
                if let Some(scene) = &mut self.scene {
                    action.apply(scene.transforms_mut(), &self.config.steps);
                }
            }
        }
        true
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_help {
            return;
        }
        let Some(scene) = &mut self.scene else {
            return;
        };

        let mut reset = false;
        egui::SidePanel::left("help")
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.heading("Maze");
                ui.separator();
                ui.label(format!("Walls: {}", scene.blocks().instance_count()));
                ui.label(format!("Strategy: {}", scene.blocks().strategy()));
                ui.label(format!("Frames: {}", self.frames));
                ui.label(format!("Instances drawn: {}", self.last_stats.instances_drawn));
                ui.label(format!("MVP uploads: {}", scene.program().mvp_uploads()));
                let eye = scene.transforms().view.eye();
                ui.label(format!("Eye: ({:.1}, {:.1}, {:.1})", eye.x, eye.y, eye.z));
                ui.separator();

                ui.heading("Keys");
                egui::Grid::new("keys").striped(true).show(ui, |ui| {
                    for (key, what) in keymap::HELP {
                        ui.label(*key);
                        ui.label(*what);
                        ui.end_row();
                    }
                });
                ui.separator();
                if ui.button("Reset (Home)").clicked() {
                    reset = true;
                }
            });

        if reset {
            Action::ResetView.apply(scene.transforms_mut(), &self.config.steps);
        }
    }
}

struct GpuApp {
    state: AppState,
    surface: Option<wgpu::Surface<'static>>,
    surface_config: Option<wgpu::SurfaceConfiguration>,
    window: Option<Arc<Window>>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
    failure: Option<anyhow::Error>,
}

impl GpuApp {
    fn new(config: MazeConfig) -> Self {
        Self {
            state: AppState::new(config),
            surface: None,
            surface_config: None,
            window: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
            failure: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("Maze")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no suitable GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("maze_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        let gpu = WgpuGpu::new(
            device,
            queue,
            surface_format,
            surface_config.width,
            surface_config.height,
        );
        let aspect = surface_config.width as f32 / surface_config.height as f32;
        let scene = Scene::new(gpu, &self.state.config, aspect, program_source())?;

        self.state.scene = Some(scene);
        self.window = Some(window);
        self.surface = Some(surface);
        self.surface_config = Some(surface_config);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);
        Ok(())
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        let (Some(surface), Some(surface_config), Some(scene)) =
            (&self.surface, &mut self.surface_config, &mut self.state.scene)
        else {
            return;
        };
        surface_config.width = size.width.max(1);
        surface_config.height = size.height.max(1);
        surface.configure(scene.gpu().device(), surface_config);
        scene
            .gpu_mut()
            .resize(surface_config.width, surface_config.height);
        scene.resize(surface_config.width as f32 / surface_config.height as f32);
    }

    fn redraw(&mut self) {
        let (Some(surface), Some(scene)) = (&self.surface, &mut self.state.scene) else {
            return;
        };

        let output = match surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                if let Some(surface_config) = &self.surface_config {
                    surface.configure(scene.gpu().device(), surface_config);
                }
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let Some(stats) = record_frame(scene) else {
            return;
        };
        scene.gpu_mut().present(&view);
        self.state.last_stats = stats;
        self.state.frames += 1;

        self.draw_overlay(&view);
        output.present();
    }

    fn draw_overlay(&mut self, view: &wgpu::TextureView) {
        let (Some(window), Some(egui_winit), Some(surface_config)) =
            (&self.window, &mut self.egui_winit, &self.surface_config)
        else {
            return;
        };

        let raw_input = egui_winit.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_ui(ctx);
        });
        egui_winit.handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [surface_config.width, surface_config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let (Some(egui_renderer), Some(scene)) = (&mut self.egui_renderer, &self.state.scene)
        else {
            return;
        };
        let (device, queue) = (scene.gpu().device(), scene.gpu().queue());

        for (id, image_delta) in &full_output.textures_delta.set {
            egui_renderer.update_texture(device, queue, *id, image_delta);
        }
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui_encoder"),
        });
        egui_renderer.update_buffers(device, queue, &mut encoder, &paint_jobs, &screen_descriptor);
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            egui_renderer.free_texture(id);
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.failure.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            tracing::error!("startup failed: {e:#}");
            self.failure = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(egui_winit), Some(window)) = (&mut self.egui_winit, &self.window) {
            if egui_winit.on_window_event(window, &event).consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.resize(new_size);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                if !self.state.handle_action(keymap::action_for(key)) {
                    event_loop.exit();
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn load_config(cli: &Cli) -> Result<MazeConfig> {
    let mut config = match &cli.config {
        Some(path) => MazeConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => MazeConfig::default(),
    };
    if let Some(strategy) = cli.strategy {
        config.strategy = strategy;
    }
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("maze-desktop starting");
    let config = load_config(&cli)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(config);
    event_loop.run_app(&mut app)?;

    if let Some(scene) = &mut app.state.scene {
        scene.teardown();
    }
    match app.failure.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
