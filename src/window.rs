//! Native host: a winit window rendering the star field with wgpu.

use std::sync::Arc;
use std::time::{Duration, Instant};

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId, WindowLevel},
};

use crate::config::StarfieldConfig;
use crate::error::HostError;
use crate::gpu::{GpuState, VertexBatch};
use crate::input::{logical_bounds, SurfaceEvent};
use crate::scheduler::FramePacer;
use crate::simulation::Starfield;
use crate::time::FrameClock;

/// Open a window and animate until it is closed.
pub fn run(config: StarfieldConfig) -> Result<(), HostError> {
    config.validate()?;
    log::info!(
        "Starting with {} stars, {:?} scheduler",
        config.num_stars,
        config.scheduler
    );

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

struct App {
    config: StarfieldConfig,
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    starfield: Option<Starfield>,
    pacer: Option<FramePacer>,
    batch: VertexBatch,
    clock: FrameClock,
    /// Fatal error raised inside the event loop, reported by `run`.
    error: Option<HostError>,
}

impl App {
    fn new(config: StarfieldConfig) -> Self {
        Self {
            config,
            window: None,
            gpu_state: None,
            starfield: None,
            pacer: None,
            batch: VertexBatch::new(),
            clock: FrameClock::new(Instant::now()),
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), HostError> {
        let level = match self.config.surface.layer {
            l if l < 0 => WindowLevel::AlwaysOnBottom,
            l if l > 0 => WindowLevel::AlwaysOnTop,
            _ => WindowLevel::Normal,
        };

        let window_attrs = Window::default_attributes()
            .with_title("Star Wireframe")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720))
            .with_transparent(self.config.surface.background.is_none())
            .with_window_level(level);

        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let gpu_state = pollster::block_on(GpuState::new(window.clone(), &self.config.surface))?;

        let size = window.inner_size();
        let scale_factor = window.scale_factor();
        let bounds = logical_bounds(size, scale_factor);
        log::info!(
            "Surface {}x{} at scale {} ({}x{} logical)",
            size.width,
            size.height,
            scale_factor,
            bounds.width,
            bounds.height
        );

        let first_frame = Instant::now() + Duration::from_millis(self.config.start_delay_ms);
        let pacer = FramePacer::new(
            self.config.scheduler,
            window.clone(),
            self.config.fallback_fps,
            first_frame,
        );

        self.starfield = Some(Starfield::new(&self.config, bounds));
        self.gpu_state = Some(gpu_state);
        self.pacer = Some(pacer);
        self.window = Some(window);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: HostError) {
        log::error!("{}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(gpu_state), Some(starfield), Some(pacer)) =
            (&mut self.gpu_state, &mut self.starfield, &mut self.pacer)
        else {
            return;
        };

        if pacer.take_frame() {
            let report = starfield.advance_and_render(&mut self.batch, pacer.scheduler());
            gpu_state.upload(&self.batch);

            if let Some(fps) = self.clock.tick(Instant::now()) {
                log::debug!(
                    "{:.1} fps, {} lines, {} stars near pointer",
                    fps,
                    report.lines_drawn,
                    report.mouse_influenced
                );
            }
        }

        match gpu_state.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gpu_state.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                event_loop.exit();
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init(event_loop) {
                self.fail(event_loop, e);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let scale_factor = self.window.as_ref().map_or(1.0, |w| w.scale_factor());
        if let (Some(starfield), Some(surface_event)) = (
            &mut self.starfield,
            SurfaceEvent::from_window_event(&event, scale_factor),
        ) {
            surface_event.apply(starfield);
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.set_scale_factor(scale_factor);
                }
                if let (Some(starfield), Some(window)) = (&mut self.starfield, &self.window) {
                    starfield.on_resize(logical_bounds(window.inner_size(), scale_factor));
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(pacer) = &mut self.pacer {
            event_loop.set_control_flow(pacer.poll(Instant::now()));
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        log::info!("Stopped after {} frames", self.clock.frame());
    }
}
