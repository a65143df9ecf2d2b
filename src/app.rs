use std::sync::Arc;

use glam::Vec2;
use instant::Instant;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId, WindowLevel};

use crate::config::SwarmConfig;
use crate::controller::{FrameHandle, FrameScheduler, SwarmController};
use crate::error::OverlayError;
use crate::platform::{self, DesktopHitTest};
use crate::pointer::InputEvent;
use crate::render::gpu::{GpuState, OverlaySurface};

/// How often to log FPS (seconds).
const FPS_LOG_INTERVAL: f64 = 5.0;

// ---------------------------------------------------------------------------
// Frame timing
// ---------------------------------------------------------------------------

struct FrameStats {
    frame_count: u64,
    last_log_time: Instant,
    frame_time_sum: f64,
    frame_time_min: f64,
    frame_time_max: f64,
    frames_since_log: u32,
}

impl FrameStats {
    fn new() -> Self {
        Self {
            frame_count: 0,
            last_log_time: Instant::now(),
            frame_time_sum: 0.0,
            frame_time_min: f64::MAX,
            frame_time_max: 0.0,
            frames_since_log: 0,
        }
    }

    fn record_frame(&mut self, dt: f64) {
        self.frame_count += 1;
        self.frames_since_log += 1;
        self.frame_time_sum += dt;
        self.frame_time_min = self.frame_time_min.min(dt);
        self.frame_time_max = self.frame_time_max.max(dt);

        let elapsed = self.last_log_time.elapsed().as_secs_f64();
        if elapsed >= FPS_LOG_INTERVAL {
            let avg_ms = (self.frame_time_sum / self.frames_since_log as f64) * 1000.0;
            let fps = self.frames_since_log as f64 / elapsed;
            log::info!(
                "FPS: {:.0} | avg: {:.2}ms | min: {:.2}ms | max: {:.2}ms | total frames: {}",
                fps,
                avg_ms,
                self.frame_time_min * 1000.0,
                self.frame_time_max * 1000.0,
                self.frame_count,
            );
            self.last_log_time = Instant::now();
            self.frame_time_sum = 0.0;
            self.frame_time_min = f64::MAX;
            self.frame_time_max = 0.0;
            self.frames_since_log = 0;
        }
    }
}

// ---------------------------------------------------------------------------
// Frame scheduling
// ---------------------------------------------------------------------------

/// Maps frame requests onto winit redraw requests.
///
/// A redraw cannot be withdrawn once asked for; the controller drops its
/// pending handle on stop, so a late `RedrawRequested` does nothing.
struct WindowScheduler {
    window: Arc<Window>,
    next: u64,
}

impl FrameScheduler for WindowScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next += 1;
        self.window.request_redraw();
        FrameHandle(self.next)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        log::trace!("Frame {} cancelled", handle.0);
    }
}

type Controller = SwarmController<OverlaySurface, DesktopHitTest, WindowScheduler>;

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Top-level application state.
struct App {
    config: SwarmConfig,
    window: Option<Arc<Window>>,
    controller: Option<Controller>,

    // Last polled cursor position, so unchanged polls are not reported as motion.
    last_cursor: Option<Vec2>,

    last_frame_time: Option<Instant>,
    frame_stats: FrameStats,

    // Startup failure, returned from `run` once the loop exits.
    error: Option<OverlayError>,
}

impl App {
    fn new(config: SwarmConfig) -> Self {
        Self {
            config,
            window: None,
            controller: None,
            last_cursor: None,
            last_frame_time: None,
            frame_stats: FrameStats::new(),
            error: None,
        }
    }

    /// Create the overlay window, the GPU surface and the swarm.
    fn init_overlay(&mut self, event_loop: &ActiveEventLoop) -> Result<(), OverlayError> {
        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
            .ok_or(OverlayError::NoMonitor)?;
        let screen_size = monitor.size();

        // Windows: no with_transparent(true). It sets WS_EX_LAYERED, which
        // fights DirectComposition; transparency comes from DxgiFromVisual.
        // Start hidden so DWM does not cache frame state before restyling.
        let attrs = WindowAttributes::default()
            .with_title("swarmfx")
            .with_decorations(false)
            .with_visible(false)
            .with_transparent(cfg!(not(windows)))
            .with_window_level(WindowLevel::AlwaysOnTop)
            .with_inner_size(screen_size)
            .with_position(winit::dpi::PhysicalPosition::new(0, 0));

        let window = Arc::new(event_loop.create_window(attrs)?);
        platform::setup_overlay(&window);

        let size = window.inner_size();
        log::info!(
            "Overlay window created: {}x{} on {:?}",
            size.width,
            size.height,
            monitor.name().unwrap_or_default()
        );

        let gpu = GpuState::new(window.clone())?;
        log::info!("wgpu + circle pipeline initialized");

        let scheduler = WindowScheduler {
            window: window.clone(),
            next: 0,
        };
        let mut controller = SwarmController::new(
            OverlaySurface::new(gpu),
            DesktopHitTest::new(&window),
            scheduler,
            size.width,
            size.height,
            self.config,
            Instant::now(),
        );
        controller.start();

        event_loop.set_control_flow(ControlFlow::Poll);

        // Show the window only once styles and GPU resources are ready.
        window.set_visible(true);

        self.window = Some(window);
        self.controller = Some(controller);
        Ok(())
    }

    fn push_event(&mut self, event: InputEvent) {
        if let Some(controller) = &mut self.controller {
            controller.push_event(event);
        }
    }

    fn poll_cursor(&mut self) {
        let Some(pos) = platform::cursor_position() else {
            return;
        };
        if self.last_cursor == Some(pos) {
            return;
        }
        self.last_cursor = Some(pos);
        self.push_event(InputEvent::PointerMoved {
            pos,
            at: Instant::now(),
        });
    }

    fn shutdown(&mut self) {
        if let Some(controller) = &mut self.controller {
            controller.stop();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.error.is_some() {
            return;
        }

        if let Err(e) = self.init_overlay(event_loop) {
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        // Click-through window never gets keyboard focus, so poll.
        if platform::escape_pressed() {
            log::info!("ESC pressed, exiting");
            self.shutdown();
            event_loop.exit();
            return;
        }

        self.poll_cursor();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting");
                self.shutdown();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.push_event(InputEvent::Resized {
                    width: new_size.width,
                    height: new_size.height,
                });
            }
            WindowEvent::CursorMoved { position, .. } => {
                let pos = Vec2::new(position.x as f32, position.y as f32);
                self.last_cursor = Some(pos);
                self.push_event(InputEvent::PointerMoved {
                    pos,
                    at: Instant::now(),
                });
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                if let Some(last) = self.last_frame_time {
                    self.frame_stats
                        .record_frame(now.duration_since(last).as_secs_f64());
                }
                self.last_frame_time = Some(now);

                if let Some(controller) = &mut self.controller {
                    controller.on_frame(now);
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

/// Entry point — create event loop and run.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    run_with(SwarmConfig::default())
}

pub fn run_with(config: SwarmConfig) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("Starting swarm with {} particles", config.particle_count);
    let event_loop = EventLoop::new().map_err(OverlayError::from)?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app).map_err(OverlayError::from)?;
    match app.error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
