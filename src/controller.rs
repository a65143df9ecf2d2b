use std::collections::VecDeque;

use instant::Instant;

use crate::color::{ColorSampler, HitTest};
use crate::config::SwarmConfig;
use crate::pointer::InputEvent;
use crate::render::{self, DrawSurface};
use crate::simulation::SwarmSimulator;

/// Identifies one scheduled frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHandle(pub u64);

/// "Run once per display refresh" primitive supplied by the host.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Created,
    Running,
    Stopped,
}

/// Owns the swarm and its host capabilities and drives the frame loop.
///
/// Input is queued by [`push_event`](Self::push_event) and applied at the
/// start of the next frame, so a tick always sees a consistent pointer and
/// surface size.
pub struct SwarmController<S, H, F> {
    surface: S,
    sampler: ColorSampler<H>,
    scheduler: F,
    simulator: SwarmSimulator,
    rng: fastrand::Rng,
    inbox: VecDeque<InputEvent>,
    pending: Option<FrameHandle>,
    lifecycle: Lifecycle,
}

impl<S, H, F> SwarmController<S, H, F>
where
    S: DrawSurface,
    H: HitTest,
    F: FrameScheduler,
{
    /// Size the surface to the viewport and seed the swarm. Nothing runs until [`start`](Self::start).
    pub fn new(
        mut surface: S,
        hit_test: H,
        scheduler: F,
        width: u32,
        height: u32,
        config: SwarmConfig,
        now: Instant,
    ) -> Self {
        surface.set_size(width, height);
        let mut rng = config.rng();
        let simulator = SwarmSimulator::new(
            config.particle_count,
            width as f32,
            height as f32,
            now,
            &mut rng,
        );
        log::info!("Seeded {} particles over {}x{}", config.particle_count, width, height);

        Self {
            surface,
            sampler: ColorSampler::new(hit_test),
            scheduler,
            simulator,
            rng,
            inbox: VecDeque::new(),
            pending: None,
            lifecycle: Lifecycle::Created,
        }
    }

    /// Schedule the first frame. Has no effect once started or stopped.
    pub fn start(&mut self) {
        if self.lifecycle != Lifecycle::Created {
            return;
        }
        self.lifecycle = Lifecycle::Running;
        self.pending = Some(self.scheduler.request_frame());
    }

    /// Queue a host notification for the next frame. Dropped after [`stop`](Self::stop).
    pub fn push_event(&mut self, event: InputEvent) {
        if self.lifecycle == Lifecycle::Stopped {
            return;
        }
        self.inbox.push_back(event);
    }

    /// Frame callback: apply queued input, tick, draw, schedule the next frame.
    /// Returns `false` without doing anything when no frame is pending.
    pub fn on_frame(&mut self, now: Instant) -> bool {
        if self.pending.take().is_none() {
            return false;
        }

        while let Some(event) = self.inbox.pop_front() {
            if let InputEvent::Resized { width, height } = event {
                if width > 0 && height > 0 {
                    self.surface.set_size(width, height);
                }
            }
            self.simulator.apply_event(event);
        }

        self.simulator.tick(now, &self.sampler, &mut self.rng);
        render::draw(&mut self.surface, self.simulator.particles());
        self.surface.flush();

        self.pending = Some(self.scheduler.request_frame());
        true
    }

    /// Cancel the pending frame and detach the surface. No tick runs after this returns.
    pub fn stop(&mut self) {
        if self.lifecycle == Lifecycle::Stopped {
            return;
        }
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
        self.inbox.clear();
        self.surface.detach();
        self.lifecycle = Lifecycle::Stopped;
        log::info!("Swarm stopped after {} ticks", self.simulator.tick_count());
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    pub fn simulator(&self) -> &SwarmSimulator {
        &self.simulator
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use glam::Vec2;

    use super::*;
    use crate::color::{Background, Color};
    use crate::pointer::SwarmMode;
    use crate::render::tests::{DrawCmd, RecordingSurface};

    #[derive(Debug, Default)]
    struct ManualScheduler {
        next: u64,
        requested: Vec<FrameHandle>,
        cancelled: Vec<FrameHandle>,
    }

    impl FrameScheduler for ManualScheduler {
        fn request_frame(&mut self) -> FrameHandle {
            self.next += 1;
            let handle = FrameHandle(self.next);
            self.requested.push(handle);
            handle
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            self.cancelled.push(handle);
        }
    }

    fn dark_page(_: Vec2) -> Option<Background> {
        Some(Background::Rgb(Color::rgba(10, 10, 10, 255)))
    }

    type TestController =
        SwarmController<RecordingSurface, fn(Vec2) -> Option<Background>, ManualScheduler>;

    fn controller(count: usize, now: Instant) -> TestController {
        let config = SwarmConfig {
            particle_count: count,
            seed: Some(5),
        };
        SwarmController::new(
            RecordingSurface::default(),
            dark_page as fn(Vec2) -> Option<Background>,
            ManualScheduler::default(),
            640,
            480,
            config,
            now,
        )
    }

    #[test]
    fn new_sizes_surface_and_waits_for_start() {
        let t0 = Instant::now();
        let mut c = controller(10, t0);
        assert_eq!(c.surface().size(), (640, 480));
        assert!(!c.is_running());
        assert!(!c.on_frame(t0), "no frame before start");
        assert_eq!(c.simulator().tick_count(), 0);
    }

    #[test]
    fn each_frame_ticks_draws_and_reschedules() {
        let t0 = Instant::now();
        let mut c = controller(10, t0);
        c.start();
        assert_eq!(c.scheduler().requested.len(), 1);

        for i in 1..=3u64 {
            assert!(c.on_frame(t0 + Duration::from_millis(i * 16)));
            assert_eq!(c.simulator().tick_count(), i);
        }
        assert_eq!(c.scheduler().requested.len(), 4);
        assert_eq!(c.surface().flushes, 3);
        // Clear + fill + glow per particle.
        assert_eq!(c.surface().commands.len(), 1 + 2 * 10);
        assert_eq!(
            c.surface().commands[0],
            DrawCmd::Clear { width: 640.0, height: 480.0 }
        );
    }

    #[test]
    fn duplicate_frame_callbacks_are_ignored() {
        let t0 = Instant::now();
        let mut c = controller(3, t0);
        c.start();
        assert!(c.on_frame(t0));
        assert!(c.on_frame(t0));
        assert_eq!(c.simulator().tick_count(), 2);
        c.stop();
        assert!(!c.on_frame(t0));
        assert_eq!(c.simulator().tick_count(), 2);
    }

    #[test]
    fn input_is_applied_at_next_frame() {
        let t0 = Instant::now();
        let mut c = controller(5, t0);
        c.start();

        c.push_event(InputEvent::PointerMoved { pos: Vec2::new(100.0, 120.0), at: t0 });
        c.push_event(InputEvent::Resized { width: 800, height: 600 });
        assert_eq!(c.simulator().pointer().pos, None, "queued, not applied");
        assert_eq!(c.surface().size(), (640, 480));

        assert!(c.on_frame(t0 + Duration::from_millis(16)));
        assert_eq!(c.simulator().pointer().pos, Some(Vec2::new(100.0, 120.0)));
        assert_eq!(c.simulator().size(), Vec2::new(800.0, 600.0));
        assert_eq!(c.surface().size(), (800, 600));
        assert_eq!(
            c.surface().commands[0],
            DrawCmd::Clear { width: 800.0, height: 600.0 }
        );
    }

    #[test]
    fn minimize_does_not_resize() {
        let t0 = Instant::now();
        let mut c = controller(5, t0);
        c.start();

        c.push_event(InputEvent::Resized { width: 0, height: 0 });
        assert!(c.on_frame(t0));
        assert_eq!(c.surface().size(), (640, 480));
        assert_eq!(c.simulator().size(), Vec2::new(640.0, 480.0));
        assert_eq!(
            c.surface().commands[0],
            DrawCmd::Clear { width: 640.0, height: 480.0 }
        );
    }

    #[test]
    fn idle_without_pointer_motion() {
        let t0 = Instant::now();
        let mut c = controller(5, t0);
        c.start();
        c.push_event(InputEvent::PointerMoved { pos: Vec2::new(1.0, 1.0), at: t0 });

        c.on_frame(t0 + Duration::from_millis(1999));
        assert_eq!(c.simulator().mode(), SwarmMode::Pursuit);
        c.on_frame(t0 + Duration::from_millis(2001));
        assert_eq!(c.simulator().mode(), SwarmMode::Idle);
    }

    #[test]
    fn stop_cancels_pending_frame_and_detaches() {
        let t0 = Instant::now();
        let mut c = controller(5, t0);
        c.start();
        c.on_frame(t0);
        let pending = *c.scheduler().requested.last().unwrap();

        c.push_event(InputEvent::Resized { width: 10, height: 10 });
        c.stop();
        assert!(!c.is_running());
        assert_eq!(c.scheduler().cancelled, vec![pending]);
        assert!(c.surface().detached);

        // Late input and frames are ignored.
        c.push_event(InputEvent::Resized { width: 20, height: 20 });
        assert!(!c.on_frame(t0 + Duration::from_millis(16)));
        assert_eq!(c.simulator().tick_count(), 1);
        assert_eq!(c.surface().size(), (640, 480));

        // Idempotent, and cannot restart.
        c.stop();
        c.start();
        assert_eq!(c.scheduler().cancelled.len(), 1);
        assert!(!c.on_frame(t0));
    }

    #[test]
    fn colors_adapt_to_dark_backdrop() {
        let t0 = Instant::now();
        let mut c = controller(30, t0);
        c.start();
        for _ in 0..30 {
            c.on_frame(t0);
        }
        assert!(c
            .simulator()
            .particles()
            .iter()
            .all(|p| crate::color::LIGHT_PALETTE.contains(&p.color)));
    }
}
