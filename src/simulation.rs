use glam::Vec2;
use instant::Instant;

use crate::color::{ColorSampler, HitTest};
use crate::forces;
use crate::particle::{seed_particles, Particle};
use crate::pointer::{InputEvent, PointerState, SwarmMode};

/// Each particle resamples its color once every this many ticks.
pub const COLOR_REFRESH_INTERVAL: u64 = 30;

/// Whether particle `index` resamples its color on tick `tick_count`.
/// Spreads backdrop sampling evenly across frames.
pub fn color_refresh_due(tick_count: u64, index: usize) -> bool {
    tick_count % COLOR_REFRESH_INTERVAL == index as u64 % COLOR_REFRESH_INTERVAL
}

/// Move a coordinate that left `[0, extent]` to the opposite edge.
fn wrap(v: f32, extent: f32) -> f32 {
    if v < 0.0 {
        extent
    } else if v > extent {
        0.0
    } else {
        v
    }
}

/// Owns the particle set plus the pointer and surface state that drive it.
pub struct SwarmSimulator {
    particles: Vec<Particle>,
    pointer: PointerState,
    width: f32,
    height: f32,
    tick_count: u64,
    /// Mode used by the most recent tick.
    mode: SwarmMode,
}

impl SwarmSimulator {
    /// Seed `count` particles over a `width` x `height` surface.
    pub fn new(count: usize, width: f32, height: f32, now: Instant, rng: &mut fastrand::Rng) -> Self {
        Self::from_particles(seed_particles(count, width, height, rng), width, height, now)
    }

    /// Start from an explicit particle set.
    pub fn from_particles(particles: Vec<Particle>, width: f32, height: f32, now: Instant) -> Self {
        Self {
            particles,
            pointer: PointerState::new(now),
            width,
            height,
            tick_count: 0,
            mode: SwarmMode::Pursuit,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn mode(&self) -> SwarmMode {
        self.mode
    }

    pub fn pointer_moved(&mut self, pos: Vec2, at: Instant) {
        self.pointer.moved_to(pos, at);
    }

    /// Adopt new surface dimensions. A zero extent (minimized window) is
    /// ignored; wrapping against it would collapse every particle onto an edge.
    pub fn resize(&mut self, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 {
            log::debug!("Ignoring degenerate resize to {}x{}", width, height);
            return;
        }
        self.width = width;
        self.height = height;
    }

    /// Apply a queued host notification. Never touches particle data.
    pub fn apply_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMoved { pos, at } => self.pointer_moved(pos, at),
            InputEvent::Resized { width, height } => self.resize(width as f32, height as f32),
        }
    }

    /// Advance every particle by one step.
    pub fn tick<H: HitTest>(&mut self, now: Instant, sampler: &ColorSampler<H>, rng: &mut fastrand::Rng) {
        let mode = self.pointer.mode(now);
        if mode != self.mode {
            log::debug!("Swarm mode: {} -> {}", self.mode.label(), mode.label());
            self.mode = mode;
        }

        self.tick_count += 1;
        let bounds = self.size();
        let pointer = self.pointer.pos;

        for index in 0..self.particles.len() {
            if color_refresh_due(self.tick_count, index) {
                let pos = self.particles[index].pos;
                self.particles[index].color = sampler.sample(pos, rng);
            }

            forces::apply(&mut self.particles, index, pointer, mode, bounds, rng);

            let p = &mut self.particles[index];
            p.pos += p.vel;
            p.pos.x = wrap(p.pos.x, self.width);
            p.pos.y = wrap(p.pos.y, self.height);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::time::Duration;

    use super::*;
    use crate::color::{Background, Color, DARK_PALETTE, LIGHT_PALETTE};
    use crate::forces::{FRICTION, IDLE_MAX_SPEED, PURSUIT_MAX_SPEED};

    const EPS: f32 = 1e-4;

    fn white() -> ColorSampler<impl HitTest> {
        ColorSampler::new(|_: Vec2| Some(Background::Rgb(Color::rgba(255, 255, 255, 255))))
    }

    fn in_bounds(sim: &SwarmSimulator) -> bool {
        let size = sim.size();
        sim.particles()
            .iter()
            .all(|p| p.pos.x >= 0.0 && p.pos.x <= size.x && p.pos.y >= 0.0 && p.pos.y <= size.y)
    }

    #[test]
    fn wrap_moves_to_opposite_edge() {
        assert_eq!(wrap(-0.1, 800.0), 800.0);
        assert_eq!(wrap(800.1, 800.0), 0.0);
        assert_eq!(wrap(800.0, 800.0), 800.0);
        assert_eq!(wrap(0.0, 800.0), 0.0);
        assert_eq!(wrap(421.5, 800.0), 421.5);
    }

    #[test]
    fn positions_stay_in_bounds_while_pursuing() {
        let t0 = Instant::now();
        let mut rng = fastrand::Rng::with_seed(21);
        let sampler = white();
        let mut sim = SwarmSimulator::new(200, 640.0, 480.0, t0, &mut rng);

        for frame in 0..300u64 {
            let now = t0 + Duration::from_millis(frame * 16);
            // Pointer sweeps past the edges.
            let pointer = Vec2::new((frame as f32 * 7.0) % 700.0 - 30.0, 240.0);
            sim.pointer_moved(pointer, now);
            sim.tick(now, &sampler, &mut rng);
            assert!(in_bounds(&sim), "out of bounds at frame {frame}");
            assert_eq!(sim.mode(), SwarmMode::Pursuit);
            for p in sim.particles() {
                assert!(p.speed() <= PURSUIT_MAX_SPEED + EPS);
            }
        }
    }

    #[test]
    fn positions_stay_in_bounds_while_idle() {
        let t0 = Instant::now();
        let mut rng = fastrand::Rng::with_seed(22);
        let sampler = white();
        let mut sim = SwarmSimulator::new(120, 300.0, 200.0, t0, &mut rng);

        for frame in 0..300u64 {
            let now = t0 + Duration::from_secs(3) + Duration::from_millis(frame * 16);
            sim.tick(now, &sampler, &mut rng);
            assert!(in_bounds(&sim));
            assert_eq!(sim.mode(), SwarmMode::Idle);
            for p in sim.particles() {
                assert!(p.speed() <= IDLE_MAX_SPEED * FRICTION + EPS);
            }
        }
    }

    #[test]
    fn shrinking_surface_rewraps_particles() {
        let t0 = Instant::now();
        let mut rng = fastrand::Rng::with_seed(23);
        let sampler = white();
        let mut sim = SwarmSimulator::new(50, 1000.0, 1000.0, t0, &mut rng);

        sim.apply_event(InputEvent::Resized { width: 200, height: 150 });
        sim.tick(t0, &sampler, &mut rng);
        assert_eq!(sim.size(), Vec2::new(200.0, 150.0));
        assert!(in_bounds(&sim));
    }

    #[test]
    fn zero_sized_resize_keeps_layout() {
        let t0 = Instant::now();
        let mut rng = fastrand::Rng::with_seed(25);
        let sampler = white();
        let mut sim = SwarmSimulator::new(200, 1920.0, 1080.0, t0, &mut rng);

        sim.apply_event(InputEvent::Resized { width: 0, height: 0 });
        assert_eq!(sim.size(), Vec2::new(1920.0, 1080.0));
        sim.tick(t0, &sampler, &mut rng);
        sim.apply_event(InputEvent::Resized { width: 1920, height: 0 });
        sim.tick(t0, &sampler, &mut rng);
        sim.apply_event(InputEvent::Resized { width: 1920, height: 1080 });
        sim.tick(t0, &sampler, &mut rng);

        let corners = [
            Vec2::ZERO,
            Vec2::new(1920.0, 0.0),
            Vec2::new(0.0, 1080.0),
            Vec2::new(1920.0, 1080.0),
        ];
        let cornered = sim
            .particles()
            .iter()
            .filter(|p| corners.iter().any(|c| p.pos.distance(*c) < 5.0))
            .count();
        assert!(cornered < 5, "{cornered} particles collapsed onto corners");
        assert!(in_bounds(&sim));
    }

    #[test]
    fn idle_flips_after_threshold() {
        let t0 = Instant::now();
        let mut rng = fastrand::Rng::with_seed(24);
        let sampler = white();
        let mut sim = SwarmSimulator::new(4, 100.0, 100.0, t0, &mut rng);
        sim.apply_event(InputEvent::PointerMoved { pos: Vec2::new(50.0, 50.0), at: t0 });

        sim.tick(t0 + Duration::from_millis(1999), &sampler, &mut rng);
        assert_eq!(sim.mode(), SwarmMode::Pursuit);

        sim.tick(t0 + Duration::from_millis(2001), &sampler, &mut rng);
        assert_eq!(sim.mode(), SwarmMode::Idle);
    }

    #[test]
    fn refresh_schedule_covers_each_index_once_per_window() {
        for start in [1u64, 17, 29, 30, 1000] {
            for index in 0..200usize {
                let hits = (start..start + COLOR_REFRESH_INTERVAL)
                    .filter(|&t| color_refresh_due(t, index))
                    .count();
                assert_eq!(hits, 1, "index {index} from tick {start}");
            }
        }
    }

    #[test]
    fn colors_resampled_once_per_thirty_ticks() {
        let t0 = Instant::now();
        let mut rng = fastrand::Rng::with_seed(25);
        let calls = Cell::new(0usize);
        let sampler = ColorSampler::new(|_: Vec2| {
            calls.set(calls.get() + 1);
            Some(Background::Rgb(Color::rgba(0, 0, 0, 255)))
        });
        let mut sim = SwarmSimulator::new(200, 800.0, 600.0, t0, &mut rng);

        // First tick is tick 1: indices 1, 31, 61, ...
        sim.tick(t0, &sampler, &mut rng);
        assert_eq!(calls.get(), 7);
        assert!(LIGHT_PALETTE.contains(&sim.particles()[1].color));
        assert!(!LIGHT_PALETTE.contains(&sim.particles()[0].color));

        for _ in 1..COLOR_REFRESH_INTERVAL {
            sim.tick(t0, &sampler, &mut rng);
        }
        assert_eq!(calls.get(), 200);
        assert!(sim.particles().iter().all(|p| LIGHT_PALETTE.contains(&p.color)));
    }

    #[test]
    fn close_pair_separates() {
        let t0 = Instant::now();
        let mut rng = fastrand::Rng::with_seed(26);
        let sampler = white();
        let particles = vec![
            Particle::new(Vec2::new(100.0, 100.0), Vec2::ZERO, 1.0, 0.5),
            Particle::new(Vec2::new(140.0, 100.0), Vec2::ZERO, 1.0, 0.5),
        ];
        let mut sim = SwarmSimulator::from_particles(particles, 400.0, 400.0, t0);
        sim.tick(t0, &sampler, &mut rng);

        let [a, b] = [sim.particles()[0], sim.particles()[1]];
        assert!(a.vel.x < 0.0, "first particle pushed left");
        assert!(b.vel.x > 0.0, "second particle pushed right");
        assert!(b.pos.x - a.pos.x > 40.0);
        // Tick 1 refreshes index 1 only.
        assert!(DARK_PALETTE.contains(&b.color));
    }
}
