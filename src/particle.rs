use glam::Vec2;

use crate::color::{Color, INITIAL_COLOR};

/// A single swarm particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    /// Units per tick.
    pub vel: Vec2,
    /// Radius, in [1, 3).
    pub size: f32,
    pub color: Color,
    /// In [0.3, 0.8). Not read by any force; kept per particle.
    pub base_speed: f32,
}

impl Particle {
    pub fn new(pos: Vec2, vel: Vec2, size: f32, base_speed: f32) -> Self {
        Self {
            pos,
            vel,
            size,
            color: INITIAL_COLOR,
            base_speed,
        }
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

/// Layout of the seeding grid for `count` particles over a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeedGrid {
    pub cols: usize,
    pub rows: usize,
    pub cell: Vec2,
}

impl SeedGrid {
    pub fn new(count: usize, width: f32, height: f32) -> Self {
        let cols = ((count as f64).sqrt().ceil() as usize).max(1);
        let rows = count.div_ceil(cols).max(1);
        Self {
            cols,
            rows,
            cell: Vec2::new(width / cols as f32, height / rows as f32),
        }
    }

    /// Top-left corner of the cell assigned to particle `index`.
    pub fn origin(&self, index: usize) -> Vec2 {
        let col = index % self.cols;
        let row = index / self.cols;
        Vec2::new(col as f32 * self.cell.x, row as f32 * self.cell.y)
    }
}

/// Create `count` particles spread one per grid cell, jittered inside their cell.
pub fn seed_particles(count: usize, width: f32, height: f32, rng: &mut fastrand::Rng) -> Vec<Particle> {
    let grid = SeedGrid::new(count, width, height);

    (0..count)
        .map(|index| {
            let jitter = Vec2::new(rng.f32() * grid.cell.x, rng.f32() * grid.cell.y);
            let vel = Vec2::new(rng.f32() - 0.5, rng.f32() - 0.5);
            let size = rng.f32() * 2.0 + 1.0;
            let base_speed = rng.f32() * 0.5 + 0.3;
            Particle::new(grid.origin(index) + jitter, vel, size, base_speed)
        })
        .collect()
}
