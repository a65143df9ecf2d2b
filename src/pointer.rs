use std::time::Duration;

use glam::Vec2;
use instant::Instant;

/// No pointer movement for longer than this switches the swarm to idle drift.
pub const IDLE_THRESHOLD: Duration = Duration::from_millis(2000);

/// Swarm behavior for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwarmMode {
    /// Follow the pointer.
    Pursuit,
    /// Drift around randomly.
    Idle,
}

impl SwarmMode {
    pub fn label(self) -> &'static str {
        match self {
            SwarmMode::Pursuit => "Pursuit",
            SwarmMode::Idle => "Idle",
        }
    }
}

/// Last known pointer position and when it last moved.
#[derive(Debug, Clone, Copy)]
pub struct PointerState {
    /// `None` until the first movement arrives.
    pub pos: Option<Vec2>,
    pub last_move: Instant,
}

impl PointerState {
    pub fn new(now: Instant) -> Self {
        Self {
            pos: None,
            last_move: now,
        }
    }

    pub fn moved_to(&mut self, pos: Vec2, at: Instant) {
        self.pos = Some(pos);
        self.last_move = at;
    }

    /// Idle once strictly more than [`IDLE_THRESHOLD`] has passed since the last move.
    pub fn mode(&self, now: Instant) -> SwarmMode {
        if now.saturating_duration_since(self.last_move) > IDLE_THRESHOLD {
            SwarmMode::Idle
        } else {
            SwarmMode::Pursuit
        }
    }
}

/// Host notifications, queued and applied between ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMoved { pos: Vec2, at: Instant },
    Resized { width: u32, height: u32 },
}
