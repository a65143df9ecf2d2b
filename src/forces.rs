use glam::Vec2;

use crate::particle::Particle;
use crate::pointer::SwarmMode;

/// Particles closer than this push each other apart.
pub const REPULSION_RADIUS: f32 = 80.0;
/// Repulsion at zero distance.
const REPULSION_STRENGTH: f32 = 0.5;

/// Particles this close to the pointer stop being pulled.
const PURSUIT_DEADZONE: f32 = 10.0;
/// Distance over which pursuit ramps up to full strength.
const PURSUIT_RAMP: f32 = 150.0;
/// Cap on the pursuit ramp factor.
const PURSUIT_RAMP_MAX: f32 = 2.0;
const PURSUIT_STRENGTH: f32 = 0.08;
/// Per-axis jitter span while pursuing, centered on zero.
const PURSUIT_JITTER: f32 = 0.3;
/// Speed ceiling while pursuing.
pub const PURSUIT_MAX_SPEED: f32 = 3.0;

/// Per-axis jitter span while idle, centered on zero.
const WANDER_JITTER: f32 = 0.4;
/// Offset of the drift target away from the surface center.
const WANDER_OFFSET: f32 = 50.0;
const WANDER_PULL: f32 = 0.0001;
/// Speed ceiling while idle.
pub const IDLE_MAX_SPEED: f32 = 1.5;

/// Velocity multiplier applied once per tick.
pub const FRICTION: f32 = 0.97;

/// Push on a particle at `pos` from a neighbor at `other`.
/// Zero outside the radius and for exactly coincident points.
pub fn repulsion(pos: Vec2, other: Vec2) -> Vec2 {
    let away = pos - other;
    let dist = away.length();
    if dist < REPULSION_RADIUS && dist > 0.0 {
        let strength = (REPULSION_RADIUS - dist) / REPULSION_RADIUS * REPULSION_STRENGTH;
        away / dist * strength
    } else {
        Vec2::ZERO
    }
}

/// Pull toward the pointer, before jitter and clamping.
pub fn pursuit(pos: Vec2, target: Vec2) -> Vec2 {
    let to_target = target - pos;
    let dist = to_target.length();
    if dist > PURSUIT_DEADZONE {
        let ramp = (dist / PURSUIT_RAMP).min(PURSUIT_RAMP_MAX);
        to_target / dist * ramp * PURSUIT_STRENGTH
    } else {
        Vec2::ZERO
    }
}

/// Weak drift away from `center`, before jitter and clamping.
///
/// The target sits a fixed offset from the particle itself, so this is a
/// constant nudge of `WANDER_OFFSET * WANDER_PULL` per axis.
pub fn wander_pull(pos: Vec2, center: Vec2) -> Vec2 {
    let target_x = if pos.x < center.x { pos.x - WANDER_OFFSET } else { pos.x + WANDER_OFFSET };
    let target_y = if pos.y < center.y { pos.y - WANDER_OFFSET } else { pos.y + WANDER_OFFSET };
    (Vec2::new(target_x, target_y) - pos) * WANDER_PULL
}

/// Uniform noise in `[-span / 2, span / 2)` per axis.
fn jitter(rng: &mut fastrand::Rng, span: f32) -> Vec2 {
    Vec2::new((rng.f32() - 0.5) * span, (rng.f32() - 0.5) * span)
}

/// Accumulate all forces into `particles[index].vel` for one tick.
///
/// Repulsion reads the current positions of every other particle, so when
/// called in order over the set, later particles see earlier ones already moved.
pub fn apply(
    particles: &mut [Particle],
    index: usize,
    pointer: Option<Vec2>,
    mode: SwarmMode,
    bounds: Vec2,
    rng: &mut fastrand::Rng,
) {
    let pos = particles[index].pos;
    let mut vel = particles[index].vel;

    for (other_index, other) in particles.iter().enumerate() {
        if other_index != index {
            vel += repulsion(pos, other.pos);
        }
    }

    match (mode, pointer) {
        (SwarmMode::Pursuit, Some(target)) => {
            vel += pursuit(pos, target);
            vel += jitter(rng, PURSUIT_JITTER);
            vel = vel.clamp_length_max(PURSUIT_MAX_SPEED);
        }
        // Idle, or no pointer seen yet
        _ => {
            vel += jitter(rng, WANDER_JITTER);
            vel += wander_pull(pos, bounds * 0.5);
            vel = vel.clamp_length_max(IDLE_MAX_SPEED);
        }
    }

    particles[index].vel = vel * FRICTION;
}
