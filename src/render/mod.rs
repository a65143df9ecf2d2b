pub mod gpu;
pub mod instance;
pub mod pipeline;

use glam::Vec2;

use crate::color::Color;
use crate::particle::Particle;

/// Blur radius of the glow pass drawn over each particle.
pub const GLOW_BLUR: f32 = 8.0;

/// 2D drawing target the swarm is painted onto.
pub trait DrawSurface {
    /// Set the pixel dimensions of the drawing area.
    fn set_size(&mut self, width: u32, height: u32);

    fn size(&self) -> (u32, u32);

    /// Erase everything inside the rectangle back to full transparency.
    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32);

    /// Solid filled circle.
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);

    /// Filled circle with a soft shadow of `blur` pixels in `glow` color behind it.
    fn fill_circle_glow(&mut self, center: Vec2, radius: f32, color: Color, blur: f32, glow: Color);

    /// Called once after each frame's drawing is complete.
    fn flush(&mut self) {}

    /// Remove the surface from the host. No drawing happens afterwards.
    fn detach(&mut self) {}
}

/// Clear the surface and paint every particle, in insertion order.
pub fn draw(surface: &mut impl DrawSurface, particles: &[Particle]) {
    let (width, height) = surface.size();
    surface.clear_rect(0.0, 0.0, width as f32, height as f32);

    for p in particles {
        surface.fill_circle(p.pos, p.size, p.color);
        surface.fill_circle_glow(p.pos, p.size, p.color, GLOW_BLUR, p.color);
    }
}
