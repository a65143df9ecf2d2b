use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::color::Color;

/// Per-instance data uploaded to GPU each frame.
/// Stride = 24 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CircleInstance {
    /// Screen position (x, y) of the center.
    pub position: [f32; 2],
    /// Disc radius in pixels.
    pub radius: f32,
    /// Shadow blur radius in pixels (0 = no glow).
    pub blur: f32,
    /// Fill RGBA packed as u32.
    pub color: u32,
    /// Glow RGBA packed as u32.
    pub glow: u32,
}

impl CircleInstance {
    pub fn solid(center: Vec2, radius: f32, color: Color) -> Self {
        Self {
            position: center.into(),
            radius,
            blur: 0.0,
            color: color.0,
            glow: 0,
        }
    }

    pub fn glowing(center: Vec2, radius: f32, color: Color, blur: f32, glow: Color) -> Self {
        Self {
            position: center.into(),
            radius,
            blur: blur.max(0.0),
            color: color.0,
            glow: glow.0,
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::from(self.position)
    }
}
