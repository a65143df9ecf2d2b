//! A swarm of small glowing particles drawn on a transparent overlay. They
//! chase the pointer, repel each other, drift when the pointer goes idle and
//! recolor themselves to contrast with whatever is underneath.

pub mod app;
pub mod color;
pub mod config;
pub mod controller;
pub mod error;
pub mod forces;
pub mod particle;
pub mod platform;
pub mod pointer;
pub mod render;
pub mod simulation;
