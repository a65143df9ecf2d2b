//! Error types for overlay startup.
//!
//! The simulation core never fails; these cover window and GPU setup, where
//! the binary logs the error and exits.

use std::fmt;

/// Errors that can occur during GPU initialization.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for the overlay window.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter(wgpu::RequestAdapterError),
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
    /// The surface reports no usable texture formats.
    NoSurfaceFormat,
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter(e) => write!(f, "No compatible GPU adapter found: {}", e),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
            GpuError::NoSurfaceFormat => write!(f, "Surface supports no texture formats"),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::NoAdapter(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            GpuError::NoSurfaceFormat => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestAdapterError> for GpuError {
    fn from(e: wgpu::RequestAdapterError) -> Self {
        GpuError::NoAdapter(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors that stop the overlay from coming up.
#[derive(Debug)]
pub enum OverlayError {
    /// No monitor to size the overlay to.
    NoMonitor,
    /// The event loop could not be created or stopped abnormally.
    EventLoop(winit::error::EventLoopError),
    /// The OS refused to create the overlay window.
    Window(winit::error::OsError),
    /// GPU setup failed.
    Gpu(GpuError),
}

impl fmt::Display for OverlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlayError::NoMonitor => write!(f, "No monitor found"),
            OverlayError::EventLoop(e) => write!(f, "Event loop error: {}", e),
            OverlayError::Window(e) => write!(f, "Failed to create overlay window: {}", e),
            OverlayError::Gpu(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for OverlayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OverlayError::NoMonitor => None,
            OverlayError::EventLoop(e) => Some(e),
            OverlayError::Window(e) => Some(e),
            OverlayError::Gpu(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for OverlayError {
    fn from(e: winit::error::EventLoopError) -> Self {
        OverlayError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for OverlayError {
    fn from(e: winit::error::OsError) -> Self {
        OverlayError::Window(e)
    }
}

impl From<GpuError> for OverlayError {
    fn from(e: GpuError) -> Self {
        OverlayError::Gpu(e)
    }
}
