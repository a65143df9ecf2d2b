//! Host OS glue. Windows gets the full overlay; elsewhere the window is a
//! plain transparent one and the hit-test never finds content.
//!
//! Non-Windows hosts are drift-only: the click-through window gets no
//! `CursorMoved` events and there is no global cursor poll, so the swarm
//! never leaves idle mode there.

use glam::Vec2;

#[cfg(windows)]
pub mod win32;

#[cfg(windows)]
pub use win32::DesktopHitTest;

#[cfg(not(windows))]
pub use fallback::DesktopHitTest;

/// Make the window click-through and strip its chrome.
#[cfg(windows)]
pub fn setup_overlay(window: &winit::window::Window) {
    win32::setup_overlay(window);
}

#[cfg(not(windows))]
pub fn setup_overlay(window: &winit::window::Window) {
    if let Err(e) = window.set_cursor_hittest(false) {
        log::warn!("Could not make overlay click-through: {e}");
    }
}

/// Global cursor position, when the OS lets us poll it.
///
/// A click-through window receives no cursor events, so the app polls this
/// every loop. Only Windows can answer; elsewhere it is always `None`.
#[cfg(windows)]
pub fn cursor_position() -> Option<Vec2> {
    win32::get_mouse_pos()
}

#[cfg(not(windows))]
pub fn cursor_position() -> Option<Vec2> {
    None
}

/// Whether Escape is held, independent of focus.
#[cfg(windows)]
pub fn escape_pressed() -> bool {
    win32::is_escape_pressed()
}

#[cfg(not(windows))]
pub fn escape_pressed() -> bool {
    false
}

#[cfg(not(windows))]
mod fallback {
    use glam::Vec2;

    use crate::color::{Background, HitTest};

    /// Hit-test for hosts that cannot see beneath the overlay.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct DesktopHitTest;

    impl DesktopHitTest {
        pub fn new(_window: &winit::window::Window) -> Self {
            Self
        }
    }

    impl HitTest for DesktopHitTest {
        fn background_at(&self, _point: Vec2) -> Option<Background> {
            None
        }
    }
}
