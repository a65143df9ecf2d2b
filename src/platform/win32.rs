use glam::Vec2;
use raw_window_handle::{HasWindowHandle, RawWindowHandle};
use windows::Win32::Foundation::{HWND, POINT, RECT};
use windows::Win32::Graphics::Dwm::{DwmSetWindowAttribute, DWMWINDOWATTRIBUTE};
use windows::Win32::Graphics::Gdi::{GetPixel, GetWindowDC, ReleaseDC};
use windows::Win32::UI::Input::KeyboardAndMouse::GetAsyncKeyState;
use windows::Win32::UI::WindowsAndMessaging::{
    GetCursorPos, GetWindow, GetWindowLongPtrW, GetWindowRect, IsWindowVisible,
    SetWindowLongPtrW, SetWindowPos, WindowFromPoint, GWL_EXSTYLE, GW_HWNDNEXT, SWP_FRAMECHANGED,
    SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE, SWP_NOZORDER, WS_EX_NOACTIVATE, WS_EX_TOOLWINDOW,
};

use crate::color::{Background, Color, HitTest};

/// `GetPixel` result when the point is outside the DC's clip region.
const CLR_INVALID: u32 = 0xFFFF_FFFF;

/// Extract the Win32 HWND from a winit window.
pub fn get_hwnd(window: &winit::window::Window) -> Option<HWND> {
    let handle = window.window_handle().ok()?;
    match handle.as_raw() {
        RawWindowHandle::Win32(h) => Some(HWND(h.hwnd.get() as *mut core::ffi::c_void)),
        _ => None,
    }
}

fn set_dwm_u32(hwnd: HWND, attribute: i32, value: u32) {
    unsafe {
        let _ = DwmSetWindowAttribute(
            hwnd,
            DWMWINDOWATTRIBUTE(attribute),
            &value as *const u32 as *const core::ffi::c_void,
            4,
        );
    }
}

/// Apply overlay window styles: no activation, no taskbar entry, no border.
pub unsafe fn make_overlay(hwnd: HWND) {
    let style = GetWindowLongPtrW(hwnd, GWL_EXSTYLE);
    log::info!("Window ex-style before: 0x{:08X}", style);

    // Drop WS_EX_LAYERED; all pixels come from the DirectComposition visual
    // wgpu creates, so no GDI redirection surface either.
    const WS_EX_LAYERED: isize = 0x00080000;
    const WS_EX_NOREDIRECTIONBITMAP: isize = 0x00200000;

    let new_style = (style & !WS_EX_LAYERED)
        | WS_EX_NOACTIVATE.0 as isize
        | WS_EX_TOOLWINDOW.0 as isize
        | WS_EX_NOREDIRECTIONBITMAP;
    SetWindowLongPtrW(hwnd, GWL_EXSTYLE, new_style);

    log::info!("Window ex-style after:  0x{:08X}", new_style);

    // Make DWM pick up the new styles.
    let _ = SetWindowPos(
        hwnd,
        HWND::default(),
        0,
        0,
        0,
        0,
        SWP_FRAMECHANGED | SWP_NOMOVE | SWP_NOSIZE | SWP_NOZORDER | SWP_NOACTIVATE,
    );

    // DWMWA_NCRENDERING_POLICY = DWMNCRP_DISABLED
    set_dwm_u32(hwnd, 2, 2);
    // DWMWA_WINDOW_CORNER_PREFERENCE = DWMWCP_DONOTROUND
    set_dwm_u32(hwnd, 33, 1);
    // DWMWA_BORDER_COLOR = DWMWA_COLOR_NONE
    set_dwm_u32(hwnd, 34, 0xFFFF_FFFE);
    // DWMWA_SYSTEMBACKDROP_TYPE = DWMSBT_NONE
    set_dwm_u32(hwnd, 38, 1);
}

/// Set up the window as a transparent, click-through, always-on-top overlay.
pub fn setup_overlay(window: &winit::window::Window) {
    if let Err(e) = window.set_cursor_hittest(false) {
        log::warn!("Could not make overlay click-through: {e}");
    }

    let Some(hwnd) = get_hwnd(window) else {
        log::warn!("No Win32 handle for overlay window, skipping style setup");
        return;
    };
    unsafe {
        make_overlay(hwnd);
    }

    log::info!("Win32 overlay setup complete (DirectComposition + click-through + toolwindow)");
}

/// Current global cursor position in screen pixels.
pub fn get_mouse_pos() -> Option<Vec2> {
    let mut point = POINT::default();
    unsafe { GetCursorPos(&mut point) }.ok()?;
    Some(Vec2::new(point.x as f32, point.y as f32))
}

/// Check if ESC is currently held, regardless of window focus.
pub fn is_escape_pressed() -> bool {
    // VK_ESCAPE = 0x1B. High bit set = key is currently down.
    unsafe { GetAsyncKeyState(0x1B) & (0x8000u16 as i16) != 0 }
}

// ---------------------------------------------------------------------------
// Pixel hit-test
// ---------------------------------------------------------------------------

/// Reads the pixel color of the topmost foreign window under a screen point.
///
/// When the point lands on our own overlay, the windows below it in z-order
/// are searched instead, so the overlay never hides what it is drawn over.
#[derive(Debug, Clone, Copy)]
pub struct DesktopHitTest {
    own: Option<HWND>,
}

impl DesktopHitTest {
    pub fn new(window: &winit::window::Window) -> Self {
        Self {
            own: get_hwnd(window),
        }
    }
}

/// What the z-order walk needs to know about one window.
#[derive(Debug, Clone, Copy)]
struct WindowInfo {
    visible: bool,
    tool: bool,
    rect: RECT,
}

fn rect_contains(rect: &RECT, point: POINT) -> bool {
    point.x >= rect.left && point.x < rect.right && point.y >= rect.top && point.y < rect.bottom
}

/// First window, in z-order, that could be what the user sees at `point`.
/// Skips hidden windows, tool windows and zero-area windows.
fn first_covering<T>(windows: impl IntoIterator<Item = (T, WindowInfo)>, point: POINT) -> Option<T> {
    windows
        .into_iter()
        .find(|(_, info)| {
            let r = &info.rect;
            info.visible
                && !info.tool
                && r.right > r.left
                && r.bottom > r.top
                && rect_contains(r, point)
        })
        .map(|(handle, _)| handle)
}

unsafe fn window_info(hwnd: HWND) -> WindowInfo {
    let ex_style = GetWindowLongPtrW(hwnd, GWL_EXSTYLE);
    let mut rect = RECT::default();
    let _ = GetWindowRect(hwnd, &mut rect);
    WindowInfo {
        visible: IsWindowVisible(hwnd).as_bool(),
        tool: (ex_style as u32) & WS_EX_TOOLWINDOW.0 != 0,
        rect,
    }
}

/// Windows below `hwnd` in z-order, topmost first.
fn windows_below(hwnd: HWND) -> impl Iterator<Item = (HWND, WindowInfo)> {
    let next = |h: HWND| unsafe { GetWindow(h, GW_HWNDNEXT) }.ok().filter(|n| !n.is_invalid());
    std::iter::successors(next(hwnd), move |h| next(*h)).map(|h| (h, unsafe { window_info(h) }))
}

/// COLORREF is `0x00BBGGRR`.
fn decode_colorref(value: u32) -> Color {
    let r = value as u8;
    let g = (value >> 8) as u8;
    let b = (value >> 16) as u8;
    Color::rgba(r, g, b, 255)
}

unsafe fn read_pixel(hwnd: HWND, screen: POINT) -> Background {
    let mut rect = RECT::default();
    if GetWindowRect(hwnd, &mut rect).is_err() {
        return Background::Unreadable;
    }

    let hdc = GetWindowDC(hwnd);
    if hdc.is_invalid() {
        return Background::Unreadable;
    }
    let pixel = GetPixel(hdc, screen.x - rect.left, screen.y - rect.top);
    ReleaseDC(hwnd, hdc);

    if pixel.0 == CLR_INVALID {
        Background::Unreadable
    } else {
        Background::Rgb(decode_colorref(pixel.0))
    }
}

impl HitTest for DesktopHitTest {
    fn background_at(&self, point: Vec2) -> Option<Background> {
        let screen = POINT {
            x: point.x as i32,
            y: point.y as i32,
        };

        unsafe {
            let mut hwnd = WindowFromPoint(screen);
            if hwnd.is_invalid() {
                return None;
            }
            if Some(hwnd) == self.own {
                hwnd = first_covering(windows_below(hwnd), screen)?;
            }
            Some(read_pixel(hwnd, screen))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(visible: bool, tool: bool, rect: (i32, i32, i32, i32)) -> WindowInfo {
        WindowInfo {
            visible,
            tool,
            rect: RECT {
                left: rect.0,
                top: rect.1,
                right: rect.2,
                bottom: rect.3,
            },
        }
    }

    #[test]
    fn walk_picks_first_visible_window_under_point() {
        let point = POINT { x: 100, y: 100 };
        let stack = vec![
            ("hidden", info(false, false, (0, 0, 500, 500))),
            ("tooltip", info(true, true, (90, 90, 120, 120))),
            ("elsewhere", info(true, false, (300, 300, 400, 400))),
            ("empty", info(true, false, (100, 100, 100, 100))),
            ("editor", info(true, false, (50, 50, 800, 600))),
            ("desktop", info(true, false, (0, 0, 1920, 1080))),
        ];
        assert_eq!(first_covering(stack, point), Some("editor"));
    }

    #[test]
    fn walk_finds_nothing_past_the_stack() {
        let point = POINT { x: 10, y: 10 };
        let stack = vec![(1, info(true, false, (20, 20, 40, 40)))];
        assert_eq!(first_covering(stack, point), None);
        // Right and bottom edges are exclusive.
        let edge = vec![(2, info(true, false, (0, 0, 10, 10)))];
        assert_eq!(first_covering(edge, point), None);
    }

    #[test]
    fn colorref_is_bgr() {
        let c = decode_colorref(0x0030_2010);
        assert_eq!((c.r(), c.g(), c.b(), c.a()), (0x10, 0x20, 0x30, 255));
    }
}
