//! Windows input backend via SendInput.
//!
//! `WindowsExecutor` implements `InputBackend`. Injection is synchronous:
//! `SendInput` returns after the batch is queued and reports how many events
//! made it. No background thread is needed.

use std::mem::size_of;

use windows_sys::Win32::Foundation::POINT;
use windows_sys::Win32::Graphics::Gdi::{MonitorFromPoint, MONITOR_DEFAULTTONEAREST};
use windows_sys::Win32::UI::HiDpi::{GetDpiForMonitor, MDT_EFFECTIVE_DPI};
use windows_sys::Win32::UI::Input::KeyboardAndMouse::{
    MapVirtualKeyW, SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, INPUT_MOUSE, KEYBDINPUT,
    KEYEVENTF_EXTENDEDKEY, KEYEVENTF_KEYUP, KEYEVENTF_SCANCODE, MAPVK_VK_TO_VSC, MOUSEEVENTF_LEFTDOWN,
    MOUSEEVENTF_LEFTUP, MOUSEINPUT,
};
use windows_sys::Win32::UI::WindowsAndMessaging::SetCursorPos;

use crate::platform::{InputBackend, KeyState, PlatformError, SyntheticInput};

// ---------------------------------------------------------------------------
// Public struct
// ---------------------------------------------------------------------------

/// Injects keyboard and mouse events via SendInput on Windows.
///
/// Stateless: each `send()` call converts the batch to `INPUT` records and
/// hands them to `SendInput` in one call.
pub struct WindowsExecutor;

impl WindowsExecutor {
    pub fn new() -> Self {
        WindowsExecutor
    }
}

// ---------------------------------------------------------------------------
// INPUT construction
// ---------------------------------------------------------------------------

fn keyboard(w_vk: u16, w_scan: u16, dw_flags: u32) -> INPUT {
    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: w_vk,
                wScan: w_scan,
                dwFlags: dw_flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

fn to_input(event: &SyntheticInput) -> INPUT {
    match *event {
        SyntheticInput::ScanCode {
            scan,
            extended,
            state,
        } => {
            // With KEYEVENTF_SCANCODE the VK field must be zero.
            let mut flags = KEYEVENTF_SCANCODE;
            if extended {
                flags |= KEYEVENTF_EXTENDEDKEY;
            }
            if state == KeyState::Up {
                flags |= KEYEVENTF_KEYUP;
            }
            keyboard(0, scan, flags)
        }
        SyntheticInput::VirtualKey { vk, state } => {
            let flags = if state == KeyState::Up {
                KEYEVENTF_KEYUP
            } else {
                0
            };
            keyboard(vk, 0, flags)
        }
        SyntheticInput::LeftButton { state } => INPUT {
            r#type: INPUT_MOUSE,
            Anonymous: INPUT_0 {
                mi: MOUSEINPUT {
                    dx: 0,
                    dy: 0,
                    mouseData: 0,
                    dwFlags: match state {
                        KeyState::Down => MOUSEEVENTF_LEFTDOWN,
                        KeyState::Up => MOUSEEVENTF_LEFTUP,
                    },
                    time: 0,
                    dwExtraInfo: 0,
                },
            },
        },
    }
}

// ---------------------------------------------------------------------------
// InputBackend trait impl
// ---------------------------------------------------------------------------

impl InputBackend for WindowsExecutor {
    fn scan_code(&self, vk: u32) -> u16 {
        unsafe { MapVirtualKeyW(vk, MAPVK_VK_TO_VSC) as u16 }
    }

    fn send(&self, inputs: &[SyntheticInput]) -> Result<usize, PlatformError> {
        if inputs.is_empty() {
            return Ok(0);
        }
        let records: Vec<INPUT> = inputs.iter().map(to_input).collect();
        let sent = unsafe {
            SendInput(
                records.len() as u32,
                records.as_ptr(),
                size_of::<INPUT>() as i32,
            )
        };
        Ok(sent as usize)
    }

    fn monitor_dpi(&self, x: i32, y: i32) -> Option<u32> {
        let (mut dpi_x, mut dpi_y) = (0u32, 0u32);
        let hr = unsafe {
            let monitor = MonitorFromPoint(POINT { x, y }, MONITOR_DEFAULTTONEAREST);
            GetDpiForMonitor(monitor, MDT_EFFECTIVE_DPI, &mut dpi_x, &mut dpi_y)
        };
        if hr < 0 || dpi_x == 0 {
            log::debug!("executor: GetDpiForMonitor failed (hr {hr:#010x})");
            return None;
        }
        Some(dpi_x)
    }

    fn set_cursor_pos(&self, x: i32, y: i32) -> Result<(), PlatformError> {
        if unsafe { SetCursorPos(x, y) } == 0 {
            return Err(PlatformError::Other(format!("SetCursorPos({x}, {y}) failed")));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
