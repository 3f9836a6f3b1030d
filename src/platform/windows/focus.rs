//! Foreground-window heuristic for the synthesizer.
//!
//! Before a standard key is sent, `WindowsFocusResolver` walks the visible,
//! non-minimized top-level windows, looks up each owning process's image
//! name and raises the first window whose executable is on the allow-list.
//! The allow-list is tried in order: an earlier entry wins even if a later
//! entry's window comes first in Z-order.
//!
//! Racy by nature (processes start and exit while we enumerate); every
//! failure degrades to `FocusOutcome::NotFound`.

/// Final path component of a Windows image path.
pub fn image_file_name(path: &str) -> &str {
    path.rsplit(['\\', '/']).next().unwrap_or(path)
}

/// Picks the window to raise: the first allow-list entry with any matching
/// window, and the first such window in enumeration order.
pub fn pick_target<'a, H: Copy>(
    allow_list: &'a [String],
    windows: &[(H, String)],
) -> Option<(H, &'a str)> {
    allow_list.iter().find_map(|wanted| {
        windows
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(wanted))
            .map(|&(hwnd, _)| (hwnd, wanted.as_str()))
    })
}

#[cfg(target_os = "windows")]
pub use self::win32::WindowsFocusResolver;

#[cfg(target_os = "windows")]
mod win32 {
    use windows_sys::Win32::Foundation::{CloseHandle, BOOL, HWND, LPARAM, MAX_PATH};
    use windows_sys::Win32::System::Threading::{
        OpenProcess, QueryFullProcessImageNameW, PROCESS_NAME_WIN32,
        PROCESS_QUERY_LIMITED_INFORMATION,
    };
    use windows_sys::Win32::UI::WindowsAndMessaging::{
        EnumWindows, GetForegroundWindow, GetWindowThreadProcessId, IsIconic, IsWindowVisible,
        SetForegroundWindow,
    };

    use super::{image_file_name, pick_target};
    use crate::platform::{FocusOutcome, FocusTargetResolver};

    pub struct WindowsFocusResolver {
        process_names: Vec<String>,
    }

    impl WindowsFocusResolver {
        pub fn new(process_names: Vec<String>) -> Self {
            Self { process_names }
        }
    }

    impl FocusTargetResolver for WindowsFocusResolver {
        fn focus_target(&self) -> FocusOutcome {
            if self.process_names.is_empty() {
                return FocusOutcome::NotFound;
            }

            let windows = visible_windows();
            let Some((hwnd, name)) = pick_target(&self.process_names, &windows) else {
                return FocusOutcome::NotFound;
            };

            if unsafe { GetForegroundWindow() } == hwnd as HWND {
                return FocusOutcome::AlreadyFocused(name.to_string());
            }

            if unsafe { SetForegroundWindow(hwnd as HWND) } == 0 {
                log::debug!("focus: SetForegroundWindow refused for {name}");
            }
            FocusOutcome::Focused(name.to_string())
        }
    }

    /// (window handle as isize, image file name) for every visible,
    /// non-minimized top-level window whose process could be queried.
    fn visible_windows() -> Vec<(isize, String)> {
        let mut found: Vec<(isize, String)> = Vec::new();
        unsafe {
            EnumWindows(Some(collect_window), &mut found as *mut _ as LPARAM);
        }
        found
    }

    unsafe extern "system" fn collect_window(hwnd: HWND, l_param: LPARAM) -> BOOL {
        let found = &mut *(l_param as *mut Vec<(isize, String)>);

        if IsWindowVisible(hwnd) == 0 || IsIconic(hwnd) != 0 {
            return 1;
        }

        if let Some(name) = process_image_name(hwnd) {
            found.push((hwnd as isize, name));
        }
        1
    }

    unsafe fn process_image_name(hwnd: HWND) -> Option<String> {
        let mut pid = 0u32;
        GetWindowThreadProcessId(hwnd, &mut pid);
        if pid == 0 {
            return None;
        }

        let process = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, 0, pid);
        if process.is_null() {
            return None;
        }

        let mut buffer = [0u16; MAX_PATH as usize];
        let mut size = buffer.len() as u32;
        let ok = QueryFullProcessImageNameW(
            process,
            PROCESS_NAME_WIN32,
            buffer.as_mut_ptr(),
            &mut size,
        );
        CloseHandle(process);

        if ok == 0 {
            return None;
        }
        let path = String::from_utf16_lossy(&buffer[..size as usize]);
        Some(image_file_name(&path).to_string())
    }

}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
