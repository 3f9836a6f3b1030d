//! Global hotkeys via RegisterHotKey.
//!
//! Hotkeys are registered with a null window handle, which ties them to the
//! registering thread: `WM_HOTKEY` arrives as a thread message in that
//! thread's queue and is picked up by `message_loop::run`. Register and
//! unregister must therefore happen on the message-loop thread.

use std::ptr;

use windows_sys::Win32::System::Threading::GetCurrentThreadId;
use windows_sys::Win32::UI::Input::KeyboardAndMouse::{
    RegisterHotKey, UnregisterHotKey, MOD_NOREPEAT,
};

use crate::platform::HotkeyRegistrar;

/// Thread-scoped hotkey registrar.
pub struct ThreadHotkeys {
    /// Thread that owns the registrations.
    thread_id: u32,
}

impl ThreadHotkeys {
    pub fn new() -> Self {
        Self {
            thread_id: unsafe { GetCurrentThreadId() },
        }
    }

    fn check_thread(&self, op: &str) {
        let current = unsafe { GetCurrentThreadId() };
        if current != self.thread_id {
            log::warn!(
                "hotkeys: {op} on thread {current}, registrations belong to thread {}",
                self.thread_id
            );
        }
    }
}

impl HotkeyRegistrar for ThreadHotkeys {
    fn register(&mut self, id: i32, vk: u32) -> bool {
        self.check_thread("register");
        // MOD_NOREPEAT: holding the key down fires once.
        let ok = unsafe { RegisterHotKey(ptr::null_mut(), id, MOD_NOREPEAT, vk) } != 0;
        if !ok {
            log::debug!("hotkeys: RegisterHotKey({id}, {vk:#04x}) failed, key held elsewhere");
        }
        ok
    }

    fn unregister(&mut self, id: i32) {
        self.check_thread("unregister");
        if unsafe { UnregisterHotKey(ptr::null_mut(), id) } == 0 {
            log::debug!("hotkeys: UnregisterHotKey({id}) failed");
        }
    }
}
