//! Windows platform backend: SendInput injection, RegisterHotKey hotkeys,
//! EnumWindows focus heuristic and the thread message loop.
//!
//! `keycodes` and the window-matching half of `focus` are plain data and
//! compile everywhere. Everything that calls into `windows-sys` is gated on
//! `target_os = "windows"`.

pub mod focus;
pub mod keycodes;

#[cfg(target_os = "windows")]
mod executor;
#[cfg(target_os = "windows")]
mod hotkeys;
#[cfg(target_os = "windows")]
pub mod message_loop;

#[cfg(target_os = "windows")]
pub use self::factories::*;

#[cfg(target_os = "windows")]
mod factories {
    use super::executor::WindowsExecutor;
    use super::focus::WindowsFocusResolver;
    use super::hotkeys::ThreadHotkeys;
    use crate::platform::{FocusTargetResolver, HotkeyRegistrar, InputBackend, PlatformError};

    /// Returns a `WindowsExecutor` backed by `SendInput`.
    pub fn create_input_backend() -> Result<Box<dyn InputBackend>, PlatformError> {
        Ok(Box::new(WindowsExecutor::new()))
    }

    /// Returns a registrar whose `WM_HOTKEY` messages land in the calling
    /// thread's queue. Must be created on the thread that runs the message loop.
    pub fn create_hotkey_registrar() -> Result<Box<dyn HotkeyRegistrar>, PlatformError> {
        Ok(Box::new(ThreadHotkeys::new()))
    }

    /// Returns the EnumWindows-based focus resolver for `process_names`.
    pub fn create_focus_resolver(process_names: Vec<String>) -> Box<dyn FocusTargetResolver> {
        Box::new(WindowsFocusResolver::new(process_names))
    }
}
