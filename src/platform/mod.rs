//! Platform abstraction layer.
//!
//! Defines the `InputBackend`, `FocusTargetResolver` and `HotkeyRegistrar`
//! capability traits. The synthesizer and hotkey listener only talk to the OS
//! through these, so their logic runs (and is tested) on any target.
//! The Win32 implementation lives in the `windows` child module.

pub mod windows;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum PlatformError {
    /// The backend cannot run in this environment (wrong OS, no desktop).
    #[error("platform unavailable: {0}")]
    Unavailable(String),
    #[error("{0}")]
    Other(String),
}

// ---------------------------------------------------------------------------
// Synthetic input events
// ---------------------------------------------------------------------------

/// Press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyState {
    Down,
    Up,
}

impl KeyState {
    pub fn from_key_down(key_down: bool) -> Self {
        if key_down {
            KeyState::Down
        } else {
            KeyState::Up
        }
    }
}

/// One low-level event handed to the OS input queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntheticInput {
    /// Keyboard event addressed by hardware scan code.
    ScanCode {
        scan: u16,
        extended: bool,
        state: KeyState,
    },
    /// Keyboard event addressed by virtual key, used for media keys which
    /// have no meaningful scan code.
    VirtualKey { vk: u16, state: KeyState },
    /// Left mouse button at the current cursor position.
    LeftButton { state: KeyState },
}

// ---------------------------------------------------------------------------
// Capability traits
// ---------------------------------------------------------------------------

/// Injects synthetic keyboard and mouse input.
pub trait InputBackend {
    /// Maps a virtual key to its hardware scan code for the active layout.
    fn scan_code(&self, vk: u32) -> u16;

    /// Queues `inputs` as one batch. Returns how many events the OS accepted.
    fn send(&self, inputs: &[SyntheticInput]) -> Result<usize, PlatformError>;

    /// Effective DPI of the monitor nearest the given point, if readable.
    fn monitor_dpi(&self, x: i32, y: i32) -> Option<u32>;

    /// Moves the system cursor to physical pixel coordinates.
    fn set_cursor_pos(&self, x: i32, y: i32) -> Result<(), PlatformError>;
}

/// Result of one focus attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusOutcome {
    /// No window belonging to an allow-listed process is open.
    NotFound,
    /// The matching window already had the foreground.
    AlreadyFocused(String),
    /// The matching window was brought to the foreground. The caller should
    /// give the OS a moment to finish the switch.
    Focused(String),
}

/// Best-effort: raise the window of a known target application before
/// keyboard input is sent.
pub trait FocusTargetResolver {
    fn focus_target(&self) -> FocusOutcome;
}

/// Resolver used off Windows, in tests, and when focusing is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFocus;

impl FocusTargetResolver for NoFocus {
    fn focus_target(&self) -> FocusOutcome {
        FocusOutcome::NotFound
    }
}

/// Claims and releases system-wide hotkeys.
pub trait HotkeyRegistrar {
    /// Registers `vk` (no modifiers, no auto-repeat) under `id`.
    /// Returns false if another application already holds it.
    fn register(&mut self, id: i32, vk: u32) -> bool;

    fn unregister(&mut self, id: i32);
}

// ---------------------------------------------------------------------------
// Factories
// ---------------------------------------------------------------------------

#[cfg(target_os = "windows")]
pub use self::windows::{create_focus_resolver, create_hotkey_registrar, create_input_backend};

#[cfg(not(target_os = "windows"))]
pub fn create_input_backend() -> Result<Box<dyn InputBackend>, PlatformError> {
    Err(PlatformError::Unavailable(
        "input synthesis requires Windows".into(),
    ))
}

#[cfg(not(target_os = "windows"))]
pub fn create_hotkey_registrar() -> Result<Box<dyn HotkeyRegistrar>, PlatformError> {
    Err(PlatformError::Unavailable(
        "global hotkeys require Windows".into(),
    ))
}

#[cfg(not(target_os = "windows"))]
pub fn create_focus_resolver(_process_names: Vec<String>) -> Box<dyn FocusTargetResolver> {
    Box::new(NoFocus)
}

// Boxed capabilities are what `main` hands to the handlers.
impl<T: InputBackend + ?Sized> InputBackend for Box<T> {
    fn scan_code(&self, vk: u32) -> u16 {
        (**self).scan_code(vk)
    }

    fn send(&self, inputs: &[SyntheticInput]) -> Result<usize, PlatformError> {
        (**self).send(inputs)
    }

    fn monitor_dpi(&self, x: i32, y: i32) -> Option<u32> {
        (**self).monitor_dpi(x, y)
    }

    fn set_cursor_pos(&self, x: i32, y: i32) -> Result<(), PlatformError> {
        (**self).set_cursor_pos(x, y)
    }
}

impl<T: FocusTargetResolver + ?Sized> FocusTargetResolver for Box<T> {
    fn focus_target(&self) -> FocusOutcome {
        (**self).focus_target()
    }
}

impl<T: HotkeyRegistrar + ?Sized> HotkeyRegistrar for Box<T> {
    fn register(&mut self, id: i32, vk: u32) -> bool {
        (**self).register(id, vk)
    }

    fn unregister(&mut self, id: i32) {
        (**self).unregister(id)
    }
}
