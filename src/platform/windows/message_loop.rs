//! Thread message loop that drives the bridge on Windows.
//!
//! The loop runs on the thread that registered the hotkeys. Two kinds of
//! thread messages matter:
//!
//! - `WM_HOTKEY`: a media hotkey fired; `wParam` carries the hotkey id.
//! - `WM_APP_REQUEST`: posted by `LoopWaker::wake` from the stdin reader
//!   thread to say requests are waiting in the channel.
//!
//! `LoopWaker::quit` posts `WM_QUIT`, which ends `run`.

use std::mem::MaybeUninit;
use std::ptr;

use windows_sys::Win32::System::Threading::GetCurrentThreadId;
use windows_sys::Win32::UI::WindowsAndMessaging::{
    GetMessageW, PeekMessageW, PostThreadMessageW, MSG, PM_NOREMOVE, WM_APP, WM_HOTKEY, WM_QUIT,
    WM_USER,
};

use crate::platform::PlatformError;

/// Wake-up message for pending requests.
pub const WM_APP_REQUEST: u32 = WM_APP + 1;

/// What the loop hands to its callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMessage {
    Hotkey(i32),
    RequestsPending,
}

/// Posts to the loop thread from any other thread.
#[derive(Debug, Clone, Copy)]
pub struct LoopWaker {
    thread_id: u32,
}

impl LoopWaker {
    /// Creates a waker for the calling thread and makes sure it has a
    /// message queue, so posts made before `run` starts are not lost.
    pub fn for_current_thread() -> Self {
        unsafe {
            let mut msg = MaybeUninit::<MSG>::zeroed();
            PeekMessageW(msg.as_mut_ptr(), ptr::null_mut(), WM_USER, WM_USER, PM_NOREMOVE);
        }
        Self {
            thread_id: unsafe { GetCurrentThreadId() },
        }
    }

    pub fn wake(&self) -> bool {
        unsafe { PostThreadMessageW(self.thread_id, WM_APP_REQUEST, 0, 0) != 0 }
    }

    pub fn quit(&self) {
        unsafe { PostThreadMessageW(self.thread_id, WM_QUIT, 0, 0) };
    }
}

/// Pumps the calling thread's queue until `WM_QUIT`.
pub fn run(mut on_message: impl FnMut(LoopMessage)) -> Result<(), PlatformError> {
    log::info!("message loop: running");
    loop {
        let mut msg = MaybeUninit::<MSG>::zeroed();
        // Returns 0 on WM_QUIT, -1 on error.
        let ret = unsafe { GetMessageW(msg.as_mut_ptr(), ptr::null_mut(), 0, 0) };
        if ret == 0 {
            break;
        }
        if ret < 0 {
            return Err(PlatformError::Other("GetMessageW failed".into()));
        }

        let msg = unsafe { msg.assume_init() };
        match msg.message {
            WM_HOTKEY => on_message(LoopMessage::Hotkey(msg.wParam as i32)),
            WM_APP_REQUEST => on_message(LoopMessage::RequestsPending),
            other => log::trace!("message loop: ignoring message {other:#06x}"),
        }
    }
    log::info!("message loop: exited");
    Ok(())
}
