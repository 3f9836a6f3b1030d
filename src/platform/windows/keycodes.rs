//! Windows virtual key codes used by the synthesizer and hotkey listener.
//!
//! VK codes are from the Windows SDK (winuser.h). This module has no
//! `windows-sys` dependency so the mapping tables are usable (and tested) on
//! every target.
//!
//! Modifiers are injected as the left-hand variant. Left Windows is an
//! extended key, the other left-hand modifiers are not.

use crate::keys::{MediaKey, Modifier};

// Navigation and editing cluster. These share scan codes with the numeric
// keypad and need `KEYEVENTF_EXTENDEDKEY` to address the dedicated keys.
pub const VK_PRIOR: u16 = 0x21;
pub const VK_NEXT: u16 = 0x22;
pub const VK_END: u16 = 0x23;
pub const VK_HOME: u16 = 0x24;
pub const VK_LEFT: u16 = 0x25;
pub const VK_UP: u16 = 0x26;
pub const VK_RIGHT: u16 = 0x27;
pub const VK_DOWN: u16 = 0x28;
pub const VK_INSERT: u16 = 0x2D;
pub const VK_DELETE: u16 = 0x2E;

// Modifiers (left-hand variants)
pub const VK_LSHIFT: u16 = 0xA0;
pub const VK_LCONTROL: u16 = 0xA2;
pub const VK_LMENU: u16 = 0xA4;
pub const VK_LWIN: u16 = 0x5B;

// Media and volume
pub const VK_VOLUME_DOWN: u16 = 0xAE;
pub const VK_VOLUME_UP: u16 = 0xAF;
pub const VK_MEDIA_NEXT_TRACK: u16 = 0xB0;
pub const VK_MEDIA_PREV_TRACK: u16 = 0xB1;
pub const VK_MEDIA_STOP: u16 = 0xB2;
pub const VK_MEDIA_PLAY_PAUSE: u16 = 0xB3;

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

/// True for keys that must be sent with `KEYEVENTF_EXTENDEDKEY`.
pub fn is_extended_key(vk: u16) -> bool {
    matches!(
        vk,
        VK_LEFT
            | VK_RIGHT
            | VK_UP
            | VK_DOWN
            | VK_INSERT
            | VK_DELETE
            | VK_HOME
            | VK_END
            | VK_PRIOR
            | VK_NEXT
    )
}

/// Virtual key and extended flag used to inject a modifier.
pub fn modifier_vkcode(modifier: Modifier) -> (u16, bool) {
    match modifier {
        Modifier::Shift => (VK_LSHIFT, false),
        Modifier::Control => (VK_LCONTROL, false),
        Modifier::Alt => (VK_LMENU, false),
        Modifier::Meta => (VK_LWIN, true),
    }
}

/// Virtual key for a media key.
pub fn media_key_vkcode(key: MediaKey) -> u16 {
    match key {
        MediaKey::PlayPause => VK_MEDIA_PLAY_PAUSE,
        MediaKey::Stop => VK_MEDIA_STOP,
        MediaKey::Next => VK_MEDIA_NEXT_TRACK,
        MediaKey::Previous => VK_MEDIA_PREV_TRACK,
        MediaKey::VolumeUp => VK_VOLUME_UP,
        MediaKey::VolumeDown => VK_VOLUME_DOWN,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_cluster_is_extended() {
        for vk in [
            VK_LEFT, VK_RIGHT, VK_UP, VK_DOWN, VK_INSERT, VK_DELETE, VK_HOME, VK_END, VK_PRIOR,
            VK_NEXT,
        ] {
            assert!(is_extended_key(vk), "{vk:#04x} should be extended");
        }
    }

    #[test]
    fn ordinary_keys_are_not_extended() {
        // A, 0, F1, Enter, Space, Numpad4, Escape
        for vk in [0x41, 0x30, 0x70, 0x0D, 0x20, 0x64, 0x1B] {
            assert!(!is_extended_key(vk), "{vk:#04x} should not be extended");
        }
    }

    #[test]
    fn only_meta_modifier_is_extended() {
        assert_eq!(modifier_vkcode(Modifier::Shift), (VK_LSHIFT, false));
        assert_eq!(modifier_vkcode(Modifier::Control), (VK_LCONTROL, false));
        assert_eq!(modifier_vkcode(Modifier::Alt), (VK_LMENU, false));
        assert_eq!(modifier_vkcode(Modifier::Meta), (VK_LWIN, true));
    }

    #[test]
    fn media_keys_map_to_distinct_codes() {
        let codes: Vec<u16> = MediaKey::ALL.iter().map(|&k| media_key_vkcode(k)).collect();
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(media_key_vkcode(MediaKey::PlayPause), 0xB3);
        assert_eq!(media_key_vkcode(MediaKey::VolumeDown), 0xAE);
    }
}
