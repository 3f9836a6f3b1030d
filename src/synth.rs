//! Keyboard, media-key and mouse-click synthesis.
//!
//! `InputSynthesizer` turns typed requests into `SyntheticInput` batches and
//! hands each batch to the backend in a single call, so the OS sees the
//! modifiers and the main key as one uninterrupted sequence.
//!
//! Key-down: modifiers go down first (shift, control, alt, meta), then the
//! main key. Key-up: the main key goes up first, then the modifiers in the
//! same order.
//!
//! Media keys reached through `simulate_key_press` honour the press/release
//! flag. `simulate_media_key` always sends a complete down+up tap.

use std::thread;
use std::time::{Duration, Instant};

use crate::error::BridgeError;
use crate::keys::{classify, ClickRequest, KeyClass, KeyRequest, MediaKey, MediaKeyRequest};
use crate::platform::windows::keycodes::{is_extended_key, media_key_vkcode, modifier_vkcode};
use crate::platform::{FocusOutcome, FocusTargetResolver, InputBackend, KeyState, SyntheticInput};

/// DPI at which logical and physical pixels coincide.
pub const BASE_DPI: u32 = 96;

// ---------------------------------------------------------------------------
// Event builders
// ---------------------------------------------------------------------------

/// Builds the scan-code sequence for a standard key and its modifiers.
pub fn key_sequence(req: &KeyRequest, scan_code: impl Fn(u32) -> u16) -> Vec<SyntheticInput> {
    let state = KeyState::from_key_down(req.key_down);

    let main = SyntheticInput::ScanCode {
        scan: scan_code(req.key_code),
        extended: u16::try_from(req.key_code).is_ok_and(is_extended_key),
        state,
    };

    let modifiers = req.modifiers.iter().map(|m| {
        let (vk, extended) = modifier_vkcode(m);
        SyntheticInput::ScanCode {
            scan: scan_code(u32::from(vk)),
            extended,
            state,
        }
    });

    let mut events = Vec::with_capacity(5);
    match state {
        KeyState::Down => {
            events.extend(modifiers);
            events.push(main);
        }
        KeyState::Up => {
            events.push(main);
            events.extend(modifiers);
        }
    }
    events
}

/// Down+up pair for a media key.
pub fn media_tap(key: MediaKey) -> [SyntheticInput; 2] {
    let vk = media_key_vkcode(key);
    [
        SyntheticInput::VirtualKey {
            vk,
            state: KeyState::Down,
        },
        SyntheticInput::VirtualKey {
            vk,
            state: KeyState::Up,
        },
    ]
}

/// Scales one logical coordinate to physical pixels, truncating toward zero.
pub fn to_physical(logical: f64, dpi: u32) -> i32 {
    (logical * f64::from(dpi) / f64::from(BASE_DPI)) as i32
}

// ---------------------------------------------------------------------------
// Synthesizer
// ---------------------------------------------------------------------------

pub struct InputSynthesizer<B, F> {
    backend: B,
    focus: F,
    /// Pause after raising a target window so the focus change lands first.
    settle_delay: Duration,
}

impl<B: InputBackend, F: FocusTargetResolver> InputSynthesizer<B, F> {
    pub fn new(backend: B, focus: F, settle_delay: Duration) -> Self {
        Self {
            backend,
            focus,
            settle_delay,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Presses or releases one key with its modifiers.
    pub fn simulate_key_press(&self, req: &KeyRequest) -> Result<(), BridgeError> {
        let state = KeyState::from_key_down(req.key_down);

        let events = match classify(req.key_code) {
            KeyClass::Media(key) => {
                if !req.modifiers.is_empty() {
                    log::debug!("synth: modifiers ignored for media key {key}");
                }
                vec![SyntheticInput::VirtualKey {
                    vk: media_key_vkcode(key),
                    state,
                }]
            }
            KeyClass::Standard(_) => {
                self.bring_target_forward();
                key_sequence(req, |vk| self.backend.scan_code(vk))
            }
        };

        self.deliver(&events)?;
        log::debug!(
            "synth: key {:#06x} {:?} ({} events)",
            req.key_code,
            state,
            events.len()
        );
        Ok(())
    }

    /// Taps a media key by name. Unknown names send nothing.
    pub fn simulate_media_key(&self, req: &MediaKeyRequest) -> Result<(), BridgeError> {
        let key: MediaKey = req
            .key
            .parse()
            .map_err(|_| BridgeError::UnsupportedKey(req.key.clone()))?;

        self.deliver(&media_tap(key))?;
        log::debug!("synth: media key {key} tapped");
        Ok(())
    }

    /// Moves the cursor to a logical point and presses or releases the left
    /// button there.
    pub fn simulate_mouse_click(&self, req: &ClickRequest) -> Result<(), BridgeError> {
        let dpi = self
            .backend
            .monitor_dpi(req.x as i32, req.y as i32)
            .unwrap_or(BASE_DPI);
        let (px, py) = (to_physical(req.x, dpi), to_physical(req.y, dpi));

        // A failed cursor move does not suppress the button event.
        if let Err(e) = self.backend.set_cursor_pos(px, py) {
            log::debug!("synth: {e}, sending button event at current position");
        }

        let state = KeyState::from_key_down(req.key_down);
        self.deliver(&[SyntheticInput::LeftButton { state }])?;

        log::debug!(
            "synth: left button {:?} at ({:.1}, {:.1}) -> ({px}, {py}) @ {dpi} dpi",
            state,
            req.x,
            req.y
        );
        Ok(())
    }

    fn bring_target_forward(&self) {
        match self.focus.focus_target() {
            FocusOutcome::Focused(name) => {
                log::debug!("synth: focused {name}, waiting {:?}", self.settle_delay);
                if !self.settle_delay.is_zero() {
                    thread::sleep(self.settle_delay);
                }
            }
            FocusOutcome::AlreadyFocused(name) => {
                log::debug!("synth: {name} already in foreground");
            }
            FocusOutcome::NotFound => {}
        }
    }

    fn deliver(&self, events: &[SyntheticInput]) -> Result<(), BridgeError> {
        let started = Instant::now();
        let delivered = self.backend.send(events)?;
        if delivered < events.len() {
            log::warn!(
                "synth: SendInput accepted {delivered} of {} events",
                events.len()
            );
            return Err(BridgeError::SendInputFailed {
                requested: events.len(),
                delivered,
            });
        }
        log::trace!(
            "synth: batch of {} delivered in {:.2}ms",
            events.len(),
            started.elapsed().as_secs_f64() * 1000.0
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
