//! Global media-key listener.
//!
//! `MediaKeyListener` owns the three media hotkeys (play/pause, next,
//! previous) and the playing flag that decides whether they are claimed.
//!
//! Inactive -> Active only when all three registrations succeed. A partial
//! success is rolled back on the spot, so the listener is never observed
//! holding one or two of the hotkeys. Active -> Inactive releases all three.
//! Dropping an Active listener releases them too.
//!
//! Fired hotkeys are forwarded to at most one subscriber. Subscribing again
//! replaces the previous subscriber; events with nobody listening are dropped.

use std::sync::mpsc;

use serde::Serialize;

use crate::platform::windows::keycodes::{
    VK_MEDIA_NEXT_TRACK, VK_MEDIA_PLAY_PAUSE, VK_MEDIA_PREV_TRACK,
};
use crate::platform::HotkeyRegistrar;

pub const HOTKEY_PLAY_PAUSE: i32 = 1;
pub const HOTKEY_NEXT_TRACK: i32 = 2;
pub const HOTKEY_PREV_TRACK: i32 = 3;

/// Registered together, in this order.
const HOTKEYS: [(i32, u16); 3] = [
    (HOTKEY_PLAY_PAUSE, VK_MEDIA_PLAY_PAUSE),
    (HOTKEY_NEXT_TRACK, VK_MEDIA_NEXT_TRACK),
    (HOTKEY_PREV_TRACK, VK_MEDIA_PREV_TRACK),
];

/// Reported by `getPlatformName`.
pub const PLATFORM_NAME: &str = "Windows";

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Event pushed to the subscriber; serialized as its index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKeyEvent {
    PlayPause = 0,
    Rewind = 1,
    FastForward = 2,
}

impl MediaKeyEvent {
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_hotkey_id(id: i32) -> Option<Self> {
        match id {
            HOTKEY_PLAY_PAUSE => Some(MediaKeyEvent::PlayPause),
            HOTKEY_PREV_TRACK => Some(MediaKeyEvent::Rewind),
            HOTKEY_NEXT_TRACK => Some(MediaKeyEvent::FastForward),
            _ => None,
        }
    }
}

impl Serialize for MediaKeyEvent {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.index())
    }
}

// ---------------------------------------------------------------------------
// Listener
// ---------------------------------------------------------------------------

pub struct MediaKeyListener<R: HotkeyRegistrar> {
    registrar: R,
    is_playing: bool,
    /// True only while all three hotkeys are held.
    active: bool,
    subscriber: Option<mpsc::Sender<MediaKeyEvent>>,
}

impl<R: HotkeyRegistrar> MediaKeyListener<R> {
    pub fn new(registrar: R) -> Self {
        Self {
            registrar,
            is_playing: false,
            active: false,
            subscriber: None,
        }
    }

    pub fn platform_name(&self) -> &'static str {
        PLATFORM_NAME
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Records the playing flag and claims or releases the hotkeys to match.
    ///
    /// A failed claim is not an error: the flag is still recorded and the
    /// listener stays Inactive.
    pub fn set_playing(&mut self, is_playing: bool) {
        self.is_playing = is_playing;
        if is_playing {
            self.activate();
        } else {
            self.deactivate();
        }
    }

    /// Attaches a subscriber, replacing any previous one.
    pub fn subscribe(&mut self) -> mpsc::Receiver<MediaKeyEvent> {
        let (tx, rx) = mpsc::channel();
        if self.subscriber.replace(tx).is_some() {
            log::debug!("hotkey: previous subscriber replaced");
        }
        rx
    }

    pub fn unsubscribe(&mut self) {
        self.subscriber = None;
    }

    pub fn has_subscriber(&self) -> bool {
        self.subscriber.is_some()
    }

    /// Handles a fired hotkey. Returns the event if a subscriber received it.
    pub fn handle_hotkey(&mut self, id: i32) -> Option<MediaKeyEvent> {
        let event = MediaKeyEvent::from_hotkey_id(id)?;
        if !self.active {
            log::debug!("hotkey: {event:?} fired while inactive, dropped");
            return None;
        }
        let tx = self.subscriber.as_ref()?;
        if tx.send(event).is_err() {
            log::debug!("hotkey: subscriber gone, detaching");
            self.subscriber = None;
            return None;
        }
        log::debug!("hotkey: {event:?} delivered");
        Some(event)
    }

    fn activate(&mut self) {
        if self.active {
            return;
        }

        let mut claimed = Vec::with_capacity(HOTKEYS.len());
        for (id, vk) in HOTKEYS {
            if self.registrar.register(id, u32::from(vk)) {
                claimed.push(id);
            }
        }

        if claimed.len() == HOTKEYS.len() {
            self.active = true;
            log::info!("hotkey: media keys claimed");
            return;
        }

        log::warn!(
            "hotkey: only {} of {} media keys could be claimed, rolling back",
            claimed.len(),
            HOTKEYS.len()
        );
        for id in claimed {
            self.registrar.unregister(id);
        }
    }

    fn deactivate(&mut self) {
        if !self.active {
            return;
        }
        for (id, _) in HOTKEYS {
            self.registrar.unregister(id);
        }
        self.active = false;
        log::info!("hotkey: media keys released");
    }
}

impl<R: HotkeyRegistrar> Drop for MediaKeyListener<R> {
    fn drop(&mut self) {
        self.deactivate();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeRegistrar;

    #[test]
    fn new_listener_is_inactive() {
        let listener = MediaKeyListener::new(FakeRegistrar::new());
        assert!(!listener.is_playing());
        assert!(!listener.is_active());
        assert!(!listener.has_subscriber());
        assert_eq!(listener.platform_name(), "Windows");
    }

    #[test]
    fn playing_claims_all_three() {
        let registrar = FakeRegistrar::new();
        let log = registrar.log.clone();
        let mut listener = MediaKeyListener::new(registrar);

        listener.set_playing(true);

        assert!(listener.is_playing());
        assert!(listener.is_active());
        assert_eq!(
            log.borrow().register_calls,
            vec![(1, 0xB3), (2, 0xB0), (3, 0xB1)]
        );
        assert_eq!(log.borrow().held.len(), 3);
    }

    #[test]
    fn playing_twice_registers_once() {
        let registrar = FakeRegistrar::new();
        let log = registrar.log.clone();
        let mut listener = MediaKeyListener::new(registrar);

        listener.set_playing(true);
        listener.set_playing(true);

        assert!(listener.is_active());
        assert_eq!(log.borrow().register_calls.len(), 3);
        assert_eq!(log.borrow().held.len(), 3);
    }

    #[test]
    fn stopping_when_never_started_touches_nothing() {
        let registrar = FakeRegistrar::new();
        let log = registrar.log.clone();
        let mut listener = MediaKeyListener::new(registrar);

        listener.set_playing(false);

        assert!(!listener.is_playing());
        assert!(log.borrow().unregister_calls.is_empty());
    }

    #[test]
    fn partial_claim_rolls_back() {
        let registrar = FakeRegistrar::new();
        registrar.pre_claim(HOTKEY_NEXT_TRACK);
        let log = registrar.log.clone();
        let mut listener = MediaKeyListener::new(registrar);

        listener.set_playing(true);

        assert!(listener.is_playing());
        assert!(!listener.is_active());
        assert!(log.borrow().held.is_empty());
        assert_eq!(
            log.borrow().unregister_calls,
            vec![HOTKEY_PLAY_PAUSE, HOTKEY_PREV_TRACK]
        );
    }

    #[test]
    fn failed_claim_can_be_retried() {
        let registrar = FakeRegistrar::new();
        registrar.pre_claim(HOTKEY_PLAY_PAUSE);
        let log = registrar.log.clone();
        let mut listener = MediaKeyListener::new(registrar);

        listener.set_playing(true);
        assert!(!listener.is_active());

        log.borrow_mut().taken.clear();
        listener.set_playing(true);
        assert!(listener.is_active());
        assert_eq!(log.borrow().held.len(), 3);
    }

    #[test]
    fn stopping_releases_all_three() {
        let registrar = FakeRegistrar::new();
        let log = registrar.log.clone();
        let mut listener = MediaKeyListener::new(registrar);

        listener.set_playing(true);
        listener.set_playing(false);

        assert!(!listener.is_active());
        assert!(log.borrow().held.is_empty());
        assert_eq!(log.borrow().unregister_calls, vec![1, 2, 3]);
    }

    #[test]
    fn drop_releases_hotkeys() {
        let registrar = FakeRegistrar::new();
        let log = registrar.log.clone();
        {
            let mut listener = MediaKeyListener::new(registrar);
            listener.set_playing(true);
        }
        assert!(log.borrow().held.is_empty());
    }

    #[test]
    fn hotkeys_map_to_event_indices() {
        let mut listener = MediaKeyListener::new(FakeRegistrar::new());
        listener.set_playing(true);
        let rx = listener.subscribe();

        listener.handle_hotkey(HOTKEY_PLAY_PAUSE);
        listener.handle_hotkey(HOTKEY_PREV_TRACK);
        listener.handle_hotkey(HOTKEY_NEXT_TRACK);

        let indices: Vec<u8> = rx.try_iter().map(MediaKeyEvent::index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn unknown_hotkey_id_is_ignored() {
        let mut listener = MediaKeyListener::new(FakeRegistrar::new());
        listener.set_playing(true);
        let rx = listener.subscribe();
        assert_eq!(listener.handle_hotkey(42), None);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn events_after_unsubscribe_are_dropped() {
        let mut listener = MediaKeyListener::new(FakeRegistrar::new());
        listener.set_playing(true);

        let first = listener.subscribe();
        listener.unsubscribe();
        assert_eq!(listener.handle_hotkey(HOTKEY_PLAY_PAUSE), None);

        let second = listener.subscribe();
        assert!(first.try_recv().is_err());
        assert!(second.try_recv().is_err());
    }

    #[test]
    fn new_subscriber_replaces_old() {
        let mut listener = MediaKeyListener::new(FakeRegistrar::new());
        listener.set_playing(true);

        let old = listener.subscribe();
        let new = listener.subscribe();
        listener.handle_hotkey(HOTKEY_NEXT_TRACK);

        assert!(old.try_recv().is_err());
        assert_eq!(new.try_recv(), Ok(MediaKeyEvent::FastForward));
    }

    #[test]
    fn dropped_receiver_detaches_subscriber() {
        let mut listener = MediaKeyListener::new(FakeRegistrar::new());
        listener.set_playing(true);
        drop(listener.subscribe());

        assert_eq!(listener.handle_hotkey(HOTKEY_PLAY_PAUSE), None);
        assert!(!listener.has_subscriber());
    }

    #[test]
    fn inactive_listener_drops_events() {
        let mut listener = MediaKeyListener::new(FakeRegistrar::new());
        let rx = listener.subscribe();
        assert_eq!(listener.handle_hotkey(HOTKEY_PLAY_PAUSE), None);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn event_serializes_as_index() {
        assert_eq!(
            serde_json::to_string(&MediaKeyEvent::FastForward).unwrap(),
            "2"
        );
    }
}
