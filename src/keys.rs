//! Typed request payloads and key classification.
//!
//! Requests are decoded once at the channel boundary into these structs.
//! Anything the decoder rejects becomes an `INVALID_ARGUMENT` reply before any
//! OS call is made.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Modifiers
// ---------------------------------------------------------------------------

/// A modifier key. Declaration order is the order modifiers are pressed and
/// released in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Modifier {
    Shift,
    Control,
    Alt,
    Meta,
}

impl Modifier {
    pub const ALL: [Modifier; 4] = [
        Modifier::Shift,
        Modifier::Control,
        Modifier::Alt,
        Modifier::Meta,
    ];
}

impl FromStr for Modifier {
    type Err = String;

    /// Accepts the host spelling (`shiftModifier`) and the short one (`shift`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shiftModifier" | "shift" => Ok(Modifier::Shift),
            "controlModifier" | "control" => Ok(Modifier::Control),
            "altModifier" | "alt" => Ok(Modifier::Alt),
            "metaModifier" | "meta" => Ok(Modifier::Meta),
            other => Err(format!("unknown modifier {other:?}")),
        }
    }
}

/// Set of held modifiers. Iteration always yields shift, control, alt, meta
/// regardless of the order the caller listed them in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<String>")]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn contains(&self, modifier: Modifier) -> bool {
        match modifier {
            Modifier::Shift => self.shift,
            Modifier::Control => self.control,
            Modifier::Alt => self.alt,
            Modifier::Meta => self.meta,
        }
    }

    pub fn insert(&mut self, modifier: Modifier) {
        match modifier {
            Modifier::Shift => self.shift = true,
            Modifier::Control => self.control = true,
            Modifier::Alt => self.alt = true,
            Modifier::Meta => self.meta = true,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.shift || self.control || self.alt || self.meta)
    }

    pub fn iter(&self) -> impl Iterator<Item = Modifier> + '_ {
        Modifier::ALL.into_iter().filter(|&m| self.contains(m))
    }
}

impl FromIterator<Modifier> for Modifiers {
    fn from_iter<I: IntoIterator<Item = Modifier>>(iter: I) -> Self {
        let mut set = Modifiers::default();
        for modifier in iter {
            set.insert(modifier);
        }
        set
    }
}

impl TryFrom<Vec<String>> for Modifiers {
    type Error = String;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        names.iter().map(|n| n.parse::<Modifier>()).collect()
    }
}

// ---------------------------------------------------------------------------
// Media keys
// ---------------------------------------------------------------------------

/// Media keys the synthesizer can press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKey {
    PlayPause,
    Stop,
    Next,
    Previous,
    VolumeUp,
    VolumeDown,
}

impl MediaKey {
    pub const ALL: [MediaKey; 6] = [
        MediaKey::PlayPause,
        MediaKey::Stop,
        MediaKey::Next,
        MediaKey::Previous,
        MediaKey::VolumeUp,
        MediaKey::VolumeDown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKey::PlayPause => "playPause",
            MediaKey::Stop => "stop",
            MediaKey::Next => "next",
            MediaKey::Previous => "previous",
            MediaKey::VolumeUp => "volumeUp",
            MediaKey::VolumeDown => "volumeDown",
        }
    }

    /// Looks up a USB HID consumer-page usage (low 16 bits of a media code).
    fn from_consumer_usage(usage: u32) -> Option<Self> {
        match usage {
            0x00E8 => Some(MediaKey::PlayPause),
            0x00B5 => Some(MediaKey::Next),
            0x00B6 => Some(MediaKey::Previous),
            0x00B7 => Some(MediaKey::Stop),
            0x00E9 => Some(MediaKey::VolumeUp),
            0x00EA => Some(MediaKey::VolumeDown),
            _ => None,
        }
    }
}

impl fmt::Display for MediaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a media key name outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMediaKey(pub String);

impl FromStr for MediaKey {
    type Err = UnknownMediaKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownMediaKey(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// High 16 bits of a key code on the USB HID consumer usage page.
const CONSUMER_PAGE: u32 = 0x000C_0000;
const PAGE_MASK: u32 = 0xFFFF_0000;

/// How a `simulateKeyPress` key code is injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    /// Ordinary virtual key, sent by scan code.
    Standard(u32),
    /// Media key, sent by virtual key.
    Media(MediaKey),
}

/// Consumer-page codes with an unknown usage fall back to the standard path.
pub fn classify(key_code: u32) -> KeyClass {
    if key_code & PAGE_MASK == CONSUMER_PAGE {
        if let Some(media) = MediaKey::from_consumer_usage(key_code & !PAGE_MASK) {
            return KeyClass::Media(media);
        }
        log::debug!("keys: unknown consumer usage {key_code:#010x}, treating as standard key");
    }
    KeyClass::Standard(key_code)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyRequest {
    pub key_code: u32,
    #[serde(default)]
    pub modifiers: Modifiers,
    pub key_down: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickRequest {
    /// Logical (DPI-independent) screen coordinates. Missing means 0.
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    pub key_down: bool,
}

/// The key name stays a string here so that an unknown name is reported as
/// an unsupported key rather than a malformed request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MediaKeyRequest {
    pub key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayingRequest {
    pub is_playing: bool,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
