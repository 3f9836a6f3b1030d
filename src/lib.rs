//! keybridge -- Windows input synthesis and global media-key bridge.
//!
//! Two independent handlers sit behind one request channel:
//!
//! - `synth::InputSynthesizer` injects keyboard, media-key and mouse-click
//!   events through an `InputBackend`.
//! - `hotkey::MediaKeyListener` claims the play/pause, next and previous media
//!   keys while the host reports playback, and forwards presses to a single
//!   subscriber.
//!
//! `channel::Bridge` decodes host calls into typed requests and routes them.
//! All OS access goes through the traits in `platform`.

pub mod channel;
pub mod config;
pub mod error;
pub mod hotkey;
pub mod keys;
pub mod platform;
pub mod synth;

#[cfg(test)]
mod testing;
