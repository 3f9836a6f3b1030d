//! Request channel: decodes host method calls into typed requests and routes
//! them to the synthesizer or the media-key listener.
//!
//! Wire format, one JSON object per line:
//!
//! ```text
//! -> {"id": 7, "method": "simulateKeyPress", "arguments": {"keyCode": 65, "modifiers": ["shiftModifier"], "keyDown": true}}
//! <- {"id": 7, "result": true}
//! <- {"id": 8, "error": {"code": "UNSUPPORTED_KEY", "message": "..."}}
//! <- {"event": 0}
//! ```
//!
//! Argument decoding happens here and nowhere else. A request that fails to
//! decode never reaches the handlers.

use std::io::{self, Write};
use std::sync::mpsc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BridgeError;
use crate::hotkey::{MediaKeyEvent, MediaKeyListener};
use crate::keys::{ClickRequest, KeyRequest, MediaKeyRequest, PlayingRequest};
use crate::platform::{FocusTargetResolver, HotkeyRegistrar, InputBackend};
use crate::synth::InputSynthesizer;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// One inbound call. `id` is echoed back untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct MethodCall {
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl From<&BridgeError> for ErrorBody {
    fn from(err: &BridgeError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Success { id: Value, result: Value },
    Failure { id: Value, error: ErrorBody },
}

/// Pushed to the host whenever the subscriber receives a media key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EventMessage {
    pub event: MediaKeyEvent,
}

/// Writes `value` as one JSON line and flushes, so the host sees it at once.
pub fn write_line<W: Write, T: Serialize>(out: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    out.write_all(b"\n")?;
    out.flush()
}

// ---------------------------------------------------------------------------
// Typed requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    SimulateKeyPress(KeyRequest),
    SimulateMediaKey(MediaKeyRequest),
    SimulateMouseClick(ClickRequest),
    GetPlatformName,
    GetIsPlaying,
    SetIsPlaying(PlayingRequest),
    /// Attach the media-key event subscriber.
    Listen,
    /// Detach it.
    Cancel,
}

impl Request {
    pub fn decode(call: &MethodCall) -> Result<Self, BridgeError> {
        let request = match call.method.as_str() {
            "simulateKeyPress" => Request::SimulateKeyPress(arguments(call)?),
            "simulateMediaKey" => Request::SimulateMediaKey(arguments(call)?),
            "simulateMouseClick" => Request::SimulateMouseClick(arguments(call)?),
            "getPlatformName" => Request::GetPlatformName,
            "getIsPlaying" => Request::GetIsPlaying,
            "setIsPlaying" => Request::SetIsPlaying(arguments(call).map_err(|_| {
                BridgeError::InvalidArgument("isPlaying argument is required".into())
            })?),
            "listen" => Request::Listen,
            "cancel" => Request::Cancel,
            other => return Err(BridgeError::NotImplemented(other.to_string())),
        };
        Ok(request)
    }
}

fn arguments<T: DeserializeOwned>(call: &MethodCall) -> Result<T, BridgeError> {
    T::deserialize(&call.arguments)
        .map_err(|e| BridgeError::InvalidArgument(format!("{}: {e}", call.method)))
}

// ---------------------------------------------------------------------------
// Bridge
// ---------------------------------------------------------------------------

/// Owns both handlers and the event receiver of the current subscription.
pub struct Bridge<B, F, R: HotkeyRegistrar> {
    synth: InputSynthesizer<B, F>,
    listener: MediaKeyListener<R>,
    events: Option<mpsc::Receiver<MediaKeyEvent>>,
}

impl<B, F, R> Bridge<B, F, R>
where
    B: InputBackend,
    F: FocusTargetResolver,
    R: HotkeyRegistrar,
{
    pub fn new(synth: InputSynthesizer<B, F>, listener: MediaKeyListener<R>) -> Self {
        Self {
            synth,
            listener,
            events: None,
        }
    }

    pub fn synthesizer(&self) -> &InputSynthesizer<B, F> {
        &self.synth
    }

    pub fn listener(&self) -> &MediaKeyListener<R> {
        &self.listener
    }

    /// Decodes and executes one call.
    pub fn handle(&mut self, call: &MethodCall) -> Result<Value, BridgeError> {
        match Request::decode(call)? {
            Request::SimulateKeyPress(req) => {
                self.synth.simulate_key_press(&req)?;
                Ok(Value::Bool(true))
            }
            Request::SimulateMediaKey(req) => {
                self.synth.simulate_media_key(&req)?;
                Ok(Value::Bool(true))
            }
            Request::SimulateMouseClick(req) => {
                self.synth.simulate_mouse_click(&req)?;
                Ok(Value::Bool(true))
            }
            Request::GetPlatformName => Ok(Value::from(self.listener.platform_name())),
            Request::GetIsPlaying => Ok(Value::Bool(self.listener.is_playing())),
            Request::SetIsPlaying(req) => {
                self.listener.set_playing(req.is_playing);
                Ok(Value::Null)
            }
            Request::Listen => {
                self.events = Some(self.listener.subscribe());
                Ok(Value::Null)
            }
            Request::Cancel => {
                self.listener.unsubscribe();
                self.events = None;
                Ok(Value::Null)
            }
        }
    }

    /// Like `handle`, wrapped in the reply envelope.
    pub fn reply(&mut self, call: &MethodCall) -> Reply {
        match self.handle(call) {
            Ok(result) => Reply::Success {
                id: call.id.clone(),
                result,
            },
            Err(err) => {
                log::debug!("channel: {} failed: {err}", call.method);
                Reply::Failure {
                    id: call.id.clone(),
                    error: ErrorBody::from(&err),
                }
            }
        }
    }

    /// Parses one wire line and answers it. Unparseable lines are answered
    /// with `INVALID_ARGUMENT` and a null id.
    pub fn reply_to_line(&mut self, line: &str) -> Reply {
        match serde_json::from_str::<MethodCall>(line) {
            Ok(call) => self.reply(&call),
            Err(e) => Reply::Failure {
                id: Value::Null,
                error: ErrorBody::from(&BridgeError::InvalidArgument(format!(
                    "malformed request: {e}"
                ))),
            },
        }
    }

    /// Routes a fired hotkey to the listener.
    pub fn on_hotkey(&mut self, id: i32) {
        self.listener.handle_hotkey(id);
    }

    /// Answers `lines` in order, writing each reply as it is produced. Stops
    /// at the first failed write; lines after it are left unread and never
    /// executed.
    pub fn serve_lines<I, W>(&mut self, lines: I, out: &mut W) -> io::Result<()>
    where
        I: IntoIterator<Item = String>,
        W: Write,
    {
        for line in lines {
            let reply = self.reply_to_line(&line);
            write_line(out, &reply)?;
        }
        Ok(())
    }

    /// Writes every pending event, stopping at the first failed write.
    pub fn write_events<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        for event in self.drain_events() {
            write_line(out, &event)?;
        }
        Ok(())
    }

    /// Events received by the current subscription since the last drain.
    pub fn drain_events(&mut self) -> Vec<EventMessage> {
        self.events
            .as_ref()
            .map(|rx| rx.try_iter().map(|event| EventMessage { event }).collect())
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
