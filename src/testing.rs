//! In-memory fakes of the platform capabilities for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::rc::Rc;

use crate::platform::{
    FocusOutcome, FocusTargetResolver, HotkeyRegistrar, InputBackend, PlatformError,
    SyntheticInput,
};

/// Offset added to a virtual key to produce its fake scan code.
pub const SCAN_OFFSET: u16 = 0x1000;

/// Records every batch instead of injecting it.
#[derive(Debug)]
pub struct RecordingBackend {
    pub sent: RefCell<Vec<SyntheticInput>>,
    pub cursor: Cell<Option<(i32, i32)>>,
    /// Point the last DPI lookup was made at.
    pub dpi_probe: Cell<Option<(i32, i32)>>,
    pub dpi: Option<u32>,
    /// When set, at most this many events of each batch are accepted.
    pub accept_limit: Option<usize>,
    /// Makes `set_cursor_pos` fail without moving the cursor.
    pub cursor_locked: bool,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            sent: RefCell::new(Vec::new()),
            cursor: Cell::new(None),
            dpi_probe: Cell::new(None),
            dpi: Some(96),
            accept_limit: None,
            cursor_locked: false,
        }
    }

    pub fn with_dpi(dpi: u32) -> Self {
        Self {
            dpi: Some(dpi),
            ..Self::new()
        }
    }

    pub fn accepting(limit: usize) -> Self {
        Self {
            accept_limit: Some(limit),
            ..Self::new()
        }
    }

    pub fn events(&self) -> Vec<SyntheticInput> {
        self.sent.borrow().clone()
    }
}

impl InputBackend for RecordingBackend {
    fn scan_code(&self, vk: u32) -> u16 {
        (vk as u16).wrapping_add(SCAN_OFFSET)
    }

    fn send(&self, inputs: &[SyntheticInput]) -> Result<usize, PlatformError> {
        let accepted = self.accept_limit.map_or(inputs.len(), |l| l.min(inputs.len()));
        self.sent.borrow_mut().extend_from_slice(&inputs[..accepted]);
        Ok(accepted)
    }

    fn monitor_dpi(&self, x: i32, y: i32) -> Option<u32> {
        self.dpi_probe.set(Some((x, y)));
        self.dpi
    }

    fn set_cursor_pos(&self, x: i32, y: i32) -> Result<(), PlatformError> {
        if self.cursor_locked {
            return Err(PlatformError::Other(format!("SetCursorPos({x}, {y}) failed")));
        }
        self.cursor.set(Some((x, y)));
        Ok(())
    }
}

/// Returns a fixed outcome and counts calls.
#[derive(Debug)]
pub struct ScriptedFocus {
    pub outcome: FocusOutcome,
    pub calls: Cell<usize>,
}

impl ScriptedFocus {
    pub fn new(outcome: FocusOutcome) -> Self {
        Self {
            outcome,
            calls: Cell::new(0),
        }
    }
}

impl FocusTargetResolver for ScriptedFocus {
    fn focus_target(&self) -> FocusOutcome {
        self.calls.set(self.calls.get() + 1);
        self.outcome.clone()
    }
}

/// Shared view of the registrar's state, kept by the test after the
/// registrar itself has moved into a listener.
#[derive(Debug, Default)]
pub struct HotkeyLog {
    /// Ids currently held.
    pub held: BTreeSet<i32>,
    /// Ids claimed by "another application".
    pub taken: BTreeSet<i32>,
    pub register_calls: Vec<(i32, u32)>,
    pub unregister_calls: Vec<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeRegistrar {
    pub log: Rc<RefCell<HotkeyLog>>,
}

impl FakeRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates another application already holding `id`.
    pub fn pre_claim(&self, id: i32) {
        self.log.borrow_mut().taken.insert(id);
    }
}

impl HotkeyRegistrar for FakeRegistrar {
    fn register(&mut self, id: i32, vk: u32) -> bool {
        let mut log = self.log.borrow_mut();
        log.register_calls.push((id, vk));
        if log.taken.contains(&id) || log.held.contains(&id) {
            return false;
        }
        log.held.insert(id);
        true
    }

    fn unregister(&mut self, id: i32) {
        let mut log = self.log.borrow_mut();
        log.unregister_calls.push(id);
        log.held.remove(&id);
    }
}
