//! Event records.
//!
//! An [`EventRecord`] is one line of a replay log held in memory. Five kinds
//! are input events that the replay engine can inject; four are window
//! lifecycle notifications that only carry a window reference and act as
//! synchronization points during playback.

use std::fmt::{self, Write as _};

use blinc_platform::{EventType, NativeEvent, WindowId};
use serde::Serialize;

/// The kind of a recorded event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    KeyPress,
    KeyRelease,
    ButtonPress,
    ButtonRelease,
    MotionNotify,
    CreateNotify,
    MapNotify,
    ReparentNotify,
    ConfigureNotify,
}

/// Field layout shared by a group of event kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventClass {
    Key,
    Button,
    Motion,
    Structural,
}

impl EventKind {
    /// All kinds, in log keyword order
    pub const ALL: [EventKind; 9] = [
        EventKind::KeyPress,
        EventKind::KeyRelease,
        EventKind::ButtonPress,
        EventKind::ButtonRelease,
        EventKind::MotionNotify,
        EventKind::CreateNotify,
        EventKind::MapNotify,
        EventKind::ReparentNotify,
        EventKind::ConfigureNotify,
    ];

    /// The log keyword for this kind
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::KeyPress => "key_press",
            Self::KeyRelease => "key_release",
            Self::ButtonPress => "button_press",
            Self::ButtonRelease => "button_release",
            Self::MotionNotify => "motion_notify",
            Self::CreateNotify => "create_notify",
            Self::MapNotify => "map_notify",
            Self::ReparentNotify => "reparent_notify",
            Self::ConfigureNotify => "configure_notify",
        }
    }

    /// Look a kind up by its log keyword
    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.keyword() == word)
    }

    pub const fn class(self) -> EventClass {
        match self {
            Self::KeyPress | Self::KeyRelease => EventClass::Key,
            Self::ButtonPress | Self::ButtonRelease => EventClass::Button,
            Self::MotionNotify => EventClass::Motion,
            Self::CreateNotify | Self::MapNotify | Self::ReparentNotify | Self::ConfigureNotify => {
                EventClass::Structural
            }
        }
    }

    /// Whether records of this kind are injected during playback
    pub const fn is_replayable(self) -> bool {
        !matches!(self.class(), EventClass::Structural)
    }

    /// The native event type this kind records
    pub const fn event_type(self) -> EventType {
        match self {
            Self::KeyPress => EventType::KeyPress,
            Self::KeyRelease => EventType::KeyRelease,
            Self::ButtonPress => EventType::ButtonPress,
            Self::ButtonRelease => EventType::ButtonRelease,
            Self::MotionNotify => EventType::MotionNotify,
            Self::CreateNotify => EventType::CreateNotify,
            Self::MapNotify => EventType::MapNotify,
            Self::ReparentNotify => EventType::ReparentNotify,
            Self::ConfigureNotify => EventType::ConfigureNotify,
        }
    }

    /// The kind recording a native event type, if it is recordable
    pub const fn from_event_type(event_type: EventType) -> Option<Self> {
        Some(match event_type {
            EventType::KeyPress => Self::KeyPress,
            EventType::KeyRelease => Self::KeyRelease,
            EventType::ButtonPress => Self::ButtonPress,
            EventType::ButtonRelease => Self::ButtonRelease,
            EventType::MotionNotify => Self::MotionNotify,
            EventType::CreateNotify => Self::CreateNotify,
            EventType::MapNotify => Self::MapNotify,
            EventType::ReparentNotify => Self::ReparentNotify,
            EventType::ConfigureNotify => Self::ConfigureNotify,
            _ => return None,
        })
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Pointer position and modifier state of an input record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Pointer {
    /// -1 when unset
    pub x: i32,
    /// -1 when unset
    pub y: i32,
    pub state: u32,
}

impl Default for Pointer {
    fn default() -> Self {
        Self {
            x: -1,
            y: -1,
            state: 0,
        }
    }
}

/// Kind-specific payload of a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "class", rename_all = "snake_case")]
pub enum RecordBody {
    Key { pointer: Pointer, keycode: u32 },
    Button { pointer: Pointer, button: u32 },
    Motion { pointer: Pointer, is_hint: bool },
    Structural,
}

impl RecordBody {
    fn default_for(class: EventClass) -> Self {
        let pointer = Pointer::default();
        match class {
            EventClass::Key => Self::Key {
                pointer,
                keycode: 0,
            },
            EventClass::Button => Self::Button { pointer, button: 0 },
            EventClass::Motion => Self::Motion {
                pointer,
                is_hint: false,
            },
            EventClass::Structural => Self::Structural,
        }
    }
}

/// One captured event.
///
/// The kind is fixed at construction; the body always matches its class.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EventRecord {
    kind: EventKind,
    /// Absolute window id
    pub window: Option<WindowId>,
    /// Milliseconds since the start of the recording
    pub time: u32,
    body: RecordBody,
}

impl EventRecord {
    /// Create a record with every field at its default
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            window: None,
            time: 0,
            body: RecordBody::default_for(kind.class()),
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn class(&self) -> EventClass {
        self.kind.class()
    }

    pub fn body(&self) -> &RecordBody {
        &self.body
    }

    pub fn with_window(mut self, window: WindowId) -> Self {
        self.window = Some(window);
        self
    }

    pub fn with_time(mut self, time: u32) -> Self {
        self.time = time;
        self
    }

    /// Set the pointer position (ignored for structural records)
    pub fn with_position(mut self, x: i32, y: i32) -> Self {
        self.set_position(x, y);
        self
    }

    /// Set the modifier state (ignored for structural records)
    pub fn with_state(mut self, state: u32) -> Self {
        self.set_state(state);
        self
    }

    /// Set the keycode or button number (ignored for other kinds)
    pub fn with_detail(mut self, detail: u32) -> Self {
        match &mut self.body {
            RecordBody::Key { keycode, .. } => *keycode = detail,
            RecordBody::Button { button, .. } => *button = detail,
            RecordBody::Motion { .. } | RecordBody::Structural => {}
        }
        self
    }

    /// Set the motion hint flag (ignored for other kinds)
    pub fn with_hint(mut self, hint: bool) -> Self {
        self.set_hint(hint);
        self
    }

    pub fn pointer(&self) -> Option<&Pointer> {
        match &self.body {
            RecordBody::Key { pointer, .. }
            | RecordBody::Button { pointer, .. }
            | RecordBody::Motion { pointer, .. } => Some(pointer),
            RecordBody::Structural => None,
        }
    }

    fn pointer_mut(&mut self) -> Option<&mut Pointer> {
        match &mut self.body {
            RecordBody::Key { pointer, .. }
            | RecordBody::Button { pointer, .. }
            | RecordBody::Motion { pointer, .. } => Some(pointer),
            RecordBody::Structural => None,
        }
    }

    pub fn position(&self) -> Option<(i32, i32)> {
        self.pointer().map(|p| (p.x, p.y))
    }

    pub fn state(&self) -> Option<u32> {
        self.pointer().map(|p| p.state)
    }

    pub fn keycode(&self) -> Option<u32> {
        match self.body {
            RecordBody::Key { keycode, .. } => Some(keycode),
            _ => None,
        }
    }

    pub fn button(&self) -> Option<u32> {
        match self.body {
            RecordBody::Button { button, .. } => Some(button),
            _ => None,
        }
    }

    pub fn is_hint(&self) -> Option<bool> {
        match self.body {
            RecordBody::Motion { is_hint, .. } => Some(is_hint),
            _ => None,
        }
    }

    pub(crate) fn set_position(&mut self, x: i32, y: i32) {
        if let Some(pointer) = self.pointer_mut() {
            pointer.x = x;
            pointer.y = y;
        }
    }

    pub(crate) fn set_state(&mut self, state: u32) {
        if let Some(pointer) = self.pointer_mut() {
            pointer.state = state;
        }
    }

    pub(crate) fn set_keycode(&mut self, value: u32) {
        if let RecordBody::Key { keycode, .. } = &mut self.body {
            *keycode = value;
        }
    }

    pub(crate) fn set_button(&mut self, value: u32) {
        if let RecordBody::Button { button, .. } = &mut self.body {
            *button = value;
        }
    }

    pub(crate) fn set_hint(&mut self, hint: bool) {
        if let RecordBody::Motion { is_hint, .. } = &mut self.body {
            *is_hint = hint;
        }
    }

    /// Capture a live event. Returns `None` for event types that are not recorded.
    pub fn from_native(event: &NativeEvent, time: u32) -> Option<Self> {
        let kind = EventKind::from_event_type(event.event_type)?;
        let record = Self::new(kind)
            .with_window(event.window)
            .with_time(time)
            .with_position(event.x, event.y)
            .with_state(event.state)
            .with_detail(event.detail)
            .with_hint(event.is_hint);
        Some(record)
    }

    /// Build the synthetic event injected for this record.
    ///
    /// Structural records are never injected and yield `None`. Records
    /// without a window target `fallback`.
    pub fn to_native(&self, fallback: WindowId) -> Option<NativeEvent> {
        if !self.kind.is_replayable() {
            return None;
        }
        let window = self.window.unwrap_or(fallback);
        let mut event = NativeEvent::new(self.kind.event_type(), window).synthetic();
        event.time = self.time;
        if let Some(pointer) = self.pointer() {
            event.x = pointer.x;
            event.y = pointer.y;
            event.state = pointer.state;
        }
        event.detail = self.keycode().or(self.button()).unwrap_or(0);
        event.is_hint = self.is_hint().unwrap_or(false);
        Some(event)
    }

    /// Render the record as one log line (without the trailing newline).
    ///
    /// Fields are written in a fixed order: window, time, xy, state, then
    /// the kind-specific field.
    pub fn to_log_line(&self, base: WindowBase) -> String {
        let mut line = String::with_capacity(96);
        line.push('(');
        line.push_str(self.kind.keyword());
        if let Some(window) = self.window {
            let _ = write!(line, " (window {})", base.to_log(window));
        }
        if let Some(pointer) = self.pointer() {
            let _ = write!(
                line,
                " (time {}) (xy {} {}) (state {})",
                self.time, pointer.x, pointer.y, pointer.state
            );
        }
        match self.body {
            RecordBody::Key { keycode, .. } => {
                let _ = write!(line, " (keycode {keycode})");
            }
            RecordBody::Button { button, .. } => {
                let _ = write!(line, " (button {button})");
            }
            RecordBody::Motion { is_hint, .. } => {
                let _ = write!(line, " (is_hint {})", u8::from(is_hint));
            }
            RecordBody::Structural => {}
        }
        line.push(')');
        line
    }
}

/// Offset between raw window ids and the small integers written to logs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WindowBase(pub u64);

impl WindowBase {
    /// Window id as written to a log
    pub fn to_log(self, window: WindowId) -> i64 {
        (window.raw() as i64).wrapping_sub(self.0 as i64)
    }

    /// Window id read from a log, `None` if it falls outside the id space
    pub fn from_log(self, relative: i64) -> Option<WindowId> {
        self.0.checked_add_signed(relative).map(WindowId)
    }
}
