//! Native event model
//!
//! Events as delivered by the display connection, before any toolkit-level
//! dispatch. Input events carry pointer position, modifier state and a
//! kind-specific detail (keycode or button number).

use serde::{Deserialize, Serialize};

use crate::WindowId;

/// Native event type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    KeyPress,
    KeyRelease,
    ButtonPress,
    /// Synthesized from two presses inside the double-click window
    DoubleButtonPress,
    /// Synthesized from three presses inside the triple-click window
    TripleButtonPress,
    ButtonRelease,
    MotionNotify,
    EnterNotify,
    LeaveNotify,
    FocusChange,
    Expose,
    CreateNotify,
    DestroyNotify,
    MapNotify,
    UnmapNotify,
    ReparentNotify,
    ConfigureNotify,
}

impl EventType {
    /// Check if this is a keyboard event
    pub const fn is_key(self) -> bool {
        matches!(self, Self::KeyPress | Self::KeyRelease)
    }

    /// Check if this is a pointer button event (including synthesized clicks)
    pub const fn is_button(self) -> bool {
        matches!(
            self,
            Self::ButtonPress
                | Self::DoubleButtonPress
                | Self::TripleButtonPress
                | Self::ButtonRelease
        )
    }

    /// Check if the event positions the pointer
    pub const fn is_pointer(self) -> bool {
        self.is_button()
            || matches!(
                self,
                Self::MotionNotify | Self::EnterNotify | Self::LeaveNotify
            )
    }
}

/// An event as seen on the display connection
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeEvent {
    pub event_type: EventType,
    pub window: WindowId,
    /// Server timestamp in milliseconds
    pub time: u32,
    /// Pointer x relative to `window`
    pub x: i32,
    /// Pointer y relative to `window`
    pub y: i32,
    /// Modifier and button mask
    pub state: u32,
    /// Keycode for key events, button number for button events
    pub detail: u32,
    /// Motion hint flag
    pub is_hint: bool,
    /// Set when the event was produced by a forced (synthetic) delivery
    pub send_event: bool,
}

impl NativeEvent {
    /// Create an event carrying only a type and a window
    pub fn new(event_type: EventType, window: WindowId) -> Self {
        Self {
            event_type,
            window,
            time: 0,
            x: -1,
            y: -1,
            state: 0,
            detail: 0,
            is_hint: false,
            send_event: false,
        }
    }

    /// Key press or release
    pub fn key(pressed: bool, window: WindowId, time: u32, keycode: u32) -> Self {
        let event_type = if pressed {
            EventType::KeyPress
        } else {
            EventType::KeyRelease
        };
        Self {
            time,
            detail: keycode,
            ..Self::new(event_type, window)
        }
    }

    /// Button press or release at a position
    pub fn button(pressed: bool, window: WindowId, time: u32, x: i32, y: i32, button: u32) -> Self {
        let event_type = if pressed {
            EventType::ButtonPress
        } else {
            EventType::ButtonRelease
        };
        Self {
            time,
            x,
            y,
            detail: button,
            ..Self::new(event_type, window)
        }
    }

    /// Pointer motion
    pub fn motion(window: WindowId, time: u32, x: i32, y: i32) -> Self {
        Self {
            time,
            x,
            y,
            ..Self::new(EventType::MotionNotify, window)
        }
    }

    /// Set the modifier state
    pub fn with_state(mut self, state: u32) -> Self {
        self.state = state;
        self
    }

    /// Set the pointer position
    pub fn with_position(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Mark the event as a synthetic delivery
    pub fn synthetic(mut self) -> Self {
        self.send_event = true;
        self
    }

    /// Button number, if this is a button event
    pub fn button_number(&self) -> Option<u32> {
        self.event_type.is_button().then_some(self.detail)
    }

    /// Keycode, if this is a key event
    pub fn keycode(&self) -> Option<u32> {
        self.event_type.is_key().then_some(self.detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_classes() {
        assert!(EventType::KeyPress.is_key());
        assert!(!EventType::KeyPress.is_pointer());
        assert!(EventType::DoubleButtonPress.is_button());
        assert!(EventType::MotionNotify.is_pointer());
        assert!(!EventType::MapNotify.is_pointer());
    }

    #[test]
    fn test_constructors() {
        let press = NativeEvent::button(true, WindowId(7), 120, 4, 5, 3);
        assert_eq!(press.event_type, EventType::ButtonPress);
        assert_eq!(press.button_number(), Some(3));
        assert_eq!(press.keycode(), None);
        assert!(!press.send_event);

        let key = NativeEvent::key(false, WindowId(7), 0, 38).synthetic();
        assert_eq!(key.event_type, EventType::KeyRelease);
        assert_eq!(key.keycode(), Some(38));
        assert_eq!((key.x, key.y), (-1, -1));
        assert!(key.send_event);
    }
}
