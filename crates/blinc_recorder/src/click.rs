//! Double and triple click synthesis.
//!
//! Watches button presses and emits a `DoubleButtonPress` or
//! `TripleButtonPress` pseudo-event when presses on the same window and
//! button follow each other closely enough.

use blinc_platform::{EventType, NativeEvent, WindowId};
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Press {
    time: u32,
    window: WindowId,
    button: u32,
}

impl Press {
    fn same_target(&self, other: &Press) -> bool {
        self.window == other.window && self.button == other.button
    }

    /// `self` happened less than `limit_ms` after `earlier`
    fn within(&self, earlier: &Press, limit_ms: u32) -> bool {
        self.time.wrapping_sub(earlier.time) < limit_ms
    }
}

/// Two-press history feeding click synthesis. Index 0 is the most recent.
#[derive(Debug)]
pub struct ClickCounter {
    history: SmallVec<[Press; 2]>,
    double_ms: u32,
    triple_ms: u32,
}

impl ClickCounter {
    pub fn new(double_ms: u32, triple_ms: u32) -> Self {
        Self {
            history: SmallVec::new(),
            double_ms,
            triple_ms,
        }
    }

    /// Feed a live event. Returns the click pseudo-event to deliver after
    /// it, if any. Events other than button presses are ignored.
    pub fn process(&mut self, event: &NativeEvent) -> Option<NativeEvent> {
        if event.event_type != EventType::ButtonPress {
            return None;
        }
        let press = Press {
            time: event.time,
            window: event.window,
            button: event.detail,
        };

        let triple = match self.history.as_slice() {
            [last, before] => {
                press.within(before, self.triple_ms)
                    && press.same_target(before)
                    && press.same_target(last)
            }
            _ => false,
        };
        if triple {
            self.history.clear();
            tracing::trace!("triple click on {} button {}", press.window, press.button);
            return Some(Self::pseudo(event, EventType::TripleButtonPress));
        }

        let double = self
            .history
            .first()
            .is_some_and(|last| press.within(last, self.double_ms) && press.same_target(last));
        self.remember(press);
        if double {
            tracing::trace!("double click on {} button {}", press.window, press.button);
            return Some(Self::pseudo(event, EventType::DoubleButtonPress));
        }
        None
    }

    fn remember(&mut self, press: Press) {
        self.history.truncate(1);
        self.history.insert(0, press);
    }

    fn pseudo(event: &NativeEvent, event_type: EventType) -> NativeEvent {
        NativeEvent {
            event_type,
            ..event.clone()
        }
    }

    /// Forget all recorded presses.
    pub fn reset(&mut self) {
        self.history.clear();
    }
}

impl Default for ClickCounter {
    fn default() -> Self {
        Self::new(250, 500)
    }
}
